use super::{error::SimError, queue::Identified};
use serde::{Deserialize, Serialize};
use std::cmp;

pub type Millis = u64;
pub type Kilobytes = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    /// In the input list, arrival time not reached yet
    NotArrived,
    /// Arrived, waiting for memory
    Ready,
    /// Memory-resident, waiting for the CPU
    ReadyInMemory,
    Running,
    Terminated,
}

impl ProcessState {
    pub fn can_become(self, next: ProcessState) -> bool {
        use ProcessState::*;
        matches!(
            (self, next),
            (NotArrived, Ready)
                | (Ready, ReadyInMemory)
                | (ReadyInMemory, Running)
                | (Running, Terminated)
                | (Running, Ready)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimConfig {
    pub total_memory_kb: Kilobytes,
    pub quantum_ms: Millis,
}

impl SimConfig {
    pub fn validate(&self) -> Result<(), SimError> {
        if self.total_memory_kb == 0 {
            return Err(SimError::validation("total_memory_kb", "must be > 0"));
        }
        if self.quantum_ms == 0 {
            return Err(SimError::validation("quantum_ms", "must be > 0"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ProcessRecord {
    id: String,
    name: String,
    size_kb: Kilobytes,
    cpu_total_ms: Millis,
    arrival_ms: Millis,

    cpu_remaining_ms: Millis,
    first_run_ms: Option<Millis>,
    completion_ms: Option<Millis>,
    state: ProcessState,
}

impl ProcessRecord {
    /// Validates raw ingestion values; `id` and `name` are stored trimmed.
    pub fn new(
        id: &str,
        name: &str,
        size_kb: i64,
        cpu_total_ms: i64,
        arrival_ms: i64,
    ) -> Result<Self, SimError> {
        let id = id.trim();
        let name = name.trim();
        if id.is_empty() {
            return Err(SimError::validation("id", "must not be empty"));
        }
        if name.is_empty() {
            return Err(SimError::validation("name", "must not be empty"));
        }
        let size_kb = positive("size_kb", size_kb)?;
        let cpu_total_ms = positive("cpu_total_ms", cpu_total_ms)?;
        let arrival_ms = Millis::try_from(arrival_ms)
            .map_err(|_| SimError::validation("arrival_ms", format!("{arrival_ms} must be >= 0")))?;

        Ok(Self {
            id: id.to_owned(),
            name: name.to_owned(),
            size_kb,
            cpu_total_ms,
            arrival_ms,
            cpu_remaining_ms: cpu_total_ms,
            first_run_ms: None,
            completion_ms: None,
            state: ProcessState::NotArrived,
        })
    }

    /// Runs the process for up to `delta_ms` starting at `now`, returning the
    /// time actually executed.
    pub fn run_for(&mut self, delta_ms: Millis, now: Millis) -> Result<Millis, SimError> {
        if delta_ms == 0 {
            return Err(SimError::validation("delta_ms", "must be > 0"));
        }
        if self.is_complete() {
            return Err(SimError::Invariant(format!(
                "process {} executed after completing",
                self.id
            )));
        }

        if self.first_run_ms.is_none() {
            self.first_run_ms = Some(now);
        }
        let executed = cmp::min(delta_ms, self.cpu_remaining_ms);
        self.cpu_remaining_ms -= executed;
        if self.cpu_remaining_ms == 0 {
            self.completion_ms = Some(now + executed);
        }
        Ok(executed)
    }

    pub fn is_complete(&self) -> bool {
        self.cpu_remaining_ms == 0
    }

    pub fn response_time(&self) -> Option<Millis> {
        self.first_run_ms?.checked_sub(self.arrival_ms)
    }

    pub fn turnaround_time(&self) -> Option<Millis> {
        self.completion_ms?.checked_sub(self.arrival_ms)
    }

    pub fn wait_time(&self) -> Option<Millis> {
        self.turnaround_time()?.checked_sub(self.cpu_total_ms)
    }

    pub(crate) fn transition(&mut self, next: ProcessState) -> Result<(), SimError> {
        if !self.state.can_become(next) {
            return Err(SimError::Invariant(format!(
                "process {} cannot go from {:?} to {:?}",
                self.id, self.state, next
            )));
        }
        if next == ProcessState::Terminated && !self.is_complete() {
            return Err(SimError::Invariant(format!(
                "process {} terminated with {}ms of CPU left",
                self.id, self.cpu_remaining_ms
            )));
        }
        self.state = next;
        Ok(())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size_kb(&self) -> Kilobytes {
        self.size_kb
    }

    pub fn cpu_total_ms(&self) -> Millis {
        self.cpu_total_ms
    }

    pub fn cpu_remaining_ms(&self) -> Millis {
        self.cpu_remaining_ms
    }

    pub fn arrival_ms(&self) -> Millis {
        self.arrival_ms
    }

    pub fn first_run_ms(&self) -> Option<Millis> {
        self.first_run_ms
    }

    pub fn completion_ms(&self) -> Option<Millis> {
        self.completion_ms
    }

    pub fn state(&self) -> ProcessState {
        self.state
    }
}

impl Identified for ProcessRecord {
    fn id(&self) -> &str {
        &self.id
    }
}

fn positive(field: &'static str, value: i64) -> Result<u64, SimError> {
    match u64::try_from(value) {
        Ok(v) if v > 0 => Ok(v),
        _ => Err(SimError::validation(field, format!("{value} must be > 0"))),
    }
}
