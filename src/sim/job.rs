use crate::core::{
    error::SimError,
    state::{Kilobytes, Millis, ProcessRecord, SimConfig},
};
use rand::prelude::*;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::io::Read;

/// Upper bound on processes in one workload, whatever the input source.
pub const MAX_PROCESSES: usize = 100_000;

/// One process as entered by the user, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessSpec {
    pub id: String,
    pub name: String,
    pub size_kb: i64,
    pub cpu_ms: i64,
    pub arrival_ms: i64,
}

impl ProcessSpec {
    pub fn build(&self) -> Result<ProcessRecord, SimError> {
        ProcessRecord::new(
            &self.id,
            &self.name,
            self.size_kb,
            self.cpu_ms,
            self.arrival_ms,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workload {
    #[serde(flatten)]
    pub config: SimConfig,
    pub processes: Vec<ProcessSpec>,
}

impl Workload {
    pub fn from_json<R: Read>(reader: R) -> Result<Self, SimError> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Pre-flight checks, run before anything is scheduled.
    ///
    /// Returns the records in input order.
    pub fn validate(&self) -> Result<Vec<ProcessRecord>, SimError> {
        self.config.validate()?;
        if self.processes.len() > MAX_PROCESSES {
            return Err(SimError::validation(
                "processes",
                format!("{} exceeds the limit of {MAX_PROCESSES}", self.processes.len()),
            ));
        }

        let mut seen = FxHashSet::default();
        let mut records = Vec::with_capacity(self.processes.len());
        for spec in &self.processes {
            let record = spec.build()?;
            if !seen.insert(record.id().to_owned()) {
                return Err(SimError::DuplicateId {
                    id: record.id().to_owned(),
                });
            }
            if record.size_kb() > self.config.total_memory_kb {
                return Err(SimError::Oversized {
                    id: record.id().to_owned(),
                    size_kb: record.size_kb(),
                    total_kb: self.config.total_memory_kb,
                });
            }
            records.push(record);
        }
        Ok(records)
    }

    /// Replaces whichever config values are given, keeping the rest.
    pub fn override_config(
        &mut self,
        total_memory_kb: Option<Kilobytes>,
        quantum_ms: Option<Millis>,
    ) {
        if let Some(total_memory_kb) = total_memory_kb {
            self.config.total_memory_kb = total_memory_kb;
        }
        if let Some(quantum_ms) = quantum_ms {
            self.config.quantum_ms = quantum_ms;
        }
    }
}

/// Shape of a randomly generated workload.
#[derive(Debug, Clone, Copy)]
pub struct RandomWorkload {
    pub count: usize,
    /// Chance that a process arrives on any given millisecond
    pub p_arrival: f64,
    /// Chance that an arriving process is a short burst
    pub p_short: f64,
    pub short_ms: Millis,
    pub long_ms: Millis,
    pub max_size_kb: Kilobytes,
}

impl Default for RandomWorkload {
    fn default() -> Self {
        Self {
            count: 10,
            p_arrival: 0.3,
            p_short: 0.3,
            short_ms: 2,
            long_ms: 6,
            max_size_kb: 64,
        }
    }
}

impl RandomWorkload {
    /// Bernoulli arrivals with a two-valued burst length; reproducible per seed.
    pub fn generate(&self, config: SimConfig, seed: u64) -> Result<Workload, SimError> {
        if self.count > MAX_PROCESSES {
            return Err(SimError::validation(
                "count",
                format!("{} exceeds the limit of {MAX_PROCESSES}", self.count),
            ));
        }
        // A zero arrival chance would never produce a process.
        if !(self.p_arrival > 0.0 && self.p_arrival <= 1.0) {
            return Err(SimError::validation(
                "p_arrival",
                format!("{} must be in (0, 1]", self.p_arrival),
            ));
        }
        if !(0.0..=1.0).contains(&self.p_short) {
            return Err(SimError::validation(
                "p_short",
                format!("{} must be in [0, 1]", self.p_short),
            ));
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let max_size = self.max_size_kb.clamp(1, config.total_memory_kb.max(1));
        let mut processes = Vec::new();

        let mut t: u64 = 0;
        while processes.len() < self.count {
            if rng.random::<f64>() < self.p_arrival {
                let cpu_ms = if rng.random::<f64>() < self.p_short {
                    self.short_ms
                } else {
                    self.long_ms
                };
                let n = processes.len() + 1;
                processes.push(ProcessSpec {
                    id: format!("P{n}"),
                    name: format!("job{n}"),
                    size_kb: rng.random_range(1..=max_size) as i64,
                    cpu_ms: cpu_ms.max(1) as i64,
                    arrival_ms: t as i64,
                });
            }
            t += 1;
        }

        Ok(Workload { config, processes })
    }
}
