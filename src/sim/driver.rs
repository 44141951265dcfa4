use super::job::Workload;
use crate::{
    core::{
        driver::Scheduler,
        error::SimError,
        observer::Observer,
        state::{ProcessRecord, SimConfig},
    },
    metrics::RunSummary,
};

/// A validated workload, ready to be simulated.
pub struct Sim {
    config: SimConfig,
    processes: Vec<ProcessRecord>,
}

impl Sim {
    pub fn new(workload: &Workload) -> Result<Self, SimError> {
        let mut processes = workload.validate()?;
        processes.sort_by_key(ProcessRecord::arrival_ms);
        Ok(Self {
            config: workload.config,
            processes,
        })
    }

    pub fn config(&self) -> SimConfig {
        self.config
    }

    /// Processes in arrival order (ties keep input order).
    pub fn processes(&self) -> &[ProcessRecord] {
        &self.processes
    }

    pub fn run<O: Observer>(self, observer: O) -> Result<RunSummary, SimError> {
        let outcome = Scheduler::new(self.processes, self.config, observer)?.run()?;
        Ok(RunSummary::from_run(&outcome.finished, outcome.makespan_ms))
    }
}
