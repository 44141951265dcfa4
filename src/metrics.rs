use crate::core::state::{Millis, ProcessRecord};
use average::{Estimate, Mean};
use serde::Serialize;
use std::fmt;

pub struct MetricsCalculator;

impl MetricsCalculator {
    /// Mean of `selector` over the processes where it is defined; 0.0 if none are.
    pub fn average<F>(processes: &[ProcessRecord], selector: F) -> f64
    where
        F: Fn(&ProcessRecord) -> Option<Millis>,
    {
        let mean: Mean = processes
            .iter()
            .filter_map(selector)
            .map(|v| v as f64)
            .collect();
        if mean.is_empty() { 0.0 } else { mean.estimate() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessOutcome {
    pub id: String,
    pub name: String,
    pub size_kb: u64,
    pub arrival_ms: Millis,
    pub cpu_total_ms: Millis,
    pub first_run_ms: Option<Millis>,
    pub completion_ms: Option<Millis>,
    pub response_ms: Option<Millis>,
    pub turnaround_ms: Option<Millis>,
    pub wait_ms: Option<Millis>,
}

impl From<&ProcessRecord> for ProcessOutcome {
    fn from(p: &ProcessRecord) -> Self {
        Self {
            id: p.id().to_owned(),
            name: p.name().to_owned(),
            size_kb: p.size_kb(),
            arrival_ms: p.arrival_ms(),
            cpu_total_ms: p.cpu_total_ms(),
            first_run_ms: p.first_run_ms(),
            completion_ms: p.completion_ms(),
            response_ms: p.response_time(),
            turnaround_ms: p.turnaround_time(),
            wait_ms: p.wait_time(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub avg_response_ms: f64,
    pub avg_turnaround_ms: f64,
    pub avg_wait_ms: f64,
    pub makespan_ms: Millis,
    /// In completion order
    pub processes: Vec<ProcessOutcome>,
}

impl RunSummary {
    pub fn from_run(processes: &[ProcessRecord], makespan_ms: Millis) -> Self {
        Self {
            avg_response_ms: MetricsCalculator::average(processes, ProcessRecord::response_time),
            avg_turnaround_ms: MetricsCalculator::average(
                processes,
                ProcessRecord::turnaround_time,
            ),
            avg_wait_ms: MetricsCalculator::average(processes, ProcessRecord::wait_time),
            makespan_ms,
            processes: processes.iter().map(ProcessOutcome::from).collect(),
        }
    }
}

fn opt(v: Option<Millis>) -> String {
    v.map_or_else(|| "-".to_owned(), |v| v.to_string())
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<8} {:<10} {:>8} {:>8} {:>10} {:>10} {:>6}",
            "ID", "NAME", "ARRIVAL", "FINISH", "RESPONSE", "TURNAROUND", "WAIT"
        )?;
        for p in &self.processes {
            writeln!(
                f,
                "{:<8} {:<10} {:>8} {:>8} {:>10} {:>10} {:>6}",
                p.id,
                p.name,
                p.arrival_ms,
                opt(p.completion_ms),
                opt(p.response_ms),
                opt(p.turnaround_ms),
                opt(p.wait_ms)
            )?;
        }
        writeln!(f)?;
        writeln!(f, "Total time         : {} ms", self.makespan_ms)?;
        writeln!(f, "Average RESPONSE   : {:.2} ms", self.avg_response_ms)?;
        writeln!(f, "Average TURNAROUND : {:.2} ms", self.avg_turnaround_ms)?;
        write!(f, "Average WAIT       : {:.2} ms", self.avg_wait_ms)
    }
}
