pub mod core;
pub mod metrics;
pub mod sim;

pub use crate::core::{Observer, ProcessRecord, Scheduler, SimConfig, SimError, SimEvent};
pub use metrics::{MetricsCalculator, RunSummary};
pub use sim::{Sim, Workload};
