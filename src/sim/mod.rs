pub mod driver;
pub mod ingest;
pub mod job;

pub use driver::Sim;
pub use ingest::Prompter;
pub use job::{ProcessSpec, RandomWorkload, Workload};
