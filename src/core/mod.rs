pub mod driver;
pub mod error;
pub mod event;
pub mod memory;
pub mod observer;
pub mod queue;
pub mod state;

pub use driver::{RunOutcome, Scheduler};
pub use error::SimError;
pub use event::{QueueChange, QueueKind, SimEvent};
pub use memory::MemoryPool;
pub use observer::{ConsoleObserver, EventLog, NullObserver, Observer, ObserverConfig};
pub use queue::{EmptyQueueError, FifoQueue, Identified};
pub use state::{Kilobytes, Millis, ProcessRecord, ProcessState, SimConfig};
