use super::{event::QueueKind, state::Kilobytes};
use std::fmt;

#[derive(Debug)]
pub enum SimError {
    /// A construction or call argument is out of range
    Validation { field: &'static str, reason: String },

    /// dequeue/peek on an empty queue the scheduler believed was populated
    EmptyQueue { queue: QueueKind },

    /// load() for a process that does not fit in the free capacity
    Capacity {
        id: String,
        size_kb: Kilobytes,
        free_kb: Kilobytes,
    },

    /// release() for a process that holds no memory
    NotResident { id: String },

    /// load() for a process that already holds memory
    AlreadyResident { id: String },

    /// Two processes in one workload share an id
    DuplicateId { id: String },

    /// A process can never be admitted because it exceeds total memory
    Oversized {
        id: String,
        size_kb: Kilobytes,
        total_kb: Kilobytes,
    },

    /// Internal consistency check failed
    Invariant(String),

    Io(std::io::Error),

    /// Workload file could not be parsed
    Workload(serde_json::Error),
}

impl SimError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        SimError::Validation {
            field,
            reason: reason.into(),
        }
    }

    /// True for errors that signal a broken engine rather than bad input.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            SimError::EmptyQueue { .. }
                | SimError::Capacity { .. }
                | SimError::NotResident { .. }
                | SimError::AlreadyResident { .. }
                | SimError::Invariant(_)
        )
    }
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::Validation { field, reason } => {
                write!(f, "invalid {}: {}", field, reason)
            }
            SimError::EmptyQueue { queue } => {
                write!(f, "'{}' queue unexpectedly empty", queue.label())
            }
            SimError::Capacity {
                id,
                size_kb,
                free_kb,
            } => write!(
                f,
                "process {} ({}KB) does not fit in {}KB of free memory",
                id, size_kb, free_kb
            ),
            SimError::NotResident { id } => {
                write!(f, "release of process {} which is not in memory", id)
            }
            SimError::AlreadyResident { id } => {
                write!(f, "process {} is already loaded in memory", id)
            }
            SimError::DuplicateId { id } => write!(f, "duplicate process id {}", id),
            SimError::Oversized {
                id,
                size_kb,
                total_kb,
            } => write!(
                f,
                "process {} needs {}KB but total memory is {}KB; it could never be admitted",
                id, size_kb, total_kb
            ),
            SimError::Invariant(msg) => write!(f, "invariant violated: {}", msg),
            SimError::Io(err) => write!(f, "I/O error: {}", err),
            SimError::Workload(err) => write!(f, "malformed workload: {}", err),
        }
    }
}

impl std::error::Error for SimError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimError::Io(err) => Some(err),
            SimError::Workload(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SimError {
    fn from(err: std::io::Error) -> Self {
        SimError::Io(err)
    }
}

impl From<serde_json::Error> for SimError {
    fn from(err: serde_json::Error) -> Self {
        SimError::Workload(err)
    }
}

