use crate::core::state::{Kilobytes, Millis};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueKind {
    /// Arrived but not memory-resident
    Ready,
    /// Memory-resident, waiting for the CPU
    Execution,
}

impl QueueKind {
    pub fn label(&self) -> &'static str {
        match self {
            QueueKind::Ready => "Ready",
            QueueKind::Execution => "Ready for execution",
        }
    }
}

/// The queue mutation that triggered a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "cause", rename_all = "snake_case")]
pub enum QueueChange {
    Arrived { at: Millis, id: String },
    // Left Ready to be loaded into memory
    Admitted { at: Millis, id: String },
    Dispatched { at: Millis, id: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SimEvent {
    Heading {
        text: String,
    },
    QueueSnapshot {
        queue: QueueKind,
        change: Option<QueueChange>,
        ids: Vec<String>,
    },
    // `executed_ms` counts the CPU time used so far in the current slice
    CpuTick {
        at: Millis,
        id: String,
        remaining_before_ms: Millis,
        executed_ms: Millis,
    },
    QuantumExpired {
        at: Millis,
        id: String,
        remaining_ms: Millis,
    },
    Terminated {
        at: Millis,
        id: String,
    },
    MemoryLoaded {
        at: Millis,
        id: String,
        size_kb: Kilobytes,
        free_kb: Kilobytes,
    },
    MemoryReleased {
        at: Millis,
        id: String,
        size_kb: Kilobytes,
        free_kb: Kilobytes,
    },
}
