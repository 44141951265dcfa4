use super::{
    error::SimError,
    event::SimEvent,
    observer::Observer,
    state::{Kilobytes, Millis, ProcessRecord},
};
use rustc_hash::FxHashSet;

/// Flat memory pool: one total capacity, no partitions.
///
/// The pool remembers which process ids currently hold memory, so a release
/// without a matching load (or a second load) fails instead of silently
/// corrupting `free_kb`.
#[derive(Debug)]
pub struct MemoryPool {
    total_kb: Kilobytes,
    free_kb: Kilobytes,
    resident: FxHashSet<String>,
}

impl MemoryPool {
    pub fn new(total_kb: Kilobytes) -> Result<Self, SimError> {
        if total_kb == 0 {
            return Err(SimError::validation("total_memory_kb", "must be > 0"));
        }
        Ok(Self {
            total_kb,
            free_kb: total_kb,
            resident: FxHashSet::default(),
        })
    }

    pub fn can_fit(&self, process: &ProcessRecord) -> bool {
        process.size_kb() <= self.free_kb
    }

    pub fn load<O: Observer + ?Sized>(
        &mut self,
        process: &ProcessRecord,
        at: Millis,
        observer: &mut O,
    ) -> Result<(), SimError> {
        if !self.can_fit(process) {
            return Err(SimError::Capacity {
                id: process.id().to_owned(),
                size_kb: process.size_kb(),
                free_kb: self.free_kb,
            });
        }
        if !self.resident.insert(process.id().to_owned()) {
            return Err(SimError::AlreadyResident {
                id: process.id().to_owned(),
            });
        }

        self.free_kb -= process.size_kb();
        observer.on_event(&SimEvent::MemoryLoaded {
            at,
            id: process.id().to_owned(),
            size_kb: process.size_kb(),
            free_kb: self.free_kb,
        });
        Ok(())
    }

    pub fn release<O: Observer + ?Sized>(
        &mut self,
        process: &ProcessRecord,
        at: Millis,
        observer: &mut O,
    ) -> Result<(), SimError> {
        if !self.resident.remove(process.id()) {
            return Err(SimError::NotResident {
                id: process.id().to_owned(),
            });
        }
        let free_kb = self.free_kb + process.size_kb();
        if free_kb > self.total_kb {
            return Err(SimError::Invariant(format!(
                "releasing {} would raise free memory to {}KB of {}KB",
                process.id(),
                free_kb,
                self.total_kb
            )));
        }

        self.free_kb = free_kb;
        observer.on_event(&SimEvent::MemoryReleased {
            at,
            id: process.id().to_owned(),
            size_kb: process.size_kb(),
            free_kb: self.free_kb,
        });
        Ok(())
    }

    pub fn total_kb(&self) -> Kilobytes {
        self.total_kb
    }

    pub fn free_kb(&self) -> Kilobytes {
        self.free_kb
    }

    pub fn used_kb(&self) -> Kilobytes {
        self.total_kb - self.free_kb
    }

    pub fn is_resident(&self, id: &str) -> bool {
        self.resident.contains(id)
    }

    pub fn resident_count(&self) -> usize {
        self.resident.len()
    }
}
