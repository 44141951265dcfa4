use super::{
    error::SimError,
    event::{QueueChange, QueueKind, SimEvent},
    memory::MemoryPool,
    observer::Observer,
    queue::FifoQueue,
    state::{Millis, ProcessRecord, ProcessState, SimConfig},
};
use log::{debug, info, trace};
use std::{iter::Peekable, vec};

/// What a finished run hands back.
#[derive(Debug)]
pub struct RunOutcome<O> {
    /// Terminated processes, in completion order
    pub finished: Vec<ProcessRecord>,
    /// Clock value when the last process terminated
    pub makespan_ms: Millis,
    /// Pool state after the last release
    pub memory: MemoryPool,
    pub observer: O,
}

/// Single-CPU Round-Robin scheduler with strict FIFO memory admission.
pub struct Scheduler<O: Observer> {
    config: SimConfig,
    now: Millis,
    // Sorted by arrival; ties keep input order
    pending: Peekable<vec::IntoIter<ProcessRecord>>,
    ready: FifoQueue<ProcessRecord>,
    execution: FifoQueue<ProcessRecord>,
    memory: MemoryPool,
    finished: Vec<ProcessRecord>,
    observer: O,
}

impl<O: Observer> Scheduler<O> {
    pub fn new(
        mut processes: Vec<ProcessRecord>,
        config: SimConfig,
        observer: O,
    ) -> Result<Self, SimError> {
        config.validate()?;
        let memory = MemoryPool::new(config.total_memory_kb)?;

        for process in &processes {
            if process.state() != ProcessState::NotArrived {
                return Err(SimError::validation(
                    "processes",
                    format!("{} was already scheduled ({:?})", process.id(), process.state()),
                ));
            }
            // An oversized head would block Ready forever.
            if process.size_kb() > config.total_memory_kb {
                return Err(SimError::Oversized {
                    id: process.id().to_owned(),
                    size_kb: process.size_kb(),
                    total_kb: config.total_memory_kb,
                });
            }
        }
        // Stable: equal arrivals keep their input order.
        processes.sort_by_key(ProcessRecord::arrival_ms);

        Ok(Self {
            config,
            now: 0,
            finished: Vec::with_capacity(processes.len()),
            pending: processes.into_iter().peekable(),
            ready: FifoQueue::new(),
            execution: FifoQueue::new(),
            memory,
            observer,
        })
    }

    pub fn run(mut self) -> Result<RunOutcome<O>, SimError> {
        info!(
            "simulation start: memory={}KB quantum={}ms",
            self.config.total_memory_kb, self.config.quantum_ms
        );
        self.heading("====== SIMULATION START ======");

        loop {
            self.admit_arrivals()?;
            self.admit_to_memory()?;
            self.audit(None)?;

            if !self.execution.is_empty() {
                self.run_slice()?;
                continue;
            }

            if self.ready.is_empty() {
                match self.pending.peek() {
                    Some(next) => {
                        let next_arrival = next.arrival_ms();
                        debug!("t={}: idle until t={}", self.now, next_arrival);
                        self.now = self.now.max(next_arrival);
                        continue;
                    }
                    None => break,
                }
            }

            // Nothing is resident, so the head of Ready had the whole pool.
            let head = self
                .ready
                .peek_front()
                .map_err(|_| SimError::EmptyQueue {
                    queue: QueueKind::Ready,
                })?;
            return Err(SimError::Invariant(format!(
                "{} ({}KB) cannot be admitted into an empty {}KB pool",
                head.id(),
                head.size_kb(),
                self.memory.total_kb()
            )));
        }

        self.heading("====== END ======");
        info!(
            "simulation finished at t={} with {} processes",
            self.now,
            self.finished.len()
        );
        Ok(RunOutcome {
            finished: self.finished,
            makespan_ms: self.now,
            memory: self.memory,
            observer: self.observer,
        })
    }

    /// Moves every process whose arrival time has been reached into Ready.
    fn admit_arrivals(&mut self) -> Result<(), SimError> {
        while let Some(mut process) = self.pending.next_if(|p| p.arrival_ms() <= self.now) {
            process.transition(ProcessState::Ready)?;
            let id = process.id().to_owned();
            self.ready.enqueue(process);

            self.snapshot(
                QueueKind::Ready,
                Some(QueueChange::Arrived { at: self.now, id }),
            );
            self.snapshot(QueueKind::Execution, None);
        }
        Ok(())
    }

    /// Strict FIFO: stops at the first head that does not fit, even if a
    /// later process would.
    fn admit_to_memory(&mut self) -> Result<(), SimError> {
        while let Ok(head) = self.ready.peek_front() {
            if !self.memory.can_fit(head) {
                trace!(
                    "t={}: {} ({}KB) blocked, {}KB free",
                    self.now,
                    head.id(),
                    head.size_kb(),
                    self.memory.free_kb()
                );
                break;
            }

            let mut process = self.ready.dequeue().map_err(|_| SimError::EmptyQueue {
                queue: QueueKind::Ready,
            })?;
            self.snapshot(
                QueueKind::Ready,
                Some(QueueChange::Admitted {
                    at: self.now,
                    id: process.id().to_owned(),
                }),
            );

            self.memory.load(&process, self.now, &mut self.observer)?;
            process.transition(ProcessState::ReadyInMemory)?;
            self.execution.enqueue(process);
            self.snapshot(QueueKind::Execution, None);
        }
        Ok(())
    }

    /// Gives the head of the execution queue one quantum, 1ms at a time.
    fn run_slice(&mut self) -> Result<(), SimError> {
        let mut current = self.execution.dequeue().map_err(|_| SimError::EmptyQueue {
            queue: QueueKind::Execution,
        })?;
        current.transition(ProcessState::Running)?;
        self.snapshot(
            QueueKind::Execution,
            Some(QueueChange::Dispatched {
                at: self.now,
                id: current.id().to_owned(),
            }),
        );

        let remaining_before_ms = current.cpu_remaining_ms();
        let ticks = self.config.quantum_ms.min(remaining_before_ms);
        debug!(
            "t={}: dispatch {} for {}ms ({}ms left)",
            self.now,
            current.id(),
            ticks,
            remaining_before_ms
        );

        for executed_ms in 1..=ticks {
            current.run_for(1, self.now)?;
            self.now += 1;
            self.observer.on_event(&SimEvent::CpuTick {
                at: self.now,
                id: current.id().to_owned(),
                remaining_before_ms,
                executed_ms,
            });

            self.admit_arrivals()?;
            self.admit_to_memory()?;
            self.audit(Some(&current))?;

            if current.is_complete() {
                break;
            }
        }

        self.memory.release(&current, self.now, &mut self.observer)?;
        if current.is_complete() {
            current.transition(ProcessState::Terminated)?;
            self.observer.on_event(&SimEvent::Terminated {
                at: self.now,
                id: current.id().to_owned(),
            });
            self.finished.push(current);
        } else {
            current.transition(ProcessState::Ready)?;
            self.observer.on_event(&SimEvent::QuantumExpired {
                at: self.now,
                id: current.id().to_owned(),
                remaining_ms: current.cpu_remaining_ms(),
            });
            self.ready.enqueue(current);
            self.snapshot(QueueKind::Ready, None);
        }
        Ok(())
    }

    /// Cross-checks pool accounting against queue membership.
    fn audit(&self, running: Option<&ProcessRecord>) -> Result<(), SimError> {
        let resident_kb: u64 = self
            .execution
            .iter()
            .chain(running)
            .map(ProcessRecord::size_kb)
            .sum();
        if self.memory.free_kb() + resident_kb != self.memory.total_kb() {
            return Err(SimError::Invariant(format!(
                "free {}KB + resident {}KB != total {}KB",
                self.memory.free_kb(),
                resident_kb,
                self.memory.total_kb()
            )));
        }

        let resident_count = self.execution.len() + usize::from(running.is_some());
        if self.memory.resident_count() != resident_count {
            return Err(SimError::Invariant(format!(
                "pool tracks {} resident processes, queues hold {}",
                self.memory.resident_count(),
                resident_count
            )));
        }

        if let Some(p) = self
            .ready
            .iter()
            .find(|p| self.memory.is_resident(p.id()))
        {
            return Err(SimError::Invariant(format!(
                "{} is in Ready but still holds memory",
                p.id()
            )));
        }
        Ok(())
    }

    fn snapshot(&mut self, queue: QueueKind, change: Option<QueueChange>) {
        let ids = match queue {
            QueueKind::Ready => self.ready.ids(),
            QueueKind::Execution => self.execution.ids(),
        };
        self.observer
            .on_event(&SimEvent::QueueSnapshot { queue, change, ids });
    }

    fn heading(&mut self, text: &str) {
        self.observer.on_event(&SimEvent::Heading {
            text: text.to_owned(),
        });
    }
}
