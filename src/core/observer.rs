use super::event::{QueueChange, SimEvent};
use std::io::Write;

/// Receives every queue and memory mutation, in the order it happens.
pub trait Observer {
    fn on_event(&mut self, event: &SimEvent);
}

impl<O: Observer + ?Sized> Observer for &mut O {
    fn on_event(&mut self, event: &SimEvent) {
        (**self).on_event(event)
    }
}

#[derive(Debug, Default)]
pub struct NullObserver;

impl Observer for NullObserver {
    fn on_event(&mut self, _event: &SimEvent) {}
}

/// Keeps the full trace in memory.
#[derive(Debug, Default, Clone)]
pub struct EventLog {
    events: Vec<SimEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[SimEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<SimEvent> {
        self.events
    }
}

impl Observer for EventLog {
    fn on_event(&mut self, event: &SimEvent) {
        self.events.push(event.clone());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObserverConfig {
    /// Wrap output in ANSI color codes
    pub color: bool,
    /// Print a blank line after every trace line
    pub spacer: bool,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            color: true,
            spacer: true,
        }
    }
}

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const BLUE: &str = "\x1b[34m";
const MAGENTA: &str = "\x1b[35m";
const CYAN: &str = "\x1b[36m";
const WHITE: &str = "\x1b[37m";

/// Renders the trace as human-readable lines.
pub struct ConsoleObserver<W: Write> {
    out: W,
    config: ObserverConfig,
    write_failed: bool,
}

impl<W: Write> ConsoleObserver<W> {
    pub fn new(out: W, config: ObserverConfig) -> Self {
        Self {
            out,
            config,
            write_failed: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn paint(&self, style: &[&str], text: &str) -> String {
        if !self.config.color {
            return text.to_owned();
        }
        format!("{}{}{}", style.concat(), text, RESET)
    }

    fn render(&self, event: &SimEvent) -> String {
        match event {
            SimEvent::Heading { text } => self.paint(&[BOLD, CYAN], text),
            SimEvent::QueueSnapshot { queue, change, ids } => {
                let title = match change {
                    Some(QueueChange::Arrived { at, id }) => {
                        format!("t={}: {} arrives -> {}", at, id, queue.label())
                    }
                    Some(QueueChange::Admitted { at, id }) => {
                        format!("t={}: {} leaves for memory -> {}", at, id, queue.label())
                    }
                    Some(QueueChange::Dispatched { at, id }) => {
                        format!("t={}: {} dispatched -> {}", at, id, queue.label())
                    }
                    None => queue.label().to_owned(),
                };
                let items = ids
                    .iter()
                    .map(|id| self.paint(&[BOLD], id))
                    .collect::<Vec<_>>()
                    .join(&self.paint(&[BLUE], ", "));
                format!(
                    "{} = {}{}{}",
                    self.paint(&[BLUE], &title),
                    self.paint(&[BLUE], "["),
                    items,
                    self.paint(&[BLUE], "]")
                )
            }
            SimEvent::CpuTick {
                at,
                id,
                remaining_before_ms,
                executed_ms,
            } => self.paint(
                &[WHITE],
                &format!(
                    "t={}: CPU {:<6} -> remaining={}ms",
                    at,
                    id,
                    remaining_before_ms.saturating_sub(*executed_ms)
                ),
            ),
            SimEvent::QuantumExpired {
                at,
                id,
                remaining_ms,
            } => self.paint(
                &[RED, BOLD],
                &format!(
                    "t={}: Quantum expires for {} (remaining={}ms) -> back to 'Ready'",
                    at, id, remaining_ms
                ),
            ),
            SimEvent::Terminated { at, id } => {
                self.paint(&[GREEN, BOLD], &format!("t={}: TERMINATED {}", at, id))
            }
            SimEvent::MemoryLoaded {
                at,
                id,
                size_kb,
                free_kb,
            } => self.paint(
                &[YELLOW, BOLD],
                &format!(
                    "t={}: LOAD {} (size={}KB) -> free={}KB",
                    at, id, size_kb, free_kb
                ),
            ),
            SimEvent::MemoryReleased {
                at,
                id,
                size_kb,
                free_kb,
            } => self.paint(
                &[MAGENTA, BOLD],
                &format!(
                    "t={}: RELEASE {} (size={}KB) -> free={}KB",
                    at, id, size_kb, free_kb
                ),
            ),
        }
    }
}

impl<W: Write> Observer for ConsoleObserver<W> {
    fn on_event(&mut self, event: &SimEvent) {
        if self.write_failed {
            return;
        }
        let line = self.render(event);
        let result = writeln!(self.out, "{}", line).and_then(|_| {
            if self.config.spacer {
                writeln!(self.out)
            } else {
                Ok(())
            }
        });
        // Losing the trace must not abort the simulation.
        if let Err(err) = result {
            log::warn!("trace output failed, further events dropped: {err}");
            self.write_failed = true;
        }
    }
}
