use super::job::{MAX_PROCESSES, ProcessSpec, Workload};
use crate::core::{
    error::SimError,
    state::{Kilobytes, SimConfig},
};
use rustc_hash::FxHashSet;
use std::io::{self, BufRead, Write};

/// Collects a workload from a terminal, re-asking until every answer is valid.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn collect_workload(&mut self) -> Result<Workload, SimError> {
        writeln!(self.output, "====== PROCESS SIMULATOR (RR) ======")?;
        let count = loop {
            let count = self.positive("Number of processes: ")?;
            if count as u64 <= MAX_PROCESSES as u64 {
                break count;
            }
            writeln!(self.output, "At most {MAX_PROCESSES} processes are supported.")?;
        };
        let total_memory_kb = self.positive("Total memory (KB): ")? as Kilobytes;
        let quantum_ms = self.positive("Quantum (ms): ")? as u64;

        let mut used = FxHashSet::default();
        let mut processes = Vec::new();
        for i in 1..=count {
            writeln!(self.output, "\n=== Process {i} ===")?;
            let id = loop {
                let id = self.text("ID: ")?;
                if used.insert(id.clone()) {
                    break id;
                }
                writeln!(self.output, "Duplicate ID, enter another.")?;
            };
            let name = self.text("Name: ")?;
            let size_kb = loop {
                let size = self.positive("Size (KB): ")?;
                if size as Kilobytes <= total_memory_kb {
                    break size;
                }
                writeln!(
                    self.output,
                    "A process larger than total memory ({total_memory_kb}KB) can never be loaded, enter a smaller size."
                )?;
            };
            let cpu_ms = self.positive("Total CPU time (ms): ")?;
            let arrival_ms = self.non_negative("Arrival time (ms): ")?;

            processes.push(ProcessSpec {
                id,
                name,
                size_kb,
                cpu_ms,
                arrival_ms,
            });
        }

        Ok(Workload {
            config: SimConfig {
                total_memory_kb,
                quantum_ms,
            },
            processes,
        })
    }

    pub fn positive(&mut self, prompt: &str) -> Result<i64, SimError> {
        self.integer(prompt, |v| v > 0)
    }

    pub fn non_negative(&mut self, prompt: &str) -> Result<i64, SimError> {
        self.integer(prompt, |v| v >= 0)
    }

    /// Non-empty, trimmed answer.
    pub fn text(&mut self, prompt: &str) -> Result<String, SimError> {
        loop {
            let line = self.read_line(prompt)?;
            if !line.is_empty() {
                return Ok(line);
            }
        }
    }

    fn integer(&mut self, prompt: &str, accept: impl Fn(i64) -> bool) -> Result<i64, SimError> {
        loop {
            match self.read_line(prompt)?.parse::<i64>() {
                Ok(v) if accept(v) => return Ok(v),
                _ => continue,
            }
        }
    }

    fn read_line(&mut self, prompt: &str) -> Result<String, SimError> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(SimError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input ended before the workload was complete",
            )));
        }
        Ok(line.trim().to_owned())
    }
}
