//! The Sequencer: read N, fork, print Fibonacci in the child, wait in the parent
//!
//! ```text
//! prompt → read N → spawn ─┬─ child:  identity, Fibonacci(N), exit 0
//!                          ├─ parent: identity, join(child), report
//!                          └─ failed: "Fork failed.", exit 1
//! ```
//!
//! Output of the two processes may interleave, but never inside a line: the
//! child buffers everything it prints and writes it as one block on exit, and
//! each parent line goes out in a single write. The parent's final line always
//! comes after the child's block because it is written only once the child
//! has been reaped.

use crate::config::Config;
use crate::error::{ProcessError, SequencerError};
use crate::input::read_term_count;
use crate::process::{ExitStatus, Pid, ProcessIdentity, RawStdout, Worker, spawn};
use fibfork_core::{Overflow, emit};
use std::io::{self, BufRead, BufWriter, Write};
use tracing::{debug, error, warn};

pub const PROMPT: &str = "Enter the number of Fibonacci terms: ";

/// Child output buffer; larger outputs are written in several blocks
const CHILD_BUFFER: usize = 64 * 1024;

/// Result of a completed run, as seen by the parent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    /// Pid of the child that printed the sequence
    pub child: Pid,
    /// How the child terminated
    pub status: ExitStatus,
}

#[derive(Debug, Clone, Default)]
pub struct Sequencer {
    config: Config,
}

/// What the child process runs
struct ChildTask {
    n: i32,
    overflow: Overflow,
}

impl ChildTask {
    fn run(self) -> i32 {
        let identity = ProcessIdentity::current();
        let mut out = BufWriter::with_capacity(CHILD_BUFFER, RawStdout);
        match write_child(&mut out, identity, self.n, self.overflow) {
            Ok(()) => 0,
            Err(e) => {
                error!("child failed to write output: {}", e);
                1
            }
        }
    }
}

impl Sequencer {
    pub fn new(config: Config) -> Self {
        Sequencer { config }
    }

    /// Run one read → spawn → wait cycle
    ///
    /// Only the parent returns from this call. A spawn failure prints
    /// `Fork failed.` before the error is returned.
    pub fn run<R: BufRead>(&self, input: R) -> Result<Outcome, SequencerError> {
        self.run_with(input, &mut io::stdout(), |task| {
            spawn(move || task.run())
        })
    }

    fn run_with<R, W, S>(&self, input: R, out: &mut W, spawner: S) -> Result<Outcome, SequencerError>
    where
        R: BufRead,
        W: Write,
        S: FnOnce(ChildTask) -> Result<Worker, ProcessError>,
    {
        if self.config.prompt {
            write!(out, "{}", PROMPT)?;
            out.flush()?;
        }

        let task = ChildTask {
            n: read_term_count(input),
            overflow: self.config.overflow,
        };

        let worker = match spawner(task) {
            Ok(worker) => worker,
            Err(e) => {
                let _ = write_fork_failed(out);
                return Err(e.into());
            }
        };
        let child = worker.pid();

        // Join even if our own line could not be written, or the child is orphaned
        let announced = write_parent_started(out, ProcessIdentity::current());
        let status = worker.join()?;
        announced?;

        if status.success() {
            debug!(child, "child completed");
        } else {
            warn!(child, %status, "child terminated abnormally");
        }

        write_parent_waited(out, child)?;
        Ok(Outcome { child, status })
    }
}

/// Everything the child prints: its identity, the sequence, the exit notice
pub fn write_child<W: Write>(
    out: &mut W,
    identity: ProcessIdentity,
    n: i32,
    overflow: Overflow,
) -> io::Result<()> {
    writeln!(out, "Child process started (PID: {})", identity.pid())?;
    writeln!(out, "Parent PID from child process: {}", identity.parent_pid())?;
    emit(out, n, overflow)?;
    writeln!(out, "Child process exiting.")?;
    out.flush()
}

pub fn write_parent_started<W: Write>(out: &mut W, identity: ProcessIdentity) -> io::Result<()> {
    write_line(
        out,
        &format!("Parent process started (PID: {})\n", identity.pid()),
    )
}

pub fn write_parent_waited<W: Write>(out: &mut W, child: Pid) -> io::Result<()> {
    write_line(
        out,
        &format!(
            "Parent process waited for child (PID: {}) to complete.\n",
            child
        ),
    )
}

pub fn write_fork_failed<W: Write>(out: &mut W) -> io::Result<()> {
    write_line(out, "Fork failed.\n")
}

// One write_all so a line-buffered stdout issues a single write for the line
fn write_line<W: Write>(out: &mut W, line: &str) -> io::Result<()> {
    out.write_all(line.as_bytes())?;
    out.flush()
}
