//! fibfork Runtime: parent/child process lifecycle around a Fibonacci child
//!
//! Key design principles:
//! - Process duplication is a spawn/join API: the parent holds a `Worker`
//!   for the exact child it created and waits on that pid only
//! - Process identity is read through `ProcessIdentity`, never ad hoc
//! - Standard output carries only the program's lines; logs go to stderr
//!
//! # Modules
//!
//! - `process`: `spawn`, `Worker::join`, `ProcessIdentity`
//! - `input`: reading the term count from a `BufRead`
//! - `config`: TOML configuration
//! - `logging`: tracing subscriber setup
//! - `sequencer`: the read → spawn → child/parent → wait flow
//! - `error`: error types shared by the modules above

pub mod config;
pub mod error;
pub mod input;
pub mod logging;
pub mod process;
pub mod sequencer;

pub use config::Config;
pub use error::{ConfigError, ProcessError, SequencerError};
pub use process::{ExitStatus, ProcessIdentity, Worker, spawn};
pub use sequencer::{Outcome, Sequencer};

// Overflow policy appears in `Config`
pub use fibfork_core::Overflow;
