//! Runtime error types
//!
//! Each concern has its own enum so callers can match on what went wrong;
//! `SequencerError` wraps the ones a run can hit and is what the binary turns
//! into an exit code. Bad term count input is not an error (see `input`).

use std::io;
use std::path::PathBuf;

/// Failure to create or reap a child process
#[derive(Debug)]
pub enum ProcessError {
    /// The OS refused to duplicate the process (typically resource exhaustion)
    Spawn(io::Error),
    /// Waiting on the spawned child failed
    Wait(io::Error),
}

impl std::fmt::Display for ProcessError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessError::Spawn(e) => write!(f, "fork failed: {}", e),
            ProcessError::Wait(e) => write!(f, "waitpid failed: {}", e),
        }
    }
}

impl std::error::Error for ProcessError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProcessError::Spawn(e) | ProcessError::Wait(e) => Some(e),
        }
    }
}

/// Failure to load the configuration file
#[derive(Debug)]
pub enum ConfigError {
    Read { path: PathBuf, source: io::Error },
    Parse(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Read { path, source } => {
                write!(f, "failed to read config {}: {}", path.display(), source)
            }
            ConfigError::Parse(msg) => write!(f, "failed to parse config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Anything that can stop a sequencer run
#[derive(Debug)]
pub enum SequencerError {
    Process(ProcessError),
    /// Writing to standard output failed
    Output(io::Error),
}

impl SequencerError {
    /// Exit status the process should terminate with
    pub fn exit_code(&self) -> i32 {
        1
    }
}

impl std::fmt::Display for SequencerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SequencerError::Process(e) => write!(f, "{}", e),
            SequencerError::Output(e) => write!(f, "failed to write output: {}", e),
        }
    }
}

impl std::error::Error for SequencerError {}

impl From<ProcessError> for SequencerError {
    fn from(e: ProcessError) -> Self {
        SequencerError::Process(e)
    }
}

impl From<io::Error> for SequencerError {
    fn from(e: io::Error) -> Self {
        SequencerError::Output(e)
    }
}

/// Format a panic payload into an error message
pub fn format_panic_payload(payload: &Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_format_panic_payload() {
        let payload: Box<dyn std::any::Any + Send> = Box::new("panic message");
        assert_eq!(format_panic_payload(&payload), "panic message");

        let payload: Box<dyn std::any::Any + Send> = Box::new("owned panic".to_string());
        assert_eq!(format_panic_payload(&payload), "owned panic");

        let payload: Box<dyn std::any::Any + Send> = Box::new(42u8);
        assert_eq!(format_panic_payload(&payload), "unknown panic");
    }

    #[test]
    #[serial]
    fn test_spawn_error_display() {
        let err = ProcessError::Spawn(io::Error::from_raw_os_error(libc::EAGAIN));
        assert!(err.to_string().starts_with("fork failed: "));
    }

    #[test]
    #[serial]
    fn test_spawn_failure_exits_with_one() {
        let err: SequencerError =
            ProcessError::Spawn(io::Error::from_raw_os_error(libc::EAGAIN)).into();
        assert!(matches!(err, SequencerError::Process(ProcessError::Spawn(_))));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    #[serial]
    fn test_wait_failure_exits_nonzero() {
        let err: SequencerError =
            ProcessError::Wait(io::Error::from_raw_os_error(libc::ECHILD)).into();
        assert_eq!(err.exit_code(), 1);
        assert!(err.to_string().starts_with("waitpid failed: "));
    }
}
