//! Process duplication as spawn / join
//!
//! `spawn` forks the calling process. The child runs the supplied closure and
//! exits with the code it returns; it never returns into the caller's code.
//! The parent gets a [`Worker`] naming the child, and [`Worker::join`] waits
//! on that pid specifically, so other children of the process are never
//! reaped by mistake.
//!
//! # Safety
//!
//! `fork()` in a multithreaded process only duplicates the calling thread.
//! The closure should stick to work that does not depend on locks held by
//! other threads at the moment of the fork. fibfork itself is single-threaded
//! when it spawns; tests that fork run serialized with every other test in
//! the crate. Workers should print through [`RawStdout`] rather than
//! `std::io::stdout()`, whose lock may have been held by another thread when
//! the process was duplicated.
//!
//! # Platform Support
//!
//! Unix only.

use crate::error::{ProcessError, format_panic_payload};
use std::io::{self, Write};
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, error, warn};

/// OS process identifier
pub type Pid = libc::pid_t;

/// Exit code of a worker whose closure panicked
pub const PANIC_EXIT_CODE: i32 = 101;

/// Identity of the running process as reported by the OS
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessIdentity {
    pid: Pid,
    parent_pid: Pid,
}

impl ProcessIdentity {
    /// Read the identity of the calling process
    pub fn current() -> Self {
        // getpid/getppid cannot fail
        unsafe {
            ProcessIdentity {
                pid: libc::getpid(),
                parent_pid: libc::getppid(),
            }
        }
    }

    pub fn pid(&self) -> Pid {
        self.pid
    }

    pub fn parent_pid(&self) -> Pid {
        self.parent_pid
    }
}

/// How a child terminated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// Normal exit with the given code
    Exited(i32),
    /// Killed by the given signal
    Signaled(i32),
}

impl ExitStatus {
    pub fn success(&self) -> bool {
        matches!(self, ExitStatus::Exited(0))
    }

    /// Decode a raw `waitpid` status. Stopped/continued reports yield `None`.
    fn from_raw(status: libc::c_int) -> Option<Self> {
        if libc::WIFEXITED(status) {
            Some(ExitStatus::Exited(libc::WEXITSTATUS(status)))
        } else if libc::WIFSIGNALED(status) {
            Some(ExitStatus::Signaled(libc::WTERMSIG(status)))
        } else {
            None
        }
    }
}

impl std::fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExitStatus::Exited(code) => write!(f, "exit code {}", code),
            ExitStatus::Signaled(sig) => write!(f, "signal {}", sig),
        }
    }
}

/// Handle to a spawned child process
///
/// Dropping a `Worker` without joining leaves the child to be reaped by
/// whoever inherits it.
#[derive(Debug)]
#[must_use = "a worker that is never joined becomes a zombie until the parent exits"]
pub struct Worker {
    pid: Pid,
}

impl Worker {
    /// Identifier of the child process
    pub fn pid(&self) -> Pid {
        self.pid
    }

    /// Block until this worker's process terminates
    ///
    /// Retries when the wait is interrupted by a signal.
    pub fn join(self) -> Result<ExitStatus, ProcessError> {
        let mut status: libc::c_int = 0;
        loop {
            let rc = unsafe { libc::waitpid(self.pid, &mut status, 0) };
            if rc == -1 {
                let err = io::Error::last_os_error();
                if err.kind() == io::ErrorKind::Interrupted {
                    continue;
                }
                return Err(ProcessError::Wait(err));
            }
            if let Some(exit) = ExitStatus::from_raw(status) {
                debug!(pid = self.pid, status = %exit, "worker reaped");
                return Ok(exit);
            }
        }
    }
}

/// Unbuffered writer on file descriptor 1
///
/// Bypasses `std::io::stdout()` and its process-wide lock. Every `write` is
/// one `write(2)` call, so wrap it in a `BufWriter` to batch output.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawStdout;

impl Write for RawStdout {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        loop {
            let rc = unsafe {
                libc::write(
                    libc::STDOUT_FILENO,
                    buf.as_ptr() as *const libc::c_void,
                    buf.len(),
                )
            };
            if rc >= 0 {
                return Ok(rc as usize);
            }
            let err = io::Error::last_os_error();
            if err.kind() != io::ErrorKind::Interrupted {
                return Err(err);
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Fork the current process and run `work` in the child
///
/// Returns the parent's handle to the child. Standard output is flushed first
/// so text buffered before the fork is not written by both processes. The
/// child exits without flushing anything on its own; `work` must flush what it
/// writes.
pub fn spawn<F>(work: F) -> Result<Worker, ProcessError>
where
    F: FnOnce() -> i32,
{
    if let Err(e) = io::stdout().flush() {
        warn!("failed to flush stdout before fork: {}", e);
    }

    let pid = unsafe { libc::fork() };
    match pid {
        -1 => Err(ProcessError::Spawn(io::Error::last_os_error())),
        0 => run_child(work),
        child => {
            debug!(pid = child, "worker spawned");
            Ok(Worker { pid: child })
        }
    }
}

fn run_child<F>(work: F) -> !
where
    F: FnOnce() -> i32,
{
    let code = match panic::catch_unwind(AssertUnwindSafe(work)) {
        Ok(code) => code,
        Err(payload) => {
            error!("worker panicked: {}", format_panic_payload(&payload));
            PANIC_EXIT_CODE
        }
    };
    // _exit skips atexit handlers registered by the parent before the fork
    unsafe { libc::_exit(code) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::time::{Duration, Instant};

    #[test]
    #[serial]
    fn test_current_identity() {
        let me = ProcessIdentity::current();
        assert_eq!(me.pid(), std::process::id() as Pid);
        assert!(me.parent_pid() > 0);
        assert_ne!(me.pid(), me.parent_pid());
    }

    #[test]
    #[serial]
    fn test_join_reports_exit_code() {
        let worker = spawn(|| 7).unwrap();
        assert_eq!(worker.join().unwrap(), ExitStatus::Exited(7));
    }

    #[test]
    #[serial]
    fn test_success_exit() {
        let status = spawn(|| 0).unwrap().join().unwrap();
        assert!(status.success());
    }

    #[test]
    #[serial]
    fn test_child_sees_parent_identity() {
        let parent = ProcessIdentity::current();
        let worker = spawn(move || {
            let me = ProcessIdentity::current();
            if me.parent_pid() == parent.pid() && me.pid() != parent.pid() {
                0
            } else {
                1
            }
        })
        .unwrap();
        assert_ne!(worker.pid(), parent.pid());
        assert_eq!(worker.join().unwrap(), ExitStatus::Exited(0));
    }

    #[test]
    #[serial]
    fn test_worker_pid_is_child_pid() {
        let mut fds = [0 as libc::c_int; 2];
        assert_eq!(unsafe { libc::pipe(fds.as_mut_ptr()) }, 0);
        let (read_fd, write_fd) = (fds[0], fds[1]);

        // The child only makes syscalls: no allocation after the fork
        let worker = spawn(move || {
            let pid = unsafe { libc::getpid() }.to_ne_bytes();
            let written = unsafe {
                libc::write(write_fd, pid.as_ptr() as *const libc::c_void, pid.len())
            };
            if written == pid.len() as isize { 0 } else { 1 }
        })
        .unwrap();
        let pid = worker.pid();
        assert_eq!(worker.join().unwrap(), ExitStatus::Exited(0));

        let mut buf = [0u8; std::mem::size_of::<Pid>()];
        let read = unsafe {
            libc::read(read_fd, buf.as_mut_ptr() as *mut libc::c_void, buf.len())
        };
        unsafe {
            libc::close(read_fd);
            libc::close(write_fd);
        }
        assert_eq!(read, buf.len() as isize);
        assert_eq!(Pid::from_ne_bytes(buf), pid);
    }

    #[test]
    #[serial]
    fn test_join_blocks_until_exit() {
        let start = Instant::now();
        let worker = spawn(|| {
            std::thread::sleep(Duration::from_millis(150));
            0
        })
        .unwrap();
        worker.join().unwrap();
        assert!(start.elapsed() >= Duration::from_millis(150));
    }

    #[test]
    #[serial]
    fn test_join_waits_for_its_own_child() {
        let slow = spawn(|| {
            std::thread::sleep(Duration::from_millis(200));
            3
        })
        .unwrap();
        let fast = spawn(|| 4).unwrap();

        // The fast child exits first but must not satisfy the slow join
        assert_eq!(slow.join().unwrap(), ExitStatus::Exited(3));
        assert_eq!(fast.join().unwrap(), ExitStatus::Exited(4));
    }

    #[test]
    #[serial]
    fn test_panicking_worker_exits_with_panic_code() {
        let worker = spawn(|| panic!("boom")).unwrap();
        assert_eq!(worker.join().unwrap(), ExitStatus::Exited(PANIC_EXIT_CODE));
    }

    #[test]
    #[serial]
    fn test_signaled_worker() {
        let worker = spawn(|| {
            unsafe { libc::raise(libc::SIGKILL) };
            0
        })
        .unwrap();
        assert_eq!(
            worker.join().unwrap(),
            ExitStatus::Signaled(libc::SIGKILL)
        );
    }

    #[test]
    #[serial]
    fn test_join_twice_on_same_pid_fails() {
        let worker = spawn(|| 0).unwrap();
        let stale = Worker { pid: worker.pid() };
        worker.join().unwrap();
        assert!(matches!(stale.join(), Err(ProcessError::Wait(_))));
    }

    #[test]
    #[serial]
    fn test_raw_stdout_accepts_empty_write() {
        assert_eq!(RawStdout.write(b"").unwrap(), 0);
        RawStdout.flush().unwrap();
    }

    #[test]
    #[serial]
    fn test_exit_status_display() {
        assert_eq!(ExitStatus::Exited(0).to_string(), "exit code 0");
        assert_eq!(ExitStatus::Signaled(9).to_string(), "signal 9");
        assert!(!ExitStatus::Signaled(9).success());
    }
}
