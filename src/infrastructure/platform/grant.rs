use nix::errno::Errno;
use nix::sys::signal::kill;
use nix::unistd::Pid;
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

use crate::domain::errors::{AgentError, AgentResult};
use crate::domain::ports::LifecycleGrant;

/// Create-or-reclaim rounds before giving up on a contended pid file
const ACQUIRE_ATTEMPTS: usize = 4;

/// How long an empty pid file may wait for its creator to write the pid
const EMPTY_FILE_GRACE: Duration = Duration::from_millis(50);

/// Single-instance lock held in a pid file for the life of the agent
#[derive(Debug)]
pub struct PidFileGrant {
    path: PathBuf,
}

impl PidFileGrant {
    /// Create `path` holding the current pid
    ///
    /// The file is created exclusively. An existing file is only replaced
    /// when the process it names is gone, and creation is then retried, so
    /// of two agents starting together only one gets the grant.
    ///
    /// # Errors
    /// * `AgentError::AlreadyRunning` - the file names a live process
    /// * `AgentError::Lock` - the file cannot be read or written
    pub fn acquire(path: impl Into<PathBuf>) -> AgentResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let own_pid = std::process::id();
        let mut waited_on_empty = false;
        for _ in 0..ACQUIRE_ATTEMPTS {
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    file.write_all(own_pid.to_string().as_bytes())?;
                    return Ok(Self { path });
                }
                Err(err) if err.kind() == ErrorKind::AlreadyExists => {}
                Err(err) => return Err(err.into()),
            }

            let contents = match std::fs::read_to_string(&path) {
                Ok(contents) => contents,
                // Released between our create and read
                Err(err) if err.kind() == ErrorKind::NotFound => continue,
                Err(err) => return Err(err.into()),
            };
            if contents.trim().is_empty() && !waited_on_empty {
                waited_on_empty = true;
                std::thread::sleep(EMPTY_FILE_GRACE);
                continue;
            }
            if let Ok(pid) = contents.trim().parse::<i32>() {
                if pid != own_pid as i32 && is_alive(pid) {
                    return Err(AgentError::AlreadyRunning(pid));
                }
            }

            debug!(path = %path.display(), "removing stale pid file");
            remove_if_unchanged(&path, &contents)?;
        }

        Err(AgentError::Lock(std::io::Error::new(
            ErrorKind::WouldBlock,
            format!("pid file {} keeps changing", path.display()),
        )))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LifecycleGrant for PidFileGrant {
    fn release(&self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "pid file removed"),
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => warn!(path = %self.path.display(), error = %err, "failed to remove pid file"),
        }
    }
}

/// Remove a stale pid file unless another agent has rewritten it meanwhile.
fn remove_if_unchanged(path: &Path, stale: &str) -> AgentResult<()> {
    match std::fs::read_to_string(path) {
        Ok(current) if current == stale => match std::fs::remove_file(path) {
            Err(err) if err.kind() != ErrorKind::NotFound => Err(err.into()),
            _ => Ok(()),
        },
        Ok(_) => Ok(()),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err.into()),
    }
}

fn is_alive(pid: i32) -> bool {
    if pid <= 0 {
        return false;
    }
    match kill(Pid::from_raw(pid), None) {
        Ok(()) => true,
        // The process exists but belongs to someone else
        Err(Errno::EPERM) => true,
        Err(_) => false,
    }
}
