//! Hotkey command launching
//!
//! Commands run detached through `sh -c` in their own process group. Exit
//! statuses are collected with non-blocking `waitpid` calls on the launched
//! pids from the event loop, so a child never blocks the window manager.

use anyhow::{Context, Result};
use nix::errno::Errno;
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;
use std::collections::HashSet;
use std::os::unix::process::CommandExt;
use std::process::{Command, Stdio};
use tracing::{debug, info, warn};

/// Starts hotkey commands and reaps them once they exit
#[derive(Debug)]
pub struct Launcher {
    /// Environment variable telling children which screen was active
    screen_env: String,
    running: HashSet<Pid>,
}

impl Launcher {
    pub fn new(screen_env: impl Into<String>) -> Self {
        Self {
            screen_env: screen_env.into(),
            running: HashSet::new(),
        }
    }

    /// Number of launched commands that have not been reaped yet
    pub fn running(&self) -> usize {
        self.running.len()
    }

    /// Run `command` without waiting for it
    pub fn spawn(&mut self, command: &str, active_screen: usize) -> Result<Pid> {
        info!("Launching: {}", command);

        let child = Command::new("sh")
            .arg("-c")
            .arg(command)
            .env(&self.screen_env, active_screen.to_string())
            .stdin(Stdio::null())
            .process_group(0)
            .spawn()
            .with_context(|| format!("Failed to spawn {:?}", command))?;

        let pid = Pid::from_raw(child.id() as i32);
        self.running.insert(pid);

        Ok(pid)
    }

    /// Collect the status of every launched child that has exited so far
    pub fn reap(&mut self) -> Vec<WaitStatus> {
        let mut reaped = Vec::new();

        self.running.retain(|&pid| loop {
            match waitpid(pid, Some(WaitPidFlag::WNOHANG)) {
                Ok(WaitStatus::StillAlive) => return true,
                Ok(status) => {
                    debug!("Reaped child: {:?}", status);
                    reaped.push(status);
                    return false;
                }
                Err(Errno::EINTR) => continue,
                Err(Errno::ECHILD) => return false,
                Err(e) => {
                    warn!("waitpid({}) failed: {}", pid, e);
                    return true;
                }
            }
        });

        reaped
    }
}
