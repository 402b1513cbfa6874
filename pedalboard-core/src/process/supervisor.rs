//! One thread per external process role.
//!
//! The supervisor thread owns the `Child` handle. Callers talk to it over a
//! channel, so concurrent start/stop requests for the same role are applied
//! one at a time and a second child is never spawned over a running one.

use std::fmt;
use std::io;
use std::process::{Child, Command, Stdio};
use std::sync::Mutex;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};

use crate::tools::{command_line, run_tool};

/// How often an idle supervisor checks whether its child exited on its own.
const POLL_INTERVAL: Duration = Duration::from_millis(200);
/// Time a child gets to exit after SIGTERM before it is killed.
const TERM_GRACE: Duration = Duration::from_secs(2);

/// Program and arguments of one role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn command_line(&self) -> String {
        command_line(&self.program, &self.args)
    }
}

#[derive(Debug)]
pub enum SupervisorError {
    /// The role already has a live child.
    AlreadyRunning(String),
    Spawn {
        role: String,
        program: String,
        source: io::Error,
    },
    /// The supervisor thread is gone.
    Disconnected(String),
}

impl fmt::Display for SupervisorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SupervisorError::AlreadyRunning(role) => write!(f, "{} is already running", role),
            SupervisorError::Spawn { role, program, source } => {
                write!(f, "{}: could not start {}: {}", role, program, source)
            }
            SupervisorError::Disconnected(role) => write!(f, "{} supervisor has stopped", role),
        }
    }
}

impl std::error::Error for SupervisorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SupervisorError::Spawn { source, .. } => Some(source),
            _ => None,
        }
    }
}

enum SupervisorCmd {
    Start {
        spec: CommandSpec,
        reply: Sender<Result<u32, SupervisorError>>,
    },
    Stop {
        reply: Sender<bool>,
    },
    Status {
        reply: Sender<bool>,
    },
    Shutdown,
}

pub struct ProcessSupervisor {
    role: String,
    cmd_tx: Sender<SupervisorCmd>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl ProcessSupervisor {
    pub fn spawn(role: &str) -> io::Result<Self> {
        let (cmd_tx, cmd_rx) = unbounded();
        let actor = SupervisorThread {
            role: role.to_string(),
            cmd_rx,
            child: None,
        };
        let handle = thread::Builder::new()
            .name(format!("{}-supervisor", role))
            .spawn(move || actor.run())?;
        Ok(Self {
            role: role.to_string(),
            cmd_tx,
            handle: Mutex::new(Some(handle)),
        })
    }

    /// Spawn `spec`. Returns the child's pid once the spawn result is known.
    pub fn start(&self, spec: CommandSpec) -> Result<u32, SupervisorError> {
        let (reply, rx) = bounded(1);
        self.send(SupervisorCmd::Start { spec, reply })?;
        rx.recv().map_err(|_| self.disconnected())?
    }

    /// Terminate and reap the child. Returns `false` if nothing was running.
    pub fn stop(&self) -> Result<bool, SupervisorError> {
        let (reply, rx) = bounded(1);
        self.send(SupervisorCmd::Stop { reply })?;
        rx.recv().map_err(|_| self.disconnected())
    }

    pub fn is_running(&self) -> bool {
        let (reply, rx) = bounded(1);
        if self.send(SupervisorCmd::Status { reply }).is_err() {
            return false;
        }
        rx.recv().unwrap_or(false)
    }

    /// Stop the child (if any) and the supervisor thread.
    pub fn shutdown(&self) {
        let _ = self.cmd_tx.send(SupervisorCmd::Shutdown);
        let handle = match self.handle.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(handle) = handle {
            if handle.join().is_err() {
                log::error!(target: "process", "{} supervisor panicked", self.role);
            }
        }
    }

    fn send(&self, cmd: SupervisorCmd) -> Result<(), SupervisorError> {
        self.cmd_tx.send(cmd).map_err(|_| self.disconnected())
    }

    fn disconnected(&self) -> SupervisorError {
        SupervisorError::Disconnected(self.role.clone())
    }
}

impl Drop for ProcessSupervisor {
    fn drop(&mut self) {
        self.shutdown();
    }
}

struct SupervisorThread {
    role: String,
    cmd_rx: Receiver<SupervisorCmd>,
    child: Option<Child>,
}

impl SupervisorThread {
    fn run(mut self) {
        loop {
            crossbeam_channel::select! {
                recv(self.cmd_rx) -> msg => match msg {
                    Ok(SupervisorCmd::Start { spec, reply }) => {
                        let _ = reply.send(self.start(spec));
                    }
                    Ok(SupervisorCmd::Stop { reply }) => {
                        let _ = reply.send(self.stop());
                    }
                    Ok(SupervisorCmd::Status { reply }) => {
                        self.reap();
                        let _ = reply.send(self.child.is_some());
                    }
                    Ok(SupervisorCmd::Shutdown) | Err(_) => {
                        self.stop();
                        break;
                    }
                },
                default(POLL_INTERVAL) => self.reap(),
            }
        }
        log::debug!(target: "process", "{} supervisor exited", self.role);
    }

    fn start(&mut self, spec: CommandSpec) -> Result<u32, SupervisorError> {
        self.reap();
        if self.child.is_some() {
            return Err(SupervisorError::AlreadyRunning(self.role.clone()));
        }

        log::info!(target: "process", "{}: {}", self.role, spec.command_line());
        let child = Command::new(&spec.program)
            .args(&spec.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| SupervisorError::Spawn {
                role: self.role.clone(),
                program: spec.program.clone(),
                source,
            })?;
        let pid = child.id();
        self.child = Some(child);
        Ok(pid)
    }

    fn stop(&mut self) -> bool {
        let Some(mut child) = self.child.take() else {
            return false;
        };
        let pid = child.id();

        // SIGTERM first so recorders can finalize their files
        if let Err(e) = run_tool("kill", &["-TERM".to_string(), pid.to_string()]) {
            log::debug!(target: "process", "{}: SIGTERM to {} failed: {}", self.role, pid, e);
        }
        let deadline = Instant::now() + TERM_GRACE;
        loop {
            match child.try_wait() {
                Ok(Some(status)) => {
                    log::info!(target: "process", "{} stopped ({})", self.role, status);
                    return true;
                }
                Ok(None) if Instant::now() < deadline => thread::sleep(Duration::from_millis(20)),
                Ok(None) => break,
                Err(e) => {
                    log::warn!(target: "process", "{}: wait failed: {}", self.role, e);
                    break;
                }
            }
        }

        log::warn!(target: "process", "{} ignored SIGTERM, killing {}", self.role, pid);
        if let Err(e) = child.kill() {
            log::warn!(target: "process", "{}: kill failed: {}", self.role, e);
        }
        if let Err(e) = child.wait() {
            log::warn!(target: "process", "{}: reap failed: {}", self.role, e);
        }
        true
    }

    /// Forget a child that exited by itself.
    fn reap(&mut self) {
        if let Some(child) = self.child.as_mut() {
            match child.try_wait() {
                Ok(Some(status)) => {
                    log::info!(target: "process", "{} exited ({})", self.role, status);
                    self.child = None;
                }
                Ok(None) => {}
                Err(e) => log::warn!(target: "process", "{}: wait failed: {}", self.role, e),
            }
        }
    }
}
