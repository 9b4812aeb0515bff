//! Detached process spawning

use std::fmt;
use std::process::Stdio;
use tokio::process::Command;

/// Windows `DETACHED_PROCESS`
#[cfg(windows)]
const DETACHED_PROCESS: u32 = 0x0000_0008;
/// Windows `CREATE_NEW_PROCESS_GROUP`
#[cfg(windows)]
const CREATE_NEW_PROCESS_GROUP: u32 = 0x0000_0200;

/// A program and its discrete argument list
///
/// Arguments are never joined into a shell command line, so spaces and
/// quotes in paths or arguments reach the program untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl LaunchCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl fmt::Display for LaunchCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Start a process and release it immediately.
///
/// The child gets null stdio and its own process group, so it neither
/// shares our terminal nor receives our Ctrl+C. The handle is dropped
/// right after the OS accepts the request; tokio reaps the orphan in the
/// background once it exits. Returns the pid when the OS reports one.
pub fn spawn_detached(name: &str, command: &LaunchCommand) -> std::io::Result<Option<u32>> {
    log::info!("[{}] Starting: {}", name, command);

    let mut cmd = Command::new(&command.program);
    cmd.args(&command.args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(false);

    #[cfg(unix)]
    {
        cmd.process_group(0);
    }

    #[cfg(windows)]
    {
        cmd.creation_flags(DETACHED_PROCESS | CREATE_NEW_PROCESS_GROUP);
    }

    let child = cmd.spawn()?;
    let pid = child.id();
    drop(child);

    log::debug!("[{}] Detached with PID: {:?}", name, pid);
    Ok(pid)
}
