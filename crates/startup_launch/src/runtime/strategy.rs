//! Launch strategies for each item kind

use crate::config::{ItemKind, ScriptInterpreter, StartupItem};
use crate::runtime::process::{spawn_detached, LaunchCommand};
use async_trait::async_trait;

/// Turns a startup item into an OS launch request.
///
/// Implementations must return as soon as the OS has accepted the request;
/// they never wait for the launched program.
#[async_trait]
pub trait Launcher: Send + Sync {
    async fn launch(&self, item: &StartupItem) -> Result<(), LaunchError>;
}

/// Launches items on the local machine
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLauncher;

#[async_trait]
impl Launcher for SystemLauncher {
    async fn launch(&self, item: &StartupItem) -> Result<(), LaunchError> {
        match item.kind {
            ItemKind::Executable => launch_executable(item),
            ItemKind::Script => launch_script(item),
            ItemKind::Url => open_url(item),
        }
    }
}

/// Build the command for an executable item
pub fn executable_command(item: &StartupItem) -> Result<LaunchCommand, LaunchError> {
    if item.target.trim().is_empty() {
        return Err(LaunchError::MissingPath);
    }
    let command = LaunchCommand::new(item.target.as_str());
    Ok(command.args(item.split_args()))
}

/// Build the interpreter command for a script item
pub fn script_command(item: &StartupItem) -> Result<LaunchCommand, LaunchError> {
    if item.target.trim().is_empty() {
        return Err(LaunchError::MissingScriptPath);
    }

    let interpreter = resolve_interpreter(item.script_interpreter, &item.target)?;
    let target = item.target.as_str();
    let command = match interpreter {
        ScriptInterpreter::PowerShell => LaunchCommand::new("powershell.exe")
            .args(["-ExecutionPolicy", "Bypass", "-File", target]),
        ScriptInterpreter::Batch => LaunchCommand::new("cmd.exe").args(["/c", target]),
        ScriptInterpreter::Python => LaunchCommand::new("python").arg(target),
        ScriptInterpreter::Unspecified => {
            return Err(LaunchError::UnknownScriptType(target.to_string()))
        }
    };

    Ok(command.args(item.split_args()))
}

/// Pick the interpreter for a script.
///
/// An explicit interpreter always wins, even if it disagrees with the file
/// extension; the extension is only consulted when none was given.
pub fn resolve_interpreter(
    interpreter: ScriptInterpreter,
    target: &str,
) -> Result<ScriptInterpreter, LaunchError> {
    match interpreter {
        ScriptInterpreter::Unspecified => ScriptInterpreter::from_extension(target)
            .ok_or_else(|| LaunchError::UnknownScriptType(target.to_string())),
        explicit => Ok(explicit),
    }
}

/// Start an executable item, detached
pub fn launch_executable(item: &StartupItem) -> Result<(), LaunchError> {
    let command = executable_command(item)?;
    spawn(item, command)
}

/// Start a script item through its interpreter, detached
pub fn launch_script(item: &StartupItem) -> Result<(), LaunchError> {
    let command = script_command(item)?;
    spawn(item, command)
}

/// Hand a URL item to the desktop's default handler
pub fn open_url(item: &StartupItem) -> Result<(), LaunchError> {
    let url = item.target.trim();
    if url.is_empty() {
        return Err(LaunchError::MissingUrl);
    }

    log::info!("[{}] Opening {}", item.name, url);
    open::that_detached(url).map_err(LaunchError::OpenUrl)
}

fn spawn(item: &StartupItem, command: LaunchCommand) -> Result<(), LaunchError> {
    spawn_detached(&item.name, &command)
        .map(|_| ())
        .map_err(|e| LaunchError::Spawn {
            program: command.program,
            source: e,
        })
}

/// Errors that can occur when launching a single item
#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    #[error("No path specified")]
    MissingPath,

    #[error("No script path specified")]
    MissingScriptPath,

    #[error("No URL specified")]
    MissingUrl,

    #[error("Unknown script type for '{0}'")]
    UnknownScriptType(String),

    #[error("Failed to launch '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to open URL: {0}")]
    OpenUrl(#[source] std::io::Error),
}
