//! Command-line interface for startup_launch

use crate::autostart::AutostartError;
use crate::config::{ConfigError, ItemKind, ScriptInterpreter, StartupConfig, StartupItem};
use argh::FromArgs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Launch your startup programs, scripts and URLs in sequence
#[derive(FromArgs, Debug)]
pub struct LaunchArgs {
    /// path to the config file (default: <config dir>/startup-launch/startup-config.json)
    #[argh(option, short = 'c')]
    pub config: Option<String>,

    /// log level (error, warn, info, debug, trace)
    #[argh(option, short = 'l', default = "String::from(\"info\")")]
    pub log_level: String,

    /// report results in the log instead of desktop notifications
    #[argh(switch)]
    pub quiet_notifications: bool,

    #[argh(subcommand)]
    pub command: Command,
}

impl LaunchArgs {
    /// Config file path, explicit or the platform default
    pub fn config_path(&self) -> PathBuf {
        self.config
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(StartupConfig::default_path)
    }
}

#[derive(FromArgs, Debug)]
#[argh(subcommand)]
pub enum Command {
    Run(RunArgs),
    List(ListArgs),
    Add(AddArgs),
    Remove(RemoveArgs),
    Move(MoveArgs),
    Enable(EnableArgs),
    Disable(DisableArgs),
    Validate(ValidateArgs),
    Autostart(AutostartArgs),
}

/// run the enabled items in order
#[derive(FromArgs, Debug)]
#[argh(subcommand, name = "run")]
pub struct RunArgs {
    /// started at login: only run when auto-run is on, after the login delay
    #[argh(switch)]
    pub startup: bool,
}

/// show the configured items
#[derive(FromArgs, Debug)]
#[argh(subcommand, name = "list")]
pub struct ListArgs {}

/// add an item to the sequence
#[derive(FromArgs, Debug)]
#[argh(subcommand, name = "add")]
pub struct AddArgs {
    /// item type (executable, script, url)
    #[argh(option, long = "type", short = 't', default = "ItemKind::Executable")]
    pub kind: ItemKind,

    /// path to the program or script, or the URL to open
    #[argh(positional)]
    pub target: String,

    /// display name (default: derived from the target)
    #[argh(option, short = 'n')]
    pub name: Option<String>,

    /// whitespace separated arguments
    #[argh(option, short = 'a', default = "String::new()")]
    pub args: String,

    /// milliseconds to wait after this item before the next one
    #[argh(option, short = 'd', default = "0")]
    pub delay: u64,

    /// script interpreter (powershell, batch, python, auto)
    #[argh(option, short = 'i', default = "ScriptInterpreter::Unspecified")]
    pub interpreter: ScriptInterpreter,

    /// zero-based position to insert at (default: end)
    #[argh(option, short = 'p')]
    pub position: Option<usize>,

    /// add the item disabled
    #[argh(switch)]
    pub disabled: bool,
}

impl AddArgs {
    /// Build the item described by these arguments
    pub fn to_item(&self) -> StartupItem {
        let name = self
            .name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| default_name(self.kind, &self.target));

        StartupItem::new(self.kind, name, self.target.clone())
            .with_args(self.args.clone())
            .with_delay_ms(self.delay)
            .with_interpreter(self.interpreter)
            .with_enabled(!self.disabled)
    }
}

/// remove an item
#[derive(FromArgs, Debug)]
#[argh(subcommand, name = "remove")]
pub struct RemoveArgs {
    /// item id or unique id prefix
    #[argh(positional)]
    pub id: String,
}

/// move an item to a new position
#[derive(FromArgs, Debug)]
#[argh(subcommand, name = "move")]
pub struct MoveArgs {
    /// item id or unique id prefix
    #[argh(positional)]
    pub id: String,

    /// zero-based target position
    #[argh(positional)]
    pub position: usize,
}

/// enable an item
#[derive(FromArgs, Debug)]
#[argh(subcommand, name = "enable")]
pub struct EnableArgs {
    /// item id or unique id prefix
    #[argh(positional)]
    pub id: String,
}

/// disable an item
#[derive(FromArgs, Debug)]
#[argh(subcommand, name = "disable")]
pub struct DisableArgs {
    /// item id or unique id prefix
    #[argh(positional)]
    pub id: String,
}

/// check the config for items that cannot launch
#[derive(FromArgs, Debug)]
#[argh(subcommand, name = "validate")]
pub struct ValidateArgs {}

/// manage running the sequence at login
#[derive(FromArgs, Debug)]
#[argh(subcommand, name = "autostart")]
pub struct AutostartArgs {
    /// enable, disable, toggle or status
    #[argh(positional, default = "AutostartAction::Status")]
    pub action: AutostartAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutostartAction {
    Enable,
    Disable,
    Toggle,
    Status,
}

impl FromStr for AutostartAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "enable" | "on" => Ok(AutostartAction::Enable),
            "disable" | "off" => Ok(AutostartAction::Disable),
            "toggle" => Ok(AutostartAction::Toggle),
            "status" => Ok(AutostartAction::Status),
            _ => Err(format!(
                "Invalid autostart action '{}'. Expected enable, disable, toggle or status",
                s
            )),
        }
    }
}

/// Name for an item added without `--name`
fn default_name(kind: ItemKind, target: &str) -> String {
    let target = target.trim();
    let derived = match kind {
        ItemKind::Url => {
            let rest = target.split_once("://").map_or(target, |(_, rest)| rest);
            rest.split('/').next().unwrap_or_default()
        }
        ItemKind::Executable | ItemKind::Script => {
            // Windows paths are common in configs, split on both separators
            let file = target.rsplit(['/', '\\']).next().unwrap_or_default();
            let stem = Path::new(file).file_stem().and_then(|s| s.to_str());
            stem.unwrap_or(file)
        }
    };

    if derived.is_empty() {
        target.to_string()
    } else {
        derived.to_string()
    }
}

/// Errors reported by the command-line front end
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Autostart(#[from] AutostartError),

    #[error("Failed to locate the running executable: {0}")]
    CurrentExe(#[source] std::io::Error),

    #[error("Failed to set Ctrl+C handler: {0}")]
    SignalHandler(#[from] ctrlc::Error),

    #[error("Execution did not run: {0}")]
    Run(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<LaunchArgs, argh::EarlyExit> {
        LaunchArgs::from_args(&["startup_launch"], args)
    }

    #[test]
    fn test_parse_run_startup() {
        let args = parse(&["-c", "/tmp/cfg.json", "run", "--startup"]).unwrap();
        assert_eq!(args.config_path(), PathBuf::from("/tmp/cfg.json"));

        let Command::Run(run) = args.command else {
            panic!("expected run command");
        };
        assert!(run.startup);
    }

    #[test]
    fn test_parse_add_script() {
        let argv = [
            "add",
            "--type",
            "script",
            "C:\\tools\\setup.ps1",
            "-a",
            "quiet  fast",
            "-d",
            "1500",
        ];
        let args = parse(&argv).unwrap();
        let Command::Add(add) = args.command else {
            panic!("expected add command");
        };
        let item = add.to_item();

        assert_eq!(item.kind, ItemKind::Script);
        assert_eq!(item.name, "setup");
        assert_eq!(item.delay_ms, 1500);
        assert_eq!(item.split_args(), vec!["quiet", "fast"]);
        assert!(item.enabled);
    }

    #[test]
    fn test_parse_add_rejects_unknown_type() {
        assert!(parse(&["add", "--type", "service", "x"]).is_err());
    }

    #[test]
    fn test_parse_autostart_action() {
        let args = parse(&["autostart", "off"]).unwrap();
        assert!(matches!(
            args.command,
            Command::Autostart(AutostartArgs {
                action: AutostartAction::Disable
            })
        ));

        let args = parse(&["autostart"]).unwrap();
        assert!(matches!(
            args.command,
            Command::Autostart(AutostartArgs {
                action: AutostartAction::Status
            })
        ));
        assert!("sometimes".parse::<AutostartAction>().is_err());
    }

    #[test]
    fn test_default_name() {
        let mail = default_name(ItemKind::Url, "https://mail.example.com/inbox");
        assert_eq!(mail, "mail.example.com");
        assert_eq!(default_name(ItemKind::Url, "about:blank"), "about:blank");

        let firefox = default_name(ItemKind::Executable, "/usr/bin/firefox");
        assert_eq!(firefox, "firefox");

        let backup = default_name(ItemKind::Script, "C:\\scripts\\backup.bat");
        assert_eq!(backup, "backup");
    }
}
