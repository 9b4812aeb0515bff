//! Startup item schema definitions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// What a startup item launches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    /// A program started directly
    Executable,
    /// A script handed to an interpreter
    Script,
    /// A URL opened with the default handler
    Url,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Executable => "executable",
            ItemKind::Script => "script",
            ItemKind::Url => "url",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemKind {
    type Err = UnknownItemKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "executable" | "exe" => Ok(ItemKind::Executable),
            "script" => Ok(ItemKind::Script),
            "url" => Ok(ItemKind::Url),
            _ => Err(UnknownItemKind(s.to_string())),
        }
    }
}

/// A string that does not name an [`ItemKind`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown item type: {0}")]
pub struct UnknownItemKind(pub String);

/// Interpreter used to run a script item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptInterpreter {
    PowerShell,
    Batch,
    Python,
    /// Resolved from the script's file extension at launch time
    #[default]
    Unspecified,
}

impl ScriptInterpreter {
    pub fn is_unspecified(&self) -> bool {
        matches!(self, ScriptInterpreter::Unspecified)
    }

    /// Guess the interpreter from a script path's extension.
    ///
    /// Returns `None` for extensions outside `.ps1`, `.bat`, `.cmd` and `.py`.
    pub fn from_extension(path: &str) -> Option<Self> {
        let ext = Path::new(path).extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "ps1" => Some(ScriptInterpreter::PowerShell),
            "bat" | "cmd" => Some(ScriptInterpreter::Batch),
            "py" => Some(ScriptInterpreter::Python),
            _ => None,
        }
    }
}

impl fmt::Display for ScriptInterpreter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScriptInterpreter::PowerShell => "powershell",
            ScriptInterpreter::Batch => "batch",
            ScriptInterpreter::Python => "python",
            ScriptInterpreter::Unspecified => "auto",
        };
        f.write_str(name)
    }
}

impl FromStr for ScriptInterpreter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "powershell" | "ps1" => Ok(ScriptInterpreter::PowerShell),
            "batch" | "bat" | "cmd" => Ok(ScriptInterpreter::Batch),
            "python" | "py" => Ok(ScriptInterpreter::Python),
            "" | "auto" | "unspecified" => Ok(ScriptInterpreter::Unspecified),
            other => Err(format!("Unknown script interpreter: {}", other)),
        }
    }
}

/// One configured startup action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartupItem {
    /// Stable identifier, survives edits and reordering
    pub id: String,

    /// Display name used in progress and error messages
    pub name: String,

    #[serde(rename = "type")]
    pub kind: ItemKind,

    /// Filesystem path for executables and scripts, the URL for URL items
    pub target: String,

    /// Only consulted for script items
    #[serde(default, skip_serializing_if = "ScriptInterpreter::is_unspecified")]
    pub script_interpreter: ScriptInterpreter,

    /// Whitespace separated arguments appended after any interpreter arguments
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub args: String,

    /// Wait after launching this item before the next enabled one starts
    #[serde(default)]
    pub delay_ms: u64,

    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Position in the launch sequence
    #[serde(default)]
    pub order: u32,
}

fn default_enabled() -> bool {
    true
}

impl StartupItem {
    /// Create an enabled item with a fresh id, no arguments and no delay
    pub fn new(kind: ItemKind, name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: new_item_id(),
            name: name.into(),
            kind,
            target: target.into(),
            script_interpreter: ScriptInterpreter::Unspecified,
            args: String::new(),
            delay_ms: 0,
            enabled: true,
            order: 0,
        }
    }

    pub fn executable(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(ItemKind::Executable, name, path)
    }

    pub fn script(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(ItemKind::Script, name, path)
    }

    pub fn url(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self::new(ItemKind::Url, name, url)
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_args(mut self, args: impl Into<String>) -> Self {
        self.args = args.into();
        self
    }

    pub fn with_delay_ms(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    pub fn with_interpreter(mut self, interpreter: ScriptInterpreter) -> Self {
        self.script_interpreter = interpreter;
        self
    }

    pub fn with_order(mut self, order: u32) -> Self {
        self.order = order;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// User arguments split on runs of whitespace
    pub fn split_args(&self) -> Vec<String> {
        self.args.split_whitespace().map(str::to_string).collect()
    }
}

/// Generate a new opaque item identifier
pub fn new_item_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
