//! Login autostart registration through an XDG autostart desktop entry
//!
//! The entry re-runs this binary with `run --startup`, which executes the
//! configured sequence once the desktop session is up.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name of the desktop entry under the autostart directory
pub const ENTRY_FILE_NAME: &str = "startup-launch.desktop";

#[derive(Error, Debug)]
pub enum AutostartError {
    #[error("Login autostart is not supported on this platform")]
    Unsupported,

    #[error("Could not determine the autostart directory")]
    NoConfigDir,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid input for desktop entry: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, AutostartError>;

/// Registration of this app as a login item
#[derive(Debug, Clone)]
pub struct Autostart {
    entry_path: PathBuf,
}

impl Autostart {
    /// Use the user's autostart directory (`~/.config/autostart`)
    pub fn new() -> Result<Self> {
        if !cfg!(target_os = "linux") {
            return Err(AutostartError::Unsupported);
        }
        let dir = dirs::config_dir()
            .ok_or(AutostartError::NoConfigDir)?
            .join("autostart");
        Ok(Self::in_dir(dir))
    }

    /// Use a specific autostart directory
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            entry_path: dir.as_ref().join(ENTRY_FILE_NAME),
        }
    }

    pub fn entry_path(&self) -> &Path {
        &self.entry_path
    }

    /// Write the desktop entry that starts `exe` with the given config at login
    pub fn enable(&self, exe: &Path, config_path: Option<&Path>) -> Result<()> {
        let content = generate_desktop_entry(exe, config_path)?;
        if let Some(dir) = self.entry_path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(&self.entry_path, content)?;
        log::info!("Enabled login autostart: {}", self.entry_path.display());
        Ok(())
    }

    /// Remove the desktop entry; succeeds if it was never installed
    pub fn disable(&self) -> Result<()> {
        match std::fs::remove_file(&self.entry_path) {
            Ok(()) => {
                log::info!("Disabled login autostart: {}", self.entry_path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Whether the entry exists and is not hidden or switched off
    pub fn is_enabled(&self) -> bool {
        match std::fs::read_to_string(&self.entry_path) {
            Ok(content) => entry_is_active(&content),
            Err(_) => false,
        }
    }

    /// Flip the registration, returning the new state
    pub fn toggle(&self, exe: &Path, config_path: Option<&Path>) -> Result<bool> {
        if self.is_enabled() {
            self.disable()?;
            Ok(false)
        } else {
            self.enable(exe, config_path)?;
            Ok(true)
        }
    }
}

/// Check the `[Desktop Entry]` group for `Hidden=true` or
/// `X-GNOME-Autostart-enabled=false`
fn entry_is_active(content: &str) -> bool {
    let mut in_desktop_entry = false;
    let mut hidden = false;
    let mut gnome_enabled = true;

    for line in content.lines() {
        let line = line.trim();
        if line == "[Desktop Entry]" {
            in_desktop_entry = true;
            continue;
        }
        if line.starts_with('[') {
            in_desktop_entry = false;
            continue;
        }
        if !in_desktop_entry {
            continue;
        }

        if let Some(val) = line.strip_prefix("Hidden=") {
            hidden = val.trim().eq_ignore_ascii_case("true");
        } else if let Some(val) = line.strip_prefix("X-GNOME-Autostart-enabled=") {
            gnome_enabled = !val.trim().eq_ignore_ascii_case("false");
        }
    }

    !hidden && gnome_enabled
}

/// Reject values that could break out of a desktop entry line
fn sanitize_value(value: &str) -> Result<String> {
    if value.contains('\n') || value.contains('\r') || value.contains('\0') {
        return Err(AutostartError::InvalidInput(format!(
            "'{}' contains invalid characters",
            value.escape_debug()
        )));
    }
    if value.contains("[Desktop Entry]") {
        return Err(AutostartError::InvalidInput(
            "value contains a desktop entry group header".to_string(),
        ));
    }
    Ok(value.to_string())
}

/// Quote an `Exec` argument using freedesktop desktop entry rules
fn quote_exec_arg(arg: &str) -> String {
    let needs_quotes = arg
        .chars()
        .any(|c| c.is_whitespace() || "\"'\\><~|&;$*?#()`".contains(c));
    let escaped = arg.replace('%', "%%");
    if !needs_quotes {
        return escaped;
    }
    let mut quoted = String::with_capacity(escaped.len() + 2);
    quoted.push('"');
    for c in escaped.chars() {
        if matches!(c, '"' | '`' | '$' | '\\') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

/// Generate the autostart desktop entry content
pub fn generate_desktop_entry(exe: &Path, config_path: Option<&Path>) -> Result<String> {
    let exe = sanitize_value(&exe.to_string_lossy())?;

    let mut exec = quote_exec_arg(&exe);
    if let Some(config) = config_path {
        let config = sanitize_value(&config.to_string_lossy())?;
        exec.push_str(" --config ");
        exec.push_str(&quote_exec_arg(&config));
    }
    exec.push_str(" run --startup");

    Ok(format!(
        r#"[Desktop Entry]
Type=Application
Name=Startup Launch
Comment=Run the configured startup sequence
Exec={exec}
Terminal=false
X-GNOME-Autostart-enabled=true
"#
    ))
}
