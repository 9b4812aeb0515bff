//! Persistent startup configuration: loading, validation and list editing

use super::item::{new_item_id, ItemKind, ScriptInterpreter, StartupItem};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Format version written to new documents
pub const CONFIG_VERSION: &str = "1.0.0";

/// Default pause before a login-triggered run starts
pub const DEFAULT_LOGIN_DELAY_MS: u64 = 3000;

const CONFIG_DIR_NAME: &str = "startup-launch";
const CONFIG_FILE_NAME: &str = "startup-config.json";
const UNNAMED_ITEM: &str = "Unnamed Item";

/// Root configuration document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartupConfig {
    pub version: String,

    /// Run the sequence when the app is started at login
    pub auto_run_on_startup: bool,

    /// Pause before a login-triggered run, lets the desktop session settle
    pub login_delay_ms: u64,

    /// Items kept sorted by `order`, with orders renumbered to `0..n-1`
    pub items: Vec<StartupItem>,
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION.to_string(),
            auto_run_on_startup: false,
            login_delay_ms: DEFAULT_LOGIN_DELAY_MS,
            items: Vec::new(),
        }
    }
}

/// Lenient on-disk shape, every field optional
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawConfig {
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    auto_run_on_startup: Option<bool>,
    #[serde(default)]
    login_delay_ms: Option<Value>,
    #[serde(default)]
    items: Option<Vec<RawItem>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawItem {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default, alias = "path")]
    target: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default, alias = "scriptType")]
    script_interpreter: Option<String>,
    #[serde(default)]
    args: Option<String>,
    #[serde(default, alias = "delay")]
    delay_ms: Option<Value>,
    #[serde(default)]
    enabled: Option<bool>,
    #[serde(default)]
    order: Option<Value>,
}

impl RawItem {
    fn into_item(self, index: usize) -> (i64, StartupItem) {
        let name = self
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| UNNAMED_ITEM.to_string());

        let kind = match self.kind.as_deref() {
            Some(raw) => raw.parse::<ItemKind>().unwrap_or_else(|e| {
                log::warn!("[{}] {}, treating it as an executable", name, e);
                ItemKind::Executable
            }),
            None => ItemKind::Executable,
        };

        let target = self.target.unwrap_or_default();
        let url = self.url.unwrap_or_default();
        let target = match kind {
            ItemKind::Url if !url.is_empty() => url,
            _ => target,
        };

        let script_interpreter = match self.script_interpreter.as_deref() {
            Some(raw) => raw.parse::<ScriptInterpreter>().unwrap_or_else(|e| {
                log::warn!("[{}] {}, resolving from extension instead", name, e);
                ScriptInterpreter::Unspecified
            }),
            None => ScriptInterpreter::Unspecified,
        };

        // Any integer is accepted, negative orders sort first
        let order = self
            .order
            .as_ref()
            .and_then(Value::as_i64)
            .unwrap_or(index as i64);

        let item = StartupItem {
            id: self
                .id
                .filter(|id| !id.trim().is_empty())
                .unwrap_or_else(new_item_id),
            name,
            kind,
            target,
            script_interpreter,
            args: self.args.unwrap_or_default(),
            delay_ms: coerce_millis(self.delay_ms.as_ref()),
            enabled: self.enabled.unwrap_or(true),
            order: 0,
        };

        (order, item)
    }
}

/// Accept integers, non-negative floats and numeric strings; anything else is 0
fn coerce_millis(value: Option<&Value>) -> u64 {
    if let Some(millis) = value.and_then(Value::as_u64) {
        return millis;
    }
    let millis = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match millis {
        Some(f) if f.is_finite() && f >= 0.0 => f as u64,
        _ => 0,
    }
}

impl StartupConfig {
    /// Default config location: `<config dir>/startup-launch/startup-config.json`
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Load the config file, writing a default document if none exists yet
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::info!(
                "Config file not found, creating default at {}",
                path.display()
            );
            let mut config = Self::default();
            config.save(path)?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_json(&content)
    }

    /// Parse and normalize a config document
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = serde_json::from_str(content)?;

        let mut ordered: Vec<(i64, StartupItem)> = raw
            .items
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(index, item)| item.into_item(index))
            .collect();
        ordered.sort_by_key(|(order, _)| *order);

        let mut config = Self {
            version: raw
                .version
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| CONFIG_VERSION.to_string()),
            auto_run_on_startup: raw.auto_run_on_startup.unwrap_or(false),
            login_delay_ms: match raw.login_delay_ms {
                Some(ref value) => coerce_millis(Some(value)),
                None => DEFAULT_LOGIN_DELAY_MS,
            },
            items: ordered.into_iter().map(|(_, item)| item).collect(),
        };
        config.renumber();
        Ok(config)
    }

    /// Normalize and write the config as pretty JSON
    pub fn save(&mut self, path: &Path) -> Result<(), ConfigError> {
        self.normalize();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.display().to_string(),
                source: e,
            })?;
        }

        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            source: e,
        })?;

        log::debug!("Config saved to {}", path.display());
        Ok(())
    }

    /// Fill blank ids and names, sort by order and renumber
    pub fn normalize(&mut self) {
        for item in &mut self.items {
            if item.id.trim().is_empty() {
                item.id = new_item_id();
            }
            if item.name.trim().is_empty() {
                item.name = UNNAMED_ITEM.to_string();
            }
        }
        self.items.sort_by_key(|item| item.order);
        self.renumber();
    }

    fn renumber(&mut self) {
        for (index, item) in self.items.iter_mut().enumerate() {
            item.order = index as u32;
        }
    }

    /// Check the items for problems that would make a launch fail
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = std::collections::HashSet::new();

        for item in &self.items {
            if !seen.insert(item.id.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "Item '{}': duplicate id '{}'",
                    item.name, item.id
                )));
            }

            if item.target.trim().is_empty() {
                let field = match item.kind {
                    ItemKind::Url => "url",
                    _ => "path",
                };
                return Err(ConfigError::Validation(format!(
                    "Item '{}': no {} specified",
                    item.name, field
                )));
            }

            if item.kind == ItemKind::Script
                && item.script_interpreter.is_unspecified()
                && ScriptInterpreter::from_extension(&item.target).is_none()
            {
                return Err(ConfigError::Validation(format!(
                    "Item '{}': cannot determine script interpreter for '{}'",
                    item.name, item.target
                )));
            }
        }

        Ok(())
    }

    /// Insert an item at `position` (appended when `None` or past the end)
    pub fn insert(&mut self, item: StartupItem, position: Option<usize>) -> &StartupItem {
        let index = position.unwrap_or(self.items.len()).min(self.items.len());
        self.items.insert(index, item);
        self.renumber();
        &self.items[index]
    }

    /// Remove an item by id reference
    pub fn remove(&mut self, reference: &str) -> Result<StartupItem, ConfigError> {
        let index = self.position_of(reference)?;
        let item = self.items.remove(index);
        self.renumber();
        Ok(item)
    }

    /// Move an item to a new zero-based position
    pub fn move_item(&mut self, reference: &str, position: usize) -> Result<(), ConfigError> {
        let index = self.position_of(reference)?;
        if position >= self.items.len() {
            return Err(ConfigError::Validation(format!(
                "Position {} is out of range (0..{})",
                position,
                self.items.len()
            )));
        }
        let item = self.items.remove(index);
        self.items.insert(position, item);
        self.renumber();
        Ok(())
    }

    pub fn set_enabled(&mut self, reference: &str, enabled: bool) -> Result<(), ConfigError> {
        let index = self.position_of(reference)?;
        self.items[index].enabled = enabled;
        Ok(())
    }

    pub fn find(&self, reference: &str) -> Option<&StartupItem> {
        self.position_of(reference).ok().map(|i| &self.items[i])
    }

    /// Drop all items and settings
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Resolve an exact id or a unique id prefix
    fn position_of(&self, reference: &str) -> Result<usize, ConfigError> {
        if let Some(index) = self.items.iter().position(|item| item.id == reference) {
            return Ok(index);
        }

        let mut matches = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| !reference.is_empty() && item.id.starts_with(reference));

        match (matches.next(), matches.next()) {
            (Some((index, _)), None) => Ok(index),
            (Some(_), Some(_)) => Err(ConfigError::Validation(format!(
                "Item reference '{}' is ambiguous",
                reference
            ))),
            (None, _) => Err(ConfigError::ItemNotFound(reference.to_string())),
        }
    }
}

/// Errors that can occur when loading or editing the configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to access config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Item not found: {0}")]
    ItemNotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with(items: Vec<StartupItem>) -> StartupConfig {
        let mut config = StartupConfig::default();
        for item in items {
            config.insert(item, None);
        }
        config
    }

    #[test]
    fn test_parse_document() {
        let json = r#"{
            "version": "1.0.0",
            "autoRunOnStartup": true,
            "items": [
                { "id": "b", "name": "Docs", "type": "url", "target": "https://docs.rs",
                  "order": 1 },
                { "id": "a", "name": "Editor", "type": "executable", "target": "/usr/bin/code",
                  "args": "--new-window", "delayMs": 2000, "order": 0 }
            ]
        }"#;
        let config = StartupConfig::from_json(json).unwrap();

        assert!(config.auto_run_on_startup);
        assert_eq!(config.login_delay_ms, DEFAULT_LOGIN_DELAY_MS);
        assert_eq!(config.items.len(), 2);
        assert_eq!(config.items[0].id, "a");
        assert_eq!(config.items[0].delay_ms, 2000);
        assert_eq!(config.items[1].kind, ItemKind::Url);
        assert_eq!(config.items[1].order, 1);
    }

    #[test]
    fn test_parse_legacy_fields() {
        let json = r#"{
            "items": [
                { "name": "Site", "type": "url", "path": "", "url": "https://example.com",
                  "delay": 500 },
                { "name": "Setup", "type": "script", "path": "setup.ps1",
                  "scriptType": "powershell", "delay": "250" }
            ]
        }"#;
        let config = StartupConfig::from_json(json).unwrap();

        assert_eq!(config.items[0].target, "https://example.com");
        assert_eq!(config.items[0].delay_ms, 500);
        assert_eq!(config.items[1].target, "setup.ps1");
        assert_eq!(
            config.items[1].script_interpreter,
            ScriptInterpreter::PowerShell
        );
        assert_eq!(config.items[1].delay_ms, 250);
    }

    #[test]
    fn test_defaults_fill_missing_fields() {
        let json = r#"{ "items": [ { "type": "daemon", "target": "/bin/true", "delay": -5 } ] }"#;
        let config = StartupConfig::from_json(json).unwrap();
        let item = &config.items[0];

        assert_eq!(config.version, CONFIG_VERSION);
        assert_eq!(item.name, "Unnamed Item");
        assert_eq!(item.kind, ItemKind::Executable);
        assert_eq!(item.delay_ms, 0);
        assert!(item.enabled);
        assert!(!item.id.is_empty());
    }

    #[test]
    fn test_orders_are_renumbered_densely() {
        let json = r#"{ "items": [
            { "id": "c", "target": "c", "order": 40 },
            { "id": "a", "target": "a", "order": 3 },
            { "id": "b", "target": "b", "order": 17 }
        ] }"#;
        let config = StartupConfig::from_json(json).unwrap();

        let ids: Vec<&str> = config.items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        let orders: Vec<u32> = config.items.iter().map(|i| i.order).collect();
        assert_eq!(orders, vec![0, 1, 2]);
    }

    #[test]
    fn test_negative_order_sorts_first() {
        let json = r#"{ "items": [
            { "id": "a", "target": "a", "order": 0 },
            { "id": "b", "target": "b", "order": -1 },
            { "id": "c", "target": "c" }
        ] }"#;
        let config = StartupConfig::from_json(json).unwrap();

        let ids: Vec<&str> = config.items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
        assert_eq!(config.items[0].order, 0);
    }

    #[test]
    fn test_insert_remove_move_renumber() {
        let mut config = config_with(vec![
            StartupItem::executable("one", "/bin/one").with_id("one"),
            StartupItem::executable("two", "/bin/two").with_id("two"),
            StartupItem::executable("three", "/bin/three").with_id("three"),
        ]);

        let zero = StartupItem::url("zero", "https://a.b").with_id("zero");
        config.insert(zero, Some(0));
        config.move_item("three", 1).unwrap();
        config.remove("one").unwrap();

        let ids: Vec<&str> = config.items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["zero", "three", "two"]);
        let orders: Vec<u32> = config.items.iter().map(|i| i.order).collect();
        assert_eq!(orders, vec![0, 1, 2]);
    }

    #[test]
    fn test_item_references() {
        let mut config = config_with(vec![
            StartupItem::executable("a", "/bin/a").with_id("abc-123"),
            StartupItem::executable("b", "/bin/b").with_id("abd-456"),
        ]);

        assert_eq!(config.find("abc").map(|i| i.name.as_str()), Some("a"));
        assert!(matches!(
            config.set_enabled("ab", false),
            Err(ConfigError::Validation(_))
        ));
        assert!(matches!(
            config.remove("zzz"),
            Err(ConfigError::ItemNotFound(_))
        ));
        assert!(matches!(
            config.move_item("abd", 5),
            Err(ConfigError::Validation(_))
        ));

        config.set_enabled("abd-456", false).unwrap();
        assert!(!config.items[1].enabled);
    }

    #[test]
    fn test_validate() {
        let ok = config_with(vec![
            StartupItem::script("sync", "sync.py"),
            StartupItem::url("mail", "https://mail.example.com"),
        ]);
        assert!(ok.validate().is_ok());

        let missing_path = config_with(vec![StartupItem::executable("broken", " ")]);
        assert!(matches!(
            missing_path.validate(),
            Err(ConfigError::Validation(msg)) if msg.contains("no path")
        ));

        let unknown_script = config_with(vec![StartupItem::script("shell", "run.sh")]);
        assert!(unknown_script.validate().is_err());

        let duplicate = config_with(vec![
            StartupItem::url("a", "https://a").with_id("same"),
            StartupItem::url("b", "https://b").with_id("same"),
        ]);
        assert!(duplicate.validate().is_err());
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut config = config_with(vec![StartupItem::url("a", "https://a")]);
        config.auto_run_on_startup = true;
        config.login_delay_ms = 0;

        config.reset();

        assert_eq!(config, StartupConfig::default());
    }

    #[test]
    fn test_parse_error_is_reported() {
        assert!(matches!(
            StartupConfig::from_json("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }
}
