//! Config file tests against a temporary directory

use startup_launch::{ConfigError, ItemKind, ScriptInterpreter, StartupConfig, StartupItem};
use tempfile::TempDir;

#[test]
fn test_load_creates_default_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("startup-config.json");

    let config = StartupConfig::load(&path).unwrap();

    assert_eq!(config, StartupConfig::default());
    assert!(path.exists());
    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(written["autoRunOnStartup"], false);
    assert_eq!(written["loginDelayMs"], 3000);
    assert_eq!(written["items"], serde_json::json!([]));
}

#[test]
fn test_save_and_reload() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("startup-config.json");

    let mut config = StartupConfig::load(&path).unwrap();
    config.auto_run_on_startup = true;
    config.insert(
        StartupItem::url("Mail", "https://mail.example.com").with_delay_ms(1000),
        None,
    );
    config.insert(
        StartupItem::script("Sync", "/home/me/sync")
            .with_interpreter(ScriptInterpreter::Python)
            .with_args("--quiet"),
        None,
    );
    config.insert(
        StartupItem::executable("Editor", "/usr/bin/code").with_enabled(false),
        Some(0),
    );
    config.save(&path).unwrap();

    let loaded = StartupConfig::load(&path).unwrap();
    assert_eq!(loaded, config);

    let names: Vec<&str> = loaded.items.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["Editor", "Mail", "Sync"]);
    let sync = &loaded.items[2];
    assert_eq!(sync.script_interpreter, ScriptInterpreter::Python);
    assert!(loaded.validate().is_ok());
}

#[test]
fn test_edits_persist_through_references() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("startup-config.json");

    let mut config = StartupConfig::default();
    for (name, id) in [("a", "aaaa-1"), ("b", "bbbb-2"), ("c", "cccc-3")] {
        let item = StartupItem::executable(name, format!("/bin/{}", name));
        config.insert(item.with_id(id), None);
    }
    config.save(&path).unwrap();

    let mut config = StartupConfig::load(&path).unwrap();
    config.move_item("cccc", 0).unwrap();
    config.set_enabled("bbbb", false).unwrap();
    config.remove("aaaa-1").unwrap();
    config.save(&path).unwrap();

    let config = StartupConfig::load(&path).unwrap();
    let summary: Vec<(&str, u32, bool)> = config
        .items
        .iter()
        .map(|i| (i.id.as_str(), i.order, i.enabled))
        .collect();
    assert_eq!(summary, vec![("cccc-3", 0, true), ("bbbb-2", 1, false)]);
}

#[test]
fn test_legacy_document_is_normalized_on_save() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("startup-config.json");
    std::fs::write(
        &path,
        r#"{
            "version": "1.0.0",
            "autoRunOnStartup": false,
            "items": [
                { "id": "x", "name": "Site", "type": "url", "path": "",
                  "url": "https://example.com", "delay": 500, "enabled": true, "order": 4 },
                { "id": "y", "name": "Tool", "type": "EXE", "path": "C:\\tools\\tool.exe",
                  "delay": 0, "enabled": true, "order": 2 }
            ]
        }"#,
    )
    .unwrap();

    let mut config = StartupConfig::load(&path).unwrap();
    assert_eq!(config.items[0].kind, ItemKind::Executable);
    assert_eq!(config.items[1].target, "https://example.com");
    config.save(&path).unwrap();

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let items = written["items"].as_array().unwrap();
    assert_eq!(items[0]["id"], "y");
    assert_eq!(items[0]["target"], "C:\\tools\\tool.exe");
    assert_eq!(items[0]["order"], 0);
    assert_eq!(items[1]["type"], "url");
    assert_eq!(items[1]["delayMs"], 500);
    assert!(items[1].get("path").is_none());
}

#[test]
fn test_corrupt_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("startup-config.json");
    std::fs::write(&path, "{ \"items\": [ ").unwrap();

    assert!(matches!(
        StartupConfig::load(&path),
        Err(ConfigError::Parse(_))
    ));
}
