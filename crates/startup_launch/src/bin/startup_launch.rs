//! Startup Launch CLI
//!
//! Usage:
//!   startup_launch add --type url https://mail.example.com
//!   startup_launch add --type script ~/bin/sync.py -d 2000
//!   startup_launch run
//!   startup_launch autostart enable

use startup_launch::autostart::Autostart;
use startup_launch::cli::{AutostartAction, Command, LaunchArgs, RunArgs};
use startup_launch::{
    ChannelSink, CliError, DesktopNotifier, EngineEvent, LogNotifier, LogSink, Notifier,
    SequenceEngine, StartupConfig,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() {
    let args: LaunchArgs = argh::from_env();

    // Initialize logging
    let log_level = match args.log_level.to_lowercase().as_str() {
        "error" => "error",
        "warn" => "warn",
        "info" => "info",
        "debug" => "debug",
        "trace" => "trace",
        _ => "info",
    };
    let env = env_logger::Env::default().default_filter_or(log_level);
    env_logger::init_from_env(env);

    let config_path = args.config_path();
    let notifier: Arc<dyn Notifier> = if args.quiet_notifications {
        Arc::new(LogNotifier)
    } else {
        Arc::new(DesktopNotifier::new("Startup Launch"))
    };

    let result = match &args.command {
        Command::Run(run) => run_sequence(run, &config_path, notifier).await,
        Command::List(_) => list_items(&config_path),
        Command::Add(add) => edit_config(&config_path, |config| {
            let item = config.insert(add.to_item(), add.position);
            println!("Added '{}' ({})", item.name, item.id);
            Ok(())
        }),
        Command::Remove(remove) => edit_config(&config_path, |config| {
            let item = config.remove(&remove.id)?;
            println!("Removed '{}'", item.name);
            Ok(())
        }),
        Command::Move(mv) => edit_config(&config_path, |config| {
            config.move_item(&mv.id, mv.position)?;
            println!("Moved '{}' to position {}", mv.id, mv.position);
            Ok(())
        }),
        Command::Enable(enable) => edit_config(&config_path, |config| {
            config.set_enabled(&enable.id, true)?;
            Ok(())
        }),
        Command::Disable(disable) => edit_config(&config_path, |config| {
            config.set_enabled(&disable.id, false)?;
            Ok(())
        }),
        Command::Validate(_) => validate(&config_path),
        Command::Autostart(autostart) => {
            manage_autostart(autostart.action, &config_path, args.config.is_some())
        }
    };

    if let Err(e) = result {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run_sequence(
    args: &RunArgs,
    config_path: &Path,
    notifier: Arc<dyn Notifier>,
) -> Result<(), CliError> {
    log::info!("Loading config: {}", config_path.display());
    let config = StartupConfig::load(config_path)?;

    if args.startup {
        if !config.auto_run_on_startup || config.items.is_empty() {
            log::info!("Auto-run at login is off or nothing is configured, exiting");
            return Ok(());
        }
        log::info!(
            "Started at login, waiting {}ms before running",
            config.login_delay_ms
        );
        tokio::time::sleep(Duration::from_millis(config.login_delay_ms)).await;
    }

    // Login-started runs have no terminal, events only go to the log
    let result = if args.startup {
        let engine = SequenceEngine::with_system_launcher(Arc::new(LogSink), notifier);
        engine.run(&config.items).await
    } else {
        let (sink, mut events) = ChannelSink::new();
        let engine = SequenceEngine::with_system_launcher(Arc::new(sink), notifier);

        // Set up Ctrl+C handler
        {
            let cancel = engine.cancel_handle();
            ctrlc::set_handler(move || {
                log::info!("Received Ctrl+C, stopping before the next item...");
                cancel.cancel();
            })?;
        }

        let printer = tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                match event {
                    EngineEvent::Progress(progress) => println!("{}", progress),
                    EngineEvent::Error(message) => eprintln!("error: {}", message),
                    EngineEvent::Complete(done) => {
                        println!("Done: {} item(s) attempted", done.executed_count)
                    }
                }
            }
        });

        let result = engine.run(&config.items).await;

        // Dropping the engine closes the event channel and ends the printer
        drop(engine);
        let _ = printer.await;
        result
    };

    if result.success() {
        return Ok(());
    }
    let reason = match result.message {
        Some(message) => message,
        None => format!("{:?}", result.status),
    };
    Err(CliError::Run(reason))
}

fn list_items(config_path: &Path) -> Result<(), CliError> {
    let config = StartupConfig::load(config_path)?;

    if config.items.is_empty() {
        println!("No items configured ({})", config_path.display());
        return Ok(());
    }

    println!("Auto-run at login: {}", on_off(config.auto_run_on_startup));
    for item in &config.items {
        let id: String = item.id.chars().take(8).collect();
        println!(
            "  {:>2}. [{}] {:<10} {} ({})",
            item.order,
            if item.enabled { "x" } else { " " },
            item.kind,
            item.name,
            id
        );
        println!("      Target: {}", item.target);
        if !item.args.is_empty() {
            println!("      Args: {}", item.args);
        }
        if !item.script_interpreter.is_unspecified() {
            println!("      Interpreter: {}", item.script_interpreter);
        }
        if item.delay_ms > 0 {
            println!("      Delay after: {}ms", item.delay_ms);
        }
    }
    Ok(())
}

fn edit_config<F>(config_path: &Path, edit: F) -> Result<(), CliError>
where
    F: FnOnce(&mut StartupConfig) -> Result<(), CliError>,
{
    let mut config = StartupConfig::load(config_path)?;
    edit(&mut config)?;
    config.save(config_path)?;
    Ok(())
}

fn validate(config_path: &Path) -> Result<(), CliError> {
    let config = StartupConfig::load(config_path)?;
    config.validate()?;

    let enabled = config.items.iter().filter(|i| i.enabled).count();
    println!("Config '{}' is valid", config_path.display());
    println!("  Version: {}", config.version);
    println!("  Items: {} ({} enabled)", config.items.len(), enabled);
    let auto_run = on_off(config.auto_run_on_startup);
    println!("  Auto-run at login: {}", auto_run);
    Ok(())
}

fn manage_autostart(
    action: AutostartAction,
    config_path: &Path,
    custom_config: bool,
) -> Result<(), CliError> {
    let autostart = Autostart::new()?;
    let exe = std::env::current_exe().map_err(CliError::CurrentExe)?;
    let entry_config = custom_config.then_some(config_path);

    let enabled = match action {
        AutostartAction::Status => {
            let config = StartupConfig::load(config_path)?;
            let installed = if autostart.is_enabled() {
                "installed"
            } else {
                "not installed"
            };
            println!(
                "Login entry: {} ({})",
                installed,
                autostart.entry_path().display()
            );
            println!("Auto-run at login: {}", on_off(config.auto_run_on_startup));
            return Ok(());
        }
        AutostartAction::Enable => {
            autostart.enable(&exe, entry_config)?;
            true
        }
        AutostartAction::Disable => {
            autostart.disable()?;
            false
        }
        AutostartAction::Toggle => autostart.toggle(&exe, entry_config)?,
    };

    edit_config(config_path, |config| {
        config.auto_run_on_startup = enabled;
        Ok(())
    })?;
    println!(
        "Login autostart {}",
        if enabled { "enabled" } else { "disabled" }
    );
    Ok(())
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}
