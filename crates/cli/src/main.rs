// FILE: crates/cli/src/main.rs

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::path::{Path, PathBuf};
use taletiles_config::{Settings, SettingsManager, StateStore};
use taletiles_core::system_clock;
use taletiles_player::{PlayerContext, PlayerRuntime, RuntimeOptions};

mod commands;
mod keyboard;

fn build_cli() -> Command {
    Command::new("taletiles")
        .version(env!("CARGO_PKG_VERSION"))
        .about("RFID card audiobook player")
        .arg(
            Arg::new("settings")
                .long("settings")
                .value_name("PATH")
                .help("Path to settings.toml (default: platform config directory)")
                .global(true),
        )
        .arg(
            Arg::new("state")
                .long("state")
                .value_name("PATH")
                .help("Path to the state document (default: app.state_file from settings)")
                .global(true),
        )
        .subcommand(
            Command::new("run")
                .about("Run the player until interrupted")
                .arg(
                    Arg::new("mock")
                        .short('m')
                        .long("mock")
                        .help("Use the keyboard instead of the card reader and buttons")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("audiobooks")
                        .short('a')
                        .long("audiobooks")
                        .value_name("DIR")
                        .help("Audiobooks directory"),
                ),
        )
        .subcommand(
            Command::new("add")
                .about("Register an audiobook folder for a card")
                .arg(Arg::new("card").required(true).value_name("CARD_ID").help("Card identifier"))
                .arg(Arg::new("folder").required(true).value_name("FOLDER").help("Audiobook folder"))
                .arg(
                    Arg::new("title")
                        .short('t')
                        .long("title")
                        .value_name("TITLE")
                        .help("Display title (default: metadata title, then folder name)"),
                )
                .arg(
                    Arg::new("force")
                        .short('f')
                        .long("force")
                        .help("Replace an existing registration")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(Command::new("list").about("List registered cards"))
        .subcommand(Command::new("check").about("Report registrations whose folder is missing"))
        .subcommand(
            Command::new("remove")
                .about("Unregister a card")
                .arg(Arg::new("card").required(true).value_name("CARD_ID").help("Card identifier")),
        )
        .subcommand(Command::new("scan").about("List audiobook folders with no card"))
}

fn init_logging(settings: &Settings) {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(settings.app.log_level.to_string()),
    )
    .init();
}

fn settings_manager(matches: &ArgMatches) -> Result<SettingsManager> {
    match matches.get_one::<String>("settings") {
        Some(path) => Ok(SettingsManager::with_file(PathBuf::from(path))),
        None => SettingsManager::new().context("Failed to locate the settings directory"),
    }
}

fn main() -> Result<()> {
    let matches = build_cli().get_matches();

    let manager = settings_manager(&matches)?;
    let mut settings = manager
        .load_with_env_overrides()
        .with_context(|| format!("Failed to load {}", manager.settings_path().display()))?;
    if let Some(("run", sub)) = matches.subcommand() {
        if let Some(dir) = sub.get_one::<String>("audiobooks") {
            settings.app.audiobooks_dir = PathBuf::from(dir);
        }
    }
    init_logging(&settings);

    let state_path = matches
        .get_one::<String>("state")
        .map(PathBuf::from)
        .unwrap_or_else(|| manager.resolve(&settings.app.state_file));
    let audiobooks_dir = manager.resolve(&settings.app.audiobooks_dir);

    if let Some(parent) = state_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Cannot create state directory {}", parent.display()))?;
    }
    let mut store = StateStore::open(&state_path)
        .with_context(|| format!("Failed to open state file {}", state_path.display()))?;

    match matches.subcommand() {
        Some(("run", sub)) => run_player(settings, store, &audiobooks_dir, sub.get_flag("mock")),
        Some(("add", sub)) => commands::add_card(&mut store, &audiobooks_dir, sub),
        Some(("list", _)) => commands::list_cards(&store),
        Some(("check", _)) => {
            if !commands::check_cards(&store) {
                std::process::exit(1);
            }
            Ok(())
        }
        Some(("remove", sub)) => commands::remove_card(&mut store, sub),
        Some(("scan", _)) => commands::scan_folders(&store, &audiobooks_dir),
        _ => {
            build_cli().print_help()?;
            Ok(())
        }
    }
}

fn run_player(settings: Settings, store: StateStore, audiobooks_dir: &Path, mock: bool) -> Result<()> {
    log::info!("Starting TaleTiles (state: {})", store.path().display());
    log::info!("{} card(s) registered", store.len());
    for missing in store.validate_paths() {
        log::warn!(
            "Audiobook '{}' for card {} not found at {}",
            missing.title,
            missing.card_id,
            missing.path.display()
        );
    }
    match commands::unregistered_folders(&store, audiobooks_dir) {
        Ok(folders) if !folders.is_empty() => log::info!(
            "{} unregistered audiobook folder(s) in {}",
            folders.len(),
            audiobooks_dir.display()
        ),
        Ok(_) => {}
        Err(e) => log::warn!("{:#}", e),
    }

    let context = PlayerContext::new(settings, system_clock());
    let runtime = PlayerRuntime::start(
        context.clone(),
        store,
        RuntimeOptions {
            mock,
            ..RuntimeOptions::default()
        },
    )
    .context("Failed to start player")?;

    let handles = runtime.handles();
    context
        .install_signal_handler(handles.events.clone())
        .context("Failed to install signal handler")?;
    if mock {
        keyboard::spawn(handles).context("Failed to start keyboard input")?;
    }

    runtime.run().context("Player stopped with an error")
}
