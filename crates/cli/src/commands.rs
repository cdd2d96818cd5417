// FILE: crates/cli/src/commands.rs

use anyhow::{bail, Context, Result};
use chrono::NaiveDateTime;
use clap::ArgMatches;
use console::style;
use std::fs;
use std::path::{Path, PathBuf};
use taletiles_config::{AudiobookRegistration, StateStore};
use taletiles_core::CardId;

/// Register a folder for a card
pub fn add_card(store: &mut StateStore, audiobooks_dir: &Path, matches: &ArgMatches) -> Result<()> {
    let card_id = matches
        .get_one::<String>("card")
        .ok_or_else(|| anyhow::anyhow!("Card ID is required"))?;
    let folder = matches
        .get_one::<String>("folder")
        .ok_or_else(|| anyhow::anyhow!("Folder is required"))?;
    let force = matches.get_flag("force");
    let title = matches.get_one::<String>("title").cloned();

    let registration = register(
        store,
        CardId::new(card_id.trim()),
        &resolve_folder(folder, audiobooks_dir),
        title,
        force,
    )?;

    println!("{} Card registered", style("✓").green().bold());
    println!("  Card:   {}", registration.card_id);
    println!("  Title:  {}", registration.title);
    println!("  Folder: {}", registration.folder_path.display());
    Ok(())
}

pub fn register(
    store: &mut StateStore,
    card_id: CardId,
    folder: &Path,
    title: Option<String>,
    force: bool,
) -> Result<AudiobookRegistration> {
    if card_id.as_str().is_empty() {
        bail!("Card ID must not be empty");
    }
    if !folder.is_dir() {
        bail!("Folder not found: {}", folder.display());
    }
    media_engine::audio_files(folder)
        .ok()
        .filter(|files| !files.is_empty())
        .with_context(|| format!("No audio files in {}", folder.display()))?;

    if let Some(existing) = store.get(&card_id) {
        if !force {
            bail!(
                "Card {} is already registered to '{}' (use --force to replace it)",
                card_id,
                existing.title
            );
        }
        log::warn!("Replacing registration of card {}", card_id);
    }
    if let Some(other) = store.find_card_by_path(folder).filter(|other| other != &card_id) {
        log::warn!("{} is also registered to card {}", folder.display(), other);
    }

    let title = title
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| media_engine::read_title(folder));
    store
        .register(card_id, folder, title)
        .context("Failed to save registration")
}

/// List every registered card
pub fn list_cards(store: &StateStore) -> Result<()> {
    let registrations = store.all();
    if registrations.is_empty() {
        println!("No cards registered. Use 'add' to register an audiobook folder.");
        return Ok(());
    }

    println!(
        "\n{} Registered Cards  (volume {}%)",
        style(registrations.len()).bold().cyan(),
        store.volume()
    );
    println!("{}", "=".repeat(80));

    for registration in &registrations {
        print_registration(registration);
    }
    Ok(())
}

/// Report registrations whose folder is gone. Returns whether all are present.
pub fn check_cards(store: &StateStore) -> bool {
    let missing = store.validate_paths();
    if missing.is_empty() {
        println!(
            "{} All {} registered folders are present",
            style("✓").green().bold(),
            store.len()
        );
        return true;
    }

    println!("{} {} missing audiobook folder(s):", style("✗").red().bold(), missing.len());
    for entry in &missing {
        println!(
            "  {}  {}  {}",
            style(entry.card_id.abbreviated(12)).yellow(),
            entry.title,
            style(entry.path.display()).dim()
        );
    }
    false
}

/// Remove a card's registration
pub fn remove_card(store: &mut StateStore, matches: &ArgMatches) -> Result<()> {
    let card_id = matches
        .get_one::<String>("card")
        .ok_or_else(|| anyhow::anyhow!("Card ID is required"))?;
    let card_id = CardId::new(card_id.trim());

    if store.unregister(&card_id).context("Failed to save state")? {
        println!("{} Removed card {}", style("✓").green().bold(), card_id);
    } else {
        println!("Card {} was not registered", card_id);
    }
    Ok(())
}

/// List audiobook folders that no card points at
pub fn scan_folders(store: &StateStore, audiobooks_dir: &Path) -> Result<()> {
    let folders = unregistered_folders(store, audiobooks_dir)?;
    if folders.is_empty() {
        println!("No unregistered audiobooks in {}", audiobooks_dir.display());
        return Ok(());
    }

    println!(
        "\n{} Unregistered Audiobooks in {}",
        style(folders.len()).bold().cyan(),
        audiobooks_dir.display()
    );
    println!("{}", "=".repeat(80));
    for folder in folders {
        println!("  {}", style(media_engine::read_title(&folder)).bold());
        println!("    {}", style(folder.display()).dim());
    }
    Ok(())
}

/// Subdirectories of `audiobooks_dir` holding audio files and no registration
pub fn unregistered_folders(store: &StateStore, audiobooks_dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(audiobooks_dir)
        .with_context(|| format!("Failed to read {}", audiobooks_dir.display()))?;

    let mut folders: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_dir())
        .filter(|path| {
            media_engine::audio_files(path)
                .map(|files| !files.is_empty())
                .unwrap_or(false)
        })
        .filter(|path| store.find_card_by_path(path).is_none())
        .collect();
    folders.sort();
    Ok(folders)
}

/// A bare folder name is looked up under the audiobooks directory
fn resolve_folder(folder: &str, audiobooks_dir: &Path) -> PathBuf {
    let path = PathBuf::from(folder);
    if path.exists() || path.is_absolute() {
        return path;
    }
    let candidate = audiobooks_dir.join(&path);
    if candidate.is_dir() {
        candidate
    } else {
        path
    }
}

fn print_registration(registration: &AudiobookRegistration) {
    println!("\n{}", style(&registration.title).bold());
    println!(
        "  Card: {} | Position: {} | Last played: {}",
        registration.card_id,
        format_position(registration.current_file_index, registration.position_seconds),
        format_last_played(registration.last_played)
    );
    let folder = if registration.folder_path.is_dir() {
        style(registration.folder_path.display().to_string()).dim()
    } else {
        style(format!("{} (missing)", registration.folder_path.display())).red()
    };
    println!("  {}", folder);
}

fn format_position(file_index: usize, seconds: f64) -> String {
    if file_index == 0 && seconds <= 0.0 {
        return "not started".to_string();
    }
    let total = seconds.max(0.0) as u64;
    format!(
        "file {}, {}:{:02}:{:02}",
        file_index + 1,
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

fn format_last_played(last_played: Option<NaiveDateTime>) -> String {
    last_played
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "never".to_string())
}

#[cfg(test)]
mod tests;
