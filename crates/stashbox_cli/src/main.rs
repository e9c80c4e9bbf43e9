//! Inspection CLI over `stashbox_core`.
//!
//! Prints the inventory hierarchy with derived values, and can seed or reset
//! the canonical demo dataset.

use clap::{Parser, Subcommand};
use stashbox_core::service::demo;
use stashbox_core::{
    init_logging, InventoryOverview, InventoryService, Repository, StashboxConfig, Store,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "stashbox", version, about = "Personal inventory tracker")]
struct Cli {
    /// SQLite database file (defaults to STASHBOX_DB_PATH, else in-memory).
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Clear the store and load the demo dataset before running the command.
    #[arg(long, global = true)]
    demo: bool,

    /// Allow `--demo` and `reset` to wipe a populated database file.
    #[arg(long, global = true)]
    yes: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Command {
    /// Totals plus the collection -> box -> item tree.
    Overview,
    /// Every item, newest first.
    Items,
    /// Every box with its derived value.
    Boxes,
    /// Every collection with its derived value.
    Collections,
    /// Delete every record. A populated database file needs `--yes`.
    Reset,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("stashbox: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), String> {
    let mut config = StashboxConfig::from_env().map_err(|err| err.to_string())?;
    if cli.db.is_some() {
        config.db_path = cli.db;
    }
    config.demo_mode |= cli.demo;

    if let Some(log_dir) = &config.log_dir {
        init_logging(&config.log_level, log_dir).map_err(|err| err.to_string())?;
    }

    let store = config.open_store().map_err(|err| err.to_string())?;
    let command = cli.command.unwrap_or(Command::Overview);
    if config.demo_mode || matches!(command, Command::Reset) {
        guard_clear(&store, config.db_path.as_deref(), cli.yes)?;
    }
    if config.demo_mode {
        demo::reset(&store).map_err(|err| err.to_string())?;
        demo::seed_demo_data(&store).map_err(|err| err.to_string())?;
    }

    match command {
        Command::Overview => print_overview(&store),
        Command::Items => print_items(&store),
        Command::Boxes => print_boxes(&store),
        Command::Collections => print_collections(&store),
        Command::Reset => {
            demo::reset(&store).map_err(|err| err.to_string())?;
            println!("store cleared");
            Ok(())
        }
    }
}

/// Refuses to wipe a populated database file unless the caller confirmed.
///
/// In-memory stores start empty every run, so they are never guarded.
fn guard_clear(store: &Store, db_path: Option<&Path>, confirmed: bool) -> Result<(), String> {
    let Some(path) = db_path else {
        return Ok(());
    };
    if confirmed {
        return Ok(());
    }
    let summary = overview(store)?.summary;
    let records = summary.collection_count + summary.box_count + summary.item_count;
    if records == 0 {
        return Ok(());
    }
    Err(format!(
        "refusing to clear {} ({records} records); rerun with --yes",
        path.display()
    ))
}

fn overview(store: &Store) -> Result<InventoryOverview, String> {
    InventoryService::new(store.clone())
        .overview()
        .map_err(|err| err.to_string())
}

fn print_overview(store: &Store) -> Result<(), String> {
    let overview = overview(store)?;
    let summary = &overview.summary;
    println!(
        "total={} collections={} boxes={} items={} fragile_items={}",
        summary.total_value,
        summary.collection_count,
        summary.box_count,
        summary.item_count,
        summary.fragile_item_count
    );

    for collection in &overview.collections {
        println!(
            "{}{}  {}",
            collection.collection.name,
            fragile_marker(collection.is_fragile),
            collection.value
        );
        for storage_box in overview
            .boxes
            .iter()
            .filter(|summary| summary.storage_box.collection_id == Some(collection.collection.id))
        {
            print_box_branch(&overview, storage_box, "  ");
        }
    }

    let orphan_boxes: Vec<_> = overview.orphan_boxes().collect();
    if !orphan_boxes.is_empty() {
        println!("(no collection)");
        for storage_box in orphan_boxes {
            print_box_branch(&overview, storage_box, "  ");
        }
    }

    let orphan_items: Vec<_> = overview.orphan_items().collect();
    if !orphan_items.is_empty() {
        println!("(no box)");
        for item in orphan_items {
            println!("  {}{}  {}", item.name, fragile_marker(item.is_fragile), item.value);
        }
    }
    Ok(())
}

fn print_box_branch(
    overview: &InventoryOverview,
    storage_box: &stashbox_core::BoxSummary,
    indent: &str,
) {
    println!(
        "{indent}{}{}  {}",
        storage_box.storage_box.name,
        fragile_marker(storage_box.is_fragile),
        storage_box.value
    );
    for item in overview
        .items
        .iter()
        .filter(|item| item.box_id == Some(storage_box.storage_box.id))
    {
        println!(
            "{indent}  {}{}  {}",
            item.name,
            fragile_marker(item.is_fragile),
            item.value
        );
    }
}

fn print_items(store: &Store) -> Result<(), String> {
    let items = store.items().list_all().map_err(|err| err.to_string())?;
    for item in items {
        println!(
            "{}  {}{}  {}",
            item.id,
            item.name,
            fragile_marker(item.is_fragile),
            item.value
        );
    }
    Ok(())
}

fn print_boxes(store: &Store) -> Result<(), String> {
    for summary in overview(store)?.boxes {
        println!(
            "{}  {}{}  {} ({} items)",
            summary.storage_box.id,
            summary.storage_box.name,
            fragile_marker(summary.is_fragile),
            summary.value,
            summary.item_count
        );
    }
    Ok(())
}

fn print_collections(store: &Store) -> Result<(), String> {
    for summary in overview(store)?.collections {
        println!(
            "{}  {}{}  {} ({} boxes)",
            summary.collection.id,
            summary.collection.name,
            fragile_marker(summary.is_fragile),
            summary.value,
            summary.box_count
        );
    }
    Ok(())
}

fn fragile_marker(is_fragile: bool) -> &'static str {
    if is_fragile {
        " [fragile]"
    } else {
        ""
    }
}

#[cfg(test)]
mod tests {
    use super::guard_clear;
    use stashbox_core::{Item, Money, Repository, Store};
    use std::path::Path;

    fn populated() -> Store {
        let store = Store::open_in_memory().unwrap();
        store
            .items()
            .insert(&Item::new("Heirloom", Money::from_units(500, 0)))
            .unwrap();
        store
    }

    #[test]
    fn populated_file_database_needs_confirmation() {
        let store = populated();
        let path = Path::new("inventory.sqlite3");

        let err = guard_clear(&store, Some(path), false).unwrap_err();

        assert!(err.contains("--yes"));
        assert!(err.contains("1 records"));
        assert_eq!(store.items().list_all().unwrap().len(), 1);
    }

    #[test]
    fn confirmation_allows_clearing() {
        let store = populated();
        assert!(guard_clear(&store, Some(Path::new("inventory.sqlite3")), true).is_ok());
    }

    #[test]
    fn empty_or_in_memory_store_is_not_guarded() {
        let empty = Store::open_in_memory().unwrap();
        assert!(guard_clear(&empty, Some(Path::new("fresh.sqlite3")), false).is_ok());
        assert!(guard_clear(&populated(), None, false).is_ok());
    }
}
