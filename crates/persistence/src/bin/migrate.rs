#![deny(warnings)]

//! Rewrites a save file in the current schema, repairing what it can.

use persistence::{decode, default_save_path, encode, FileSlot, SaveSlot, SAVE_VERSION};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| default_save_path().to_string());
    let mut slot = FileSlot::new(&path);
    let Some(text) = slot.load()? else {
        println!("No save at {}", path);
        return Ok(());
    };

    let mut doc = decode(&text);
    doc.version = SAVE_VERSION;
    slot.store(&encode(&doc)?)?;
    info!(
        rolls = doc.roll_count,
        planets = doc.history.len(),
        owned = doc.owned_ids().count(),
        "save migrated"
    );
    println!("Save migrated to v{} at {}", SAVE_VERSION, path);
    Ok(())
}
