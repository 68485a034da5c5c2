#![deny(warnings)]

//! Headless CLI for playing Planetfall against a save file.

use anyhow::Result;
use nebula_core::{Catalog, Planet};
use nebula_runtime::{
    Discovery, Engine, GameConfig, GameState, GameStore, PurchaseOutcome, RollSource,
};
use persistence::FileSlot;
use std::time::Duration;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::time::{self, Instant};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default)]
struct Args {
    config: Option<String>,
    save: Option<String>,
    seed: Option<u64>,
    rolls: u32,
    reroll: bool,
    buy: Vec<String>,
    auto_secs: Option<u64>,
    show: bool,
    version: bool,
}

fn parse_args() -> Args {
    let mut args = Args::default();
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--config" => args.config = it.next(),
            "--save" => args.save = it.next(),
            "--seed" => args.seed = it.next().and_then(|s| s.parse().ok()),
            "--rolls" => args.rolls = it.next().and_then(|s| s.parse().ok()).unwrap_or(0),
            "--reroll" => args.reroll = true,
            "--buy" => args.buy.extend(it.next()),
            "--auto-secs" => args.auto_secs = it.next().and_then(|s| s.parse().ok()),
            "--show" => args.show = true,
            "--version" | "-V" => args.version = true,
            _ => {}
        }
    }
    args
}

fn describe(planet: &Planet) -> String {
    format!(
        "[{}] {} | {} {} world, {} atmosphere, {} | size {:.2} | {}",
        planet.rarity,
        planet.name,
        planet.temperature,
        planet.kind,
        planet.atmosphere,
        planet.terrain,
        planet.size,
        planet.traits.join(", ")
    )
}

fn print_status(state: &GameState, catalog: &Catalog) {
    println!(
        "Rolls: {} | rerolls left: {} | auto-roll: {}",
        state.roll_count,
        state.daily_rerolls,
        if state.auto_roll { "on" } else { "off" }
    );
    if let Some(planet) = &state.current_planet {
        println!("Current: {}", describe(planet));
    }
    println!("Odds:");
    for (tier, p) in state.current.iter() {
        println!("  {:<11} {:>8.4}%", tier, p * 100.0);
    }
    println!("Upgrades:");
    for def in catalog.iter() {
        let mark = if state.owned.contains(&def.id.0) {
            "owned"
        } else if state.roll_count >= def.cost {
            "ready"
        } else {
            "locked"
        };
        println!("  {:<20} {:>5}  {:<6} {}", def.id.0, def.cost, mark, def.summary);
    }
}

/// Print auto-rolled discoveries until `deadline` or until the engine stops.
/// Skipped events are logged and following continues.
async fn follow_auto_rolls(
    events: &mut broadcast::Receiver<Discovery>,
    deadline: Instant,
    mut show: impl FnMut(&Planet),
) -> usize {
    let mut shown = 0;
    loop {
        match time::timeout_at(deadline, events.recv()).await {
            Ok(Ok(found)) => {
                if found.source == RollSource::Auto {
                    show(&found.planet);
                    shown += 1;
                }
            }
            Ok(Err(RecvError::Lagged(skipped))) => {
                warn!(skipped, "discovery output fell behind");
            }
            Ok(Err(RecvError::Closed)) | Err(_) => break,
        }
    }
    shown
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logging setup
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = parse_args();
    if args.version {
        println!(
            "planetfall {} ({} built {})",
            env!("CARGO_PKG_VERSION"),
            env!("GIT_SHA"),
            env!("BUILD_DATE")
        );
        return Ok(());
    }

    let mut config = match &args.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    if let Some(save) = &args.save {
        config.save_path = save.into();
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    info!(save = %config.save_path.display(), seed = ?config.seed, "starting CLI");

    let catalog = Catalog::standard();
    let slot = FileSlot::new(&config.save_path);
    let engine = Engine::spawn(GameStore::load(config, slot));

    for id in &args.buy {
        match engine.purchase_upgrade(id).await? {
            PurchaseOutcome::Purchased => println!("Purchased {}", id),
            PurchaseOutcome::AlreadyOwned => println!("Already own {}", id),
            PurchaseOutcome::Unaffordable => println!("Not enough rolls for {}", id),
            PurchaseOutcome::Unknown => println!("No upgrade named {}", id),
        }
    }

    for _ in 0..args.rolls {
        let planet = engine.roll().await?;
        println!("Discovered {}", describe(&planet));
    }

    if args.reroll {
        match engine.reroll().await? {
            Some(planet) => println!("Rerolled {}", describe(&planet)),
            None => println!("No rerolls left today"),
        }
    }

    if let Some(secs) = args.auto_secs {
        let mut events = engine.subscribe();
        if engine.toggle_auto_roll().await? {
            let deadline = Instant::now() + Duration::from_secs(secs);
            let shown = follow_auto_rolls(&mut events, deadline, |planet| {
                println!("Auto-discovered {}", describe(planet));
            })
            .await;
            info!(shown, "auto-roll session finished");
            engine.toggle_auto_roll().await?;
        } else {
            println!("Auto-roll needs the auto-discovery upgrade and enough rolls");
        }
    }

    let state = engine.snapshot().await?;
    let idle = args.rolls == 0 && !args.reroll && args.buy.is_empty() && args.auto_secs.is_none();
    if args.show || idle {
        print_status(&state, &catalog);
    }
    engine.shutdown().await?;
    Ok(())
}
