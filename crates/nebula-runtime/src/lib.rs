#![deny(warnings)]

//! Game runtime for Planetfall.
//!
//! [`GameStore`] owns the session state and performs every transition
//! (roll, reroll, purchase, auto-roll toggle, daily reroll refill), writing
//! each committed change to a [`persistence::SaveSlot`]. [`Engine`] runs a
//! store on its own tokio task and drives the auto-roll timer.

mod config;
mod engine;
mod state;
mod store;

pub use config::{ConfigError, GameConfig};
pub use engine::{Discovery, Engine, EngineError, RollSource};
pub use state::GameState;
pub use store::{GameStore, PurchaseOutcome, UpgradeStatus};
