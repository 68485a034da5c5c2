use chrono::NaiveDate;
use nebula_core::{Catalog, OwnedUpgrades, Planet, RarityTable, STARTING_REROLLS};
use persistence::{SaveDocument, SAVE_VERSION};
use std::collections::BTreeMap;
use tracing::warn;

/// Full session state.
#[derive(Clone, Debug, PartialEq)]
pub struct GameState {
    /// Effective odds for the owned upgrade set.
    pub current: RarityTable,
    pub owned: OwnedUpgrades,
    pub roll_count: u64,
    pub daily_rerolls: u32,
    pub last_reroll_refresh: Option<NaiveDate>,
    /// Most recent first.
    pub history: Vec<Planet>,
    pub current_planet: Option<Planet>,
    /// Session only, never persisted.
    pub auto_roll: bool,
}

impl GameState {
    pub fn fresh(base: &RarityTable) -> Self {
        Self {
            current: *base,
            owned: OwnedUpgrades::new(),
            roll_count: 0,
            daily_rerolls: STARTING_REROLLS,
            last_reroll_refresh: None,
            history: Vec::new(),
            current_planet: None,
            auto_roll: false,
        }
    }

    /// Rebuild state from a decoded save. Ownership is merged by id against
    /// the catalog, so ids the catalog no longer knows are dropped and new
    /// catalog entries start unowned. The odds are recomputed from ownership
    /// rather than trusted from the document.
    pub fn from_document(
        doc: SaveDocument,
        base: &RarityTable,
        catalog: &Catalog,
        history_cap: usize,
    ) -> Self {
        let mut owned = OwnedUpgrades::new();
        for id in doc.owned_ids() {
            match catalog.get(id) {
                Some(def) => {
                    owned.insert(def.id.clone());
                }
                None => warn!(id, "ignoring unknown upgrade in save"),
            }
        }
        let current = nebula_odds::recompute(base, catalog, &owned);
        let mut history = doc.history;
        history.truncate(history_cap);
        Self {
            current,
            owned,
            roll_count: doc.roll_count,
            daily_rerolls: doc.daily_rerolls,
            last_reroll_refresh: doc.last_reroll_refresh,
            history,
            current_planet: doc.current_planet,
            auto_roll: false,
        }
    }

    /// Snapshot for the save slot. Every catalog entry is listed with its
    /// ownership flag.
    pub fn to_document(&self, catalog: &Catalog) -> SaveDocument {
        let upgrades: BTreeMap<String, bool> = catalog
            .iter()
            .map(|def| (def.id.0.clone(), self.owned.contains(&def.id.0)))
            .collect();
        SaveDocument {
            version: SAVE_VERSION,
            roll_count: self.roll_count,
            daily_rerolls: self.daily_rerolls,
            last_reroll_refresh: self.last_reroll_refresh,
            probabilities: self.current,
            upgrades,
            history: self.history.clone(),
            current_planet: self.current_planet.clone(),
        }
    }
}
