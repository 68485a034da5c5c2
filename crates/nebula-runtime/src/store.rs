use crate::config::GameConfig;
use crate::state::GameState;
use chrono::{NaiveDate, Utc};
use nebula_core::{Catalog, Planet, PlanetId, RarityTable, SpecialEffect, UpgradeDef};
use nebula_odds::DrawRng;
use persistence::SaveSlot;
use tracing::{debug, info, warn};

/// Result of a purchase attempt. Only `Purchased` changes state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PurchaseOutcome {
    Purchased,
    AlreadyOwned,
    Unaffordable,
    Unknown,
}

/// Catalog entry with its status for the current state.
#[derive(Clone, Copy, Debug)]
pub struct UpgradeStatus<'a> {
    pub def: &'a UpgradeDef,
    pub owned: bool,
    pub affordable: bool,
}

/// Owns the game state and performs every transition. Each committed
/// transition is written to the slot; a failed write is logged and the
/// in-memory state is kept.
pub struct GameStore<S: SaveSlot> {
    catalog: Catalog,
    base: RarityTable,
    state: GameState,
    rng: DrawRng,
    slot: S,
    config: GameConfig,
}

impl<S: SaveSlot> GameStore<S> {
    /// Load from `slot` with the standard catalog and baseline odds.
    pub fn load(config: GameConfig, slot: S) -> Self {
        Self::load_with(Catalog::standard(), RarityTable::baseline(), config, slot)
    }

    /// Load from `slot`, starting fresh when it is empty or unreadable.
    pub fn load_with(catalog: Catalog, base: RarityTable, config: GameConfig, slot: S) -> Self {
        let state = match slot.load() {
            Ok(Some(text)) => {
                let doc = persistence::decode(&text);
                GameState::from_document(doc, &base, &catalog, config.history_cap)
            }
            Ok(None) => GameState::fresh(&base),
            Err(err) => {
                warn!(%err, "could not read save; starting fresh");
                GameState::fresh(&base)
            }
        };
        info!(
            rolls = state.roll_count,
            owned = state.owned.len(),
            planets = state.history.len(),
            "game loaded"
        );
        Self {
            rng: nebula_odds::new_rng(config.seed),
            catalog,
            base,
            state,
            slot,
            config,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn slot(&self) -> &S {
        &self.slot
    }

    pub fn current_planet(&self) -> Option<&Planet> {
        self.state.current_planet.as_ref()
    }

    pub fn table(&self) -> &RarityTable {
        &self.state.current
    }

    pub fn roll_count(&self) -> u64 {
        self.state.roll_count
    }

    pub fn daily_rerolls(&self) -> u32 {
        self.state.daily_rerolls
    }

    pub fn history(&self) -> &[Planet] {
        &self.state.history
    }

    pub fn auto_roll(&self) -> bool {
        self.state.auto_roll
    }

    pub fn is_owned(&self, id: &str) -> bool {
        self.state.owned.contains(id)
    }

    pub fn cost(&self, id: &str) -> Option<u64> {
        self.catalog.get(id).map(|def| def.cost)
    }

    pub fn can_afford(&self, id: &str) -> bool {
        self.cost(id).is_some_and(|cost| self.state.roll_count >= cost)
    }

    /// Every catalog entry in order, with ownership and affordability.
    pub fn upgrades(&self) -> impl Iterator<Item = UpgradeStatus<'_>> {
        self.catalog.iter().map(|def| UpgradeStatus {
            def,
            owned: self.state.owned.contains(&def.id.0),
            affordable: self.state.roll_count >= def.cost,
        })
    }

    /// Whether the auto-roll toggle may be switched on.
    pub fn can_auto_roll(&self) -> bool {
        let unlocked = self
            .catalog
            .owned_specials(&self.state.owned)
            .any(|s| matches!(s, SpecialEffect::AutoRoll));
        unlocked && self.state.roll_count >= self.config.auto_roll_min_rolls
    }

    /// Rerolls granted per day by owned upgrades. Zero without any.
    pub fn daily_allowance(&self) -> u32 {
        self.catalog
            .owned_specials(&self.state.owned)
            .map(|s| match s {
                SpecialEffect::GrantRerolls { amount } => *amount,
                _ => 0,
            })
            .fold(0, u32::saturating_add)
    }

    /// Discover a new planet.
    pub fn roll(&mut self) -> Planet {
        let index = self.state.roll_count;
        let planet = self.draw_planet(index);
        self.state.roll_count = self.state.roll_count.saturating_add(1);
        self.state.history.insert(0, planet.clone());
        self.state.history.truncate(self.config.history_cap);
        self.state.current_planet = Some(planet.clone());
        info!(
            roll = self.state.roll_count,
            tier = %planet.rarity,
            name = planet.name.as_str(),
            "planet discovered"
        );
        self.persist();
        planet
    }

    /// Redraw the most recent discovery. Returns `None` when the daily
    /// budget is spent.
    pub fn reroll(&mut self) -> Option<Planet> {
        if self.state.daily_rerolls == 0 {
            debug!("reroll ignored: budget spent");
            return None;
        }
        let index = self.state.roll_count.saturating_sub(1);
        let planet = self.draw_planet(index);
        self.state.daily_rerolls -= 1;
        match self.state.history.first_mut() {
            Some(head) => *head = planet.clone(),
            None => self.state.history.insert(0, planet.clone()),
        }
        self.state.current_planet = Some(planet.clone());
        info!(
            tier = %planet.rarity,
            rerolls_left = self.state.daily_rerolls,
            "planet rerolled"
        );
        self.persist();
        Some(planet)
    }

    /// Buy an upgrade. Roll count is a threshold, never spent.
    pub fn purchase_upgrade(&mut self, id: &str) -> PurchaseOutcome {
        let Some(def) = self.catalog.get(id) else {
            debug!(id, "purchase ignored: unknown upgrade");
            return PurchaseOutcome::Unknown;
        };
        if self.state.owned.contains(id) {
            return PurchaseOutcome::AlreadyOwned;
        }
        if self.state.roll_count < def.cost {
            debug!(id, cost = def.cost, rolls = self.state.roll_count, "purchase ignored: unaffordable");
            return PurchaseOutcome::Unaffordable;
        }
        let grant = match def.special() {
            Some(SpecialEffect::GrantRerolls { amount }) => *amount,
            _ => 0,
        };
        self.state.owned.insert(def.id.clone());
        self.state.current = nebula_odds::recompute(&self.base, &self.catalog, &self.state.owned);
        if grant > 0 {
            self.state.daily_rerolls = self.state.daily_rerolls.saturating_add(grant);
            self.state.last_reroll_refresh = Some(Utc::now().date_naive());
        }
        info!(id, total = self.state.current.total(), "upgrade purchased");
        self.persist();
        PurchaseOutcome::Purchased
    }

    /// Flip auto-roll. Without the unlock the flag is forced off.
    pub fn toggle_auto_roll(&mut self) -> bool {
        if !self.can_auto_roll() {
            self.state.auto_roll = false;
            return false;
        }
        self.state.auto_roll = !self.state.auto_roll;
        info!(enabled = self.state.auto_roll, "auto-roll toggled");
        self.state.auto_roll
    }

    /// Make a planet from the history the current one. Returns `false` when
    /// no history entry has that id.
    pub fn select_planet(&mut self, id: &PlanetId) -> bool {
        let Some(planet) = self.state.history.iter().find(|p| &p.id == id) else {
            debug!(id = id.0.as_str(), "select ignored: not in history");
            return false;
        };
        if self.state.current_planet.as_ref() == Some(planet) {
            return true;
        }
        self.state.current_planet = Some(planet.clone());
        self.persist();
        true
    }

    /// Refill the reroll budget once per calendar day, up to the allowance
    /// of owned reroll upgrades. Returns `true` when a refill happened.
    pub fn refresh_daily_rerolls(&mut self, today: NaiveDate) -> bool {
        let allowance = self.daily_allowance();
        if allowance == 0 {
            return false;
        }
        if self
            .state
            .last_reroll_refresh
            .is_some_and(|last| last >= today)
        {
            return false;
        }
        self.state.daily_rerolls = self.state.daily_rerolls.max(allowance);
        self.state.last_reroll_refresh = Some(today);
        info!(%today, rerolls = self.state.daily_rerolls, "daily rerolls refreshed");
        self.persist();
        true
    }

    fn draw_planet(&mut self, roll_index: u64) -> Planet {
        let outcome = nebula_odds::draw(
            &self.state.current,
            &self.catalog,
            &self.state.owned,
            roll_index,
            &mut self.rng,
        );
        nebula_odds::create_planet(outcome.tier, Utc::now(), &mut self.rng)
    }

    fn persist(&mut self) {
        let doc = self.state.to_document(&self.catalog);
        let written = persistence::encode(&doc).and_then(|text| self.slot.store(&text));
        if let Err(err) = written {
            warn!(%err, "failed to persist game state");
        }
    }
}
