use crate::state::GameState;
use crate::store::{GameStore, PurchaseOutcome};
use chrono::Utc;
use nebula_core::{Planet, PlanetId};
use persistence::SaveSlot;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info};

const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("engine task has stopped")]
    Closed,
}

/// What produced a discovery.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RollSource {
    Manual,
    Reroll,
    Auto,
}

/// Broadcast for every planet the engine produces.
#[derive(Clone, Debug)]
pub struct Discovery {
    pub planet: Planet,
    pub source: RollSource,
}

enum Command {
    Roll(oneshot::Sender<Planet>),
    Reroll(oneshot::Sender<Option<Planet>>),
    Purchase(String, oneshot::Sender<PurchaseOutcome>),
    ToggleAutoRoll(oneshot::Sender<bool>),
    SelectPlanet(PlanetId, oneshot::Sender<bool>),
    Snapshot(oneshot::Sender<GameState>),
    Shutdown,
}

/// Handle to a store running on its own task. Commands and auto-roll ticks
/// are handled one at a time by that task. Dropping the handle aborts it.
pub struct Engine {
    tx: mpsc::UnboundedSender<Command>,
    events: broadcast::Sender<Discovery>,
    task: Option<JoinHandle<()>>,
}

impl Engine {
    /// Move `store` onto a new task. Must be called within a tokio runtime.
    pub fn spawn<S>(mut store: GameStore<S>) -> Self
    where
        S: SaveSlot + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        store.refresh_daily_rerolls(Utc::now().date_naive());
        let task = tokio::spawn(run(store, rx, events.clone()));
        Self {
            tx,
            events,
            task: Some(task),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Discovery> {
        self.events.subscribe()
    }

    pub async fn roll(&self) -> Result<Planet, EngineError> {
        self.request(Command::Roll).await
    }

    pub async fn reroll(&self) -> Result<Option<Planet>, EngineError> {
        self.request(Command::Reroll).await
    }

    pub async fn purchase_upgrade(&self, id: &str) -> Result<PurchaseOutcome, EngineError> {
        let id = id.to_string();
        self.request(|reply| Command::Purchase(id, reply)).await
    }

    pub async fn toggle_auto_roll(&self) -> Result<bool, EngineError> {
        self.request(Command::ToggleAutoRoll).await
    }

    /// Show a planet from the history. `false` if the id is not there.
    pub async fn select_planet(&self, id: &PlanetId) -> Result<bool, EngineError> {
        let id = id.clone();
        self.request(|reply| Command::SelectPlanet(id, reply)).await
    }

    /// Copy of the current state.
    pub async fn snapshot(&self) -> Result<GameState, EngineError> {
        self.request(Command::Snapshot).await
    }

    /// Stop the task after it finishes queued commands.
    pub async fn shutdown(mut self) -> Result<(), EngineError> {
        let _ = self.tx.send(Command::Shutdown);
        if let Some(task) = self.task.take() {
            task.await.map_err(|_| EngineError::Closed)?;
        }
        Ok(())
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, EngineError> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(make(reply)).map_err(|_| EngineError::Closed)?;
        rx.await.map_err(|_| EngineError::Closed)
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn run<S: SaveSlot>(
    mut store: GameStore<S>,
    mut rx: mpsc::UnboundedReceiver<Command>,
    events: broadcast::Sender<Discovery>,
) {
    let period = store.config().auto_roll_interval();
    let mut ticker = time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    info!(period_ms = period.as_millis() as u64, "engine started");

    loop {
        tokio::select! {
            _ = ticker.tick(), if store.auto_roll() => {
                let planet = store.roll();
                let _ = events.send(Discovery { planet, source: RollSource::Auto });
            }
            cmd = rx.recv() => {
                let Some(cmd) = cmd else { break };
                match cmd {
                    Command::Roll(reply) => {
                        let planet = store.roll();
                        let _ = events.send(Discovery { planet: planet.clone(), source: RollSource::Manual });
                        let _ = reply.send(planet);
                    }
                    Command::Reroll(reply) => {
                        store.refresh_daily_rerolls(Utc::now().date_naive());
                        let planet = store.reroll();
                        if let Some(planet) = &planet {
                            let _ = events.send(Discovery { planet: planet.clone(), source: RollSource::Reroll });
                        }
                        let _ = reply.send(planet);
                    }
                    Command::Purchase(id, reply) => {
                        let _ = reply.send(store.purchase_upgrade(&id));
                    }
                    Command::ToggleAutoRoll(reply) => {
                        let enabled = store.toggle_auto_roll();
                        if enabled {
                            // First auto roll lands one full period from now.
                            ticker.reset();
                        }
                        let _ = reply.send(enabled);
                    }
                    Command::SelectPlanet(id, reply) => {
                        let _ = reply.send(store.select_planet(&id));
                    }
                    Command::Snapshot(reply) => {
                        let _ = reply.send(store.state().clone());
                    }
                    Command::Shutdown => break,
                }
            }
        }
    }
    debug!(rolls = store.roll_count(), "engine stopped");
}
