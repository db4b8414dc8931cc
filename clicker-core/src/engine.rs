//! Request/response operations over stored sessions.
//!
//! Every operation takes the session's lock in the [`GameStore`], applies one
//! change to a copy of the record, re-runs achievement evaluation, and commits
//! only if nothing was rejected. Callers always get the full aggregate back.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::achievement::{default_achievements, evaluate_and_unlock, Achievement};
use crate::clock::{Clock, SystemClock};
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::prestige;
use crate::scoring::{self, PassiveAccrual};
use crate::state::{GameState, SessionId};
use crate::store::{GameRecord, GameStore};
use crate::upgrade::{self, Upgrade, UpgradeCatalog};

/// An upgrade together with the price of its next level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpgradeView {
    /// The upgrade as stored.
    #[serde(flatten)]
    pub upgrade: Upgrade,
    /// Price of the next level.
    pub next_cost: u64,
}

impl From<&Upgrade> for UpgradeView {
    fn from(upgrade: &Upgrade) -> Self {
        Self {
            next_cost: upgrade.cost(),
            upgrade: upgrade.clone(),
        }
    }
}

/// The aggregate returned by every operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    /// Scores, rates and counters.
    pub game_state: GameState,
    /// Upgrades with current levels and next prices.
    pub upgrades: Vec<UpgradeView>,
    /// Achievements with their unlock flags.
    pub achievements: Vec<Achievement>,
    /// Achievements unlocked by this call, by id.
    pub newly_unlocked: Vec<String>,
    /// Passive accrual breakdown, for ticks only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passive: Option<PassiveAccrual>,
}

impl GameSnapshot {
    fn new(record: &GameRecord, newly_unlocked: Vec<String>) -> Self {
        Self {
            game_state: record.state.clone(),
            upgrades: record.upgrades.iter().map(UpgradeView::from).collect(),
            achievements: record.achievements.clone(),
            newly_unlocked,
            passive: None,
        }
    }

    /// Session this snapshot belongs to.
    #[must_use]
    pub fn session_id(&self) -> &SessionId {
        &self.game_state.id
    }
}

/// The clicker game engine.
#[derive(Debug, Clone)]
pub struct GameEngine {
    store: GameStore,
    catalog: UpgradeCatalog,
    achievements: Vec<Achievement>,
    config: EngineConfig,
    clock: Arc<dyn Clock>,
}

impl GameEngine {
    /// Create an engine over `store` with the default catalog and achievements.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidInput`] if `config` fails validation.
    pub fn new(store: GameStore, config: EngineConfig) -> EngineResult<Self> {
        config.validate()?;
        Ok(Self {
            store,
            catalog: UpgradeCatalog::default(),
            achievements: default_achievements(),
            config,
            clock: Arc::new(SystemClock),
        })
    }

    /// Use a custom upgrade catalog for new sessions.
    #[must_use]
    pub fn with_catalog(mut self, catalog: UpgradeCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Use a custom time source.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &GameStore {
        &self.store
    }

    /// The upgrade templates for new sessions.
    #[must_use]
    pub fn catalog(&self) -> &UpgradeCatalog {
        &self.catalog
    }

    /// Engine tuning.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Start a fresh session.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Store`] if the record cannot be persisted.
    pub fn start(&self) -> EngineResult<GameSnapshot> {
        let now = self.clock.now_ms();
        let mut achievements = self.achievements.clone();
        for achievement in &mut achievements {
            achievement.unlocked = false;
        }
        let record = GameRecord {
            state: GameState::new(SessionId::new(), now),
            upgrades: self.catalog.instantiate(),
            achievements,
        };
        let snapshot = GameSnapshot::new(&record, Vec::new());
        let id = self.store.create(record)?;
        tracing::info!(session = %id, "Game session started");
        Ok(snapshot)
    }

    /// Fetch a session's aggregate without changing it.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::SessionNotFound`] for an unknown id.
    pub fn load(&self, id: &SessionId) -> EngineResult<GameSnapshot> {
        let record = self.store.get(id)?;
        Ok(GameSnapshot::new(&record, Vec::new()))
    }

    /// Register `count` manual clicks.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidInput`] for a zero count and
    /// [`EngineError::SessionNotFound`] for an unknown id.
    pub fn click(&self, id: &SessionId, count: u64) -> EngineResult<GameSnapshot> {
        if count < 1 {
            return Err(EngineError::InvalidInput(
                "click count must be at least 1".to_string(),
            ));
        }
        self.store.update(id, |record| {
            let earned = scoring::click(&mut record.state, count)?;
            tracing::debug!(session = %id, count, earned, "Clicks registered");
            Ok(Self::evaluated(record))
        })
    }

    /// Credit passive income for the time since the last tick.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::SessionNotFound`] for an unknown id.
    pub fn tick(&self, id: &SessionId) -> EngineResult<GameSnapshot> {
        let now = self.clock.now_ms();
        let max_idle = self.config.max_idle_secs;
        self.store.update(id, |record| {
            let accrual = scoring::apply_passive(&mut record.state, now, max_idle);
            tracing::debug!(
                session = %id,
                elapsed_secs = accrual.elapsed_secs,
                earned = accrual.total(),
                "Passive income credited"
            );
            let mut snapshot = Self::evaluated(record);
            snapshot.passive = Some(accrual);
            Ok(snapshot)
        })
    }

    /// Buy one level of an upgrade.
    ///
    /// Passive income up to now is credited at the old rates first.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::SessionNotFound`] or
    /// [`EngineError::UpgradeNotFound`] for unknown ids and
    /// [`EngineError::InsufficientFunds`] when the balance is too low.
    pub fn purchase(&self, id: &SessionId, upgrade_id: &str) -> EngineResult<GameSnapshot> {
        let now = self.clock.now_ms();
        let max_idle = self.config.max_idle_secs;
        self.store.update(id, |record| {
            scoring::apply_passive(&mut record.state, now, max_idle);
            let cost = upgrade::purchase(&mut record.state, &mut record.upgrades, upgrade_id)?;
            tracing::debug!(session = %id, upgrade = upgrade_id, cost, "Upgrade purchased");
            Ok(Self::evaluated(record))
        })
    }

    /// Trade the current run for the next prestige level.
    ///
    /// Pending passive income is settled before eligibility is checked.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::PrestigeNotEligible`] below the threshold and
    /// [`EngineError::SessionNotFound`] for an unknown id.
    pub fn prestige(&self, id: &SessionId) -> EngineResult<GameSnapshot> {
        let now = self.clock.now_ms();
        let max_idle = self.config.max_idle_secs;
        self.store.update(id, |record| {
            scoring::apply_passive(&mut record.state, now, max_idle);
            prestige::prestige(&mut record.state, &mut record.upgrades, &self.config, now)?;
            Ok(Self::evaluated(record))
        })
    }

    fn evaluated(record: &mut GameRecord) -> GameSnapshot {
        let newly = evaluate_and_unlock(&record.state, &record.upgrades, &mut record.achievements);
        GameSnapshot::new(record, newly)
    }
}
