//! # Clicker Core
//!
//! Authoritative game engine for an incremental clicker game. Presentation
//! clients forward actions here and render the aggregate that comes back.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                 GameEngine                  │
//! │  start · load · click · tick · purchase ·   │
//! │  prestige                                   │
//! ├─────────────────────────────────────────────┤
//! │  Scoring         │  Upgrades                │
//! │  - Clicks        │  - Cost curve            │
//! │  - Passive ticks │  - Effects per kind      │
//! ├─────────────────────────────────────────────┤
//! │  Achievements    │  Prestige                │
//! │  - Pure eval     │  - Eligibility           │
//! │  - Id diff       │  - Run reset             │
//! ├─────────────────────────────────────────────┤
//! │  GameStore: one locked record per session   │
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod achievement;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod prestige;
pub mod scoring;
pub mod state;
pub mod store;
pub mod upgrade;

pub use achievement::{Achievement, AchievementCondition};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::EngineConfig;
pub use engine::{GameEngine, GameSnapshot, UpgradeView};
pub use error::{EngineError, EngineResult};
pub use scoring::PassiveAccrual;
pub use state::{GameState, SessionId};
pub use store::{GameRecord, GameStore, StoreError};
pub use upgrade::{Upgrade, UpgradeCatalog, UpgradeKind};
