//! Purchasable upgrades: pricing curve, effects and the default catalog.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::state::GameState;

/// What an upgrade improves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpgradeKind {
    /// Adds to points per click.
    Click,
    /// Adds to passive points per second.
    PerSecond,
    /// Enables the autoclicker and adds simulated clicks per second.
    AutoClick,
}

impl UpgradeKind {
    /// Apply one level's worth of `effect` to `state`.
    pub fn apply(self, state: &mut GameState, effect: f64) {
        match self {
            Self::Click => state.points_per_click += effect,
            Self::PerSecond => state.points_per_second += effect,
            Self::AutoClick => {
                state.autoclick_active = true;
                state.autoclick_speed += effect;
            }
        }
    }
}

/// One upgrade as owned by a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Upgrade {
    /// Stable identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Display description.
    pub description: String,
    /// Effect variant.
    #[serde(rename = "type")]
    pub kind: UpgradeKind,
    /// Levels owned this run.
    #[serde(default)]
    pub level: u32,
    /// Price of the first level.
    pub base_cost: u64,
    /// Growth factor per level owned; always greater than 1.
    pub cost_multiplier: f64,
    /// Rate gained per level.
    pub effect_value: f64,
}

impl Upgrade {
    /// Create a level-0 upgrade.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        kind: UpgradeKind,
        base_cost: u64,
        cost_multiplier: f64,
        effect_value: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            kind,
            level: 0,
            base_cost,
            cost_multiplier,
            effect_value,
        }
    }

    /// Price of the next level: `floor(base_cost * cost_multiplier^level)`.
    #[must_use]
    pub fn cost(&self) -> u64 {
        cost_at_level(self.base_cost, self.cost_multiplier, self.level)
    }

    /// Check the pricing parameters.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidInput`] if the multiplier is not greater
    /// than 1, the first price step is under one point, or the effect is
    /// negative.
    #[allow(clippy::cast_precision_loss)]
    pub fn validate(&self) -> EngineResult<()> {
        if !(self.cost_multiplier > 1.0 && self.cost_multiplier.is_finite()) {
            return Err(EngineError::InvalidInput(format!(
                "upgrade {} has cost_multiplier {} (must be > 1)",
                self.id, self.cost_multiplier
            )));
        }
        // floor() only keeps the curve strictly increasing when every step
        // adds at least one whole point
        if (self.base_cost as f64) * (self.cost_multiplier - 1.0) < 1.0 {
            return Err(EngineError::InvalidInput(format!(
                "upgrade {} has base_cost {} too small for cost_multiplier {}",
                self.id, self.base_cost, self.cost_multiplier
            )));
        }
        if !(self.effect_value >= 0.0 && self.effect_value.is_finite()) {
            return Err(EngineError::InvalidInput(format!(
                "upgrade {} has invalid effect_value {}",
                self.id, self.effect_value
            )));
        }
        Ok(())
    }
}

/// `floor(base_cost * cost_multiplier^level)`, saturating at `u64::MAX`.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    clippy::cast_possible_wrap
)]
pub fn cost_at_level(base_cost: u64, cost_multiplier: f64, level: u32) -> u64 {
    let raw = (base_cost as f64 * cost_multiplier.powi(level as i32)).floor();
    // `as` saturates for out-of-range floats
    raw as u64
}

/// Buy one level of `upgrade_id`, returning the price paid.
///
/// On error neither `state` nor `upgrades` is modified.
///
/// # Errors
///
/// Returns [`EngineError::UpgradeNotFound`] for an unknown id and
/// [`EngineError::InsufficientFunds`] when the balance is below the price.
#[allow(clippy::cast_precision_loss)]
pub fn purchase(
    state: &mut GameState,
    upgrades: &mut [Upgrade],
    upgrade_id: &str,
) -> EngineResult<u64> {
    let upgrade = upgrades
        .iter_mut()
        .find(|u| u.id == upgrade_id)
        .ok_or_else(|| EngineError::UpgradeNotFound(upgrade_id.to_string()))?;

    let cost = upgrade.cost();
    if state.points < cost as f64 {
        return Err(EngineError::InsufficientFunds {
            cost,
            available: state.points,
        });
    }

    state.points -= cost as f64;
    upgrade.level += 1;
    upgrade.kind.apply(state, upgrade.effect_value);
    Ok(cost)
}

/// Total levels bought across all upgrades.
#[must_use]
pub fn total_levels(upgrades: &[Upgrade]) -> u64 {
    upgrades.iter().map(|u| u64::from(u.level)).sum()
}

/// The set of upgrades every new session starts with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpgradeCatalog {
    upgrades: Vec<Upgrade>,
}

impl UpgradeCatalog {
    /// Build a catalog from upgrade templates.
    ///
    /// Levels are reset to 0.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidInput`] on duplicate ids or invalid
    /// pricing parameters.
    pub fn new(mut upgrades: Vec<Upgrade>) -> EngineResult<Self> {
        for (i, upgrade) in upgrades.iter().enumerate() {
            upgrade.validate()?;
            if upgrades[..i].iter().any(|u| u.id == upgrade.id) {
                return Err(EngineError::InvalidInput(format!(
                    "duplicate upgrade id {}",
                    upgrade.id
                )));
            }
        }
        for upgrade in &mut upgrades {
            upgrade.level = 0;
        }
        Ok(Self { upgrades })
    }

    /// Parse a catalog from a JSON array of upgrades.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidInput`] if the JSON is malformed, names an
    /// unknown upgrade type, or fails validation.
    pub fn from_json(json: &str) -> EngineResult<Self> {
        let upgrades: Vec<Upgrade> = serde_json::from_str(json)
            .map_err(|e| EngineError::InvalidInput(format!("upgrade catalog: {e}")))?;
        Self::new(upgrades)
    }

    /// Load a catalog from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidInput`] if the file cannot be read or
    /// parsed.
    pub fn from_file(path: impl AsRef<Path>) -> EngineResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            EngineError::InvalidInput(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json(&contents)
    }

    /// Level-0 copies of every upgrade for a new session.
    #[must_use]
    pub fn instantiate(&self) -> Vec<Upgrade> {
        self.upgrades.clone()
    }

    /// The templates in display order.
    #[must_use]
    pub fn upgrades(&self) -> &[Upgrade] {
        &self.upgrades
    }
}

impl Default for UpgradeCatalog {
    fn default() -> Self {
        use UpgradeKind::{AutoClick, Click, PerSecond};
        Self {
            upgrades: vec![
                Upgrade::new("click1", "Spare Pen", "+1 point per click", Click, 10, 1.15, 1.0),
                Upgrade::new("click2", "Pen Pack", "+5 points per click", Click, 100, 1.2, 5.0),
                Upgrade::new("click3", "Pen Box", "+25 points per click", Click, 1_000, 1.25, 25.0),
                Upgrade::new(
                    "click4",
                    "Pen Factory",
                    "+100 points per click",
                    Click,
                    10_000,
                    1.3,
                    100.0,
                ),
                Upgrade::new("ps1", "Helper", "+0.5 points per second", PerSecond, 50, 1.15, 0.5),
                Upgrade::new(
                    "ps2",
                    "Pen Machine",
                    "+5 points per second",
                    PerSecond,
                    500,
                    1.2,
                    5.0,
                ),
                Upgrade::new(
                    "ps3",
                    "Production Robot",
                    "+50 points per second",
                    PerSecond,
                    5_000,
                    1.25,
                    50.0,
                ),
                Upgrade::new(
                    "ps4",
                    "Super Factory",
                    "+500 points per second",
                    PerSecond,
                    50_000,
                    1.3,
                    500.0,
                ),
                Upgrade::new(
                    "auto1",
                    "Basic Autoclicker",
                    "1 automatic click per second",
                    AutoClick,
                    1_000,
                    2.0,
                    1.0,
                ),
                Upgrade::new(
                    "auto2",
                    "Fast Autoclicker",
                    "+3 automatic clicks per second",
                    AutoClick,
                    10_000,
                    2.5,
                    3.0,
                ),
            ],
        }
    }
}
