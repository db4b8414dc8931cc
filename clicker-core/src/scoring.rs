//! Click scoring and time-based passive accrual.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::state::GameState;

/// Breakdown of one passive accrual.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PassiveAccrual {
    /// Seconds actually credited, after clamping and capping.
    pub elapsed_secs: f64,
    /// Whether the idle cap shortened the credited interval.
    pub capped: bool,
    /// Points from `points_per_second`.
    pub passive_points: f64,
    /// Points from simulated autoclicks.
    pub autoclick_points: f64,
}

impl PassiveAccrual {
    /// Points credited in total.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.passive_points + self.autoclick_points
    }
}

/// Register `count` manual clicks, returning the points earned.
///
/// # Errors
///
/// Returns [`EngineError::InvalidInput`] if `count` is zero.
#[allow(clippy::cast_precision_loss)]
pub fn click(state: &mut GameState, count: u64) -> EngineResult<f64> {
    if count < 1 {
        return Err(EngineError::InvalidInput(
            "click count must be at least 1".to_string(),
        ));
    }
    let earned = state.click_value() * count as f64;
    state.credit(earned);
    state.total_clicks = state.total_clicks.saturating_add(count);
    Ok(earned)
}

/// Credit passive income for the time since the last update.
///
/// A clock that moved backwards credits nothing. The credited interval is
/// capped at `max_idle_secs`. `last_update_timestamp` always moves to `now_ms`
/// unless the clock went backwards, so a repeated call accrues ~0.
#[allow(clippy::cast_precision_loss)]
pub fn apply_passive(state: &mut GameState, now_ms: u64, max_idle_secs: u64) -> PassiveAccrual {
    let elapsed_ms = now_ms.saturating_sub(state.last_update_timestamp);
    let cap_ms = max_idle_secs.saturating_mul(1000);
    let capped = elapsed_ms > cap_ms;
    let elapsed_secs = elapsed_ms.min(cap_ms) as f64 / 1000.0;

    let multiplier = state.prestige_multiplier;
    let passive_points = state.points_per_second * multiplier * elapsed_secs;
    let autoclick_points = if state.autoclick_active {
        state.autoclick_speed * state.points_per_click * multiplier * elapsed_secs
    } else {
        0.0
    };

    let accrual = PassiveAccrual {
        elapsed_secs,
        capped,
        passive_points,
        autoclick_points,
    };

    if accrual.total() > 0.0 {
        state.credit(accrual.total());
    }
    state.last_update_timestamp = state.last_update_timestamp.max(now_ms);

    if capped {
        tracing::debug!(
            session = %state.id,
            elapsed_ms,
            max_idle_secs,
            "Passive accrual capped"
        );
    }
    accrual
}
