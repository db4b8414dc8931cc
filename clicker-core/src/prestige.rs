//! Prestige eligibility and reset.

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::state::GameState;
use crate::upgrade::Upgrade;

/// Multiplier granted at `level`: `1 + step * level`.
#[must_use]
pub fn multiplier_for_level(level: u32, step: f64) -> f64 {
    1.0 + step * f64::from(level)
}

/// Whether `state` may prestige under `config`.
///
/// Both the lifetime total and the current run must have reached the
/// threshold, so every prestige has to be earned again from scratch.
#[must_use]
pub fn is_eligible(state: &GameState, config: &EngineConfig) -> bool {
    state.total_points_earned >= config.prestige_threshold
        && state.run_points_earned >= config.prestige_threshold
}

/// Reset the run in exchange for the next prestige level.
///
/// # Errors
///
/// Returns [`EngineError::PrestigeNotEligible`] without touching `state` or
/// `upgrades` when the threshold has not been reached.
pub fn prestige(
    state: &mut GameState,
    upgrades: &mut [Upgrade],
    config: &EngineConfig,
    now_ms: u64,
) -> EngineResult<()> {
    if !is_eligible(state, config) {
        return Err(EngineError::PrestigeNotEligible {
            required: config.prestige_threshold,
            earned: state.run_points_earned.min(state.total_points_earned),
        });
    }

    state.prestige_level += 1;
    let next = multiplier_for_level(state.prestige_level, config.multiplier_step);
    // a lowered step must still never shrink an earned multiplier
    state.prestige_multiplier = if next > state.prestige_multiplier {
        next
    } else {
        state.prestige_multiplier + config.multiplier_step
    };
    state.reset_run(now_ms);
    for upgrade in upgrades.iter_mut() {
        upgrade.level = 0;
    }

    tracing::info!(
        session = %state.id,
        level = state.prestige_level,
        multiplier = state.prestige_multiplier,
        "Prestige performed"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{SessionId, BASE_POINTS_PER_CLICK};
    use crate::upgrade::UpgradeCatalog;

    fn rich_state() -> GameState {
        let mut state = GameState::new(SessionId::new(), 0);
        state.credit(1_000_000.0);
        state.total_clicks = 321;
        state.points_per_click = 26.0;
        state.points_per_second = 55.5;
        state.autoclick_active = true;
        state.autoclick_speed = 4.0;
        state
    }

    #[test]
    fn test_multiplier_formula() {
        assert!((multiplier_for_level(0, 0.5) - 1.0).abs() < f64::EPSILON);
        assert!((multiplier_for_level(1, 0.5) - 1.5).abs() < f64::EPSILON);
        assert!((multiplier_for_level(4, 0.5) - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_prestige_below_threshold_fails_unchanged() {
        let config = EngineConfig::default();
        let mut state = GameState::new(SessionId::new(), 0);
        state.credit(999_999.0);
        let mut upgrades = UpgradeCatalog::default().instantiate();
        upgrades[0].level = 4;
        let before = (state.clone(), upgrades.clone());

        let result = prestige(&mut state, &mut upgrades, &config, 50);

        assert!(matches!(result, Err(EngineError::PrestigeNotEligible { .. })));
        assert_eq!((state, upgrades), before);
    }

    #[test]
    fn test_prestige_resets_run_and_raises_multiplier() {
        let config = EngineConfig::default();
        let mut state = rich_state();
        let mut upgrades = UpgradeCatalog::default().instantiate();
        upgrades[0].level = 4;
        upgrades[8].level = 1;

        prestige(&mut state, &mut upgrades, &config, 99).expect("prestige");

        assert_eq!(state.prestige_level, 1);
        assert!((state.prestige_multiplier - 1.5).abs() < f64::EPSILON);
        assert!(state.points.abs() < f64::EPSILON);
        assert!((state.points_per_click - BASE_POINTS_PER_CLICK).abs() < f64::EPSILON);
        assert!(state.points_per_second.abs() < f64::EPSILON);
        assert!(!state.autoclick_active);
        assert!(state.autoclick_speed.abs() < f64::EPSILON);
        assert!(upgrades.iter().all(|u| u.level == 0));
        assert_eq!(state.last_update_timestamp, 99);
    }

    #[test]
    fn test_prestige_keeps_lifetime_counters() {
        let config = EngineConfig::default();
        let mut state = rich_state();
        let mut upgrades = UpgradeCatalog::default().instantiate();

        prestige(&mut state, &mut upgrades, &config, 0).expect("prestige");

        assert!((state.total_points_earned - 1_000_000.0).abs() < f64::EPSILON);
        assert_eq!(state.total_clicks, 321);
        assert!(state.run_points_earned.abs() < f64::EPSILON);
    }

    #[test]
    fn test_second_prestige_needs_threshold_again() {
        let config = EngineConfig::default();
        let mut state = rich_state();
        let mut upgrades = UpgradeCatalog::default().instantiate();
        prestige(&mut state, &mut upgrades, &config, 0).expect("first prestige");

        let result = prestige(&mut state, &mut upgrades, &config, 0);
        assert!(matches!(
            result,
            Err(EngineError::PrestigeNotEligible { earned, .. }) if earned.abs() < f64::EPSILON
        ));

        state.credit(1_000_000.0);
        prestige(&mut state, &mut upgrades, &config, 0).expect("second prestige");
        assert_eq!(state.prestige_level, 2);
        assert!((state.prestige_multiplier - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_custom_threshold() {
        let config = EngineConfig::default().with_prestige_threshold(100.0);
        let mut state = GameState::new(SessionId::new(), 0);
        state.credit(100.0);
        let mut upgrades = Vec::new();
        prestige(&mut state, &mut upgrades, &config, 0).expect("prestige");
        assert_eq!(state.prestige_level, 1);
    }

    #[test]
    fn test_multiplier_still_grows_after_step_is_lowered() {
        let mut state = rich_state();
        state.prestige_multiplier = 5.0;
        let config = EngineConfig::default().with_multiplier_step(0.25);
        prestige(&mut state, &mut [], &config, 0).expect("prestige");
        assert!((state.prestige_multiplier - 5.25).abs() < f64::EPSILON);
    }
}
