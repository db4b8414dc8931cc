//! Per-session game state.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Points earned per click before any upgrade.
pub const BASE_POINTS_PER_CLICK: f64 = 1.0;

/// Opaque identifier for a game session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Create a new unique session ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Borrow the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// The complete scoring state of one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    /// Session this state belongs to.
    pub id: SessionId,
    /// Spendable balance.
    pub points: f64,
    /// Points per manual click, before the prestige multiplier.
    pub points_per_click: f64,
    /// Passive points per second, before the prestige multiplier.
    pub points_per_second: f64,
    /// Number of prestiges performed.
    pub prestige_level: u32,
    /// Permanent multiplier applied to every point source.
    pub prestige_multiplier: f64,
    /// Lifetime click count (manual clicks only).
    pub total_clicks: u64,
    /// Lifetime points earned; never reset.
    pub total_points_earned: f64,
    /// Points earned since the session began or the last prestige.
    #[serde(default)]
    pub run_points_earned: f64,
    /// Whether any autoclick upgrade has been bought this run.
    pub autoclick_active: bool,
    /// Simulated clicks per second.
    pub autoclick_speed: f64,
    /// When the session was created (Unix ms).
    pub created_at: u64,
    /// Last time passive income was credited (Unix ms).
    pub last_update_timestamp: u64,
}

impl GameState {
    /// Create a fresh state with base values.
    #[must_use]
    pub fn new(id: SessionId, now_ms: u64) -> Self {
        Self {
            id,
            points: 0.0,
            points_per_click: BASE_POINTS_PER_CLICK,
            points_per_second: 0.0,
            prestige_level: 0,
            prestige_multiplier: 1.0,
            total_clicks: 0,
            total_points_earned: 0.0,
            run_points_earned: 0.0,
            autoclick_active: false,
            autoclick_speed: 0.0,
            created_at: now_ms,
            last_update_timestamp: now_ms,
        }
    }

    /// Credit earned points to the balance and both earnings counters.
    pub fn credit(&mut self, earned: f64) {
        self.points += earned;
        self.total_points_earned += earned;
        self.run_points_earned += earned;
    }

    /// Value of one manual click after the prestige multiplier.
    #[must_use]
    pub fn click_value(&self) -> f64 {
        self.points_per_click * self.prestige_multiplier
    }

    /// Reset the run-scoped fields to base values.
    ///
    /// Lifetime counters, prestige fields and identity are kept.
    pub fn reset_run(&mut self, now_ms: u64) {
        self.points = 0.0;
        self.points_per_click = BASE_POINTS_PER_CLICK;
        self.points_per_second = 0.0;
        self.autoclick_active = false;
        self.autoclick_speed = 0.0;
        self.run_points_earned = 0.0;
        self.last_update_timestamp = now_ms;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_has_base_values() {
        let state = GameState::new(SessionId::from("s1"), 42);
        assert!(state.points.abs() < f64::EPSILON);
        assert!((state.points_per_click - BASE_POINTS_PER_CLICK).abs() < f64::EPSILON);
        assert!((state.prestige_multiplier - 1.0).abs() < f64::EPSILON);
        assert_eq!(state.created_at, 42);
        assert_eq!(state.last_update_timestamp, 42);
        assert!(!state.autoclick_active);
    }

    #[test]
    fn test_credit_updates_all_counters() {
        let mut state = GameState::new(SessionId::new(), 0);
        state.credit(12.5);
        assert!((state.points - 12.5).abs() < f64::EPSILON);
        assert!((state.total_points_earned - 12.5).abs() < f64::EPSILON);
        assert!((state.run_points_earned - 12.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_reset_run_keeps_lifetime_counters() {
        let mut state = GameState::new(SessionId::new(), 0);
        state.credit(500.0);
        state.total_clicks = 9;
        state.points_per_click = 7.0;
        state.autoclick_active = true;
        state.autoclick_speed = 3.0;

        state.reset_run(100);

        assert!(state.points.abs() < f64::EPSILON);
        assert!((state.points_per_click - BASE_POINTS_PER_CLICK).abs() < f64::EPSILON);
        assert!(state.run_points_earned.abs() < f64::EPSILON);
        assert!((state.total_points_earned - 500.0).abs() < f64::EPSILON);
        assert_eq!(state.total_clicks, 9);
        assert!(!state.autoclick_active);
        assert_eq!(state.last_update_timestamp, 100);
    }

    #[test]
    fn test_session_id_serializes_as_plain_string() {
        let id = SessionId::from("abc-123");
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, "\"abc-123\"");
    }

    #[test]
    fn test_legacy_record_without_run_points_deserializes() {
        let json = r#"{
            "id": "old", "points": 5.0, "points_per_click": 1.0,
            "points_per_second": 0.0, "prestige_level": 0, "prestige_multiplier": 1.0,
            "total_clicks": 5, "total_points_earned": 5.0, "autoclick_active": false,
            "autoclick_speed": 0.0, "created_at": 0, "last_update_timestamp": 0
        }"#;
        let state: GameState = serde_json::from_str(json).expect("deserialize");
        assert!(state.run_points_earned.abs() < f64::EPSILON);
    }
}
