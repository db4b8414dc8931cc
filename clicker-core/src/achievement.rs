//! Achievement definitions and unlock evaluation.
//!
//! Evaluation is pure: [`evaluate`] reports which locked achievements now
//! qualify and [`unlock`] flips exactly those flags. Nothing here ever clears
//! an `unlocked` flag.

use serde::{Deserialize, Serialize};

use crate::state::GameState;
use crate::upgrade::{total_levels, Upgrade};

/// Threshold an achievement waits for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AchievementCondition {
    /// Lifetime manual clicks.
    TotalClicks {
        /// Required count.
        requirement: u64,
    },
    /// Current spendable balance.
    Points {
        /// Required balance.
        requirement: f64,
    },
    /// Lifetime points earned.
    TotalPoints {
        /// Required lifetime earnings.
        requirement: f64,
    },
    /// Levels bought across all upgrades this run.
    UpgradesPurchased {
        /// Required level total.
        requirement: u64,
    },
    /// Level of one specific upgrade.
    UpgradeLevel {
        /// Upgrade to inspect.
        upgrade_id: String,
        /// Required level.
        requirement: u32,
    },
    /// Any autoclicker owned.
    Autoclick,
    /// Points per click before the prestige multiplier.
    PointsPerClick {
        /// Required rate.
        requirement: f64,
    },
    /// Prestige level reached.
    PrestigeLevel {
        /// Required level.
        requirement: u32,
    },
}

impl AchievementCondition {
    /// Whether the condition holds for the given state.
    #[must_use]
    pub fn is_met(&self, state: &GameState, upgrades: &[Upgrade]) -> bool {
        match self {
            Self::TotalClicks { requirement } => state.total_clicks >= *requirement,
            Self::Points { requirement } => state.points >= *requirement,
            Self::TotalPoints { requirement } => state.total_points_earned >= *requirement,
            Self::UpgradesPurchased { requirement } => total_levels(upgrades) >= *requirement,
            Self::UpgradeLevel {
                upgrade_id,
                requirement,
            } => upgrades
                .iter()
                .any(|u| &u.id == upgrade_id && u.level >= *requirement),
            Self::Autoclick => state.autoclick_active,
            Self::PointsPerClick { requirement } => state.points_per_click >= *requirement,
            Self::PrestigeLevel { requirement } => state.prestige_level >= *requirement,
        }
    }
}

/// A one-way unlockable milestone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    /// Stable identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Display description.
    pub description: String,
    /// Unlock threshold.
    pub condition: AchievementCondition,
    /// Set once the condition has held; never cleared.
    #[serde(default)]
    pub unlocked: bool,
}

impl Achievement {
    /// Create a locked achievement.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        condition: AchievementCondition,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            condition,
            unlocked: false,
        }
    }
}

/// Ids of locked achievements whose condition now holds, in list order.
#[must_use]
pub fn evaluate(
    state: &GameState,
    upgrades: &[Upgrade],
    achievements: &[Achievement],
) -> Vec<String> {
    achievements
        .iter()
        .filter(|a| !a.unlocked && a.condition.is_met(state, upgrades))
        .map(|a| a.id.clone())
        .collect()
}

/// Mark the given achievements unlocked.
///
/// Unknown ids are ignored. Already-unlocked achievements stay unlocked.
pub fn unlock(achievements: &mut [Achievement], ids: &[String]) {
    for achievement in achievements.iter_mut() {
        if ids.contains(&achievement.id) {
            achievement.unlocked = true;
        }
    }
}

/// Evaluate and persist unlocks in one step, returning the diff.
pub fn evaluate_and_unlock(
    state: &GameState,
    upgrades: &[Upgrade],
    achievements: &mut [Achievement],
) -> Vec<String> {
    let newly = evaluate(state, upgrades, achievements);
    if !newly.is_empty() {
        unlock(achievements, &newly);
        tracing::info!(session = %state.id, unlocked = ?newly, "Achievements unlocked");
    }
    newly
}

/// The twenty achievements every new session starts with.
#[must_use]
pub fn default_achievements() -> Vec<Achievement> {
    use AchievementCondition::{
        Autoclick, PointsPerClick, PrestigeLevel, TotalClicks, TotalPoints, UpgradesPurchased,
    };

    let clicks = |requirement| TotalClicks { requirement };
    let lifetime = |requirement| TotalPoints { requirement };
    let prestige = |requirement| PrestigeLevel { requirement };
    let bought = |requirement| UpgradesPurchased { requirement };

    vec![
        Achievement::new("ach1", "First Click", "Click for the first time", clicks(1)),
        Achievement::new("ach2", "Getting Started", "Click 10 times", clicks(10)),
        Achievement::new("ach3", "Apprentice", "Click 100 times", clicks(100)),
        Achievement::new("ach4", "Devoted Fan", "Click 1,000 times", clicks(1_000)),
        Achievement::new(
            "ach5",
            "Point Hoarder",
            "Hold 10,000 points",
            AchievementCondition::Points { requirement: 10_000.0 },
        ),
        Achievement::new("ach6", "Collector", "Buy 10 upgrades", bought(10)),
        Achievement::new("ach7", "Upgrade Master", "Buy 50 upgrades", bought(50)),
        Achievement::new("ach8", "Hands Free", "Activate the autoclicker", Autoclick),
        Achievement::new(
            "ach9",
            "Multiplier",
            "Reach 10 points per click",
            PointsPerClick { requirement: 10.0 },
        ),
        Achievement::new(
            "ach10",
            "Producer",
            "Earn 100,000 points in total",
            lifetime(100_000.0),
        ),
        Achievement::new(
            "ach11",
            "Factory",
            "Earn 1,000,000 points in total",
            lifetime(1_000_000.0),
        ),
        Achievement::new(
            "ach12",
            "Empire",
            "Earn 10,000,000 points in total",
            lifetime(10_000_000.0),
        ),
        Achievement::new("ach13", "Speed Clicker", "Click 5,000 times", clicks(5_000)),
        Achievement::new("ach14", "Marathoner", "Click 10,000 times", clicks(10_000)),
        Achievement::new("ach15", "Legendary", "Click 100,000 times", clicks(100_000)),
        Achievement::new(
            "ach16",
            "Golden Pen",
            "Earn 50,000,000 points in total",
            lifetime(50_000_000.0),
        ),
        Achievement::new("ach17", "Ascension", "Prestige for the first time", prestige(1)),
        Achievement::new("ach18", "Prestige Master", "Reach prestige level 5", prestige(5)),
        Achievement::new("ach19", "Transcendence", "Reach prestige level 10", prestige(10)),
        Achievement::new("ach20", "The Real Deal", "Reach prestige level 20", prestige(20)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::SessionId;
    use crate::upgrade::UpgradeCatalog;

    fn fresh() -> (GameState, Vec<Upgrade>, Vec<Achievement>) {
        (
            GameState::new(SessionId::new(), 0),
            UpgradeCatalog::default().instantiate(),
            default_achievements(),
        )
    }

    #[test]
    fn test_fresh_session_unlocks_nothing() {
        let (state, upgrades, achievements) = fresh();
        assert!(evaluate(&state, &upgrades, &achievements).is_empty());
    }

    #[test]
    fn test_click_thresholds() {
        let (mut state, upgrades, achievements) = fresh();
        state.total_clicks = 10;
        assert_eq!(evaluate(&state, &upgrades, &achievements), vec!["ach1", "ach2"]);
    }

    #[test]
    fn test_evaluate_skips_already_unlocked() {
        let (mut state, upgrades, mut achievements) = fresh();
        state.total_clicks = 1;
        let first = evaluate_and_unlock(&state, &upgrades, &mut achievements);
        assert_eq!(first, vec!["ach1"]);

        let second = evaluate_and_unlock(&state, &upgrades, &mut achievements);
        assert!(second.is_empty());
        assert!(achievements[0].unlocked);
    }

    #[test]
    fn test_unlock_is_never_reversed() {
        let (mut state, upgrades, mut achievements) = fresh();
        state.points = 10_000.0;
        evaluate_and_unlock(&state, &upgrades, &mut achievements);
        assert!(achievements.iter().any(|a| a.id == "ach5" && a.unlocked));

        // Spending the balance does not relock the achievement
        state.points = 0.0;
        evaluate_and_unlock(&state, &upgrades, &mut achievements);
        assert!(achievements.iter().any(|a| a.id == "ach5" && a.unlocked));
    }

    #[test]
    fn test_upgrade_conditions() {
        let (state, mut upgrades, _) = fresh();
        let achievements = vec![
            Achievement::new(
                "total",
                "",
                "",
                AchievementCondition::UpgradesPurchased { requirement: 3 },
            ),
            Achievement::new(
                "ps1x2",
                "",
                "",
                AchievementCondition::UpgradeLevel {
                    upgrade_id: "ps1".into(),
                    requirement: 2,
                },
            ),
        ];

        upgrades[0].level = 2;
        assert!(evaluate(&state, &upgrades, &achievements).is_empty());

        let ps1 = upgrades.iter_mut().find(|u| u.id == "ps1").expect("ps1");
        ps1.level = 2;
        assert_eq!(evaluate(&state, &upgrades, &achievements), vec!["total", "ps1x2"]);
    }

    #[test]
    fn test_diff_is_keyed_by_id_not_position() {
        let (mut state, upgrades, mut achievements) = fresh();
        achievements.reverse();
        state.total_clicks = 10;
        let newly = evaluate_and_unlock(&state, &upgrades, &mut achievements);
        assert_eq!(newly, vec!["ach2", "ach1"]);
    }

    #[test]
    fn test_unlock_ignores_unknown_ids() {
        let (_, _, mut achievements) = fresh();
        unlock(&mut achievements, &["missing".to_string()]);
        assert!(achievements.iter().all(|a| !a.unlocked));
    }

    #[test]
    fn test_condition_serialization() {
        let condition = AchievementCondition::UpgradeLevel {
            upgrade_id: "click1".into(),
            requirement: 5,
        };
        let json = serde_json::to_value(&condition).expect("serialize");
        assert_eq!(json["type"], "upgrade_level");
        assert_eq!(json["upgrade_id"], "click1");
        assert_eq!(json["requirement"], 5);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_unlocks_are_monotonic(
                steps in prop::collection::vec(
                    (0u64..20_000u64, 0.0f64..2e7f64, 0u32..25u32),
                    1..20
                )
            ) {
                let (mut state, upgrades, mut achievements) = fresh();
                let mut seen: Vec<String> = Vec::new();

                for (clicks, points, prestige) in steps {
                    state.total_clicks = clicks;
                    state.points = points;
                    state.prestige_level = prestige;
                    evaluate_and_unlock(&state, &upgrades, &mut achievements);

                    for id in &seen {
                        prop_assert!(
                            achievements.iter().any(|a| &a.id == id && a.unlocked),
                            "{} was relocked", id
                        );
                    }
                    seen = achievements
                        .iter()
                        .filter(|a| a.unlocked)
                        .map(|a| a.id.clone())
                        .collect();
                }
            }
        }
    }
}
