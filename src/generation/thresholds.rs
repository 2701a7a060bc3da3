//! # XP Thresholds
//!
//! Per-character XP budgets by level and difficulty tier, and the budget
//! arithmetic built on top of them.
//!
//! The table only covers levels 1 through 10. Lookups outside that range are
//! clamped to the nearest bound, so a level 14 party is budgeted exactly like
//! a level 10 party.

use crate::config::{MAX_TABLE_LEVEL, MIN_TABLE_LEVEL};
use crate::{PartyLevels, SrdError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Encounter difficulty tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
    Deadly,
}

impl Difficulty {
    /// All tiers, easiest first.
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
        Difficulty::Deadly,
    ];

    /// Lowercase tier name as used in requests and output.
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
            Difficulty::Deadly => "deadly",
        }
    }

    /// Resolves a requested tier name, falling back to `Medium`.
    ///
    /// Only the exact lowercase names are recognized. The returned flag is
    /// `true` when the request was replaced by the fallback.
    ///
    /// # Examples
    ///
    /// ```
    /// use srdservice::Difficulty;
    ///
    /// assert_eq!(Difficulty::normalize("deadly"), (Difficulty::Deadly, false));
    /// assert_eq!(Difficulty::normalize("brutal"), (Difficulty::Medium, true));
    /// ```
    pub fn normalize(requested: &str) -> (Difficulty, bool) {
        match requested.parse() {
            Ok(tier) => (tier, false),
            Err(_) => (Difficulty::Medium, true),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = SrdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Difficulty::ALL
            .into_iter()
            .find(|tier| tier.as_str() == s)
            .ok_or_else(|| SrdError::InvalidDifficulty(s.to_string()))
    }
}

/// Per-character XP budgets for one level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct XpThresholds {
    pub easy: u64,
    pub medium: u64,
    pub hard: u64,
    pub deadly: u64,
}

impl XpThresholds {
    const fn new(easy: u64, medium: u64, hard: u64, deadly: u64) -> Self {
        Self {
            easy,
            medium,
            hard,
            deadly,
        }
    }

    /// Budget for the given tier.
    pub fn for_tier(&self, tier: Difficulty) -> u64 {
        match tier {
            Difficulty::Easy => self.easy,
            Difficulty::Medium => self.medium,
            Difficulty::Hard => self.hard,
            Difficulty::Deadly => self.deadly,
        }
    }
}

/// XP thresholds for levels 1 through 10, indexed by `level - 1`.
pub const XP_THRESHOLDS: [XpThresholds; 10] = [
    XpThresholds::new(25, 50, 75, 100),
    XpThresholds::new(50, 100, 150, 200),
    XpThresholds::new(75, 150, 225, 400),
    XpThresholds::new(125, 250, 375, 500),
    XpThresholds::new(250, 500, 750, 1100),
    XpThresholds::new(300, 600, 900, 1400),
    XpThresholds::new(350, 750, 1100, 1700),
    XpThresholds::new(450, 900, 1400, 2100),
    XpThresholds::new(550, 1100, 1600, 2400),
    XpThresholds::new(600, 1200, 1900, 2800),
];

/// Clamps a level into the range covered by [`XP_THRESHOLDS`].
pub fn clamp_table_level(level: u32) -> u32 {
    level.clamp(MIN_TABLE_LEVEL, MAX_TABLE_LEVEL)
}

/// Per-character XP threshold for a level and tier.
///
/// # Examples
///
/// ```
/// use srdservice::{threshold_for, Difficulty};
///
/// assert_eq!(threshold_for(3, Difficulty::Medium), 150);
/// assert_eq!(threshold_for(17, Difficulty::Deadly), 2800);
/// ```
pub fn threshold_for(level: u32, tier: Difficulty) -> u64 {
    let index = (clamp_table_level(level) - MIN_TABLE_LEVEL) as usize;
    XP_THRESHOLDS[index].for_tier(tier)
}

/// Total XP target for a whole party.
pub fn xp_budget(party: &PartyLevels, tier: Difficulty) -> u64 {
    threshold_for(party.table_level(), tier) * party.len() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_rows() {
        assert_eq!(threshold_for(1, Difficulty::Easy), 25);
        assert_eq!(threshold_for(3, Difficulty::Deadly), 400);
        assert_eq!(threshold_for(5, Difficulty::Deadly), 1100);
        assert_eq!(threshold_for(7, Difficulty::Medium), 750);
        assert_eq!(threshold_for(10, Difficulty::Hard), 1900);
    }

    #[test]
    fn test_table_is_monotonic() {
        for row in XP_THRESHOLDS.iter() {
            assert!(row.easy < row.medium);
            assert!(row.medium < row.hard);
            assert!(row.hard < row.deadly);
        }
        for pair in XP_THRESHOLDS.windows(2) {
            for tier in Difficulty::ALL {
                assert!(pair[0].for_tier(tier) < pair[1].for_tier(tier));
            }
        }
    }

    #[test]
    fn test_levels_clamp_into_table() {
        assert_eq!(clamp_table_level(0), 1);
        assert_eq!(clamp_table_level(4), 4);
        assert_eq!(clamp_table_level(20), 10);

        for tier in Difficulty::ALL {
            assert_eq!(threshold_for(0, tier), threshold_for(1, tier));
            assert_eq!(threshold_for(11, tier), threshold_for(10, tier));
            assert_eq!(threshold_for(u32::MAX, tier), threshold_for(10, tier));
        }
    }

    #[test]
    fn test_difficulty_parsing() {
        assert_eq!("easy".parse::<Difficulty>().unwrap(), Difficulty::Easy);
        assert_eq!("deadly".parse::<Difficulty>().unwrap(), Difficulty::Deadly);
        assert!(matches!(
            "Hard".parse::<Difficulty>(),
            Err(SrdError::InvalidDifficulty(_))
        ));
    }

    #[test]
    fn test_difficulty_normalization() {
        assert_eq!(Difficulty::normalize("hard"), (Difficulty::Hard, false));
        assert_eq!(Difficulty::normalize("medium"), (Difficulty::Medium, false));
        assert_eq!(Difficulty::normalize("brutal"), (Difficulty::Medium, true));
        assert_eq!(Difficulty::normalize(""), (Difficulty::Medium, true));
        assert_eq!(Difficulty::normalize("EASY"), (Difficulty::Medium, true));
        assert_eq!(Difficulty::normalize("brutal").0, Difficulty::default());
    }

    #[test]
    fn test_difficulty_serializes_lowercase() {
        let json = serde_json::to_string(&Difficulty::Deadly).unwrap();
        assert_eq!(json, "\"deadly\"");
        assert_eq!(Difficulty::Hard.to_string(), "hard");
    }

    #[test]
    fn test_party_budget() {
        let party = PartyLevels::new(vec![3, 3, 3]).unwrap();
        assert_eq!(xp_budget(&party, Difficulty::Medium), 450);
        assert_eq!(xp_budget(&party, Difficulty::Deadly), 1200);

        let high = PartyLevels::new(vec![15, 16]).unwrap();
        assert_eq!(xp_budget(&high, Difficulty::Easy), 1200);
    }
}
