//! # SRD Module
//!
//! Reference data model and the repository that loads it from disk.
//!
//! The repository is a plain value: construct it at startup, hand it to
//! whoever needs the data, drop it at shutdown.

pub mod repository;

pub use repository::*;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Largest integer an `f64` holds exactly.
const MAX_EXACT_XP: f64 = 9_007_199_254_740_992.0;

/// A single monster stat block.
///
/// Only `xp` is interpreted. Every other field (challenge rating, hit points,
/// armor class, ...) is carried through untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MonsterEntry {
    /// Experience value, non-negative and finite; entries without one count
    /// as 0
    #[serde(
        default,
        deserialize_with = "deserialize_xp",
        serialize_with = "serialize_xp"
    )]
    pub xp: f64,
    /// Remaining stat block fields
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl MonsterEntry {
    /// Creates an entry with the given XP and no other fields.
    pub fn new(xp: impl Into<f64>) -> Self {
        Self {
            xp: xp.into(),
            attributes: Map::new(),
        }
    }

    /// Adds a pass-through field.
    ///
    /// # Examples
    ///
    /// ```
    /// use srdservice::MonsterEntry;
    ///
    /// let goblin = MonsterEntry::new(50)
    ///     .with_attribute("cr", 0.25)
    ///     .with_attribute("hp", 7);
    /// assert_eq!(goblin.xp, 50.0);
    /// assert_eq!(goblin.attributes["hp"], 7);
    /// ```
    pub fn with_attribute(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.to_string(), value.into());
        self
    }
}

fn deserialize_xp<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let xp = f64::deserialize(deserializer)?;
    if xp.is_finite() && xp >= 0.0 {
        Ok(xp)
    } else {
        Err(D::Error::custom(format!(
            "xp must be a non-negative number, got {}",
            xp
        )))
    }
}

/// Whole XP values are written back as integers.
fn serialize_xp<S: Serializer>(xp: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if xp.fract() == 0.0 && *xp <= MAX_EXACT_XP {
        serializer.serialize_u64(*xp as u64)
    } else {
        serializer.serialize_f64(*xp)
    }
}

/// Monsters available for encounter generation, keyed by unique name.
///
/// Names are kept in sorted order so that a seeded random source always sees
/// the same sequence of candidates.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MonsterCatalog {
    monsters: BTreeMap<String, MonsterEntry>,
}

impl MonsterCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a monster.
    pub fn insert(&mut self, name: impl Into<String>, entry: MonsterEntry) {
        self.monsters.insert(name.into(), entry);
    }

    /// Gets a monster by exact name.
    pub fn get(&self, name: &str) -> Option<&MonsterEntry> {
        self.monsters.get(name)
    }

    /// Number of distinct monsters.
    pub fn len(&self) -> usize {
        self.monsters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.monsters.is_empty()
    }

    /// Monster names in catalog order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.monsters.keys().map(String::as_str)
    }

    /// Name and entry pairs in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MonsterEntry)> {
        self.monsters.iter().map(|(name, entry)| (name.as_str(), entry))
    }
}

impl<S: Into<String>> FromIterator<(S, MonsterEntry)> for MonsterCatalog {
    fn from_iter<I: IntoIterator<Item = (S, MonsterEntry)>>(iter: I) -> Self {
        Self {
            monsters: iter
                .into_iter()
                .map(|(name, entry)| (name.into(), entry))
                .collect(),
        }
    }
}
