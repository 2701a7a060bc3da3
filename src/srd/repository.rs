//! # SRD Repository
//!
//! Loads the SRD reference files from a directory and serves lookups over
//! them. A repository built with [`SrdRepository::default`] is *cold*: it holds
//! nothing and every data accessor fails with [`SrdError::NotLoaded`].

use crate::{
    generate_encounter, EncounterResult, MonsterCatalog, RandomSource, SrdError, SrdResult,
};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// A top-level data set of the SRD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SrdSection {
    Attributes,
    Skills,
    Conditions,
    Classes,
    Races,
    Spells,
    Equipment,
    Monsters,
    License,
}

impl SrdSection {
    /// Every section, in load order.
    pub const ALL: [SrdSection; 9] = [
        SrdSection::Attributes,
        SrdSection::Skills,
        SrdSection::Conditions,
        SrdSection::Classes,
        SrdSection::Races,
        SrdSection::Spells,
        SrdSection::Equipment,
        SrdSection::Monsters,
        SrdSection::License,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SrdSection::Attributes => "attributes",
            SrdSection::Skills => "skills",
            SrdSection::Conditions => "conditions",
            SrdSection::Classes => "classes",
            SrdSection::Races => "races",
            SrdSection::Spells => "spells",
            SrdSection::Equipment => "equipment",
            SrdSection::Monsters => "monsters",
            SrdSection::License => "license",
        }
    }

    /// File holding this section inside the SRD directory.
    pub fn file_name(self) -> &'static str {
        match self {
            SrdSection::Monsters => "monsters_srd.json",
            SrdSection::Attributes => "attributes.json",
            SrdSection::Skills => "skills.json",
            SrdSection::Conditions => "conditions.json",
            SrdSection::Classes => "classes.json",
            SrdSection::Races => "races.json",
            SrdSection::Spells => "spells.json",
            SrdSection::Equipment => "equipment.json",
            SrdSection::License => "license.json",
        }
    }
}

impl fmt::Display for SrdSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SrdSection {
    type Err = SrdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SrdSection::ALL
            .into_iter()
            .find(|section| section.as_str() == s)
            .ok_or_else(|| SrdError::UnknownSection(s.to_string()))
    }
}

/// One hit of a section search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub name: String,
    pub data: Value,
}

/// Load readiness of a repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    /// `"ready"` once data is loaded, `"cold"` otherwise
    pub status: String,
    /// Names of the loaded sections
    pub loaded_keys: Vec<String>,
}

impl HealthReport {
    pub fn is_ready(&self) -> bool {
        self.status == "ready"
    }
}

/// In-memory SRD data, loaded once and then read-only.
#[derive(Debug, Clone, Default)]
pub struct SrdRepository {
    sections: BTreeMap<SrdSection, Value>,
    monsters: MonsterCatalog,
}

impl SrdRepository {
    /// Loads every section file from `base_path`.
    ///
    /// A missing or malformed file fails the whole load, so a repository is
    /// either fully loaded or not constructed at all.
    pub fn load(base_path: impl AsRef<Path>) -> SrdResult<Self> {
        let base_path = base_path.as_ref();
        let mut sections = BTreeMap::new();

        for section in SrdSection::ALL {
            let path = base_path.join(section.file_name());
            debug!("Loading {} from {}", section, path.display());
            sections.insert(section, read_json(&path)?);
        }

        let monsters: MonsterCatalog = match sections.get(&SrdSection::Monsters) {
            Some(value) => serde_json::from_value(value.clone()).map_err(|e| {
                SrdError::DataFile {
                    path: base_path
                        .join(SrdSection::Monsters.file_name())
                        .display()
                        .to_string(),
                    message: e.to_string(),
                }
            })?,
            None => MonsterCatalog::new(),
        };

        info!(
            "Loaded {} SRD sections from {} ({} monsters)",
            sections.len(),
            base_path.display(),
            monsters.len()
        );

        Ok(Self { sections, monsters })
    }

    /// Whether reference data is present.
    pub fn is_loaded(&self) -> bool {
        !self.sections.is_empty()
    }

    /// Reports readiness and the loaded section names.
    pub fn health(&self) -> HealthReport {
        let status = if self.is_loaded() { "ready" } else { "cold" };
        HealthReport {
            status: status.to_string(),
            loaded_keys: self
                .sections
                .keys()
                .map(|section| section.as_str().to_string())
                .collect(),
        }
    }

    /// Raw JSON of a whole section.
    pub fn section(&self, section: SrdSection) -> SrdResult<&Value> {
        self.ensure_loaded()?;
        self.sections.get(&section).ok_or(SrdError::NotLoaded)
    }

    /// The monster catalog used for encounter generation.
    pub fn monsters(&self) -> SrdResult<&MonsterCatalog> {
        self.ensure_loaded()?;
        Ok(&self.monsters)
    }

    /// Finds an entry by name, exact match first, then ignoring case.
    pub fn find(&self, section: SrdSection, name: &str) -> SrdResult<&Value> {
        let not_found = || SrdError::NotFound {
            section: section.to_string(),
            name: name.to_string(),
        };

        let entries = self.section(section)?.as_object().ok_or_else(not_found)?;
        if let Some(entry) = entries.get(name) {
            return Ok(entry);
        }

        let lowered = name.to_lowercase();
        entries
            .iter()
            .find(|(key, _)| key.to_lowercase() == lowered)
            .map(|(_, entry)| entry)
            .ok_or_else(not_found)
    }

    /// Case-insensitive substring search over entry names and field values.
    ///
    /// Sections that are not name-keyed objects yield no results.
    pub fn search(&self, section: SrdSection, query: &str) -> SrdResult<Vec<SearchResult>> {
        let Some(entries) = self.section(section)?.as_object() else {
            return Ok(Vec::new());
        };

        let needle = query.to_lowercase();
        Ok(entries
            .iter()
            .filter(|(name, data)| {
                name.to_lowercase().contains(&needle) || fields_contain(data, &needle)
            })
            .map(|(name, data)| SearchResult {
                name: name.clone(),
                data: data.clone(),
            })
            .collect())
    }

    /// Generates an encounter against the loaded monster catalog.
    pub fn encounter<R: RandomSource>(
        &self,
        party_levels: &[u32],
        difficulty: &str,
        rng: &mut R,
    ) -> SrdResult<EncounterResult> {
        generate_encounter(party_levels, self.monsters()?, difficulty, rng)
    }

    fn ensure_loaded(&self) -> SrdResult<()> {
        if self.is_loaded() {
            Ok(())
        } else {
            Err(SrdError::NotLoaded)
        }
    }
}

fn read_json(path: &Path) -> SrdResult<Value> {
    let data_file_error = |message: String| SrdError::DataFile {
        path: path.display().to_string(),
        message,
    };
    let text = fs::read_to_string(path).map_err(|e| data_file_error(e.to_string()))?;
    serde_json::from_str(&text).map_err(|e| data_file_error(e.to_string()))
}

/// Matches `needle` against the string form of each field of an object.
fn fields_contain(data: &Value, needle: &str) -> bool {
    let Some(fields) = data.as_object() else {
        return false;
    };
    fields.values().any(|value| {
        let text = match value {
            Value::String(s) => s.to_lowercase(),
            other => other.to_string().to_lowercase(),
        };
        text.contains(needle)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn loaded_repository() -> SrdRepository {
        let mut sections = BTreeMap::new();
        for section in SrdSection::ALL {
            sections.insert(section, json!({}));
        }
        sections.insert(
            SrdSection::Spells,
            json!({
                "Fire Bolt": {"level": 0, "school": "Evocation"},
                "Sleep": {"level": 1, "school": "Enchantment"},
                "Mage Armor": {"level": 1, "school": "Abjuration", "tags": ["buff"]}
            }),
        );
        sections.insert(SrdSection::License, json!("CC-BY-4.0"));
        let monsters = json!({
            "Goblin": {"cr": 0.25, "xp": 50},
            "Wolf": {"cr": 0.25, "xp": 50, "type": "beast"}
        });
        sections.insert(SrdSection::Monsters, monsters.clone());

        SrdRepository {
            sections,
            monsters: serde_json::from_value(monsters).unwrap(),
        }
    }

    #[test]
    fn test_section_names_round_trip() {
        for section in SrdSection::ALL {
            assert_eq!(section.as_str().parse::<SrdSection>().unwrap(), section);
        }
        assert_eq!(SrdSection::Monsters.file_name(), "monsters_srd.json");
        assert!(matches!(
            "potions".parse::<SrdSection>(),
            Err(SrdError::UnknownSection(_))
        ));
    }

    #[test]
    fn test_cold_repository() {
        let repo = SrdRepository::default();
        let health = repo.health();
        assert_eq!(health.status, "cold");
        assert!(health.loaded_keys.is_empty());
        assert!(!health.is_ready());

        assert!(matches!(repo.section(SrdSection::Spells), Err(SrdError::NotLoaded)));
        assert!(matches!(repo.monsters(), Err(SrdError::NotLoaded)));
        assert!(matches!(
            repo.find(SrdSection::Monsters, "Goblin"),
            Err(SrdError::NotLoaded)
        ));
    }

    #[test]
    fn test_health_lists_sections() {
        let health = loaded_repository().health();
        assert!(health.is_ready());
        assert_eq!(health.loaded_keys.len(), 9);
        assert_eq!(health.loaded_keys[0], "attributes");
        assert!(health.loaded_keys.contains(&"monsters".to_string()));
    }

    #[test]
    fn test_find_exact_then_case_insensitive() {
        let repo = loaded_repository();
        assert_eq!(repo.find(SrdSection::Spells, "Sleep").unwrap()["level"], 1);
        assert_eq!(
            repo.find(SrdSection::Spells, "fire bolt").unwrap()["school"],
            "Evocation"
        );
        assert!(matches!(
            repo.find(SrdSection::Spells, "Wish"),
            Err(SrdError::NotFound { .. })
        ));
        assert!(matches!(
            repo.find(SrdSection::License, "anything"),
            Err(SrdError::NotFound { .. })
        ));
    }

    #[test]
    fn test_search_names_and_fields() {
        let repo = loaded_repository();

        let hits = repo.search(SrdSection::Spells, "bolt").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Fire Bolt");

        let hits = repo.search(SrdSection::Spells, "ENCHANT").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Sleep");

        let hits = repo.search(SrdSection::Spells, "buff").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Mage Armor");

        let hits = repo.search(SrdSection::Monsters, "beast").unwrap();
        assert_eq!(hits[0].name, "Wolf");

        assert!(repo.search(SrdSection::License, "cc").unwrap().is_empty());
        assert!(repo.search(SrdSection::Spells, "zzz").unwrap().is_empty());
    }

    #[test]
    fn test_encounter_uses_loaded_monsters() {
        use rand::{rngs::StdRng, SeedableRng};

        let repo = loaded_repository();
        let mut rng = StdRng::seed_from_u64(4);
        let result = repo.encounter(&[2, 2], "easy", &mut rng).unwrap();
        assert_eq!(result.xp_target(), 100);
        assert_eq!(result.monsters().len(), 2);
        assert_eq!(result.xp_total(), 150);

        let cold = SrdRepository::default();
        assert!(matches!(
            cold.encounter(&[2, 2], "easy", &mut rng),
            Err(SrdError::NotLoaded)
        ));
    }
}
