//! # Encounter Generation
//!
//! Builds a combat encounter whose monster XP fills a party's budget.
//!
//! The pipeline runs strictly forward:
//! 1. Party levels and difficulty resolve to an XP target
//! 2. Monsters are drawn uniformly, with replacement, until the raw XP meets
//!    the target or [`MAX_SELECTION_ATTEMPTS`] draws have been made
//! 3. The raw XP is scaled by a multiplier that grows with monster count
//!
//! Hitting the attempt cap is not an error. An encounter can come back with
//! `xp_total` below `xp_target`, for example when the catalog only holds
//! zero-XP monsters.

use crate::config::MAX_SELECTION_ATTEMPTS;
use crate::generation::utils::round_to_hundredths;
use crate::{
    xp_budget, Difficulty, Generator, MonsterCatalog, MonsterEntry, RandomSource, SrdError,
    SrdResult,
};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Levels of every character in the party. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u32>", into = "Vec<u32>")]
pub struct PartyLevels {
    levels: Vec<u32>,
}

impl PartyLevels {
    /// Creates a party, rejecting an empty one.
    ///
    /// # Examples
    ///
    /// ```
    /// use srdservice::PartyLevels;
    ///
    /// let party = PartyLevels::new(vec![2, 3, 3]).unwrap();
    /// assert_eq!(party.len(), 3);
    /// assert_eq!(party.table_level(), 3);
    /// assert!(PartyLevels::new(Vec::new()).is_err());
    /// ```
    pub fn new(levels: Vec<u32>) -> SrdResult<Self> {
        if levels.is_empty() {
            return Err(SrdError::InvalidInput(
                "at least one character level is required".to_string(),
            ));
        }
        Ok(Self { levels })
    }

    pub fn levels(&self) -> &[u32] {
        &self.levels
    }

    /// Party size.
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Always false for a constructed party.
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Arithmetic mean of the levels.
    pub fn average(&self) -> f64 {
        let sum: u64 = self.levels.iter().map(|&l| u64::from(l)).sum();
        sum as f64 / self.levels.len() as f64
    }

    /// Mean level rounded to two decimals, for reporting.
    pub fn reported_average(&self) -> f64 {
        round_to_hundredths(self.average())
    }

    /// Mean level rounded half away from zero and clamped into the threshold
    /// table, for budget lookup.
    pub fn table_level(&self) -> u32 {
        crate::clamp_table_level(self.average().round() as u32)
    }
}

impl TryFrom<Vec<u32>> for PartyLevels {
    type Error = SrdError;

    fn try_from(levels: Vec<u32>) -> Result<Self, Self::Error> {
        Self::new(levels)
    }
}

impl From<PartyLevels> for Vec<u32> {
    fn from(party: PartyLevels) -> Self {
        party.levels
    }
}

/// A monster drawn into an encounter. The same monster may appear many times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedMonster {
    pub name: String,
    #[serde(flatten)]
    pub entry: MonsterEntry,
}

impl SelectedMonster {
    /// Annotates a catalog entry with its name.
    ///
    /// A `name` field inside the stat block wins over the catalog key, the
    /// same way a stat block's own fields overlay the annotation. That field
    /// moves into [`SelectedMonster::name`] so the output never carries two
    /// `name` keys; a non-string value is kept in its JSON text form.
    pub fn new(name: &str, entry: &MonsterEntry) -> Self {
        let mut entry = entry.clone();
        let name = match entry.attributes.remove("name") {
            Some(Value::String(own_name)) => own_name,
            Some(other) => other.to_string(),
            None => name.to_string(),
        };
        Self { name, entry }
    }

    pub fn xp(&self) -> f64 {
        self.entry.xp
    }
}

/// Outcome of the monster selector.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    /// Monsters in draw order
    pub monsters: Vec<SelectedMonster>,
    /// Unscaled XP sum of `monsters`
    pub raw_xp: f64,
    /// Number of draws performed
    pub attempts: u32,
}

/// A finished encounter. Read-only once built.
///
/// `xp_total` may be lower than `xp_target` when the selector ran out of
/// attempts; that is a valid result, see [`EncounterResult::budget_met`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncounterResult {
    party_avg_lvl: f64,
    difficulty: Difficulty,
    xp_target: u64,
    xp_total: u64,
    monsters: Vec<SelectedMonster>,
}

impl EncounterResult {
    /// Party mean level rounded to two decimals.
    pub fn party_avg_lvl(&self) -> f64 {
        self.party_avg_lvl
    }

    /// Tier actually used, after normalization.
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn xp_target(&self) -> u64 {
        self.xp_target
    }

    /// Raw monster XP scaled by the count multiplier, truncated.
    pub fn xp_total(&self) -> u64 {
        self.xp_total
    }

    pub fn monsters(&self) -> &[SelectedMonster] {
        &self.monsters
    }

    /// Unscaled XP of the selected monsters.
    pub fn raw_xp(&self) -> f64 {
        self.monsters.iter().map(SelectedMonster::xp).sum()
    }

    /// Whether the raw XP reached the target before the attempt cap.
    pub fn budget_met(&self) -> bool {
        self.raw_xp() >= self.xp_target as f64
    }
}

/// Scaling factor for facing `count` monsters at once.
///
/// # Examples
///
/// ```
/// use srdservice::difficulty_multiplier;
///
/// assert_eq!(difficulty_multiplier(1), 1.0);
/// assert_eq!(difficulty_multiplier(6), 2.0);
/// assert_eq!(difficulty_multiplier(15), 4.0);
/// ```
pub fn difficulty_multiplier(count: usize) -> f64 {
    match count {
        0 | 1 => 1.0,
        2 => 1.5,
        3..=6 => 2.0,
        7..=10 => 2.5,
        11..=14 => 3.0,
        _ => 4.0,
    }
}

/// Applies the count multiplier to a raw XP sum, truncating the product.
pub fn adjusted_xp(raw_xp: f64, count: usize) -> u64 {
    (raw_xp * difficulty_multiplier(count)) as u64
}

/// Draws monsters uniformly by name until `xp_target` is reached or the
/// attempt cap runs out.
pub fn select_monsters<R: RandomSource + ?Sized>(
    catalog: &MonsterCatalog,
    xp_target: u64,
    rng: &mut R,
) -> SrdResult<Selection> {
    if catalog.is_empty() {
        return Err(SrdError::InvalidCatalog(
            "monster catalog is empty".to_string(),
        ));
    }

    let candidates: Vec<(&str, &MonsterEntry)> = catalog.iter().collect();
    let mut monsters = Vec::new();
    let target = xp_target as f64;
    let mut raw_xp = 0.0;
    let mut attempts = 0;

    while raw_xp < target && attempts < MAX_SELECTION_ATTEMPTS {
        let (name, entry) = candidates[rng.pick_index(candidates.len())];
        raw_xp += entry.xp;
        monsters.push(SelectedMonster::new(name, entry));
        attempts += 1;
    }

    debug!(
        "Selected {} monsters for {} raw XP (target {}) in {} attempts",
        monsters.len(),
        raw_xp,
        xp_target,
        attempts
    );

    Ok(Selection {
        monsters,
        raw_xp,
        attempts,
    })
}

/// Encounter generator for one validated request.
#[derive(Debug, Clone)]
pub struct EncounterGenerator<'a> {
    party: PartyLevels,
    catalog: &'a MonsterCatalog,
    difficulty: Difficulty,
}

impl<'a> EncounterGenerator<'a> {
    /// Validates a request. An empty party is rejected before the catalog is
    /// looked at. Unknown tiers become `Medium` with a warning.
    pub fn new(
        party_levels: &[u32],
        catalog: &'a MonsterCatalog,
        difficulty: &str,
    ) -> SrdResult<Self> {
        let party = PartyLevels::new(party_levels.to_vec())?;
        if catalog.is_empty() {
            return Err(SrdError::InvalidCatalog(
                "monster catalog is empty".to_string(),
            ));
        }

        let (tier, normalized) = Difficulty::normalize(difficulty);
        if normalized {
            warn!("Unrecognized difficulty {:?}, using {}", difficulty, tier);
        }

        Ok(Self::with_party(party, catalog, tier))
    }

    /// Builds a generator from already validated parts.
    pub fn with_party(
        party: PartyLevels,
        catalog: &'a MonsterCatalog,
        difficulty: Difficulty,
    ) -> Self {
        Self {
            party,
            catalog,
            difficulty,
        }
    }

    pub fn party(&self) -> &PartyLevels {
        &self.party
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Total XP the selector aims for.
    pub fn xp_target(&self) -> u64 {
        xp_budget(&self.party, self.difficulty)
    }
}

impl Generator<EncounterResult> for EncounterGenerator<'_> {
    fn generate(&self, rng: &mut dyn RandomSource) -> SrdResult<EncounterResult> {
        let xp_target = self.xp_target();
        debug!(
            "Party of {} at level {} ({}) needs {} XP",
            self.party.len(),
            self.party.table_level(),
            self.difficulty,
            xp_target
        );

        let selection = select_monsters(self.catalog, xp_target, rng)?;
        if selection.raw_xp < xp_target as f64 {
            info!(
                "Attempt cap reached: encounter holds {} of {} XP",
                selection.raw_xp, xp_target
            );
        }

        let xp_total = adjusted_xp(selection.raw_xp, selection.monsters.len());

        Ok(EncounterResult {
            party_avg_lvl: self.party.reported_average(),
            difficulty: self.difficulty,
            xp_target,
            xp_total,
            monsters: selection.monsters,
        })
    }

    fn validate(&self, content: &EncounterResult) -> SrdResult<()> {
        if content.xp_target != self.xp_target() {
            return Err(SrdError::InvalidInput(format!(
                "xp target {} does not match party budget {}",
                content.xp_target,
                self.xp_target()
            )));
        }
        if content.monsters.len() > MAX_SELECTION_ATTEMPTS as usize {
            return Err(SrdError::InvalidInput(format!(
                "{} monsters exceeds the attempt cap of {}",
                content.monsters.len(),
                MAX_SELECTION_ATTEMPTS
            )));
        }
        let expected = adjusted_xp(content.raw_xp(), content.monsters.len());
        if content.xp_total != expected {
            return Err(SrdError::InvalidInput(format!(
                "xp total {} does not match scaled raw xp {}",
                content.xp_total, expected
            )));
        }
        Ok(())
    }

    fn generator_type(&self) -> &'static str {
        "EncounterGenerator"
    }
}

/// Generates a balanced encounter for a party.
///
/// Fails with [`SrdError::InvalidInput`] for an empty party and
/// [`SrdError::InvalidCatalog`] for an empty catalog. Unknown difficulty names
/// fall back to `medium`.
///
/// # Examples
///
/// ```
/// use rand::{rngs::StdRng, SeedableRng};
/// use srdservice::{generate_encounter, MonsterCatalog, MonsterEntry};
///
/// let mut catalog = MonsterCatalog::new();
/// catalog.insert("Goblin", MonsterEntry::new(50));
///
/// let mut rng = StdRng::seed_from_u64(7);
/// let encounter = generate_encounter(&[3, 3, 3], &catalog, "medium", &mut rng).unwrap();
/// assert_eq!(encounter.xp_target(), 450);
/// assert_eq!(encounter.monsters().len(), 9);
/// assert_eq!(encounter.xp_total(), 1125);
/// ```
pub fn generate_encounter<R: RandomSource>(
    party_levels: &[u32],
    catalog: &MonsterCatalog,
    difficulty: &str,
    rng: &mut R,
) -> SrdResult<EncounterResult> {
    EncounterGenerator::new(party_levels, catalog, difficulty)?.generate(rng)
}
