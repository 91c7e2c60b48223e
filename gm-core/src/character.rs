//! Characters and stat allocation.
//!
//! Stats are bought from a fixed point budget at creation time; the budget
//! invariant is enforced by the allocator, not revalidated afterwards.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Total points distributed across the five stats at creation.
pub const STAT_BUDGET: i32 = 30;

/// Races with known ability lists. Free-text races are allowed too.
pub const KNOWN_RACES: [&str; 5] = ["Human", "Elf", "Dwarf", "Halfling", "Orc"];

/// Classes with known ability lists. Free-text classes are allowed too.
pub const KNOWN_CLASSES: [&str; 6] = ["Fighter", "Wizard", "Rogue", "Cleric", "Ranger", "Bard"];

/// The five named attributes of a character.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub strength: i32,
    pub dexterity: i32,
    pub constitution: i32,
    pub intelligence: i32,
    pub charisma: i32,
}

impl Stats {
    /// Sum of all five attributes.
    pub fn total(&self) -> i32 {
        self.strength + self.dexterity + self.constitution + self.intelligence + self.charisma
    }

    /// Distribute the full budget randomly, one point at a time, with every
    /// stat starting at 1.
    pub fn random() -> Self {
        let mut values = [1i32; 5];
        let mut rng = rand::thread_rng();
        for _ in 0..(STAT_BUDGET - 5) {
            values[rng.gen_range(0..5)] += 1;
        }
        Self {
            strength: values[0],
            dexterity: values[1],
            constitution: values[2],
            intelligence: values[3],
            charisma: values[4],
        }
    }
}

/// Error from point-buy allocation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AllocationError {
    #[error("not enough points: {requested} requested, {remaining} remaining")]
    InsufficientPoints { requested: i32, remaining: i32 },

    #[error("stat values must be non-negative")]
    NegativePoints,
}

/// Point-buy allocator for the five stats.
///
/// Spend points one stat at a time; [`StatAllocation::finish`] dumps any
/// unspent remainder into constitution, so a completed allocation always
/// sums to exactly [`STAT_BUDGET`].
#[derive(Debug, Clone, Default)]
pub struct StatAllocation {
    spent: Stats,
}

impl StatAllocation {
    /// Start a fresh allocation with the full budget unspent.
    pub fn new() -> Self {
        Self::default()
    }

    /// Points not yet assigned.
    pub fn remaining(&self) -> i32 {
        STAT_BUDGET - self.spent.total()
    }

    /// Assign points to a stat.
    pub fn spend(&mut self, stat: StatName, points: i32) -> Result<(), AllocationError> {
        if points < 0 {
            return Err(AllocationError::NegativePoints);
        }
        if points > self.remaining() {
            return Err(AllocationError::InsufficientPoints {
                requested: points,
                remaining: self.remaining(),
            });
        }
        *self.slot(stat) += points;
        Ok(())
    }

    /// Complete the allocation. Leftover points go to constitution.
    pub fn finish(mut self) -> Stats {
        self.spent.constitution += self.remaining();
        self.spent
    }

    fn slot(&mut self, stat: StatName) -> &mut i32 {
        match stat {
            StatName::Strength => &mut self.spent.strength,
            StatName::Dexterity => &mut self.spent.dexterity,
            StatName::Constitution => &mut self.spent.constitution,
            StatName::Intelligence => &mut self.spent.intelligence,
            StatName::Charisma => &mut self.spent.charisma,
        }
    }
}

/// The five stat names, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatName {
    Strength,
    Dexterity,
    Constitution,
    Intelligence,
    Charisma,
}

impl StatName {
    pub fn all() -> &'static [StatName] {
        &[
            StatName::Strength,
            StatName::Dexterity,
            StatName::Constitution,
            StatName::Intelligence,
            StatName::Charisma,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            StatName::Strength => "Strength",
            StatName::Dexterity => "Dexterity",
            StatName::Constitution => "Constitution",
            StatName::Intelligence => "Intelligence",
            StatName::Charisma => "Charisma",
        }
    }
}

/// A player character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub name: String,
    pub race: String,
    pub class: String,
    pub background: String,
    pub stats: Stats,
    pub race_abilities: Vec<String>,
    pub class_abilities: Vec<String>,
}

impl Character {
    /// Create a character; ability lists are filled from the lookup tables.
    pub fn new(
        name: impl Into<String>,
        race: impl Into<String>,
        class: impl Into<String>,
        background: impl Into<String>,
        stats: Stats,
    ) -> Self {
        let race = race.into();
        let class = class.into();
        Self {
            name: name.into(),
            race_abilities: race_abilities(&race),
            class_abilities: class_abilities(&class),
            race,
            class,
            background: background.into(),
            stats,
        }
    }

    /// Generate a character with a random race, class, and stat spread.
    pub fn random(name: impl Into<String>) -> Self {
        let mut rng = rand::thread_rng();
        let race = *KNOWN_RACES.choose(&mut rng).unwrap_or(&KNOWN_RACES[0]);
        let class = *KNOWN_CLASSES.choose(&mut rng).unwrap_or(&KNOWN_CLASSES[0]);
        Self::new(
            name,
            race,
            class,
            "A brave soul seeking adventure",
            Stats::random(),
        )
    }
}

/// Abilities granted by a race, keyed case-insensitively.
pub fn race_abilities(race: &str) -> Vec<String> {
    let abilities: &[&str] = match race.trim().to_lowercase().as_str() {
        "human" => &["Adaptable", "Extra Skill Training"],
        "elf" => &["Keen Senses", "Trance", "Fey Step"],
        "dwarf" => &["Stonecunning", "Poison Resilience"],
        "halfling" => &["Lucky", "Nimble Escape"],
        "orc" => &["Relentless Endurance", "Savage Critical"],
        _ => &["Unusual Heritage"],
    };
    abilities.iter().map(|s| s.to_string()).collect()
}

/// Abilities granted by a class, keyed case-insensitively.
pub fn class_abilities(class: &str) -> Vec<String> {
    let abilities: &[&str] = match class.trim().to_lowercase().as_str() {
        "fighter" => &["Second Wind", "Weapon Mastery"],
        "wizard" => &["Spellcasting", "Arcane Recovery"],
        "rogue" => &["Sneak Attack", "Cunning Action"],
        "cleric" => &["Divine Channel", "Healing Word"],
        "ranger" => &["Favored Terrain", "Hunter's Mark"],
        "bard" => &["Bardic Inspiration", "Jack of All Trades"],
        _ => &["Untested Talent"],
    };
    abilities.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_stats_sum_to_budget() {
        for _ in 0..50 {
            let stats = Stats::random();
            assert_eq!(stats.total(), STAT_BUDGET);
        }
    }

    #[test]
    fn test_point_buy_sums_to_budget() {
        let mut alloc = StatAllocation::new();
        alloc.spend(StatName::Strength, 8).unwrap();
        alloc.spend(StatName::Dexterity, 6).unwrap();
        alloc.spend(StatName::Intelligence, 4).unwrap();
        let stats = alloc.finish();

        assert_eq!(stats.total(), STAT_BUDGET);
        // Leftover 12 points land in constitution.
        assert_eq!(stats.constitution, 12);
    }

    #[test]
    fn test_point_buy_overspend_rejected() {
        let mut alloc = StatAllocation::new();
        alloc.spend(StatName::Strength, 20).unwrap();
        let err = alloc.spend(StatName::Charisma, 11).unwrap_err();
        assert_eq!(
            err,
            AllocationError::InsufficientPoints {
                requested: 11,
                remaining: 10
            }
        );
    }

    #[test]
    fn test_point_buy_negative_rejected() {
        let mut alloc = StatAllocation::new();
        assert_eq!(
            alloc.spend(StatName::Strength, -1),
            Err(AllocationError::NegativePoints)
        );
    }

    #[test]
    fn test_ability_lookup_case_insensitive() {
        assert_eq!(race_abilities("ELF"), race_abilities("elf"));
        assert_eq!(class_abilities(" Rogue "), class_abilities("rogue"));
    }

    #[test]
    fn test_unknown_race_gets_generic_abilities() {
        let abilities = race_abilities("Gnomish Automaton");
        assert!(!abilities.is_empty());
    }

    #[test]
    fn test_random_character_complete() {
        let character = Character::random("Adventurer");
        assert_eq!(character.stats.total(), STAT_BUDGET);
        assert!(!character.race_abilities.is_empty());
        assert!(!character.class_abilities.is_empty());
    }
}
