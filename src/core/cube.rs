//! Cube kinds - the game's resource currency.
//!
//! Every token in a bag, on a hero, or parked on a location is a `Cube` of a
//! fixed kind. The classification predicates here drive the bust check, the
//! combat strength count, and worker placement legality.

use serde::{Deserialize, Serialize};

/// A single resource token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Cube {
    Mouse,
    Hare,
    Badger,
    Squirrel,
    Mole,
    Otter,
    Food,
    Inexperience,
    Mastery,
    Wound,
    Vermin,
}

impl Cube {
    /// Adverse tokens: drawing these never contributes allied strength.
    #[must_use]
    pub fn is_adverse(self) -> bool {
        matches!(self, Cube::Wound | Cube::Vermin)
    }

    /// Tokens that may occupy a worker slot on a location.
    #[must_use]
    pub fn is_worker_eligible(self) -> bool {
        matches!(
            self,
            Cube::Mouse
                | Cube::Hare
                | Cube::Badger
                | Cube::Squirrel
                | Cube::Mole
                | Cube::Otter
                | Cube::Mastery
        )
    }

    /// Count toward allied strength in combat.
    #[must_use]
    pub fn is_allied(self) -> bool {
        !self.is_adverse()
    }
}

impl std::fmt::Display for Cube {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Cube::Mouse => "Mouse",
            Cube::Hare => "Hare",
            Cube::Badger => "Badger",
            Cube::Squirrel => "Squirrel",
            Cube::Mole => "Mole",
            Cube::Otter => "Otter",
            Cube::Food => "Food",
            Cube::Inexperience => "Inexperience",
            Cube::Mastery => "Mastery",
            Cube::Wound => "Wound",
            Cube::Vermin => "Vermin",
        };
        write!(f, "{label}")
    }
}

/// Bust test over a combined draw pool: two or more inexperience/adverse
/// tokens end the draw sequence.
#[must_use]
pub fn is_bust(cubes: &[Cube]) -> bool {
    let white = cubes.iter().filter(|c| **c == Cube::Inexperience).count();
    let black = cubes.iter().filter(|c| c.is_adverse()).count();
    white + black >= 2
}

/// Allied strength contributed by a draw pool (adverse tokens excluded).
#[must_use]
pub fn count_allied(cubes: &[Cube]) -> usize {
    cubes.iter().filter(|c| c.is_allied()).count()
}

/// Affinity tags carried by heroes and matched against card affinities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Affinity {
    Mouse,
    Hare,
    Badger,
    Squirrel,
    Mole,
    Otter,
    Sword,
}
