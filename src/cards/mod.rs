//! Card model: identities, the runtime card union, and horde cards.
//!
//! Templates (static content) live in [`crate::content`]; this module holds
//! the instantiated cards that exist during a match. Every instance carries a
//! unique [`CardUid`] distinct from its [`TemplateId`], because several
//! instances of the same template can be in play at once.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::abilities::AbilityKey;
use crate::core::cube::{Affinity, Cube};
use crate::core::player::PlayerId;

/// Identifier of a content template (shared by all instances of that card).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TemplateId(String);

impl TemplateId {
    /// Create a template ID from a content slug.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw slug.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TemplateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TemplateId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Unique identity of a card instance within one match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardUid(pub u32);

impl CardUid {
    /// Create a new card UID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw UID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for CardUid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Card({})", self.0)
    }
}

/// A cube kind with a multiplicity, used for bag templates and printed
/// hero critters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CubeCount {
    pub cube: Cube,
    pub count: usize,
}

impl CubeCount {
    /// Shorthand constructor.
    #[must_use]
    pub const fn new(cube: Cube, count: usize) -> Self {
        Self { cube, count }
    }
}

/// A worker token parked on a location's worker slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Worker {
    pub cube: Cube,
    pub owner: PlayerId,
}

/// Completion goal of a quest card.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestGoal {
    /// Total cubes to contribute.
    pub target: usize,
    /// Cube kinds that must each appear at least once among the contribution.
    pub requires: Vec<Cube>,
}

/// Reward granted by working a location card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionReward {
    /// Heal up to 2 wounds (the infirmary).
    Heal,
    /// Gain this many food cubes.
    Provisions(usize),
    /// Gain this many mouse cubes.
    Scouts(usize),
}

/// Per-variant payload of a card instance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardKind {
    /// Recruitable hero.
    Hero {
        cost: usize,
        critters: Vec<CubeCount>,
        ability: Option<AbilityKey>,
    },
    /// Visitable location.
    Location { reward: Option<ActionReward> },
    /// Quest card; personal quests name their owning champion.
    Quest {
        owner: Option<TemplateId>,
        goal: QuestGoal,
        completed: bool,
    },
    /// Fortress stack card.
    Fortress,
    /// Villain stack card.
    Villain,
}

/// A card instance in play: shared base plus a [`CardKind`] payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub uid: CardUid,
    pub template: TemplateId,
    pub name: String,
    /// Capacity shared by threat load and worker slots.
    pub slots: usize,
    /// Threat load currently on the card.
    pub vermin: usize,
    /// Workers parked on the card.
    pub workers: SmallVec<[Worker; 4]>,
    /// Affinity tags matched against hero affinities in combat.
    pub affinities: Vec<Affinity>,
    pub kind: CardKind,
}

impl Card {
    #[must_use]
    pub fn is_location(&self) -> bool {
        matches!(self.kind, CardKind::Location { .. })
    }

    #[must_use]
    pub fn is_hero(&self) -> bool {
        matches!(self.kind, CardKind::Hero { .. })
    }

    #[must_use]
    pub fn is_quest(&self) -> bool {
        matches!(self.kind, CardKind::Quest { .. })
    }

    /// The location's action reward, if this is a location card.
    #[must_use]
    pub fn reward(&self) -> Option<ActionReward> {
        match self.kind {
            CardKind::Location { reward } => reward,
            _ => None,
        }
    }

    /// Remaining worker capacity.
    #[must_use]
    pub fn free_worker_slots(&self) -> usize {
        self.slots.saturating_sub(self.workers.len())
    }

    /// Spawn threat units onto this card.
    ///
    /// Each unit first displaces a parked worker if one is present (the
    /// evicted token is lost and the unit is consumed by the eviction);
    /// otherwise the threat load increments, capped at the slot count.
    pub fn add_vermin(&mut self, amount: usize) {
        for _ in 0..amount {
            if self.workers.pop().is_some() {
                continue;
            }
            if self.vermin < self.slots {
                self.vermin += 1;
            }
        }
    }
}

/// Horde effect scripted on a horde card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HordeEffect {
    /// Day: combat requires one extra draw.
    CombatPlusOne,
    /// Night: one threat unit on the discovered location with most workers.
    WorkersPressure,
}

/// The active horde card (no slots, no workers - pure effect carrier).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HordeCard {
    pub template: TemplateId,
    pub name: String,
    pub effect: HordeEffect,
}
