//! Static game content: champion, hero, location, quest, threat, and horde
//! templates, plus the standard catalog a match is set up from.
//!
//! Templates are pure data. [`crate::setup`] instantiates them into
//! [`Card`] instances with match-unique UIDs; nothing here mutates during
//! play, so catalogs can be shared across matches.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::abilities::AbilityKey;
use crate::cards::{
    ActionReward, Card, CardKind, CardUid, CubeCount, HordeCard, HordeEffect, QuestGoal,
    TemplateId,
};
use crate::core::cube::{Affinity, Cube};

/// A playable champion: permanent hero plus starting bag and personal quests.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChampionTemplate {
    pub id: TemplateId,
    pub name: String,
    /// Champion cube slot capacity.
    pub slots: usize,
    pub affinities: Vec<Affinity>,
    /// Starting bag contents.
    pub bag: Vec<CubeCount>,
    /// Personal quest cards shuffled into the adventure deck.
    pub quests: Vec<QuestTemplate>,
}

/// A recruitable hero card.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeroTemplate {
    pub id: TemplateId,
    pub name: String,
    pub slots: usize,
    /// Food cost to recruit.
    pub cost: usize,
    pub affinities: Vec<Affinity>,
    /// Cubes added to the recruiter's bag.
    pub critters: Vec<CubeCount>,
    pub ability: Option<AbilityKey>,
}

/// A location card, either in the adventure deck or pre-discovered.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationTemplate {
    pub id: TemplateId,
    pub name: String,
    pub slots: usize,
    pub affinities: Vec<Affinity>,
    pub reward: Option<ActionReward>,
}

/// A quest card. Personal quests name their owning champion.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestTemplate {
    pub id: TemplateId,
    pub name: String,
    pub owner: Option<TemplateId>,
    pub target: usize,
    pub requires: Vec<Cube>,
}

/// A fortress or villain stack card.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreatTemplate {
    pub id: TemplateId,
    pub name: String,
    pub slots: usize,
    /// Printed threat load.
    pub vermin: usize,
    pub affinities: Vec<Affinity>,
}

/// A horde card template.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HordeTemplate {
    pub id: TemplateId,
    pub name: String,
    pub effect: HordeEffect,
}

impl HeroTemplate {
    /// Instantiate as a card in the adventure deck.
    #[must_use]
    pub fn instantiate(&self, uid: CardUid) -> Card {
        Card {
            uid,
            template: self.id.clone(),
            name: self.name.clone(),
            slots: self.slots,
            vermin: 0,
            workers: SmallVec::new(),
            affinities: self.affinities.clone(),
            kind: CardKind::Hero {
                cost: self.cost,
                critters: self.critters.clone(),
                ability: self.ability,
            },
        }
    }
}

impl LocationTemplate {
    /// Instantiate as a card.
    #[must_use]
    pub fn instantiate(&self, uid: CardUid) -> Card {
        Card {
            uid,
            template: self.id.clone(),
            name: self.name.clone(),
            slots: self.slots,
            vermin: 0,
            workers: SmallVec::new(),
            affinities: self.affinities.clone(),
            kind: CardKind::Location {
                reward: self.reward,
            },
        }
    }
}

impl QuestTemplate {
    /// Instantiate as a card. Quest cards use the goal target as their slot
    /// count so every card carries a meaningful capacity.
    #[must_use]
    pub fn instantiate(&self, uid: CardUid) -> Card {
        Card {
            uid,
            template: self.id.clone(),
            name: self.name.clone(),
            slots: self.target,
            vermin: 0,
            workers: SmallVec::new(),
            affinities: Vec::new(),
            kind: CardKind::Quest {
                owner: self.owner.clone(),
                goal: QuestGoal {
                    target: self.target,
                    requires: self.requires.clone(),
                },
                completed: false,
            },
        }
    }
}

impl ThreatTemplate {
    /// Instantiate as a fortress or villain card.
    #[must_use]
    pub fn instantiate(&self, uid: CardUid, kind: CardKind) -> Card {
        Card {
            uid,
            template: self.id.clone(),
            name: self.name.clone(),
            slots: self.slots,
            vermin: self.vermin,
            workers: SmallVec::new(),
            affinities: self.affinities.clone(),
            kind,
        }
    }
}

impl HordeTemplate {
    /// Instantiate as a horde card.
    #[must_use]
    pub fn instantiate(&self) -> HordeCard {
        HordeCard {
            template: self.id.clone(),
            name: self.name.clone(),
            effect: self.effect,
        }
    }
}

/// Full content set a match is built from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub champions: Vec<ChampionTemplate>,
    pub heroes: Vec<HeroTemplate>,
    /// Locations shuffled into the adventure deck.
    pub row_locations: Vec<LocationTemplate>,
    /// Shared quests shuffled into the adventure deck.
    pub quests: Vec<QuestTemplate>,
    pub fortresses: Vec<ThreatTemplate>,
    pub villains: Vec<ThreatTemplate>,
    pub hordes: Vec<HordeTemplate>,
    /// Pre-discovered base locations, by template ID.
    pub base_locations: FxHashMap<TemplateId, LocationTemplate>,
    /// Base locations revealed at setup, in discovery order.
    pub starting_discovered: Vec<TemplateId>,
    /// Where every champion begins the match.
    pub starting_location: TemplateId,
}

impl Catalog {
    /// The standard content set.
    #[must_use]
    pub fn standard() -> Self {
        let champions = vec![
            ChampionTemplate {
                id: "rowan".into(),
                name: "Rowan of the Gate".into(),
                slots: 5,
                affinities: vec![Affinity::Mouse, Affinity::Sword],
                bag: vec![
                    CubeCount::new(Cube::Mouse, 2),
                    CubeCount::new(Cube::Squirrel, 1),
                    CubeCount::new(Cube::Food, 1),
                    CubeCount::new(Cube::Inexperience, 3),
                ],
                quests: vec![
                    QuestTemplate {
                        id: "quest-rowan-1".into(),
                        name: "Rowan: Muster the Watch".into(),
                        owner: Some("rowan".into()),
                        target: 2,
                        requires: vec![Cube::Mouse, Cube::Squirrel],
                    },
                    QuestTemplate {
                        id: "quest-rowan-2".into(),
                        name: "Rowan: Hold the Gate".into(),
                        owner: Some("rowan".into()),
                        target: 3,
                        requires: Vec::new(),
                    },
                    QuestTemplate {
                        id: "quest-rowan-3".into(),
                        name: "Rowan: March at Dawn".into(),
                        owner: Some("rowan".into()),
                        target: 4,
                        requires: Vec::new(),
                    },
                ],
            },
            ChampionTemplate {
                id: "tansy".into(),
                name: "Tansy Swiftfoot".into(),
                slots: 5,
                affinities: vec![Affinity::Hare, Affinity::Otter],
                bag: vec![
                    CubeCount::new(Cube::Hare, 2),
                    CubeCount::new(Cube::Otter, 1),
                    CubeCount::new(Cube::Food, 1),
                    CubeCount::new(Cube::Inexperience, 3),
                ],
                quests: vec![
                    QuestTemplate {
                        id: "quest-tansy-1".into(),
                        name: "Tansy: Run the Rivers".into(),
                        owner: Some("tansy".into()),
                        target: 3,
                        requires: vec![Cube::Hare, Cube::Otter],
                    },
                    QuestTemplate {
                        id: "quest-tansy-2".into(),
                        name: "Tansy: Carry the Word".into(),
                        owner: Some("tansy".into()),
                        target: 2,
                        requires: Vec::new(),
                    },
                    QuestTemplate {
                        id: "quest-tansy-3".into(),
                        name: "Tansy: Outpace the Horde".into(),
                        owner: Some("tansy".into()),
                        target: 4,
                        requires: Vec::new(),
                    },
                ],
            },
            ChampionTemplate {
                id: "bracken".into(),
                name: "Bracken Deeproot".into(),
                slots: 5,
                affinities: vec![Affinity::Squirrel, Affinity::Mole],
                bag: vec![
                    CubeCount::new(Cube::Squirrel, 2),
                    CubeCount::new(Cube::Mole, 1),
                    CubeCount::new(Cube::Food, 1),
                    CubeCount::new(Cube::Inexperience, 3),
                ],
                quests: vec![
                    QuestTemplate {
                        id: "quest-bracken-1".into(),
                        name: "Bracken: Shore the Tunnels".into(),
                        owner: Some("bracken".into()),
                        target: 2,
                        requires: vec![Cube::Squirrel, Cube::Mole],
                    },
                    QuestTemplate {
                        id: "quest-bracken-2".into(),
                        name: "Bracken: Raise the Larder".into(),
                        owner: Some("bracken".into()),
                        target: 3,
                        requires: Vec::new(),
                    },
                    QuestTemplate {
                        id: "quest-bracken-3".into(),
                        name: "Bracken: Deep Roots".into(),
                        owner: Some("bracken".into()),
                        target: 4,
                        requires: Vec::new(),
                    },
                ],
            },
        ];

        let heroes = vec![
            HeroTemplate {
                id: "gate-sentry".into(),
                name: "Gate Sentry".into(),
                slots: 2,
                cost: 2,
                affinities: vec![Affinity::Mouse],
                critters: vec![CubeCount::new(Cube::Mouse, 2)],
                ability: None,
            },
            HeroTemplate {
                id: "canopy-scout".into(),
                name: "Canopy Scout".into(),
                slots: 3,
                cost: 3,
                affinities: vec![Affinity::Squirrel],
                critters: vec![
                    CubeCount::new(Cube::Squirrel, 2),
                    CubeCount::new(Cube::Mouse, 1),
                ],
                ability: None,
            },
            HeroTemplate {
                id: "firemount-veteran".into(),
                name: "Firemount Veteran".into(),
                slots: 3,
                cost: 4,
                affinities: vec![Affinity::Badger, Affinity::Hare],
                critters: vec![
                    CubeCount::new(Cube::Hare, 2),
                    CubeCount::new(Cube::Badger, 1),
                ],
                ability: None,
            },
            HeroTemplate {
                id: "acorn-keeper".into(),
                name: "Acorn Keeper".into(),
                slots: 3,
                cost: 2,
                affinities: vec![Affinity::Squirrel],
                critters: vec![CubeCount::new(Cube::Squirrel, 2)],
                ability: Some(AbilityKey::SquirrelFoodCache),
            },
            HeroTemplate {
                id: "tunnel-warden".into(),
                name: "Tunnel Warden".into(),
                slots: 2,
                cost: 2,
                affinities: vec![Affinity::Mole],
                critters: vec![CubeCount::new(Cube::Mole, 1)],
                ability: Some(AbilityKey::MoleDiscardRecycle),
            },
        ];

        let row_locations = vec![
            LocationTemplate {
                id: "loc-great-hall".into(),
                name: "The Great Hall".into(),
                slots: 3,
                affinities: Vec::new(),
                reward: Some(ActionReward::Provisions(1)),
            },
            LocationTemplate {
                id: "loc-the-cellar".into(),
                name: "The Cellar".into(),
                slots: 2,
                affinities: Vec::new(),
                reward: Some(ActionReward::Provisions(2)),
            },
            LocationTemplate {
                id: "loc-bramble-border".into(),
                name: "Bramble Border".into(),
                slots: 3,
                affinities: vec![Affinity::Mouse],
                reward: Some(ActionReward::Scouts(1)),
            },
            LocationTemplate {
                id: "loc-firemount".into(),
                name: "Firemount Pass".into(),
                slots: 3,
                affinities: vec![Affinity::Badger],
                reward: None,
            },
        ];

        let quests = vec![
            QuestTemplate {
                id: "quest-blade-of-dawn".into(),
                name: "The Blade of Dawn".into(),
                owner: None,
                target: 3,
                requires: vec![Cube::Badger],
            },
            QuestTemplate {
                id: "quest-restore-the-hall".into(),
                name: "Restore the Hall".into(),
                owner: None,
                target: 2,
                requires: vec![Cube::Food],
            },
        ];

        let fortresses = vec![
            ThreatTemplate {
                id: "fort-siege-engine".into(),
                name: "Siege Engine".into(),
                slots: 4,
                vermin: 4,
                affinities: vec![Affinity::Sword],
            },
            ThreatTemplate {
                id: "fort-marsh-bridge".into(),
                name: "Marsh Bridge Redoubt".into(),
                slots: 3,
                vermin: 3,
                affinities: vec![Affinity::Otter],
            },
        ];

        let villains = vec![
            ThreatTemplate {
                id: "vil-wildcat-queen".into(),
                name: "The Wildcat Queen".into(),
                slots: 5,
                vermin: 5,
                affinities: vec![Affinity::Sword],
            },
            ThreatTemplate {
                id: "vil-rat-king".into(),
                name: "The Rat King".into(),
                slots: 6,
                vermin: 6,
                affinities: vec![Affinity::Sword],
            },
        ];

        let hordes = vec![
            HordeTemplate {
                id: "horde-rat-pack".into(),
                name: "Rat Pack".into(),
                effect: HordeEffect::WorkersPressure,
            },
            HordeTemplate {
                id: "horde-ferret-clan".into(),
                name: "Ferret Clan".into(),
                effect: HordeEffect::CombatPlusOne,
            },
        ];

        let base = vec![
            LocationTemplate {
                id: "infirmary".into(),
                name: "The Infirmary".into(),
                slots: 3,
                affinities: Vec::new(),
                reward: Some(ActionReward::Heal),
            },
            LocationTemplate {
                id: "great-hall".into(),
                name: "Great Hall".into(),
                slots: 3,
                affinities: Vec::new(),
                reward: Some(ActionReward::Provisions(1)),
            },
            LocationTemplate {
                id: "cellar".into(),
                name: "Cellar Stores".into(),
                slots: 2,
                affinities: Vec::new(),
                reward: Some(ActionReward::Provisions(2)),
            },
        ];
        let starting_discovered: Vec<TemplateId> =
            base.iter().map(|loc| loc.id.clone()).collect();
        let base_locations: FxHashMap<TemplateId, LocationTemplate> =
            base.into_iter().map(|loc| (loc.id.clone(), loc)).collect();

        Self {
            champions,
            heroes,
            row_locations,
            quests,
            fortresses,
            villains,
            hordes,
            base_locations,
            starting_discovered,
            starting_location: "great-hall".into(),
        }
    }

    /// Champion template by ID.
    #[must_use]
    pub fn champion(&self, id: &TemplateId) -> Option<&ChampionTemplate> {
        self.champions.iter().find(|c| c.id == *id)
    }

    /// Quest template by ID, searching shared quests and every champion's
    /// personal quests.
    #[must_use]
    pub fn quest(&self, id: &TemplateId) -> Option<&QuestTemplate> {
        self.quests
            .iter()
            .chain(self.champions.iter().flat_map(|c| c.quests.iter()))
            .find(|q| q.id == *id)
    }
}
