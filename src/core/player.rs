//! Player identification and per-seat state.
//!
//! ## PlayerId
//!
//! Type-safe seat identifier; seating order is index order.
//!
//! ## PlayerMap
//!
//! Per-seat data storage backed by `Vec` for O(1) access, indexable by
//! `PlayerId`.
//!
//! ## Player
//!
//! The full per-seat game state: the bag, the hero tableau, the personal
//! quest track, and the per-turn draw bookkeeping.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::ops::{Index, IndexMut};

use crate::abilities::AbilityKey;
use crate::cards::{CardUid, TemplateId};
use crate::core::cube::{Affinity, Cube};

/// Seat identifier. Seats are 0-based in seating order.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct PlayerId(pub u8);

impl PlayerId {
    /// Create a new seat ID.
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    /// Get the raw seat index (0-based).
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Iterate over all seats for a match with `player_count` players.
    pub fn all(player_count: usize) -> impl Iterator<Item = PlayerId> {
        (0..player_count as u8).map(PlayerId)
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Seat {}", self.0)
    }
}

/// Per-seat data storage with O(1) access.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerMap<T> {
    data: Vec<T>,
}

impl<T> PlayerMap<T> {
    /// Create a new map with values from a factory function.
    pub fn new(player_count: usize, factory: impl FnMut(PlayerId) -> T) -> Self {
        assert!(player_count > 0, "Must have at least 1 player");
        assert!(player_count <= 255, "At most 255 players supported");

        let mut factory = factory;
        let data = (0..player_count as u8)
            .map(|i| factory(PlayerId(i)))
            .collect();

        Self { data }
    }

    /// Get the number of seats.
    #[must_use]
    pub fn player_count(&self) -> usize {
        self.data.len()
    }

    /// Get a reference to a seat's data.
    #[must_use]
    pub fn get(&self, player: PlayerId) -> &T {
        &self.data[player.index()]
    }

    /// Get a mutable reference to a seat's data.
    pub fn get_mut(&mut self, player: PlayerId) -> &mut T {
        &mut self.data[player.index()]
    }

    /// Iterate over `(PlayerId, &T)` pairs in seating order.
    pub fn iter(&self) -> impl Iterator<Item = (PlayerId, &T)> {
        self.data
            .iter()
            .enumerate()
            .map(|(i, v)| (PlayerId(i as u8), v))
    }

    /// Iterate over `(PlayerId, &mut T)` pairs in seating order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (PlayerId, &mut T)> {
        self.data
            .iter_mut()
            .enumerate()
            .map(|(i, v)| (PlayerId(i as u8), v))
    }

    /// Iterate over all seat IDs.
    pub fn player_ids(&self) -> impl Iterator<Item = PlayerId> {
        (0..self.data.len() as u8).map(PlayerId)
    }
}

impl<T> Index<PlayerId> for PlayerMap<T> {
    type Output = T;

    fn index(&self, player: PlayerId) -> &Self::Output {
        self.get(player)
    }
}

impl<T> IndexMut<PlayerId> for PlayerMap<T> {
    fn index_mut(&mut self, player: PlayerId) -> &mut Self::Output {
        self.get_mut(player)
    }
}

/// A hero in a player's tableau. Index 0 is always the permanent champion.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hero {
    pub template: TemplateId,
    pub name: String,
    /// Cube slot capacity.
    pub slots: usize,
    /// Cubes currently committed to this hero, earliest-filled first.
    pub cubes: SmallVec<[Cube; 6]>,
    pub is_champion: bool,
    pub affinities: Vec<Affinity>,
    pub ability: Option<AbilityKey>,
}

impl Hero {
    /// Spare slot capacity remaining.
    #[must_use]
    pub fn has_capacity(&self) -> bool {
        self.cubes.len() < self.slots
    }

    /// Place a cube if capacity allows.
    pub fn place(&mut self, cube: Cube) -> bool {
        if !self.has_capacity() {
            return false;
        }
        self.cubes.push(cube);
        true
    }
}

/// Completion state of one personal quest.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestStatus {
    pub quest: TemplateId,
    /// Monotonic: once true, never reverts.
    pub complete: bool,
}

/// Provisional combat bookkeeping for the current action.
///
/// Created at combat targeting when the target's threat load is moved into
/// the bag as drawable vermin; discarded when the action resolves.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatContext {
    pub target: CardUid,
    /// The target's original threat load: the number of vermin provisionally
    /// added to the bag, the win threshold, and the restore-on-loss amount.
    pub threat: usize,
}

/// The full per-seat state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub seat: PlayerId,
    /// Champion template this seat plays.
    pub champion: TemplateId,
    pub name: String,
    /// Private pool of undrawn tokens. Order carries no meaning; draws are
    /// uniform without replacement.
    pub bag: Vec<Cube>,
    /// Champion at index 0, recruits after.
    pub tableau: Vec<Hero>,
    /// Personal quest track.
    pub quests: Vec<QuestStatus>,
    /// Cubes drawn this turn and not yet committed to a slot.
    pub pending_cubes: Vec<Cube>,
    /// Raw draw log for the current action (includes vermin).
    pub drawn_this_turn: Vec<Cube>,
    /// Current physical location (template id).
    pub location: TemplateId,
    pub did_bust: bool,
    pub must_visit_infirmary: bool,
    pub exhaustion: bool,
    pub combat: Option<CombatContext>,
}

impl Player {
    /// The permanent champion hero.
    #[must_use]
    pub fn champion_hero(&self) -> &Hero {
        &self.tableau[0]
    }

    /// Mutable access to the champion hero.
    pub fn champion_hero_mut(&mut self) -> &mut Hero {
        &mut self.tableau[0]
    }

    /// Promote one inexperience cube to mastery, searching the bag, then
    /// tableau heroes in order, then pending cubes. Returns whether a
    /// promotion happened.
    pub fn promote_inexperience(&mut self) -> bool {
        if replace_cube(&mut self.bag, Cube::Inexperience, Cube::Mastery) {
            return true;
        }
        for hero in &mut self.tableau {
            if replace_cube(&mut hero.cubes, Cube::Inexperience, Cube::Mastery) {
                return true;
            }
        }
        replace_cube(&mut self.pending_cubes, Cube::Inexperience, Cube::Mastery)
    }

    /// One affinity point per (hero tag, card tag) match across the tableau.
    #[must_use]
    pub fn affinity_bonus(&self, card_affinities: &[Affinity]) -> usize {
        self.tableau
            .iter()
            .flat_map(|hero| hero.affinities.iter())
            .filter(|tag| card_affinities.contains(tag))
            .count()
    }

    /// Total cubes this seat owns across bag, pending, and tableau.
    /// Used by the bag-conservation checks.
    #[must_use]
    pub fn cube_total(&self) -> usize {
        self.bag.len()
            + self.pending_cubes.len()
            + self.tableau.iter().map(|h| h.cubes.len()).sum::<usize>()
    }

    /// Remove up to `amount` cubes of `kind` from the bag, scanning from the
    /// end. Returns the number removed.
    pub fn remove_from_bag(&mut self, kind: Cube, amount: usize) -> usize {
        let mut remaining = amount;
        let mut i = self.bag.len();
        while i > 0 && remaining > 0 {
            i -= 1;
            if self.bag[i] == kind {
                self.bag.remove(i);
                remaining -= 1;
            }
        }
        amount - remaining
    }
}

fn replace_cube(slice: &mut [Cube], from: Cube, to: Cube) -> bool {
    if let Some(slot) = slice.iter_mut().find(|c| **c == from) {
        *slot = to;
        true
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hero(slots: usize) -> Hero {
        Hero {
            template: TemplateId::new("test-hero"),
            name: "Test Hero".into(),
            slots,
            cubes: SmallVec::new(),
            is_champion: false,
            affinities: vec![Affinity::Mouse],
            ability: None,
        }
    }

    fn player() -> Player {
        let mut champion = hero(5);
        champion.is_champion = true;
        Player {
            seat: PlayerId::new(0),
            champion: TemplateId::new("test-champion"),
            name: "Test".into(),
            bag: Vec::new(),
            tableau: vec![champion],
            quests: Vec::new(),
            pending_cubes: Vec::new(),
            drawn_this_turn: Vec::new(),
            location: TemplateId::new("great-hall"),
            did_bust: false,
            must_visit_infirmary: false,
            exhaustion: false,
            combat: None,
        }
    }

    #[test]
    fn test_player_id_basics() {
        assert_eq!(PlayerId::new(2).index(), 2);
        assert_eq!(format!("{}", PlayerId::new(0)), "Seat 0");
        assert_eq!(PlayerId::all(3).count(), 3);
    }

    #[test]
    fn test_player_map_index() {
        let mut map: PlayerMap<i32> = PlayerMap::new(3, |p| p.index() as i32);
        assert_eq!(map[PlayerId::new(2)], 2);
        map[PlayerId::new(1)] = 10;
        assert_eq!(map[PlayerId::new(1)], 10);
        assert_eq!(map.player_count(), 3);
    }

    #[test]
    #[should_panic(expected = "Must have at least 1 player")]
    fn test_player_map_zero_players() {
        let _: PlayerMap<i32> = PlayerMap::new(0, |_| 0);
    }

    #[test]
    fn test_hero_capacity() {
        let mut h = hero(2);
        assert!(h.place(Cube::Mouse));
        assert!(h.place(Cube::Food));
        assert!(!h.place(Cube::Otter));
        assert_eq!(h.cubes.len(), 2);
    }

    #[test]
    fn test_promote_searches_bag_first() {
        let mut p = player();
        p.bag = vec![Cube::Inexperience];
        p.tableau[0].cubes.push(Cube::Inexperience);
        p.pending_cubes.push(Cube::Inexperience);

        assert!(p.promote_inexperience());

        assert_eq!(p.bag, vec![Cube::Mastery]);
        assert_eq!(p.tableau[0].cubes[0], Cube::Inexperience);
        assert_eq!(p.pending_cubes[0], Cube::Inexperience);
    }

    #[test]
    fn test_promote_falls_through_to_pending() {
        let mut p = player();
        p.pending_cubes.push(Cube::Inexperience);

        assert!(p.promote_inexperience());
        assert_eq!(p.pending_cubes, vec![Cube::Mastery]);

        assert!(!p.promote_inexperience());
    }

    #[test]
    fn test_affinity_bonus_counts_pairs() {
        let mut p = player();
        p.tableau[0].affinities = vec![Affinity::Mouse, Affinity::Sword];
        p.tableau.push(hero(2)); // carries Mouse

        assert_eq!(p.affinity_bonus(&[Affinity::Mouse]), 2);
        assert_eq!(p.affinity_bonus(&[Affinity::Mouse, Affinity::Sword]), 3);
        assert_eq!(p.affinity_bonus(&[Affinity::Badger]), 0);
    }

    #[test]
    fn test_remove_from_bag() {
        let mut p = player();
        p.bag = vec![Cube::Vermin, Cube::Food, Cube::Vermin, Cube::Vermin];

        assert_eq!(p.remove_from_bag(Cube::Vermin, 2), 2);
        assert_eq!(p.bag, vec![Cube::Vermin, Cube::Food]);

        assert_eq!(p.remove_from_bag(Cube::Vermin, 5), 1);
        assert_eq!(p.bag, vec![Cube::Food]);
    }
}
