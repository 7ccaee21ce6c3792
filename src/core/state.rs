//! Shared match state.
//!
//! [`GameState`] is the complete serializable snapshot of one match: the
//! world (decks, row, discovered map, threat stacks), every seat's
//! [`Player`], the in-flight [`ActionContext`] if an action is unresolved,
//! and the match clock. Engine commands in [`crate::engine`] mutate it; this
//! module only holds the data and its pure queries.

use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};

use crate::cards::{ActionReward, Card, CardUid, HordeCard, HordeEffect, TemplateId};
use crate::core::cube::Cube;
use crate::core::player::{Player, PlayerId, PlayerMap};

/// Number of face-up cards kept in the adventure row.
pub const ADVENTURE_ROW_SIZE: usize = 5;

/// Conquest value at which the defenders lose.
pub const MAX_CONQUEST: u32 = 10;

/// What a given seat is allowed to do right now.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    /// Active seat, no action chosen yet (or one in flight).
    DayAction,
    /// Active seat, committing pending cubes.
    DuskAssign,
    /// Non-active seat: may only assist draws.
    Assist,
}

/// Phase of the active seat's turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActiveStage {
    DayAction,
    DuskAssign,
}

/// How the current action target resolves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionMode {
    /// Work a threat-free location for its reward.
    Action,
    /// Clear a vermin-laden card, fortress, or villain.
    Combat,
    /// Recruit a hero from the adventure row.
    Recruit,
}

/// Terminal result of a match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameResult {
    Won,
    Lost,
}

/// Helper-draw bookkeeping for the action in flight.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelperState {
    /// Set once the active seat's own draws reach the unlock threshold.
    pub allowed: bool,
    /// Cubes each helper has drawn from their own bag, in seat order.
    pub draws: BTreeMap<PlayerId, Vec<Cube>>,
}

impl HelperState {
    /// All helper cubes flattened in ascending seat order.
    #[must_use]
    pub fn all_cubes(&self) -> Vec<Cube> {
        self.draws.values().flatten().copied().collect()
    }
}

/// The action the active seat has targeted but not yet resolved.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionContext {
    pub seat: PlayerId,
    pub target: CardUid,
    pub mode: ActionMode,
    /// Minimum own-bag draws before the action may conclude (combat only;
    /// zero otherwise).
    pub min_draw: usize,
    pub resolved: bool,
    pub busted: bool,
    pub helpers: HelperState,
}

/// Complete state of one match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    /// Day counter, starting at 1.
    pub day: u32,
    /// Enemy progress track, clamped to `0..=MAX_CONQUEST`.
    pub conquest: u32,

    /// Face-down adventure deck.
    pub adventure_deck: Vec<Card>,
    /// Face-up adventure row.
    pub adventure_row: Vec<Card>,
    /// Discovered locations, in discovery order.
    pub discovered: Vec<Card>,

    /// Remaining fortress stack (beneath the revealed one).
    pub fortress_deck: Vec<Card>,
    pub revealed_fortress: Option<Card>,
    /// Remaining villain stack (beneath the revealed one).
    pub villain_deck: Vec<Card>,
    pub revealed_villain: Option<Card>,

    /// Remaining horde stack (beneath the revealed one).
    pub horde_deck: Vec<HordeCard>,
    pub horde_card: Option<HordeCard>,

    pub discard: Vec<Card>,

    pub players: PlayerMap<Player>,

    /// Unresolved action, if one is in flight.
    pub turn_state: Option<ActionContext>,

    pub fortress_cleared: bool,
    pub villain_cleared: bool,

    pub active_seat: PlayerId,
    pub active_stage: ActiveStage,
    /// Turns taken since the last night, for night scheduling.
    pub turns_in_phase: usize,

    /// Event log, most recent first.
    pub log: VecDeque<String>,
}

impl GameState {
    /// What `seat` may do right now.
    #[must_use]
    pub fn stage_of(&self, seat: PlayerId) -> Stage {
        if seat != self.active_seat {
            return Stage::Assist;
        }
        match self.active_stage {
            ActiveStage::DayAction => Stage::DayAction,
            ActiveStage::DuskAssign => Stage::DuskAssign,
        }
    }

    /// Terminal result, if the match is over.
    ///
    /// The loss check wins ties: a conquest overrun on the same night the
    /// villain falls is still a loss. The villain can only be fought once
    /// the fortress stack is cleared, so `villain_cleared` alone decides
    /// the win.
    #[must_use]
    pub fn result(&self) -> Option<GameResult> {
        if self.conquest >= MAX_CONQUEST {
            return Some(GameResult::Lost);
        }
        if self.villain_cleared {
            return Some(GameResult::Won);
        }
        None
    }

    /// Find a card by UID across the row, discovered map, and the revealed
    /// fortress and villain.
    #[must_use]
    pub fn card(&self, uid: CardUid) -> Option<&Card> {
        self.adventure_row
            .iter()
            .chain(self.discovered.iter())
            .chain(self.revealed_fortress.iter())
            .chain(self.revealed_villain.iter())
            .find(|card| card.uid == uid)
    }

    /// Mutable counterpart of [`Self::card`].
    pub fn card_mut(&mut self, uid: CardUid) -> Option<&mut Card> {
        self.adventure_row
            .iter_mut()
            .chain(self.discovered.iter_mut())
            .chain(self.revealed_fortress.iter_mut())
            .chain(self.revealed_villain.iter_mut())
            .find(|card| card.uid == uid)
    }

    /// Discovered location by template.
    #[must_use]
    pub fn discovered_location(&self, template: &TemplateId) -> Option<&Card> {
        self.discovered.iter().find(|card| card.template == *template)
    }

    /// Mutable counterpart of [`Self::discovered_location`].
    pub fn discovered_location_mut(&mut self, template: &TemplateId) -> Option<&mut Card> {
        self.discovered
            .iter_mut()
            .find(|card| card.template == *template)
    }

    /// The discovered infirmary (the healing location), if any.
    #[must_use]
    pub fn infirmary(&self) -> Option<&Card> {
        self.discovered
            .iter()
            .find(|card| card.reward() == Some(ActionReward::Heal))
    }

    /// Top up the adventure row from the deck.
    pub fn refill_adventure_row(&mut self) {
        while self.adventure_row.len() < ADVENTURE_ROW_SIZE {
            match self.adventure_deck.pop() {
                Some(card) => self.adventure_row.push(card),
                None => break,
            }
        }
    }

    /// Move conquest by `delta`, clamped to `0..=MAX_CONQUEST`.
    pub fn adjust_conquest(&mut self, delta: i32) {
        let next = self.conquest as i64 + i64::from(delta);
        self.conquest = next.clamp(0, i64::from(MAX_CONQUEST)) as u32;
    }

    /// Extra combat draws demanded by the active horde card.
    #[must_use]
    pub fn horde_combat_modifier(&self) -> usize {
        match self.horde_card.as_ref().map(|h| h.effect) {
            Some(HordeEffect::CombatPlusOne) => 1,
            _ => 0,
        }
    }

    /// Minimum own-bag draws for a combat against `threat` units.
    #[must_use]
    pub fn combat_min_draw(&self, threat: usize) -> usize {
        (threat + self.horde_combat_modifier()).max(1)
    }

    /// Record a log line (most recent first).
    pub fn push_log(&mut self, line: impl Into<String>) {
        let line = line.into();
        log::debug!("{line}");
        self.log.push_front(line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Catalog;
    use crate::core::rng::FixedRandom;
    use crate::setup;

    fn state() -> GameState {
        let mut rng = FixedRandom::new();
        setup::new_match(&Catalog::standard(), 2, &mut rng).unwrap()
    }

    #[test]
    fn test_stage_of_follows_active_seat() {
        let mut s = state();
        assert_eq!(s.stage_of(PlayerId::new(0)), Stage::DayAction);
        assert_eq!(s.stage_of(PlayerId::new(1)), Stage::Assist);

        s.active_stage = ActiveStage::DuskAssign;
        assert_eq!(s.stage_of(PlayerId::new(0)), Stage::DuskAssign);
        assert_eq!(s.stage_of(PlayerId::new(1)), Stage::Assist);
    }

    #[test]
    fn test_result_loss_beats_win() {
        let mut s = state();
        assert_eq!(s.result(), None);

        s.villain_cleared = true;
        assert_eq!(s.result(), Some(GameResult::Won));

        s.conquest = MAX_CONQUEST;
        assert_eq!(s.result(), Some(GameResult::Lost));
    }

    #[test]
    fn test_conquest_clamps() {
        let mut s = state();
        s.conquest = 1;
        s.adjust_conquest(-5);
        assert_eq!(s.conquest, 0);
        s.adjust_conquest(99);
        assert_eq!(s.conquest, MAX_CONQUEST);
    }

    #[test]
    fn test_card_lookup_covers_all_zones() {
        let s = state();
        let row_uid = s.adventure_row[0].uid;
        assert!(s.card(row_uid).is_some());

        let fort_uid = s.revealed_fortress.as_ref().unwrap().uid;
        assert!(s.card(fort_uid).is_some());

        let villain_uid = s.revealed_villain.as_ref().unwrap().uid;
        assert!(s.card(villain_uid).is_some());

        assert!(s.card(CardUid::new(9999)).is_none());
    }

    #[test]
    fn test_refill_stops_when_deck_empty() {
        let mut s = state();
        s.adventure_row.clear();
        s.adventure_deck.truncate(2);
        s.refill_adventure_row();
        assert_eq!(s.adventure_row.len(), 2);
        assert!(s.adventure_deck.is_empty());
    }

    #[test]
    fn test_combat_min_draw_includes_horde() {
        let mut s = state();
        s.horde_card = Some(HordeCard {
            template: TemplateId::new("horde-test"),
            name: "Test Horde".into(),
            effect: HordeEffect::CombatPlusOne,
        });
        assert_eq!(s.combat_min_draw(0), 1);
        assert_eq!(s.combat_min_draw(3), 4);

        s.horde_card = None;
        assert_eq!(s.combat_min_draw(3), 3);
        assert_eq!(s.combat_min_draw(0), 1);
    }

    #[test]
    fn test_log_is_most_recent_first() {
        let mut s = state();
        s.push_log("first");
        s.push_log("second");
        assert_eq!(s.log[0], "second");
        assert_eq!(s.log[1], "first");
    }
}
