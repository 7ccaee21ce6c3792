//! Match setup: instantiate a [`Catalog`](crate::content::Catalog) into a
//! fresh [`GameState`].
//!
//! Setup is the only place card UIDs are minted. Decks are stored with the
//! top at the `Vec` end, so revealing and refilling are both `pop`.

use std::collections::VecDeque;

use smallvec::SmallVec;
use thiserror::Error;

use crate::cards::{Card, CardKind, CardUid, TemplateId};
use crate::content::{Catalog, ChampionTemplate};
use crate::core::player::{Hero, Player, PlayerId, PlayerMap, QuestStatus};
use crate::core::rng::{shuffle, RandomSource};
use crate::core::state::{ActiveStage, GameState};

/// Setup failure.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SetupError {
    /// The catalog has no champions to seat.
    #[error("catalog has no champions")]
    EmptyCatalog,
    /// A match needs at least one player.
    #[error("player count must be at least 1, got {0}")]
    NoPlayers(usize),
}

struct UidMinter(u32);

impl UidMinter {
    fn next(&mut self) -> CardUid {
        self.0 += 1;
        CardUid::new(self.0)
    }
}

/// Build a fresh match for `player_count` seats.
///
/// Champions are dealt from a shuffled pool, cycling when there are more
/// seats than champions. Conquest starts at the player count.
pub fn new_match<R>(
    catalog: &Catalog,
    player_count: usize,
    rng: &mut R,
) -> Result<GameState, SetupError>
where
    R: RandomSource + ?Sized,
{
    if catalog.champions.is_empty() {
        return Err(SetupError::EmptyCatalog);
    }
    if player_count == 0 {
        return Err(SetupError::NoPlayers(player_count));
    }

    let mut uids = UidMinter(0);

    // Pre-discovered base locations, in catalog discovery order.
    let discovered: Vec<Card> = catalog
        .starting_discovered
        .iter()
        .filter_map(|id| catalog.base_locations.get(id))
        .map(|template| template.instantiate(uids.next()))
        .collect();

    let mut fortress_deck: Vec<Card> = catalog
        .fortresses
        .iter()
        .map(|t| t.instantiate(uids.next(), CardKind::Fortress))
        .collect();
    shuffle(rng, &mut fortress_deck);
    let revealed_fortress = fortress_deck.pop();

    let mut villain_deck: Vec<Card> = catalog
        .villains
        .iter()
        .map(|t| t.instantiate(uids.next(), CardKind::Villain))
        .collect();
    shuffle(rng, &mut villain_deck);
    let revealed_villain = villain_deck.pop();

    let mut horde_deck: Vec<_> = catalog.hordes.iter().map(|t| t.instantiate()).collect();
    shuffle(rng, &mut horde_deck);
    let horde_card = horde_deck.pop();

    // Seat players, cycling through the shuffled champion pool.
    let mut pool: Vec<&ChampionTemplate> = catalog.champions.iter().collect();
    shuffle(rng, &mut pool);
    let players = PlayerMap::new(player_count, |seat| {
        let template = pool[seat.index() % pool.len()];
        seat_player(seat, template, catalog.starting_location.clone())
    });

    // Adventure deck: heroes, row locations, shared quests, and the seated
    // champions' personal quests.
    let mut adventure_deck: Vec<Card> = Vec::new();
    for hero in &catalog.heroes {
        adventure_deck.push(hero.instantiate(uids.next()));
    }
    for location in &catalog.row_locations {
        adventure_deck.push(location.instantiate(uids.next()));
    }
    for quest in &catalog.quests {
        adventure_deck.push(quest.instantiate(uids.next()));
    }
    for (_, player) in players.iter() {
        let Some(champion) = catalog.champion(&player.champion) else {
            continue;
        };
        for quest in &champion.quests {
            adventure_deck.push(quest.instantiate(uids.next()));
        }
    }
    shuffle(rng, &mut adventure_deck);

    let mut state = GameState {
        day: 1,
        conquest: player_count as u32,
        adventure_deck,
        adventure_row: Vec::new(),
        discovered,
        fortress_deck,
        revealed_fortress,
        villain_deck,
        revealed_villain,
        horde_deck,
        horde_card,
        discard: Vec::new(),
        players,
        turn_state: None,
        fortress_cleared: false,
        villain_cleared: false,
        active_seat: PlayerId::new(0),
        active_stage: ActiveStage::DayAction,
        turns_in_phase: 0,
        log: VecDeque::new(),
    };
    state.refill_adventure_row();
    state.push_log("Day 1 begins.");
    Ok(state)
}

fn seat_player(seat: PlayerId, template: &ChampionTemplate, start: TemplateId) -> Player {
    let mut bag = Vec::new();
    for entry in &template.bag {
        for _ in 0..entry.count {
            bag.push(entry.cube);
        }
    }

    let champion = Hero {
        template: template.id.clone(),
        name: template.name.clone(),
        slots: template.slots,
        cubes: SmallVec::new(),
        is_champion: true,
        affinities: template.affinities.clone(),
        ability: None,
    };

    let quests = template
        .quests
        .iter()
        .map(|quest| QuestStatus {
            quest: quest.id.clone(),
            complete: false,
        })
        .collect();

    Player {
        seat,
        champion: template.id.clone(),
        name: template.name.clone(),
        bag,
        tableau: vec![champion],
        quests,
        pending_cubes: Vec::new(),
        drawn_this_turn: Vec::new(),
        location: start,
        did_bust: false,
        must_visit_infirmary: false,
        exhaustion: false,
        combat: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cube::Cube;
    use crate::core::rng::{FixedRandom, GameRng};
    use crate::core::state::ADVENTURE_ROW_SIZE;

    #[test]
    fn test_setup_seats_and_world() {
        let mut rng = FixedRandom::new();
        let s = new_match(&Catalog::standard(), 2, &mut rng).unwrap();

        assert_eq!(s.day, 1);
        assert_eq!(s.conquest, 2);
        assert_eq!(s.players.player_count(), 2);
        assert_eq!(s.adventure_row.len(), ADVENTURE_ROW_SIZE);
        assert_eq!(s.discovered.len(), 3);
        assert!(s.revealed_fortress.is_some());
        assert!(s.revealed_villain.is_some());
        assert!(s.horde_card.is_some());
        assert_eq!(s.log[0], "Day 1 begins.");
    }

    #[test]
    fn test_champions_cycle_across_seats() {
        let mut rng = FixedRandom::new();
        let catalog = Catalog::standard();
        let s = new_match(&catalog, 4, &mut rng).unwrap();

        let first = &s.players[PlayerId::new(0)];
        let wrapped = &s.players[PlayerId::new(3)];
        assert_eq!(first.champion, wrapped.champion);
        assert_eq!(s.conquest, 4);
    }

    #[test]
    fn test_champion_pool_is_shuffled() {
        let catalog = Catalog::standard();
        let mut seen = std::collections::BTreeSet::new();
        for seed in 0..64 {
            let mut rng = GameRng::new(seed);
            let s = new_match(&catalog, 1, &mut rng).unwrap();
            seen.insert(s.players[PlayerId::new(0)].champion.clone());
        }
        assert!(seen.len() > 1);
    }

    #[test]
    fn test_starting_bag_expands_template() {
        let mut rng = FixedRandom::new();
        let catalog = Catalog::standard();
        let s = new_match(&catalog, 1, &mut rng).unwrap();

        let player = &s.players[PlayerId::new(0)];
        assert_eq!(player.bag.len(), 7);
        assert_eq!(
            player.bag.iter().filter(|c| **c == Cube::Inexperience).count(),
            3
        );
        assert!(player.tableau[0].is_champion);
        assert!(player.tableau[0].cubes.is_empty());
        assert_eq!(player.quests.len(), 3);
        assert!(player.quests.iter().all(|q| !q.complete));
    }

    #[test]
    fn test_deck_holds_seated_personal_quests_only() {
        let mut rng = FixedRandom::new();
        let catalog = Catalog::standard();
        let s = new_match(&catalog, 1, &mut rng).unwrap();

        let champion = &s.players[PlayerId::new(0)].champion;
        let all_cards: Vec<&Card> =
            s.adventure_deck.iter().chain(s.adventure_row.iter()).collect();

        let owners: Vec<&TemplateId> = all_cards
            .iter()
            .filter_map(|card| match &card.kind {
                CardKind::Quest {
                    owner: Some(owner), ..
                } => Some(owner),
                _ => None,
            })
            .collect();
        assert_eq!(owners.len(), 3);
        assert!(owners.iter().all(|owner| *owner == champion));
    }

    #[test]
    fn test_card_uids_are_unique() {
        let mut rng = FixedRandom::new();
        let s = new_match(&Catalog::standard(), 3, &mut rng).unwrap();

        let mut uids: Vec<u32> = s
            .adventure_deck
            .iter()
            .chain(s.adventure_row.iter())
            .chain(s.discovered.iter())
            .chain(s.fortress_deck.iter())
            .chain(s.revealed_fortress.iter())
            .chain(s.villain_deck.iter())
            .chain(s.revealed_villain.iter())
            .map(|card| card.uid.raw())
            .collect();
        let total = uids.len();
        uids.sort_unstable();
        uids.dedup();
        assert_eq!(uids.len(), total);
    }

    #[test]
    fn test_setup_rejects_degenerate_inputs() {
        let mut rng = FixedRandom::new();
        let mut empty = Catalog::standard();
        empty.champions.clear();
        assert_eq!(
            new_match(&empty, 2, &mut rng),
            Err(SetupError::EmptyCatalog)
        );

        assert_eq!(
            new_match(&Catalog::standard(), 0, &mut rng),
            Err(SetupError::NoPlayers(0))
        );
    }
}
