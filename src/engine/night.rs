//! Night resolution: the world advances after every seat has taken a turn.
//!
//! Order matters and is fixed: occupied row cards fall, the row refills,
//! the conquest track spawns vermin round-robin across the board, the horde
//! card strikes, everyone rests, and conquest ticks up one.

use crate::abilities::{fire_hook, HookEvent};
use crate::cards::{CardUid, HordeEffect};
use crate::core::player::PlayerId;
use crate::core::rng::RandomSource;
use crate::core::state::GameState;

/// Resolve the night and roll the clock to the next day.
pub fn resolve<R>(state: &mut GameState, rng: &mut R)
where
    R: RandomSource + ?Sized,
{
    state.turn_state = None;

    discard_occupied_row_cards(state);
    state.refill_adventure_row();

    spawn_vermin(state);
    apply_horde_effect(state);
    rest(state, rng);

    state.adjust_conquest(1);
    state.push_log("Night falls. Vermin advance across the wood.");

    state.day += 1;
    state.push_log(format!("Day {} begins.", state.day));
}

/// Row cards with vermin on them are lost; losing any costs one conquest.
fn discard_occupied_row_cards(state: &mut GameState) {
    let mut removed = Vec::new();
    state.adventure_row.retain(|card| {
        if card.vermin > 0 {
            removed.push(card.clone());
            false
        } else {
            true
        }
    });
    if removed.is_empty() {
        return;
    }
    state.adjust_conquest(1);
    let names: Vec<&str> = removed.iter().map(|card| card.name.as_str()).collect();
    state.push_log(format!("Occupied sites lost: {}", names.join(", ")));
    state.discard.extend(removed);
}

/// One vermin unit per conquest point, dealt round-robin across the row,
/// the discovered map, and the revealed fortress and villain.
fn spawn_vermin(state: &mut GameState) {
    let targets: Vec<CardUid> = state
        .adventure_row
        .iter()
        .chain(state.discovered.iter())
        .chain(state.revealed_fortress.iter())
        .chain(state.revealed_villain.iter())
        .map(|card| card.uid)
        .collect();
    if targets.is_empty() {
        return;
    }
    for i in 0..state.conquest as usize {
        let uid = targets[i % targets.len()];
        if let Some(card) = state.card_mut(uid) {
            card.add_vermin(1);
        }
    }
}

fn apply_horde_effect(state: &mut GameState) {
    let Some(horde) = state.horde_card.clone() else {
        return;
    };
    if horde.effect != HordeEffect::WorkersPressure {
        return;
    }
    // Busiest discovered location; earliest wins ties.
    let Some(target) = state
        .discovered
        .iter()
        .enumerate()
        .max_by(|(ai, a), (bi, b)| {
            (a.workers.len(), std::cmp::Reverse(ai)).cmp(&(b.workers.len(), std::cmp::Reverse(bi)))
        })
        .map(|(_, card)| card.uid)
    else {
        return;
    };
    let Some(card) = state.card_mut(target) else {
        return;
    };
    if card.workers.is_empty() {
        return;
    }
    card.add_vermin(1);
    let name = card.name.clone();
    state.push_log(format!("{} swarms {name}, punishing its workers.", horde.name));
}

/// Every seat returns up to two tableau cubes to its bag, front slots
/// first, champion first. Exhaustion lifts once the champion has room.
fn rest<R>(state: &mut GameState, rng: &mut R)
where
    R: RandomSource + ?Sized,
{
    let seats: Vec<PlayerId> = state.players.player_ids().collect();
    for seat in seats {
        let mut returned = Vec::new();
        while returned.len() < 2 {
            let player = &mut state.players[seat];
            let Some(hero) = player.tableau.iter_mut().find(|hero| !hero.cubes.is_empty())
            else {
                break;
            };
            let cube = hero.cubes.remove(0);
            returned.push(cube);
            fire_hook(state, rng, seat, HookEvent::CubeRemovedFromHero { cube });
        }

        let player = &mut state.players[seat];
        player.bag.extend(returned);
        if player.exhaustion && player.tableau[0].has_capacity() {
            player.exhaustion = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{HordeCard, Worker};
    use crate::content::Catalog;
    use crate::core::cube::Cube;
    use crate::core::rng::FixedRandom;
    use crate::setup;

    fn state() -> GameState {
        let mut rng = FixedRandom::new();
        setup::new_match(&Catalog::standard(), 2, &mut rng).unwrap()
    }

    #[test]
    fn test_occupied_row_cards_are_lost_for_one_conquest() {
        let mut s = state();
        s.horde_card = None;
        s.adventure_row[0].vermin = 1;
        s.adventure_row[1].vermin = 2;
        let lost: Vec<String> = s.adventure_row[..2]
            .iter()
            .map(|c| c.name.clone())
            .collect();
        let conquest = s.conquest;

        let mut rng = FixedRandom::new();
        resolve(&mut s, &mut rng);

        // One for the lost sites, one for nightfall.
        assert_eq!(s.conquest, conquest + 2);
        assert!(s.discard.iter().any(|c| c.name == lost[0]));
        assert!(s.discard.iter().any(|c| c.name == lost[1]));
        assert!(s.log.iter().any(|line| line.starts_with("Occupied sites lost:")));
    }

    #[test]
    fn test_spawn_deals_round_robin_from_the_row() {
        let mut s = state();
        s.horde_card = None;
        s.conquest = 3;

        let mut rng = FixedRandom::new();
        resolve(&mut s, &mut rng);

        assert_eq!(s.adventure_row[0].vermin, 1);
        assert_eq!(s.adventure_row[1].vermin, 1);
        assert_eq!(s.adventure_row[2].vermin, 1);
        assert_eq!(s.adventure_row[3].vermin, 0);
    }

    #[test]
    fn test_night_advances_the_clock() {
        let mut s = state();
        s.horde_card = None;
        s.conquest = 0;

        let mut rng = FixedRandom::new();
        resolve(&mut s, &mut rng);

        assert_eq!(s.day, 2);
        assert_eq!(s.conquest, 1);
        assert_eq!(s.log[0], "Day 2 begins.");
        assert_eq!(s.log[1], "Night falls. Vermin advance across the wood.");
    }

    #[test]
    fn test_workers_pressure_hits_busiest_location() {
        let mut s = state();
        s.conquest = 0;
        s.horde_card = Some(HordeCard {
            template: "horde-rat-pack".into(),
            name: "Rat Pack".into(),
            effect: HordeEffect::WorkersPressure,
        });
        s.discovered[1].workers.push(Worker {
            cube: Cube::Mouse,
            owner: PlayerId::new(0),
        });
        s.discovered[1].workers.push(Worker {
            cube: Cube::Otter,
            owner: PlayerId::new(1),
        });

        let mut rng = FixedRandom::new();
        resolve(&mut s, &mut rng);

        // The horde strike evicts one of the two workers.
        assert!(s.log.iter().any(|line| line.contains("Rat Pack swarms")));
        assert_eq!(s.discovered[1].workers.len(), 1);
    }

    #[test]
    fn test_workers_pressure_skips_empty_locations() {
        let mut s = state();
        s.conquest = 0;
        s.horde_card = Some(HordeCard {
            template: "horde-rat-pack".into(),
            name: "Rat Pack".into(),
            effect: HordeEffect::WorkersPressure,
        });

        let mut rng = FixedRandom::new();
        resolve(&mut s, &mut rng);

        assert!(!s.log.iter().any(|line| line.contains("swarms")));
    }

    #[test]
    fn test_rest_returns_two_cubes_front_first() {
        let mut s = state();
        s.horde_card = None;
        let seat = PlayerId::new(0);
        let player = &mut s.players[seat];
        player.tableau[0]
            .cubes
            .extend([Cube::Mouse, Cube::Food, Cube::Squirrel]);
        let bag_before = player.bag.len();

        let mut rng = FixedRandom::new();
        resolve(&mut s, &mut rng);

        let player = &s.players[seat];
        assert_eq!(player.tableau[0].cubes.as_slice(), &[Cube::Squirrel]);
        assert_eq!(player.bag.len(), bag_before + 2);
        assert!(player.bag.contains(&Cube::Mouse));
        assert!(player.bag.contains(&Cube::Food));
    }

    #[test]
    fn test_rest_lifts_exhaustion_when_champion_has_room() {
        let mut s = state();
        s.horde_card = None;
        let seat = PlayerId::new(0);
        s.players[seat].exhaustion = true;
        s.players[seat].tableau[0].cubes.push(Cube::Wound);

        let mut rng = FixedRandom::new();
        resolve(&mut s, &mut rng);

        assert!(!s.players[seat].exhaustion);
    }
}
