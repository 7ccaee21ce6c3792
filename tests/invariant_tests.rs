//! Structural invariants checked across randomized matches.

use proptest::prelude::*;

use briarhold::core::rng::FixedRandom;
use briarhold::core::state::{ActionMode, ActiveStage};
use briarhold::core::Cube;
use briarhold::{Catalog, Game, PlayerId, MAX_CONQUEST};

fn allied_cube() -> impl Strategy<Value = Cube> {
    prop::sample::select(vec![
        Cube::Mouse,
        Cube::Hare,
        Cube::Badger,
        Cube::Squirrel,
        Cube::Mole,
        Cube::Otter,
        Cube::Food,
        Cube::Mastery,
    ])
}

fn pending_cube() -> impl Strategy<Value = Cube> {
    prop::sample::select(vec![
        Cube::Mouse,
        Cube::Food,
        Cube::Inexperience,
        Cube::Wound,
        Cube::Mastery,
    ])
}

proptest! {
    #[test]
    fn setup_is_well_formed(seed in any::<u64>(), players in 1usize..=4) {
        let game = Game::new(&Catalog::standard(), players, seed).unwrap();

        prop_assert_eq!(game.state.adventure_row.len(), 5);
        prop_assert_eq!(game.state.conquest, players as u32);
        prop_assert!(game.state.conquest < MAX_CONQUEST);
        prop_assert!(game.state.revealed_fortress.is_some());
        prop_assert!(game.state.revealed_villain.is_some());

        let mut uids: Vec<u32> = game
            .state
            .adventure_deck
            .iter()
            .chain(game.state.adventure_row.iter())
            .chain(game.state.discovered.iter())
            .map(|card| card.uid.raw())
            .collect();
        let total = uids.len();
        uids.sort_unstable();
        uids.dedup();
        prop_assert_eq!(uids.len(), total);

        for (_, player) in game.state.players.iter() {
            prop_assert_eq!(player.bag.len(), 7);
            prop_assert!(player.tableau[0].is_champion);
        }
    }

    /// A concluded combat never leaves provisional vermin behind, and the
    /// seat's own allied cubes are conserved across the whole action.
    #[test]
    fn combat_cleans_up_provisional_vermin(
        seed in any::<u64>(),
        bag in prop::collection::vec(allied_cube(), 8),
        threat in 1usize..=4,
    ) {
        let mut game = Game::new(&Catalog::standard(), 1, seed).unwrap();
        let seat = PlayerId::new(0);
        game.state.horde_card = None;
        game.state.adventure_row[0].vermin = threat;
        let target = game.state.adventure_row[0].uid;
        game.state.players[seat].bag = bag;

        game.choose_action(seat, target, ActionMode::Combat).unwrap();
        let min_draw = game.state.turn_state.as_ref().unwrap().min_draw;
        for _ in 0..min_draw {
            if game.state.turn_state.as_ref().unwrap().resolved {
                break;
            }
            game.draw_cube(seat).unwrap();
        }
        if !game.state.turn_state.as_ref().unwrap().resolved {
            game.stop_drawing(seat).unwrap();
        }

        let player = &game.state.players[seat];
        prop_assert!(!player.bag.contains(&Cube::Vermin));
        prop_assert!(!player.pending_cubes.contains(&Cube::Vermin));

        let allied = player
            .bag
            .iter()
            .chain(player.pending_cubes.iter())
            .chain(player.tableau.iter().flat_map(|hero| hero.cubes.iter()))
            .filter(|cube| **cube != Cube::Vermin)
            .count();
        prop_assert_eq!(allied, 8);
    }

    /// Forced dusk placement never overfills a hero or a location, no
    /// matter what is left pending.
    #[test]
    fn forced_placement_respects_capacity(
        preloaded in 0usize..=5,
        pending in prop::collection::vec(pending_cube(), 0..=6),
    ) {
        let mut game =
            Game::with_rng(&Catalog::standard(), 2, FixedRandom::new()).unwrap();
        let seat = PlayerId::new(0);
        {
            let player = &mut game.state.players[seat];
            let slots = player.tableau[0].slots;
            player.tableau[0]
                .cubes
                .extend(std::iter::repeat(Cube::Mouse).take(preloaded.min(slots)));
            player.pending_cubes = pending;
        }
        game.state.active_stage = ActiveStage::DuskAssign;

        game.finish_dusk(seat).unwrap();

        for (_, player) in game.state.players.iter() {
            for hero in &player.tableau {
                prop_assert!(hero.cubes.len() <= hero.slots);
            }
        }
        for location in &game.state.discovered {
            prop_assert!(location.workers.len() + location.vermin <= location.slots);
        }
        prop_assert!(game.state.players[seat].pending_cubes.is_empty());
    }

    /// The conquest track stays clamped whatever the night throws at it.
    #[test]
    fn conquest_never_escapes_its_track(deltas in prop::collection::vec(-3i32..=3, 0..32)) {
        let mut game =
            Game::with_rng(&Catalog::standard(), 2, FixedRandom::new()).unwrap();
        for delta in deltas {
            game.state.adjust_conquest(delta);
            prop_assert!(game.state.conquest <= MAX_CONQUEST);
        }
    }
}
