//! Hero abilities and the hook dispatch that fires them.
//!
//! Abilities are identified by [`AbilityKey`] and react to [`HookEvent`]s
//! raised by the engine. Dispatch walks the hook seat's tableau in order, so
//! two heroes with the same ability both fire, champion first.

use serde::{Deserialize, Serialize};

use crate::cards::{CardUid, Worker};
use crate::core::cube::Cube;
use crate::core::player::PlayerId;
use crate::core::rng::{shuffle, RandomSource};
use crate::core::state::GameState;

/// Identifies a scripted hero ability.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AbilityKey {
    /// When this hero's owner clears vermin from a location, cache one food
    /// worker there per squirrel cube on this hero.
    SquirrelFoodCache,
    /// When a mole cube leaves a hero, return the top discard to the
    /// adventure deck and reshuffle it.
    MoleDiscardRecycle,
}

/// An engine event abilities can react to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HookEvent {
    /// A combat win removed the threat load from a discovered location.
    LocationVerminCleared { location: CardUid },
    /// A cube was removed from a tableau hero (rest or exhaustion).
    CubeRemovedFromHero { cube: Cube },
}

/// Fire `event` against every ability in `seat`'s tableau, in tableau order.
pub fn fire_hook<R>(state: &mut GameState, rng: &mut R, seat: PlayerId, event: HookEvent)
where
    R: RandomSource + ?Sized,
{
    let abilities: Vec<(usize, AbilityKey)> = state.players[seat]
        .tableau
        .iter()
        .enumerate()
        .filter_map(|(i, hero)| hero.ability.map(|key| (i, key)))
        .collect();

    for (hero_index, key) in abilities {
        match (key, event) {
            (AbilityKey::SquirrelFoodCache, HookEvent::LocationVerminCleared { location }) => {
                cache_food(state, seat, hero_index, location);
            }
            (AbilityKey::MoleDiscardRecycle, HookEvent::CubeRemovedFromHero { cube }) => {
                if cube == Cube::Mole {
                    recycle_discard(state, rng);
                }
            }
            _ => {}
        }
    }
}

/// One food worker per squirrel cube on the hero, capped by the location's
/// free worker capacity.
fn cache_food(state: &mut GameState, seat: PlayerId, hero_index: usize, location: CardUid) {
    let player = &state.players[seat];
    let hero = &player.tableau[hero_index];
    let squirrels = hero
        .cubes
        .iter()
        .filter(|c| **c == Cube::Squirrel)
        .count();
    if squirrels == 0 {
        return;
    }
    let player_name = player.name.clone();
    let hero_name = hero.name.clone();

    let Some(card) = state.card_mut(location) else {
        return;
    };
    let cached = squirrels.min(card.free_worker_slots());
    if cached == 0 {
        return;
    }
    for _ in 0..cached {
        card.workers.push(Worker {
            cube: Cube::Food,
            owner: seat,
        });
    }
    let location_name = card.name.clone();
    state.push_log(format!(
        "{player_name}'s {hero_name} caches {cached} Food at {location_name}."
    ));
}

/// Top discard back onto the adventure deck, then a reshuffle.
fn recycle_discard<R>(state: &mut GameState, rng: &mut R)
where
    R: RandomSource + ?Sized,
{
    let Some(card) = state.discard.pop() else {
        return;
    };
    let name = card.name.clone();
    state.adventure_deck.push(card);
    shuffle(rng, &mut state.adventure_deck);
    state.push_log(format!("{name} returns to the adventure deck."));
}
