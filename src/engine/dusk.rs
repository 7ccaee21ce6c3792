//! Dusk-stage commands: committing pending cubes, then ending the turn.
//!
//! After resolution the seat places what it drew: cubes onto tableau heroes,
//! workers onto the current location, or food back out of the pool.
//! [`Game::finish_dusk`] force-places the remainder; a seat with no room
//! collapses into exhaustion.

use crate::abilities::{fire_hook, HookEvent};
use crate::cards::{TemplateId, Worker};
use crate::core::cube::Cube;
use crate::core::player::{Player, PlayerId};
use crate::core::rng::RandomSource;
use crate::core::state::Stage;
use crate::engine::{CommandError, Game};

impl<R: RandomSource> Game<R> {
    /// Commit a pending cube to a tableau hero. `hero` is a tableau index;
    /// `None` targets the champion.
    pub fn assign_cube_to_hero(
        &mut self,
        seat: PlayerId,
        cube_index: usize,
        hero: Option<usize>,
    ) -> Result<(), CommandError> {
        self.ensure_live()?;
        self.require_stage(seat, Stage::DuskAssign)?;

        let player = &mut self.state.players[seat];
        let cube = *player
            .pending_cubes
            .get(cube_index)
            .ok_or(CommandError::BadCubeIndex)?;
        let hero_index = hero.unwrap_or(0);
        let hero = player
            .tableau
            .get(hero_index)
            .ok_or(CommandError::UnknownHero)?;
        if cube == Cube::Inexperience && !hero.is_champion {
            return Err(CommandError::InexperienceNeedsChampion);
        }
        if !hero.has_capacity() {
            return Err(CommandError::HeroSlotsFull);
        }

        player.pending_cubes.remove(cube_index);
        player.tableau[hero_index].cubes.push(cube);
        Ok(())
    }

    /// Park a pending cube as a worker at the seat's current location.
    pub fn assign_cube_to_location(
        &mut self,
        seat: PlayerId,
        cube_index: usize,
    ) -> Result<(), CommandError> {
        self.ensure_live()?;
        self.require_stage(seat, Stage::DuskAssign)?;

        let player = &self.state.players[seat];
        let cube = *player
            .pending_cubes
            .get(cube_index)
            .ok_or(CommandError::BadCubeIndex)?;
        if !cube.is_worker_eligible() {
            return Err(CommandError::NotWorkerCube);
        }
        let here = player.location.clone();
        let location = self
            .state
            .discovered_location_mut(&here)
            .ok_or(CommandError::UnknownLocation)?;
        if location.free_worker_slots() == 0 {
            return Err(CommandError::LocationSlotsFull);
        }
        location.workers.push(Worker { cube, owner: seat });

        self.state.players[seat].pending_cubes.remove(cube_index);
        Ok(())
    }

    /// Discard a pending food cube. The cube leaves play entirely.
    pub fn discard_cube(&mut self, seat: PlayerId, cube_index: usize) -> Result<(), CommandError> {
        self.ensure_live()?;
        self.require_stage(seat, Stage::DuskAssign)?;

        let player = &mut self.state.players[seat];
        let cube = *player
            .pending_cubes
            .get(cube_index)
            .ok_or(CommandError::BadCubeIndex)?;
        if cube != Cube::Food {
            return Err(CommandError::OnlyFoodDiscardable);
        }
        player.pending_cubes.remove(cube_index);
        Ok(())
    }

    /// Force-place every remaining pending cube and end the turn.
    pub fn finish_dusk(&mut self, seat: PlayerId) -> Result<(), CommandError> {
        self.ensure_live()?;
        self.require_stage(seat, Stage::DuskAssign)?;

        loop {
            let player = &mut self.state.players[seat];
            if player.pending_cubes.is_empty() {
                break;
            }
            let cube = player.pending_cubes.remove(0);
            self.force_place(seat, cube);
        }
        let player = &mut self.state.players[seat];
        player.drawn_this_turn.clear();
        player.did_bust = false;

        self.end_active_turn();
        Ok(())
    }

    /// Place a cube the seat failed to commit. Food returns to the bag,
    /// inexperience must land on the champion, anything else takes the
    /// first free slot; a seat with nowhere to put it suffers exhaustion
    /// and retries once.
    fn force_place(&mut self, seat: PlayerId, cube: Cube) {
        match cube {
            Cube::Food => {
                self.state.players[seat].bag.push(cube);
            }
            Cube::Inexperience => {
                if !self.state.players[seat].champion_hero_mut().place(cube) {
                    self.trigger_exhaustion(seat);
                    self.state.players[seat].champion_hero_mut().place(cube);
                }
            }
            _ => {
                if place_on_first_free(&mut self.state.players[seat], cube) {
                    return;
                }
                self.trigger_exhaustion(seat);
                place_on_first_free(&mut self.state.players[seat], cube);
            }
        }
    }

    /// Exhaustion: every wound falls off the tableau and lands as vermin on
    /// the seat's location (or the infirmary), and the seat is sent to the
    /// infirmary until healed.
    pub(crate) fn trigger_exhaustion(&mut self, seat: PlayerId) {
        let mut wounds = 0;
        for hero in &mut self.state.players[seat].tableau {
            let before = hero.cubes.len();
            hero.cubes.retain(|cube| *cube != Cube::Wound);
            wounds += before - hero.cubes.len();
        }
        for _ in 0..wounds {
            fire_hook(
                &mut self.state,
                &mut self.rng,
                seat,
                HookEvent::CubeRemovedFromHero { cube: Cube::Wound },
            );
        }

        let infirmary: Option<TemplateId> =
            self.state.infirmary().map(|card| card.template.clone());
        let here = self.state.players[seat].location.clone();
        let drop_site = if self.state.discovered_location(&here).is_some() {
            Some(here)
        } else {
            infirmary.clone()
        };
        if let Some(template) = drop_site {
            if let Some(card) = self.state.discovered_location_mut(&template) {
                card.add_vermin(wounds);
            }
        }

        let player = &mut self.state.players[seat];
        if let Some(template) = infirmary {
            player.location = template;
        }
        player.must_visit_infirmary = true;
        player.exhaustion = true;
    }
}

fn place_on_first_free(player: &mut Player, cube: Cube) -> bool {
    if let Some(hero) = player.tableau.iter_mut().find(|hero| hero.has_capacity()) {
        hero.cubes.push(cube);
        return true;
    }
    false
}
