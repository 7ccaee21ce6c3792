//! The rules engine: command surface and turn lifecycle.
//!
//! [`Game`] owns a [`GameState`] plus an injected [`RandomSource`] and
//! exposes every legal move as a method (and the [`Command`] enum as a
//! single serializable entry point). Rejected commands return a
//! [`CommandError`] and leave the state untouched.

pub mod action;
pub mod dusk;
pub mod error;
pub mod night;

use serde::{Deserialize, Serialize};

use crate::cards::{CardUid, TemplateId};
use crate::content::Catalog;
use crate::core::player::PlayerId;
use crate::core::rng::{GameRng, RandomSource};
use crate::core::state::{ActionMode, ActiveStage, GameState, Stage};
use crate::setup::{self, SetupError};

pub use error::CommandError;

/// Every move a seat can submit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "command")]
pub enum Command {
    /// Target a card for the day action.
    ChooseAction { target: CardUid, mode: ActionMode },
    /// Draw one cube from the active seat's bag.
    DrawCube,
    /// Stop drawing and resolve the action.
    StopDrawing,
    /// Draw one cube from a helper's bag into the active action.
    AssistDraw,
    /// Move to an already discovered location.
    TravelTo { location: TemplateId },
    /// Dusk: commit a pending cube to a tableau hero.
    AssignToHero {
        cube_index: usize,
        /// Tableau index; `None` targets the champion.
        hero: Option<usize>,
    },
    /// Dusk: park a pending cube as a worker at the current location.
    AssignToLocation { cube_index: usize },
    /// Dusk: discard a pending food cube.
    DiscardCube { cube_index: usize },
    /// Dusk: force-place whatever is left and end the turn.
    FinishDusk,
}

/// A running match: shared state plus the randomness source.
pub struct Game<R = GameRng> {
    pub state: GameState,
    pub(crate) rng: R,
}

impl Game<GameRng> {
    /// Set up a seeded match.
    pub fn new(catalog: &Catalog, player_count: usize, seed: u64) -> Result<Self, SetupError> {
        Self::with_rng(catalog, player_count, GameRng::new(seed))
    }
}

impl<R: RandomSource> Game<R> {
    /// Set up a match with an explicit randomness source.
    pub fn with_rng(
        catalog: &Catalog,
        player_count: usize,
        mut rng: R,
    ) -> Result<Self, SetupError> {
        let state = setup::new_match(catalog, player_count, &mut rng)?;
        Ok(Self { state, rng })
    }

    /// Submit a command for `seat`.
    pub fn execute(&mut self, seat: PlayerId, command: Command) -> Result<(), CommandError> {
        match command {
            Command::ChooseAction { target, mode } => self.choose_action(seat, target, mode),
            Command::DrawCube => self.draw_cube(seat),
            Command::StopDrawing => self.stop_drawing(seat),
            Command::AssistDraw => self.assist_draw(seat),
            Command::TravelTo { location } => self.travel_to(seat, &location),
            Command::AssignToHero { cube_index, hero } => {
                self.assign_cube_to_hero(seat, cube_index, hero)
            }
            Command::AssignToLocation { cube_index } => {
                self.assign_cube_to_location(seat, cube_index)
            }
            Command::DiscardCube { cube_index } => self.discard_cube(seat, cube_index),
            Command::FinishDusk => self.finish_dusk(seat),
        }
    }

    pub(crate) fn ensure_live(&self) -> Result<(), CommandError> {
        if self.state.result().is_some() {
            return Err(CommandError::MatchOver);
        }
        Ok(())
    }

    pub(crate) fn require_stage(&self, seat: PlayerId, expected: Stage) -> Result<(), CommandError> {
        if self.state.stage_of(seat) != expected {
            return Err(CommandError::WrongStage(seat));
        }
        Ok(())
    }

    /// Advance past the active seat's finished turn. Resolves night after
    /// the last seat of the round.
    pub(crate) fn end_active_turn(&mut self) {
        self.state.turns_in_phase += 1;
        let player_count = self.state.players.player_count();
        if self.state.turns_in_phase >= player_count {
            night::resolve(&mut self.state, &mut self.rng);
            self.state.turns_in_phase = 0;
            self.state.active_seat = PlayerId::new(0);
        } else {
            let next = (self.state.active_seat.index() + 1) % player_count;
            self.state.active_seat = PlayerId::new(next as u8);
        }
        self.begin_turn();
    }

    fn begin_turn(&mut self) {
        let seat = self.state.active_seat;
        let player = &mut self.state.players[seat];
        player.drawn_this_turn.clear();
        player.pending_cubes.clear();
        player.did_bust = false;
        self.state.turn_state = None;
        self.state.active_stage = ActiveStage::DayAction;
    }
}
