//! Core primitives: cubes, players, randomness, and the match state.

pub mod cube;
pub mod player;
pub mod rng;
pub mod state;

pub use cube::{count_allied, is_bust, Affinity, Cube};
pub use player::{CombatContext, Hero, Player, PlayerId, PlayerMap, QuestStatus};
pub use rng::{shuffle, FixedRandom, GameRng, RandomSource};
pub use state::{
    ActionContext, ActionMode, ActiveStage, GameResult, GameState, HelperState, Stage,
    ADVENTURE_ROW_SIZE, MAX_CONQUEST,
};
