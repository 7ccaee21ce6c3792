//! # briarhold
//!
//! Rules engine for a cooperative, turn-based push-your-luck board game:
//! champions defend a woodland stronghold against an advancing vermin horde.
//!
//! ## Design Principles
//!
//! 1. **Engine Only**: Pure state plus legal moves. No UI, no networking;
//!    callers drive the match through [`engine::Command`]s.
//!
//! 2. **Deterministic**: All randomness flows through an injected
//!    [`core::RandomSource`]; a seed replays a match exactly.
//!
//! 3. **Validate Then Apply**: Rejected commands return a
//!    [`engine::CommandError`] and never mutate state. Outcomes the rules
//!    allow but the dice deny are logged fizzles, not errors.
//!
//! ## Modules
//!
//! - `core`: Cubes, players, RNG, and the match state
//! - `cards`: Card identities and instantiated cards
//! - `content`: Static templates and the standard catalog
//! - `abilities`: Hero abilities and hook dispatch
//! - `setup`: Catalog → fresh match
//! - `engine`: Commands, turn lifecycle, day/dusk/night resolution

pub mod abilities;
pub mod cards;
pub mod content;
pub mod core;
pub mod engine;
pub mod setup;

// Re-export commonly used types
pub use crate::core::{
    Affinity, Cube, GameResult, GameRng, GameState, PlayerId, PlayerMap, RandomSource, Stage,
    ADVENTURE_ROW_SIZE, MAX_CONQUEST,
};

pub use crate::cards::{Card, CardKind, CardUid, TemplateId};

pub use crate::content::Catalog;

pub use crate::engine::{Command, CommandError, Game};

pub use crate::setup::SetupError;
