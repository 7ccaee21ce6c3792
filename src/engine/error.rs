//! Command rejection taxonomy.
//!
//! Every variant is a rule the caller broke; rejected commands leave the
//! state untouched. Outcomes the rules allow but that fizzle (not enough
//! food to recruit, no room for a quest contribution) are logged no-ops,
//! not errors.

use thiserror::Error;

use crate::cards::CardUid;
use crate::core::player::PlayerId;

/// Why a command was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("the match is over")]
    MatchOver,

    #[error("{0} cannot do that at this stage")]
    WrongStage(PlayerId),

    #[error("an action is already in flight")]
    ActionInFlight,

    #[error("no action is in flight")]
    NoActionInFlight,

    #[error("the current action is already resolved")]
    ActionAlreadyResolved,

    #[error("no such card: {0}")]
    UnknownCard(CardUid),

    #[error("no such discovered location")]
    UnknownLocation,

    #[error("no such hero in the tableau")]
    UnknownHero,

    #[error("{0} must visit the infirmary first")]
    MustVisitInfirmary(PlayerId),

    #[error("cannot work {0} while vermin occupy it")]
    TargetHasVermin(CardUid),

    #[error("cannot fight {0}: no vermin there")]
    TargetLacksVermin(CardUid),

    #[error("{0} is not a recruitable hero")]
    NotRecruitable(CardUid),

    #[error("that quest belongs to another champion")]
    ForeignQuest,

    #[error("the fortress still stands between you and the villain")]
    FortressStanding,

    #[error("{0}'s bag is empty")]
    EmptyBag(PlayerId),

    #[error("combat requires more draws before stopping")]
    MinDrawNotMet,

    #[error("helpers may not draw yet")]
    HelpersLocked,

    #[error("{0} cannot assist this action")]
    CannotAssist(PlayerId),

    #[error("no pending cube at that index")]
    BadCubeIndex,

    #[error("inexperience cubes may only rest on the champion")]
    InexperienceNeedsChampion,

    #[error("that hero has no free slots")]
    HeroSlotsFull,

    #[error("that cube cannot work a location")]
    NotWorkerCube,

    #[error("that location has no free worker slots")]
    LocationSlotsFull,

    #[error("only food cubes may be discarded at dusk")]
    OnlyFoodDiscardable,
}
