//! Climbing and flying movement modes layered over a walking character
//! controller.
//!
//! [`locomotion`] holds the engine-agnostic controller. [`avian`] runs it on
//! Avian rigid bodies with Tnua handling walking and falling.

pub mod avian;
pub mod locomotion;

pub mod prelude {
    pub use crate::avian::{
        ClimbClipLibrary, ClipAnimator, LocomotionBody, LocomotionPlugin, MovementIntent,
        MovementModeChanged, climber,
    };
    pub use crate::locomotion::{
        ClimbClips, ClipId, LocomotionConfig, LocomotionStateMachine, MovementMode,
        TransitionRequests,
    };
}
