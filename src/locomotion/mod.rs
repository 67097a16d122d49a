//! Movement-mode controller: walking and falling from a base simulator,
//! plus surface climbing and free flight driven by geometric probing.
//!
//! Nothing here touches the ECS. The controller talks to its surroundings
//! through the traits in [`collaborators`]; see the `avian` module for the
//! Bevy adapters.

mod climb_physics;
mod clip_gate;
pub mod collaborators;
pub mod config;
mod flight_physics;
mod handler;
pub mod kinematics;
mod mode;
mod requests;
mod state_machine;
mod surface_detector;

#[cfg(test)]
pub(crate) mod test_support;

pub use climb_physics::{ClimbPhysics, SurfaceAggregate, snap_step};
pub use clip_gate::{ClipGate, ClipStart};
pub use collaborators::{
    BaseSimulator, CapsuleDimensions, ClipPlayer, Collaborators, KinematicBody, MoveHit,
    OrientationControl, SurfaceSample, WorldQuery,
};
pub use config::{ClimbClips, ClipId, LocomotionConfig};
pub use flight_physics::FlightPhysics;
pub use handler::{BaseLocomotion, ModeContext, ModeHandler};
pub use mode::{ModeChange, ModeStep, MovementMode};
pub use requests::{RequestSlot, TransitionRequests};
pub use state_machine::LocomotionStateMachine;
pub use surface_detector::SurfaceDetector;

use bevy::prelude::*;

pub(crate) fn plugin(app: &mut App) {
    app.register_type::<MovementMode>();
    app.register_type::<LocomotionConfig>();
    app.add_plugins(config::plugin);
}
