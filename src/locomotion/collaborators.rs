//! Interfaces the controller consumes from the surrounding engine.
//!
//! The controller never touches the ECS directly; the `avian` module adapts
//! spatial queries, the character body, the animation player and the walking
//! controller to these traits every tick.

use bevy::prelude::*;

use super::{config::ClipId, mode::MovementMode};

/// One geometry-query hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSample {
    pub position: Vec3,
    pub normal: Vec3,
}

/// Collision queries against static world geometry, excluding the owner.
pub trait WorldQuery {
    fn line_trace(&self, start: Vec3, end: Vec3) -> Option<SurfaceSample>;

    fn sphere_sweep(&self, start: Vec3, end: Vec3, radius: f32) -> Option<SurfaceSample>;

    /// Every surface touched while sweeping an upright-in-`orientation`
    /// capsule from `start` to `end`, including surfaces it starts against.
    fn capsule_sweep(
        &self,
        start: Vec3,
        end: Vec3,
        radius: f32,
        half_height: f32,
        orientation: Quat,
    ) -> Vec<SurfaceSample>;
}

/// Plays locomotion clips. Completion is reported back through
/// `LocomotionStateMachine::on_clip_completed`.
pub trait ClipPlayer {
    /// Starts playback; `false` means the request had no effect.
    fn play(&mut self, clip: &ClipId) -> bool;

    /// Unreliable near clip boundaries.
    fn is_playing(&self, clip: &ClipId) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapsuleDimensions {
    pub radius: f32,
    /// Center to tip, including the hemispherical cap.
    pub half_height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrientationControl {
    /// Rotate the body to face its direction of movement.
    pub orient_to_movement: bool,
    /// Rotate the body toward the controller (camera) rotation.
    pub use_controller_rotation: bool,
}

impl Default for OrientationControl {
    fn default() -> Self {
        Self {
            orient_to_movement: true,
            use_controller_rotation: false,
        }
    }
}

/// First blocking hit of a sweep move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveHit {
    /// Fraction of the requested displacement applied before the hit.
    pub time: f32,
    pub position: Vec3,
    pub normal: Vec3,
}

/// The character being moved.
pub trait KinematicBody {
    fn capsule(&self) -> CapsuleDimensions;

    fn position(&self) -> Vec3;

    fn rotation(&self) -> Quat;

    fn set_rotation(&mut self, rotation: Quat);

    fn velocity(&self) -> Vec3;

    fn set_velocity(&mut self, velocity: Vec3);

    /// Input-derived acceleration for this tick.
    fn acceleration(&self) -> Vec3;

    /// Root motion from animation currently drives velocity and orientation.
    fn has_root_motion(&self) -> bool {
        false
    }

    fn orientation_control(&self) -> OrientationControl;

    fn set_orientation_control(&mut self, control: OrientationControl);

    /// Moves by `delta` with the given rotation, stopping at the first
    /// blocking hit.
    fn sweep_move(&mut self, delta: Vec3, rotation: Quat) -> Option<MoveHit>;

    /// Impact response for a blocked move.
    fn handle_impact(&mut self, _hit: &MoveHit, _dt: f32, _attempted: Vec3) {}

    /// `true` while the controller integrates motion itself instead of the
    /// physics engine.
    fn set_controller_driven(&mut self, _driven: bool) {}

    fn forward(&self) -> Vec3 {
        self.rotation() * Vec3::NEG_Z
    }

    fn right(&self) -> Vec3 {
        self.rotation() * Vec3::X
    }

    fn up(&self) -> Vec3 {
        self.rotation() * Vec3::Y
    }
}

/// The generic grounded/airborne simulator climbing and flight extend.
pub trait BaseSimulator {
    /// Runs one Grounded or Falling step and reports the mode it settled on.
    fn step(&mut self, mode: MovementMode, body: &mut dyn KinematicBody, dt: f32) -> MovementMode;

    fn max_speed(&self) -> f32;

    fn max_acceleration(&self) -> f32;

    /// Called when a controller-driven mode takes over.
    fn suspend(&mut self) {}

    /// Called when control returns to Grounded or Falling.
    fn resume(&mut self) {}
}

/// Everything the controller borrows from its surroundings for one tick.
pub struct Collaborators<'a> {
    pub world: &'a dyn WorldQuery,
    pub body: &'a mut dyn KinematicBody,
    /// `None` when no animation player is available.
    pub clips: Option<&'a mut dyn ClipPlayer>,
    pub base: &'a mut dyn BaseSimulator,
}
