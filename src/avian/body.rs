use avian3d::prelude::*;
use bevy::prelude::*;

use crate::locomotion::{
    CapsuleDimensions, KinematicBody, MoveHit, OrientationControl,
};

/// Gap kept between the character and whatever stopped a sweep move.
const SKIN_WIDTH: f32 = 0.01;

/// Per-character locomotion state the physics engine does not track.
#[derive(Component, Reflect, Debug, Clone)]
#[reflect(Component)]
pub struct LocomotionBody {
    pub radius: f32,
    pub half_height: f32,
    /// Velocity while the controller integrates motion itself.
    pub velocity: Vec3,
    /// Input acceleration, refreshed every fixed step.
    pub acceleration: Vec3,
    pub orient_to_movement: bool,
    pub use_controller_rotation: bool,
    /// Set by the app while animation moves the root. Nothing in this crate
    /// applies root motion to the transform.
    pub root_motion: bool,
    /// The locomotion controller owns velocity. The matching [`RigidBody`]
    /// kind is inserted once the mode change is applied.
    pub controller_driven: bool,
}

impl LocomotionBody {
    pub fn new(radius: f32, half_height: f32) -> Self {
        let orientation = OrientationControl::default();
        Self {
            radius,
            half_height,
            velocity: Vec3::ZERO,
            acceleration: Vec3::ZERO,
            orient_to_movement: orientation.orient_to_movement,
            use_controller_rotation: orientation.use_controller_rotation,
            root_motion: false,
            controller_driven: false,
        }
    }

    pub fn velocity(&self, linear_velocity: &LinearVelocity) -> Vec3 {
        if self.controller_driven {
            self.velocity
        } else {
            linear_velocity.0
        }
    }

    pub fn set_velocity(&mut self, linear_velocity: &mut LinearVelocity, velocity: Vec3) {
        if self.controller_driven {
            self.velocity = velocity;
        } else {
            linear_velocity.0 = velocity;
        }
    }

    /// Moves the current velocity to whichever side owns it from now on.
    pub fn hand_over(&mut self, linear_velocity: &mut LinearVelocity, driven: bool) {
        if driven == self.controller_driven {
            return;
        }
        if driven {
            self.velocity = linear_velocity.0;
            linear_velocity.0 = Vec3::ZERO;
        } else {
            linear_velocity.0 = self.velocity;
            self.velocity = Vec3::ZERO;
        }
        self.controller_driven = driven;
    }

    /// Collider matching the capsule the controller probes with.
    pub fn collider(&self) -> Collider {
        Collider::capsule(self.radius, (2.0 * (self.half_height - self.radius)).max(0.0))
    }
}

/// A rigid body seen as a [`KinematicBody`].
///
/// While the base simulator drives, velocity lives in [`LinearVelocity`] and
/// the walking controller moves the body. While controller-driven, velocity
/// lives in [`LocomotionBody`] and the transform moves with shape-cast sweeps.
/// `RigidBody` is immutable in avian, so the body kind itself is swapped by
/// re-inserting it after the tick.
pub struct AvianBody<'a, 'w, 's> {
    pub transform: Mut<'a, Transform>,
    pub linear_velocity: Mut<'a, LinearVelocity>,
    pub state: Mut<'a, LocomotionBody>,
    pub collider: &'a Collider,
    pub spatial: &'a SpatialQuery<'w, 's>,
    pub filter: SpatialQueryFilter,
}

impl AvianBody<'_, '_, '_> {
    /// Turns toward `target` by `fraction` of the remaining angle.
    pub fn turn_towards(&mut self, target: Quat, fraction: f32) {
        let rotation = self.transform.rotation.slerp(target, fraction.clamp(0.0, 1.0));
        self.transform.rotation = rotation;
    }
}

impl KinematicBody for AvianBody<'_, '_, '_> {
    fn capsule(&self) -> CapsuleDimensions {
        CapsuleDimensions {
            radius: self.state.radius,
            half_height: self.state.half_height,
        }
    }

    fn position(&self) -> Vec3 {
        self.transform.translation
    }

    fn rotation(&self) -> Quat {
        self.transform.rotation
    }

    fn set_rotation(&mut self, rotation: Quat) {
        self.transform.rotation = rotation;
    }

    fn velocity(&self) -> Vec3 {
        self.state.velocity(&self.linear_velocity)
    }

    fn set_velocity(&mut self, velocity: Vec3) {
        let Self {
            state,
            linear_velocity,
            ..
        } = self;
        state.set_velocity(linear_velocity, velocity);
    }

    fn acceleration(&self) -> Vec3 {
        self.state.acceleration
    }

    fn has_root_motion(&self) -> bool {
        self.state.root_motion
    }

    fn orientation_control(&self) -> OrientationControl {
        OrientationControl {
            orient_to_movement: self.state.orient_to_movement,
            use_controller_rotation: self.state.use_controller_rotation,
        }
    }

    fn set_orientation_control(&mut self, control: OrientationControl) {
        self.state.orient_to_movement = control.orient_to_movement;
        self.state.use_controller_rotation = control.use_controller_rotation;
    }

    fn sweep_move(&mut self, delta: Vec3, rotation: Quat) -> Option<MoveHit> {
        self.transform.rotation = rotation;
        let (direction, length) = Dir3::new_and_length(delta).ok()?;

        let config = ShapeCastConfig {
            max_distance: length,
            ignore_origin_penetration: true,
            ..default()
        };
        let origin = self.transform.translation;
        let hit = self.spatial.cast_shape(
            self.collider,
            origin,
            rotation,
            direction,
            &config,
            &self.filter,
        );

        match hit {
            Some(hit) => {
                let travel = (hit.distance - SKIN_WIDTH).max(0.0);
                self.transform.translation = origin + direction * travel;
                Some(MoveHit {
                    time: travel / length,
                    position: hit.point1,
                    normal: hit.normal1,
                })
            }
            None => {
                self.transform.translation = origin + delta;
                None
            }
        }
    }

    fn set_controller_driven(&mut self, driven: bool) {
        let Self {
            state,
            linear_velocity,
            ..
        } = self;
        state.hand_over(linear_velocity, driven);
    }
}
