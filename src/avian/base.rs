use bevy::prelude::*;
use bevy_tnua::{TnuaToggle, prelude::*};

use crate::locomotion::{
    BaseSimulator, KinematicBody, MovementMode, WorldQuery, config::WalkConfig,
};

/// Walking and falling handed to Tnua's floating character controller.
///
/// Each step feeds a [`TnuaBuiltinWalk`] basis from the player's intent and
/// classifies the result with a downward probe. Suspending flips the
/// [`TnuaToggle`] so Tnua leaves the body alone while the locomotion
/// controller drives it.
pub struct TnuaBase<'a> {
    pub controller: Mut<'a, TnuaController>,
    pub toggle: Mut<'a, TnuaToggle>,
    pub world: &'a dyn WorldQuery,
    /// World-space move direction, at most unit length.
    pub intent: Vec3,
    pub walk: &'a WalkConfig,
    pub walkable_floor_y: f32,
}

impl BaseSimulator for TnuaBase<'_> {
    fn step(&mut self, _mode: MovementMode, body: &mut dyn KinematicBody, _dt: f32) -> MovementMode {
        let direction = Vec3::new(self.intent.x, 0.0, self.intent.z).clamp_length_max(1.0);
        let desired_forward = if body.orientation_control().orient_to_movement {
            Dir3::new(direction).ok()
        } else {
            None
        };

        self.controller.basis(TnuaBuiltinWalk {
            desired_velocity: direction * self.walk.walk_speed,
            desired_forward,
            float_height: self.walk.float_height,
            turning_angvel: self.walk.turning_angvel,
            acceleration: self.walk.max_acceleration,
            ..Default::default()
        });

        let position = body.position();
        let probe_end = position - Vec3::Y * self.walk.ground_probe_distance;
        match self.world.line_trace(position, probe_end) {
            Some(hit) if hit.normal.y > self.walkable_floor_y => MovementMode::Grounded,
            _ => MovementMode::Falling,
        }
    }

    fn max_speed(&self) -> f32 {
        self.walk.walk_speed
    }

    fn max_acceleration(&self) -> f32 {
        self.walk.max_acceleration
    }

    fn suspend(&mut self) {
        *self.toggle = TnuaToggle::Disabled;
    }

    fn resume(&mut self) {
        *self.toggle = TnuaToggle::Enabled;
    }
}
