use bevy::prelude::*;

use super::{
    clip_gate::ClipStart,
    collaborators::{KinematicBody, OrientationControl, SurfaceSample},
    handler::{ModeContext, ModeHandler},
    kinematics::{facing_rotation, integrate_velocity, move_and_slide, yaw_only},
    mode::{MovementMode, ModeStep},
    surface_detector::SurfaceDetector,
};

/// Mean normal and mean contact point of the latest climbable-surface sweep.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct SurfaceAggregate {
    /// Re-normalized mean normal; zero before the first non-empty sweep.
    pub normal: Vec3,
    pub position: Vec3,
    pub sample_count: usize,
}

impl SurfaceAggregate {
    /// Recomputes from `samples`. An empty set keeps the previous value and
    /// returns `false`.
    pub fn recompute(&mut self, samples: &[SurfaceSample]) -> bool {
        if samples.is_empty() {
            return false;
        }

        let (normal_sum, position_sum) = samples.iter().fold(
            (Vec3::ZERO, Vec3::ZERO),
            |(normals, positions), sample| (normals + sample.normal, positions + sample.position),
        );
        self.normal = normal_sum.normalize_or_zero();
        self.position = position_sum / samples.len() as f32;
        self.sample_count = samples.len();
        true
    }

    pub fn has_normal(&self) -> bool {
        self.normal != Vec3::ZERO
    }
}

/// Displacement pulling the body toward the standoff distance from the
/// surface, at most `max_step` long and never longer than the remaining
/// correction.
pub fn snap_step(
    location: Vec3,
    forward: Vec3,
    target_position: Vec3,
    target_normal: Vec3,
    standoff_distance: f32,
    max_step: f32,
) -> Vec3 {
    let forward_gap = (target_position - location)
        .project_onto(forward)
        .length();
    let offset = -target_normal * (forward_gap - standoff_distance);
    offset.clamp_length_max(max_step.max(0.0))
}

/// Surface-relative movement while climbing.
#[derive(Debug, Default, Clone)]
pub struct ClimbPhysics {
    samples: Vec<SurfaceSample>,
    aggregate: SurfaceAggregate,
    saved_orientation: Option<OrientationControl>,
}

impl ClimbPhysics {
    pub fn aggregate(&self) -> &SurfaceAggregate {
        &self.aggregate
    }

    pub fn samples(&self) -> &[SurfaceSample] {
        &self.samples
    }

    /// Adds a velocity impulse along the direction of travel on the surface.
    pub fn dash<B: KinematicBody + ?Sized>(&self, body: &mut B, impulse: f32) {
        let acceleration = body.acceleration();
        let along_surface = if self.aggregate.has_normal() {
            acceleration.reject_from_normalized(self.aggregate.normal)
        } else {
            acceleration
        };
        let direction = along_surface.try_normalize().unwrap_or_else(|| body.up());
        body.set_velocity(body.velocity() + direction * impulse);
    }

    fn reset_surface(&mut self) {
        self.samples.clear();
        self.aggregate = SurfaceAggregate::default();
    }

    /// Current rotation turned toward facing the surface.
    fn interpolated_rotation<B: KinematicBody + ?Sized>(
        &self,
        body: &B,
        rotate_speed: f32,
        dt: f32,
    ) -> Quat {
        let current = body.rotation();
        if body.has_root_motion() || !self.aggregate.has_normal() {
            return current;
        }
        let Some(target) = facing_rotation(-self.aggregate.normal) else {
            return current;
        };
        current.slerp(target, (rotate_speed * dt).clamp(0.0, 1.0))
    }
}

impl ModeHandler for ClimbPhysics {
    fn on_enter(&mut self, previous: MovementMode, cx: &mut ModeContext) {
        self.reset_surface();

        let body = &mut *cx.io.body;
        self.saved_orientation = Some(body.orientation_control());
        body.set_orientation_control(OrientationControl {
            orient_to_movement: false,
            use_controller_rotation: false,
        });
        body.set_velocity(Vec3::ZERO);

        let config = cx.config;
        let entry = if previous == MovementMode::Falling {
            config.clips.air_grab.as_ref()
        } else {
            config.clips.ground_grab.as_ref()
        };
        if cx.start_clip(entry) == ClipStart::Failed {
            debug!("Climbing entered without an entry clip");
        }
    }

    fn on_exit(&mut self, _next: MovementMode, cx: &mut ModeContext) {
        let body = &mut *cx.io.body;
        if let Some(saved) = self.saved_orientation.take() {
            body.set_orientation_control(saved);
        }
        body.set_rotation(yaw_only(body.rotation()));
        body.set_velocity(Vec3::ZERO);
        self.reset_surface();
    }

    fn on_tick(&mut self, _mode: MovementMode, dt: f32, cx: &mut ModeContext) -> ModeStep {
        let config = cx.config;
        let climbing = &config.climbing;
        if dt < climbing.min_tick_time {
            return ModeStep::Stay;
        }
        let detector = SurfaceDetector::new(&config.detection);
        let mantle = config.clips.ledge_climb.as_ref();

        // Animation owns the motion while mantling.
        if cx.clip_governing(mantle) {
            return ModeStep::Stay;
        }
        if detector.probe_floor_below(cx.io.world, &*cx.io.body) {
            return cx.exit_via(config.clips.to_ground.as_ref(), MovementMode::Grounded);
        }

        self.samples = detector.sweep_climbable_surface(cx.io.world, &*cx.io.body);
        let has_surface = self.aggregate.recompute(&self.samples);
        if !has_surface || !detector.validate_slope(self.aggregate.normal) {
            if cx.gate.any_governing() {
                return ModeStep::Stay;
            }
            return cx.exit_via(config.clips.to_fall.as_ref(), MovementMode::Falling);
        }

        let body = &mut *cx.io.body;
        let root_motion = body.has_root_motion();
        if !root_motion {
            let acceleration = body
                .acceleration()
                .reject_from_normalized(self.aggregate.normal)
                .clamp_length_max(climbing.max_acceleration);
            body.set_velocity(integrate_velocity(
                body.velocity(),
                acceleration,
                climbing.max_speed,
                climbing.braking_deceleration,
                dt,
            ));
        }

        let start = body.position();
        let rotation = self.interpolated_rotation(&*body, climbing.rotate_speed, dt);
        let delta = body.velocity() * dt;
        move_and_slide(body, delta, rotation, dt);
        if !root_motion {
            body.set_velocity((body.position() - start) / dt);
        }

        let snap = snap_step(
            body.position(),
            body.forward(),
            self.aggregate.position,
            self.aggregate.normal,
            climbing.standoff_distance,
            climbing.max_speed * dt,
        );
        if snap != Vec3::ZERO {
            let rotation = body.rotation();
            move_and_slide(body, snap, rotation, dt);
        }

        let moving_up = body.up().dot(body.velocity()) > 0.0;
        if moving_up && detector.probe_ledge_above(cx.io.world, &*cx.io.body) {
            match cx.start_clip(mantle) {
                ClipStart::Started | ClipStart::AlreadyGoverning => {
                    let body = &mut *cx.io.body;
                    body.set_rotation(yaw_only(body.rotation()));
                }
                // Retried next tick once the other clip completes.
                ClipStart::Busy(_) => {}
                ClipStart::Failed => {
                    warn!("Ledge reached but the mantle clip did not start, falling");
                    return ModeStep::Switch(MovementMode::Falling);
                }
            }
        }

        ModeStep::Stay
    }
}
