use bevy::prelude::*;

use super::{
    collaborators::{KinematicBody, SurfaceSample, WorldQuery},
    config::DetectionConfig,
};

/// Geometry probes answering what the environment around the body affords.
///
/// Every probe is a pure function of the body's kinematic state and the
/// world: one synchronous query per probe, no retries, no mutation.
pub struct SurfaceDetector<'c> {
    config: &'c DetectionConfig,
}

impl<'c> SurfaceDetector<'c> {
    pub fn new(config: &'c DetectionConfig) -> Self {
        Self { config }
    }

    /// Two rays angled left and right of forward must both hit, and the body
    /// must be moving and accelerating toward them.
    pub fn probe_forward_wall<W, B>(&self, world: &W, body: &B) -> bool
    where
        W: WorldQuery + ?Sized,
        B: KinematicBody + ?Sized,
    {
        let forward = body.forward();
        let right = body.right();
        let spread = right * self.config.wall_probe_half_angle_degrees.to_radians().tan();
        let length = body.capsule().radius + self.config.wall_probe_margin;
        let start = body.position();

        let hits = [forward - spread, forward + spread].into_iter().all(|ray| {
            let ray = ray.normalize_or_zero();
            world.line_trace(start, start + ray * length).is_some()
        });
        if !hits {
            return false;
        }

        let velocity_dot = forward.dot(body.velocity().normalize_or_zero());
        let acceleration_dot = forward.dot(body.acceleration().normalize_or_zero());
        velocity_dot > self.config.wall_velocity_threshold
            && acceleration_dot > self.config.wall_acceleration_threshold
    }

    /// A walkable floor within reach below while moving into it.
    pub fn probe_floor_below<W, B>(&self, world: &W, body: &B) -> bool
    where
        W: WorldQuery + ?Sized,
        B: KinematicBody + ?Sized,
    {
        let start = body.position();
        let length = body.capsule().half_height + self.config.floor_trace_offset;

        let Some(hit) = world.line_trace(start, start + Vec3::NEG_Y * length) else {
            return false;
        };
        if !self.is_walkable(hit.normal) {
            return false;
        }

        (-hit.normal).dot(body.velocity().normalize_or_zero()) > 0.0
    }

    /// The forward sphere sweep at eye height hits something: the wall goes
    /// at least that high.
    pub fn probe_eye_height_wall<W, B>(&self, world: &W, body: &B) -> bool
    where
        W: WorldQuery + ?Sized,
        B: KinematicBody + ?Sized,
    {
        let (start, end) = self.eye_trace(body);
        world
            .sphere_sweep(start, end, self.config.eye_sphere_radius)
            .is_some()
    }

    /// Open space at eye height with either nothing or a walkable floor
    /// below it.
    pub fn probe_ledge_above<W, B>(&self, world: &W, body: &B) -> bool
    where
        W: WorldQuery + ?Sized,
        B: KinematicBody + ?Sized,
    {
        let (start, end) = self.eye_trace(body);
        if world
            .sphere_sweep(start, end, self.config.eye_sphere_radius)
            .is_some()
        {
            return false;
        }

        let drop = self.config.eye_sphere_radius
            + body.capsule().half_height
            + self.config.eye_height;
        match world.line_trace(end, end - body.up() * drop) {
            Some(floor) => self.is_walkable(floor.normal),
            None => true,
        }
    }

    /// Capsule sweep a short distance forward; every touched surface.
    pub fn sweep_climbable_surface<W, B>(&self, world: &W, body: &B) -> Vec<SurfaceSample>
    where
        W: WorldQuery + ?Sized,
        B: KinematicBody + ?Sized,
    {
        let start = body.position();
        let end = start + body.forward() * self.config.surface_sweep_offset;
        let capsule = body.capsule();
        world.capsule_sweep(
            start,
            end,
            capsule.radius,
            capsule.half_height,
            body.rotation(),
        )
    }

    /// Rejects a normal that cancelled out to zero or is not finite.
    pub fn validate_slope(&self, aggregate_normal: Vec3) -> bool {
        if aggregate_normal == Vec3::ZERO || !aggregate_normal.is_finite() {
            return false;
        }
        let dot = Vec3::Y.dot(aggregate_normal);
        dot > self.config.min_slope && dot < self.config.max_slope
    }

    pub fn is_walkable(&self, normal: Vec3) -> bool {
        normal.y > self.config.walkable_floor_y
    }

    fn eye_trace<B: KinematicBody + ?Sized>(&self, body: &B) -> (Vec3, Vec3) {
        let start = body.position()
            + body.up() * (self.config.eye_height + self.config.eye_sphere_radius);
        (start, start + body.forward() * self.config.eye_trace_distance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locomotion::test_support::{
        centimeter_detection, BoxWorld, ScriptedWorld, TestBody,
    };

    /// Wide wall whose face is the plane z = 0, facing +Z.
    fn wall(height: f32, depth: f32) -> BoxWorld {
        BoxWorld::default().with_box(
            Vec3::new(-500.0, 0.0, -depth),
            Vec3::new(500.0, height, 0.0),
        )
    }

    fn body_facing_wall(distance: f32) -> TestBody {
        TestBody::at(Vec3::new(0.0, 100.0, distance))
            .with_capsule(50.0, 80.0)
            .with_velocity(Vec3::NEG_Z * 100.0)
            .with_acceleration(Vec3::NEG_Z * 1000.0)
    }

    #[test]
    fn wall_ten_units_ahead_is_detected() {
        let config = centimeter_detection();
        let detector = SurfaceDetector::new(&config);

        assert!(detector.probe_forward_wall(&wall(400.0, 100.0), &body_facing_wall(10.0)));
    }

    #[test]
    fn wall_is_detected_across_reachable_distances() {
        let config = centimeter_detection();
        let detector = SurfaceDetector::new(&config);
        let world = wall(400.0, 100.0);

        // Each angled ray reaches d / cos(25°), which stays under 60 up to ~54.
        for distance in [1.0, 20.0, 40.0, 50.0] {
            assert!(
                detector.probe_forward_wall(&world, &body_facing_wall(distance)),
                "distance {distance}"
            );
        }
        assert!(!detector.probe_forward_wall(&world, &body_facing_wall(58.0)));
    }

    #[test]
    fn moving_away_from_the_wall_is_not_a_climb() {
        let config = centimeter_detection();
        let detector = SurfaceDetector::new(&config);
        let body = body_facing_wall(10.0).with_velocity(Vec3::Z * 100.0);

        assert!(!detector.probe_forward_wall(&wall(400.0, 100.0), &body));
    }

    #[test]
    fn acceleration_must_point_at_the_wall() {
        let config = centimeter_detection();
        let detector = SurfaceDetector::new(&config);
        // Sideways-ish acceleration: forward alignment of cos(45°) < 0.8.
        let body = body_facing_wall(10.0)
            .with_acceleration(Vec3::new(1.0, 0.0, -1.0) * 1000.0);

        assert!(!detector.probe_forward_wall(&wall(400.0, 100.0), &body));
    }

    #[test]
    fn narrow_pillar_misses_one_ray() {
        let config = centimeter_detection();
        let detector = SurfaceDetector::new(&config);
        // Only covers x in [-1, 40]: the left ray passes beside it.
        let pillar = BoxWorld::default().with_box(
            Vec3::new(-1.0, 0.0, -100.0),
            Vec3::new(40.0, 400.0, 0.0),
        );

        assert!(!detector.probe_forward_wall(&pillar, &body_facing_wall(10.0)));
    }

    #[test]
    fn floor_below_requires_walkable_surface_and_downward_motion() {
        let config = centimeter_detection();
        let detector = SurfaceDetector::new(&config);
        let floor = BoxWorld::default().with_box(
            Vec3::new(-500.0, -50.0, -500.0),
            Vec3::new(500.0, 0.0, 500.0),
        );
        let descending = TestBody::at(Vec3::new(0.0, 90.0, 0.0))
            .with_capsule(50.0, 80.0)
            .with_velocity(Vec3::NEG_Y * 50.0);

        assert!(detector.probe_floor_below(&floor, &descending));

        let rising = descending.clone().with_velocity(Vec3::Y * 50.0);
        assert!(!detector.probe_floor_below(&floor, &rising));

        let out_of_reach = TestBody {
            position: Vec3::new(0.0, 120.0, 0.0),
            ..descending.clone()
        };
        assert!(!detector.probe_floor_below(&floor, &out_of_reach));

        let steep = ScriptedWorld {
            line: Some(SurfaceSample {
                position: Vec3::ZERO,
                normal: Vec3::new(0.8, 0.6, 0.0),
            }),
            ..default()
        };
        assert!(!detector.probe_floor_below(&steep, &descending));
    }

    #[test]
    fn ledge_is_blocked_while_the_wall_continues() {
        let config = centimeter_detection();
        let detector = SurfaceDetector::new(&config);
        let body = TestBody::at(Vec3::new(0.0, 100.0, 45.0)).with_capsule(50.0, 80.0);

        assert!(!detector.probe_ledge_above(&wall(400.0, 100.0), &body));
        assert!(detector.probe_eye_height_wall(&wall(400.0, 100.0), &body));
    }

    #[test]
    fn ledge_with_walkable_top_is_a_mantle_target() {
        let config = centimeter_detection();
        let detector = SurfaceDetector::new(&config);
        let body = TestBody::at(Vec3::new(0.0, 100.0, 45.0)).with_capsule(50.0, 80.0);

        // Eye sweep at y = 230 clears a 180 tall wall; its top is under the
        // sweep's end point.
        assert!(detector.probe_ledge_above(&wall(180.0, 100.0), &body));
        assert!(!detector.probe_eye_height_wall(&wall(180.0, 100.0), &body));
    }

    #[test]
    fn ledge_without_any_floor_is_an_open_edge() {
        let config = centimeter_detection();
        let detector = SurfaceDetector::new(&config);
        let body = TestBody::at(Vec3::new(0.0, 100.0, 45.0)).with_capsule(50.0, 80.0);

        // Thin wall: the downward trace from the sweep end misses its top.
        assert!(detector.probe_ledge_above(&wall(180.0, 10.0), &body));
    }

    #[test]
    fn steep_surface_past_the_ledge_keeps_climbing() {
        let config = centimeter_detection();
        let detector = SurfaceDetector::new(&config);
        let body = TestBody::at(Vec3::new(0.0, 100.0, 45.0)).with_capsule(50.0, 80.0);
        let world = ScriptedWorld {
            line: Some(SurfaceSample {
                position: Vec3::ZERO,
                normal: Vec3::new(0.0, 0.5, 0.866),
            }),
            ..default()
        };

        assert!(!detector.probe_ledge_above(&world, &body));
    }

    #[test]
    fn slope_bounds_are_exclusive() {
        let config = DetectionConfig::default();
        let detector = SurfaceDetector::new(&config);

        assert!(detector.validate_slope(Vec3::Z));
        assert!(detector.validate_slope(Vec3::new(0.0, 0.5, 0.866)));
        assert!(!detector.validate_slope(Vec3::new(0.0, 0.6, 0.8)));
        assert!(!detector.validate_slope(Vec3::new(0.0, -0.8, 0.6)));
    }

    #[test]
    fn degenerate_normals_are_not_climbable() {
        let config = DetectionConfig::default();
        let detector = SurfaceDetector::new(&config);

        assert!(!detector.validate_slope(Vec3::ZERO));
        assert!(!detector.validate_slope(Vec3::new(f32::NAN, 0.0, 1.0)));
    }

    #[test]
    fn surface_sweep_reports_the_wall_in_front() {
        let config = centimeter_detection();
        let detector = SurfaceDetector::new(&config);
        let body = TestBody::at(Vec3::new(0.0, 100.0, 45.0)).with_capsule(50.0, 80.0);

        let samples = detector.sweep_climbable_surface(&wall(400.0, 100.0), &body);
        assert_eq!(samples.len(), 1);
        assert!((samples[0].normal - Vec3::Z).length() < 1.0e-5);
        assert!(samples[0].position.z.abs() < 1.0e-5);

        let far = TestBody::at(Vec3::new(0.0, 100.0, 200.0)).with_capsule(50.0, 80.0);
        assert!(detector.sweep_climbable_surface(&wall(400.0, 100.0), &far).is_empty());
    }
}
