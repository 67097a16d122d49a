//! Fakes for the collaborator traits used across the controller's tests.

use bevy::prelude::*;

use super::{
    collaborators::{
        BaseSimulator, CapsuleDimensions, ClipPlayer, KinematicBody, MoveHit, OrientationControl,
        SurfaceSample, WorldQuery,
    },
    config::ClipId,
    mode::MovementMode,
};

#[derive(Debug, Clone, Copy)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    fn expanded(&self, by: Vec3) -> Self {
        Self::new(self.min - by, self.max + by)
    }

    fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// Entry fraction along `start..end` and the entered face normal.
    fn segment_entry(&self, start: Vec3, end: Vec3) -> Option<(f32, Vec3)> {
        if self.contains(start) {
            return None;
        }
        let direction = end - start;
        let mut t_min = 0.0_f32;
        let mut t_max = 1.0_f32;
        let mut normal = Vec3::ZERO;

        for axis in 0..3 {
            let origin = start[axis];
            let delta = direction[axis];
            if delta.abs() < 1.0e-9 {
                if origin < self.min[axis] || origin > self.max[axis] {
                    return None;
                }
                continue;
            }
            let mut near = (self.min[axis] - origin) / delta;
            let mut far = (self.max[axis] - origin) / delta;
            if near > far {
                std::mem::swap(&mut near, &mut far);
            }
            if near > t_min {
                t_min = near;
                normal = Vec3::ZERO;
                normal[axis] = if delta > 0.0 { -1.0 } else { 1.0 };
            }
            t_max = t_max.min(far);
            if t_min > t_max {
                return None;
            }
        }

        (normal != Vec3::ZERO).then_some((t_min, normal))
    }

    fn closest_point(&self, point: Vec3) -> Vec3 {
        point.clamp(self.min, self.max)
    }
}

/// World made of axis-aligned boxes. Sweeps treat shapes as boxes grown by
/// the shape's extents, which is exact for flat faces.
#[derive(Default)]
pub struct BoxWorld {
    pub boxes: Vec<Aabb>,
}

impl BoxWorld {
    pub fn with_box(mut self, min: Vec3, max: Vec3) -> Self {
        self.boxes.push(Aabb::new(min, max));
        self
    }

    fn first_entry(&self, start: Vec3, end: Vec3, grow: Vec3) -> Option<(f32, Vec3)> {
        self.boxes
            .iter()
            .filter_map(|aabb| aabb.expanded(grow).segment_entry(start, end))
            .min_by(|a, b| a.0.total_cmp(&b.0))
    }
}

impl WorldQuery for BoxWorld {
    fn line_trace(&self, start: Vec3, end: Vec3) -> Option<SurfaceSample> {
        let (time, normal) = self.first_entry(start, end, Vec3::ZERO)?;
        Some(SurfaceSample {
            position: start.lerp(end, time),
            normal,
        })
    }

    fn sphere_sweep(&self, start: Vec3, end: Vec3, radius: f32) -> Option<SurfaceSample> {
        let (time, normal) = self.first_entry(start, end, Vec3::splat(radius))?;
        Some(SurfaceSample {
            position: start.lerp(end, time) - normal * radius,
            normal,
        })
    }

    fn capsule_sweep(
        &self,
        start: Vec3,
        end: Vec3,
        radius: f32,
        half_height: f32,
        _orientation: Quat,
    ) -> Vec<SurfaceSample> {
        let grow = Vec3::new(radius, half_height, radius);
        self.boxes
            .iter()
            .filter_map(|aabb| {
                let grown = aabb.expanded(grow);
                let (center, entry_normal) = if grown.contains(start) {
                    (start, None)
                } else {
                    let (time, normal) = grown.segment_entry(start, end)?;
                    (start.lerp(end, time), Some(normal))
                };
                let contact = aabb.closest_point(center);
                let normal = (center - contact)
                    .try_normalize()
                    .or(entry_normal)
                    .unwrap_or(Vec3::Y);
                Some(SurfaceSample {
                    position: contact,
                    normal,
                })
            })
            .collect()
    }
}

/// Answers every query of a kind with the same scripted result.
#[derive(Default)]
pub struct ScriptedWorld {
    pub line: Option<SurfaceSample>,
    pub sphere: Option<SurfaceSample>,
    pub capsule: Vec<SurfaceSample>,
}

impl WorldQuery for ScriptedWorld {
    fn line_trace(&self, _start: Vec3, _end: Vec3) -> Option<SurfaceSample> {
        self.line
    }

    fn sphere_sweep(&self, _start: Vec3, _end: Vec3, _radius: f32) -> Option<SurfaceSample> {
        self.sphere
    }

    fn capsule_sweep(
        &self,
        _start: Vec3,
        _end: Vec3,
        _radius: f32,
        _half_height: f32,
        _orientation: Quat,
    ) -> Vec<SurfaceSample> {
        self.capsule.clone()
    }
}

/// Body that moves freely unless a blocking plane is set. Starting inside
/// the plane's reach never blocks, like a sweep ignoring initial overlap.
#[derive(Debug, Clone)]
pub struct TestBody {
    pub position: Vec3,
    pub rotation: Quat,
    pub velocity: Vec3,
    pub acceleration: Vec3,
    pub capsule: CapsuleDimensions,
    pub orientation: OrientationControl,
    pub root_motion: bool,
    pub controller_driven: bool,
    pub wall: Option<(Vec3, Vec3)>,
    pub moves: Vec<Vec3>,
    pub impacts: usize,
}

impl TestBody {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
            velocity: Vec3::ZERO,
            acceleration: Vec3::ZERO,
            capsule: CapsuleDimensions {
                radius: 0.4,
                half_height: 0.9,
            },
            orientation: OrientationControl::default(),
            root_motion: false,
            controller_driven: false,
            wall: None,
            moves: Vec::new(),
            impacts: 0,
        }
    }

    pub fn with_capsule(mut self, radius: f32, half_height: f32) -> Self {
        self.capsule = CapsuleDimensions {
            radius,
            half_height,
        };
        self
    }

    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_acceleration(mut self, acceleration: Vec3) -> Self {
        self.acceleration = acceleration;
        self
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_wall(mut self, point: Vec3, normal: Vec3) -> Self {
        self.wall = Some((point, normal));
        self
    }
}

impl KinematicBody for TestBody {
    fn capsule(&self) -> CapsuleDimensions {
        self.capsule
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn rotation(&self) -> Quat {
        self.rotation
    }

    fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation;
    }

    fn velocity(&self) -> Vec3 {
        self.velocity
    }

    fn set_velocity(&mut self, velocity: Vec3) {
        self.velocity = velocity;
    }

    fn acceleration(&self) -> Vec3 {
        self.acceleration
    }

    fn has_root_motion(&self) -> bool {
        self.root_motion
    }

    fn orientation_control(&self) -> OrientationControl {
        self.orientation
    }

    fn set_orientation_control(&mut self, control: OrientationControl) {
        self.orientation = control;
    }

    fn sweep_move(&mut self, delta: Vec3, rotation: Quat) -> Option<MoveHit> {
        self.rotation = rotation;
        self.moves.push(delta);

        if let Some((point, normal)) = self.wall {
            let approach = -delta.dot(normal);
            let gap = (self.position - point).dot(normal) - self.capsule.radius;
            if approach > 1.0e-6 && gap >= -1.0e-4 && gap < approach {
                let time = (gap.max(0.0) / approach).clamp(0.0, 1.0);
                self.position += delta * time;
                return Some(MoveHit {
                    time,
                    position: self.position - normal * self.capsule.radius,
                    normal,
                });
            }
        }

        self.position += delta;
        None
    }

    fn handle_impact(&mut self, _hit: &MoveHit, _dt: f32, _attempted: Vec3) {
        self.impacts += 1;
    }

    fn set_controller_driven(&mut self, driven: bool) {
        self.controller_driven = driven;
    }
}

/// Clip player that records play calls. Clips listed in `failing` report no
/// effect; `playing` is what the unreliable external query answers.
#[derive(Default)]
pub struct ScriptedClips {
    pub played: Vec<ClipId>,
    pub failing: Vec<ClipId>,
    pub playing: Vec<ClipId>,
}

impl ScriptedClips {
    pub fn failing(clips: &[ClipId]) -> Self {
        Self {
            failing: clips.to_vec(),
            ..default()
        }
    }

    pub fn play_count(&self, clip: &ClipId) -> usize {
        self.played.iter().filter(|played| *played == clip).count()
    }
}

impl ClipPlayer for ScriptedClips {
    fn play(&mut self, clip: &ClipId) -> bool {
        if self.failing.contains(clip) {
            return false;
        }
        self.played.push(clip.clone());
        true
    }

    fn is_playing(&self, clip: &ClipId) -> bool {
        self.playing.contains(clip)
    }
}

/// Base simulator that settles on a fixed mode and counts its steps.
pub struct StubBase {
    pub settle: Option<MovementMode>,
    pub steps: Vec<MovementMode>,
    pub suspended: bool,
}

impl Default for StubBase {
    fn default() -> Self {
        Self {
            settle: None,
            steps: Vec::new(),
            suspended: false,
        }
    }
}

impl BaseSimulator for StubBase {
    fn step(&mut self, mode: MovementMode, _body: &mut dyn KinematicBody, _dt: f32) -> MovementMode {
        self.steps.push(mode);
        self.settle.unwrap_or(mode)
    }

    fn max_speed(&self) -> f32 {
        4.0
    }

    fn max_acceleration(&self) -> f32 {
        20.0
    }

    fn suspend(&mut self) {
        self.suspended = true;
    }

    fn resume(&mut self) {
        self.suspended = false;
    }
}

/// Centimeter-scale probe parameters matching a 50 cm radius capsule.
pub fn centimeter_detection() -> super::config::DetectionConfig {
    super::config::DetectionConfig {
        wall_probe_margin: 10.0,
        floor_trace_offset: 20.0,
        eye_height: 100.0,
        eye_sphere_radius: 30.0,
        eye_trace_distance: 75.0,
        surface_sweep_offset: 10.0,
        ..default()
    }
}
