use avian3d::prelude::*;
use bevy::prelude::*;

use crate::locomotion::{SurfaceSample, WorldQuery};

/// Upper bound on the surfaces collected by one capsule sweep.
const MAX_SURFACE_HITS: u32 = 8;

/// Avian spatial queries seen from one character, which is filtered out.
pub struct AvianWorldQuery<'a, 'w, 's> {
    spatial: &'a SpatialQuery<'w, 's>,
    filter: SpatialQueryFilter,
}

impl<'a, 'w, 's> AvianWorldQuery<'a, 'w, 's> {
    pub fn new(spatial: &'a SpatialQuery<'w, 's>, owner: Entity) -> Self {
        Self {
            spatial,
            filter: SpatialQueryFilter::from_excluded_entities([owner]),
        }
    }
}

impl WorldQuery for AvianWorldQuery<'_, '_, '_> {
    fn line_trace(&self, start: Vec3, end: Vec3) -> Option<SurfaceSample> {
        let (direction, length) = Dir3::new_and_length(end - start).ok()?;
        self.spatial
            .cast_ray(start, direction, length, true, &self.filter)
            .map(|hit| SurfaceSample {
                position: start + direction * hit.distance,
                normal: hit.normal,
            })
    }

    fn sphere_sweep(&self, start: Vec3, end: Vec3, radius: f32) -> Option<SurfaceSample> {
        let (direction, length) = Dir3::new_and_length(end - start).ok()?;
        let config = ShapeCastConfig::from_max_distance(length);
        self.spatial
            .cast_shape(
                &Collider::sphere(radius),
                start,
                Quat::IDENTITY,
                direction,
                &config,
                &self.filter,
            )
            .map(|hit| SurfaceSample {
                position: hit.point1,
                normal: hit.normal1,
            })
    }

    fn capsule_sweep(
        &self,
        start: Vec3,
        end: Vec3,
        radius: f32,
        half_height: f32,
        orientation: Quat,
    ) -> Vec<SurfaceSample> {
        let Ok((direction, length)) = Dir3::new_and_length(end - start) else {
            return Vec::new();
        };
        let shape = Collider::capsule(radius, (2.0 * (half_height - radius)).max(0.0));
        let config = ShapeCastConfig {
            max_distance: length,
            // Surfaces the capsule already rests against count as touched.
            ignore_origin_penetration: false,
            ..default()
        };
        self.spatial
            .shape_hits(
                &shape,
                start,
                orientation,
                direction,
                MAX_SURFACE_HITS,
                &config,
                &self.filter,
            )
            .into_iter()
            .map(|hit| SurfaceSample {
                position: hit.point1,
                normal: hit.normal1,
            })
            .collect()
    }
}
