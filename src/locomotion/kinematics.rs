use bevy::prelude::*;

use super::collaborators::{KinematicBody, MoveHit};

const MIN_SLIDE_LENGTH_SQUARED: f32 = 1.0e-8;

/// Moves the body and, on a blocking hit, slides the unapplied part of the
/// displacement along the hit surface.
pub fn move_and_slide<B: KinematicBody + ?Sized>(
    body: &mut B,
    delta: Vec3,
    rotation: Quat,
    dt: f32,
) -> Option<MoveHit> {
    let hit = body.sweep_move(delta, rotation)?;
    body.handle_impact(&hit, dt, delta);

    let remaining = delta * (1.0 - hit.time.clamp(0.0, 1.0));
    let Some(normal) = hit.normal.try_normalize() else {
        return Some(hit);
    };
    let slide = remaining.reject_from_normalized(normal);
    if slide.length_squared() > MIN_SLIDE_LENGTH_SQUARED {
        body.sweep_move(slide, rotation);
    }

    Some(hit)
}

/// Acceleration-limited velocity update.
///
/// Without input the velocity brakes toward zero. With input it accelerates
/// and is capped at `max_speed`; a velocity already above the cap (after an
/// impulse) decays toward it at the braking rate instead of being clipped.
pub fn integrate_velocity(
    velocity: Vec3,
    acceleration: Vec3,
    max_speed: f32,
    braking_deceleration: f32,
    dt: f32,
) -> Vec3 {
    let speed = velocity.length();

    if acceleration.length_squared() <= f32::EPSILON {
        let drop = braking_deceleration * dt;
        return if speed <= drop {
            Vec3::ZERO
        } else {
            velocity - velocity / speed * drop
        };
    }

    let next = velocity + acceleration * dt;
    let cap = if speed > max_speed {
        (speed - braking_deceleration * dt).max(max_speed)
    } else {
        max_speed
    };
    next.clamp_length_max(cap)
}

/// Rotation whose forward axis (-Z) points along `forward`, kept upright
/// against world Y. `None` for zero or vertical directions.
pub fn facing_rotation(forward: Vec3) -> Option<Quat> {
    let forward = forward.try_normalize()?;
    let right = forward.cross(Vec3::Y).try_normalize()?;
    let up = right.cross(forward);
    Some(Quat::from_mat3(&Mat3::from_cols(right, up, -forward)))
}

/// Keeps only the yaw of `rotation`.
pub fn yaw_only(rotation: Quat) -> Quat {
    let (yaw, _, _) = rotation.to_euler(EulerRot::YXZ);
    Quat::from_rotation_y(yaw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locomotion::test_support::TestBody;

    #[test]
    fn braking_stops_without_overshooting_zero() {
        let velocity = integrate_velocity(Vec3::X * 0.5, Vec3::ZERO, 2.0, 10.0, 0.1);
        assert_eq!(velocity, Vec3::ZERO);

        let velocity = integrate_velocity(Vec3::X * 2.0, Vec3::ZERO, 2.0, 10.0, 0.1);
        assert!((velocity - Vec3::X).length() < 1.0e-5);
    }

    #[test]
    fn acceleration_never_exceeds_max_speed_from_rest() {
        let mut velocity = Vec3::ZERO;
        for _ in 0..100 {
            velocity = integrate_velocity(velocity, Vec3::Y * 50.0, 1.2, 5.5, 0.05);
            assert!(velocity.length() <= 1.2 + 1.0e-5);
        }
        assert!((velocity.length() - 1.2).abs() < 1.0e-5);
    }

    #[test]
    fn overspeed_decays_at_braking_rate() {
        let velocity = integrate_velocity(Vec3::Y * 4.0, Vec3::Y * 1.0, 1.0, 10.0, 0.1);
        assert!((velocity.length() - 3.0).abs() < 1.0e-5);
    }

    #[test]
    fn facing_rotation_points_forward_axis() {
        let rotation = facing_rotation(Vec3::X).unwrap();

        assert!((rotation * Vec3::NEG_Z - Vec3::X).length() < 1.0e-5);
        assert!((rotation * Vec3::Y - Vec3::Y).length() < 1.0e-5);
        assert!(facing_rotation(Vec3::Y).is_none());
        assert!(facing_rotation(Vec3::ZERO).is_none());
    }

    #[test]
    fn yaw_only_removes_pitch_and_roll() {
        let rotation = Quat::from_rotation_y(0.7) * Quat::from_rotation_x(-0.4);
        let upright = yaw_only(rotation);

        assert!((upright * Vec3::Y - Vec3::Y).length() < 1.0e-5);
        assert!(upright.angle_between(Quat::from_rotation_y(0.7)) < 1.0e-4);
    }

    #[test]
    fn slides_remaining_motion_along_the_wall() {
        // Wall plane at z = 0 facing +Z; body of radius 0.5 at z = 1.
        let mut body = TestBody::at(Vec3::new(0.0, 0.0, 1.0))
            .with_capsule(0.5, 1.0)
            .with_wall(Vec3::ZERO, Vec3::Z);

        let hit = move_and_slide(&mut body, Vec3::new(1.0, 0.0, -1.0), Quat::IDENTITY, 0.1)
            .expect("wall blocks the move");

        assert!((hit.time - 0.5).abs() < 1.0e-5);
        assert!((body.position - Vec3::new(1.0, 0.0, 0.5)).length() < 1.0e-4);
        assert_eq!(body.impacts, 1);
    }
}
