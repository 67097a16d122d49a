use bevy::{input::mouse::AccumulatedMouseMotion, prelude::*};

use super::player::Player;
use crate::AppSystems;

/// Orbits the player at a fixed distance, steered by the mouse.
#[derive(Component, Debug)]
pub struct FollowCamera {
    pub yaw: f32,
    pub pitch: f32,
    pub distance: f32,
    /// Point above the player's center the camera looks at.
    pub focus_height: f32,
    pub sensitivity: Vec2,
}

impl Default for FollowCamera {
    fn default() -> Self {
        Self {
            yaw: 0.0,
            pitch: -0.3,
            distance: 7.0,
            focus_height: 1.0,
            sensitivity: Vec2::new(0.003, 0.002),
        }
    }
}

pub(super) fn plugin(app: &mut App) {
    app.add_systems(Startup, spawn_camera);
    app.add_systems(
        Update,
        (
            orbit_camera.in_set(AppSystems::RecordInput),
            follow_player.in_set(AppSystems::Update),
        ),
    );
}

fn spawn_camera(mut commands: Commands) {
    let fov: f32 = 60.0;
    commands.spawn((
        Name::new("Camera"),
        Camera3d::default(),
        FollowCamera::default(),
        Projection::from(PerspectiveProjection {
            fov: fov.to_radians(),
            ..default()
        }),
        Transform::from_xyz(0.0, 4.0, 12.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}

fn orbit_camera(
    mouse_motion: Res<AccumulatedMouseMotion>,
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    mut cameras: Query<&mut FollowCamera>,
) {
    // Orbit only while dragging, so the cursor stays free otherwise.
    if !mouse_buttons.pressed(MouseButton::Right) {
        return;
    }
    let delta = mouse_motion.delta;
    for mut camera in &mut cameras {
        camera.yaw -= delta.x * camera.sensitivity.x;
        camera.pitch = (camera.pitch - delta.y * camera.sensitivity.y).clamp(-1.3, 0.6);
    }
}

fn follow_player(
    players: Query<&Transform, With<Player>>,
    mut cameras: Query<(&FollowCamera, &mut Transform), Without<Player>>,
) {
    let Ok(player) = players.single() else {
        return;
    };
    for (camera, mut transform) in &mut cameras {
        let focus = player.translation + Vec3::Y * camera.focus_height;
        let rotation = Quat::from_euler(EulerRot::YXZ, camera.yaw, camera.pitch, 0.0);
        transform.translation = focus + rotation * Vec3::Z * camera.distance;
        transform.look_at(focus, Vec3::Y);
    }
}
