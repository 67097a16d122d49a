use std::time::Duration;

use bevy::{
    animation::{AnimationTarget, AnimationTargetId, animated_field},
    prelude::*,
};
use climb_locomotion::prelude::*;

use crate::AppSystems;

pub const PLAYER_RADIUS: f32 = 0.4;
pub const PLAYER_HALF_HEIGHT: f32 = 0.9;

const CLIP_BLEND: Duration = Duration::from_millis(100);

/// Length of the demo mantle clip and how far it carries the root.
const MANTLE_DURATION: f32 = 0.8;
const MANTLE_RISE: f32 = 1.9;
const MANTLE_REACH: f32 = 0.8;

#[derive(Component)]
pub struct Player;

pub struct SpawnPlayer {
    pub position: Vec3,
}

impl Command for SpawnPlayer {
    fn apply(self, world: &mut World) {
        let _ = world.run_system_cached_with(spawn_player, self);
    }
}

pub(super) fn plugin(app: &mut App) {
    app.add_systems(Update, apply_controls.in_set(AppSystems::RecordInput));
    app.add_systems(FixedUpdate, carry_mantle);
}

/// Each transition clip nudges the visible capsule and returns it to rest.
fn clip_shapes() -> [(ClipId, f32, Vec3); 5] {
    [
        (ClimbClips::AIR_GRAB, 0.35, Vec3::new(0.0, 0.15, -0.1)),
        (ClimbClips::GROUND_GRAB, 0.4, Vec3::new(0.0, 0.2, -0.1)),
        (ClimbClips::LEDGE_CLIMB, MANTLE_DURATION, Vec3::new(0.0, 0.6, -0.4)),
        (ClimbClips::TO_GROUND, 0.3, Vec3::new(0.0, -0.2, 0.0)),
        (ClimbClips::TO_FALL, 0.25, Vec3::new(0.0, 0.0, 0.2)),
    ]
}

fn nudge_clip(target: AnimationTargetId, duration: f32, peak: Vec3) -> Option<AnimationClip> {
    let samples = [
        (0.0, Vec3::ZERO),
        (duration * 0.5, peak),
        (duration, Vec3::ZERO),
    ];
    let curve = UnevenSampleAutoCurve::new(samples).ok()?;
    let mut clip = AnimationClip::default();
    clip.add_curve_to_target(
        target,
        AnimatableCurve::new(animated_field!(Transform::translation), curve),
    );
    Some(clip)
}

fn spawn_player(
    In(spawn_config): In<SpawnPlayer>,
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut clips: ResMut<Assets<AnimationClip>>,
    mut graphs: ResMut<Assets<AnimationGraph>>,
) {
    let visual_name = Name::new("Player Visual");
    let target = AnimationTargetId::from_name(&visual_name);

    let mut ids = Vec::new();
    let mut handles = Vec::new();
    for (id, duration, peak) in clip_shapes() {
        match nudge_clip(target, duration, peak) {
            Some(clip) => {
                ids.push(id);
                handles.push(clips.add(clip));
            }
            None => warn!("Could not build clip {id}"),
        }
    }
    let (graph, nodes) = AnimationGraph::from_clips(handles);
    let library = ids
        .into_iter()
        .zip(nodes)
        .fold(ClimbClipLibrary::new(CLIP_BLEND), |library, (id, node)| {
            library.with_clip(id, node)
        });

    let player = commands
        .spawn((
            Name::new("Player"),
            Player,
            Transform::from_translation(spawn_config.position),
            Visibility::Visible,
            climber(PLAYER_RADIUS, PLAYER_HALF_HEIGHT),
            library,
        ))
        .id();

    let visual = commands
        .spawn((
            visual_name,
            Mesh3d(meshes.add(Capsule3d::new(
                PLAYER_RADIUS,
                2.0 * (PLAYER_HALF_HEIGHT - PLAYER_RADIUS),
            ))),
            MeshMaterial3d(materials.add(Color::srgb(0.8, 0.7, 0.6))),
            Transform::default(),
            AnimationPlayer::default(),
            AnimationTransitions::new(),
            AnimationGraphHandle(graphs.add(graph)),
            ChildOf(player),
        ))
        .id();

    commands.entity(visual).insert(AnimationTarget {
        id: target,
        player: visual,
    });
    commands.entity(player).insert(ClipAnimator(visual));
    info!("Spawned player at {}", spawn_config.position);
}

/// Root displacement of the mantle for one step of `dt` seconds: up over
/// the ledge and forward onto it at a constant rate.
fn mantle_step(rotation: Quat, dt: f32) -> Vec3 {
    let forward = (rotation * Vec3::NEG_Z).with_y(0.0).normalize_or_zero();
    (Vec3::Y * MANTLE_RISE + forward * MANTLE_REACH) * (dt / MANTLE_DURATION)
}

/// The demo clips only animate the visual child, so the mantle's root motion
/// is applied here while the clip governs.
fn carry_mantle(
    time: Res<Time>,
    mut players: Query<(&mut Transform, &mut LocomotionBody, &LocomotionStateMachine), With<Player>>,
) {
    for (mut transform, mut body, machine) in &mut players {
        let mantling = machine.gate().is_marked(&ClimbClips::LEDGE_CLIMB);
        if body.root_motion != mantling {
            body.root_motion = mantling;
        }
        if mantling {
            let rotation = transform.rotation;
            transform.translation += mantle_step(rotation, time.delta_secs());
        }
    }
}

/// Camera-relative movement plus the mode requests.
///
/// W/S move along the camera's forward on the ground and up or down the
/// surface while climbing. While flying the full camera forward is used and
/// Space/Ctrl rise and sink.
fn apply_controls(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut players: Query<
        (
            &mut MovementIntent,
            &mut TransitionRequests,
            &LocomotionStateMachine,
        ),
        With<Player>,
    >,
    camera_query: Query<&Transform, (With<Camera3d>, Without<Player>)>,
) {
    let Ok((mut intent, mut requests, machine)) = players.single_mut() else {
        return;
    };

    let camera = camera_query.single().ok();
    let (cam_forward, cam_right) = camera
        .map(|transform| (*transform.forward(), *transform.right()))
        .unwrap_or((Vec3::NEG_Z, Vec3::X));
    let forward_flat = Vec3::new(cam_forward.x, 0.0, cam_forward.z).normalize_or_zero();
    let right_flat = Vec3::new(cam_right.x, 0.0, cam_right.z).normalize_or_zero();

    let forward_axis = match machine.mode() {
        MovementMode::Climbing => Vec3::Y,
        MovementMode::Flying => cam_forward,
        MovementMode::Grounded | MovementMode::Falling => forward_flat,
    };

    let mut direction = Vec3::ZERO;
    if keyboard.pressed(KeyCode::ArrowUp) || keyboard.pressed(KeyCode::KeyW) {
        direction += forward_axis;
    }
    if keyboard.pressed(KeyCode::ArrowDown) || keyboard.pressed(KeyCode::KeyS) {
        direction -= forward_axis;
    }
    if keyboard.pressed(KeyCode::ArrowLeft) || keyboard.pressed(KeyCode::KeyA) {
        direction -= right_flat;
    }
    if keyboard.pressed(KeyCode::ArrowRight) || keyboard.pressed(KeyCode::KeyD) {
        direction += right_flat;
    }
    if machine.is_flying() {
        if keyboard.pressed(KeyCode::Space) {
            direction += Vec3::Y;
        }
        if keyboard.pressed(KeyCode::ControlLeft) {
            direction -= Vec3::Y;
        }
    }

    intent.direction = direction.normalize_or_zero();
    intent.facing = (forward_flat != Vec3::ZERO)
        .then(|| Transform::IDENTITY.looking_to(forward_flat, Vec3::Y).rotation);

    if keyboard.just_pressed(KeyCode::KeyE) {
        if machine.is_climbing() {
            requests.request_leave_climb();
        } else {
            requests.request_start_climb();
        }
    }
    if keyboard.just_pressed(KeyCode::Space) && machine.is_climbing() {
        requests.request_climb_dash();
    }
    if keyboard.just_pressed(KeyCode::KeyF) {
        requests.request_toggle_flight();
    }
}
