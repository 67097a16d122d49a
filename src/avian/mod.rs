//! Runs the locomotion controller on Avian rigid bodies.
//!
//! Grounded and Falling are handed to Tnua's walking controller. Climbing and
//! Flying switch the body to kinematic and move it with shape casts.

mod base;
mod body;
mod clips;
mod world;

pub use base::TnuaBase;
pub use body::{AvianBody, LocomotionBody};
pub use clips::{AnimationClips, ClimbClipLibrary, ClipAnimator};
pub use world::AvianWorldQuery;

use avian3d::prelude::*;
use bevy::prelude::*;
use bevy_tnua::{TnuaToggle, prelude::*};
use bevy_tnua_avian3d::TnuaAvian3dSensorShape;

use crate::locomotion::{
    self, ClipPlayer, Collaborators, LocomotionConfig, LocomotionStateMachine, MovementMode,
    TransitionRequests,
};

/// Movement the player asks for this frame, written by input systems.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct MovementIntent {
    /// World-space direction, at most unit length.
    pub direction: Vec3,
    /// Camera rotation followed while flying.
    pub facing: Option<Quat>,
}

/// Sent whenever a character's movement mode changes.
#[derive(Message, Debug, Clone, Copy)]
pub struct MovementModeChanged {
    pub entity: Entity,
    pub previous: MovementMode,
    pub current: MovementMode,
}

/// Everything a character needs for the locomotion controller to drive it.
/// Tnua's plugins must be added by the app.
pub fn climber(radius: f32, half_height: f32) -> impl Bundle {
    let body = LocomotionBody::new(radius, half_height);
    (
        LocomotionStateMachine::default(),
        TransitionRequests::default(),
        MovementIntent::default(),
        RigidBody::Dynamic,
        body.collider(),
        LockedAxes::ROTATION_LOCKED.unlock_rotation_y(),
        GravityScale(1.0),
        TnuaController::default(),
        TnuaToggle::Enabled,
        TnuaAvian3dSensorShape(Collider::cylinder(radius * 0.9, 0.0)),
        body,
    )
}

pub struct LocomotionPlugin;

impl Plugin for LocomotionPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(locomotion::plugin);
        app.register_type::<MovementIntent>();
        app.register_type::<LocomotionBody>();
        app.add_message::<MovementModeChanged>();
        app.add_systems(
            FixedUpdate,
            (run_locomotion, apply_mode_physics_settings).chain(),
        );
    }
}

fn run_locomotion(
    time: Res<Time>,
    config: Res<LocomotionConfig>,
    spatial: SpatialQuery,
    mut characters: Query<(
        Entity,
        &mut LocomotionStateMachine,
        &mut TransitionRequests,
        &MovementIntent,
        &mut Transform,
        &mut LinearVelocity,
        &mut LocomotionBody,
        &Collider,
        &mut TnuaController,
        &mut TnuaToggle,
        Option<&ClipAnimator>,
        Option<&ClimbClipLibrary>,
    )>,
    mut animators: Query<(&mut AnimationPlayer, &mut AnimationTransitions)>,
    mut mode_changes: MessageWriter<MovementModeChanged>,
) {
    let dt = time.delta_secs();

    for (
        entity,
        mut machine,
        mut requests,
        intent,
        transform,
        linear_velocity,
        mut state,
        collider,
        controller,
        toggle,
        animator,
        library,
    ) in &mut characters
    {
        let world = AvianWorldQuery::new(&spatial, entity);
        let mut base = TnuaBase {
            controller,
            toggle,
            world: &world,
            intent: intent.direction,
            walk: &config.walk,
            walkable_floor_y: config.detection.walkable_floor_y,
        };
        state.acceleration =
            intent.direction.clamp_length_max(1.0) * machine.max_acceleration(&config, &base);

        let mut body = AvianBody {
            transform,
            linear_velocity,
            state,
            collider,
            spatial: &spatial,
            filter: SpatialQueryFilter::from_excluded_entities([entity]),
        };

        let mut clips = match (animator, library) {
            (Some(animator), Some(library)) => animators
                .get_mut(animator.0)
                .ok()
                .map(|(player, transitions)| AnimationClips {
                    player,
                    transitions,
                    library,
                }),
            _ => None,
        };
        let completions = clips
            .as_ref()
            .map(|clips| clips.poll_completions(machine.gate()))
            .unwrap_or_default();

        {
            let mut io = Collaborators {
                world: &world,
                body: &mut body,
                clips: clips.as_mut().map(|clips| clips as &mut dyn ClipPlayer),
                base: &mut base,
            };
            for (clip, interrupted) in completions {
                machine.on_clip_completed(&clip, interrupted, &config, &mut io);
            }
            machine.tick(dt, &config, &mut requests, &mut io);
        }

        if body.state.use_controller_rotation {
            if let Some(facing) = intent.facing {
                body.turn_towards(facing, config.flight.rotate_speed * dt);
            }
        }

        for change in machine.drain_mode_changes() {
            mode_changes.write(MovementModeChanged {
                entity,
                previous: change.previous,
                current: change.current,
            });
        }
    }
}

/// Body kind and gravity for a mode. Controller-driven modes move a
/// kinematic body without gravity.
fn physics_settings(mode: MovementMode) -> (RigidBody, f32) {
    if mode.is_controller_driven() {
        (RigidBody::Kinematic, 0.0)
    } else {
        (RigidBody::Dynamic, 1.0)
    }
}

/// `RigidBody` is immutable, so a new kind is inserted and avian's hooks
/// rebuild the body.
fn apply_mode_physics_settings(
    mut commands: Commands,
    mut changes: MessageReader<MovementModeChanged>,
    mut bodies: Query<(&RigidBody, &mut GravityScale)>,
) {
    for change in changes.read() {
        let Ok((rigid_body, mut gravity)) = bodies.get_mut(change.entity) else {
            continue;
        };
        let (kind, scale) = physics_settings(change.current);
        gravity.0 = scale;
        if *rigid_body != kind {
            commands.entity(change.entity).insert(kind);
        }
    }
}
