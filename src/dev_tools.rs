//! Development tools for the demo. This plugin is only enabled in dev builds.

use avian3d::prelude::{PhysicsDebugPlugin, PhysicsGizmos};
use bevy::{input::common_conditions::input_just_pressed, prelude::*};
use climb_locomotion::prelude::*;

const PHYSICS_DEBUG_KEY: KeyCode = KeyCode::F3;

pub(super) fn plugin(app: &mut App) {
    app.add_plugins(PhysicsDebugPlugin::default());
    app.add_systems(
        Update,
        (
            log_mode_changes,
            draw_climb_surface,
            toggle_physics_debug.run_if(input_just_pressed(PHYSICS_DEBUG_KEY)),
        ),
    );
}

fn toggle_physics_debug(mut store: ResMut<GizmoConfigStore>) {
    let (config, _) = store.config_mut::<PhysicsGizmos>();
    config.enabled = !config.enabled;
    info!(
        "Physics debug rendering: {}",
        if config.enabled { "ON" } else { "OFF" }
    );
}

fn log_mode_changes(mut changes: MessageReader<MovementModeChanged>) {
    for change in changes.read() {
        debug!(
            "{}: {:?} -> {:?}",
            change.entity, change.previous, change.current
        );
    }
}

/// Surface normal and contact point while climbing.
fn draw_climb_surface(
    characters: Query<(&Transform, &LocomotionStateMachine)>,
    mut gizmos: Gizmos,
) {
    for (transform, machine) in &characters {
        if !machine.is_climbing() {
            continue;
        }
        let surface = machine.climb().aggregate();
        if !surface.has_normal() {
            continue;
        }
        gizmos.sphere(
            Isometry3d::from_translation(surface.position),
            0.05,
            Color::srgb(1.0, 0.8, 0.2),
        );
        gizmos.arrow(
            surface.position,
            surface.position + surface.normal,
            Color::srgb(0.2, 0.9, 0.3),
        );
        gizmos.line(transform.translation, surface.position, Color::WHITE);
    }
}
