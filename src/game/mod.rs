//! Demo course for the locomotion controller.
//!
//! WASD moves, E grabs or lets go of a wall, Space dashes while climbing, F
//! toggles flight. Hold the right mouse button to orbit the camera.

mod camera;
mod hud;
mod level;
pub mod player;

use avian3d::prelude::*;
use bevy::prelude::*;
use bevy_tnua::prelude::*;
use bevy_tnua_avian3d::*;
use climb_locomotion::prelude::*;

pub(super) fn plugin(app: &mut App) {
    app.add_plugins((
        PhysicsPlugins::default(),
        TnuaControllerPlugin::new(FixedUpdate),
        TnuaAvian3dPlugin::new(FixedUpdate),
        LocomotionPlugin,
    ));
    app.add_plugins((level::plugin, player::plugin, camera::plugin, hud::plugin));
}
