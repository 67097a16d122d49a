use std::borrow::Cow;

use bevy::{
    asset::{AssetLoader, LoadContext},
    prelude::*,
};
use serde::{Deserialize, Serialize};

/// Opaque identifier of a locomotion clip.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClipId(pub Cow<'static, str>);

impl ClipId {
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for ClipId {
    fn from(name: &'static str) -> Self {
        Self::from_static(name)
    }
}

impl From<String> for ClipId {
    fn from(name: String) -> Self {
        Self(Cow::Owned(name))
    }
}

impl std::fmt::Display for ClipId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Clips used for staged climbing transitions. A `None` entry makes every
/// transition that needs it take its immediate fallback.
#[derive(Reflect, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClimbClips {
    /// Entry when grabbing the wall from the air.
    pub air_grab: Option<ClipId>,
    /// Entry when grabbing the wall from the ground.
    pub ground_grab: Option<ClipId>,
    /// Mantle over a ledge; its completion lands the character on the ledge.
    pub ledge_climb: Option<ClipId>,
    /// Climbing down onto a floor.
    pub to_ground: Option<ClipId>,
    /// Letting go of the wall.
    pub to_fall: Option<ClipId>,
}

impl ClimbClips {
    pub const AIR_GRAB: ClipId = ClipId::from_static("AirGrab");
    pub const GROUND_GRAB: ClipId = ClipId::from_static("GroundGrab");
    pub const LEDGE_CLIMB: ClipId = ClipId::from_static("LedgeClimb");
    pub const TO_GROUND: ClipId = ClipId::from_static("ToGround");
    pub const TO_FALL: ClipId = ClipId::from_static("ToFall");

    /// Full staged set: grab entries, mantle, to-ground and to-fall.
    pub fn staged() -> Self {
        Self {
            air_grab: Some(Self::AIR_GRAB),
            ground_grab: Some(Self::GROUND_GRAB),
            ledge_climb: Some(Self::LEDGE_CLIMB),
            to_ground: Some(Self::TO_GROUND),
            to_fall: Some(Self::TO_FALL),
        }
    }

    /// Reduced set with only the mantle clip; other exits switch modes
    /// directly.
    pub fn mantle_only() -> Self {
        Self {
            air_grab: None,
            ground_grab: None,
            ledge_climb: Some(Self::LEDGE_CLIMB),
            to_ground: None,
            to_fall: None,
        }
    }
}

impl Default for ClimbClips {
    fn default() -> Self {
        Self::staged()
    }
}

/// Geometry probe parameters, in meters.
#[derive(Reflect, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Added to the capsule radius to get the forward wall ray length.
    pub wall_probe_margin: f32,
    /// Angle of each forward wall ray away from the forward axis.
    pub wall_probe_half_angle_degrees: f32,
    /// Minimum forward alignment of the velocity to start climbing.
    pub wall_velocity_threshold: f32,
    /// Minimum forward alignment of the acceleration to start climbing.
    pub wall_acceleration_threshold: f32,
    /// Added to the capsule half height for the floor ray.
    pub floor_trace_offset: f32,
    /// Minimum up component of a standable floor normal.
    pub walkable_floor_y: f32,
    pub eye_height: f32,
    pub eye_sphere_radius: f32,
    pub eye_trace_distance: f32,
    /// Forward distance of the climbable surface capsule sweep.
    pub surface_sweep_offset: f32,
    /// Climbable range of `up · surface normal`, exclusive on both ends.
    pub min_slope: f32,
    pub max_slope: f32,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            wall_probe_margin: 0.1,
            wall_probe_half_angle_degrees: 25.0,
            wall_velocity_threshold: 0.0,
            wall_acceleration_threshold: 0.8,
            floor_trace_offset: 0.2,
            walkable_floor_y: 0.71,
            eye_height: 1.0,
            eye_sphere_radius: 0.3,
            eye_trace_distance: 0.75,
            surface_sweep_offset: 0.1,
            min_slope: -0.6,
            max_slope: 0.6,
        }
    }
}

#[derive(Reflect, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClimbingConfig {
    /// Distance kept between the character origin and the climbed surface.
    pub standoff_distance: f32,
    pub max_speed: f32,
    pub max_acceleration: f32,
    pub braking_deceleration: f32,
    /// Orientation interpolation rate toward the surface, per second.
    pub rotate_speed: f32,
    pub dash_impulse: f32,
    /// Ticks shorter than this are skipped.
    pub min_tick_time: f32,
}

impl Default for ClimbingConfig {
    fn default() -> Self {
        Self {
            standoff_distance: 0.45,
            max_speed: 1.2,
            max_acceleration: 3.8,
            braking_deceleration: 5.5,
            rotate_speed: 5.0,
            dash_impulse: 2.5,
            min_tick_time: 1.0e-6,
        }
    }
}

#[derive(Reflect, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlightConfig {
    pub max_speed: f32,
    pub max_acceleration: f32,
    pub braking_deceleration: f32,
    /// How fast the body turns toward the camera while flying.
    pub rotate_speed: f32,
}

impl Default for FlightConfig {
    fn default() -> Self {
        Self {
            max_speed: 6.0,
            max_acceleration: 20.0,
            braking_deceleration: 12.0,
            rotate_speed: 10.0,
        }
    }
}

/// Parameters handed to the grounded/falling base simulator.
#[derive(Reflect, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkConfig {
    pub walk_speed: f32,
    pub max_acceleration: f32,
    /// Must be greater than the distance from the character's center to the
    /// bottom of its collider.
    pub float_height: f32,
    pub turning_angvel: f32,
    /// Length of the downward ray that decides Grounded vs Falling.
    pub ground_probe_distance: f32,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            walk_speed: 4.0,
            max_acceleration: 20.0,
            float_height: 1.0,
            turning_angvel: 12.0,
            ground_probe_distance: 1.3,
        }
    }
}

/// Locomotion controller configuration loaded from RON file
#[derive(Asset, Resource, Reflect, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocomotionConfig {
    pub detection: DetectionConfig,
    pub climbing: ClimbingConfig,
    pub flight: FlightConfig,
    pub walk: WalkConfig,
    pub clips: ClimbClips,
}

impl LocomotionConfig {
    /// Path to the locomotion configuration file
    pub const PATH: &'static str = "config/climber.locomotion.ron";

    pub fn from_ron_str(source: &str) -> Result<Self, ron::error::SpannedError> {
        ron::de::from_str(source)
    }
}

/// Handle keeping the configuration asset alive for hot reloading.
#[derive(Resource)]
pub struct LocomotionConfigHandle(pub Handle<LocomotionConfig>);

/// Asset loader for LocomotionConfig RON files
#[derive(Default)]
pub struct LocomotionConfigLoader;

impl AssetLoader for LocomotionConfigLoader {
    type Asset = LocomotionConfig;
    type Settings = ();
    type Error = anyhow::Error;

    async fn load(
        &self,
        reader: &mut dyn bevy::asset::io::Reader,
        _settings: &Self::Settings,
        _load_context: &mut LoadContext<'_>,
    ) -> Result<Self::Asset, Self::Error> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes).await?;
        let config: LocomotionConfig = ron::de::from_bytes(&bytes)?;
        Ok(config)
    }

    fn extensions(&self) -> &[&str] {
        &["locomotion.ron"]
    }
}

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<LocomotionConfig>();
    app.init_asset::<LocomotionConfig>();
    app.init_asset_loader::<LocomotionConfigLoader>();
    app.add_systems(Startup, load_config);
    app.add_systems(Update, apply_loaded_config);
}

fn load_config(mut commands: Commands, asset_server: Res<AssetServer>) {
    let handle = asset_server.load(LocomotionConfig::PATH);
    commands.insert_resource(LocomotionConfigHandle(handle));
}

/// Copies the loaded (or hot-reloaded) asset into the live resource.
fn apply_loaded_config(
    mut events: MessageReader<AssetEvent<LocomotionConfig>>,
    handle: Option<Res<LocomotionConfigHandle>>,
    assets: Res<Assets<LocomotionConfig>>,
    mut config: ResMut<LocomotionConfig>,
) {
    let Some(handle) = handle else {
        return;
    };

    for event in events.read() {
        if event.is_loaded_with_dependencies(&handle.0) || event.is_modified(&handle.0) {
            if let Some(loaded) = assets.get(&handle.0) {
                *config = loaded.clone();
                info!("Locomotion config applied from {}", LocomotionConfig::PATH);
            }
        }
    }
}
