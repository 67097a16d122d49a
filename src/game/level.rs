//! A small course with a tall wall, a ledge to mantle and a slanted face.

use avian3d::prelude::*;
use bevy::prelude::*;

use super::player::SpawnPlayer;

pub(super) fn plugin(app: &mut App) {
    app.add_systems(Startup, (spawn_course, spawn_level).chain());
}

fn spawn_level(world: &mut World) {
    SpawnPlayer {
        position: Vec3::new(0.0, 2.0, 6.0),
    }
    .apply(world);
}

fn spawn_course(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    info!("Spawning climbing course...");

    let floor_material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.3, 0.5, 0.3),
        perceptual_roughness: 0.9,
        ..default()
    });
    let wall_material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.7, 0.3, 0.3),
        ..default()
    });
    let ledge_material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.3, 0.3, 0.7),
        ..default()
    });

    commands.spawn((
        Name::new("Sun"),
        DirectionalLight {
            illuminance: 8_000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(8.0, 16.0, 8.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    spawn_block(
        &mut commands,
        &mut meshes,
        "Ground Floor",
        floor_material,
        Vec3::new(0.0, -0.25, 0.0),
        Vec3::new(60.0, 0.5, 60.0),
        Quat::IDENTITY,
    );

    // Tall enough that only climbing reaches the top.
    spawn_block(
        &mut commands,
        &mut meshes,
        "Climb Wall (8m)",
        wall_material.clone(),
        Vec3::new(0.0, 4.0, -2.0),
        Vec3::new(8.0, 8.0, 1.0),
        Quat::IDENTITY,
    );

    // Short wall topped by a walkable platform to mantle onto.
    spawn_block(
        &mut commands,
        &mut meshes,
        "Ledge Wall (3m)",
        ledge_material,
        Vec3::new(10.0, 1.5, -4.0),
        Vec3::new(6.0, 3.0, 6.0),
        Quat::IDENTITY,
    );

    spawn_block(
        &mut commands,
        &mut meshes,
        "Slanted Wall",
        wall_material,
        Vec3::new(-10.0, 3.0, -2.0),
        Vec3::new(6.0, 7.0, 1.0),
        Quat::from_rotation_x(-20f32.to_radians()),
    );
}

fn spawn_block(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    label: &str,
    material: Handle<StandardMaterial>,
    position: Vec3,
    size: Vec3,
    rotation: Quat,
) {
    commands.spawn((
        Name::new(label.to_string()),
        Mesh3d(meshes.add(Cuboid::new(size.x, size.y, size.z))),
        MeshMaterial3d(material),
        Transform::from_translation(position).with_rotation(rotation),
        RigidBody::Static,
        Collider::cuboid(size.x, size.y, size.z),
    ));
    debug!("Spawned {label} at {position}");
}
