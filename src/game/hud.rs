use bevy::prelude::*;
use climb_locomotion::prelude::*;

use crate::AppSystems;

#[derive(Component)]
struct ModeLabel;

pub(super) fn plugin(app: &mut App) {
    app.add_systems(Startup, spawn_hud);
    app.add_systems(Update, show_mode.in_set(AppSystems::Update));
}

fn spawn_hud(mut commands: Commands) {
    commands.spawn((
        Name::new("Hud"),
        Node {
            position_type: PositionType::Absolute,
            top: px(12),
            left: px(12),
            flex_direction: FlexDirection::Column,
            ..default()
        },
        children![
            (
                ModeLabel,
                Text::new(format!("Mode: {:?}", MovementMode::default())),
                TextFont::from_font_size(22.0),
                TextColor(Color::WHITE),
            ),
            (
                Text::new("WASD move  E climb/let go  Space dash  F fly  RMB orbit"),
                TextFont::from_font_size(14.0),
                TextColor(Color::srgb(0.8, 0.8, 0.8)),
            ),
        ],
    ));
}

fn show_mode(
    mut changes: MessageReader<MovementModeChanged>,
    mut labels: Query<&mut Text, With<ModeLabel>>,
) {
    let Some(change) = changes.read().last() else {
        return;
    };
    for mut text in &mut labels {
        text.0 = format!("Mode: {:?}", change.current);
    }
}
