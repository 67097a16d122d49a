use bevy::prelude::*;

/// Movement mode of a controlled character. Exactly one is active at a time.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum MovementMode {
    /// Standing or walking on a walkable floor (base simulator).
    #[default]
    Grounded,
    /// Airborne under gravity (base simulator).
    Falling,
    /// Attached to a climbable surface.
    Climbing,
    /// Free flight, toggled on and off by request.
    Flying,
}

impl MovementMode {
    pub const ALL: [MovementMode; 4] = [
        MovementMode::Grounded,
        MovementMode::Falling,
        MovementMode::Climbing,
        MovementMode::Flying,
    ];

    /// Climbing and Flying integrate their own motion; the base simulator is
    /// suspended while they are active.
    pub fn is_controller_driven(self) -> bool {
        matches!(self, MovementMode::Climbing | MovementMode::Flying)
    }
}

/// A transition the state machine applied, in order of application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeChange {
    pub previous: MovementMode,
    pub current: MovementMode,
}

/// What a mode handler wants after running its tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeStep {
    /// Keep the current mode.
    Stay,
    /// Switch to another mode; physics resumes next tick.
    Switch(MovementMode),
    /// Switch and run the new mode's step within the same tick.
    SwitchAndRestep(MovementMode),
}
