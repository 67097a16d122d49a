use bevy::prelude::*;

use super::{
    collaborators::OrientationControl,
    handler::{ModeContext, ModeHandler},
    kinematics::{integrate_velocity, move_and_slide},
    mode::{MovementMode, ModeStep},
};

/// Toggle-driven free flight without gravity.
#[derive(Debug, Default, Clone)]
pub struct FlightPhysics {
    /// Flipped by each flight toggle request.
    pending: bool,
    saved_orientation: Option<OrientationControl>,
}

impl FlightPhysics {
    pub fn toggle(&mut self) {
        self.pending = !self.pending;
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn cancel(&mut self) {
        self.pending = false;
    }
}

impl ModeHandler for FlightPhysics {
    fn on_enter(&mut self, _previous: MovementMode, cx: &mut ModeContext) {
        let body = &mut *cx.io.body;
        self.saved_orientation = Some(body.orientation_control());
        body.set_orientation_control(OrientationControl {
            orient_to_movement: false,
            use_controller_rotation: true,
        });
    }

    fn on_exit(&mut self, _next: MovementMode, cx: &mut ModeContext) {
        self.pending = false;
        if let Some(saved) = self.saved_orientation.take() {
            cx.io.body.set_orientation_control(saved);
        }
    }

    fn on_tick(&mut self, _mode: MovementMode, dt: f32, cx: &mut ModeContext) -> ModeStep {
        if !self.pending {
            return ModeStep::SwitchAndRestep(MovementMode::Falling);
        }

        let flight = &cx.config.flight;
        let body = &mut *cx.io.body;
        let acceleration = body.acceleration().clamp_length_max(flight.max_acceleration);
        let velocity = integrate_velocity(
            body.velocity(),
            acceleration,
            flight.max_speed,
            flight.braking_deceleration,
            dt,
        );
        body.set_velocity(velocity);

        let rotation = body.rotation();
        let start = body.position();
        move_and_slide(body, velocity * dt, rotation, dt);
        if dt > 0.0 {
            body.set_velocity((body.position() - start) / dt);
        }

        ModeStep::Stay
    }
}
