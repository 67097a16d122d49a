use bevy::prelude::*;

use super::{
    clip_gate::ClipGate,
    climb_physics::ClimbPhysics,
    collaborators::{BaseSimulator, Collaborators},
    config::{ClipId, LocomotionConfig},
    flight_physics::FlightPhysics,
    handler::{BaseLocomotion, ModeContext, ModeHandler},
    mode::{ModeChange, ModeStep, MovementMode},
    requests::TransitionRequests,
    surface_detector::SurfaceDetector,
};

#[derive(Debug, Default, Clone)]
struct Handlers {
    climb: ClimbPhysics,
    flight: FlightPhysics,
    base: BaseLocomotion,
}

impl Handlers {
    fn get(&mut self, mode: MovementMode) -> &mut dyn ModeHandler {
        match mode {
            MovementMode::Climbing => &mut self.climb,
            MovementMode::Flying => &mut self.flight,
            MovementMode::Grounded | MovementMode::Falling => &mut self.base,
        }
    }
}

/// Owns the movement mode of one character and everything that changes it.
///
/// Each tick consumes pending requests in a fixed order (flight toggle,
/// climb start, climb leave, climb dash), applies a pending flight toggle,
/// then runs the active mode's physics. Clip completions arrive separately
/// through [`Self::on_clip_completed`] before the tick that observes them.
#[derive(Component, Debug, Default, Clone)]
pub struct LocomotionStateMachine {
    mode: MovementMode,
    handlers: Handlers,
    gate: ClipGate,
    gating_disabled: bool,
    changes: Vec<ModeChange>,
}

impl LocomotionStateMachine {
    pub fn mode(&self) -> MovementMode {
        self.mode
    }

    pub fn is_climbing(&self) -> bool {
        self.mode == MovementMode::Climbing
    }

    pub fn is_flying(&self) -> bool {
        self.mode == MovementMode::Flying
    }

    /// Mean normal of the surface being climbed, zero when there is none.
    pub fn climb_surface_normal(&self) -> Vec3 {
        self.handlers.climb.aggregate().normal
    }

    pub fn climb(&self) -> &ClimbPhysics {
        &self.handlers.climb
    }

    pub fn gate(&self) -> &ClipGate {
        &self.gate
    }

    /// `true` once a climb started without any animation player.
    pub fn gating_disabled(&self) -> bool {
        self.gating_disabled
    }

    pub fn max_speed(&self, config: &LocomotionConfig, base: &dyn BaseSimulator) -> f32 {
        match self.mode {
            MovementMode::Climbing => config.climbing.max_speed,
            MovementMode::Flying => config.flight.max_speed,
            MovementMode::Grounded | MovementMode::Falling => base.max_speed(),
        }
    }

    pub fn max_acceleration(&self, config: &LocomotionConfig, base: &dyn BaseSimulator) -> f32 {
        match self.mode {
            MovementMode::Climbing => config.climbing.max_acceleration,
            MovementMode::Flying => config.flight.max_acceleration,
            MovementMode::Grounded | MovementMode::Falling => base.max_acceleration(),
        }
    }

    /// Transitions applied since the last drain, oldest first.
    pub fn drain_mode_changes(&mut self) -> Vec<ModeChange> {
        std::mem::take(&mut self.changes)
    }

    pub fn tick(
        &mut self,
        dt: f32,
        config: &LocomotionConfig,
        requests: &mut TransitionRequests,
        io: &mut Collaborators<'_>,
    ) {
        if requests.to_fly.take().is_some() {
            if self.is_climbing() {
                debug!("Flight toggle ignored while climbing");
            } else {
                self.handlers.flight.toggle();
            }
        }

        if requests.to_climb.take().is_some() {
            self.start_climb(config, io);
        }

        if requests.leave_climb.take().is_some() {
            self.leave_climb(config, io);
        }

        if requests.climb_dash.take().is_some() {
            if self.is_climbing() {
                self.handlers
                    .climb
                    .dash(&mut *io.body, config.climbing.dash_impulse);
            } else {
                debug!("Climb dash ignored in {:?}", self.mode);
            }
        }

        if self.handlers.flight.is_pending() && !self.is_flying() {
            self.transition(MovementMode::Flying, config, io);
        }

        match self.step(dt, config, io) {
            ModeStep::Stay => {}
            ModeStep::Switch(next) => self.transition(next, config, io),
            ModeStep::SwitchAndRestep(next) => {
                self.transition(next, config, io);
                match self.step(dt, config, io) {
                    ModeStep::Stay => {}
                    ModeStep::Switch(next) | ModeStep::SwitchAndRestep(next) => {
                        self.transition(next, config, io)
                    }
                }
            }
        }
    }

    /// Delivery of a finished or blended-out clip. Clears the clip's
    /// governing flag and, while climbing, applies the transition it gates.
    pub fn on_clip_completed(
        &mut self,
        clip: &ClipId,
        interrupted: bool,
        config: &LocomotionConfig,
        io: &mut Collaborators<'_>,
    ) {
        self.gate.on_completed(clip, interrupted);
        if !self.is_climbing() {
            return;
        }

        let clips = &config.clips;
        let next = if clips.ledge_climb.as_ref() == Some(clip) {
            if interrupted {
                warn!("Mantle interrupted, falling");
                MovementMode::Falling
            } else {
                MovementMode::Grounded
            }
        } else if clips.to_ground.as_ref() == Some(clip) {
            MovementMode::Grounded
        } else if clips.to_fall.as_ref() == Some(clip) {
            MovementMode::Falling
        } else {
            return;
        };
        self.transition(next, config, io);
    }

    fn start_climb(&mut self, config: &LocomotionConfig, io: &mut Collaborators<'_>) {
        if !matches!(self.mode, MovementMode::Grounded | MovementMode::Falling) {
            debug!("Climb request ignored in {:?}", self.mode);
            return;
        }

        if io.clips.is_none() && !self.gating_disabled {
            error!("No animation player for climbing clips, clip gating disabled");
            self.gating_disabled = true;
        }

        let detector = SurfaceDetector::new(&config.detection);
        let wall_ahead = detector.probe_forward_wall(io.world, &*io.body)
            && detector.probe_eye_height_wall(io.world, &*io.body);
        if !wall_ahead {
            debug!("Climb request ignored, no climbable wall ahead");
            return;
        }
        if !self.gating_disabled {
            if let Some(governing) = self.gate.governing() {
                debug!("Climb request ignored while {governing} governs");
                return;
            }
        }

        if self.handlers.flight.is_pending() {
            debug!("Pending flight toggle dropped by climb start");
            self.handlers.flight.cancel();
        }
        self.transition(MovementMode::Climbing, config, io);
    }

    fn leave_climb(&mut self, config: &LocomotionConfig, io: &mut Collaborators<'_>) {
        if !self.is_climbing() {
            debug!("Leave climb request ignored in {:?}", self.mode);
            return;
        }
        if let Some(governing) = self.gate.governing() {
            debug!("Leave climb request ignored while {governing} governs");
            return;
        }

        let mut cx = ModeContext {
            io: &mut *io,
            gate: &mut self.gate,
            config,
            gating_disabled: self.gating_disabled,
        };
        if let ModeStep::Switch(next) = cx.exit_via(config.clips.to_fall.as_ref(), MovementMode::Falling)
        {
            self.transition(next, config, io);
        }
    }

    fn step(&mut self, dt: f32, config: &LocomotionConfig, io: &mut Collaborators<'_>) -> ModeStep {
        let mode = self.mode;
        let mut cx = ModeContext {
            io,
            gate: &mut self.gate,
            config,
            gating_disabled: self.gating_disabled,
        };
        self.handlers.get(mode).on_tick(mode, dt, &mut cx)
    }

    fn transition(&mut self, next: MovementMode, config: &LocomotionConfig, io: &mut Collaborators<'_>) {
        let previous = self.mode;
        if previous == next {
            return;
        }

        let mut cx = ModeContext {
            io: &mut *io,
            gate: &mut self.gate,
            config,
            gating_disabled: self.gating_disabled,
        };
        self.handlers.get(previous).on_exit(next, &mut cx);

        match (previous.is_controller_driven(), next.is_controller_driven()) {
            (false, true) => {
                io.base.suspend();
                io.body.set_controller_driven(true);
            }
            (true, false) => {
                io.base.resume();
                io.body.set_controller_driven(false);
            }
            _ => {}
        }

        self.mode = next;
        let mut cx = ModeContext {
            io: &mut *io,
            gate: &mut self.gate,
            config,
            gating_disabled: self.gating_disabled,
        };
        self.handlers.get(next).on_enter(previous, &mut cx);

        self.changes.push(ModeChange {
            previous,
            current: next,
        });
        info!("Movement mode {previous:?} -> {next:?}");
    }
}
