use bevy::prelude::*;

use super::{
    clip_gate::{ClipGate, ClipStart},
    collaborators::Collaborators,
    config::{ClipId, LocomotionConfig},
    mode::{MovementMode, ModeStep},
};

/// Borrowed state a mode handler works with during one call.
pub struct ModeContext<'c, 'a> {
    pub io: &'c mut Collaborators<'a>,
    pub gate: &'c mut ClipGate,
    pub config: &'c LocomotionConfig,
    /// Set once no animation player was available at climb start.
    pub gating_disabled: bool,
}

impl ModeContext<'_, '_> {
    /// Starts a configured clip through the gate. An unconfigured clip, or
    /// any clip once gating is disabled, reports `Failed`.
    pub fn start_clip(&mut self, clip: Option<&ClipId>) -> ClipStart {
        let Some(clip) = clip else {
            return ClipStart::Failed;
        };
        if self.gating_disabled {
            return ClipStart::Failed;
        }
        self.gate.start(self.io.clips.as_deref_mut(), clip)
    }

    pub fn clip_governing(&self, clip: Option<&ClipId>) -> bool {
        clip.is_some_and(|clip| self.gate.is_governing(clip, self.io.clips.as_deref()))
    }

    /// Plays the transition clip, or switches to `fallback` right away when
    /// it cannot start. A clip already governing keeps the current mode
    /// until its completion arrives.
    pub fn exit_via(&mut self, clip: Option<&ClipId>, fallback: MovementMode) -> ModeStep {
        match self.start_clip(clip) {
            ClipStart::Failed => {
                warn!("No transition clip to play, switching to {fallback:?} directly");
                ModeStep::Switch(fallback)
            }
            ClipStart::Started | ClipStart::AlreadyGoverning | ClipStart::Busy(_) => ModeStep::Stay,
        }
    }
}

/// Physics and side effects of one movement mode.
pub trait ModeHandler {
    fn on_enter(&mut self, previous: MovementMode, cx: &mut ModeContext);

    fn on_exit(&mut self, next: MovementMode, cx: &mut ModeContext);

    /// One physics step in `mode`.
    fn on_tick(&mut self, mode: MovementMode, dt: f32, cx: &mut ModeContext) -> ModeStep;
}

/// Grounded and Falling: delegates to the base simulator and reports the
/// mode it settled on.
#[derive(Debug, Default, Clone)]
pub struct BaseLocomotion;

impl ModeHandler for BaseLocomotion {
    fn on_enter(&mut self, _previous: MovementMode, _cx: &mut ModeContext) {}

    fn on_exit(&mut self, _next: MovementMode, _cx: &mut ModeContext) {}

    fn on_tick(&mut self, mode: MovementMode, dt: f32, cx: &mut ModeContext) -> ModeStep {
        let settled = cx.io.base.step(mode, &mut *cx.io.body, dt);
        if settled.is_controller_driven() {
            warn!("Base simulator reported {settled:?}, staying in {mode:?}");
            return ModeStep::Stay;
        }
        if settled == mode {
            ModeStep::Stay
        } else {
            ModeStep::Switch(settled)
        }
    }
}
