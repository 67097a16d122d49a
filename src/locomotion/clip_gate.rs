use bevy::{platform::collections::HashMap, prelude::*};

use super::{collaborators::ClipPlayer, config::ClipId};

/// Outcome of asking the gate to start a clip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipStart {
    /// Playback began and the clip now governs the character.
    Started,
    /// The clip was already governing; nothing was replayed.
    AlreadyGoverning,
    /// Another clip governs; nothing was played.
    Busy(ClipId),
    /// The player is missing or the play request had no effect.
    Failed,
}

impl ClipStart {
    /// The clip governs after this call.
    pub fn is_governing(&self) -> bool {
        matches!(self, Self::Started | Self::AlreadyGoverning)
    }
}

/// Tracks which transition clip currently governs the character.
///
/// Keeps its own record of started clips because the player's `is_playing`
/// answer is unreliable around clip boundaries. At most one clip is marked
/// at a time, and a marked clip is never restarted until its completion
/// clears it.
#[derive(Debug, Default, Clone)]
pub struct ClipGate {
    marked: HashMap<ClipId, bool>,
}

impl ClipGate {
    pub fn start<P: ClipPlayer + ?Sized>(
        &mut self,
        player: Option<&mut P>,
        clip: &ClipId,
    ) -> ClipStart {
        if self.is_marked(clip) {
            return ClipStart::AlreadyGoverning;
        }
        if let Some(governing) = self.governing() {
            debug!("Clip {clip} not started, {governing} still governs");
            return ClipStart::Busy(governing.clone());
        }
        let Some(player) = player else {
            error!("Cannot play clip {clip}: no animation player");
            return ClipStart::Failed;
        };
        if !player.play(clip) {
            warn!("Playing clip {clip} had no effect");
            return ClipStart::Failed;
        }

        self.marked.insert(clip.clone(), true);
        debug!("Clip {clip} started");
        ClipStart::Started
    }

    /// Starts `clip` unless it already governs. `true` when it governs
    /// afterwards.
    pub fn try_play<P: ClipPlayer + ?Sized>(&mut self, player: Option<&mut P>, clip: &ClipId) -> bool {
        self.start(player, clip).is_governing()
    }

    /// Local record first, then the player's own answer.
    pub fn is_governing<P: ClipPlayer + ?Sized>(&self, clip: &ClipId, player: Option<&P>) -> bool {
        self.is_marked(clip) || player.is_some_and(|player| player.is_playing(clip))
    }

    pub fn is_marked(&self, clip: &ClipId) -> bool {
        self.marked.get(clip).copied().unwrap_or(false)
    }

    pub fn governing(&self) -> Option<&ClipId> {
        self.marked
            .iter()
            .find_map(|(clip, marked)| marked.then_some(clip))
    }

    pub fn any_governing(&self) -> bool {
        self.governing().is_some()
    }

    /// Clears the mark. Returns whether the clip was marked.
    pub fn on_completed(&mut self, clip: &ClipId, interrupted: bool) -> bool {
        let was_marked = self.marked.insert(clip.clone(), false).unwrap_or(false);
        if was_marked {
            debug!("Clip {clip} finished (interrupted: {interrupted})");
        }
        was_marked
    }

    pub fn clear(&mut self) {
        self.marked.clear();
    }
}
