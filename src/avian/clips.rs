use std::time::Duration;

use bevy::{animation::ActiveAnimation, platform::collections::HashMap, prelude::*};

use crate::locomotion::{ClipGate, ClipId, ClipPlayer};

/// Graph nodes for the locomotion clips a character can play.
#[derive(Component, Debug, Clone)]
pub struct ClimbClipLibrary {
    pub nodes: HashMap<ClipId, AnimationNodeIndex>,
    /// Cross-fade applied when a clip takes over.
    pub blend: Duration,
}

impl ClimbClipLibrary {
    pub fn new(blend: Duration) -> Self {
        Self {
            nodes: HashMap::default(),
            blend,
        }
    }

    pub fn with_clip(mut self, clip: ClipId, node: AnimationNodeIndex) -> Self {
        self.nodes.insert(clip, node);
        self
    }
}

/// Points from a character to the entity holding its [`AnimationPlayer`].
#[derive(Component, Debug, Clone, Copy)]
pub struct ClipAnimator(pub Entity);

/// An animation player and its transitions seen as a [`ClipPlayer`].
pub struct AnimationClips<'a> {
    pub player: Mut<'a, AnimationPlayer>,
    pub transitions: Mut<'a, AnimationTransitions>,
    pub library: &'a ClimbClipLibrary,
}

impl AnimationClips<'_> {
    /// Completions for the clip currently governing `gate`, as
    /// `(clip, interrupted)`.
    pub fn poll_completions(&self, gate: &ClipGate) -> Vec<(ClipId, bool)> {
        gate.governing()
            .into_iter()
            .filter_map(|clip| {
                let node = self.library.nodes.get(clip)?;
                completion(self.player.animation(*node)).map(|interrupted| (clip.clone(), interrupted))
            })
            .collect()
    }
}

/// `Some(false)` once a clip ran to its end, `Some(true)` once it left the
/// player without finishing.
fn completion(active: Option<&ActiveAnimation>) -> Option<bool> {
    match active {
        Some(active) if active.is_finished() => Some(false),
        Some(_) => None,
        None => Some(true),
    }
}

impl ClipPlayer for AnimationClips<'_> {
    fn play(&mut self, clip: &ClipId) -> bool {
        let Some(&node) = self.library.nodes.get(clip) else {
            return false;
        };
        let blend = self.library.blend;
        self.transitions.play(&mut self.player, node, blend);
        true
    }

    fn is_playing(&self, clip: &ClipId) -> bool {
        self.library.nodes.get(clip).is_some_and(|node| {
            self.player
                .animation(*node)
                .is_some_and(|active| !active.is_finished())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locomotion::ClimbClips;

    fn library() -> ClimbClipLibrary {
        ClimbClipLibrary::new(Duration::ZERO)
            .with_clip(ClimbClips::TO_FALL, AnimationNodeIndex::new(1))
    }

    #[test]
    fn unknown_clips_do_not_play() {
        let library = library();
        let mut world = World::new();
        world.spawn((AnimationPlayer::default(), AnimationTransitions::new()));
        let mut query = world.query::<(&mut AnimationPlayer, &mut AnimationTransitions)>();
        let (player, transitions) = query.single_mut(&mut world).unwrap();
        let mut clips = AnimationClips {
            player,
            transitions,
            library: &library,
        };

        assert!(!clips.play(&ClimbClips::LEDGE_CLIMB));
        assert!(clips.play(&ClimbClips::TO_FALL));
        assert!(clips.is_playing(&ClimbClips::TO_FALL));
    }

    #[test]
    fn a_clip_that_left_the_player_counts_as_interrupted() {
        assert_eq!(completion(None), Some(true));
    }
}
