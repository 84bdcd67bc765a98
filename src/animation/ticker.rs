use std::time::Instant;

use slotmap::{SlotMap, new_key_type};

use crate::animation::animation::Animation;
use crate::scene::SceneGraph;

new_key_type! {
    /// Handle of an animation owned by an [`AnimationTicker`].
    pub struct AnimationKey;
}

/// The explicit tick list: owns animations and advances the running ones
/// once per caller tick. One ticker per scene (or per whatever scope the
/// caller wants); there is no process-wide state.
#[derive(Debug, Default)]
pub struct AnimationTicker {
    animations: SlotMap<AnimationKey, Animation>,
    active: Vec<AnimationKey>,
}

impl AnimationTicker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, animation: Animation) -> AnimationKey {
        self.animations.insert(animation)
    }

    #[must_use]
    pub fn get(&self, key: AnimationKey) -> Option<&Animation> {
        self.animations.get(key)
    }

    pub fn get_mut(&mut self, key: AnimationKey) -> Option<&mut Animation> {
        self.animations.get_mut(key)
    }

    /// Starts an animation and registers it with the tick list.
    /// Idempotent while the animation is already running.
    pub fn play(&mut self, key: AnimationKey) {
        self.play_at(key, Instant::now());
    }

    pub fn play_at(&mut self, key: AnimationKey, now: Instant) {
        let Some(animation) = self.animations.get_mut(key) else {
            return;
        };
        if animation.is_running() {
            return;
        }
        animation.play_at(now);
        if !self.active.contains(&key) {
            self.active.push(key);
        }
    }

    /// Stops an animation and deregisters it from the tick list.
    pub fn stop(&mut self, key: AnimationKey) {
        if let Some(animation) = self.animations.get_mut(key) {
            animation.stop();
        }
        self.active.retain(|&k| k != key);
    }

    /// Advances every running animation to the current instant.
    pub fn update(&mut self, graph: &mut SceneGraph) {
        self.update_at(Instant::now(), graph);
    }

    /// Advances every running animation to `now`. The active list is
    /// snapshotted before iterating and removals are applied afterwards,
    /// so animations may finish (or be stopped) during the tick.
    pub fn update_at(&mut self, now: Instant, graph: &mut SceneGraph) {
        let active: Vec<AnimationKey> = self.active.clone();
        let mut finished = Vec::new();

        for key in active {
            match self.animations.get_mut(key) {
                Some(animation) => {
                    if !animation.update_at(now, graph) {
                        finished.push(key);
                    }
                }
                None => finished.push(key),
            }
        }

        if !finished.is_empty() {
            self.active.retain(|key| !finished.contains(key));
        }
    }

    /// Number of animations currently registered with the tick list.
    #[must_use]
    pub fn running_count(&self) -> usize {
        self.active.len()
    }
}
