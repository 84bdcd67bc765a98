use std::time::Instant;

use crate::animation::channel::Channel;
use crate::scene::SceneGraph;

/// A set of keyframe channels with explicit running state.
///
/// `duration` is the longest channel duration. A non-looping animation
/// that has played through one full cycle samples exactly at the end,
/// stops, and reports itself finished; a looping animation wraps its
/// sample time modulo the duration and keeps running.
#[derive(Debug, Clone)]
pub struct Animation {
    pub name: String,
    pub looping: bool,

    channels: Vec<Channel>,
    duration: f32,
    running: bool,
    started_at: Option<Instant>,
}

impl Animation {
    #[must_use]
    pub fn new(name: &str, channels: Vec<Channel>) -> Self {
        let duration = channels
            .iter()
            .map(Channel::duration)
            .fold(0.0_f32, f32::max);
        Self {
            name: name.to_string(),
            looping: false,
            channels,
            duration,
            running: false,
            started_at: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn duration(&self) -> f32 {
        self.duration
    }

    #[inline]
    #[must_use]
    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    #[inline]
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Starts playback, recording `now` as the start instant. Idempotent
    /// while already running.
    pub fn play_at(&mut self, now: Instant) {
        if self.running {
            return;
        }
        self.started_at = Some(now);
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
        self.started_at = None;
    }

    /// Advances playback to `now`, sampling every channel into `graph`.
    /// Returns false once the animation has stopped (a non-looping
    /// animation past its end, or one that was never started).
    pub fn update_at(&mut self, now: Instant, graph: &mut SceneGraph) -> bool {
        if !self.running {
            return false;
        }
        let Some(started) = self.started_at else {
            return false;
        };
        if self.duration <= 0.0 {
            self.stop();
            return false;
        }

        let elapsed = now.duration_since(started).as_secs_f32();
        let t = elapsed % self.duration;
        let cycles = (elapsed / self.duration).floor();

        if cycles >= 1.0 && !self.looping {
            // Terminal transition: clamp to the end, then stop.
            for channel in &self.channels {
                channel.apply_at(self.duration, graph);
            }
            self.stop();
            return false;
        }

        for channel in &self.channels {
            channel.apply_at(t, graph);
        }
        true
    }
}
