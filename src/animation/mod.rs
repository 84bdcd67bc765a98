//! Keyframe animation of node transforms.
//!
//! A [`Channel`] samples one transform property of one node across ordered
//! keyframes; an [`Animation`] owns a set of channels and its running
//! state; an [`AnimationTicker`] is the explicit, caller-owned tick list
//! that advances running animations once per external tick.

pub mod animation;
pub mod channel;
pub mod ticker;

pub use animation::Animation;
pub use channel::{Channel, MAX_COMPONENTS};
pub use ticker::{AnimationKey, AnimationTicker};

use serde::Deserialize;

/// The transform property an animation channel writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetPath {
    /// Three components, written to the node's position.
    Translation,
    /// Four components, interpreted as a quaternion.
    Rotation,
    /// Three components, written to the node's scale.
    Scale,
}

impl TargetPath {
    /// Number of float components per keyframe for this property.
    #[inline]
    #[must_use]
    pub fn components(self) -> usize {
        match self {
            Self::Translation | Self::Scale => 3,
            Self::Rotation => 4,
        }
    }
}
