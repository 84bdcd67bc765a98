use glam::{Quat, Vec3};

use crate::animation::TargetPath;
use crate::errors::{Result, WeftError};
use crate::scene::{NodeIndex, SceneGraph};

/// Widest property (rotation quaternion) in float components.
pub const MAX_COMPONENTS: usize = 4;

/// One keyframe channel: ordered sample times, flat component values, and
/// the node property the samples are written to.
#[derive(Debug, Clone)]
pub struct Channel {
    target: NodeIndex,
    path: TargetPath,
    keys: Vec<f32>,
    values: Vec<f32>,
}

impl Channel {
    /// Validates the keyframe data: at least one key, strictly increasing
    /// times, and `keys.len() * path.components()` values.
    pub fn new(
        target: NodeIndex,
        path: TargetPath,
        keys: Vec<f32>,
        values: Vec<f32>,
    ) -> Result<Self> {
        if keys.is_empty() {
            return Err(WeftError::InvalidChannel("channel has no keyframes".to_string()));
        }
        if !keys.windows(2).all(|w| w[0] < w[1]) {
            return Err(WeftError::InvalidChannel(
                "keyframe times must be strictly increasing".to_string(),
            ));
        }
        let expected = keys.len() * path.components();
        if values.len() != expected {
            return Err(WeftError::InvalidChannel(format!(
                "expected {expected} values for {} keys, got {}",
                keys.len(),
                values.len()
            )));
        }
        Ok(Self {
            target,
            path,
            keys,
            values,
        })
    }

    #[inline]
    #[must_use]
    pub fn target(&self) -> NodeIndex {
        self.target
    }

    #[inline]
    #[must_use]
    pub fn path(&self) -> TargetPath {
        self.path
    }

    /// Time of the last keyframe.
    #[inline]
    #[must_use]
    pub fn duration(&self) -> f32 {
        *self.keys.last().unwrap_or(&0.0)
    }

    /// Samples the channel at `t`.
    ///
    /// At or before the first key, and at or after the last key, the
    /// boundary keyframe's values are used verbatim. In between, the
    /// bracketing keyframe pair is found and each component is tweened
    /// linearly and independently.
    #[must_use]
    pub fn sample(&self, t: f32) -> [f32; MAX_COMPONENTS] {
        let n = self.path.components();
        let last = self.keys.len() - 1;
        let mut out = [0.0; MAX_COMPONENTS];

        if t <= self.keys[0] {
            out[..n].copy_from_slice(&self.values[..n]);
        } else if t >= self.keys[last] {
            out[..n].copy_from_slice(&self.values[last * n..last * n + n]);
        } else {
            for i in 0..last {
                let (key1, key2) = (self.keys[i], self.keys[i + 1]);
                if t >= key1 && t <= key2 {
                    let fract = (t - key1) / (key2 - key1);
                    for j in 0..n {
                        let from = self.values[i * n + j];
                        let to = self.values[(i + 1) * n + j];
                        out[j] = from + (to - from) * fract;
                    }
                    break;
                }
            }
        }

        out
    }

    /// Samples at `t` and writes the result into the target node's
    /// transform.
    pub fn apply_at(&self, t: f32, graph: &mut SceneGraph) {
        let value = self.sample(t);
        let Some(node) = graph.get_node_mut(self.target) else {
            return;
        };
        match self.path {
            TargetPath::Translation => {
                node.transform.position = Vec3::new(value[0], value[1], value[2]);
            }
            TargetPath::Rotation => {
                let normalized =
                    Quat::from_xyzw(value[0], value[1], value[2], value[3]).normalize();
                node.transform.rotation = if normalized.is_finite() {
                    normalized
                } else {
                    Quat::IDENTITY
                };
            }
            TargetPath::Scale => {
                node.transform.scale = Vec3::new(value[0], value[1], value[2]);
            }
        }
        node.transform.mark_dirty();
    }
}
