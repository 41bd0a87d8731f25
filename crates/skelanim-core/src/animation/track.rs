//! Per-bone keyframe tracks

use glam::{Mat4, Quat, Vec3};

use super::interpolation::sample_channel;
use super::types::{Keyframe, LocalPose, QuatKey, VectorKey};
use crate::error::{AnimationError, Result};

#[cfg(feature = "serde-support")]
use serde::{Deserialize, Serialize};

/// Position, rotation and scale keys of one animated bone
///
/// Channels are sampled independently and may have different key counts
/// and timestamps. Each channel holds at least one key.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde-support",
    derive(Serialize, Deserialize),
    serde(try_from = "RawTrack")
)]
pub struct KeyframeTrack {
    position_keys: Vec<VectorKey>,
    rotation_keys: Vec<QuatKey>,
    scale_keys: Vec<VectorKey>,
}

#[cfg(feature = "serde-support")]
#[derive(Deserialize)]
struct RawTrack {
    position_keys: Vec<VectorKey>,
    rotation_keys: Vec<QuatKey>,
    scale_keys: Vec<VectorKey>,
}

#[cfg(feature = "serde-support")]
impl TryFrom<RawTrack> for KeyframeTrack {
    type Error = AnimationError;

    fn try_from(raw: RawTrack) -> Result<Self> {
        Self::new(raw.position_keys, raw.rotation_keys, raw.scale_keys)
    }
}

impl KeyframeTrack {
    /// Build a track, validating every channel
    ///
    /// Rotation keys are normalized.
    pub fn new(
        position_keys: Vec<VectorKey>,
        rotation_keys: Vec<QuatKey>,
        scale_keys: Vec<VectorKey>,
    ) -> Result<Self> {
        validate_channel("position", &position_keys, |v| v.is_finite())?;
        validate_channel("scale", &scale_keys, |v| v.is_finite())?;
        validate_channel("rotation", &rotation_keys, |q| {
            q.is_finite() && q.length_squared() > f32::EPSILON
        })?;

        let rotation_keys = rotation_keys
            .into_iter()
            .map(|key| Keyframe::new(key.time, key.value.normalize()))
            .collect();

        Ok(Self {
            position_keys,
            rotation_keys,
            scale_keys,
        })
    }

    /// Track holding a single constant pose
    ///
    /// The pose goes through the same validation as [`KeyframeTrack::new`].
    pub fn constant(pose: LocalPose) -> Result<Self> {
        Self::new(
            vec![Keyframe::new(0.0, pose.translation)],
            vec![Keyframe::new(0.0, pose.rotation)],
            vec![Keyframe::new(0.0, pose.scale)],
        )
    }

    pub fn position_keys(&self) -> &[VectorKey] {
        &self.position_keys
    }

    pub fn rotation_keys(&self) -> &[QuatKey] {
        &self.rotation_keys
    }

    pub fn scale_keys(&self) -> &[VectorKey] {
        &self.scale_keys
    }

    /// Latest timestamp across all channels
    pub fn last_key_time(&self) -> f64 {
        [
            self.position_keys.last().map(|k| k.time),
            self.rotation_keys.last().map(|k| k.time),
            self.scale_keys.last().map(|k| k.time),
        ]
        .into_iter()
        .flatten()
        .fold(0.0, f64::max)
    }

    /// Interpolated position at `time` (ticks)
    pub fn sample_position(&self, time: f64) -> Vec3 {
        sample_channel(&self.position_keys, time).unwrap_or(Vec3::ZERO)
    }

    /// Interpolated rotation at `time` (ticks)
    pub fn sample_rotation(&self, time: f64) -> Quat {
        sample_channel(&self.rotation_keys, time).unwrap_or(Quat::IDENTITY)
    }

    /// Interpolated scale at `time` (ticks)
    pub fn sample_scale(&self, time: f64) -> Vec3 {
        sample_channel(&self.scale_keys, time).unwrap_or(Vec3::ONE)
    }

    /// Interpolated pose at `time` (ticks)
    pub fn sample(&self, time: f64) -> LocalPose {
        LocalPose {
            translation: self.sample_position(time),
            rotation: self.sample_rotation(time),
            scale: self.sample_scale(time),
        }
    }

    /// Local transform at `time`: translation * rotation * scale
    pub fn local_transform(&self, time: f64) -> Mat4 {
        self.sample(time).to_matrix()
    }
}

fn validate_channel<T>(
    channel: &str,
    keys: &[Keyframe<T>],
    value_ok: impl Fn(&T) -> bool,
) -> Result<()> {
    if keys.is_empty() {
        return Err(AnimationError::malformed(format!(
            "{channel} channel has no keys"
        )));
    }

    let mut previous = f64::NEG_INFINITY;
    for (index, key) in keys.iter().enumerate() {
        if !key.time.is_finite() {
            return Err(AnimationError::malformed(format!(
                "{channel} key {index} has a non-finite timestamp"
            )));
        }
        if key.time < previous {
            return Err(AnimationError::malformed(format!(
                "{channel} key {index} at {} precedes the previous key at {previous}",
                key.time
            )));
        }
        if !value_ok(&key.value) {
            return Err(AnimationError::malformed(format!(
                "{channel} key {index} has an invalid value"
            )));
        }
        previous = key.time;
    }

    Ok(())
}
