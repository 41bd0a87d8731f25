//! Common types for keyframe animation

use glam::{Quat, Vec3};

#[cfg(feature = "serde-support")]
use serde::{Deserialize, Serialize};

/// A single time-stamped sample of one channel
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct Keyframe<T> {
    /// Time in ticks
    pub time: f64,
    pub value: T,
}

impl<T> Keyframe<T> {
    pub const fn new(time: f64, value: T) -> Self {
        Self { time, value }
    }
}

pub type VectorKey = Keyframe<Vec3>;
pub type QuatKey = Keyframe<Quat>;

/// Trait for channel values that can be blended between two keys
pub trait Interpolate: Copy {
    /// Blend between self and other, `t` in [0, 1]
    fn interpolate(&self, other: &Self, t: f32) -> Self;
}

impl Interpolate for Vec3 {
    fn interpolate(&self, other: &Self, t: f32) -> Self {
        self.lerp(*other, t)
    }
}

impl Interpolate for Quat {
    fn interpolate(&self, other: &Self, t: f32) -> Self {
        // slerp takes the shorter arc; renormalize against drift
        self.slerp(*other, t).normalize()
    }
}

/// Decomposed local transform of a single bone
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct LocalPose {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl LocalPose {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    /// Compose as translation * rotation * scale
    pub fn to_matrix(&self) -> glam::Mat4 {
        glam::Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

impl Default for LocalPose {
    fn default() -> Self {
        Self::IDENTITY
    }
}
