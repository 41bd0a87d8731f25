//! Per-entity animation playback
//!
//! An [`Animator`] owns the playback time of one entity and the matrices it
//! hands to the renderer. Clips and the bone index are shared read-only, so
//! any number of animators can play the same clip independently.

use std::sync::Arc;

use log::{debug, trace};

use super::clip::Animation;
use super::pose::{BoneMatrices, MAX_BONES, write_final_matrices};
use crate::error::{AnimationError, Result};
use crate::skeleton::BoneIndex;
use crate::skinning::SkinPayload;

/// Options for constructing an [`Animator`]
#[derive(Debug, Clone)]
pub struct AnimatorConfig {
    /// Number of output matrix slots
    pub max_bones: usize,
}

impl Default for AnimatorConfig {
    fn default() -> Self {
        Self {
            max_bones: MAX_BONES,
        }
    }
}

/// Playback state of an animator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    /// No animation assigned
    Idle,
    /// Time advances on every update
    Playing,
}

/// Playback state and final bone matrices of one entity
#[derive(Debug, Clone)]
pub struct Animator {
    bone_index: Arc<BoneIndex>,
    current_animation: Option<Arc<Animation>>,
    /// Playback time in ticks, kept in [0, duration)
    current_time: f64,
    final_bone_matrices: BoneMatrices,
}

impl Animator {
    /// Create an idle animator for a skeleton
    ///
    /// Fails if the skeleton has more bones than `config.max_bones`.
    pub fn new(bone_index: Arc<BoneIndex>, config: &AnimatorConfig) -> Result<Self> {
        bone_index.check_capacity(config.max_bones)?;
        Ok(Self {
            bone_index,
            current_animation: None,
            current_time: 0.0,
            final_bone_matrices: BoneMatrices::new(config.max_bones),
        })
    }

    /// Create an animator that is already playing `animation`
    pub fn with_animation(
        bone_index: Arc<BoneIndex>,
        animation: Arc<Animation>,
        config: &AnimatorConfig,
    ) -> Result<Self> {
        let mut animator = Self::new(bone_index, config)?;
        animator.play_animation(Some(animation))?;
        Ok(animator)
    }

    pub fn state(&self) -> PlaybackState {
        if self.current_animation.is_some() {
            PlaybackState::Playing
        } else {
            PlaybackState::Idle
        }
    }

    pub fn current_animation(&self) -> Option<&Arc<Animation>> {
        self.current_animation.as_ref()
    }

    /// Playback time in ticks
    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn bone_index(&self) -> &BoneIndex {
        &self.bone_index
    }

    /// Switch to `animation` and restart at time 0
    ///
    /// Passing None fails with [`AnimationError::InvalidAnimation`] and keeps
    /// the previous animation and time.
    pub fn play_animation(&mut self, animation: Option<Arc<Animation>>) -> Result<()> {
        let animation = animation.ok_or(AnimationError::InvalidAnimation)?;
        debug!(
            "Playing '{}' ({} ticks at {} ticks/s)",
            animation.name(),
            animation.duration(),
            animation.ticks_per_second()
        );
        self.current_animation = Some(animation);
        self.current_time = 0.0;
        Ok(())
    }

    /// Advance playback by `delta_seconds` and refresh the final matrices
    ///
    /// Without an animation this returns [`AnimationError::NoActiveAnimation`],
    /// which is advisory: nothing changes and the call may be repeated.
    pub fn update(&mut self, delta_seconds: f64) -> Result<()> {
        let Some(animation) = self.current_animation.as_ref() else {
            debug!("Update skipped, no active animation");
            return Err(AnimationError::NoActiveAnimation);
        };

        let advanced = self.current_time + animation.ticks_per_second() * delta_seconds;
        self.current_time = wrap_time(advanced, animation.duration());
        self.refresh();
        Ok(())
    }

    /// Jump to `time` (ticks, wrapped into the clip) and refresh the final matrices
    pub fn seek(&mut self, time: f64) -> Result<()> {
        let Some(animation) = self.current_animation.as_ref() else {
            return Err(AnimationError::NoActiveAnimation);
        };
        self.current_time = wrap_time(time, animation.duration());
        self.refresh();
        Ok(())
    }

    /// Matrices of the most recent update, identity before the first one
    pub fn final_bone_matrices(&self) -> &BoneMatrices {
        &self.final_bone_matrices
    }

    /// Renderer-facing view of this entity
    pub fn skin_payload(&self) -> SkinPayload<'_> {
        SkinPayload::Skinned {
            bone_matrices: self.final_bone_matrices.as_slice(),
        }
    }

    fn refresh(&mut self) {
        if let Some(animation) = self.current_animation.as_deref() {
            let written = write_final_matrices(
                animation,
                &self.bone_index,
                self.current_time,
                &mut self.final_bone_matrices,
            );
            trace!(
                "'{}' at tick {:.3}: {} bone matrices written",
                animation.name(),
                self.current_time,
                written
            );
        }
    }
}

/// Wrap `time` into [0, duration)
fn wrap_time(time: f64, duration: f64) -> f64 {
    if !time.is_finite() {
        return 0.0;
    }
    let wrapped = time.rem_euclid(duration);
    // rem_euclid can round up to `duration` for tiny negative inputs
    if wrapped >= duration { 0.0 } else { wrapped }
}

/// Update a batch of animators in parallel
///
/// Each animator is independent; advisory [`AnimationError::NoActiveAnimation`]
/// results from idle animators are ignored.
#[cfg(feature = "parallel")]
pub fn update_all(animators: &mut [Animator], delta_seconds: f64) {
    use rayon::prelude::*;

    animators.par_iter_mut().for_each(|animator| {
        let _ = animator.update(delta_seconds);
    });
}
