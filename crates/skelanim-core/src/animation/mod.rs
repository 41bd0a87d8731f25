//! Keyframe animation playback
//!
//! This module provides:
//! - Per-bone keyframe tracks with independent position/rotation/scale channels
//! - Linear (position, scale) and spherical (rotation) keyframe interpolation
//! - Immutable animation clips shared between evaluators
//! - Hierarchy traversal producing global transforms and skinning matrices
//! - The per-entity [`Animator`] playback state machine
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use glam::{Mat4, Quat, Vec3};
//! use skelanim_core::{
//!     Animation, Animator, AnimatorConfig, BoneHierarchy, BoneIndex, Keyframe, KeyframeTrack,
//! };
//!
//! let hierarchy = Arc::new(BoneHierarchy::single("root", Mat4::IDENTITY));
//! let track = KeyframeTrack::new(
//!     vec![Keyframe::new(0.0, Vec3::ZERO), Keyframe::new(10.0, Vec3::X * 10.0)],
//!     vec![Keyframe::new(0.0, Quat::IDENTITY)],
//!     vec![Keyframe::new(0.0, Vec3::ONE)],
//! )?;
//! let clip = Arc::new(
//!     Animation::builder("slide", hierarchy)
//!         .duration(10.0)
//!         .ticks_per_second(Some(10.0))
//!         .track("root", track)
//!         .build()?,
//! );
//!
//! let mut bones = BoneIndex::new();
//! bones.register("root", Mat4::IDENTITY);
//!
//! let mut animator = Animator::with_animation(Arc::new(bones), clip, &AnimatorConfig::default())?;
//! animator.update(0.5)?;
//! let root = animator.final_bone_matrices().get(0).copied().unwrap_or_default();
//! assert!((root.w_axis.x - 5.0).abs() < 1e-4);
//! # Ok::<(), skelanim_core::AnimationError>(())
//! ```

mod animator;
mod clip;
mod interpolation;
mod pose;
mod track;
mod types;

#[cfg(feature = "parallel")]
pub use animator::update_all;
pub use animator::{Animator, AnimatorConfig, PlaybackState};
pub use clip::{Animation, AnimationBuilder, DEFAULT_TICKS_PER_SECOND};
pub use interpolation::{find_key_index, sample_channel, segment_factor};
pub use pose::{
    BoneMatrices, GlobalPose, MAX_BONES, evaluate_global_pose, local_transform,
    write_final_matrices,
};
pub use track::KeyframeTrack;
pub use types::{Interpolate, Keyframe, LocalPose, QuatKey, VectorKey};
