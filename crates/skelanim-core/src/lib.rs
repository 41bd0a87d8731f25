//! Skeletal animation evaluation.
//!
//! Given a bone hierarchy, per-bone keyframe tracks and a playback time, this
//! crate computes the per-bone skinning matrices a renderer uploads for GPU
//! linear blend skinning:
//!
//! 1. each animated bone's channels are interpolated into a local transform,
//!    bones without a track keep their bind transform;
//! 2. local transforms are composed root to leaf into global transforms;
//! 3. every skinned bone writes `global * offset` into its slot.
//!
//! Clips ([`Animation`]) and skeletons ([`BoneIndex`]) are immutable and can be
//! shared across threads; each entity owns an [`Animator`] with its own time.

pub mod animation;
pub mod error;
pub mod skeleton;
pub mod skinning;

// Re-export common types
pub use animation::{
    Animation, AnimationBuilder, Animator, AnimatorConfig, BoneMatrices, DEFAULT_TICKS_PER_SECOND,
    GlobalPose, Keyframe, KeyframeTrack, LocalPose, MAX_BONES, PlaybackState,
    evaluate_global_pose,
};
pub use error::{AnimationError, Result};
pub use skeleton::{BoneHierarchy, BoneIndex, BoneInfo, HierarchyBuilder, HierarchyNode, NodeId};
pub use skinning::SkinPayload;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
