//! Bone hierarchy and skinning slot bookkeeping

mod bone_index;
mod hierarchy;

pub use bone_index::{BoneIndex, BoneInfo};
pub use hierarchy::{BoneHierarchy, HierarchyBuilder, HierarchyNode, NodeId, PreOrder};
