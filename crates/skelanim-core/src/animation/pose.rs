//! Hierarchy traversal and skinning matrix computation
//!
//! Local transforms come from the clip's tracks, or from the bind pose for
//! bones without a track. They are composed root to leaf in depth-first
//! pre-order (`global = parent_global * local`) and every node present in the
//! [`BoneIndex`] writes `global * offset` into its output slot.

use glam::Mat4;
use log::trace;

use super::clip::Animation;
use crate::skeleton::{BoneIndex, NodeId};

#[cfg(feature = "serde-support")]
use serde::{Deserialize, Serialize};

/// Default number of output slots, matching the shader uniform array size
pub const MAX_BONES: usize = 40;

/// Fixed-capacity array of final skinning matrices indexed by bone id
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct BoneMatrices {
    matrices: Vec<Mat4>,
}

impl BoneMatrices {
    /// All slots start as identity
    pub fn new(capacity: usize) -> Self {
        Self {
            matrices: vec![Mat4::IDENTITY; capacity],
        }
    }

    pub fn capacity(&self) -> usize {
        self.matrices.len()
    }

    pub fn as_slice(&self) -> &[Mat4] {
        &self.matrices
    }

    pub fn get(&self, id: u32) -> Option<&Mat4> {
        self.matrices.get(id as usize)
    }

    /// Write slot `id`, returning false if it is out of range
    pub fn set(&mut self, id: u32, matrix: Mat4) -> bool {
        match self.matrices.get_mut(id as usize) {
            Some(slot) => {
                *slot = matrix;
                true
            }
            None => false,
        }
    }

    /// Reset every slot to identity
    pub fn reset(&mut self) {
        self.matrices.fill(Mat4::IDENTITY);
    }

    /// Column-major 4x4 floats, 16 per bone
    pub fn to_cols_array(&self) -> Vec<f32> {
        self.matrices
            .iter()
            .flat_map(Mat4::to_cols_array)
            .collect()
    }

    /// Column-major 4x3 floats, 12 per bone (affine row dropped)
    pub fn to_4x3_array(&self) -> Vec<f32> {
        let mut data = Vec::with_capacity(self.matrices.len() * 12);
        for m in &self.matrices {
            data.extend_from_slice(&m.x_axis.truncate().to_array());
            data.extend_from_slice(&m.y_axis.truncate().to_array());
            data.extend_from_slice(&m.z_axis.truncate().to_array());
            data.extend_from_slice(&m.w_axis.truncate().to_array());
        }
        data
    }
}

impl Default for BoneMatrices {
    fn default() -> Self {
        Self::new(MAX_BONES)
    }
}

/// Local transform of `node` at `time` (ticks)
///
/// Animated bones are sampled from their track; all others use the bind
/// transform verbatim.
pub fn local_transform(animation: &Animation, node: NodeId, time: f64) -> Mat4 {
    let Some(node) = animation.hierarchy().node(node) else {
        return Mat4::IDENTITY;
    };
    match animation.track(&node.name) {
        Some(track) => track.local_transform(time),
        None => node.bind_local_transform,
    }
}

/// Model-space transform of every hierarchy node, indexed by [`NodeId`]
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalPose {
    transforms: Vec<Mat4>,
}

impl GlobalPose {
    pub fn get(&self, node: NodeId) -> Option<&Mat4> {
        self.transforms.get(node.index())
    }

    pub fn as_slice(&self) -> &[Mat4] {
        &self.transforms
    }
}

/// Walk the hierarchy in pre-order, calling `visit` with each node and its global transform
fn traverse(animation: &Animation, time: f64, mut visit: impl FnMut(NodeId, &str, Mat4)) {
    let hierarchy = animation.hierarchy();
    if hierarchy.is_empty() {
        return;
    }

    let mut stack = vec![(hierarchy.root(), Mat4::IDENTITY)];
    while let Some((id, parent_global)) = stack.pop() {
        let Some(node) = hierarchy.node(id) else {
            continue;
        };
        let global = parent_global * local_transform(animation, id, time);
        visit(id, &node.name, global);

        // Reversed so children are processed in stored order
        for child in node.children.iter().rev() {
            stack.push((*child, global));
        }
    }
}

/// Compute the global transform of every node at `time` (ticks)
pub fn evaluate_global_pose(animation: &Animation, time: f64) -> GlobalPose {
    let mut transforms = vec![Mat4::IDENTITY; animation.hierarchy().len()];
    traverse(animation, time, |id, _, global| {
        transforms[id.index()] = global;
    });
    GlobalPose { transforms }
}

/// Refresh the skinning matrices of every indexed bone at `time` (ticks)
///
/// Slots of bones that are not reached keep their previous value. Returns the
/// number of slots written.
pub fn write_final_matrices(
    animation: &Animation,
    bone_index: &BoneIndex,
    time: f64,
    output: &mut BoneMatrices,
) -> usize {
    let mut written = 0;
    traverse(animation, time, |_, name, global| {
        let Some(info) = bone_index.get(name) else {
            return;
        };
        if output.set(info.id, global * info.offset) {
            written += 1;
        } else {
            trace!(
                "Bone '{}' id {} is outside the output capacity {}",
                name,
                info.id,
                output.capacity()
            );
        }
    });
    written
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::track::KeyframeTrack;
    use crate::animation::types::{Keyframe, LocalPose};
    use crate::skeleton::{BoneHierarchy, HierarchyBuilder};
    use glam::{Quat, Vec3};
    use std::sync::Arc;

    fn static_clip(hierarchy: BoneHierarchy, animated: &str) -> Animation {
        Animation::builder("clip", Arc::new(hierarchy))
            .duration(10.0)
            .track(animated, KeyframeTrack::constant(LocalPose::IDENTITY).unwrap())
            .build()
            .unwrap()
    }

    #[test]
    fn test_bone_matrices_start_identity() {
        let matrices = BoneMatrices::default();
        assert_eq!(matrices.capacity(), MAX_BONES);
        assert!(matrices.as_slice().iter().all(|m| *m == Mat4::IDENTITY));
    }

    #[test]
    fn test_bone_matrices_set_out_of_range() {
        let mut matrices = BoneMatrices::new(2);
        assert!(matrices.set(1, Mat4::ZERO));
        assert!(!matrices.set(2, Mat4::ZERO));
        matrices.reset();
        assert_eq!(matrices.get(1), Some(&Mat4::IDENTITY));
    }

    #[test]
    fn test_gpu_packing() {
        let mut matrices = BoneMatrices::new(2);
        matrices.set(1, Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0)));

        let cols = matrices.to_cols_array();
        assert_eq!(cols.len(), 32);
        assert_eq!(&cols[28..31], &[1.0, 2.0, 3.0]);

        let packed = matrices.to_4x3_array();
        assert_eq!(packed.len(), 24);
        assert_eq!(&packed[..3], &[1.0, 0.0, 0.0]);
        assert_eq!(&packed[21..24], &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_root_final_equals_offset() {
        let anim = static_clip(BoneHierarchy::single("root", Mat4::IDENTITY), "root");

        let offset = Mat4::from_translation(Vec3::new(0.0, -1.0, 0.0));
        let mut index = BoneIndex::new();
        index.register("root", offset);

        let mut out = BoneMatrices::new(4);
        assert_eq!(write_final_matrices(&anim, &index, 0.0, &mut out), 1);
        assert_eq!(out.get(0), Some(&offset));
    }

    #[test]
    fn test_bind_transform_used_without_track() {
        let bind = Mat4::from_translation(Vec3::new(0.0, 2.0, 0.0));
        let mut builder = HierarchyBuilder::new("root", Mat4::IDENTITY);
        let child = builder.add_child(NodeId::ROOT, "child", bind).unwrap();
        let anim = static_clip(builder.build(), "root");

        assert_eq!(local_transform(&anim, child, 3.0), bind);
        let pose = evaluate_global_pose(&anim, 3.0);
        assert!(pose.get(child).unwrap().abs_diff_eq(bind, 1e-6));
    }

    #[test]
    fn test_chain_composition_order() {
        // Parent rotation applies to the child's translation
        let mut builder = HierarchyBuilder::new("root", Mat4::IDENTITY);
        let child = builder
            .add_child(
                NodeId::ROOT,
                "child",
                Mat4::from_translation(Vec3::new(1.0, 0.0, 0.0)),
            )
            .unwrap();
        let rotate = KeyframeTrack::new(
            vec![Keyframe::new(0.0, Vec3::ZERO)],
            vec![Keyframe::new(
                0.0,
                Quat::from_rotation_z(std::f32::consts::FRAC_PI_2),
            )],
            vec![Keyframe::new(0.0, Vec3::ONE)],
        )
        .unwrap();
        let anim = Animation::builder("clip", Arc::new(builder.build()))
            .duration(1.0)
            .track("root", rotate)
            .build()
            .unwrap();

        let pose = evaluate_global_pose(&anim, 0.0);
        let tip = pose.get(child).unwrap().transform_point3(Vec3::ZERO);
        assert!(tip.abs_diff_eq(Vec3::new(0.0, 1.0, 0.0), 1e-5));
    }

    #[test]
    fn test_non_finite_time_evaluates_first_keys() {
        let slide = KeyframeTrack::new(
            vec![
                Keyframe::new(0.0, Vec3::new(1.0, 0.0, 0.0)),
                Keyframe::new(10.0, Vec3::new(5.0, 0.0, 0.0)),
            ],
            vec![
                Keyframe::new(0.0, Quat::IDENTITY),
                Keyframe::new(10.0, Quat::from_rotation_y(1.0)),
            ],
            vec![Keyframe::new(0.0, Vec3::ONE)],
        )
        .unwrap();
        let hierarchy = Arc::new(BoneHierarchy::single("root", Mat4::IDENTITY));
        let anim = Animation::builder("clip", hierarchy)
            .duration(10.0)
            .track("root", slide)
            .build()
            .unwrap();
        let mut index = BoneIndex::new();
        index.register("root", Mat4::IDENTITY);

        let expected = Mat4::from_translation(Vec3::new(1.0, 0.0, 0.0));
        for time in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let pose = evaluate_global_pose(&anim, time);
            assert!(pose.get(NodeId::ROOT).unwrap().abs_diff_eq(expected, 1e-6));

            let mut out = BoneMatrices::new(1);
            write_final_matrices(&anim, &index, time, &mut out);
            assert!(out.get(0).unwrap().is_finite());
            assert!(out.get(0).unwrap().abs_diff_eq(expected, 1e-6));
        }
    }

    #[test]
    fn test_untouched_slots_keep_previous_value() {
        let anim = static_clip(BoneHierarchy::single("root", Mat4::IDENTITY), "root");
        let mut index = BoneIndex::new();
        index.register("root", Mat4::IDENTITY);

        let stale = Mat4::from_scale(Vec3::splat(3.0));
        let mut out = BoneMatrices::new(3);
        out.set(2, stale);
        write_final_matrices(&anim, &index, 0.0, &mut out);
        assert_eq!(out.get(2), Some(&stale));
    }
}
