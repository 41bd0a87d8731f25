//! Per-import bone bookkeeping
//!
//! Bone ids are assigned on first encounter while meshes are processed in
//! order. The context lives for the duration of one import and hands over a
//! finished [`BoneIndex`].

use glam::Mat4;
use log::debug;
use skelanim_core::{AnimationError, BoneHierarchy, BoneIndex};

use crate::error::Result;
use crate::scene::MeshDescription;

/// Accumulates the bone index of one skeleton across its meshes
#[derive(Debug)]
pub struct ImportContext {
    bone_index: BoneIndex,
    max_bones: usize,
}

impl ImportContext {
    pub fn new(max_bones: usize) -> Self {
        Self {
            bone_index: BoneIndex::new(),
            max_bones,
        }
    }

    /// Register every bone referenced by `mesh`
    ///
    /// Bones must be nodes of `hierarchy`. Bones already seen keep their id.
    pub fn register_mesh(
        &mut self,
        mesh: &MeshDescription,
        hierarchy: &BoneHierarchy,
    ) -> Result<()> {
        let before = self.bone_index.len();
        for bone in &mesh.bones {
            if !hierarchy.contains(&bone.name) {
                return Err(AnimationError::MalformedAnimationSource(format!(
                    "mesh '{}' references unknown bone '{}'",
                    mesh.name, bone.name
                ))
                .into());
            }
            self.bone_index.register(bone.name.as_str(), bone.offset());
        }
        self.bone_index.check_capacity(self.max_bones)?;

        debug!(
            "Mesh '{}': {} bone references, {} new bones",
            mesh.name,
            mesh.bones.len(),
            self.bone_index.len() - before
        );
        Ok(())
    }

    /// Give an animated node that no mesh references its own slot
    ///
    /// The node gets an identity offset, so its final matrix equals its
    /// global transform.
    pub fn register_animated_node(&mut self, name: &str) -> Result<u32> {
        if let Some(info) = self.bone_index.get(name) {
            return Ok(info.id);
        }
        let id = self.bone_index.register(name, Mat4::IDENTITY);
        self.bone_index.check_capacity(self.max_bones)?;
        debug!("Animated node '{}' registered as unskinned bone {}", name, id);
        Ok(id)
    }

    pub fn bone_count(&self) -> usize {
        self.bone_index.len()
    }

    pub fn bone_index(&self) -> &BoneIndex {
        &self.bone_index
    }

    /// Finish the import and take the bone index
    pub fn finish(self) -> BoneIndex {
        self.bone_index
    }
}
