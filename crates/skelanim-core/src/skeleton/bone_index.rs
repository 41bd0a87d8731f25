//! Bone name to skinning slot mapping

use std::collections::HashMap;

use glam::Mat4;
use log::warn;

use crate::error::{AnimationError, Result};

#[cfg(feature = "serde-support")]
use serde::{Deserialize, Serialize};

/// Skinning data of one bone
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct BoneInfo {
    /// Slot in the final matrix array
    pub id: u32,
    /// Inverse bind pose: mesh space to bone space at rest
    pub offset: Mat4,
}

/// Mapping from bone name to a dense id and its offset matrix
///
/// Ids are handed out in registration order starting at 0. Registering a
/// name twice keeps the first id and offset.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(
    feature = "serde-support",
    derive(Serialize, Deserialize),
    serde(try_from = "RawBoneIndex")
)]
pub struct BoneIndex {
    bones: HashMap<String, BoneInfo>,
    names: Vec<String>,
}

/// Serialized form of a [`BoneIndex`] before validation
#[cfg(feature = "serde-support")]
#[derive(Deserialize)]
struct RawBoneIndex {
    bones: HashMap<String, BoneInfo>,
    names: Vec<String>,
}

#[cfg(feature = "serde-support")]
impl TryFrom<RawBoneIndex> for BoneIndex {
    type Error = AnimationError;

    /// Re-register every bone in slot order, so ids stay dense and unique
    fn try_from(raw: RawBoneIndex) -> Result<Self> {
        let mut index = BoneIndex::new();
        for (slot, name) in raw.names.into_iter().enumerate() {
            let info = raw.bones.get(&name).ok_or_else(|| {
                AnimationError::malformed(format!("bone '{name}' in slot {slot} has no entry"))
            })?;
            if info.id as usize != slot || index.contains(&name) {
                return Err(AnimationError::malformed(format!(
                    "bone '{name}' has id {} but occupies slot {slot}",
                    info.id
                )));
            }
            index.register(name, info.offset);
        }
        if index.len() != raw.bones.len() {
            return Err(AnimationError::malformed(format!(
                "{} bone entries for {} slots",
                raw.bones.len(),
                index.len()
            )));
        }
        Ok(index)
    }
}

impl BoneIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a bone, returning its id
    pub fn register(&mut self, name: impl Into<String>, offset: Mat4) -> u32 {
        let name = name.into();
        if let Some(existing) = self.bones.get(&name) {
            if !existing.offset.abs_diff_eq(offset, 1e-5) {
                warn!(
                    "Bone '{}' registered again with a different offset, keeping the first one",
                    name
                );
            }
            return existing.id;
        }

        let id = self.names.len() as u32;
        self.bones.insert(name.clone(), BoneInfo { id, offset });
        self.names.push(name);
        id
    }

    pub fn get(&self, name: &str) -> Option<&BoneInfo> {
        self.bones.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bones.contains_key(name)
    }

    /// Name of the bone in slot `id`
    pub fn name(&self, id: u32) -> Option<&str> {
        self.names.get(id as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Bones in id order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BoneInfo)> {
        self.names
            .iter()
            .filter_map(|name| self.bones.get(name).map(|info| (name.as_str(), info)))
    }

    /// Fail if the bones do not fit into `capacity` output slots
    pub fn check_capacity(&self, capacity: usize) -> Result<()> {
        if self.len() > capacity {
            return Err(AnimationError::BoneCapacityExceeded {
                count: self.len(),
                capacity,
            });
        }
        Ok(())
    }
}
