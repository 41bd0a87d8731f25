//! Renderer boundary and CPU vertex skinning
//!
//! The GPU normally performs linear blend skinning with the matrices from
//! [`Animator::final_bone_matrices`](crate::Animator::final_bone_matrices).
//! The helpers here do the same on the CPU, which is useful for picking,
//! bounds computation and verification.
//!
//! # Example
//!
//! ```rust
//! use glam::{Mat3, Mat4, Vec3};
//! use skelanim_core::skinning::{SkinningOptions, VertexInfluences, skin_position};
//!
//! let matrices = [Mat4::IDENTITY, Mat4::from_translation(Vec3::Y)];
//! let influences = VertexInfluences::new([0, 1, 0, 0], [0.5, 0.5, 0.0, 0.0]);
//!
//! let p = skin_position(Vec3::ZERO, &influences, &matrices, &SkinningOptions::default());
//! assert!((p.y - 0.5).abs() < 1e-6);
//! ```

use glam::{Mat3, Mat4, Vec3};

/// What the renderer receives for one drawable
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SkinPayload<'a> {
    /// Rigid geometry, no bone matrices
    Static,
    /// Skinned geometry with matrices indexed by bone id
    Skinned { bone_matrices: &'a [Mat4] },
}

impl SkinPayload<'_> {
    pub fn is_skinned(&self) -> bool {
        matches!(self, Self::Skinned { .. })
    }

    pub fn bone_matrices(&self) -> &[Mat4] {
        match self {
            Self::Static => &[],
            Self::Skinned { bone_matrices } => bone_matrices,
        }
    }
}

/// Options for controlling CPU skinning
#[derive(Debug, Clone)]
pub struct SkinningOptions {
    /// Rescale weights so they sum to 1.0
    pub normalize_weights: bool,
    /// Weights below this are ignored
    pub weight_threshold: f32,
}

impl Default for SkinningOptions {
    fn default() -> Self {
        Self {
            normalize_weights: true,
            weight_threshold: 0.001,
        }
    }
}

/// Up to four bone influences of one vertex
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VertexInfluences {
    pub bone_ids: [u32; 4],
    pub weights: [f32; 4],
}

impl VertexInfluences {
    pub const fn new(bone_ids: [u32; 4], weights: [f32; 4]) -> Self {
        Self { bone_ids, weights }
    }

    /// Build from an arbitrary list, keeping the four strongest influences
    pub fn from_pairs(pairs: &[(u32, f32)]) -> Self {
        let mut sorted = pairs.to_vec();
        sorted.sort_by(|a, b| b.1.total_cmp(&a.1));

        let mut influences = Self::default();
        for (slot, (id, weight)) in sorted.into_iter().take(4).enumerate() {
            influences.bone_ids[slot] = id;
            influences.weights[slot] = weight;
        }
        influences
    }

    pub fn total_weight(&self) -> f32 {
        self.weights.iter().sum()
    }
}

/// Weighted sum of `matrices[id]` over the influences, or None if no bone contributes
fn blend_matrix(
    influences: &VertexInfluences,
    matrices: &[Mat4],
    options: &SkinningOptions,
) -> Option<Mat4> {
    let mut blended = Mat4::ZERO;
    let mut total = 0.0f32;

    for (&id, &weight) in influences.bone_ids.iter().zip(&influences.weights) {
        if weight < options.weight_threshold {
            continue;
        }
        let Some(matrix) = matrices.get(id as usize) else {
            continue;
        };
        blended += *matrix * weight;
        total += weight;
    }

    if total < options.weight_threshold {
        return None;
    }
    if options.normalize_weights {
        blended *= 1.0 / total;
    }
    Some(blended)
}

/// Skin a bind-pose position
///
/// Vertices without a usable influence keep their bind position.
pub fn skin_position(
    position: Vec3,
    influences: &VertexInfluences,
    matrices: &[Mat4],
    options: &SkinningOptions,
) -> Vec3 {
    blend_matrix(influences, matrices, options)
        .map_or(position, |m| m.transform_point3(position))
}

/// Skin a bind-pose normal, returning a unit vector
///
/// Normals are transformed by the inverse transpose of the blended linear
/// part, which keeps them perpendicular to the surface under non-uniform
/// scale.
pub fn skin_normal(
    normal: Vec3,
    influences: &VertexInfluences,
    matrices: &[Mat4],
    options: &SkinningOptions,
) -> Vec3 {
    blend_matrix(influences, matrices, options)
        .map_or(normal, |m| normal_matrix(&m) * normal)
        .normalize_or_zero()
}

fn normal_matrix(m: &Mat4) -> Mat3 {
    let linear = Mat3::from_mat4(*m);
    let determinant = linear.determinant();
    if determinant.abs() <= f32::EPSILON || !determinant.is_finite() {
        // Singular blend, no inverse exists
        return linear;
    }
    linear.inverse().transpose()
}
