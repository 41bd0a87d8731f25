//! Serializable description of an imported scene
//!
//! This is the hand-off format between an external model importer and the
//! animation core. Matrices are 16 floats in column-major order and
//! quaternions are `[x, y, z, w]`.
//!
//! ```json
//! {
//!   "root": { "name": "root", "children": [{ "name": "arm", "transform": [...] }] },
//!   "meshes": [{ "name": "body", "bones": [{ "name": "arm", "offset": [...] }] }],
//!   "animations": [{
//!     "name": "wave", "duration": 10.0, "ticks_per_second": 30.0,
//!     "channels": [{ "node": "arm", "position_keys": [{ "time": 0.0, "value": [0, 0, 0] }], ... }]
//!   }]
//! }
//! ```

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::Result;

const IDENTITY_COLUMNS: [f32; 16] = [
    1.0, 0.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 1.0, 0.0, //
    0.0, 0.0, 0.0, 1.0,
];

fn identity_columns() -> [f32; 16] {
    IDENTITY_COLUMNS
}

fn is_identity(columns: &[f32; 16]) -> bool {
    *columns == IDENTITY_COLUMNS
}

/// Root of a scene description
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneDescription {
    /// Root of the node tree; a scene without one cannot be animated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<SceneNode>,
    #[serde(default)]
    pub meshes: Vec<MeshDescription>,
    #[serde(default)]
    pub animations: Vec<ClipDescription>,
}

impl SceneDescription {
    /// Parse a scene from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse a scene from a JSON reader
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Load a scene from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Serialize the scene as pretty-printed JSON
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// A node of the scene graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneNode {
    pub name: String,
    /// Bind transform relative to the parent
    #[serde(default = "identity_columns", skip_serializing_if = "is_identity")]
    pub transform: [f32; 16],
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    pub fn new(name: impl Into<String>, transform: Mat4) -> Self {
        Self {
            name: name.into(),
            transform: transform.to_cols_array(),
            children: Vec::new(),
        }
    }

    pub fn with_child(mut self, child: SceneNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn transform(&self) -> Mat4 {
        Mat4::from_cols_array(&self.transform)
    }
}

/// Skinning information of one mesh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshDescription {
    pub name: String,
    #[serde(default)]
    pub bones: Vec<BoneReference>,
}

/// A bone a mesh is skinned to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoneReference {
    pub name: String,
    /// Inverse bind pose
    #[serde(default = "identity_columns", skip_serializing_if = "is_identity")]
    pub offset: [f32; 16],
}

impl BoneReference {
    pub fn new(name: impl Into<String>, offset: Mat4) -> Self {
        Self {
            name: name.into(),
            offset: offset.to_cols_array(),
        }
    }

    pub fn offset(&self) -> Mat4 {
        Mat4::from_cols_array(&self.offset)
    }
}

/// One animation clip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipDescription {
    pub name: String,
    /// Length in ticks
    pub duration: f64,
    /// Absent or zero selects the fallback rate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticks_per_second: Option<f64>,
    #[serde(default)]
    pub channels: Vec<ChannelDescription>,
}

/// Keys of one animated node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelDescription {
    pub node: String,
    #[serde(default)]
    pub position_keys: Vec<VectorKeyDescription>,
    #[serde(default)]
    pub rotation_keys: Vec<QuatKeyDescription>,
    #[serde(default)]
    pub scaling_keys: Vec<VectorKeyDescription>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VectorKeyDescription {
    pub time: f64,
    pub value: [f32; 3],
}

impl VectorKeyDescription {
    pub fn new(time: f64, value: Vec3) -> Self {
        Self {
            time,
            value: value.to_array(),
        }
    }
}

/// Rotation key, value is `[x, y, z, w]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuatKeyDescription {
    pub time: f64,
    pub value: [f32; 4],
}

impl QuatKeyDescription {
    pub fn new(time: f64, value: Quat) -> Self {
        Self {
            time,
            value: value.to_array(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let scene = SceneDescription::from_json_str(
            r#"{
                "root": { "name": "root", "children": [{ "name": "arm" }] },
                "animations": [{ "name": "idle", "duration": 4.0 }]
            }"#,
        )
        .unwrap();

        let root = scene.root.as_ref().unwrap();
        assert_eq!(root.transform(), Mat4::IDENTITY);
        assert_eq!(root.children[0].name, "arm");
        assert!(scene.meshes.is_empty());
        assert_eq!(scene.animations[0].ticks_per_second, None);
        assert!(scene.animations[0].channels.is_empty());
    }

    #[test]
    fn test_transform_is_column_major() {
        let node: SceneNode = serde_json::from_str(
            r#"{ "name": "n", "transform": [1,0,0,0, 0,1,0,0, 0,0,1,0, 4,5,6,1] }"#,
        )
        .unwrap();
        assert_eq!(
            node.transform(),
            Mat4::from_translation(Vec3::new(4.0, 5.0, 6.0))
        );
    }

    #[test]
    fn test_identity_matrices_are_omitted() {
        let node = SceneNode::new("root", Mat4::IDENTITY)
            .with_child(SceneNode::new("arm", Mat4::from_translation(Vec3::X)));
        let json = serde_json::to_value(&node).unwrap();

        assert!(json.get("transform").is_none());
        assert!(json["children"][0].get("transform").is_some());
    }

    #[test]
    fn test_missing_root_parses() {
        let scene = SceneDescription::from_json_str(r#"{ "animations": [] }"#).unwrap();
        assert!(scene.root.is_none());
    }

    #[test]
    fn test_invalid_json() {
        let err = SceneDescription::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, crate::ImportError::Json(_)));
    }
}
