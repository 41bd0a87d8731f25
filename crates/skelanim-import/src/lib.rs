//! Scene import for skelanim.
//!
//! Reads a scene description (node tree, mesh bone references and animation
//! clips), builds the [`BoneHierarchy`](skelanim_core::BoneHierarchy) and the
//! [`BoneIndex`](skelanim_core::BoneIndex), and turns every clip into a shared
//! [`Animation`](skelanim_core::Animation).
//!
//! # Example
//!
//! ```rust
//! use skelanim_import::{ImportOptions, SceneDescription, import_scene};
//!
//! let scene = SceneDescription::from_json_str(r#"{
//!     "root": { "name": "root", "children": [{ "name": "arm" }] },
//!     "meshes": [{ "name": "body", "bones": [{ "name": "arm" }] }],
//!     "animations": [{
//!         "name": "wave",
//!         "duration": 10.0,
//!         "channels": [{
//!             "node": "arm",
//!             "position_keys": [{ "time": 0.0, "value": [0.0, 0.0, 0.0] }],
//!             "rotation_keys": [{ "time": 0.0, "value": [0.0, 0.0, 0.0, 1.0] }],
//!             "scaling_keys": [{ "time": 0.0, "value": [1.0, 1.0, 1.0] }]
//!         }]
//!     }]
//! }"#)?;
//!
//! let model = import_scene(&scene, &ImportOptions::default())?;
//! assert_eq!(model.bone_index.len(), 1);
//! assert!(model.animation("wave").is_some());
//! # Ok::<(), skelanim_import::ImportError>(())
//! ```

pub mod context;
pub mod error;
pub mod loader;
pub mod scene;

pub use context::ImportContext;
pub use error::{ImportError, Result};
pub use loader::{
    ImportOptions, ImportedModel, build_clip, build_hierarchy, import_scene, load_model,
};
pub use scene::{
    BoneReference, ChannelDescription, ClipDescription, MeshDescription, QuatKeyDescription,
    SceneDescription, SceneNode, VectorKeyDescription,
};
