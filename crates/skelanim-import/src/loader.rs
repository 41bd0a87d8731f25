//! Building animation data from a scene description

use std::path::Path;
use std::sync::Arc;

use glam::{Quat, Vec3};
use log::{debug, info, warn};
use skelanim_core::{
    Animation, AnimationError, BoneHierarchy, BoneIndex, DEFAULT_TICKS_PER_SECOND,
    HierarchyBuilder, Keyframe, KeyframeTrack, MAX_BONES, NodeId,
};

use crate::context::ImportContext;
use crate::error::Result;
use crate::scene::{ChannelDescription, ClipDescription, SceneDescription, SceneNode};

/// Options controlling scene import
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Tick rate for clips whose rate is missing or zero
    pub fallback_ticks_per_second: f64,
    /// Maximum number of skinned bones
    pub max_bones: usize,
    /// Give animated nodes that no mesh references their own bone slot
    pub register_unskinned_channels: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            fallback_ticks_per_second: DEFAULT_TICKS_PER_SECOND,
            max_bones: MAX_BONES,
            register_unskinned_channels: false,
        }
    }
}

/// Result of importing one scene
#[derive(Debug, Clone)]
pub struct ImportedModel {
    pub bone_index: Arc<BoneIndex>,
    pub hierarchy: Arc<BoneHierarchy>,
    pub animations: Vec<Arc<Animation>>,
}

impl ImportedModel {
    /// Find a clip by name
    pub fn animation(&self, name: &str) -> Option<&Arc<Animation>> {
        self.animations.iter().find(|a| a.name() == name)
    }

    pub fn animation_names(&self) -> impl Iterator<Item = &str> {
        self.animations.iter().map(|a| a.name())
    }
}

/// Build the node hierarchy rooted at `root`
///
/// Node ids follow a depth-first pre-order of the scene graph.
pub fn build_hierarchy(root: &SceneNode) -> Result<BoneHierarchy> {
    let mut builder = HierarchyBuilder::new(root.name.as_str(), checked_transform(root)?);

    let mut stack: Vec<(&SceneNode, NodeId)> = root
        .children
        .iter()
        .rev()
        .map(|child| (child, NodeId::ROOT))
        .collect();
    while let Some((node, parent)) = stack.pop() {
        let id = builder.add_child(parent, node.name.as_str(), checked_transform(node)?)?;
        for child in node.children.iter().rev() {
            stack.push((child, id));
        }
    }

    Ok(builder.build())
}

fn checked_transform(node: &SceneNode) -> Result<glam::Mat4> {
    let transform = node.transform();
    if !transform.is_finite() {
        return Err(AnimationError::MalformedAnimationSource(format!(
            "node '{}' has a non-finite transform",
            node.name
        ))
        .into());
    }
    Ok(transform)
}

fn build_track(clip: &ClipDescription, channel: &ChannelDescription) -> Result<KeyframeTrack> {
    let track = KeyframeTrack::new(
        channel
            .position_keys
            .iter()
            .map(|k| Keyframe::new(k.time, Vec3::from_array(k.value)))
            .collect(),
        channel
            .rotation_keys
            .iter()
            .map(|k| Keyframe::new(k.time, Quat::from_array(k.value)))
            .collect(),
        channel
            .scaling_keys
            .iter()
            .map(|k| Keyframe::new(k.time, Vec3::from_array(k.value)))
            .collect(),
    )
    .map_err(|err| match err {
        AnimationError::MalformedAnimationSource(reason) => {
            AnimationError::MalformedAnimationSource(format!(
                "clip '{}', channel '{}': {reason}",
                clip.name, channel.node
            ))
        }
        other => other,
    })?;
    Ok(track)
}

/// Build one clip over a shared hierarchy
pub fn build_clip(
    clip: &ClipDescription,
    hierarchy: Arc<BoneHierarchy>,
    options: &ImportOptions,
) -> Result<Animation> {
    let mut builder = Animation::builder(clip.name.as_str(), hierarchy)
        .duration(clip.duration)
        .ticks_per_second(clip.ticks_per_second)
        .fallback_ticks_per_second(options.fallback_ticks_per_second);
    for channel in &clip.channels {
        builder = builder.track(channel.node.as_str(), build_track(clip, channel)?);
    }

    let animation = builder.build()?;
    if animation.tick_rate_was_defaulted() {
        warn!(
            "Clip '{}' has no tick rate, assuming {} ticks per second",
            animation.name(),
            animation.ticks_per_second()
        );
    }
    Ok(animation)
}

/// Import a scene into a bone index and a set of clips sharing one hierarchy
pub fn import_scene(scene: &SceneDescription, options: &ImportOptions) -> Result<ImportedModel> {
    let root = scene.root.as_ref().ok_or_else(|| {
        AnimationError::MalformedAnimationSource("scene has no root node".to_string())
    })?;
    if scene.animations.is_empty() {
        return Err(
            AnimationError::MalformedAnimationSource("scene has no animations".to_string()).into(),
        );
    }

    let hierarchy = Arc::new(build_hierarchy(root)?);

    let mut context = ImportContext::new(options.max_bones);
    for mesh in &scene.meshes {
        context.register_mesh(mesh, &hierarchy)?;
    }
    if scene.meshes.is_empty() {
        debug!("Scene has no meshes, no bones are skinned");
    }

    let mut animations = Vec::with_capacity(scene.animations.len());
    for clip in &scene.animations {
        let animation = build_clip(clip, Arc::clone(&hierarchy), options)?;
        if options.register_unskinned_channels {
            for channel in &clip.channels {
                context.register_animated_node(&channel.node)?;
            }
        }
        animations.push(Arc::new(animation));
    }

    let bone_index = context.finish();
    info!(
        "Imported {} nodes, {} bones and {} animations",
        hierarchy.len(),
        bone_index.len(),
        animations.len()
    );

    Ok(ImportedModel {
        bone_index: Arc::new(bone_index),
        hierarchy,
        animations,
    })
}

/// Load and import a scene file
pub fn load_model<P: AsRef<Path>>(path: P, options: &ImportOptions) -> Result<ImportedModel> {
    let path = path.as_ref();
    debug!("Loading scene {}", path.display());
    let scene = SceneDescription::load(path)?;
    import_scene(&scene, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ImportError;
    use crate::scene::{BoneReference, MeshDescription, QuatKeyDescription, VectorKeyDescription};
    use glam::Mat4;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn channel(node: &str) -> ChannelDescription {
        ChannelDescription {
            node: node.to_string(),
            position_keys: vec![
                VectorKeyDescription::new(0.0, Vec3::ZERO),
                VectorKeyDescription::new(10.0, Vec3::X),
            ],
            rotation_keys: vec![QuatKeyDescription::new(0.0, Quat::IDENTITY)],
            scaling_keys: vec![VectorKeyDescription::new(0.0, Vec3::ONE)],
        }
    }

    fn scene() -> SceneDescription {
        SceneDescription {
            root: Some(
                SceneNode::new("root", Mat4::IDENTITY).with_child(
                    SceneNode::new("arm", Mat4::from_translation(Vec3::Y))
                        .with_child(SceneNode::new("hand", Mat4::from_translation(Vec3::Y))),
                ),
            ),
            meshes: vec![MeshDescription {
                name: "body".to_string(),
                bones: vec![
                    BoneReference::new("arm", Mat4::IDENTITY),
                    BoneReference::new("root", Mat4::IDENTITY),
                ],
            }],
            animations: vec![ClipDescription {
                name: "wave".to_string(),
                duration: 10.0,
                ticks_per_second: Some(30.0),
                channels: vec![channel("arm"), channel("hand")],
            }],
        }
    }

    #[test]
    fn test_build_hierarchy_pre_order_ids() {
        let root = SceneNode::new("root", Mat4::IDENTITY)
            .with_child(SceneNode::new("a", Mat4::IDENTITY).with_child(SceneNode::new(
                "a1",
                Mat4::IDENTITY,
            )))
            .with_child(SceneNode::new("b", Mat4::IDENTITY));
        let hierarchy = build_hierarchy(&root).unwrap();

        let names: Vec<&str> = hierarchy.nodes().iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["root", "a", "a1", "b"]);
        assert_eq!(hierarchy.node(NodeId(3)).unwrap().parent, Some(NodeId::ROOT));
    }

    #[test]
    fn test_import_scene() {
        let model = import_scene(&scene(), &ImportOptions::default()).unwrap();

        assert_eq!(model.hierarchy.len(), 3);
        assert_eq!(model.bone_index.len(), 2);
        assert_eq!(model.bone_index.get("arm").unwrap().id, 0);
        assert!(!model.bone_index.contains("hand"));

        let wave = model.animation("wave").unwrap();
        assert_eq!(wave.track_count(), 2);
        assert!(Arc::ptr_eq(&wave.shared_hierarchy(), &model.hierarchy));
        assert!(model.animation("run").is_none());
        assert_eq!(model.animation_names().collect::<Vec<_>>(), vec!["wave"]);
    }

    #[test]
    fn test_register_unskinned_channels() {
        let options = ImportOptions {
            register_unskinned_channels: true,
            ..ImportOptions::default()
        };
        let model = import_scene(&scene(), &options).unwrap();
        assert_eq!(model.bone_index.get("hand").unwrap().id, 2);
    }

    #[test_case(None, 25.0, true ; "missing rate")]
    #[test_case(Some(0.0), 25.0, true ; "zero rate")]
    #[test_case(Some(24.0), 24.0, false ; "explicit rate")]
    fn test_tick_rate(rate: Option<f64>, expected: f64, defaulted: bool) {
        let mut scene = scene();
        scene.animations[0].ticks_per_second = rate;
        let model = import_scene(&scene, &ImportOptions::default()).unwrap();

        let wave = model.animation("wave").unwrap();
        assert_eq!(wave.ticks_per_second(), expected);
        assert_eq!(wave.tick_rate_was_defaulted(), defaulted);
    }

    #[test]
    fn test_custom_fallback_rate() {
        let mut scene = scene();
        scene.animations[0].ticks_per_second = None;
        let options = ImportOptions {
            fallback_ticks_per_second: 30.0,
            ..ImportOptions::default()
        };
        let model = import_scene(&scene, &options).unwrap();
        assert_eq!(model.animations[0].ticks_per_second(), 30.0);
    }

    #[test]
    fn test_missing_root() {
        let mut scene = scene();
        scene.root = None;
        let err = import_scene(&scene, &ImportOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            ImportError::Animation(AnimationError::MalformedAnimationSource(_))
        ));
    }

    #[test]
    fn test_no_animations() {
        let mut scene = scene();
        scene.animations.clear();
        let err = import_scene(&scene, &ImportOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            ImportError::Animation(AnimationError::MalformedAnimationSource(_))
        ));
        assert!(err.to_string().contains("no animations"));
    }

    #[test]
    fn test_clip_without_channels() {
        let mut scene = scene();
        scene.animations[0].channels.clear();
        let err = import_scene(&scene, &ImportOptions::default()).unwrap_err();
        assert!(err.to_string().contains("no channels"));
    }

    #[test]
    fn test_empty_key_channel_names_clip() {
        let mut scene = scene();
        scene.animations[0].channels[1].rotation_keys.clear();
        let err = import_scene(&scene, &ImportOptions::default()).unwrap_err();
        assert!(err.to_string().contains("clip 'wave', channel 'hand'"));
    }

    #[test]
    fn test_non_finite_transform() {
        let mut scene = scene();
        if let Some(root) = scene.root.as_mut() {
            root.children[0].transform[12] = f32::NAN;
        }
        let err = import_scene(&scene, &ImportOptions::default()).unwrap_err();
        assert!(err.to_string().contains("non-finite transform"));
    }
}
