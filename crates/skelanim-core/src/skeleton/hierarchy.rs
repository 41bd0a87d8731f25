//! Bone hierarchy stored as an index-addressed arena
//!
//! Nodes live in a flat `Vec` and refer to their parent and children by
//! [`NodeId`]. A hierarchy can only be grown by attaching new nodes to nodes
//! that already exist, so it is always a single rooted tree.

use std::collections::HashMap;

use glam::Mat4;

use crate::error::{AnimationError, Result};

#[cfg(feature = "serde-support")]
use serde::{Deserialize, Serialize};

/// Index of a node inside a [`BoneHierarchy`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct NodeId(pub u32);

impl NodeId {
    pub const ROOT: Self = Self(0);

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A single node of the imported scene graph
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct HierarchyNode {
    pub name: String,
    /// Transform relative to the parent at bind pose
    pub bind_local_transform: Mat4,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

/// Immutable rooted tree of named nodes
///
/// Deserialized hierarchies are rebuilt through [`HierarchyBuilder`], so they
/// hold the same guarantees as built ones.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde-support",
    derive(Serialize, Deserialize),
    serde(try_from = "RawHierarchy")
)]
pub struct BoneHierarchy {
    nodes: Vec<HierarchyNode>,
    by_name: HashMap<String, NodeId>,
}

/// Serialized form of a [`BoneHierarchy`] before validation
#[cfg(feature = "serde-support")]
#[derive(Deserialize)]
struct RawHierarchy {
    nodes: Vec<HierarchyNode>,
    #[serde(default)]
    by_name: Option<HashMap<String, NodeId>>,
}

#[cfg(feature = "serde-support")]
impl TryFrom<RawHierarchy> for BoneHierarchy {
    type Error = AnimationError;

    fn try_from(raw: RawHierarchy) -> Result<Self> {
        let mut nodes = raw.nodes.into_iter();
        let root = nodes
            .next()
            .ok_or_else(|| AnimationError::malformed("hierarchy has no root node"))?;
        if root.parent.is_some() {
            return Err(AnimationError::malformed(format!(
                "root node '{}' has a parent",
                root.name
            )));
        }

        let mut stored_children = vec![root.children];
        let mut builder = HierarchyBuilder::new(root.name, root.bind_local_transform);
        for (index, node) in nodes.enumerate() {
            let id = index + 1;
            // Parents must precede their children, which rules out cycles
            let parent = match node.parent {
                Some(parent) if parent.index() < id => parent,
                _ => {
                    return Err(AnimationError::malformed(format!(
                        "node '{}' has no parent preceding it",
                        node.name
                    )));
                }
            };
            builder.add_child(parent, node.name, node.bind_local_transform)?;
            stored_children.push(node.children);
        }

        let hierarchy = builder.build();
        for (node, children) in hierarchy.nodes.iter().zip(&stored_children) {
            if node.children != *children {
                return Err(AnimationError::malformed(format!(
                    "children of node '{}' do not match the parent links",
                    node.name
                )));
            }
        }
        if raw
            .by_name
            .is_some_and(|by_name| by_name != hierarchy.by_name)
        {
            return Err(AnimationError::malformed(
                "node name lookup does not match the nodes",
            ));
        }
        Ok(hierarchy)
    }
}

impl BoneHierarchy {
    /// Hierarchy consisting of a single root node
    pub fn single(name: impl Into<String>, bind_local_transform: Mat4) -> Self {
        HierarchyBuilder::new(name, bind_local_transform).build()
    }

    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&HierarchyNode> {
        self.nodes.get(id.index())
    }

    pub fn nodes(&self) -> &[HierarchyNode] {
        &self.nodes
    }

    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.by_name.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Node ids in depth-first pre-order, children in stored order
    pub fn pre_order(&self) -> PreOrder<'_> {
        PreOrder {
            hierarchy: self,
            stack: if self.nodes.is_empty() {
                Vec::new()
            } else {
                vec![NodeId::ROOT]
            },
        }
    }

    /// Number of edges between the root and `id`
    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = self.node(id).and_then(|n| n.parent);
        while let Some(parent) = current {
            depth += 1;
            current = self.node(parent).and_then(|n| n.parent);
        }
        depth
    }
}

/// Depth-first pre-order iterator over a hierarchy
pub struct PreOrder<'a> {
    hierarchy: &'a BoneHierarchy,
    stack: Vec<NodeId>,
}

impl Iterator for PreOrder<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        if let Some(node) = self.hierarchy.node(id) {
            // Reversed so the first child is visited first
            self.stack.extend(node.children.iter().rev());
        }
        Some(id)
    }
}

/// Incremental builder for [`BoneHierarchy`]
#[derive(Debug, Clone)]
pub struct HierarchyBuilder {
    nodes: Vec<HierarchyNode>,
    by_name: HashMap<String, NodeId>,
}

impl HierarchyBuilder {
    /// Start a hierarchy with its root node
    pub fn new(root_name: impl Into<String>, bind_local_transform: Mat4) -> Self {
        let name = root_name.into();
        let mut by_name = HashMap::new();
        by_name.insert(name.clone(), NodeId::ROOT);
        Self {
            nodes: vec![HierarchyNode {
                name,
                bind_local_transform,
                parent: None,
                children: Vec::new(),
            }],
            by_name,
        }
    }

    /// Attach a new child under `parent`
    ///
    /// Names must be unique within the hierarchy.
    pub fn add_child(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        bind_local_transform: Mat4,
    ) -> Result<NodeId> {
        let name = name.into();
        if parent.index() >= self.nodes.len() {
            return Err(AnimationError::malformed(format!(
                "parent node {} of '{name}' does not exist",
                parent.0
            )));
        }
        if self.by_name.contains_key(&name) {
            return Err(AnimationError::malformed(format!(
                "duplicate node name '{name}' in hierarchy"
            )));
        }

        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(HierarchyNode {
            name: name.clone(),
            bind_local_transform,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.index()].children.push(id);
        self.by_name.insert(name, id);
        Ok(id)
    }

    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.by_name.get(name).copied()
    }

    pub fn build(self) -> BoneHierarchy {
        BoneHierarchy {
            nodes: self.nodes,
            by_name: self.by_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_hierarchy() -> BoneHierarchy {
        // root
        // ├── spine
        // │   └── head
        // └── hip
        let mut builder = HierarchyBuilder::new("root", Mat4::IDENTITY);
        let spine = builder
            .add_child(NodeId::ROOT, "spine", Mat4::IDENTITY)
            .unwrap();
        builder.add_child(spine, "head", Mat4::IDENTITY).unwrap();
        builder
            .add_child(NodeId::ROOT, "hip", Mat4::IDENTITY)
            .unwrap();
        builder.build()
    }

    #[test]
    fn test_pre_order_follows_child_order() {
        let hierarchy = sample_hierarchy();
        let names: Vec<&str> = hierarchy
            .pre_order()
            .map(|id| hierarchy.node(id).unwrap().name.as_str())
            .collect();
        assert_eq!(names, vec!["root", "spine", "head", "hip"]);
    }

    #[test]
    fn test_find_and_depth() {
        let hierarchy = sample_hierarchy();
        let head = hierarchy.find("head").unwrap();
        assert_eq!(hierarchy.depth(head), 2);
        assert_eq!(hierarchy.depth(hierarchy.root()), 0);
        assert!(hierarchy.find("tail").is_none());
    }

    #[test]
    fn test_parent_links() {
        let hierarchy = sample_hierarchy();
        let head = hierarchy.find("head").unwrap();
        let spine = hierarchy.find("spine").unwrap();
        assert_eq!(hierarchy.node(head).unwrap().parent, Some(spine));
        assert_eq!(hierarchy.node(NodeId::ROOT).unwrap().parent, None);
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut builder = HierarchyBuilder::new("root", Mat4::IDENTITY);
        builder
            .add_child(NodeId::ROOT, "arm", Mat4::IDENTITY)
            .unwrap();
        let err = builder
            .add_child(NodeId::ROOT, "arm", Mat4::IDENTITY)
            .unwrap_err();
        assert!(matches!(err, AnimationError::MalformedAnimationSource(_)));
    }

    #[test]
    fn test_unknown_parent_rejected() {
        let mut builder = HierarchyBuilder::new("root", Mat4::IDENTITY);
        assert!(builder.add_child(NodeId(7), "arm", Mat4::IDENTITY).is_err());
    }

    #[test]
    fn test_single() {
        let hierarchy = BoneHierarchy::single("only", Mat4::IDENTITY);
        assert_eq!(hierarchy.len(), 1);
        assert_eq!(hierarchy.pre_order().count(), 1);
    }
}
