//! Tree rendering for node hierarchies

use console::Style;
use skelanim_core::{BoneHierarchy, BoneIndex, NodeId};

/// A node in a rendered tree
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub name: String,
    pub node_type: NodeType,
    pub children: Vec<TreeNode>,
    /// Key/value pairs shown after the name, in insertion order
    pub metadata: Vec<(String, String)>,
}

/// Role of a hierarchy node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    /// Title line of the tree
    Root,
    /// Node with a skinning slot
    Bone,
    /// Node traversed for composition only
    Helper,
}

/// Options for tree rendering
#[derive(Debug, Clone)]
pub struct TreeOptions {
    pub max_depth: Option<usize>,
    pub no_color: bool,
    pub show_metadata: bool,
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self {
            max_depth: None,
            no_color: false,
            show_metadata: true,
        }
    }
}

impl TreeNode {
    pub fn new(name: impl Into<String>, node_type: NodeType) -> Self {
        Self {
            name: name.into(),
            node_type,
            children: Vec::new(),
            metadata: Vec::new(),
        }
    }

    pub fn add_child(mut self, child: TreeNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_metadata(mut self, key: &str, value: impl ToString) -> Self {
        self.metadata.push((key.to_string(), value.to_string()));
        self
    }
}

impl NodeType {
    pub fn marker(self) -> &'static str {
        match self {
            NodeType::Root => "■",
            NodeType::Bone => "●",
            NodeType::Helper => "○",
        }
    }

    pub fn style(self, no_color: bool) -> Style {
        if no_color {
            Style::new()
        } else {
            match self {
                NodeType::Root => Style::new().bold().cyan(),
                NodeType::Bone => Style::new().green(),
                NodeType::Helper => Style::new().dim(),
            }
        }
    }
}

/// Build a tree of `hierarchy`, marking nodes that own a slot in `bone_index`
pub fn hierarchy_tree(title: &str, hierarchy: &BoneHierarchy, bone_index: &BoneIndex) -> TreeNode {
    fn build(hierarchy: &BoneHierarchy, bone_index: &BoneIndex, id: NodeId) -> Option<TreeNode> {
        let node = hierarchy.node(id)?;
        let mut tree = match bone_index.get(&node.name) {
            Some(info) => TreeNode::new(node.name.as_str(), NodeType::Bone).with_metadata("bone", info.id),
            None => TreeNode::new(node.name.as_str(), NodeType::Helper),
        };
        for child in &node.children {
            if let Some(child) = build(hierarchy, bone_index, *child) {
                tree = tree.add_child(child);
            }
        }
        Some(tree)
    }

    let root = TreeNode::new(title, NodeType::Root)
        .with_metadata("nodes", hierarchy.len())
        .with_metadata("bones", bone_index.len());
    match build(hierarchy, bone_index, hierarchy.root()) {
        Some(tree) => root.add_child(tree),
        None => root,
    }
}

/// Render a tree to a string
pub fn render_tree(root: &TreeNode, options: &TreeOptions) -> String {
    let mut output = String::new();
    render_node(root, &mut output, "", true, 0, options);
    output
}

fn render_node(
    node: &TreeNode,
    output: &mut String,
    prefix: &str,
    is_last: bool,
    depth: usize,
    options: &TreeOptions,
) {
    if let Some(max_depth) = options.max_depth
        && depth > max_depth
    {
        return;
    }

    let connector = if depth == 0 {
        ""
    } else if is_last {
        "└── "
    } else {
        "├── "
    };
    let style = node.node_type.style(options.no_color);

    output.push_str(prefix);
    output.push_str(connector);
    output.push_str(node.node_type.marker());
    output.push(' ');
    output.push_str(&style.apply_to(&node.name).to_string());

    if options.show_metadata && !node.metadata.is_empty() {
        let parts: Vec<String> = node
            .metadata
            .iter()
            .map(|(key, value)| format!("{key}:{value}"))
            .collect();
        output.push_str(&format!(" [{}]", parts.join(", ")));
    }
    output.push('\n');

    let child_prefix = if depth == 0 {
        String::new()
    } else {
        format!("{}{}", prefix, if is_last { "    " } else { "│   " })
    };
    for (i, child) in node.children.iter().enumerate() {
        render_node(
            child,
            output,
            &child_prefix,
            i + 1 == node.children.len(),
            depth + 1,
            options,
        );
    }
}
