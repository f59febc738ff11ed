//! Tree rendering for skeleton hierarchies

use console::Style;
use std::collections::BTreeMap;

/// A node in a rendered tree
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub name: String,
    pub node_type: NodeType,
    pub children: Vec<TreeNode>,
    pub metadata: BTreeMap<String, String>,
}

/// Types of nodes in the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Root,
    Bone,
    Region,
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
    pub fn new(name: String, node_type: NodeType) -> Self {
        Self {
            name,
            node_type,
            children: Vec::new(),
            metadata: BTreeMap::new(),
        }
    }

    /// Add a child node
    pub fn add_child(mut self, child: TreeNode) -> Self {
        self.children.push(child);
        self
    }

    /// Add metadata
    pub fn with_metadata(mut self, key: &str, value: &str) -> Self {
        self.metadata.insert(key.to_string(), value.to_string());
        self
    }
}

impl NodeType {
    /// Marker printed before the node name
    pub fn icon(&self) -> &'static str {
        match self {
            NodeType::Root => "📁",
            NodeType::Bone => "🦴",
            NodeType::Region => "🔷",
        }
    }

    /// Get color style for node type
    pub fn style(&self, no_color: bool) -> Style {
        if no_color {
            Style::new()
        } else {
            match self {
                NodeType::Root => Style::new().bold().cyan(),
                NodeType::Bone => Style::new().green(),
                NodeType::Region => Style::new().magenta(),
            }
        }
    }
}

/// Render a tree structure to string
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

    let style = node.node_type.style(options.no_color);
    let connector = if depth == 0 {
        ""
    } else if is_last {
        "└── "
    } else {
        "├── "
    };

    output.push_str(&format!(
        "{}{}{} {}\n",
        prefix,
        connector,
        node.node_type.icon(),
        style.apply_to(&node.name)
    ));

    let new_prefix = if depth == 0 {
        String::new()
    } else {
        format!("{}{}", prefix, if is_last { "    " } else { "│   " })
    };

    if options.show_metadata && !node.metadata.is_empty() {
        let meta_style = if options.no_color {
            Style::new()
        } else {
            Style::new().dim()
        };
        for (key, value) in &node.metadata {
            output.push_str(&format!(
                "{}    {}: {}\n",
                new_prefix,
                meta_style.apply_to(key),
                value
            ));
        }
    }

    for (i, child) in node.children.iter().enumerate() {
        let is_last_child = i == node.children.len() - 1;
        render_node(
            child,
            output,
            &new_prefix,
            is_last_child,
            depth + 1,
            options,
        );
    }
}
