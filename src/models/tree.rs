use std::path::PathBuf;

use super::EntryKind;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TreeNode {
    pub name: String,
    pub kind: EntryKind,
    pub error: Option<String>,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn is_directory(&self) -> bool {
        self.kind.is_directory()
    }

    fn sort_recursive(&mut self) {
        sort_nodes(&mut self.children);
    }
}

/// Display tree for one source selection. Children keep directory-listing
/// order unless [`DirTree::sorted`] is applied.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DirTree {
    pub root: PathBuf,
    pub error: Option<String>,
    pub children: Vec<TreeNode>,
}

impl DirTree {
    /// Sort every level by name, directories and files interleaved.
    pub fn sorted(mut self) -> Self {
        sort_nodes(&mut self.children);
        self
    }
}

fn sort_nodes(nodes: &mut [TreeNode]) {
    nodes.sort_by(|a, b| a.name.cmp(&b.name));
    for node in nodes {
        node.sort_recursive();
    }
}
