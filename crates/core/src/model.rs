use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    File,
    Dir,
}

/// A captured source tree. Children keep the order the source listed them in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TreeNode {
    File { name: String },
    Directory { name: String, children: Vec<TreeNode> },
}

impl TreeNode {
    pub fn name(&self) -> &str {
        match self {
            TreeNode::File { name } | TreeNode::Directory { name, .. } => name,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            TreeNode::File { .. } => NodeKind::File,
            TreeNode::Directory { .. } => NodeKind::Dir,
        }
    }

    pub fn children(&self) -> &[TreeNode] {
        match self {
            TreeNode::File { .. } => &[],
            TreeNode::Directory { children, .. } => children,
        }
    }
}

/// One header record to be emitted, in flat pre-order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmissionEntry {
    File {
        path: String,
    },
    /// `path` ends with a `/`.
    Directory {
        path: String,
        direct_child_count: u32,
    },
}

impl EmissionEntry {
    pub fn path(&self) -> &str {
        match self {
            EmissionEntry::File { path } | EmissionEntry::Directory { path, .. } => path,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            EmissionEntry::File { .. } => NodeKind::File,
            EmissionEntry::Directory { .. } => NodeKind::Dir,
        }
    }

    /// Final path component, without the trailing slash of directories.
    pub fn name(&self) -> &str {
        let path = self.path().trim_end_matches('/');
        path.rsplit('/').next().unwrap_or(path)
    }
}

/// Where a directory's records sit in the flat order. `end` is exclusive and
/// covers the whole nested subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirSpan {
    pub first_child: usize,
    pub end: usize,
    pub direct_children: u32,
}

/// Manifest line describing one emitted header record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub index: usize,
    pub path: String,
    pub kind: NodeKind,
    pub offset: Option<u32>,
    pub length: Option<u32>,
    pub children: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_name_is_last_component() {
        let file = EmissionEntry::File {
            path: "etc/init/rc".into(),
        };
        assert_eq!(file.name(), "rc");

        let dir = EmissionEntry::Directory {
            path: "etc/init/".into(),
            direct_child_count: 1,
        };
        assert_eq!(dir.name(), "init");

        let top = EmissionEntry::File { path: "a.txt".into() };
        assert_eq!(top.name(), "a.txt");
    }

    #[test]
    fn file_node_has_no_children() {
        let node = TreeNode::File { name: "x".into() };
        assert!(node.children().is_empty());
        assert_eq!(node.kind(), NodeKind::File);
    }
}
