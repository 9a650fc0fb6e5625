use std::path::Path;

use tracing::debug;

use crate::error::{Error, Result};
use crate::fs::SourceFs;
use crate::model::{NodeKind, TreeNode};

/// Captures a source directory into a [`TreeNode`] tree.
pub struct Scanner<'a> {
    fs: &'a dyn SourceFs,
}

impl<'a> Scanner<'a> {
    pub fn new(fs: &'a dyn SourceFs) -> Self {
        Self { fs }
    }

    /// Walks `root` to any depth. Names are not validated here.
    pub fn scan(&self, root: &Path) -> Result<TreeNode> {
        if !self.fs.is_directory(root) {
            return Err(Error::NotADirectory {
                path: root.to_path_buf(),
            });
        }
        let name = root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(TreeNode::Directory {
            name,
            children: self.scan_children(root)?,
        })
    }

    fn scan_children(&self, dir: &Path) -> Result<Vec<TreeNode>> {
        let listing = self.fs.list_entries(dir)?;
        debug!(dir = %dir.display(), entries = listing.len(), "scanned directory");

        let mut children = Vec::with_capacity(listing.len());
        for (name, kind) in listing {
            let node = match kind {
                NodeKind::File => TreeNode::File { name },
                NodeKind::Dir => {
                    let children = self.scan_children(&dir.join(&name))?;
                    TreeNode::Directory { name, children }
                }
            };
            children.push(node);
        }
        Ok(children)
    }
}
