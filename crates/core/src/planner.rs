use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::model::{DirSpan, EmissionEntry, TreeNode};

/// Flat emission plan for one tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// Records in pre-order: each directory directly before its subtree.
    pub entries: Vec<EmissionEntry>,
    /// Keyed by directory path with trailing slash; the root is `""`.
    pub spans: BTreeMap<String, DirSpan>,
    pub num_files: usize,
}

impl Layout {
    pub fn num_entries(&self) -> usize {
        self.entries.len()
    }

    pub fn root_entries(&self) -> u32 {
        self.direct_child_count("").unwrap_or(0)
    }

    pub fn direct_child_count(&self, dir_path: &str) -> Option<u32> {
        self.spans.get(dir_path).map(|s| s.direct_children)
    }

    /// Indices of the records that belong directly to `dir_path`, skipping
    /// over nested subtrees.
    pub fn direct_children(&self, dir_path: &str) -> Vec<usize> {
        let Some(span) = self.spans.get(dir_path) else {
            return Vec::new();
        };
        let mut out = Vec::with_capacity(span.direct_children as usize);
        let mut i = span.first_child;
        while i < span.end {
            out.push(i);
            i = match &self.entries[i] {
                EmissionEntry::Directory { path, .. } => self.spans[path.as_str()].end,
                EmissionEntry::File { .. } => i + 1,
            };
        }
        out
    }
}

/// Flattens a captured tree. Children of `root` are emitted; `root` itself
/// has no record.
pub fn plan(root: &TreeNode) -> Result<Layout> {
    let children = root.children();
    let sub = flatten(children, "")?;
    let mut spans = sub.spans;
    spans.insert(
        String::new(),
        DirSpan {
            first_child: 0,
            end: sub.entries.len(),
            direct_children: fan_out(children, "")?,
        },
    );
    Ok(Layout {
        entries: sub.entries,
        spans,
        num_files: sub.files,
    })
}

#[derive(Default)]
struct Subtree {
    entries: Vec<EmissionEntry>,
    /// Indices relative to the start of `entries`.
    spans: BTreeMap<String, DirSpan>,
    files: usize,
}

fn flatten(children: &[TreeNode], prefix: &str) -> Result<Subtree> {
    let mut out = Subtree::default();
    for child in children {
        match child {
            TreeNode::File { name } => {
                out.entries.push(EmissionEntry::File {
                    path: format!("{prefix}{name}"),
                });
                out.files += 1;
            }
            TreeNode::Directory { name, children } => {
                let path = format!("{prefix}{name}/");
                let direct_children = fan_out(children, &path)?;
                let start = out.entries.len();
                out.entries.push(EmissionEntry::Directory {
                    path: path.clone(),
                    direct_child_count: direct_children,
                });

                let inner = flatten(children, &path)?;
                let shift = start + 1;
                out.spans.extend(inner.spans.into_iter().map(|(p, s)| {
                    (
                        p,
                        DirSpan {
                            first_child: s.first_child + shift,
                            end: s.end + shift,
                            ..s
                        },
                    )
                }));
                out.spans.insert(
                    path,
                    DirSpan {
                        first_child: shift,
                        end: shift + inner.entries.len(),
                        direct_children,
                    },
                );
                out.entries.extend(inner.entries);
                out.files += inner.files;
            }
        }
    }
    Ok(out)
}

fn fan_out(children: &[TreeNode], path: &str) -> Result<u32> {
    u32::try_from(children.len()).map_err(|_| Error::FieldOverflow {
        path: path.to_string(),
        field: "direct child count",
    })
}
