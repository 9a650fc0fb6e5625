use std::cell::RefCell;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::model::NodeKind;

/// Read-only queries the builder makes against the source tree.
pub trait SourceFs {
    /// Direct entries of `path`, in the order the source enumerates them.
    fn list_entries(&self, path: &Path) -> Result<Vec<(String, NodeKind)>>;
    fn is_directory(&self, path: &Path) -> bool;
    fn file_size(&self, path: &Path) -> Result<u64>;
    fn read_all_bytes(&self, path: &Path) -> Result<Vec<u8>>;
}

/// Destination of a finished image. Called once per successful build.
pub trait OutputSink {
    fn write_file(&self, path: &Path, bytes: &[u8]) -> Result<()>;
}

/// The real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostFs;

impl SourceFs for HostFs {
    fn list_entries(&self, path: &Path) -> Result<Vec<(String, NodeKind)>> {
        let mut entries = Vec::new();
        for entry in WalkDir::new(path).min_depth(1).max_depth(1) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    let at = err.path().unwrap_or(path).to_path_buf();
                    return Err(Error::io(at, io::Error::from(err)));
                }
            };
            let Some(name) = entry.file_name().to_str() else {
                return Err(Error::io(
                    entry.path(),
                    io::Error::new(io::ErrorKind::InvalidData, "file name is not valid UTF-8"),
                ));
            };
            // Links are resolved, so a link to a directory is packed as one.
            let meta = std::fs::metadata(entry.path()).map_err(|e| Error::io(entry.path(), e))?;
            let kind = if meta.is_dir() {
                NodeKind::Dir
            } else {
                NodeKind::File
            };
            entries.push((name.to_string(), kind));
        }
        Ok(entries)
    }

    fn is_directory(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn file_size(&self, path: &Path) -> Result<u64> {
        std::fs::metadata(path)
            .map(|m| m.len())
            .map_err(|e| Error::io(path, e))
    }

    fn read_all_bytes(&self, path: &Path) -> Result<Vec<u8>> {
        std::fs::read(path).map_err(|e| Error::io(path, e))
    }
}

impl OutputSink for HostFs {
    fn write_file(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        std::fs::write(path, bytes).map_err(|e| Error::io(path, e))
    }
}

#[derive(Debug, Clone)]
enum MemNode {
    File(Vec<u8>),
    Dir(Vec<String>),
}

/// In-memory source and sink. Directories list their children in insertion
/// order, and parents are created on demand.
#[derive(Debug, Default)]
pub struct MemFs {
    nodes: HashMap<PathBuf, MemNode>,
    written: RefCell<HashMap<PathBuf, Vec<u8>>>,
}

impl MemFs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_dir(&mut self, path: impl AsRef<Path>) -> &mut Self {
        let path = path.as_ref();
        if !self.nodes.contains_key(path) {
            self.link_to_parent(path);
            self.nodes.insert(path.to_path_buf(), MemNode::Dir(Vec::new()));
        }
        self
    }

    pub fn add_file(&mut self, path: impl AsRef<Path>, contents: impl Into<Vec<u8>>) -> &mut Self {
        let path = path.as_ref();
        if !self.nodes.contains_key(path) {
            self.link_to_parent(path);
        }
        self.nodes
            .insert(path.to_path_buf(), MemNode::File(contents.into()));
        self
    }

    /// Bytes handed to [`OutputSink::write_file`] for `path`, if any.
    pub fn written(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        self.written.borrow().get(path.as_ref()).cloned()
    }

    pub fn write_count(&self) -> usize {
        self.written.borrow().len()
    }

    fn link_to_parent(&mut self, path: &Path) {
        let (Some(parent), Some(name)) = (path.parent(), path.file_name()) else {
            return;
        };
        if parent.as_os_str().is_empty() {
            return;
        }
        self.add_dir(parent);
        if let Some(MemNode::Dir(children)) = self.nodes.get_mut(parent) {
            children.push(name.to_string_lossy().into_owned());
        }
    }

    fn node(&self, path: &Path) -> Result<&MemNode> {
        self.nodes
            .get(path)
            .ok_or_else(|| Error::io(path, io::Error::from(io::ErrorKind::NotFound)))
    }

    fn file(&self, path: &Path) -> Result<&[u8]> {
        match self.node(path)? {
            MemNode::File(bytes) => Ok(bytes),
            MemNode::Dir(_) => Err(Error::io(
                path,
                io::Error::new(io::ErrorKind::Other, "is a directory"),
            )),
        }
    }
}

impl SourceFs for MemFs {
    fn list_entries(&self, path: &Path) -> Result<Vec<(String, NodeKind)>> {
        let MemNode::Dir(children) = self.node(path)? else {
            return Err(Error::io(
                path,
                io::Error::new(io::ErrorKind::Other, "not a directory"),
            ));
        };
        Ok(children
            .iter()
            .map(|name| {
                let kind = match self.nodes.get(&path.join(name)) {
                    Some(MemNode::Dir(_)) => NodeKind::Dir,
                    _ => NodeKind::File,
                };
                (name.clone(), kind)
            })
            .collect())
    }

    fn is_directory(&self, path: &Path) -> bool {
        matches!(self.nodes.get(path), Some(MemNode::Dir(_)))
    }

    fn file_size(&self, path: &Path) -> Result<u64> {
        Ok(self.file(path)?.len() as u64)
    }

    fn read_all_bytes(&self, path: &Path) -> Result<Vec<u8>> {
        Ok(self.file(path)?.to_vec())
    }
}

impl OutputSink for MemFs {
    fn write_file(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        self.written
            .borrow_mut()
            .insert(path.to_path_buf(), bytes.to_vec());
        Ok(())
    }
}
