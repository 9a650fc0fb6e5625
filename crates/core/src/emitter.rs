use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Error, Result};
use crate::format::{self, GlobalHeader, NameError, RawRecord};
use crate::fs::SourceFs;
use crate::model::{EmissionEntry, Record};
use crate::planner::Layout;

/// A finished image held in memory.
#[derive(Debug, Clone)]
pub struct Image {
    pub bytes: Vec<u8>,
    pub header: GlobalHeader,
    /// One line per header record, in emission order.
    pub records: Vec<Record>,
}

impl Image {
    pub fn data_size(&self) -> u32 {
        self.header.total_size - self.header.headers_size
    }
}

/// Serializes a [`Layout`] into image bytes, reading file data from `fs`
/// relative to `root`.
pub struct Emitter<'a> {
    fs: &'a dyn SourceFs,
    root: &'a Path,
}

impl<'a> Emitter<'a> {
    pub fn new(fs: &'a dyn SourceFs, root: &'a Path) -> Self {
        Self { fs, root }
    }

    pub fn emit(&self, layout: &Layout) -> Result<Image> {
        let headers_size = format::headers_size(layout.num_entries())
            .ok_or_else(|| overflow("", "header region size"))?;
        let num_files =
            u32::try_from(layout.num_files).map_err(|_| overflow("", "file count"))?;
        let mut header = GlobalHeader {
            total_size: 0,
            num_files,
            headers_size,
            num_root_entries: layout.root_entries(),
        };

        let mut buf = Vec::with_capacity(headers_size as usize);
        buf.extend_from_slice(&header.to_bytes());

        let mut records = Vec::with_capacity(layout.num_entries());
        let mut pending: Vec<(PathBuf, u32)> = Vec::with_capacity(layout.num_files);
        let mut data_offset: u32 = 0;

        for (index, entry) in layout.entries.iter().enumerate() {
            let path = entry.path();
            let name = entry.name();
            check_name(path, name)?;

            let (raw, record) = match entry {
                EmissionEntry::Directory {
                    direct_child_count, ..
                } => (
                    RawRecord::Directory {
                        children: *direct_child_count,
                        name: name.to_string(),
                        block_count: *direct_child_count,
                    },
                    Record {
                        index,
                        path: path.to_string(),
                        kind: entry.kind(),
                        offset: None,
                        length: None,
                        children: Some(*direct_child_count),
                    },
                ),
                EmissionEntry::File { .. } => {
                    let source = self.root.join(path);
                    let length = u32::try_from(self.fs.file_size(&source)?)
                        .map_err(|_| overflow(path, "file length"))?;
                    let offset = data_offset;
                    data_offset = data_offset
                        .checked_add(length)
                        .ok_or_else(|| overflow(path, "data offset"))?;
                    pending.push((source, length));
                    (
                        RawRecord::File {
                            offset,
                            name: name.to_string(),
                            length,
                        },
                        Record {
                            index,
                            path: path.to_string(),
                            kind: entry.kind(),
                            offset: Some(offset),
                            length: Some(length),
                            children: None,
                        },
                    )
                }
            };
            debug!(index, path, ?raw, "record");
            buf.extend_from_slice(&raw.to_bytes());
            records.push(record);
        }

        let total_size = headers_size
            .checked_add(data_offset)
            .ok_or_else(|| overflow("", "total size"))?;
        buf.reserve(data_offset as usize);

        for (source, length) in pending {
            let bytes = self.fs.read_all_bytes(&source)?;
            if bytes.len() != length as usize {
                return Err(Error::io(
                    source,
                    io::Error::new(io::ErrorKind::InvalidData, "file changed size during build"),
                ));
            }
            buf.extend_from_slice(&bytes);
        }

        header.total_size = total_size;
        buf[0..4].copy_from_slice(&total_size.to_le_bytes());
        debug_assert_eq!(buf.len(), total_size as usize);

        Ok(Image {
            bytes: buf,
            header,
            records,
        })
    }
}

fn check_name(path: &str, name: &str) -> Result<()> {
    format::check_name(name).map_err(|e| match e {
        NameError::TooLong(len) => Error::NameTooLong {
            path: path.to_string(),
            len,
        },
        NameError::NotAscii => Error::InvalidName {
            path: path.to_string(),
        },
    })
}

fn overflow(path: &str, field: &'static str) -> Error {
    Error::FieldOverflow {
        path: path.to_string(),
        field,
    }
}
