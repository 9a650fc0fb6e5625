//! Parses an image back into a tree. This is what a boot-time reader sees,
//! and is used to check freshly built images.

use crate::error::{Error, Result};
use crate::format::{GlobalHeader, RawRecord, GLOBAL_HEADER_SIZE, RECORD_SIZE};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedNode {
    File { name: String, contents: Vec<u8> },
    Directory { name: String, children: Vec<ParsedNode> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedImage {
    pub header: GlobalHeader,
    /// Direct children of the root.
    pub entries: Vec<ParsedNode>,
    /// Every header record in stored order.
    pub records: Vec<RawRecord>,
}

pub fn parse(bytes: &[u8]) -> Result<ParsedImage> {
    let Some(head) = bytes.first_chunk::<GLOBAL_HEADER_SIZE>() else {
        return Err(Error::malformed(0, "truncated global header"));
    };
    let header = GlobalHeader::from_bytes(head);
    if header.total_size as usize != bytes.len() {
        return Err(Error::malformed(
            0,
            format!(
                "total_size is {} but image is {} bytes",
                header.total_size,
                bytes.len()
            ),
        ));
    }

    let headers_size = header.headers_size as usize;
    if headers_size < GLOBAL_HEADER_SIZE
        || (headers_size - GLOBAL_HEADER_SIZE) % RECORD_SIZE != 0
        || headers_size > bytes.len()
    {
        return Err(Error::malformed(
            8,
            format!("bad header region size {headers_size}"),
        ));
    }

    let mut records = Vec::with_capacity((headers_size - GLOBAL_HEADER_SIZE) / RECORD_SIZE);
    for (i, chunk) in bytes[GLOBAL_HEADER_SIZE..headers_size]
        .chunks_exact(RECORD_SIZE)
        .enumerate()
    {
        let offset = GLOBAL_HEADER_SIZE + i * RECORD_SIZE;
        let raw = chunk
            .first_chunk::<RECORD_SIZE>()
            .and_then(RawRecord::from_bytes)
            .ok_or_else(|| Error::malformed(offset, "unknown record tag"))?;
        records.push(raw);
    }

    let mut cursor = Cursor {
        records: &records,
        data: &bytes[headers_size..],
        next: 0,
        files: 0,
    };
    let entries = cursor.children(header.num_root_entries)?;
    if cursor.next != records.len() {
        return Err(Error::malformed(
            record_offset(cursor.next),
            format!(
                "{} records are not reachable from the root",
                records.len() - cursor.next
            ),
        ));
    }
    if cursor.files != header.num_files as usize {
        return Err(Error::malformed(
            4,
            format!(
                "num_files is {} but {} file records were found",
                header.num_files, cursor.files
            ),
        ));
    }

    Ok(ParsedImage {
        header,
        entries,
        records,
    })
}

struct Cursor<'a> {
    records: &'a [RawRecord],
    data: &'a [u8],
    next: usize,
    files: usize,
}

impl Cursor<'_> {
    fn children(&mut self, count: u32) -> Result<Vec<ParsedNode>> {
        let mut out = Vec::new();
        for _ in 0..count {
            let index = self.next;
            let Some(raw) = self.records.get(index) else {
                return Err(Error::malformed(
                    record_offset(index),
                    "directory claims more entries than there are records",
                ));
            };
            self.next += 1;
            let node = match raw {
                RawRecord::File {
                    offset,
                    name,
                    length,
                } => {
                    self.files += 1;
                    let start = *offset as usize;
                    let contents = start
                        .checked_add(*length as usize)
                        .and_then(|end| self.data.get(start..end))
                        .ok_or_else(|| {
                            Error::malformed(record_offset(index), "file data out of range")
                        })?;
                    ParsedNode::File {
                        name: name.clone(),
                        contents: contents.to_vec(),
                    }
                }
                RawRecord::Directory { children, name, .. } => ParsedNode::Directory {
                    name: name.clone(),
                    children: self.children(*children)?,
                },
            };
            out.push(node);
        }
        Ok(out)
    }
}

fn record_offset(index: usize) -> usize {
    GLOBAL_HEADER_SIZE + index * RECORD_SIZE
}
