//! On-disk layout of a ramdisk image. All integers are little-endian.
//!
//! ```text
//! +--------------------+  0
//! | global header (16) |
//! +--------------------+  16
//! | record 0 (80)      |
//! | ...                |
//! +--------------------+  headers_size
//! | file data          |
//! +--------------------+  total_size
//! ```
//!
//! Record layout:
//!
//! | offset | file                | directory              |
//! |--------|---------------------|------------------------|
//! | 0      | `FILE_TAG` (u16)    | `DIR_TAG` (u16)        |
//! | 2      | data offset (u32)   | direct children (u32)  |
//! | 6      | name (64)           | name (64)              |
//! | 70     | length (u32)        | block count (u32)      |
//! | 74     | reserved (6)        | reserved (6)           |

pub const GLOBAL_HEADER_SIZE: usize = 16;
pub const RECORD_SIZE: usize = 80;
pub const NAME_FIELD_SIZE: usize = 64;
/// One byte of the name field is always left as padding.
pub const MAX_NAME_LEN: usize = NAME_FIELD_SIZE - 1;
pub const RESERVED_SIZE: usize = 6;

pub const FILE_TAG: u16 = 0xBAE7;
pub const DIR_TAG: u16 = 0x7EAB;

const NAME_OFFSET: usize = 6;
const TRAILER_OFFSET: usize = NAME_OFFSET + NAME_FIELD_SIZE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GlobalHeader {
    pub total_size: u32,
    pub num_files: u32,
    pub headers_size: u32,
    pub num_root_entries: u32,
}

impl GlobalHeader {
    pub fn to_bytes(&self) -> [u8; GLOBAL_HEADER_SIZE] {
        let mut out = [0u8; GLOBAL_HEADER_SIZE];
        out[0..4].copy_from_slice(&self.total_size.to_le_bytes());
        out[4..8].copy_from_slice(&self.num_files.to_le_bytes());
        out[8..12].copy_from_slice(&self.headers_size.to_le_bytes());
        out[12..16].copy_from_slice(&self.num_root_entries.to_le_bytes());
        out
    }

    pub fn from_bytes(b: &[u8; GLOBAL_HEADER_SIZE]) -> Self {
        Self {
            total_size: read_u32(b, 0),
            num_files: read_u32(b, 4),
            headers_size: read_u32(b, 8),
            num_root_entries: read_u32(b, 12),
        }
    }
}

/// Size of the header region for `num_entries` records, if it fits in a u32.
pub fn headers_size(num_entries: usize) -> Option<u32> {
    num_entries
        .checked_mul(RECORD_SIZE)
        .and_then(|n| n.checked_add(GLOBAL_HEADER_SIZE))
        .and_then(|n| u32::try_from(n).ok())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawRecord {
    File {
        offset: u32,
        name: String,
        length: u32,
    },
    Directory {
        children: u32,
        name: String,
        block_count: u32,
    },
}

impl RawRecord {
    /// Encodes the record. `name` must already satisfy [`check_name`].
    pub fn to_bytes(&self) -> [u8; RECORD_SIZE] {
        let (tag, word, name, trailer) = match self {
            RawRecord::File {
                offset,
                name,
                length,
            } => (FILE_TAG, *offset, name, *length),
            RawRecord::Directory {
                children,
                name,
                block_count,
            } => (DIR_TAG, *children, name, *block_count),
        };
        let mut out = [0u8; RECORD_SIZE];
        out[0..2].copy_from_slice(&tag.to_le_bytes());
        out[2..6].copy_from_slice(&word.to_le_bytes());
        let name = name.as_bytes();
        out[NAME_OFFSET..NAME_OFFSET + name.len()].copy_from_slice(name);
        out[TRAILER_OFFSET..TRAILER_OFFSET + 4].copy_from_slice(&trailer.to_le_bytes());
        out
    }

    /// Decodes a record. Returns `None` for an unknown tag.
    pub fn from_bytes(b: &[u8; RECORD_SIZE]) -> Option<Self> {
        let tag = u16::from_le_bytes([b[0], b[1]]);
        let word = read_u32(b, 2);
        let field = &b[NAME_OFFSET..TRAILER_OFFSET];
        let end = field.iter().position(|&c| c == 0).unwrap_or(field.len());
        let name = String::from_utf8_lossy(&field[..end]).into_owned();
        let trailer = read_u32(b, TRAILER_OFFSET);
        match tag {
            FILE_TAG => Some(RawRecord::File {
                offset: word,
                name,
                length: trailer,
            }),
            DIR_TAG => Some(RawRecord::Directory {
                children: word,
                name,
                block_count: trailer,
            }),
            _ => None,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            RawRecord::File { name, .. } | RawRecord::Directory { name, .. } => name,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameError {
    TooLong(usize),
    NotAscii,
}

/// A name must be 7-bit ASCII and leave room for one byte of padding.
pub fn check_name(name: &str) -> Result<(), NameError> {
    if !name.is_ascii() {
        return Err(NameError::NotAscii);
    }
    if name.len() > MAX_NAME_LEN {
        return Err(NameError::TooLong(name.len()));
    }
    Ok(())
}

fn read_u32(b: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([b[at], b[at + 1], b[at + 2], b[at + 3]])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_record_layout() {
        let rec = RawRecord::File {
            offset: 3,
            name: "b.bin".into(),
            length: 2,
        };
        let b = rec.to_bytes();
        assert_eq!(&b[0..2], &[0xE7, 0xBA]);
        assert_eq!(&b[2..6], &[3, 0, 0, 0]);
        assert_eq!(&b[6..11], b"b.bin");
        assert!(b[11..70].iter().all(|&c| c == 0));
        assert_eq!(&b[70..74], &[2, 0, 0, 0]);
        assert_eq!(&b[74..80], &[0; RESERVED_SIZE]);
        assert_eq!(RawRecord::from_bytes(&b), Some(rec));
    }

    #[test]
    fn directory_record_layout() {
        let rec = RawRecord::Directory {
            children: 7,
            name: "sub".into(),
            block_count: 7,
        };
        let b = rec.to_bytes();
        assert_eq!(&b[0..2], &[0xAB, 0x7E]);
        assert_eq!(&b[2..6], &[7, 0, 0, 0]);
        assert_eq!(&b[70..74], &[7, 0, 0, 0]);
        assert_eq!(RawRecord::from_bytes(&b), Some(rec));
    }

    #[test]
    fn unknown_tag_is_rejected() {
        let b = [0u8; RECORD_SIZE];
        assert_eq!(RawRecord::from_bytes(&b), None);
    }

    #[test]
    fn max_length_name_fills_field_but_one() {
        let name = "x".repeat(MAX_NAME_LEN);
        let b = RawRecord::File {
            offset: 0,
            name: name.clone(),
            length: 0,
        }
        .to_bytes();
        assert_eq!(&b[6..69], name.as_bytes());
        assert_eq!(b[69], 0);
    }

    #[test]
    fn name_limits() {
        assert_eq!(check_name(&"a".repeat(63)), Ok(()));
        assert_eq!(check_name(&"a".repeat(64)), Err(NameError::TooLong(64)));
        assert_eq!(check_name("caf\u{e9}"), Err(NameError::NotAscii));
        assert_eq!(check_name(""), Ok(()));
    }

    #[test]
    fn global_header_is_little_endian() {
        let h = GlobalHeader {
            total_size: 261,
            num_files: 2,
            headers_size: 256,
            num_root_entries: 2,
        };
        let b = h.to_bytes();
        assert_eq!(b, [5, 1, 0, 0, 2, 0, 0, 0, 0, 1, 0, 0, 2, 0, 0, 0]);
        assert_eq!(GlobalHeader::from_bytes(&b), h);
    }

    #[test]
    fn headers_size_overflow() {
        assert_eq!(headers_size(3), Some(256));
        assert_eq!(headers_size(0), Some(16));
        assert_eq!(headers_size(usize::MAX / 2), None);
    }
}
