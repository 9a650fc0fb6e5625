use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{} is not a directory", .path.display())]
    NotADirectory { path: PathBuf },

    #[error("name of {path} is {len} bytes, at most {max} allowed", max = crate::format::MAX_NAME_LEN)]
    NameTooLong { path: String, len: usize },

    #[error("name of {path} is not 7-bit ASCII")]
    InvalidName { path: String },

    #[error("{field} of {path} does not fit in 32 bits")]
    FieldOverflow { path: String, field: &'static str },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed image at offset {offset}: {reason}")]
    Malformed { offset: usize, reason: String },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn malformed(offset: usize, reason: impl Into<String>) -> Self {
        Error::Malformed {
            offset,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
