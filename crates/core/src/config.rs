use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub const DEFAULT_SOURCE: &str = "./ramdisk";
pub const DEFAULT_OUTPUT: &str = "./ramdisk.bin";

/// What to pack and where to put it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildConfig {
    pub source: PathBuf,
    pub output: PathBuf,
    /// Where the caller should export the record manifest, if anywhere.
    pub manifest: Option<PathBuf>,
    /// Parse the image back before it is written.
    pub verify: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::from(DEFAULT_SOURCE),
            output: PathBuf::from(DEFAULT_OUTPUT),
            manifest: None,
            verify: false,
        }
    }
}
