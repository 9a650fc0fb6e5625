pub mod builder;
pub mod config;
pub mod emitter;
pub mod error;
pub mod export;
pub mod format;
pub mod fs;
pub mod model;
pub mod planner;
pub mod reader;
pub mod scanner;

pub use builder::*;
pub use config::BuildConfig;
pub use emitter::Image;
pub use error::{Error, Result};
pub use fs::{HostFs, MemFs, OutputSink, SourceFs};
pub use model::*;
