use std::path::Path;

use serde::Serialize;
use tracing::{debug, info};

use crate::config::BuildConfig;
use crate::emitter::{Emitter, Image};
use crate::error::Result;
use crate::fs::{OutputSink, SourceFs};
use crate::model::NodeKind;
use crate::planner::plan;
use crate::reader;
use crate::scanner::Scanner;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildSummary {
    pub files: u32,
    pub dirs: u32,
    pub data_bytes: u32,
    pub total_size: u32,
}

impl BuildSummary {
    pub fn of(image: &Image) -> Self {
        let dirs = image
            .records
            .iter()
            .filter(|r| r.kind == NodeKind::Dir)
            .count() as u32;
        Self {
            files: image.header.num_files,
            dirs,
            data_bytes: image.data_size(),
            total_size: image.header.total_size,
        }
    }
}

/// Runs scan, plan and emit against a source, and hands finished images to
/// a sink.
pub struct Builder<'a> {
    fs: &'a dyn SourceFs,
    sink: &'a dyn OutputSink,
}

impl<'a> Builder<'a> {
    pub fn new(fs: &'a dyn SourceFs, sink: &'a dyn OutputSink) -> Self {
        Self { fs, sink }
    }

    /// Builds the image for `root` in memory. Nothing is written.
    pub fn build_image(&self, root: &Path) -> Result<Image> {
        let tree = Scanner::new(self.fs).scan(root)?;
        let layout = plan(&tree)?;
        debug!(
            entries = layout.num_entries(),
            files = layout.num_files,
            "planned layout"
        );
        Emitter::new(self.fs, root).emit(&layout)
    }

    /// Builds the image and writes it to `output` with a single sink call.
    /// On any error the sink is not called.
    pub fn write_image(&self, root: &Path, output: &Path) -> Result<Image> {
        self.run(&BuildConfig {
            source: root.to_path_buf(),
            output: output.to_path_buf(),
            ..BuildConfig::default()
        })
    }

    pub fn run(&self, config: &BuildConfig) -> Result<Image> {
        info!(input = %config.source.display(), output = %config.output.display(), "building ramdisk");
        let image = self.build_image(&config.source)?;
        if config.verify {
            let parsed = reader::parse(&image.bytes)?;
            debug!(records = parsed.records.len(), "image verified");
        }
        self.sink.write_file(&config.output, &image.bytes)?;

        let summary = BuildSummary::of(&image);
        info!(
            files = summary.files,
            dirs = summary.dirs,
            total_size = summary.total_size,
            "wrote {}",
            config.output.display()
        );
        Ok(image)
    }
}
