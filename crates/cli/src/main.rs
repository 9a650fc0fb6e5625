use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use bytesize::ByteSize;
use clap::Parser;
use ramdisk_core::config::{DEFAULT_OUTPUT, DEFAULT_SOURCE};
use ramdisk_core::{export, BuildConfig, BuildSummary, Builder, HostFs, Image};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "ramdisk", about = "Pack a directory tree into a ramdisk image")]
struct Args {
    /// Image file to write
    #[arg(default_value = DEFAULT_OUTPUT)]
    output: PathBuf,
    /// Directory to pack
    #[arg(default_value = DEFAULT_SOURCE)]
    dir: PathBuf,
    /// Also write a record manifest (CSV if the path ends in .csv, else JSON)
    #[arg(short, long)]
    manifest: Option<PathBuf>,
    /// Parse the image back before writing it
    #[arg(long)]
    verify: bool,
}

impl From<Args> for BuildConfig {
    fn from(args: Args) -> Self {
        BuildConfig {
            source: args.dir,
            output: args.output,
            manifest: args.manifest,
            verify: args.verify,
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = BuildConfig::from(Args::parse());
    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &BuildConfig) -> anyhow::Result<()> {
    let image = Builder::new(&HostFs, &HostFs)
        .run(config)
        .with_context(|| format!("packing {}", config.source.display()))?;

    if let Some(path) = &config.manifest {
        write_manifest(&image, path)
            .with_context(|| format!("writing manifest {}", path.display()))?;
    }

    let summary = BuildSummary::of(&image);
    println!(
        "Packed {} files, {} directories into {} ({})",
        summary.files,
        summary.dirs,
        config.output.display(),
        ByteSize::b(summary.total_size as u64)
    );
    Ok(())
}

fn write_manifest(image: &Image, path: &Path) -> anyhow::Result<()> {
    let out = BufWriter::new(File::create(path)?);
    if path.extension().is_some_and(|e| e.eq_ignore_ascii_case("csv")) {
        export::to_csv(&image.records, out)?;
    } else {
        serde_json::to_writer_pretty(out, &export::to_json(&image.records))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_conventional_paths() {
        let config = BuildConfig::from(Args::parse_from(["ramdisk"]));
        assert_eq!(config, BuildConfig::default());
    }

    #[test]
    fn positional_order_is_output_then_dir() {
        let config = BuildConfig::from(Args::parse_from([
            "ramdisk", "out.img", "rootfs", "--verify", "-m", "out.csv",
        ]));
        assert_eq!(config.output, PathBuf::from("out.img"));
        assert_eq!(config.source, PathBuf::from("rootfs"));
        assert_eq!(config.manifest, Some(PathBuf::from("out.csv")));
        assert!(config.verify);
    }

    #[test]
    fn run_writes_image_and_csv_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("rootfs");
        std::fs::create_dir(&src).unwrap();
        std::fs::write(src.join("init"), b"#!/bin/sh\n").unwrap();

        let config = BuildConfig {
            source: src,
            output: dir.path().join("ramdisk.bin"),
            manifest: Some(dir.path().join("manifest.csv")),
            verify: true,
        };
        run(&config).unwrap();

        let image = std::fs::read(&config.output).unwrap();
        assert_eq!(image.len(), 16 + 80 + 10);
        let manifest = std::fs::read_to_string(dir.path().join("manifest.csv")).unwrap();
        assert!(manifest.contains("0,init,file,0,10,"));
    }

    #[test]
    fn run_fails_for_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let config = BuildConfig {
            source: dir.path().join("absent"),
            output: dir.path().join("ramdisk.bin"),
            ..BuildConfig::default()
        };
        assert!(run(&config).is_err());
        assert!(!config.output.exists());
    }
}
