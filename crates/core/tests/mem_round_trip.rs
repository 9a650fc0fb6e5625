use std::path::{Path, PathBuf};

use ramdisk_core::reader::{parse, ParsedNode};
use ramdisk_core::{Builder, MemFs};

/// Deterministic pseudo-random tree: a fixed seed per case.
fn grow(fs: &mut MemFs, dir: &Path, seed: &mut u64, depth: u32) -> Vec<ParsedNode> {
    fs.add_dir(dir);
    let mut nodes = Vec::new();
    let fan_out = next(seed) % 5;
    for i in 0..fan_out {
        let name = format!("n{i}-{}", next(seed) % 1000);
        let path = dir.join(&name);
        if depth > 0 && next(seed) % 3 == 0 {
            let children = grow(fs, &path, seed, depth - 1);
            nodes.push(ParsedNode::Directory { name, children });
        } else {
            let len = (next(seed) % 300) as usize;
            let contents: Vec<u8> = (0..len).map(|b| (b as u64 ^ *seed) as u8).collect();
            fs.add_file(&path, contents.clone());
            nodes.push(ParsedNode::File { name, contents });
        }
    }
    nodes
}

fn next(seed: &mut u64) -> u64 {
    *seed = seed
        .wrapping_mul(6364136223846793005)
        .wrapping_add(1442695040888963407);
    *seed >> 33
}

#[test]
fn generated_trees_round_trip() {
    for case in 0..32u64 {
        let mut seed = case;
        let mut fs = MemFs::new();
        let root = PathBuf::from("/rd");
        let expected = grow(&mut fs, &root, &mut seed, 4);

        let image = Builder::new(&fs, &fs)
            .write_image(&root, Path::new("/out"))
            .unwrap();
        assert_eq!(image.header.total_size as usize, image.bytes.len());

        let parsed = parse(&fs.written("/out").unwrap()).unwrap();
        assert_eq!(parsed.entries, expected, "case {case}");
    }
}
