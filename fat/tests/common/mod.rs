#![allow(dead_code)]

use std::sync::Arc;

use block_dev::{BlockDevice, RamDisk};
use fat::{BLOCK_SIZE, FatFileSystem};

/// A freshly formatted volume on a RAM disk of `blocks` blocks.
pub fn volume(blocks: usize) -> (Arc<RamDisk>, FatFileSystem) {
    let disk = Arc::new(RamDisk::new(BLOCK_SIZE, blocks));
    let dev: Arc<dyn BlockDevice> = disk.clone();
    let fs = FatFileSystem::format(&dev).unwrap();
    (disk, fs)
}

/// Lines that take up exactly `total` bytes once stored.
pub fn text(total: usize) -> Vec<String> {
    assert_ne!(1, total % 100, "a stored line is at least two bytes");
    let mut lines: Vec<String> = (0..total / 100)
        .map(|i| char::from(b'a' + (i % 26) as u8).to_string().repeat(99))
        .collect();
    if total % 100 > 0 {
        lines.push("z".repeat(total % 100 - 1));
    }
    lines
}

/// What `cat` returns for a file created from `lines`.
pub fn bytes(lines: &[String]) -> Vec<u8> {
    lines
        .iter()
        .flat_map(|line| line.bytes().chain(Some(b'\n')))
        .collect()
}

pub fn names(fs: &FatFileSystem) -> Vec<String> {
    fs.ls().unwrap().into_iter().map(|entry| entry.name).collect()
}
