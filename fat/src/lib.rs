#![no_std]

extern crate alloc;

mod block;
mod control;
mod cwd;
mod dir;
mod entry;
mod file;
mod path;
pub mod volume;

pub use self::{block::BlockId, control::FatFileSystem, cwd::WorkingDir, path::leaf_name};

pub const BLOCK_SIZE: usize = 4096;

/// The table fits in one block with two bytes per entry,
/// which bounds how many blocks can be addressed.
pub const MAX_BLOCKS: usize = BLOCK_SIZE / 2;

type DataBlock = [u8; BLOCK_SIZE];
