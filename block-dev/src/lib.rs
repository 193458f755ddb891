//! # Block device interface
//!
//! A block device stores data in fixed-size **blocks** (disks, disk images, RAM).
//! [`BlockDevice`] abstracts reading and writing whole blocks; a type implementing
//! it is a block device driver. The file system only ever talks to storage
//! through this trait.

#![no_std]

extern crate alloc;

mod ram;

use core::any::Any;
use core::fmt;

pub use self::ram::RamDisk;

/// Block device driver
pub trait BlockDevice: Send + Sync + Any {
    /// Number of addressable blocks on the device.
    fn num_blocks(&self) -> usize;

    /// Fills `buf` with the content of block `block_id`.
    /// `buf` is exactly one block long.
    fn read_block(&self, block_id: usize, buf: &mut [u8]) -> Result<(), DeviceError>;

    fn write_block(&self, block_id: usize, buf: &[u8]) -> Result<(), DeviceError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceError {
    /// The block id lies past the end of the device
    OutOfRange(usize),
    /// Fewer bytes than one block were transferred
    ShortTransfer { block_id: usize, len: usize },
    /// The backing medium failed
    Io,
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange(id) => write!(f, "block {id} is out of range"),
            Self::ShortTransfer { block_id, len } => {
                write!(f, "incomplete transfer of block {block_id}: {len} bytes")
            }
            Self::Io => f.write_str("device I/O fault"),
        }
    }
}

impl core::error::Error for DeviceError {}
