use alloc::borrow::ToOwned;
use alloc::string::String;

use binrw::io::Cursor;
use binrw::{BinRead, BinWrite, binrw};
use vfs::{DirEntryType, Error, Permissions};

use crate::{BLOCK_SIZE, BlockId};

/// Longest name in bytes; the on-disk field keeps one more byte for the NUL.
pub const NAME_MAX_LEN: usize = 55;

/// On-disk image of a directory entry.
#[binrw]
#[brw(little)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDirEntry {
    /// NUL padded
    name: [u8; NAME_MAX_LEN + 1],

    /// Quantity containing size in bytes
    /// of file/directory described by this entry
    size: u32,

    /// First block of the chain, 0 if there is none
    first_block: u16,

    /// 0 for files, 1 for directories
    kind: u8,

    /// Read(4) | Write(2) | Execute(1)
    rights: u8,
}

impl RawDirEntry {
    /// Entry size is always 64 bytes
    pub const SIZE: usize = 64;

    pub const EMPTY: Self = Self {
        name: [0; NAME_MAX_LEN + 1],
        size: 0,
        first_block: 0,
        kind: 0,
        rights: 0,
    };

    pub fn read_from(bytes: &[u8]) -> Result<Self, Error> {
        Self::read(&mut Cursor::new(bytes)).map_err(|err| {
            log::error!("malformed directory entry: {err}");
            Error::IoFailure
        })
    }

    pub fn write_to(&self, bytes: &mut [u8]) -> Result<(), Error> {
        self.write(&mut Cursor::new(bytes)).map_err(|err| {
            log::error!("cannot encode directory entry: {err}");
            Error::IoFailure
        })
    }

    /// A slot is unused when it has neither a name nor a first block.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.name[0] == 0 && self.first_block == 0
    }

    /// The entry stored in this slot, `None` for an unused slot.
    pub fn entry(&self) -> Option<DirEntry> {
        if self.is_empty() {
            return None;
        }

        let len = self
            .name
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(NAME_MAX_LEN)
            .min(NAME_MAX_LEN);

        Some(DirEntry {
            name: String::from_utf8_lossy(&self.name[..len]).into_owned(),
            kind: match self.kind {
                1 => DirEntryType::Directory,
                _ => DirEntryType::Regular,
            },
            perm: Permissions::from_bits_truncate(self.rights),
            size: self.size,
            first_block: match self.first_block {
                0 => None,
                id => Some(BlockId::new(id)),
            },
        })
    }
}

/// A named file or directory stored in one directory slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    name: String,
    pub kind: DirEntryType,
    pub perm: Permissions,
    /// Byte count for files, [`BLOCK_SIZE`] for directories
    pub size: u32,
    /// `None` only for files without content
    pub first_block: Option<BlockId>,
}

impl DirEntry {
    pub fn file(name: &str, size: u32, first_block: Option<BlockId>) -> Self {
        Self {
            name: name.to_owned(),
            kind: DirEntryType::Regular,
            perm: Permissions::ALL,
            size,
            first_block,
        }
    }

    pub fn directory(name: &str, block: BlockId) -> Self {
        Self {
            name: name.to_owned(),
            kind: DirEntryType::Directory,
            perm: Permissions::ALL,
            size: BLOCK_SIZE as u32,
            first_block: Some(block),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The caller has validated `name`.
    pub fn rename(&mut self, name: &str) {
        name.clone_into(&mut self.name);
    }

    #[inline]
    pub fn is_dir(&self) -> bool {
        self.kind == DirEntryType::Directory
    }

    /// Block of the directory this entry describes.
    pub fn dir_block(&self) -> Result<BlockId, Error> {
        debug_assert!(self.is_dir());
        self.first_block.ok_or_else(|| {
            log::error!("directory {:?} has no block", self.name);
            Error::IoFailure
        })
    }

    /// The row `ls` shows for this entry.
    pub fn listing(&self) -> vfs::DirEntry {
        vfs::DirEntry {
            name: self.name.clone(),
            ty: self.kind,
            perm: self.perm,
            size: match self.kind {
                DirEntryType::Regular => Some(self.size),
                DirEntryType::Directory => None,
            },
        }
    }
}

impl From<&DirEntry> for RawDirEntry {
    fn from(entry: &DirEntry) -> Self {
        let mut raw = Self::EMPTY;
        let bytes = entry.name.as_bytes();
        let len = bytes.len().min(NAME_MAX_LEN);
        raw.name[..len].copy_from_slice(&bytes[..len]);

        raw.size = entry.size;
        raw.first_block = entry.first_block.map_or(0, u16::from);
        raw.kind = entry.kind as u8;
        raw.rights = entry.perm.bits();
        raw
    }
}

/// Checks a name for a new entry: non-empty, short enough,
/// and neither `.` nor `..`.
pub fn validate_name(name: &str) -> Result<(), Error> {
    match name {
        "" | "." | ".." => Err(Error::NameInvalid),
        name if name.len() > NAME_MAX_LEN || name.contains(['/', '\0']) => {
            Err(Error::NameInvalid)
        }
        _ => Ok(()),
    }
}
