use alloc::string::String;

use crate::Permissions;

/// One row of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub ty: DirEntryType,
    pub perm: Permissions,
    /// File size in bytes, `None` for directories
    pub size: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum DirEntryType {
    #[default]
    Regular = 0,
    Directory = 1,
}
