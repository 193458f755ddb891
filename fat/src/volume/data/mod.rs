//! Directory blocks and the entries stored in them

mod dir_entry;
mod directory;

pub use self::dir_entry::{DirEntry, NAME_MAX_LEN, RawDirEntry, validate_name};
pub use self::directory::{DIR_SLOTS, Directory};
