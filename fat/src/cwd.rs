use crate::BlockId;
use crate::volume::data::Directory;

/// Cached copy of the directory the session is positioned in.
///
/// Relative paths start here. Whether the session sits at the root is decided by
/// the block the copy was read from, never by the content of its self entry.
#[derive(Debug, Clone)]
pub struct WorkingDir {
    dir: Directory,
}

impl WorkingDir {
    #[inline]
    pub fn new(dir: Directory) -> Self {
        Self { dir }
    }

    #[inline]
    pub fn dir(&self) -> &Directory {
        &self.dir
    }

    #[inline]
    pub fn block(&self) -> BlockId {
        self.dir.block()
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.dir.is_root()
    }
}
