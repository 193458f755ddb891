use derive_more::{Display, From, Into};

/// Address of a block on the device; also the index of its allocation table entry.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, From, Into)]
#[display(fmt = "{}", _0)]
#[repr(transparent)]
pub struct BlockId(u16);

impl BlockId {
    /// Block holding the allocation table
    pub const FAT: Self = Self(0);

    /// Block holding the root directory
    pub const ROOT: Self = Self(1);

    pub const fn new(raw: u16) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// The two reserved blocks never appear in a file's chain.
    pub const fn is_reserved(self) -> bool {
        self.0 <= Self::ROOT.0
    }
}

impl From<BlockId> for usize {
    fn from(id: BlockId) -> Self {
        id.index()
    }
}
