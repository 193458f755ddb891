use alloc::vec;
use alloc::vec::Vec;

use vfs::{Error, Permissions};

use super::dir_entry::{DirEntry, RawDirEntry};
use crate::{BLOCK_SIZE, BlockId};

/// Slots in one directory block
pub const DIR_SLOTS: usize = BLOCK_SIZE / RawDirEntry::SIZE;

const PARENT_NAME: &str = "..";
const CWD_NAME: &str = ".";
const ROOT_NAME: &str = "/";

/// A directory block decoded into its slots.
///
/// Slot 0 describes the directory itself, slot 1 its parent (`..`),
/// and the remaining [`Directory::CHILD_SLOTS`] hold the children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directory {
    /// Where this directory was read from
    block: BlockId,
    this: DirEntry,
    parent: DirEntry,
    children: Vec<Option<DirEntry>>,
}

impl Directory {
    pub const CHILD_SLOTS: usize = DIR_SLOTS - 2;

    /// The root directory of a freshly formatted volume. It is its own parent.
    pub fn root() -> Self {
        let this = DirEntry::directory(ROOT_NAME, BlockId::ROOT);
        let mut parent = this.clone();
        parent.rename(PARENT_NAME);
        Self {
            block: BlockId::ROOT,
            this,
            parent,
            children: vec![None; Self::CHILD_SLOTS],
        }
    }

    /// An empty directory `name` stored at `block`, whose `..` is a copy of
    /// `parent`'s own entry.
    pub fn new(block: BlockId, name: &str, parent: &Directory) -> Self {
        let mut parent = parent.this.clone();
        parent.rename(PARENT_NAME);
        Self {
            block,
            this: DirEntry::directory(name, block),
            parent,
            children: vec![None; Self::CHILD_SLOTS],
        }
    }

    pub fn decode(block: BlockId, buf: &[u8]) -> Result<Self, Error> {
        let mut slots = buf
            .chunks_exact(RawDirEntry::SIZE)
            .take(DIR_SLOTS)
            .map(|bytes| RawDirEntry::read_from(bytes).map(|raw| raw.entry()))
            .collect::<Result<Vec<_>, _>>()?;

        if slots.len() != DIR_SLOTS {
            log::error!("block {block} is too short for a directory");
            return Err(Error::IoFailure);
        }
        let children = slots.split_off(2);
        let mut header = slots.into_iter();
        match (header.next().flatten(), header.next().flatten()) {
            (Some(this), Some(parent)) if this.is_dir() && parent.is_dir() => Ok(Self {
                block,
                this,
                parent,
                children,
            }),
            _ => {
                log::error!("block {block} does not hold a directory");
                Err(Error::IoFailure)
            }
        }
    }

    pub fn encode(&self, buf: &mut [u8]) -> Result<(), Error> {
        buf.fill(0);
        let slots = [Some(&self.this), Some(&self.parent)]
            .into_iter()
            .chain(self.children.iter().map(Option::as_ref));
        for (bytes, slot) in buf.chunks_exact_mut(RawDirEntry::SIZE).zip(slots) {
            match slot {
                Some(entry) => RawDirEntry::from(entry).write_to(bytes)?,
                None => RawDirEntry::EMPTY.write_to(bytes)?,
            }
        }
        Ok(())
    }

    #[inline]
    pub fn block(&self) -> BlockId {
        self.block
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.block == BlockId::ROOT
    }

    /// The self entry in slot 0.
    #[inline]
    pub fn this(&self) -> &DirEntry {
        &self.this
    }

    #[inline]
    pub fn this_mut(&mut self) -> &mut DirEntry {
        &mut self.this
    }

    /// The `..` entry in slot 1.
    #[inline]
    pub fn parent(&self) -> &DirEntry {
        &self.parent
    }

    /// Rights of the directory itself.
    #[inline]
    pub fn perm(&self) -> Permissions {
        self.this.perm
    }

    /// Occupied child slots, in slot order.
    pub fn children(&self) -> impl Iterator<Item = &DirEntry> {
        self.children.iter().flatten()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.children().next().is_none()
    }

    /// Index of the child called `name`.
    pub fn find_child(&self, name: &str) -> Option<usize> {
        self.children
            .iter()
            .position(|slot| slot.as_ref().is_some_and(|entry| entry.name() == name))
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.find_child(name).is_some()
    }

    #[inline]
    pub fn child(&self, index: usize) -> Option<&DirEntry> {
        self.children.get(index)?.as_ref()
    }

    #[inline]
    pub fn child_mut(&mut self, index: usize) -> Option<&mut DirEntry> {
        self.children.get_mut(index)?.as_mut()
    }

    /// Looks `name` up among `.`, `..` and the children.
    pub fn lookup(&self, name: &str) -> Option<&DirEntry> {
        match name {
            CWD_NAME => Some(&self.this),
            PARENT_NAME => Some(&self.parent),
            name => self.child(self.find_child(name)?),
        }
    }

    /// First unused child slot.
    pub fn free_slot(&self) -> Result<usize, Error> {
        self.children
            .iter()
            .position(Option::is_none)
            .ok_or(Error::DirectoryFull)
    }

    /// Puts `entry` into the child slot `index`, which must be unused.
    pub fn install(&mut self, index: usize, entry: DirEntry) {
        debug_assert!(self.child(index).is_none());
        if let Some(slot) = self.children.get_mut(index) {
            *slot = Some(entry);
        }
    }

    /// Clears the child slot `index`, handing back what it held.
    pub fn take(&mut self, index: usize) -> Option<DirEntry> {
        self.children.get_mut(index)?.take()
    }
}
