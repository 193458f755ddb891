use alloc::vec;
use alloc::vec::Vec;

use vfs::Error;

use crate::{BlockId, MAX_BLOCKS};

/// FAT表项。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FatEntry {
    Free,
    /// 链表的最后一块
    Eof,
    Next(BlockId),
}

impl FatEntry {
    const FREE: u16 = 0x0000;
    const EOF: u16 = 0xFFFF;

    pub const fn from_raw(raw: u16) -> Self {
        match raw {
            Self::FREE => Self::Free,
            Self::EOF => Self::Eof,
            next => Self::Next(BlockId::new(next)),
        }
    }

    pub fn raw(self) -> u16 {
        match self {
            Self::Free => Self::FREE,
            Self::Eof => Self::EOF,
            Self::Next(id) => id.into(),
        }
    }
}

/// 文件分配表，每个可寻址的块对应一项。
///
/// 块链是穿过表的单向链表，以 [`FatEntry::Eof`] 结尾。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fat {
    entries: Vec<FatEntry>,
}

impl Fat {
    /// 刚格式化的表：除FAT块与根目录块外全部空闲。
    pub fn new(num_blocks: usize) -> Self {
        let mut entries = vec![FatEntry::Free; num_blocks.min(MAX_BLOCKS)];
        for reserved in [BlockId::FAT, BlockId::ROOT] {
            if let Some(entry) = entries.get_mut(reserved.index()) {
                *entry = FatEntry::Eof;
            }
        }
        Self { entries }
    }

    /// Reads `num_blocks` little-endian entries from the table block.
    pub fn decode(buf: &[u8], num_blocks: usize) -> Self {
        let entries = buf
            .chunks_exact(2)
            .take(num_blocks.min(MAX_BLOCKS))
            .map(|raw| FatEntry::from_raw(u16::from_le_bytes([raw[0], raw[1]])))
            .collect();
        Self { entries }
    }

    /// Entries past the end of the device are written as free.
    pub fn encode(&self, buf: &mut [u8]) {
        buf.fill(0);
        for (raw, entry) in buf.chunks_exact_mut(2).zip(&self.entries) {
            raw.copy_from_slice(&entry.raw().to_le_bytes());
        }
    }

    /// 表所管理的块数。
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn get(&self, id: BlockId) -> Option<FatEntry> {
        self.entries.get(id.index()).copied()
    }

    pub fn free_blocks(&self) -> usize {
        self.entries
            .iter()
            .filter(|&&entry| entry == FatEntry::Free)
            .count()
    }

    /// 寻找编号最小的空闲块。
    pub fn first_free(&self) -> Option<BlockId> {
        self.entries
            .iter()
            .position(|&entry| entry == FatEntry::Free)
            .map(|idx| BlockId::new(idx as u16))
    }

    /// Iterates over the blocks of the chain starting at `head`.
    ///
    /// Stops early on a link to a free or out-of-range block, and after
    /// [`Fat::len`] steps, so a damaged table cannot make it loop forever.
    pub fn chain(&self, head: Option<BlockId>) -> Chain<'_> {
        Chain {
            fat: self,
            next: head,
            budget: self.len(),
        }
    }

    #[inline]
    pub fn last(&self, head: Option<BlockId>) -> Option<BlockId> {
        self.chain(head).last()
    }

    /// Takes `n` free blocks, one lowest-first scan at a time, and links them
    /// in that order. Returns the head of the new chain, `None` when `n == 0`.
    ///
    /// Either all `n` blocks are taken or the table is left exactly as it was.
    pub fn alloc_chain(&mut self, n: usize) -> Result<Option<BlockId>, Error> {
        let snapshot = self.clone();
        let mut head = None;
        let mut prev: Option<BlockId> = None;

        for taken in 0..n {
            let Some(id) = self.first_free() else {
                log::warn!("out of blocks after {taken} of {n}, table restored");
                *self = snapshot;
                return Err(Error::OutOfBlocks);
            };
            self.set(id, FatEntry::Eof);
            match prev {
                Some(prev) => self.set(prev, FatEntry::Next(id)),
                None => head = Some(id),
            }
            prev = Some(id);
        }

        log::debug!("allocated chain of {n} blocks at {head:?}");
        Ok(head)
    }

    /// 分配一个块。
    pub fn alloc(&mut self) -> Result<BlockId, Error> {
        self.alloc_chain(1)?.ok_or(Error::OutOfBlocks)
    }

    /// 把 `to` 接在 `from` 之后。
    pub fn link(&mut self, from: BlockId, to: BlockId) {
        self.set(from, FatEntry::Next(to));
    }

    /// 释放以 `head` 开头的整条块链。
    pub fn release(&mut self, head: BlockId) {
        let blocks: Vec<BlockId> = self.chain(Some(head)).collect();
        log::debug!("releasing {} blocks from {head}", blocks.len());
        for id in blocks {
            if id.is_reserved() {
                log::error!("chain from {head} runs into reserved block {id}");
                continue;
            }
            self.set(id, FatEntry::Free);
        }
    }
}

impl Fat {
    fn set(&mut self, id: BlockId, entry: FatEntry) {
        match self.entries.get_mut(id.index()) {
            Some(slot) => *slot = entry,
            None => log::error!("block {id} is past the end of the table"),
        }
    }
}

/// Blocks of one chain, head first.
#[derive(Debug, Clone)]
pub struct Chain<'a> {
    fat: &'a Fat,
    next: Option<BlockId>,
    budget: usize,
}

impl Iterator for Chain<'_> {
    type Item = BlockId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next.take()?;
        if self.budget == 0 {
            log::error!("chain through block {id} never terminates");
            return None;
        }
        self.budget -= 1;

        match self.fat.get(id) {
            Some(FatEntry::Next(next)) => self.next = Some(next),
            Some(FatEntry::Eof) => {}
            entry => {
                log::error!("block {id} is {entry:?} but sits inside a chain");
                return None;
            }
        }
        Some(id)
    }
}
