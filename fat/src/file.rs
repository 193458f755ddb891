use alloc::vec::Vec;

use vfs::{Error, Permission, Result};

use crate::entry::{Target, named_child};
use crate::volume::data::{DirEntry, validate_name};
use crate::{BLOCK_SIZE, BlockId, FatFileSystem};

impl FatFileSystem {
    /// Creates the file `path` from `lines`.
    ///
    /// Lines are taken up to the first empty one, which is consumed but not
    /// stored; every stored line gets a trailing `\n`.
    pub fn create<I>(&mut self, path: &str, lines: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let (mut dir, name) = self.locate(path)?;
        dir.perm().require(Permission::Write)?;
        validate_name(name)?;
        if dir.contains(name) {
            return Err(Error::NameConflict);
        }
        let slot = dir.free_slot()?;

        let mut data = Vec::new();
        for line in lines {
            let line = line.as_ref();
            if line.is_empty() {
                break;
            }
            data.extend_from_slice(line.as_bytes());
            data.push(b'\n');
        }
        let size = u32::try_from(data.len()).map_err(|_| Error::OutOfBlocks)?;

        self.with_rollback(|fs| {
            let head = fs.fat.alloc_chain(data.len().div_ceil(BLOCK_SIZE))?;
            fs.write_content(head, &data)?;
            fs.sync_fat()?;
            dir.install(slot, DirEntry::file(name, size, head));
            fs.write_dir(&dir)
        })?;
        log::debug!("created {path:?}, {size} bytes");

        self.refresh_cwd()
    }

    /// The content of the file at `path`.
    pub fn cat(&self, path: &str) -> Result<Vec<u8>> {
        let (dir, name) = self.locate(path)?;
        let (_, entry) = named_child(&dir, name)?;
        if entry.is_dir() {
            return Err(Error::IsADirectory);
        }
        entry.perm.require(Permission::Read)?;

        self.read_content(entry)
    }

    /// Copies the file `src` to `dst`, block by block.
    ///
    /// The copy keeps the size and rights of the source.
    pub fn cp(&mut self, src: &str, dst: &str) -> Result<()> {
        let (src_dir, src_name) = self.locate(src)?;
        let (dst_dir, dst_leaf) = self.locate(dst)?;

        let (_, source) = named_child(&src_dir, src_name)?;
        if source.is_dir() {
            return Err(Error::NotAFile);
        }
        source.perm.require(Permission::Read)?;

        let Target { mut dir, name } = self.target(dst_dir, dst_leaf, source.name())?;
        dir.perm().require(Permission::Write)?;
        let slot = dir.free_slot()?;

        let blocks: Vec<BlockId> = self.fat.chain(source.first_block).collect();
        self.with_rollback(|fs| {
            let head = fs.fat.alloc_chain(blocks.len())?;
            let mut buf = [0; BLOCK_SIZE];
            for (&from, to) in blocks.iter().zip(fs.fat.chain(head)) {
                fs.read_block(from, &mut buf)?;
                fs.write_block(to, &buf)?;
            }
            fs.sync_fat()?;

            let mut copy = DirEntry::file(&name, source.size, head);
            copy.perm = source.perm;
            dir.install(slot, copy);
            fs.write_dir(&dir)
        })?;
        log::debug!("copied {src:?} to {dst:?}, {} blocks", blocks.len());

        self.refresh_cwd()
    }

    /// Appends the content of the file `src` to the file `dst`.
    ///
    /// New bytes first fill what is left of `dst`'s last block, then spill
    /// into freshly allocated blocks linked after it.
    pub fn append(&mut self, src: &str, dst: &str) -> Result<()> {
        let (src_dir, src_name) = self.locate(src)?;
        let (mut dst_dir, dst_name) = self.locate(dst)?;

        let (_, source) = named_child(&src_dir, src_name)?;
        let (index, target) = named_child(&dst_dir, dst_name)?;
        if source.is_dir() || target.is_dir() {
            return Err(Error::IsADirectory);
        }
        source.perm.require(Permission::Read)?;
        target.perm.require(Permission::Write)?;

        let data = self.read_content(source)?;
        let size = u32::try_from(data.len())
            .ok()
            .and_then(|len| target.size.checked_add(len))
            .ok_or(Error::OutOfBlocks)?;

        let first_block = target.first_block;
        let last = self.fat.last(first_block);
        let tail = target.size as usize % BLOCK_SIZE;
        // A zero tail means the last block is full, or there is none yet.
        let fill = match last {
            Some(_) if tail > 0 => (BLOCK_SIZE - tail).min(data.len()),
            _ => 0,
        };
        let (head_bytes, rest) = data.split_at(fill);

        self.with_rollback(|fs| {
            let head = fs.fat.alloc_chain(rest.len().div_ceil(BLOCK_SIZE))?;
            if let (Some(last), Some(head)) = (last, head) {
                fs.fat.link(last, head);
            }

            if let Some(last) = last.filter(|_| fill > 0) {
                let mut buf = [0; BLOCK_SIZE];
                fs.read_block(last, &mut buf)?;
                buf[tail..tail + fill].copy_from_slice(head_bytes);
                fs.write_block(last, &buf)?;
            }
            fs.write_content(head, rest)?;
            fs.sync_fat()?;

            let Some(entry) = dst_dir.child_mut(index) else {
                return Err(Error::NotFound);
            };
            entry.size = size;
            entry.first_block = first_block.or(head);
            fs.write_dir(&dst_dir)
        })?;
        log::debug!("appended {} bytes to {dst:?}", data.len());

        self.refresh_cwd()
    }
}
