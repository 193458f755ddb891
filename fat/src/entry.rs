//! Operations on existing entries, plus the lookups the other operations share.

use alloc::borrow::ToOwned;
use alloc::string::String;

use vfs::{DirEntryType, Error, Permission, Permissions, Result};

use crate::FatFileSystem;
use crate::volume::data::{DirEntry, Directory, validate_name};

/// The child of `dir` called `name`, with its slot index.
pub(crate) fn named_child<'d>(dir: &'d Directory, name: &str) -> Result<(usize, &'d DirEntry)> {
    if name.is_empty() {
        return Err(Error::InvalidPath);
    }
    dir.find_child(name)
        .and_then(|index| Some((index, dir.child(index)?)))
        .ok_or(Error::NotFound)
}

/// Where a copied or moved file ends up.
pub(crate) struct Target {
    pub dir: Directory,
    pub name: String,
}

impl FatFileSystem {
    /// Works out the destination of `cp`/`mv`.
    ///
    /// `leaf` is the last component of the destination path, already resolved
    /// to `dir`. If it names a directory (including `.` and `..`) the file goes
    /// inside it under `src_name`; an empty leaf (`dir/`, `/`) means the same
    /// for `dir`. Otherwise `leaf` is the new name.
    pub(crate) fn target(&self, dir: Directory, leaf: &str, src_name: &str) -> Result<Target> {
        let dir = if leaf.is_empty() {
            dir
        } else {
            match dir.lookup(leaf) {
                Some(entry) if entry.is_dir() => self.read_dir(entry.dir_block()?)?,
                Some(_) => return Err(Error::NameConflict),
                None => {
                    validate_name(leaf)?;
                    return Ok(Target {
                        dir,
                        name: leaf.to_owned(),
                    });
                }
            }
        };

        if dir.contains(src_name) {
            return Err(Error::NameConflict);
        }
        Ok(Target {
            dir,
            name: src_name.to_owned(),
        })
    }

    /// Renames the file `src`, or moves it into another directory.
    /// Directories cannot be moved.
    pub fn mv(&mut self, src: &str, dst: &str) -> Result<()> {
        let (mut src_dir, src_name) = self.locate(src)?;
        let (dst_dir, dst_leaf) = self.locate(dst)?;

        let (index, entry) = named_child(&src_dir, src_name)?;
        if entry.is_dir() {
            return Err(Error::NotAFile);
        }
        if !(entry.perm.contains(Permission::Read) || entry.perm.contains(Permission::Write)) {
            return Err(Error::AccessDenied);
        }

        let Target { mut dir, name } = self.target(dst_dir, dst_leaf, entry.name())?;
        dir.perm().require(Permission::Write)?;

        if dir.block() == src_dir.block() {
            log::debug!("renaming {src_name:?} to {name:?} in place");
            if let Some(entry) = src_dir.child_mut(index) {
                entry.rename(&name);
            }
            self.write_dir(&src_dir)?;
        } else {
            let slot = dir.free_slot()?;
            let before = dir.clone();
            if let Some(mut entry) = src_dir.take(index) {
                entry.rename(&name);
                dir.install(slot, entry);
            }

            self.write_dir(&dir)?;
            if let Err(err) = self.write_dir(&src_dir) {
                // Don't leave the file listed twice.
                if let Err(err) = self.write_dir(&before) {
                    log::error!("{:?} may now be listed twice: {err}", name);
                }
                return Err(err);
            }
        }

        self.refresh_cwd()
    }

    /// Removes a file, or an empty directory, releasing its blocks.
    pub fn rm(&mut self, path: &str) -> Result<()> {
        let (mut dir, name) = self.locate(path)?;
        let (index, entry) = named_child(&dir, name)?;
        entry.perm.require(Permission::Write)?;

        match entry.kind {
            DirEntryType::Regular => {}
            DirEntryType::Directory => {
                let block = entry.dir_block()?;
                if block == self.cwd.block() {
                    log::debug!("refusing to remove the working directory");
                    return Err(Error::InvalidArgument);
                }
                if !self.read_dir(block)?.is_empty() {
                    return Err(Error::DirectoryNotEmpty);
                }
            }
        }

        // The table goes out before the slot is cleared. Failing in between
        // leaves the chain listed and allocated, never listed and free.
        let head = entry.first_block;
        self.with_rollback(|fs| {
            if let Some(head) = head {
                fs.fat.release(head);
            }
            fs.sync_fat()?;
            dir.take(index);
            fs.write_dir(&dir)
        })?;

        self.refresh_cwd()
    }

    /// Replaces the rights of the entry at `path` with the octal digit `mode`.
    ///
    /// For a directory, the directory's own entry (slot 0 of its block) gets the
    /// same rights; its children are left alone.
    pub fn chmod(&mut self, mode: &str, path: &str) -> Result<()> {
        let (mut dir, name) = self.locate(path)?;
        let (index, _) = named_child(&dir, name)?;
        let perm = Permissions::from_mode(mode)?;

        let before = dir.clone();
        let Some(entry) = dir.child_mut(index) else {
            return Err(Error::NotFound);
        };
        entry.perm = perm;
        let mut inner = match entry.kind {
            DirEntryType::Directory => Some(self.read_dir(entry.dir_block()?)?),
            DirEntryType::Regular => None,
        };
        self.write_dir(&dir)?;

        if let Some(inner) = &mut inner {
            inner.this_mut().perm = perm;
            if let Err(err) = self.write_dir(inner) {
                if let Err(undo) = self.write_dir(&before) {
                    log::error!("rights of {name:?} now differ between its two copies: {undo}");
                }
                return Err(err);
            }
        }

        self.refresh_cwd()
    }
}
