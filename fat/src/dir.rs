use alloc::borrow::ToOwned;
use alloc::string::String;
use alloc::vec::Vec;

use vfs::{DirEntryType, Error, Permission, Result};

use crate::cwd::WorkingDir;
use crate::volume::data::{DirEntry, Directory, validate_name};
use crate::{BlockId, FatFileSystem};

impl FatFileSystem {
    /// Lists the working directory, in slot order. `.` and `..` are left out.
    pub fn ls(&self) -> Result<Vec<vfs::DirEntry>> {
        let dir = self.cwd.dir();
        dir.perm().require(Permission::Read)?;
        Ok(dir.children().map(DirEntry::listing).collect())
    }

    /// Creates an empty directory at `path`. It takes exactly one block.
    pub fn mkdir(&mut self, path: &str) -> Result<()> {
        let (mut parent, name) = self.locate(path)?;
        parent.perm().require(Permission::Write)?;
        validate_name(name)?;
        if parent.contains(name) {
            return Err(Error::NameConflict);
        }
        let slot = parent.free_slot()?;

        self.with_rollback(|fs| {
            let block = fs.fat.alloc()?;
            let dir = Directory::new(block, name, &parent);
            fs.write_dir(&dir)?;
            fs.sync_fat()?;
            parent.install(slot, dir.this().clone());
            fs.write_dir(&parent)
        })?;

        self.refresh_cwd()
    }

    /// Changes the working directory. `.` and `..` are understood anywhere in
    /// `path`.
    pub fn cd(&mut self, path: &str) -> Result<()> {
        let dir = if path == "/" {
            self.read_dir(BlockId::ROOT)?
        } else {
            let (dir, name) = self.locate(path)?;
            if name.is_empty() {
                return Err(Error::InvalidPath);
            }
            let entry = dir.lookup(name).ok_or(Error::NotFound)?;
            match entry.kind {
                DirEntryType::Regular => return Err(Error::NotADirectory),
                DirEntryType::Directory => self.read_dir(entry.dir_block()?)?,
            }
        };
        // `..` only holds a copy of the parent's entry; slot 0 has the live rights.
        dir.perm().require(Permission::Read)?;

        log::debug!("working directory is now block {}", dir.block());
        self.cwd = WorkingDir::new(dir);
        Ok(())
    }

    /// Absolute path of the working directory.
    pub fn pwd(&self) -> Result<String> {
        let mut names: Vec<String> = Vec::new();
        let mut dir = self.cwd.dir().clone();

        // No path is deeper than the volume has blocks.
        for _ in 0..self.fat.len() {
            if dir.is_root() {
                if names.is_empty() {
                    return Ok("/".to_owned());
                }
                let mut path = String::new();
                for name in names.iter().rev() {
                    path.push('/');
                    path.push_str(name);
                }
                return Ok(path);
            }
            names.push(dir.this().name().to_owned());
            dir = self.read_dir(dir.parent().dir_block()?)?;
        }

        log::error!("parent links above block {} form a cycle", self.cwd.block());
        Err(Error::InvalidPath)
    }
}
