use vfs::{Error, Result};

use crate::volume::data::Directory;
use crate::{BlockId, FatFileSystem};

/// The final component of `path`: whatever follows the last `/`.
#[inline]
pub fn leaf_name(path: &str) -> &str {
    path.rsplit_once('/').map_or(path, |(_, leaf)| leaf)
}

impl FatFileSystem {
    /// Block of the directory that holds the final component of `path`.
    ///
    /// Absolute paths start at the root, relative ones at the working directory.
    /// Every component but the last must name a directory; the last one is left
    /// for the caller and is not looked up.
    pub fn resolve(&self, path: &str) -> Result<BlockId> {
        if path == "/" {
            return Ok(BlockId::ROOT);
        }
        self.locate(path).map(|(dir, _)| dir.block())
    }

    /// Like [`FatFileSystem::resolve`], but hands back the loaded directory
    /// together with the final component.
    pub(crate) fn locate<'p>(&self, path: &'p str) -> Result<(Directory, &'p str)> {
        let (mut dir, relat_path) = match path.strip_prefix('/') {
            Some(relat_path) => (self.read_dir(BlockId::ROOT)?, relat_path),
            None => (self.cwd.dir().clone(), path),
        };

        let mut cmps = relat_path.split('/');
        let Some(basename) = cmps.next_back() else {
            return Err(Error::InvalidPath);
        };
        for cmp in cmps {
            let Some(entry) = dir.lookup(cmp).filter(|entry| entry.is_dir()) else {
                log::debug!("{cmp:?} is not a directory in {:?}", dir.this().name());
                return Err(Error::InvalidPath);
            };
            dir = self.read_dir(entry.dir_block()?)?;
        }

        Ok((dir, basename))
    }
}

#[cfg(test)]
mod tests {
    use super::leaf_name;

    #[test]
    fn leaf() {
        assert_eq!("c", leaf_name("/a/b/c"));
        assert_eq!("c", leaf_name("a/b/c"));
        assert_eq!("file", leaf_name("file"));
        assert_eq!("x", leaf_name("/x"));
        assert_eq!("", leaf_name("/"));
        assert_eq!("", leaf_name("dir/"));
        assert_eq!("..", leaf_name("../.."));
    }
}
