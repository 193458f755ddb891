use alloc::sync::Arc;
use alloc::vec::Vec;

use block_dev::{BlockDevice, DeviceError};
use vfs::{Error, Result};

use crate::cwd::WorkingDir;
use crate::volume::data::{DirEntry, Directory};
use crate::volume::fat::{Fat, FatEntry};
use crate::{BLOCK_SIZE, BlockId, DataBlock, MAX_BLOCKS};

/// One mounted volume together with the session state that goes with it:
/// the in-memory allocation table and the working directory.
///
/// Every operation takes `&mut self`, so a session has exclusive access to
/// both for as long as the operation runs.
pub struct FatFileSystem {
    dev: Arc<dyn BlockDevice>,
    pub(crate) fat: Fat,
    pub(crate) cwd: WorkingDir,
}

impl FatFileSystem {
    /// Creates an empty file system on `dev` and positions the session at the root.
    pub fn format(dev: &Arc<dyn BlockDevice>) -> Result<Self> {
        let num_blocks = dev.num_blocks();
        if num_blocks < 2 {
            log::error!("a device of {num_blocks} blocks cannot hold a volume");
            return Err(Error::InvalidArgument);
        }
        if num_blocks > MAX_BLOCKS {
            log::warn!("only the first {MAX_BLOCKS} of {num_blocks} blocks are addressable");
        }

        let root = Directory::root();
        let fs = Self {
            dev: dev.clone(),
            fat: Fat::new(num_blocks),
            cwd: WorkingDir::new(root),
        };
        fs.write_dir(fs.cwd.dir())?;
        fs.sync_fat()?;
        log::info!("formatted volume with {} blocks", fs.fat.len());

        Ok(fs)
    }

    /// Opens a volume previously created by [`FatFileSystem::format`].
    pub fn load(dev: &Arc<dyn BlockDevice>) -> Result<Self> {
        let mut buf: DataBlock = [0; BLOCK_SIZE];
        read_block(&**dev, BlockId::FAT, &mut buf)?;
        let fat = Fat::decode(&buf, dev.num_blocks());

        if [BlockId::FAT, BlockId::ROOT]
            .into_iter()
            .any(|id| fat.get(id) != Some(FatEntry::Eof))
        {
            log::error!("device does not hold a formatted volume");
            return Err(Error::IoFailure);
        }

        let mut fs = Self {
            dev: dev.clone(),
            fat,
            cwd: WorkingDir::new(Directory::root()),
        };
        fs.cwd = WorkingDir::new(fs.read_dir(BlockId::ROOT)?);
        log::info!(
            "loaded volume: {} blocks, {} free",
            fs.fat.len(),
            fs.fat.free_blocks()
        );

        Ok(fs)
    }

    #[inline]
    pub fn fat(&self) -> &Fat {
        &self.fat
    }

    #[inline]
    pub fn free_blocks(&self) -> usize {
        self.fat.free_blocks()
    }

    #[inline]
    pub fn cwd(&self) -> &WorkingDir {
        &self.cwd
    }
}

impl FatFileSystem {
    pub(crate) fn read_block(&self, id: BlockId, buf: &mut DataBlock) -> Result<()> {
        read_block(&*self.dev, id, buf)
    }

    pub(crate) fn write_block(&self, id: BlockId, buf: &DataBlock) -> Result<()> {
        self.dev
            .write_block(id.index(), buf)
            .map_err(|err| device_fault(id, err))
    }

    pub(crate) fn read_dir(&self, id: BlockId) -> Result<Directory> {
        let mut buf = [0; BLOCK_SIZE];
        self.read_block(id, &mut buf)?;
        Directory::decode(id, &buf)
    }

    pub(crate) fn write_dir(&self, dir: &Directory) -> Result<()> {
        log::debug!("writing directory {:?} to block {}", dir.this().name(), dir.block());
        let mut buf = [0; BLOCK_SIZE];
        dir.encode(&mut buf)?;
        self.write_block(dir.block(), &buf)
    }

    /// 将内存中的FAT写回设备。
    pub(crate) fn sync_fat(&self) -> Result<()> {
        let mut buf = [0; BLOCK_SIZE];
        self.fat.encode(&mut buf);
        self.write_block(BlockId::FAT, &buf)
    }

    /// 重新读取工作目录。
    pub(crate) fn refresh_cwd(&mut self) -> Result<()> {
        self.cwd = WorkingDir::new(self.read_dir(self.cwd.block())?);
        Ok(())
    }

    /// Runs `op`, which may allocate or free blocks.
    /// If it fails, the allocation table goes back to how it was before,
    /// both in memory and on the device.
    pub(crate) fn with_rollback<T>(
        &mut self,
        op: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        let snapshot = self.fat.clone();
        let result = op(self);
        if let Err(err) = &result {
            log::warn!("{err}, restoring allocation table");
            self.fat = snapshot;
            if let Err(err) = self.sync_fat() {
                log::error!("failed to restore allocation table on the device: {err}");
            }
        }
        result
    }

    /// 读取文件的全部 `entry.size` 字节。
    pub(crate) fn read_content(&self, entry: &DirEntry) -> Result<Vec<u8>> {
        let size = entry.size as usize;
        let mut data = Vec::with_capacity(size);
        let mut buf = [0; BLOCK_SIZE];

        for id in self.fat.chain(entry.first_block) {
            if data.len() == size {
                break;
            }
            self.read_block(id, &mut buf)?;
            let len = (size - data.len()).min(BLOCK_SIZE);
            data.extend_from_slice(&buf[..len]);
        }

        if data.len() < size {
            log::warn!(
                "{:?} records {size} bytes but its chain holds {}",
                entry.name(),
                data.len()
            );
        }
        Ok(data)
    }

    /// Writes `data` across the chain starting at `head`, one block per chunk;
    /// the unused end of the last block is zeroed.
    pub(crate) fn write_content(&self, head: Option<BlockId>, data: &[u8]) -> Result<()> {
        let mut buf = [0; BLOCK_SIZE];
        for (id, chunk) in self.fat.chain(head).zip(data.chunks(BLOCK_SIZE)) {
            buf[..chunk.len()].copy_from_slice(chunk);
            buf[chunk.len()..].fill(0);
            self.write_block(id, &buf)?;
        }
        Ok(())
    }
}

fn read_block(dev: &dyn BlockDevice, id: BlockId, buf: &mut DataBlock) -> Result<()> {
    dev.read_block(id.index(), buf)
        .map_err(|err| device_fault(id, err))
}

fn device_fault(id: BlockId, err: DeviceError) -> Error {
    log::error!("block {id}: {err}");
    Error::IoFailure
}
