use std::cell::RefCell;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom, Write};

use block_dev::{BlockDevice, DeviceError};
use fat::BLOCK_SIZE;
use send_wrapper::SendWrapper;

/// A disk image on the host. Block `n` lives at byte offset `n * BLOCK_SIZE`.
#[derive(Debug)]
pub struct BlockFile {
    inner: SendWrapper<RefCell<File>>,
    num_blocks: usize,
}

impl BlockFile {
    pub fn new(fd: File) -> io::Result<Self> {
        let len = fd.metadata()?.len();
        Ok(Self {
            inner: SendWrapper::new(RefCell::new(fd)),
            num_blocks: len as usize / BLOCK_SIZE,
        })
    }

    fn seek(&self, file: &mut File, block_id: usize) -> Result<(), DeviceError> {
        if block_id >= self.num_blocks {
            return Err(DeviceError::OutOfRange(block_id));
        }
        file.seek(SeekFrom::Start((block_id * BLOCK_SIZE) as u64))
            .map_err(host_fault)?;
        Ok(())
    }
}

impl BlockDevice for BlockFile {
    fn num_blocks(&self) -> usize {
        self.num_blocks
    }

    fn read_block(&self, block_id: usize, buf: &mut [u8]) -> Result<(), DeviceError> {
        let mut file = self.inner.borrow_mut();
        self.seek(&mut file, block_id)?;
        let len = file.read(buf).map_err(host_fault)?;
        if len != BLOCK_SIZE {
            return Err(DeviceError::ShortTransfer { block_id, len });
        }
        Ok(())
    }

    fn write_block(&self, block_id: usize, buf: &[u8]) -> Result<(), DeviceError> {
        let mut file = self.inner.borrow_mut();
        self.seek(&mut file, block_id)?;
        let len = file.write(buf).map_err(host_fault)?;
        if len != BLOCK_SIZE {
            return Err(DeviceError::ShortTransfer { block_id, len });
        }
        Ok(())
    }
}

fn host_fault(err: io::Error) -> DeviceError {
    log::error!("disk image: {err}");
    DeviceError::Io
}
