mod block_file;
mod cli;
mod shell;

use std::fs::OpenOptions;
use std::io;
use std::sync::Arc;

use block_dev::BlockDevice;
use clap::Parser;
use fat::{BLOCK_SIZE, FatFileSystem};

pub use self::{block_file::BlockFile, cli::Cli, shell::Shell};

fn main() -> io::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let fresh = !cli.image.exists();
    log::info!("image={:?} fresh={fresh}", cli.image);

    let fd = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(&cli.image)?;
    if fresh {
        fd.set_len((cli.blocks * BLOCK_SIZE) as u64)?;
    }

    let block_dev: Arc<dyn BlockDevice> = Arc::new(BlockFile::new(fd)?);
    let fs = if fresh || cli.format {
        FatFileSystem::format(&block_dev)
    } else {
        FatFileSystem::load(&block_dev)
    };
    let fs = fs.map_err(|err| {
        log::error!("cannot open {:?}, `--format` creates a new volume", cli.image);
        io::Error::other(err)
    })?;

    let stdin = io::stdin();
    Shell::new(block_dev, fs).run(stdin.lock(), io::stdout())
}
