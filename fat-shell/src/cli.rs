use std::path::PathBuf;

use clap::Parser;
use fat::MAX_BLOCKS;

#[derive(Parser)]
#[command(about = "Interactive shell on a FAT-style disk image")]
pub struct Cli {
    /// Disk image holding the volume; created and formatted if missing
    #[arg(long, short, default_value = "diskfile.bin")]
    pub image: PathBuf,

    /// Size in blocks of a newly created image
    #[arg(long, short, default_value_t = MAX_BLOCKS)]
    pub blocks: usize,

    /// Format the volume before starting
    #[arg(long, short)]
    pub format: bool,
}
