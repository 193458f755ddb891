use derive_more::Display;

pub type Result<T> = core::result::Result<T, Error>;

/// Every way a file system operation can fail.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[display(fmt = "invalid path")]
    InvalidPath,
    #[display(fmt = "no such file or directory")]
    NotFound,
    /// Empty, too long, or reserved (`.`/`..`)
    #[display(fmt = "invalid name")]
    NameInvalid,
    #[display(fmt = "name already exists")]
    NameConflict,
    #[display(fmt = "not a file")]
    NotAFile,
    #[display(fmt = "not a directory")]
    NotADirectory,
    #[display(fmt = "is a directory")]
    IsADirectory,
    #[display(fmt = "insufficient access rights")]
    AccessDenied,
    #[display(fmt = "directory is full")]
    DirectoryFull,
    #[display(fmt = "directory is not empty")]
    DirectoryNotEmpty,
    #[display(fmt = "no free blocks left")]
    OutOfBlocks,
    #[display(fmt = "invalid argument")]
    InvalidArgument,
    #[display(fmt = "I/O failure")]
    IoFailure,
}

impl core::error::Error for Error {}
