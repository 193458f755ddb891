#![no_std]

extern crate alloc;

mod dirent;
mod error;
mod perm;

pub use self::{
    dirent::{DirEntry, DirEntryType},
    error::{Error, Result},
    perm::{Permission, Permissions},
};
