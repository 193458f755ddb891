//! Volume layout
//!
//! allocation table (block 0) | root directory (block 1) | data and directory blocks

pub mod data;
pub mod fat;

