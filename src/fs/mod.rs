//! File system operations module
//!
//! Provides the filesystem collaborator the batch operator runs on:
//! existence checks, single-file copy and single-file delete.

mod operations;

pub use operations::*;
