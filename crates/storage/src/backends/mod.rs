//! Blob storage backends.

pub mod filesystem;
pub mod memory;
