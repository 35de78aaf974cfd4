//! Built-in tool handlers and the file access seam.

mod access;
mod batch;
mod read_file;

pub use access::{AccessPolicy, AllowAll, DenyList};
pub use batch::{BatchFileReader, FileContent};
pub use read_file::ReadFileTool;
