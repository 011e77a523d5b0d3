//! Persistence of downloaded payloads
//!
//! This module contains:
//! - The `Sink` trait the retrieval engine writes through
//! - `FileSink`, one (optionally gzipped) file per chunk

mod file;
mod traits;

pub use file::FileSink;
pub use traits::Sink;
