//! # zipread
//!
//! Random-access ZIP entry lookup and extraction.
//!
//! This library reads ZIP archives from an in-memory byte buffer or a
//! file path and extracts individual entries by name. The central
//! directory is parsed into a name-keyed index on first use; after
//! that, each lookup seeks straight to the entry's local header,
//! decompresses the payload, and verifies its CRC32. Nothing else in
//! the archive is read.
//!
//! ## Features
//!
//! - Open archives from owned byte buffers (no copy) or file paths
//! - List entry names and metadata without extracting anything
//! - Extract single entries on demand (STORED and DEFLATE methods)
//! - CRC32 verification of every extracted payload
//! - ZIP64 support for archives larger than 4GB
//!
//! ## Example
//!
//! ```no_run
//! use zipread::ZipReader;
//!
//! fn main() -> zipread::Result<()> {
//!     let reader = ZipReader::open("archive.zip")?;
//!
//!     // List all entries in the archive
//!     for name in reader.names()? {
//!         println!("{name}");
//!     }
//!
//!     // Extract one entry; a missing name is `None`, not an error
//!     if let Some(bytes) = reader.data("docs/readme.md")? {
//!         println!("{} bytes", bytes.len());
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod error;
pub mod io;
pub mod zip;

pub use cli::Cli;
pub use error::{Result, ZipError};
pub use io::{FileSource, MemorySource, ReadAt};
pub use zip::{ArchiveIndex, CompressionMethod, EntryFlags, EntryRecord, ZipReader};
