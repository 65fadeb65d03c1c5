//! ZIP archive indexing and extraction.
//!
//! This module provides random-access reading of ZIP archives: the
//! central directory is parsed once into a name-keyed index, and entry
//! payloads are extracted on demand.
//!
//! ## Architecture
//!
//! The module is organized into three main components:
//!
//! - [`structures`]: Data structures representing ZIP format elements (EOCD, file headers, etc.)
//! - [`index`]: Central directory parsing into a name-to-record map
//! - [`reader`]: High-level lookup and extraction API for end users
//!
//! ## ZIP Format Overview
//!
//! A ZIP file consists of:
//! 1. Local file headers and compressed data for each file
//! 2. Central Directory with metadata for all files
//! 3. End of Central Directory (EOCD) record at the end
//!
//! This implementation reads the EOCD first (from the end of the file),
//! then the Central Directory, which allows listing and extracting
//! individual entries without ever touching the rest of the archive.
//!
//! ## Supported Features
//!
//! - Standard ZIP format (PKZIP APPNOTE 6.3.x compatible)
//! - ZIP64 extensions for files > 4GB
//! - STORED (no compression) method
//! - DEFLATE compression method
//! - CRC32 verification of every extracted payload
//!
//! ## Limitations
//!
//! - No encryption support (encrypted entries are reported, not read)
//! - No multi-disk archive support
//! - Read-only; no archive creation or modification

mod index;
mod reader;
mod structures;
#[cfg(test)]
mod testutil;

pub use index::ArchiveIndex;
pub use reader::ZipReader;
pub use structures::*;
