use thiserror::Error;

/// Error type for archive operations.
///
/// One variant per failure cause, following the libzip error code table.
/// The numeric codes are preserved through [`ZipError::code`] so callers
/// interoperating with libzip-style tooling can map errors both ways;
/// codes without a dedicated variant round-trip as [`ZipError::Unknown`].
#[derive(Error, Debug)]
pub enum ZipError {
    /// Allocation for in-memory file failed
    #[error("Allocation for in-memory file failed")]
    InMemoryFileAllocation,

    /// Multi-disk zip archives not supported
    #[error("Multi-disk zip archives not supported")]
    Multidisk,

    /// Seek error
    #[error("Seek error")]
    Seek,

    /// Read error
    #[error("Read error: {0}")]
    Read(std::io::Error),

    /// CRC of the extracted data does not match the stored CRC
    #[error("CRC error")]
    Crc,

    /// Containing zip archive was closed
    #[error("Containing zip archive was closed")]
    ZipClosed,

    /// No such file
    #[error("No such file")]
    NoEntry,

    /// File already exists
    #[error("File already exists")]
    Exists,

    /// Can't open file
    #[error("Can't open file")]
    FileOpen,

    /// Failure to create temporary file
    #[error("Failure to create temporary file")]
    TemporaryFileOpen,

    /// Decompression failed
    #[error("Zlib error: {0}")]
    Zlib(std::io::Error),

    /// Malloc failure
    #[error("Malloc failure")]
    Allocation,

    /// Entry has been changed
    #[error("Entry has been changed")]
    Changed,

    /// Compression method not supported
    #[error("Compression method not supported")]
    CompressionMethodNotSupported,

    /// Premature EOF
    #[error("Premature EOF")]
    Eof,

    /// Not a zip archive
    #[error("Not a zip archive")]
    NotZip,

    /// Internal error
    #[error("Internal error")]
    Internal,

    /// Zip archive inconsistent
    #[error("Zip archive inconsistent")]
    Inconsistent,

    /// Entry has been deleted
    #[error("Entry has been deleted")]
    Deleted,

    /// Encryption method not supported
    #[error("Encryption method not supported")]
    EncryptionMethodNotSupported,

    /// Read-only archive
    #[error("Read-only archive")]
    ReadOnly,

    /// No password provided
    #[error("No password provided")]
    NoPassword,

    /// Wrong password provided
    #[error("Wrong password provided")]
    WrongPassword,

    /// Error code with no dedicated variant
    #[error("Unknown error code: {0}")]
    Unknown(i32),
}

impl ZipError {
    /// The libzip numeric code for this error.
    pub fn code(&self) -> i32 {
        match self {
            ZipError::InMemoryFileAllocation => -1,
            ZipError::Multidisk => 1,
            ZipError::Seek => 4,
            ZipError::Read(_) => 5,
            ZipError::Crc => 7,
            ZipError::ZipClosed => 8,
            ZipError::NoEntry => 9,
            ZipError::Exists => 10,
            ZipError::FileOpen => 11,
            ZipError::TemporaryFileOpen => 12,
            ZipError::Zlib(_) => 13,
            ZipError::Allocation => 14,
            ZipError::Changed => 15,
            ZipError::CompressionMethodNotSupported => 16,
            ZipError::Eof => 17,
            ZipError::NotZip => 19,
            ZipError::Internal => 20,
            ZipError::Inconsistent => 21,
            ZipError::Deleted => 23,
            ZipError::EncryptionMethodNotSupported => 24,
            ZipError::ReadOnly => 25,
            ZipError::NoPassword => 26,
            ZipError::WrongPassword => 27,
            ZipError::Unknown(code) => *code,
        }
    }
}

/// Result type alias for archive operations
pub type Result<T> = std::result::Result<T, ZipError>;
