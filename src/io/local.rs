use super::ReadAt;
use crate::error::{Result, ZipError};
use std::path::Path;

/// Local file source with random access support.
///
/// Owns the underlying file handle; it is closed when the source is
/// dropped, exactly once, on every exit path.
pub struct FileSource {
    file: std::fs::File,
    size: u64,
}

impl FileSource {
    pub fn open(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path).map_err(|err| {
            tracing::debug!(path = %path.display(), %err, "failed to open archive file");
            ZipError::FileOpen
        })?;
        let size = file.metadata().map_err(|_| ZipError::FileOpen)?.len();
        Ok(Self { file, size })
    }
}

impl ReadAt for FileSource {
    fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> Result<()> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::FileExt;
            self.file.read_exact_at(buf, offset).map_err(|e| match e.kind() {
                std::io::ErrorKind::UnexpectedEof => ZipError::Eof,
                _ => ZipError::Read(e),
            })
        }

        #[cfg(not(unix))]
        {
            use std::io::{Read, Seek, SeekFrom};
            // No pread on this platform; seek and read through a shared
            // handle. Not safe for concurrent readers of the same source.
            let mut file = &self.file;
            file.seek(SeekFrom::Start(offset))
                .map_err(|_| ZipError::Seek)?;
            file.read_exact(buf).map_err(|e| match e.kind() {
                std::io::ErrorKind::UnexpectedEof => ZipError::Eof,
                _ => ZipError::Read(e),
            })
        }
    }

    fn size(&self) -> u64 {
        self.size
    }
}
