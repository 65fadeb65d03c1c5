use super::ReadAt;
use crate::error::{Result, ZipError};

/// In-memory byte source over an owned buffer.
///
/// Takes ownership of the buffer without copying it. An empty buffer is
/// rejected up front: there is no readable view to establish over it.
pub struct MemorySource {
    data: Vec<u8>,
}

impl MemorySource {
    pub fn new(data: Vec<u8>) -> Result<Self> {
        if data.is_empty() {
            return Err(ZipError::InMemoryFileAllocation);
        }
        Ok(Self { data })
    }
}

impl ReadAt for MemorySource {
    fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> Result<()> {
        let end = offset
            .checked_add(buf.len() as u64)
            .ok_or(ZipError::Eof)?;
        if end > self.data.len() as u64 {
            return Err(ZipError::Eof);
        }
        buf.copy_from_slice(&self.data[offset as usize..end as usize]);
        Ok(())
    }

    fn size(&self) -> u64 {
        self.data.len() as u64
    }
}
