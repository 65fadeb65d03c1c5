//! Hand-rolled archive construction for tests.
//!
//! The crate is read-only by design, so tests assemble archives byte by
//! byte: local file headers and payloads first, then the central
//! directory, then the end record.

use flate2::Compression;
use flate2::write::DeflateEncoder;
use std::io::Write;

pub(crate) fn deflate(data: &[u8]) -> Vec<u8> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

pub(crate) struct ZipBuilder {
    local: Vec<u8>,
    cd: Vec<u8>,
    entries: u16,
    pub disk_number: u16,
    pub comment: Vec<u8>,
    pub zip64_eocd: bool,
}

impl ZipBuilder {
    pub fn new() -> Self {
        Self {
            local: Vec::new(),
            cd: Vec::new(),
            entries: 0,
            disk_number: 0,
            comment: Vec::new(),
            zip64_eocd: false,
        }
    }

    /// Append an entry with full control over the recorded metadata.
    ///
    /// `payload` is written verbatim after the local header; `crc` and
    /// `uncompressed_size` go into both headers unchecked, which lets
    /// tests fabricate mismatches.
    pub fn add_raw(
        &mut self,
        name: &[u8],
        payload: &[u8],
        method: u16,
        crc: u32,
        uncompressed_size: u32,
        flags: u16,
    ) {
        let lfh_offset = self.local.len() as u32;
        let compressed_size = payload.len() as u32;
        let name_len = name.len() as u16;

        // Local file header
        self.local.extend_from_slice(b"PK\x03\x04");
        self.local.extend_from_slice(&20u16.to_le_bytes()); // version needed
        self.local.extend_from_slice(&flags.to_le_bytes());
        self.local.extend_from_slice(&method.to_le_bytes());
        self.local.extend_from_slice(&0u16.to_le_bytes()); // mod time
        self.local.extend_from_slice(&0u16.to_le_bytes()); // mod date
        self.local.extend_from_slice(&crc.to_le_bytes());
        self.local.extend_from_slice(&compressed_size.to_le_bytes());
        self.local.extend_from_slice(&uncompressed_size.to_le_bytes());
        self.local.extend_from_slice(&name_len.to_le_bytes());
        self.local.extend_from_slice(&0u16.to_le_bytes()); // extra length
        self.local.extend_from_slice(name);
        self.local.extend_from_slice(payload);

        // Central directory file header
        self.cd.extend_from_slice(b"PK\x01\x02");
        self.cd.extend_from_slice(&20u16.to_le_bytes()); // version made by
        self.cd.extend_from_slice(&20u16.to_le_bytes()); // version needed
        self.cd.extend_from_slice(&flags.to_le_bytes());
        self.cd.extend_from_slice(&method.to_le_bytes());
        self.cd.extend_from_slice(&0u16.to_le_bytes()); // mod time
        self.cd.extend_from_slice(&0u16.to_le_bytes()); // mod date
        self.cd.extend_from_slice(&crc.to_le_bytes());
        self.cd.extend_from_slice(&compressed_size.to_le_bytes());
        self.cd.extend_from_slice(&uncompressed_size.to_le_bytes());
        self.cd.extend_from_slice(&name_len.to_le_bytes());
        self.cd.extend_from_slice(&0u16.to_le_bytes()); // extra length
        self.cd.extend_from_slice(&0u16.to_le_bytes()); // comment length
        self.cd.extend_from_slice(&0u16.to_le_bytes()); // disk number start
        self.cd.extend_from_slice(&0u16.to_le_bytes()); // internal attrs
        self.cd.extend_from_slice(&0u32.to_le_bytes()); // external attrs
        self.cd.extend_from_slice(&lfh_offset.to_le_bytes());
        self.cd.extend_from_slice(name);

        self.entries += 1;
    }

    pub fn add_stored(&mut self, name: &str, content: &[u8]) {
        self.add_raw(
            name.as_bytes(),
            content,
            0,
            crc32fast::hash(content),
            content.len() as u32,
            0,
        );
    }

    pub fn add_deflate(&mut self, name: &str, content: &[u8]) {
        let compressed = deflate(content);
        self.add_raw(
            name.as_bytes(),
            &compressed,
            8,
            crc32fast::hash(content),
            content.len() as u32,
            0,
        );
    }

    /// Append a stored entry whose central directory record uses ZIP64
    /// sentinel sizes resolved through the 0x0001 extra field.
    pub fn add_zip64_stored(&mut self, name: &str, content: &[u8]) {
        let name = name.as_bytes();
        let lfh_offset = self.local.len() as u64;
        let size = content.len() as u32;
        let crc = crc32fast::hash(content);
        let name_len = name.len() as u16;

        self.local.extend_from_slice(b"PK\x03\x04");
        self.local.extend_from_slice(&45u16.to_le_bytes());
        self.local.extend_from_slice(&0u16.to_le_bytes());
        self.local.extend_from_slice(&0u16.to_le_bytes()); // stored
        self.local.extend_from_slice(&0u16.to_le_bytes());
        self.local.extend_from_slice(&0u16.to_le_bytes());
        self.local.extend_from_slice(&crc.to_le_bytes());
        self.local.extend_from_slice(&size.to_le_bytes());
        self.local.extend_from_slice(&size.to_le_bytes());
        self.local.extend_from_slice(&name_len.to_le_bytes());
        self.local.extend_from_slice(&0u16.to_le_bytes());
        self.local.extend_from_slice(name);
        self.local.extend_from_slice(content);

        let extra_len = 4u16 + 24;
        self.cd.extend_from_slice(b"PK\x01\x02");
        self.cd.extend_from_slice(&45u16.to_le_bytes());
        self.cd.extend_from_slice(&45u16.to_le_bytes());
        self.cd.extend_from_slice(&0u16.to_le_bytes());
        self.cd.extend_from_slice(&0u16.to_le_bytes()); // stored
        self.cd.extend_from_slice(&0u16.to_le_bytes());
        self.cd.extend_from_slice(&0u16.to_le_bytes());
        self.cd.extend_from_slice(&crc.to_le_bytes());
        self.cd.extend_from_slice(&u32::MAX.to_le_bytes()); // size sentinel
        self.cd.extend_from_slice(&u32::MAX.to_le_bytes()); // size sentinel
        self.cd.extend_from_slice(&name_len.to_le_bytes());
        self.cd.extend_from_slice(&extra_len.to_le_bytes());
        self.cd.extend_from_slice(&0u16.to_le_bytes());
        self.cd.extend_from_slice(&0u16.to_le_bytes());
        self.cd.extend_from_slice(&0u16.to_le_bytes());
        self.cd.extend_from_slice(&0u32.to_le_bytes());
        self.cd.extend_from_slice(&u32::MAX.to_le_bytes()); // offset sentinel
        self.cd.extend_from_slice(name);
        // ZIP64 extended information: uncompressed, compressed, offset
        self.cd.extend_from_slice(&0x0001u16.to_le_bytes());
        self.cd.extend_from_slice(&24u16.to_le_bytes());
        self.cd.extend_from_slice(&(size as u64).to_le_bytes());
        self.cd.extend_from_slice(&(size as u64).to_le_bytes());
        self.cd.extend_from_slice(&lfh_offset.to_le_bytes());

        self.entries += 1;
    }

    pub fn build(self) -> Vec<u8> {
        let cd_offset = self.local.len() as u32;
        let cd_size = self.cd.len() as u32;

        let mut bytes = self.local;
        bytes.extend_from_slice(&self.cd);

        if self.zip64_eocd {
            let eocd64_offset = bytes.len() as u64;
            bytes.extend_from_slice(b"PK\x06\x06");
            bytes.extend_from_slice(&44u64.to_le_bytes()); // record size
            bytes.extend_from_slice(&45u16.to_le_bytes()); // version made by
            bytes.extend_from_slice(&45u16.to_le_bytes()); // version needed
            bytes.extend_from_slice(&0u32.to_le_bytes()); // disk number
            bytes.extend_from_slice(&0u32.to_le_bytes()); // disk with CD
            bytes.extend_from_slice(&(self.entries as u64).to_le_bytes());
            bytes.extend_from_slice(&(self.entries as u64).to_le_bytes());
            bytes.extend_from_slice(&(cd_size as u64).to_le_bytes());
            bytes.extend_from_slice(&(cd_offset as u64).to_le_bytes());

            bytes.extend_from_slice(b"PK\x06\x07");
            bytes.extend_from_slice(&0u32.to_le_bytes()); // disk with EOCD64
            bytes.extend_from_slice(&eocd64_offset.to_le_bytes());
            bytes.extend_from_slice(&1u32.to_le_bytes()); // total disks

            bytes.extend_from_slice(b"PK\x05\x06");
            bytes.extend_from_slice(&self.disk_number.to_le_bytes());
            bytes.extend_from_slice(&0u16.to_le_bytes());
            bytes.extend_from_slice(&u16::MAX.to_le_bytes()); // sentinel
            bytes.extend_from_slice(&u16::MAX.to_le_bytes()); // sentinel
            bytes.extend_from_slice(&u32::MAX.to_le_bytes()); // sentinel
            bytes.extend_from_slice(&u32::MAX.to_le_bytes()); // sentinel
            bytes.extend_from_slice(&0u16.to_le_bytes());
            return bytes;
        }

        bytes.extend_from_slice(b"PK\x05\x06");
        bytes.extend_from_slice(&self.disk_number.to_le_bytes());
        bytes.extend_from_slice(&0u16.to_le_bytes()); // disk with CD
        bytes.extend_from_slice(&self.entries.to_le_bytes());
        bytes.extend_from_slice(&self.entries.to_le_bytes());
        bytes.extend_from_slice(&cd_size.to_le_bytes());
        bytes.extend_from_slice(&cd_offset.to_le_bytes());
        bytes.extend_from_slice(&(self.comment.len() as u16).to_le_bytes());
        bytes.extend_from_slice(&self.comment);
        bytes
    }
}
