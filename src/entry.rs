//! Per-entry state machine: header, streaming body, descriptor, central-dir
//! record.

use crate::central::{self, CentralDirRecord};
use crate::codec::{CompressionMethod, EntryCodec};
use crate::dostime::DosDateTime;
use crate::error::{Result, SplitZipError};
use crate::volume::VolumeWriter;
use crate::{arcname, central::DATA_DESCRIPTOR_SIGNATURE};

/// ZIP32 per-entry size ceiling: sizes must stay below 2^32.
pub const MAX_ENTRY_SIZE: u64 = u32::MAX as u64;

/// The in-flight state of one archive member being written.
///
/// Created by [`EntryWriter::start`], fed uncompressed bytes through
/// [`EntryWriter::write_chunk`], and completed by [`EntryWriter::finish`],
/// which returns the record to append to the in-memory central directory.
pub struct EntryWriter {
    arcname: String,
    codec: EntryCodec,
    disk_number_start: u32,
    local_header_offset: u64,
    method_id: u16,
    version_needed: u16,
    dos: DosDateTime,
    is_directory: bool,
    uncompressed_size: u64,
    compressed_size: u64,
}

impl EntryWriter {
    /// Sanitizes `raw_name`, reserves space for and writes the local file
    /// header atomically, and begins tracking the entry's body.
    ///
    /// Directory entries (arcname ending in `/`) are always `STORED`
    /// regardless of the requested method.
    pub fn start(
        volume: &mut VolumeWriter,
        raw_name: &str,
        method: CompressionMethod,
        dos: DosDateTime,
    ) -> Result<Self> {
        let arcname = arcname::sanitize(raw_name)?;
        let is_directory = arcname::is_directory(&arcname);
        let method = if is_directory {
            CompressionMethod::Stored
        } else {
            method
        };
        let method_id = method.method_id();
        let version_needed = method.version_needed();

        let header = central::build_local_header(&arcname, method_id, version_needed, dos);
        let (disk_number_start, local_header_offset) =
            volume.reserve_for_atomic(header.len() as u64)?;
        central::check_disk_number(disk_number_start, "local header")?;
        if local_header_offset > u32::MAX as u64 {
            return Err(SplitZipError::Overflow(format!(
                "local header offset for {arcname:?} exceeds the ZIP32 32-bit offset limit"
            )));
        }
        volume.write_atomic(&header)?;

        Ok(Self {
            arcname,
            codec: EntryCodec::new(method),
            disk_number_start,
            local_header_offset,
            method_id,
            version_needed,
            dos,
            is_directory,
            uncompressed_size: 0,
            compressed_size: 0,
        })
    }

    /// Arcname this entry was started with (after sanitization).
    pub fn arcname(&self) -> &str {
        &self.arcname
    }

    /// Uncompressed bytes accepted so far.
    pub fn uncompressed_size(&self) -> u64 {
        self.uncompressed_size
    }

    /// Feeds one chunk of uncompressed bytes through the compressor and
    /// writes the resulting compressed bytes via `write_splittable`.
    pub fn write_chunk(&mut self, volume: &mut VolumeWriter, data: &[u8]) -> Result<()> {
        let compressed = self.codec.update(data)?;
        self.uncompressed_size += data.len() as u64;
        self.compressed_size += compressed.len() as u64;
        self.check_size_limits()?;
        volume.write_splittable(&compressed)
    }

    fn check_size_limits(&self) -> Result<()> {
        if self.uncompressed_size > MAX_ENTRY_SIZE || self.compressed_size > MAX_ENTRY_SIZE {
            Err(SplitZipError::Overflow(format!(
                "entry {:?} exceeds the 4 GiB ZIP32 size limit",
                self.arcname
            )))
        } else {
            Ok(())
        }
    }

    /// Flushes the compressor's tail, writes the data descriptor, and
    /// returns the completed central-directory record.
    pub fn finish(mut self, volume: &mut VolumeWriter) -> Result<CentralDirRecord> {
        let crc32 = self.codec.crc32();
        let tail = self.codec.finish()?;
        self.compressed_size += tail.len() as u64;
        self.check_size_limits()?;
        volume.write_splittable(&tail)?;

        let descriptor = central::build_data_descriptor(
            crc32,
            self.compressed_size as u32,
            self.uncompressed_size as u32,
        );
        debug_assert_eq!(&descriptor[0..4], &DATA_DESCRIPTOR_SIGNATURE.to_le_bytes());
        volume.write_atomic(&descriptor)?;

        Ok(CentralDirRecord {
            name: self.arcname,
            method_id: self.method_id,
            version_needed: self.version_needed,
            dos: self.dos,
            crc32,
            compressed_size: self.compressed_size as u32,
            uncompressed_size: self.uncompressed_size as u32,
            disk_number_start: self.disk_number_start,
            local_header_offset: self.local_header_offset as u32,
            is_directory: self.is_directory,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn stored_entry_round_trips_sizes_and_crc() {
        let dir = tempdir().unwrap();
        let mut volume = VolumeWriter::create(dir.path().join("out"), 65536).unwrap();
        let dos = DosDateTime { time: 0, date: 0 };
        let mut entry =
            EntryWriter::start(&mut volume, "a.txt", CompressionMethod::Stored, dos).unwrap();
        entry.write_chunk(&mut volume, b"helloworld").unwrap();
        let record = entry.finish(&mut volume).unwrap();

        assert_eq!(record.uncompressed_size, 10);
        assert_eq!(record.compressed_size, 10);
        assert_eq!(record.crc32, 0xb1d4_025b);
    }

    #[test]
    fn directory_entry_forces_stored_and_zero_size() {
        let dir = tempdir().unwrap();
        let mut volume = VolumeWriter::create(dir.path().join("out"), 65536).unwrap();
        let dos = DosDateTime { time: 0, date: 0 };
        let entry = EntryWriter::start(
            &mut volume,
            "dir/",
            CompressionMethod::Deflated(6),
            dos,
        )
        .unwrap();
        let record = entry.finish(&mut volume).unwrap();
        assert_eq!(record.method_id, 0);
        assert_eq!(record.uncompressed_size, 0);
        assert!(record.is_directory);
    }

    #[test]
    fn zip_slip_name_is_rejected_before_any_write() {
        let dir = tempdir().unwrap();
        let mut volume = VolumeWriter::create(dir.path().join("out"), 65536).unwrap();
        let dos = DosDateTime { time: 0, date: 0 };
        let result = EntryWriter::start(
            &mut volume,
            "../etc/passwd",
            CompressionMethod::Stored,
            dos,
        );
        assert!(result.is_err());
        assert_eq!(volume.offset(), 0);
    }
}
