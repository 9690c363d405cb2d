//! Wire-format encoding for central directory records and the EOCD.

use crate::dostime::DosDateTime;
use crate::error::{Result, SplitZipError};

/// Largest disk index the 16-bit ZIP32 disk-number fields can hold.
pub const MAX_DISK_NUMBER: u32 = 0xFFFF;

/// Rejects a disk index that would overflow a ZIP32 disk-number field
/// instead of silently truncating it when packed into `u16`.
pub fn check_disk_number(disk: u32, context: &str) -> Result<()> {
    if disk > MAX_DISK_NUMBER {
        Err(SplitZipError::Overflow(format!(
            "{context} disk number {disk} exceeds the ZIP32 16-bit disk-number limit"
        )))
    } else {
        Ok(())
    }
}

/// Local file header signature `PK\x03\x04`.
pub const LOCAL_FILE_HEADER_SIGNATURE: u32 = 0x04034b50;
/// Data descriptor signature `PK\x07\x08`.
pub const DATA_DESCRIPTOR_SIGNATURE: u32 = 0x08074b50;
/// Central directory file header signature `PK\x01\x02`.
pub const CENTRAL_DIR_SIGNATURE: u32 = 0x02014b50;
/// End of central directory signature `PK\x05\x06`.
pub const EOCD_SIGNATURE: u32 = 0x06054b50;

/// General-purpose bit flag: bit 3 set (sizes/CRC follow in a data
/// descriptor), required for every entry.
pub const GENERAL_PURPOSE_FLAG: u16 = 0x0008;

/// Unix directory bit + rwxr-xr-x, packed into the upper 16 bits of the
/// external-attributes field the way Info-ZIP-compatible writers do.
const UNIX_DIR_MODE: u32 = 0o040755;
/// Unix regular-file rw-r--r--, packed the same way.
const UNIX_FILE_MODE: u32 = 0o100644;
/// MS-DOS directory attribute bit, set in the low 16 bits for directories
/// so that non-Unix-aware extractors still recognize them.
const MSDOS_DIR_ATTR: u32 = 0x10;

/// One entry's worth of bookkeeping needed to emit its central-directory
/// record, captured at the time its local header was reserved/finished.
#[derive(Debug, Clone)]
pub struct CentralDirRecord {
    pub name: String,
    pub method_id: u16,
    pub version_needed: u16,
    pub dos: DosDateTime,
    pub crc32: u32,
    pub compressed_size: u32,
    pub uncompressed_size: u32,
    pub disk_number_start: u32,
    pub local_header_offset: u32,
    pub is_directory: bool,
}

impl CentralDirRecord {
    fn external_attrs(&self) -> u32 {
        if self.is_directory {
            (UNIX_DIR_MODE << 16) | MSDOS_DIR_ATTR
        } else {
            UNIX_FILE_MODE << 16
        }
    }
}

/// Builds the 30-byte-plus-name local file header, with placeholder
/// crc32/sizes (bit 3 defers those to the data descriptor).
pub fn build_local_header(name: &str, method_id: u16, version_needed: u16, dos: DosDateTime) -> Vec<u8> {
    let name_bytes = name.as_bytes();
    let mut out = Vec::with_capacity(30 + name_bytes.len());
    out.extend_from_slice(&LOCAL_FILE_HEADER_SIGNATURE.to_le_bytes());
    out.extend_from_slice(&version_needed.to_le_bytes());
    out.extend_from_slice(&GENERAL_PURPOSE_FLAG.to_le_bytes());
    out.extend_from_slice(&method_id.to_le_bytes());
    out.extend_from_slice(&dos.time.to_le_bytes());
    out.extend_from_slice(&dos.date.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes()); // crc32 placeholder
    out.extend_from_slice(&0u32.to_le_bytes()); // compressed size placeholder
    out.extend_from_slice(&0u32.to_le_bytes()); // uncompressed size placeholder
    out.extend_from_slice(&(name_bytes.len() as u16).to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes()); // extra length
    out.extend_from_slice(name_bytes);
    out
}

/// Builds the 16-byte data descriptor following an entry's body.
pub fn build_data_descriptor(crc32: u32, compressed_size: u32, uncompressed_size: u32) -> Vec<u8> {
    let mut out = Vec::with_capacity(16);
    out.extend_from_slice(&DATA_DESCRIPTOR_SIGNATURE.to_le_bytes());
    out.extend_from_slice(&crc32.to_le_bytes());
    out.extend_from_slice(&compressed_size.to_le_bytes());
    out.extend_from_slice(&uncompressed_size.to_le_bytes());
    out
}

/// Builds the fixed 46-byte central-directory header plus the entry's name
/// (extra field and comment are always empty in this implementation).
pub fn build_central_dir_record(record: &CentralDirRecord) -> Vec<u8> {
    let name_bytes = record.name.as_bytes();
    let mut out = Vec::with_capacity(46 + name_bytes.len());
    out.extend_from_slice(&CENTRAL_DIR_SIGNATURE.to_le_bytes());
    out.extend_from_slice(&record.version_needed.to_le_bytes()); // version made by
    out.extend_from_slice(&record.version_needed.to_le_bytes()); // version needed
    out.extend_from_slice(&GENERAL_PURPOSE_FLAG.to_le_bytes());
    out.extend_from_slice(&record.method_id.to_le_bytes());
    out.extend_from_slice(&record.dos.time.to_le_bytes());
    out.extend_from_slice(&record.dos.date.to_le_bytes());
    out.extend_from_slice(&record.crc32.to_le_bytes());
    out.extend_from_slice(&record.compressed_size.to_le_bytes());
    out.extend_from_slice(&record.uncompressed_size.to_le_bytes());
    out.extend_from_slice(&(name_bytes.len() as u16).to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes()); // extra length
    out.extend_from_slice(&0u16.to_le_bytes()); // comment length
    out.extend_from_slice(&(record.disk_number_start as u16).to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes()); // internal attributes
    out.extend_from_slice(&record.external_attrs().to_le_bytes());
    out.extend_from_slice(&record.local_header_offset.to_le_bytes());
    out.extend_from_slice(name_bytes);
    out
}

/// Parameters for the 22-byte end-of-central-directory record.
pub struct EocdParams {
    pub disk_number: u32,
    pub cd_start_disk: u32,
    pub entries_on_this_disk: u16,
    pub total_entries: u16,
    pub cd_size: u32,
    pub cd_offset: u32,
}

/// Builds the EOCD record (comment length is always 0).
pub fn build_eocd(params: &EocdParams) -> Vec<u8> {
    let mut out = Vec::with_capacity(22);
    out.extend_from_slice(&EOCD_SIGNATURE.to_le_bytes());
    out.extend_from_slice(&(params.disk_number as u16).to_le_bytes());
    out.extend_from_slice(&(params.cd_start_disk as u16).to_le_bytes());
    out.extend_from_slice(&params.entries_on_this_disk.to_le_bytes());
    out.extend_from_slice(&params.total_entries.to_le_bytes());
    out.extend_from_slice(&params.cd_size.to_le_bytes());
    out.extend_from_slice(&params.cd_offset.to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes()); // comment length
    out
}
