//! Streaming CRC32 accumulation and DEFLATE/STORE compression.

use crate::error::{Result, SplitZipError};
use crc32fast::Hasher as Crc32;
use flate2::write::DeflateEncoder;
use flate2::Compression;
use std::io::Write;

/// Compression method, matching the ZIP32 compression-method field values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMethod {
    /// Method 0: bytes are copied through unchanged.
    Stored,
    /// Method 8: raw DEFLATE at the configured level.
    Deflated(u32),
}

impl CompressionMethod {
    /// The ZIP32 compression-method field value for this method.
    pub fn method_id(self) -> u16 {
        match self {
            CompressionMethod::Stored => 0,
            CompressionMethod::Deflated(_) => 8,
        }
    }

    /// The version-needed-to-extract field value for this method.
    pub fn version_needed(self) -> u16 {
        match self {
            CompressionMethod::Stored => 10,
            CompressionMethod::Deflated(_) => 20,
        }
    }
}

/// Default DEFLATE compression level (zlib's own default tradeoff).
pub const DEFAULT_LEVEL: u32 = 6;

enum Inner {
    Stored,
    Deflate(DeflateEncoder<Vec<u8>>),
}

/// Streaming CRC32 + compressor for one entry's body.
///
/// `update` feeds uncompressed bytes in and returns the compressed bytes
/// produced so far; `finish` flushes any remaining compressed output.
pub struct EntryCodec {
    crc: Crc32,
    uncompressed_count: u64,
    compressed_count: u64,
    inner: Inner,
}

impl EntryCodec {
    /// Creates a codec for the given compression method. `level` (1-9) is
    /// only consulted for `Deflated`; out-of-range levels are clamped.
    pub fn new(method: CompressionMethod) -> Self {
        let inner = match method {
            CompressionMethod::Stored => Inner::Stored,
            CompressionMethod::Deflated(level) => {
                Inner::Deflate(DeflateEncoder::new(Vec::new(), Compression::new(level.clamp(1, 9))))
            }
        };
        Self {
            crc: Crc32::new(),
            uncompressed_count: 0,
            compressed_count: 0,
            inner,
        }
    }

    /// Feeds `data` (uncompressed) through the codec, returning the
    /// compressed bytes ready to be written out.
    pub fn update(&mut self, data: &[u8]) -> Result<Vec<u8>> {
        self.crc.update(data);
        self.uncompressed_count += data.len() as u64;

        let produced = match &mut self.inner {
            Inner::Stored => data.to_vec(),
            Inner::Deflate(encoder) => {
                encoder
                    .write_all(data)
                    .map_err(|e| SplitZipError::Compression(e.to_string()))?;
                std::mem::take(encoder.get_mut())
            }
        };
        self.compressed_count += produced.len() as u64;
        Ok(produced)
    }

    /// Flushes any buffered compressed output. Must be called exactly once,
    /// after the final `update`.
    pub fn finish(self) -> Result<Vec<u8>> {
        let tail = match self.inner {
            Inner::Stored => Vec::new(),
            Inner::Deflate(encoder) => encoder
                .finish()
                .map_err(|e| SplitZipError::Compression(e.to_string()))?,
        };
        Ok(tail)
    }

    /// Running CRC32 over all uncompressed bytes fed so far.
    pub fn crc32(&self) -> u32 {
        self.crc.clone().finalize()
    }

    /// Total uncompressed bytes fed so far.
    pub fn uncompressed_count(&self) -> u64 {
        self.uncompressed_count
    }

    /// Total compressed bytes produced so far.
    pub fn compressed_count(&self) -> u64 {
        self.compressed_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_is_identity() {
        let mut codec = EntryCodec::new(CompressionMethod::Stored);
        let out = codec.update(b"helloworld").unwrap();
        assert_eq!(out, b"helloworld");
        let tail = codec.finish().unwrap();
        assert!(tail.is_empty());
    }

    #[test]
    fn stored_reports_equal_sizes() {
        let mut codec = EntryCodec::new(CompressionMethod::Stored);
        codec.update(b"helloworld").unwrap();
        assert_eq!(codec.uncompressed_count(), codec.compressed_count());
    }

    #[test]
    fn crc32_matches_known_vector() {
        let mut codec = EntryCodec::new(CompressionMethod::Stored);
        codec.update(b"helloworld").unwrap();
        assert_eq!(codec.crc32(), 0xb1d4_025b);
    }

    #[test]
    fn deflate_round_trips_through_flate2() {
        let mut codec = EntryCodec::new(CompressionMethod::Deflated(DEFAULT_LEVEL));
        let mut compressed = codec.update(&vec![0u8; 100_000]).unwrap();
        compressed.extend(codec.finish().unwrap());

        let mut decoder = flate2::read::DeflateDecoder::new(&compressed[..]);
        let mut out = Vec::new();
        std::io::Read::read_to_end(&mut decoder, &mut out).unwrap();
        assert_eq!(out, vec![0u8; 100_000]);
    }
}
