//! The entry-body source capability.
//!
//! An entry's uncompressed bytes may come from an open file, an in-memory
//! buffer, or an arbitrary `Read` stream. The pipeline only needs chunked
//! reads and, optionally, a size hint for progress reporting.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Suggested chunk size for streaming reads, so memory use stays bounded.
pub const CHUNK_SIZE: usize = 64 * 1024;

/// A source of uncompressed entry bytes.
pub trait Source {
    /// Reads up to `buf.len()` bytes, returning the number read (0 at EOF),
    /// matching `std::io::Read::read`'s contract.
    fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Total byte count, if known up front (used for progress reporting).
    fn total_size(&self) -> Option<u64> {
        None
    }
}

/// Adapts any `Read` into a [`Source`] with an optional known size.
pub struct ReaderSource<R: Read> {
    reader: R,
    total: Option<u64>,
}

impl<R: Read> ReaderSource<R> {
    /// Wraps `reader` with no known total size.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            total: None,
        }
    }

    /// Wraps `reader` with a known total size, reported to progress hooks.
    pub fn with_size(reader: R, total: u64) -> Self {
        Self {
            reader,
            total: Some(total),
        }
    }
}

impl<R: Read> Source for ReaderSource<R> {
    fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }

    fn total_size(&self) -> Option<u64> {
        self.total
    }
}

/// A `Source` backed by an open file, with the size known from metadata.
pub struct FileSource {
    file: File,
    total: u64,
}

impl FileSource {
    /// Opens `path` and stats it for a size hint.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = File::open(path.as_ref())?;
        let total = file.metadata()?.len();
        Ok(Self { file, total })
    }
}

impl Source for FileSource {
    fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }

    fn total_size(&self) -> Option<u64> {
        Some(self.total)
    }
}

/// A `Source` backed by an in-memory buffer.
pub struct MemorySource {
    data: Vec<u8>,
    position: usize,
}

impl MemorySource {
    /// Wraps an owned byte buffer.
    pub fn new(data: Vec<u8>) -> Self {
        Self { data, position: 0 }
    }
}

impl Source for MemorySource {
    fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remaining = &self.data[self.position..];
        let n = remaining.len().min(buf.len());
        buf[..n].copy_from_slice(&remaining[..n]);
        self.position += n;
        Ok(n)
    }

    fn total_size(&self) -> Option<u64> {
        Some(self.data.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_source_reports_size_and_reads_fully() {
        let mut source = MemorySource::new(b"hello world".to_vec());
        assert_eq!(source.total_size(), Some(11));
        let mut buf = [0u8; 4];
        let n = source.read_chunk(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"hell");
    }

    #[test]
    fn reader_source_has_no_size_by_default() {
        let mut source = ReaderSource::new(&b"abc"[..]);
        assert_eq!(source.total_size(), None);
        let mut buf = [0u8; 8];
        let n = source.read_chunk(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"abc");
    }
}
