//! The top-level archive writer that orchestrates volumes, entries, and the
//! central directory.

use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::central::{self, CentralDirRecord, EocdParams};
use crate::codec::CompressionMethod;
use crate::dostime::DosDateTime;
use crate::entry::EntryWriter;
use crate::error::{Result, SplitZipError};
use crate::source::{FileSource, MemorySource, ReaderSource, Source, CHUNK_SIZE};
use crate::volume::VolumeWriter;

/// Max entries a ZIP32 central directory can address; the 16-bit count
/// fields reserve `0xFFFF` as the ZIP64-escape sentinel, so 65,535 is the
/// largest count this writer (which never emits ZIP64) will accept.
pub const MAX_ENTRIES: usize = 65535;

/// Progress callback: `(arcname, bytes written so far, total size if known)`.
pub type ProgressHook = Box<dyn FnMut(&str, u64, Option<u64>)>;
/// Volume-opened callback: `(volume_number, path)`.
pub type VolumeHook = Box<dyn FnMut(u32, &Path)>;

/// Writes a single logical archive out as one or more `.zip`/`.zNN` volumes.
///
/// Entries are added with [`SplitZipWriter::add_file`],
/// [`SplitZipWriter::add_bytes`], or [`SplitZipWriter::add_stream`] and the
/// archive is sealed with [`SplitZipWriter::finish`]. Dropping the writer
/// without calling `finish` leaves whatever partial volumes were written on
/// disk but never emits a central directory for them.
pub struct SplitZipWriter {
    volume: VolumeWriter,
    records: Vec<CentralDirRecord>,
    default_method: CompressionMethod,
    on_progress: Option<ProgressHook>,
    finished: bool,
    aborted: bool,
    finished_volumes: Option<Vec<PathBuf>>,
}

impl SplitZipWriter {
    /// Opens a new split archive rooted at `stem` (volumes are named
    /// `<stem>.zip`, `<stem>.z01`, ... as they roll over).
    pub fn create(stem: impl Into<PathBuf>, split_size: u64, default_method: CompressionMethod) -> Result<Self> {
        let volume = VolumeWriter::create(stem, split_size)?;
        Ok(Self {
            volume,
            records: Vec::new(),
            default_method,
            on_progress: None,
            finished: false,
            aborted: false,
            finished_volumes: None,
        })
    }

    /// Registers a hook invoked each time a new volume file is opened,
    /// firing it immediately for the volume already open so the first
    /// volume is never silently skipped.
    pub fn set_on_volume(&mut self, mut hook: VolumeHook) {
        hook(self.volume.volume_number(), self.volume.current_path());
        self.volume.set_on_volume(hook);
    }

    /// Registers a hook invoked after each chunk of an entry's body is
    /// written, with the entry's cumulative bytes and total size if known.
    pub fn set_on_progress(&mut self, hook: ProgressHook) {
        self.on_progress = Some(hook);
    }

    /// Number of entries added so far.
    pub fn entry_count(&self) -> usize {
        self.records.len()
    }

    /// Adds a regular file from disk under `arcname`, using this writer's
    /// default compression method.
    pub fn add_file(&mut self, path: impl AsRef<Path>, arcname: &str) -> Result<()> {
        let path = path.as_ref();
        let dos = mtime_of(path).unwrap_or_else(DosDateTime::now);
        let mut source = FileSource::open(path)?;
        self.add_from_source(arcname, self.default_method, dos, &mut source)
    }

    /// Adds an in-memory buffer under `arcname`.
    pub fn add_bytes(&mut self, arcname: &str, data: Vec<u8>) -> Result<()> {
        let mut source = MemorySource::new(data);
        self.add_from_source(arcname, self.default_method, DosDateTime::now(), &mut source)
    }

    /// Adds an arbitrary `Read` stream under `arcname`.
    pub fn add_stream(&mut self, arcname: &str, reader: impl Read) -> Result<()> {
        let mut source = ReaderSource::new(reader);
        self.add_from_source(arcname, self.default_method, DosDateTime::now(), &mut source)
    }

    /// Adds a directory-only entry (a name ending in `/`, zero body).
    pub fn add_directory(&mut self, arcname: &str) -> Result<()> {
        let mut source = MemorySource::new(Vec::new());
        self.add_from_source(arcname, CompressionMethod::Stored, DosDateTime::now(), &mut source)
    }

    fn add_from_source(
        &mut self,
        raw_name: &str,
        method: CompressionMethod,
        dos: DosDateTime,
        source: &mut dyn Source,
    ) -> Result<()> {
        self.guard_not_aborted()?;
        let before = (self.volume.disk_number(), self.volume.offset());
        let outcome = self.try_add_from_source(raw_name, method, dos, source);
        // A rejection that happens before any bytes land on disk (a bad
        // arcname, or the entry-count cap) leaves the archive untouched and
        // safe to keep using. Anything that already wrote part of a header
        // or body is terminal, since the volume stream is now inconsistent.
        if outcome.is_err() {
            let after = (self.volume.disk_number(), self.volume.offset());
            if after != before {
                self.aborted = true;
            }
        }
        outcome
    }

    fn try_add_from_source(
        &mut self,
        raw_name: &str,
        method: CompressionMethod,
        dos: DosDateTime,
        source: &mut dyn Source,
    ) -> Result<()> {
        if self.records.len() >= MAX_ENTRIES {
            return Err(SplitZipError::Overflow(format!(
                "archive already holds the ZIP32 maximum of {MAX_ENTRIES} entries"
            )));
        }

        let total = source.total_size();
        let mut entry = EntryWriter::start(&mut self.volume, raw_name, method, dos)?;
        let arcname = entry.arcname().to_string();

        let mut buf = vec![0u8; CHUNK_SIZE];
        loop {
            let n = source.read_chunk(&mut buf)?;
            if n == 0 {
                break;
            }
            entry.write_chunk(&mut self.volume, &buf[..n])?;
            if let Some(hook) = self.on_progress.as_mut() {
                hook(&arcname, entry.uncompressed_size(), total);
            }
        }

        let record = entry.finish(&mut self.volume)?;
        self.records.push(record);
        Ok(())
    }

    fn guard_not_aborted(&self) -> Result<()> {
        if self.aborted {
            Err(SplitZipError::Aborted)
        } else {
            Ok(())
        }
    }

    /// Writes the central directory and EOCD record, promotes the last
    /// volume to `<stem>.zip` if needed, and returns the paths of every
    /// volume written, in order. Idempotent: a second call returns the same
    /// list with no further side effects.
    pub fn finish(&mut self) -> Result<Vec<PathBuf>> {
        if let Some(volumes) = &self.finished_volumes {
            return Ok(volumes.clone());
        }
        self.guard_not_aborted()?;
        if let Err(e) = self.write_central_directory_and_eocd() {
            self.aborted = true;
            return Err(e);
        }
        let paths = self.volume.finalize_last_volume()?;
        self.finished = true;
        self.finished_volumes = Some(paths.clone());
        Ok(paths)
    }

    fn write_central_directory_and_eocd(&mut self) -> Result<()> {
        let cd_start_disk = self.volume.disk_number();
        let cd_start_offset = self.volume.offset();
        let mut cd_size: u64 = 0;
        let mut entries_per_disk: HashMap<u32, u16> = HashMap::new();

        central::check_disk_number(cd_start_disk, "central directory start")?;
        for record in &self.records {
            let disk = self.volume.disk_number();
            central::check_disk_number(disk, "central directory record")?;
            let bytes = central::build_central_dir_record(record);
            self.volume.write_splittable(&bytes)?;
            cd_size += bytes.len() as u64;
            *entries_per_disk.entry(disk).or_insert(0) += 1;
        }

        let eocd_placeholder_len = 22u64;
        let (eocd_disk, _offset) = self.volume.reserve_for_atomic(eocd_placeholder_len)?;
        central::check_disk_number(eocd_disk, "end-of-central-directory")?;
        let entries_on_this_disk = *entries_per_disk.get(&eocd_disk).unwrap_or(&0);

        let params = EocdParams {
            disk_number: eocd_disk,
            cd_start_disk,
            entries_on_this_disk,
            total_entries: self.records.len() as u16,
            cd_size: cd_size as u32,
            cd_offset: cd_start_offset as u32,
        };
        let eocd = central::build_eocd(&params);
        self.volume.write_atomic(&eocd)?;
        Ok(())
    }

    /// Aborts the archive explicitly, leaving any already-written partial
    /// volumes on disk without a central directory.
    pub fn abort(mut self) {
        self.volume.abort();
        self.finished = true;
    }
}

impl Drop for SplitZipWriter {
    fn drop(&mut self) {
        if !self.finished {
            self.volume.abort();
        }
    }
}

fn mtime_of(path: &Path) -> Option<DosDateTime> {
    let metadata = std::fs::metadata(path).ok()?;
    let modified = metadata.modified().ok()?;
    let secs = modified
        .duration_since(std::time::UNIX_EPOCH)
        .ok()?
        .as_secs() as i64;
    Some(DosDateTime::from_unix_timestamp(secs))
}
