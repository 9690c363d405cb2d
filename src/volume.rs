//! The volume writer: a byte-counting, multi-file sink with rollover.
//!
//! This is the pivotal component of the archive: it enforces that local
//! file headers, data descriptors, and the EOCD record never straddle a
//! volume boundary, while letting entry payload bytes split freely.

use crate::error::{Result, SplitZipError};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Minimum split size, re-exported for callers constructing a `VolumeWriter`
/// directly (most callers go through [`crate::size::parse_split_size`]).
pub const MIN_VOLUME_SIZE: u64 = crate::size::MIN_VOLUME_SIZE;

/// Byte-counting sink for one multi-volume archive.
///
/// Volume 1 is opened optimistically as `<stem>.zip`, since most archives
/// never split. The first rollover, if one happens, demotes it to
/// `<stem>.z01` and every subsequent volume is opened directly under its
/// `.zNN` name. [`VolumeWriter::finalize_last_volume`] promotes whichever
/// volume turns out to be last back to `<stem>.zip`.
pub struct VolumeWriter {
    stem: PathBuf,
    split_size: u64,
    volume_number: u32,
    file: File,
    current_path: PathBuf,
    bytes_in_volume: u64,
    closed_volumes: Vec<PathBuf>,
    finalized: bool,
    on_volume: Option<Box<dyn FnMut(u32, &Path)>>,
}

impl VolumeWriter {
    /// Opens volume 1 (as `<stem>.zip`) and begins accounting.
    ///
    /// # Errors
    /// Returns [`SplitZipError::VolumeTooSmall`] if `split_size` is below
    /// the 64 KiB minimum.
    pub fn create(stem: impl Into<PathBuf>, split_size: u64) -> Result<Self> {
        if split_size < MIN_VOLUME_SIZE {
            return Err(SplitZipError::VolumeTooSmall(format!(
                "split size {split_size} is below the {MIN_VOLUME_SIZE}-byte minimum"
            )));
        }
        let stem = stem.into();
        let current_path = zip_path(&stem);
        let file = File::create(&current_path)?;

        let mut writer = Self {
            stem,
            split_size,
            volume_number: 1,
            file,
            current_path,
            bytes_in_volume: 0,
            closed_volumes: Vec::new(),
            finalized: false,
            on_volume: None,
        };
        writer.fire_on_volume_hook();
        Ok(writer)
    }

    /// Registers the `on_volume(volume_number, path)` hook, invoked from
    /// then on whenever a rollover opens a new volume. Does not fire for
    /// whatever volume is already open; callers that need volume 1 reported
    /// too should fire once for [`VolumeWriter::current_path`] themselves.
    pub fn set_on_volume(&mut self, hook: Box<dyn FnMut(u32, &Path)>) {
        self.on_volume = Some(hook);
    }

    fn fire_on_volume_hook(&mut self) {
        if let Some(hook) = self.on_volume.as_mut() {
            hook(self.volume_number, &self.current_path);
        }
    }

    /// Bytes left before the current volume hits its split cap.
    pub fn space_remaining(&self) -> u64 {
        self.split_size - self.bytes_in_volume
    }

    /// The 1-based number of the volume currently being written.
    pub fn volume_number(&self) -> u32 {
        self.volume_number
    }

    /// The 0-based disk index of the volume currently being written.
    pub fn disk_number(&self) -> u32 {
        self.volume_number - 1
    }

    /// Current write offset within the current volume.
    pub fn offset(&self) -> u64 {
        self.bytes_in_volume
    }

    /// Path of the volume file currently open for writing.
    pub fn current_path(&self) -> &Path {
        &self.current_path
    }

    /// Writes bytes that MAY straddle a volume boundary (entry payload
    /// data). Splits and rolls over as many times as necessary.
    pub fn write_splittable(&mut self, mut bytes: &[u8]) -> Result<()> {
        while !bytes.is_empty() {
            let remaining = self.space_remaining();
            if (bytes.len() as u64) <= remaining {
                self.file.write_all(bytes)?;
                self.bytes_in_volume += bytes.len() as u64;
                return Ok(());
            }
            let (head, tail) = bytes.split_at(remaining as usize);
            self.file.write_all(head)?;
            self.bytes_in_volume += head.len() as u64;
            self.rollover()?;
            bytes = tail;
        }
        Ok(())
    }

    /// Writes bytes that must NOT straddle a volume boundary (local file
    /// headers, data descriptors, the EOCD record). Rolls over first if the
    /// chunk would not fit in the remaining space of the current volume.
    pub fn write_atomic(&mut self, bytes: &[u8]) -> Result<()> {
        self.reserve_space_for_atomic(bytes.len() as u64)?;
        self.file.write_all(bytes)?;
        self.bytes_in_volume += bytes.len() as u64;
        Ok(())
    }

    /// Returns the `(disk_number, offset)` where the next `write_atomic(n)`
    /// call would land, rolling over first if necessary. Used before
    /// emitting a local header so the central-directory record can capture
    /// the entry's true starting volume and offset.
    pub fn reserve_for_atomic(&mut self, n: u64) -> Result<(u32, u64)> {
        self.reserve_space_for_atomic(n)?;
        Ok((self.disk_number(), self.bytes_in_volume))
    }

    fn reserve_space_for_atomic(&mut self, n: u64) -> Result<()> {
        if n > self.split_size {
            return Err(SplitZipError::VolumeTooSmall(format!(
                "atomic write of {n} bytes exceeds the {}-byte split size",
                self.split_size
            )));
        }
        if self.bytes_in_volume + n > self.split_size {
            self.rollover()?;
        }
        Ok(())
    }

    fn rollover(&mut self) -> Result<()> {
        self.file.flush()?;

        if self.volume_number == 1 {
            // Volume 1 was opened optimistically as `<stem>.zip`; now that
            // we know it isn't the only volume, demote it to `<stem>.z01`.
            let demoted = numbered_path(&self.stem, 1);
            std::fs::rename(&self.current_path, &demoted)
                .map_err(|e| SplitZipError::Volume(e.to_string()))?;
            self.closed_volumes.push(demoted);
        } else {
            self.closed_volumes.push(self.current_path.clone());
        }

        self.volume_number += 1;
        if self.volume_number > 99 {
            log::warn!(
                "split archive now spans {} volumes; widening the .z suffix beyond two digits",
                self.volume_number
            );
        }

        let new_path = numbered_path(&self.stem, self.volume_number);
        self.file = File::create(&new_path)?;
        self.current_path = new_path;
        self.bytes_in_volume = 0;
        self.fire_on_volume_hook();
        Ok(())
    }

    /// Closes the current volume and, if it was not volume 1, renames it
    /// from its `.zNN` name to `<stem>.zip`. Idempotent: calling twice
    /// returns the same volume list with no further side effects.
    pub fn finalize_last_volume(&mut self) -> Result<Vec<PathBuf>> {
        if self.finalized {
            let mut all = self.closed_volumes.clone();
            all.push(self.current_path.clone());
            return Ok(all);
        }

        self.file.flush()?;

        if self.volume_number > 1 {
            let final_path = zip_path(&self.stem);
            std::fs::rename(&self.current_path, &final_path)
                .map_err(|e| SplitZipError::Volume(e.to_string()))?;
            self.current_path = final_path;
        }

        self.finalized = true;
        let mut all = self.closed_volumes.clone();
        all.push(self.current_path.clone());
        Ok(all)
    }

    /// Aborts the archive: closes the handle and leaves partial volumes on
    /// disk for the caller to delete. Never writes CD/EOCD or renames.
    pub fn abort(&mut self) {
        let _ = self.file.flush();
        self.finalized = true;
    }
}

fn zip_path(stem: &Path) -> PathBuf {
    let mut path = stem.as_os_str().to_owned();
    path.push(".zip");
    PathBuf::from(path)
}

fn numbered_path(stem: &Path, volume_number: u32) -> PathBuf {
    let mut path = stem.as_os_str().to_owned();
    if volume_number <= 99 {
        path.push(format!(".z{volume_number:02}"));
    } else {
        path.push(format!(".z{volume_number}"));
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn single_volume_stays_zip_named() {
        let dir = tempdir().unwrap();
        let stem = dir.path().join("out");
        let mut vw = VolumeWriter::create(&stem, MIN_VOLUME_SIZE).unwrap();
        vw.write_splittable(b"hello").unwrap();
        let volumes = vw.finalize_last_volume().unwrap();
        assert_eq!(volumes, vec![zip_path(&stem)]);
        assert!(!dir.path().join("out.z01").exists());
    }

    #[test]
    fn rollover_demotes_volume_one_and_numbers_sequentially() {
        let dir = tempdir().unwrap();
        let stem = dir.path().join("out");
        let mut vw = VolumeWriter::create(&stem, MIN_VOLUME_SIZE).unwrap();
        let chunk = vec![0u8; MIN_VOLUME_SIZE as usize];
        vw.write_splittable(&chunk).unwrap();
        vw.write_splittable(&chunk).unwrap();
        let volumes = vw.finalize_last_volume().unwrap();
        assert_eq!(volumes.len(), 2);
        assert!(volumes[0].ends_with("out.z01"));
        assert!(volumes[1].ends_with("out.zip"));
    }

    #[test]
    fn atomic_write_rolls_over_before_writing_when_it_would_not_fit() {
        let dir = tempdir().unwrap();
        let stem = dir.path().join("out");
        let mut vw = VolumeWriter::create(&stem, MIN_VOLUME_SIZE).unwrap();
        // Fill to within 10 bytes of the cap.
        let filler = vec![0u8; (MIN_VOLUME_SIZE - 10) as usize];
        vw.write_splittable(&filler).unwrap();
        assert_eq!(vw.volume_number(), 1);

        // A 20-byte atomic write does not fit; must roll over first.
        vw.write_atomic(&vec![0u8; 20]).unwrap();
        assert_eq!(vw.volume_number(), 2);
        assert_eq!(vw.offset(), 20);
    }

    #[test]
    fn atomic_write_exactly_filling_boundary_does_not_roll_over() {
        let dir = tempdir().unwrap();
        let stem = dir.path().join("out");
        let mut vw = VolumeWriter::create(&stem, MIN_VOLUME_SIZE).unwrap();
        let filler = vec![0u8; (MIN_VOLUME_SIZE - 10) as usize];
        vw.write_splittable(&filler).unwrap();
        vw.write_atomic(&vec![0u8; 10]).unwrap();
        assert_eq!(vw.volume_number(), 1);
        assert_eq!(vw.offset(), MIN_VOLUME_SIZE);
    }

    #[test]
    fn atomic_write_larger_than_split_size_fails() {
        let dir = tempdir().unwrap();
        let stem = dir.path().join("out");
        let mut vw = VolumeWriter::create(&stem, MIN_VOLUME_SIZE).unwrap();
        let oversized = vec![0u8; (MIN_VOLUME_SIZE + 1) as usize];
        assert!(vw.write_atomic(&oversized).is_err());
    }

    #[test]
    fn reserve_for_atomic_reports_disk_number_after_rollover() {
        let dir = tempdir().unwrap();
        let stem = dir.path().join("out");
        let mut vw = VolumeWriter::create(&stem, MIN_VOLUME_SIZE).unwrap();
        let filler = vec![0u8; (MIN_VOLUME_SIZE - 5) as usize];
        vw.write_splittable(&filler).unwrap();
        let (disk, offset) = vw.reserve_for_atomic(50).unwrap();
        assert_eq!(disk, 1); // rolled over to volume 2, 0-based disk 1
        assert_eq!(offset, 0);
    }

    #[test]
    fn finalize_is_idempotent() {
        let dir = tempdir().unwrap();
        let stem = dir.path().join("out");
        let mut vw = VolumeWriter::create(&stem, MIN_VOLUME_SIZE).unwrap();
        vw.write_splittable(b"data").unwrap();
        let first = vw.finalize_last_volume().unwrap();
        let second = vw.finalize_last_volume().unwrap();
        assert_eq!(first, second);
    }
}
