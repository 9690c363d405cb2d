//! # splitzip: streaming split-ZIP archive writer
//!
//! `splitzip` writes archives as a sequence of ZIP32 volumes
//! (`<stem>.z01`, `<stem>.z02`, ..., `<stem>.zip`) so that standard
//! extraction tools can open them without reassembling a single file first.
//! Entry bodies are streamed through CRC32 and DEFLATE with bounded memory;
//! only whole structural records (local headers, data descriptors, the
//! central directory, the EOCD) are guaranteed not to straddle a volume
//! boundary.
//!
//! ## Quick Start
//!
//! ```no_run
//! use splitzip::{CompressionMethod, SplitZipWriter};
//!
//! let mut writer = SplitZipWriter::create(
//!     "output",
//!     splitzip::parse_split_size("100MB")?,
//!     CompressionMethod::Deflated(6),
//! )?;
//!
//! writer.add_bytes("hello.txt", b"Hello, World!".to_vec())?;
//! writer.add_file("notes.txt", "notes.txt")?;
//!
//! let volumes = writer.finish()?;
//! for path in volumes {
//!     println!("wrote {}", path.display());
//! }
//! # Ok::<(), splitzip::SplitZipError>(())
//! ```

pub mod arcname;
pub mod archive;
pub mod central;
pub mod codec;
pub mod dostime;
pub mod entry;
pub mod error;
pub mod size;
pub mod source;
pub mod volume;
pub mod walker;

pub use archive::{ProgressHook, SplitZipWriter, VolumeHook, MAX_ENTRIES};
pub use codec::CompressionMethod;
pub use error::{Result, SplitZipError};
pub use size::{parse_size, parse_split_size};
pub use source::{FileSource, MemorySource, ReaderSource, Source};
