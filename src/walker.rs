//! Directory-tree collaborator: turns a filesystem path into a stream of
//! `(disk path, arcname)` pairs for the archive writer to consume.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Walks `root` and yields every regular file beneath it along with the
/// arcname it should be stored under, rooted at `root`'s own directory name.
///
/// Symlinks are skipped with a warning rather than followed or archived,
/// since a followed symlink could escape `root` entirely.
pub fn walk(root: impl AsRef<Path>) -> Vec<(PathBuf, String)> {
    let root = root.as_ref();
    let base_name = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut out = Vec::new();
    for entry in WalkDir::new(root).into_iter() {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                log::warn!("skipping unreadable path while walking {root:?}: {e}");
                continue;
            }
        };

        let path = entry.path();
        if entry.file_type().is_symlink() {
            log::warn!("skipping symlink {path:?}");
            continue;
        }
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = path.strip_prefix(root).unwrap_or(path);
        let mut arcname = base_name.clone();
        for component in relative.components() {
            arcname.push('/');
            arcname.push_str(&component.as_os_str().to_string_lossy());
        }
        out.push((path.to_path_buf(), arcname));
    }
    out
}
