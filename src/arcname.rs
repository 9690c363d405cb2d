//! Arcname sanitization: zip-slip defense.

use crate::error::{Result, SplitZipError};

/// Maximum arcname length, in UTF-8 bytes, permitted by ZIP32.
pub const MAX_NAME_LEN: usize = 65535;

/// Normalizes a raw member name into a safe, forward-slash archive path.
///
/// Rejects absolute paths, drive-letter prefixes, and `..` traversal
/// segments. Preserves a trailing slash as the directory marker.
pub fn sanitize(raw: &str) -> Result<String> {
    let forward = raw.replace('\\', "/");

    let trailing_slash = forward.ends_with('/');

    let without_drive = strip_drive_letter(&forward);
    let without_leading = without_drive.trim_start_matches('/');

    let mut segments: Vec<&str> = Vec::new();
    for segment in without_leading.split('/') {
        if segment.is_empty() || segment == "." {
            continue;
        }
        if segment == ".." {
            return Err(SplitZipError::UnsafePath {
                path: raw.to_string(),
                reason: "contains a '..' traversal segment",
            });
        }
        segments.push(segment);
    }

    let mut joined = segments.join("/");
    if trailing_slash && !joined.is_empty() {
        joined.push('/');
    }

    if joined.is_empty() {
        return Err(SplitZipError::UnsafePath {
            path: raw.to_string(),
            reason: "resolves to an empty name",
        });
    }
    if joined.len() > MAX_NAME_LEN {
        return Err(SplitZipError::UnsafePath {
            path: raw.to_string(),
            reason: "exceeds the 65535-byte ZIP32 name limit",
        });
    }

    Ok(joined)
}

/// Strips a leading `C:` (or any single ASCII letter followed by `:`) drive
/// prefix, as Windows paths may carry one even after backslash conversion.
fn strip_drive_letter(path: &str) -> &str {
    let bytes = path.as_bytes();
    if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
        &path[2..]
    } else {
        path
    }
}

/// `true` if the sanitized arcname denotes a directory entry.
pub fn is_directory(arcname: &str) -> bool {
    arcname.ends_with('/')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passes_through_simple_names() {
        assert_eq!(sanitize("a.txt").unwrap(), "a.txt");
        assert_eq!(sanitize("dir/file.txt").unwrap(), "dir/file.txt");
    }

    #[test]
    fn converts_backslashes() {
        assert_eq!(sanitize("dir\\file.txt").unwrap(), "dir/file.txt");
    }

    #[test]
    fn strips_leading_slash_and_drive_letter() {
        assert_eq!(sanitize("/etc/passwd").unwrap(), "etc/passwd");
        assert_eq!(sanitize("C:\\Windows\\system32").unwrap(), "Windows/system32");
    }

    #[test]
    fn rejects_traversal() {
        assert!(sanitize("../etc/passwd").is_err());
        assert!(sanitize("a/../../b").is_err());
    }

    #[test]
    fn drops_dot_and_empty_segments() {
        assert_eq!(sanitize("a/./b//c").unwrap(), "a/b/c");
    }

    #[test]
    fn preserves_trailing_slash_for_directories() {
        let name = sanitize("dir/").unwrap();
        assert_eq!(name, "dir/");
        assert!(is_directory(&name));
    }

    #[test]
    fn rejects_empty_result() {
        assert!(sanitize("").is_err());
        assert!(sanitize("./.").is_err());
    }

    #[test]
    fn rejects_oversize_names() {
        let long = "a".repeat(MAX_NAME_LEN + 1);
        assert!(sanitize(&long).is_err());
    }
}
