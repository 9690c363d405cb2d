//! Human-readable split-size parsing ("100MB", "700MiB", or a bare byte count).

use crate::error::{Result, SplitZipError};

/// Minimum split size accepted for a volume, per spec: 64 KiB.
pub const MIN_VOLUME_SIZE: u64 = 65536;

const UNITS: &[(&str, u64)] = &[
    ("TiB", 1u64 << 40),
    ("GiB", 1u64 << 30),
    ("MiB", 1u64 << 20),
    ("KiB", 1u64 << 10),
    ("TB", 1_000_000_000_000),
    ("GB", 1_000_000_000),
    ("MB", 1_000_000),
    ("KB", 1_000),
    ("B", 1),
];

/// Parses a byte count from either a bare non-negative integer or a string
/// of the form `<number><unit>` (e.g. `"100MB"`, `"4.7GB"`, `"700MiB"`).
///
/// Unit letters are matched case-insensitively; the numeric portion accepts
/// decimals. Does not enforce the 64 KiB volume minimum - use
/// [`parse_split_size`] for that.
pub fn parse_size(input: &str) -> Result<u64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(SplitZipError::Config("empty size string".into()));
    }

    // Bare integer: no unit suffix at all.
    if let Ok(n) = trimmed.parse::<u64>() {
        return Ok(n);
    }

    let upper = trimmed.to_ascii_uppercase();
    for (unit, multiplier) in UNITS {
        let unit_upper = unit.to_ascii_uppercase();
        if upper.ends_with(&unit_upper) {
            let number_part = trimmed[..trimmed.len() - unit.len()].trim();
            let value: f64 = number_part
                .parse()
                .map_err(|_| SplitZipError::Config(format!("invalid size string: {input:?}")))?;
            if !value.is_finite() || value < 0.0 {
                return Err(SplitZipError::Config(format!(
                    "size must be a non-negative finite number: {input:?}"
                )));
            }
            return Ok((value * *multiplier as f64).round() as u64);
        }
    }

    Err(SplitZipError::Config(format!(
        "unrecognized size unit in {input:?}"
    )))
}

/// Parses a split size and enforces the 64 KiB minimum volume size.
pub fn parse_split_size(input: &str) -> Result<u64> {
    let bytes = parse_size(input)?;
    if bytes < MIN_VOLUME_SIZE {
        return Err(SplitZipError::VolumeTooSmall(format!(
            "split size {bytes} is below the {MIN_VOLUME_SIZE}-byte minimum"
        )));
    }
    Ok(bytes)
}
