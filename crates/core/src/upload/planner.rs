//! Part-size planning

use conduit_domain::{ConduitError, Part, PartState, Result};

/// Choose a part size for `file_size` bytes.
///
/// Parts are never smaller than `min_part_size` and never more numerous
/// than `max_part_count`: the result is
/// `max(min_part_size, ceil(file_size / max_part_count))`.
pub fn choose_part_size(file_size: u64, min_part_size: u64, max_part_count: u64) -> Result<u64> {
    if file_size < 1 {
        return Err(ConduitError::InvalidArgument(format!(
            "file size must be at least 1 byte, got {file_size}"
        )));
    }
    if max_part_count == 0 {
        return Err(ConduitError::InvalidArgument("max part count must be at least 1".into()));
    }
    Ok(min_part_size.max(file_size.div_ceil(max_part_count)))
}

/// Number of parts `file_size` splits into at `part_size`.
pub fn total_parts(file_size: u64, part_size: u64) -> Result<u32> {
    if part_size == 0 {
        return Err(ConduitError::InvalidArgument("part size must be positive".into()));
    }
    u32::try_from(file_size.div_ceil(part_size)).map_err(|_| {
        ConduitError::InvalidArgument(format!(
            "{file_size} bytes at {part_size} bytes per part exceeds the part number range"
        ))
    })
}

/// Contiguous 1-based parts covering `[0, file_size)`, all PENDING.
pub fn split_parts(file_size: u64, part_size: u64) -> Result<Vec<Part>> {
    let count = total_parts(file_size, part_size)?;
    Ok((1..=count)
        .map(|part_number| {
            let offset = u64::from(part_number - 1) * part_size;
            Part {
                part_number,
                offset,
                length: part_size.min(file_size - offset),
                digest: None,
                upload_url: None,
                state: PartState::Pending,
            }
        })
        .collect())
}
