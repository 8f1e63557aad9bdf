//! Track ordinal recovery from file names.
//!
//! The first maximal run of ASCII digits anywhere in the name is the index:
//! `"02b.mp3"` → 2, `"track_09_final.mp3"` → 9. Matching is deliberately not
//! anchored to the start of the name.

use crate::error::IndexError;

/// Extract the track index from a file name.
pub fn extract_index(file_name: &str) -> Result<u32, IndexError> {
    let digits = first_digit_run(file_name)
        .ok_or_else(|| IndexError::NoIndexFound(file_name.to_string()))?;

    digits
        .parse::<u32>()
        .map_err(|_| IndexError::IndexOverflow(file_name.to_string()))
}

/// The first maximal run of ASCII digits in `s`, if any.
pub(crate) fn first_digit_run(s: &str) -> Option<&str> {
    let start = s.find(|c: char| c.is_ascii_digit())?;
    let rest = &s[start..];
    let len = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    Some(&rest[..len])
}
