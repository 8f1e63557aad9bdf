//! Canonical track file names.
//!
//! Names are zero-padded to a width chosen by the catalog size so that a
//! plain lexicographic listing matches play order:
//!
//! | total tracks | example |
//! |--------------|---------|
//! | < 10         | `5.mp3`    |
//! | < 100        | `05.mp3`   |
//! | < 1000       | `005.mp3`  |
//! | otherwise    | `0005.mp3` |

/// Extension every canonical name carries
pub const CANONICAL_EXTENSION: &str = "mp3";

/// Zero-pad width for a catalog of `total` tracks.
pub fn pad_width(total: u32) -> usize {
    match total {
        0..=9 => 1,
        10..=99 => 2,
        100..=999 => 3,
        _ => 4,
    }
}

/// Canonical file name for the track at `ordinal` in a catalog of `total`.
pub fn canonical_name(ordinal: u32, total: u32) -> String {
    format!(
        "{:0width$}.{}",
        ordinal,
        CANONICAL_EXTENSION,
        width = pad_width(total)
    )
}
