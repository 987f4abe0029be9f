//! Filename matching for hacker text payloads.
//!
//! Pure functions, no I/O.

/// Prefix shared by every payload file.
pub const TEXT_PREFIX: &str = "hackertext";

/// Extension shared by every payload file (including the dot).
pub const TEXT_SUFFIX: &str = ".txt";

/// Fallback payload looked up when no numbered file exists anywhere.
pub const DEFAULT_TEXT_NAME: &str = "hackertext.txt";

/// Check whether a filename is a numbered payload.
///
/// # Patterns recognized
/// - "hackertext1.txt", "hackertext042.txt" → true
/// - "hackertext.txt" → false (that is the fallback, not a numbered file)
/// - "hackertext1.txt.bak", "HackerText1.txt", "hackertext1a.txt" → false
pub fn is_numbered_text(filename: &str) -> bool {
    numbered_index(filename).is_some()
}

/// Extract the digit run of a numbered payload name.
///
/// Returns the digits as written (leading zeros kept) so that distinct
/// files never collapse to the same index.
pub fn numbered_index(filename: &str) -> Option<&str> {
    let digits = filename
        .strip_prefix(TEXT_PREFIX)?
        .strip_suffix(TEXT_SUFFIX)?;

    if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
        Some(digits)
    } else {
        None
    }
}

// ============================================================================
// TESTS
// ============================================================================
