//! Domain types for hackertyper.
//!
//! Small value types shared by the reveal engine, the text source and the
//! presentation layer.

use std::num::NonZeroUsize;

// ============================================================================
// CHUNK SIZE
// ============================================================================

/// Number of characters revealed per keystroke.
///
/// Always positive: a zero or negative request falls back to the default,
/// so the reveal cursor can never get stuck.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkSize(NonZeroUsize);

impl ChunkSize {
    /// Characters per keystroke when nothing (or nonsense) is configured.
    pub const DEFAULT: ChunkSize = ChunkSize(NonZeroUsize::MIN.saturating_add(4));

    /// Build from a signed request. Non-positive values yield the default.
    pub fn new(requested: i64) -> Self {
        if requested <= 0 {
            return Self::DEFAULT;
        }
        let count = usize::try_from(requested).unwrap_or(usize::MAX);
        NonZeroUsize::new(count).map_or(Self::DEFAULT, ChunkSize)
    }

    /// Build from the raw CLI argument.
    ///
    /// Parsing is deliberately lenient, like C's `atoi`: leading whitespace
    /// and a sign are accepted, digits are consumed until the first
    /// non-digit, and no digits at all means zero. Zero, negative and
    /// absent values all yield the default.
    pub fn from_arg(arg: Option<&str>) -> Self {
        match arg {
            Some(raw) => Self::new(parse_leading_int(raw)),
            None => Self::DEFAULT,
        }
    }

    /// The chunk size as a plain count.
    pub fn get(self) -> usize {
        self.0.get()
    }
}

impl Default for ChunkSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// `atoi`-style prefix parse. Saturates instead of overflowing.
fn parse_leading_int(raw: &str) -> i64 {
    let trimmed = raw.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let magnitude = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0i64, |acc, d| {
            acc.saturating_mul(10).saturating_add(i64::from(d - b'0'))
        });

    if negative { -magnitude } else { magnitude }
}

// ============================================================================
// PAYLOAD
// ============================================================================

/// What was loaded for this session, for display in the header chrome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    /// File name shown in the header (no directory).
    pub name: String,
    /// Size of the file on disk, in bytes.
    pub size_bytes: u64,
}

impl Payload {
    pub fn new(name: impl Into<String>, size_bytes: u64) -> Self {
        Payload {
            name: name.into(),
            size_bytes,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
