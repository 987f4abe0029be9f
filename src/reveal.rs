//! The reveal engine: a cursor walking a fixed text a chunk at a time.
//!
//! Pure state machine, no I/O. Two states:
//! - Accumulating: cursor < len, each advance appends the next chunk
//! - WrapPending: the whole text is on screen; the next advance discards
//!   it and starts over from the beginning
//!
//! `advance()` is the only transition. The machine cycles forever.

use std::fmt;

use crate::types::ChunkSize;

// ============================================================================
// BUFFER
// ============================================================================

/// The full payload text, immutable once built.
///
/// Stored as characters so that a chunk boundary can never split a
/// multi-byte sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealBuffer {
    chars: Vec<char>,
}

/// The payload held no characters at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmptyText;

impl RevealBuffer {
    /// Build a buffer from text, refusing empty input.
    pub fn new(text: &str) -> Result<Self, EmptyText> {
        let chars: Vec<char> = text.chars().collect();
        if chars.is_empty() {
            Err(EmptyText)
        } else {
            Ok(RevealBuffer { chars })
        }
    }

    /// Number of characters (always ≥ 1).
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }
}

impl fmt::Display for EmptyText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Source text is empty")
    }
}

impl std::error::Error for EmptyText {}

// ============================================================================
// ENGINE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Accumulating,
    WrapPending,
}

/// What a single `advance()` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Advance {
    /// Characters appended by this call (1..=chunk).
    pub appended: usize,
    /// This call discarded a fully revealed text before appending.
    pub restarted: bool,
    /// This call revealed the last character of the text.
    pub completed: bool,
}

/// Reveal cursor plus the text revealed so far.
#[derive(Debug, Clone)]
pub struct RevealEngine {
    buffer: RevealBuffer,
    chunk: ChunkSize,
    cursor: usize,
    revealed: String,
    phase: Phase,
}

impl RevealEngine {
    pub fn new(buffer: RevealBuffer, chunk: ChunkSize) -> Self {
        RevealEngine {
            buffer,
            chunk,
            cursor: 0,
            revealed: String::new(),
            phase: Phase::Accumulating,
        }
    }

    /// Build straight from text.
    ///
    /// # Errors
    /// `EmptyText` if `text` has no characters.
    pub fn from_text(text: &str, chunk: ChunkSize) -> Result<Self, EmptyText> {
        RevealBuffer::new(text).map(|buffer| Self::new(buffer, chunk))
    }

    /// Reveal the next chunk.
    ///
    /// Appends up to `chunk` characters starting at the cursor. When the
    /// append reaches the end of the text, the cursor goes back to 0 but
    /// the revealed text stays whole until the following call, which
    /// clears it and starts the next cycle.
    pub fn advance(&mut self) -> Advance {
        let restarted = self.phase == Phase::WrapPending;
        if restarted {
            self.revealed.clear();
            self.phase = Phase::Accumulating;
        }

        let len = self.buffer.len();
        let end = self.cursor.saturating_add(self.chunk.get()).min(len);
        self.revealed.extend(&self.buffer.chars[self.cursor..end]);
        let appended = end - self.cursor;
        self.cursor = end;

        let completed = self.cursor == len;
        if completed {
            self.cursor = 0;
            self.phase = Phase::WrapPending;
        }

        Advance {
            appended,
            restarted,
            completed,
        }
    }

    /// Index of the next character to reveal. 0 while a wrap is pending.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Text revealed since the last restart.
    pub fn revealed(&self) -> &str {
        &self.revealed
    }

    /// Length of the underlying text in characters.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn chunk(&self) -> ChunkSize {
        self.chunk
    }

    /// True once the whole text is on screen and the next advance restarts.
    pub fn is_wrap_pending(&self) -> bool {
        self.phase == Phase::WrapPending
    }
}

// ============================================================================
// TESTS
// ============================================================================
