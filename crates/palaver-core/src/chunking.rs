//! Outbound message chunking for frame-limited engines
//!
//! The engine's send primitive accepts at most a fixed number of bytes per
//! frame, so longer text must be split before transmission. A cut is never
//! allowed to land inside a multi-byte UTF-8 codepoint, and within the
//! trailing quarter of a frame the chunker prefers to cut just after a
//! space or punctuation character so words survive intact when possible.

use std::ops::Range;

// ----------------------------------------------------------------------------
// Constants
// ----------------------------------------------------------------------------

/// Smallest frame limit the chunker is defined for.
///
/// UTF-8 codepoints span up to four bytes; below this limit the backward
/// walk to a codepoint boundary could fail to make progress.
pub const MIN_FRAME_LEN: usize = 4;

/// Characters the chunker prefers to cut after, kept with the preceding
/// chunk. All are single-byte codepoints.
const PREFERRED_BREAKS: &[u8] = b" .,-";

// ----------------------------------------------------------------------------
// Message Chunker
// ----------------------------------------------------------------------------

/// Splits outgoing text into frame-sized pieces.
#[derive(Debug, Clone, Copy)]
pub struct MessageChunker {
    max_frame_len: usize,
}

impl MessageChunker {
    /// Create a chunker for the given frame byte limit.
    ///
    /// The limit must be at least [`MIN_FRAME_LEN`]; this is a precondition
    /// of the algorithm, not a runtime check.
    pub fn new(max_frame_len: usize) -> Self {
        debug_assert!(max_frame_len >= MIN_FRAME_LEN);
        Self { max_frame_len }
    }

    pub fn max_frame_len(&self) -> usize {
        self.max_frame_len
    }

    /// Compute the ordered chunk ranges for `text`.
    ///
    /// Empty input yields an empty plan; input within the frame limit yields
    /// exactly one chunk. Every produced range lies on `char` boundaries, so
    /// re-slicing the text is always valid.
    pub fn plan<'a>(&self, text: &'a str) -> MessagePlan<'a> {
        let bytes = text.as_bytes();
        let mut chunks = Vec::new();
        let mut offset = 0;

        while bytes.len() - offset > self.max_frame_len {
            let cut = self.pick_cut(bytes, offset);
            chunks.push(offset..cut);
            offset = cut;
        }
        if offset < bytes.len() {
            chunks.push(offset..bytes.len());
        }

        MessagePlan { text, chunks }
    }

    /// Choose where to end the chunk starting at `offset`.
    fn pick_cut(&self, bytes: &[u8], offset: usize) -> usize {
        // Candidate cut at the frame limit; back up over continuation bytes
        // (at most three for valid UTF-8) so the cut is codepoint-safe.
        let candidate = offset + self.max_frame_len;
        let mut safe = candidate;
        while is_continuation(bytes[safe]) {
            safe -= 1;
        }

        // Within the trailing quarter of the frame, prefer to cut right
        // after a separator so the separator stays with this chunk.
        let floor = safe.saturating_sub(self.max_frame_len / 4);
        let mut i = safe;
        while i > floor && i > offset {
            i -= 1;
            if PREFERRED_BREAKS.contains(&bytes[i]) {
                return i + 1;
            }
        }

        safe
    }
}

fn is_continuation(byte: u8) -> bool {
    byte & 0xC0 == 0x80
}

// ----------------------------------------------------------------------------
// Message Plan
// ----------------------------------------------------------------------------

/// The ordered byte ranges computed for one outbound message.
///
/// Ephemeral: borrows the original text and exists only for the duration of
/// a send call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessagePlan<'a> {
    text: &'a str,
    chunks: Vec<Range<usize>>,
}

impl<'a> MessagePlan<'a> {
    pub fn text(&self) -> &'a str {
        self.text
    }

    pub fn frame_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn ranges(&self) -> &[Range<usize>] {
        &self.chunks
    }

    /// Iterate the chunk texts in transmission order.
    pub fn chunks(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.chunks.iter().map(|range| &self.text[range.clone()])
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
