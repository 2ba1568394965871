//! Text storage layer.
//!
//! [`TextBuffer`] is a piece table over two byte buffers: the read-only
//! original content and an append-only buffer for inserted text. All public
//! addressing is in **character offsets** (Unicode scalar values); byte counts
//! are tracked separately for I/O sizing. Every successful mutation bumps a
//! monotonically increasing revision counter.

use thiserror::Error;

/// Errors raised by [`TextBuffer`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BufferError {
    /// An offset or range fell outside the buffer.
    #[error("offset {offset} out of range (buffer holds {len} chars)")]
    OffsetOutOfRange {
        /// The offending character offset (for ranges, the range end).
        offset: usize,
        /// Buffer length in characters at the time of the call.
        len: usize,
    },
}

/// Which backing buffer a chunk references.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChunkSource {
    /// The read-only buffer holding the initially loaded content.
    Original,
    /// The append-only buffer holding inserted text.
    Added,
}

/// A contiguous fragment of one backing buffer.
#[derive(Debug, Clone)]
struct Chunk {
    source: ChunkSource,
    /// Byte offset into the backing buffer.
    start: usize,
    /// Fragment length in bytes.
    bytes: usize,
    /// Fragment length in characters.
    chars: usize,
}

impl Chunk {
    fn new(source: ChunkSource, start: usize, bytes: usize, chars: usize) -> Self {
        Self {
            source,
            start,
            bytes,
            chars,
        }
    }
}

/// Piece-table text buffer with char-offset addressing and revision tracking.
///
/// The buffer is exclusively owned by one `Document`; it is never shared
/// between documents. Offsets are stable only until the next mutation.
#[derive(Debug)]
pub struct TextBuffer {
    original: Vec<u8>,
    added: Vec<u8>,
    chunks: Vec<Chunk>,
    revision: u64,
    /// Mutations since the last compaction.
    op_count: usize,
    compact_threshold: usize,
}

impl TextBuffer {
    /// Create a buffer from initial content.
    pub fn from_text(text: &str) -> Self {
        let bytes = text.as_bytes().to_vec();
        let chars = text.chars().count();
        let chunks = if bytes.is_empty() {
            Vec::new()
        } else {
            vec![Chunk::new(ChunkSource::Original, 0, bytes.len(), chars)]
        };

        Self {
            original: bytes,
            added: Vec::new(),
            chunks,
            revision: 0,
            op_count: 0,
            compact_threshold: 1000,
        }
    }

    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::from_text("")
    }

    /// Current revision. Increments on every successful mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Total length in characters.
    pub fn char_count(&self) -> usize {
        self.chunks.iter().map(|c| c.chars).sum()
    }

    /// Total length in UTF-8 bytes (for save-size estimation).
    pub fn byte_count(&self) -> usize {
        self.chunks.iter().map(|c| c.bytes).sum()
    }

    /// Insert `text` before the character at `offset`.
    ///
    /// `offset == char_count()` appends. Returns the new revision. An empty
    /// `text` is a no-op and does not bump the revision.
    pub fn insert(&mut self, offset: usize, text: &str) -> Result<u64, BufferError> {
        let len = self.char_count();
        if offset > len {
            return Err(BufferError::OffsetOutOfRange { offset, len });
        }
        if text.is_empty() {
            return Ok(self.revision);
        }

        let added_start = self.added.len();
        self.added.extend_from_slice(text.as_bytes());
        let new_chunk = Chunk::new(
            ChunkSource::Added,
            added_start,
            text.len(),
            text.chars().count(),
        );

        match self.locate(offset) {
            Some((idx, within)) => {
                if within == 0 {
                    self.chunks.insert(idx, new_chunk);
                } else if within == self.chunks[idx].chars {
                    self.chunks.insert(idx + 1, new_chunk);
                } else {
                    let (left, right) = self.split_chunk(&self.chunks[idx], within);
                    self.chunks.splice(idx..=idx, [left, new_chunk, right]);
                }
            }
            None => self.chunks.push(new_chunk),
        }

        self.merge_adjacent();
        self.after_mutation();
        Ok(self.revision)
    }

    /// Delete `len` characters starting at `offset`.
    ///
    /// Returns the removed text (so callers can build an inverse operation)
    /// and the new revision. A zero-length delete is a no-op.
    pub fn delete(&mut self, offset: usize, len: usize) -> Result<(String, u64), BufferError> {
        let total = self.char_count();
        let end = offset
            .checked_add(len)
            .ok_or(BufferError::OffsetOutOfRange { offset, len: total })?;
        if end > total {
            return Err(BufferError::OffsetOutOfRange {
                offset: end,
                len: total,
            });
        }
        if len == 0 {
            return Ok((String::new(), self.revision));
        }

        let removed = self.slice(offset, len)?;

        let (start_idx, start_within) = self.locate(offset).expect("range checked");
        let (end_idx, end_within) = self.locate(end).expect("range checked");

        if start_idx == end_idx {
            let chunk = self.chunks[start_idx].clone();
            if start_within == 0 && end_within == chunk.chars {
                self.chunks.remove(start_idx);
            } else if start_within == 0 {
                let (_, right) = self.split_chunk(&chunk, end_within);
                self.chunks[start_idx] = right;
            } else if end_within == chunk.chars {
                let (left, _) = self.split_chunk(&chunk, start_within);
                self.chunks[start_idx] = left;
            } else {
                let (left, rest) = self.split_chunk(&chunk, start_within);
                let (_, right) = self.split_chunk(&rest, end_within - start_within);
                self.chunks.splice(start_idx..=start_idx, [left, right]);
            }
        } else {
            let mut replacement = Vec::new();
            if start_within > 0 {
                let (left, _) = self.split_chunk(&self.chunks[start_idx], start_within);
                replacement.push(left);
            }
            if end_within < self.chunks[end_idx].chars {
                let (_, right) = self.split_chunk(&self.chunks[end_idx], end_within);
                replacement.push(right);
            }
            self.chunks.splice(start_idx..=end_idx, replacement);
        }

        self.after_mutation();
        Ok((removed, self.revision))
    }

    /// Read `len` characters starting at `offset` without mutating.
    pub fn slice(&self, offset: usize, len: usize) -> Result<String, BufferError> {
        let total = self.char_count();
        let end = offset
            .checked_add(len)
            .ok_or(BufferError::OffsetOutOfRange { offset, len: total })?;
        if end > total {
            return Err(BufferError::OffsetOutOfRange {
                offset: end,
                len: total,
            });
        }

        let mut out = String::new();
        let mut consumed = 0usize;

        for chunk in &self.chunks {
            let chunk_end = consumed + chunk.chars;
            if consumed >= end {
                break;
            }
            if chunk_end > offset {
                let text = self.chunk_text(chunk);
                let skip = offset.saturating_sub(consumed);
                let take = end.min(chunk_end) - offset.max(consumed);
                out.extend(text.chars().skip(skip).take(take));
            }
            consumed = chunk_end;
        }

        Ok(out)
    }

    /// The full buffer content as one string.
    pub fn text(&self) -> String {
        let mut out = String::with_capacity(self.byte_count());
        for chunk in &self.chunks {
            out.push_str(self.chunk_text(chunk));
        }
        out
    }

    fn chunk_text(&self, chunk: &Chunk) -> &str {
        let backing = match chunk.source {
            ChunkSource::Original => &self.original,
            ChunkSource::Added => &self.added,
        };
        // Chunks are only ever split on char boundaries.
        std::str::from_utf8(&backing[chunk.start..chunk.start + chunk.bytes])
            .expect("chunk boundaries are char boundaries")
    }

    /// Find the chunk containing `offset` and the char offset within it.
    ///
    /// Returns `None` only when the buffer has no chunks. An offset equal to
    /// the total length resolves to the end of the last chunk.
    fn locate(&self, offset: usize) -> Option<(usize, usize)> {
        let mut consumed = 0usize;
        for (idx, chunk) in self.chunks.iter().enumerate() {
            let next = consumed + chunk.chars;
            if offset <= next {
                return Some((idx, offset - consumed));
            }
            consumed = next;
        }
        self.chunks
            .last()
            .map(|last| (self.chunks.len() - 1, last.chars))
    }

    fn split_chunk(&self, chunk: &Chunk, at_chars: usize) -> (Chunk, Chunk) {
        let text = self.chunk_text(chunk);
        let at_bytes = text
            .char_indices()
            .nth(at_chars)
            .map(|(b, _)| b)
            .unwrap_or(chunk.bytes);

        let left = Chunk::new(chunk.source, chunk.start, at_bytes, at_chars);
        let right = Chunk::new(
            chunk.source,
            chunk.start + at_bytes,
            chunk.bytes - at_bytes,
            chunk.chars - at_chars,
        );
        (left, right)
    }

    fn merge_adjacent(&mut self) {
        let mut i = 0;
        while i + 1 < self.chunks.len() {
            let (a, b) = (&self.chunks[i], &self.chunks[i + 1]);
            // Only added-buffer chunks can be contiguous by construction.
            let mergeable = a.source == ChunkSource::Added
                && b.source == ChunkSource::Added
                && a.start + a.bytes == b.start;
            if mergeable {
                let merged = Chunk::new(a.source, a.start, a.bytes + b.bytes, a.chars + b.chars);
                self.chunks.splice(i..=i + 1, [merged]);
            } else {
                i += 1;
            }
        }
    }

    fn after_mutation(&mut self) {
        self.revision += 1;
        self.op_count += 1;
        if self.op_count >= self.compact_threshold {
            self.compact();
        }
    }

    /// Rewrite the added buffer so it holds only referenced bytes.
    ///
    /// Long editing sessions otherwise grow the added buffer without bound.
    pub fn compact(&mut self) {
        self.op_count = 0;

        let mut ranges: Vec<(usize, usize)> = self
            .chunks
            .iter()
            .filter(|c| c.source == ChunkSource::Added)
            .map(|c| (c.start, c.start + c.bytes))
            .collect();

        if ranges.is_empty() {
            self.added.clear();
            return;
        }

        ranges.sort_by_key(|r| r.0);
        let mut merged = vec![ranges[0]];
        for range in ranges.into_iter().skip(1) {
            let last = merged.last_mut().expect("non-empty");
            if range.0 <= last.1 {
                last.1 = last.1.max(range.1);
            } else {
                merged.push(range);
            }
        }

        let mut compacted = Vec::new();
        let mut mappings: Vec<(usize, usize, usize)> = Vec::with_capacity(merged.len());
        for (old_start, old_end) in merged {
            mappings.push((old_start, old_end, compacted.len()));
            compacted.extend_from_slice(&self.added[old_start..old_end]);
        }

        for chunk in &mut self.chunks {
            if chunk.source != ChunkSource::Added {
                continue;
            }
            let idx = match mappings.binary_search_by_key(&chunk.start, |(s, _, _)| *s) {
                Ok(exact) => exact,
                Err(insert_pos) => insert_pos.saturating_sub(1),
            };
            if let Some((old_start, old_end, new_start)) = mappings.get(idx).copied() {
                if chunk.start >= old_start && chunk.start < old_end {
                    chunk.start = new_start + (chunk.start - old_start);
                }
            }
        }

        self.added = compacted;
    }

    #[cfg(test)]
    fn added_bytes(&self) -> usize {
        self.added.len()
    }
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new()
    }
}
