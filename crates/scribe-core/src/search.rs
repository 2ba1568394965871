//! Document search.
//!
//! All public offsets are character offsets into the document text, never
//! bytes. Plain queries are escaped and compiled to a regex; the compiled
//! [`SearchQuery`] can be reused across documents (workspace-wide search
//! compiles once).

use regex::{Regex, RegexBuilder};
use thiserror::Error;

/// How a query is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    /// Case-sensitive matching.
    pub case_sensitive: bool,
    /// Match whole words only (word chars: alphanumeric and `_`).
    pub whole_word: bool,
    /// Treat the query as a regex pattern instead of a literal.
    pub regex: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            case_sensitive: true,
            whole_word: false,
            regex: false,
        }
    }
}

/// A search hit as a half-open char range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchMatch {
    /// First matched character.
    pub start: usize,
    /// One past the last matched character.
    pub end: usize,
}

impl SearchMatch {
    /// Match length in characters.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Whether the range is empty.
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// Search failures.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The query failed to compile as a regex.
    #[error("invalid regex: {0}")]
    InvalidRegex(#[from] regex::Error),
}

/// Byte/char offset translation for one text snapshot.
#[derive(Debug)]
pub(crate) struct CharIndex {
    char_to_byte: Vec<usize>,
    byte_len: usize,
}

impl CharIndex {
    pub(crate) fn new(text: &str) -> Self {
        let mut char_to_byte: Vec<usize> = text.char_indices().map(|(b, _)| b).collect();
        char_to_byte.push(text.len());
        Self {
            char_to_byte,
            byte_len: text.len(),
        }
    }

    pub(crate) fn char_count(&self) -> usize {
        self.char_to_byte.len().saturating_sub(1)
    }

    pub(crate) fn char_to_byte(&self, char_offset: usize) -> usize {
        let clamped = char_offset.min(self.char_count());
        self.char_to_byte
            .get(clamped)
            .copied()
            .unwrap_or(self.byte_len)
    }

    pub(crate) fn byte_to_char(&self, byte_offset: usize) -> usize {
        let clamped = byte_offset.min(self.byte_len);
        match self.char_to_byte.binary_search(&clamped) {
            Ok(idx) | Err(idx) => idx,
        }
    }

    fn char_at(&self, text: &str, char_offset: usize) -> Option<char> {
        if char_offset >= self.char_count() {
            return None;
        }
        let start = self.char_to_byte[char_offset];
        let end = self.char_to_byte[char_offset + 1];
        text.get(start..end)?.chars().next()
    }
}

/// A compiled query, reusable across documents.
#[derive(Debug)]
pub struct SearchQuery {
    re: Regex,
    whole_word: bool,
    empty_query: bool,
}

impl SearchQuery {
    /// Compile `query` under `options`.
    ///
    /// An empty query compiles but never matches.
    pub fn new(query: &str, options: SearchOptions) -> Result<Self, SearchError> {
        let pattern = if options.regex {
            query.to_string()
        } else {
            regex::escape(query)
        };
        let re = RegexBuilder::new(&pattern)
            .case_insensitive(!options.case_sensitive)
            .multi_line(true)
            .build()?;
        Ok(Self {
            re,
            whole_word: options.whole_word,
            empty_query: query.is_empty(),
        })
    }

    /// First match at or after `from_char`, or `None`.
    pub fn find_next(&self, text: &str, from_char: usize) -> Option<SearchMatch> {
        if self.empty_query {
            return None;
        }
        let index = CharIndex::new(text);
        let mut start_char = from_char.min(index.char_count());
        loop {
            let start_byte = index.char_to_byte(start_char);
            let m = self.re.find_at(text, start_byte)?;
            let candidate = SearchMatch {
                start: index.byte_to_char(m.start()),
                end: index.byte_to_char(m.end()),
            };

            // Zero-length regex matches would loop in place; step past them.
            if candidate.is_empty() {
                if candidate.end >= index.char_count() {
                    return None;
                }
                start_char = candidate.end + 1;
                continue;
            }
            if self.whole_word && !self.is_whole_word(text, &index, candidate) {
                start_char = candidate.end;
                continue;
            }
            return Some(candidate);
        }
    }

    /// Last match strictly before `before_char`, or `None`.
    pub fn find_prev(&self, text: &str, before_char: usize) -> Option<SearchMatch> {
        if self.empty_query {
            return None;
        }
        let index = CharIndex::new(text);
        let limit_byte = index.char_to_byte(before_char.min(index.char_count()));

        let mut last = None;
        for m in self.re.find_iter(&text[..limit_byte]) {
            let candidate = SearchMatch {
                start: index.byte_to_char(m.start()),
                end: index.byte_to_char(m.end()),
            };
            if candidate.is_empty() {
                continue;
            }
            if self.whole_word && !self.is_whole_word(text, &index, candidate) {
                continue;
            }
            last = Some(candidate);
        }
        last
    }

    /// All non-overlapping matches in order.
    pub fn find_all(&self, text: &str) -> Vec<SearchMatch> {
        if self.empty_query {
            return Vec::new();
        }
        let index = CharIndex::new(text);
        self.re
            .find_iter(text)
            .map(|m| SearchMatch {
                start: index.byte_to_char(m.start()),
                end: index.byte_to_char(m.end()),
            })
            .filter(|c| !c.is_empty())
            .filter(|c| !self.whole_word || self.is_whole_word(text, &index, *c))
            .collect()
    }

    fn is_whole_word(&self, text: &str, index: &CharIndex, m: SearchMatch) -> bool {
        let before = if m.start == 0 {
            None
        } else {
            index.char_at(text, m.start - 1)
        };
        let after = index.char_at(text, m.end);
        !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
    }
}

fn is_word_char(ch: char) -> bool {
    ch == '_' || ch.is_alphanumeric()
}
