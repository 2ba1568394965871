//! Line ending policy.
//!
//! Documents are stored with LF (`'\n'`) newlines internally. The ending
//! found on load is remembered as the document's preference and re-applied
//! when encoding for disk.

/// Preferred newline sequence for a document on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    /// Unix-style LF (`'\n'`).
    #[default]
    Lf,
    /// Windows-style CRLF (`"\r\n"`).
    Crlf,
}

impl LineEnding {
    /// Detect the line ending of loaded text.
    ///
    /// Any CRLF in the input selects [`LineEnding::Crlf`]; otherwise LF.
    pub fn detect(text: &str) -> Self {
        if text.contains("\r\n") {
            Self::Crlf
        } else {
            Self::Lf
        }
    }

    /// Normalize loaded text to LF newlines.
    pub fn normalize(text: &str) -> String {
        text.replace("\r\n", "\n")
    }

    /// Convert LF-normalized text to this ending for saving.
    pub fn apply(self, text: &str) -> String {
        match self {
            Self::Lf => text.to_string(),
            Self::Crlf => text.replace('\n', "\r\n"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_crlf_when_present() {
        assert_eq!(LineEnding::detect("a\r\nb"), LineEnding::Crlf);
        assert_eq!(LineEnding::detect("a\nb"), LineEnding::Lf);
        assert_eq!(LineEnding::detect(""), LineEnding::Lf);
    }

    #[test]
    fn normalize_then_apply_round_trips() {
        let source = "one\r\ntwo\r\nthree";
        let normalized = LineEnding::normalize(source);
        assert_eq!(normalized, "one\ntwo\nthree");
        assert_eq!(LineEnding::Crlf.apply(&normalized), source);
        assert_eq!(LineEnding::Lf.apply(&normalized), normalized);
    }
}
