//! Text encodings for file I/O.
//!
//! Detection on open is BOM-first: a UTF-8/UTF-16 byte-order mark wins,
//! otherwise the bytes are tried as UTF-8 and fall back to Latin-1 (which
//! accepts any byte sequence, so opening never fails on unknown data).
//! The detected encoding is remembered per document and reused on save.

use thiserror::Error;

const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];
const UTF16_LE_BOM: [u8; 2] = [0xFF, 0xFE];
const UTF16_BE_BOM: [u8; 2] = [0xFE, 0xFF];

/// Encoding failures on open or save.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodingError {
    /// The file's bytes are not valid for the encoding its BOM declares.
    #[error("invalid {encoding} data")]
    InvalidData {
        /// The encoding that rejected the bytes.
        encoding: TextEncoding,
    },
    /// A character in the document cannot be written in the target encoding.
    #[error("character {ch:?} is not representable in {encoding}")]
    Unrepresentable {
        /// The offending character.
        ch: char,
        /// The target encoding.
        encoding: TextEncoding,
    },
}

/// On-disk text encoding of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    /// UTF-8, with or without a byte-order mark.
    Utf8 {
        /// Whether the file carries (and saves with) a BOM.
        bom: bool,
    },
    /// UTF-16 little-endian (always saved with a BOM).
    Utf16Le,
    /// UTF-16 big-endian (always saved with a BOM).
    Utf16Be,
    /// ISO-8859-1: one byte per char, U+0000..=U+00FF only.
    Latin1,
}

impl Default for TextEncoding {
    fn default() -> Self {
        Self::Utf8 { bom: false }
    }
}

impl std::fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Utf8 { bom: false } => "UTF-8",
            Self::Utf8 { bom: true } => "UTF-8 with BOM",
            Self::Utf16Le => "UTF-16 LE",
            Self::Utf16Be => "UTF-16 BE",
            Self::Latin1 => "Latin-1",
        };
        f.write_str(name)
    }
}

impl TextEncoding {
    /// Decode file bytes, detecting the encoding.
    ///
    /// Fails only for a BOM-declared encoding with malformed content; BOM-less
    /// non-UTF-8 bytes decode as Latin-1.
    pub fn decode(bytes: &[u8]) -> Result<(String, Self), EncodingError> {
        if bytes.starts_with(&UTF8_BOM) {
            let encoding = Self::Utf8 { bom: true };
            let text = std::str::from_utf8(&bytes[UTF8_BOM.len()..])
                .map_err(|_| EncodingError::InvalidData { encoding })?;
            return Ok((text.to_string(), encoding));
        }
        if bytes.starts_with(&UTF16_LE_BOM) {
            let text = decode_utf16(&bytes[2..], u16::from_le_bytes, Self::Utf16Le)?;
            return Ok((text, Self::Utf16Le));
        }
        if bytes.starts_with(&UTF16_BE_BOM) {
            let text = decode_utf16(&bytes[2..], u16::from_be_bytes, Self::Utf16Be)?;
            return Ok((text, Self::Utf16Be));
        }
        match std::str::from_utf8(bytes) {
            Ok(text) => Ok((text.to_string(), Self::Utf8 { bom: false })),
            Err(_) => {
                let text: String = bytes.iter().map(|&b| b as char).collect();
                Ok((text, Self::Latin1))
            }
        }
    }

    /// Encode text for saving in this encoding.
    pub fn encode(self, text: &str) -> Result<Vec<u8>, EncodingError> {
        match self {
            Self::Utf8 { bom } => {
                let mut out = Vec::with_capacity(text.len() + 3);
                if bom {
                    out.extend_from_slice(&UTF8_BOM);
                }
                out.extend_from_slice(text.as_bytes());
                Ok(out)
            }
            Self::Utf16Le => {
                let mut out = Vec::with_capacity(2 + text.len() * 2);
                out.extend_from_slice(&UTF16_LE_BOM);
                for unit in text.encode_utf16() {
                    out.extend_from_slice(&unit.to_le_bytes());
                }
                Ok(out)
            }
            Self::Utf16Be => {
                let mut out = Vec::with_capacity(2 + text.len() * 2);
                out.extend_from_slice(&UTF16_BE_BOM);
                for unit in text.encode_utf16() {
                    out.extend_from_slice(&unit.to_be_bytes());
                }
                Ok(out)
            }
            Self::Latin1 => {
                let mut out = Vec::with_capacity(text.len());
                for ch in text.chars() {
                    let code = u32::from(ch);
                    if code > 0xFF {
                        return Err(EncodingError::Unrepresentable { ch, encoding: self });
                    }
                    out.push(code as u8);
                }
                Ok(out)
            }
        }
    }
}

fn decode_utf16(
    bytes: &[u8],
    from_bytes: fn([u8; 2]) -> u16,
    encoding: TextEncoding,
) -> Result<String, EncodingError> {
    if bytes.len() % 2 != 0 {
        return Err(EncodingError::InvalidData { encoding });
    }
    let units = bytes.chunks_exact(2).map(|pair| from_bytes([pair[0], pair[1]]));
    char::decode_utf16(units)
        .collect::<Result<String, _>>()
        .map_err(|_| EncodingError::InvalidData { encoding })
}
