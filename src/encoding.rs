//! Encoding resolution
//!
//! Decodes raw file bytes by trying a fixed, ordered list of text encodings
//! and accepting the first one that decodes without error. Byte sequences
//! that are valid under several encodings resolve to the earliest entry,
//! which is not necessarily the encoding the file was authored in.

use std::borrow::Cow;
use std::fmt;

const UTF8_SIGNATURE: [u8; 3] = [0xEF, 0xBB, 0xBF];
const UTF16_LE_SIGNATURE: [u8; 2] = [0xFF, 0xFE];
const UTF16_BE_SIGNATURE: [u8; 2] = [0xFE, 0xFF];

/// A candidate source encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextEncoding {
    /// UTF-8 preceded by the `EF BB BF` signature
    Utf8WithSignature,
    Utf8,
    /// UTF-16 with optional byte order mark, little-endian when absent
    Utf16,
    /// Simplified Chinese, EUC-CN byte layout only
    Gb2312,
    /// Japanese, JIS X 0208 rows without vendor extensions
    ShiftJis,
}

impl TextEncoding {
    /// Canonical lowercase name, as reported to the user
    pub fn name(&self) -> &'static str {
        match self {
            TextEncoding::Utf8WithSignature => "utf-8-sig",
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Utf16 => "utf-16",
            TextEncoding::Gb2312 => "gb2312",
            TextEncoding::ShiftJis => "shift-jis",
        }
    }

    /// Attempt a strict decode; `None` when any byte sequence is malformed
    pub fn decode(&self, bytes: &[u8]) -> Option<String> {
        match self {
            TextEncoding::Utf8WithSignature => {
                let body = bytes.strip_prefix(&UTF8_SIGNATURE)?;
                std::str::from_utf8(body).ok().map(str::to_owned)
            }
            TextEncoding::Utf8 => std::str::from_utf8(bytes).ok().map(str::to_owned),
            TextEncoding::Utf16 => decode_utf16(bytes),
            TextEncoding::Gb2312 => legacy(encoding_rs::GBK, is_euc_cn, bytes),
            TextEncoding::ShiftJis => legacy(encoding_rs::SHIFT_JIS, is_plain_shift_jis, bytes),
        }
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for TextEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "utf-8-sig" | "utf8-sig" => Ok(TextEncoding::Utf8WithSignature),
            "utf-8" | "utf8" => Ok(TextEncoding::Utf8),
            "utf-16" | "utf16" => Ok(TextEncoding::Utf16),
            "gb2312" | "gbk" => Ok(TextEncoding::Gb2312),
            "shift-jis" | "sjis" => Ok(TextEncoding::ShiftJis),
            _ => Err(format!(
                "Invalid encoding: {}. Valid options: utf-8-sig, utf-8, utf-16, gb2312, shift-jis",
                s
            )),
        }
    }
}

fn strict(encoding: &'static encoding_rs::Encoding, bytes: &[u8]) -> Option<String> {
    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(Cow::into_owned)
}

/// Decode with a superset decoder after checking the narrower byte layout.
///
/// encoding_rs only ships the GB18030 and Windows-31J supersets, which map
/// extension and user-defined cells into the private use area.
fn legacy(encoding: &'static encoding_rs::Encoding, layout: fn(&[u8]) -> bool, bytes: &[u8]) -> Option<String> {
    if !layout(bytes) {
        return None;
    }
    strict(encoding, bytes).filter(|text| !text.chars().any(is_private_use))
}

fn is_private_use(c: char) -> bool {
    matches!(c, '\u{E000}'..='\u{F8FF}')
}

/// ASCII, or a lead in 0xA1..=0xF7 followed by a trail in 0xA1..=0xFE
fn is_euc_cn(bytes: &[u8]) -> bool {
    let mut iter = bytes.iter();
    while let Some(&b) = iter.next() {
        match b {
            0x00..=0x7F => {}
            0xA1..=0xF7 => match iter.next() {
                Some(0xA1..=0xFE) => {}
                _ => return false,
            },
            _ => return false,
        }
    }
    true
}

/// ASCII, half-width katakana, or a JIS X 0208 double-byte pair.
///
/// Lead 0x87 (NEC row 13), leads from 0xED (IBM and user-defined) and the
/// lone 0x80 and 0xA0 bytes belong to Windows-31J only.
fn is_plain_shift_jis(bytes: &[u8]) -> bool {
    let mut iter = bytes.iter();
    while let Some(&b) = iter.next() {
        match b {
            0x00..=0x7F | 0xA1..=0xDF => {}
            0x81..=0x86 | 0x88..=0x9F | 0xE0..=0xEA => match iter.next() {
                Some(0x40..=0x7E | 0x80..=0xFC) => {}
                _ => return false,
            },
            _ => return false,
        }
    }
    true
}

fn decode_utf16(bytes: &[u8]) -> Option<String> {
    if bytes.len() % 2 != 0 {
        return None;
    }

    if let Some(body) = bytes.strip_prefix(&UTF16_LE_SIGNATURE) {
        strict(encoding_rs::UTF_16LE, body)
    } else if let Some(body) = bytes.strip_prefix(&UTF16_BE_SIGNATURE) {
        strict(encoding_rs::UTF_16BE, body)
    } else {
        strict(encoding_rs::UTF_16LE, bytes)
    }
}

/// Outcome of resolving a byte sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeResult {
    Decoded { encoding: TextEncoding, text: String },
    /// No candidate matched; carries the original bytes unchanged
    Undecodable(Vec<u8>),
}

impl DecodeResult {
    pub fn into_text(self) -> Option<String> {
        match self {
            DecodeResult::Decoded { text, .. } => Some(text),
            DecodeResult::Undecodable(_) => None,
        }
    }

    /// Decoded text, or a lossy rendering for diagnostics
    pub fn into_display_text(self) -> String {
        match self {
            DecodeResult::Decoded { text, .. } => text,
            DecodeResult::Undecodable(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        }
    }
}

/// Resolves raw bytes against an ordered encoding priority list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodingResolver {
    priority: Vec<TextEncoding>,
}

impl EncodingResolver {
    /// Standard priority order
    pub const DEFAULT_PRIORITY: [TextEncoding; 5] = [
        TextEncoding::Utf8WithSignature,
        TextEncoding::Utf8,
        TextEncoding::Utf16,
        TextEncoding::Gb2312,
        TextEncoding::ShiftJis,
    ];

    pub fn new(priority: Vec<TextEncoding>) -> Self {
        Self { priority }
    }

    /// Decode with the first encoding that accepts the bytes
    pub fn resolve(&self, bytes: &[u8]) -> DecodeResult {
        self.priority
            .iter()
            .find_map(|encoding| {
                encoding.decode(bytes).map(|text| DecodeResult::Decoded {
                    encoding: *encoding,
                    text,
                })
            })
            .unwrap_or_else(|| DecodeResult::Undecodable(bytes.to_vec()))
    }
}

impl Default for EncodingResolver {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PRIORITY.to_vec())
    }
}
