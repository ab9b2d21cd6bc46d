//! Text encodings accepted for request and response bodies.

use std::borrow::Cow;
use std::fmt::{self, Write};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    #[default]
    Utf8,
    Latin1,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported text encoding: {0}")]
pub struct UnknownEncoding(pub String);

impl Encoding {
    /// Canonical label, as used in the `charset` parameter.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::Latin1 => "iso-8859-1",
        }
    }

    pub fn content_type(&self) -> String {
        format!("application/json; charset={}", self.label())
    }

    pub fn decode<'a>(&self, raw: &'a [u8]) -> Result<Cow<'a, str>, String> {
        match self {
            Self::Utf8 => std::str::from_utf8(raw)
                .map(Cow::Borrowed)
                .map_err(|e| e.to_string()),
            Self::Latin1 => Ok(Cow::Owned(raw.iter().map(|&b| char::from(b)).collect())),
        }
    }

    /// Encode serialized JSON text.
    ///
    /// Latin-1 cannot carry characters above U+00FF; those only ever occur
    /// inside JSON strings, so they are written as `\u` escapes.
    pub fn encode(&self, text: &str) -> Vec<u8> {
        match self {
            Self::Utf8 => text.as_bytes().to_vec(),
            Self::Latin1 => {
                let mut out = Vec::with_capacity(text.len());
                let mut escape = String::new();
                for ch in text.chars() {
                    if let Ok(byte) = u8::try_from(u32::from(ch)) {
                        out.push(byte);
                        continue;
                    }
                    let mut units = [0u16; 2];
                    for unit in ch.encode_utf16(&mut units) {
                        escape.clear();
                        let _ = write!(escape, "\\u{unit:04x}");
                        out.extend_from_slice(escape.as_bytes());
                    }
                }
                out
            }
        }
    }
}

impl FromStr for Encoding {
    type Err = UnknownEncoding;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Ok(Self::Utf8),
            "latin-1" | "latin1" | "iso-8859-1" | "iso8859-1" => Ok(Self::Latin1),
            _ => Err(UnknownEncoding(s.to_string())),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
