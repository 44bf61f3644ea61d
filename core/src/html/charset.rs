/*
 * charset.rs
 * Copyright (C) 2026 Chris Burdess
 *
 * This file is part of Mailtext, the HTML body converter for mail clients.
 *
 * Mailtext is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Mailtext is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Mailtext.  If not, see <http://www.gnu.org/licenses/>.
 */

//! Source charset to UTF-8 conversion used by the line reader.

use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};

use crate::html::error::ConversionError;

/// Converts raw body bytes to text. Implementations must provide a fallback that never fails.
pub trait CharsetConverter {
    /// Faithful conversion. Fails on byte sequences invalid in the source charset.
    fn convert(&self, src: &[u8]) -> Result<String, ConversionError>;

    /// Degraded conversion used after `convert` fails. Unconvertible sequences become U+FFFD.
    fn convert_fallback(&self, src: &[u8]) -> String {
        String::from_utf8_lossy(src).into_owned()
    }

    /// True when the source charset is ISO-8859-1; numeric references 128..=255 then map directly.
    fn is_latin1(&self) -> bool {
        false
    }
}

/// [`CharsetConverter`] backed by an `encoding_rs` encoding.
#[derive(Debug, Clone, Copy)]
pub struct EncodingConverter {
    encoding: &'static Encoding,
}

impl EncodingConverter {
    pub fn new(encoding: &'static Encoding) -> Self {
        Self { encoding }
    }

    /// Look up a MIME charset label (e.g. the `charset` parameter of Content-Type).
    /// Returns None for labels encoding_rs does not know.
    pub fn for_label(label: &str) -> Option<Self> {
        Encoding::for_label(label.trim().as_bytes()).map(Self::new)
    }

    /// Like `for_label` but falls back to UTF-8 for unknown labels.
    pub fn for_label_or_utf8(label: &str) -> Self {
        Self::for_label(label).unwrap_or_else(Self::utf8)
    }

    pub fn utf8() -> Self {
        Self::new(UTF_8)
    }

    /// ISO-8859-1. WHATWG maps this label to windows-1252, a superset.
    pub fn latin1() -> Self {
        Self::new(WINDOWS_1252)
    }

    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }
}

impl Default for EncodingConverter {
    fn default() -> Self {
        Self::utf8()
    }
}

impl CharsetConverter for EncodingConverter {
    fn convert(&self, src: &[u8]) -> Result<String, ConversionError> {
        self.encoding
            .decode_without_bom_handling_and_without_replacement(src)
            .map(|s| s.into_owned())
            .ok_or_else(|| ConversionError::new(format!("invalid {} input", self.encoding.name())))
    }

    fn convert_fallback(&self, src: &[u8]) -> String {
        let (text, _had_errors) = self.encoding.decode_without_bom_handling(src);
        text.into_owned()
    }

    fn is_latin1(&self) -> bool {
        self.encoding == WINDOWS_1252
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_strict_rejects_invalid() {
        let conv = EncodingConverter::utf8();
        assert_eq!(conv.convert("caf\u{e9}".as_bytes()).unwrap(), "caf\u{e9}");
        assert!(conv.convert(b"caf\xe9").is_err());
        assert_eq!(conv.convert_fallback(b"caf\xe9"), "caf\u{FFFD}");
    }

    #[test]
    fn latin1_label() {
        let conv = EncodingConverter::for_label("ISO-8859-1").unwrap();
        assert!(conv.is_latin1());
        assert_eq!(conv.convert(b"caf\xe9").unwrap(), "caf\u{e9}");
        assert!(!EncodingConverter::utf8().is_latin1());
    }

    #[test]
    fn unknown_label() {
        assert!(EncodingConverter::for_label("x-no-such-charset").is_none());
        let conv = EncodingConverter::for_label_or_utf8("x-no-such-charset");
        assert_eq!(conv.encoding(), UTF_8);
    }
}
