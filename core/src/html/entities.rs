/*
 * entities.rs
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

//! Character reference table: named symbols, ASCII transliterations and a curated
//! code point to ASCII map for numeric references outside the direct range.

use std::collections::HashMap;

use once_cell::sync::Lazy;

/// Symbols mapped to their plain-text equivalent. Keys are full tokens including `&` and `;`.
const SYMBOLS: &[(&str, &str)] = &[
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&amp;", "&"),
    ("&quot;", "\""),
    ("&lsquo;", "'"),
    ("&rsquo;", "'"),
    ("&ldquo;", "\""),
    ("&rdquo;", "\""),
    ("&nbsp;", " "),
    ("&trade;", "(TM)"),
    ("&#153;", "(TM)"),
    ("&hellip;", "..."),
];

/// Latin-1 symbols and letters spelled out in ASCII.
const ASCII_SYMBOLS: &[(&str, &str)] = &[
    ("&iexcl;", "^!"),
    ("&brvbar;", "|"),
    ("&copy;", "(C)"),
    ("&laquo;", "<<"),
    ("&reg;", "(R)"),
    ("&sup2;", "^2"),
    ("&sup3;", "^3"),
    ("&acute;", "'"),
    ("&cedil;", ","),
    ("&sup1;", "^1"),
    ("&raquo;", ">>"),
    ("&frac14;", "1/4"),
    ("&frac12;", "1/2"),
    ("&frac34;", "3/4"),
    ("&iquest;", "^?"),
    ("&Agrave;", "A`"),
    ("&Aacute;", "A'"),
    ("&Acirc;", "A^"),
    ("&Atilde;", "A~"),
    ("&AElig;", "AE"),
    ("&Egrave;", "E`"),
    ("&Eacute;", "E'"),
    ("&Ecirc;", "E^"),
    ("&Igrave;", "I`"),
    ("&Iacute;", "I'"),
    ("&Icirc;", "I^"),
    ("&Ntilde;", "N~"),
    ("&Ograve;", "O`"),
    ("&Oacute;", "O'"),
    ("&Ocirc;", "O^"),
    ("&Otilde;", "O~"),
    ("&Ugrave;", "U`"),
    ("&Uacute;", "U'"),
    ("&Ucirc;", "U^"),
    ("&Yacute;", "Y'"),
    ("&agrave;", "a`"),
    ("&aacute;", "a'"),
    ("&acirc;", "a^"),
    ("&atilde;", "a~"),
    ("&aelig;", "ae"),
    ("&egrave;", "e`"),
    ("&eacute;", "e'"),
    ("&ecirc;", "e^"),
    ("&igrave;", "i`"),
    ("&iacute;", "i'"),
    ("&icirc;", "i^"),
    ("&ntilde;", "n~"),
    ("&ograve;", "o`"),
    ("&oacute;", "o'"),
    ("&ocirc;", "o^"),
    ("&otilde;", "o~"),
    ("&ugrave;", "u`"),
    ("&uacute;", "u'"),
    ("&ucirc;", "u^"),
    ("&yacute;", "y'"),
];

/// Code points above the direct range that have an ASCII approximation.
/// Anything not listed stays unresolved.
const CODE_POINTS: &[(u32, &str)] = &[
    (338, "OE"),
    (339, "oe"),
    (710, "^"),
    (732, "~"),
    (8194, " "), // en space
    (8195, " "), // em space
    (8201, " "), // thin space
    (8211, "-"),
    (8212, "--"),
    (8216, "'"),
    (8217, "'"),
    (8218, ","),
    (8220, "\""),
    (8221, "\""),
    (8222, ",,"),
    (8230, "..."),
    (8240, "%o"),
    (8249, "<"),
    (8250, ">"),
    (8364, "EUR"),
    (8482, "(TM)"),
];

static DEFAULT_TABLE: Lazy<EntityTable> = Lazy::new(EntityTable::build);

/// Immutable entity lookup, built once per process and shared by all parsers.
#[derive(Debug)]
pub struct EntityTable {
    named: HashMap<&'static str, &'static str>,
    code_points: HashMap<u32, &'static str>,
}

impl EntityTable {
    /// The process-wide table.
    pub fn shared() -> &'static EntityTable {
        &DEFAULT_TABLE
    }

    fn build() -> Self {
        let named = SYMBOLS.iter().chain(ASCII_SYMBOLS.iter()).copied().collect();
        let code_points = CODE_POINTS.iter().copied().collect();
        Self { named, code_points }
    }

    /// Replacement for a full token such as `&amp;`.
    pub fn lookup(&self, token: &str) -> Option<&'static str> {
        self.named.get(token).copied()
    }

    /// ASCII approximation for a code point outside the directly representable range.
    pub fn code_point(&self, code: u32) -> Option<&'static str> {
        self.code_points.get(&code).copied()
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.named.len()
    }
}

/// Value of a numeric reference token `&#NNN;`: the leading decimal digits after `&#`.
/// Returns None when the token is not numeric (e.g. `&#x41;`).
pub fn numeric_value(token: &str) -> Option<u32> {
    let digits = token.strip_prefix("&#")?;
    let len = digits.bytes().take_while(u8::is_ascii_digit).count();
    if len == 0 {
        return None;
    }
    Some(digits.as_bytes()[..len].iter().fold(0u32, |acc, &d| {
        acc.saturating_mul(10).saturating_add(u32::from(d - b'0'))
    }))
}
