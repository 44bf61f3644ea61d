/*
 * buffer.rs
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

//! Converted input text with a read cursor kept as an offset, so appends that grow
//! the backing storage never invalidate it.

#[derive(Debug, Default)]
pub(crate) struct RawBuffer {
    text: String,
    /// Read position. Always <= text.len() and on a char boundary.
    pos: usize,
}

impl RawBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, s: &str) {
        self.text.push_str(s);
    }

    /// Drop all content; only called once everything has been consumed.
    pub fn clear(&mut self) {
        self.text.clear();
        self.pos = 0;
    }

    pub fn rest(&self) -> &str {
        &self.text[self.pos..]
    }

    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Character after the current one.
    pub fn peek_second(&self) -> Option<char> {
        let mut chars = self.rest().chars();
        chars.next();
        chars.next()
    }

    /// Advance by `n` bytes. Callers only pass lengths of text they matched at the cursor.
    pub fn advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.text.len());
        debug_assert!(self.text.is_char_boundary(self.pos));
    }

    pub fn advance_char(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    pub fn skip_to_end(&mut self) {
        self.pos = self.text.len();
    }

    pub fn starts_with(&self, prefix: &str) -> bool {
        self.rest().starts_with(prefix)
    }

    pub fn starts_with_ignore_ascii_case(&self, prefix: &str) -> bool {
        let rest = self.rest().as_bytes();
        rest.len() >= prefix.len() && rest[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
    }

    /// Offset of `needle` relative to the cursor, searching from `from` (also relative).
    /// `needle` must be ASCII.
    pub fn find(&self, needle: &str, from: usize, ignore_ascii_case: bool) -> Option<usize> {
        let hay = self.rest().as_bytes();
        let needle = needle.as_bytes();
        if needle.is_empty() || from >= hay.len() || hay.len() - from < needle.len() {
            return None;
        }
        hay[from..]
            .windows(needle.len())
            .position(|w| {
                if ignore_ascii_case {
                    w.eq_ignore_ascii_case(needle)
                } else {
                    w == needle
                }
            })
            .map(|i| from + i)
    }

    /// Bytes remaining after the cursor.
    pub fn remaining(&self) -> usize {
        self.text.len() - self.pos
    }
}
