/*
 * reader.rs
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

//! Line reader: pulls one bounded line of raw bytes, converts it, appends to the buffer.

use std::io::{self, BufRead};

use crate::html::buffer::RawBuffer;
use crate::html::charset::CharsetConverter;

/// Longest tail of a cut line held back for the next read (a 4-byte sequence minus one).
const MAX_CARRY: usize = 3;

/// Result of one refill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LineStatus {
    Line,
    /// Converted with the fallback; the line was still appended.
    Degraded,
    Eof,
}

pub(crate) struct LineReader<R> {
    input: R,
    limit: usize,
    raw: Vec<u8>,
    /// Bytes of a multi-byte sequence cut by the line limit, prepended to the next line.
    carry: Vec<u8>,
    line_number: u64,
}

impl<R: BufRead> LineReader<R> {
    pub fn new(input: R, limit: usize) -> Self {
        Self {
            input,
            limit: limit.max(1),
            raw: Vec::new(),
            carry: Vec::new(),
            line_number: 0,
        }
    }

    /// Number of lines read so far (1-based number of the last line).
    pub fn line_number(&self) -> u64 {
        self.line_number
    }

    pub fn into_inner(self) -> R {
        self.input
    }

    /// Read the next line (through `\n`, at most `limit` bytes) and append its
    /// conversion to `buf`. The buffer's cursor is left where it was.
    ///
    /// When the limit cuts a line inside a multi-byte sequence, the incomplete tail is
    /// held back and converted with the next line.
    pub fn read_line(&mut self, conv: &dyn CharsetConverter, buf: &mut RawBuffer) -> io::Result<LineStatus> {
        if !self.fill_raw_line()? {
            return Ok(LineStatus::Eof);
        }
        self.line_number += 1;
        if let Ok(text) = conv.convert(&self.raw) {
            buf.append(&text);
            return Ok(LineStatus::Line);
        }
        if self.is_cut() {
            let len = self.raw.len();
            for keep in (len.saturating_sub(MAX_CARRY).max(1)..len).rev() {
                if let Ok(text) = conv.convert(&self.raw[..keep]) {
                    buf.append(&text);
                    self.carry.extend_from_slice(&self.raw[keep..]);
                    return Ok(LineStatus::Line);
                }
            }
        }
        buf.append(&conv.convert_fallback(&self.raw));
        Ok(LineStatus::Degraded)
    }

    /// The last read stopped at the limit rather than at a line end.
    fn is_cut(&self) -> bool {
        self.raw.len() == self.limit && self.raw.last() != Some(&b'\n')
    }

    /// Fill `raw` with one line, starting with any carried bytes. Returns false at end of input.
    fn fill_raw_line(&mut self) -> io::Result<bool> {
        self.raw.clear();
        self.raw.append(&mut self.carry);
        loop {
            let available = match self.input.fill_buf() {
                Ok(b) => b,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            if available.is_empty() {
                break;
            }
            let room = self.limit - self.raw.len();
            let window = &available[..available.len().min(room)];
            let (take, done) = match window.iter().position(|&b| b == b'\n') {
                Some(i) => (i + 1, true),
                None => (window.len(), window.len() == room),
            };
            self.raw.extend_from_slice(&window[..take]);
            self.input.consume(take);
            if done {
                break;
            }
        }
        Ok(!self.raw.is_empty())
    }
}
