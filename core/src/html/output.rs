/*
 * output.rs
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

//! Output accumulator with line/paragraph bookkeeping.

/// Collects the text of the current chunk. The flags describe everything emitted so far,
/// so they carry over when the chunk text is taken.
#[derive(Debug)]
pub(crate) struct TextAccumulator {
    text: String,
    /// Last emitted char is `\n` (true before any output).
    newline: bool,
    /// Last two emitted chars are `\n` (true before any output). Implies `newline`.
    empty_line: bool,
    /// Whitespace seen; a single space goes out before the next append.
    space_pending: bool,
    preformatted: bool,
}

impl Default for TextAccumulator {
    fn default() -> Self {
        Self {
            text: String::new(),
            newline: true,
            empty_line: true,
            space_pending: false,
            preformatted: false,
        }
    }
}

impl TextAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Take the chunk text, keeping the flags.
    pub fn take(&mut self) -> String {
        std::mem::take(&mut self.text)
    }

    pub fn is_preformatted(&self) -> bool {
        self.preformatted
    }

    pub fn set_preformatted(&mut self, on: bool) {
        self.preformatted = on;
        if on {
            self.space_pending = false;
        }
    }

    /// Collapsible whitespace. Ignored at the start of a line and in pre mode.
    pub fn whitespace(&mut self) {
        if !self.preformatted && !self.newline {
            self.space_pending = true;
        }
    }

    pub fn clear_space(&mut self) {
        self.space_pending = false;
    }

    pub fn push_char(&mut self, c: char) {
        self.flush_space();
        self.emit(c);
    }

    pub fn push_str(&mut self, s: &str) {
        self.flush_space();
        for c in s.chars() {
            self.emit(c);
        }
    }

    /// Start a new line unless already at one.
    pub fn ensure_line_start(&mut self) {
        if !self.newline {
            self.space_pending = false;
            self.emit('\n');
        }
    }

    /// Leave exactly one blank line, unless one is already there.
    pub fn ensure_blank_line(&mut self) {
        self.space_pending = false;
        if !self.empty_line {
            self.ensure_line_start();
            self.emit('\n');
        }
    }

    fn flush_space(&mut self) {
        if self.space_pending && !self.preformatted {
            self.space_pending = false;
            self.emit(' ');
        }
    }

    fn emit(&mut self, c: char) {
        self.text.push(c);
        if c == '\n' {
            self.empty_line = self.newline;
            self.newline = true;
        } else {
            self.newline = false;
            self.empty_line = false;
        }
    }
}
