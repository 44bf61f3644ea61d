/*
 * error.rs
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

//! Conversion errors and non-fatal diagnostics.

use std::fmt;
use std::io;

/// Error that stops a conversion. Only I/O failures on the input stream qualify;
/// everything else degrades locally and is reported as a [`Diagnostic`].
#[derive(Debug)]
pub enum HtmlError {
    Io(io::Error),
}

impl fmt::Display for HtmlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HtmlError::Io(e) => write!(f, "read error: {}", e),
        }
    }
}

impl std::error::Error for HtmlError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HtmlError::Io(e) => Some(e),
        }
    }
}

impl From<io::Error> for HtmlError {
    fn from(e: io::Error) -> Self {
        HtmlError::Io(e)
    }
}

/// Faithful charset conversion was not possible for some input.
#[derive(Debug, Clone)]
pub struct ConversionError {
    message: String,
}

impl ConversionError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { message: msg.into() }
    }
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ConversionError {}

/// Recoverable problem met while converting. The parser keeps going in every case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// Line `line` (1-based) could not be converted faithfully; fallback conversion was used.
    SoftConversion { line: u64 },
    /// Unterminated tag or attribute quote. `text` is the raw tag text seen so far.
    MalformedTag { text: String },
    /// `&...;` token with no mapping; emitted verbatim.
    UnresolvedEntity { token: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::SoftConversion { line } => {
                write!(f, "line {}: charset conversion failed, used fallback", line)
            }
            Diagnostic::MalformedTag { text } => write!(f, "syntax error in tag: '{}'", text),
            Diagnostic::UnresolvedEntity { token } => write!(f, "unresolved entity {}", token),
        }
    }
}
