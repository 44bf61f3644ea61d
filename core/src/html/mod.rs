/*
 * mod.rs
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

//! Streaming HTML to plain text conversion for rendering and quoting mail bodies.
//!
//! [`HtmlParser`] pulls lines from a byte stream, converts them with a
//! [`CharsetConverter`] and hands back text one [`Chunk`] at a time. Chunks are cut at
//! hyperlink boundaries so the caller can tell anchor text from surrounding text;
//! [`HtmlParser::events`] offers the same as [`HtmlEvent`]s. This is a best-effort
//! linearizer: no DOM, no CSS, no scripts.

mod buffer;
mod charset;
mod entities;
mod error;
mod events;
mod output;
mod parser;
mod reader;
mod tag;

pub use charset::{CharsetConverter, EncodingConverter};
pub use entities::EntityTable;
pub use error::{ConversionError, Diagnostic, HtmlError};
pub use events::{html_to_text, html_to_text_with_config, Events, HtmlEvent};
pub use parser::{Chunk, HtmlParser, ParseState};
