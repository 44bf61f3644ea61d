/*
 * parser.rs
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

//! HTML parser: pull contract, parse() returns the next chunk of plain text, split at
//! line ends of the input and at hyperlink boundaries.

use std::io::BufRead;

use crate::config::ParserConfig;
use crate::html::buffer::RawBuffer;
use crate::html::charset::CharsetConverter;
use crate::html::entities::{numeric_value, EntityTable};
use crate::html::error::{Diagnostic, HtmlError};
use crate::html::events::Events;
use crate::html::output::TextAccumulator;
use crate::html::reader::{LineReader, LineStatus};
use crate::html::tag::{parse_tag, tag_action, ParsedTag, TagAction};

/// Position of the `;` relative to `&` must not exceed this.
const MAX_ENTITY_SEMICOLON: usize = 7;

/// Diagnostics kept per parser; later ones are only logged.
const MAX_DIAGNOSTICS: usize = 256;

/// Characters of malformed tag text kept in a diagnostic.
const DIAGNOSTIC_EXCERPT: usize = 64;

/// Last transition made by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
    Normal,
    Eof,
    ConvFailed,
    Unknown,
    /// `<a href=...>` seen; the chunk ends here.
    HrefBegin,
    /// `</a>` seen; the chunk ends here.
    Href,
    Par,
    Pre,
    Br,
    Hr,
}

/// One piece of converted text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    text: String,
    href: Option<String>,
    state: ParseState,
}

impl Chunk {
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Hyperlink target that was active while this text was produced.
    pub fn href(&self) -> Option<&str> {
        self.href.as_deref()
    }

    pub fn state(&self) -> ParseState {
        self.state
    }

    /// The chunk ended because a link opened.
    pub fn is_link_start(&self) -> bool {
        self.state == ParseState::HrefBegin
    }

    /// The chunk ended because a link closed.
    pub fn is_link_end(&self) -> bool {
        self.state == ParseState::Href
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

enum TagEffect {
    Continue,
    LinkStart { previous: Option<String> },
    LinkEnd { closed: Option<String> },
}

/// Streaming HTML to plain text converter for one body.
pub struct HtmlParser<'a, R> {
    reader: LineReader<R>,
    conv: &'a dyn CharsetConverter,
    entities: &'static EntityTable,
    buf: RawBuffer,
    out: TextAccumulator,
    href: Option<String>,
    state: ParseState,
    rule: String,
    diagnostics: Vec<Diagnostic>,
}

impl<'a, R: BufRead> HtmlParser<'a, R> {
    pub fn new(input: R, conv: &'a dyn CharsetConverter) -> Self {
        Self::with_config(input, conv, &ParserConfig::default())
    }

    pub fn with_config(input: R, conv: &'a dyn CharsetConverter, config: &ParserConfig) -> Self {
        Self {
            reader: LineReader::new(input, config.line_limit),
            conv,
            entities: EntityTable::shared(),
            buf: RawBuffer::new(),
            out: TextAccumulator::new(),
            href: None,
            state: ParseState::Normal,
            rule: config.horizontal_rule.clone(),
            diagnostics: Vec::new(),
        }
    }

    pub fn state(&self) -> ParseState {
        self.state
    }

    /// Currently open hyperlink target, if any.
    pub fn href(&self) -> Option<&str> {
        self.href.as_deref()
    }

    pub fn is_preformatted(&self) -> bool {
        self.out.is_preformatted()
    }

    /// Soft errors met so far (at most 256 are kept).
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Iterate over text and link events instead of chunks.
    pub fn events(&mut self) -> Events<'_, 'a, R> {
        Events::new(self)
    }

    pub fn into_inner(self) -> R {
        self.reader.into_inner()
    }

    /// Next chunk of text, or None at end of input.
    ///
    /// A chunk ends at the end of each input line that produced text, and whenever a
    /// link opens or closes. Chunks ending at a link boundary may be empty.
    pub fn parse(&mut self) -> Result<Option<Chunk>, HtmlError> {
        self.state = ParseState::Normal;
        self.out.take();

        loop {
            let c = match self.buf.peek() {
                Some(c) => c,
                None => {
                    if !self.out.is_empty() {
                        let href = self.href.clone();
                        return Ok(Some(self.chunk(href)));
                    }
                    self.buf.clear();
                    if self.read_line()? == LineStatus::Eof {
                        return Ok(None);
                    }
                    continue;
                }
            };
            match c {
                '<' => match self.handle_tag()? {
                    TagEffect::Continue => {}
                    TagEffect::LinkStart { previous } => return Ok(Some(self.chunk(previous))),
                    TagEffect::LinkEnd { closed } => return Ok(Some(self.chunk(closed))),
                },
                '&' => self.handle_entity()?,
                ' ' | '\t' | '\r' | '\n' => {
                    if c == '\r' && self.buf.peek_second() == Some('\n') {
                        self.buf.advance(1);
                    }
                    if self.out.is_preformatted() {
                        if let Some(c) = self.buf.advance_char() {
                            self.out.push_char(c);
                        }
                    } else {
                        self.buf.advance(1);
                        self.out.whitespace();
                    }
                }
                _ => {
                    self.buf.advance(c.len_utf8());
                    self.out.push_char(c);
                }
            }
        }
    }

    fn chunk(&mut self, href: Option<String>) -> Chunk {
        Chunk {
            text: self.out.take(),
            href,
            state: self.state,
        }
    }

    fn read_line(&mut self) -> Result<LineStatus, HtmlError> {
        let status = self.reader.read_line(self.conv, &mut self.buf)?;
        match status {
            LineStatus::Line => {}
            LineStatus::Degraded => {
                self.state = ParseState::ConvFailed;
                self.report(Diagnostic::SoftConversion {
                    line: self.reader.line_number(),
                });
            }
            LineStatus::Eof => self.state = ParseState::Eof,
        }
        Ok(status)
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        match &diagnostic {
            Diagnostic::UnresolvedEntity { .. } => log::debug!("html: {}", diagnostic),
            _ => log::warn!("html: {}", diagnostic),
        }
        if self.diagnostics.len() < MAX_DIAGNOSTICS {
            self.diagnostics.push(diagnostic);
        }
    }

    fn report_malformed(&mut self, text: &str) {
        let text = text.chars().take(DIAGNOSTIC_EXCERPT).collect();
        self.report(Diagnostic::MalformedTag { text });
    }

    /// Text between `<` and the matching `>`, refilling as needed. Comments, style and
    /// script blocks are skipped whole and yield None, as does a tag cut off by end of input.
    fn extract_tag(&mut self) -> Result<Option<String>, HtmlError> {
        if self.buf.starts_with("<!--") {
            self.buf.advance(4);
            self.skip_past("-->", false)?;
            return Ok(None);
        }
        if self.buf.starts_with_ignore_ascii_case("<style") {
            self.buf.advance(6);
            self.skip_past("</style>", true)?;
            return Ok(None);
        }
        if self.buf.starts_with_ignore_ascii_case("<script") {
            self.buf.advance(7);
            self.skip_past("</script>", true)?;
            return Ok(None);
        }

        self.buf.advance(1);
        let mut from = 0;
        loop {
            if let Some(i) = self.buf.find(">", from, false) {
                let text = self.buf.rest()[..i].to_string();
                self.buf.advance(i + 1);
                return Ok(Some(text));
            }
            from = self.buf.remaining();
            if self.read_line()? == LineStatus::Eof {
                // Drop the '<'; what follows is treated as text.
                let rest = self.buf.rest().to_string();
                self.report_malformed(&rest);
                return Ok(None);
            }
        }
    }

    /// Move the cursor past `needle`; at end of input, consume everything.
    fn skip_past(&mut self, needle: &str, ignore_ascii_case: bool) -> Result<(), HtmlError> {
        let mut from = 0;
        loop {
            if let Some(i) = self.buf.find(needle, from, ignore_ascii_case) {
                self.buf.advance(i + needle.len());
                return Ok(());
            }
            // A match may straddle the refill point.
            from = self.buf.remaining().saturating_sub(needle.len() - 1);
            if self.read_line()? == LineStatus::Eof {
                self.buf.skip_to_end();
                return Ok(());
            }
        }
    }

    fn handle_tag(&mut self) -> Result<TagEffect, HtmlError> {
        let text = self.extract_tag()?;
        self.state = ParseState::Unknown;
        let tag = match text.as_deref().map(parse_tag) {
            Some(ParsedTag::Complete(tag)) => tag,
            Some(ParsedTag::Partial(tag)) => {
                self.report_malformed(text.as_deref().unwrap_or(""));
                tag
            }
            Some(ParsedTag::None) | None => return Ok(TagEffect::Continue),
        };
        let action = match tag_action(&tag.name) {
            Some(action) => action,
            None => return Ok(TagEffect::Continue),
        };

        match action {
            TagAction::LineBreak => {
                self.out.clear_space();
                self.out.push_char('\n');
                self.state = ParseState::Br;
            }
            TagAction::LinkOpen => {
                if let Some(href) = tag.attribute("href") {
                    log::debug!("html: link open {}", href);
                    let previous = self.href.replace(href.to_string());
                    self.state = ParseState::HrefBegin;
                    return Ok(TagEffect::LinkStart { previous });
                }
            }
            TagAction::LinkClose => {
                self.state = ParseState::Href;
                return Ok(TagEffect::LinkEnd {
                    closed: self.href.take(),
                });
            }
            TagAction::Paragraph => {
                self.out.ensure_blank_line();
                self.state = ParseState::Par;
            }
            TagAction::PreOpen => {
                self.out.set_preformatted(true);
                self.state = ParseState::Pre;
            }
            TagAction::PreClose => {
                self.out.set_preformatted(false);
                self.state = ParseState::Normal;
            }
            TagAction::Rule => {
                self.out.ensure_line_start();
                self.out.push_str(&self.rule);
                self.out.push_char('\n');
                self.state = ParseState::Hr;
            }
            TagAction::LineStart => {
                self.out.ensure_line_start();
                self.state = ParseState::Normal;
            }
            TagAction::BlankLine => {
                self.out.ensure_blank_line();
                self.state = ParseState::Normal;
            }
        }
        Ok(TagEffect::Continue)
    }

    /// At `&`: resolve `&name;` / `&#NNN;`, or emit the text unchanged.
    fn handle_entity(&mut self) -> Result<(), HtmlError> {
        self.fill_entity_window()?;
        let rest = self.buf.rest();
        let len = match rest
            .bytes()
            .take(MAX_ENTITY_SEMICOLON + 1)
            .position(|b| b == b';')
        {
            Some(i) => i + 1,
            None => {
                self.buf.advance(1);
                self.out.push_char('&');
                return Ok(());
            }
        };
        let token = rest[..len].to_string();
        self.buf.advance(len);

        if let Some(value) = self.entities.lookup(&token) {
            self.out.push_str(value);
            return Ok(());
        }
        if let Some(code) = numeric_value(&token) {
            let direct = (1..=127).contains(&code) || ((128..=255).contains(&code) && self.conv.is_latin1());
            if direct {
                if let Some(c) = char::from_u32(code) {
                    self.out.push_char(c);
                    return Ok(());
                }
            }
            if let Some(value) = self.entities.code_point(code) {
                self.out.push_str(value);
                return Ok(());
            }
        }
        self.out.push_str(&token);
        self.report(Diagnostic::UnresolvedEntity { token });
        Ok(())
    }

    /// Refill until the `;` window after `&` lies within the buffer, or the line ends there.
    fn fill_entity_window(&mut self) -> Result<(), HtmlError> {
        loop {
            let rest = self.buf.rest();
            if rest.len() > MAX_ENTITY_SEMICOLON || rest.ends_with('\n') || rest.contains(';') {
                return Ok(());
            }
            let state = self.state;
            if self.read_line()? == LineStatus::Eof {
                self.state = state;
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::charset::EncodingConverter;

    fn chunks(html: &str) -> Vec<Chunk> {
        let conv = EncodingConverter::utf8();
        let mut parser = HtmlParser::new(html.as_bytes(), &conv);
        let mut out = Vec::new();
        while let Some(chunk) = parser.parse().unwrap() {
            out.push(chunk);
        }
        assert_eq!(parser.state(), ParseState::Eof);
        out
    }

    fn text(html: &str) -> String {
        chunks(html).into_iter().map(Chunk::into_text).collect()
    }

    #[test]
    fn inline_markup_and_entity() {
        assert_eq!(text("<b>Hello</b> &amp; <i>World</i>"), "Hello & World");
    }

    #[test]
    fn line_break() {
        assert_eq!(text("Line1<br>Line2"), "Line1\nLine2");
        assert_eq!(text("Line1 <BR/> Line2"), "Line1\nLine2");
    }

    #[test]
    fn paragraphs_separated_by_one_blank_line() {
        assert_eq!(text("<p>A</p><p>B</p>"), "A\n\nB");
        assert_eq!(text("A<br><br><p>B"), "A\n\nB");
    }

    #[test]
    fn link_chunks() {
        let chunks = chunks("<a href=\"http://x/\">click</a> here");
        let texts: Vec<(&str, Option<&str>)> = chunks.iter().map(|c| (c.text(), c.href())).collect();
        assert_eq!(
            texts,
            vec![("", None), ("click", Some("http://x/")), (" here", None)]
        );
        assert!(chunks[0].is_link_start());
        assert!(chunks[1].is_link_end());
        assert_eq!(chunks[2].state(), ParseState::Normal);
    }

    #[test]
    fn anchor_without_href_is_ignored() {
        let chunks = chunks("<a name=top>x</a>y");
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].text(), "x");
        assert_eq!(chunks[0].href(), None);
        assert_eq!(chunks[1].text(), "y");
    }

    #[test]
    fn preformatted() {
        assert_eq!(
            text("<pre>  two   spaces\n\tTAB</pre>   out   side"),
            "  two   spaces\n\tTAB out side"
        );
        assert_eq!(text("<pre>a\r\nb</pre>"), "a\nb");
    }

    #[test]
    fn whitespace_collapses() {
        assert_eq!(text("  one \t two\r\nthree\n"), "one two three");
    }

    #[test]
    fn numeric_references() {
        assert_eq!(text("&#65;&#8212;&#8364;"), "A--EUR");
        assert_eq!(text("&#9999999;"), "&#9999999;");
        assert_eq!(text("&#9999;"), "&#9999;");
        assert_eq!(text("&#233;"), "&#233;");
    }

    #[test]
    fn latin1_numeric_range() {
        let conv = EncodingConverter::latin1();
        let mut parser = HtmlParser::new(&b"caf&#233;"[..], &conv);
        let chunk = parser.parse().unwrap().unwrap();
        assert_eq!(chunk.text(), "caf\u{e9}");
    }

    #[test]
    fn bare_ampersand() {
        assert_eq!(text("fish & chips"), "fish & chips");
        assert_eq!(text("a&b"), "a&b");
    }

    #[test]
    fn unresolved_entity_is_kept() {
        let conv = EncodingConverter::utf8();
        let mut parser = HtmlParser::new(&b"&bogus;"[..], &conv);
        assert_eq!(parser.parse().unwrap().unwrap().text(), "&bogus;");
        assert_eq!(
            parser.diagnostics(),
            &[Diagnostic::UnresolvedEntity {
                token: "&bogus;".to_string()
            }]
        );
    }

    #[test]
    fn skipped_blocks() {
        assert_eq!(text("<style>body{color:red}</style>rest"), "rest");
        assert_eq!(text("a<!-- <b>hidden</b> -->b"), "ab");
        assert_eq!(text("<SCRIPT>if (a < b) {}</Script>x"), "x");
        assert_eq!(text("<!DOCTYPE html><html>x</html>"), "x");
    }

    #[test]
    fn blocks_spanning_lines() {
        assert_eq!(text("a<!--\nline\nline\n-->b"), "ab");
        assert_eq!(text("<style>\np { }\n</style>\nrest"), "rest");
        assert_eq!(text("x<!-- never closed\nmore\n"), "x");
    }

    #[test]
    fn tag_split_across_lines() {
        let chunks = chunks("Hello <a\nhref=\"http://x/\">link</a>");
        assert_eq!(chunks[0].text(), "Hello");
        assert_eq!(chunks[1].text(), " link");
        assert_eq!(chunks[1].href(), Some("http://x/"));
    }

    #[test]
    fn tag_split_by_line_limit() {
        let conv = EncodingConverter::utf8();
        let config = ParserConfig::default().with_line_limit(3);
        let mut parser = HtmlParser::with_config(&b"a<br>b<p>c"[..], &conv, &config);
        let mut out = String::new();
        while let Some(chunk) = parser.parse().unwrap() {
            out.push_str(chunk.text());
        }
        assert_eq!(out, "a\nb\n\nc");
    }

    #[test]
    fn unterminated_tag() {
        let conv = EncodingConverter::utf8();
        let mut parser = HtmlParser::new(&b"a <b c"[..], &conv);
        let mut out = String::new();
        while let Some(chunk) = parser.parse().unwrap() {
            out.push_str(chunk.text());
        }
        assert_eq!(out, "a b c");
        assert!(matches!(parser.diagnostics()[0], Diagnostic::MalformedTag { .. }));
    }

    #[test]
    fn unterminated_attribute_quote() {
        let conv = EncodingConverter::utf8();
        let mut parser = HtmlParser::new(&b"<br class=\"x>after"[..], &conv);
        assert_eq!(parser.parse().unwrap().unwrap().text(), "\nafter");
        assert!(matches!(parser.diagnostics()[0], Diagnostic::MalformedTag { .. }));
    }

    #[test]
    fn horizontal_rule_and_blocks() {
        let rule = "-".repeat(48);
        assert_eq!(text("a<hr>b"), format!("a\n{}\nb", rule));
        assert_eq!(text("<div>a</div><div>b</div>"), "a\nb\n");
        assert_eq!(text("<h1>Title</h1>Body"), "Title\n\nBody");
        assert_eq!(
            text("<table><tr><td>1</td></tr><tr><td>2</td></tr></table>after"),
            "1\n2\n\nafter"
        );
        assert_eq!(text("<ul><li>one</li><li>two</li></ul>"), "one\ntwo\n");
    }

    #[test]
    fn soft_conversion_error() {
        let conv = EncodingConverter::utf8();
        let mut parser = HtmlParser::new(&b"caf\xe9\n"[..], &conv);
        let chunk = parser.parse().unwrap().unwrap();
        assert_eq!(chunk.text(), "caf\u{FFFD}");
        assert_eq!(parser.diagnostics(), &[Diagnostic::SoftConversion { line: 1 }]);
        assert!(parser.parse().unwrap().is_none());
    }

    #[test]
    fn entity_split_by_line_limit() {
        let conv = EncodingConverter::utf8();
        let config = ParserConfig::default().with_line_limit(4);
        let mut parser = HtmlParser::with_config(&b"x&amp;y &#8212;z"[..], &conv, &config);
        let mut out = String::new();
        while let Some(chunk) = parser.parse().unwrap() {
            out.push_str(chunk.text());
        }
        assert_eq!(out, "x&y --z");
        assert!(parser.diagnostics().is_empty());
    }

    #[test]
    fn ampersand_at_end_of_input() {
        assert_eq!(text("tom &amp"), "tom &amp");
        assert_eq!(text("a&"), "a&");
    }

    #[test]
    fn semicolon_window_edge() {
        let conv = EncodingConverter::utf8();
        let mut parser = HtmlParser::new(&b"&abcdef;"[..], &conv);
        assert_eq!(parser.parse().unwrap().unwrap().text(), "&abcdef;");
        assert_eq!(
            parser.diagnostics(),
            &[Diagnostic::UnresolvedEntity {
                token: "&abcdef;".to_string()
            }]
        );

        let mut parser = HtmlParser::new(&b"&abcdefg;"[..], &conv);
        assert_eq!(parser.parse().unwrap().unwrap().text(), "&abcdefg;");
        assert!(parser.diagnostics().is_empty());
    }
}
