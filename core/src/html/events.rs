/*
 * events.rs
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

//! Event view of the chunk stream: text runs and balanced link start/end markers.

use std::collections::VecDeque;
use std::io::BufRead;
use std::iter::FusedIterator;

use crate::config::ParserConfig;
use crate::html::charset::CharsetConverter;
use crate::html::error::HtmlError;
use crate::html::parser::{Chunk, HtmlParser};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HtmlEvent {
    /// Non-empty run of plain text.
    Text(String),
    /// A hyperlink span begins; text up to the matching `LinkEnd` is its anchor text.
    LinkStart(String),
    LinkEnd,
}

/// Iterator returned by [`HtmlParser::events`]. Finite and not restartable.
pub struct Events<'p, 'a, R> {
    parser: &'p mut HtmlParser<'a, R>,
    pending: VecDeque<HtmlEvent>,
    in_link: bool,
    finished: bool,
}

impl<'p, 'a, R: BufRead> Events<'p, 'a, R> {
    pub(crate) fn new(parser: &'p mut HtmlParser<'a, R>) -> Self {
        let mut pending = VecDeque::new();
        if let Some(href) = parser.href() {
            pending.push_back(HtmlEvent::LinkStart(href.to_string()));
        }
        Self {
            in_link: !pending.is_empty(),
            parser,
            pending,
            finished: false,
        }
    }

    fn queue_chunk(&mut self, chunk: Chunk) {
        let is_start = chunk.is_link_start();
        let is_end = chunk.is_link_end();
        let text = chunk.into_text();
        if !text.is_empty() {
            self.pending.push_back(HtmlEvent::Text(text));
        }
        if is_start {
            if self.in_link {
                self.pending.push_back(HtmlEvent::LinkEnd);
            }
            if let Some(href) = self.parser.href() {
                self.pending.push_back(HtmlEvent::LinkStart(href.to_string()));
                self.in_link = true;
            }
        } else if is_end && self.in_link {
            self.pending.push_back(HtmlEvent::LinkEnd);
            self.in_link = false;
        }
    }
}

impl<'p, 'a, R: BufRead> Iterator for Events<'p, 'a, R> {
    type Item = Result<HtmlEvent, HtmlError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Some(Ok(event));
            }
            if self.finished {
                return None;
            }
            match self.parser.parse() {
                Ok(Some(chunk)) => self.queue_chunk(chunk),
                Ok(None) => {
                    self.finished = true;
                    if self.in_link {
                        self.in_link = false;
                        self.pending.push_back(HtmlEvent::LinkEnd);
                    }
                }
                Err(e) => {
                    self.finished = true;
                    self.pending.clear();
                    return Some(Err(e));
                }
            }
        }
    }
}

impl<'p, 'a, R: BufRead> FusedIterator for Events<'p, 'a, R> {}

/// Convert a whole HTML body to plain text. Link targets are dropped; anchor text is kept.
pub fn html_to_text<R: BufRead>(input: R, conv: &dyn CharsetConverter) -> Result<String, HtmlError> {
    html_to_text_with_config(input, conv, &ParserConfig::default())
}

pub fn html_to_text_with_config<R: BufRead>(
    input: R,
    conv: &dyn CharsetConverter,
    config: &ParserConfig,
) -> Result<String, HtmlError> {
    let mut parser = HtmlParser::with_config(input, conv, config);
    let mut text = String::new();
    while let Some(chunk) = parser.parse()? {
        text.push_str(chunk.text());
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::charset::EncodingConverter;

    fn events(html: &str) -> Vec<HtmlEvent> {
        let conv = EncodingConverter::utf8();
        let mut parser = HtmlParser::new(html.as_bytes(), &conv);
        let events: Result<Vec<_>, _> = parser.events().collect();
        events.unwrap()
    }

    #[test]
    fn text_link_text() {
        assert_eq!(
            events("Go <a href=\"http://x/\">click</a> here"),
            vec![
                HtmlEvent::Text("Go".to_string()),
                HtmlEvent::LinkStart("http://x/".to_string()),
                HtmlEvent::Text(" click".to_string()),
                HtmlEvent::LinkEnd,
                HtmlEvent::Text(" here".to_string()),
            ]
        );
    }

    #[test]
    fn stray_close_and_unclosed_link() {
        assert_eq!(
            events("a</a><a href=u>b"),
            vec![
                HtmlEvent::Text("a".to_string()),
                HtmlEvent::LinkStart("u".to_string()),
                HtmlEvent::Text("b".to_string()),
                HtmlEvent::LinkEnd,
            ]
        );
    }

    #[test]
    fn nested_open_closes_previous() {
        assert_eq!(
            events("<a href=1>x<a href=2>y</a>"),
            vec![
                HtmlEvent::LinkStart("1".to_string()),
                HtmlEvent::Text("x".to_string()),
                HtmlEvent::LinkEnd,
                HtmlEvent::LinkStart("2".to_string()),
                HtmlEvent::Text("y".to_string()),
                HtmlEvent::LinkEnd,
            ]
        );
    }

    #[test]
    fn fused_after_end() {
        let conv = EncodingConverter::utf8();
        let mut parser = HtmlParser::new(&b"x"[..], &conv);
        let mut events = parser.events();
        assert_eq!(events.next().unwrap().unwrap(), HtmlEvent::Text("x".to_string()));
        assert!(events.next().is_none());
        assert!(events.next().is_none());
    }

    #[test]
    fn events_after_link_opened() {
        let conv = EncodingConverter::utf8();
        let mut parser = HtmlParser::new(&b"<a href=u>x</a>y"[..], &conv);
        assert!(parser.parse().unwrap().unwrap().is_link_start());
        let events: Vec<_> = parser.events().map(Result::unwrap).collect();
        assert_eq!(
            events,
            vec![
                HtmlEvent::LinkStart("u".to_string()),
                HtmlEvent::Text("x".to_string()),
                HtmlEvent::LinkEnd,
                HtmlEvent::Text("y".to_string()),
            ]
        );
    }

    #[test]
    fn whole_body() {
        let conv = EncodingConverter::utf8();
        let text = html_to_text(&b"<p>Hi <a href=x>there</a>,</p><p>bye</p>"[..], &conv).unwrap();
        assert_eq!(text, "Hi there,\n\nbye");
    }
}
