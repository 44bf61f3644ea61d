/*
 * tag.rs
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

//! Tag text parsing (`name attr=value ...`) and the tag name to action table.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// A parsed `<...>` token. Name and attribute names are lower-case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    pub attributes: Vec<Attribute>,
}

impl Tag {
    /// First attribute with the given (lower-case) name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }
}

/// Outcome of parsing the text between `<` and `>`.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum ParsedTag {
    /// Empty text, or a declaration such as `<!DOCTYPE html>`.
    None,
    Complete(Tag),
    /// An attribute value quote was never closed; attributes up to it are kept.
    Partial(Tag),
}

/// Parse tag text (without the angle brackets).
pub(crate) fn parse_tag(text: &str) -> ParsedTag {
    let text = text.trim_matches(|c: char| c.is_ascii_whitespace());
    if text.is_empty() || text.starts_with('!') {
        return ParsedTag::None;
    }
    let bytes = text.as_bytes();
    let len = bytes.len();
    let mut pos = bytes.iter().position(u8::is_ascii_whitespace).unwrap_or(len);
    let mut name = &text[..pos];
    // <br/>
    if pos == len && name.len() > 1 && name.ends_with('/') {
        name = &name[..name.len() - 1];
    }
    let mut tag = Tag {
        name: name.to_ascii_lowercase(),
        attributes: Vec::new(),
    };

    while pos < len {
        pos = skip_whitespace(bytes, pos);
        let name_start = pos;
        while pos < len && !bytes[pos].is_ascii_whitespace() && bytes[pos] != b'=' {
            pos += 1;
        }
        let name_end = pos;
        pos = skip_whitespace(bytes, pos);

        let value = if pos < len && bytes[pos] == b'=' {
            pos = skip_whitespace(bytes, pos + 1);
            match bytes.get(pos) {
                Some(&quote) if quote == b'"' || quote == b'\'' => {
                    let start = pos + 1;
                    let end = match bytes[start..].iter().position(|&b| b == quote) {
                        Some(i) => start + i,
                        None => return ParsedTag::Partial(tag),
                    };
                    pos = skip_whitespace(bytes, end + 1);
                    &text[start..end]
                }
                _ => {
                    let start = pos;
                    while pos < len && !bytes[pos].is_ascii_whitespace() {
                        pos += 1;
                    }
                    &text[start..pos]
                }
            }
        } else {
            ""
        };

        let attr_name = text[name_start..name_end].trim_end();
        if attr_name == "/" && value.is_empty() {
            continue;
        }
        tag.attributes.push(Attribute {
            name: attr_name.to_ascii_lowercase(),
            value: value.to_string(),
        });
    }
    ParsedTag::Complete(tag)
}

fn skip_whitespace(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
        pos += 1;
    }
    pos
}

/// What a recognized tag does to the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TagAction {
    /// `br`: hard line break.
    LineBreak,
    /// `a`: opens a hyperlink span when an href is present.
    LinkOpen,
    /// `/a`
    LinkClose,
    /// `p`: blank line before the paragraph.
    Paragraph,
    PreOpen,
    PreClose,
    /// `hr`: rule on a line of its own.
    Rule,
    /// Block start or end: begin a new line.
    LineStart,
    /// `/table`, `/hN`: blank line after the block.
    BlankLine,
}

const TAG_ACTIONS: &[(&str, TagAction)] = &[
    ("br", TagAction::LineBreak),
    ("a", TagAction::LinkOpen),
    ("/a", TagAction::LinkClose),
    ("p", TagAction::Paragraph),
    ("pre", TagAction::PreOpen),
    ("/pre", TagAction::PreClose),
    ("hr", TagAction::Rule),
    ("div", TagAction::LineStart),
    ("ul", TagAction::LineStart),
    ("li", TagAction::LineStart),
    ("table", TagAction::LineStart),
    ("tr", TagAction::LineStart),
    ("/table", TagAction::BlankLine),
    ("/div", TagAction::LineStart),
    ("/ul", TagAction::LineStart),
    ("/li", TagAction::LineStart),
];

/// Look up the action for a lower-case tag name. Headings match on `h` + digit prefix.
pub(crate) fn tag_action(name: &str) -> Option<TagAction> {
    if let Some(&(_, action)) = TAG_ACTIONS.iter().find(|(n, _)| *n == name) {
        return Some(action);
    }
    if is_heading(name) {
        return Some(TagAction::LineStart);
    }
    match name.strip_prefix('/') {
        Some(inner) if is_heading(inner) => Some(TagAction::BlankLine),
        _ => None,
    }
}

fn is_heading(name: &str) -> bool {
    let b = name.as_bytes();
    b.len() >= 2 && b[0] == b'h' && b[1].is_ascii_digit()
}
