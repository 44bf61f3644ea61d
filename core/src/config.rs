/*
 * config.rs
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

//! Parser settings. Nothing is persisted; hosts build a config per conversion or use the default.

/// Maximum bytes pulled from the input per refill.
pub const DEFAULT_LINE_LIMIT: usize = 8192;

/// Width of the rule emitted for `<hr>`.
pub const DEFAULT_RULE_WIDTH: usize = 48;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    /// Upper bound on one raw line read from the input. Longer lines are read in pieces.
    pub line_limit: usize,
    /// Text emitted on its own line for `<hr>` (a newline is appended).
    pub horizontal_rule: String,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            line_limit: DEFAULT_LINE_LIMIT,
            horizontal_rule: "-".repeat(DEFAULT_RULE_WIDTH),
        }
    }
}

impl ParserConfig {
    /// Zero is clamped to 1.
    pub fn with_line_limit(mut self, limit: usize) -> Self {
        self.line_limit = limit.max(1);
        self
    }

    pub fn with_horizontal_rule(mut self, rule: impl Into<String>) -> Self {
        self.horizontal_rule = rule.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ParserConfig::default();
        assert_eq!(config.line_limit, 8192);
        assert_eq!(config.horizontal_rule.len(), 48);
        assert!(config.horizontal_rule.chars().all(|c| c == '-'));
    }

    #[test]
    fn builder() {
        let config = ParserConfig::default().with_line_limit(0).with_horizontal_rule("====");
        assert_eq!(config.line_limit, 1);
        assert_eq!(config.horizontal_rule, "====");
    }
}
