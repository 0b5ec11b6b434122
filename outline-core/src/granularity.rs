// Copyright (C) 2025 Ryan Daum <ryan.daum@gmail.com> This program is free
// software: you can redistribute it and/or modify it under the terms of the GNU
// General Public License as published by the Free Software Foundation, version
// 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

//! Typing coalescing policy.
//!
//! Decides whether a new typing event extends the topmost typing bead or
//! opens a fresh one. See [`crate::text_diff`] for the diff this policy
//! consults.

use crate::host::node::NodeId;
use crate::text_diff::TextDiff;

/// `undo_granularity` config values, in the order the spec enumerates them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    Char,
    Line,
    Word,
    Node,
}

impl Granularity {
    /// Falls back to `Line` for any value outside the enumerated set,
    /// silently — used where the caller doesn't want a log side effect
    /// (e.g. tests constructing a known-good value).
    pub fn parse(s: &str) -> Self {
        match s {
            "char" => Granularity::Char,
            "line" => Granularity::Line,
            "word" => Granularity::Word,
            "node" => Granularity::Node,
            _ => Granularity::Line,
        }
    }

    /// Same fall-back as [`Self::parse`], but reports
    /// [`crate::error::UndoWarning::InvalidInput`] when `s` is non-empty and
    /// unrecognized (spec §7, "Invalid input"). An empty string means the
    /// setting is simply unset, not invalid, so it falls back quietly.
    pub fn parse_reporting(s: &str) -> Self {
        let parsed = Self::parse(s);
        if !s.is_empty() && s != parsed.as_str() {
            crate::error::report(crate::error::UndoWarning::InvalidInput { detail: format!("undo_granularity: unrecognized value {s:?}, falling back to {}", parsed.as_str()) });
        }
        parsed
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Granularity::Char => "char",
            Granularity::Line => "line",
            Granularity::Word => "word",
            Granularity::Node => "node",
        }
    }
}

impl Default for Granularity {
    fn default() -> Self {
        Granularity::Line
    }
}

/// Default `recognizeStartOfTypingWord` predicate: the boundary from a word
/// character to whitespace opens a new bead.
pub fn default_recognize_start_of_typing_word(old_ch: char, new_ch: char) -> bool {
    !old_ch.is_whitespace() && new_ch.is_whitespace()
}

/// Inputs needed to decide whether a new typing event extends the previous
/// typing bead.
pub struct ExtendCheck<'a> {
    pub granularity: Granularity,
    pub same_node: bool,
    pub prev_diff: &'a TextDiff,
    pub new_diff: &'a TextDiff,
    /// `(row, col)` of this event's own `old_sel` and `new_sel` — the `word`
    /// granularity's continuation check requires a single typed/deleted
    /// character (a column delta of exactly ±1 on the same row) between
    /// them, not a bulk replace or a cursor jump.
    pub event_old_sel: (usize, usize),
    pub event_new_sel: (usize, usize),
    pub old_ch: Option<char>,
    pub new_ch: Option<char>,
    pub recognize_start_of_typing_word: &'a dyn Fn(char, char) -> bool,
}

/// Decides whether `check` describes a typing event that should extend the
/// previous bead (`true`) instead of opening a new one.
pub fn should_extend(node: NodeId, prev_node: NodeId, check: &ExtendCheck<'_>) -> bool {
    if node != prev_node {
        return false;
    }

    match check.granularity {
        Granularity::Char => false,
        Granularity::Node => check.same_node,
        Granularity::Line => {
            check.same_node
                && check.prev_diff.leading == check.new_diff.leading
                && check.prev_diff.trailing == check.new_diff.trailing
        }
        Granularity::Word => {
            if !check.same_node
                || check.prev_diff.leading != check.new_diff.leading
                || check.prev_diff.trailing != check.new_diff.trailing
            {
                return false;
            }
            let (orow, ocol) = check.event_old_sel;
            let (nrow, ncol) = check.event_new_sel;
            if orow != nrow {
                return false;
            }
            let col_delta = ncol as isize - ocol as isize;
            if col_delta != 1 && col_delta != -1 {
                return false;
            }
            match (check.old_ch, check.new_ch) {
                (Some(old_ch), Some(new_ch)) => {
                    !(check.recognize_start_of_typing_word)(old_ch, new_ch)
                }
                _ => true,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_granularity_falls_back_to_line() {
        assert_eq!(Granularity::parse("bogus"), Granularity::Line);
    }

    #[test]
    fn parse_reporting_falls_back_and_warns_on_unrecognized_value() {
        assert_eq!(Granularity::parse_reporting("bogus"), Granularity::Line);
    }

    #[test]
    fn parse_reporting_falls_back_quietly_on_empty_value() {
        assert_eq!(Granularity::parse_reporting(""), Granularity::Line);
    }

    #[test]
    fn char_granularity_never_extends() {
        let diff = TextDiff::compute("", "a", (0, 0), (0, 1));
        let check = ExtendCheck {
            granularity: Granularity::Char,
            same_node: true,
            prev_diff: &diff,
            new_diff: &diff,
            event_old_sel: (0, 0),
            event_new_sel: (0, 1),
            old_ch: None,
            new_ch: None,
            recognize_start_of_typing_word: &default_recognize_start_of_typing_word,
        };
        let id = crate::host::node::NodeId::default();
        assert!(!should_extend(id, id, &check));
    }

    #[test]
    fn word_boundary_breaks_on_space() {
        let diff = TextDiff::compute("hi", "hi ", (0, 2), (0, 3));
        let check = ExtendCheck {
            granularity: Granularity::Word,
            same_node: true,
            prev_diff: &diff,
            new_diff: &diff,
            event_old_sel: (0, 2),
            event_new_sel: (0, 3),
            old_ch: Some('i'),
            new_ch: Some(' '),
            recognize_start_of_typing_word: &default_recognize_start_of_typing_word,
        };
        let id = crate::host::node::NodeId::default();
        assert!(!should_extend(id, id, &check));
    }
}
