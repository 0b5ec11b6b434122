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

//! Incremental representation of a typing edit.

use similar::{ChangeTag, TextDiff as SimilarDiff};

/// Leading/trailing common-line counts plus the two unmatched middle
/// blocks and the trailing-newline counts on each side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextDiff {
    pub leading: usize,
    pub trailing: usize,
    pub old_middle_lines: Vec<String>,
    pub new_middle_lines: Vec<String>,
    pub old_newlines: usize,
    pub new_newlines: usize,
}

fn split_lines(text: &str) -> Vec<String> {
    text.split('\n').map(|s| s.to_string()).collect()
}

fn count_trailing_newlines(text: &str) -> usize {
    text.chars().rev().take_while(|&c| c == '\n').count()
}

impl TextDiff {
    /// Computes the diff between `old_text` and `new_text`.
    ///
    /// `old_sel`/`new_sel` are accepted for symmetry with the spec's
    /// `setUndoTypingParams` signature but do not affect the diff itself —
    /// they are consulted by [`crate::granularity`] separately.
    pub fn compute(
        old_text: &str,
        new_text: &str,
        _old_sel: (usize, usize),
        _new_sel: (usize, usize),
    ) -> Self {
        let old_lines = split_lines(old_text);
        let new_lines = split_lines(new_text);
        let max_match = old_lines.len().min(new_lines.len());

        let mut leading = 0;
        while leading < max_match && old_lines[leading] == new_lines[leading] {
            leading += 1;
        }

        let mut trailing = 0;
        while trailing < max_match - leading
            && old_lines[old_lines.len() - 1 - trailing] == new_lines[new_lines.len() - 1 - trailing]
        {
            trailing += 1;
        }

        let old_middle_lines = old_lines[leading..old_lines.len() - trailing].to_vec();
        let new_middle_lines = new_lines[leading..new_lines.len() - trailing].to_vec();

        Self {
            leading,
            trailing,
            old_middle_lines,
            new_middle_lines,
            old_newlines: count_trailing_newlines(old_text),
            new_newlines: count_trailing_newlines(new_text),
        }
    }

    /// Reconstructs text by splicing `middle_lines`/`newlines` (one side of
    /// the diff) into the line structure of `current_text`, per §4.3.
    pub fn reconstruct(&self, current_text: &str, middle_lines: &[String], newlines: usize) -> String {
        let body = split_lines(current_text);
        let keep_tail_from = body.len().saturating_sub(self.trailing);

        let mut result_lines = Vec::with_capacity(self.leading + middle_lines.len() + self.trailing);
        result_lines.extend_from_slice(&body[..self.leading.min(body.len())]);
        result_lines.extend_from_slice(middle_lines);
        if keep_tail_from <= body.len() {
            result_lines.extend_from_slice(&body[keep_tail_from..]);
        }

        let mut result = result_lines.join("\n");
        while result.ends_with('\n') {
            result.pop();
        }
        for _ in 0..newlines {
            result.push('\n');
        }
        result
    }

    pub fn reconstruct_old(&self, current_text: &str) -> String {
        self.reconstruct(current_text, &self.old_middle_lines, self.old_newlines)
    }

    pub fn reconstruct_new(&self, current_text: &str) -> String {
        self.reconstruct(current_text, &self.new_middle_lines, self.new_newlines)
    }
}

/// One-line unified-diff-style summary, used only for `tracing::debug!`
/// breadcrumbs around typing beads — never consulted for correctness.
///
/// Built on `similar::TextDiff` the same way the teacher's `file_watcher`
/// module renders line changes for its merge log.
pub fn debug_summary(old_text: &str, new_text: &str) -> String {
    let diff = SimilarDiff::from_lines(old_text, new_text);
    let mut changed = 0usize;
    for change in diff.iter_all_changes() {
        if change.tag() != ChangeTag::Equal {
            changed += 1;
        }
    }
    format!("{changed} changed line(s)")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_text_has_no_middle() {
        let diff = TextDiff::compute("same", "same", (0, 0), (0, 0));
        assert!(diff.old_middle_lines.is_empty());
        assert!(diff.new_middle_lines.is_empty());
    }

    #[test]
    fn single_char_insert_in_middle() {
        let diff = TextDiff::compute("ac", "abc", (0, 1), (0, 2));
        assert_eq!(diff.old_middle_lines, vec!["ac".to_string()]);
        assert_eq!(diff.new_middle_lines, vec!["abc".to_string()]);
    }

    #[test]
    fn appending_a_line_keeps_leading_and_grows_middle() {
        let diff = TextDiff::compute("one\ntwo", "one\ntwo\nthree", (0, 0), (0, 0));
        assert_eq!(diff.leading, 1);
        assert_eq!(
            diff.new_middle_lines,
            vec!["two".to_string(), "three".to_string()]
        );
    }

    #[test]
    fn reconstruct_round_trips_old_and_new() {
        let old_text = "alpha\nbeta\ngamma";
        let new_text = "alpha\nBETA\ngamma";
        let diff = TextDiff::compute(old_text, new_text, (0, 0), (0, 0));
        assert_eq!(diff.reconstruct_new(old_text), new_text);
        assert_eq!(diff.reconstruct_old(new_text), old_text);
    }

    #[test]
    fn debug_summary_counts_changed_lines() {
        let summary = debug_summary("a\nb\nc", "a\nB\nc");
        assert!(summary.contains("changed"));
    }
}
