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

//! Non-fatal warning taxonomy (§7).
//!
//! Nothing at the engine level is fatal: every variant here is logged via
//! `tracing` and never returned as a hard `Result::Err` from `undo`/`redo`.
//! Manual `Display`/`Error` impls, matching the teacher's own
//! `JuliaRuntimeError` rather than pulling in `thiserror`.

use std::fmt;

use crate::bead::BeadKind;

#[derive(Debug, Clone)]
pub enum UndoWarning {
    /// `afterX` called without a matching `beforeX`, or a group close with
    /// the top-of-stack not a `BeforeGroup`.
    ProtocolMisuse { detail: String },
    /// A bead handler panicked during undo/redo.
    ReplayFailure { kind: BeadKind, label: String },
    /// A bead has no handler registered for its kind.
    MissingHandler { kind: BeadKind },
    /// The stored position no longer resolves.
    StalePosition { kind: BeadKind, label: String },
    /// Malformed input (bad label, unrecognized granularity) fell back to
    /// a default.
    InvalidInput { detail: String },
}

impl fmt::Display for UndoWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UndoWarning::ProtocolMisuse { detail } => write!(f, "undo protocol misuse: {detail}"),
            UndoWarning::ReplayFailure { kind, label } => {
                write!(f, "replay failure for {kind} bead \"{label}\"")
            }
            UndoWarning::MissingHandler { kind } => write!(f, "no undo/redo handler for {kind} bead"),
            UndoWarning::StalePosition { kind, label } => {
                write!(f, "stale position for {kind} bead \"{label}\"")
            }
            UndoWarning::InvalidInput { detail } => write!(f, "invalid input: {detail}"),
        }
    }
}

impl std::error::Error for UndoWarning {}

/// Logs `warning` at the appropriate level and returns it, so call sites
/// can both record it (e.g. for a test assertion) and let it be consulted
/// by `tracing` subscribers.
pub fn report(warning: UndoWarning) -> UndoWarning {
    match &warning {
        UndoWarning::ReplayFailure { kind, label } => {
            tracing::error!(kind = %kind, label = %label, "{warning}");
        }
        UndoWarning::ProtocolMisuse { .. }
        | UndoWarning::MissingHandler { .. }
        | UndoWarning::StalePosition { .. }
        | UndoWarning::InvalidInput { .. } => {
            tracing::warn!("{warning}");
        }
    }
    warning
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_bead_kind() {
        let warning = UndoWarning::MissingHandler { kind: BeadKind::Sort };
        assert!(warning.to_string().contains("sort"));
    }
}
