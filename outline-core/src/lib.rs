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

//! Undo/redo engine for a cloned-node outline document.
//!
//! A `V` (node) carries a headline and a body and may appear at several
//! `Position`s in the outline at once; editing one appearance edits the
//! shared `V`. [`UndoManager`] records every reversible action against
//! this graph as a [`Bead`](bead::Bead) on a [`BeadStack`], supports
//! unlimited undo/redo, groups several beads into one logical action, and
//! coalesces consecutive typing edits per a configurable
//! [`Granularity`](granularity::Granularity).
//!
//! The engine never touches a real tree, text widget, or menu directly —
//! it only calls through the narrow traits in [`host`]. [`host::testkit`]
//! ships in-memory reference implementations of all of them, used by this
//! crate's own tests and by `outline-cli`.

pub mod bead;
pub mod bead_stack;
pub mod error;
pub mod granularity;
pub mod host;
pub mod null_undo_manager;
pub mod text_diff;
pub mod tree_snapshot;
pub mod undo_manager;

#[cfg(test)]
mod proptest_invariants;

pub use bead::{Bead, BeadKind, BeadPayload};
pub use bead_stack::BeadStack;
pub use error::UndoWarning;
pub use granularity::Granularity;
pub use null_undo_manager::NullUndoManager;
pub use text_diff::TextDiff;
pub use tree_snapshot::TreeSnapshot;
pub use undo_manager::{Bunch, UndoEngine, UndoManager};
