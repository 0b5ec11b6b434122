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

//! The `V`/`Position` vocabulary shared by every host trait.
//!
//! `V` is the content cell; it is owned by the document arena, never by a
//! position. The engine only ever refers to a `V` by its stable
//! [`NodeId`], never by a transient position, so clones survive structural
//! edits elsewhere in the outline.

use slotmap::new_key_type;

new_key_type! {
    /// Stable identity of a `V` (node) inside the host's arena.
    pub struct NodeId;
}

/// Status bits carried by a `V`.
///
/// `marked` and `dirty` are named by the spec explicitly; `changed` tracks
/// document-level modification for convenience on the same struct. `extra`
/// is an open bitfield for host-defined bits the engine never interprets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusBits {
    pub marked: bool,
    pub dirty: bool,
    pub changed: bool,
    pub extra: u32,
}

/// A path through the outline identifying one appearance of a `V`.
///
/// Cheap, clonable, freely duplicated. The original implementation keeps a
/// full ancestor stack (not just the immediate parent) so that `parent()`,
/// `back()`, and `next()` can be resolved without the host having to guess
/// which clone-appearance of an ancestor was meant; this crate keeps that
/// detail (the distilled spec only describes the immediate parent and
/// child-index, but the full stack is what the original actually stores
/// and what makes multi-parent clones unambiguous).
///
/// A position is *stale* once the child at `child_index()` under
/// `parent_vnode()` no longer resolves to `target()` — staleness is
/// detected by the host, not stored here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    target: NodeId,
    /// Ancestors from the outline root down to (but excluding) `target`:
    /// each entry is `(ancestor_v, child_index_of_next_step)`.
    stack: Vec<(NodeId, usize)>,
}

impl Position {
    pub fn root(target: NodeId) -> Self {
        Self {
            target,
            stack: Vec::new(),
        }
    }

    pub(crate) fn with_stack(target: NodeId, stack: Vec<(NodeId, usize)>) -> Self {
        Self { target, stack }
    }

    pub fn target(&self) -> NodeId {
        self.target
    }

    /// The parent `V` at this appearance, or `None` at the outline root.
    pub fn parent_vnode(&self) -> Option<NodeId> {
        self.stack.last().map(|(v, _)| *v)
    }

    /// Index of `target` within its parent's child list (0 at the root).
    pub fn child_index(&self) -> usize {
        self.stack.last().map(|(_, i)| *i).unwrap_or(0)
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub(crate) fn stack(&self) -> &[(NodeId, usize)] {
        &self.stack
    }

    /// Cheap value copy, named to match the host interface's `p.copy()`.
    pub fn copy(&self) -> Self {
        self.clone()
    }
}
