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

//! `Bead`: one undoable record.
//!
//! Each `BeadPayload` variant owns the data specific to its kind; fields
//! every kind needs (label, position, selections, status snapshot, dirty
//! list) live on the shared [`BeadEnvelope`] instead of being duplicated
//! per variant. Handlers dispatch on the payload with a `match` in
//! [`crate::undo_manager`], not through per-bead function pointers.

use crate::host::node::{NodeId, Position};
use crate::host::text::YView;
use crate::text_diff::TextDiff;
use crate::tree_snapshot::TreeSnapshot;

/// Discriminant mirroring the spec's `kind` field, used for logging and
/// for recognizing an open group at the top of the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeadKind {
    Typing,
    Node,
    Tree,
    Clone,
    Delete,
    Insert,
    Move,
    Hoist,
    Dehoist,
    Mark,
    Sort,
    Promote,
    Demote,
    ClearRecentFiles,
    BeforeGroup,
    AfterGroup,
}

impl std::fmt::Display for BeadKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BeadKind::Typing => "typing",
            BeadKind::Node => "node",
            BeadKind::Tree => "tree",
            BeadKind::Clone => "clone",
            BeadKind::Delete => "delete",
            BeadKind::Insert => "insert",
            BeadKind::Move => "move",
            BeadKind::Hoist => "hoist",
            BeadKind::Dehoist => "dehoist",
            BeadKind::Mark => "mark",
            BeadKind::Sort => "sort",
            BeadKind::Promote => "promote",
            BeadKind::Demote => "demote",
            BeadKind::ClearRecentFiles => "clearRecentFiles",
            BeadKind::BeforeGroup => "beforeGroup",
            BeadKind::AfterGroup => "afterGroup",
        };
        f.write_str(s)
    }
}

/// Fields every bead kind needs, regardless of payload.
#[derive(Debug, Clone)]
pub struct BeadEnvelope {
    pub label: String,
    pub position: Position,
    pub old_sel: (usize, usize),
    pub new_sel: (usize, usize),
    pub old_changed: bool,
    pub old_dirty: bool,
    pub old_marked: bool,
    pub new_changed: bool,
    pub new_dirty: bool,
    pub new_marked: bool,
    pub dirty_list: Vec<NodeId>,
}

impl BeadEnvelope {
    /// A bare envelope captured by a `beforeX` call, before the matching
    /// `afterX` fills in the `new_*` fields.
    pub fn opening(position: Position, old_sel: (usize, usize), old_changed: bool, old_dirty: bool, old_marked: bool) -> Self {
        Self {
            label: String::new(),
            position,
            old_sel,
            new_sel: old_sel,
            old_changed,
            old_dirty,
            old_marked,
            new_changed: old_changed,
            new_dirty: old_dirty,
            new_marked: old_marked,
            dirty_list: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NodePayload {
    pub v: NodeId,
    pub old_head: String,
    pub new_head: String,
    pub old_body: String,
    pub new_body: String,
}

#[derive(Debug, Clone)]
pub struct TreePayload {
    pub old_tree: TreeSnapshot,
    pub new_tree: TreeSnapshot,
}

#[derive(Debug, Clone)]
pub struct ClonePayload {
    pub v: NodeId,
    /// The position created for the new clone appearance.
    pub inserted: Position,
    pub new_back: Option<Position>,
    pub new_parent: Option<Position>,
}

#[derive(Debug, Clone)]
pub struct InsertPayload {
    pub inserted: Position,
    pub new_back: Option<Position>,
    pub new_parent: Option<Position>,
    pub paste_as_clone: bool,
    pub before_tree: Option<TreeSnapshot>,
    pub after_tree: Option<TreeSnapshot>,
}

#[derive(Debug, Clone)]
pub struct DeletePayload {
    pub v: NodeId,
    pub old_back: Option<Position>,
    pub old_parent: Option<Position>,
    /// Parent position to select before re-removing the outline on redo.
    pub new_parent: Position,
}

#[derive(Debug, Clone)]
pub struct MovePayload {
    pub v: NodeId,
    pub old_position: Position,
    pub new_position: Position,
}

#[derive(Debug, Clone)]
pub struct HoistPayload {
    pub position: Position,
}

#[derive(Debug, Clone)]
pub struct SortPayload {
    /// Any position among the sorted siblings, used to reach the parent's
    /// child list through [`crate::host::tree::TreeHost::children_of_parent`].
    pub position: Position,
    pub old_children: Vec<NodeId>,
    pub new_children: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct PromoteDemotePayload {
    /// `v`'s position at capture time.
    pub position: Position,
    /// `v`'s index among its parent's children.
    pub n: usize,
    /// Number of children/siblings that change ownership.
    pub k: usize,
}

#[derive(Debug, Clone)]
pub struct ClearRecentFilesPayload {
    pub old_recent_files: Vec<String>,
    pub new_recent_files: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct TypingPayload {
    pub diff: TextDiff,
    pub old_yview: Option<YView>,
}

#[derive(Debug, Clone)]
pub struct GroupPayload {
    pub items: Vec<Bead>,
    pub report_flag: bool,
}

/// The kind-specific half of a [`Bead`]. One variant per `BeadKind`; `Mark`
/// carries no extra data because the envelope's `old_marked`/`new_marked`
/// and `position` are everything its handler needs.
#[derive(Debug, Clone)]
pub enum BeadPayload {
    Typing(TypingPayload),
    Node(NodePayload),
    Tree(TreePayload),
    Clone(ClonePayload),
    Delete(DeletePayload),
    Insert(InsertPayload),
    Move(MovePayload),
    Hoist(HoistPayload),
    Dehoist(HoistPayload),
    Mark,
    Sort(SortPayload),
    Promote(PromoteDemotePayload),
    Demote(PromoteDemotePayload),
    ClearRecentFiles(ClearRecentFilesPayload),
    BeforeGroup(GroupPayload),
    AfterGroup(GroupPayload),
}

impl BeadPayload {
    pub fn kind(&self) -> BeadKind {
        match self {
            BeadPayload::Typing(_) => BeadKind::Typing,
            BeadPayload::Node(_) => BeadKind::Node,
            BeadPayload::Tree(_) => BeadKind::Tree,
            BeadPayload::Clone(_) => BeadKind::Clone,
            BeadPayload::Delete(_) => BeadKind::Delete,
            BeadPayload::Insert(_) => BeadKind::Insert,
            BeadPayload::Move(_) => BeadKind::Move,
            BeadPayload::Hoist(_) => BeadKind::Hoist,
            BeadPayload::Dehoist(_) => BeadKind::Dehoist,
            BeadPayload::Mark => BeadKind::Mark,
            BeadPayload::Sort(_) => BeadKind::Sort,
            BeadPayload::Promote(_) => BeadKind::Promote,
            BeadPayload::Demote(_) => BeadKind::Demote,
            BeadPayload::ClearRecentFiles(_) => BeadKind::ClearRecentFiles,
            BeadPayload::BeforeGroup(_) => BeadKind::BeforeGroup,
            BeadPayload::AfterGroup(_) => BeadKind::AfterGroup,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Bead {
    pub envelope: BeadEnvelope,
    pub payload: BeadPayload,
}

impl Bead {
    pub fn new(envelope: BeadEnvelope, payload: BeadPayload) -> Self {
        Self { envelope, payload }
    }

    pub fn kind(&self) -> BeadKind {
        self.payload.kind()
    }

    pub fn label(&self) -> &str {
        &self.envelope.label
    }

    /// `true` for a still-open group (kind `BeforeGroup`) sitting at the
    /// top of the stack — the only bead a push can be redirected into.
    pub fn is_open_group(&self) -> bool {
        matches!(self.payload, BeadPayload::BeforeGroup(_))
    }

    /// Appends `child` to an open group's items. Panics if this bead is not
    /// an open group — callers must check [`Bead::is_open_group`] first.
    pub fn push_group_item(&mut self, child: Bead) {
        match &mut self.payload {
            BeadPayload::BeforeGroup(group) => group.items.push(child),
            _ => unreachable!("push_group_item called on a non-group bead"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dummy_position() -> Position {
        Position::root(NodeId::default())
    }

    #[test]
    fn open_group_accepts_items() {
        let envelope = BeadEnvelope::opening(dummy_position(), (0, 0), false, false, false);
        let mut bead = Bead::new(
            envelope,
            BeadPayload::BeforeGroup(GroupPayload {
                items: Vec::new(),
                report_flag: true,
            }),
        );
        assert!(bead.is_open_group());

        let child_envelope = BeadEnvelope::opening(dummy_position(), (0, 0), false, false, false);
        let child = Bead::new(
            child_envelope,
            NodePayload {
                v: NodeId::default(),
                old_head: "a".into(),
                new_head: "b".into(),
                old_body: String::new(),
                new_body: String::new(),
            }
            .into(),
        );
        bead.push_group_item(child);
        match &bead.payload {
            BeadPayload::BeforeGroup(group) => assert_eq!(group.items.len(), 1),
            _ => unreachable!(),
        }
    }

    #[test]
    fn kind_display_matches_spec_vocabulary() {
        assert_eq!(BeadKind::ClearRecentFiles.to_string(), "clearRecentFiles");
        assert_eq!(BeadKind::BeforeGroup.to_string(), "beforeGroup");
    }
}

impl From<NodePayload> for BeadPayload {
    fn from(p: NodePayload) -> Self {
        BeadPayload::Node(p)
    }
}
