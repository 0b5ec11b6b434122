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

//! `BeadStack`: the linear undo/redo history.
//!
//! A plain `Vec<Bead>` plus a cursor, bounded by `max_undo_stack_size`,
//! with one wrinkle: while the bead sitting at the cursor is an open
//! group (`BeadKind::BeforeGroup`), pushes are redirected into that
//! group's `items` instead of advancing the cursor, and truncation is
//! suppressed entirely so a half-built group is never discarded.

use crate::bead::Bead;

pub struct BeadStack {
    beads: Vec<Bead>,
    /// `-1` means undo is disabled; ranges over `[-1, beads.len() - 1]`.
    cursor: isize,
    max_undo_stack_size: usize,
}

impl BeadStack {
    pub fn new(max_undo_stack_size: usize) -> Self {
        Self {
            beads: Vec::new(),
            cursor: -1,
            max_undo_stack_size,
        }
    }

    pub fn len(&self) -> usize {
        self.beads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.beads.is_empty()
    }

    pub fn can_undo(&self) -> bool {
        self.cursor >= 0
    }

    pub fn can_redo(&self) -> bool {
        (self.cursor + 1) < self.beads.len() as isize
    }

    pub fn top_for_undo(&self) -> Option<&Bead> {
        if self.cursor >= 0 {
            self.beads.get(self.cursor as usize)
        } else {
            None
        }
    }

    pub fn top_for_redo(&self) -> Option<&Bead> {
        self.beads.get((self.cursor + 1) as usize)
    }

    pub fn top_for_undo_mut(&mut self) -> Option<&mut Bead> {
        if self.cursor >= 0 {
            self.beads.get_mut(self.cursor as usize)
        } else {
            None
        }
    }

    /// Flips the open group at the top of the stack from `BeforeGroup` to
    /// `AfterGroup`, fills in its post-state, and (now that it's closed)
    /// applies the stack bound that was suppressed while it was open.
    /// Returns `false` (protocol misuse) if the top of stack isn't an open
    /// group.
    #[allow(clippy::too_many_arguments)]
    pub fn close_top_group(
        &mut self,
        label: String,
        new_sel: (usize, usize),
        new_changed: bool,
        new_dirty: bool,
        new_marked: bool,
        dirty_list: Vec<crate::host::node::NodeId>,
        report_flag: bool,
    ) -> bool {
        if !self.is_top_open_group() {
            return false;
        }
        let idx = self.cursor as usize;
        let bead = &mut self.beads[idx];
        bead.envelope.label = label;
        bead.envelope.new_sel = new_sel;
        bead.envelope.new_changed = new_changed;
        bead.envelope.new_dirty = new_dirty;
        bead.envelope.new_marked = new_marked;
        bead.envelope.dirty_list = dirty_list;
        if let crate::bead::BeadPayload::BeforeGroup(group) = &bead.payload {
            let items = group.items.clone();
            bead.payload = crate::bead::BeadPayload::AfterGroup(crate::bead::GroupPayload { items, report_flag });
        }
        self.truncate_to_max();
        true
    }

    fn is_top_open_group(&self) -> bool {
        self.cursor >= 0
            && self.beads[self.cursor as usize].is_open_group()
    }

    /// Pushes `bead`, dropping any forward (redo) history, unless the
    /// current top-of-stack is an open group — in which case `bead` is
    /// appended to that group's `items` and the cursor does not move.
    pub fn push(&mut self, bead: Bead) {
        if self.is_top_open_group() {
            self.beads[self.cursor as usize].push_group_item(bead);
            return;
        }

        let keep = (self.cursor + 1).max(0) as usize;
        self.beads.truncate(keep);
        self.beads.push(bead);
        self.cursor = self.beads.len() as isize - 1;

        self.truncate_to_max();
    }

    /// After a push, if the stack exceeds `max_undo_stack_size` (and no
    /// group is open — callers only reach here once a push has just
    /// completed, so the just-pushed bead can't itself be an open group
    /// sitting mid-construction at the bottom), drop the oldest entries.
    fn truncate_to_max(&mut self) {
        if self.max_undo_stack_size == 0 {
            return;
        }
        if self.is_top_open_group() {
            return;
        }
        let len = self.beads.len();
        if len > self.max_undo_stack_size {
            let drop_count = len - self.max_undo_stack_size;
            self.beads.drain(0..drop_count);
            self.cursor -= drop_count as isize;
            if self.cursor < -1 {
                self.cursor = -1;
            }
        }
    }

    pub fn advance_after_undo(&mut self) {
        self.cursor -= 1;
    }

    pub fn advance_after_redo(&mut self) {
        self.cursor += 1;
    }

    pub fn clear(&mut self) {
        self.beads.clear();
        self.cursor = -1;
    }

    pub fn max_undo_stack_size(&self) -> usize {
        self.max_undo_stack_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bead::{BeadEnvelope, BeadPayload, NodePayload};
    use crate::host::node::{NodeId, Position};

    fn node_bead(label: &str) -> Bead {
        let envelope = BeadEnvelope::opening(Position::root(NodeId::default()), (0, 0), false, false, false);
        let mut envelope = envelope;
        envelope.label = label.to_string();
        Bead::new(
            envelope,
            BeadPayload::Node(NodePayload {
                v: NodeId::default(),
                old_head: String::new(),
                new_head: String::new(),
                old_body: String::new(),
                new_body: String::new(),
            }),
        )
    }

    #[test]
    fn push_enables_undo_and_disables_redo() {
        let mut stack = BeadStack::new(0);
        stack.push(node_bead("Edit"));
        assert!(stack.can_undo());
        assert!(!stack.can_redo());
    }

    #[test]
    fn undo_then_push_drops_forward_history() {
        let mut stack = BeadStack::new(0);
        stack.push(node_bead("One"));
        stack.push(node_bead("Two"));
        stack.advance_after_undo();
        assert!(stack.can_redo());
        stack.push(node_bead("Three"));
        assert!(!stack.can_redo());
        assert_eq!(stack.len(), 2);
    }

    #[test]
    fn s6_stack_bound_of_three() {
        let mut stack = BeadStack::new(3);
        for i in 0..5 {
            stack.push(node_bead(&format!("Edit {i}")));
        }
        assert_eq!(stack.len(), 3);
        assert_eq!(stack.top_for_undo().unwrap().label(), "Edit 4");
        let mut undone = 0;
        while stack.can_undo() {
            stack.advance_after_undo();
            undone += 1;
        }
        assert_eq!(undone, 3);
        assert!(!stack.can_undo());
    }

    #[test]
    fn open_group_survives_truncation() {
        let mut stack = BeadStack::new(1);
        let envelope = BeadEnvelope::opening(Position::root(NodeId::default()), (0, 0), false, false, false);
        let group = Bead::new(
            envelope,
            BeadPayload::BeforeGroup(crate::bead::GroupPayload {
                items: Vec::new(),
                report_flag: true,
            }),
        );
        stack.push(group);
        stack.push(node_bead("inside group"));
        assert_eq!(stack.len(), 1);
        match &stack.top_for_undo().unwrap().payload {
            BeadPayload::BeforeGroup(g) => assert_eq!(g.items.len(), 1),
            _ => unreachable!(),
        }
    }
}
