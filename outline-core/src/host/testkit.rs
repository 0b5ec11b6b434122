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

//! Minimal in-memory reference implementations of every host trait.
//!
//! These are deliberately thin — enough to drive every scenario in the
//! spec's testable-properties section without a real editor frontend
//! attached. Used by this crate's own tests and by `outline-cli`.

use std::collections::HashMap;

use slotmap::SlotMap;

use super::config::ConfigHost;
use super::menu::MenuHost;
use super::node::{NodeId, Position, StatusBits};
use super::registry::AppRegistry;
use super::text::{SelectionRange, TextHost, YView};
use super::tree::{AttributeBag, NodeRecord, TreeHost};
use crate::granularity::Granularity;

#[derive(Debug, Clone, Default)]
struct NodeData {
    head: String,
    body: String,
    status: StatusBits,
    children: Vec<NodeId>,
    parents: Vec<NodeId>,
    attributes: AttributeBag,
}

impl NodeData {
    fn new(head: &str, body: &str) -> Self {
        Self {
            head: head.to_string(),
            body: body.to_string(),
            ..Default::default()
        }
    }
}

/// A DAG of `V`s backed by a `slotmap` arena, with a hidden root vnode
/// whose children are the outline's visible top-level nodes — the same
/// structure Leo itself uses internally, kept here because the distilled
/// spec's `Position` description (target/parent/child-index only) can't
/// otherwise make top-level positions unambiguous.
pub struct InMemoryTree {
    arena: SlotMap<NodeId, NodeData>,
    hidden_root: NodeId,
    current: Position,
    changed: bool,
    update_depth: u32,
    hoist_stack: Vec<Position>,
    position_after_sort: bool,
}

impl Default for InMemoryTree {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryTree {
    pub fn new() -> Self {
        let mut arena = SlotMap::with_key();
        let hidden_root = arena.insert(NodeData::default());
        let current = Position::with_stack(hidden_root, Vec::new());
        Self {
            arena,
            hidden_root,
            current,
            changed: false,
            update_depth: 0,
            hoist_stack: Vec::new(),
            position_after_sort: false,
        }
    }

    /// Allocates a fresh `V`, not yet linked anywhere. Mirrors the tree
    /// model's node-creation responsibility, kept here only because this
    /// crate has no other host to delegate it to.
    pub fn new_node(&mut self, head: &str, body: &str) -> NodeId {
        self.arena.insert(NodeData::new(head, body))
    }

    /// Convenience: creates a node and appends it as a new top-level root.
    pub fn insert_root(&mut self, head: &str, body: &str) -> Position {
        let v = self.new_node(head, body);
        let p = self.link_as_root(v);
        self.current = p.clone();
        p
    }

    /// Convenience: creates a node and appends it as `parent`'s last child.
    pub fn insert_child(&mut self, parent: &Position, head: &str, body: &str) -> Position {
        let v = self.new_node(head, body);
        let idx = self.children_len(parent.target());
        self.link_as_nth_child(v, parent.clone(), idx)
    }

    /// A `Position` over the hidden root vnode itself, whose children are
    /// every top-level node in the outline. Not a visible node — callers
    /// use it only to enumerate top-level positions via
    /// [`TreeHost::first_child`]/[`TreeHost::next`], the same way the rest
    /// of the outline is walked.
    pub fn root_position(&self) -> Position {
        Position::with_stack(self.hidden_root, Vec::new())
    }

    pub fn hoist_stack_depth(&self) -> usize {
        self.hoist_stack.len()
    }

    pub fn update_depth(&self) -> u32 {
        self.update_depth
    }

    fn children_len(&self, v: NodeId) -> usize {
        self.arena.get(v).map(|n| n.children.len()).unwrap_or(0)
    }

    fn sibling_position(&self, p: &Position, idx: usize) -> Option<Position> {
        let parent_v = p.parent_vnode()?;
        let child_v = *self.arena.get(parent_v)?.children.get(idx)?;
        let mut stack = p.stack().to_vec();
        stack.pop();
        stack.push((parent_v, idx));
        Some(Position::with_stack(child_v, stack))
    }

    fn position_for_index(&self, parent_pos: &Position, parent_v: NodeId, idx: usize) -> Option<Position> {
        let child_v = *self.arena.get(parent_v)?.children.get(idx)?;
        let mut stack = parent_pos.stack().to_vec();
        stack.push((parent_v, idx));
        Some(Position::with_stack(child_v, stack))
    }

    fn collect_subtree(&self, p: &Position, out: &mut Vec<Position>) {
        out.push(p.clone());
        let v = p.target();
        let count = self.children_len(v);
        for i in 0..count {
            if let Some(child) = self.position_for_index(p, v, i) {
                self.collect_subtree(&child, out);
            }
        }
    }
}

impl TreeHost for InMemoryTree {
    fn is_changed(&self) -> bool {
        self.changed
    }

    fn set_changed(&mut self, changed: bool) {
        self.changed = changed;
    }

    fn current_position(&self) -> Option<Position> {
        Some(self.current.clone())
    }

    fn select_position(&mut self, p: Position) {
        self.current = p;
    }

    fn set_current_position(&mut self, p: Position) {
        self.current = p;
    }

    fn begin_update(&mut self) {
        self.update_depth += 1;
    }

    fn end_update(&mut self, recolor: bool) {
        self.update_depth = self.update_depth.saturating_sub(1);
        if recolor {
            tracing::trace!("end_update: full recolor requested");
        }
    }

    fn delete_outline(&mut self, p: Position) {
        self.unlink(p);
    }

    fn hoist(&mut self, p: Position) {
        self.hoist_stack.push(p);
    }

    fn dehoist(&mut self) {
        self.hoist_stack.pop();
    }

    fn set_head_string(&mut self, p: Position, s: &str) {
        if let Some(node) = self.arena.get_mut(p.target()) {
            node.head = s.to_string();
            node.status.dirty = true;
        }
        self.changed = true;
    }

    fn set_body_string(&mut self, p: Position, s: &str) {
        if let Some(node) = self.arena.get_mut(p.target()) {
            node.body = s.to_string();
            node.status.dirty = true;
        }
        self.changed = true;
    }

    fn set_position_after_sort(&mut self, flag: bool) {
        self.position_after_sort = flag;
    }

    fn set_marked(&mut self, p: Position) {
        if let Some(node) = self.arena.get_mut(p.target()) {
            node.status.marked = true;
        }
    }

    fn clear_marked(&mut self, p: Position) {
        if let Some(node) = self.arena.get_mut(p.target()) {
            node.status.marked = false;
        }
    }

    fn back(&self, p: Position) -> Option<Position> {
        let idx = p.child_index();
        if idx == 0 {
            return None;
        }
        self.sibling_position(&p, idx - 1)
    }

    fn parent(&self, p: Position) -> Option<Position> {
        let parent_v = p.parent_vnode()?;
        if parent_v == self.hidden_root {
            return None;
        }
        let mut stack = p.stack().to_vec();
        stack.pop();
        Some(Position::with_stack(parent_v, stack))
    }

    fn first_child(&self, p: Position) -> Option<Position> {
        self.position_for_index(&p, p.target(), 0)
    }

    fn next(&self, p: Position) -> Option<Position> {
        let parent_v = p.parent_vnode()?;
        let idx = p.child_index();
        self.sibling_position(&p, idx + 1)
            .filter(|_| idx + 1 < self.children_len(parent_v))
    }

    fn subtree(&self, p: Position) -> Vec<Position> {
        let mut out = Vec::new();
        self.collect_subtree(&p, &mut out);
        out
    }

    fn child_index(&self, p: Position) -> usize {
        p.child_index()
    }

    fn parent_vnode(&self, p: Position) -> Option<NodeId> {
        p.parent_vnode().filter(|v| *v != self.hidden_root)
    }

    fn link_after(&mut self, v: NodeId, after: Position) -> Position {
        let parent_v = after.parent_vnode().unwrap_or(self.hidden_root);
        let idx = after.child_index() + 1;
        if let Some(node) = self.arena.get_mut(parent_v) {
            node.children.insert(idx.min(node.children.len()), v);
        }
        if let Some(node) = self.arena.get_mut(v) {
            if !node.parents.contains(&parent_v) {
                node.parents.push(parent_v);
            }
        }
        let mut stack = after.stack().to_vec();
        stack.pop();
        stack.push((parent_v, idx));
        Position::with_stack(v, stack)
    }

    fn link_as_nth_child(&mut self, v: NodeId, parent: Position, i: usize) -> Position {
        let parent_v = parent.target();
        let i = if let Some(node) = self.arena.get_mut(parent_v) {
            let i = i.min(node.children.len());
            node.children.insert(i, v);
            i
        } else {
            0
        };
        if let Some(node) = self.arena.get_mut(v) {
            if !node.parents.contains(&parent_v) {
                node.parents.push(parent_v);
            }
        }
        let mut stack = parent.stack().to_vec();
        stack.push((parent_v, i));
        Position::with_stack(v, stack)
    }

    fn link_as_root(&mut self, v: NodeId) -> Position {
        let idx = self.children_len(self.hidden_root);
        if let Some(node) = self.arena.get_mut(self.hidden_root) {
            node.children.push(v);
        }
        if let Some(node) = self.arena.get_mut(v) {
            if !node.parents.contains(&self.hidden_root) {
                node.parents.push(self.hidden_root);
            }
        }
        Position::with_stack(v, vec![(self.hidden_root, idx)])
    }

    fn restore_links_in_tree(&mut self, p: Position) {
        let positions = self.subtree(p);
        let mut new_parents: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
        for pos in &positions {
            if let Some(parent_v) = pos.parent_vnode() {
                if parent_v != self.hidden_root {
                    let entry = new_parents.entry(pos.target()).or_default();
                    if !entry.contains(&parent_v) {
                        entry.push(parent_v);
                    }
                }
            }
        }
        for (v, parents) in new_parents {
            if let Some(node) = self.arena.get_mut(v) {
                node.parents = parents;
            }
        }
    }

    fn unlink(&mut self, p: Position) {
        let parent_v = match p.parent_vnode() {
            Some(v) => v,
            None => return,
        };
        let removed = if let Some(node) = self.arena.get_mut(parent_v) {
            let idx = p.child_index();
            if idx < node.children.len() && node.children[idx] == p.target() {
                node.children.remove(idx);
                true
            } else if let Some(pos) = node.children.iter().position(|&c| c == p.target()) {
                node.children.remove(pos);
                true
            } else {
                false
            }
        } else {
            false
        };
        if removed {
            let still_present = self
                .arena
                .get(parent_v)
                .map(|n| n.children.contains(&p.target()))
                .unwrap_or(false);
            if !still_present {
                if let Some(node) = self.arena.get_mut(p.target()) {
                    node.parents.retain(|&pp| pp != parent_v);
                }
            }
        }
    }

    fn set_dirty(&mut self, p: Position, set_descendents_dirty: bool) {
        if let Some(node) = self.arena.get_mut(p.target()) {
            node.status.dirty = true;
        }
        if set_descendents_dirty {
            for pos in self.subtree(p).into_iter().skip(1) {
                if let Some(node) = self.arena.get_mut(pos.target()) {
                    node.status.dirty = true;
                }
            }
        }
    }

    fn set_all_ancestor_file_nodes_dirty(&mut self, p: Position) {
        let mut cur = Some(p);
        while let Some(pos) = cur {
            if let Some(node) = self.arena.get_mut(pos.target()) {
                node.status.dirty = true;
            }
            cur = self.parent(pos);
        }
    }

    fn init_head_string(&mut self, v: NodeId, s: &str) {
        if let Some(node) = self.arena.get_mut(v) {
            node.head = s.to_string();
        }
    }

    fn is_marked(&self, v: NodeId) -> bool {
        self.arena.get(v).map(|n| n.status.marked).unwrap_or(false)
    }

    fn is_dirty(&self, v: NodeId) -> bool {
        self.arena.get(v).map(|n| n.status.dirty).unwrap_or(false)
    }

    fn body_string(&self, v: NodeId) -> String {
        self.arena.get(v).map(|n| n.body.clone()).unwrap_or_default()
    }

    fn head_string(&self, v: NodeId) -> String {
        self.arena.get(v).map(|n| n.head.clone()).unwrap_or_default()
    }

    fn compute_parents_of_children(&mut self, v: NodeId, children: Option<&[NodeId]>) {
        let child_list: Vec<NodeId> = match children {
            Some(c) => c.to_vec(),
            None => self.arena.get(v).map(|n| n.children.clone()).unwrap_or_default(),
        };
        for child in child_list {
            if let Some(node) = self.arena.get_mut(child) {
                if !node.parents.contains(&v) {
                    node.parents.push(v);
                }
            }
        }
    }

    fn node_record(&self, v: NodeId) -> NodeRecord {
        let node = self.arena.get(v).cloned().unwrap_or_default();
        NodeRecord {
            status: node.status,
            parents: node.parents,
            children: node.children,
            attributes: node.attributes,
            head: node.head,
            body: node.body,
        }
    }

    fn install_node_record(&mut self, v: NodeId, record: NodeRecord) {
        if let Some(node) = self.arena.get_mut(v) {
            node.status = record.status;
            node.parents = record.parents;
            node.children = record.children;
            node.attributes = record.attributes;
            node.head = record.head;
            node.body = record.body;
        }
    }

    fn children_of_parent(&self, p: Position) -> Vec<NodeId> {
        let parent_v = p.parent_vnode().unwrap_or(self.hidden_root);
        self.arena.get(parent_v).map(|n| n.children.clone()).unwrap_or_default()
    }

    fn set_children_of_parent(&mut self, p: Position, children: Vec<NodeId>) {
        let parent_v = p.parent_vnode().unwrap_or(self.hidden_root);
        if let Some(node) = self.arena.get_mut(parent_v) {
            node.children = children;
        }
    }
}

/// In-memory stand-in for the text widget, backed by a `ropey::Rope` the
/// same way the teacher's `BufferInner` stores its editable buffer.
pub struct InMemoryText {
    content: ropey::Rope,
    selection: SelectionRange,
    yview: YView,
}

impl InMemoryText {
    pub fn new(initial: &str) -> Self {
        Self {
            content: ropey::Rope::from_str(initial),
            selection: (0, 0),
            yview: YView(0),
        }
    }
}

impl TextHost for InMemoryText {
    fn selection_range(&self) -> SelectionRange {
        self.selection
    }

    fn set_selection_range(&mut self, range: SelectionRange, _insert: usize) {
        self.selection = range;
    }

    fn all_text(&self) -> String {
        self.content.to_string()
    }

    fn set_all_text(&mut self, text: &str) {
        self.content = ropey::Rope::from_str(text);
    }

    fn y_scroll_position(&self) -> YView {
        self.yview
    }

    fn set_y_scroll_position(&mut self, y: YView) {
        self.yview = y;
    }

    fn force_full_recolor(&mut self) {
        tracing::trace!("force_full_recolor");
    }

    fn update_editors(&mut self) {
        tracing::trace!("update_editors");
    }
}

/// Records every call instead of driving a real menu, so tests can assert
/// on the label/enablement history.
#[derive(Debug, Default)]
pub struct NullMenu {
    pub labels: HashMap<(String, String), String>,
    pub enabled: HashMap<(String, String), bool>,
    pub recent_files_menu: Vec<String>,
}

impl MenuHost for NullMenu {
    fn set_menu_label(&mut self, menu: &str, old_name: &str, new_name: &str) {
        self.labels
            .insert((menu.to_string(), old_name.to_string()), new_name.to_string());
    }

    fn enable_menu(&mut self, menu: &str, name: &str, enabled: bool) {
        self.enabled.insert((menu.to_string(), name.to_string()), enabled);
    }

    fn real_menu_name(&self, name: &str) -> String {
        name.to_string()
    }

    fn create_recent_files_menu_items(&mut self, recent_files: &[String]) {
        self.recent_files_menu = recent_files.to_vec();
    }
}

/// Fixed key/value config, mirroring the teacher's
/// `get_config_string(key, default)` convention: `undo_granularity` is kept
/// as the raw string a real config store would hand back, not pre-parsed,
/// so `Granularity::parse_reporting`'s fallback-and-warn path is reachable
/// through this host like any other.
#[derive(Debug, Clone)]
pub struct MapConfig {
    granularity_raw: String,
    max_undo_stack_size: usize,
}

impl MapConfig {
    pub fn new(granularity: Granularity, max_undo_stack_size: usize) -> Self {
        Self {
            granularity_raw: granularity.as_str().to_string(),
            max_undo_stack_size,
        }
    }

    /// Stores `granularity_raw` verbatim, unparsed — for tests exercising
    /// unrecognized or empty `undo_granularity` values.
    pub fn from_raw(granularity_raw: &str, max_undo_stack_size: usize) -> Self {
        Self {
            granularity_raw: granularity_raw.to_string(),
            max_undo_stack_size,
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            granularity_raw: Granularity::Line.as_str().to_string(),
            max_undo_stack_size: 0,
        }
    }
}

impl ConfigHost for MapConfig {
    fn undo_granularity(&self) -> String {
        self.granularity_raw.clone()
    }

    fn max_undo_stack_size(&self) -> usize {
        self.max_undo_stack_size
    }
}

#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    recent_files: Vec<String>,
}

impl AppRegistry for InMemoryRegistry {
    fn recent_files(&self) -> Vec<String> {
        self.recent_files.clone()
    }

    fn set_recent_files(&mut self, files: Vec<String>) {
        self.recent_files = files;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_root_then_child_builds_positions() {
        let mut tree = InMemoryTree::new();
        let root = tree.insert_root("Root", "");
        let child = tree.insert_child(&root, "Child", "body");
        assert_eq!(tree.parent(child.clone()).unwrap().target(), root.target());
        assert_eq!(tree.parent(root.clone()), None);
        assert_eq!(tree.first_child(root).unwrap().target(), child.target());
    }

    #[test]
    fn siblings_navigate_back_and_next() {
        let mut tree = InMemoryTree::new();
        let a = tree.insert_root("A", "");
        let b = tree.insert_root("B", "");
        assert_eq!(tree.next(a.clone()).unwrap().target(), b.target());
        assert_eq!(tree.back(b).unwrap().target(), a.target());
    }

    #[test]
    fn clone_has_two_parents() {
        let mut tree = InMemoryTree::new();
        let root = tree.insert_root("Root", "");
        let v = tree.new_node("Shared", "body");
        let p1 = tree.link_as_nth_child(v, root.clone(), 0);
        let p2 = tree.link_as_root(v);
        assert_ne!(p1.stack(), p2.stack());
        let record = tree.node_record(v);
        assert_eq!(record.parents.len(), 2);
    }

    #[test]
    fn unlink_keeps_other_appearance() {
        let mut tree = InMemoryTree::new();
        let root = tree.insert_root("Root", "");
        let v = tree.new_node("Shared", "body");
        let p1 = tree.link_as_nth_child(v, root.clone(), 0);
        let p2 = tree.link_as_root(v);
        tree.unlink(p1);
        let record = tree.node_record(v);
        assert_eq!(record.parents, vec![tree.hidden_root]);
        assert_eq!(tree.current_position().unwrap().target(), tree.current.target());
        let _ = p2;
    }
}
