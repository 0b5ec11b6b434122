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

//! `UndoManager`: orchestrates `before*`/`after*` pairs, dispatches
//! apply/revert for every [`BeadKind`], and keeps the menu labels and
//! dirty/changed/marked bits in sync.
//!
//! Bead handlers dispatch on the payload with a `match`
//! (`apply_bead_forward`/`apply_bead_reverse`), per Design Note 3 — no
//! per-bead function pointers.

use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::bead::{
    Bead, BeadEnvelope, BeadPayload, ClearRecentFilesPayload, ClonePayload, DeletePayload,
    GroupPayload, HoistPayload, InsertPayload, MovePayload, NodePayload, PromoteDemotePayload,
    SortPayload, TreePayload, TypingPayload,
};
use crate::bead_stack::BeadStack;
use crate::error::{self, UndoWarning};
use crate::granularity::{should_extend, ExtendCheck, Granularity};
use crate::host::config::ConfigHost;
use crate::host::menu::MenuHost;
use crate::host::node::{NodeId, Position};
use crate::host::registry::AppRegistry;
use crate::host::text::{TextHost, YView};
use crate::host::tree::TreeHost;
use crate::text_diff::TextDiff;
use crate::tree_snapshot::{restore_tree, save_tree};

/// Opaque capture object threaded from a `before*` call into its matching
/// `after*` call. `Suppressed` means the engine was replaying when
/// `before*` ran, so the matching `after*` must be a no-op.
pub enum Bunch {
    Active { envelope: BeadEnvelope, pending: PendingPayload },
    Suppressed,
}

/// The half-built, kind-specific data captured by `before*`, completed by
/// the matching `after*` once the command has performed its edit.
pub enum PendingPayload {
    Node { v: NodeId, old_head: String, old_body: String },
    Tree { old_tree: crate::tree_snapshot::TreeSnapshot },
    Clone { v: NodeId },
    Delete { v: NodeId, old_back: Option<Position>, old_parent: Option<Position> },
    Insert { paste_as_clone: bool, before_tree: Option<crate::tree_snapshot::TreeSnapshot> },
    Move { v: NodeId, old_position: Position },
    Hoist { position: Position },
    Dehoist { position: Position },
    Mark { v: NodeId },
    Sort { old_children: Vec<NodeId> },
    Promote { n: usize, k: usize },
    Demote { n: usize, k: usize },
    ClearRecentFiles { old_recent_files: Vec<String> },
}

/// The public contract shared by [`UndoManager`] and
/// [`crate::null_undo_manager::NullUndoManager`] — code that drives undo
/// history can hold a `&mut dyn UndoEngine` and not care which one it has.
#[allow(clippy::too_many_arguments)]
pub trait UndoEngine {
    fn clear_undo_state(&mut self, menu: &mut dyn MenuHost);
    fn can_undo(&self) -> bool;
    fn can_redo(&self) -> bool;
    fn enable_menu_items(&self, menu: &mut dyn MenuHost);

    fn before_node(&self, tree: &dyn TreeHost, text: &dyn TextHost, p: &Position) -> Bunch;
    fn after_node(&mut self, tree: &dyn TreeHost, text: &dyn TextHost, bunch: Bunch, label: &str, dirty_list: Vec<NodeId>);

    fn before_tree(&self, tree: &dyn TreeHost, text: &dyn TextHost, p: &Position) -> Bunch;
    fn after_tree(&mut self, tree: &dyn TreeHost, text: &dyn TextHost, bunch: Bunch, label: &str, dirty_list: Vec<NodeId>);

    fn before_clone(&self, tree: &dyn TreeHost, text: &dyn TextHost, p: &Position) -> Bunch;
    #[allow(clippy::too_many_arguments)]
    fn after_clone(
        &mut self,
        tree: &dyn TreeHost,
        text: &dyn TextHost,
        bunch: Bunch,
        label: &str,
        inserted: Position,
        new_back: Option<Position>,
        new_parent: Option<Position>,
        dirty_list: Vec<NodeId>,
    );

    fn before_insert(&self, tree: &dyn TreeHost, text: &dyn TextHost, p: &Position, paste_as_clone: bool) -> Bunch;
    #[allow(clippy::too_many_arguments)]
    fn after_insert(
        &mut self,
        tree: &dyn TreeHost,
        text: &dyn TextHost,
        bunch: Bunch,
        label: &str,
        inserted: Position,
        new_back: Option<Position>,
        new_parent: Option<Position>,
        dirty_list: Vec<NodeId>,
    );

    fn before_delete(&self, tree: &dyn TreeHost, text: &dyn TextHost, p: &Position) -> Bunch;
    fn after_delete(&mut self, tree: &dyn TreeHost, text: &dyn TextHost, bunch: Bunch, label: &str, new_parent: Position, dirty_list: Vec<NodeId>);

    fn before_move(&self, tree: &dyn TreeHost, text: &dyn TextHost, p: &Position) -> Bunch;
    fn after_move(&mut self, tree: &dyn TreeHost, text: &dyn TextHost, bunch: Bunch, label: &str, new_position: Position, dirty_list: Vec<NodeId>);

    fn before_hoist(&self, tree: &dyn TreeHost, text: &dyn TextHost, p: &Position) -> Bunch;
    fn after_hoist(&mut self, tree: &dyn TreeHost, text: &dyn TextHost, bunch: Bunch, label: &str, dirty_list: Vec<NodeId>);
    fn before_dehoist(&self, tree: &dyn TreeHost, text: &dyn TextHost, p: &Position) -> Bunch;
    fn after_dehoist(&mut self, tree: &dyn TreeHost, text: &dyn TextHost, bunch: Bunch, label: &str, dirty_list: Vec<NodeId>);

    fn before_mark(&self, tree: &dyn TreeHost, text: &dyn TextHost, p: &Position) -> Bunch;
    fn after_mark(&mut self, tree: &dyn TreeHost, text: &dyn TextHost, bunch: Bunch, label: &str, dirty_list: Vec<NodeId>);

    fn before_sort(&self, tree: &dyn TreeHost, text: &dyn TextHost, p: &Position) -> Bunch;
    fn after_sort(&mut self, tree: &dyn TreeHost, text: &dyn TextHost, bunch: Bunch, label: &str, dirty_list: Vec<NodeId>);

    fn before_promote(&self, tree: &dyn TreeHost, text: &dyn TextHost, p: &Position, k: usize) -> Bunch;
    fn after_promote(&mut self, tree: &dyn TreeHost, text: &dyn TextHost, bunch: Bunch, label: &str, dirty_list: Vec<NodeId>);
    fn before_demote(&self, tree: &dyn TreeHost, text: &dyn TextHost, p: &Position, k: usize) -> Bunch;
    fn after_demote(&mut self, tree: &dyn TreeHost, text: &dyn TextHost, bunch: Bunch, label: &str, dirty_list: Vec<NodeId>);

    fn before_clear_recent_files(&self, registry: &dyn AppRegistry, tree: &dyn TreeHost, text: &dyn TextHost, p: &Position) -> Bunch;
    fn after_clear_recent_files(&mut self, registry: &dyn AppRegistry, tree: &dyn TreeHost, text: &dyn TextHost, bunch: Bunch, label: &str, dirty_list: Vec<NodeId>);

    fn before_change_group(&mut self, tree: &dyn TreeHost, text: &dyn TextHost, p: &Position, label: &str);
    fn after_change_group(&mut self, tree: &dyn TreeHost, text: &dyn TextHost, p: &Position, label: &str, report_flag: bool, dirty_list: Vec<NodeId>);

    #[allow(clippy::too_many_arguments)]
    fn set_undo_typing_params(
        &mut self,
        tree: &dyn TreeHost,
        text: &dyn TextHost,
        menu: &mut dyn MenuHost,
        config: &dyn ConfigHost,
        p: &Position,
        label: &str,
        old_text: &str,
        new_text: &str,
        old_sel: (usize, usize),
        new_sel: (usize, usize),
        old_yview: Option<YView>,
    );

    fn undo(&mut self, tree: &mut dyn TreeHost, text: &mut dyn TextHost, menu: &mut dyn MenuHost, registry: &mut dyn AppRegistry);
    fn redo(&mut self, tree: &mut dyn TreeHost, text: &mut dyn TextHost, menu: &mut dyn MenuHost, registry: &mut dyn AppRegistry);
}

/// Sets the `undoing`/`redoing` flag for the lifetime of the guard and
/// clears it on drop, so a panicking bead handler still leaves the engine
/// in a replayable state (try/finally equivalent, per §5).
struct ReplayGuard<'a> {
    flag: &'a mut bool,
}

impl<'a> ReplayGuard<'a> {
    fn new(flag: &'a mut bool) -> Self {
        *flag = true;
        Self { flag }
    }
}

impl<'a> Drop for ReplayGuard<'a> {
    fn drop(&mut self) {
        *self.flag = false;
    }
}

pub struct UndoManager {
    stack: BeadStack,
    undoing: bool,
    redoing: bool,
    undo_menu_label: String,
    redo_menu_label: String,
    group_depth: u32,
    recognize_start_of_typing_word: Box<dyn Fn(char, char) -> bool + Send + Sync>,
}

impl UndoManager {
    pub fn new(config: &dyn ConfigHost) -> Self {
        Self {
            stack: BeadStack::new(config.max_undo_stack_size()),
            undoing: false,
            redoing: false,
            undo_menu_label: "Can't Undo".to_string(),
            redo_menu_label: "Can't Redo".to_string(),
            group_depth: 0,
            recognize_start_of_typing_word: Box::new(crate::granularity::default_recognize_start_of_typing_word),
        }
    }

    /// Overrides the `word` granularity's word-boundary policy.
    pub fn set_recognize_start_of_typing_word(&mut self, f: impl Fn(char, char) -> bool + Send + Sync + 'static) {
        self.recognize_start_of_typing_word = Box::new(f);
    }

    pub fn group_depth(&self) -> u32 {
        self.group_depth
    }

    pub fn stack_len(&self) -> usize {
        self.stack.len()
    }

    fn is_replaying(&self) -> bool {
        self.undoing || self.redoing
    }

    fn update_menu_labels(&mut self) {
        self.undo_menu_label = match self.stack.top_for_undo() {
            Some(b) => format!("Undo {}", b.label()),
            None => "Can't Undo".to_string(),
        };
        self.redo_menu_label = match self.stack.top_for_redo() {
            Some(b) => format!("Redo {}", b.label()),
            None => "Can't Redo".to_string(),
        };
    }

    fn push(&mut self, bead: Bead) {
        self.stack.push(bead);
        self.update_menu_labels();
    }
}

fn capture_status(tree: &dyn TreeHost, v: NodeId) -> (bool, bool, bool) {
    (tree.is_changed(), tree.is_dirty(v), tree.is_marked(v))
}

fn relink(tree: &mut dyn TreeHost, v: NodeId, back: &Option<Position>, parent: &Option<Position>) -> Position {
    if let Some(b) = back {
        tree.link_after(v, b.clone())
    } else if let Some(p) = parent {
        tree.link_as_nth_child(v, p.clone(), 0)
    } else {
        tree.link_as_root(v)
    }
}

/// The character immediately before `(row, col)` in `text` — mirrors
/// `old_s[old_col-1]`/`new_s[new_col-1]` from the original typing-params
/// routine, not the last character of the whole buffer.
fn char_before(text: &str, row: usize, col: usize) -> Option<char> {
    if col == 0 {
        return None;
    }
    text.split('\n').nth(row)?.chars().nth(col - 1)
}

fn find_child(tree: &dyn TreeHost, parent: &Position, v: NodeId) -> Option<Position> {
    let mut cur = tree.first_child(parent.clone());
    while let Some(pos) = cur {
        if pos.target() == v {
            return Some(pos);
        }
        cur = tree.next(pos);
    }
    None
}

fn do_move(tree: &mut dyn TreeHost, v: NodeId, from: &Position, to: &Position) {
    tree.unlink(from.clone());
    let parent = tree.parent(to.clone());
    let idx = to.child_index();
    match parent {
        Some(p) => {
            tree.link_as_nth_child(v, p, idx);
        }
        None => {
            tree.link_as_root(v);
        }
    }
    tree.compute_parents_of_children(v, None);
}

/// Moves the `k` nodes starting at index `n + 1` of `p`'s parent's child
/// list in under `p`'s own `V`, prepended before its existing children —
/// the core transformation shared by promote-redo and demote-undo.
fn pull_siblings_under(tree: &mut dyn TreeHost, p: &PromoteDemotePayload) {
    let v = p.position.target();
    let mut parent_children = tree.children_of_parent(p.position.clone());
    let start = (p.n + 1).min(parent_children.len());
    let end = (start + p.k).min(parent_children.len());
    let moved: Vec<NodeId> = parent_children.drain(start..end).collect();
    tree.set_children_of_parent(p.position.clone(), parent_children);

    let mut vrec = tree.node_record(v);
    for (offset, child) in moved.into_iter().enumerate() {
        vrec.children.insert(offset, child);
    }
    tree.install_node_record(v, vrec);
}

/// Pulls the first `k` children of `v` back out as `v`'s following
/// siblings — the inverse of [`pull_siblings_under`], shared by
/// promote-undo and demote-redo.
fn push_children_out(tree: &mut dyn TreeHost, p: &PromoteDemotePayload) {
    let v = p.position.target();
    let mut vrec = tree.node_record(v);
    let k = p.k.min(vrec.children.len());
    let moved: Vec<NodeId> = vrec.children.drain(0..k).collect();
    tree.install_node_record(v, vrec);

    let mut parent_children = tree.children_of_parent(p.position.clone());
    let insert_at = (p.n + 1).min(parent_children.len());
    for (offset, child) in moved.into_iter().enumerate() {
        parent_children.insert(insert_at + offset, child);
    }
    tree.set_children_of_parent(p.position.clone(), parent_children);
}

/// Applies a bead's per-kind mutation in the *redo* direction. Shared
/// dirty/changed/selection bookkeeping is applied once by the caller
/// ([`UndoManager::redo`]), not per bead — so a group's children run
/// through here without individually restoring selection, matching the
/// spec's "only the outer group restores selection."
fn apply_bead_forward(bead: &Bead, tree: &mut dyn TreeHost, text: &mut dyn TextHost, registry: &mut dyn AppRegistry) -> Result<(), UndoWarning> {
    match &bead.payload {
        BeadPayload::Node(p) => {
            tree.set_head_string(bead.envelope.position.clone(), &p.new_head);
            tree.set_body_string(bead.envelope.position.clone(), &p.new_body);
            set_marked_bit(tree, &bead.envelope.position, bead.envelope.new_marked);
            Ok(())
        }
        BeadPayload::Tree(p) => {
            restore_tree(tree, &p.new_tree);
            Ok(())
        }
        BeadPayload::Clone(p) => {
            relink(tree, p.v, &p.new_back, &p.new_parent);
            Ok(())
        }
        BeadPayload::Insert(p) => {
            relink(tree, p.inserted.target(), &p.new_back, &p.new_parent);
            if p.paste_as_clone {
                if let Some(after) = &p.after_tree {
                    restore_tree(tree, after);
                }
            }
            Ok(())
        }
        BeadPayload::Delete(p) => {
            tree.select_position(p.new_parent.clone());
            match find_child(tree, &p.new_parent, p.v) {
                Some(pos) => {
                    tree.delete_outline(pos);
                    Ok(())
                }
                None => Err(UndoWarning::StalePosition { kind: bead.kind(), label: bead.label().to_string() }),
            }
        }
        BeadPayload::Move(p) => {
            do_move(tree, p.v, &p.old_position, &p.new_position);
            Ok(())
        }
        BeadPayload::Hoist(p) => {
            tree.hoist(p.position.clone());
            Ok(())
        }
        BeadPayload::Dehoist(_) => {
            tree.dehoist();
            Ok(())
        }
        BeadPayload::Mark => {
            set_marked_bit(tree, &bead.envelope.position, bead.envelope.new_marked);
            Ok(())
        }
        BeadPayload::Sort(p) => {
            tree.set_children_of_parent(p.position.clone(), p.new_children.clone());
            tree.set_position_after_sort(true);
            Ok(())
        }
        BeadPayload::Promote(p) => {
            pull_siblings_under(tree, p);
            Ok(())
        }
        BeadPayload::Demote(p) => {
            push_children_out(tree, p);
            Ok(())
        }
        BeadPayload::ClearRecentFiles(p) => {
            registry.set_recent_files(p.new_recent_files.clone());
            Ok(())
        }
        BeadPayload::Typing(p) => {
            let current = text.all_text();
            text.set_all_text(&p.diff.reconstruct_new(&current));
            Ok(())
        }
        BeadPayload::BeforeGroup(_) => Err(UndoWarning::MissingHandler { kind: bead.kind() }),
        BeadPayload::AfterGroup(g) => {
            for item in g.items.iter() {
                apply_bead_forward(item, tree, text, registry)?;
            }
            Ok(())
        }
    }
}

/// Applies a bead's per-kind mutation in the *undo* direction. See
/// [`apply_bead_forward`] for the group/selection note.
fn apply_bead_reverse(bead: &Bead, tree: &mut dyn TreeHost, text: &mut dyn TextHost, registry: &mut dyn AppRegistry) -> Result<(), UndoWarning> {
    match &bead.payload {
        BeadPayload::Node(p) => {
            tree.set_head_string(bead.envelope.position.clone(), &p.old_head);
            tree.set_body_string(bead.envelope.position.clone(), &p.old_body);
            set_marked_bit(tree, &bead.envelope.position, bead.envelope.old_marked);
            Ok(())
        }
        BeadPayload::Tree(p) => {
            restore_tree(tree, &p.old_tree);
            Ok(())
        }
        BeadPayload::Clone(p) => {
            tree.unlink(p.inserted.clone());
            Ok(())
        }
        BeadPayload::Insert(p) => {
            tree.unlink(p.inserted.clone());
            if p.paste_as_clone {
                if let Some(before) = &p.before_tree {
                    restore_tree(tree, before);
                }
            }
            Ok(())
        }
        BeadPayload::Delete(p) => {
            let relinked = relink(tree, p.v, &p.old_back, &p.old_parent);
            tree.restore_links_in_tree(relinked);
            Ok(())
        }
        BeadPayload::Move(p) => {
            do_move(tree, p.v, &p.new_position, &p.old_position);
            Ok(())
        }
        BeadPayload::Hoist(_) => {
            tree.dehoist();
            Ok(())
        }
        BeadPayload::Dehoist(p) => {
            tree.hoist(p.position.clone());
            Ok(())
        }
        BeadPayload::Mark => {
            set_marked_bit(tree, &bead.envelope.position, bead.envelope.old_marked);
            Ok(())
        }
        BeadPayload::Sort(p) => {
            tree.set_children_of_parent(p.position.clone(), p.old_children.clone());
            tree.set_position_after_sort(true);
            Ok(())
        }
        BeadPayload::Promote(p) => {
            push_children_out(tree, p);
            Ok(())
        }
        BeadPayload::Demote(p) => {
            pull_siblings_under(tree, p);
            Ok(())
        }
        BeadPayload::ClearRecentFiles(p) => {
            registry.set_recent_files(p.old_recent_files.clone());
            Ok(())
        }
        BeadPayload::Typing(p) => {
            let current = text.all_text();
            text.set_all_text(&p.diff.reconstruct_old(&current));
            Ok(())
        }
        BeadPayload::BeforeGroup(_) => Err(UndoWarning::MissingHandler { kind: bead.kind() }),
        BeadPayload::AfterGroup(g) => {
            for item in g.items.iter().rev() {
                apply_bead_reverse(item, tree, text, registry)?;
            }
            Ok(())
        }
    }
}

fn set_marked_bit(tree: &mut dyn TreeHost, p: &Position, marked: bool) {
    if marked {
        tree.set_marked(p.clone());
    } else {
        tree.clear_marked(p.clone());
    }
}

impl UndoEngine for UndoManager {
    fn clear_undo_state(&mut self, menu: &mut dyn MenuHost) {
        self.stack.clear();
        self.undo_menu_label = "Can't Undo".to_string();
        self.redo_menu_label = "Can't Redo".to_string();
        self.enable_menu_items(menu);
    }

    fn can_undo(&self) -> bool {
        self.undo_menu_label.starts_with("Undo ")
    }

    fn can_redo(&self) -> bool {
        self.redo_menu_label.starts_with("Redo ")
    }

    fn enable_menu_items(&self, menu: &mut dyn MenuHost) {
        menu.set_menu_label("Edit", "Undo", &self.undo_menu_label);
        menu.enable_menu("Edit", "Undo", self.can_undo());
        menu.set_menu_label("Edit", "Redo", &self.redo_menu_label);
        menu.enable_menu("Edit", "Redo", self.can_redo());
    }

    fn before_node(&self, tree: &dyn TreeHost, text: &dyn TextHost, p: &Position) -> Bunch {
        if self.is_replaying() {
            return Bunch::Suppressed;
        }
        let v = p.target();
        let (changed, dirty, marked) = capture_status(tree, v);
        let envelope = BeadEnvelope::opening(p.clone(), text.selection_range(), changed, dirty, marked);
        let pending = PendingPayload::Node { v, old_head: tree.head_string(v), old_body: tree.body_string(v) };
        Bunch::Active { envelope, pending }
    }

    fn after_node(&mut self, tree: &dyn TreeHost, text: &dyn TextHost, bunch: Bunch, label: &str, dirty_list: Vec<NodeId>) {
        let Bunch::Active { mut envelope, pending } = bunch else { return };
        let PendingPayload::Node { v, old_head, old_body } = pending else {
            error::report(UndoWarning::ProtocolMisuse { detail: "afterNode without matching beforeNode".into() });
            return;
        };
        envelope.label = label.to_string();
        envelope.new_sel = text.selection_range();
        let (new_changed, new_dirty, new_marked) = capture_status(tree, v);
        envelope.new_changed = new_changed;
        envelope.new_dirty = new_dirty;
        envelope.new_marked = new_marked;
        envelope.dirty_list = dirty_list;
        let payload = BeadPayload::Node(NodePayload {
            v,
            old_head,
            new_head: tree.head_string(v),
            old_body,
            new_body: tree.body_string(v),
        });
        self.push(Bead::new(envelope, payload));
    }

    fn before_tree(&self, tree: &dyn TreeHost, text: &dyn TextHost, p: &Position) -> Bunch {
        if self.is_replaying() {
            return Bunch::Suppressed;
        }
        let v = p.target();
        let (changed, dirty, marked) = capture_status(tree, v);
        let envelope = BeadEnvelope::opening(p.clone(), text.selection_range(), changed, dirty, marked);
        Bunch::Active { envelope, pending: PendingPayload::Tree { old_tree: save_tree(tree, p.clone()) } }
    }

    fn after_tree(&mut self, tree: &dyn TreeHost, text: &dyn TextHost, bunch: Bunch, label: &str, dirty_list: Vec<NodeId>) {
        let Bunch::Active { mut envelope, pending } = bunch else { return };
        let PendingPayload::Tree { old_tree } = pending else {
            error::report(UndoWarning::ProtocolMisuse { detail: "afterTree without matching beforeTree".into() });
            return;
        };
        let v = envelope.position.target();
        envelope.label = label.to_string();
        envelope.new_sel = text.selection_range();
        let (new_changed, new_dirty, new_marked) = capture_status(tree, v);
        envelope.new_changed = new_changed;
        envelope.new_dirty = new_dirty;
        envelope.new_marked = new_marked;
        envelope.dirty_list = dirty_list;
        let new_tree = save_tree(tree, envelope.position.clone());
        self.push(Bead::new(envelope, BeadPayload::Tree(TreePayload { old_tree, new_tree })));
    }

    fn before_clone(&self, tree: &dyn TreeHost, text: &dyn TextHost, p: &Position) -> Bunch {
        if self.is_replaying() {
            return Bunch::Suppressed;
        }
        let v = p.target();
        let (changed, dirty, marked) = capture_status(tree, v);
        let envelope = BeadEnvelope::opening(p.clone(), text.selection_range(), changed, dirty, marked);
        Bunch::Active { envelope, pending: PendingPayload::Clone { v } }
    }

    fn after_clone(
        &mut self,
        tree: &dyn TreeHost,
        text: &dyn TextHost,
        bunch: Bunch,
        label: &str,
        inserted: Position,
        new_back: Option<Position>,
        new_parent: Option<Position>,
        dirty_list: Vec<NodeId>,
    ) {
        let Bunch::Active { mut envelope, pending } = bunch else { return };
        let PendingPayload::Clone { v } = pending else {
            error::report(UndoWarning::ProtocolMisuse { detail: "afterClone without matching beforeClone".into() });
            return;
        };
        envelope.label = label.to_string();
        envelope.new_sel = text.selection_range();
        let (new_changed, new_dirty, new_marked) = capture_status(tree, v);
        envelope.new_changed = new_changed;
        envelope.new_dirty = new_dirty;
        envelope.new_marked = new_marked;
        envelope.dirty_list = dirty_list;
        self.push(Bead::new(envelope, BeadPayload::Clone(ClonePayload { v, inserted, new_back, new_parent })));
    }

    fn before_insert(&self, tree: &dyn TreeHost, text: &dyn TextHost, p: &Position, paste_as_clone: bool) -> Bunch {
        if self.is_replaying() {
            return Bunch::Suppressed;
        }
        let v = p.target();
        let (changed, dirty, marked) = capture_status(tree, v);
        let envelope = BeadEnvelope::opening(p.clone(), text.selection_range(), changed, dirty, marked);
        let before_tree = if paste_as_clone { Some(save_tree(tree, p.clone())) } else { None };
        Bunch::Active { envelope, pending: PendingPayload::Insert { paste_as_clone, before_tree } }
    }

    fn after_insert(
        &mut self,
        tree: &dyn TreeHost,
        text: &dyn TextHost,
        bunch: Bunch,
        label: &str,
        inserted: Position,
        new_back: Option<Position>,
        new_parent: Option<Position>,
        dirty_list: Vec<NodeId>,
    ) {
        let Bunch::Active { mut envelope, pending } = bunch else { return };
        let PendingPayload::Insert { paste_as_clone, before_tree } = pending else {
            error::report(UndoWarning::ProtocolMisuse { detail: "afterInsert without matching beforeInsert".into() });
            return;
        };
        let v = inserted.target();
        envelope.label = label.to_string();
        envelope.new_sel = text.selection_range();
        let (new_changed, new_dirty, new_marked) = capture_status(tree, v);
        envelope.new_changed = new_changed;
        envelope.new_dirty = new_dirty;
        envelope.new_marked = new_marked;
        envelope.dirty_list = dirty_list;
        let after_tree = if paste_as_clone { Some(save_tree(tree, inserted.clone())) } else { None };
        self.push(Bead::new(
            envelope,
            BeadPayload::Insert(InsertPayload { inserted, new_back, new_parent, paste_as_clone, before_tree, after_tree }),
        ));
    }

    fn before_delete(&self, tree: &dyn TreeHost, text: &dyn TextHost, p: &Position) -> Bunch {
        if self.is_replaying() {
            return Bunch::Suppressed;
        }
        let v = p.target();
        let (changed, dirty, marked) = capture_status(tree, v);
        let envelope = BeadEnvelope::opening(p.clone(), text.selection_range(), changed, dirty, marked);
        let pending = PendingPayload::Delete { v, old_back: tree.back(p.clone()), old_parent: tree.parent(p.clone()) };
        Bunch::Active { envelope, pending }
    }

    fn after_delete(&mut self, tree: &dyn TreeHost, text: &dyn TextHost, bunch: Bunch, label: &str, new_parent: Position, dirty_list: Vec<NodeId>) {
        let Bunch::Active { mut envelope, pending } = bunch else { return };
        let PendingPayload::Delete { v, old_back, old_parent } = pending else {
            error::report(UndoWarning::ProtocolMisuse { detail: "afterDelete without matching beforeDelete".into() });
            return;
        };
        envelope.label = label.to_string();
        envelope.new_sel = text.selection_range();
        let (new_changed, new_dirty, new_marked) = capture_status(tree, v);
        envelope.new_changed = new_changed;
        envelope.new_dirty = new_dirty;
        envelope.new_marked = new_marked;
        envelope.dirty_list = dirty_list;
        self.push(Bead::new(envelope, BeadPayload::Delete(DeletePayload { v, old_back, old_parent, new_parent })));
    }

    fn before_move(&self, tree: &dyn TreeHost, text: &dyn TextHost, p: &Position) -> Bunch {
        if self.is_replaying() {
            return Bunch::Suppressed;
        }
        let v = p.target();
        let (changed, dirty, marked) = capture_status(tree, v);
        let envelope = BeadEnvelope::opening(p.clone(), text.selection_range(), changed, dirty, marked);
        Bunch::Active { envelope, pending: PendingPayload::Move { v, old_position: p.clone() } }
    }

    fn after_move(&mut self, tree: &dyn TreeHost, text: &dyn TextHost, bunch: Bunch, label: &str, new_position: Position, dirty_list: Vec<NodeId>) {
        let Bunch::Active { mut envelope, pending } = bunch else { return };
        let PendingPayload::Move { v, old_position } = pending else {
            error::report(UndoWarning::ProtocolMisuse { detail: "afterMove without matching beforeMove".into() });
            return;
        };
        envelope.label = label.to_string();
        envelope.new_sel = text.selection_range();
        let (new_changed, new_dirty, new_marked) = capture_status(tree, v);
        envelope.new_changed = new_changed;
        envelope.new_dirty = new_dirty;
        envelope.new_marked = new_marked;
        envelope.dirty_list = dirty_list;
        self.push(Bead::new(envelope, BeadPayload::Move(MovePayload { v, old_position, new_position })));
    }

    fn before_hoist(&self, tree: &dyn TreeHost, text: &dyn TextHost, p: &Position) -> Bunch {
        if self.is_replaying() {
            return Bunch::Suppressed;
        }
        let v = p.target();
        let (changed, dirty, marked) = capture_status(tree, v);
        let envelope = BeadEnvelope::opening(p.clone(), text.selection_range(), changed, dirty, marked);
        Bunch::Active { envelope, pending: PendingPayload::Hoist { position: p.clone() } }
    }

    fn after_hoist(&mut self, tree: &dyn TreeHost, text: &dyn TextHost, bunch: Bunch, label: &str, dirty_list: Vec<NodeId>) {
        let Bunch::Active { mut envelope, pending } = bunch else { return };
        let PendingPayload::Hoist { position } = pending else {
            error::report(UndoWarning::ProtocolMisuse { detail: "afterHoist without matching beforeHoist".into() });
            return;
        };
        let v = position.target();
        envelope.label = label.to_string();
        envelope.new_sel = text.selection_range();
        let (new_changed, new_dirty, new_marked) = capture_status(tree, v);
        envelope.new_changed = new_changed;
        envelope.new_dirty = new_dirty;
        envelope.new_marked = new_marked;
        envelope.dirty_list = dirty_list;
        self.push(Bead::new(envelope, BeadPayload::Hoist(HoistPayload { position })));
    }

    fn before_dehoist(&self, tree: &dyn TreeHost, text: &dyn TextHost, p: &Position) -> Bunch {
        if self.is_replaying() {
            return Bunch::Suppressed;
        }
        let v = p.target();
        let (changed, dirty, marked) = capture_status(tree, v);
        let envelope = BeadEnvelope::opening(p.clone(), text.selection_range(), changed, dirty, marked);
        Bunch::Active { envelope, pending: PendingPayload::Dehoist { position: p.clone() } }
    }

    fn after_dehoist(&mut self, tree: &dyn TreeHost, text: &dyn TextHost, bunch: Bunch, label: &str, dirty_list: Vec<NodeId>) {
        let Bunch::Active { mut envelope, pending } = bunch else { return };
        let PendingPayload::Dehoist { position } = pending else {
            error::report(UndoWarning::ProtocolMisuse { detail: "afterDehoist without matching beforeDehoist".into() });
            return;
        };
        let v = position.target();
        envelope.label = label.to_string();
        envelope.new_sel = text.selection_range();
        let (new_changed, new_dirty, new_marked) = capture_status(tree, v);
        envelope.new_changed = new_changed;
        envelope.new_dirty = new_dirty;
        envelope.new_marked = new_marked;
        envelope.dirty_list = dirty_list;
        self.push(Bead::new(envelope, BeadPayload::Dehoist(HoistPayload { position })));
    }

    fn before_mark(&self, tree: &dyn TreeHost, text: &dyn TextHost, p: &Position) -> Bunch {
        if self.is_replaying() {
            return Bunch::Suppressed;
        }
        let v = p.target();
        let (changed, dirty, marked) = capture_status(tree, v);
        let envelope = BeadEnvelope::opening(p.clone(), text.selection_range(), changed, dirty, marked);
        Bunch::Active { envelope, pending: PendingPayload::Mark { v } }
    }

    fn after_mark(&mut self, tree: &dyn TreeHost, text: &dyn TextHost, bunch: Bunch, label: &str, dirty_list: Vec<NodeId>) {
        let Bunch::Active { mut envelope, pending } = bunch else { return };
        let PendingPayload::Mark { v } = pending else {
            error::report(UndoWarning::ProtocolMisuse { detail: "afterMark without matching beforeMark".into() });
            return;
        };
        envelope.label = label.to_string();
        envelope.new_sel = text.selection_range();
        let (new_changed, new_dirty, new_marked) = capture_status(tree, v);
        envelope.new_changed = new_changed;
        envelope.new_dirty = new_dirty;
        envelope.new_marked = new_marked;
        envelope.dirty_list = dirty_list;
        self.push(Bead::new(envelope, BeadPayload::Mark));
    }

    fn before_sort(&self, tree: &dyn TreeHost, text: &dyn TextHost, p: &Position) -> Bunch {
        if self.is_replaying() {
            return Bunch::Suppressed;
        }
        let v = p.target();
        let (changed, dirty, marked) = capture_status(tree, v);
        let envelope = BeadEnvelope::opening(p.clone(), text.selection_range(), changed, dirty, marked);
        Bunch::Active { envelope, pending: PendingPayload::Sort { old_children: tree.children_of_parent(p.clone()) } }
    }

    fn after_sort(&mut self, tree: &dyn TreeHost, text: &dyn TextHost, bunch: Bunch, label: &str, dirty_list: Vec<NodeId>) {
        let Bunch::Active { mut envelope, pending } = bunch else { return };
        let PendingPayload::Sort { old_children } = pending else {
            error::report(UndoWarning::ProtocolMisuse { detail: "afterSort without matching beforeSort".into() });
            return;
        };
        // beforeSort already installed the handlers this bead needs (see
        // Design Note); afterSort only finalizes dirty list and selection.
        let v = envelope.position.target();
        envelope.label = label.to_string();
        envelope.new_sel = text.selection_range();
        let (new_changed, new_dirty, new_marked) = capture_status(tree, v);
        envelope.new_changed = new_changed;
        envelope.new_dirty = new_dirty;
        envelope.new_marked = new_marked;
        envelope.dirty_list = dirty_list;
        let new_children = tree.children_of_parent(envelope.position.clone());
        self.push(Bead::new(envelope, BeadPayload::Sort(SortPayload { position: envelope.position.clone(), old_children, new_children })));
    }

    fn before_promote(&self, tree: &dyn TreeHost, text: &dyn TextHost, p: &Position, k: usize) -> Bunch {
        if self.is_replaying() {
            return Bunch::Suppressed;
        }
        let v = p.target();
        let (changed, dirty, marked) = capture_status(tree, v);
        let envelope = BeadEnvelope::opening(p.clone(), text.selection_range(), changed, dirty, marked);
        Bunch::Active { envelope, pending: PendingPayload::Promote { n: p.child_index(), k } }
    }

    fn after_promote(&mut self, tree: &dyn TreeHost, text: &dyn TextHost, bunch: Bunch, label: &str, dirty_list: Vec<NodeId>) {
        let Bunch::Active { mut envelope, pending } = bunch else { return };
        let PendingPayload::Promote { n, k } = pending else {
            error::report(UndoWarning::ProtocolMisuse { detail: "afterPromote without matching beforePromote".into() });
            return;
        };
        let v = envelope.position.target();
        envelope.label = label.to_string();
        envelope.new_sel = text.selection_range();
        let (new_changed, new_dirty, new_marked) = capture_status(tree, v);
        envelope.new_changed = new_changed;
        envelope.new_dirty = new_dirty;
        envelope.new_marked = new_marked;
        envelope.dirty_list = dirty_list;
        self.push(Bead::new(envelope.clone(), BeadPayload::Promote(PromoteDemotePayload { position: envelope.position, n, k })));
    }

    fn before_demote(&self, tree: &dyn TreeHost, text: &dyn TextHost, p: &Position, k: usize) -> Bunch {
        if self.is_replaying() {
            return Bunch::Suppressed;
        }
        let v = p.target();
        let (changed, dirty, marked) = capture_status(tree, v);
        let envelope = BeadEnvelope::opening(p.clone(), text.selection_range(), changed, dirty, marked);
        Bunch::Active { envelope, pending: PendingPayload::Demote { n: p.child_index(), k } }
    }

    fn after_demote(&mut self, tree: &dyn TreeHost, text: &dyn TextHost, bunch: Bunch, label: &str, dirty_list: Vec<NodeId>) {
        let Bunch::Active { mut envelope, pending } = bunch else { return };
        let PendingPayload::Demote { n, k } = pending else {
            error::report(UndoWarning::ProtocolMisuse { detail: "afterDemote without matching beforeDemote".into() });
            return;
        };
        let v = envelope.position.target();
        envelope.label = label.to_string();
        envelope.new_sel = text.selection_range();
        let (new_changed, new_dirty, new_marked) = capture_status(tree, v);
        envelope.new_changed = new_changed;
        envelope.new_dirty = new_dirty;
        envelope.new_marked = new_marked;
        envelope.dirty_list = dirty_list;
        self.push(Bead::new(envelope.clone(), BeadPayload::Demote(PromoteDemotePayload { position: envelope.position, n, k })));
    }

    fn before_clear_recent_files(&self, registry: &dyn AppRegistry, tree: &dyn TreeHost, text: &dyn TextHost, p: &Position) -> Bunch {
        if self.is_replaying() {
            return Bunch::Suppressed;
        }
        let v = p.target();
        let (changed, dirty, marked) = capture_status(tree, v);
        let envelope = BeadEnvelope::opening(p.clone(), text.selection_range(), changed, dirty, marked);
        Bunch::Active { envelope, pending: PendingPayload::ClearRecentFiles { old_recent_files: registry.recent_files() } }
    }

    fn after_clear_recent_files(&mut self, registry: &dyn AppRegistry, tree: &dyn TreeHost, text: &dyn TextHost, bunch: Bunch, label: &str, dirty_list: Vec<NodeId>) {
        let Bunch::Active { mut envelope, pending } = bunch else { return };
        let PendingPayload::ClearRecentFiles { old_recent_files } = pending else {
            error::report(UndoWarning::ProtocolMisuse { detail: "afterClearRecentFiles without matching beforeClearRecentFiles".into() });
            return;
        };
        let v = envelope.position.target();
        envelope.label = label.to_string();
        envelope.new_sel = text.selection_range();
        let (new_changed, new_dirty, new_marked) = capture_status(tree, v);
        envelope.new_changed = new_changed;
        envelope.new_dirty = new_dirty;
        envelope.new_marked = new_marked;
        envelope.dirty_list = dirty_list;
        let new_recent_files = registry.recent_files();
        self.push(Bead::new(envelope, BeadPayload::ClearRecentFiles(ClearRecentFilesPayload { old_recent_files, new_recent_files })));
    }

    fn before_change_group(&mut self, tree: &dyn TreeHost, text: &dyn TextHost, p: &Position, label: &str) {
        if self.is_replaying() {
            return;
        }
        self.group_depth += 1;
        let v = p.target();
        let (changed, dirty, marked) = capture_status(tree, v);
        let mut envelope = BeadEnvelope::opening(p.clone(), text.selection_range(), changed, dirty, marked);
        envelope.label = label.to_string();
        self.push(Bead::new(envelope, BeadPayload::BeforeGroup(GroupPayload { items: Vec::new(), report_flag: false })));
    }

    fn after_change_group(&mut self, tree: &dyn TreeHost, text: &dyn TextHost, p: &Position, label: &str, report_flag: bool, dirty_list: Vec<NodeId>) {
        if self.is_replaying() {
            return;
        }
        self.group_depth = self.group_depth.saturating_sub(1);
        let v = p.target();
        let (new_changed, new_dirty, new_marked) = capture_status(tree, v);
        let closed = self.stack.close_top_group(
            label.to_string(),
            text.selection_range(),
            new_changed,
            new_dirty,
            new_marked,
            dirty_list,
            report_flag,
        );
        if !closed {
            error::report(UndoWarning::ProtocolMisuse { detail: "afterChangeGroup with no open beforeGroup at top of stack".into() });
        }
        self.update_menu_labels();
    }

    fn set_undo_typing_params(
        &mut self,
        tree: &dyn TreeHost,
        text: &dyn TextHost,
        menu: &mut dyn MenuHost,
        config: &dyn ConfigHost,
        p: &Position,
        label: &str,
        old_text: &str,
        new_text: &str,
        old_sel: (usize, usize),
        new_sel: (usize, usize),
        old_yview: Option<YView>,
    ) {
        if self.is_replaying() {
            return;
        }
        if old_text == new_text {
            self.update_menu_labels();
            self.enable_menu_items(menu);
            return;
        }

        let v = p.target();
        let new_diff = TextDiff::compute(old_text, new_text, old_sel, new_sel);
        tracing::debug!(label, summary = %crate::text_diff::debug_summary(old_text, new_text), "typing edit");

        let granularity = Granularity::parse_reporting(&config.undo_granularity());
        let extend = match self.stack.top_for_undo() {
            Some(top) => match &top.payload {
                BeadPayload::Typing(prev) => {
                    let prev_node = top.envelope.position.target();
                    let check = ExtendCheck {
                        granularity,
                        same_node: prev_node == v,
                        prev_diff: &prev.diff,
                        new_diff: &new_diff,
                        event_old_sel: old_sel,
                        event_new_sel: new_sel,
                        old_ch: char_before(old_text, old_sel.0, old_sel.1),
                        new_ch: char_before(new_text, new_sel.0, new_sel.1),
                        recognize_start_of_typing_word: self.recognize_start_of_typing_word.as_ref(),
                    };
                    should_extend(v, prev_node, &check)
                }
                _ => false,
            },
            None => false,
        };

        if extend {
            let (new_changed, new_dirty, new_marked) = capture_status(tree, v);
            if let Some(top) = self.stack.top_for_undo_mut() {
                if let BeadPayload::Typing(prev) = &mut top.payload {
                    prev.diff.leading = new_diff.leading;
                    prev.diff.trailing = new_diff.trailing;
                    prev.diff.new_middle_lines = new_diff.new_middle_lines;
                    prev.diff.new_newlines = new_diff.new_newlines;
                }
                top.envelope.new_sel = new_sel;
                top.envelope.new_changed = new_changed;
                top.envelope.new_dirty = new_dirty;
                top.envelope.new_marked = new_marked;
            }
        } else {
            let (changed, dirty, marked) = capture_status(tree, v);
            let mut envelope = BeadEnvelope::opening(p.clone(), old_sel, changed, dirty, marked);
            envelope.label = label.to_string();
            envelope.new_sel = new_sel;
            self.push(Bead::new(envelope, BeadPayload::Typing(TypingPayload { diff: new_diff, old_yview })));
        }
        self.update_menu_labels();
        self.enable_menu_items(menu);
    }

    fn undo(&mut self, tree: &mut dyn TreeHost, text: &mut dyn TextHost, menu: &mut dyn MenuHost, registry: &mut dyn AppRegistry) {
        if !self.stack.can_undo() {
            return;
        }
        let bead = self.stack.top_for_undo().expect("checked can_undo").clone();
        {
            let _guard = ReplayGuard::new(&mut self.undoing);
            let outcome = catch_unwind(AssertUnwindSafe(|| apply_bead_reverse(&bead, tree, text, registry)));
            match outcome {
                Ok(Ok(())) => {
                    tree.set_dirty(bead.envelope.position.clone(), false);
                    tree.set_all_ancestor_file_nodes_dirty(bead.envelope.position.clone());
                    tree.set_changed(bead.envelope.old_changed);
                    text.set_selection_range(bead.envelope.old_sel, bead.envelope.old_sel.1);
                    if let BeadPayload::Typing(p) = &bead.payload {
                        if let Some(y) = p.old_yview {
                            text.set_y_scroll_position(y);
                        }
                    }
                    text.force_full_recolor();
                }
                Ok(Err(warning)) => {
                    error::report(warning);
                }
                Err(_) => {
                    error::report(UndoWarning::ReplayFailure { kind: bead.kind(), label: bead.label().to_string() });
                }
            }
        }
        self.stack.advance_after_undo();
        self.update_menu_labels();
        self.enable_menu_items(menu);
    }

    fn redo(&mut self, tree: &mut dyn TreeHost, text: &mut dyn TextHost, menu: &mut dyn MenuHost, registry: &mut dyn AppRegistry) {
        if !self.stack.can_redo() {
            return;
        }
        let bead = self.stack.top_for_redo().expect("checked can_redo").clone();
        {
            let _guard = ReplayGuard::new(&mut self.redoing);
            let outcome = catch_unwind(AssertUnwindSafe(|| apply_bead_forward(&bead, tree, text, registry)));
            match outcome {
                Ok(Ok(())) => {
                    tree.set_dirty(bead.envelope.position.clone(), false);
                    tree.set_all_ancestor_file_nodes_dirty(bead.envelope.position.clone());
                    tree.set_changed(bead.envelope.new_changed);
                    text.set_selection_range(bead.envelope.new_sel, bead.envelope.new_sel.1);
                    text.force_full_recolor();
                }
                Ok(Err(warning)) => {
                    error::report(warning);
                }
                Err(_) => {
                    error::report(UndoWarning::ReplayFailure { kind: bead.kind(), label: bead.label().to_string() });
                }
            }
        }
        self.stack.advance_after_redo();
        self.update_menu_labels();
        self.enable_menu_items(menu);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::testkit::{InMemoryRegistry, InMemoryText, InMemoryTree, MapConfig, NullMenu};

    fn manager() -> (UndoManager, InMemoryTree, InMemoryText, NullMenu, InMemoryRegistry) {
        let config = MapConfig::default();
        (UndoManager::new(&config), InMemoryTree::new(), InMemoryText::new(""), NullMenu::default(), InMemoryRegistry::default())
    }

    #[test]
    fn invariant3_after_node_enables_undo_disables_redo() {
        let (mut mgr, mut tree, text, mut menu, _registry) = manager();
        let root = tree.insert_root("Root", "body");
        let bunch = mgr.before_node(&tree, &text, &root);
        tree.set_head_string(root.clone(), "New head");
        mgr.after_node(&tree, &text, bunch, "Change Headline", vec![]);
        mgr.enable_menu_items(&mut menu);
        assert!(mgr.can_undo());
        assert!(!mgr.can_redo());
    }

    #[test]
    fn s3_insert_delete_round_trip() {
        let (mut mgr, mut tree, text, mut menu, mut registry) = manager();
        let mut text_host = InMemoryText::new("");
        let root = tree.insert_root("Root", "");

        let bunch = mgr.before_insert(&tree, &text, &root, false);
        let inserted = tree.insert_child(&root, "A", "");
        mgr.after_insert(&tree, &text, bunch, "Insert Node", inserted.clone(), None, Some(root.clone()), vec![]);

        let bunch = mgr.before_delete(&tree, &text, &inserted);
        tree.delete_outline(inserted.clone());
        mgr.after_delete(&tree, &text, bunch, "Delete Node", root.clone(), vec![]);

        assert!(tree.first_child(root.clone()).is_none());

        mgr.undo(&mut tree, &mut text_host, &mut menu, &mut registry);
        assert!(tree.first_child(root.clone()).is_some());
        mgr.undo(&mut tree, &mut text_host, &mut menu, &mut registry);
        assert!(tree.first_child(root.clone()).is_none());

        mgr.redo(&mut tree, &mut text_host, &mut menu, &mut registry);
        assert!(tree.first_child(root.clone()).is_some());
        mgr.redo(&mut tree, &mut text_host, &mut menu, &mut registry);
        assert!(tree.first_child(root).is_none());
    }

    #[test]
    fn s4_group_of_three_node_edits_grows_stack_by_one() {
        let (mut mgr, mut tree, text, mut menu, mut registry) = manager();
        let a = tree.insert_root("A", "1");
        let b = tree.insert_root("B", "2");
        let c = tree.insert_root("C", "3");

        mgr.before_change_group(&tree, &text, &a, "Replace All");
        for (p, new_body) in [(&a, "one"), (&b, "two"), (&c, "three")] {
            let bunch = mgr.before_node(&tree, &text, p);
            tree.set_body_string(p.clone(), new_body);
            mgr.after_node(&tree, &text, bunch, "Replace All", vec![]);
        }
        mgr.after_change_group(&tree, &text, &a, "Replace All", true, vec![]);

        assert_eq!(mgr.stack_len(), 1);

        let mut text_host = InMemoryText::new("");
        mgr.undo(&mut tree, &mut text_host, &mut menu, &mut registry);
        assert_eq!(tree.body_string(a.target()), "1");
        assert_eq!(tree.body_string(b.target()), "2");
        assert_eq!(tree.body_string(c.target()), "3");

        mgr.redo(&mut tree, &mut text_host, &mut menu, &mut registry);
        assert_eq!(tree.body_string(a.target()), "one");
        assert_eq!(tree.body_string(b.target()), "two");
        assert_eq!(tree.body_string(c.target()), "three");
    }

    #[test]
    fn s6_stack_bound_of_three() {
        let config = MapConfig::new(Granularity::Line, 3);
        let mut mgr = UndoManager::new(&config);
        let mut tree = InMemoryTree::new();
        let text = InMemoryText::new("");
        for i in 0..5 {
            let root = tree.insert_root(&format!("N{i}"), "");
            let bunch = mgr.before_node(&tree, &text, &root);
            tree.set_head_string(root.clone(), "changed");
            mgr.after_node(&tree, &text, bunch, "Edit", vec![]);
        }
        assert_eq!(mgr.stack_len(), 3);
    }

    #[test]
    fn s1_word_granularity_coalesces_into_one_bead() {
        let config = MapConfig::new(Granularity::Word, 0);
        let mut mgr = UndoManager::new(&config);
        let mut tree = InMemoryTree::new();
        let text = InMemoryText::new("");
        let mut menu = NullMenu::default();
        let mut registry = InMemoryRegistry::default();
        let root = tree.insert_root("Root", "");

        let mut body = String::new();
        for ch in "hello".chars() {
            let old = body.clone();
            body.push(ch);
            let old_sel = (0, old.chars().count());
            let new_sel = (0, body.chars().count());
            mgr.set_undo_typing_params(&tree, &text, &mut menu, &config, &root, "Typing", &old, &body, old_sel, new_sel, None);
        }
        assert_eq!(mgr.stack_len(), 1);

        let mut text_host = InMemoryText::new(&body);
        mgr.undo(&mut tree, &mut text_host, &mut menu, &mut registry);
        assert_eq!(text_host.all_text(), "");

        mgr.redo(&mut tree, &mut text_host, &mut menu, &mut registry);
        assert_eq!(text_host.all_text(), "hello");
    }

    #[test]
    fn s2_word_granularity_splits_on_space_boundary() {
        let config = MapConfig::new(Granularity::Word, 0);
        let mut mgr = UndoManager::new(&config);
        let mut tree = InMemoryTree::new();
        let text = InMemoryText::new("");
        let mut menu = NullMenu::default();
        let mut registry = InMemoryRegistry::default();
        let root = tree.insert_root("Root", "");

        let mut body = String::new();
        for ch in "hi world".chars() {
            let old = body.clone();
            body.push(ch);
            let old_sel = (0, old.chars().count());
            let new_sel = (0, body.chars().count());
            mgr.set_undo_typing_params(&tree, &text, &mut menu, &config, &root, "Typing", &old, &body, old_sel, new_sel, None);
        }
        // "hi" runs up to the space, which closes that bead; "world" opens
        // and grows a second one.
        assert_eq!(mgr.stack_len(), 2);

        let mut text_host = InMemoryText::new(&body);
        mgr.undo(&mut tree, &mut text_host, &mut menu, &mut registry);
        assert_eq!(text_host.all_text(), "hi");
        mgr.undo(&mut tree, &mut text_host, &mut menu, &mut registry);
        assert_eq!(text_host.all_text(), "");

        mgr.redo(&mut tree, &mut text_host, &mut menu, &mut registry);
        assert_eq!(text_host.all_text(), "hi");
        mgr.redo(&mut tree, &mut text_host, &mut menu, &mut registry);
        assert_eq!(text_host.all_text(), "hi world");
    }

    #[test]
    fn s5_clone_survives_delete_of_original() {
        let (mut mgr, mut tree, text, mut menu, mut registry) = manager();
        let mut text_host = InMemoryText::new("");
        let root_a = tree.insert_root("A", "");
        let root_b = tree.insert_root("B", "");
        let v_pos = tree.insert_child(&root_a, "V", "body-v");
        let v = v_pos.target();

        let bunch = mgr.before_clone(&tree, &text, &v_pos);
        let clone_pos = tree.link_as_nth_child(v, root_b.clone(), 0);
        mgr.after_clone(&tree, &text, bunch, "Clone Node", clone_pos, None, Some(root_b.clone()), vec![]);

        let bunch = mgr.before_delete(&tree, &text, &v_pos);
        tree.delete_outline(v_pos.clone());
        mgr.after_delete(&tree, &text, bunch, "Delete Node", root_a.clone(), vec![]);

        assert!(tree.first_child(root_a.clone()).is_none());
        assert!(tree.first_child(root_b.clone()).is_some());
        assert_eq!(tree.head_string(v), "V");
        assert_eq!(tree.body_string(v), "body-v");

        // First undo reverts the delete: both appearances come back, and
        // the clone's own existence was never touched by the delete.
        mgr.undo(&mut tree, &mut text_host, &mut menu, &mut registry);
        assert!(tree.first_child(root_a.clone()).is_some());
        assert!(tree.first_child(root_b.clone()).is_some());
        assert_eq!(tree.head_string(v), "V");
        assert_eq!(tree.body_string(v), "body-v");

        // Second undo reverts the clone itself, leaving only the original.
        mgr.undo(&mut tree, &mut text_host, &mut menu, &mut registry);
        assert!(tree.first_child(root_b.clone()).is_none());
        assert!(tree.first_child(root_a).is_some());
    }

    #[test]
    fn typing_idempotence_produces_no_bead() {
        let (mut mgr, tree, text, mut menu, _registry) = manager();
        let config = MapConfig::default();
        let p = Position::root(NodeId::default());
        mgr.set_undo_typing_params(&tree, &text, &mut menu, &config, &p, "Typing", "same", "same", (0, 0), (0, 0), None);
        assert_eq!(mgr.stack_len(), 0);
    }
}
