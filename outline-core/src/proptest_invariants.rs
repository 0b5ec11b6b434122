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

//! Property-based tests for the testable-property invariants (spec §8,
//! items 1, 2, 4 and 7). Kept as a dedicated module rather than inline in
//! `undo_manager` because each property drives many random action
//! sequences against the full `UndoManager` + `InMemoryTree` stack rather
//! than exercising one function in isolation.

use proptest::prelude::*;

use crate::granularity::Granularity;
use crate::host::node::Position;
use crate::host::testkit::{InMemoryRegistry, InMemoryText, InMemoryTree, MapConfig, NullMenu};
use crate::host::tree::TreeHost;
use crate::undo_manager::{UndoEngine, UndoManager};

/// One step of a randomly generated action sequence. Only `node` and
/// `insert`/`delete` actions are generated: together they're enough to
/// exercise the stack push/undo/redo/truncation machinery invariants 1,
/// 2, 4 and 7 care about, without needing a generator for every bead kind.
#[derive(Debug, Clone)]
enum Step {
    EditBody(usize, String),
    InsertChild(usize),
    DeleteLastChild(usize),
}

fn arb_step() -> impl Strategy<Value = Step> {
    prop_oneof![
        (0usize..4, "[a-z]{1,6}").prop_map(|(i, s)| Step::EditBody(i, s)),
        (0usize..4).prop_map(Step::InsertChild),
        (0usize..4).prop_map(Step::DeleteLastChild),
    ]
}

/// A harness bundling the engine with enough roots that `Step` indices
/// always resolve to something, and tracking inserted-child positions so
/// `DeleteLastChild` has something to act on.
struct Harness {
    mgr: UndoManager,
    tree: InMemoryTree,
    text: InMemoryText,
    menu: NullMenu,
    registry: InMemoryRegistry,
    roots: Vec<Position>,
    last_child: Vec<Option<Position>>,
}

impl Harness {
    fn new(max_undo_stack_size: usize) -> Self {
        let config = MapConfig::new(Granularity::Line, max_undo_stack_size);
        let mut tree = InMemoryTree::new();
        let roots: Vec<Position> = (0..4).map(|i| tree.insert_root(&format!("N{i}"), "seed")).collect();
        Self {
            mgr: UndoManager::new(&config),
            tree,
            text: InMemoryText::new(""),
            menu: NullMenu::default(),
            registry: InMemoryRegistry::default(),
            last_child: vec![None; roots.len()],
            roots,
        }
    }

    fn apply(&mut self, step: &Step) {
        match step {
            Step::EditBody(i, body) => {
                let p = self.roots[*i].clone();
                let bunch = self.mgr.before_node(&self.tree, &self.text, &p);
                self.tree.set_body_string(p.clone(), body);
                self.mgr.after_node(&self.tree, &self.text, bunch, "Edit Body", vec![]);
            }
            Step::InsertChild(i) => {
                let parent = self.roots[*i].clone();
                let bunch = self.mgr.before_insert(&self.tree, &self.text, &parent, false);
                let inserted = self.tree.insert_child(&parent, "Child", "");
                self.mgr
                    .after_insert(&self.tree, &self.text, bunch, "Insert Node", inserted.clone(), None, Some(parent), vec![]);
                self.last_child[*i] = Some(inserted);
            }
            Step::DeleteLastChild(i) => {
                if let Some(child) = self.last_child[*i].take() {
                    let parent = self.roots[*i].clone();
                    let bunch = self.mgr.before_delete(&self.tree, &self.text, &child);
                    self.tree.delete_outline(child);
                    self.mgr.after_delete(&self.tree, &self.text, bunch, "Delete Node", parent, vec![]);
                }
            }
        }
    }

    fn snapshot(&self) -> Vec<(String, String, Vec<String>)> {
        self.roots
            .iter()
            .map(|p| {
                let v = p.target();
                let children: Vec<String> = self
                    .tree
                    .subtree(p.clone())
                    .into_iter()
                    .skip(1)
                    .map(|c| self.tree.head_string(c.target()))
                    .collect();
                (self.tree.head_string(v), self.tree.body_string(v), children)
            })
            .collect()
    }

    fn undo(&mut self) {
        self.mgr.undo(&mut self.tree, &mut self.text, &mut self.menu, &mut self.registry);
    }

    fn redo(&mut self) {
        self.mgr.redo(&mut self.tree, &mut self.text, &mut self.menu, &mut self.registry);
    }
}

proptest! {
    /// Invariant 1: applying a sequence then undoing it |A| times restores
    /// the pre-sequence state.
    #[test]
    fn invariant1_undo_all_restores_initial_state(steps in prop::collection::vec(arb_step(), 0..20)) {
        let mut h = Harness::new(0);
        let before = h.snapshot();
        for step in &steps {
            h.apply(step);
        }
        for _ in 0..steps.len() {
            h.undo();
        }
        prop_assert_eq!(h.snapshot(), before);
    }

    /// Invariant 2: undoing then redoing the same sequence returns to the
    /// post-sequence state.
    #[test]
    fn invariant2_undo_then_redo_restores_post_state(steps in prop::collection::vec(arb_step(), 0..20)) {
        let mut h = Harness::new(0);
        for step in &steps {
            h.apply(step);
        }
        let after = h.snapshot();
        for _ in 0..steps.len() {
            h.undo();
        }
        for _ in 0..steps.len() {
            h.redo();
        }
        prop_assert_eq!(h.snapshot(), after);
    }

    /// Invariant 4: with a bounded stack and no open group, the stack
    /// never holds more than `max_undo_stack_size` beads.
    #[test]
    fn invariant4_stack_never_exceeds_bound(
        steps in prop::collection::vec(arb_step(), 0..30),
        bound in 1usize..6,
    ) {
        let mut h = Harness::new(bound);
        for step in &steps {
            h.apply(step);
            prop_assert!(h.mgr.stack_len() <= bound);
        }
    }

    /// Invariant 7 (char/node corners): at `char` granularity, k distinct
    /// single-character typing events always yield k beads; at `node`
    /// granularity, they collapse to 1 bead as long as they all target the
    /// same node.
    #[test]
    fn invariant7_char_granularity_never_coalesces(chars in "[a-z]{1,8}") {
        let config = MapConfig::new(Granularity::Char, 0);
        let mut mgr = UndoManager::new(&config);
        let tree = InMemoryTree::new();
        let text = InMemoryText::new("");
        let mut menu = NullMenu::default();
        let p = Position::root(crate::host::node::NodeId::default());

        let mut running = String::new();
        for ch in chars.chars() {
            let old = running.clone();
            running.push(ch);
            mgr.set_undo_typing_params(&tree, &text, &mut menu, &config, &p, "Typing", &old, &running, (0, old.len()), (0, running.len()), None);
        }
        prop_assert_eq!(mgr.stack_len(), chars.chars().count());
    }

    #[test]
    fn invariant7_node_granularity_coalesces_same_node(chars in "[a-z]{1,8}") {
        let config = MapConfig::new(Granularity::Node, 0);
        let mut mgr = UndoManager::new(&config);
        let tree = InMemoryTree::new();
        let text = InMemoryText::new("");
        let mut menu = NullMenu::default();
        let p = Position::root(crate::host::node::NodeId::default());

        let mut running = String::new();
        for ch in chars.chars() {
            let old = running.clone();
            running.push(ch);
            mgr.set_undo_typing_params(&tree, &text, &mut menu, &config, &p, "Typing", &old, &running, (0, old.len()), (0, running.len()), None);
        }
        prop_assert_eq!(mgr.stack_len(), if chars.is_empty() { 0 } else { 1 });
    }
}
