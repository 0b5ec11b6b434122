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

//! A minimal line-oriented REPL driving `outline-core`'s `UndoManager`
//! against the in-memory `testkit` hosts. Not a real editor frontend —
//! just enough surface to demonstrate (and, by hand, poke holes in) every
//! bead kind from a terminal.

use std::io::{self, Write};

use outline_core::host::node::Position;
use outline_core::host::testkit::{InMemoryRegistry, InMemoryText, InMemoryTree, MapConfig, NullMenu};
use outline_core::host::tree::TreeHost;
use outline_core::{Granularity, UndoEngine, UndoManager};

struct Session {
    tree: InMemoryTree,
    text: InMemoryText,
    menu: NullMenu,
    registry: InMemoryRegistry,
    mgr: UndoManager,
    config: MapConfig,
    current: Position,
}

impl Session {
    fn new(granularity: Granularity, max_undo_stack_size: usize) -> Self {
        let config = MapConfig::new(granularity, max_undo_stack_size);
        let mut tree = InMemoryTree::new();
        let current = tree.insert_root("root", "");
        Self {
            mgr: UndoManager::new(&config),
            tree,
            text: InMemoryText::new(""),
            menu: NullMenu::default(),
            registry: InMemoryRegistry::default(),
            config,
            current,
        }
    }

    fn print_outline(&self) {
        let mut child = self.tree.first_child(self.tree.root_position());
        while let Some(c) = child {
            self.print_subtree(&c, 0);
            child = self.tree.next(c);
        }
    }

    fn print_subtree(&self, p: &Position, depth: usize) {
        let marker = if p.target() == self.current.target() { "*" } else { " " };
        let marked = if self.tree.is_marked(p.target()) { " [marked]" } else { "" };
        println!(
            "{marker}{}- {} ({}){marked}",
            "  ".repeat(depth),
            self.tree.head_string(p.target()),
            self.tree.body_string(p.target())
        );
        let mut child = self.tree.first_child(p.clone());
        while let Some(c) = child {
            self.print_subtree(&c, depth + 1);
            child = self.tree.next(c);
        }
    }

    /// Copies the live text-widget buffer back into the current node's
    /// body, the way a real body-pane binding would after any edit to the
    /// focused buffer (including an undo/redo of a typing bead).
    fn sync_body_from_text(&mut self) {
        let text = self.text.all_text();
        self.tree.set_body_string(self.current.clone(), &text);
    }

    fn cmd_new(&mut self, head: &str) {
        let parent = self.tree.root_position();
        let bunch = self.mgr.before_insert(&self.tree, &self.text, &parent, false);
        let inserted = self.tree.insert_child(&parent, head, "");
        self.mgr
            .after_insert(&self.tree, &self.text, bunch, "New Node", inserted.clone(), None, Some(parent), vec![]);
        self.current = inserted;
    }

    fn cmd_child(&mut self, head: &str) {
        let parent = self.current.clone();
        let bunch = self.mgr.before_insert(&self.tree, &self.text, &parent, false);
        let inserted = self.tree.insert_child(&parent, head, "");
        self.mgr
            .after_insert(&self.tree, &self.text, bunch, "Insert Child", inserted.clone(), None, Some(parent), vec![]);
        self.current = inserted;
    }

    fn cmd_delete(&mut self) {
        let parent = self.tree.parent(self.current.clone()).unwrap_or_else(|| self.tree.root_position());
        let bunch = self.mgr.before_delete(&self.tree, &self.text, &self.current);
        self.tree.delete_outline(self.current.clone());
        self.mgr.after_delete(&self.tree, &self.text, bunch, "Delete Node", parent.clone(), vec![]);
        self.current = parent;
    }

    fn cmd_head(&mut self, new_head: &str) {
        let p = self.current.clone();
        let bunch = self.mgr.before_node(&self.tree, &self.text, &p);
        self.tree.set_head_string(p.clone(), new_head);
        self.mgr.after_node(&self.tree, &self.text, bunch, "Change Headline", vec![]);
    }

    fn cmd_body(&mut self, new_body: &str) {
        let p = self.current.clone();
        let bunch = self.mgr.before_node(&self.tree, &self.text, &p);
        self.tree.set_body_string(p.clone(), new_body);
        self.mgr.after_node(&self.tree, &self.text, bunch, "Change Body", vec![]);
    }

    fn cmd_type(&mut self, appended: &str) {
        let old_text = self.tree.body_string(self.current.target());
        self.text.set_all_text(&old_text);
        let new_text = format!("{old_text}{appended}");
        let old_sel = last_row_col(&old_text);
        let new_sel = last_row_col(&new_text);
        self.text.set_all_text(&new_text);
        self.mgr.set_undo_typing_params(
            &self.tree,
            &self.text,
            &mut self.menu,
            &self.config,
            &self.current,
            "Typing",
            &old_text,
            &new_text,
            old_sel,
            new_sel,
            None,
        );
        self.sync_body_from_text();
    }

    fn cmd_mark(&mut self, marked: bool) {
        let p = self.current.clone();
        let bunch = self.mgr.before_mark(&self.tree, &self.text, &p);
        if marked {
            self.tree.set_marked(p.clone());
        } else {
            self.tree.clear_marked(p.clone());
        }
        self.mgr
            .after_mark(&self.tree, &self.text, bunch, if marked { "Mark" } else { "Unmark" }, vec![]);
    }

    fn cmd_sort(&mut self) {
        let bunch = self.mgr.before_sort(&self.tree, &self.text, &self.current);
        let mut children = self.tree.children_of_parent(self.current.clone());
        children.sort_by_key(|v| self.tree.head_string(*v));
        self.tree.set_children_of_parent(self.current.clone(), children);
        self.mgr.after_sort(&self.tree, &self.text, bunch, "Sort Siblings", vec![]);
    }

    fn cmd_clone(&mut self) {
        let parent = self.tree.root_position();
        let bunch = self.mgr.before_clone(&self.tree, &self.text, &self.current);
        let v = self.current.target();
        let inserted = self.tree.link_as_nth_child(v, parent.clone(), 0);
        self.mgr
            .after_clone(&self.tree, &self.text, bunch, "Clone Node", inserted.clone(), None, Some(parent), vec![]);
        self.current = inserted;
    }

    fn cmd_undo(&mut self) {
        self.mgr.undo(&mut self.tree, &mut self.text, &mut self.menu, &mut self.registry);
        self.sync_body_from_text();
    }

    fn cmd_redo(&mut self) {
        self.mgr.redo(&mut self.tree, &mut self.text, &mut self.menu, &mut self.registry);
        self.sync_body_from_text();
    }

    fn cmd_status(&mut self) {
        self.mgr.enable_menu_items(&mut self.menu);
        println!("can-undo: {}  can-redo: {}", self.mgr.can_undo(), self.mgr.can_redo());
    }
}

/// `(row, col)` of the end of `text`, the cursor position after typing or
/// deleting at the end of a buffer that may span multiple lines.
fn last_row_col(text: &str) -> (usize, usize) {
    let row = text.matches('\n').count();
    let col = text.rsplit('\n').next().unwrap_or("").chars().count();
    (row, col)
}

fn print_help() {
    println!("outline-cli — undo/redo engine REPL");
    println!();
    println!("  new <head>       insert a new root node and select it");
    println!("  child <head>     insert a child of the current node and select it");
    println!("  del              delete the current node's outline");
    println!("  head <text>      rename the current node");
    println!("  body <text>      replace the current node's body");
    println!("  type <text>      append text to the body, coalescing per granularity");
    println!("  mark / unmark    toggle the current node's marked bit");
    println!("  sort             sort the current node's children by headline");
    println!("  clone            clone the current node as a new root appearance");
    println!("  up / down / next / prev   move the selection");
    println!("  list             print the outline");
    println!("  status           print undo/redo availability");
    println!("  undo / redo");
    println!("  help");
    println!("  quit");
}

fn main() {
    tracing_subscriber::fmt::init();

    let mut session = Session::new(Granularity::Line, 0);
    println!("outline-cli ready; type `help` for commands.");

    let stdin = io::stdin();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        let mut line = String::new();
        if stdin.read_line(&mut line).unwrap_or(0) == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (cmd, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();

        match cmd {
            "new" => session.cmd_new(rest),
            "child" => session.cmd_child(rest),
            "del" | "delete" => session.cmd_delete(),
            "head" => session.cmd_head(rest),
            "body" => session.cmd_body(rest),
            "type" => session.cmd_type(rest),
            "mark" => session.cmd_mark(true),
            "unmark" => session.cmd_mark(false),
            "sort" => session.cmd_sort(),
            "clone" => session.cmd_clone(),
            "up" => {
                if let Some(parent) = session.tree.parent(session.current.clone()) {
                    session.current = parent;
                }
            }
            "down" => {
                if let Some(child) = session.tree.first_child(session.current.clone()) {
                    session.current = child;
                }
            }
            "next" => {
                if let Some(next) = session.tree.next(session.current.clone()) {
                    session.current = next;
                }
            }
            "prev" => {
                if let Some(back) = session.tree.back(session.current.clone()) {
                    session.current = back;
                }
            }
            "list" => session.print_outline(),
            "status" => session.cmd_status(),
            "undo" => session.cmd_undo(),
            "redo" => session.cmd_redo(),
            "help" => print_help(),
            "quit" | "exit" => break,
            other => println!("unknown command {other:?}; type `help`"),
        }
    }
}
