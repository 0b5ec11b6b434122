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

//! `NullUndoManager`: an [`UndoEngine`] whose every operation is a no-op.
//!
//! Used when history is disabled (e.g. a read-only document, or a host
//! that never wants undo bookkeeping). `before*` returns [`Bunch::Suppressed`]
//! unconditionally so a caller can thread it into the matching `after*`
//! exactly as it would for a real [`UndoManager`] mid-replay.

use crate::host::config::ConfigHost;
use crate::host::menu::MenuHost;
use crate::host::node::{NodeId, Position};
use crate::host::registry::AppRegistry;
use crate::host::text::{TextHost, YView};
use crate::host::tree::TreeHost;
use crate::undo_manager::{Bunch, UndoEngine};

#[derive(Debug, Default, Clone, Copy)]
pub struct NullUndoManager;

impl NullUndoManager {
    pub fn new() -> Self {
        Self
    }
}

impl UndoEngine for NullUndoManager {
    fn clear_undo_state(&mut self, _menu: &mut dyn MenuHost) {}

    fn can_undo(&self) -> bool {
        false
    }

    fn can_redo(&self) -> bool {
        false
    }

    fn enable_menu_items(&self, menu: &mut dyn MenuHost) {
        menu.set_menu_label("Edit", "Undo", "Can't Undo");
        menu.enable_menu("Edit", "Undo", false);
        menu.set_menu_label("Edit", "Redo", "Can't Redo");
        menu.enable_menu("Edit", "Redo", false);
    }

    fn before_node(&self, _tree: &dyn TreeHost, _text: &dyn TextHost, _p: &Position) -> Bunch {
        Bunch::Suppressed
    }
    fn after_node(&mut self, _tree: &dyn TreeHost, _text: &dyn TextHost, _bunch: Bunch, _label: &str, _dirty_list: Vec<NodeId>) {}

    fn before_tree(&self, _tree: &dyn TreeHost, _text: &dyn TextHost, _p: &Position) -> Bunch {
        Bunch::Suppressed
    }
    fn after_tree(&mut self, _tree: &dyn TreeHost, _text: &dyn TextHost, _bunch: Bunch, _label: &str, _dirty_list: Vec<NodeId>) {}

    fn before_clone(&self, _tree: &dyn TreeHost, _text: &dyn TextHost, _p: &Position) -> Bunch {
        Bunch::Suppressed
    }
    fn after_clone(
        &mut self,
        _tree: &dyn TreeHost,
        _text: &dyn TextHost,
        _bunch: Bunch,
        _label: &str,
        _inserted: Position,
        _new_back: Option<Position>,
        _new_parent: Option<Position>,
        _dirty_list: Vec<NodeId>,
    ) {
    }

    fn before_insert(&self, _tree: &dyn TreeHost, _text: &dyn TextHost, _p: &Position, _paste_as_clone: bool) -> Bunch {
        Bunch::Suppressed
    }
    fn after_insert(
        &mut self,
        _tree: &dyn TreeHost,
        _text: &dyn TextHost,
        _bunch: Bunch,
        _label: &str,
        _inserted: Position,
        _new_back: Option<Position>,
        _new_parent: Option<Position>,
        _dirty_list: Vec<NodeId>,
    ) {
    }

    fn before_delete(&self, _tree: &dyn TreeHost, _text: &dyn TextHost, _p: &Position) -> Bunch {
        Bunch::Suppressed
    }
    fn after_delete(&mut self, _tree: &dyn TreeHost, _text: &dyn TextHost, _bunch: Bunch, _label: &str, _new_parent: Position, _dirty_list: Vec<NodeId>) {}

    fn before_move(&self, _tree: &dyn TreeHost, _text: &dyn TextHost, _p: &Position) -> Bunch {
        Bunch::Suppressed
    }
    fn after_move(&mut self, _tree: &dyn TreeHost, _text: &dyn TextHost, _bunch: Bunch, _label: &str, _new_position: Position, _dirty_list: Vec<NodeId>) {}

    fn before_hoist(&self, _tree: &dyn TreeHost, _text: &dyn TextHost, _p: &Position) -> Bunch {
        Bunch::Suppressed
    }
    fn after_hoist(&mut self, _tree: &dyn TreeHost, _text: &dyn TextHost, _bunch: Bunch, _label: &str, _dirty_list: Vec<NodeId>) {}
    fn before_dehoist(&self, _tree: &dyn TreeHost, _text: &dyn TextHost, _p: &Position) -> Bunch {
        Bunch::Suppressed
    }
    fn after_dehoist(&mut self, _tree: &dyn TreeHost, _text: &dyn TextHost, _bunch: Bunch, _label: &str, _dirty_list: Vec<NodeId>) {}

    fn before_mark(&self, _tree: &dyn TreeHost, _text: &dyn TextHost, _p: &Position) -> Bunch {
        Bunch::Suppressed
    }
    fn after_mark(&mut self, _tree: &dyn TreeHost, _text: &dyn TextHost, _bunch: Bunch, _label: &str, _dirty_list: Vec<NodeId>) {}

    fn before_sort(&self, _tree: &dyn TreeHost, _text: &dyn TextHost, _p: &Position) -> Bunch {
        Bunch::Suppressed
    }
    fn after_sort(&mut self, _tree: &dyn TreeHost, _text: &dyn TextHost, _bunch: Bunch, _label: &str, _dirty_list: Vec<NodeId>) {}

    fn before_promote(&self, _tree: &dyn TreeHost, _text: &dyn TextHost, _p: &Position, _k: usize) -> Bunch {
        Bunch::Suppressed
    }
    fn after_promote(&mut self, _tree: &dyn TreeHost, _text: &dyn TextHost, _bunch: Bunch, _label: &str, _dirty_list: Vec<NodeId>) {}
    fn before_demote(&self, _tree: &dyn TreeHost, _text: &dyn TextHost, _p: &Position, _k: usize) -> Bunch {
        Bunch::Suppressed
    }
    fn after_demote(&mut self, _tree: &dyn TreeHost, _text: &dyn TextHost, _bunch: Bunch, _label: &str, _dirty_list: Vec<NodeId>) {}

    fn before_clear_recent_files(&self, _registry: &dyn AppRegistry, _tree: &dyn TreeHost, _text: &dyn TextHost, _p: &Position) -> Bunch {
        Bunch::Suppressed
    }
    fn after_clear_recent_files(
        &mut self,
        _registry: &dyn AppRegistry,
        _tree: &dyn TreeHost,
        _text: &dyn TextHost,
        _bunch: Bunch,
        _label: &str,
        _dirty_list: Vec<NodeId>,
    ) {
    }

    fn before_change_group(&mut self, _tree: &dyn TreeHost, _text: &dyn TextHost, _p: &Position, _label: &str) {}
    fn after_change_group(&mut self, _tree: &dyn TreeHost, _text: &dyn TextHost, _p: &Position, _label: &str, _report_flag: bool, _dirty_list: Vec<NodeId>) {}

    #[allow(clippy::too_many_arguments)]
    fn set_undo_typing_params(
        &mut self,
        _tree: &dyn TreeHost,
        _text: &dyn TextHost,
        menu: &mut dyn MenuHost,
        _config: &dyn ConfigHost,
        _p: &Position,
        _label: &str,
        _old_text: &str,
        _new_text: &str,
        _old_sel: (usize, usize),
        _new_sel: (usize, usize),
        _old_yview: Option<YView>,
    ) {
        self.enable_menu_items(menu);
    }

    fn undo(&mut self, _tree: &mut dyn TreeHost, _text: &mut dyn TextHost, _menu: &mut dyn MenuHost, _registry: &mut dyn AppRegistry) {}
    fn redo(&mut self, _tree: &mut dyn TreeHost, _text: &mut dyn TextHost, _menu: &mut dyn MenuHost, _registry: &mut dyn AppRegistry) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::testkit::{InMemoryRegistry, InMemoryText, InMemoryTree, NullMenu};

    #[test]
    fn null_manager_never_enables_undo_or_redo() {
        let mut mgr = NullUndoManager::new();
        let mut tree = InMemoryTree::new();
        let text = InMemoryText::new("");
        let mut menu = NullMenu::default();
        let mut registry = InMemoryRegistry::default();

        let root = tree.insert_root("Root", "body");
        let bunch = mgr.before_node(&tree, &text, &root);
        tree.set_head_string(root.clone(), "changed");
        mgr.after_node(&tree, &text, bunch, "Change Headline", vec![]);

        assert!(!mgr.can_undo());
        assert!(!mgr.can_redo());

        let mut text_host = InMemoryText::new("");
        mgr.undo(&mut tree, &mut text_host, &mut menu, &mut registry);
        assert_eq!(tree.head_string(root.target()), "changed");
    }
}
