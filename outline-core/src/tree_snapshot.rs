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

//! Depth-first subtree serialization, sufficient to restore clone topology.

use crate::host::node::{NodeId, Position};
use crate::host::tree::{NodeRecord, TreeHost};

/// A serialized subtree: one record per `V` visited during the walk, in
/// depth-first order. A `V` that appears more than once in the subtree
/// (a clone) is recorded once per appearance; the duplicates are harmless
/// because every record for the same `V` carries identical data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeSnapshot {
    pub records: Vec<(NodeId, NodeRecord)>,
}

/// Walks `p`'s subtree through `host` and captures a [`NodeRecord`] for
/// every `V` encountered.
pub fn save_tree(host: &dyn TreeHost, p: Position) -> TreeSnapshot {
    let records = host
        .subtree(p)
        .into_iter()
        .map(|pos| {
            let v = pos.target();
            (v, host.node_record(v))
        })
        .collect();
    TreeSnapshot { records }
}

/// Writes every record in `snapshot` back through `host`, verbatim.
pub fn restore_tree(host: &mut dyn TreeHost, snapshot: &TreeSnapshot) {
    for (v, record) in &snapshot.records {
        host.install_node_record(*v, record.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::testkit::InMemoryTree;
    use crate::host::tree::TreeHost;

    #[test]
    fn save_then_restore_recovers_edited_body() {
        let mut tree = InMemoryTree::new();
        let root = tree.insert_root("Root", "root body");
        let child = tree.insert_child(&root, "Child", "child body");

        let snapshot = save_tree(&tree, root.clone());
        assert_eq!(snapshot.records.len(), 2);

        tree.set_body_string(child.clone(), "edited");
        assert_eq!(tree.body_string(child.target()), "edited");

        restore_tree(&mut tree, &snapshot);
        assert_eq!(tree.body_string(child.target()), "child body");
    }

    #[test]
    fn snapshot_preserves_clone_parent_lists() {
        let mut tree = InMemoryTree::new();
        let root = tree.insert_root("Root", "");
        let v = tree.new_node("Shared", "body");
        tree.link_as_nth_child(v, root.clone(), 0);
        tree.link_as_root(v);

        let snapshot = save_tree(&tree, root.clone());
        let clone_record = snapshot
            .records
            .iter()
            .find(|(id, _)| *id == v)
            .map(|(_, r)| r.clone())
            .unwrap();
        assert_eq!(clone_record.parents.len(), 2);
    }
}
