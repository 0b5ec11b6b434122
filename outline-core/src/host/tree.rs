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

//! The tree model, as a narrow trait boundary.
//!
//! Node creation, child-list maintenance, parent bookkeeping, and
//! dirtiness propagation are owned by whatever implements this trait — the
//! engine only ever calls through it. `testkit::InMemoryTree` is a
//! complete, minimal implementation used by this crate's own tests and by
//! `outline-cli`.

use super::node::{NodeId, Position, StatusBits};
use std::collections::BTreeMap;

/// Opaque, host-defined key/value attributes carried by a `V`.
pub type AttributeBag = BTreeMap<String, String>;

/// Everything [`crate::tree_snapshot::TreeSnapshot`] needs to restore a `V`
/// verbatim: status bits, parent/child topology, head/body text, and
/// attributes. The original distinguishes a `vInfo` and a `tInfo` block;
/// this crate merges them into one record since nothing downstream needs
/// them separate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRecord {
    pub status: StatusBits,
    pub parents: Vec<NodeId>,
    pub children: Vec<NodeId>,
    pub attributes: AttributeBag,
    pub head: String,
    pub body: String,
}

/// Document- and node-level operations the engine depends on.
pub trait TreeHost {
    // -- Document-level --
    fn is_changed(&self) -> bool;
    fn set_changed(&mut self, changed: bool);
    fn current_position(&self) -> Option<Position>;
    fn select_position(&mut self, p: Position);
    fn set_current_position(&mut self, p: Position);
    fn begin_update(&mut self);
    fn end_update(&mut self, recolor: bool);
    /// Removes `p`'s entire subtree appearance (not the `V`s themselves if
    /// they're still reachable via another position/clone).
    fn delete_outline(&mut self, p: Position);
    fn hoist(&mut self, p: Position);
    fn dehoist(&mut self);
    fn set_head_string(&mut self, p: Position, s: &str);
    fn set_body_string(&mut self, p: Position, s: &str);
    fn set_position_after_sort(&mut self, flag: bool);
    fn set_marked(&mut self, p: Position);
    fn clear_marked(&mut self, p: Position);

    // -- Node/position primitives --
    fn back(&self, p: Position) -> Option<Position>;
    fn parent(&self, p: Position) -> Option<Position>;
    fn first_child(&self, p: Position) -> Option<Position>;
    fn next(&self, p: Position) -> Option<Position>;
    /// All positions in `p`'s subtree, `p` included, in depth-first order.
    fn subtree(&self, p: Position) -> Vec<Position>;
    fn child_index(&self, p: Position) -> usize;
    fn parent_vnode(&self, p: Position) -> Option<NodeId>;

    fn link_after(&mut self, v: NodeId, after: Position) -> Position;
    fn link_as_nth_child(&mut self, v: NodeId, parent: Position, i: usize) -> Position;
    fn link_as_root(&mut self, v: NodeId) -> Position;
    /// Re-derives parent links for every `V` in `p`'s subtree from the
    /// child lists alone — used after [`TreeSnapshot`] restoration.
    ///
    /// [`TreeSnapshot`]: crate::tree_snapshot::TreeSnapshot
    fn restore_links_in_tree(&mut self, p: Position);
    /// Removes `p` from its parent's child list without touching `target`'s
    /// other appearances.
    fn unlink(&mut self, p: Position);

    fn set_dirty(&mut self, p: Position, set_descendents_dirty: bool);
    fn set_all_ancestor_file_nodes_dirty(&mut self, p: Position);

    fn init_head_string(&mut self, v: NodeId, s: &str);
    fn is_marked(&self, v: NodeId) -> bool;
    fn is_dirty(&self, v: NodeId) -> bool;
    fn body_string(&self, v: NodeId) -> String;
    fn head_string(&self, v: NodeId) -> String;
    /// Recomputes `v`'s parent set from scratch, or from `children`'s
    /// parent sets if provided — mirrors `v._computeParentsOfChildren`.
    fn compute_parents_of_children(&mut self, v: NodeId, children: Option<&[NodeId]>);

    // -- Snapshot support --
    fn node_record(&self, v: NodeId) -> NodeRecord;
    fn install_node_record(&mut self, v: NodeId, record: NodeRecord);

    // -- Sibling-list access (sort/promote/demote) --
    /// The ordered child list that `p` itself is a member of (`p`'s
    /// parent's children, top-level siblings included).
    fn children_of_parent(&self, p: Position) -> Vec<NodeId>;
    /// Overwrites the child list `p` is a member of.
    fn set_children_of_parent(&mut self, p: Position, children: Vec<NodeId>);
}
