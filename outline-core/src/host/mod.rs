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

//! External collaborators (§6): the tree model, the text widget, the menu
//! system, the application configuration reader, and the recent-files
//! registry. The engine only ever consumes these through the traits
//! below — everything under [`testkit`] is a thin reference
//! implementation, not a real editor frontend.

pub mod config;
pub mod menu;
pub mod node;
pub mod registry;
pub mod testkit;
pub mod text;
pub mod tree;

pub use config::ConfigHost;
pub use menu::MenuHost;
pub use node::{NodeId, Position, StatusBits};
pub use registry::AppRegistry;
pub use text::{SelectionRange, TextHost, YView};
pub use tree::{AttributeBag, NodeRecord, TreeHost};
