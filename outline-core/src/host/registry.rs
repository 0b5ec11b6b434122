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

//! The application-wide recent-files registry.
//!
//! Mirrored on the document per the spec's "Global-ish state" design
//! note: treated here as a named external resource the engine reads and
//! writes through, never owns.

pub trait AppRegistry {
    fn recent_files(&self) -> Vec<String>;
    fn set_recent_files(&mut self, files: Vec<String>);
}
