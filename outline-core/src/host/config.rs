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

//! Application configuration, as consumed by the undo engine.
//!
//! Mirrors the teacher's own `get_config_string(key, default)` /
//! `ConfigValue` convention (`roe-core/src/julia_runtime.rs`) rather than
//! introducing a TOML/serde-backed config crate this narrow a surface
//! doesn't need.

/// Narrow read-only view of the application's configuration the engine
/// needs. Everything else about configuration (file format, reload,
/// editing) belongs to the host, not this crate.
pub trait ConfigHost {
    /// The raw `undo_granularity` string as the host's config store has it
    /// (e.g. `"word"`), unparsed — `""` if unset. Parsing, including the
    /// fall-back-to-default-and-warn path for an unrecognized value, is
    /// [`crate::granularity::Granularity::parse_reporting`]'s job, not the
    /// host's.
    fn undo_granularity(&self) -> String;

    /// `max_undo_stack_size`, `0` meaning unbounded.
    fn max_undo_stack_size(&self) -> usize;
}
