/*
rollcall: A terminal client for taking classroom attendance.
Copyright (C) 2024 amFOSS

This program is free software: you can redistribute it and/or modify
it under the terms of the GNU General Public License as published by
the Free Software Foundation, either version 3 of the License, or
(at your option) any later version.

This program is distributed in the hope that it will be useful,
but WITHOUT ANY WARRANTY; without even the implied warranty of
MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
GNU General Public License for more details.

You should have received a copy of the GNU General Public License
along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/
//! Terminal client for taking classroom attendance against the roster and
//! attendance REST API.
pub mod api;
pub mod config;
/// Handlers behind every user action: roster upkeep, attendance sessions
/// and presence lookups.
pub mod controller;
/// Per-panel status messages that clear themselves.
pub mod notification;
pub mod shell;
pub mod utils;
pub mod view;
