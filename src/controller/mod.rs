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
//! The attendance session controller.
//!
//! Every public handler runs to completion on its own: it re-fetches what
//! it needs from the backend, writes the outcome into the [`ViewState`]
//! and reports failures as notifications. None of them return errors.
//! Handlers may overlap (a refresh while a save is in flight); the view
//! lock is never held across a network call, so each write is atomic but
//! the backend stays the only arbiter of consistency.
pub mod history;
pub mod roster;
pub mod session;

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{RwLock, RwLockReadGuard};

use crate::api::AttendanceApi;
use crate::notification::Notifier;
use crate::utils::time::Clock;
use crate::view::ViewState;

/// Client-side checks that stop a handler before any request is sent.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Name and number are required.")]
    MissingStudentFields,
    #[error("Select a date.")]
    MissingDate,
    #[error("Invalid date '{0}', expected YYYY-MM-DD.")]
    InvalidDate(String),
    #[error("Start date must not be after end date.")]
    InvalidRange,
    #[error("No student with id {0} in the current list.")]
    UnknownStudent(i64),
    #[error("Start the attendance first.")]
    NoSession,
}

pub struct AttendanceController {
    api: Arc<dyn AttendanceApi>,
    clock: Arc<dyn Clock>,
    view: RwLock<ViewState>,
    notifier: Notifier,
}

impl AttendanceController {
    /// The date picker starts at the clock's today.
    pub fn new(api: Arc<dyn AttendanceApi>, clock: Arc<dyn Clock>) -> Self {
        Self::with_notifier(api, clock, Notifier::default())
    }

    pub fn with_notifier(
        api: Arc<dyn AttendanceApi>,
        clock: Arc<dyn Clock>,
        notifier: Notifier,
    ) -> Self {
        let view = ViewState::new(clock.today());
        Self {
            api,
            clock,
            view: RwLock::new(view),
            notifier,
        }
    }

    pub async fn view(&self) -> RwLockReadGuard<'_, ViewState> {
        self.view.read().await
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }
}
