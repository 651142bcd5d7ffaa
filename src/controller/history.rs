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
use chrono::NaiveDate;
use tracing::warn;

use super::{AttendanceController, ValidationError};
use crate::api::ApiError;
use crate::notification::Slot;
use crate::view::{render_history, Table};

fn describe(id: i64, e: &ApiError) -> String {
    if e.is_not_found() {
        format!("Error: student {id} not found.")
    } else {
        format!("Error: {e}")
    }
}

impl AttendanceController {
    /// Presence records of one student, optionally limited to an inclusive
    /// date range.
    pub async fn show_history(
        &self,
        id: i64,
        range: Option<(NaiveDate, NaiveDate)>,
    ) -> Option<Table> {
        if let Some((start, end)) = range {
            if start > end {
                self.notifier
                    .error(Slot::Roster, ValidationError::InvalidRange.to_string());
                return None;
            }
        }

        let result = async {
            let student = self.api.get_student(id).await?;
            let records = self.api.presences_for(id, range).await?;
            Ok::<_, ApiError>((student, records))
        }
        .await;

        match result {
            Ok((student, records)) => Some(render_history(&student, &records)),
            Err(e) => {
                warn!("Failed to fetch presences of student {}: {}", id, e);
                self.notifier.error(Slot::Roster, describe(id, &e));
                None
            }
        }
    }

    /// Whether the student has a presence on `date`, the selected date by
    /// default.
    pub async fn check_presence(&self, id: i64, date: Option<NaiveDate>) -> Option<bool> {
        let date = match date {
            Some(date) => date,
            None => self.view.read().await.selected_date,
        };

        match self.api.was_present_on(id, date).await {
            Ok(present) => Some(present),
            Err(e) => {
                warn!("Failed to check presence of student {} on {}: {}", id, date, e);
                self.notifier.error(Slot::Attendance, describe(id, &e));
                None
            }
        }
    }
}
