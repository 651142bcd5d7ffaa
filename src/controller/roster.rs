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
use tracing::{debug, info, warn};

use super::{AttendanceController, ValidationError};
use crate::api::models::NewStudent;
use crate::api::ApiError;
use crate::notification::Slot;
use crate::view::RosterTable;

impl AttendanceController {
    /// Replaces the student table with a fresh read of the roster.
    pub async fn load_roster(&self) {
        self.view.write().await.roster = RosterTable::Loading;
        self.notifier.clear(Slot::Roster);

        let table = match self.api.list_students().await {
            Ok(students) if students.is_empty() => RosterTable::Empty,
            Ok(students) => {
                debug!("Loaded {} students", students.len());
                RosterTable::Rows(students)
            }
            Err(e) => {
                warn!("Failed to load students: {}", e);
                self.notifier
                    .error(Slot::Roster, format!("Error loading students: {e}"));
                RosterTable::Failed
            }
        };
        self.view.write().await.roster = table;
    }

    /// Fills the add-student inputs without submitting them.
    pub async fn set_form(&self, name: &str, number: &str) {
        let mut view = self.view.write().await;
        view.form.name = name.to_string();
        view.form.number = number.to_string();
    }

    /// Validates and submits the add-student form. Returns whether the
    /// student was created.
    pub async fn submit_new_student(&self) -> bool {
        let form = self.view.read().await.form.clone();

        let name = form.name.trim();
        let number = form.number.trim().parse::<i64>();
        let (name, number) = match (name.is_empty(), number) {
            (false, Ok(number)) => (name.to_string(), number),
            _ => {
                self.notifier.error(
                    Slot::AddStudent,
                    ValidationError::MissingStudentFields.to_string(),
                );
                return false;
            }
        };

        let new_student = NewStudent { name, number };
        match self.api.create_student(&new_student).await {
            Ok(()) => {
                info!("Created student {} (#{})", new_student.name, new_student.number);
                self.notifier.success(Slot::AddStudent, "Student added!");
                self.view.write().await.form.reset();
                self.load_roster().await;
                true
            }
            Err(ApiError::Conflict(message)) => {
                warn!("Roll number {} already taken", new_student.number);
                self.notifier
                    .error(Slot::AddStudent, format!("Error: {message}"));
                false
            }
            Err(e) => {
                warn!("Failed to create student: {}", e);
                let text = match e.status() {
                    Some(status) => format!("Error: HTTP {status}"),
                    None => format!("Error: {e}"),
                };
                self.notifier.error(Slot::AddStudent, text);
                false
            }
        }
    }

    pub async fn add_student(&self, name: &str, number: &str) -> bool {
        self.set_form(name, number).await;
        self.submit_new_student().await
    }

    /// Deletes a student listed in the current table. `confirm` receives a
    /// prompt naming the student; nothing is sent unless it returns `true`.
    pub async fn delete_student<F>(&self, id: i64, confirm: F) -> bool
    where
        F: FnOnce(&str) -> bool,
    {
        let student = match &self.view.read().await.roster {
            RosterTable::Rows(students) => students.iter().find(|s| s.id == id).cloned(),
            _ => None,
        };
        let Some(student) = student else {
            self.notifier
                .error(Slot::Roster, ValidationError::UnknownStudent(id).to_string());
            return false;
        };

        if !confirm(&format!("Delete student {}?", student.name)) {
            debug!("Deletion of student {} cancelled", id);
            return false;
        }

        match self.api.delete_student(id).await {
            Ok(()) => {
                info!("Deleted student {} ({})", student.name, id);
                self.load_roster().await;
                self.notifier.success(Slot::Roster, "Student deleted!");
                true
            }
            Err(e) => {
                warn!("Failed to delete student {}: {}", id, e);
                self.notifier.error(Slot::Roster, format!("Error: {e}"));
                false
            }
        }
    }
}
