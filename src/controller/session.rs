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
//! Taking attendance for one date: the session working set and the batch
//! of "mark present" requests it turns into on save.
use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use futures::future::join_all;
use tracing::{debug, info, warn};

use super::{AttendanceController, ValidationError};
use crate::api::models::{MarkAtDate, Student};
use crate::api::{ApiError, AttendanceApi};
use crate::notification::Slot;
use crate::utils::time::{midnight_timestamp, parse_date};

/// Roster snapshot for one date plus the presence selection over it.
///
/// The selection is keyed by exactly the ids of the snapshot: it is built
/// once in [`AttendanceSession::new`] and only ever edited in place.
#[derive(Clone, Debug)]
pub struct AttendanceSession {
    date: NaiveDate,
    students: Vec<Student>,
    selection: HashMap<i64, bool>,
}

impl AttendanceSession {
    /// Sorts by roll number, keeping server order for ties, and marks
    /// everyone present.
    pub fn new(date: NaiveDate, mut students: Vec<Student>) -> Self {
        students.sort_by_key(|s| s.number);
        let selection = students.iter().map(|s| (s.id, true)).collect();
        Self {
            date,
            students,
            selection,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = (&Student, bool)> {
        self.students
            .iter()
            .map(|s| (s, self.selection.get(&s.id).copied().unwrap_or(false)))
    }

    pub fn set_present(&mut self, id: i64, present: bool) -> Result<(), ValidationError> {
        let flag = self
            .selection
            .get_mut(&id)
            .ok_or(ValidationError::UnknownStudent(id))?;
        *flag = present;
        Ok(())
    }

    /// Returns the new flag.
    pub fn toggle(&mut self, id: i64) -> Result<bool, ValidationError> {
        let flag = self
            .selection
            .get_mut(&id)
            .ok_or(ValidationError::UnknownStudent(id))?;
        *flag = !*flag;
        Ok(*flag)
    }

    /// Every id in the session, in row order.
    pub fn all_ids(&self) -> Vec<i64> {
        self.students.iter().map(|s| s.id).collect()
    }

    pub fn present_ids(&self) -> HashSet<i64> {
        self.selection
            .iter()
            .filter(|(_, present)| **present)
            .map(|(id, _)| *id)
            .collect()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PresenceEdit {
    Present,
    Absent,
    Toggle,
}

#[derive(Debug)]
pub enum MarkOutcome {
    /// No request is sent; the backend treats unmarked students as absent.
    Absent,
    Marked,
    Failed(ApiError),
}

#[derive(Debug)]
pub struct StudentOutcome {
    pub student_id: i64,
    pub outcome: MarkOutcome,
}

/// Per-student results of one save, in row order.
#[derive(Debug)]
pub struct BatchReport {
    pub date: NaiveDate,
    pub outcomes: Vec<StudentOutcome>,
}

impl BatchReport {
    pub fn failures(&self) -> impl Iterator<Item = (i64, &ApiError)> {
        self.outcomes.iter().filter_map(|o| match &o.outcome {
            MarkOutcome::Failed(e) => Some((o.student_id, e)),
            _ => None,
        })
    }

    pub fn marked(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.outcome, MarkOutcome::Marked))
            .count()
    }

    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }

    /// `Err` carries the failure count and the first failure's message.
    pub fn summary(&self) -> Result<(), String> {
        let count = self.failures().count();
        match self.failures().next() {
            None => Ok(()),
            Some((_, first)) => Err(format!(
                "Failed on {} request{}: {}",
                count,
                if count == 1 { "" } else { "s" },
                first
            )),
        }
    }
}

/// Issues one request per present id, all at once, and waits for every
/// one of them. `today` picks the endpoint: the server clock for today,
/// an explicit midnight timestamp for any other date.
pub async fn submit_batch(
    api: &dyn AttendanceApi,
    date: NaiveDate,
    today: NaiveDate,
    all_ids: &[i64],
    present: &HashSet<i64>,
) -> BatchReport {
    let is_today = date == today;
    let timestamp = midnight_timestamp(date);

    let requests = all_ids.iter().map(move |&student_id| {
        let timestamp = timestamp.clone();
        async move {
            if !present.contains(&student_id) {
                return StudentOutcome {
                    student_id,
                    outcome: MarkOutcome::Absent,
                };
            }

            let result = if is_today {
                api.mark_present_now(student_id).await
            } else {
                let request = MarkAtDate {
                    student_id,
                    timestamp,
                };
                api.mark_present_at(&request).await
            };

            let outcome = match result {
                Ok(()) => MarkOutcome::Marked,
                Err(e) => {
                    debug!("Marking student {} failed: {}", student_id, e);
                    MarkOutcome::Failed(e)
                }
            };
            StudentOutcome {
                student_id,
                outcome,
            }
        }
    });

    BatchReport {
        date,
        outcomes: join_all(requests).await,
    }
}

impl AttendanceController {
    /// Sets the date picker. An empty or malformed value is rejected and
    /// leaves the previous date in place.
    pub async fn set_date(&self, input: &str) -> bool {
        if input.trim().is_empty() {
            self.notifier
                .error(Slot::Attendance, ValidationError::MissingDate.to_string());
            return false;
        }
        match parse_date(input) {
            Some(date) => {
                self.view.write().await.selected_date = date;
                true
            }
            None => {
                self.notifier.error(
                    Slot::Attendance,
                    ValidationError::InvalidDate(input.trim().to_string()).to_string(),
                );
                false
            }
        }
    }

    /// Opens a session for the selected date over a fresh roster read,
    /// replacing any previous session and its selection.
    pub async fn start_attendance(&self) {
        let date = self.view.read().await.selected_date;
        self.notifier.clear(Slot::Attendance);

        match self.api.list_students().await {
            Ok(students) => {
                info!("Starting attendance for {} with {} students", date, students.len());
                self.view.write().await.attendance = Some(AttendanceSession::new(date, students));
            }
            Err(e) => {
                warn!("Failed to start attendance: {}", e);
                self.notifier.error(Slot::Attendance, format!("Error: {e}"));
                self.view.write().await.attendance = None;
            }
        }
    }

    /// Returns the student's new flag.
    pub async fn edit_presence(&self, id: i64, edit: PresenceEdit) -> Option<bool> {
        let mut view = self.view.write().await;
        let result = match view.attendance.as_mut() {
            None => Err(ValidationError::NoSession),
            Some(session) => match edit {
                PresenceEdit::Toggle => session.toggle(id),
                PresenceEdit::Present => session.set_present(id, true).map(|_| true),
                PresenceEdit::Absent => session.set_present(id, false).map(|_| false),
            },
        };
        drop(view);

        match result {
            Ok(present) => Some(present),
            Err(e) => {
                self.notifier.error(Slot::Attendance, e.to_string());
                None
            }
        }
    }

    /// Saves the open session. Only the rows and flags of the session are
    /// read; the roster table is not consulted.
    pub async fn save_attendance(&self) -> Option<BatchReport> {
        let (date, all_ids, present) = {
            let view = self.view.read().await;
            let Some(session) = view.attendance.as_ref() else {
                self.notifier
                    .error(Slot::Attendance, ValidationError::NoSession.to_string());
                return None;
            };
            (session.date(), session.all_ids(), session.present_ids())
        };

        let today = self.clock.today();
        debug!(
            "Saving attendance for {} ({} of {} present, today is {})",
            date,
            present.len(),
            all_ids.len(),
            today
        );
        let report = submit_batch(self.api.as_ref(), date, today, &all_ids, &present).await;

        match report.summary() {
            Ok(()) => {
                info!("Attendance for {} saved, {} marked", date, report.marked());
                self.notifier.success(Slot::Attendance, "Attendance saved!");
            }
            Err(message) => {
                warn!("Attendance for {} partially failed: {}", date, message);
                self.notifier
                    .error(Slot::Attendance, format!("Error saving attendance: {message}"));
            }
        }
        Some(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::{student, Call, MockApi};
    use crate::controller::test_support::{controller, today};
    use crate::notification::Kind;
    use crate::view::render_attendance;

    #[test]
    fn session_sorts_by_number_and_keeps_ties_stable() {
        let session = AttendanceSession::new(
            today(),
            vec![
                student(1, 30, "Carla"),
                student(2, 10, "Ana"),
                student(3, 20, "Bruno"),
                student(4, 10, "Alice"),
            ],
        );

        let names: Vec<&str> = session.rows().map(|(s, _)| s.name.as_str()).collect();
        assert_eq!(names, ["Ana", "Alice", "Bruno", "Carla"]);
        assert!(session.rows().all(|(_, present)| present));
        assert_eq!(session.present_ids().len(), 4);
    }

    #[test]
    fn selection_rejects_ids_outside_the_snapshot() {
        let mut session = AttendanceSession::new(today(), vec![student(1, 1, "Ana")]);
        assert_eq!(session.toggle(1), Ok(false));
        assert_eq!(session.toggle(2), Err(ValidationError::UnknownStudent(2)));
        assert!(session.present_ids().is_empty());
        assert_eq!(session.all_ids(), [1]);
    }

    #[tokio::test]
    async fn start_renders_rows_sorted_by_number() {
        let (controller, _) = controller(MockApi::with_students(vec![
            student(1, 30, "Carla"),
            student(2, 10, "Ana"),
            student(3, 20, "Bruno"),
        ]));

        controller.start_attendance().await;

        let view = controller.view().await;
        let table = render_attendance(view.attendance.as_ref()).expect("panel visible");
        let numbers: Vec<&str> = table.data_rows().map(|r| r[0].as_str()).collect();
        assert_eq!(numbers, ["10", "20", "30"]);
        assert_eq!(table.title.as_deref(), Some("Attendance for 20/05/2024"));
    }

    #[tokio::test]
    async fn restart_rebuilds_the_selection() {
        let api = MockApi::with_students(vec![student(1, 1, "Ana"), student(2, 2, "Bruno")]);
        let (controller, api) = controller(api);
        controller.start_attendance().await;
        controller.edit_presence(1, PresenceEdit::Absent).await;

        api.students.lock().unwrap().push(student(3, 3, "Carla"));
        controller.start_attendance().await;

        let view = controller.view().await;
        let session = view.attendance.as_ref().unwrap();
        assert_eq!(session.all_ids(), [1, 2, 3]);
        assert_eq!(session.present_ids(), HashSet::from([1, 2, 3]));
    }

    #[tokio::test]
    async fn failed_start_hides_the_panel() {
        let api = MockApi::with_students(vec![student(1, 1, "Ana")]);
        let (controller, api) = controller(api);
        controller.start_attendance().await;
        *api.list_error.lock().unwrap() = Some((503, "unavailable".to_string()));

        controller.start_attendance().await;

        assert!(controller.view().await.attendance.is_none());
        let notification = controller.notifier().current(Slot::Attendance).unwrap();
        assert_eq!(notification.text, "Error: unavailable");
    }

    #[tokio::test]
    async fn saving_today_marks_everyone_now() {
        let (controller, api) = controller(MockApi::with_students(vec![
            student(1, 3, "Carla"),
            student(2, 1, "Ana"),
            student(3, 2, "Bruno"),
        ]));
        controller.start_attendance().await;

        let report = controller.save_attendance().await.unwrap();

        assert!(report.is_success());
        assert_eq!(report.marked(), 3);
        let mut marks = api.mark_calls();
        marks.sort_by_key(|c| match c {
            Call::MarkNow(id) => *id,
            _ => i64::MAX,
        });
        assert_eq!(marks, [Call::MarkNow(1), Call::MarkNow(2), Call::MarkNow(3)]);
        let notification = controller.notifier().current(Slot::Attendance).unwrap();
        assert_eq!(notification.kind, Kind::Success);
    }

    #[tokio::test]
    async fn saving_another_day_marks_present_students_at_midnight() {
        let (controller, api) = controller(MockApi::with_students(vec![
            student(1, 1, "Ana"),
            student(2, 2, "Bruno"),
            student(3, 3, "Carla"),
        ]));
        assert!(controller.set_date("2024-03-01").await);
        controller.start_attendance().await;
        assert_eq!(controller.edit_presence(3, PresenceEdit::Toggle).await, Some(false));

        let report = controller.save_attendance().await.unwrap();

        assert!(report.is_success());
        let marks = api.mark_calls();
        assert_eq!(marks.len(), 2);
        for id in [1, 2] {
            assert!(marks.contains(&Call::MarkAt(MarkAtDate {
                student_id: id,
                timestamp: "2024-03-01T00:00:00".to_string(),
            })));
        }
        assert!(matches!(
            report.outcomes.iter().find(|o| o.student_id == 3).unwrap().outcome,
            MarkOutcome::Absent
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn save_issues_all_marks_at_once() {
        let api = MockApi::with_students(vec![
            student(1, 1, "Ana"),
            student(2, 2, "Bruno"),
            student(3, 3, "Carla"),
            student(4, 4, "Davi"),
        ]);
        *api.mark_delay.lock().unwrap() = Some(std::time::Duration::from_secs(1));
        let (controller, api) = controller(api);
        controller.start_attendance().await;

        let started = tokio::time::Instant::now();
        let report = controller.save_attendance().await.unwrap();
        let elapsed = started.elapsed();

        assert!(report.is_success());
        assert_eq!(report.marked(), 4);
        assert_eq!(
            api.peak_marks_in_flight
                .load(std::sync::atomic::Ordering::SeqCst),
            4
        );
        assert!(elapsed < std::time::Duration::from_secs(2), "took {elapsed:?}");
    }

    #[tokio::test]
    async fn partial_failure_reports_count_and_first_message() {
        let api = MockApi::with_students(vec![
            student(1, 1, "Ana"),
            student(2, 2, "Bruno"),
            student(3, 3, "Carla"),
        ]);
        api.failing_marks.lock().unwrap().extend([2, 3]);
        let (controller, _) = controller(api);
        controller.start_attendance().await;

        let report = controller.save_attendance().await.unwrap();

        assert!(!report.is_success());
        assert_eq!(report.failures().count(), 2);
        assert_eq!(report.marked(), 1);
        let notification = controller.notifier().current(Slot::Attendance).unwrap();
        assert_eq!(notification.kind, Kind::Error);
        assert_eq!(
            notification.text,
            "Error saving attendance: Failed on 2 requests: Aluno não encontrado com ID: 2"
        );
    }

    #[tokio::test]
    async fn empty_session_saves_without_requests() {
        let (controller, api) = controller(MockApi::default());
        controller.start_attendance().await;

        let report = controller.save_attendance().await.unwrap();

        assert!(report.outcomes.is_empty());
        assert!(api.mark_calls().is_empty());
        let notification = controller.notifier().current(Slot::Attendance).unwrap();
        assert_eq!(notification.text, "Attendance saved!");
    }

    #[tokio::test]
    async fn save_without_session_is_rejected() {
        let (controller, api) = controller(MockApi::with_students(vec![student(1, 1, "Ana")]));

        assert!(controller.save_attendance().await.is_none());
        assert!(api.calls().is_empty());
        let notification = controller.notifier().current(Slot::Attendance).unwrap();
        assert_eq!(notification.text, "Start the attendance first.");
    }

    #[tokio::test]
    async fn bad_dates_keep_the_previous_value() {
        let (controller, _) = controller(MockApi::default());

        assert!(!controller.set_date("").await);
        assert_eq!(
            controller.notifier().current(Slot::Attendance).unwrap().text,
            "Select a date."
        );
        assert!(!controller.set_date("01/03/2024").await);
        assert_eq!(controller.view().await.selected_date, today());
    }

    #[tokio::test]
    async fn resubmitting_reissues_the_same_calls() {
        let (controller, api) = controller(MockApi::with_students(vec![student(1, 1, "Ana")]));
        controller.start_attendance().await;

        controller.save_attendance().await;
        controller.save_attendance().await;

        assert_eq!(api.mark_calls(), [Call::MarkNow(1), Call::MarkNow(1)]);
    }
}
