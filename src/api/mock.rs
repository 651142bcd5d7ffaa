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
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;

use super::models::{MarkAtDate, NewStudent, PresenceRecord, Student};
use super::{ApiError, ApiResult, AttendanceApi};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    List,
    Get(i64),
    Create(String, i64),
    Delete(i64),
    MarkNow(i64),
    MarkAt(MarkAtDate),
    Presences(i64, Option<(NaiveDate, NaiveDate)>),
    Verify(i64, NaiveDate),
}

/// In-memory backend that records every call it receives.
#[derive(Default)]
pub struct MockApi {
    pub students: Mutex<Vec<Student>>,
    pub presences: Mutex<Vec<PresenceRecord>>,
    pub calls: Mutex<Vec<Call>>,
    pub list_error: Mutex<Option<(u16, String)>>,
    pub delete_error: Mutex<Option<(u16, String)>>,
    pub create_status: Mutex<Option<u16>>,
    pub failing_marks: Mutex<HashSet<i64>>,
    /// How long each mark request stays in flight.
    pub mark_delay: Mutex<Option<Duration>>,
    pub peak_marks_in_flight: AtomicUsize,
    marks_in_flight: AtomicUsize,
}

impl MockApi {
    pub fn with_students(students: Vec<Student>) -> Self {
        Self {
            students: Mutex::new(students),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn mark_calls(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::MarkNow(_) | Call::MarkAt(_)))
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

pub fn student(id: i64, number: i64, name: &str) -> Student {
    Student {
        id,
        number,
        name: name.to_string(),
    }
}

#[async_trait]
impl AttendanceApi for MockApi {
    async fn list_students(&self) -> ApiResult<Vec<Student>> {
        self.record(Call::List);
        if let Some((status, body)) = self.list_error.lock().unwrap().clone() {
            return Err(ApiError::Status { status, body });
        }
        Ok(self.students.lock().unwrap().clone())
    }

    async fn get_student(&self, id: i64) -> ApiResult<Student> {
        self.record(Call::Get(id));
        self.students
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or(ApiError::Status {
                status: 404,
                body: format!("Student {id} not found"),
            })
    }

    async fn create_student(&self, new: &NewStudent) -> ApiResult<()> {
        self.record(Call::Create(new.name.clone(), new.number));
        if let Some(status) = *self.create_status.lock().unwrap() {
            return Err(ApiError::Status {
                status,
                body: "boom".to_string(),
            });
        }

        let mut students = self.students.lock().unwrap();
        if students.iter().any(|s| s.number == new.number) {
            return Err(ApiError::Conflict(format!(
                "Número {} já está em uso",
                new.number
            )));
        }
        let id = students.iter().map(|s| s.id).max().unwrap_or(0) + 1;
        students.push(student(id, new.number, &new.name));
        Ok(())
    }

    async fn delete_student(&self, id: i64) -> ApiResult<()> {
        self.record(Call::Delete(id));
        if let Some((status, body)) = self.delete_error.lock().unwrap().clone() {
            return Err(ApiError::Status { status, body });
        }
        self.students.lock().unwrap().retain(|s| s.id != id);
        Ok(())
    }

    async fn mark_present_now(&self, student_id: i64) -> ApiResult<()> {
        self.record(Call::MarkNow(student_id));
        self.hold_mark().await;
        self.mark_result(student_id)
    }

    async fn mark_present_at(&self, request: &MarkAtDate) -> ApiResult<()> {
        self.record(Call::MarkAt(request.clone()));
        self.hold_mark().await;
        self.mark_result(request.student_id)
    }

    async fn presences_for(
        &self,
        student_id: i64,
        range: Option<(NaiveDate, NaiveDate)>,
    ) -> ApiResult<Vec<PresenceRecord>> {
        self.record(Call::Presences(student_id, range));
        if !self.students.lock().unwrap().iter().any(|s| s.id == student_id) {
            return Err(ApiError::Status {
                status: 404,
                body: String::new(),
            });
        }
        Ok(self.presences.lock().unwrap().clone())
    }

    async fn was_present_on(&self, student_id: i64, date: NaiveDate) -> ApiResult<bool> {
        self.record(Call::Verify(student_id, date));
        Ok(self.presences.lock().unwrap().iter().any(|p| {
            p.student.as_ref().map(|s| s.id) == Some(student_id)
                && p.timestamp.map(|t| t.date()) == Some(date)
        }))
    }
}

impl MockApi {
    async fn hold_mark(&self) {
        let delay = *self.mark_delay.lock().unwrap();
        let Some(delay) = delay else {
            return;
        };
        let in_flight = self.marks_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_marks_in_flight.fetch_max(in_flight, Ordering::SeqCst);
        tokio::time::sleep(delay).await;
        self.marks_in_flight.fetch_sub(1, Ordering::SeqCst);
    }

    fn mark_result(&self, student_id: i64) -> ApiResult<()> {
        if self.failing_marks.lock().unwrap().contains(&student_id) {
            return Err(ApiError::Status {
                status: 404,
                body: format!("Aluno não encontrado com ID: {student_id}"),
            });
        }
        Ok(())
    }
}
