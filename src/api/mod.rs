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
//! Client side of the attendance backend: the roster store under
//! `/api/v1/alunos` and the attendance store under `/api/presencas`.
pub mod models;
pub mod rest;

#[cfg(test)]
pub(crate) mod mock;

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use models::{MarkAtDate, NewStudent, PresenceRecord, Student};

/// Every way a call to the backend can fail.
#[derive(Debug, Error)]
pub enum ApiError {
    /// 409 on student creation: the roll number is already taken.
    #[error("{0}")]
    Conflict(String),
    #[error("{body}")]
    Status { status: u16, body: String },
    #[error("Request timed out")]
    Timeout,
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Malformed response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Conflict(_) => Some(409),
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// The remote system of record. Implementations must be safe to call
/// concurrently; a save issues one call per present student at once.
#[async_trait]
pub trait AttendanceApi: Send + Sync {
    async fn list_students(&self) -> ApiResult<Vec<Student>>;

    async fn get_student(&self, id: i64) -> ApiResult<Student>;

    async fn create_student(&self, student: &NewStudent) -> ApiResult<()>;

    async fn delete_student(&self, id: i64) -> ApiResult<()>;

    /// Marks the student present with a server-assigned timestamp.
    async fn mark_present_now(&self, student_id: i64) -> ApiResult<()>;

    async fn mark_present_at(&self, request: &MarkAtDate) -> ApiResult<()>;

    async fn presences_for(
        &self,
        student_id: i64,
        range: Option<(NaiveDate, NaiveDate)>,
    ) -> ApiResult<Vec<PresenceRecord>>;

    async fn was_present_on(&self, student_id: i64, date: NaiveDate) -> ApiResult<bool>;
}
