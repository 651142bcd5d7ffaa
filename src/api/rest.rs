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
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::models::{MarkAtDate, NewStudent, PresenceRecord, Student};
use super::{ApiError, ApiResult, AttendanceApi};

const STUDENTS_PATH: &str = "/api/v1/alunos";
const PRESENCES_PATH: &str = "/api/presencas";

/// `reqwest` backed client. Every request carries the configured timeout,
/// after which it fails with [`ApiError::Timeout`].
#[derive(Clone, Debug)]
pub struct RestClient {
    client: reqwest::Client,
    base_url: String,
}

impl RestClient {
    pub fn new(base_url: &str, timeout: Duration) -> ApiResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Passes 2xx responses through and turns the rest into [`ApiError::Status`]
/// carrying the response body text.
async fn ensure_success(response: Response) -> ApiResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    debug!("Server responded with {}: {}", status, body);
    Err(ApiError::Status {
        status: status.as_u16(),
        body,
    })
}

async fn parse_json<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
    let body = response.text().await?;
    debug!("Response: {}", body);
    serde_json::from_str(&body).map_err(|e| ApiError::Decode(format!("{e}: {body}")))
}

/// Error bodies from the backend are JSON objects with a `message` field.
/// Falls back to the raw body when that field is missing or empty.
pub fn server_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("message")
                .and_then(|m| m.as_str())
                .filter(|m| !m.is_empty())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.to_string())
}

#[async_trait]
impl AttendanceApi for RestClient {
    async fn list_students(&self) -> ApiResult<Vec<Student>> {
        let url = self.url(STUDENTS_PATH);
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        parse_json(ensure_success(response).await?).await
    }

    async fn get_student(&self, id: i64) -> ApiResult<Student> {
        let url = self.url(&format!("{STUDENTS_PATH}/{id}"));
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        parse_json(ensure_success(response).await?).await
    }

    async fn create_student(&self, student: &NewStudent) -> ApiResult<()> {
        let url = self.url(STUDENTS_PATH);
        debug!("POST {} {:?}", url, student);
        let response = self.client.post(url).json(student).send().await?;

        if response.status() == StatusCode::CONFLICT {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Conflict(server_message(&body)));
        }
        ensure_success(response).await?;
        Ok(())
    }

    async fn delete_student(&self, id: i64) -> ApiResult<()> {
        let url = self.url(&format!("{STUDENTS_PATH}/{id}"));
        debug!("DELETE {}", url);
        let response = self.client.delete(url).send().await?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn mark_present_now(&self, student_id: i64) -> ApiResult<()> {
        let url = self.url(&format!("{PRESENCES_PATH}/marcar/{student_id}"));
        debug!("POST {}", url);
        let response = self.client.post(url).send().await?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn mark_present_at(&self, request: &MarkAtDate) -> ApiResult<()> {
        let url = self.url(&format!("{PRESENCES_PATH}/marcar-data"));
        debug!("POST {} {:?}", url, request);
        let response = self.client.post(url).json(request).send().await?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn presences_for(
        &self,
        student_id: i64,
        range: Option<(NaiveDate, NaiveDate)>,
    ) -> ApiResult<Vec<PresenceRecord>> {
        let request = match range {
            Some((start, end)) => self
                .client
                .get(self.url(&format!("{PRESENCES_PATH}/aluno/{student_id}/periodo")))
                .query(&[
                    ("startDate", start.format("%Y-%m-%d").to_string()),
                    ("endDate", end.format("%Y-%m-%d").to_string()),
                ]),
            None => self
                .client
                .get(self.url(&format!("{PRESENCES_PATH}/aluno/{student_id}"))),
        };

        let response = request.send().await?;
        parse_json(ensure_success(response).await?).await
    }

    async fn was_present_on(&self, student_id: i64, date: NaiveDate) -> ApiResult<bool> {
        let url = self.url(&format!(
            "{PRESENCES_PATH}/verificar/{student_id}/{}",
            date.format("%Y-%m-%d")
        ));
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        parse_json(ensure_success(response).await?).await
    }
}
