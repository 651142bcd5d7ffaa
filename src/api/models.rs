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
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Student {
    pub id: i64,
    pub number: i64,
    pub name: String,
}

/// Body of `POST /api/v1/alunos`. The server assigns the id.
#[derive(Clone, Debug, Serialize)]
pub struct NewStudent {
    pub name: String,
    pub number: i64,
}

/// Body of `POST /api/presencas/marcar-data`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MarkAtDate {
    #[serde(rename = "alunoId")]
    pub student_id: i64,
    /// Naive local date-time, e.g. `2024-03-01T00:00:00`. No offset is sent.
    #[serde(rename = "dataHora")]
    pub timestamp: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct PresenceRecord {
    pub id: i64,
    #[serde(rename = "aluno")]
    pub student: Option<Student>,
    #[serde(rename = "dataHora")]
    pub timestamp: Option<NaiveDateTime>,
    #[serde(rename = "presente", default)]
    pub present: Option<bool>,
}
