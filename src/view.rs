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
//! Presentation state and the pure functions that render it.
//!
//! The controller owns a [`ViewState`]; nothing in here talks to the
//! backend, so everything can be rendered and asserted on directly.
use std::fmt;

use chrono::NaiveDate;

use crate::api::models::{PresenceRecord, Student};
use crate::controller::session::AttendanceSession;
use crate::notification::{Kind, Notification, Slot};
use crate::utils::time::display_date;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RosterTable {
    Loading,
    Empty,
    Failed,
    /// Server order, no client-side sort.
    Rows(Vec<Student>),
}

/// Raw text of the add-student inputs, validated only on submit.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StudentForm {
    pub name: String,
    pub number: String,
}

impl StudentForm {
    pub fn reset(&mut self) {
        self.name.clear();
        self.number.clear();
    }
}

#[derive(Debug)]
pub struct ViewState {
    pub roster: RosterTable,
    pub form: StudentForm,
    /// Value of the date picker.
    pub selected_date: NaiveDate,
    /// `None` while the attendance panel is hidden.
    pub attendance: Option<AttendanceSession>,
}

impl ViewState {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            roster: RosterTable::Loading,
            form: StudentForm::default(),
            selected_date: today,
            attendance: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TableRow {
    Data(Vec<String>),
    /// A single cell spanning the whole table.
    Info(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Table {
    pub title: Option<String>,
    pub header: Vec<String>,
    pub rows: Vec<TableRow>,
}

impl Table {
    pub fn data_rows(&self) -> impl Iterator<Item = &Vec<String>> {
        self.rows.iter().filter_map(|row| match row {
            TableRow::Data(cells) => Some(cells),
            TableRow::Info(_) => None,
        })
    }

    pub fn info_rows(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().filter_map(|row| match row {
            TableRow::Info(text) => Some(text.as_str()),
            TableRow::Data(_) => None,
        })
    }

    fn widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.header.iter().map(|h| h.chars().count()).collect();
        for cells in self.data_rows() {
            for (i, cell) in cells.iter().enumerate() {
                if let Some(width) = widths.get_mut(i) {
                    *width = (*width).max(cell.chars().count());
                }
            }
        }
        widths
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let widths = self.widths();
        let line = |cells: &[String]| {
            cells
                .iter()
                .zip(widths.iter().copied())
                .map(|(cell, width)| format!("{cell:<width$}"))
                .collect::<Vec<_>>()
                .join(" | ")
        };

        if let Some(title) = &self.title {
            writeln!(f, "{title}")?;
        }
        let header = line(self.header.as_slice());
        writeln!(f, "{header}")?;
        writeln!(f, "{}", "-".repeat(header.chars().count()))?;
        for row in &self.rows {
            match row {
                TableRow::Data(cells) => writeln!(f, "{}", line(cells.as_slice()))?,
                TableRow::Info(text) => writeln!(f, "{text}")?,
            }
        }
        Ok(())
    }
}

fn header(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|c| c.to_string()).collect()
}

pub fn render_roster(roster: &RosterTable) -> Table {
    let rows = match roster {
        RosterTable::Loading => vec![TableRow::Info("Loading...".to_string())],
        RosterTable::Empty => vec![TableRow::Info("No students registered.".to_string())],
        RosterTable::Failed => vec![TableRow::Info("Failed to load students.".to_string())],
        RosterTable::Rows(students) => students
            .iter()
            .map(|s| {
                TableRow::Data(vec![
                    s.id.to_string(),
                    s.number.to_string(),
                    s.name.clone(),
                    format!("delete {}", s.id),
                ])
            })
            .collect(),
    };

    Table {
        title: Some("Students".to_string()),
        header: header(&["ID", "Number", "Name", "Actions"]),
        rows,
    }
}

/// `None` when the panel is hidden.
pub fn render_attendance(session: Option<&AttendanceSession>) -> Option<Table> {
    let session = session?;
    let rows = if session.is_empty() {
        vec![TableRow::Info("No students for attendance.".to_string())]
    } else {
        session
            .rows()
            .map(|(student, present)| {
                let mark = if present { "[x]" } else { "[ ]" };
                TableRow::Data(vec![
                    student.number.to_string(),
                    student.name.clone(),
                    format!("{mark} {}", student.id),
                ])
            })
            .collect()
    };

    Some(Table {
        title: Some(format!("Attendance for {}", display_date(session.date()))),
        header: header(&["Number", "Name", "Present"]),
        rows,
    })
}

pub fn render_history(student: &Student, records: &[PresenceRecord]) -> Table {
    let mut records: Vec<&PresenceRecord> = records.iter().collect();
    records.sort_by_key(|r| r.timestamp);

    let rows = if records.is_empty() {
        vec![TableRow::Info("No presence recorded.".to_string())]
    } else {
        records
            .into_iter()
            .map(|r| {
                TableRow::Data(vec![
                    r.id.to_string(),
                    r.timestamp
                        .map(|t| t.format("%d/%m/%Y %H:%M:%S").to_string())
                        .unwrap_or_else(|| "-".to_string()),
                    match r.present {
                        Some(false) => "absent".to_string(),
                        _ => "present".to_string(),
                    },
                ])
            })
            .collect()
    };

    Table {
        title: Some(format!("Presence of {} (#{})", student.name, student.number)),
        header: header(&["ID", "When", "Status"]),
        rows,
    }
}

pub fn render_notification(slot: Slot, notification: &Notification) -> String {
    let label = match slot {
        Slot::AddStudent => "add",
        Slot::Roster => "students",
        Slot::Attendance => "attendance",
    };
    let kind = match notification.kind {
        Kind::Success => "ok",
        Kind::Error => "error",
    };
    format!("[{label}] {kind}: {}", notification.text)
}
