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
use chrono::{Local, NaiveDate, Utc};
use chrono_tz::Tz;

/// Source of "today". The attendance endpoint choice depends on it, so
/// tests pin it with [`FixedClock`].
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Reads the wall clock, in `timezone` when one is configured and in the
/// system's local zone otherwise.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock {
    pub timezone: Option<Tz>,
}

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        match self.timezone {
            Some(tz) => Utc::now().with_timezone(&tz).date_naive(),
            None => Local::now().date_naive(),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// `yyyy-MM-dd`, the only format the date picker accepts.
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").ok()
}

pub fn iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Midnight of `date` with no offset attached, e.g. `2024-03-01T00:00:00`.
/// The backend reads it as a local date-time in its own zone.
pub fn midnight_timestamp(date: NaiveDate) -> String {
    format!("{}T00:00:00", iso_date(date))
}

/// Header format of an attendance session, e.g. `01/03/2024`.
pub fn display_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}
