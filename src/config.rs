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

use anyhow::{anyhow, Context};
use chrono_tz::Tz;

pub const DEFAULT_API_URL: &str = "http://localhost:8080";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Clone, Debug)]
pub struct Config {
    pub api_url: String,
    pub request_timeout: Duration,
    /// `None` means the system's local zone.
    pub timezone: Option<Tz>,
    pub production: bool,
    pub enable_debug_libraries: bool,
    pub log_file: String,
}

impl Config {
    /// Reads the process environment. Call `dotenv::dotenv()` first to
    /// pick up a `.env` file.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = lookup("ROLLCALL_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let timeout_secs: u64 = match lookup("ROLLCALL_REQUEST_TIMEOUT_SECS") {
            Some(value) => value
                .parse()
                .context("Failed to parse ROLLCALL_REQUEST_TIMEOUT_SECS")?,
            None => DEFAULT_TIMEOUT_SECS,
        };
        if timeout_secs == 0 {
            return Err(anyhow!("ROLLCALL_REQUEST_TIMEOUT_SECS must be at least 1"));
        }

        let timezone = lookup("ROLLCALL_TIMEZONE")
            .map(|value| parse_timezone(&value))
            .transpose()?;

        let production = lookup("ROLLCALL_RUST_ENV").as_deref() == Some("production");
        let enable_debug_libraries = match lookup("ENABLE_DEBUG_LIBRARIES") {
            Some(value) => value
                .parse()
                .context("Failed to parse ENABLE_DEBUG_LIBRARIES")?,
            None => false,
        };
        let log_file = lookup("ROLLCALL_LOG_FILE").unwrap_or_else(|| "rollcall.log".to_string());

        Ok(Self {
            api_url,
            request_timeout: Duration::from_secs(timeout_secs),
            timezone,
            production,
            enable_debug_libraries,
            log_file,
        })
    }
}

pub fn parse_timezone(value: &str) -> anyhow::Result<Tz> {
    value
        .parse::<Tz>()
        .map_err(|e| anyhow!("Invalid timezone '{}': {}", value, e))
}
