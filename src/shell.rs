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
//! Line-oriented front end: one command per line, each mapped onto a
//! controller handler.
use std::io::{BufRead, Write};

use anyhow::Context as _;
use chrono::NaiveDate;
use tracing::{debug, info};

use crate::controller::session::PresenceEdit;
use crate::controller::AttendanceController;
use crate::notification::Slot;
use crate::utils::time::{display_date, parse_date};
use crate::view::{render_attendance, render_notification, render_roster};

const HELP: &str = "\
Commands:
  list                      reload the student list
  add <number> <name...>    register a student
  delete <id>               delete a student (asks for confirmation)
  date [YYYY-MM-DD]         show or set the attendance date
  start                     start the attendance for the selected date
  toggle|present|absent <id>  edit a student's presence
  save                      save the attendance
  history <id> [from to]    presence records of a student
  check <id> [YYYY-MM-DD]   was the student present on that day
  show                      show the student list and attendance again
  help                      this text
  quit                      leave";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    List,
    Add { number: String, name: String },
    Delete(i64),
    Date(Option<String>),
    Start,
    Edit(i64, PresenceEdit),
    Save,
    History(i64, Option<(NaiveDate, NaiveDate)>),
    Check(i64, Option<NaiveDate>),
    Show,
    Help,
    Quit,
}

fn parse_id(arg: Option<&str>, usage: &str) -> Result<i64, String> {
    arg.and_then(|a| a.parse().ok())
        .ok_or_else(|| format!("Usage: {usage}"))
}

fn parse_day(arg: &str, usage: &str) -> Result<NaiveDate, String> {
    parse_date(arg).ok_or_else(|| format!("Invalid date '{arg}'. Usage: {usage}"))
}

/// `Ok(None)` for a blank line.
pub fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let mut words = line.split_whitespace();
    let Some(name) = words.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = words.collect();

    let command = match name.to_lowercase().as_str() {
        "list" | "refresh" => Command::List,
        "add" => Command::Add {
            number: args.first().map(|a| a.to_string()).unwrap_or_default(),
            name: args.get(1..).map(|rest| rest.join(" ")).unwrap_or_default(),
        },
        "delete" => Command::Delete(parse_id(args.first().copied(), "delete <id>")?),
        "date" => Command::Date(args.first().map(|a| a.to_string())),
        "start" => Command::Start,
        "toggle" | "present" | "absent" => {
            let edit = match name.to_lowercase().as_str() {
                "present" => PresenceEdit::Present,
                "absent" => PresenceEdit::Absent,
                _ => PresenceEdit::Toggle,
            };
            Command::Edit(parse_id(args.first().copied(), "toggle <id>")?, edit)
        }
        "save" => Command::Save,
        "history" => {
            const USAGE: &str = "history <id> [from to]";
            let id = parse_id(args.first().copied(), USAGE)?;
            let range = match args.get(1..) {
                Some([from, to]) => Some((parse_day(from, USAGE)?, parse_day(to, USAGE)?)),
                Some([]) | None => None,
                Some(_) => return Err(format!("Usage: {USAGE}")),
            };
            Command::History(id, range)
        }
        "check" => {
            const USAGE: &str = "check <id> [YYYY-MM-DD]";
            let id = parse_id(args.first().copied(), USAGE)?;
            let date = args.get(1).map(|d| parse_day(d, USAGE)).transpose()?;
            Command::Check(id, date)
        }
        "show" => Command::Show,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(format!("Unknown command '{other}'. Type 'help'.")),
    };
    Ok(Some(command))
}

pub struct Shell<'a, R, W> {
    controller: &'a AttendanceController,
    input: R,
    output: W,
}

impl<'a, R: BufRead, W: Write> Shell<'a, R, W> {
    pub fn new(controller: &'a AttendanceController, input: R, output: W) -> Self {
        Self {
            controller,
            input,
            output,
        }
    }

    /// Reads commands until `quit` or end of input.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        self.controller.load_roster().await;
        self.print_roster().await?;

        loop {
            write!(self.output, "> ")?;
            self.output.flush()?;

            let Some(line) = read_line(&mut self.input)? else {
                break;
            };
            debug!("Command: {}", line.trim());

            match parse_command(&line) {
                Ok(None) => {}
                Ok(Some(Command::Quit)) => break,
                Ok(Some(command)) => self.execute(command).await?,
                Err(message) => writeln!(self.output, "{message}")?,
            }
        }

        info!("Shell closed");
        Ok(())
    }

    pub async fn execute(&mut self, command: Command) -> anyhow::Result<()> {
        let controller = self.controller;
        let slots: &[Slot] = match command {
            Command::List => {
                controller.load_roster().await;
                self.print_roster().await?;
                &[Slot::Roster]
            }
            Command::Add { number, name } => {
                if controller.add_student(&name, &number).await {
                    self.print_roster().await?;
                }
                &[Slot::AddStudent, Slot::Roster]
            }
            Command::Delete(id) => {
                let (input, output) = (&mut self.input, &mut self.output);
                let deleted = controller
                    .delete_student(id, |prompt| confirm(input, output, prompt))
                    .await;
                if deleted {
                    self.print_roster().await?;
                }
                &[Slot::Roster]
            }
            Command::Date(None) => {
                let date = controller.view().await.selected_date;
                writeln!(self.output, "Attendance date: {}", display_date(date))?;
                &[]
            }
            Command::Date(Some(input)) => {
                if controller.set_date(&input).await {
                    let date = controller.view().await.selected_date;
                    writeln!(self.output, "Attendance date: {}", display_date(date))?;
                }
                &[Slot::Attendance]
            }
            Command::Start => {
                controller.start_attendance().await;
                self.print_attendance().await?;
                &[Slot::Attendance]
            }
            Command::Edit(id, edit) => {
                if controller.edit_presence(id, edit).await.is_some() {
                    self.print_attendance().await?;
                }
                &[Slot::Attendance]
            }
            Command::Save => {
                controller.save_attendance().await;
                &[Slot::Attendance]
            }
            Command::History(id, range) => {
                if let Some(table) = controller.show_history(id, range).await {
                    write!(self.output, "{table}")?;
                }
                &[Slot::Roster]
            }
            Command::Check(id, date) => {
                let day = match date {
                    Some(day) => day,
                    None => controller.view().await.selected_date,
                };
                if let Some(present) = controller.check_presence(id, Some(day)).await {
                    let status = if present { "present" } else { "absent" };
                    writeln!(self.output, "Student {id} was {status} on {}", display_date(day))?;
                }
                &[Slot::Attendance]
            }
            Command::Show => {
                self.print_roster().await?;
                self.print_attendance().await?;
                &[Slot::AddStudent, Slot::Roster, Slot::Attendance]
            }
            Command::Help => {
                writeln!(self.output, "{HELP}")?;
                &[]
            }
            Command::Quit => &[],
        };

        for (slot, notification) in controller.notifier().visible() {
            if slots.contains(&slot) {
                writeln!(self.output, "{}", render_notification(slot, &notification))?;
            }
        }
        Ok(())
    }

    async fn print_roster(&mut self) -> anyhow::Result<()> {
        let table = render_roster(&self.controller.view().await.roster);
        write!(self.output, "{table}")?;
        Ok(())
    }

    async fn print_attendance(&mut self) -> anyhow::Result<()> {
        let view = self.controller.view().await;
        if let Some(table) = render_attendance(view.attendance.as_ref()) {
            write!(self.output, "{table}")?;
        }
        Ok(())
    }
}

/// Blocking read that does not stall the other runtime workers.
fn read_line<R: BufRead>(input: &mut R) -> anyhow::Result<Option<String>> {
    let mut line = String::new();
    let read = tokio::task::block_in_place(|| input.read_line(&mut line))
        .context("Failed to read from input")?;
    Ok((read > 0).then_some(line))
}

fn confirm<R: BufRead, W: Write>(input: &mut R, output: &mut W, prompt: &str) -> bool {
    if write!(output, "{prompt} [y/N] ").and_then(|_| output.flush()).is_err() {
        return false;
    }
    matches!(
        read_line(input).ok().flatten().as_deref().map(str::trim),
        Some("y" | "Y" | "yes")
    )
}
