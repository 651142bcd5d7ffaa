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
//! Short-lived status messages shown next to each panel.
//!
//! Each [`Slot`] holds at most one message. Showing a message replaces the
//! previous text of that slot and restarts its clear timer; there is no
//! queue.
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::task::AbortHandle;
use tokio::time::Duration;
use tracing::trace;

pub const CLEAR_AFTER: Duration = Duration::from_secs(5);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Slot {
    AddStudent,
    Roster,
    Attendance,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kind {
    Success,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub kind: Kind,
    pub text: String,
}

#[derive(Default)]
struct SlotState {
    current: Option<Notification>,
    timer: Option<AbortHandle>,
    generation: u64,
}

/// Must be used from within a tokio runtime; every message spawns its
/// clear timer.
#[derive(Clone)]
pub struct Notifier {
    slots: Arc<Mutex<HashMap<Slot, SlotState>>>,
    clear_after: Duration,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(CLEAR_AFTER)
    }
}

impl Notifier {
    pub fn new(clear_after: Duration) -> Self {
        Self {
            slots: Arc::new(Mutex::new(HashMap::new())),
            clear_after,
        }
    }

    pub fn success(&self, slot: Slot, text: impl Into<String>) {
        self.show(slot, Kind::Success, text.into());
    }

    pub fn error(&self, slot: Slot, text: impl Into<String>) {
        self.show(slot, Kind::Error, text.into());
    }

    fn show(&self, slot: Slot, kind: Kind, text: String) {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        let state = slots.entry(slot).or_default();

        if let Some(timer) = state.timer.take() {
            timer.abort();
        }
        state.generation += 1;
        state.current = Some(Notification { kind, text });

        let generation = state.generation;
        let handle = Arc::clone(&self.slots);
        let clear_after = self.clear_after;
        let timer = tokio::spawn(async move {
            tokio::time::sleep(clear_after).await;
            let mut slots = handle.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(state) = slots.get_mut(&slot) {
                // A newer message may have been shown while this timer was
                // already past its sleep.
                if state.generation == generation {
                    trace!("Clearing {:?} notification", slot);
                    state.current = None;
                    state.timer = None;
                }
            }
        });
        state.timer = Some(timer.abort_handle());
    }

    pub fn clear(&self, slot: Slot) {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(state) = slots.get_mut(&slot) {
            if let Some(timer) = state.timer.take() {
                timer.abort();
            }
            state.generation += 1;
            state.current = None;
        }
    }

    pub fn current(&self, slot: Slot) -> Option<Notification> {
        let slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        slots.get(&slot).and_then(|state| state.current.clone())
    }

    /// Visible messages in panel order.
    pub fn visible(&self) -> Vec<(Slot, Notification)> {
        let slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        let mut visible: Vec<_> = slots
            .iter()
            .filter_map(|(slot, state)| state.current.clone().map(|n| (*slot, n)))
            .collect();
        visible.sort_by_key(|(slot, _)| *slot);
        visible
    }
}
