// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Odontogram and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Fixed-period autosave bookkeeping.
//!
//! [`AutosaveScheduler`] never reads a clock: every call takes `now`, so the owner decides how
//! time passes (an interval in the binary, plain arithmetic in tests). It tracks three things:
//! - the dirty flag ([`SaveStatus`])
//! - when the next periodic save is due
//! - the revision of the save in flight, to notice edits made while it ran

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use tracing::{debug, warn};

/// Default autosave period.
pub const AUTOSAVE_PERIOD: TimeDelta = TimeDelta::seconds(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStatus {
    /// The remote store holds the current chart.
    Saved,
    /// Local edits have not reached the remote store.
    Unsaved,
    /// A save is in flight.
    Saving,
}

impl SaveStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Saved => "saved",
            Self::Unsaved => "unsaved",
            Self::Saving => "saving",
        }
    }
}

impl fmt::Display for SaveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Success,
    Failed,
}

/// How a save attempt ended, from the scheduler's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Finished {
    /// The saved revision is still current.
    Saved,
    /// The save went through but the chart changed meanwhile.
    Superseded,
    Failed,
}

#[derive(Debug, Clone)]
pub struct AutosaveScheduler {
    period: TimeDelta,
    next_due: Option<DateTime<Utc>>,
    status: SaveStatus,
    in_flight_rev: Option<u64>,
    last_saved_at: Option<DateTime<Utc>>,
}

impl AutosaveScheduler {
    /// Periods shorter than a millisecond are raised to one.
    pub fn new(period: TimeDelta, status: SaveStatus) -> Self {
        Self {
            period: period.max(TimeDelta::milliseconds(1)),
            next_due: None,
            status,
            in_flight_rev: None,
            last_saved_at: None,
        }
    }

    pub fn period(&self) -> TimeDelta {
        self.period
    }

    /// Leaves the timer stopped when the first deadline is not representable.
    pub fn start(&mut self, now: DateTime<Utc>) {
        self.next_due = now.checked_add_signed(self.period);
        if self.next_due.is_none() {
            warn!(period = ?self.period, "autosave deadline out of range, timer not started");
        }
    }

    pub fn stop(&mut self) {
        self.next_due = None;
    }

    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    pub fn next_due(&self) -> Option<DateTime<Utc>> {
        self.next_due
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_due.is_some_and(|due| now >= due)
    }

    pub fn status(&self) -> SaveStatus {
        self.status
    }

    pub fn last_saved_at(&self) -> Option<DateTime<Utc>> {
        self.last_saved_at
    }

    /// An in-flight save keeps `Saving`; [`Self::finish`] notices the edit through the revision.
    pub fn mark_dirty(&mut self) {
        if self.status != SaveStatus::Saving {
            self.status = SaveStatus::Unsaved;
        }
    }

    /// Timer entry point. When due, the deadline moves forward by whole periods whether or not
    /// a save starts; returns true when the caller should save revision `rev` now.
    pub fn begin_tick(&mut self, now: DateTime<Utc>, rev: u64) -> bool {
        let Some(due) = self.next_due.filter(|due| now >= *due) else {
            return false;
        };
        let period_ms = self.period.num_milliseconds().max(1);
        let periods = (now - due).num_milliseconds() / period_ms + 1;
        self.next_due = periods
            .checked_mul(period_ms)
            .and_then(TimeDelta::try_milliseconds)
            .and_then(|step| due.checked_add_signed(step));
        if self.next_due.is_none() {
            warn!(period = ?self.period, "autosave deadline out of range, timer stopped");
        }

        if self.status != SaveStatus::Unsaved || self.in_flight_rev.is_some() {
            return false;
        }
        self.begin(rev);
        true
    }

    /// Manual saves skip the timer and the dirty check; only a save in flight refuses them.
    pub fn begin_manual(&mut self, rev: u64) -> bool {
        if self.in_flight_rev.is_some() {
            return false;
        }
        self.begin(rev);
        true
    }

    fn begin(&mut self, rev: u64) {
        debug!(rev, from = %self.status, "save started");
        self.status = SaveStatus::Saving;
        self.in_flight_rev = Some(rev);
    }

    pub fn finish(
        &mut self,
        outcome: SaveOutcome,
        now: DateTime<Utc>,
        current_rev: u64,
    ) -> Finished {
        let saved_rev = self.in_flight_rev.take();
        let finished = match outcome {
            SaveOutcome::Failed => Finished::Failed,
            SaveOutcome::Success => {
                self.last_saved_at = Some(now);
                if saved_rev == Some(current_rev) {
                    Finished::Saved
                } else {
                    Finished::Superseded
                }
            }
        };
        self.status = match finished {
            Finished::Saved => SaveStatus::Saved,
            Finished::Superseded | Finished::Failed => SaveStatus::Unsaved,
        };
        debug!(?finished, status = %self.status, "save finished");
        finished
    }
}
