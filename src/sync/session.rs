// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Odontogram and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info, warn};

use super::autosave::{AutosaveScheduler, Finished, SaveOutcome, SaveStatus};
use super::reconcile::{reconcile, Source};
use crate::bridge::{BridgeError, PersistenceBridge, SaveRequest};
use crate::config::EditorConfig;
use crate::dates::parse_display_date;
use crate::model::{ChartSnapshot, PatientId};
use crate::ops::{apply_op, ApplyResult, ChartOp};
use crate::selection::geometry::Size;
use crate::selection::{Selection, SelectionEvent, SelectionMachine};
use crate::store::{KeyValueStore, LocalCache};

#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error("a save is already in progress")]
    InFlight,
    #[error(transparent)]
    Bridge(#[from] BridgeError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not due, or nothing to save.
    Idle,
    Saved,
    /// The save failed; the chart stays unsaved and the next tick retries.
    Failed,
    /// An older revision was saved; newer edits are still pending.
    Deferred,
}

/// One patient's chart opened for editing.
///
/// All mutations write through to the local cache synchronously. The remote store is only
/// written by [`Self::tick`], [`Self::save_now`] and, through the cache, by the next session
/// after a [`Self::close`].
pub struct EditorSession<B: PersistenceBridge, S: KeyValueStore> {
    snapshot: ChartSnapshot,
    selection: SelectionMachine,
    cache: LocalCache<S>,
    bridge: B,
    scheduler: AutosaveScheduler,
    refresh_after_save: bool,
    source: Source,
    closed: bool,
}

impl<B: PersistenceBridge, S: KeyValueStore> EditorSession<B, S> {
    /// Loads and reconciles the chart, then starts the autosave timer. Never fails: an
    /// unreachable remote store is treated as holding no chart.
    pub async fn open(
        patient_id: PatientId,
        bridge: B,
        cache: LocalCache<S>,
        config: &EditorConfig,
        now: DateTime<Utc>,
    ) -> Self {
        let today = now.date_naive();
        let remote = match bridge.load(&patient_id).await {
            Ok(doc) => doc.map(|doc| doc.into_snapshot(patient_id.clone(), today)),
            Err(err) => {
                warn!(
                    patient = %patient_id,
                    error = %err,
                    "remote chart unavailable, opening without it"
                );
                None
            }
        };
        let local = cache.read(&patient_id, today);

        let decided = reconcile(&patient_id, remote, local, now, &config.reconcile_rules());
        if decided.discard_local {
            if let Err(err) = cache.clear(&patient_id) {
                warn!(patient = %patient_id, error = %err, "failed to discard local cache entry");
            }
        }

        let status = if decided.dirty {
            SaveStatus::Unsaved
        } else {
            SaveStatus::Saved
        };
        let mut scheduler = AutosaveScheduler::new(config.autosave_period(), status);
        scheduler.start(now);

        Self {
            snapshot: decided.snapshot,
            selection: SelectionMachine::new(config.menu_geometry(), config.double_click_window()),
            cache,
            bridge,
            scheduler,
            refresh_after_save: config.refresh_after_save,
            source: decided.source,
            closed: false,
        }
    }

    pub fn patient_id(&self) -> &PatientId {
        self.snapshot.patient_id()
    }

    pub fn snapshot(&self) -> &ChartSnapshot {
        &self.snapshot
    }

    pub fn selection(&self) -> &Selection {
        self.selection.state()
    }

    /// Where the chart came from when the session opened.
    pub fn source(&self) -> Source {
        self.source
    }

    pub fn status(&self) -> SaveStatus {
        self.scheduler.status()
    }

    pub fn last_saved_at(&self) -> Option<DateTime<Utc>> {
        self.scheduler.last_saved_at()
    }

    pub fn next_autosave(&self) -> Option<DateTime<Utc>> {
        self.scheduler.next_due()
    }

    pub fn cache(&self) -> &LocalCache<S> {
        &self.cache
    }

    pub fn bridge(&self) -> &B {
        &self.bridge
    }

    pub fn set_viewport(&mut self, viewport: Size) {
        self.selection.set_viewport(viewport);
    }

    /// Feeds an interaction to the selection machine and applies the operation it completes.
    pub fn handle(&mut self, event: SelectionEvent, now: DateTime<Utc>) -> Option<ApplyResult> {
        let op = self.selection.handle(event, &self.snapshot)?;
        Some(self.apply(op, now))
    }

    pub fn apply(&mut self, op: ChartOp, now: DateTime<Utc>) -> ApplyResult {
        let result = apply_op(&mut self.snapshot, &op);
        if !result.delta.is_empty() {
            self.write_through(now);
        }
        result
    }

    pub fn set_observations(
        &mut self,
        observations: impl Into<String>,
        now: DateTime<Utc>,
    ) -> bool {
        let changed = self.snapshot.set_observations(observations);
        if changed {
            self.write_through(now);
        }
        changed
    }

    pub fn set_date(&mut self, date: NaiveDate, now: DateTime<Utc>) -> bool {
        let changed = self.snapshot.set_date(date);
        if changed {
            self.write_through(now);
        }
        changed
    }

    /// Accepts the editor's `DD/MM/YYYY` text; unreadable input becomes today.
    pub fn set_display_date(&mut self, raw: &str, now: DateTime<Utc>) -> bool {
        self.set_date(parse_display_date(raw, now.date_naive()), now)
    }

    fn write_through(&mut self, now: DateTime<Utc>) {
        self.scheduler.mark_dirty();
        if let Err(err) = self.cache.write(&self.snapshot, now) {
            warn!(patient = %self.patient_id(), error = %err, "local cache write failed");
        }
    }

    /// Autosave entry point; call it at least once per period.
    pub async fn tick(&mut self, now: DateTime<Utc>) -> TickOutcome {
        if !self.scheduler.begin_tick(now, self.snapshot.rev()) {
            return TickOutcome::Idle;
        }
        match self.run_save(now).await {
            Ok(Finished::Saved) => TickOutcome::Saved,
            Ok(Finished::Superseded) => TickOutcome::Deferred,
            Ok(Finished::Failed) | Err(_) => TickOutcome::Failed,
        }
    }

    /// Saves immediately, regardless of the timer. Failures are returned, unlike autosave.
    pub async fn save_now(&mut self, now: DateTime<Utc>) -> Result<(), SaveError> {
        if !self.scheduler.begin_manual(self.snapshot.rev()) {
            return Err(SaveError::InFlight);
        }
        self.run_save(now).await?;
        Ok(())
    }

    async fn run_save(&mut self, now: DateTime<Utc>) -> Result<Finished, BridgeError> {
        let request = SaveRequest::from_snapshot(&self.snapshot);
        let result = self.bridge.save(&request).await;
        let outcome = if result.is_ok() {
            SaveOutcome::Success
        } else {
            SaveOutcome::Failed
        };
        let finished = self.scheduler.finish(outcome, now, self.snapshot.rev());

        match (&result, finished) {
            (Err(err), _) => {
                warn!(patient = %self.patient_id(), error = %err, "chart save failed, will retry");
            }
            (Ok(()), Finished::Saved) => {
                info!(patient = %self.patient_id(), rev = self.snapshot.rev(), "chart saved");
                if let Err(err) = self.cache.clear(self.snapshot.patient_id()) {
                    warn!(
                        patient = %self.patient_id(),
                        error = %err,
                        "failed to clear local cache after save"
                    );
                }
                if self.refresh_after_save {
                    self.refresh(now).await;
                }
            }
            (Ok(()), _) => {
                debug!(patient = %self.patient_id(), "chart changed during save, keeping cache");
            }
        }
        result.map(|()| finished)
    }

    /// Replaces the snapshot with the remote copy. The revision counter is kept.
    async fn refresh(&mut self, now: DateTime<Utc>) {
        let patient_id = self.snapshot.patient_id().clone();
        match self.bridge.load(&patient_id).await {
            Ok(Some(doc)) => {
                let rev = self.snapshot.rev();
                self.snapshot = doc
                    .into_snapshot(patient_id, now.date_naive())
                    .with_rev(rev);
                debug!(patient = %self.patient_id(), "chart refreshed from remote");
            }
            Ok(None) => {}
            Err(err) => {
                warn!(patient = %patient_id, error = %err, "refresh after save failed");
            }
        }
    }

    /// Stops autosave and flushes pending edits to the local cache. Synchronous so it can also
    /// run from `Drop`.
    pub fn close(&mut self, now: DateTime<Utc>) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.scheduler.stop();
        if self.scheduler.status() == SaveStatus::Saved {
            return;
        }
        let patient = self.patient_id();
        match self.cache.write(&self.snapshot, now) {
            Ok(()) => info!(patient = %patient, "pending edits flushed to local cache"),
            Err(err) => warn!(patient = %patient, error = %err, "teardown cache flush failed"),
        }
    }
}

impl<B: PersistenceBridge, S: KeyValueStore> Drop for EditorSession<B, S> {
    fn drop(&mut self) {
        // No caller clock here.
        self.close(Utc::now());
    }
}
