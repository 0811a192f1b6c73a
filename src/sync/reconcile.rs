// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Odontogram and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use chrono::{DateTime, TimeDelta, Utc};
use tracing::info;

use crate::model::{ChartSnapshot, PatientId};
use crate::store::LocalCacheEntry;

/// Thresholds deciding whether a cached edit outranks the remote chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileRules {
    /// Oldest cache entry still restored when the remote store has no chart.
    pub local_cache_max_age: TimeDelta,
    /// How much newer than the remote chart a cache entry must be to win.
    pub local_wins_min_lead: TimeDelta,
    /// Oldest cache entry still allowed to outrank an existing remote chart.
    pub local_wins_max_age: TimeDelta,
}

impl Default for ReconcileRules {
    fn default() -> Self {
        Self {
            local_cache_max_age: TimeDelta::hours(24),
            local_wins_min_lead: TimeDelta::milliseconds(60_000),
            local_wins_max_age: TimeDelta::minutes(5),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Remote,
    Local,
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    pub snapshot: ChartSnapshot,
    pub source: Source,
    /// The chosen snapshot has not reached the remote store.
    pub dirty: bool,
    /// The cache entry lost and should be removed.
    pub discard_local: bool,
}

/// Picks the chart an editing session starts from. Always decides; never fails.
pub fn reconcile(
    patient_id: &PatientId,
    remote: Option<ChartSnapshot>,
    local: Option<LocalCacheEntry>,
    now: DateTime<Utc>,
    rules: &ReconcileRules,
) -> Reconciled {
    let decided = match (remote, local) {
        (None, None) => Reconciled {
            snapshot: ChartSnapshot::empty(patient_id.clone(), now.date_naive()),
            source: Source::Empty,
            dirty: false,
            discard_local: false,
        },
        (None, Some(local)) if now - local.saved_at < rules.local_cache_max_age => Reconciled {
            snapshot: local.snapshot,
            source: Source::Local,
            dirty: true,
            discard_local: false,
        },
        (None, Some(_stale)) => Reconciled {
            snapshot: ChartSnapshot::empty(patient_id.clone(), now.date_naive()),
            source: Source::Empty,
            dirty: false,
            discard_local: true,
        },
        (Some(remote), None) => Reconciled {
            snapshot: remote,
            source: Source::Remote,
            dirty: false,
            discard_local: false,
        },
        (Some(remote), Some(local)) => {
            if local_outranks(&remote, &local, now, rules) {
                let mut snapshot = local.snapshot;
                snapshot.set_updated_at(remote.updated_at());
                Reconciled {
                    snapshot,
                    source: Source::Local,
                    dirty: true,
                    discard_local: false,
                }
            } else {
                Reconciled {
                    snapshot: remote,
                    source: Source::Remote,
                    dirty: false,
                    discard_local: true,
                }
            }
        }
    };

    info!(
        patient = %patient_id,
        source = ?decided.source,
        dirty = decided.dirty,
        discard_local = decided.discard_local,
        "chart reconciled"
    );
    decided
}

/// A remote chart without a timestamp cannot be compared and always wins.
fn local_outranks(
    remote: &ChartSnapshot,
    local: &LocalCacheEntry,
    now: DateTime<Utc>,
    rules: &ReconcileRules,
) -> bool {
    let Some(remote_at) = remote.updated_at() else {
        return false;
    };
    local.saved_at - remote_at > rules.local_wins_min_lead
        && now - local.saved_at < rules.local_wins_max_age
}
