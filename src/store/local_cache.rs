// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Odontogram and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::kv::{KeyValueStore, StoreError};
use crate::bridge::wire::{decode_teeth_strict, encode_teeth, WireError, WireTeeth};
use crate::dates::{format_display, parse_display_date};
use crate::model::{ChartSnapshot, PatientId};

const KEY_PREFIX: &str = "odontogram:";

/// Persisted shape of a cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CacheRecord {
    patient_id: PatientId,
    observaciones: String,
    /// Display format, `DD/MM/YYYY`.
    fecha: String,
    piezas_dentales: WireTeeth,
    timestamp: DateTime<Utc>,
}

/// A cached in-progress chart plus the time it was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalCacheEntry {
    pub snapshot: ChartSnapshot,
    pub saved_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
enum EntryError {
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Wire(#[from] WireError),
    #[error("entry belongs to patient {0}")]
    ForeignPatient(PatientId),
}

/// Durable mirror of the chart being edited, one entry per patient.
#[derive(Debug, Clone)]
pub struct LocalCache<S> {
    store: S,
}

impl<S: KeyValueStore> LocalCache<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn key_for(patient_id: &PatientId) -> String {
        format!("{KEY_PREFIX}{patient_id}")
    }

    /// Overwrites the entry for the snapshot's patient, stamped with `now`.
    pub fn write(&self, snapshot: &ChartSnapshot, now: DateTime<Utc>) -> Result<(), StoreError> {
        let key = Self::key_for(snapshot.patient_id());
        let record = CacheRecord {
            patient_id: snapshot.patient_id().clone(),
            observaciones: snapshot.observations().to_owned(),
            fecha: format_display(snapshot.date()),
            piezas_dentales: encode_teeth(snapshot.teeth()),
            timestamp: now,
        };
        let json = serde_json::to_string(&record).map_err(|source| StoreError::Json {
            key: key.clone(),
            source,
        })?;
        self.store.set(&key, &json)?;
        debug!(patient = %snapshot.patient_id(), rev = snapshot.rev(), "local cache written");
        Ok(())
    }

    /// Returns the cached entry, if any. Entries that cannot be read back are removed so they
    /// are not retried on every open.
    pub fn read(&self, patient_id: &PatientId, today: NaiveDate) -> Option<LocalCacheEntry> {
        let key = Self::key_for(patient_id);
        let raw = match self.store.get(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                warn!(patient = %patient_id, error = %err, "local cache unreadable");
                return None;
            }
        };

        match decode_entry(&raw, patient_id, today) {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!(patient = %patient_id, error = %err, "discarding corrupt local cache entry");
                if let Err(err) = self.store.remove(&key) {
                    warn!(patient = %patient_id, error = %err, "failed to remove corrupt entry");
                }
                None
            }
        }
    }

    pub fn clear(&self, patient_id: &PatientId) -> Result<(), StoreError> {
        self.store.remove(&Self::key_for(patient_id))?;
        debug!(patient = %patient_id, "local cache cleared");
        Ok(())
    }
}

fn decode_entry(
    raw: &str,
    patient_id: &PatientId,
    today: NaiveDate,
) -> Result<LocalCacheEntry, EntryError> {
    let record: CacheRecord = serde_json::from_str(raw)?;
    if &record.patient_id != patient_id {
        return Err(EntryError::ForeignPatient(record.patient_id));
    }
    let teeth = decode_teeth_strict(&record.piezas_dentales)?;

    let date = parse_display_date(&record.fecha, today);
    let snapshot = ChartSnapshot::restored(record.patient_id, record.observaciones, date, teeth);

    Ok(LocalCacheEntry {
        snapshot,
        saved_at: record.timestamp,
    })
}
