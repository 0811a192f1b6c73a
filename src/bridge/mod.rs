// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Odontogram and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The remote, authoritative chart store.
//!
//! [`PersistenceBridge`] is the only contract the editor relies on: load the last confirmed
//! chart of a patient and save a new one. [`MemoryBridge`] keeps documents in process and can
//! inject failures; [`FolderBridge`] keeps one JSON document per patient on disk.

pub mod wire;

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::model::PatientId;
use crate::store::{FileStore, KeyValueStore, StoreError, WriteDurability};

pub use wire::{RemoteChart, SaveRequest, WireError, WireTeeth, WireTooth};

#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("malformed chart document for patient {patient}: {source}")]
    Json {
        patient: PatientId,
        #[source]
        source: serde_json::Error,
    },
    #[error("remote store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait PersistenceBridge: Send + Sync {
    /// Returns `None` when the patient has no chart yet.
    async fn load(&self, patient_id: &PatientId) -> Result<Option<RemoteChart>, BridgeError>;

    async fn save(&self, request: &SaveRequest) -> Result<(), BridgeError>;
}

#[async_trait]
impl<B: PersistenceBridge + ?Sized> PersistenceBridge for Arc<B> {
    async fn load(&self, patient_id: &PatientId) -> Result<Option<RemoteChart>, BridgeError> {
        (**self).load(patient_id).await
    }

    async fn save(&self, request: &SaveRequest) -> Result<(), BridgeError> {
        (**self).save(request).await
    }
}

fn stamp(previous: Option<&RemoteChart>, request: &SaveRequest, now: DateTime<Utc>) -> RemoteChart {
    RemoteChart {
        observaciones: request.observaciones.clone(),
        fecha: Some(request.fecha.clone()),
        piezas_dentales: request.piezas_dentales.clone(),
        updated_at: Some(now),
        created_at: previous.and_then(|doc| doc.created_at).or(Some(now)),
    }
}

#[derive(Debug, Default)]
struct MemoryBridgeState {
    documents: BTreeMap<PatientId, RemoteChart>,
    fail_loads: bool,
    fail_saves: bool,
    saves: usize,
    pinned_now: Option<DateTime<Utc>>,
}

/// In-process bridge. Clones share the same documents.
#[derive(Debug, Clone, Default)]
pub struct MemoryBridge {
    state: Arc<Mutex<MemoryBridgeState>>,
}

impl MemoryBridge {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut MemoryBridgeState) -> R) -> R {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }

    pub fn insert(&self, patient_id: PatientId, chart: RemoteChart) {
        self.with_state(|state| state.documents.insert(patient_id, chart));
    }

    pub fn document(&self, patient_id: &PatientId) -> Option<RemoteChart> {
        self.with_state(|state| state.documents.get(patient_id).cloned())
    }

    pub fn set_fail_loads(&self, fail: bool) {
        self.with_state(|state| state.fail_loads = fail);
    }

    pub fn set_fail_saves(&self, fail: bool) {
        self.with_state(|state| state.fail_saves = fail);
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        self.with_state(|state| state.saves)
    }

    /// Stamps subsequent saves with `now` instead of the wall clock.
    pub fn pin_clock(&self, now: DateTime<Utc>) {
        self.with_state(|state| state.pinned_now = Some(now));
    }
}

#[async_trait]
impl PersistenceBridge for MemoryBridge {
    async fn load(&self, patient_id: &PatientId) -> Result<Option<RemoteChart>, BridgeError> {
        self.with_state(|state| {
            if state.fail_loads {
                return Err(BridgeError::Unavailable(format!(
                    "injected load failure for {patient_id}"
                )));
            }
            Ok(state.documents.get(patient_id).cloned())
        })
    }

    async fn save(&self, request: &SaveRequest) -> Result<(), BridgeError> {
        self.with_state(|state| {
            if state.fail_saves {
                return Err(BridgeError::Unavailable(format!(
                    "injected save failure for {}",
                    request.patient_id
                )));
            }
            let now = state.pinned_now.unwrap_or_else(Utc::now);
            let doc = stamp(state.documents.get(&request.patient_id), request, now);
            state.documents.insert(request.patient_id.clone(), doc);
            state.saves += 1;
            Ok(())
        })
    }
}

/// One pretty-printed JSON document per patient under a data directory.
#[derive(Debug, Clone)]
pub struct FolderBridge {
    files: FileStore,
}

impl FolderBridge {
    pub fn new(root: impl Into<std::path::PathBuf>) -> Self {
        Self {
            files: FileStore::new(root),
        }
    }

    pub fn with_durability(mut self, durability: WriteDurability) -> Self {
        self.files = self.files.with_durability(durability);
        self
    }

    pub fn root(&self) -> &std::path::Path {
        self.files.root()
    }

    fn read(&self, patient_id: &PatientId) -> Result<Option<RemoteChart>, BridgeError> {
        let Some(raw) = self.files.get(patient_id.as_str())? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| BridgeError::Json {
                patient: patient_id.clone(),
                source,
            })
    }
}

#[async_trait]
impl PersistenceBridge for FolderBridge {
    async fn load(&self, patient_id: &PatientId) -> Result<Option<RemoteChart>, BridgeError> {
        let doc = self.read(patient_id)?;
        debug!(patient = %patient_id, found = doc.is_some(), "chart document loaded");
        Ok(doc)
    }

    async fn save(&self, request: &SaveRequest) -> Result<(), BridgeError> {
        let patient_id = &request.patient_id;
        // A malformed previous document only loses its `created_at`.
        let previous = match self.read(patient_id) {
            Ok(doc) => doc,
            Err(err @ BridgeError::Json { .. }) => {
                warn!(error = %err, "overwriting malformed chart document");
                None
            }
            Err(err) => return Err(err),
        };
        let doc = stamp(previous.as_ref(), request, Utc::now());
        let json = serde_json::to_string_pretty(&doc).map_err(|source| BridgeError::Json {
            patient: patient_id.clone(),
            source,
        })?;
        self.files.set(patient_id.as_str(), &json)?;
        let path = self.files.path_for_key(patient_id.as_str());
        info!(patient = %patient_id, path = ?path, "chart document saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    use super::{BridgeError, FolderBridge, MemoryBridge, PersistenceBridge, SaveRequest};
    use crate::model::fixtures::{charted, patient, t0};

    #[fixture]
    fn tmp() -> TempDir {
        tempfile::Builder::new()
            .prefix("odontogram-bridge")
            .tempdir()
            .expect("tempdir")
    }

    #[tokio::test]
    async fn memory_bridge_stamps_and_counts_saves() {
        let bridge = MemoryBridge::new();
        bridge.pin_clock(t0());
        assert_eq!(bridge.load(&patient("p1")).await.expect("load"), None);

        let request = SaveRequest::from_snapshot(&charted("p1"));
        bridge.save(&request).await.expect("save");
        let doc = bridge
            .load(&patient("p1"))
            .await
            .expect("load")
            .expect("doc");

        assert_eq!(bridge.save_count(), 1);
        assert_eq!(doc.updated_at, Some(t0()));
        assert_eq!(doc.created_at, Some(t0()));
        assert_eq!(doc.fecha.as_deref(), Some("2026-03-14"));
    }

    #[tokio::test]
    async fn memory_bridge_injects_failures() {
        let bridge = MemoryBridge::new();
        bridge.set_fail_saves(true);
        let request = SaveRequest::from_snapshot(&charted("p1"));
        let err = bridge.save(&request).await.unwrap_err();
        assert!(matches!(err, BridgeError::Unavailable(_)), "{err:?}");
        assert_eq!(bridge.save_count(), 0);

        bridge.set_fail_loads(true);
        assert!(bridge.load(&patient("p1")).await.is_err());
    }

    #[rstest]
    #[tokio::test]
    async fn folder_bridge_keeps_created_at_across_saves(tmp: TempDir) {
        let bridge = FolderBridge::new(tmp.path());
        let request = SaveRequest::from_snapshot(&charted("p1"));

        bridge.save(&request).await.expect("first save");
        let first = bridge
            .load(&patient("p1"))
            .await
            .expect("load")
            .expect("doc");
        bridge.save(&request).await.expect("second save");
        let second = bridge
            .load(&patient("p1"))
            .await
            .expect("load")
            .expect("doc");

        assert_eq!(first.created_at, second.created_at);
        assert!(second.updated_at >= first.updated_at);
        assert_eq!(second.piezas_dentales, request.piezas_dentales);
    }

    #[rstest]
    #[tokio::test]
    async fn folder_bridge_reports_malformed_documents(tmp: TempDir) {
        let bridge = FolderBridge::new(tmp.path());
        let path = tmp.path().join("p1.json");
        std::fs::write(path, "not json").expect("write");

        let err = bridge.load(&patient("p1")).await.unwrap_err();
        assert!(matches!(err, BridgeError::Json { .. }), "{err:?}");
    }

    #[rstest]
    #[tokio::test]
    async fn folder_bridge_save_replaces_malformed_document(tmp: TempDir) {
        let bridge = FolderBridge::new(tmp.path());
        let path = tmp.path().join("p1.json");
        std::fs::write(path, "not json").expect("write");

        let request = SaveRequest::from_snapshot(&charted("p1"));
        bridge.save(&request).await.expect("save");

        let doc = bridge
            .load(&patient("p1"))
            .await
            .expect("load")
            .expect("doc");
        assert!(doc.created_at.is_some());
        assert_eq!(doc.created_at, doc.updated_at);
        assert_eq!(doc.piezas_dentales, request.piezas_dentales);
    }

    #[rstest]
    #[tokio::test]
    async fn folder_bridge_save_propagates_unreadable_previous_document(tmp: TempDir) {
        let bridge = FolderBridge::new(tmp.path());
        let path = tmp.path().join("p1.json");
        std::fs::create_dir(&path).expect("mkdir");

        let request = SaveRequest::from_snapshot(&charted("p1"));
        let err = bridge.save(&request).await.unwrap_err();
        assert!(matches!(err, BridgeError::Store(_)), "{err:?}");
        assert!(path.is_dir());
    }
}
