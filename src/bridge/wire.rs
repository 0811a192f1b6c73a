// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Odontogram and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Persisted JSON shapes shared by the remote store and the local cache.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::dates::{format_wire, parse_wire_date};
use crate::model::{
    ChartSnapshot, InvalidToothId, Mark, ParseMarkError, ParseSurfaceError, PatientId, Surface,
    ToothId, ToothState,
};

/// Per-tooth record as stored under `piezasDentales`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireTooth {
    #[serde(default)]
    pub ausente: bool,
    #[serde(default)]
    pub superficies: BTreeMap<String, Option<String>>,
}

pub type WireTeeth = BTreeMap<String, WireTooth>;

/// Chart document as returned by the remote store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteChart {
    #[serde(default)]
    pub observaciones: String,
    #[serde(default)]
    pub fecha: Option<String>,
    #[serde(default)]
    pub piezas_dentales: WireTeeth,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl RemoteChart {
    /// Builds the editing snapshot. Unreadable tooth entries are dropped with a warning rather
    /// than failing the whole load.
    pub fn into_snapshot(self, patient_id: PatientId, today: NaiveDate) -> ChartSnapshot {
        let date = parse_wire_date(self.fecha.as_deref(), today);
        let teeth = decode_teeth_lenient(&self.piezas_dentales);
        let mut snapshot = ChartSnapshot::restored(patient_id, self.observaciones, date, teeth);
        snapshot.set_updated_at(self.updated_at.or(self.created_at));
        snapshot
    }
}

/// Body of a save call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRequest {
    pub patient_id: PatientId,
    pub observaciones: String,
    /// Always `YYYY-MM-DD`.
    pub fecha: String,
    pub piezas_dentales: WireTeeth,
}

impl SaveRequest {
    pub fn from_snapshot(snapshot: &ChartSnapshot) -> Self {
        Self {
            patient_id: snapshot.patient_id().clone(),
            observaciones: snapshot.observations().to_owned(),
            fecha: format_wire(snapshot.date()),
            piezas_dentales: encode_teeth(snapshot.teeth()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WireError {
    #[error("tooth key: {0}")]
    Tooth(#[from] InvalidToothId),
    #[error("tooth {tooth}: {source}")]
    Surface {
        tooth: ToothId,
        #[source]
        source: ParseSurfaceError,
    },
    #[error("tooth {tooth}/{surface}: {source}")]
    Mark {
        tooth: ToothId,
        surface: Surface,
        #[source]
        source: ParseMarkError,
    },
}

pub fn encode_tooth(state: &ToothState) -> WireTooth {
    WireTooth {
        ausente: state.absent(),
        superficies: state
            .surfaces()
            .map(|(surface, mark)| (surface.to_string(), mark.encode()))
            .collect(),
    }
}

pub fn encode_teeth(teeth: &BTreeMap<ToothId, ToothState>) -> WireTeeth {
    teeth
        .iter()
        .map(|(tooth, state)| (tooth.to_string(), encode_tooth(state)))
        .collect()
}

pub fn decode_tooth(tooth: ToothId, wire: &WireTooth) -> Result<ToothState, WireError> {
    let mut surfaces = [Mark::Empty; 5];
    for (key, raw) in &wire.superficies {
        let surface: Surface = key
            .parse()
            .map_err(|source| WireError::Surface { tooth, source })?;
        let mark = Mark::decode(raw.as_deref()).map_err(|source| WireError::Mark {
            tooth,
            surface,
            source,
        })?;
        surfaces[surface.index()] = mark;
    }
    Ok(ToothState::from_parts(wire.ausente, surfaces))
}

/// All-or-nothing decode, used where a partially understood record must be discarded.
pub fn decode_teeth_strict(wire: &WireTeeth) -> Result<BTreeMap<ToothId, ToothState>, WireError> {
    wire.iter()
        .map(|(key, wire_tooth)| -> Result<_, WireError> {
            let tooth: ToothId = key.parse()?;
            Ok((tooth, decode_tooth(tooth, wire_tooth)?))
        })
        .collect()
}

pub fn decode_teeth_lenient(wire: &WireTeeth) -> BTreeMap<ToothId, ToothState> {
    wire.iter()
        .filter_map(|(key, wire_tooth)| {
            let decoded = key
                .parse::<ToothId>()
                .map_err(WireError::from)
                .and_then(|tooth| Ok((tooth, decode_tooth(tooth, wire_tooth)?)));
            match decoded {
                Ok(entry) => Some(entry),
                Err(err) => {
                    warn!(key = key.as_str(), error = %err, "dropping unreadable tooth record");
                    None
                }
            }
        })
        .collect()
}
