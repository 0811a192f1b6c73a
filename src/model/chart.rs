// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Odontogram and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};

use super::ids::PatientId;
use super::mark::Mark;
use super::tooth::{Surface, ToothId};

/// Annotation state of a single tooth.
///
/// Invariant: when `absent` is set every surface is [`Mark::Empty`]. All mutators keep it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ToothState {
    absent: bool,
    surfaces: [Mark; 5],
}

impl ToothState {
    pub fn absent(&self) -> bool {
        self.absent
    }

    pub fn surface(&self, surface: Surface) -> Mark {
        self.surfaces[surface.index()]
    }

    pub fn surfaces(&self) -> impl Iterator<Item = (Surface, Mark)> + '_ {
        Surface::ALL
            .into_iter()
            .map(|surface| (surface, self.surface(surface)))
    }

    pub fn is_untouched(&self) -> bool {
        *self == Self::default()
    }

    pub fn all_extracted(&self) -> bool {
        self.surfaces.iter().all(Mark::is_extraction)
    }

    /// Surfaces are reset regardless of `absent`.
    pub fn set_absent(&mut self, absent: bool) {
        self.absent = absent;
        self.surfaces = [Mark::Empty; 5];
    }

    pub fn apply_mark(&mut self, surface: Surface, mark: Mark) {
        self.absent = false;
        self.surfaces[surface.index()] = mark;
    }

    pub fn apply_extraction_to_all_surfaces(&mut self) {
        self.absent = false;
        self.surfaces = [Mark::Extraction; 5];
    }

    /// Extraction is cleared as a group: when every surface carries it, clearing any one
    /// surface clears all five.
    pub fn clear_surface_or_all(&mut self, surface: Surface) {
        if self.all_extracted() {
            self.surfaces = [Mark::Empty; 5];
        } else {
            self.surfaces[surface.index()] = Mark::Empty;
        }
    }

    pub fn clear_tooth(&mut self) {
        *self = Self::default();
    }

    /// Builds a state from persisted parts, dropping marks that would violate the absent
    /// invariant.
    pub(crate) fn from_parts(absent: bool, surfaces: [Mark; 5]) -> Self {
        if absent {
            return Self {
                absent,
                surfaces: [Mark::Empty; 5],
            };
        }
        Self { absent, surfaces }
    }
}

/// The editable chart of one patient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartSnapshot {
    patient_id: PatientId,
    observations: String,
    date: NaiveDate,
    teeth: BTreeMap<ToothId, ToothState>,
    updated_at: Option<DateTime<Utc>>,
    rev: u64,
}

impl ChartSnapshot {
    /// A chart with every permanent and deciduous tooth present and unmarked.
    pub fn empty(patient_id: PatientId, date: NaiveDate) -> Self {
        Self {
            patient_id,
            observations: String::new(),
            date,
            teeth: ToothId::all()
                .map(|tooth| (tooth, ToothState::default()))
                .collect(),
            updated_at: None,
            rev: 0,
        }
    }

    pub fn patient_id(&self) -> &PatientId {
        &self.patient_id
    }

    pub fn observations(&self) -> &str {
        &self.observations
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn teeth(&self) -> &BTreeMap<ToothId, ToothState> {
        &self.teeth
    }

    pub fn tooth(&self, tooth: ToothId) -> ToothState {
        self.teeth.get(&tooth).copied().unwrap_or_default()
    }

    pub(crate) fn tooth_mut(&mut self, tooth: ToothId) -> &mut ToothState {
        self.teeth.entry(tooth).or_default()
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    pub fn rev(&self) -> u64 {
        self.rev
    }

    pub fn is_blank(&self) -> bool {
        self.observations.is_empty() && self.teeth.values().all(ToothState::is_untouched)
    }

    /// Returns whether the value changed; bumps `rev` when it did.
    pub fn set_observations(&mut self, observations: impl Into<String>) -> bool {
        let observations = observations.into();
        if self.observations == observations {
            return false;
        }
        self.observations = observations;
        self.bump_rev();
        true
    }

    /// Returns whether the value changed; bumps `rev` when it did.
    pub fn set_date(&mut self, date: NaiveDate) -> bool {
        if self.date == date {
            return false;
        }
        self.date = date;
        self.bump_rev();
        true
    }

    pub fn set_updated_at(&mut self, updated_at: Option<DateTime<Utc>>) {
        self.updated_at = updated_at;
    }

    /// Rebuilds a persisted chart: every tooth starts untouched, then `teeth` is laid over it.
    pub(crate) fn restored(
        patient_id: PatientId,
        observations: String,
        date: NaiveDate,
        teeth: BTreeMap<ToothId, ToothState>,
    ) -> Self {
        let mut snapshot = Self::empty(patient_id, date);
        snapshot.observations = observations;
        snapshot.teeth.extend(teeth);
        snapshot
    }

    #[cfg(test)]
    pub(crate) fn replace_teeth(&mut self, teeth: BTreeMap<ToothId, ToothState>) {
        self.teeth = teeth;
    }

    pub(crate) fn bump_rev(&mut self) {
        self.rev = self.rev.wrapping_add(1);
    }

    /// Keeps the local revision counter when the content is swapped for a reloaded copy, so
    /// in-flight bookkeeping keyed by `rev` stays monotonic.
    pub(crate) fn with_rev(mut self, rev: u64) -> Self {
        self.rev = rev;
        self
    }
}
