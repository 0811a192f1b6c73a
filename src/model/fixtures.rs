// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Odontogram and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

#![cfg(test)]

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use super::chart::ChartSnapshot;
use super::ids::PatientId;
use super::mark::{Mark, Mode, Symbol};
use super::tooth::{Surface, ToothId};

pub(crate) fn patient(value: &str) -> PatientId {
    PatientId::new(value).expect("patient id")
}

pub(crate) fn tooth(code: u8) -> ToothId {
    ToothId::new(code).expect("tooth id")
}

pub(crate) fn chart_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 14).expect("chart date")
}

/// 2026-03-14T09:00:00Z, the reference instant most timing tests are expressed against.
pub(crate) fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0)
        .single()
        .expect("t0")
}

pub(crate) fn empty_chart(patient_id: &str) -> ChartSnapshot {
    ChartSnapshot::empty(patient(patient_id), chart_date())
}

/// A chart with a handful of marks spread over both dentitions.
pub(crate) fn charted(patient_id: &str) -> ChartSnapshot {
    let mut chart = empty_chart(patient_id);
    chart.tooth_mut(tooth(11)).apply_mark(
        Surface::Top,
        Mark::treatment(Mode::Required, Symbol::Filling),
    );
    chart.tooth_mut(tooth(16)).apply_mark(
        Surface::Center,
        Mark::treatment(Mode::Anterior, Symbol::RootCanal),
    );
    chart
        .tooth_mut(tooth(38))
        .apply_extraction_to_all_surfaces();
    chart.tooth_mut(tooth(46)).set_absent(true);
    chart.tooth_mut(tooth(54)).apply_mark(
        Surface::Left,
        Mark::Treatment {
            mode: None,
            symbol: Symbol::ExistingPiece,
        },
    );
    chart.set_observations("bruxism, night guard advised");
    chart
}
