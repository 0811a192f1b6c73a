// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Odontogram and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Chart date formats.
//!
//! The editor shows `DD/MM/YYYY`, the remote store takes `YYYY-MM-DD`. Parsing is lenient and
//! never fails: anything unreadable becomes the caller's `today`.

use chrono::{DateTime, NaiveDate};
use tracing::warn;

pub const DISPLAY_FORMAT: &str = "%d/%m/%Y";
pub const WIRE_FORMAT: &str = "%Y-%m-%d";

pub fn format_display(date: NaiveDate) -> String {
    date.format(DISPLAY_FORMAT).to_string()
}

pub fn format_wire(date: NaiveDate) -> String {
    date.format(WIRE_FORMAT).to_string()
}

/// Parses an editor date: a `d/m/y` triplet first, then the generic forms, then `today`.
pub fn parse_display_date(raw: &str, today: NaiveDate) -> NaiveDate {
    let raw = raw.trim();
    if let Some(date) = parse_slash_triplet(raw).or_else(|| parse_generic(raw)) {
        return date;
    }
    warn!(raw, %today, "unreadable chart date, using today");
    today
}

/// Parses the remote `fecha` field; a missing value silently becomes `today`.
pub fn parse_wire_date(raw: Option<&str>, today: NaiveDate) -> NaiveDate {
    let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return today;
    };
    if let Some(date) = parse_generic(raw).or_else(|| parse_slash_triplet(raw)) {
        return date;
    }
    warn!(raw, %today, "unreadable remote chart date, using today");
    today
}

fn parse_slash_triplet(raw: &str) -> Option<NaiveDate> {
    let mut parts = raw.split('/');
    let (day, month, year) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }
    let day: u32 = day.trim().parse().ok()?;
    let month: u32 = month.trim().parse().ok()?;
    let year: i32 = year.trim().parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn parse_generic(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, WIRE_FORMAT)
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.date_naive())
        })
        .or_else(|| NaiveDate::parse_from_str(raw, "%Y/%m/%d").ok())
        .or_else(|| {
            raw.get(..10)
                .and_then(|head| NaiveDate::parse_from_str(head, WIRE_FORMAT).ok())
        })
}
