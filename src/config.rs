// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Odontogram and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Editor tuning knobs, loadable from a TOML file. Every field has a default, so an empty file
//! (or no file) gives the stock behavior.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::selection::geometry::{MenuGeometry, Size};
use crate::sync::ReconcileRules;

/// Largest accepted value per duration field. Keeps every derived deadline representable.
const UPPER_BOUNDS: [(&str, u64); 5] = [
    ("autosave_period_secs", 86_400),
    ("double_click_window_ms", 10_000),
    ("local_cache_max_age_hours", 24 * 365),
    ("local_wins_min_lead_ms", 86_400_000),
    ("local_wins_max_age_ms", 86_400_000),
];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config {path:?}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid config {path:?}: {field} must be positive")]
    NotPositive { path: PathBuf, field: &'static str },
    #[error("invalid config {path:?}: {field} must be at most {max}")]
    OutOfRange {
        path: PathBuf,
        field: &'static str,
        max: u64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EditorConfig {
    pub autosave_period_secs: u64,
    pub local_cache_max_age_hours: u64,
    pub local_wins_min_lead_ms: u64,
    pub local_wins_max_age_ms: u64,
    pub double_click_window_ms: u64,
    pub menu_width: f32,
    pub menu_height: f32,
    pub viewport_width: f32,
    pub viewport_height: f32,
    pub menu_gap: f32,
    pub menu_margin: f32,
    /// Reload the chart from the remote store after each successful save.
    pub refresh_after_save: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        let rules = ReconcileRules::default();
        let menu = MenuGeometry::default();
        Self {
            autosave_period_secs: 30,
            local_cache_max_age_hours: rules.local_cache_max_age.num_hours().unsigned_abs(),
            local_wins_min_lead_ms: rules.local_wins_min_lead.num_milliseconds().unsigned_abs(),
            local_wins_max_age_ms: rules.local_wins_max_age.num_milliseconds().unsigned_abs(),
            double_click_window_ms: 400,
            menu_width: menu.menu.width,
            menu_height: menu.menu.height,
            viewport_width: menu.viewport.width,
            viewport_height: menu.viewport.height,
            menu_gap: menu.gap,
            menu_margin: menu.margin,
            refresh_after_save: true,
        }
    }
}

impl EditorConfig {
    pub fn from_toml_str(raw: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate(path)?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw, path)
    }

    /// Defaults when `path` is `None`.
    pub fn load_optional(path: Option<&Path>) -> Result<Self, ConfigError> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }

    fn validate(&self, path: &Path) -> Result<(), ConfigError> {
        let checks = [
            ("autosave_period_secs", self.autosave_period_secs > 0),
            ("double_click_window_ms", self.double_click_window_ms > 0),
            ("menu_width", self.menu_width > 0.0),
            ("menu_height", self.menu_height > 0.0),
            ("viewport_width", self.viewport_width > 0.0),
            ("viewport_height", self.viewport_height > 0.0),
        ];
        if let Some((field, _)) = checks.into_iter().find(|(_, ok)| !ok) {
            return Err(ConfigError::NotPositive {
                path: path.to_path_buf(),
                field,
            });
        }

        let values = [
            self.autosave_period_secs,
            self.double_click_window_ms,
            self.local_cache_max_age_hours,
            self.local_wins_min_lead_ms,
            self.local_wins_max_age_ms,
        ];
        let exceeded = UPPER_BOUNDS
            .into_iter()
            .zip(values)
            .find(|&((_, max), value)| value > max);
        match exceeded {
            Some(((field, max), _)) => Err(ConfigError::OutOfRange {
                path: path.to_path_buf(),
                field,
                max,
            }),
            None => Ok(()),
        }
    }

    pub fn autosave_period(&self) -> TimeDelta {
        secs(self.autosave_period_secs)
    }

    pub fn double_click_window(&self) -> TimeDelta {
        millis(self.double_click_window_ms)
    }

    pub fn reconcile_rules(&self) -> ReconcileRules {
        ReconcileRules {
            local_cache_max_age: secs(self.local_cache_max_age_hours.saturating_mul(3600)),
            local_wins_min_lead: millis(self.local_wins_min_lead_ms),
            local_wins_max_age: millis(self.local_wins_max_age_ms),
        }
    }

    pub fn menu_geometry(&self) -> MenuGeometry {
        MenuGeometry {
            menu: Size::new(self.menu_width, self.menu_height),
            viewport: Size::new(self.viewport_width, self.viewport_height),
            gap: self.menu_gap,
            margin: self.menu_margin,
        }
    }
}

fn secs(value: u64) -> TimeDelta {
    let value = i64::try_from(value).unwrap_or(i64::MAX);
    TimeDelta::try_seconds(value).unwrap_or(TimeDelta::MAX)
}

fn millis(value: u64) -> TimeDelta {
    let value = i64::try_from(value).unwrap_or(i64::MAX);
    TimeDelta::try_milliseconds(value).unwrap_or(TimeDelta::MAX)
}
