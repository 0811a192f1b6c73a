// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Odontogram and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Mutation operations for charts.
//!
//! Operations never fail: every [`ToothId`] is valid by construction. Applying an op produces a
//! minimal delta so callers can tell whether anything actually changed (and therefore whether
//! the local cache must be rewritten).

use std::collections::BTreeSet;

use crate::model::{ChartSnapshot, Mark, Surface, ToothId, ToothState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartOp {
    SetAbsent { tooth: ToothId, absent: bool },
    ApplyMark {
        tooth: ToothId,
        surface: Surface,
        mark: Mark,
    },
    ApplyExtraction { tooth: ToothId },
    ClearSurfaceOrAll { tooth: ToothId, surface: Surface },
    ClearTooth { tooth: ToothId },
}

impl ChartOp {
    pub fn tooth(&self) -> ToothId {
        match *self {
            Self::SetAbsent { tooth, .. }
            | Self::ApplyMark { tooth, .. }
            | Self::ApplyExtraction { tooth }
            | Self::ClearSurfaceOrAll { tooth, .. }
            | Self::ClearTooth { tooth } => tooth,
        }
    }

    fn apply_to(&self, state: &mut ToothState) {
        match *self {
            Self::SetAbsent { absent, .. } => state.set_absent(absent),
            Self::ApplyMark { surface, mark, .. } => state.apply_mark(surface, mark),
            Self::ApplyExtraction { .. } => state.apply_extraction_to_all_surfaces(),
            Self::ClearSurfaceOrAll { surface, .. } => state.clear_surface_or_all(surface),
            Self::ClearTooth { .. } => state.clear_tooth(),
        }
    }
}

/// Teeth whose state changed as the result of applying ops, ascending.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Delta {
    pub updated: Vec<ToothId>,
}

impl Delta {
    pub fn is_empty(&self) -> bool {
        self.updated.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyResult {
    pub new_rev: u64,
    pub applied: usize,
    pub delta: Delta,
}

pub fn apply_op(chart: &mut ChartSnapshot, op: &ChartOp) -> ApplyResult {
    apply_ops(chart, std::slice::from_ref(op))
}

/// Applies `ops` in order. The revision is bumped once if any tooth changed.
pub fn apply_ops(chart: &mut ChartSnapshot, ops: &[ChartOp]) -> ApplyResult {
    let mut updated = BTreeSet::new();

    for op in ops {
        let state = chart.tooth_mut(op.tooth());
        let before = *state;
        op.apply_to(state);
        if *state != before {
            updated.insert(op.tooth());
        }
    }

    if !updated.is_empty() {
        chart.bump_rev();
    }

    ApplyResult {
        new_rev: chart.rev(),
        applied: ops.len(),
        delta: Delta {
            updated: updated.into_iter().collect(),
        },
    }
}

#[cfg(test)]
mod tests;
