// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Odontogram and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use rstest::rstest;

use crate::model::fixtures::{charted, empty_chart, tooth};
use crate::model::{Mark, Mode, Surface, Symbol, ToothId};

use super::{apply_op, apply_ops, ChartOp};

fn filling() -> Mark {
    Mark::treatment(Mode::Required, Symbol::Filling)
}

fn set_absent(tooth: ToothId, absent: bool) -> ChartOp {
    ChartOp::SetAbsent { tooth, absent }
}

fn mark(tooth: ToothId, surface: Surface, mark: Mark) -> ChartOp {
    ChartOp::ApplyMark {
        tooth,
        surface,
        mark,
    }
}

fn clear(tooth: ToothId, surface: Surface) -> ChartOp {
    ChartOp::ClearSurfaceOrAll { tooth, surface }
}

#[test]
fn set_absent_clears_every_surface_for_every_tooth() {
    let mut chart = charted("p1");
    for tooth in ToothId::all() {
        apply_op(&mut chart, &set_absent(tooth, true));
        let state = chart.tooth(tooth);
        assert!(state.absent());
        for surface in Surface::ALL {
            assert_eq!(state.surface(surface), Mark::Empty, "{tooth}/{surface}");
        }
    }
}

#[test]
fn set_absent_false_still_resets_surfaces() {
    let mut chart = charted("p1");
    let t11 = tooth(11);
    apply_op(&mut chart, &set_absent(t11, false));
    assert!(chart.tooth(t11).is_untouched());
}

#[test]
fn apply_mark_unmarks_absent_tooth() {
    let mut chart = empty_chart("p1");
    let t21 = tooth(21);
    apply_op(&mut chart, &set_absent(t21, true));
    apply_op(&mut chart, &mark(t21, Surface::Left, filling()));

    let state = chart.tooth(t21);
    assert!(!state.absent());
    assert_eq!(state.surface(Surface::Left), filling());
}

#[rstest]
fn mark_then_clear_only_touches_target_surface(
    #[values(Surface::Right, Surface::Left, Surface::Top, Surface::Bottom, Surface::Center)]
    surface: Surface,
) {
    let mut chart = empty_chart("p1");
    let t36 = tooth(36);
    let crown = Mark::treatment(Mode::Anterior, Symbol::Crown);
    for other in Surface::ALL {
        apply_op(&mut chart, &mark(t36, other, crown));
    }
    apply_op(&mut chart, &mark(t36, surface, filling()));
    let before = chart.tooth(t36);

    apply_op(&mut chart, &clear(t36, surface));

    let after = chart.tooth(t36);
    assert_eq!(after.surface(surface), Mark::Empty);
    for other in Surface::ALL.into_iter().filter(|s| *s != surface) {
        assert_eq!(after.surface(other), before.surface(other));
    }
}

#[rstest]
fn clearing_any_surface_of_fully_extracted_tooth_clears_all(
    #[values(Surface::Right, Surface::Left, Surface::Top, Surface::Bottom, Surface::Center)]
    surface: Surface,
) {
    let mut chart = empty_chart("p1");
    let t48 = tooth(48);
    apply_op(&mut chart, &ChartOp::ApplyExtraction { tooth: t48 });
    assert!(chart.tooth(t48).all_extracted());

    apply_op(&mut chart, &clear(t48, surface));
    assert!(chart.tooth(t48).is_untouched());
}

#[test]
fn partial_extraction_clears_individually() {
    let mut chart = empty_chart("p1");
    let t48 = tooth(48);
    apply_op(&mut chart, &ChartOp::ApplyExtraction { tooth: t48 });
    apply_op(&mut chart, &mark(t48, Surface::Top, filling()));

    apply_op(&mut chart, &clear(t48, Surface::Left));

    let state = chart.tooth(t48);
    assert_eq!(state.surface(Surface::Left), Mark::Empty);
    assert_eq!(state.surface(Surface::Right), Mark::Extraction);
    assert_eq!(state.surface(Surface::Top), filling());
}

#[test]
fn clear_tooth_is_idempotent() {
    let mut chart = charted("p1");
    let t16 = tooth(16);
    apply_op(&mut chart, &ChartOp::ClearTooth { tooth: t16 });
    let once = chart.clone();

    let result = apply_op(&mut chart, &ChartOp::ClearTooth { tooth: t16 });
    assert!(result.delta.is_empty());
    assert_eq!(chart, once);
}

#[test]
fn apply_ops_bumps_rev_once_and_reports_changed_teeth() {
    let mut chart = empty_chart("p1");
    let ops = [
        ChartOp::ApplyExtraction { tooth: tooth(18) },
        mark(tooth(11), Surface::Top, filling()),
        ChartOp::ClearTooth { tooth: tooth(22) },
    ];

    let result = apply_ops(&mut chart, &ops);
    assert_eq!(result.new_rev, 1);
    assert_eq!(result.applied, 3);
    assert_eq!(result.delta.updated, vec![tooth(11), tooth(18)]);
}

#[test]
fn noop_ops_leave_rev_alone() {
    let mut chart = empty_chart("p1");
    let result = apply_op(&mut chart, &ChartOp::ClearTooth { tooth: tooth(31) });
    assert_eq!(result.new_rev, 0);
    assert!(result.delta.is_empty());
}
