// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Odontogram and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use chrono::{DateTime, TimeDelta, Utc};
use rstest::{fixture, rstest};

use crate::model::fixtures::{empty_chart, t0, tooth};
use crate::model::{ChartSnapshot, Mark, Mode, Surface, Symbol};
use crate::ops::{apply_op, ChartOp};

use super::{MenuAction, MenuGeometry, Rect, Selection, SelectionEvent, SelectionMachine};

struct Ctx {
    machine: SelectionMachine,
    chart: ChartSnapshot,
}

impl Ctx {
    fn send(&mut self, event: SelectionEvent) -> Option<ChartOp> {
        let op = self.machine.handle(event, &self.chart);
        if let Some(op) = op {
            apply_op(&mut self.chart, &op);
        }
        op
    }

    fn click_surface(&mut self, code: u8, surface: Surface) -> Option<ChartOp> {
        self.send(SelectionEvent::SurfaceClicked {
            tooth: tooth(code),
            surface,
            anchor: anchor(),
        })
    }

    fn click_body(&mut self, code: u8, at: DateTime<Utc>) -> Option<ChartOp> {
        self.send(SelectionEvent::ToothBodyClicked {
            tooth: tooth(code),
            anchor: anchor(),
            at,
        })
    }

    fn double_click(&mut self, code: u8, surface: Surface) -> Option<ChartOp> {
        self.send(SelectionEvent::SurfaceDoubleClicked {
            tooth: tooth(code),
            surface,
        })
    }

    fn choose(&mut self, action: MenuAction) -> Option<ChartOp> {
        self.send(SelectionEvent::Choose(action))
    }
}

fn anchor() -> Rect {
    Rect::new(100.0, 100.0, 32.0, 32.0)
}

#[fixture]
fn ctx() -> Ctx {
    Ctx {
        machine: SelectionMachine::new(MenuGeometry::default(), TimeDelta::milliseconds(400)),
        chart: empty_chart("p1"),
    }
}

fn assert_menu_open(state: &Selection, code: u8, surface: Option<Surface>) {
    match state {
        Selection::MenuOpen {
            tooth: t,
            surface: s,
            ..
        } => {
            assert_eq!(*t, tooth(code));
            assert_eq!(*s, surface);
        }
        other => panic!("expected MenuOpen, got {other:?}"),
    }
}

#[rstest]
fn surface_click_opens_menu_near_anchor(mut ctx: Ctx) {
    assert_eq!(ctx.click_surface(11, Surface::Top), None);
    assert_menu_open(ctx.machine.state(), 11, Some(Surface::Top));
    let placement = ctx.machine.state().placement().expect("placement");
    assert_eq!(placement.x, 100.0);
    assert!(placement.y > 132.0);
}

#[rstest]
fn colored_symbol_waits_for_color_then_applies(mut ctx: Ctx) {
    ctx.click_surface(11, Surface::Top);
    assert_eq!(ctx.choose(MenuAction::Symbol(Symbol::Filling)), None);
    assert!(matches!(
        ctx.machine.state(),
        Selection::AwaitingColor {
            symbol: Symbol::Filling,
            surface: Surface::Top,
            ..
        }
    ));
    assert_eq!(
        ctx.machine.state().offered_actions(),
        vec![
            MenuAction::Color(Mode::Anterior),
            MenuAction::Color(Mode::Required),
            MenuAction::Cancel
        ]
    );

    let op = ctx.choose(MenuAction::Color(Mode::Required));
    assert_eq!(
        op,
        Some(ChartOp::ApplyMark {
            tooth: tooth(11),
            surface: Surface::Top,
            mark: Mark::treatment(Mode::Required, Symbol::Filling),
        })
    );
    assert_eq!(*ctx.machine.state(), Selection::Idle);
    assert_eq!(
        ctx.chart.tooth(tooth(11)).surface(Surface::Top),
        Mark::treatment(Mode::Required, Symbol::Filling)
    );
}

#[rstest]
fn existing_piece_applies_immediately_without_mode(mut ctx: Ctx) {
    ctx.click_surface(24, Surface::Center);
    let op = ctx.choose(MenuAction::Symbol(Symbol::ExistingPiece));
    assert_eq!(
        op,
        Some(ChartOp::ApplyMark {
            tooth: tooth(24),
            surface: Surface::Center,
            mark: Mark::Treatment {
                mode: None,
                symbol: Symbol::ExistingPiece,
            },
        })
    );
    assert_eq!(*ctx.machine.state(), Selection::Idle);
}

#[rstest]
fn every_colored_symbol_enters_awaiting_color(
    mut ctx: Ctx,
    #[values(
        Symbol::Caries,
        Symbol::Filling,
        Symbol::RootCanal,
        Symbol::Periodontal,
        Symbol::Crown,
        Symbol::PostAndCore,
        Symbol::FixedProsthesis,
        Symbol::RemovableProsthesis
    )]
    symbol: Symbol,
) {
    ctx.click_surface(31, Surface::Left);
    assert_eq!(ctx.choose(MenuAction::Symbol(symbol)), None);
    assert!(matches!(
        ctx.machine.state(),
        Selection::AwaitingColor { .. }
    ));
}

#[rstest]
fn absent_and_extraction_close_the_menu(mut ctx: Ctx) {
    ctx.click_surface(17, Surface::Right);
    assert_eq!(
        ctx.choose(MenuAction::Absent),
        Some(ChartOp::SetAbsent {
            tooth: tooth(17),
            absent: true,
        })
    );
    assert_eq!(*ctx.machine.state(), Selection::Idle);
    assert!(ctx.chart.tooth(tooth(17)).absent());

    ctx.click_surface(17, Surface::Right);
    assert_eq!(
        ctx.choose(MenuAction::Extraction),
        Some(ChartOp::ApplyExtraction { tooth: tooth(17) })
    );
    assert!(ctx.chart.tooth(tooth(17)).all_extracted());
    assert!(!ctx.chart.tooth(tooth(17)).absent());
}

#[rstest]
fn cancel_from_awaiting_color_returns_to_menu(mut ctx: Ctx) {
    ctx.click_surface(11, Surface::Bottom);
    ctx.choose(MenuAction::Symbol(Symbol::Caries));
    assert_eq!(ctx.choose(MenuAction::Cancel), None);
    assert_menu_open(ctx.machine.state(), 11, Some(Surface::Bottom));

    assert_eq!(ctx.choose(MenuAction::Cancel), None);
    assert_eq!(*ctx.machine.state(), Selection::Idle);
    assert!(ctx.chart.is_blank());
}

#[rstest]
fn outside_click_dismisses_open_menu(mut ctx: Ctx) {
    ctx.click_surface(11, Surface::Bottom);
    ctx.send(SelectionEvent::OutsideClick);
    assert_eq!(*ctx.machine.state(), Selection::Idle);
}

#[rstest]
fn outside_click_does_not_dismiss_pending_color(mut ctx: Ctx) {
    ctx.click_surface(11, Surface::Bottom);
    ctx.choose(MenuAction::Symbol(Symbol::Crown));
    let pending = *ctx.machine.state();

    ctx.send(SelectionEvent::OutsideClick);
    ctx.click_surface(22, Surface::Top);
    assert_eq!(*ctx.machine.state(), pending);

    ctx.choose(MenuAction::Color(Mode::Anterior));
    assert_eq!(
        ctx.chart.tooth(tooth(11)).surface(Surface::Bottom),
        Mark::treatment(Mode::Anterior, Symbol::Crown)
    );
}

#[rstest]
fn color_without_pending_symbol_is_a_noop(mut ctx: Ctx) {
    ctx.click_surface(11, Surface::Top);
    let before = *ctx.machine.state();
    assert_eq!(ctx.choose(MenuAction::Color(Mode::Required)), None);
    assert_eq!(*ctx.machine.state(), before);
    assert!(ctx.chart.is_blank());
}

#[rstest]
fn clear_targets_surface_or_whole_tooth(mut ctx: Ctx) {
    ctx.click_surface(26, Surface::Top);
    ctx.choose(MenuAction::Symbol(Symbol::Caries));
    ctx.choose(MenuAction::Color(Mode::Required));
    ctx.click_surface(26, Surface::Left);
    ctx.choose(MenuAction::Symbol(Symbol::Caries));
    ctx.choose(MenuAction::Color(Mode::Required));

    ctx.click_surface(26, Surface::Top);
    assert_eq!(
        ctx.choose(MenuAction::Clear),
        Some(ChartOp::ClearSurfaceOrAll {
            tooth: tooth(26),
            surface: Surface::Top,
        })
    );
    let t26 = ctx.chart.tooth(tooth(26));
    assert_eq!(t26.surface(Surface::Top), Mark::Empty);
    assert!(!t26.surface(Surface::Left).is_empty());

    ctx.click_body(26, t0());
    assert_menu_open(ctx.machine.state(), 26, None);
    assert_eq!(
        ctx.choose(MenuAction::Clear),
        Some(ChartOp::ClearTooth { tooth: tooth(26) })
    );
    assert!(ctx.chart.tooth(tooth(26)).is_untouched());
}

#[rstest]
fn tooth_level_menu_ignores_symbols(mut ctx: Ctx) {
    ctx.click_body(13, t0());
    assert_eq!(ctx.choose(MenuAction::Symbol(Symbol::Caries)), None);
    assert_menu_open(ctx.machine.state(), 13, None);
    let offered = ctx.machine.state().offered_actions();
    assert!(!offered.contains(&MenuAction::Symbol(Symbol::Caries)));
}

#[rstest]
fn double_activation_on_body_toggles_absent(mut ctx: Ctx) {
    assert_eq!(ctx.click_body(45, t0()), None);
    assert_eq!(
        ctx.click_body(45, t0() + TimeDelta::milliseconds(200)),
        Some(ChartOp::SetAbsent {
            tooth: tooth(45),
            absent: true,
        })
    );
    assert_eq!(*ctx.machine.state(), Selection::Idle);

    ctx.click_body(45, t0() + TimeDelta::seconds(5));
    assert_eq!(
        ctx.click_body(45, t0() + TimeDelta::milliseconds(5_100)),
        Some(ChartOp::SetAbsent {
            tooth: tooth(45),
            absent: false,
        })
    );
    assert!(!ctx.chart.tooth(tooth(45)).absent());
}

#[rstest]
fn slow_body_clicks_do_not_toggle(mut ctx: Ctx) {
    ctx.click_body(45, t0());
    assert_eq!(ctx.click_body(45, t0() + TimeDelta::seconds(2)), None);
    assert!(!ctx.chart.tooth(tooth(45)).absent());
}

#[rstest]
fn outside_click_between_body_clicks_starts_over(mut ctx: Ctx) {
    ctx.click_body(21, t0());
    ctx.send(SelectionEvent::OutsideClick);
    assert_eq!(*ctx.machine.state(), Selection::Idle);

    let second = ctx.click_body(21, t0() + TimeDelta::milliseconds(200));
    assert_eq!(second, None);
    assert_menu_open(ctx.machine.state(), 21, None);
    assert!(!ctx.chart.tooth(tooth(21)).absent());
}

#[rstest]
fn surface_double_click_clears_extraction_group(mut ctx: Ctx) {
    ctx.click_surface(38, Surface::Top);
    ctx.choose(MenuAction::Extraction);
    assert!(ctx.chart.tooth(tooth(38)).all_extracted());

    let op = ctx.double_click(38, Surface::Center);
    assert_eq!(
        op,
        Some(ChartOp::ClearSurfaceOrAll {
            tooth: tooth(38),
            surface: Surface::Center,
        })
    );
    assert!(ctx.chart.tooth(tooth(38)).is_untouched());
}

#[rstest]
fn surface_double_click_leaves_selection_state(mut ctx: Ctx) {
    ctx.click_surface(11, Surface::Top);
    ctx.choose(MenuAction::Symbol(Symbol::Caries));
    let pending = *ctx.machine.state();

    ctx.double_click(12, Surface::Top);
    assert_eq!(*ctx.machine.state(), pending);
}

#[rstest]
fn choose_while_idle_does_nothing(mut ctx: Ctx) {
    for action in [
        MenuAction::Absent,
        MenuAction::Extraction,
        MenuAction::Clear,
        MenuAction::Cancel,
    ] {
        assert_eq!(ctx.choose(action), None);
    }
    assert!(ctx.chart.is_blank());
}
