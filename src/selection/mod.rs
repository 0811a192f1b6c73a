// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Odontogram and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Treatment selection state machine.
//!
//! Turns a sequence of picks (tooth, surface, symbol, optional color) into at most one
//! [`ChartOp`]. The machine only reads the chart; applying the op is the caller's job.

pub mod geometry;

use chrono::{DateTime, TimeDelta, Utc};
use tracing::debug;

use crate::model::{ChartSnapshot, Mark, Mode, Surface, Symbol, ToothId};
use crate::ops::ChartOp;

pub use geometry::{
    place_menu, ClickTracker, MenuGeometry, Point, Rect, Size, ToothHit, ToothLayout,
};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Selection {
    #[default]
    Idle,
    MenuOpen {
        tooth: ToothId,
        surface: Option<Surface>,
        placement: Point,
    },
    /// A symbol that needs a color was picked; only the two colors and cancel are offered.
    AwaitingColor {
        tooth: ToothId,
        surface: Surface,
        symbol: Symbol,
        placement: Point,
    },
}

impl Selection {
    pub fn is_open(&self) -> bool {
        !matches!(self, Self::Idle)
    }

    pub fn tooth(&self) -> Option<ToothId> {
        match *self {
            Self::Idle => None,
            Self::MenuOpen { tooth, .. } | Self::AwaitingColor { tooth, .. } => Some(tooth),
        }
    }

    pub fn placement(&self) -> Option<Point> {
        match *self {
            Self::Idle => None,
            Self::MenuOpen { placement, .. } | Self::AwaitingColor { placement, .. } => {
                Some(placement)
            }
        }
    }

    /// Actions the menu currently offers, in display order.
    pub fn offered_actions(&self) -> Vec<MenuAction> {
        match self {
            Self::Idle => Vec::new(),
            Self::AwaitingColor { .. } => vec![
                MenuAction::Color(Mode::Anterior),
                MenuAction::Color(Mode::Required),
                MenuAction::Cancel,
            ],
            Self::MenuOpen { surface, .. } => {
                let mut actions = vec![MenuAction::Absent, MenuAction::Extraction];
                if surface.is_some() {
                    actions.extend(Symbol::ALL.into_iter().map(MenuAction::Symbol));
                }
                actions.push(MenuAction::Clear);
                actions.push(MenuAction::Cancel);
                actions
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Absent,
    Extraction,
    Symbol(Symbol),
    Color(Mode),
    Cancel,
    Clear,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SelectionEvent {
    SurfaceClicked {
        tooth: ToothId,
        surface: Surface,
        anchor: Rect,
    },
    ToothBodyClicked {
        tooth: ToothId,
        anchor: Rect,
        at: DateTime<Utc>,
    },
    SurfaceDoubleClicked { tooth: ToothId, surface: Surface },
    Choose(MenuAction),
    /// A click that hit neither a tooth element nor the menu.
    OutsideClick,
}

/// Owns the current [`Selection`] plus the inputs needed to place the menu and detect double
/// activation.
#[derive(Debug, Clone)]
pub struct SelectionMachine {
    state: Selection,
    menu: MenuGeometry,
    clicks: ClickTracker,
}

impl SelectionMachine {
    pub fn new(menu: MenuGeometry, double_click_window: TimeDelta) -> Self {
        Self {
            state: Selection::Idle,
            menu,
            clicks: ClickTracker::new(double_click_window),
        }
    }

    pub fn state(&self) -> &Selection {
        &self.state
    }

    pub fn set_viewport(&mut self, viewport: Size) {
        self.menu.viewport = viewport;
    }

    /// Feeds one interaction event; returns the chart mutation it completes, if any.
    pub fn handle(&mut self, event: SelectionEvent, chart: &ChartSnapshot) -> Option<ChartOp> {
        let before = self.state;
        let op = self.transition(event, chart);
        if before != self.state || op.is_some() {
            debug!(?event, from = ?before, to = ?self.state, ?op, "selection transition");
        }
        op
    }

    fn transition(&mut self, event: SelectionEvent, chart: &ChartSnapshot) -> Option<ChartOp> {
        match event {
            SelectionEvent::SurfaceDoubleClicked { tooth, surface } => {
                Some(ChartOp::ClearSurfaceOrAll { tooth, surface })
            }
            SelectionEvent::SurfaceClicked {
                tooth,
                surface,
                anchor,
            } => {
                if matches!(self.state, Selection::AwaitingColor { .. }) {
                    return None;
                }
                self.clicks.reset();
                self.state = Selection::MenuOpen {
                    tooth,
                    surface: Some(surface),
                    placement: place_menu(anchor, &self.menu),
                };
                None
            }
            SelectionEvent::ToothBodyClicked { tooth, anchor, at } => {
                if matches!(self.state, Selection::AwaitingColor { .. }) {
                    return None;
                }
                if self.clicks.register(tooth, at) {
                    self.state = Selection::Idle;
                    let absent = !chart.tooth(tooth).absent();
                    return Some(ChartOp::SetAbsent { tooth, absent });
                }
                self.state = Selection::MenuOpen {
                    tooth,
                    surface: None,
                    placement: place_menu(anchor, &self.menu),
                };
                None
            }
            SelectionEvent::OutsideClick => {
                if matches!(self.state, Selection::MenuOpen { .. }) {
                    self.clicks.reset();
                    self.state = Selection::Idle;
                }
                None
            }
            SelectionEvent::Choose(action) => self.choose(action),
        }
    }

    fn choose(&mut self, action: MenuAction) -> Option<ChartOp> {
        match (self.state, action) {
            (Selection::Idle, _) => None,

            (Selection::MenuOpen { tooth, .. }, MenuAction::Absent) => {
                self.state = Selection::Idle;
                Some(ChartOp::SetAbsent {
                    tooth,
                    absent: true,
                })
            }
            (Selection::MenuOpen { tooth, .. }, MenuAction::Extraction) => {
                self.state = Selection::Idle;
                Some(ChartOp::ApplyExtraction { tooth })
            }
            (
                Selection::MenuOpen {
                    tooth,
                    surface: Some(surface),
                    placement,
                },
                MenuAction::Symbol(symbol),
            ) => {
                if symbol.requires_color() {
                    self.state = Selection::AwaitingColor {
                        tooth,
                        surface,
                        symbol,
                        placement,
                    };
                    return None;
                }
                self.state = Selection::Idle;
                let mark = Mark::Treatment { mode: None, symbol };
                Some(ChartOp::ApplyMark {
                    tooth,
                    surface,
                    mark,
                })
            }
            // Symbols need a surface; a tooth-level menu keeps waiting.
            (Selection::MenuOpen { surface: None, .. }, MenuAction::Symbol(_)) => None,
            // Nothing is pending a color here. Kept as an explicit no-op with the menu left
            // open; no default symbol is applied.
            (Selection::MenuOpen { .. }, MenuAction::Color(_)) => None,
            (Selection::MenuOpen { tooth, surface, .. }, MenuAction::Clear) => {
                self.state = Selection::Idle;
                Some(match surface {
                    Some(surface) => ChartOp::ClearSurfaceOrAll { tooth, surface },
                    None => ChartOp::ClearTooth { tooth },
                })
            }
            (Selection::MenuOpen { .. }, MenuAction::Cancel) => {
                self.state = Selection::Idle;
                None
            }

            (
                Selection::AwaitingColor {
                    tooth,
                    surface,
                    symbol,
                    ..
                },
                MenuAction::Color(mode),
            ) => {
                self.state = Selection::Idle;
                Some(ChartOp::ApplyMark {
                    tooth,
                    surface,
                    mark: Mark::treatment(mode, symbol),
                })
            }
            (
                Selection::AwaitingColor {
                    tooth,
                    surface,
                    placement,
                    ..
                },
                MenuAction::Cancel,
            ) => {
                self.state = Selection::MenuOpen {
                    tooth,
                    surface: Some(surface),
                    placement,
                };
                None
            }
            (Selection::AwaitingColor { tooth, surface, .. }, MenuAction::Clear) => {
                self.state = Selection::Idle;
                Some(ChartOp::ClearSurfaceOrAll { tooth, surface })
            }
            // Only the colors, cancel and clear are live while a color is pending.
            (Selection::AwaitingColor { .. }, _) => None,
        }
    }
}

impl Default for SelectionMachine {
    fn default() -> Self {
        Self::new(MenuGeometry::default(), TimeDelta::milliseconds(400))
    }
}

#[cfg(test)]
mod tests;
