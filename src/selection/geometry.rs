// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Odontogram and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Geometry that decides which surface a pointer targets and where the menu opens.
//!
//! Coordinates are logical pixels with the origin at the top-left of the viewport.

use chrono::{DateTime, TimeDelta, Utc};

use crate::model::{Surface, ToothId};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.right()
            && point.y >= self.y
            && point.y <= self.bottom()
    }
}

/// Menu placement inputs that do not change between clicks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MenuGeometry {
    pub menu: Size,
    pub viewport: Size,
    pub gap: f32,
    pub margin: f32,
}

impl Default for MenuGeometry {
    fn default() -> Self {
        Self {
            menu: Size::new(220.0, 320.0),
            viewport: Size::new(1280.0, 800.0),
            gap: 4.0,
            margin: 8.0,
        }
    }
}

/// Opens the menu below the anchor, flips it above when it would overflow the bottom edge,
/// then clamps it into the viewport.
pub fn place_menu(anchor: Rect, geometry: &MenuGeometry) -> Point {
    let MenuGeometry {
        menu,
        viewport,
        gap,
        margin,
    } = *geometry;

    let mut x = anchor.x;
    let mut y = anchor.bottom() + gap;
    if y + menu.height > viewport.height - margin {
        y = anchor.y - gap - menu.height;
    }

    let max_x = (viewport.width - menu.width - margin).max(margin);
    let max_y = (viewport.height - menu.height - margin).max(margin);
    x = x.clamp(margin, max_x);
    y = y.clamp(margin, max_y);
    Point::new(x, y)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToothHit {
    Surface(Surface),
    Body,
}

/// Screen layout of one tooth: the five-zone glyph plus the clickable body (number label and
/// crown outline) around it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToothLayout {
    pub tooth: ToothId,
    pub glyph: Rect,
    pub body: Rect,
}

impl ToothLayout {
    pub fn hit_test(&self, point: Point) -> Option<ToothHit> {
        if self.glyph.contains(point) {
            return Some(ToothHit::Surface(surface_at(self.glyph, point)));
        }
        if self.body.contains(point) {
            return Some(ToothHit::Body);
        }
        None
    }
}

/// Classic five-zone glyph: the inner half-size square is `center`, the rest is split along
/// the diagonals.
fn surface_at(glyph: Rect, point: Point) -> Surface {
    let center = glyph.center();
    let dx = (point.x - center.x) / (glyph.width / 2.0).max(f32::EPSILON);
    let dy = (point.y - center.y) / (glyph.height / 2.0).max(f32::EPSILON);

    if dx.abs() <= 0.5 && dy.abs() <= 0.5 {
        return Surface::Center;
    }
    if dx.abs() >= dy.abs() {
        if dx >= 0.0 {
            Surface::Right
        } else {
            Surface::Left
        }
    } else if dy >= 0.0 {
        Surface::Bottom
    } else {
        Surface::Top
    }
}

/// Detects the second activation of the same tooth body within a time window.
#[derive(Debug, Clone)]
pub struct ClickTracker {
    window: TimeDelta,
    last: Option<(ToothId, DateTime<Utc>)>,
}

impl ClickTracker {
    pub fn new(window: TimeDelta) -> Self {
        Self { window, last: None }
    }

    /// Records a click and reports whether it completes a double activation. A completed
    /// double activation resets the tracker so a third click starts over.
    pub fn register(&mut self, tooth: ToothId, at: DateTime<Utc>) -> bool {
        let is_double = self.last.is_some_and(|(last_tooth, last_at)| {
            last_tooth == tooth && at >= last_at && at - last_at <= self.window
        });
        self.last = if is_double { None } else { Some((tooth, at)) };
        is_double
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}
