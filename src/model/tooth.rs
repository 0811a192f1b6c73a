// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Odontogram and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::str::FromStr;

/// FDI two-digit tooth code.
///
/// Permanent teeth use quadrants 1-4 with positions 1-8, deciduous teeth use quadrants 5-8
/// with positions 1-5. Any other code is rejected on construction, so every `ToothId` in
/// circulation names a real tooth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ToothId(u8);

impl ToothId {
    pub fn new(code: u8) -> Result<Self, InvalidToothId> {
        let quadrant = code / 10;
        let position = code % 10;
        let max_position = match quadrant {
            1..=4 => 8,
            5..=8 => 5,
            _ => return Err(InvalidToothId(code.to_string())),
        };
        if position == 0 || position > max_position {
            return Err(InvalidToothId(code.to_string()));
        }
        Ok(Self(code))
    }

    pub fn code(self) -> u8 {
        self.0
    }

    pub fn quadrant(self) -> u8 {
        self.0 / 10
    }

    pub fn position(self) -> u8 {
        self.0 % 10
    }

    pub fn is_deciduous(self) -> bool {
        self.quadrant() >= 5
    }

    /// All 52 valid codes in ascending order.
    pub fn all() -> impl Iterator<Item = ToothId> {
        (1u8..=8).flat_map(|quadrant| {
            let max_position = if quadrant <= 4 { 8 } else { 5 };
            (1..=max_position).map(move |position| ToothId(quadrant * 10 + position))
        })
    }
}

impl fmt::Display for ToothId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ToothId {
    type Err = InvalidToothId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code: u8 = s.trim().parse().map_err(|_| InvalidToothId(s.to_owned()))?;
        Self::new(code)
    }
}

impl TryFrom<u8> for ToothId {
    type Error = InvalidToothId;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::new(code)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid tooth code: {0:?}")]
pub struct InvalidToothId(pub String);

/// One of the five zones of a tooth glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Surface {
    Right,
    Left,
    Top,
    Bottom,
    Center,
}

impl Surface {
    pub const ALL: [Surface; 5] = [
        Surface::Right,
        Surface::Left,
        Surface::Top,
        Surface::Bottom,
        Surface::Center,
    ];

    pub fn index(self) -> usize {
        match self {
            Self::Right => 0,
            Self::Left => 1,
            Self::Top => 2,
            Self::Bottom => 3,
            Self::Center => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Right => "right",
            Self::Left => "left",
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::Center => "center",
        }
    }
}

impl fmt::Display for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid surface: {0:?}")]
pub struct ParseSurfaceError(pub String);

impl FromStr for Surface {
    type Err = ParseSurfaceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "right" => Ok(Self::Right),
            "left" => Ok(Self::Left),
            "top" => Ok(Self::Top),
            "bottom" => Ok(Self::Bottom),
            "center" => Ok(Self::Center),
            _ => Err(ParseSurfaceError(s.to_owned())),
        }
    }
}
