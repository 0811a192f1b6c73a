// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Odontogram and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::str::FromStr;

/// Wire token for an extraction mark.
pub const EXTRACTION_TOKEN: &str = "EXTRACCION";

const MODE_SEPARATOR: char = ':';

/// Whether a treatment mark records past work or planned work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Anterior,
    Required,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Anterior => "ANTERIOR",
            Self::Required => "REQUERIDO",
        }
    }
}

impl FromStr for Mode {
    type Err = ParseMarkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ANTERIOR" => Ok(Self::Anterior),
            "REQUERIDO" => Ok(Self::Required),
            _ => Err(ParseMarkError::UnknownMode(s.to_owned())),
        }
    }
}

/// Fixed catalogue of treatment symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    Caries,
    Filling,
    RootCanal,
    Periodontal,
    Crown,
    PostAndCore,
    FixedProsthesis,
    RemovableProsthesis,
    ExistingPiece,
}

impl Symbol {
    pub const ALL: [Symbol; 9] = [
        Symbol::Caries,
        Symbol::Filling,
        Symbol::RootCanal,
        Symbol::Periodontal,
        Symbol::Crown,
        Symbol::PostAndCore,
        Symbol::FixedProsthesis,
        Symbol::RemovableProsthesis,
        Symbol::ExistingPiece,
    ];

    /// Symbols that must be qualified with a [`Mode`] before they can be placed.
    pub fn requires_color(self) -> bool {
        !matches!(self, Self::ExistingPiece)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Caries => "caries",
            Self::Filling => "obturacion",
            Self::RootCanal => "endodoncia",
            Self::Periodontal => "periodontal",
            Self::Crown => "corona",
            Self::PostAndCore => "perno-munon",
            Self::FixedProsthesis => "protesis-fija",
            Self::RemovableProsthesis => "protesis-removible",
            Self::ExistingPiece => "pieza-existente",
        }
    }
}

impl FromStr for Symbol {
    type Err = ParseMarkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|symbol| symbol.as_str() == s)
            .ok_or_else(|| ParseMarkError::UnknownSymbol(s.to_owned()))
    }
}

/// Annotation placed on one tooth surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mark {
    #[default]
    Empty,
    Extraction,
    Treatment { mode: Option<Mode>, symbol: Symbol },
}

impl Mark {
    pub fn treatment(mode: Mode, symbol: Symbol) -> Self {
        Self::Treatment {
            mode: Some(mode),
            symbol,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub fn is_extraction(&self) -> bool {
        matches!(self, Self::Extraction)
    }

    /// Encodes the mark in the persisted `MODE:SYMBOL` form; `None` for an empty surface.
    pub fn encode(&self) -> Option<String> {
        match self {
            Self::Empty => None,
            Self::Extraction => Some(EXTRACTION_TOKEN.to_owned()),
            Self::Treatment {
                mode: Some(mode),
                symbol,
            } => Some(format!(
                "{}{MODE_SEPARATOR}{}",
                mode.as_str(),
                symbol.as_str()
            )),
            Self::Treatment { mode: None, symbol } => Some(symbol.as_str().to_owned()),
        }
    }

    pub fn decode(raw: Option<&str>) -> Result<Self, ParseMarkError> {
        match raw {
            None => Ok(Self::Empty),
            Some(raw) => raw.parse(),
        }
    }
}

impl FromStr for Mark {
    type Err = ParseMarkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(Self::Empty);
        }
        if s == EXTRACTION_TOKEN {
            return Ok(Self::Extraction);
        }
        match s.split_once(MODE_SEPARATOR) {
            Some((mode, symbol)) => Ok(Self::Treatment {
                mode: Some(mode.parse()?),
                symbol: symbol.parse()?,
            }),
            None => {
                let symbol: Symbol = s.parse()?;
                if symbol.requires_color() {
                    return Err(ParseMarkError::MissingMode(symbol));
                }
                Ok(Self::Treatment { mode: None, symbol })
            }
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.encode() {
            Some(encoded) => f.write_str(&encoded),
            None => f.write_str("-"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseMarkError {
    #[error("unknown mark mode {0:?}")]
    UnknownMode(String),
    #[error("unknown treatment symbol {0:?}")]
    UnknownSymbol(String),
    #[error("symbol {} requires a mode qualifier", .0.as_str())]
    MissingMode(Symbol),
}
