// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Odontogram and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Core chart data model.
//!
//! A chart holds one [`ToothState`] per FDI tooth code; each tooth carries five surface
//! [`Mark`]s plus an `absent` flag.

pub mod chart;
pub(crate) mod fixtures;
pub mod ids;
pub mod mark;
pub mod tooth;

pub use chart::{ChartSnapshot, ToothState};
pub use ids::{Id, IdError, PatientId};
pub use mark::{Mark, Mode, ParseMarkError, Symbol, EXTRACTION_TOKEN};
pub use tooth::{InvalidToothId, ParseSurfaceError, Surface, ToothId};
