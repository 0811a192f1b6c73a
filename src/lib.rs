// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Odontogram and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Odontogram: dental chart editor core.
//!
//! Per-tooth, per-surface annotation state ([`model`], [`ops`]), the menu flow that turns clicks
//! into chart operations ([`selection`]), and the machinery keeping edits safe: a local cache
//! ([`store`]), the remote store contract ([`bridge`]) and load-time reconciliation plus
//! autosave ([`sync`]).

pub mod bridge;
pub mod config;
pub mod dates;
pub mod model;
pub mod ops;
pub mod selection;
pub mod store;
pub mod sync;
