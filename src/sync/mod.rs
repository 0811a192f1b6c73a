// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Odontogram and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Keeping in-memory edits, the local cache and the remote store in step.

pub mod autosave;
pub mod reconcile;
pub mod session;

pub use autosave::{AutosaveScheduler, Finished, SaveOutcome, SaveStatus, AUTOSAVE_PERIOD};
pub use reconcile::{reconcile, ReconcileRules, Reconciled, Source};
pub use session::{EditorSession, SaveError, TickOutcome};
