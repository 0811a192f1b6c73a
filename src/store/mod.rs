// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Odontogram and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Local durable cache for charts being edited.
//!
//! [`LocalCache`] mirrors the in-progress chart into a [`KeyValueStore`] on every edit so a
//! crash or reload does not lose work that has not reached the remote store yet.

pub mod kv;
pub mod local_cache;

pub use kv::{FileStore, KeyValueStore, MemoryStore, StoreError, WriteDurability};
pub use local_cache::{LocalCache, LocalCacheEntry};
