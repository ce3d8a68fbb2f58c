// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

#![cfg_attr(not(debug_assertions), deny(warnings))]

mod config;
mod database;
mod error;
mod iterator;
mod storage;
mod transaction;

pub use config::MemoryStoreConfig;
pub use database::MemoryDatabase;
pub use error::StoreError;
pub use iterator::MemoryScanIterator;
pub use transaction::MemoryTransaction;
