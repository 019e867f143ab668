// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! paynode-storage: SQLite-backed state-change log for the payment node
//!
//! Layers, bottom up:
//! - `SqliteStorage`: connection, schema, write lock, raw reads and writes
//! - `query`: JSON payload filters, pagination and payment/dashboard SQL
//! - `SerializedStorage`: encodes and decodes domain objects
//! - `WriteAheadLog`: append, snapshot and replay

pub mod auxiliary;
pub mod batch;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod query;
pub mod schema;
pub mod serialized;
pub mod sqlite;
mod statements;
mod timestamp;
pub mod transaction;
pub mod wal;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use auxiliary::{LightClientRecord, TokenAction, TokenActionRecord};
pub use batch::Pages;
pub use config::{JournalMode, StorageConfig};
pub use error::{CorruptStoreError, StorageError};
pub use query::{SqlQuery, Table};
pub use schema::STORAGE_VERSION;
pub use serialized::SerializedStorage;
pub use sqlite::SqliteStorage;
pub use transaction::StorageTransaction;
pub use wal::{Restore, WriteAheadLog};
