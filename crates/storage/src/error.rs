// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Storage errors

use paynode_core::{ArgumentError, SerializationError};
use std::path::PathBuf;
use thiserror::Error;

/// The store cannot be trusted; manual intervention is required
#[derive(Debug, Error)]
pub enum CorruptStoreError {
    #[error("database {path} could not be opened: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },
    #[error("database {path} rejected the schema: {source}")]
    Schema {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },
    #[error("stored {table} payload does not decode: {source}")]
    Payload {
        table: &'static str,
        #[source]
        source: SerializationError,
    },
    #[error("stored {table} log_time {value:?} is not a timestamp")]
    Timestamp { table: &'static str, value: String },
    #[error("stored event type {0:?} is not a payment kind")]
    EventType(String),
    #[error("settings version {0:?} is not a number")]
    Version(String),
}

/// Errors from storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("corrupt store: {0}")]
    CorruptStore(#[from] CorruptStoreError),
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] ArgumentError),
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] SerializationError),
}

impl StorageError {
    /// True for errors that mean the store must not be used further
    pub fn is_corruption(&self) -> bool {
        matches!(self, Self::CorruptStore(_))
    }
}
