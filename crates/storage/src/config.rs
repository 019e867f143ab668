// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Storage configuration

use std::path::{Path, PathBuf};
use std::time::Duration;

/// SQLite rollback-journal strategy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JournalMode {
    /// Keep the journal file between transactions, only zero its header
    #[default]
    Persist,
    Delete,
    Wal,
}

impl JournalMode {
    pub fn as_pragma(&self) -> &'static str {
        match self {
            Self::Persist => "persist",
            Self::Delete => "delete",
            Self::Wal => "wal",
        }
    }
}

/// Configuration for SqliteStorage
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Database file, created if missing
    pub path: PathBuf,
    pub journal_mode: JournalMode,
    /// How long a statement waits on a lock held by another process
    pub busy_timeout: Duration,
    /// Version string recorded in the `runs` table
    pub node_version: String,
}

impl StorageConfig {
    /// Default configuration for a database file
    pub fn for_path(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            journal_mode: JournalMode::default(),
            busy_timeout: Duration::from_secs(5),
            node_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn with_journal_mode(mut self, mode: JournalMode) -> Self {
        self.journal_mode = mode;
        self
    }

    pub fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    pub fn with_node_version(mut self, version: impl Into<String>) -> Self {
        self.node_version = version.into();
        self
    }
}
