// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Settings, run log, token actions and the light-client registry

use crate::error::{CorruptStoreError, StorageError};
use crate::schema::STORAGE_VERSION;
use crate::sqlite::SqliteStorage;
use crate::timestamp;
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};
use tracing::{debug, info};

const TOKEN_ACTION: &str = "token_action";

/// A pending action authorised by a one-off token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenAction {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub action_request: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenActionRecord {
    pub identifier: u64,
    pub action: TokenAction,
}

/// A registered light client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LightClientRecord {
    pub address: String,
    pub api_key: String,
}

impl SqliteStorage {
    /// Record the current storage version in `settings`
    pub fn update_version(&self) -> Result<(), StorageError> {
        self.write(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO settings(name, value) VALUES('version', ?1)",
                params![STORAGE_VERSION.to_string()],
            )
        })?;
        info!(version = STORAGE_VERSION, "storage version recorded");
        Ok(())
    }

    /// Stored storage version; an unset version means the current one
    pub fn get_version(&self) -> Result<u32, StorageError> {
        let value: Option<Option<String>> = self
            .conn()
            .query_row(
                "SELECT value FROM settings WHERE name = 'version'",
                [],
                |row| row.get(0),
            )
            .optional()?;

        match value.flatten() {
            None => Ok(STORAGE_VERSION),
            Some(v) => v
                .trim()
                .parse()
                .map_err(|_| StorageError::from(CorruptStoreError::Version(v))),
        }
    }

    /// Append this process start to the `runs` table
    pub fn log_run(&self) -> Result<(), StorageError> {
        let started_at = timestamp::format(&Utc::now());
        let version = self.config().node_version.clone();
        self.write(|conn| {
            conn.execute(
                "INSERT INTO runs(started_at, raiden_version) VALUES(?1, ?2)",
                params![started_at, version],
            )
        })?;
        info!(%started_at, node_version = %self.config().node_version, "run logged");
        Ok(())
    }

    /// Recorded runs as `(started_at, node_version)`, oldest first
    pub fn get_runs(&self) -> Result<Vec<(DateTime<Utc>, String)>, StorageError> {
        let conn = self.conn();
        let mut stmt =
            conn.prepare("SELECT started_at, raiden_version FROM runs ORDER BY rowid ASC")?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter()
            .map(|(started_at, version)| Ok((timestamp::parse("runs", &started_at)?, version)))
            .collect()
    }

    pub fn write_token_action(&self, action: &TokenAction) -> Result<u64, StorageError> {
        let expires_at = timestamp::format(&action.expires_at);
        let identifier = self.write(|conn| {
            conn.execute(
                "INSERT INTO token_action(identifier, token, expires_at, action_request) \
                 VALUES(NULL, ?1, ?2, ?3)",
                params![action.token, expires_at, action.action_request],
            )?;
            Ok(conn.last_insert_rowid() as u64)
        })?;
        debug!(identifier, "token action written");
        Ok(identifier)
    }

    pub fn query_token_action(
        &self,
        token: &str,
    ) -> Result<Option<TokenActionRecord>, StorageError> {
        let row = self
            .conn()
            .query_row(
                "SELECT identifier, token, expires_at, action_request \
                 FROM token_action WHERE token = ?1",
                params![token],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()?;

        let Some((identifier, token, expires_at, action_request)) = row else {
            return Ok(None);
        };
        Ok(Some(TokenActionRecord {
            identifier: identifier as u64,
            action: TokenAction {
                token,
                expires_at: timestamp::parse(TOKEN_ACTION, &expires_at)?,
                action_request,
            },
        }))
    }

    pub fn query_light_clients(&self) -> Result<Vec<LightClientRecord>, StorageError> {
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT address, api_key FROM light_client ORDER BY address")?;
        let rows = stmt
            .query_map([], |row| {
                Ok(LightClientRecord {
                    address: row.get(0)?,
                    api_key: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn query_light_client(
        &self,
        address: &str,
    ) -> Result<Option<LightClientRecord>, StorageError> {
        let row = self
            .conn()
            .query_row(
                "SELECT address, api_key FROM light_client WHERE address = ?1",
                params![address],
                |row| {
                    Ok(LightClientRecord {
                        address: row.get(0)?,
                        api_key: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(row)
    }
}

#[cfg(test)]
#[path = "auxiliary_tests.rs"]
mod tests;
