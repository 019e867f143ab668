// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dashboard aggregates over payment events

use crate::error::{CorruptStoreError, StorageError};
use crate::query::SqlQuery;
use crate::schema::STATE_EVENTS;
use crate::sqlite::SqliteStorage;
use crate::timestamp;
use chrono::{DateTime, Utc};
use paynode_core::{
    month_label, DashboardData, DashboardGeneralItem, DashboardGraphItem, DashboardQuery,
    DashboardTable, Pagination, PaymentEventKind,
};
use rusqlite::types::Value as SqlValue;
use tracing::debug;

fn kind_params() -> Vec<SqlValue> {
    PaymentEventKind::ALL
        .iter()
        .map(|kind| SqlValue::Text(kind.type_tag().to_string()))
        .collect()
}

fn general_query() -> SqlQuery {
    SqlQuery {
        sql: "SELECT json_extract(data, '$._type') AS type_tag, COUNT(*) \
              FROM state_events \
              WHERE json_extract(data, '$._type') IN (?, ?, ?) \
              GROUP BY type_tag"
            .to_string(),
        params: kind_params(),
    }
}

fn graph_query(from: &DateTime<Utc>, to: &DateTime<Utc>) -> SqlQuery {
    let mut params = kind_params();
    params.push(SqlValue::Text(timestamp::format(from)));
    params.push(SqlValue::Text(timestamp::format(to)));
    SqlQuery {
        sql: "SELECT json_extract(data, '$._type') AS type_tag, COUNT(*), MAX(log_time), \
              strftime('%Y-%m', log_time) AS period \
              FROM state_events \
              WHERE json_extract(data, '$._type') IN (?, ?, ?) AND log_time BETWEEN ? AND ? \
              GROUP BY period, type_tag \
              ORDER BY period ASC, type_tag ASC"
            .to_string(),
        params,
    }
}

fn latest_of_kind(kind: PaymentEventKind, limit: Pagination) -> SqlQuery {
    SqlQuery {
        sql: "SELECT data, log_time FROM state_events \
              WHERE json_extract(data, '$._type') = ? \
              ORDER BY identifier DESC LIMIT ?"
            .to_string(),
        params: vec![
            SqlValue::Text(kind.type_tag().to_string()),
            SqlValue::Integer(limit.sql_limit()),
        ],
    }
}

/// Map a stored `_type` back to its kind; the SQL only selects known tags
fn stored_kind(tag: &str) -> Result<PaymentEventKind, StorageError> {
    PaymentEventKind::from_type_tag(tag)
        .ok_or_else(|| CorruptStoreError::EventType(tag.to_string()).into())
}

impl SqliteStorage {
    /// Totals, a monthly chart and the most recent payments in one read
    ///
    /// The chart window defaults to the twelve months before `now`.
    pub fn get_dashboard_data(
        &self,
        query: &DashboardQuery,
        now: DateTime<Utc>,
    ) -> Result<DashboardData<String>, StorageError> {
        let table_limit = Pagination::new(query.table_limit, None)?;
        let (from, to) = query.window(now);

        let general = self.dashboard_general()?;
        let graph = self.dashboard_graph(&from, &to)?;
        let table = DashboardTable {
            payments_received: self.timestamped_events(&latest_of_kind(
                PaymentEventKind::ReceivedSuccess,
                table_limit,
            ))?,
            payments_sent: self.timestamped_events(&latest_of_kind(
                PaymentEventKind::SentSuccess,
                table_limit,
            ))?,
        };

        debug!(
            general = general.len(),
            graph = graph.len(),
            received = table.payments_received.len(),
            sent = table.payments_sent.len(),
            "dashboard read"
        );
        Ok(DashboardData {
            graph,
            table,
            general,
        })
    }

    fn dashboard_general(&self) -> Result<Vec<DashboardGeneralItem>, StorageError> {
        let rows = self.query_rows(&general_query(), |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;
        let mut items = rows
            .into_iter()
            .map(|(tag, count)| Ok(DashboardGeneralItem::new(stored_kind(&tag)?, count as u64)))
            .collect::<Result<Vec<_>, StorageError>>()?;
        items.sort_by_key(|item| item.event_type_code);
        Ok(items)
    }

    fn dashboard_graph(
        &self,
        from: &DateTime<Utc>,
        to: &DateTime<Utc>,
    ) -> Result<Vec<DashboardGraphItem>, StorageError> {
        let rows = self.query_rows(&graph_query(from, to), |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        rows.into_iter()
            .map(|(tag, count, last_time, period)| {
                let kind = stored_kind(&tag)?;
                let log_time = timestamp::parse(STATE_EVENTS, &last_time)?;
                let month_code = period.get(5..7).unwrap_or_default().to_string();
                let month = month_code
                    .parse::<u32>()
                    .ok()
                    .and_then(month_label)
                    .ok_or_else(|| CorruptStoreError::Timestamp {
                        table: STATE_EVENTS,
                        value: period.clone(),
                    })?;
                Ok(DashboardGraphItem {
                    event_type_code: kind.code(),
                    event_type_class_name: kind.type_tag().to_string(),
                    event_type_label: kind.label().to_string(),
                    quantity: count as u64,
                    log_time,
                    month_of_year_code: month_code,
                    month_of_year_label: month.to_string(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "dashboard_tests.rs"]
mod tests;
