// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Query builder for JSON payload columns
//!
//! Builds SQL text plus bound parameters; nothing here touches a
//! connection. Field paths and values are always bound, never spliced into
//! the SQL text.

use crate::schema::{STATE_CHANGES, STATE_EVENTS};
use crate::timestamp;
use paynode_core::{ArgumentError, Combinator, Filters, Pagination, PaymentEventQuery};
use rusqlite::types::Value as SqlValue;
use serde_json::Value;

/// Tables whose `data` column holds queryable JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    StateChanges,
    StateEvents,
}

impl Table {
    pub fn name(&self) -> &'static str {
        match self {
            Self::StateChanges => STATE_CHANGES,
            Self::StateEvents => STATE_EVENTS,
        }
    }

    /// Columns read back into a record, in row order
    fn record_columns(&self) -> &'static str {
        match self {
            Self::StateChanges => "identifier, data",
            Self::StateEvents => "identifier, source_statechange_id, data",
        }
    }
}

/// SQL text with its positional parameters
#[derive(Debug, Clone, PartialEq)]
pub struct SqlQuery {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

impl SqlQuery {
    pub(crate) fn bind(&self) -> rusqlite::ParamsFromIter<std::slice::Iter<'_, SqlValue>> {
        rusqlite::params_from_iter(self.params.iter())
    }
}

/// Map a JSON filter leaf to the value `json_extract` yields for it
fn sql_value(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => SqlValue::Integer(i),
            (None, Some(f)) => SqlValue::Real(f),
            (None, None) => SqlValue::Text(n.to_string()),
        },
        Value::String(s) => SqlValue::Text(s.clone()),
        other => SqlValue::Text(other.to_string()),
    }
}

/// One equality clause per filter leaf
fn filter_clauses(filters: &Filters, params: &mut Vec<SqlValue>) -> Vec<String> {
    filters
        .iter()
        .map(|(path, value)| {
            params.push(SqlValue::Text(format!("$.{}", path)));
            if value.is_null() {
                "json_extract(data, ?) IS NULL".to_string()
            } else {
                params.push(sql_value(value));
                "json_extract(data, ?) = ?".to_string()
            }
        })
        .collect()
}

/// Filtered page of records, oldest first
pub fn filtered(
    table: Table,
    filters: &Filters,
    combinator: Combinator,
    pagination: Pagination,
) -> Result<SqlQuery, ArgumentError> {
    filters.validate()?;

    let mut params = Vec::new();
    let mut sql = format!("SELECT {} FROM {}", table.record_columns(), table.name());

    let clauses = filter_clauses(filters, &mut params);
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(combinator.as_sql()));
    }

    sql.push_str(" ORDER BY identifier ASC LIMIT ? OFFSET ?");
    params.push(SqlValue::Integer(pagination.sql_limit()));
    params.push(SqlValue::Integer(pagination.sql_offset()));

    Ok(SqlQuery { sql, params })
}

/// Most recent record matching every filter
pub fn latest_by_field(table: Table, filters: &Filters) -> Result<SqlQuery, ArgumentError> {
    if filters.is_empty() {
        return Err(ArgumentError::EmptyFilter);
    }
    filters.validate()?;

    let mut params = Vec::new();
    let clauses = filter_clauses(filters, &mut params);
    let sql = format!(
        "SELECT {} FROM {} WHERE {} ORDER BY identifier DESC LIMIT 1",
        table.record_columns(),
        table.name(),
        clauses.join(Combinator::And.as_sql()),
    );

    Ok(SqlQuery { sql, params })
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

/// Payment events as seen from the local node
///
/// Selects `data, log_time` from `state_events`.
pub fn payment_events(query: &PaymentEventQuery) -> Result<SqlQuery, ArgumentError> {
    let pagination = Pagination::new(query.limit, query.offset)?;
    let resolved = query.resolve();

    let mut params: Vec<SqlValue> = resolved
        .kinds
        .iter()
        .map(|kind| SqlValue::Text(kind.type_tag().to_string()))
        .collect();
    let mut sql = format!(
        "SELECT data, log_time FROM state_events WHERE json_extract(data, '$._type') IN ({})",
        placeholders(resolved.kinds.len())
    );

    if let Some(token_network) = &query.token_network_identifier {
        sql.push_str(" AND json_extract(data, '$.token_network_identifier') = ?");
        params.push(SqlValue::Text(token_network.clone()));
    }

    match (query.from_date, query.to_date) {
        (Some(from), Some(to)) => {
            sql.push_str(" AND log_time BETWEEN ? AND ?");
            params.push(SqlValue::Text(timestamp::format(&from)));
            params.push(SqlValue::Text(timestamp::format(&to)));
        }
        (Some(from), None) => {
            sql.push_str(" AND log_time >= ?");
            params.push(SqlValue::Text(timestamp::format(&from)));
        }
        (None, Some(to)) => {
            sql.push_str(" AND log_time <= ?");
            params.push(SqlValue::Text(timestamp::format(&to)));
        }
        (None, None) => {}
    }

    let address_clause =
        |field: &str| format!("lower(json_extract(data, '$.{}')) = lower(?)", field);
    match (resolved.target, resolved.initiator) {
        (Some(target), Some(initiator)) => {
            sql.push_str(&format!(
                " AND ({} OR {})",
                address_clause("target"),
                address_clause("initiator")
            ));
            params.push(SqlValue::Text(target.to_string()));
            params.push(SqlValue::Text(initiator.to_string()));
        }
        (Some(target), None) => {
            sql.push_str(&format!(" AND {}", address_clause("target")));
            params.push(SqlValue::Text(target.to_string()));
        }
        (None, Some(initiator)) => {
            sql.push_str(&format!(" AND {}", address_clause("initiator")));
            params.push(SqlValue::Text(initiator.to_string()));
        }
        (None, None) => {}
    }

    sql.push_str(" ORDER BY identifier ASC LIMIT ? OFFSET ?");
    params.push(SqlValue::Integer(pagination.sql_limit()));
    params.push(SqlValue::Integer(pagination.sql_offset()));

    Ok(SqlQuery { sql, params })
}

#[cfg(test)]
#[path = "query_tests.rs"]
mod tests;
