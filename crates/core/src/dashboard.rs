// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dashboard reporting rows
//!
//! Best-effort aggregates over payment events. Nothing here feeds replay.

use crate::payment::PaymentEventKind;
use crate::record::TimestampedEvent;
use chrono::{DateTime, Months, Utc};

/// Fixed English month abbreviations, indexed by month number - 1
const MONTH_LABELS: [&str; 12] = [
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];

/// Abbreviation for a 1-based month number
pub fn month_label(month: u32) -> Option<&'static str> {
    let index = usize::try_from(month.checked_sub(1)?).ok()?;
    MONTH_LABELS.get(index).copied()
}

/// Parameters for a dashboard read
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardQuery {
    pub graph_from: Option<DateTime<Utc>>,
    pub graph_to: Option<DateTime<Utc>>,
    pub table_limit: Option<i64>,
}

impl DashboardQuery {
    /// The chart window, defaulting to the twelve months before `now`
    pub fn window(&self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        let to = self.graph_to.unwrap_or(now);
        let from = self.graph_from.unwrap_or_else(|| {
            now.checked_sub_months(Months::new(12))
                .unwrap_or(DateTime::<Utc>::MIN_UTC)
        });
        (from, to)
    }
}

/// Total count per payment kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardGeneralItem {
    pub event_type_code: u8,
    pub event_type_class_name: String,
    pub quantity: u64,
}

impl DashboardGeneralItem {
    pub fn new(kind: PaymentEventKind, quantity: u64) -> Self {
        Self {
            event_type_code: kind.code(),
            event_type_class_name: kind.type_tag().to_string(),
            quantity,
        }
    }
}

/// Count per payment kind per calendar month
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardGraphItem {
    pub event_type_code: u8,
    pub event_type_class_name: String,
    pub event_type_label: String,
    pub quantity: u64,
    /// Most recent log time within the bucket
    pub log_time: DateTime<Utc>,
    /// Two-digit month, `"01"` to `"12"`
    pub month_of_year_code: String,
    pub month_of_year_label: String,
}

/// Most recent received and sent payments
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardTable<T> {
    pub payments_received: Vec<TimestampedEvent<T>>,
    pub payments_sent: Vec<TimestampedEvent<T>>,
}

/// Everything the dashboard renders in one read
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardData<T> {
    pub graph: Vec<DashboardGraphItem>,
    pub table: DashboardTable<T>,
    pub general: Vec<DashboardGeneralItem>,
}
