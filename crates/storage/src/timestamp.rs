// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `log_time` text encoding
//!
//! Timestamps are stored as fixed-width UTC text so that SQL string
//! comparison orders them chronologically and `strftime` can read them.

use crate::error::CorruptStoreError;
use chrono::{DateTime, NaiveDateTime, Utc};

const FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

pub(crate) fn format(time: &DateTime<Utc>) -> String {
    time.format(FORMAT).to_string()
}

pub(crate) fn parse(table: &'static str, value: &str) -> Result<DateTime<Utc>, CorruptStoreError> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|_| CorruptStoreError::Timestamp {
            table,
            value: value.to_string(),
        })
}
