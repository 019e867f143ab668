// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Caller-side argument errors
//!
//! These are raised before any row is read or written, so the caller can
//! fix the request and retry.

use thiserror::Error;

/// A query or write request that the store refuses to execute
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgumentError {
    #[error("limit must be a non-negative integer, got {0}")]
    InvalidLimit(i64),
    #[error("offset must be a non-negative integer, got {0}")]
    InvalidOffset(i64),
    #[error("identifier must be an integer or 'latest', got {0:?}")]
    InvalidIdentifier(String),
    #[error("'latest' as a lower bound cannot take an upper bound")]
    LatestWithUpperBound,
    #[error("batch size must be at least 1")]
    ZeroBatchSize,
    #[error("at least one filter is required")]
    EmptyFilter,
    #[error("filter path {0:?} is not a valid JSON path segment")]
    InvalidFilterPath(String),
    #[error("unknown payment event type code {0}")]
    UnknownEventType(i64),
}
