// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! paynode-core: storage-agnostic vocabulary for the payment node's state log
//!
//! This crate provides:
//! - Store-assigned identifiers and identifier bounds (`latest`)
//! - Record types for state changes, events and snapshots
//! - The serializer capability and its JSON implementation
//! - Payload filters, filter flattening and pagination validation
//! - Payment-event kinds and dashboard rows

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod clock;
pub mod dashboard;
pub mod error;
pub mod filter;
pub mod id;
pub mod payment;
pub mod record;
pub mod serialize;

pub use clock::{Clock, FakeClock, SystemClock};
pub use dashboard::{
    month_label, DashboardData, DashboardGeneralItem, DashboardGraphItem, DashboardQuery,
    DashboardTable,
};
pub use error::ArgumentError;
pub use filter::{flatten_filters, Combinator, Filters, Pagination};
pub use id::{EventId, IdentifierBound, SnapshotId, StateChangeId};
pub use payment::{PaymentEventKind, PaymentEventQuery, ResolvedPaymentFilter};
pub use record::{EventRecord, SnapshotRecord, StateChangeRecord, TimestampedEvent};
pub use serialize::{JsonSerializer, SerializationError, Serializer};
