// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Payment events: the three event kinds reported to users and the
//! filter that selects them.

use crate::error::ArgumentError;
use chrono::{DateTime, Utc};

/// Payment event kinds, numbered as the reporting API exposes them
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PaymentEventKind {
    ReceivedSuccess,
    SentFailed,
    SentSuccess,
}

impl PaymentEventKind {
    pub const ALL: [Self; 3] = [Self::ReceivedSuccess, Self::SentFailed, Self::SentSuccess];

    pub fn code(&self) -> u8 {
        match self {
            Self::ReceivedSuccess => 1,
            Self::SentFailed => 2,
            Self::SentSuccess => 3,
        }
    }

    pub fn from_code(code: i64) -> Result<Self, ArgumentError> {
        match code {
            1 => Ok(Self::ReceivedSuccess),
            2 => Ok(Self::SentFailed),
            3 => Ok(Self::SentSuccess),
            other => Err(ArgumentError::UnknownEventType(other)),
        }
    }

    /// The `_type` tag stored in the event payload
    pub fn type_tag(&self) -> &'static str {
        match self {
            Self::ReceivedSuccess => "raiden.transfer.events.EventPaymentReceivedSuccess",
            Self::SentFailed => "raiden.transfer.events.EventPaymentSentFailed",
            Self::SentSuccess => "raiden.transfer.events.EventPaymentSentSuccess",
        }
    }

    pub fn from_type_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.type_tag() == tag)
    }

    /// Human-readable label for charts
    pub fn label(&self) -> &'static str {
        match self {
            Self::ReceivedSuccess => "Payment Received",
            Self::SentFailed => "Payment Sent Failed",
            Self::SentSuccess => "Payment Sent Success",
        }
    }
}

/// Filter for payment events as seen from the local node
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaymentEventQuery {
    pub our_address: String,
    pub token_network_identifier: Option<String>,
    pub initiator_address: Option<String>,
    pub target_address: Option<String>,
    pub from_date: Option<DateTime<Utc>>,
    pub to_date: Option<DateTime<Utc>>,
    pub event_type: Option<PaymentEventKind>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Which payment kinds to select and which address predicates remain
/// after the local-address rules have been applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPaymentFilter<'a> {
    pub kinds: Vec<PaymentEventKind>,
    pub initiator: Option<&'a str>,
    pub target: Option<&'a str>,
}

impl PaymentEventQuery {
    pub fn new(our_address: impl Into<String>) -> Self {
        Self {
            our_address: our_address.into(),
            ..Self::default()
        }
    }

    pub fn token_network(mut self, identifier: impl Into<String>) -> Self {
        self.token_network_identifier = Some(identifier.into());
        self
    }

    pub fn initiator(mut self, address: impl Into<String>) -> Self {
        self.initiator_address = Some(address.into());
        self
    }

    pub fn target(mut self, address: impl Into<String>) -> Self {
        self.target_address = Some(address.into());
        self
    }

    pub fn from_date(mut self, from: DateTime<Utc>) -> Self {
        self.from_date = Some(from);
        self
    }

    pub fn to_date(mut self, to: DateTime<Utc>) -> Self {
        self.to_date = Some(to);
        self
    }

    pub fn event_type(mut self, kind: PaymentEventKind) -> Self {
        self.event_type = Some(kind);
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Apply the local-address rules
    ///
    /// An initiator equal to our address means "payments we sent": the kind
    /// set collapses to sent-success and no initiator predicate is needed.
    /// A target equal to our address likewise collapses to received-success.
    /// Both rules override an explicit `event_type`. A payment to ourselves
    /// matches both; it is reported once, as received. Address comparison
    /// ignores ASCII case.
    pub fn resolve(&self) -> ResolvedPaymentFilter<'_> {
        let mut kinds = match self.event_type {
            Some(kind) => vec![kind],
            None => PaymentEventKind::ALL.to_vec(),
        };
        let mut initiator = None;
        let mut target = None;

        if let Some(address) = self.initiator_address.as_deref() {
            if self.is_ours(address) {
                kinds = vec![PaymentEventKind::SentSuccess];
            } else {
                initiator = Some(address);
            }
        }

        if let Some(address) = self.target_address.as_deref() {
            if self.is_ours(address) {
                kinds = vec![PaymentEventKind::ReceivedSuccess];
            } else {
                target = Some(address);
            }
        }

        ResolvedPaymentFilter {
            kinds,
            initiator,
            target,
        }
    }

    fn is_ours(&self, address: &str) -> bool {
        address.eq_ignore_ascii_case(&self.our_address)
    }
}

#[cfg(test)]
#[path = "payment_tests.rs"]
mod tests;
