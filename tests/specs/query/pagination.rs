//! Pagination specs
//!
//! Verify argument checking and page-by-page reads.

use crate::prelude::*;
use crate::prelude::assert_eq;
use paynode_core::ArgumentError;

fn seeded(count: u64) -> (Workspace, SqliteStorage) {
    let ws = Workspace::new();
    let storage = ws.storage();
    for n in 1..=count {
        let payload = format!("{{\"_type\":\"Block\",\"block_number\":{n}}}");
        storage
            .write_state_change(&payload, log_time(n as i64))
            .unwrap();
    }
    (ws, storage)
}

#[test]
fn negative_limit_or_offset_is_invalid_argument() {
    assert_eq!(
        Pagination::new(Some(-1), None),
        Err(ArgumentError::InvalidLimit(-1))
    );
    assert_eq!(
        Pagination::new(None, Some(-1)),
        Err(ArgumentError::InvalidOffset(-1))
    );

    let (_ws, storage) = seeded(1);
    let err = storage
        .get_payment_events(&PaymentEventQuery::new("0xme").offset(-1))
        .unwrap_err();
    assert!(matches!(err, StorageError::InvalidArgument(_)));
}

#[test]
fn batches_cover_every_row_once() {
    let (_ws, storage) = seeded(10);
    let unbounded = storage
        .get_state_change_records(&Filters::new(), Combinator::And, Pagination::ALL)
        .unwrap();

    for batch_size in 1..=11 {
        let pages: Vec<_> = storage
            .batch_query_state_changes(batch_size, Filters::new(), Combinator::And)
            .unwrap()
            .map(Result::unwrap)
            .collect();
        assert!(pages.iter().all(|p| !p.is_empty() && p.len() as u64 <= batch_size));
        let flat: Vec<_> = pages.into_iter().flatten().collect();
        assert_eq!(flat, unbounded, "batch size {batch_size}");
    }
}

#[test]
fn batches_restart_from_scratch() {
    let (_ws, storage) = seeded(3);
    let first: usize = storage
        .batch_query_state_changes(2, Filters::new(), Combinator::And)
        .unwrap()
        .map(|p| p.unwrap().len())
        .sum();
    let second: usize = storage
        .batch_query_state_changes(2, Filters::new(), Combinator::And)
        .unwrap()
        .map(|p| p.unwrap().len())
        .sum();
    assert_eq!((first, second), (3, 3));
}

#[test]
fn filters_combine_with_and_or_or() {
    let (_ws, storage) = seeded(4);
    let filters = Filters::new()
        .with("_type", "Block")
        .with("block_number", 2);

    let and = storage
        .get_state_change_records(&filters, Combinator::And, Pagination::ALL)
        .unwrap();
    assert_eq!(and.len(), 1);
    assert_eq!(and[0].state_change_identifier, StateChangeId(2));

    let or = storage
        .get_state_change_records(&filters, Combinator::Or, Pagination::ALL)
        .unwrap();
    assert_eq!(or.len(), 4);
}
