//! Payment query specs
//!
//! Verify how payment events are selected relative to the local node.

use crate::prelude::*;
use crate::prelude::assert_eq;

const ME: &str = "0x1111111111111111111111111111111111111111";
const ALICE: &str = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
const BOB: &str = "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";

/// Stores the given payments, one second apart; returns their payloads
fn store_payments(
    storage: &SqliteStorage,
    payments: &[(PaymentEventKind, &str, &str, &str)],
) -> Vec<String> {
    let source = storage.write_state_change("{}", log_time(0)).unwrap();
    payments
        .iter()
        .enumerate()
        .map(|(n, (kind, network, initiator, target))| {
            let payload = payment_event(*kind, network, initiator, target, n as u64);
            storage
                .write_events(source, [payload.as_str()], log_time(n as i64))
                .unwrap();
            payload
        })
        .collect()
}

fn payloads(storage: &SqliteStorage, query: &PaymentEventQuery) -> Vec<String> {
    storage
        .get_payment_events(query)
        .unwrap()
        .into_iter()
        .map(|e| e.event)
        .collect()
}

#[test]
fn target_is_us_overrides_explicit_sent_filter() {
    let ws = Workspace::new();
    let storage = ws.storage();
    let stored = store_payments(
        &storage,
        &[
            (PaymentEventKind::ReceivedSuccess, "0xtn", ALICE, ME),
            (PaymentEventKind::SentSuccess, "0xtn", ME, BOB),
            (PaymentEventKind::SentFailed, "0xtn", ME, BOB),
        ],
    );

    let query = PaymentEventQuery::new(ME)
        .target(ME)
        .event_type(PaymentEventKind::SentSuccess);
    assert_eq!(payloads(&storage, &query), vec![stored[0].clone()]);
}

#[test]
fn addresses_compare_case_insensitively() {
    let ws = Workspace::new();
    let storage = ws.storage();
    let stored = store_payments(
        &storage,
        &[
            (
                PaymentEventKind::ReceivedSuccess,
                "0xtn",
                "0xAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA",
                ME,
            ),
            (PaymentEventKind::ReceivedSuccess, "0xtn", BOB, ME),
        ],
    );

    let query = PaymentEventQuery::new(ME).initiator(ALICE);
    assert_eq!(payloads(&storage, &query), vec![stored[0].clone()]);
}

#[test]
fn foreign_initiator_and_target_match_either() {
    let ws = Workspace::new();
    let storage = ws.storage();
    let stored = store_payments(
        &storage,
        &[
            (PaymentEventKind::ReceivedSuccess, "0xtn", ALICE, ME),
            (PaymentEventKind::SentSuccess, "0xtn", ME, BOB),
            (PaymentEventKind::SentSuccess, "0xother", ME, BOB),
            (PaymentEventKind::SentSuccess, "0xtn", ME, ME),
        ],
    );

    let query = PaymentEventQuery::new(ME)
        .token_network("0xtn")
        .initiator(ALICE)
        .target(BOB);
    assert_eq!(
        payloads(&storage, &query),
        vec![stored[0].clone(), stored[1].clone()]
    );
}

#[test]
fn date_range_is_inclusive() {
    let ws = Workspace::new();
    let storage = ws.storage();
    let stored = store_payments(
        &storage,
        &[
            (PaymentEventKind::SentSuccess, "0xtn", ME, BOB),
            (PaymentEventKind::SentSuccess, "0xtn", ME, BOB),
            (PaymentEventKind::SentSuccess, "0xtn", ME, BOB),
            (PaymentEventKind::SentSuccess, "0xtn", ME, BOB),
        ],
    );

    let between = PaymentEventQuery::new(ME)
        .from_date(log_time(1))
        .to_date(log_time(2));
    assert_eq!(payloads(&storage, &between), stored[1..3].to_vec());

    let since = PaymentEventQuery::new(ME).from_date(log_time(3));
    assert_eq!(payloads(&storage, &since), stored[3..].to_vec());

    let until = PaymentEventQuery::new(ME).to_date(log_time(0));
    assert_eq!(payloads(&storage, &until), stored[..1].to_vec());
}

#[test]
fn results_page_in_identifier_order() {
    let ws = Workspace::new();
    let storage = ws.storage();
    let stored = store_payments(
        &storage,
        &[
            (PaymentEventKind::SentFailed, "0xtn", ME, BOB),
            (PaymentEventKind::ReceivedSuccess, "0xtn", BOB, ME),
            (PaymentEventKind::SentSuccess, "0xtn", ME, ALICE),
        ],
    );

    let query = PaymentEventQuery::new(ME).limit(2).offset(1);
    assert_eq!(payloads(&storage, &query), stored[1..].to_vec());

    let with_times = storage.get_payment_events(&PaymentEventQuery::new(ME)).unwrap();
    let times: Vec<_> = with_times.iter().map(|e| e.log_time).collect();
    assert_eq!(times, vec![log_time(0), log_time(1), log_time(2)]);
}
