//! Concurrency specs
//!
//! Verify that concurrent writers through one store never lose or
//! duplicate rows.

use crate::prelude::*;
use crate::prelude::assert_eq;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::thread;

#[test]
fn concurrent_event_batches_all_commit() {
    let ws = Workspace::new();
    let wal = Arc::new(ws.wal());
    let source = wal.append_state_change(&deposit(1)).unwrap();

    let handles: Vec<_> = (0..10u64)
        .map(|n| {
            let wal = Arc::clone(&wal);
            thread::spawn(move || {
                wal.append_events(
                    source,
                    &[
                        Event::SendProcessed {
                            message_identifier: n * 2,
                        },
                        Event::SendProcessed {
                            message_identifier: n * 2 + 1,
                        },
                    ],
                )
                .unwrap()
            })
        })
        .collect();

    let mut ids = BTreeSet::new();
    for handle in handles {
        let batch = handle.join().unwrap();
        assert_eq!(batch.len(), 2);
        // Each batch is contiguous: no other writer interleaved
        assert_eq!(batch[1].0, batch[0].0 + 1);
        ids.extend(batch);
    }
    assert_eq!(ids.len(), 20);

    let events: Vec<Event> = wal.storage().get_events(Pagination::ALL).unwrap();
    assert_eq!(events.len(), 20);
}

#[test]
fn concurrent_state_changes_get_distinct_increasing_ids() {
    let ws = Workspace::new();
    let wal = Arc::new(ws.wal());

    let handles: Vec<_> = (0..8u64)
        .map(|n| {
            let wal = Arc::clone(&wal);
            thread::spawn(move || {
                (0..5)
                    .map(|_| wal.append_state_change(&deposit(n)).unwrap())
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut all = Vec::new();
    for handle in handles {
        let ids = handle.join().unwrap();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
        all.extend(ids);
    }
    all.sort();
    all.dedup();
    assert_eq!(all.len(), 40);
    assert_eq!(wal.storage().storage().count_state_changes().unwrap(), 40);
}
