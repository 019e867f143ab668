//! Maintenance specs
//!
//! Verify version tracking, migrations and pruning.

use crate::prelude::*;
use crate::prelude::assert_eq;
use paynode_core::SnapshotRecord;
use paynode_storage::STORAGE_VERSION;

#[test]
fn version_is_current_until_written() {
    let ws = Workspace::new();
    let storage = ws.storage();
    assert_eq!(storage.get_version().unwrap(), STORAGE_VERSION);
    storage.update_version().unwrap();
    drop(storage);
    assert_eq!(ws.storage().get_version().unwrap(), STORAGE_VERSION);
}

#[test]
fn migration_rewrites_snapshots_atomically() {
    let ws = Workspace::new();
    let wal = ws.wal();
    let mut state = NodeState::default();
    let id = dispatch(&wal, &mut state, deposit(9));
    wal.append_snapshot(id, &state).unwrap();
    drop(wal);

    let storage = ws.storage();
    let snapshots = storage.get_snapshots().unwrap();
    let rewritten: Vec<(String, _)> = snapshots
        .iter()
        .map(|s: &SnapshotRecord<String>| {
            (s.data.replace("\"balance\":9", "\"balance\":90"), s.identifier)
        })
        .collect();
    storage
        .with_transaction(|tx| tx.update_snapshots(&rewritten))
        .unwrap();
    drop(storage);

    let (at, snapshot) = ws.wal().latest_snapshot::<NodeState>().unwrap().unwrap();
    assert_eq!(at, id);
    assert_eq!(snapshot.balance, 90);
}

#[test]
fn pruning_removes_state_changes_and_their_events() {
    let ws = Workspace::new();
    let wal = ws.wal();
    let mut state = NodeState::default();
    let first = dispatch(&wal, &mut state, deposit(1));
    let second = dispatch(&wal, &mut state, deposit(2));
    let third = dispatch(&wal, &mut state, deposit(3));
    wal.append_snapshot(third, &state).unwrap();

    let storage = wal.storage().storage();
    assert_eq!(storage.delete_state_changes(&[first, second]).unwrap(), 2);
    assert_eq!(storage.count_state_changes().unwrap(), 1);
    let events: Vec<Event> = wal.storage().get_events(Pagination::ALL).unwrap();
    assert_eq!(events, vec![Event::BalanceChanged { balance: 6 }]);

    // A snapshot still points at `third`
    assert!(storage.delete_state_changes(&[third]).is_err());
    assert_eq!(storage.count_state_changes().unwrap(), 1);
}
