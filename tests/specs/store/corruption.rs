//! Corruption specs
//!
//! Verify that unusable data is reported loudly instead of skipped.

use crate::prelude::*;

#[test]
fn opening_a_non_database_file_fails() {
    let ws = Workspace::new();
    std::fs::write(ws.db_path(), vec![0x5a_u8; 16 * 1024]).unwrap();

    let err = SqliteStorage::open(ws.db_path()).err().unwrap();
    assert!(err.is_corruption());
    assert!(matches!(err, StorageError::CorruptStore(_)));
}

#[test]
fn payload_of_wrong_shape_is_corruption() {
    let ws = Workspace::new();
    ws.storage()
        .write_state_change("{\"_type\":\"Teleport\",\"to\":\"mars\"}", log_time(0))
        .unwrap();

    let wal = ws.wal();
    let err = wal
        .replay_range::<StateChange>(IdentifierBound::Latest, None)
        .unwrap_err();
    assert!(matches!(
        err,
        StorageError::CorruptStore(CorruptStoreError::Payload { .. })
    ));
}

#[test]
fn snapshot_of_wrong_shape_is_corruption() {
    let ws = Workspace::new();
    let storage = ws.storage();
    let id = storage.write_state_change("{}", log_time(0)).unwrap();
    storage.write_state_snapshot(id, "\"not a state\"").unwrap();

    let err = ws
        .wal()
        .restore::<NodeState, StateChange>(IdentifierBound::Latest)
        .unwrap_err();
    assert!(err.is_corruption());
}
