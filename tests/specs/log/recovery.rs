//! Recovery specs
//!
//! Verify that a node rebuilds its state from snapshots plus the log tail
//! after the process goes away.

use crate::prelude::*;
use crate::prelude::assert_eq;

#[test]
fn restart_replays_log_without_snapshot() {
    let ws = Workspace::new();
    let mut state = NodeState::default();
    {
        let wal = ws.wal();
        dispatch(&wal, &mut state, StateChange::Block { block_number: 10 });
        dispatch(&wal, &mut state, deposit(5));
        dispatch(&wal, &mut state, deposit(7));
    }

    let wal = ws.wal();
    let rebuilt = wal
        .replay_with(
            IdentifierBound::Latest,
            NodeState::default,
            |s: &mut NodeState, c: StateChange| {
                s.apply(c);
            },
        )
        .unwrap();
    assert_eq!(rebuilt, state);
}

#[test]
fn restart_resumes_from_latest_snapshot() {
    let ws = Workspace::new();
    let mut state = NodeState::default();
    {
        let wal = ws.wal();
        for n in 1..=6 {
            let id = dispatch(&wal, &mut state, deposit(n));
            if n % 4 == 0 {
                wal.append_snapshot(id, &state).unwrap();
            }
        }
    }

    let wal = ws.wal();
    let restore: Restore<NodeState, StateChange> = wal.restore(IdentifierBound::Latest).unwrap();
    assert_eq!(restore.snapshot_state_change_id, StateChangeId(4));
    assert_eq!(restore.pending, vec![deposit(5), deposit(6)]);

    let mut rebuilt = restore.snapshot.unwrap();
    for change in restore.pending {
        rebuilt.apply(change);
    }
    assert_eq!(rebuilt, state);
}

#[test]
fn snapshot_lookup_scenario() {
    let ws = Workspace::new();
    let storage = ws.storage();
    for n in 1..=5 {
        let id = storage
            .write_state_change(&format!("{{\"n\":{n}}}"), log_time(n))
            .unwrap();
        assert_eq!(id, StateChangeId(n as u64));
    }
    storage
        .write_state_snapshot(StateChangeId(3), "{\"snapshot\":3}")
        .unwrap();

    assert_eq!(
        storage.get_latest_state_snapshot().unwrap(),
        Some((StateChangeId(3), "{\"snapshot\":3}".to_string()))
    );
    assert_eq!(
        storage
            .get_snapshot_closest_to_state_change(StateChangeId(4).into())
            .unwrap(),
        (StateChangeId(3), Some("{\"snapshot\":3}".to_string()))
    );
    assert_eq!(
        storage
            .get_snapshot_closest_to_state_change(StateChangeId(2).into())
            .unwrap(),
        (StateChangeId(0), None)
    );
}

#[test]
fn replay_latest_returns_only_the_newest_change() {
    let ws = Workspace::new();
    let wal = ws.wal();
    let mut state = NodeState::default();
    dispatch(&wal, &mut state, deposit(1));
    dispatch(&wal, &mut state, StateChange::Block { block_number: 2 });

    let latest: Vec<StateChange> = wal.replay_range(IdentifierBound::Latest, None).unwrap();
    assert_eq!(latest, vec![StateChange::Block { block_number: 2 }]);
}

#[test]
fn identifier_bounds_parse_from_text() {
    let ws = Workspace::new();
    let wal = ws.wal();
    let mut state = NodeState::default();
    for n in 1..=3 {
        dispatch(&wal, &mut state, deposit(n));
    }

    let from: IdentifierBound = "2".parse().unwrap();
    let to: IdentifierBound = " latest ".parse().unwrap();
    let changes: Vec<StateChange> = wal.replay_range(from, Some(to)).unwrap();
    assert_eq!(changes, vec![deposit(2), deposit(3)]);

    assert!("two".parse::<IdentifierBound>().is_err());
    assert!("-1".parse::<IdentifierBound>().is_err());
}

#[test]
fn events_link_back_to_their_state_change() {
    let ws = Workspace::new();
    let wal = ws.wal();
    let mut state = NodeState::default();
    dispatch(&wal, &mut state, deposit(3));
    let second = dispatch(&wal, &mut state, deposit(4));

    let record = wal
        .latest_event_matching::<Event>(&Filters::new().with("_type", "BalanceChanged"))
        .unwrap();
    assert_eq!(record.state_change_identifier, second);
    assert_eq!(record.data, Some(Event::BalanceChanged { balance: 7 }));
}
