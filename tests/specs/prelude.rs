//! Shared fixtures: a small domain and a node wired to a temp database

pub use chrono::{DateTime, Utc};
pub use paynode_core::{
    Combinator, FakeClock, Filters, IdentifierBound, JsonSerializer, Pagination,
    PaymentEventKind, PaymentEventQuery, StateChangeId,
};
pub use paynode_storage::test_support::{log_time, payment_event};
pub use paynode_storage::{
    CorruptStoreError, Restore, SerializedStorage, SqliteStorage, StorageError, WriteAheadLog,
};
pub use serde::{Deserialize, Serialize};
pub use similar_asserts::assert_eq;
use std::path::PathBuf;
use tempfile::TempDir;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_type")]
pub enum StateChange {
    Block {
        block_number: u64,
    },
    Deposit {
        token_network_identifier: String,
        amount: u64,
    },
    Withdraw {
        token_network_identifier: String,
        amount: u64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_type")]
pub enum Event {
    BalanceChanged { balance: u64 },
    SendProcessed { message_identifier: u64 },
}

/// Node state rebuilt from the log
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeState {
    pub block_number: u64,
    pub balance: u64,
    pub applied: u64,
}

impl NodeState {
    /// Transition function: apply one state change, report the events
    pub fn apply(&mut self, change: StateChange) -> Vec<Event> {
        self.applied += 1;
        match change {
            StateChange::Block { block_number } => {
                self.block_number = block_number;
                vec![]
            }
            StateChange::Deposit { amount, .. } => {
                self.balance += amount;
                vec![Event::BalanceChanged {
                    balance: self.balance,
                }]
            }
            StateChange::Withdraw { amount, .. } => {
                self.balance = self.balance.saturating_sub(amount);
                vec![Event::BalanceChanged {
                    balance: self.balance,
                }]
            }
        }
    }
}

pub fn deposit(amount: u64) -> StateChange {
    StateChange::Deposit {
        token_network_identifier: "0xtn".to_string(),
        amount,
    }
}

/// A temp directory holding one node database
pub struct Workspace {
    dir: TempDir,
    pub clock: FakeClock,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
            clock: FakeClock::at(log_time(0)),
        }
    }

    pub fn db_path(&self) -> PathBuf {
        self.dir.path().join("node.db")
    }

    pub fn storage(&self) -> SqliteStorage {
        SqliteStorage::open(self.db_path()).unwrap()
    }

    /// Open (or reopen) the write-ahead log
    pub fn wal(&self) -> WriteAheadLog<JsonSerializer, FakeClock> {
        WriteAheadLog::new(
            SerializedStorage::new(self.storage(), JsonSerializer),
            self.clock.clone(),
        )
    }
}

/// Append a state change, apply it, and append the events it produced
pub fn dispatch(
    wal: &WriteAheadLog<JsonSerializer, FakeClock>,
    state: &mut NodeState,
    change: StateChange,
) -> StateChangeId {
    let id = wal.append_state_change(&change).unwrap();
    let events = state.apply(change);
    wal.append_events(id, &events).unwrap();
    id
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}
