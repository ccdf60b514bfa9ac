//! Connection accounting
//!
//! Process-wide diagnostic counters used by the accept loop to enforce the
//! connection limit and to label log lines. Connections never share any
//! other state.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Connection accounting snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManagerStats {
    /// Connections currently open
    pub active_connections: usize,
    /// Connections accepted since server start
    pub total_connections: u64,
}

/// Tracks active and total connection counts
#[derive(Debug, Default)]
pub struct ConnectionManager {
    active: AtomicUsize,
    total: AtomicU64,
}

impl ConnectionManager {
    /// Create a new connection manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a newly accepted connection, returning its id
    pub fn register(&self) -> u64 {
        self.active.fetch_add(1, Ordering::Relaxed);
        self.total.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Deregister a finished connection
    pub fn deregister(&self) {
        self.active.fetch_sub(1, Ordering::Relaxed);
    }

    /// Connections currently open
    pub fn active(&self) -> usize {
        self.active.load(Ordering::Relaxed)
    }

    /// Snapshot of the counters
    pub fn stats(&self) -> ManagerStats {
        ManagerStats {
            active_connections: self.active.load(Ordering::Relaxed),
            total_connections: self.total.load(Ordering::Relaxed),
        }
    }
}
