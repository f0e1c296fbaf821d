//! Sequential reveal gate for grids of previews.
//!
//! Fetches may finish in any order, but items are revealed strictly by index
//! so the grid fills in reading order. The gate is a single integer cursor:
//! every index below it is revealed, the index at it is the one being waited on.

use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, trace};

/// Per-item view of the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadSlot {
    pub index: usize,
    pub revealed: bool,
}

struct GateState {
    cursor: usize,
    fetched: Vec<bool>,
}

pub struct RevealGate {
    state: Mutex<GateState>,
    cursor_tx: watch::Sender<usize>,
}

impl RevealGate {
    pub fn new(len: usize) -> Self {
        let (cursor_tx, _) = watch::channel(0);
        Self {
            state: Mutex::new(GateState {
                cursor: 0,
                fetched: vec![false; len],
            }),
            cursor_tx,
        }
    }

    pub fn len(&self) -> usize {
        self.state.lock().fetched.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Index of the next item to reveal
    pub fn cursor(&self) -> usize {
        self.state.lock().cursor
    }

    /// Whether item `index` may begin loading.
    pub fn is_admitted(&self, index: usize) -> bool {
        index <= self.cursor()
    }

    /// Wait until item `index` may begin loading.
    pub async fn wait_admitted(&self, index: usize) {
        let mut rx = self.cursor_tx.subscribe();
        // The sender lives as long as `self`, so this only returns once admitted.
        let _ = rx.wait_for(|cursor| index <= *cursor).await;
    }

    pub fn is_revealed(&self, index: usize) -> bool {
        index < self.cursor()
    }

    /// Whether every item has been revealed
    pub fn is_finished(&self) -> bool {
        let state = self.state.lock();
        state.cursor >= state.fetched.len()
    }

    /// Record that item `index` finished loading (or failed; either way it
    /// must not hold up the rest of the grid).
    ///
    /// Returns the indices revealed as a result, in order. Out-of-range and
    /// repeated completions reveal nothing.
    pub fn complete(&self, index: usize) -> Vec<usize> {
        let mut state = self.state.lock();
        match state.fetched.get_mut(index) {
            Some(done) if !*done => *done = true,
            _ => {
                trace!("Ignoring duplicate or unknown completion for slot {}", index);
                return Vec::new();
            }
        }

        let mut revealed = Vec::new();
        while state.fetched.get(state.cursor).copied().unwrap_or(false) {
            revealed.push(state.cursor);
            state.cursor += 1;
        }

        if !revealed.is_empty() {
            debug!("Revealed slots {:?}, next is {}", revealed, state.cursor);
            self.cursor_tx.send_replace(state.cursor);
        }
        revealed
    }

    /// Move the cursor past `from` without waiting for it to load. Only the
    /// item at the cursor can advance it; anything else is a no-op.
    pub fn advance(&self, from: usize) -> bool {
        let mut state = self.state.lock();
        if from != state.cursor || from >= state.fetched.len() {
            return false;
        }
        state.fetched[from] = true;
        state.cursor += 1;
        while state.fetched.get(state.cursor).copied().unwrap_or(false) {
            state.cursor += 1;
        }
        self.cursor_tx.send_replace(state.cursor);
        true
    }

    pub fn slots(&self) -> Vec<LoadSlot> {
        let state = self.state.lock();
        (0..state.fetched.len())
            .map(|index| LoadSlot {
                index,
                revealed: index < state.cursor,
            })
            .collect()
    }
}
