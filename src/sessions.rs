//! Bounded store of per-client window sessions.
//!
//! Sessions idle for longer than the configured timeout are dropped when a
//! new one opens; beyond that, the least recently used ones go first so the
//! store never holds more than `max_sessions` entries.

use crate::core::WindowState;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use uuid::Uuid;

/// Default cap on live sessions.
pub const DEFAULT_MAX_SESSIONS: usize = 1024;

/// Default idle time before a session may be evicted.
pub const DEFAULT_SESSION_IDLE_SECS: u64 = 30 * 60;

const MAX_IDLE_SECS: u64 = 10 * 365 * 24 * 60 * 60;

#[derive(Debug, Clone)]
struct SessionEntry {
    state: WindowState,
    last_touched: DateTime<Utc>,
    /// Position in use order; breaks ties between equal timestamps.
    tick: u64,
}

#[derive(Debug)]
pub struct SessionStore {
    entries: HashMap<Uuid, SessionEntry>,
    max_sessions: usize,
    idle: Duration,
    ticks: u64,
}

impl SessionStore {
    /// Store holding at most `max_sessions` (at least one) sessions.
    pub fn new(max_sessions: usize, idle_secs: u64) -> Self {
        Self {
            entries: HashMap::new(),
            max_sessions: max_sessions.max(1),
            idle: Duration::seconds(idle_secs.min(MAX_IDLE_SECS) as i64),
            ticks: 0,
        }
    }

    fn next_tick(&mut self) -> u64 {
        self.ticks += 1;
        self.ticks
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: &Uuid) -> bool {
        self.entries.contains_key(id)
    }

    /// Add a session, evicting others first to make room. Returns how many
    /// sessions were evicted.
    pub fn open(&mut self, id: Uuid, state: WindowState, now: DateTime<Utc>) -> usize {
        let evicted = self.evict(now);
        let tick = self.next_tick();
        self.entries.insert(
            id,
            SessionEntry {
                state,
                last_touched: now,
                tick,
            },
        );
        evicted
    }

    /// Current state of a session, marking it as used.
    pub fn get(&mut self, id: &Uuid, now: DateTime<Utc>) -> Option<WindowState> {
        let tick = self.next_tick();
        let entry = self.entries.get_mut(id)?;
        entry.last_touched = now;
        entry.tick = tick;
        Some(entry.state.clone())
    }

    /// Replace a session's state with `transition(state)` and return the
    /// new state.
    pub fn update(
        &mut self,
        id: &Uuid,
        now: DateTime<Utc>,
        transition: impl FnOnce(WindowState) -> WindowState,
    ) -> Option<WindowState> {
        let tick = self.next_tick();
        let entry = self.entries.get_mut(id)?;
        let current = std::mem::take(&mut entry.state);
        entry.state = transition(current);
        entry.last_touched = now;
        entry.tick = tick;
        Some(entry.state.clone())
    }

    /// Remove a session. Returns whether it existed.
    pub fn close(&mut self, id: &Uuid) -> bool {
        self.entries.remove(id).is_some()
    }

    fn evict(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        let idle = self.idle;
        self.entries.retain(|_, entry| now - entry.last_touched < idle);

        while self.entries.len() >= self.max_sessions {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.tick)
                .map(|(id, _)| *id);
            match oldest {
                Some(id) => {
                    self.entries.remove(&id);
                }
                None => break,
            }
        }

        let evicted = before - self.entries.len();
        if evicted > 0 {
            tracing::debug!(evicted, remaining = self.entries.len(), "evicted window sessions");
        }
        evicted
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SESSIONS, DEFAULT_SESSION_IDLE_SECS)
    }
}
