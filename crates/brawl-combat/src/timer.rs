//! Deferred callbacks keyed by owner and fire time.
//!
//! `TimerWheel` replaces name-based delayed invocation: callers schedule a
//! payload for an owner at an absolute time and poll the wheel once per
//! tick. Timers cannot be cancelled; every scheduled payload is eventually
//! handed back by `drain_due`.

use brawl_common::EntityId;

/// Identifier of a scheduled timer, unique within one wheel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl TimerId {
    /// Returns the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// A timer that has come due.
#[derive(Debug, Clone, PartialEq)]
pub struct Fired<T> {
    /// Timer identifier.
    pub id: TimerId,
    /// Owner the timer was scheduled for.
    pub owner: EntityId,
    /// Scheduled fire time.
    pub fire_at: f32,
    /// Payload supplied at scheduling time.
    pub payload: T,
}

#[derive(Debug, Clone)]
struct Entry<T> {
    id: TimerId,
    owner: EntityId,
    fire_at: f32,
    payload: T,
}

/// Ordered queue of one-shot timers.
///
/// Entries stay sorted by `(fire_at, id)`, so timers with equal fire times
/// come out in scheduling order.
#[derive(Debug, Clone)]
pub struct TimerWheel<T> {
    entries: Vec<Entry<T>>,
    next_id: u64,
}

impl<T> Default for TimerWheel<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
        }
    }
}

impl<T> TimerWheel<T> {
    /// Create an empty wheel.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `payload` to fire for `owner` once `now >= fire_at`.
    pub fn schedule(&mut self, owner: EntityId, fire_at: f32, payload: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;

        // Ties keep insertion order because new ids are always larger.
        let pos = self.entries.partition_point(|e| e.fire_at <= fire_at);
        self.entries.insert(
            pos,
            Entry {
                id,
                owner,
                fire_at,
                payload,
            },
        );
        id
    }

    /// Remove and return every timer whose fire time has elapsed by `now`.
    pub fn drain_due(&mut self, now: f32) -> Vec<Fired<T>> {
        let split = self.entries.partition_point(|e| e.fire_at <= now);
        self.entries
            .drain(..split)
            .map(|e| Fired {
                id: e.id,
                owner: e.owner,
                fire_at: e.fire_at,
                payload: e.payload,
            })
            .collect()
    }

    /// Earliest pending fire time.
    #[must_use]
    pub fn next_fire_at(&self) -> Option<f32> {
        self.entries.first().map(|e| e.fire_at)
    }

    /// Number of pending timers for one owner.
    #[must_use]
    pub fn pending_for(&self, owner: EntityId) -> usize {
        self.entries.iter().filter(|e| e.owner == owner).count()
    }

    /// Number of pending timers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no timers are pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
