//! Wall-clock view and the cancellable offer-deadline queue.
//!
//! The core never reads the system clock; the transport passes `now_ms`
//! (epoch milliseconds) into every entry point and this resource carries it
//! to the systems. Offer expiry deadlines live in a min-heap keyed by trip
//! id; cancellation is a tombstone consumed lazily when the entry surfaces.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

use bevy_ecs::prelude::Resource;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Deadline {
    fire_at_ms: u64,
    trip_id: String,
}

impl Ord for Deadline {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering to make BinaryHeap a min-heap by deadline.
        other
            .fire_at_ms
            .cmp(&self.fire_at_ms)
            .then_with(|| other.trip_id.cmp(&self.trip_id))
    }
}

impl PartialOrd for Deadline {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Default, Resource)]
pub struct DispatchClock {
    now_ms: u64,
    deadlines: BinaryHeap<Deadline>,
    cancelled: HashSet<String>,
}

impl DispatchClock {
    /// Current time as of the event being handled (epoch ms).
    pub fn now(&self) -> u64 {
        self.now_ms
    }

    /// Moves the clock forward. Time never goes backwards even if the
    /// transport's reads race.
    pub fn advance_to(&mut self, now_ms: u64) {
        self.now_ms = self.now_ms.max(now_ms);
    }

    /// Schedules the expiry deadline for an offer. Trip ids are unique per
    /// offer; scheduling the same id twice is not supported.
    pub fn schedule_expiry(&mut self, trip_id: &str, fire_at_ms: u64) {
        self.deadlines.push(Deadline {
            fire_at_ms,
            trip_id: trip_id.to_string(),
        });
    }

    /// Cancels a pending deadline; a fire for this trip id will not surface.
    pub fn cancel(&mut self, trip_id: &str) {
        self.cancelled.insert(trip_id.to_string());
    }

    /// Earliest live deadline, for the transport's timer sleep.
    pub fn next_deadline(&mut self) -> Option<u64> {
        while let Some(top) = self.deadlines.peek() {
            if !self.cancelled.contains(&top.trip_id) {
                return Some(top.fire_at_ms);
            }
            if let Some(dropped) = self.deadlines.pop() {
                self.cancelled.remove(&dropped.trip_id);
            }
        }
        None
    }

    /// Pops the next deadline at or before `now_ms`, skipping cancelled
    /// entries. Returns the trip id that is due.
    pub fn pop_due(&mut self, now_ms: u64) -> Option<String> {
        while let Some(top) = self.deadlines.peek() {
            if top.fire_at_ms > now_ms {
                return None;
            }
            let due = self.deadlines.pop()?;
            if !self.cancelled.remove(&due.trip_id) {
                return Some(due.trip_id);
            }
        }
        None
    }
}
