//! Timer scheduling for round phases.
//!
//! The engine never owns a thread or a runtime. Phase timers are entries in a
//! [`TimerQueue`] keyed by a [`TimerHandle`]; the host tells the engine what
//! time it is and the engine pops whatever is due.
//!
//! ## Timers
//!
//! 1. **Countdown** - recurring while betting, decrements the countdown
//! 2. **Growth** - recurring while running, advances the multiplier
//! 3. **Reset** - one-shot after a crash, returns to betting
//!
//! At most one of these is live at a time. Phase exits cancel the live handle
//! before scheduling the next one, so two tickers can never both apply crash or
//! settlement logic.
//!
//! ## Deterministic Clock
//!
//! Recurring timers fire on their own deadline grid (`due + interval`), not on
//! the time the host happened to poll. A host that wakes late replays every
//! missed tick with its original timestamp, so the same schedule always yields
//! the same curve.
//!
//! ## Usage
//!
//! ```rust
//! use crash_execution::round_scheduler::{Scheduler, Timer, TimerQueue};
//!
//! let mut timers = TimerQueue::default();
//! let handle = timers.schedule_recurring(0, 500, Timer::Countdown);
//! assert_eq!(timers.next_deadline(), Some(500));
//!
//! let fired = timers.pop_due(1_000).unwrap();
//! assert_eq!((fired.handle, fired.at_ms), (handle, 500));
//! assert!(timers.cancel(handle));
//! assert!(timers.pop_due(1_000).is_none());
//! ```

use std::collections::BTreeMap;

/// What a timer does when it fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Timer {
    Countdown,
    Growth,
    Reset,
}

/// Cancellation handle returned by [`Scheduler`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerHandle(u64);

/// A timer that came due.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Fired {
    pub handle: TimerHandle,
    pub timer: Timer,
    /// Scheduled deadline (not the poll time).
    pub at_ms: u64,
}

/// Recurring and one-shot timers with explicit cancellation.
pub trait Scheduler {
    /// Fire `timer` every `interval_ms`, first at `now_ms + interval_ms`.
    fn schedule_recurring(&mut self, now_ms: u64, interval_ms: u64, timer: Timer) -> TimerHandle;

    /// Fire `timer` once at `now_ms + delay_ms`.
    fn schedule_once(&mut self, now_ms: u64, delay_ms: u64, timer: Timer) -> TimerHandle;

    /// Cancel a timer. Returns `false` if it already fired (one-shot) or was cancelled.
    fn cancel(&mut self, handle: TimerHandle) -> bool;
}

#[derive(Clone, Copy, Debug)]
struct Entry {
    timer: Timer,
    due_ms: u64,
    interval_ms: Option<u64>,
}

#[derive(Clone, Debug, Default)]
pub struct TimerQueue {
    next_id: u64,
    entries: BTreeMap<TimerHandle, Entry>,
}

impl TimerQueue {
    fn insert(&mut self, entry: Entry) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        self.entries.insert(handle, entry);
        handle
    }

    /// Earliest deadline across live timers.
    pub fn next_deadline(&self) -> Option<u64> {
        self.entries.values().map(|entry| entry.due_ms).min()
    }

    /// Pop the earliest timer due at or before `now_ms`.
    ///
    /// Ties go to the older handle. Recurring timers are re-armed one interval
    /// after the deadline they fired for; one-shot timers are removed.
    pub fn pop_due(&mut self, now_ms: u64) -> Option<Fired> {
        let (handle, entry) = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.due_ms <= now_ms)
            .min_by_key(|(handle, entry)| (entry.due_ms, **handle))
            .map(|(handle, entry)| (*handle, *entry))?;
        let fired = Fired {
            handle,
            timer: entry.timer,
            at_ms: entry.due_ms,
        };
        match entry.interval_ms {
            Some(interval) => {
                if let Some(entry) = self.entries.get_mut(&handle) {
                    entry.due_ms = entry.due_ms.saturating_add(interval);
                }
            }
            None => {
                self.entries.remove(&handle);
            }
        }
        Some(fired)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Scheduler for TimerQueue {
    fn schedule_recurring(&mut self, now_ms: u64, interval_ms: u64, timer: Timer) -> TimerHandle {
        // A zero interval would re-fire forever within one poll.
        let interval_ms = interval_ms.max(1);
        self.insert(Entry {
            timer,
            due_ms: now_ms.saturating_add(interval_ms),
            interval_ms: Some(interval_ms),
        })
    }

    fn schedule_once(&mut self, now_ms: u64, delay_ms: u64, timer: Timer) -> TimerHandle {
        self.insert(Entry {
            timer,
            due_ms: now_ms.saturating_add(delay_ms),
            interval_ms: None,
        })
    }

    fn cancel(&mut self, handle: TimerHandle) -> bool {
        self.entries.remove(&handle).is_some()
    }
}
