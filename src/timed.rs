use std::time::{Duration, Instant};

/// A value that lapses at a scheduled instant
///
/// Used for transient indicators ("Copied", "Saved!") and delayed actions. Time is passed
/// in by the caller so the UI loop and tests drive it the same way.
#[derive(Debug, Clone)]
pub struct TimedState<T> {
    slot: Option<(T, Instant)>,
}

impl<T> Default for TimedState<T> {
    fn default() -> Self {
        Self { slot: None }
    }
}

impl<T> TimedState<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace any current value; it lapses `ttl` after `now`
    pub fn set(&mut self, value: T, ttl: Duration, now: Instant) {
        self.slot = Some((value, now + ttl));
    }

    /// The value, if it has not lapsed yet
    pub fn get(&self, now: Instant) -> Option<&T> {
        match &self.slot {
            Some((value, deadline)) if now < *deadline => Some(value),
            _ => None,
        }
    }

    /// Take the value once its deadline has passed
    pub fn expire(&mut self, now: Instant) -> Option<T> {
        let due = matches!(&self.slot, Some((_, deadline)) if now >= *deadline);
        if due {
            self.take()
        } else {
            None
        }
    }

    /// Take the value regardless of its deadline
    pub fn take(&mut self) -> Option<T> {
        self.slot.take().map(|(value, _)| value)
    }

    pub fn is_scheduled(&self) -> bool {
        self.slot.is_some()
    }
}
