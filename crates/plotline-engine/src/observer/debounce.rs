use std::time::{Duration, Instant};

/// Generation-counted debounce timer.
///
/// Every [`schedule`](Self::schedule) bumps the generation and pushes the
/// deadline out by the quiet interval, so only the most recent request can
/// ever fire. Hosts that run their own timers capture the returned
/// generation and [`claim`](Self::claim) it when the timer goes off; polling
/// hosts check [`due`](Self::due) first.
#[derive(Debug, Clone)]
pub struct Debouncer {
    quiet: Duration,
    generation: u64,
    due: Option<Instant>,
}

impl Debouncer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            generation: 0,
            due: None,
        }
    }

    pub fn quiet(&self) -> Duration {
        self.quiet
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.due
    }

    pub fn is_pending(&self) -> bool {
        self.due.is_some()
    }

    /// Supersede any pending request with one due `quiet` after `now`
    pub fn schedule(&mut self, now: Instant) -> u64 {
        self.generation += 1;
        self.due = Some(now + self.quiet);
        self.generation
    }

    /// Drop the pending request; a timer holding its generation will find it
    /// stale
    pub fn cancel(&mut self) {
        self.generation += 1;
        self.due = None;
    }

    /// Run the pending request again at the next opportunity, keeping its
    /// generation
    pub fn retry(&mut self, now: Instant) {
        self.due = Some(now);
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.due.is_some() && generation == self.generation
    }

    /// Take the pending request if `generation` is still the latest one
    pub fn claim(&mut self, generation: u64) -> bool {
        if !self.is_current(generation) {
            return false;
        }
        self.due = None;
        true
    }

    /// Generation of the pending request if its quiet interval has elapsed
    /// by `now`; the request stays pending until claimed
    pub fn due(&self, now: Instant) -> Option<u64> {
        match self.due {
            Some(due) if now >= due => Some(self.generation),
            _ => None,
        }
    }
}
