//! Bounded background polling for an externally created resource.
//!
//! There is no push channel that tells us "the PR you just opened in the
//! browser now exists", so we poll: capture the ids that existed before the
//! side effect, refetch on an interval, and stop on the first unknown id or
//! after `max_attempts` ticks (silent give-up).
//!
//! The engine is tick-driven rather than timer-owning: the app's event loop
//! calls `due(now)` each tick and spawns the fetch itself, then feeds the
//! result to `apply`. Sessions carry a generation so a new `start` cancels
//! any prior session and a cancelled session's late response is inert.

use std::collections::HashSet;
use std::hash::Hash;
use std::time::{Duration, Instant};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 24;
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);

/// Result of feeding a completed fetch into the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome<I> {
    /// Response belongs to a cancelled or superseded session; ignore it.
    Stale,
    /// Fetch applied, nothing new yet; keep polling.
    NoNewItem,
    /// A previously unknown item appeared. The session is stopped.
    Found(I),
}

#[derive(Debug)]
struct Session<I> {
    generation: u64,
    attempts: u32,
    max_attempts: u32,
    interval: Duration,
    next_due: Instant,
    known: HashSet<I>,
}

#[derive(Debug)]
pub struct PollingEngine<I> {
    session: Option<Session<I>>,
    generation: u64,
}

impl<I: Copy + Eq + Hash> PollingEngine<I> {
    pub fn new() -> Self {
        Self {
            session: None,
            generation: 0,
        }
    }

    /// Start a session, cancelling any session already running. Returns the
    /// generation tag the caller must attach to fetch results.
    pub fn start(
        &mut self,
        known: HashSet<I>,
        max_attempts: u32,
        interval: Duration,
        now: Instant,
    ) -> u64 {
        self.generation += 1;
        self.session = Some(Session {
            generation: self.generation,
            attempts: 0,
            max_attempts,
            interval,
            // First fetch fires one interval after start, like a repeating timer.
            next_due: now + interval,
            known,
        });
        self.generation
    }

    /// Cancel the current session. Idempotent; a no-op when idle.
    pub fn stop(&mut self) {
        self.session = None;
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Called on every loop tick. Returns the session generation when a
    /// fetch should fire now. The attempt is consumed here, so a fetch whose
    /// result never comes back (or fails) still counts toward the budget.
    pub fn due(&mut self, now: Instant) -> Option<u64> {
        let session = self.session.as_mut()?;
        if now < session.next_due {
            return None;
        }
        session.attempts += 1;
        if session.attempts > session.max_attempts {
            // Bounded give-up: no callback, no error surfaced.
            self.session = None;
            return None;
        }
        session.next_due = now + session.interval;
        Some(session.generation)
    }

    /// Feed a successful fetch back in. Returns `Found` (and stops the
    /// session) for the first id not in the known set captured at `start`.
    pub fn apply(&mut self, generation: u64, ids: &[I]) -> PollOutcome<I> {
        let Some(session) = self.session.as_ref() else {
            return PollOutcome::Stale;
        };
        if session.generation != generation {
            return PollOutcome::Stale;
        }
        match ids.iter().find(|id| !session.known.contains(id)) {
            Some(&id) => {
                self.session = None;
                PollOutcome::Found(id)
            }
            None => PollOutcome::NoNewItem,
        }
    }
}

impl<I: Copy + Eq + Hash> Default for PollingEngine<I> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const TICK: Duration = Duration::from_secs(5);

    fn engine_with(known: &[u64], max_attempts: u32, now: Instant) -> (PollingEngine<u64>, u64) {
        let mut engine = PollingEngine::new();
        let generation = engine.start(known.iter().copied().collect(), max_attempts, TICK, now);
        (engine, generation)
    }

    #[test]
    fn exhausts_attempts_without_finding_anything() {
        let now = Instant::now();
        let (mut engine, generation) = engine_with(&[42, 43], 2, now);

        let tick1 = engine.due(now + TICK).expect("first tick fires");
        assert_eq!(engine.apply(tick1, &[42, 43]), PollOutcome::NoNewItem);

        let tick2 = engine.due(now + TICK * 2).expect("second tick fires");
        assert_eq!(engine.apply(tick2, &[42, 43]), PollOutcome::NoNewItem);

        // Third tick exceeds max_attempts: session ends silently.
        assert_eq!(engine.due(now + TICK * 3), None);
        assert!(!engine.is_active());
        assert_eq!(engine.apply(generation, &[44]), PollOutcome::Stale);
    }

    #[test]
    fn finds_new_item_on_first_tick_and_stops() {
        let now = Instant::now();
        let (mut engine, _) = engine_with(&[42], 24, now);

        let tick = engine.due(now + TICK).unwrap();
        assert_eq!(engine.apply(tick, &[42, 44]), PollOutcome::Found(44));
        assert!(!engine.is_active());
        // A duplicate delivery of the same response cannot fire twice.
        assert_eq!(engine.apply(tick, &[42, 44]), PollOutcome::Stale);
    }

    #[test]
    fn zero_max_attempts_never_fetches() {
        let now = Instant::now();
        let (mut engine, _) = engine_with(&[], 0, now);
        assert_eq!(engine.due(now + TICK), None);
        assert!(!engine.is_active());
    }

    #[test]
    fn stop_is_idempotent() {
        let now = Instant::now();
        let mut engine: PollingEngine<u64> = PollingEngine::new();
        engine.stop();
        engine.stop();
        assert!(!engine.is_active());

        engine.start(HashSet::new(), 24, TICK, now);
        engine.stop();
        engine.stop();
        assert!(!engine.is_active());
    }

    #[test]
    fn restart_cancels_previous_session() {
        let now = Instant::now();
        let (mut engine, old_generation) = engine_with(&[1], 24, now);
        let new_generation = engine.start([1].into_iter().collect(), 24, TICK, now);
        assert_ne!(old_generation, new_generation);

        // Late response from the first session is ignored even though it
        // carries an unknown id.
        assert_eq!(engine.apply(old_generation, &[2]), PollOutcome::Stale);
        assert!(engine.is_active());

        let tick = engine.due(now + TICK).unwrap();
        assert_eq!(tick, new_generation);
        assert_eq!(engine.apply(tick, &[2]), PollOutcome::Found(2));
    }

    #[test]
    fn respects_interval_between_ticks() {
        let now = Instant::now();
        let (mut engine, _) = engine_with(&[1], 24, now);
        assert_eq!(engine.due(now), None);
        assert_eq!(engine.due(now + TICK / 2), None);
        assert!(engine.due(now + TICK).is_some());
        // Next tick is re-armed relative to the fire time.
        assert_eq!(engine.due(now + TICK + TICK / 2), None);
        assert!(engine.due(now + TICK * 2).is_some());
    }

    #[test]
    fn failed_fetch_consumes_its_attempt() {
        // A failure is modelled as a tick whose result never reaches apply.
        let now = Instant::now();
        let (mut engine, _) = engine_with(&[1], 2, now);
        assert!(engine.due(now + TICK).is_some());
        assert!(engine.due(now + TICK * 2).is_some());
        assert_eq!(engine.due(now + TICK * 3), None);
        assert!(!engine.is_active());
    }
}
