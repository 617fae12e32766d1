/// Scoped timers on a simulated clock.
///
/// A `TimerSet` belongs to exactly one screen component. The component
/// advances it with the real frame time and reacts to the cues that come
/// back. Nothing outlives its owner: `cancel_all` on teardown, and dropping
/// the owner drops every pending timer with it.
///
/// Ordering: cues come back sorted by due time; ties resolve in scheduling
/// order. A repeating timer that falls several periods behind fires once
/// per missed period.

use std::time::Duration;

/// Repeating timers never tick faster than this.
const MIN_PERIOD: Duration = Duration::from_millis(1);

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct TimerId(u64);

#[derive(Clone, Debug)]
struct Entry<C> {
    id: TimerId,
    due: Duration,
    period: Option<Duration>,
    cue: C,
}

#[derive(Clone, Debug)]
pub struct TimerSet<C> {
    now: Duration,
    next_id: u64,
    entries: Vec<Entry<C>>,
}

impl<C: Clone> TimerSet<C> {
    pub fn new() -> Self {
        TimerSet { now: Duration::ZERO, next_id: 0, entries: Vec::new() }
    }

    /// Time elapsed on this set's clock.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Fire `cue` once, `delay` from now.
    pub fn schedule_once(&mut self, delay: Duration, cue: C) -> TimerId {
        self.insert(delay, None, cue)
    }

    /// Fire `cue` every `period`, first one `period` from now.
    pub fn schedule_repeating(&mut self, period: Duration, cue: C) -> TimerId {
        let period = period.max(MIN_PERIOD);
        self.insert(period, Some(period), cue)
    }

    /// Returns false if the timer already fired (one-shot) or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    pub fn cancel_all(&mut self) {
        self.entries.clear();
    }

    #[allow(dead_code)]
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    pub fn pending(&self) -> usize {
        self.entries.len()
    }

    /// Move the clock forward by `dt`, returning every cue that came due.
    pub fn advance(&mut self, dt: Duration) -> Vec<C> {
        let target = self.now + dt;
        let mut fired = Vec::new();

        loop {
            let next = self.entries.iter()
                .enumerate()
                .filter(|(_, e)| e.due <= target)
                .min_by_key(|(_, e)| (e.due, e.id.0))
                .map(|(i, _)| i);
            let idx = match next {
                Some(i) => i,
                None => break,
            };

            let entry = &mut self.entries[idx];
            self.now = entry.due;
            fired.push(entry.cue.clone());
            match entry.period {
                Some(p) => entry.due += p,
                None => {
                    self.entries.remove(idx);
                }
            }
        }

        self.now = target;
        fired
    }

    fn insert(&mut self, delay: Duration, period: Option<Duration>, cue: C) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry { id, due: self.now + delay, period, cue });
        id
    }
}

impl<C: Clone> Default for TimerSet<C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn one_shot_fires_once_at_due_time() {
        let mut t = TimerSet::new();
        t.schedule_once(ms(1500), "accept");
        assert!(t.advance(ms(1499)).is_empty());
        assert_eq!(t.advance(ms(1)), vec!["accept"]);
        assert!(t.advance(ms(10_000)).is_empty());
        assert_eq!(t.pending(), 0);
    }

    #[test]
    fn repeating_fires_every_period_with_catch_up() {
        let mut t = TimerSet::new();
        t.schedule_repeating(ms(600), 'h');
        assert_eq!(t.advance(ms(599)).len(), 0);
        assert_eq!(t.advance(ms(1)).len(), 1);
        // Fell behind by three periods.
        assert_eq!(t.advance(ms(1800)).len(), 3);
        assert_eq!(t.pending(), 1);
    }

    #[test]
    fn cues_come_back_in_due_order() {
        let mut t = TimerSet::new();
        t.schedule_once(ms(1200), 3);
        t.schedule_once(ms(500), 1);
        t.schedule_once(ms(700), 2);
        t.schedule_once(ms(700), 22);
        assert_eq!(t.advance(ms(2000)), vec![1, 2, 22, 3]);
    }

    #[test]
    fn cancelled_timer_never_fires() {
        let mut t = TimerSet::new();
        let a = t.schedule_once(ms(100), 'a');
        let b = t.schedule_repeating(ms(100), 'b');
        assert!(t.cancel(a));
        assert!(!t.cancel(a));
        assert!(t.is_pending(b));
        t.cancel_all();
        assert!(t.advance(ms(1000)).is_empty());
        assert!(!t.is_pending(b));
    }

    #[test]
    fn clock_tracks_advances() {
        let mut t: TimerSet<()> = TimerSet::new();
        t.advance(ms(250));
        t.advance(ms(250));
        assert_eq!(t.now(), ms(500));
        // Scheduling is relative to the current clock.
        let mut t2 = TimerSet::new();
        t2.advance(ms(1000));
        t2.schedule_once(ms(10), ());
        assert!(t2.advance(ms(9)).is_empty());
        assert_eq!(t2.advance(ms(1)).len(), 1);
    }

    #[test]
    fn zero_period_is_clamped() {
        let mut t = TimerSet::new();
        t.schedule_repeating(Duration::ZERO, ());
        assert_eq!(t.advance(ms(5)).len(), 5);
    }

    proptest! {
        #[test]
        fn step_size_does_not_change_what_fires(steps in proptest::collection::vec(0u64..400, 1..40)) {
            let total: u64 = steps.iter().sum();
            let mut fine = TimerSet::new();
            let mut coarse = TimerSet::new();
            for t in [&mut fine, &mut coarse] {
                t.schedule_once(ms(500), 0u8);
                t.schedule_once(ms(700), 1u8);
                t.schedule_repeating(ms(2000), 2u8);
            }
            let mut a = Vec::new();
            for s in &steps {
                a.extend(fine.advance(ms(*s)));
            }
            let b = coarse.advance(ms(total));
            prop_assert_eq!(a, b);
        }
    }
}
