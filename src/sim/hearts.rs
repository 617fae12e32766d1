/// Heart Emitter: a slow stream of floating hearts behind the celebration.
///
/// One heart every `interval`, at most `MAX_HEARTS` alive. The emitter owns
/// its repeating timer, so dropping it (or `stop`) ends production.

use std::collections::VecDeque;
use std::time::Duration;

use crate::domain::random::RandomSource;
use super::timer::{TimerId, TimerSet};

pub const MAX_HEARTS: usize = 16;
#[allow(dead_code)]
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(600);

#[derive(Clone, Debug, PartialEq)]
pub struct Heart {
    pub id: u64,
    /// Horizontal position, percent of width.
    pub left_pct: f64,
    /// Seconds before the heart starts rising.
    pub delay: f64,
    /// Nominal glyph size in logical pixels, 16..40.
    pub size_px: f64,
    /// Seconds to float from bottom to top.
    pub rise: f64,
    pub symbol: &'static str,
    /// Emitter clock at spawn.
    pub born_at: Duration,
}

impl Heart {
    /// Vertical progress at `now`: 0.0 = bottom edge, 1.0 = off the top.
    /// `None` while still waiting out its delay.
    pub fn progress(&self, now: Duration) -> Option<f64> {
        let age = now.saturating_sub(self.born_at).as_secs_f64() - self.delay;
        if age < 0.0 {
            None
        } else {
            Some((age / self.rise).min(1.0))
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Spawn;

pub struct HeartEmitter {
    symbols: &'static [&'static str],
    hearts: VecDeque<Heart>,
    timers: TimerSet<Spawn>,
    production: Option<TimerId>,
    next_id: u64,
}

impl HeartEmitter {
    /// Starts producing immediately; the first heart appears after one interval.
    pub fn new(symbols: &'static [&'static str], interval: Duration) -> Self {
        let mut timers = TimerSet::new();
        let production = Some(timers.schedule_repeating(interval, Spawn));
        HeartEmitter {
            symbols,
            hearts: VecDeque::with_capacity(MAX_HEARTS),
            timers,
            production,
            next_id: 0,
        }
    }

    /// Advance the emitter clock; returns ids of hearts spawned.
    pub fn tick<R: RandomSource + ?Sized>(&mut self, dt: Duration, rng: &mut R) -> Vec<u64> {
        let due = self.timers.advance(dt).len();
        let now = self.timers.now();
        (0..due).map(|_| self.spawn(now, rng)).collect()
    }

    fn spawn<R: RandomSource + ?Sized>(&mut self, now: Duration, rng: &mut R) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        let heart = Heart {
            id,
            left_pct: rng.range(0.0, 100.0),
            delay: rng.range(0.0, 2.0),
            size_px: rng.range(16.0, 40.0),
            rise: rng.range(3.0, 6.0),
            symbol: self.symbols[rng.index(self.symbols.len())],
            born_at: now,
        };
        if self.hearts.len() >= MAX_HEARTS {
            self.hearts.pop_front();
        }
        self.hearts.push_back(heart);
        id
    }

    pub fn stop(&mut self) {
        if let Some(id) = self.production.take() {
            self.timers.cancel(id);
        }
    }

    #[allow(dead_code)]
    pub fn is_running(&self) -> bool {
        self.production.map_or(false, |id| self.timers.is_pending(id))
    }

    pub fn now(&self) -> Duration {
        self.timers.now()
    }

    /// Oldest first.
    pub fn hearts(&self) -> impl Iterator<Item = &Heart> {
        self.hearts.iter()
    }

    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.hearts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::random::{session_rng, Scripted};
    use crate::domain::script::DEFAULT;
    use proptest::prelude::*;

    #[test]
    fn spawns_on_cadence() {
        let mut e = HeartEmitter::new(DEFAULT.heart_symbols, DEFAULT_INTERVAL);
        let mut rng = session_rng(Some(1));
        assert!(e.tick(Duration::from_millis(599), &mut rng).is_empty());
        assert_eq!(e.tick(Duration::from_millis(1), &mut rng), vec![0]);
        assert_eq!(e.tick(Duration::from_millis(1200), &mut rng), vec![1, 2]);
        assert_eq!(e.len(), 3);
    }

    #[test]
    fn keeps_only_the_last_sixteen() {
        let mut e = HeartEmitter::new(DEFAULT.heart_symbols, DEFAULT_INTERVAL);
        let mut rng = session_rng(Some(2));
        e.tick(Duration::from_millis(600 * 20), &mut rng);
        assert_eq!(e.len(), MAX_HEARTS);
        let ids: Vec<u64> = e.hearts().map(|h| h.id).collect();
        assert_eq!(ids.first(), Some(&4));
        assert_eq!(ids.last(), Some(&19));
    }

    #[test]
    fn attributes_follow_samples() {
        let mut e = HeartEmitter::new(DEFAULT.heart_symbols, DEFAULT_INTERVAL);
        let mut rng = Scripted::new(&[0.5, 0.25, 0.0, 0.5, 0.99]);
        e.tick(DEFAULT_INTERVAL, &mut rng);
        let h = e.hearts().next().unwrap();
        assert_eq!(h.left_pct, 50.0);
        assert_eq!(h.delay, 0.5);
        assert_eq!(h.size_px, 16.0);
        assert_eq!(h.rise, 4.5);
        assert_eq!(h.symbol, "💘");
        assert_eq!(h.born_at, DEFAULT_INTERVAL);
    }

    #[test]
    fn progress_waits_for_delay() {
        let h = Heart {
            id: 0,
            left_pct: 0.0,
            delay: 1.0,
            size_px: 20.0,
            rise: 4.0,
            symbol: "💖",
            born_at: Duration::from_secs(1),
        };
        assert_eq!(h.progress(Duration::from_millis(1500)), None);
        assert_eq!(h.progress(Duration::from_secs(4)), Some(0.5));
        assert_eq!(h.progress(Duration::from_secs(60)), Some(1.0));
    }

    #[test]
    fn stop_ends_production() {
        let mut e = HeartEmitter::new(DEFAULT.heart_symbols, DEFAULT_INTERVAL);
        let mut rng = session_rng(Some(4));
        assert!(e.is_running());
        e.stop();
        assert!(!e.is_running());
        assert!(e.tick(Duration::from_secs(10), &mut rng).is_empty());
        assert_eq!(e.len(), 0);
    }

    proptest! {
        #[test]
        fn container_never_exceeds_bound(steps in proptest::collection::vec(0u64..5000, 1..50), seed in any::<u64>()) {
            let mut e = HeartEmitter::new(DEFAULT.heart_symbols, DEFAULT_INTERVAL);
            let mut rng = session_rng(Some(seed));
            for s in steps {
                e.tick(Duration::from_millis(s), &mut rng);
                prop_assert!(e.len() <= MAX_HEARTS);
            }
        }
    }
}
