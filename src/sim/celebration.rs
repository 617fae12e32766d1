/// Celebration screen: confetti choreography, floating hearts, and the
/// "love_terminal" panel.
///
/// Burst schedule after `start`:
///   0 ms     grand burst
///   500 ms   left flank
///   700 ms   right flank
///   1200 ms  grand burst again
///   every drizzle interval (2 s): small burst from a random spot
///
/// The panel reveals joke `i` at `JOKE_LEAD + i * JOKE_STAGGER`, then the
/// sign-off one stagger after the last joke.

use std::time::Duration;

use tracing::debug;

use crate::config::TimingConfig;
use crate::domain::decor::{self, Decoration};
use crate::domain::evasion::Viewport;
use crate::domain::random::RandomSource;
use crate::domain::script::Script;
use super::confetti::{Burst, ConfettiField};
use super::event::CardEvent;
use super::hearts::HeartEmitter;
use super::timer::TimerSet;

pub const LEFT_FLANK_AT: Duration = Duration::from_millis(500);
pub const RIGHT_FLANK_AT: Duration = Duration::from_millis(700);
pub const ENCORE_AT: Duration = Duration::from_millis(1200);

pub const JOKE_LEAD: Duration = Duration::from_millis(1200);
pub const JOKE_STAGGER: Duration = Duration::from_millis(300);

const SPARKLE_COUNT: usize = 6;
const SPARKLE_STAGGER: f64 = 0.4;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Cue {
    LeftFlank,
    RightFlank,
    Encore,
    Drizzle,
}

/// How many of `total` staggered lines are visible after `elapsed`.
pub fn revealed(elapsed: Duration, total: usize) -> usize {
    if elapsed < JOKE_LEAD {
        return 0;
    }
    let since = (elapsed - JOKE_LEAD).as_millis() / JOKE_STAGGER.as_millis();
    (since as usize + 1).min(total)
}

pub struct CelebrationScreen {
    script: &'static Script,
    timers: TimerSet<Cue>,
    hearts: HeartEmitter,
    confetti: ConfettiField,
    sparkles: Vec<Decoration>,
    drizzle_interval: Duration,
    started: bool,
}

impl CelebrationScreen {
    pub fn new<R: RandomSource + ?Sized>(
        script: &'static Script,
        timing: &TimingConfig,
        confetti_cap: usize,
        rng: &mut R,
    ) -> Self {
        CelebrationScreen {
            script,
            timers: TimerSet::new(),
            hearts: HeartEmitter::new(script.heart_symbols, timing.heart_interval),
            confetti: ConfettiField::new(confetti_cap),
            sparkles: decor::scatter(SPARKLE_COUNT, &["✨"], (10.0, 90.0), SPARKLE_STAGGER, rng),
            drizzle_interval: timing.drizzle_interval,
            started: false,
        }
    }

    /// Fire the opening burst and arm the rest of the show. Runs once.
    pub fn start<R: RandomSource + ?Sized>(&mut self, view: Viewport, rng: &mut R) -> Vec<CardEvent> {
        if self.started {
            return vec![];
        }
        self.started = true;

        self.timers.schedule_once(LEFT_FLANK_AT, Cue::LeftFlank);
        self.timers.schedule_once(RIGHT_FLANK_AT, Cue::RightFlank);
        self.timers.schedule_once(ENCORE_AT, Cue::Encore);
        self.timers.schedule_repeating(self.drizzle_interval, Cue::Drizzle);

        vec![self.fire(Burst::grand(), view, rng)]
    }

    pub fn tick<R: RandomSource + ?Sized>(&mut self, dt: Duration, view: Viewport, rng: &mut R) -> Vec<CardEvent> {
        let mut events = Vec::new();
        for cue in self.timers.advance(dt) {
            let burst = match cue {
                Cue::LeftFlank => Burst::left_flank(),
                Cue::RightFlank => Burst::right_flank(),
                Cue::Encore => Burst::grand(),
                Cue::Drizzle => Burst::drizzle(rng),
            };
            events.push(self.fire(burst, view, rng));
        }
        events.extend(
            self.hearts.tick(dt, rng)
                .into_iter()
                .map(|id| CardEvent::HeartSpawned { id }),
        );
        self.confetti.update(dt, view);
        events
    }

    /// Stop every burst and the heart stream.
    pub fn teardown(&mut self) {
        debug!(pending = self.timers.pending(), "celebration torn down");
        self.timers.cancel_all();
        self.hearts.stop();
        self.confetti.clear();
    }

    fn fire<R: RandomSource + ?Sized>(&mut self, burst: Burst, view: Viewport, rng: &mut R) -> CardEvent {
        self.confetti.emit(&burst, view, rng);
        CardEvent::Confetti(burst.kind)
    }

    // ── Queries ──

    pub fn elapsed(&self) -> Duration {
        self.timers.now()
    }

    pub fn jokes(&self) -> &'static [&'static str] {
        self.script.jokes
    }

    pub fn sign_off(&self) -> &'static str {
        self.script.sign_off
    }

    /// Jokes currently revealed.
    pub fn visible_jokes(&self) -> usize {
        revealed(self.elapsed(), self.script.jokes.len())
    }

    pub fn sign_off_visible(&self) -> bool {
        revealed(self.elapsed(), self.script.jokes.len() + 1) > self.script.jokes.len()
    }

    pub fn hearts(&self) -> &HeartEmitter {
        &self.hearts
    }

    pub fn confetti(&self) -> &ConfettiField {
        &self.confetti
    }

    pub fn sparkles(&self) -> &[Decoration] {
        &self.sparkles
    }

    #[allow(dead_code)]
    pub fn pending_timers(&self) -> usize {
        self.timers.pending()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::random::session_rng;
    use crate::domain::script::DEFAULT;
    use crate::sim::confetti::BurstKind;

    const VIEW: Viewport = Viewport { width_px: 1280.0, height_px: 640.0 };

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn bursts(events: &[CardEvent]) -> Vec<BurstKind> {
        events.iter()
            .filter_map(|e| match e {
                CardEvent::Confetti(k) => Some(*k),
                _ => None,
            })
            .collect()
    }

    fn started() -> (CelebrationScreen, Vec<CardEvent>, rand::rngs::StdRng) {
        let mut rng = session_rng(Some(42));
        let mut c = CelebrationScreen::new(&DEFAULT, &TimingConfig::default(), 600, &mut rng);
        let ev = c.start(VIEW, &mut rng);
        (c, ev, rng)
    }

    #[test]
    fn opening_burst_is_immediate() {
        let (c, ev, _) = started();
        assert_eq!(bursts(&ev), vec![BurstKind::Grand]);
        assert_eq!(c.confetti().len(), 150);
        assert_eq!(c.sparkles().len(), 6);
    }

    #[test]
    fn scripted_bursts_land_on_schedule() {
        let (mut c, _, mut rng) = started();
        assert!(bursts(&c.tick(ms(499), VIEW, &mut rng)).is_empty());
        assert_eq!(bursts(&c.tick(ms(1), VIEW, &mut rng)), vec![BurstKind::LeftFlank]);
        assert!(bursts(&c.tick(ms(199), VIEW, &mut rng)).is_empty());
        assert_eq!(bursts(&c.tick(ms(1), VIEW, &mut rng)), vec![BurstKind::RightFlank]);
        assert_eq!(bursts(&c.tick(ms(500), VIEW, &mut rng)), vec![BurstKind::Grand]);
        assert_eq!(bursts(&c.tick(ms(800), VIEW, &mut rng)), vec![BurstKind::Drizzle]);
        assert!(bursts(&c.tick(ms(1999), VIEW, &mut rng)).is_empty());
        assert_eq!(bursts(&c.tick(ms(1), VIEW, &mut rng)), vec![BurstKind::Drizzle]);
    }

    #[test]
    fn drizzle_keeps_going() {
        let (mut c, _, mut rng) = started();
        let ev = c.tick(ms(10_000), VIEW, &mut rng);
        let drizzles = bursts(&ev).iter().filter(|k| **k == BurstKind::Drizzle).count();
        assert_eq!(drizzles, 5);
        assert_eq!(c.pending_timers(), 1);
    }

    #[test]
    fn start_is_idempotent() {
        let (mut c, _, mut rng) = started();
        assert!(c.start(VIEW, &mut rng).is_empty());
        assert_eq!(c.pending_timers(), 4);
    }

    #[test]
    fn teardown_silences_everything() {
        let (mut c, _, mut rng) = started();
        c.tick(ms(600), VIEW, &mut rng);
        c.teardown();
        assert_eq!(c.pending_timers(), 0);
        assert!(!c.hearts().is_running());
        assert!(c.tick(ms(20_000), VIEW, &mut rng).is_empty());
        assert_eq!(c.confetti().len(), 0);
    }

    #[test]
    fn hearts_flow_during_celebration() {
        let (mut c, _, mut rng) = started();
        let ev = c.tick(ms(1800), VIEW, &mut rng);
        let hearts = ev.iter().filter(|e| matches!(e, CardEvent::HeartSpawned { .. })).count();
        assert_eq!(hearts, 3);
        assert_eq!(c.hearts().len(), 3);
    }

    #[test]
    fn jokes_reveal_on_a_stagger() {
        assert_eq!(revealed(ms(0), 6), 0);
        assert_eq!(revealed(ms(1199), 6), 0);
        assert_eq!(revealed(ms(1200), 6), 1);
        assert_eq!(revealed(ms(1499), 6), 1);
        assert_eq!(revealed(ms(1500), 6), 2);
        assert_eq!(revealed(ms(2700), 6), 6);
        assert_eq!(revealed(ms(60_000), 6), 6);

        let (mut c, _, mut rng) = started();
        c.tick(ms(2999), VIEW, &mut rng);
        assert_eq!(c.visible_jokes(), 6);
        assert!(!c.sign_off_visible());
        c.tick(ms(1), VIEW, &mut rng);
        assert!(c.sign_off_visible());
    }
}
