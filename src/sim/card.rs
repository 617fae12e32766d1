/// Screen router: asks the question until it is accepted, then celebrates.
///
/// Input is forwarded to whichever screen is showing. Any `Accepted` event
/// coming back (a click on "Yes" or the forced auto-accept) switches to the
/// celebration exactly once; the question screen is torn down and dropped
/// in the same step, so none of its timers can fire afterwards.

use std::time::Duration;

use tracing::info;

use crate::config::TimingConfig;
use crate::domain::evasion::Viewport;
use crate::domain::random::RandomSource;
use crate::domain::script::Script;
use super::celebration::CelebrationScreen;
use super::event::CardEvent;
use super::question::{FocusMove, QuestionScreen};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Asking,
    Celebrating,
}

pub enum Screen {
    Asking(QuestionScreen),
    Celebrating(CelebrationScreen),
}

pub struct Card {
    script: &'static Script,
    timing: TimingConfig,
    confetti_cap: usize,
    screen: Screen,
}

impl Card {
    pub fn new<R: RandomSource + ?Sized>(
        script: &'static Script,
        timing: TimingConfig,
        confetti_cap: usize,
        rng: &mut R,
    ) -> Self {
        let question = QuestionScreen::new(script, timing.auto_accept, rng);
        Card { script, timing, confetti_cap, screen: Screen::Asking(question) }
    }

    pub fn phase(&self) -> Phase {
        match self.screen {
            Screen::Asking(_) => Phase::Asking,
            Screen::Celebrating(_) => Phase::Celebrating,
        }
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn question(&self) -> Option<&QuestionScreen> {
        match &self.screen {
            Screen::Asking(q) => Some(q),
            Screen::Celebrating(_) => None,
        }
    }

    #[allow(dead_code)]
    pub fn celebration(&self) -> Option<&CelebrationScreen> {
        match &self.screen {
            Screen::Celebrating(c) => Some(c),
            Screen::Asking(_) => None,
        }
    }

    /// True while the error modal is up; question controls ignore input then.
    pub fn modal_open(&self) -> bool {
        self.question().map_or(false, |q| q.error().is_visible())
    }

    // ── Input ──

    pub fn reject<R: RandomSource + ?Sized>(&mut self, view: Viewport, rng: &mut R) -> Vec<CardEvent> {
        let events = match self.unblocked_question() {
            Some(q) => q.reject(view.width_px, rng),
            None => return vec![],
        };
        self.route(events, view, rng)
    }

    pub fn approach<R: RandomSource + ?Sized>(&mut self, view: Viewport, rng: &mut R) -> Vec<CardEvent> {
        match self.unblocked_question() {
            Some(q) => q.approach(view.width_px, rng),
            None => vec![],
        }
    }

    pub fn accept<R: RandomSource + ?Sized>(&mut self, view: Viewport, rng: &mut R) -> Vec<CardEvent> {
        let events = match self.unblocked_question() {
            Some(q) => q.accept(),
            None => return vec![],
        };
        self.route(events, view, rng)
    }

    pub fn move_focus<R: RandomSource + ?Sized>(&mut self, mv: FocusMove, view: Viewport, rng: &mut R) -> Vec<CardEvent> {
        match self.unblocked_question() {
            Some(q) => q.move_focus(mv, view.width_px, rng),
            None => vec![],
        }
    }

    pub fn activate<R: RandomSource + ?Sized>(&mut self, view: Viewport, rng: &mut R) -> Vec<CardEvent> {
        let events = match self.unblocked_question() {
            Some(q) => q.activate_focused(view.width_px, rng),
            None => return vec![],
        };
        self.route(events, view, rng)
    }

    pub fn dismiss_error(&mut self) -> Vec<CardEvent> {
        match &mut self.screen {
            Screen::Asking(q) => q.dismiss_error(),
            Screen::Celebrating(_) => vec![],
        }
    }

    /// Advance whichever screen is showing by `dt`.
    pub fn tick<R: RandomSource + ?Sized>(&mut self, dt: Duration, view: Viewport, rng: &mut R) -> Vec<CardEvent> {
        let events = match &mut self.screen {
            Screen::Asking(q) => q.tick(dt),
            Screen::Celebrating(c) => c.tick(dt, view, rng),
        };
        self.route(events, view, rng)
    }

    /// Stop whatever is running before exit.
    pub fn teardown(&mut self) {
        match &mut self.screen {
            Screen::Asking(q) => q.teardown(),
            Screen::Celebrating(c) => c.teardown(),
        }
    }

    fn unblocked_question(&mut self) -> Option<&mut QuestionScreen> {
        match &mut self.screen {
            Screen::Asking(q) if !q.error().is_visible() => Some(q),
            _ => None,
        }
    }

    fn route<R: RandomSource + ?Sized>(
        &mut self,
        mut events: Vec<CardEvent>,
        view: Viewport,
        rng: &mut R,
    ) -> Vec<CardEvent> {
        let accepted = events.iter().find_map(|e| match e {
            CardEvent::Accepted { auto } => Some(*auto),
            _ => None,
        });
        if let Some(auto) = accepted {
            events.extend(self.celebrate(auto, view, rng));
        }
        events
    }

    fn celebrate<R: RandomSource + ?Sized>(&mut self, auto: bool, view: Viewport, rng: &mut R) -> Vec<CardEvent> {
        let Screen::Asking(question) = &mut self.screen else {
            return vec![];
        };
        question.teardown();
        info!(auto, attempts = question.attempts(), "accepted, switching to celebration");

        let mut celebration = CelebrationScreen::new(self.script, &self.timing, self.confetti_cap, rng);
        let mut events = vec![CardEvent::ScreenChanged];
        events.extend(celebration.start(view, rng));
        self.screen = Screen::Celebrating(celebration);
        events
    }
}
