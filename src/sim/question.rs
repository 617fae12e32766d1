/// The question screen: "Will you be my Valentine?" with an evasive "No".
///
/// ## Escalation
///
/// Every rejection `n` (1-based):
///   1. grows "Yes" to `1 + n * SCALE_STEP`
///   2. relabels "No" with `reactions[n % len]`
///   3. at `n >= MAX_ATTEMPTS`: logs two lines, arms the auto-accept timer
///      and stops here; the screen is now Escalated and ignores further input
///   4. every third attempt raises an error modal (`errors[n % len]`)
///   5. at exactly n == 2 the buttons swap, at exactly n == 4 they swap back
///   6. "No" jumps to a fresh random offset
///   7. one generic status line (`status[n % len]`)
///
/// Once "No" has been clicked twice it also flees when approached
/// (pointer enter, touch, or keyboard focus).
///
/// ## Lifetime
///
/// The only timer is the auto-accept. It lives in this screen's own
/// `TimerSet`, so `teardown` (or dropping the screen) guarantees it never
/// fires for a screen that is no longer shown.

use std::time::Duration;

use tracing::{debug, info};

use crate::domain::decor::{self, Decoration};
use crate::domain::evasion::{compute_offset, Offset};
use crate::domain::random::RandomSource;
use crate::domain::script::{Script, MAX_ATTEMPTS, SCALE_STEP};
use crate::domain::status_log::StatusLog;
use super::error_modal::ErrorPresentation;
use super::event::CardEvent;
use super::timer::{TimerId, TimerSet};

const BACKDROP_COUNT: usize = 8;
const BACKDROP_STAGGER: f64 = 0.5;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Arrangement {
    Normal,
    Swapped,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Control {
    Accept,
    Reject,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum QuestionState {
    Idle,
    Rejecting,
    /// Out of rejections; auto-accept is pending.
    Escalated,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FocusMove {
    Left,
    Right,
    Toggle,
}

#[derive(Clone, Copy, Debug)]
enum Cue {
    AutoAccept,
}

pub struct QuestionScreen {
    script: &'static Script,
    attempts: u32,
    arrangement: Arrangement,
    offset: Offset,
    reject_label: &'static str,
    accept_scale: f64,
    log: StatusLog,
    error: ErrorPresentation,
    focus: Control,
    backdrop: Vec<Decoration>,

    timers: TimerSet<Cue>,
    auto_accept: Option<TimerId>,
    auto_accept_delay: Duration,
}

impl QuestionScreen {
    pub fn new<R: RandomSource + ?Sized>(
        script: &'static Script,
        auto_accept_delay: Duration,
        rng: &mut R,
    ) -> Self {
        let backdrop = decor::scatter(
            BACKDROP_COUNT,
            script.backdrop_symbols,
            (0.0, 100.0),
            BACKDROP_STAGGER,
            rng,
        );
        QuestionScreen {
            script,
            attempts: 0,
            arrangement: Arrangement::Normal,
            offset: Offset::ZERO,
            reject_label: script.initial_reject_label,
            accept_scale: 1.0,
            log: StatusLog::new(),
            error: ErrorPresentation::new(),
            focus: Control::Accept,
            backdrop,
            timers: TimerSet::new(),
            auto_accept: None,
            auto_accept_delay,
        }
    }

    // ── Operations ──

    /// "No" was activated.
    pub fn reject<R: RandomSource + ?Sized>(&mut self, viewport_width_px: f64, rng: &mut R) -> Vec<CardEvent> {
        if self.state() == QuestionState::Escalated {
            return vec![];
        }

        let n = self.attempts + 1;
        self.attempts = n;
        self.accept_scale = 1.0 + n as f64 * SCALE_STEP;
        self.reject_label = self.script.reaction(n);

        let mut events = vec![CardEvent::Rejected { attempt: n }];

        if n >= MAX_ATTEMPTS {
            self.log.push(self.script.max_exceeded);
            self.log.push(self.script.auto_selecting);
            self.auto_accept = Some(self.timers.schedule_once(self.auto_accept_delay, Cue::AutoAccept));
            info!(attempt = n, delay_ms = self.auto_accept_delay.as_millis() as u64, "rejections exhausted, auto-accept armed");
            events.push(CardEvent::AutoAcceptScheduled);
            return events;
        }

        if n % 3 == 0 {
            let index = self.script.error_index(n);
            self.error.show(self.script.error(n), rng);
            events.push(CardEvent::ErrorShown { index });
        }

        if n == 2 {
            self.arrangement = Arrangement::Swapped;
            self.log.push(self.script.swapped);
            events.push(CardEvent::ButtonsSwapped);
        } else if n == 4 {
            self.arrangement = Arrangement::Normal;
            self.log.push(self.script.restored);
            events.push(CardEvent::ButtonsRestored);
        }

        self.offset = compute_offset(n, viewport_width_px, rng);
        self.log.push(self.script.status(n));
        debug!(attempt = n, dx = self.offset.dx, dy = self.offset.dy, "rejection handled");

        events
    }

    /// Pointer entered / touched / focused "No".
    pub fn approach<R: RandomSource + ?Sized>(&mut self, viewport_width_px: f64, rng: &mut R) -> Vec<CardEvent> {
        if self.attempts > 1 && self.state() != QuestionState::Escalated {
            self.offset = compute_offset(self.attempts, viewport_width_px, rng);
            vec![CardEvent::Evaded]
        } else {
            vec![]
        }
    }

    /// "Yes" was activated. The router does the rest.
    pub fn accept(&self) -> Vec<CardEvent> {
        vec![CardEvent::Accepted { auto: false }]
    }

    pub fn dismiss_error(&mut self) -> Vec<CardEvent> {
        if self.error.dismiss() {
            vec![CardEvent::ErrorDismissed]
        } else {
            vec![]
        }
    }

    /// Move keyboard focus. Landing on "No" counts as an approach.
    pub fn move_focus<R: RandomSource + ?Sized>(
        &mut self,
        mv: FocusMove,
        viewport_width_px: f64,
        rng: &mut R,
    ) -> Vec<CardEvent> {
        let [left, right] = self.visual_order();
        let target = match mv {
            FocusMove::Left => left,
            FocusMove::Right => right,
            FocusMove::Toggle => match self.focus {
                Control::Accept => Control::Reject,
                Control::Reject => Control::Accept,
            },
        };
        if target == self.focus {
            return vec![];
        }
        self.focus = target;
        if target == Control::Reject {
            self.approach(viewport_width_px, rng)
        } else {
            vec![]
        }
    }

    /// Activate whichever control has keyboard focus.
    pub fn activate_focused<R: RandomSource + ?Sized>(&mut self, viewport_width_px: f64, rng: &mut R) -> Vec<CardEvent> {
        match self.focus {
            Control::Accept => self.accept(),
            Control::Reject => self.reject(viewport_width_px, rng),
        }
    }

    pub fn tick(&mut self, dt: Duration) -> Vec<CardEvent> {
        self.timers.advance(dt)
            .into_iter()
            .map(|cue| match cue {
                Cue::AutoAccept => {
                    self.auto_accept = None;
                    CardEvent::Accepted { auto: true }
                }
            })
            .collect()
    }

    /// Cancel everything this screen scheduled.
    pub fn teardown(&mut self) {
        if self.timers.pending() > 0 {
            debug!(pending = self.timers.pending(), "question screen torn down with live timers");
        }
        self.timers.cancel_all();
        self.auto_accept = None;
    }

    // ── Queries ──

    pub fn state(&self) -> QuestionState {
        match self.attempts {
            0 => QuestionState::Idle,
            n if n < MAX_ATTEMPTS => QuestionState::Rejecting,
            _ => QuestionState::Escalated,
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    #[allow(dead_code)]
    pub fn arrangement(&self) -> Arrangement {
        self.arrangement
    }

    /// Controls in on-screen order, left to right.
    pub fn visual_order(&self) -> [Control; 2] {
        match self.arrangement {
            Arrangement::Normal => [Control::Accept, Control::Reject],
            Arrangement::Swapped => [Control::Reject, Control::Accept],
        }
    }

    pub fn offset(&self) -> Offset {
        self.offset
    }

    pub fn reject_label(&self) -> &'static str {
        self.reject_label
    }

    pub fn accept_label(&self) -> &'static str {
        self.script.accept_label
    }

    pub fn question(&self) -> &'static str {
        self.script.question
    }

    pub fn accept_scale(&self) -> f64 {
        self.accept_scale
    }

    pub fn status_log(&self) -> &StatusLog {
        &self.log
    }

    pub fn error(&self) -> &ErrorPresentation {
        &self.error
    }

    pub fn focus(&self) -> Control {
        self.focus
    }

    pub fn backdrop(&self) -> &[Decoration] {
        &self.backdrop
    }

    #[allow(dead_code)]
    pub fn auto_accept_pending(&self) -> bool {
        self.auto_accept.map_or(false, |id| self.timers.is_pending(id))
    }

    #[allow(dead_code)]
    pub fn pending_timers(&self) -> usize {
        self.timers.pending()
    }

    /// Time on this screen's clock.
    #[allow(dead_code)]
    pub fn elapsed(&self) -> Duration {
        self.timers.now()
    }
}
