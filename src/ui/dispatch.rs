/// Routes resolved input to the card: intents from keys and buttons,
/// clicks through hit-testing, pointer motion as approaches.

use crate::domain::evasion::Viewport;
use crate::domain::random::RandomSource;
use crate::sim::card::{Card, Screen};
use crate::sim::event::CardEvent;
use super::input::Intent;
use super::layout::{self, Grid, Target};

/// Apply a non-exit intent.
pub fn apply<R: RandomSource + ?Sized>(card: &mut Card, intent: Intent, view: Viewport, rng: &mut R) -> Vec<CardEvent> {
    match intent {
        Intent::Accept => card.accept(view, rng),
        Intent::Reject => card.reject(view, rng),
        Intent::Focus(mv) => card.move_focus(mv, view, rng),
        Intent::Activate => card.activate(view, rng),
        Intent::Dismiss => card.dismiss_error(),
        Intent::Exit => vec![],
    }
}

/// What a cell on screen is, given what is showing right now.
pub fn target_at(card: &Card, grid: Grid, col: u16, row: u16) -> Option<Target> {
    match card.screen() {
        Screen::Asking(q) if q.error().is_visible() => {
            let m = layout::modal_layout(q.error().message(), grid);
            Some(layout::hit_modal(&m, col, row))
        }
        Screen::Asking(q) => Some(layout::hit_question(&layout::question_layout(q, grid), col, row)),
        Screen::Celebrating(_) => None,
    }
}

/// A left click. The modal closes from its button or from outside the
/// panel; clicks elsewhere on the panel do nothing.
pub fn click<R: RandomSource + ?Sized>(card: &mut Card, grid: Grid, col: u16, row: u16, rng: &mut R) -> Vec<CardEvent> {
    let view = grid.viewport();
    let modal = card.modal_open();
    match target_at(card, grid, col, row) {
        Some(Target::ModalButton) => card.dismiss_error(),
        Some(Target::Backdrop) if modal => card.dismiss_error(),
        Some(Target::Accept) => card.accept(view, rng),
        Some(Target::Reject) => card.reject(view, rng),
        _ => vec![],
    }
}

/// Pointer-enter detection for "No".
#[derive(Default)]
pub struct Hover {
    over_reject: bool,
}

impl Hover {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fires an approach only on the move that enters the button.
    pub fn moved<R: RandomSource + ?Sized>(
        &mut self,
        card: &mut Card,
        grid: Grid,
        col: u16,
        row: u16,
        rng: &mut R,
    ) -> Vec<CardEvent> {
        let over = target_at(card, grid, col, row) == Some(Target::Reject);
        let entered = over && !self.over_reject;
        self.over_reject = over;
        if entered {
            card.approach(grid.viewport(), rng)
        } else {
            vec![]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TimingConfig;
    use crate::domain::random::session_rng;
    use crate::domain::script::DEFAULT;
    use crate::sim::card::Phase;
    use crate::sim::question::FocusMove;

    const GRID: Grid = Grid { cols: 120, rows: 40, cell_w: 8, cell_h: 16 };

    fn card(seed: u64) -> (Card, rand::rngs::StdRng) {
        let mut rng = session_rng(Some(seed));
        let card = Card::new(&DEFAULT, TimingConfig::default(), 600, &mut rng);
        (card, rng)
    }

    fn rects(card: &Card) -> layout::QuestionLayout {
        layout::question_layout(card.question().unwrap(), GRID)
    }

    #[test]
    fn clicking_yes_celebrates() {
        let (mut c, mut rng) = card(1);
        let yes = rects(&c).accept;
        click(&mut c, GRID, yes.x, yes.y, &mut rng);
        assert_eq!(c.phase(), Phase::Celebrating);
    }

    #[test]
    fn clicking_no_rejects() {
        let (mut c, mut rng) = card(2);
        let no = rects(&c).reject;
        let events = click(&mut c, GRID, no.x, no.y, &mut rng);
        assert_eq!(events[0], CardEvent::Rejected { attempt: 1 });
        assert!(click(&mut c, GRID, 0, 0, &mut rng).is_empty());
    }

    fn with_modal(seed: u64) -> (Card, rand::rngs::StdRng) {
        let (mut c, mut rng) = card(seed);
        for _ in 0..3 {
            c.reject(GRID.viewport(), &mut rng);
        }
        assert!(c.modal_open());
        (c, rng)
    }

    #[test]
    fn modal_button_and_backdrop_dismiss() {
        let (mut c, mut rng) = with_modal(3);
        let m = layout::modal_layout(c.question().unwrap().error().message(), GRID);
        assert_eq!(click(&mut c, GRID, m.button.x, m.button.y, &mut rng), vec![CardEvent::ErrorDismissed]);

        let (mut c, mut rng) = with_modal(4);
        assert_eq!(click(&mut c, GRID, 0, 0, &mut rng), vec![CardEvent::ErrorDismissed]);
    }

    #[test]
    fn modal_panel_click_does_nothing() {
        let (mut c, mut rng) = with_modal(5);
        let m = layout::modal_layout(c.question().unwrap().error().message(), GRID);
        assert!(click(&mut c, GRID, m.panel.x + 1, m.panel.y + 1, &mut rng).is_empty());
        assert!(c.modal_open());
    }

    #[test]
    fn modal_blocks_clicks_on_hidden_buttons() {
        let (mut c, mut rng) = with_modal(6);
        // "Yes" sits under the modal's backdrop: the click dismisses instead.
        let yes = rects(&c).accept;
        let events = click(&mut c, GRID, yes.x, yes.y, &mut rng);
        assert!(!events.iter().any(|e| matches!(e, CardEvent::Accepted { .. })));
        assert_eq!(c.phase(), Phase::Asking);
    }

    #[test]
    fn hover_approaches_only_on_enter() {
        let (mut c, mut rng) = card(7);
        c.reject(GRID.viewport(), &mut rng);
        c.reject(GRID.viewport(), &mut rng);
        let mut hover = Hover::new();
        let no = rects(&c).reject;
        assert_eq!(hover.moved(&mut c, GRID, no.x, no.y, &mut rng), vec![CardEvent::Evaded]);

        // Staying put after the button fled is not a new entry.
        let no = rects(&c).reject;
        hover.moved(&mut c, GRID, 0, 0, &mut rng);
        assert_eq!(hover.moved(&mut c, GRID, no.x, no.y, &mut rng), vec![CardEvent::Evaded]);
    }

    #[test]
    fn intents_reach_the_card() {
        let (mut c, mut rng) = card(8);
        let view = GRID.viewport();
        assert!(apply(&mut c, Intent::Focus(FocusMove::Right), view, &mut rng).is_empty());
        let events = apply(&mut c, Intent::Activate, view, &mut rng);
        assert_eq!(events[0], CardEvent::Rejected { attempt: 1 });
        apply(&mut c, Intent::Accept, view, &mut rng);
        assert_eq!(c.phase(), Phase::Celebrating);
    }
}
