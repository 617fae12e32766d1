/// Events emitted by the card's components.
/// The main loop consumes these for sound and tracing; the router consumes
/// `Accepted` to switch screens.

use super::confetti::BurstKind;

#[derive(Clone, Debug, PartialEq)]
pub enum CardEvent {
    Rejected { attempt: u32 },
    Evaded,
    ButtonsSwapped,
    ButtonsRestored,
    ErrorShown { index: usize },
    ErrorDismissed,
    AutoAcceptScheduled,
    Accepted { auto: bool },
    ScreenChanged,
    Confetti(BurstKind),
    HeartSpawned { id: u64 },
}
