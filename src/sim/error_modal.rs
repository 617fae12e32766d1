/// Error Presenter state: one modal, overwritten on every trigger.
///
/// Purely presentational. The question screen owns it and the renderer
/// draws it; dismissal comes back through `QuestionScreen::dismiss_error`.

use crate::domain::random::RandomSource;

/// Upper bound (exclusive) for the fake process id.
const PID_LIMIT: f64 = 9999.0;

#[derive(Clone, Debug, Default)]
pub struct ErrorPresentation {
    message: String,
    visible: bool,
    process_id: u32,
}

impl ErrorPresentation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace whatever is showing with `message`.
    pub fn show<R: RandomSource + ?Sized>(&mut self, message: &str, rng: &mut R) {
        self.message = message.to_string();
        self.process_id = (rng.next_unit() * PID_LIMIT) as u32;
        self.visible = true;
    }

    /// Returns true if the modal was open.
    pub fn dismiss(&mut self) -> bool {
        let was = self.is_visible();
        self.visible = false;
        was
    }

    /// Shown only when flagged visible with something to say.
    pub fn is_visible(&self) -> bool {
        self.visible && !self.message.is_empty()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn process_id(&self) -> u32 {
        self.process_id
    }
}
