pub mod card;
pub mod celebration;
pub mod confetti;
pub mod error_modal;
pub mod event;
pub mod hearts;
pub mod question;
pub mod timer;
