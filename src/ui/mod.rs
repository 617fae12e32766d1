pub mod dispatch;
pub mod gamepad;
pub mod input;
pub mod layout;
pub mod renderer;
pub mod sound;
