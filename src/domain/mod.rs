pub mod decor;
pub mod evasion;
pub mod random;
pub mod script;
pub mod status_log;
