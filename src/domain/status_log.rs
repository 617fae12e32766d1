/// Rolling "rejection_handler.log" shown under the buttons.
///
/// Holds the most recent `STATUS_LOG_CAPACITY` lines; pushing onto a full
/// log evicts the oldest line first. Each line keeps the local time at
/// which it was written.

use std::collections::VecDeque;

use chrono::{DateTime, Local};

pub const STATUS_LOG_CAPACITY: usize = 5;

#[derive(Clone, Debug)]
pub struct StatusEntry {
    pub text: String,
    pub logged_at: DateTime<Local>,
}

impl StatusEntry {
    /// `HH:MM:SS` stamp shown in front of the line.
    pub fn stamp(&self) -> String {
        self.logged_at.format("%H:%M:%S").to_string()
    }
}

#[derive(Clone, Debug, Default)]
pub struct StatusLog {
    entries: VecDeque<StatusEntry>,
}

impl StatusLog {
    pub fn new() -> Self {
        StatusLog { entries: VecDeque::with_capacity(STATUS_LOG_CAPACITY) }
    }

    pub fn push(&mut self, text: impl Into<String>) {
        self.push_at(text, Local::now());
    }

    pub fn push_at(&mut self, text: impl Into<String>, logged_at: DateTime<Local>) {
        while self.entries.len() >= STATUS_LOG_CAPACITY {
            self.entries.pop_front();
        }
        self.entries.push_back(StatusEntry { text: text.into(), logged_at });
    }

    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &StatusEntry> {
        self.entries.iter()
    }

    #[allow(dead_code)]
    pub fn texts(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.text.as_str()).collect()
    }
}
