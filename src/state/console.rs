// Console tab state.
// Activity log of refreshes, cache hits, and errors with an unread badge.

use chrono::{DateTime, Utc};
use ratatui::widgets::ListState;

/// Oldest messages are dropped beyond this many.
const MAX_MESSAGES: usize = 500;

/// Console message level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleLevel {
    Info,
    Warn,
    Error,
}

/// A console message for the activity log.
#[derive(Debug, Clone)]
pub struct ConsoleMessage {
    pub level: ConsoleLevel,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl ConsoleMessage {
    fn new(level: ConsoleLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Complete state for the Console tab.
#[derive(Debug, Default)]
pub struct ConsoleState {
    pub messages: Vec<ConsoleMessage>,
    pub list_state: ListState,
    /// Errors logged since the tab was last viewed.
    pub unread: usize,
}

impl ConsoleState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(ConsoleMessage::new(ConsoleLevel::Info, message));
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.push(ConsoleMessage::new(ConsoleLevel::Warn, message));
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.unread += 1;
        self.push(ConsoleMessage::new(ConsoleLevel::Error, message));
    }

    fn push(&mut self, message: ConsoleMessage) {
        self.messages.push(message);
        if self.messages.len() > MAX_MESSAGES {
            self.messages.remove(0);
        }
    }

    pub fn mark_read(&mut self) {
        self.unread = 0;
    }

    /// Latest message, shown in the status bar.
    pub fn last(&self) -> Option<&ConsoleMessage> {
        self.messages.last()
    }

    /// Select previous (newer, since the list renders newest first) message.
    pub fn select_prev(&mut self) {
        if self.messages.is_empty() {
            return;
        }
        let i = self.list_state.selected().map_or(0, |i| i.saturating_sub(1));
        self.list_state.select(Some(i));
    }

    /// Select next (older) message.
    pub fn select_next(&mut self) {
        if self.messages.is_empty() {
            return;
        }
        let last = self.messages.len() - 1;
        let i = self.list_state.selected().map_or(0, |i| (i + 1).min(last));
        self.list_state.select(Some(i));
    }
}
