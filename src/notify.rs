use serde::Serialize;
use std::time::Duration;

/// A transient on-screen message. The page removes it after `dismiss_after_ms`;
/// the server forgets it at the same time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub id: u64,
    pub message: String,
    pub dismiss_after_ms: u64,
}

/// Holds the one notice currently on screen, if any.
#[derive(Debug, Clone)]
pub struct NoticeBoard {
    current: Option<Notice>,
    next_id: u64,
    ttl: Duration,
}

impl NoticeBoard {
    pub fn new(ttl: Duration) -> Self {
        Self {
            current: None,
            next_id: 1,
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Shows `message`, replacing any notice still on screen.
    pub fn post(&mut self, message: impl Into<String>) -> Notice {
        let notice = Notice {
            id: self.next_id,
            message: message.into(),
            dismiss_after_ms: self.ttl.as_millis() as u64,
        };
        self.next_id += 1;
        self.current = Some(notice.clone());
        notice
    }

    /// Removes the notice if it is still the one with `id`.
    pub fn dismiss(&mut self, id: u64) -> bool {
        match &self.current {
            Some(notice) if notice.id == id => {
                self.current = None;
                true
            }
            _ => false,
        }
    }

    pub fn current(&self) -> Option<&Notice> {
        self.current.as_ref()
    }
}
