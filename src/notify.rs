//! User-visible success/failure messages.

use chrono::{DateTime, Local};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
  Success,
  Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
  pub level: Level,
  pub message: String,
}

impl Notification {
  pub fn success(message: impl Into<String>) -> Self {
    Self {
      level: Level::Success,
      message: message.into(),
    }
  }

  pub fn error(message: impl Into<String>) -> Self {
    Self {
      level: Level::Error,
      message: message.into(),
    }
  }
}

/// Receives notifications from the form session
pub trait NotificationSink {
  fn notify(&mut self, notification: Notification);
}

impl NotificationSink for Vec<Notification> {
  fn notify(&mut self, notification: Notification) {
    self.push(notification);
  }
}

/// A notification as shown in the toast line
#[derive(Debug, Clone)]
pub struct Toast {
  pub notification: Notification,
  pub at: DateTime<Local>,
  expires: Instant,
}

/// Queue of toasts, newest last, each visible until its time-to-live elapses
#[derive(Debug)]
pub struct Toasts {
  queue: VecDeque<Toast>,
  ttl: Duration,
}

impl Toasts {
  /// Oldest toasts are dropped beyond this
  const MAX: usize = 5;

  pub fn new(ttl: Duration) -> Self {
    Self {
      queue: VecDeque::new(),
      ttl,
    }
  }

  /// Newest visible toast
  pub fn current(&self) -> Option<&Toast> {
    self.queue.back()
  }

  pub fn len(&self) -> usize {
    self.queue.len()
  }

  pub fn is_empty(&self) -> bool {
    self.queue.is_empty()
  }

  /// Drop expired toasts. Returns true if any were removed.
  pub fn tick(&mut self) -> bool {
    if self.is_empty() {
      return false;
    }
    let now = Instant::now();
    let before = self.queue.len();
    self.queue.retain(|t| t.expires > now);
    self.queue.len() != before
  }
}

impl NotificationSink for Toasts {
  fn notify(&mut self, notification: Notification) {
    match notification.level {
      Level::Success => tracing::info!(text = %notification.message, "notification"),
      Level::Error => tracing::warn!(text = %notification.message, "notification"),
    }

    self.queue.push_back(Toast {
      notification,
      at: Local::now(),
      expires: Instant::now() + self.ttl,
    });
    while self.queue.len() > Self::MAX {
      self.queue.pop_front();
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_newest_toast_is_current() {
    let mut toasts = Toasts::new(Duration::from_secs(5));
    assert!(toasts.current().is_none());

    toasts.notify(Notification::success("saved"));
    toasts.notify(Notification::error("email exists"));

    let current = toasts.current().unwrap();
    assert_eq!(current.notification, Notification::error("email exists"));
    assert_eq!(toasts.len(), 2);
  }

  #[test]
  fn test_expired_toasts_removed() {
    let mut toasts = Toasts::new(Duration::ZERO);
    toasts.notify(Notification::success("saved"));

    std::thread::sleep(Duration::from_millis(2));
    assert!(toasts.tick());
    assert!(toasts.is_empty());
    assert!(!toasts.tick());
  }

  #[test]
  fn test_queue_is_bounded() {
    let mut toasts = Toasts::new(Duration::from_secs(5));
    for i in 0..8 {
      toasts.notify(Notification::success(format!("n{}", i)));
    }
    assert_eq!(toasts.len(), Toasts::MAX);
    assert_eq!(toasts.current().unwrap().notification.message, "n7");
  }
}
