//! Bounded notification log fed from per-tick alerts.

use std::collections::VecDeque;

use super::types::Alert;

/// Number of notifications retained.
pub const ALERT_LOG_CAPACITY: usize = 50;

/// Most-recent-first log of alerts across ticks.
///
/// Alerts in a snapshot only describe that tick; this log keeps a rolling
/// history that consumers can dismiss entries from.
#[derive(Debug, Clone)]
pub struct AlertLog {
    entries: VecDeque<Alert>,
    capacity: usize,
}

impl Default for AlertLog {
    fn default() -> Self {
        Self::with_capacity(ALERT_LOG_CAPACITY)
    }
}

impl AlertLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Prepends `alert`, dropping the oldest entry once at capacity.
    pub fn record(&mut self, alert: Alert) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_back();
        }
        self.entries.push_front(alert);
    }

    /// Records every alert of one tick, in tick order.
    pub fn record_all<'a>(&mut self, alerts: impl IntoIterator<Item = &'a Alert>) {
        for alert in alerts {
            self.record(alert.clone());
        }
    }

    /// Removes the entry with `id`. Returns `false` if none matched.
    pub fn dismiss(&mut self, id: &str) -> bool {
        match self.entries.iter().position(|a| a.id == id) {
            Some(idx) => {
                self.entries.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries newest first.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &Alert> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
