/// A one-shot deadline on the millisecond clock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Deadline {
    at: Option<u64>,
}

impl Deadline {
    pub const fn idle() -> Self {
        Self { at: None }
    }

    /// Arm (or re-arm) to fire `after_ms` from `now_ms`.
    pub fn arm(&mut self, now_ms: u64, after_ms: u64) {
        self.at = Some(now_ms.saturating_add(after_ms));
    }

    pub fn cancel(&mut self) {
        self.at = None;
    }

    pub fn is_armed(&self) -> bool {
        self.at.is_some()
    }

    pub fn expired(&self, now_ms: u64) -> bool {
        matches!(self.at, Some(at) if now_ms >= at)
    }

    /// Milliseconds left, or `None` when idle.
    pub fn remaining(&self, now_ms: u64) -> Option<u64> {
        self.at.map(|at| at.saturating_sub(now_ms))
    }
}
