//! Coalescing of reload / invalidate-layout requests.
//!
//! The engine has no clock: requests carry the host's `now_ms` and the host polls with
//! [`PassScheduler::poll`] from its frame or timer callback.

use alloc::vec::Vec;

/// A keyed trailing-edge debouncer.
///
/// Scheduling a key that is already pending pushes its deadline back, so a burst of requests
/// closer together than `delay_ms` fires once, `delay_ms` after the last one.
#[derive(Clone, Debug, Default)]
pub struct Debouncer<K> {
    pending: Vec<(K, u64)>,
}

impl<K: Copy + PartialEq> Debouncer<K> {
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
        }
    }

    /// Returns `true` when the request replaced a pending one.
    pub fn schedule(&mut self, key: K, now_ms: u64, delay_ms: u64) -> bool {
        let due = now_ms.saturating_add(delay_ms);
        if let Some(entry) = self.pending.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = due;
            return true;
        }
        self.pending.push((key, due));
        false
    }

    pub fn cancel(&mut self, key: K) -> bool {
        let before = self.pending.len();
        self.pending.retain(|(k, _)| *k != key);
        self.pending.len() != before
    }

    pub fn is_pending(&self, key: K) -> bool {
        self.pending.iter().any(|(k, _)| *k == key)
    }

    pub fn due_ms(&self, key: K) -> Option<u64> {
        self.pending
            .iter()
            .find(|(k, _)| *k == key)
            .map(|&(_, due)| due)
    }

    /// The earliest deadline of any pending key.
    pub fn next_due_ms(&self) -> Option<u64> {
        self.pending.iter().map(|&(_, due)| due).min()
    }

    /// Removes and returns the pending key with the earliest deadline at or before `now_ms`.
    pub fn take_due(&mut self, now_ms: u64) -> Option<K> {
        let (pos, _) = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, (_, due))| *due <= now_ms)
            .min_by_key(|(_, (_, due))| *due)?;
        Some(self.pending.remove(pos).0)
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// The two kinds of deferred work a grid runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PassKind {
    /// Re-measure and re-position without re-reading data.
    InvalidateLayout,
    /// Re-read data, re-measure, re-position, reconcile.
    Reload,
}

/// Where a grid is in its update cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GridPhase {
    #[default]
    Idle,
    NeedsReload,
    NeedsInvalidateLayout,
    Reloading,
    InvalidatingLayout,
}

/// Coalesces reload and invalidate requests. A reload subsumes an invalidate: requesting a
/// reload drops a pending invalidate, and invalidates requested while a reload is pending
/// are ignored.
#[derive(Clone, Debug)]
pub struct PassScheduler {
    debouncer: Debouncer<PassKind>,
    delay_ms: u64,
    running: Option<PassKind>,
    coalesced: u64,
}

impl PassScheduler {
    pub fn new(delay_ms: u64) -> Self {
        Self {
            debouncer: Debouncer::new(),
            delay_ms,
            running: None,
            coalesced: 0,
        }
    }

    pub fn delay_ms(&self) -> u64 {
        self.delay_ms
    }

    pub fn set_delay_ms(&mut self, delay_ms: u64) {
        self.delay_ms = delay_ms;
    }

    pub fn request_reload(&mut self, now_ms: u64) {
        if self.debouncer.cancel(PassKind::InvalidateLayout) {
            self.coalesced += 1;
        }
        if self.debouncer.schedule(PassKind::Reload, now_ms, self.delay_ms) {
            self.coalesced += 1;
        }
        vtrace!(
            due_ms = now_ms.saturating_add(self.delay_ms),
            "PassScheduler::request_reload"
        );
    }

    /// Returns `false` when a pending reload already covers the request.
    pub fn request_invalidate_layout(&mut self, now_ms: u64) -> bool {
        if self.debouncer.is_pending(PassKind::Reload) {
            self.coalesced += 1;
            return false;
        }
        if self
            .debouncer
            .schedule(PassKind::InvalidateLayout, now_ms, self.delay_ms)
        {
            self.coalesced += 1;
        }
        true
    }

    /// The pass to run now, if one is due. A reload is preferred over an invalidate.
    pub fn poll(&mut self, now_ms: u64) -> Option<PassKind> {
        let kind = self.debouncer.take_due(now_ms)?;
        if kind == PassKind::Reload {
            self.debouncer.cancel(PassKind::InvalidateLayout);
        }
        Some(kind)
    }

    /// The pending pass regardless of its deadline.
    pub fn flush(&mut self) -> Option<PassKind> {
        if self.debouncer.cancel(PassKind::Reload) {
            self.debouncer.cancel(PassKind::InvalidateLayout);
            return Some(PassKind::Reload);
        }
        if self.debouncer.cancel(PassKind::InvalidateLayout) {
            return Some(PassKind::InvalidateLayout);
        }
        None
    }

    /// Marks `kind` as running. Running a reload drops every pending request, since it
    /// covers them.
    pub fn begin(&mut self, kind: PassKind) {
        match kind {
            PassKind::Reload => self.debouncer.clear(),
            PassKind::InvalidateLayout => {
                self.debouncer.cancel(PassKind::InvalidateLayout);
            }
        }
        self.running = Some(kind);
    }

    pub fn finish(&mut self) {
        self.running = None;
    }

    pub fn is_pending(&self, kind: PassKind) -> bool {
        self.debouncer.is_pending(kind)
    }

    pub fn next_due_ms(&self) -> Option<u64> {
        self.debouncer.next_due_ms()
    }

    /// Requests absorbed by an earlier or broader request.
    pub fn coalesced_count(&self) -> u64 {
        self.coalesced
    }

    pub fn phase(&self) -> GridPhase {
        match self.running {
            Some(PassKind::Reload) => GridPhase::Reloading,
            Some(PassKind::InvalidateLayout) => GridPhase::InvalidatingLayout,
            None if self.debouncer.is_pending(PassKind::Reload) => GridPhase::NeedsReload,
            None if self.debouncer.is_pending(PassKind::InvalidateLayout) => {
                GridPhase::NeedsInvalidateLayout
            }
            None => GridPhase::Idle,
        }
    }
}

impl Default for PassScheduler {
    fn default() -> Self {
        Self::new(crate::DEFAULT_COALESCE_DELAY_MS)
    }
}
