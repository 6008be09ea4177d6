//! Per-field draft buffers with debounced commits.
//!
//! A buffer collects the edits of one mounted input. It is committed once the
//! input has been quiet for the debounce window (see [`EditController::tick`]),
//! or straight away on blur and unmount. Edits arriving before a commit are
//! merged into the pending patch, so only the timer is superseded, never the
//! data.

use std::time::{Duration, Instant};

use indexmap::IndexMap;
use tracing::trace;

use crate::domain::{AnswerValue, FieldId};

use super::answers::AnswerStore;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// A partial update that can absorb a newer one.
pub trait Patch: Clone {
    fn merge(&mut self, newer: Self);
}

impl Patch for AnswerValue {
    fn merge(&mut self, newer: Self) {
        *self = newer;
    }
}

/// Where flushed patches land.
pub trait CommitTarget<P> {
    fn commit(&mut self, id: &str, patch: P);
}

impl CommitTarget<AnswerValue> for AnswerStore {
    fn commit(&mut self, id: &str, patch: AnswerValue) {
        self.set(id, patch);
    }
}

#[derive(Debug, Clone)]
struct EditBuffer<P> {
    pending: Option<P>,
    deadline: Option<Instant>,
}

impl<P> Default for EditBuffer<P> {
    fn default() -> Self {
        Self {
            pending: None,
            deadline: None,
        }
    }
}

impl<P> EditBuffer<P> {
    fn take(&mut self) -> Option<P> {
        self.deadline = None;
        self.pending.take()
    }
}

#[derive(Debug, Clone)]
pub struct EditController<P> {
    window: Duration,
    buffers: IndexMap<FieldId, EditBuffer<P>>,
}

impl<P: Patch> Default for EditController<P> {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl<P: Patch> EditController<P> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            buffers: IndexMap::new(),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn mount(&mut self, id: &str) {
        if !self.buffers.contains_key(id) {
            self.buffers.insert(id.to_string(), EditBuffer::default());
        }
    }

    pub fn is_mounted(&self, id: &str) -> bool {
        self.buffers.contains_key(id)
    }

    pub fn mounted_ids(&self) -> impl Iterator<Item = &FieldId> {
        self.buffers.keys()
    }

    /// Buffers `patch` and restarts the field's quiet period.
    pub fn edit(&mut self, id: &str, patch: P, now: Instant) {
        let window = self.window;
        let buffer = self.buffers.entry(id.to_string()).or_default();
        match &mut buffer.pending {
            Some(pending) => pending.merge(patch),
            None => buffer.pending = Some(patch),
        }
        buffer.deadline = Some(now + window);
    }

    /// The uncommitted draft of a field, if any.
    pub fn draft(&self, id: &str) -> Option<&P> {
        self.buffers.get(id).and_then(|buffer| buffer.pending.as_ref())
    }

    pub fn has_pending(&self, id: &str) -> bool {
        self.draft(id).is_some()
    }

    pub fn pending_ids(&self) -> Vec<FieldId> {
        self.buffers
            .iter()
            .filter(|(_, buffer)| buffer.pending.is_some())
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// The earliest instant at which [`tick`](Self::tick) has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.buffers
            .values()
            .filter_map(|buffer| buffer.deadline)
            .min()
    }

    /// Commits every buffer whose quiet period has elapsed by `now`.
    pub fn tick(&mut self, now: Instant, target: &mut impl CommitTarget<P>) -> Vec<FieldId> {
        let mut flushed = Vec::new();
        for (id, buffer) in self.buffers.iter_mut() {
            if buffer.deadline.is_some_and(|deadline| deadline <= now)
                && let Some(patch) = buffer.take()
            {
                trace!(field = %id, "debounced commit");
                target.commit(id, patch);
                flushed.push(id.clone());
            }
        }
        flushed
    }

    /// Focus left the field: commit now and cancel the timer.
    pub fn blur(&mut self, id: &str, target: &mut impl CommitTarget<P>) -> bool {
        self.flush(id, target)
    }

    /// Discrete controls (checkbox-like toggles) skip the debounce. Anything
    /// still buffered for the field is committed together with `patch`.
    pub fn commit_now(&mut self, id: &str, patch: P, target: &mut impl CommitTarget<P>) {
        let combined = match self.buffers.get_mut(id).and_then(EditBuffer::take) {
            Some(mut pending) => {
                pending.merge(patch);
                pending
            }
            None => patch,
        };
        trace!(field = %id, "immediate commit");
        target.commit(id, combined);
    }

    /// Flushes the buffer once and destroys it.
    pub fn unmount(&mut self, id: &str, target: &mut impl CommitTarget<P>) -> bool {
        let flushed = self.flush(id, target);
        self.buffers.shift_remove(id);
        flushed
    }

    pub fn unmount_all(&mut self, target: &mut impl CommitTarget<P>) -> Vec<FieldId> {
        let mut flushed = Vec::new();
        for (id, mut buffer) in self.buffers.drain(..) {
            if let Some(patch) = buffer.take() {
                trace!(field = %id, "flush on unmount");
                target.commit(&id, patch);
                flushed.push(id);
            }
        }
        flushed
    }

    /// Drops a buffer without committing it.
    pub fn discard(&mut self, id: &str) -> Option<P> {
        self.buffers
            .shift_remove(id)
            .and_then(|mut buffer| buffer.take())
    }

    fn flush(&mut self, id: &str, target: &mut impl CommitTarget<P>) -> bool {
        let Some(patch) = self.buffers.get_mut(id).and_then(EditBuffer::take) else {
            return false;
        };
        trace!(field = %id, "flush");
        target.commit(id, patch);
        true
    }
}
