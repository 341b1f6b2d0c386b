//! Bound event history and its partition into compensator spans.
//!
//! Purpose
//! -------
//! Represent the explicit `Unbound → Bound` transition of a model: once a
//! [`Sequence`] is bound, likelihood and per-event gradients are evaluated
//! against it. The history also fixes how `[0, t_end]` is split into spans so
//! that the likelihood decomposes exactly into per-event terms.
//!
//! Key behaviors
//! -------------
//! - With `N` events, span `k < N` is `(t_{k-1}, t_k]` (with `t_{-1} = 0`)
//!   and span `N` is the tail `(t_{N-1}, t_end]`.
//! - Event `k` owns span `k`; the last event also owns the tail. An empty
//!   history has a single unowned span `(0, t_end]`.
//! - Summing the per-event terms over all events therefore covers every span
//!   once, which is what makes `Σ_k gradient(k)` equal the likelihood
//!   gradient.
//!
//! Invariants & assumptions
//! ------------------------
//! - `spans.len() == N + 1`, spans are contiguous, and each has
//!   `end >= start`.
//! - No event lies strictly inside a span: the intensity is continuous on
//!   every span's interior.
use std::ops::Range;

use crate::process::{
    core::{sequence::Sequence, validation::validate_event_index},
    errors::ProcessResult,
};

/// Half-open interval `(start, end]` of the observation window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    pub start: f64,
    pub end: f64,
}

impl Span {
    pub fn len(&self) -> f64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoundHistory {
    sequence: Sequence,
    spans: Vec<Span>,
}

impl BoundHistory {
    /// Bind a validated sequence and build its span partition.
    pub fn new(sequence: Sequence) -> Self {
        let mut spans = Vec::with_capacity(sequence.len() + 1);
        let mut start = 0.0;
        for event in sequence.events() {
            spans.push(Span { start, end: event.time });
            start = event.time;
        }
        spans.push(Span { start, end: sequence.t_end() });
        Self { sequence, spans }
    }

    pub fn sequence(&self) -> &Sequence {
        &self.sequence
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// Span indices owned by event `k`.
    ///
    /// # Errors
    /// `EventIndexOutOfRange` when `k >= len()`.
    pub fn owned_spans(&self, k: usize) -> ProcessResult<Range<usize>> {
        validate_event_index(k, self.len())?;
        if k + 1 == self.len() { Ok(k..k + 2) } else { Ok(k..k + 1) }
    }
}
