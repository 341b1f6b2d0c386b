//! Event-sequence container consumed by point-process models.
//!
//! Purpose
//! -------
//! Provide a small, validated container for a multi-dimensional event
//! history observed on `[0, t_end]`. This module centralizes the input
//! checks so that models, simulators, and diagnostics can rely on ordered,
//! in-range events without re-validating them.
//!
//! Key behaviors
//! -------------
//! - [`Sequence::new`] validates a whole history at once; [`Sequence::push`]
//!   extends it one event at a time with the same checks.
//! - [`Sequence::count_before`] and [`Sequence::count_at_or_before`] give the
//!   number of events strictly before (or at or before) a time by binary
//!   search, which is how models enforce causality.
//!
//! Invariants & assumptions
//! ------------------------
//! - `num_dims >= 1`.
//! - `t_end` is finite and `>= 0`.
//! - Event times are finite, `>= 0`, non-decreasing, and `<= t_end`.
//!   Ties are allowed.
//! - Every event dimension is `< num_dims`.
//!
//! Conventions
//! -----------
//! - Indexing is 0-based; event `k` is the `k`-th event in time order.
//! - Models borrow sequences and never mutate them.
use crate::process::errors::{ProcessError, ProcessResult};

/// One timestamped, dimension-tagged event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Event {
    pub time: f64,
    pub dim: usize,
}

impl Event {
    pub fn new(time: f64, dim: usize) -> Self {
        Self { time, dim }
    }
}

/// Validated event history on `[0, t_end]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Sequence {
    events: Vec<Event>,
    num_dims: usize,
    t_end: f64,
}

impl Sequence {
    /// Construct a validated sequence.
    ///
    /// Errors
    /// ------
    /// - `ProcessError::InvalidSize` when `num_dims == 0`.
    /// - `ProcessError::InvalidHorizon` when `t_end` is non-finite or < 0.
    /// - `ProcessError::NonFiniteEventTime` / `NegativeEventTime` /
    ///   `UnorderedEvents` / `EventDimOutOfRange` / `EventAfterHorizon` for
    ///   the first offending event.
    ///
    /// Examples
    /// --------
    /// ```rust
    /// # use rust_pointprocess::process::core::sequence::{Event, Sequence};
    /// let seq = Sequence::new(vec![Event::new(0.5, 0), Event::new(1.5, 1)], 2, 3.0).unwrap();
    /// assert_eq!(seq.count_before(1.5), 1);
    /// assert_eq!(seq.count_at_or_before(1.5), 2);
    /// ```
    pub fn new(events: Vec<Event>, num_dims: usize, t_end: f64) -> ProcessResult<Self> {
        let mut seq = Self::empty(num_dims, t_end)?;
        seq.events.reserve(events.len());
        for event in events {
            seq.push(event)?;
        }
        Ok(seq)
    }

    /// A history with no events.
    ///
    /// # Errors
    /// `InvalidSize` or `InvalidHorizon` as in [`Sequence::new`].
    pub fn empty(num_dims: usize, t_end: f64) -> ProcessResult<Self> {
        if num_dims == 0 {
            return Err(ProcessError::InvalidSize { n: 0, num_dims });
        }
        if !t_end.is_finite() || t_end < 0.0 {
            return Err(ProcessError::InvalidHorizon { value: t_end });
        }
        Ok(Self { events: Vec::new(), num_dims, t_end })
    }

    /// Build from parallel `times` / `dims` slices.
    ///
    /// # Errors
    /// `DimensionMismatch` when the slices differ in length, then everything
    /// [`Sequence::new`] reports.
    pub fn from_parts(
        times: &[f64], dims: &[usize], num_dims: usize, t_end: f64,
    ) -> ProcessResult<Self> {
        if times.len() != dims.len() {
            return Err(ProcessError::DimensionMismatch {
                expected: times.len(),
                actual: dims.len(),
            });
        }
        let events = times.iter().zip(dims).map(|(&time, &dim)| Event { time, dim }).collect();
        Self::new(events, num_dims, t_end)
    }

    /// Append one event, keeping every invariant.
    pub fn push(&mut self, event: Event) -> ProcessResult<()> {
        let index = self.events.len();
        let Event { time, dim } = event;
        if !time.is_finite() {
            return Err(ProcessError::NonFiniteEventTime { index, value: time });
        }
        if time < 0.0 {
            return Err(ProcessError::NegativeEventTime { index, value: time });
        }
        if let Some(last) = self.events.last() {
            if time < last.time {
                return Err(ProcessError::UnorderedEvents { index, previous: last.time, value: time });
            }
        }
        if dim >= self.num_dims {
            return Err(ProcessError::EventDimOutOfRange { index, dim, num_dims: self.num_dims });
        }
        if time > self.t_end {
            return Err(ProcessError::EventAfterHorizon { index, time, t_end: self.t_end });
        }
        self.events.push(event);
        Ok(())
    }

    /// Move the end of the observation window back to `t_end`.
    ///
    /// # Errors
    /// - `InvalidHorizon` when `t_end` is non-finite or negative, or later
    ///   than the current end.
    /// - `EventAfterHorizon` when the last event lies after `t_end`.
    pub fn close_window(&mut self, t_end: f64) -> ProcessResult<()> {
        if !t_end.is_finite() || t_end < 0.0 || t_end > self.t_end {
            return Err(ProcessError::InvalidHorizon { value: t_end });
        }
        if let Some(last) = self.events.last() {
            if last.time > t_end {
                return Err(ProcessError::EventAfterHorizon {
                    index: self.events.len() - 1,
                    time: last.time,
                    t_end,
                });
            }
        }
        self.t_end = t_end;
        Ok(())
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn num_dims(&self) -> usize {
        self.num_dims
    }

    pub fn t_end(&self) -> f64 {
        self.t_end
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of events with `time < t`.
    pub fn count_before(&self, t: f64) -> usize {
        self.events.partition_point(|e| e.time < t)
    }

    /// Number of events with `time <= t`.
    pub fn count_at_or_before(&self, t: f64) -> usize {
        self.events.partition_point(|e| e.time <= t)
    }

    pub fn times(&self) -> Vec<f64> {
        self.events.iter().map(|e| e.time).collect()
    }

    pub fn dims(&self) -> Vec<usize> {
        self.events.iter().map(|e| e.dim).collect()
    }

    /// Event counts per dimension over the whole history.
    pub fn counts_by_dim(&self) -> Vec<usize> {
        let mut counts = vec![0; self.num_dims];
        for e in &self.events {
            counts[e.dim] += 1;
        }
        counts
    }
}
