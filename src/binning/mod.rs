//! Histogram-style binning of numeric and calendar values.
//!
//! A bin key type implements [`BinKey`]: `f64` with a numeric step, and
//! `chrono` dates and date-times with a [`CalendarStep`]. Edges are bin
//! starts; bin `i` covers `[edges[i], edges[i + 1])` and the last bin is
//! closed at its edge.
//!
//! # Example
//!
//! ```
//! use trueno_ar::binning::bin1d;
//!
//! let (edges, counts) = bin1d(&[1.0, 2.0, 3.0, 10.0], &2.0).unwrap();
//! assert_eq!(edges, vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);
//! assert_eq!(counts, vec![1, 2, 0, 0, 0, 1]);
//! ```

mod calendar;
mod table;

pub use calendar::{CalendarStep, TimeUnit};
pub use table::{bin, BinnedTable, Dimension, Edges, Reduction};

use std::cmp::Ordering;
use std::fmt::Debug;

use crate::error::{Error, Result};

/// A value that can be grouped into bins of a given step.
pub trait BinKey: Copy + PartialOrd + Debug {
    /// Bin width: a number, or a calendar measure and unit.
    type Step: Debug;

    /// Reject steps that cannot produce increasing edges.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBinStep`] for a non-positive step.
    fn check_step(step: &Self::Step) -> Result<()>;

    /// Start of the bin containing `self`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBinStep`] if the result is out of range.
    fn truncate(self, step: &Self::Step) -> Result<Self>;

    /// Start of a range of edges beginning at `self`. Numbers are used as
    /// given; calendar values are truncated to their unit.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBinStep`] if the result is out of range.
    fn align(self, step: &Self::Step) -> Result<Self>;

    /// The `i`th edge after `self`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBinStep`] if the edge is out of range.
    fn nth_edge(self, step: &Self::Step, i: u32) -> Result<Self>;

    /// Wrap an edge list for a heterogeneous [`BinnedTable`].
    fn into_edges(edges: Vec<Self>) -> Edges;
}

impl BinKey for f64 {
    type Step = f64;

    fn check_step(step: &f64) -> Result<()> {
        if step.is_finite() && *step > 0.0 {
            Ok(())
        } else {
            Err(Error::InvalidBinStep(format!("numeric step {step} must be finite and positive")))
        }
    }

    fn truncate(self, step: &f64) -> Result<Self> {
        Ok((self / step).floor() * step)
    }

    fn align(self, _step: &f64) -> Result<Self> {
        Ok(self)
    }

    fn nth_edge(self, step: &f64, i: u32) -> Result<Self> {
        Ok(self + f64::from(i) * step)
    }

    fn into_edges(edges: Vec<Self>) -> Edges {
        Edges::Numeric(edges)
    }
}

/// Edges from `start` up to the first edge at or beyond `stop`.
///
/// Calendar endpoints are first truncated to their unit, so month and year
/// edges fall on calendar boundaries rather than fixed durations.
///
/// # Errors
///
/// Returns [`Error::InvalidBinStep`] for a non-positive step or an edge that
/// leaves the representable range.
///
/// # Example
///
/// ```
/// use trueno_ar::binning::bin_range;
///
/// assert_eq!(bin_range(0.0, 10.0, &2.0).unwrap(), vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);
/// ```
pub fn bin_range<K: BinKey>(start: K, stop: K, step: &K::Step) -> Result<Vec<K>> {
    K::check_step(step)?;
    let start = start.align(step)?;
    let stop = stop.align(step)?;

    let mut edges = vec![start];
    let mut i = 0u32;
    while edges.last().is_some_and(|e| *e < stop) {
        i = i
            .checked_add(1)
            .ok_or_else(|| Error::InvalidBinStep(format!("too many edges for step {step:?}")))?;
        edges.push(start.nth_edge(step, i)?);
    }
    crate::log::debug!(edges = edges.len(), ?step, "generated bin edges");
    Ok(edges)
}

/// Index of the bin of `edges` holding `value`, clamped into range.
///
/// Returns `None` for incomparable values (NaN).
pub(crate) fn bin_index<K: BinKey>(edges: &[K], value: K) -> Option<usize> {
    value.partial_cmp(&value)?;
    let above = edges.partition_point(|e| *e <= value);
    Some(above.saturating_sub(1).min(edges.len().saturating_sub(1)))
}

/// Smallest and largest comparable values.
pub(crate) fn extent<K: BinKey>(values: impl IntoIterator<Item = K>) -> Option<(K, K)> {
    values
        .into_iter()
        .filter(|v| v.partial_cmp(v).is_some())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((
                if v.partial_cmp(&lo) == Some(Ordering::Less) { v } else { lo },
                if v.partial_cmp(&hi) == Some(Ordering::Greater) { v } else { hi },
            )),
        })
}

/// Count `values` per bin of width `step`.
///
/// Edges run from the bin of the smallest value to the bin of the largest,
/// and every bin in between is reported, with a count of zero if empty.
/// Incomparable values (NaN) are skipped.
///
/// # Errors
///
/// Returns [`Error::EmptyData`] when there is no comparable value and
/// [`Error::InvalidBinStep`] for a bad step.
pub fn bin1d<K: BinKey>(values: &[K], step: &K::Step) -> Result<(Vec<K>, Vec<u64>)> {
    K::check_step(step)?;
    let (min, max) = extent(values.iter().copied()).ok_or(Error::EmptyData)?;
    let edges = bin_range(min.truncate(step)?, max.truncate(step)?, step)?;

    let mut counts = vec![0u64; edges.len()];
    let mut skipped = 0usize;
    for &v in values {
        match bin_index(&edges, v) {
            Some(i) => counts[i] += 1,
            None => skipped += 1,
        }
    }
    if skipped > 0 {
        crate::log::warn!(skipped, "skipped incomparable values while binning");
    }
    Ok((edges, counts))
}
