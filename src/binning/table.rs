//! Multi-dimensional binning with several reductions per cell.

use chrono::NaiveDateTime;

use super::{bin_index, bin_range, extent, BinKey};
use crate::error::{Error, Result};

/// Edges of one binned dimension.
#[derive(Debug, Clone, PartialEq)]
pub enum Edges {
    /// Numeric bin starts.
    Numeric(Vec<f64>),
    /// Calendar bin starts.
    Calendar(Vec<NaiveDateTime>),
}

impl Edges {
    /// Number of bins.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Numeric(e) => e.len(),
            Self::Calendar(e) => e.len(),
        }
    }

    /// Whether there are no bins.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Numeric edges, if this dimension is numeric.
    #[must_use]
    pub fn as_numeric(&self) -> Option<&[f64]> {
        match self {
            Self::Numeric(e) => Some(e),
            Self::Calendar(_) => None,
        }
    }

    /// Calendar edges, if this dimension is temporal.
    #[must_use]
    pub fn as_calendar(&self) -> Option<&[NaiveDateTime]> {
        match self {
            Self::Calendar(e) => Some(e),
            Self::Numeric(_) => None,
        }
    }
}

/// Bin assignment for one dimension over a whole dataset.
trait Axis<R> {
    /// Edges and, per row, its bin index (`None` for incomparable keys).
    fn assign(&self, rows: &[R]) -> Result<(Edges, Vec<Option<usize>>)>;
}

struct KeyAxis<K: BinKey, F> {
    key: F,
    step: K::Step,
    range: Option<(K, K)>,
}

impl<R, K: BinKey, F: Fn(&R) -> K> Axis<R> for KeyAxis<K, F> {
    fn assign(&self, rows: &[R]) -> Result<(Edges, Vec<Option<usize>>)> {
        K::check_step(&self.step)?;
        let keys: Vec<K> = rows.iter().map(&self.key).collect();
        let (lo, hi) = match self.range {
            Some(range) => range,
            None => extent(keys.iter().copied()).ok_or(Error::EmptyData)?,
        };
        let edges = bin_range(lo.truncate(&self.step)?, hi.truncate(&self.step)?, &self.step)?;

        let mut clamped = 0usize;
        let indices = keys
            .iter()
            .map(|&k| {
                let outside = k < edges[0] || edges.last().is_some_and(|last| k.truncate(&self.step).is_ok_and(|t| t > *last));
                if outside {
                    clamped += 1;
                }
                bin_index(&edges, k)
            })
            .collect();
        if clamped > 0 {
            crate::log::warn!(clamped, "clamped out-of-range keys into edge bins");
        }
        Ok((K::into_edges(edges), indices))
    }
}

/// One grouping dimension of [`bin`]: a named key accessor and a step.
pub struct Dimension<'a, R> {
    name: String,
    axis: Box<dyn Axis<R> + 'a>,
}

impl<R> std::fmt::Debug for Dimension<'_, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dimension").field("name", &self.name).finish_non_exhaustive()
    }
}

impl<'a, R> Dimension<'a, R> {
    /// Bins spanning the keys found in the data.
    pub fn new<K, F>(name: impl Into<String>, key: F, step: K::Step) -> Self
    where
        K: BinKey + 'a,
        K::Step: 'a,
        F: Fn(&R) -> K + 'a,
    {
        Self {
            name: name.into(),
            axis: Box::new(KeyAxis { key, step, range: None }),
        }
    }

    /// Bins spanning `[start, stop]`; keys outside are clamped into the first
    /// or last bin.
    pub fn ranged<K, F>(name: impl Into<String>, key: F, step: K::Step, start: K, stop: K) -> Self
    where
        K: BinKey + 'a,
        K::Step: 'a,
        F: Fn(&R) -> K + 'a,
    {
        Self {
            name: name.into(),
            axis: Box::new(KeyAxis {
                key,
                step,
                range: Some((start, stop)),
            }),
        }
    }

    /// Dimension name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

type Accessor<'a, R> = Box<dyn Fn(&R) -> f64 + 'a>;

/// Per-cell reduction computed by [`bin`].
///
/// Empty cells report 0 for `Count` and `Sum` and NaN for the others.
pub enum Reduction<'a, R> {
    /// Number of rows.
    Count,
    /// Sum of a field.
    Sum(Accessor<'a, R>),
    /// Mean of a field.
    Mean(Accessor<'a, R>),
    /// Minimum of a field.
    Min(Accessor<'a, R>),
    /// Maximum of a field.
    Max(Accessor<'a, R>),
}

impl<R> std::fmt::Debug for Reduction<'_, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Count => "Count",
            Self::Sum(_) => "Sum",
            Self::Mean(_) => "Mean",
            Self::Min(_) => "Min",
            Self::Max(_) => "Max",
        })
    }
}

impl<'a, R> Reduction<'a, R> {
    /// Sum of `field`.
    pub fn sum(field: impl Fn(&R) -> f64 + 'a) -> Self {
        Self::Sum(Box::new(field))
    }

    /// Mean of `field`.
    pub fn mean(field: impl Fn(&R) -> f64 + 'a) -> Self {
        Self::Mean(Box::new(field))
    }

    /// Minimum of `field`.
    pub fn min(field: impl Fn(&R) -> f64 + 'a) -> Self {
        Self::Min(Box::new(field))
    }

    /// Maximum of `field`.
    pub fn max(field: impl Fn(&R) -> f64 + 'a) -> Self {
        Self::Max(Box::new(field))
    }

    fn identity(&self) -> f64 {
        match self {
            Self::Count | Self::Sum(_) | Self::Mean(_) => 0.0,
            Self::Min(_) => f64::INFINITY,
            Self::Max(_) => f64::NEG_INFINITY,
        }
    }

    fn fold(&self, acc: &mut f64, row: &R) {
        match self {
            Self::Count => *acc += 1.0,
            Self::Sum(f) | Self::Mean(f) => *acc += f(row),
            Self::Min(f) => *acc = acc.min(f(row)),
            Self::Max(f) => *acc = acc.max(f(row)),
        }
    }

    fn finish(&self, acc: f64, rows: u64) -> f64 {
        match self {
            Self::Count | Self::Sum(_) => acc,
            _ if rows == 0 => f64::NAN,
            #[allow(clippy::cast_precision_loss)]
            Self::Mean(_) => acc / rows as f64,
            Self::Min(_) | Self::Max(_) => acc,
        }
    }
}

/// Dense N-dimensional result of [`bin`].
#[derive(Debug, Clone, PartialEq)]
pub struct BinnedTable {
    dimensions: Vec<(String, Edges)>,
    shape: Vec<usize>,
    columns: Vec<(String, Vec<f64>)>,
}

impl BinnedTable {
    /// Dimension names with their edges, in grouping order.
    pub fn dimensions(&self) -> impl Iterator<Item = (&str, &Edges)> {
        self.dimensions.iter().map(|(n, e)| (n.as_str(), e))
    }

    /// Edges of the named dimension.
    #[must_use]
    pub fn edges(&self, name: &str) -> Option<&Edges> {
        self.dimensions.iter().find(|(n, _)| n == name).map(|(_, e)| e)
    }

    /// Number of bins along each dimension.
    #[must_use]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Row-major cells of the named reduction (last dimension fastest).
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns.iter().find(|(n, _)| n == name).map(|(_, c)| c.as_slice())
    }

    /// One cell of the named reduction.
    #[must_use]
    pub fn get(&self, name: &str, index: &[usize]) -> Option<f64> {
        let flat = flat_index(&self.shape, index)?;
        self.column(name)?.get(flat).copied()
    }
}

fn flat_index(shape: &[usize], index: &[usize]) -> Option<usize> {
    if index.len() != shape.len() {
        return None;
    }
    index.iter().zip(shape).try_fold(0usize, |acc, (&i, &n)| (i < n).then_some(acc * n + i))
}

/// Group `rows` along every dimension at once and compute each reduction per cell.
///
/// Every combination of bins is present in the output, empty or not.
///
/// # Errors
///
/// Returns [`Error::EmptyData`] if a dimension has no comparable key and no
/// explicit range, and [`Error::InvalidBinStep`] for a bad step.
///
/// # Example
///
/// ```
/// use trueno_ar::binning::{bin, Dimension, Reduction};
///
/// let rows = [(1.0, 10.0), (1.5, 20.0), (4.0, 5.0)];
/// let table = bin(
///     &rows,
///     &[Dimension::new("x", |r: &(f64, f64)| r.0, 2.0)],
///     &[("n", Reduction::Count), ("total", Reduction::sum(|r: &(f64, f64)| r.1))],
/// )
/// .unwrap();
/// assert_eq!(table.shape(), &[3]);
/// assert_eq!(table.column("n"), Some(&[2.0, 0.0, 1.0][..]));
/// assert_eq!(table.column("total"), Some(&[30.0, 0.0, 5.0][..]));
/// ```
pub fn bin<R>(rows: &[R], dimensions: &[Dimension<'_, R>], reductions: &[(&str, Reduction<'_, R>)]) -> Result<BinnedTable> {
    let mut edges = Vec::with_capacity(dimensions.len());
    let mut assignments = Vec::with_capacity(dimensions.len());
    for dim in dimensions {
        let (e, idx) = dim.axis.assign(rows)?;
        edges.push((dim.name.clone(), e));
        assignments.push(idx);
    }
    let shape: Vec<usize> = edges.iter().map(|(_, e)| e.len()).collect();
    let cells: usize = shape.iter().product();
    crate::log::debug!(dimensions = shape.len(), cells, rows = rows.len(), "binning table");

    let mut populations = vec![0u64; cells];
    let mut accs: Vec<Vec<f64>> = reductions.iter().map(|(_, r)| vec![r.identity(); cells]).collect();

    'rows: for (r, row) in rows.iter().enumerate() {
        let mut flat = 0usize;
        for (idx, &n) in assignments.iter().zip(&shape) {
            let Some(i) = idx[r] else { continue 'rows };
            flat = flat * n + i;
        }
        populations[flat] += 1;
        for ((_, reduction), acc) in reductions.iter().zip(accs.iter_mut()) {
            reduction.fold(&mut acc[flat], row);
        }
    }

    let columns = reductions
        .iter()
        .zip(accs)
        .map(|((name, reduction), acc)| {
            let values = acc
                .into_iter()
                .zip(&populations)
                .map(|(v, &n)| reduction.finish(v, n))
                .collect();
            ((*name).to_string(), values)
        })
        .collect();

    Ok(BinnedTable {
        dimensions: edges,
        shape,
        columns,
    })
}
