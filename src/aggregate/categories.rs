//! Categorical aggregation.
//!
//! Every partial grid of one render must index categories the same way for
//! rollup to be meaningful, so the ordering is built once as a
//! [`CategoryOrder`] and shared by `Arc` with every [`CountCategories`].

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::sync::Arc;

use super::{allocate_checked, fold_footprint, Aggregator};
use crate::error::{Error, Result};
use crate::geometry::ShapeCode;
use crate::grid::Grid;

/// Fixed mapping from category values to plane indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryOrder<K> {
    keys: Vec<K>,
    index: BTreeMap<K, usize>,
}

impl<K: Ord + Clone> CategoryOrder<K> {
    /// Categories in the order given; repeated keys keep their first position.
    #[must_use]
    pub fn new(keys: impl IntoIterator<Item = K>) -> Self {
        let mut order = Self {
            keys: Vec::new(),
            index: BTreeMap::new(),
        };
        for key in keys {
            if !order.index.contains_key(&key) {
                order.index.insert(key.clone(), order.keys.len());
                order.keys.push(key);
            }
        }
        order
    }

    /// Sorted unique categories found in `values`.
    ///
    /// # Example
    ///
    /// ```
    /// use trueno_ar::aggregate::CategoryOrder;
    ///
    /// let order = CategoryOrder::from_values(&["b", "a", "b", "c"]);
    /// assert_eq!(order.keys(), &["a", "b", "c"]);
    /// assert_eq!(order.index_of(&"c"), Some(2));
    /// ```
    #[must_use]
    pub fn from_values<'a>(values: impl IntoIterator<Item = &'a K>) -> Self
    where
        K: 'a,
    {
        let mut keys: Vec<K> = values.into_iter().cloned().collect();
        keys.sort();
        keys.dedup();
        Self::new(keys)
    }

    /// Plane index of `key`.
    #[must_use]
    pub fn index_of(&self, key: &K) -> Option<usize> {
        self.index.get(key).copied()
    }

    /// Categories in plane order.
    #[must_use]
    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    /// Number of categories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether there are no categories.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Counts glyphs per category at each pixel.
///
/// Grids have shape `(height, width, |categories|)`; combining a glyph adds 1
/// to the plane of its category only.
#[derive(Debug, Clone)]
pub struct CountCategories<K> {
    order: Arc<CategoryOrder<K>>,
}

impl<K> CountCategories<K> {
    /// Create an aggregator over a shared category ordering.
    #[must_use]
    pub fn new(order: Arc<CategoryOrder<K>>) -> Self {
        Self { order }
    }

    /// The shared category ordering.
    #[must_use]
    pub fn order(&self) -> &Arc<CategoryOrder<K>> {
        &self.order
    }
}

impl<K: Ord + Clone + Debug> Aggregator<K> for CountCategories<K> {
    fn allocate(&self, screen: (u32, u32)) -> Result<Grid> {
        allocate_checked(screen, Some(self.order.len()))
    }

    fn combine(&self, grid: &mut Grid, pixel: [i64; 4], shape: ShapeCode, value: &K) -> Result<()> {
        let k = self
            .order
            .index_of(value)
            .ok_or_else(|| Error::UnknownCategory(format!("{value:?}")))?;
        if grid.depth() != self.order.len() {
            return Err(Error::ShapeMismatch {
                expected: (grid.height(), grid.width(), self.order.len()),
                found: grid.shape(),
            });
        }
        let mut one_hot = vec![0.0; grid.depth()];
        one_hot[k] = 1.0;
        fold_footprint(grid, pixel, shape, &one_hot);
        Ok(())
    }
}
