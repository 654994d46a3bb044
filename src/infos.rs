//! Info functions: turn a glyph's data payload into the value an aggregator folds.
//!
//! An info function receives the projected glyph and its raw data value. The
//! helpers here ignore the glyph and read the data.

use std::collections::HashMap;
use std::hash::Hash;

use crate::geometry::Glyph;

/// Always return `v`.
pub fn constant<D, V: Clone>(v: V) -> impl Fn(&Glyph, &D) -> V + Clone {
    move |_: &Glyph, _: &D| v.clone()
}

/// Return the data value itself.
pub fn value<D: Clone>() -> impl Fn(&Glyph, &D) -> D + Copy {
    |_: &Glyph, data: &D| data.clone()
}

/// Return the data value, or `default` where it is absent.
pub fn value_or<T: Clone>(default: T) -> impl Fn(&Glyph, &Option<T>) -> T + Clone {
    move |_: &Glyph, data: &Option<T>| data.clone().unwrap_or_else(|| default.clone())
}

/// Return element `i` of a sequence-valued datum, or `default` if it is too short.
pub fn value_at<D, T>(i: usize, default: T) -> impl Fn(&Glyph, &D) -> T + Clone
where
    D: AsRef<[T]>,
    T: Clone,
{
    move |_: &Glyph, data: &D| data.as_ref().get(i).cloned().unwrap_or_else(|| default.clone())
}

/// Return the entry under `k` of a map-valued datum, or `default` if missing.
pub fn key<K, V>(k: K, default: V) -> impl Fn(&Glyph, &HashMap<K, V>) -> V + Clone
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    move |_: &Glyph, data: &HashMap<K, V>| data.get(&k).cloned().unwrap_or_else(|| default.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    const G: Glyph = Glyph::new(0.0, 0.0, 0.0, 0.0);

    #[test]
    fn test_constant() {
        let info = constant::<&str, _>(3);
        assert_eq!(info(&G, &"anything"), 3);
        assert_eq!(info(&G, &"else"), 3);
    }

    #[test]
    fn test_value() {
        let info = value::<String>();
        assert_eq!(info(&G, &"x".to_string()), "x");

        let info = value_or(7);
        assert_eq!(info(&G, &Some(2)), 2);
        assert_eq!(info(&G, &None), 7);
    }

    #[test]
    fn test_value_at() {
        let info = value_at::<Vec<i32>, _>(1, -1);
        assert_eq!(info(&G, &vec![3, 4, 5]), 4);
        assert_eq!(info(&G, &vec![3]), -1);

        let arr = value_at::<[f32; 2], _>(0, 0.0);
        assert_eq!(arr(&G, &[1.5, 2.5]), 1.5);
    }

    #[test]
    fn test_key() {
        let info = key("cat", 0);
        let mut row = HashMap::new();
        row.insert("cat", 4);
        assert_eq!(info(&G, &row), 4);
        assert_eq!(info(&G, &HashMap::new()), 0);
    }
}
