//! # Lookup table
//!
//! A one dimensional lookup table mapping an independent variable `x` onto a
//! dependent variable `y` by piecewise-linear interpolation between the
//! table's points. Outside the range of the table the value of the nearest
//! end point is returned, i.e. the table extrapolates flat.
//!
//! Points may be added in any order, but the table must be sorted (by calling
//! `sort`) before it can be queried. Adding a point to a sorted table marks it
//! unsorted again.
//!
//! ## Duplicate keys
//!
//! Several points may share the same `x`. Sorting is stable, so duplicates
//! keep their insertion order, and a query which lands exactly on a
//! duplicated key returns the first inserted value. Queries just above the
//! key interpolate away from the last inserted value, so a set of duplicates
//! describes a step in the table.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use num_traits::Float;
use serde::{Deserialize, Deserializer};
use std::cmp::Ordering;
use std::convert::TryFrom;
use thiserror::Error;

// Internal
use crate::maths::lin_map;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A piecewise-linear lookup table.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupTable<T> {
    /// Points in the table as `(x, y)` pairs
    points: Vec<(T, T)>,

    /// True if the points are ordered by ascending `x`
    sorted: bool,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors which can occur when building or querying a lookup table.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum LookupError {
    #[error("Cannot add a non-finite point to the lookup table")]
    NonFinitePoint,

    #[error("The lookup table is empty")]
    Empty,

    #[error("The lookup table must be sorted before it can be queried")]
    NotSorted,

    #[error("Cannot query the lookup table with NaN")]
    NanQuery,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<T> LookupTable<T>
where
    T: Float
{
    /// Create a new empty table.
    pub fn new() -> Self {
        Self {
            points: Vec::new(),
            sorted: false,
        }
    }

    /// Build a sorted table from a set of `(x, y)` points.
    pub fn from_points<I>(points: I) -> Result<Self, LookupError>
    where
        I: IntoIterator<Item = (T, T)>
    {
        let mut table = Self::new();

        for (x, y) in points {
            table.add(x, y)?;
        }

        table.sort();

        Ok(table)
    }

    /// Add a point to the table.
    ///
    /// The table will need to be sorted again before the next query.
    pub fn add(&mut self, x: T, y: T) -> Result<(), LookupError> {
        if !x.is_finite() || !y.is_finite() {
            return Err(LookupError::NonFinitePoint)
        }

        self.points.push((x, y));
        self.sorted = false;

        Ok(())
    }

    /// Sort the points of the table by ascending `x`.
    pub fn sort(&mut self) {
        // Points are always finite so the partial comparison never fails
        self.points
            .sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
        self.sorted = true;
    }

    /// Get the value of the table at `x`.
    ///
    /// Values of `x` outside the table return the value of the nearest end
    /// point. Values of `x` matching a point exactly return that point's `y`
    /// without interpolation.
    pub fn query(&self, x: T) -> Result<T, LookupError> {
        let (first, last) = match (self.points.first(), self.points.last()) {
            (Some(f), Some(l)) => (*f, *l),
            _ => return Err(LookupError::Empty)
        };

        if !self.sorted {
            return Err(LookupError::NotSorted)
        }

        if x.is_nan() {
            return Err(LookupError::NanQuery)
        }

        // Flat extrapolation beyond either end
        if x > last.0 {
            return Ok(last.1)
        }
        if x < first.0 {
            return Ok(first.1)
        }

        // Lower bound, the first point whose x is not less than the query.
        // This is always in range as x <= last.0.
        let i = self.points.partition_point(|p| p.0 < x);
        let upper = self.points[i];

        if i == 0 || upper.0 == x {
            return Ok(upper.1)
        }

        let lower = self.points[i - 1];

        Ok(lin_map((lower.0, upper.0), (lower.1, upper.1), x))
    }

    /// Number of points in the table.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True if the table has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// True if the table is ready to be queried.
    pub fn is_sorted(&self) -> bool {
        self.sorted
    }

    /// The points of the table, in sorted order if the table is sorted.
    pub fn points(&self) -> &[(T, T)] {
        &self.points
    }
}

impl<T> Default for LookupTable<T>
where
    T: Float
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TryFrom<Vec<(T, T)>> for LookupTable<T>
where
    T: Float
{
    type Error = LookupError;

    fn try_from(points: Vec<(T, T)>) -> Result<Self, Self::Error> {
        Self::from_points(points)
    }
}

/// Tables are deserialised from a list of `[x, y]` pairs and are sorted on
/// load.
impl<'de, T> Deserialize<'de> for LookupTable<T>
where
    T: Float + Deserialize<'de>
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>
    {
        let points = Vec::<(T, T)>::deserialize(deserializer)?;
        Self::from_points(points).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn two_point() -> LookupTable<f64> {
        LookupTable::from_points(vec![(0.0, 0.0), (10.0, 100.0)]).unwrap()
    }

    #[test]
    fn test_interpolate_and_clamp() {
        let table = two_point();

        assert_eq!(table.query(5.0), Ok(50.0));
        assert_eq!(table.query(-5.0), Ok(0.0));
        assert_eq!(table.query(15.0), Ok(100.0));
        assert_eq!(table.query(0.0), Ok(0.0));
        assert_eq!(table.query(10.0), Ok(100.0));
    }

    #[test]
    fn test_unordered_insert() {
        let mut table = LookupTable::new();
        table.add(20.0, 0.5).unwrap();
        table.add(0.0, 1.5).unwrap();
        table.add(10.0, 1.0).unwrap();

        assert_eq!(table.query(5.0), Err(LookupError::NotSorted));

        table.sort();

        assert_eq!(table.points(), &[(0.0, 1.5), (10.0, 1.0), (20.0, 0.5)]);
        assert!((table.query(5.0).unwrap() - 1.25).abs() < 1e-12);
        assert!((table.query(15.0).unwrap() - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_exact_keys() {
        let points = vec![
            (-3.3, 0.1),
            (-1.0, 7.77),
            (0.1, -2.5),
            (0.7, 1e-3),
            (2.2, 42.0),
            (9.81, 3.14159),
        ];
        let table = LookupTable::from_points(points.clone()).unwrap();

        for (x, y) in points {
            assert_eq!(table.query(x), Ok(y));
        }
    }

    #[test]
    fn test_continuous_at_ends() {
        let table = LookupTable::from_points(vec![(1.0, 2.0), (2.0, 4.0), (3.0, 3.0)])
            .unwrap();

        let eps = 1e-9;
        assert!((table.query(1.0 - eps).unwrap() - table.query(1.0 + eps).unwrap()).abs() < 1e-6);
        assert!((table.query(3.0 - eps).unwrap() - table.query(3.0 + eps).unwrap()).abs() < 1e-6);
    }

    #[test]
    fn test_duplicate_keys() {
        let mut table = LookupTable::new();
        table.add(0.0, 0.0).unwrap();
        table.add(1.0, 10.0).unwrap();
        table.add(1.0, 20.0).unwrap();
        table.add(2.0, 30.0).unwrap();
        table.sort();

        // Exact hit returns the first inserted duplicate
        assert_eq!(table.query(1.0), Ok(10.0));

        // Either side interpolates towards the respective duplicate
        assert!((table.query(0.5).unwrap() - 5.0).abs() < 1e-12);
        assert!((table.query(1.5).unwrap() - 25.0).abs() < 1e-12);
    }

    #[test]
    fn test_single_point() {
        let table = LookupTable::from_points(vec![(3.0, -1.0)]).unwrap();

        assert_eq!(table.query(-100.0), Ok(-1.0));
        assert_eq!(table.query(3.0), Ok(-1.0));
        assert_eq!(table.query(100.0), Ok(-1.0));
    }

    #[test]
    fn test_errors() {
        let mut table: LookupTable<f64> = LookupTable::new();
        assert_eq!(table.query(0.0), Err(LookupError::Empty));

        assert_eq!(table.add(std::f64::NAN, 1.0), Err(LookupError::NonFinitePoint));
        assert_eq!(table.add(1.0, std::f64::INFINITY), Err(LookupError::NonFinitePoint));
        assert!(table.is_empty());

        table.add(1.0, 1.0).unwrap();
        table.sort();
        assert_eq!(table.query(std::f64::NAN), Err(LookupError::NanQuery));

        // Adding after sorting requires another sort
        table.add(0.0, 0.0).unwrap();
        assert!(!table.is_sorted());
        assert_eq!(table.query(0.5), Err(LookupError::NotSorted));
        table.sort();
        assert_eq!(table.query(0.5), Ok(0.5));
    }

    #[test]
    fn test_wide_table() {
        let table = LookupTable::from_points(vec![(-1e308, 0.0), (1e308, 1.0)]).unwrap();
        assert_eq!(table.query(0.0), Ok(0.5));

        let table = LookupTable::from_points(vec![(0.0, -1e308), (1.0, 1e308)]).unwrap();
        assert_eq!(table.query(0.5), Ok(0.0));
    }

    #[test]
    fn test_f32_table() {
        let table = LookupTable::from_points(vec![(0f32, 0f32), (4f32, 2f32)]).unwrap();
        assert_eq!(table.query(2f32), Ok(1f32));
    }

    #[test]
    fn test_deserialise() {
        #[derive(Deserialize)]
        struct Params {
            table: LookupTable<f64>,
        }

        let p: Params = crate::params::from_str("table = [[10.0, 1.0], [0.0, 0.0]]\n").unwrap();
        assert_eq!(p.table.len(), 2);
        assert!(p.table.is_sorted());
        assert_eq!(p.table.query(5.0), Ok(0.5));

        assert!(crate::params::from_str::<Params>("table = [[nan, 1.0]]\n").is_err());
    }

    #[test]
    fn test_concurrent_queries() {
        let table = std::sync::Arc::new(two_point());

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let t = table.clone();
                std::thread::spawn(move || t.query(i as f64).unwrap())
            })
            .collect();

        for (i, h) in handles.into_iter().enumerate() {
            assert_eq!(h.join().unwrap(), 10.0 * i as f64);
        }
    }
}
