//! This is the point module
//! Provide the fixed-dimension point type and squared Euclidean distance

use serde::{Serialize, Deserialize};
use std::ops::Index;

/// A point in k-dimensional space.
///
/// The dimension is fixed when the point is created and every point stored in
/// one tree must have the same dimension. Coordinates are accessed by index.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point(Vec<f32>);

impl Point {
    /// Creates a point from its coordinate vector.
    pub fn new(coords: Vec<f32>) -> Point {
        Point(coords)
    }

    /// Returns the dimension (number of coordinates) of the point.
    pub fn dim(&self) -> usize {
        self.0.len()
    }

    /// Returns the coordinates as a slice.
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    /// Squared Euclidean distance to another point.
    ///
    /// dist² = sum((a[i] - b[i])²) for i = 0..k
    ///
    /// # Panics
    ///
    /// Panics if the two points have different dimensions. Mixing dimensions
    /// is a programming error, not a recoverable condition.
    ///
    /// # Examples
    ///
    /// ```
    /// use kdnn::Point;
    ///
    /// let a = Point::new(vec![0.0, 0.0]);
    /// let b = Point::new(vec![3.0, 4.0]);
    /// assert_eq!(a.distance_squared(&b), 25.0);
    /// ```
    pub fn distance_squared(&self, other: &Point) -> f32 {
        assert_eq!(
            self.dim(),
            other.dim(),
            "distance between points of different dimensions"
        );

        self.0.iter()
            .zip(other.0.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum()
    }
}

impl From<Vec<f32>> for Point {
    fn from(coords: Vec<f32>) -> Point {
        Point::new(coords)
    }
}

impl Index<usize> for Point {
    type Output = f32;

    fn index(&self, index: usize) -> &f32 {
        &self.0[index]
    }
}
