//! # kdnn - An Approximate KD-Tree Nearest-Neighbor Index
//!
//! kdnn is a learning project implementing a KD-tree over fixed-dimension
//! points with single-path approximate k-nearest-neighbor search, plus the
//! benchmark harness that compares it against an exhaustive iterative scan.
//!
//! The tree cycles the splitting axis with depth and stores the median point
//! at each node. Queries descend exactly one root-to-leaf path and pick the
//! best candidates among the visited nodes, trading accuracy for speed.
//!
//! ## Example
//!
//! ```
//! use kdnn::{KDTree, Point};
//!
//! let points: Vec<Point> = vec![
//!     vec![2.0, 3.0].into(),
//!     vec![5.0, 4.0].into(),
//!     vec![9.0, 6.0].into(),
//!     vec![4.0, 7.0].into(),
//!     vec![8.0, 1.0].into(),
//!     vec![7.0, 2.0].into(),
//! ];
//!
//! let tree = KDTree::new(&points);
//!
//! // Approximate nearest neighbors of (9, 2)
//! let results = tree.knn(&vec![9.0, 2.0].into(), 2);
//! assert_eq!(results[0].as_slice(), &[8.0, 1.0]);
//! ```

pub mod point;
mod tree;
pub mod scan;
pub mod dataset;
pub mod embed;
pub mod bench;

// Re-export the core types as the primary public API
pub use point::Point;
pub use tree::KDTree;
