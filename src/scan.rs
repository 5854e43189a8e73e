//! The scan module
//! Provide the iterative brute-force nearest-neighbor baseline

use crate::point::Point;

/// Exhaustive nearest-neighbor search.
///
/// For every query point, scans the whole corpus and returns the index of
/// the corpus point with the smallest squared distance. Unlike the tree
/// search this is exact, which is what makes it the baseline the harness
/// compares against. Uses no extra space beyond the output.
///
/// An empty corpus yields an empty result and a diagnostic on stderr.
///
/// # Examples
///
/// ```
/// use kdnn::{scan, Point};
///
/// let corpus: Vec<Point> = vec![
///     vec![0.0, 0.0].into(),
///     vec![10.0, 10.0].into(),
/// ];
/// let queries: Vec<Point> = vec![vec![9.0, 9.0].into()];
///
/// assert_eq!(scan::nearest_indices(&queries, &corpus), vec![1]);
/// ```
pub fn nearest_indices(queries: &[Point], corpus: &[Point]) -> Vec<usize> {
    if corpus.is_empty() {
        eprintln!("Error: Corpus is empty. Cannot perform nearest-neighbor scan.");
        return Vec::new();
    }

    queries.iter()
        .map(|query| {
            let mut best_index = 0;
            let mut best_dist = f32::MAX;

            for (i, candidate) in corpus.iter().enumerate() {
                let dist = query.distance_squared(candidate);
                if dist < best_dist {
                    best_dist = dist;
                    best_index = i;
                }
            }

            best_index
        })
        .collect()
}

#[cfg(test)]
mod scan_test {
    use super::*;

    #[test]
    fn test_nearest_indices_finds_exact_nearest() {
        let corpus = vec![
            Point::new(vec![0.0, 0.0]),
            Point::new(vec![5.0, 5.0]),
            Point::new(vec![10.0, 0.0]),
        ];
        let queries = vec![
            Point::new(vec![4.0, 4.0]),
            Point::new(vec![9.0, 1.0]),
            Point::new(vec![-1.0, -1.0]),
        ];

        assert_eq!(nearest_indices(&queries, &corpus), vec![1, 2, 0]);
    }

    #[test]
    fn test_nearest_indices_first_wins_on_tie() {
        // Two equidistant corpus points: the earlier index is kept.
        let corpus = vec![
            Point::new(vec![1.0, 0.0]),
            Point::new(vec![-1.0, 0.0]),
        ];
        let queries = vec![Point::new(vec![0.0, 0.0])];

        assert_eq!(nearest_indices(&queries, &corpus), vec![0]);
    }

    #[test]
    fn test_nearest_indices_empty_queries() {
        let corpus = vec![Point::new(vec![1.0, 1.0])];

        assert!(nearest_indices(&[], &corpus).is_empty());
    }

    #[test]
    fn test_nearest_indices_empty_corpus() {
        let queries = vec![Point::new(vec![1.0, 1.0])];

        assert!(nearest_indices(&queries, &[]).is_empty());
    }
}
