//! The benchmark module
//! Provide the iterative-vs-tree comparison and the CSV report writer

use crate::point::Point;
use crate::scan;
use crate::tree::KDTree;
use std::{
    fs::File,
    io::{BufWriter, Write},
    time::Instant,
};

/// Result of one comparison run at a given dataset size.
#[derive(Clone, Debug, PartialEq)]
pub struct ComparisonRow {
    pub n_rows: usize,
    pub iterative_ms: u128,
    pub tree_ms: u128,
    pub iterative_bytes: usize,
    pub tree_bytes: usize,
}

/// Times the iterative scan against the tree search over the first `n_rows`
/// vectors of both sets.
///
/// The iterative pass reports zero extra space (it allocates nothing beyond
/// its output); the tree pass reports the tree's memory footprint. Tree
/// construction is not included in the timed section, only the queries are.
/// The tree search runs one nearest neighbor per query (`k = 1`) and is
/// approximate, so the two passes are compared on time and space, not on
/// identical answers.
pub fn run_comparison(
    queries: &[Point],
    corpus: &[Point],
    n_rows: usize,
    leaf_size: usize,
) -> ComparisonRow {
    let n_rows = n_rows.min(queries.len()).min(corpus.len());
    let query_slice = &queries[..n_rows];
    let corpus_slice = &corpus[..n_rows];

    // Iterative version
    let start = Instant::now();
    let _nearest = scan::nearest_indices(query_slice, corpus_slice);
    let iterative_ms = start.elapsed().as_millis();

    // KDTree version
    let tree = KDTree::build(corpus_slice, leaf_size);

    let start = Instant::now();
    let _neighbors = tree.knn_batch(query_slice, 1);
    let tree_ms = start.elapsed().as_millis();

    ComparisonRow {
        n_rows,
        iterative_ms,
        tree_ms,
        iterative_bytes: 0,
        tree_bytes: tree.memory_footprint(),
    }
}

/// Writes the comparison rows as a semicolon-separated report.
///
/// Column layout: `n_rows;Time Iterative;Time KDTree;Space Iterative;Space KD Tree`.
pub fn write_report(path: &str, rows: &[ComparisonRow]) -> Result<(), String> {
    let file = File::create(path)
        .map_err(|e| format!("Failed to open results file '{}': {}", path, e))?;

    let mut writer = BufWriter::new(file);

    writeln!(writer, "n_rows;Time Iterative;Time KDTree;Space Iterative;Space KD Tree")
        .map_err(|e| format!("Failed to write report: {}", e))?;

    for row in rows {
        writeln!(
            writer,
            "{};{};{};{};{}",
            row.n_rows, row.iterative_ms, row.tree_ms, row.iterative_bytes, row.tree_bytes
        )
        .map_err(|e| format!("Failed to write report: {}", e))?;
    }

    Ok(())
}
