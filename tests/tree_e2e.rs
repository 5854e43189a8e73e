use kdnn::{KDTree, Point, bench, scan};
use std::time::Instant;
use tempfile::NamedTempFile;

fn random_vector(dim: usize, seed: u64) -> Vec<f32> {
    // Simple LCG pseudo-random generator (no external dep needed)
    let mut state = seed;
    (0..dim)
        .map(|_| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
            // Map to [-1.0, 1.0]
            ((state >> 33) as f32) / (u32::MAX as f32) * 2.0 - 1.0
        })
        .collect()
}

fn random_points(count: usize, dim: usize, seed_offset: u64) -> Vec<Point> {
    (0..count)
        .map(|i| Point::new(random_vector(dim, seed_offset + i as u64)))
        .collect()
}

#[test]
fn test_build_and_query_at_scale() {
    let dim = 64;
    let num_points = 10_000;
    let num_queries = 100;

    println!("\n=== Tree E2E Test ===");
    println!("Points: {}, Dimensions: {}, Queries: {}\n", num_points, dim, num_queries);

    // Phase 1: Build the tree
    let corpus = random_points(num_points, dim, 0);
    let start = Instant::now();
    let tree = KDTree::new(&corpus);
    let build_time = start.elapsed();
    println!("Phase 1 - Build {} points: {:.3}s", num_points, build_time.as_secs_f64());

    // leaf_size 1 keeps every input point as a node
    assert_eq!(tree.count(), num_points);

    // Footprint is a fixed constant per node
    let footprint = tree.memory_footprint();
    assert!(footprint > 0);
    assert_eq!(footprint % tree.count(), 0);

    let small = KDTree::new(&corpus[..10]);
    assert_eq!(footprint / tree.count(), small.memory_footprint() / small.count());

    // Phase 2: Run queries, checking ordering and the path-minimum contract
    let queries = random_points(num_queries, dim, num_points as u64);
    let start = Instant::now();
    for query in &queries {
        let results = tree.knn(query, 10);

        assert!(!results.is_empty());
        assert!(results.len() <= 10);

        for pair in results.windows(2) {
            assert!(
                pair[0].distance_squared(query) <= pair[1].distance_squared(query),
                "Results not sorted by distance"
            );
        }

        // nearest_distance is the head of the same ordering
        let min_dist = tree.nearest_distance(query);
        assert!((min_dist - results[0].distance_squared(query)).abs() < 1e-6);
    }
    let query_time = start.elapsed();
    println!("Phase 2 - {} queries: {:.3}s (avg {:.3}ms/query)",
        num_queries, query_time.as_secs_f64(),
        query_time.as_secs_f64() / num_queries as f64 * 1000.0);

    // Phase 3: Batch query concatenates per-target results in order
    let batch = tree.knn_batch(&queries, 10);
    let expected_len: usize = queries.iter().map(|q| tree.knn(q, 10).len()).sum();
    assert_eq!(batch.len(), expected_len);

    let first = tree.knn(&queries[0], 10);
    assert_eq!(&batch[..first.len()], first.as_slice());
    println!("Phase 3 - Batch of {} queries: {} points returned", num_queries, batch.len());
}

#[test]
fn test_larger_leaf_size_loses_points_at_scale() {
    let corpus = random_points(1_000, 16, 77);

    let exact = KDTree::build(&corpus, 1);
    let bucketed = KDTree::build(&corpus, 8);

    assert_eq!(exact.count(), 1_000);
    // Every partition that bottoms out with more than one point keeps only
    // its first point, so the bucketed tree must be strictly smaller.
    assert!(bucketed.count() < exact.count());
    assert!(bucketed.memory_footprint() < exact.memory_footprint());
}

#[test]
fn test_tree_answers_are_drawn_from_the_corpus() {
    let corpus = random_points(500, 8, 123);
    let tree = KDTree::new(&corpus);

    for query in random_points(20, 8, 9_000) {
        for result in tree.knn(&query, 5) {
            assert!(corpus.contains(&result), "knn returned a point not in the corpus");
        }
    }
}

#[test]
fn test_comparison_harness_end_to_end() {
    let dim = 16;
    let total = 400;
    let step = 100;

    let queries = random_points(total, dim, 1);
    let corpus = random_points(total, dim, 50_000);

    // Baseline sanity: the iterative scan answers one index per query
    let indices = scan::nearest_indices(&queries[..step], &corpus[..step]);
    assert_eq!(indices.len(), step);
    assert!(indices.iter().all(|&i| i < step));

    let mut rows = Vec::new();
    let mut i = step;
    while i <= total {
        let row = bench::run_comparison(&queries, &corpus, i, 1);
        assert_eq!(row.n_rows, i);
        assert_eq!(row.iterative_bytes, 0);
        assert!(row.tree_bytes > 0);
        rows.push(row);
        i += step;
    }
    assert_eq!(rows.len(), total / step);

    // Tree space grows with the dataset
    for pair in rows.windows(2) {
        assert!(pair[0].tree_bytes < pair[1].tree_bytes);
    }

    let temp = NamedTempFile::new().unwrap();
    let path = temp.path().to_str().unwrap();
    bench::write_report(path, &rows).unwrap();

    let report = std::fs::read_to_string(path).unwrap();
    let lines: Vec<&str> = report.lines().collect();
    assert_eq!(lines.len(), rows.len() + 1);
    assert_eq!(lines[0], "n_rows;Time Iterative;Time KDTree;Space Iterative;Space KD Tree");
    assert!(lines[1].starts_with("100;"));
}
