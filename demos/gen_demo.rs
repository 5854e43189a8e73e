use kdnn::{Point, dataset::EmbeddingCache};
use std::time::Instant;

fn random_vector(dim: usize, seed: u64) -> Vec<f32> {
    let mut state = seed;
    (0..dim)
        .map(|_| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
            ((state >> 33) as f32) / (u32::MAX as f32) * 2.0 - 1.0
        })
        .collect()
}

fn main() {
    let num_pairs = 100_000;
    let dim = 768;
    let path = "demo_cache.db";

    println!("Generating {} random {}-d query/corpus pairs...", num_pairs, dim);

    let start = Instant::now();
    let mut cache = EmbeddingCache::new();
    for i in 0..num_pairs {
        cache.queries.push(Point::new(random_vector(dim, i as u64)));
        cache.corpus.push(Point::new(random_vector(dim, (num_pairs + i) as u64)));
        if (i + 1) % 10_000 == 0 {
            println!("  generated {}/{}", i + 1, num_pairs);
        }
    }
    let gen_time = start.elapsed();
    println!("Generate: {:.3}s ({:.0} pairs/s)\n",
        gen_time.as_secs_f64(),
        num_pairs as f64 / gen_time.as_secs_f64());

    println!("Saving to '{}'...", path);
    let start = Instant::now();
    cache.save(path).unwrap();
    let save_time = start.elapsed();
    let file_size = std::fs::metadata(path).unwrap().len();
    println!("Save: {:.3}s (file size: {:.2} MB)",
        save_time.as_secs_f64(),
        file_size as f64 / 1_048_576.0);

    println!("\nDone! Benchmark it with: kdnn bench demo_cache.db 100000 10000");
}
