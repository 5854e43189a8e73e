use kdnn::{KDTree, Point, bench, dataset::{self, EmbeddingCache}};
use std::time::Instant;

use candle_core::{Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config};
use hf_hub::{api::sync::Api, Repo, RepoType};
use tokenizers::{PaddingParams, Tokenizer, TruncationParams};

const MODEL_ID: &str = "BAAI/bge-base-en-v1.5";
const INPUT_FILE: &str = "demos/wikihow.jsonl";
const OUTPUT_FILE: &str = "wikihow_cache.db";
const BATCH_SIZE: usize = 64;
const MAX_ROWS: usize = 10_000;

fn mean_pooling(
    hidden_states: &Tensor,
    attention_mask: &Tensor,
) -> candle_core::Result<Tensor> {
    let mask_expanded = attention_mask
        .unsqueeze(2)?
        .broadcast_as(hidden_states.shape())?
        .to_dtype(hidden_states.dtype())?;

    let sum_embeddings = (hidden_states * &mask_expanded)?.sum(1)?;
    let sum_mask = mask_expanded.sum(1)?.clamp(1e-9, f64::MAX)?;
    sum_embeddings.broadcast_div(&sum_mask)
}

fn l2_normalize(tensor: &Tensor) -> candle_core::Result<Tensor> {
    let norm = tensor.sqr()?.sum_keepdim(1)?.sqrt()?;
    tensor.broadcast_div(&norm.clamp(1e-12, f64::MAX)?)
}

fn embed_batch(
    model: &BertModel,
    tokenizer: &Tokenizer,
    device: &Device,
    texts: &[&str],
) -> Result<Vec<Point>, Box<dyn std::error::Error>> {
    let encodings = tokenizer
        .encode_batch(texts.to_vec(), true)
        .map_err(|e| e.to_string())?;

    let token_ids: Vec<&[u32]> = encodings.iter().map(|e| e.get_ids()).collect();
    let attention_masks: Vec<&[u32]> = encodings.iter().map(|e| e.get_attention_mask()).collect();

    let batch_len = token_ids.len();
    let seq_len = token_ids[0].len();

    let token_ids_flat: Vec<u32> = token_ids.iter().flat_map(|ids| ids.iter().copied()).collect();
    let mask_flat: Vec<u32> = attention_masks.iter().flat_map(|m| m.iter().copied()).collect();

    let token_ids_tensor = Tensor::from_vec(token_ids_flat, (batch_len, seq_len), device)?;
    let attention_mask_tensor = Tensor::from_vec(mask_flat, (batch_len, seq_len), device)?;
    let token_type_ids = token_ids_tensor.zeros_like()?;

    let hidden_states = model.forward(
        &token_ids_tensor,
        &token_type_ids,
        Some(&attention_mask_tensor),
    )?;

    let pooled = mean_pooling(&hidden_states, &attention_mask_tensor)?;
    let normalized = l2_normalize(&pooled)?;

    let mut points = Vec::with_capacity(batch_len);
    for i in 0..batch_len {
        let embedding: Vec<f32> = normalized.get(i)?.to_vec1()?;
        points.push(Point::new(embedding));
    }
    Ok(points)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let device = Device::cuda_if_available(0)?;
    match &device {
        Device::Cuda(_) => println!("Using CUDA GPU\n"),
        _ => println!("CUDA not available, using CPU (build with --features cuda for GPU)\n"),
    }

    // Phase 1: Load articles
    println!("Phase 1: Loading articles from '{}'...", INPUT_FILE);
    let start = Instant::now();
    let articles = dataset::read_articles(INPUT_FILE, MAX_ROWS)?;
    println!("  Loaded {} articles in {:.3}s\n", articles.len(), start.elapsed().as_secs_f64());

    // Phase 2: Load model and tokenizer from HuggingFace Hub
    println!("Phase 2: Loading model '{}'...", MODEL_ID);
    let start = Instant::now();

    let api = Api::new()?;
    let repo = api.repo(Repo::new(MODEL_ID.to_string(), RepoType::Model));

    let tokenizer_path = repo.get("tokenizer.json")?;
    let config_path = repo.get("config.json")?;
    let weights_path = repo.get("model.safetensors")?;

    let config: Config = serde_json::from_str(&std::fs::read_to_string(config_path)?)?;
    let mut tokenizer = Tokenizer::from_file(tokenizer_path).map_err(|e| e.to_string())?;

    // Set up padding and truncation for batch processing
    tokenizer.with_padding(Some(PaddingParams::default()));
    tokenizer.with_truncation(Some(TruncationParams {
        max_length: 128,
        ..Default::default()
    })).map_err(|e| e.to_string())?;

    let vb = unsafe {
        VarBuilder::from_mmaped_safetensors(&[weights_path], candle_core::DType::F32, &device)?
    };
    let model = BertModel::load(vb, &config)?;

    println!("  Model loaded in {:.3}s\n", start.elapsed().as_secs_f64());

    // Phase 3: Embed questions and answers in batches
    println!("Phase 3: Embedding {} articles (batch_size={})...", articles.len(), BATCH_SIZE);
    let start = Instant::now();
    let mut cache = EmbeddingCache::new();
    let total_batches = (articles.len() + BATCH_SIZE - 1) / BATCH_SIZE;

    for (batch_idx, chunk) in articles.chunks(BATCH_SIZE).enumerate() {
        let questions: Vec<&str> = chunk.iter().map(|a| a.question.as_str()).collect();
        let answers: Vec<&str> = chunk.iter().map(|a| a.answer.as_str()).collect();

        cache.queries.extend(embed_batch(&model, &tokenizer, &device, &questions)?);
        cache.corpus.extend(embed_batch(&model, &tokenizer, &device, &answers)?);

        if (batch_idx + 1) % 10 == 0 || batch_idx + 1 == total_batches {
            let elapsed = start.elapsed().as_secs_f64();
            let done = ((batch_idx + 1) * BATCH_SIZE).min(articles.len());
            let rate = done as f64 / elapsed;
            println!(
                "  Batch {}/{}: {}/{} articles ({:.0} articles/s, elapsed {:.1}s)",
                batch_idx + 1, total_batches, done, articles.len(), rate, elapsed
            );
        }
    }

    let embed_time = start.elapsed();
    println!(
        "  Done! Embedded {} articles in {:.3}s ({:.0} articles/s)\n",
        cache.count(),
        embed_time.as_secs_f64(),
        cache.count() as f64 / embed_time.as_secs_f64()
    );

    // Phase 4: Save the cache
    println!("Phase 4: Saving to '{}'...", OUTPUT_FILE);
    let start = Instant::now();
    cache.save(OUTPUT_FILE)?;
    let file_size = std::fs::metadata(OUTPUT_FILE).map(|m| m.len()).unwrap_or(0);
    println!(
        "  Saved in {:.3}s (file size: {:.2} MB)\n",
        start.elapsed().as_secs_f64(),
        file_size as f64 / 1_048_576.0
    );

    // Phase 5: Sample tree queries and one comparison run
    println!("Phase 5: Sample KD-tree queries\n");
    let tree = KDTree::new(&cache.corpus);
    println!("  Tree: {} nodes, {} bytes\n", tree.count(), tree.memory_footprint());

    for index in [0, cache.count() / 2, cache.count() - 1] {
        let target = &cache.queries[index];
        let start = Instant::now();
        let results = tree.knn(target, 5);
        let query_ms = start.elapsed().as_secs_f64() * 1000.0;

        println!("  Query: \"{}\" ({:.3}ms)", articles[index].question, query_ms);
        for (rank, point) in results.iter().enumerate() {
            println!("    {}. distance² {:.4}", rank + 1, point.distance_squared(target));
        }
        println!();
    }

    let row = bench::run_comparison(&cache.queries, &cache.corpus, cache.count(), 1);
    println!("=== Summary ===");
    println!("Total pairs: {}", cache.count());
    println!("Iterative: {}ms / {} bytes", row.iterative_ms, row.iterative_bytes);
    println!("KD-tree:   {}ms / {} bytes", row.tree_ms, row.tree_bytes);
    println!("Output file: {}", OUTPUT_FILE);

    Ok(())
}
