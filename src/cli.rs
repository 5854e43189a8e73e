use kdnn::{KDTree, bench, dataset::{self, EmbeddingCache}, embed::{EmbeddingClient, DEFAULT_ENDPOINT}};

const DEFAULT_K_TOP: usize = 5;
const DEFAULT_REPORT: &str = "results.csv";
const DEFAULT_LEAF_SIZE: usize = 1;

pub enum Command {
    Embed { input: String, output: String, endpoint: String, rows: usize },
    Bench { cache: String, n_rows: usize, step: usize, output: String },
    Knn { cache: String, index: usize, k_top: usize },
    Dump { cache: String },
    Info { cache: String },
}

/// Parse a command from a provided argument vector
pub fn parse_command_from_args(args: &[String]) -> Result<Command, String> {
    if args.len() < 2 {
        return Err("No command provided. Use: embed, bench, knn, dump, info".to_string());
    }

    let command = &args[1];

    match command.as_str() {
        "embed" => parse_embed(args),
        "bench" => parse_bench(args),
        "knn" => parse_knn(args),
        "dump" => parse_dump(args),
        "info" => parse_info(args),
        _ => Err(format!("Unknown command: {}. Available: embed, bench, knn, dump, info", command)),
    }
}

/// Parse the 'embed' command
/// Usage: kdnn embed <input.jsonl> <cache.db> [--endpoint <url>] [--rows <n>]
fn parse_embed(args: &[String]) -> Result<Command, String> {
    // args[0] = program name
    // args[1] = "embed"
    // args[2] = input file (required)
    // args[3] = output cache (required)
    // args[4..] = optional flags
    if args.len() < 4 {
        return Err("'embed' command requires an input file and an output path. Usage: kdnn embed <input.jsonl> <cache.db> [--endpoint <url>] [--rows <n>]".to_string());
    }

    let input = args[2].clone();
    let output = args[3].clone();
    let mut endpoint = DEFAULT_ENDPOINT.to_string();
    let mut rows = usize::MAX;

    let mut i = 4;
    while i < args.len() {
        match args[i].as_str() {
            "--endpoint" => {
                endpoint = args.get(i + 1)
                    .ok_or("--endpoint requires a URL")?
                    .clone();
                i += 2;
            }
            "--rows" => {
                let value = args.get(i + 1).ok_or("--rows requires a number")?;
                rows = value.parse::<usize>()
                    .map_err(|_| format!("Invalid --rows value: '{}'. Must be a positive integer.", value))?;
                i += 2;
            }
            other => return Err(format!("Unknown flag for 'embed': {}", other)),
        }
    }

    Ok(Command::Embed { input, output, endpoint, rows })
}

/// Parse the 'bench' command
/// Usage: kdnn bench <cache.db> <n_rows> <step> [results.csv]
fn parse_bench(args: &[String]) -> Result<Command, String> {
    // args[0] = program name
    // args[1] = "bench"
    // args[2] = cache file (required)
    // args[3] = n_rows (required)
    // args[4] = step (required)
    // args[5] = report path (optional)
    if args.len() < 5 {
        return Err("'bench' command requires a cache file, a row count and a step. Usage: kdnn bench <cache.db> <n_rows> <step> [results.csv]".to_string());
    }

    let cache = args[2].clone();
    let n_rows = args[3].parse::<usize>()
        .map_err(|_| format!("Invalid n_rows value: '{}'. Must be a positive integer.", args[3]))?;
    let step = args[4].parse::<usize>()
        .map_err(|_| format!("Invalid step value: '{}'. Must be a positive integer.", args[4]))?;

    if step == 0 {
        return Err("step must be at least 1".to_string());
    }

    let output = args.get(5).cloned().unwrap_or_else(|| DEFAULT_REPORT.to_string());

    Ok(Command::Bench { cache, n_rows, step, output })
}

/// Parse the 'knn' command
/// Usage: kdnn knn <cache.db> <query_index> [--k_top <number>]
fn parse_knn(args: &[String]) -> Result<Command, String> {
    if args.len() < 4 {
        return Err("'knn' command requires a cache file and a query index. Usage: kdnn knn <cache.db> <query_index> [--k_top <number>]".to_string());
    }

    let cache = args[2].clone();
    let index = args[3].parse::<usize>()
        .map_err(|_| format!("Invalid query index: '{}'. Must be a non-negative integer.", args[3]))?;

    let mut k_top = DEFAULT_K_TOP;

    // Check if last two args are --k_top and a number
    if args.len() >= 6 && args[args.len() - 2] == "--k_top" {
        match args[args.len() - 1].parse::<usize>() {
            Ok(k) => k_top = k,
            Err(_) => {
                return Err(format!("Invalid --k_top value: '{}'. Must be a positive integer.", args[args.len() - 1]));
            }
        }
    }

    Ok(Command::Knn { cache, index, k_top })
}

/// Parse the 'dump' command
/// Usage: kdnn dump <cache.db>
fn parse_dump(args: &[String]) -> Result<Command, String> {
    if args.len() < 3 {
        return Err("'dump' command requires a cache file. Usage: kdnn dump <cache.db>".to_string());
    }

    Ok(Command::Dump { cache: args[2].clone() })
}

/// Parse the 'info' command
/// Usage: kdnn info <cache.db>
fn parse_info(args: &[String]) -> Result<Command, String> {
    if args.len() < 3 {
        return Err("'info' command requires a cache file. Usage: kdnn info <cache.db>".to_string());
    }

    Ok(Command::Info { cache: args[2].clone() })
}

pub fn execute_command(command: Command) -> Result<(), String> {
    match command {
        Command::Embed { input, output, endpoint, rows } => {
            let articles = dataset::read_articles(&input, rows)?;
            println!("Read {} articles from '{}'", articles.len(), input);

            let client = EmbeddingClient::new(endpoint);
            let mut cache = EmbeddingCache::new();

            for (i, article) in articles.iter().enumerate() {
                println!("{}, Input : {} - {}", i, article.question, article.answer);
                cache.queries.push(client.embed(&article.question)?);
                cache.corpus.push(client.embed(&article.answer)?);
            }

            cache.save(&output)?;
            println!("Saved {} embedded pairs to '{}'", cache.count(), output);
        }

        Command::Bench { cache, n_rows, step, output } => {
            let cache = EmbeddingCache::load(&cache)?;
            let n_rows = n_rows.min(cache.count());

            let mut report_rows = Vec::new();
            let mut i = step;
            while i <= n_rows {
                println!("--------------<Step>--------------\n");
                println!("Step: {}", i);

                let row = bench::run_comparison(&cache.queries, &cache.corpus, i, DEFAULT_LEAF_SIZE);

                println!("Time of execution | Iterative version:  {}[ms]", row.iterative_ms);
                println!("Space complexity | Iterative version:  {}[bytes]", row.iterative_bytes);
                println!("Time of execution | KDTree version:  {}[ms]", row.tree_ms);
                println!("Space complexity | KDTree version:  {}[bytes]", row.tree_bytes);
                println!("--------------<End Iterative / KD Tree>--------------\n");

                report_rows.push(row);
                i += step;
            }

            bench::write_report(&output, &report_rows)?;
            println!("Report written to '{}'", output);
        }

        Command::Knn { cache, index, k_top } => {
            let cache = EmbeddingCache::load(&cache)?;

            let target = cache.queries.get(index)
                .ok_or(format!("Query index {} out of range ({} queries in cache)", index, cache.queries.len()))?;

            let tree = KDTree::new(&cache.corpus);
            let results = tree.knn(target, k_top);

            if results.is_empty() {
                println!("No results found");
            } else {
                println!("Top {} results:", results.len());
                for (rank, point) in results.iter().enumerate() {
                    println!("{}. Distance²: {:.6}, Dimension: {}",
                        rank + 1, point.distance_squared(target), point.dim());
                }
            }
        }

        Command::Dump { cache } => {
            let cache = EmbeddingCache::load(&cache)?;
            let tree = KDTree::new(&cache.corpus);
            tree.print();
        }

        Command::Info { cache } => {
            let loaded = EmbeddingCache::load(&cache)?;
            let tree = KDTree::new(&loaded.corpus);

            println!("Cache: {}", cache);
            println!("  Pairs: {}", loaded.count());
            match loaded.dimension() {
                Some(dim) => println!("  Dimension: {}", dim),
                None => println!("  Dimension: (empty)"),
            }
            println!("  Tree nodes: {}", tree.count());
            println!("  Tree memory: {} bytes", tree.memory_footprint());
        }
    }

    Ok(())
}

pub fn print_help() {
    println!("Available commands:");
    println!("  embed <input.jsonl> <cache.db> [--endpoint <url>] [--rows <n>]");
    println!("                                     - Embed a JSONL dataset into a cache file");
    println!("  bench <cache.db> <n_rows> <step> [results.csv]");
    println!("                                     - Compare iterative vs KD-tree search");
    println!("  knn <cache.db> <index> [--k_top N] - Query the tree with a cached query vector");
    println!("  dump <cache.db>                    - Print the tree structure");
    println!("  info <cache.db>                    - Show cache and tree statistics");
}
