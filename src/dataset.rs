//! The dataset module
//! Provide JSONL article parsing and the on-disk embedding cache

use crate::point::Point;
use serde::{Serialize, Deserialize};
use std::{
    fs::File,
    io::{
        BufRead,
        BufReader,
        BufWriter,
    },
};

/// One question/answer record from the input file.
///
/// The wikiHow dump stores each record as a JSON array on its own line,
/// `["question", "answer", ...]`; only the first two elements are used.
#[derive(Clone, Debug, PartialEq)]
pub struct Article {
    pub question: String,
    pub answer: String,
}

/// Parses a single JSONL line into an [`Article`].
///
/// # Examples
///
/// ```
/// use kdnn::dataset::parse_article;
///
/// let article = parse_article(r#"["How to fly?", "Get wings."]"#).unwrap();
/// assert_eq!(article.question, "How to fly?");
/// assert_eq!(article.answer, "Get wings.");
/// ```
pub fn parse_article(line: &str) -> Result<Article, String> {
    let fields: Vec<String> = serde_json::from_str(line)
        .map_err(|e| format!("Error parsing JSON: {}", e))?;

    if fields.len() < 2 {
        return Err(format!(
            "Record needs at least a question and an answer, got {} field(s)",
            fields.len()
        ));
    }

    let mut fields = fields.into_iter();
    Ok(Article {
        question: fields.next().unwrap(),
        answer: fields.next().unwrap(),
    })
}

/// Reads up to `limit` articles from a JSONL file, skipping blank lines.
pub fn read_articles(path: &str, limit: usize) -> Result<Vec<Article>, String> {
    let file = File::open(path)
        .map_err(|e| format!("Failed to open file '{}': {}", path, e))?;

    let mut articles = Vec::new();
    for line in BufReader::new(file).lines() {
        if articles.len() >= limit {
            break;
        }

        let line = line.map_err(|e| format!("Failed to read line: {}", e))?;
        if line.trim().is_empty() {
            continue;
        }

        articles.push(parse_article(&line)?);
    }

    Ok(articles)
}

/// The embedded dataset: one query vector and one corpus vector per article.
///
/// Embedding is by far the slowest phase of the pipeline, so the vectors are
/// cached on disk and the harness works from the cache. Only the vectors are
/// persisted; the tree itself is always rebuilt in memory.
#[derive(Serialize, Deserialize)]
pub struct EmbeddingCache {
    pub queries: Vec<Point>,
    pub corpus: Vec<Point>,
}

impl EmbeddingCache {
    /// Creates an empty cache.
    pub fn new() -> EmbeddingCache {
        EmbeddingCache { queries: Vec::new(), corpus: Vec::new() }
    }

    /// Returns the number of (query, corpus) vector pairs in the cache.
    pub fn count(&self) -> usize {
        self.corpus.len()
    }

    /// Returns the vector dimension, or `None` for an empty cache.
    pub fn dimension(&self) -> Option<usize> {
        self.corpus.first().map(|p| p.dim())
    }

    /// Saves the cache to a file using bincode serialization.
    pub fn save(&self, path: &str) -> Result<(), String> {
        let file = File::create(path)
            .map_err(|e| format!("Fail to create file for saving '{}': {}", path, e))?;

        let writer = BufWriter::new(file);
        bincode::serialize_into(writer, self)
            .map_err(|e| format!("Serialization failed: {}", e))?;

        Ok(())
    }

    /// Loads a cache from a file previously saved with
    /// [`save`](EmbeddingCache::save).
    pub fn load(path: &str) -> Result<Self, String> {
        if !std::path::Path::new(path).exists() {
            return Err("File not found!".to_string());
        }

        let file = File::open(path)
            .map_err(|e| format!("Failed to open file '{}': {}", path, e))?;

        let reader = BufReader::new(file);

        let cache: EmbeddingCache = bincode::deserialize_from(reader)
            .map_err(|e| format!("Deserialization failed: {}", e))?;

        Ok(cache)
    }
}

impl Default for EmbeddingCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod dataset_test {
    use super::*;
    use std::io::Write;

    // ========== Article Parsing Tests ==========

    #[test]
    fn test_parse_article_basic() {
        let article = parse_article(r#"["How to tie a knot?", "Loop and pull."]"#).unwrap();

        assert_eq!(article.question, "How to tie a knot?");
        assert_eq!(article.answer, "Loop and pull.");
    }

    #[test]
    fn test_parse_article_ignores_extra_fields() {
        let article = parse_article(r#"["q", "a", "extra"]"#).unwrap();

        assert_eq!(article.question, "q");
        assert_eq!(article.answer, "a");
    }

    #[test]
    fn test_parse_article_too_few_fields() {
        let result = parse_article(r#"["only one"]"#);

        assert!(result.is_err());
    }

    #[test]
    fn test_parse_article_invalid_json() {
        let result = parse_article("not json at all");

        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Error parsing JSON"));
    }

    #[test]
    fn test_read_articles_with_limit_and_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("articles.jsonl");
        let mut file = File::create(&path).unwrap();
        writeln!(file, r#"["q1", "a1"]"#).unwrap();
        writeln!(file).unwrap();
        writeln!(file, r#"["q2", "a2"]"#).unwrap();
        writeln!(file, r#"["q3", "a3"]"#).unwrap();

        let articles = read_articles(path.to_str().unwrap(), 2).unwrap();

        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].question, "q1");
        assert_eq!(articles[1].question, "q2");
    }

    #[test]
    fn test_read_articles_missing_file() {
        let result = read_articles("no_such_file.jsonl", 10);

        assert!(result.is_err());
    }

    // ========== Cache Tests ==========

    #[test]
    fn test_cache_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.db");
        let path_str = path.to_str().unwrap();

        let mut cache = EmbeddingCache::new();
        cache.queries.push(Point::new(vec![1.0, 0.0]));
        cache.corpus.push(Point::new(vec![0.0, 1.0]));

        cache.save(path_str).unwrap();

        let loaded = EmbeddingCache::load(path_str).unwrap();
        assert_eq!(loaded.count(), 1);
        assert_eq!(loaded.dimension(), Some(2));
        assert_eq!(loaded.queries[0].as_slice(), &[1.0, 0.0]);
        assert_eq!(loaded.corpus[0].as_slice(), &[0.0, 1.0]);
    }

    #[test]
    fn test_cache_load_nonexistent_file() {
        match EmbeddingCache::load("nonexistent_cache.db") {
            Err(e) => assert!(e.contains("File not found")),
            Ok(_) => panic!("Expected error for nonexistent file"),
        }
    }

    #[test]
    fn test_cache_empty_dimension() {
        let cache = EmbeddingCache::new();

        assert_eq!(cache.count(), 0);
        assert_eq!(cache.dimension(), None);
    }
}
