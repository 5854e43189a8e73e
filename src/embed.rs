//! The embedding client module
//! Provide the HTTP client for the external embedding service

use crate::point::Point;
use serde::{Serialize, Deserialize};

/// Default endpoint of a llama.cpp-style embedding server.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8080/embedding";

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    content: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

/// Decodes an embedding service response body into a [`Point`].
///
/// The service answers with `{"embedding": [..]}`.
pub fn parse_embedding(body: &str) -> Result<Point, String> {
    let response: EmbeddingResponse = serde_json::from_str(body)
        .map_err(|e| format!("Failed to parse embedding response: {}", e))?;

    if response.embedding.is_empty() {
        return Err("Embedding response contained an empty vector".to_string());
    }

    Ok(Point::new(response.embedding))
}

/// Blocking client for the embedding service.
///
/// The index does not know or care how embeddings are produced; this client
/// is the glue that turns one text field into one vector, one request per
/// field, the way the original pipeline drove its local llama server.
pub struct EmbeddingClient {
    endpoint: String,
    client: reqwest::blocking::Client,
}

impl EmbeddingClient {
    /// Creates a client for the given endpoint URL.
    pub fn new(endpoint: impl Into<String>) -> EmbeddingClient {
        EmbeddingClient {
            endpoint: endpoint.into(),
            client: reqwest::blocking::Client::new(),
        }
    }

    /// Requests the embedding vector for one text field.
    pub fn embed(&self, text: &str) -> Result<Point, String> {
        let response = self.client
            .post(&self.endpoint)
            .json(&EmbeddingRequest { content: text })
            .send()
            .map_err(|e| format!("Embedding request failed: {}", e))?;

        if !response.status().is_success() {
            return Err(format!("Embedding service returned {}", response.status()));
        }

        let body = response.text()
            .map_err(|e| format!("Failed to read embedding response: {}", e))?;

        parse_embedding(&body)
    }
}

impl Default for EmbeddingClient {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT)
    }
}

#[cfg(test)]
mod embed_test {
    use super::*;

    #[test]
    fn test_parse_embedding_basic() {
        let point = parse_embedding(r#"{"embedding": [0.1, 0.2, 0.3]}"#).unwrap();

        assert_eq!(point.dim(), 3);
        assert!((point[0] - 0.1).abs() < 1e-6);
        assert!((point[2] - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_parse_embedding_ignores_extra_fields() {
        let point = parse_embedding(r#"{"embedding": [1.0], "model": "bge"}"#).unwrap();

        assert_eq!(point.dim(), 1);
    }

    #[test]
    fn test_parse_embedding_empty_vector() {
        let result = parse_embedding(r#"{"embedding": []}"#);

        assert!(result.is_err());
        assert!(result.unwrap_err().contains("empty vector"));
    }

    #[test]
    fn test_parse_embedding_malformed_body() {
        let result = parse_embedding("<html>502 Bad Gateway</html>");

        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Failed to parse"));
    }

    #[test]
    fn test_parse_embedding_missing_field() {
        let result = parse_embedding(r#"{"vector": [1.0]}"#);

        assert!(result.is_err());
    }
}
