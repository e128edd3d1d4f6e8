use async_trait::async_trait;
use futures_util::future::{BoxFuture, FutureExt};
use futures_util::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};

use super::{Backoff, RagError};

/// Gemini 嵌入向量维度
pub const EMBEDDING_DIMENSION: usize = 768;

const MAX_TEXT_CHARS: usize = 20_000;
const DOCUMENT_CONCURRENCY: usize = 4;
const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[async_trait]
pub trait Embedder: Send + Sync {
    /// 批量嵌入文档，单条失败时用零向量占位，结果与输入一一对应
    async fn embed_documents(&self, texts: &[String]) -> Vec<Vec<f32>>;

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, RagError>;
}

#[derive(Debug, Clone, Copy)]
enum TaskType {
    Document,
    Query,
}

impl TaskType {
    fn as_str(self) -> &'static str {
        match self {
            TaskType::Document => "RETRIEVAL_DOCUMENT",
            TaskType::Query => "RETRIEVAL_QUERY",
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EmbedRequest<'a> {
    model: &'a str,
    content: Content<'a>,
    task_type: &'static str,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embedding: EmbeddingValues,
}

#[derive(Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

/// Gemini 嵌入客户端，每次调用带指数退避重试
#[derive(Clone)]
pub struct GeminiEmbeddings {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    backoff: Backoff,
}

impl GeminiEmbeddings {
    pub fn new(api_key: String, model: String) -> Self {
        tracing::info!("Gemini API configured with model: {}", model);
        Self {
            client: reqwest::Client::new(),
            api_key,
            model,
            base_url: GEMINI_BASE_URL.to_string(),
            backoff: Backoff::default(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    async fn embed_text(&self, text: &str, task: TaskType) -> Result<Vec<f32>, RagError> {
        if text.trim().is_empty() {
            tracing::warn!("Empty text provided for embedding");
            return Ok(vec![0.0; EMBEDDING_DIMENSION]);
        }

        let text = truncate(text);
        self.backoff
            .retry("Gemini embedding", || self.request_embedding(&text, task))
            .await
    }

    async fn request_embedding(&self, text: &str, task: TaskType) -> Result<Vec<f32>, RagError> {
        let url = format!("{}/{}:embedContent", self.base_url, self.model);
        let body = EmbedRequest {
            model: &self.model,
            content: Content {
                parts: [Part { text }],
            },
            task_type: task.as_str(),
        };

        let response: EmbedResponse = self
            .client
            .post(url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if response.embedding.values.is_empty() {
            return Err(RagError::Provider("empty embedding received".into()));
        }
        Ok(response.embedding.values)
    }
}

fn truncate(text: &str) -> String {
    if text.chars().count() > MAX_TEXT_CHARS {
        tracing::warn!("Text truncated to {} characters for embedding", MAX_TEXT_CHARS);
        text.chars().take(MAX_TEXT_CHARS).collect()
    } else {
        text.to_string()
    }
}

#[async_trait]
impl Embedder for GeminiEmbeddings {
    async fn embed_documents(&self, texts: &[String]) -> Vec<Vec<f32>> {
        // 先装箱再交给 buffered，async_trait 要求整个 future 是 Send
        let jobs: Vec<BoxFuture<'_, (usize, Result<Vec<f32>, RagError>)>> = texts
            .iter()
            .enumerate()
            .map(|(i, text)| {
                async move { (i, self.embed_text(text, TaskType::Document).await) }.boxed()
            })
            .collect();

        let results: Vec<_> = stream::iter(jobs)
            .buffered(DOCUMENT_CONCURRENCY)
            .collect()
            .await;

        let mut failed = Vec::new();
        let embeddings = results
            .into_iter()
            .map(|(i, result)| {
                result.unwrap_or_else(|e| {
                    tracing::error!("Failed to embed document {}: {}", i, e);
                    failed.push(i);
                    vec![0.0; EMBEDDING_DIMENSION]
                })
            })
            .collect::<Vec<_>>();

        if !failed.is_empty() {
            tracing::warn!("Failed to embed documents at indices: {:?}", failed);
        }
        tracing::info!("Embedded {} documents", embeddings.len());
        embeddings
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, RagError> {
        self.embed_text(text, TaskType::Query).await.inspect_err(|e| {
            tracing::error!("Failed to embed query: {}", e);
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    use axum::{Json, Router, http::StatusCode};
    use serde_json::{Value, json};
    use tokio::net::TcpListener;

    use super::*;

    #[test]
    fn long_text_is_truncated_by_chars() {
        let text = "é".repeat(MAX_TEXT_CHARS + 10);
        assert_eq!(truncate(&text).chars().count(), MAX_TEXT_CHARS);
        assert_eq!(truncate("short"), "short");
    }

    #[test]
    fn request_uses_gemini_field_names() {
        let body = EmbedRequest {
            model: "models/embedding-001",
            content: Content {
                parts: [Part { text: "menu" }],
            },
            task_type: TaskType::Query.as_str(),
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["taskType"], "RETRIEVAL_QUERY");
        assert_eq!(json["content"]["parts"][0]["text"], "menu");
    }

    #[tokio::test]
    async fn blank_text_skips_the_provider() {
        // 不可达的地址：如果真的发请求会失败
        let embeddings = GeminiEmbeddings::new("key".into(), "models/embedding-001".into())
            .with_base_url("http://127.0.0.1:1");

        let vector = embeddings.embed_query("   ").await.unwrap();
        assert_eq!(vector.len(), EMBEDDING_DIMENSION);
        assert!(vector.iter().all(|v| *v == 0.0));
    }

    fn fast_backoff(max_attempts: u32) -> Backoff {
        Backoff {
            max_attempts,
            min_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
        }
    }

    /// 本地假的 embedContent 服务：前 `failures` 次返回 503，之后按文本长度返回向量
    async fn stub_gemini(failures: u32) -> (String, Arc<AtomicU32>) {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let router = Router::new().fallback(move |Json(body): Json<Value>| {
            let counter = counter.clone();
            async move {
                let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                if n <= failures {
                    return (StatusCode::SERVICE_UNAVAILABLE, Json(json!({})));
                }
                let text = body["content"]["parts"][0]["text"].as_str().unwrap_or_default();
                let values = vec![text.len() as f32; EMBEDDING_DIMENSION];
                (StatusCode::OK, Json(json!({ "embedding": { "values": values } })))
            }
        });

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
        (format!("http://{}", addr), calls)
    }

    #[tokio::test]
    async fn transient_provider_errors_are_retried() {
        let (base_url, calls) = stub_gemini(2).await;
        let embeddings = GeminiEmbeddings::new("key".into(), "models/embedding-001".into())
            .with_base_url(base_url)
            .with_backoff(fast_backoff(3));

        let vector = embeddings.embed_query("pasta").await.unwrap();
        assert_eq!(vector, vec![5.0; EMBEDDING_DIMENSION]);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn provider_is_called_at_most_max_attempts_times() {
        let (base_url, calls) = stub_gemini(u32::MAX).await;
        let embeddings = GeminiEmbeddings::new("key".into(), "models/embedding-001".into())
            .with_base_url(base_url)
            .with_backoff(fast_backoff(3));

        assert!(embeddings.embed_query("pasta").await.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn documents_keep_input_order() {
        let (base_url, _) = stub_gemini(0).await;
        let embeddings = GeminiEmbeddings::new("key".into(), "models/embedding-001".into())
            .with_base_url(base_url);

        let texts: Vec<String> = (1..=6).map(|n| "x".repeat(n)).collect();
        let vectors = embeddings.embed_documents(&texts).await;
        let firsts: Vec<f32> = vectors.iter().map(|v| v[0]).collect();
        assert_eq!(firsts, [1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[tokio::test]
    async fn failed_documents_get_zero_vectors() {
        let embeddings = GeminiEmbeddings::new("key".into(), "models/embedding-001".into())
            .with_base_url("http://127.0.0.1:1")
            .with_backoff(fast_backoff(2));

        let vectors = embeddings
            .embed_documents(&["pasta".to_string(), "pizza".to_string()])
            .await;
        assert_eq!(vectors.len(), 2);
        assert!(vectors.iter().all(|v| v.len() == EMBEDDING_DIMENSION));
        assert!(vectors.iter().flatten().all(|v| *v == 0.0));
        assert!(embeddings.embed_query("pasta").await.is_err());
    }
}
