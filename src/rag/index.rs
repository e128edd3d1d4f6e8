use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use super::{Embedder, RagError, Retriever};

pub const CHUNK_SIZE: usize = 500;
pub const CHUNK_OVERLAP: usize = 100;
pub const TOP_K: usize = 3;

/// 内存中的向量索引，按余弦相似度暴力检索
pub struct VectorIndex {
    chunks: Vec<String>,
    embeddings: Vec<Vec<f32>>,
    embedder: Arc<dyn Embedder>,
    top_k: usize,
}

impl VectorIndex {
    pub async fn build(text: &str, embedder: Arc<dyn Embedder>) -> Self {
        let chunks = split_text(text, CHUNK_SIZE, CHUNK_OVERLAP);
        let embeddings = embedder.embed_documents(&chunks).await;
        tracing::info!("Vector index built with {} chunks", chunks.len());

        Self {
            chunks,
            embeddings,
            embedder,
            top_k: TOP_K,
        }
    }

    pub async fn from_file(
        path: impl AsRef<Path>,
        embedder: Arc<dyn Embedder>,
    ) -> Result<Self, RagError> {
        let text = tokio::fs::read_to_string(path.as_ref()).await?;
        Ok(Self::build(&text, embedder).await)
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

#[async_trait]
impl Retriever for VectorIndex {
    async fn retrieve(&self, query: &str) -> Result<Vec<String>, RagError> {
        let query = self.embedder.embed_query(query).await?;

        let mut scored: Vec<(f32, usize)> = self
            .embeddings
            .iter()
            .enumerate()
            .map(|(i, embedding)| (cosine_similarity(&query, embedding), i))
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));

        Ok(scored
            .into_iter()
            .take(self.top_k)
            .map(|(_, i)| self.chunks[i].clone())
            .collect())
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// 按字符数切块，尽量在段落、换行、句号或空格处断开，相邻块之间保留 overlap 个字符
pub fn split_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        let mut end = (start + chunk_size).min(chars.len());
        if end < chars.len() {
            if let Some(cut) = find_boundary(&chars[start..end]) {
                end = start + cut;
            }
        }

        let chunk: String = chars[start..end].iter().collect();
        let chunk = chunk.trim();
        if !chunk.is_empty() {
            chunks.push(chunk.to_string());
        }

        if end == chars.len() {
            break;
        }
        start = end.saturating_sub(overlap).max(start + 1);
    }

    chunks
}

// 只在后半段里找断点，避免切出过短的块
fn find_boundary(window: &[char]) -> Option<usize> {
    const SEPARATORS: [&[char]; 4] = [&['\n', '\n'], &['\n'], &['.', ' '], &[' ']];

    let min = window.len() / 2;
    SEPARATORS.iter().find_map(|sep| {
        (min..=window.len().saturating_sub(sep.len()))
            .rev()
            .find(|&i| window[i..].starts_with(sep))
            .map(|i| i + sep.len())
    })
}
