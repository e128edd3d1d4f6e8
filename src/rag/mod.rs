// 检索增强生成相关的外部协作者
// 限流通过之后才会调用这里的任何东西

pub mod embedding;
pub mod index;
pub mod llm;
pub mod retry;

use async_trait::async_trait;

use crate::cache::CachedMessage;

pub use embedding::{Embedder, GeminiEmbeddings};
pub use index::VectorIndex;
pub use llm::HuggingFaceChat;
pub use retry::Backoff;

#[derive(Debug, thiserror::Error)]
pub enum RagError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("provider error: {0}")]
    Provider(String),
}

/// 一次生成请求：检索到的上下文加上用户问题
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub context: Vec<String>,
    pub question: String,
}

#[async_trait]
pub trait Retriever: Send + Sync {
    /// 按相关度从高到低返回上下文片段
    async fn retrieve(&self, query: &str) -> Result<Vec<String>, RagError>;
}

#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, prompt: &Prompt, history: &[CachedMessage])
    -> Result<String, RagError>;
}
