use std::net::IpAddr;
use std::sync::Arc;

pub mod cache;
pub mod config;
pub mod conversation;
pub mod error;
pub mod middleware;
pub mod rag;
pub mod rate_limit;
pub mod router;
pub mod routes;
pub mod utils;

use conversation::ConversationStore;
use rag::{Generator, Retriever};
use rate_limit::Limiter;

#[derive(Clone)]
pub struct AppState {
    pub limiter: Arc<Limiter>,
    pub conversations: Arc<dyn ConversationStore>,
    pub retriever: Arc<dyn Retriever>,
    pub generator: Arc<dyn Generator>,
    pub jwt_secret: Option<Arc<str>>,
    pub trusted_proxies: Arc<[IpAddr]>,
}
