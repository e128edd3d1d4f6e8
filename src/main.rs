use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use chatbot::{
    AppState, cache,
    config::Config,
    conversation::select_conversation_store,
    rag::{GeminiEmbeddings, HuggingFaceChat, VectorIndex},
    rate_limit::{Limiter, select_store},
    router::create_router,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 加载配置
    let config = Config::from_env().expect("Failed to load configuration");

    // 探测 Redis，只在启动时做一次
    let redis = cache::connect(&config.redis_url, config.redis_timeout()).await;

    let store = select_store(redis.clone(), config.redis_timeout());
    let limiter = Arc::new(Limiter::new(config.rate_limits.clone(), store));
    let conversations =
        select_conversation_store(redis, config.session_ttl_secs, config.redis_timeout());

    // 加载语料并建立索引
    let embeddings = Arc::new(GeminiEmbeddings::new(
        config.gemini_api_key.clone(),
        config.embedding_model.clone(),
    ));
    let index = VectorIndex::from_file(&config.context_path, embeddings)
        .await
        .expect("Failed to load context document");
    let generator = HuggingFaceChat::new(config.hf_api_token.clone(), config.chat_model.clone());

    // 设置应用状态
    let state = AppState {
        limiter,
        conversations,
        retriever: Arc::new(index),
        generator: Arc::new(generator),
        jwt_secret: config.jwt_secret.as_deref().map(Arc::from),
        trusted_proxies: config.trusted_proxies.clone().into(),
    };

    let app = create_router(state);

    // 启动服务器
    let addr = SocketAddr::new(
        config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        config.server_port,
    );
    tracing::info!("Server listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Failed to start server");
}
