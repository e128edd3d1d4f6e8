use axum::{
    Router,
    http::Method,
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post},
};
use tower_http::cors::{Any, CorsLayer};

use crate::AppState;
use crate::middleware::{auth_middleware, log_errors, rate_limit};
use crate::routes::{chat, system};

// 会调用模型的路由，先过限流
fn protected_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/ask_rag", post(chat::ask_rag))
        .route("/feedback", post(chat::submit_feedback))
        .layer(from_fn_with_state(state.clone(), rate_limit))
}

fn open_routes() -> Router<AppState> {
    Router::new()
        .route("/clear_session/{session_id}", delete(chat::clear_session))
        .route("/analytics", get(system::analytics))
        .route("/rate_limit_info", get(system::rate_limit_info))
}

// 创建主路由
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers(Any);

    // 所有 API 路由都先识别调用者
    let api = Router::new()
        .merge(protected_routes(&state))
        .merge(open_routes())
        .layer(from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .route("/", get(system::root))
        .route("/health", get(system::health_check))
        .merge(api)
        .layer(from_fn(log_errors))
        .layer(cors)
        .with_state(state)
}
