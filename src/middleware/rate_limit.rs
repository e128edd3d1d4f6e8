use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, HeaderValue, Request},
    middleware::Next,
    response::Response,
};

use super::auth::Caller;
use crate::AppState;
use crate::error::AppError;
use crate::rate_limit::{Admission, AdmissionResult, Limiter, RateLimitInfo};

/// 受保护接口入口处调用：被拒绝时返回 429 错误，放行时返回剩余额度
pub async fn apply_rate_limit(
    limiter: &Limiter,
    user_id: &str,
    tier: &str,
) -> Result<Admission, AppError> {
    match limiter.check(user_id, tier).await {
        AdmissionResult::Admitted(admission) => Ok(admission),
        AdmissionResult::Rejected(rejection) => Err(AppError::RateLimited(rejection)),
    }
}

/// 查询额度，不消耗请求
pub async fn get_rate_limit_info(limiter: &Limiter, user_id: &str, tier: &str) -> RateLimitInfo {
    limiter.peek(user_id, tier).await
}

/// 限流中间件，只挂在受保护的路由上；被拒绝的请求不会进入 handler
pub async fn rate_limit(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let caller = match req.extensions().get::<Caller>() {
        Some(caller) => caller.clone(),
        None => Caller::anonymous(&req, &state.trusted_proxies),
    };

    let admission = apply_rate_limit(&state.limiter, &caller.user_id, &caller.tier).await?;

    let mut response = next.run(req).await;
    insert_rate_limit_headers(response.headers_mut(), &admission);
    Ok(response)
}

fn insert_rate_limit_headers(headers: &mut HeaderMap, admission: &Admission) {
    headers.insert("x-ratelimit-limit", HeaderValue::from(admission.limit));
    headers.insert("x-ratelimit-remaining", HeaderValue::from(admission.remaining));
    headers.insert(
        "x-ratelimit-reset",
        HeaderValue::from(admission.reset_time.ceil() as u64),
    );
}
