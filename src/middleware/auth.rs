use std::net::IpAddr;

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};

use crate::AppState;
use crate::error::AppError;
use crate::rate_limit::UNAUTHENTICATED;
use crate::utils::{client_ip, verify_token};

/// 发起请求的调用者，限流按 user_id 计数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: String,
    pub tier: String,
}

impl Caller {
    /// 匿名调用者按客户端 IP 区分
    pub fn anonymous<B>(req: &Request<B>, trusted_proxies: &[IpAddr]) -> Self {
        Self {
            user_id: client_ip(req, trusted_proxies),
            tier: UNAUTHENTICATED.to_string(),
        }
    }
}

/// 配置了 JWT_SECRET 时校验 Bearer token，无效的 token 直接拒绝；
/// 没有 token 或没有配置密钥时按匿名调用者处理
pub fn identify_caller<B>(
    req: &Request<B>,
    jwt_secret: Option<&str>,
    trusted_proxies: &[IpAddr],
) -> Result<Caller, AppError> {
    let bearer = req.headers().typed_get::<Authorization<Bearer>>();

    match (bearer, jwt_secret) {
        (Some(bearer), Some(secret)) => {
            let claims = verify_token(bearer.token(), secret).map_err(|e| {
                tracing::debug!("Rejected bearer token: {}", e);
                AppError::Unauthorized
            })?;
            Ok(Caller {
                user_id: claims.sub,
                tier: claims.tier,
            })
        }
        _ => Ok(Caller::anonymous(req, trusted_proxies)),
    }
}

pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let caller = identify_caller(&req, state.jwt_secret.as_deref(), &state.trusted_proxies)?;
    req.extensions_mut().insert(caller);

    Ok(next.run(req).await)
}
