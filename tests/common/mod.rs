#![allow(dead_code)]

use std::net::{IpAddr, SocketAddr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::extract::ConnectInfo;
use axum::http::{Request, Response};
use chatbot::AppState;
use chatbot::cache::CachedMessage;
use chatbot::conversation::MemoryConversationStore;
use chatbot::rag::{Generator, Prompt, RagError, Retriever};
use chatbot::rate_limit::{Limiter, LocalRequestStore, ManualClock, PolicyTable};
use chatbot::router::create_router;

pub const START: f64 = 1_700_000_000.0;
pub const SECRET: &str = "test-secret";
pub const TRUSTED_PROXY: &str = "172.17.0.1";

pub struct StubRetriever;

#[async_trait]
impl Retriever for StubRetriever {
    async fn retrieve(&self, _query: &str) -> Result<Vec<String>, RagError> {
        Ok(vec![
            "We are open from 12:00 to 23:00.".into(),
            "Reservations: call 0754455489.".into(),
        ])
    }
}

/// 记录调用次数和每次收到的历史长度
#[derive(Default)]
pub struct RecordingGenerator {
    pub calls: AtomicUsize,
    pub history_lens: Mutex<Vec<usize>>,
    pub fail: bool,
}

#[async_trait]
impl Generator for RecordingGenerator {
    async fn generate(
        &self,
        prompt: &Prompt,
        history: &[CachedMessage],
    ) -> Result<String, RagError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.history_lens.lock().unwrap().push(history.len());
        if self.fail {
            return Err(RagError::Provider("model overloaded".into()));
        }
        Ok(format!("Answer to: {}", prompt.question))
    }
}

pub struct TestApp {
    pub router: Router,
    pub clock: Arc<ManualClock>,
    pub generator: Arc<RecordingGenerator>,
    pub conversations: Arc<MemoryConversationStore>,
}

pub fn test_app(jwt_secret: Option<&str>) -> TestApp {
    build(jwt_secret, RecordingGenerator::default())
}

pub fn failing_app() -> TestApp {
    build(
        None,
        RecordingGenerator {
            fail: true,
            ..Default::default()
        },
    )
}

fn build(jwt_secret: Option<&str>, generator: RecordingGenerator) -> TestApp {
    let clock = Arc::new(ManualClock::new(START));
    let limiter = Limiter::new(PolicyTable::default(), Arc::new(LocalRequestStore::new()))
        .with_clock(clock.clone());
    let generator = Arc::new(generator);
    let conversations = Arc::new(MemoryConversationStore::new());

    let state = AppState {
        limiter: Arc::new(limiter),
        conversations: conversations.clone(),
        retriever: Arc::new(StubRetriever),
        generator: generator.clone(),
        jwt_secret: jwt_secret.map(Arc::from),
        trusted_proxies: Arc::from([TRUSTED_PROXY.parse::<IpAddr>().unwrap()]),
    };

    TestApp {
        router: create_router(state),
        clock,
        generator,
        conversations,
    }
}

/// 模拟 into_make_service_with_connect_info 写入的连接地址
pub fn peer(ip: &str) -> ConnectInfo<SocketAddr> {
    ConnectInfo(SocketAddr::new(ip.parse().unwrap(), 40000))
}

/// 客户端直连
pub fn ask_request(ip: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/ask_rag")
        .header("content-type", "application/json")
        .extension(peer(ip))
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// 经过受信代理转发，真实客户端在 x-real-ip 里
pub fn proxied_ask_request(client_ip: &str, body: serde_json::Value) -> Request<Body> {
    let mut request = ask_request(TRUSTED_PROXY, body);
    request
        .headers_mut()
        .insert("x-real-ip", client_ip.parse().unwrap());
    request
}

pub async fn json_body(response: Response<Body>) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn header<'a>(response: &'a Response<Body>, name: &str) -> &'a str {
    response.headers()[name].to_str().unwrap()
}
