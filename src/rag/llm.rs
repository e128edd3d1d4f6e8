use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{Generator, Prompt, RagError};
use crate::cache::{CachedMessage, MessageKind};

const HF_ROUTER_URL: &str = "https://router.huggingface.co/v1";

const TEMPERATURE: f32 = 0.5;
const MAX_TOKENS: u32 = 300;
const TOP_P: f32 = 0.95;

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatTurn<'a>>,
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
}

#[derive(Serialize)]
struct ChatTurn<'a> {
    role: &'static str,
    content: std::borrow::Cow<'a, str>,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

/// Hugging Face 推理路由上的聊天补全接口
#[derive(Clone)]
pub struct HuggingFaceChat {
    client: reqwest::Client,
    api_token: String,
    model: String,
    base_url: String,
}

impl HuggingFaceChat {
    pub fn new(api_token: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_token,
            model,
            base_url: HF_ROUTER_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

fn system_message(context: &[String]) -> String {
    format!(
        "You are the restaurant's assistant. Answer using only the context below. \
         If the answer is not there, suggest contacting the restaurant directly.\n\n\
         Context:\n{}",
        context.join("\n\n")
    )
}

fn build_messages<'a>(prompt: &'a Prompt, history: &'a [CachedMessage]) -> Vec<ChatTurn<'a>> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatTurn {
        role: "system",
        content: system_message(&prompt.context).into(),
    });
    messages.extend(history.iter().map(|m| ChatTurn {
        role: match m.kind {
            MessageKind::Human => "user",
            MessageKind::Ai => "assistant",
        },
        content: m.content.as_str().into(),
    }));
    messages.push(ChatTurn {
        role: "user",
        content: prompt.question.as_str().into(),
    });
    messages
}

#[async_trait]
impl Generator for HuggingFaceChat {
    async fn generate(
        &self,
        prompt: &Prompt,
        history: &[CachedMessage],
    ) -> Result<String, RagError> {
        let request = ChatRequest {
            model: &self.model,
            messages: build_messages(prompt, history),
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
            top_p: TOP_P,
        };

        let response: ChatResponse = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_token)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.trim().to_string())
            .ok_or_else(|| RagError::Provider("no choices in completion".into()))
    }
}
