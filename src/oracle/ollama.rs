use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::agent::error::OracleError;
use crate::oracle::intent::{IntentOracle, PageSnapshot, SYSTEM_PROMPT, build_user_prompt};

pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434/api/chat";
pub const DEFAULT_MODEL: &str = "qwen2.5-coder:7b";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Intent oracle backed by a local Ollama chat endpoint.
pub struct OllamaOracle {
    pub endpoint: String,
    pub model: String,
    client: reqwest::blocking::Client,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
    options: ChatOptions,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatOptions {
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: String,
}

impl OllamaOracle {
    pub fn new(endpoint: &str, model: &str, timeout_secs: u64) -> Result<Self, OracleError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(OracleError::Client)?;

        Ok(Self {
            endpoint: endpoint.to_string(),
            model: model.to_string(),
            client,
        })
    }
}

impl IntentOracle for OllamaOracle {
    fn next_action(
        &self,
        snapshot: &PageSnapshot,
        instruction: &str,
    ) -> Result<String, OracleError> {
        let user_prompt = build_user_prompt(snapshot, instruction);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &user_prompt,
                },
            ],
            stream: false,
            options: ChatOptions { temperature: 0.0 },
        };

        debug!(endpoint = %self.endpoint, model = %self.model, instruction, "querying intent oracle");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .map_err(|e| OracleError::Request {
                endpoint: self.endpoint.clone(),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(OracleError::Status {
                status: status.as_u16(),
                body,
            });
        }

        // An empty reply is still a reply; the grammar rejects it as a step error
        let chat: ChatResponse = response.json().map_err(OracleError::Decode)?;
        Ok(chat.message.content.trim().to_string())
    }
}
