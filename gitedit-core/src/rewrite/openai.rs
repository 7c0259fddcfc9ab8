use super::Rewriter;
use crate::error::{Error, Result};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    pub base_url: String,
    pub model: String,
    pub organization: Option<String>,
    pub temperature: f32,
    pub explain_max_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            organization: None,
            temperature: 0.8,
            explain_max_tokens: 100,
            timeout_secs: 60,
        }
    }
}

/// Rewriter backed by an OpenAI-compatible `/chat/completions` endpoint.
#[derive(Clone)]
pub struct OpenAiRewriter {
    client: Client,
    api_key: String,
    config: OpenAiConfig,
}

impl OpenAiRewriter {
    pub fn new(config: OpenAiConfig, api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(Error::collaborator)?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            config,
        })
    }

    pub fn config(&self) -> &OpenAiConfig {
        &self.config
    }

    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        max_tokens: Option<u32>,
    ) -> Result<String> {
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages,
            temperature: self.config.temperature,
            max_tokens,
        };

        debug!(model = %request.model, "Sending chat completion request");

        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));
        let mut builder = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&request);

        if let Some(organization) = &self.config.organization {
            builder = builder.header("OpenAI-Organization", organization);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Error::collaborator(anyhow::anyhow!("Network error: {}", e)))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            Error::collaborator(anyhow::anyhow!("Failed to read response: {}", e))
        })?;

        extract_completion(status, &body)
    }
}

#[async_trait::async_trait]
impl Rewriter for OpenAiRewriter {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn rewrite(&self, language: &str, code: &str, instruction: &str) -> Result<String> {
        info!("Requesting edits: {}", instruction);
        let reply = self.complete(rewrite_messages(language, code, instruction), None).await?;
        Ok(strip_code_fence(&reply).to_string())
    }

    async fn explain(&self, instruction: &str, rewritten: &str) -> Result<String> {
        let messages = vec![ChatMessage::user(explain_prompt(instruction, rewritten))];
        let reply = self
            .complete(messages, Some(self.config.explain_max_tokens))
            .await?;
        Ok(reply.trim().to_string())
    }
}

fn rewrite_messages(language: &str, code: &str, instruction: &str) -> Vec<ChatMessage> {
    let mut system = String::from(
        "You are a code editing assistant. Rewrite the code you are given according to the \
         instruction. Reply with the rewritten code only, without commentary or markdown fences.",
    );
    if !language.is_empty() {
        system.push_str(&format!(" The code comes from a `{}` file.", language));
    }

    vec![
        ChatMessage::system(system),
        ChatMessage::user(format!("Instruction:\n{}\n\nCode:\n{}", instruction, code)),
    ]
}

fn explain_prompt(instruction: &str, rewritten: &str) -> String {
    format!(
        "Modified Code:\n{}\n\nPrompt:\n{}\n\nReasoning:",
        rewritten, instruction
    )
}

fn extract_completion(status: StatusCode, body: &str) -> Result<String> {
    if !status.is_success() {
        debug!(?status, body, "Chat completion request failed");
        return Err(Error::collaborator(anyhow::anyhow!(
            "OpenAI API error {}: {}",
            status,
            body
        )));
    }

    let response: ChatResponse = serde_json::from_str(body).map_err(|e| {
        Error::collaborator(anyhow::anyhow!(
            "Failed to parse completion response: {} - Response: {}",
            e,
            body
        ))
    })?;

    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or(Error::NoCompletionReceived)?;

    if let Some(refusal) = &choice.message.refusal {
        debug!(refusal = %refusal, "Model refused the request");
        return Err(Error::NoCompletionReceived);
    }

    choice.message.content.ok_or(Error::NoCompletionReceived)
}

/// Removes a single surrounding markdown code fence, if the model added one.
fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return reply;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return reply;
    };
    // Drop the info string (e.g. "python") on the opening line.
    match body.split_once('\n') {
        Some((_, code)) => code.strip_suffix('\n').unwrap_or(code),
        None => body,
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    refusal: Option<String>,
}

impl ChatMessage {
    fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: Some(content.into()),
            refusal: None,
        }
    }

    fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: Some(content.into()),
            refusal: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}
