//! Translation of release-note bodies via the OpenAI chat completions API.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::feed::ensure_ok;

pub trait Translator {
    fn translate(&self, text: &str) -> Result<String>;
}

pub struct OpenAiTranslator {
    base_url: String,
    api_key: String,
    model: String,
    target_language: String,
    client: reqwest::blocking::Client,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

impl OpenAiTranslator {
    pub fn new(
        base_url: &str,
        api_key: &str,
        model: &str,
        target_language: &str,
    ) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent("relnotes")
            .build()
            .context("build reqwest client")?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            target_language: target_language.to_string(),
            client,
        })
    }
}

impl Translator for OpenAiTranslator {
    fn translate(&self, text: &str) -> Result<String> {
        let instruction = format!(
            "Translate the given text into {}. Output only the translation.",
            self.target_language
        );
        let req = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &instruction,
                },
                ChatMessage {
                    role: "user",
                    content: text,
                },
            ],
        };

        let resp = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Bearer {}", self.api_key),
            )
            .json(&req)
            .send()
            .context("send translation request")?;
        let resp = ensure_ok(resp, "translate")?;

        let parsed: ChatResponse = resp.json().context("parse translation response")?;
        let answer = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .context("translation response contains no choices")?;
        Ok(answer)
    }
}
