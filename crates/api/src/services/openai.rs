//! OpenAI-backed content generator.
//!
//! Talks to the Chat Completions API with JSON-mode replies, and to the audio
//! transcription endpoint for spoken answers. Replies are parsed with the
//! shared domain helpers, so a malformed reply surfaces as
//! `GeneratorError::InvalidResponse`.

use std::time::Duration;

use async_trait::async_trait;
use domain::models::report::{ReportContent, ReportInput};
use domain::services::generator::{parse_json_reply, AnswerSummary, AudioClip, ProposedSchedule};
use domain::services::{ContentGenerator, GeneratorError};
use reqwest::{multipart, Client};
use serde::{Deserialize, Serialize};

use crate::config::OpenAiConfig;

const SCHEDULE_SYSTEM_PROMPT: &str = "You analyse hackathon and workshop brochures. \
Reply with JSON only: {\"slots\":[{\"t_at\":\"YYYY-MM-DD HH:MM\",\"title\":\"\",\"desc\":\"\",\
\"type\":\"ask|announce\",\"questions\":[{\"text\":\"\",\"kind\":\"text|audio|photo\"}],\
\"announce\":\"\"}]}. Ask slots carry one or two short reflection questions.";

const SUMMARY_SYSTEM_PROMPT: &str = "You summarise one participant answer. Reply with JSON only: \
{\"summary_2\":[\"first point\",\"second point\"],\"tags\":[\"one to three short tags\"]}.";

const REPORT_SYSTEM_PROMPT: &str = "You write a personal insight report from a participant's \
answers. Reply with JSON only: {\"timeline\":[{\"slot_title\":\"\",\"snap\":\"\",\"photo\":\"\"}],\
\"story\":{\"problem\":\"\",\"solution\":\"\",\"validation\":\"\"},\
\"mentoring\":{\"highlights\":[],\"applied\":[]},\"strengths\":[],\"improvements\":[],\
\"next30\":[{\"task\":\"\",\"due\":\"YYYY-MM-DD\",\"priority\":1}],\
\"star\":[{\"s\":\"\",\"t\":\"\",\"a\":\"\",\"r\":\"\"}],\"social\":{\"linkedin3\":\"\"}}. \
Be concise and use action verbs.";

/// Content generator backed by the OpenAI HTTP API.
#[derive(Clone)]
pub struct OpenAiGenerator {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    transcription_model: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    #[serde(default)]
    text: String,
}

impl OpenAiGenerator {
    pub fn new(config: &OpenAiConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            transcription_model: config.transcription_model.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Sends one system + user exchange and returns the raw reply text.
    async fn chat(
        &self,
        system: &str,
        user: &str,
        temperature: f32,
    ) -> Result<String, GeneratorError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        let response = self
            .client
            .post(self.url("chat/completions"))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| GeneratorError::Unavailable(format!("Failed to send request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(GeneratorError::Unavailable(format!(
                "OpenAI API error ({}): {}",
                status, error_text
            )));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| GeneratorError::InvalidResponse(e.to_string()))?;
        reply_content(body)
    }
}

fn reply_content(body: ChatResponse) -> Result<String, GeneratorError> {
    body.choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|c| !c.trim().is_empty())
        .ok_or(GeneratorError::Empty)
}

#[async_trait]
impl ContentGenerator for OpenAiGenerator {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn is_configured(&self) -> bool {
        true
    }

    async fn propose_slots(&self, text: &str) -> Result<ProposedSchedule, GeneratorError> {
        let user = format!("Brochure text:\n{}", text);
        let reply = self.chat(SCHEDULE_SYSTEM_PROMPT, &user, 0.7).await?;
        parse_json_reply(&reply)
    }

    async fn summarize_answer(&self, text: &str) -> Result<AnswerSummary, GeneratorError> {
        let user = format!("Answer:\n{}", text);
        let reply = self.chat(SUMMARY_SYSTEM_PROMPT, &user, 0.5).await?;
        let summary: AnswerSummary = parse_json_reply(&reply)?;
        Ok(summary.normalize(text))
    }

    async fn generate_report(&self, input: &ReportInput) -> Result<ReportContent, GeneratorError> {
        let data = serde_json::to_string(input)
            .map_err(|e| GeneratorError::InvalidResponse(e.to_string()))?;
        let user = format!("Data:\n{}", data);
        let reply = self.chat(REPORT_SYSTEM_PROMPT, &user, 0.7).await?;
        parse_json_reply(&reply)
    }

    async fn transcribe(&self, clip: &AudioClip) -> Result<String, GeneratorError> {
        let file = multipart::Part::bytes(clip.bytes.clone())
            .file_name(clip.file_name.clone())
            .mime_str(&clip.content_type)
            .map_err(|e| GeneratorError::Unavailable(format!("Invalid audio type: {}", e)))?;
        let form = multipart::Form::new()
            .text("model", self.transcription_model.clone())
            .part("file", file);

        let response = self
            .client
            .post(self.url("audio/transcriptions"))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| GeneratorError::Unavailable(format!("Failed to send audio: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(GeneratorError::Unavailable(format!(
                "OpenAI transcription error ({}): {}",
                status, error_text
            )));
        }

        let body: TranscriptionResponse = response
            .json()
            .await
            .map_err(|e| GeneratorError::InvalidResponse(e.to_string()))?;
        let text = body.text.trim().to_string();
        if text.is_empty() {
            return Err(GeneratorError::Empty);
        }
        Ok(text)
    }
}

impl std::fmt::Debug for OpenAiGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiGenerator")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator(base_url: &str) -> OpenAiGenerator {
        OpenAiGenerator::new(&OpenAiConfig {
            api_key: "sk-test".to_string(),
            base_url: base_url.to_string(),
            timeout_ms: 2_000,
            ..OpenAiConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_chat_request_shape() {
        let request = ChatRequest {
            model: "gpt-4o-mini",
            messages: vec![ChatMessage {
                role: "user",
                content: "hi",
            }],
            temperature: 0.5,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["response_format"]["type"], "json_object");
    }

    #[test]
    fn test_reply_content() {
        let body: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"{\"slots\":[]}"}}]}"#,
        )
        .unwrap();
        assert_eq!(reply_content(body).unwrap(), r#"{"slots":[]}"#);

        let empty: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(reply_content(empty), Err(GeneratorError::Empty)));
    }

    #[test]
    fn test_url_joins_base() {
        let gen = generator("https://api.example/v1/");
        assert_eq!(gen.url("chat/completions"), "https://api.example/v1/chat/completions");
    }

    #[test]
    fn test_debug_redacts_key() {
        let debug = format!("{:?}", generator("https://api.example/v1"));
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("sk-test"));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_unavailable() {
        let gen = generator("http://127.0.0.1:9");
        let err = gen.summarize_answer("Food waste").await.unwrap_err();
        assert!(matches!(err, GeneratorError::Unavailable(_)));
    }
}
