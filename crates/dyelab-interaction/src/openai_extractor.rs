//! OpenAiExtractor - extraction through an OpenAI-compatible Chat Completions API.
//!
//! Sends the rendered system prompt plus the conversation in JSON mode and
//! reads back `{"requirements": {...}, "remark": ...}`. One request per turn,
//! no retries.

use async_trait::async_trait;
use dyelab_core::ParameterField;
use dyelab_core::config::{DEFAULT_OPENAI_BASE_URL, ExtractorConfig};
use dyelab_core::error::{DyelabError, Result};
use dyelab_core::extraction::{ExtractionOutput, RequirementsExtractor};
use dyelab_core::requirements::RequirementsRecord;
use dyelab_core::session::{ConversationMessage, MessageRole};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::prompt::PromptRenderer;

/// Extractor backed by a hosted chat model.
pub struct OpenAiExtractor {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    prompt: PromptRenderer,
}

impl OpenAiExtractor {
    /// Creates a new extractor with the provided API key and model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            prompt: PromptRenderer::new()?,
        })
    }

    /// Builds from config. The API key must be set there (directly or via
    /// the environment override).
    pub fn from_config(config: &ExtractorConfig) -> Result<Self> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            DyelabError::config("extractor.api_key or OPENAI_API_KEY is required for the openai extractor")
        })?;
        Ok(Self::new(api_key, config.model_name.clone())?.with_base_url(config.base_url.clone()))
    }

    /// Overrides the API base URL, e.g. for a local OpenAI-compatible server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    fn build_messages(
        &self,
        history: &[ConversationMessage],
        current: &RequirementsRecord,
    ) -> Result<Vec<ChatMessage>> {
        let mut messages = vec![ChatMessage {
            role: "system",
            content: self.prompt.render(current)?,
        }];
        messages.extend(history.iter().filter_map(|message| {
            let role = match message.role {
                MessageRole::User => "user",
                MessageRole::Assistant => "assistant",
                MessageRole::System => return None,
            };
            Some(ChatMessage {
                role,
                content: message.content.clone(),
            })
        }));
        Ok(messages)
    }

    async fn send_request(&self, body: &ChatCompletionRequest<'_>) -> Result<String> {
        let response = self
            .client
            .post(self.endpoint())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|err| DyelabError::extraction(format!("OpenAI API request failed: {err}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read OpenAI error body".to_string());
            return Err(map_http_error(status, body_text));
        }

        let parsed: ChatCompletionResponse = response.json().await.map_err(|err| {
            DyelabError::extraction(format!("Failed to parse OpenAI response: {err}"))
        })?;

        extract_text_response(parsed)
    }
}

#[async_trait]
impl RequirementsExtractor for OpenAiExtractor {
    fn name(&self) -> &str {
        "openai"
    }

    async fn extract(
        &self,
        history: &[ConversationMessage],
        current: &RequirementsRecord,
    ) -> Result<ExtractionOutput> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages: self.build_messages(history, current)?,
            response_format: ResponseFormat {
                kind: "json_object",
            },
            temperature: 0.0,
        };

        tracing::debug!(
            "[OpenAiExtractor] Sending {} message(s) to {}",
            request.messages.len(),
            self.model
        );
        let content = self.send_request(&request).await?;
        parse_reply(&content)
    }
}

/// Parses the model's JSON reply.
///
/// Numbers may arrive as JSON numbers or numeric strings; `null` means not
/// stated. Unknown keys are ignored with a warning.
pub fn parse_reply(content: &str) -> Result<ExtractionOutput> {
    let reply: ExtractionReply = serde_json::from_str(content.trim())
        .map_err(|e| DyelabError::extraction(format!("Unparseable extraction reply: {e}")))?;

    let mut record = RequirementsRecord::new();
    for (key, value) in reply.requirements {
        let Some(field) = ParameterField::from_wire_name(&key) else {
            tracing::warn!("[OpenAiExtractor] Ignoring unknown field '{}'", key);
            continue;
        };
        match value {
            Value::Null => {}
            Value::Number(n) => {
                if let Some(v) = n.as_f64() {
                    record.insert(field, v);
                }
            }
            Value::String(s) => match s.trim().parse::<f64>() {
                Ok(v) => {
                    record.insert(field, v);
                }
                Err(_) => {
                    return Err(DyelabError::extraction(format!(
                        "Field '{}' has non-numeric value '{}'",
                        key, s
                    )));
                }
            },
            other => {
                return Err(DyelabError::extraction(format!(
                    "Field '{}' has non-numeric value {}",
                    key, other
                )));
            }
        }
    }

    let output = ExtractionOutput::new(record);
    Ok(match reply.remark.filter(|r| !r.trim().is_empty()) {
        Some(remark) => output.with_remark(remark),
        None => output,
    })
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    response_format: ResponseFormat,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Deserialize)]
struct ExtractionReply {
    requirements: Map<String, Value>,
    #[serde(default)]
    remark: Option<String>,
}

fn extract_text_response(response: ChatCompletionResponse) -> Result<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| DyelabError::extraction("OpenAI API returned no content in the response"))
}

fn map_http_error(status: StatusCode, body: String) -> DyelabError {
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|wrapper| wrapper.error.message)
        .unwrap_or(body);
    DyelabError::extraction(format!("OpenAI API returned {}: {}", status.as_u16(), message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reply_reads_numbers_and_nulls() {
        let output = parse_reply(
            r#"{"requirements": {"dye_red_owf": 4.2, "salt_gL": "50", "pH": null}, "remark": null}"#,
        )
        .unwrap();

        assert_eq!(output.record.dye_red_owf, Some(4.2));
        assert_eq!(output.record.salt_gl, Some(50.0));
        assert_eq!(output.record.ph, None);
        assert!(output.remark.is_none());
    }

    #[test]
    fn test_parse_reply_ignores_unknown_fields() {
        let output =
            parse_reply(r#"{"requirements": {"fabric": 3, "temp_C": 70}, "remark": "ok"}"#).unwrap();

        assert_eq!(output.record.temp_c, Some(70.0));
        assert_eq!(output.remark.as_deref(), Some("ok"));
    }

    #[test]
    fn test_parse_reply_rejects_prose() {
        let err = parse_reply("Sure! The salt is 50 g/L.").unwrap_err();
        assert!(err.is_extraction());
    }

    #[test]
    fn test_parse_reply_rejects_non_numeric_value() {
        let err = parse_reply(r#"{"requirements": {"salt_gL": "lots"}}"#).unwrap_err();
        assert!(err.is_extraction());
        assert!(err.to_string().contains("salt_gL"));
    }

    #[test]
    fn test_system_messages_are_not_sent() {
        let extractor = OpenAiExtractor::new("key", "gpt-4o").unwrap();
        let history = vec![
            ConversationMessage::system("session started"),
            ConversationMessage::user("red 4.2"),
            ConversationMessage::question("Green?", ParameterField::DyeGreenOwf),
        ];

        let messages = extractor
            .build_messages(&history, &RequirementsRecord::new())
            .unwrap();

        let roles: Vec<&str> = messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec!["system", "user", "assistant"]);
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let extractor = OpenAiExtractor::new("key", "gpt-4o")
            .unwrap()
            .with_base_url("http://localhost:8080/v1/");
        assert_eq!(extractor.endpoint(), "http://localhost:8080/v1/chat/completions");
    }

    #[test]
    fn test_from_config_requires_key() {
        let config = ExtractorConfig::default();
        assert!(matches!(
            OpenAiExtractor::from_config(&config),
            Err(DyelabError::Config(_))
        ));
    }
}
