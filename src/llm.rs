use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, trace};

use crate::config::LlmConfig;
use crate::error::ReviewError;

/// One structured-prompt invocation: instruction text plus the JSON schema
/// the response must conform to.
#[derive(Debug, Clone)]
pub struct StructuredPrompt {
    /// Template name, for logs only
    pub name: &'static str,
    pub system: String,
    pub user: String,
    pub schema_name: &'static str,
    pub output_schema: Value,
}

/// Seam between the pipeline and the model service. Tests substitute scripted
/// stubs; production uses [`OpenAiClient`].
#[async_trait]
pub trait TextModel: Send + Sync {
    /// Issue one call and return the raw completion text. Single attempt, no
    /// retry: failures propagate to the orchestrator.
    async fn generate(&self, prompt: &StructuredPrompt) -> Result<String, ReviewError>;
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    response_format: Value,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Deserialize)]
struct AssistantMessage {
    content: Option<String>,
}

/// OpenAI-compatible chat-completions client.
pub struct OpenAiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: Option<f32>,
    headers: HashMap<String, String>,
    body: Value,
}

impl OpenAiClient {
    /// Create a client from config. The HTTP timeout bounds the whole
    /// request/response cycle; there is no separate deadline upstream.
    pub fn new(config: &LlmConfig, api_key: &str) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            headers: config.headers.clone(),
            body: config.body.clone(),
        })
    }
}

#[async_trait]
impl TextModel for OpenAiClient {
    async fn generate(&self, prompt: &StructuredPrompt) -> Result<String, ReviewError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: prompt.system.clone(),
                },
                ChatMessage {
                    role: "user",
                    content: prompt.user.clone(),
                },
            ],
            temperature: self.temperature,
            response_format: response_format(prompt.schema_name, &prompt.output_schema),
        };

        // Serialize through Value so config body overrides can be merged in
        let mut payload = serde_json::to_value(&request)
            .map_err(|e| ReviewError::ModelUnavailable(e.to_string()))?;
        if let (Some(target), Some(extra)) = (payload.as_object_mut(), self.body.as_object()) {
            for (key, value) in extra {
                target.insert(key.clone(), value.clone());
            }
        }

        debug!("[{}] Calling {} ({})", prompt.name, self.base_url, self.model);
        let mut builder = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json");
        for (key, value) in &self.headers {
            builder = builder.header(key, value);
        }

        let response = builder.json(&payload).send().await?.error_for_status()?;

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| ReviewError::ModelUnavailable(e.to_string()))?;
        trace!(
            "[{}] Response has {} choices",
            prompt.name,
            chat_response.choices.len()
        );

        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| {
                ReviewError::SchemaViolation("model returned an empty completion".to_string())
            })
    }
}

/// Build the `response_format` block requesting strict schema-conformant JSON.
fn response_format(name: &str, schema: &Value) -> Value {
    serde_json::json!({
        "type": "json_schema",
        "json_schema": {
            "name": name,
            "strict": true,
            "schema": schema,
        }
    })
}

/// Pull the JSON object out of a completion that may wrap it in prose or a
/// code fence. A completion with no object at all is a schema violation.
pub(crate) fn extract_json_object(content: &str) -> Result<&str, ReviewError> {
    if serde_json::from_str::<Value>(content).is_ok() {
        return Ok(content);
    }

    match (content.find('{'), content.rfind('}')) {
        (Some(start), Some(end)) if start < end => Ok(&content[start..=end]),
        _ => Err(ReviewError::SchemaViolation(
            "response did not include a JSON object".to_string(),
        )),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Scripted model for pipeline tests: pops one canned outcome per call
    /// and records which template invoked it.
    pub struct ScriptedModel {
        responses: Mutex<Vec<Result<String, ReviewError>>>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedModel {
        pub fn new(responses: Vec<Result<String, ReviewError>>) -> Self {
            Self {
                responses: Mutex::new(responses),
                calls: Mutex::new(Vec::new()),
            }
        }

        /// Template names of the calls made so far, in order.
        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TextModel for ScriptedModel {
        async fn generate(&self, prompt: &StructuredPrompt) -> Result<String, ReviewError> {
            self.calls.lock().unwrap().push(prompt.name.to_string());
            let mut responses = self.responses.lock().unwrap();
            assert!(
                !responses.is_empty(),
                "unexpected extra model call from template '{}'",
                prompt.name
            );
            responses.remove(0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_format_wraps_schema() {
        let schema = serde_json::json!({"type": "object"});
        let format = response_format("review", &schema);
        assert_eq!(format["type"], "json_schema");
        assert_eq!(format["json_schema"]["name"], "review");
        assert_eq!(format["json_schema"]["schema"]["type"], "object");
    }

    #[test]
    fn test_extract_whole_json() {
        assert_eq!(extract_json_object(r#"{"fix": "x"}"#).unwrap(), r#"{"fix": "x"}"#);
    }

    #[test]
    fn test_extract_fenced_json() {
        let content = "Sure:\n```json\n{\"fix\": \"x\"}\n```";
        assert_eq!(extract_json_object(content).unwrap(), r#"{"fix": "x"}"#);
    }

    #[test]
    fn test_extract_without_object_is_schema_violation() {
        let err = extract_json_object("no json here").unwrap_err();
        assert!(matches!(err, ReviewError::SchemaViolation(_)));
    }

    #[test]
    fn test_chat_request_omits_unset_temperature() {
        let request = ChatRequest {
            model: "m".into(),
            messages: vec![],
            temperature: None,
            response_format: serde_json::json!({}),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("temperature").is_none());
    }
}
