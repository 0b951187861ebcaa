use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;

#[derive(Deserialize, Debug, Default)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub review: ReviewConfig,
}

#[derive(Deserialize, Debug)]
pub struct LlmConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Sampling temperature; omitted from requests when unset
    #[serde(default)]
    pub temperature: Option<f32>,
    /// HTTP timeout for one model call, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Extra headers sent with every model request
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// Extra top-level fields merged into every request body
    #[serde(default = "default_body")]
    pub body: Value,
}

#[derive(Deserialize, Debug)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

#[derive(Deserialize, Debug, Default)]
pub struct ReviewConfig {
    /// Which review output contract to request from the model
    #[serde(default)]
    pub schema: SchemaVariant,
    /// How issues are ordered after review
    #[serde(default)]
    pub prioritize: PrioritizeMode,
}

/// Output contract requested from the review call.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SchemaVariant {
    /// Plain correctness review: optional line numbers, no security flag
    Correctness,
    /// Security-hardened review: mandatory line numbers and security flags,
    /// fixes carry inline explanatory comments
    #[default]
    Security,
}

/// Ordering strategy for the prioritization pass.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PrioritizeMode {
    /// Deterministic stable sort by severity rank, no model call
    #[default]
    Local,
    /// Ask the model to reorder, then enforce the ordering locally
    Model,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            temperature: None,
            timeout_secs: default_timeout_secs(),
            headers: HashMap::new(),
            body: default_body(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_body() -> Value {
    Value::Null
}

fn default_bind() -> String {
    "127.0.0.1:4310".to_string()
}

/// Default config written by `code-sherlock init`
pub const DEFAULT_CONFIG: &str = r#"[llm]
# OpenAI-compatible chat-completions endpoint
base_url = "https://api.openai.com/v1"
model = "gpt-4o-mini"
# HTTP timeout for one model call, in seconds
timeout_secs = 60
# Extra headers sent with every model request
# headers = { "X-Custom" = "value" }

[server]
# Address the review service listens on
bind = "127.0.0.1:4310"

[review]
# Review output contract: "security" (mandatory line numbers and security
# flags) or "correctness" (plain review)
schema = "security"
# Issue ordering: "local" (deterministic severity sort) or "model" (ask the
# model to reorder, then enforce the order locally)
prioritize = "local"
"#;

impl Config {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        let config = toml::from_str(&content)?;
        Ok(config)
    }
}
