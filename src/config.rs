// Process configuration, read from the environment

use std::net::IpAddr;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::llm::ModelOptions;

/// Instruction placed at the head of every forwarded conversation
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a professional AI assistant. \
When asked for code (like Dockerfiles, Python, etc.), ALWAYS format it clearly using Markdown code blocks (```language ... ```). \
Provide the code first, then a brief explanation. \
Keep the response structured and professional.";

pub const DEFAULT_OLLAMA_HOST: &str = "http://localhost:11434";
pub const DEFAULT_OLLAMA_PORT: u16 = 11434;
pub const DEFAULT_MODEL: &str = "llama3.2:latest";

/// Errors raised while building the configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },

    #[error("Invalid Ollama host {0:?}")]
    InvalidHost(String),
}

/// Configuration for the relay server
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Base URL of the Ollama server
    pub ollama_host: String,

    /// Model identifier requested for every chat
    pub model: String,

    /// System instruction; `None` forwards the conversation without one
    pub system_prompt: Option<String>,

    /// Sampling parameters forwarded as `options`
    pub options: ModelOptions,

    /// Bound on establishing the upstream connection
    pub connect_timeout: Duration,

    /// Listen address
    pub bind_addr: IpAddr,

    /// Listen port
    pub port: u16,

    /// Largest accepted request body
    pub max_body_bytes: u64,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            ollama_host: DEFAULT_OLLAMA_HOST.to_string(),
            model: DEFAULT_MODEL.to_string(),
            system_prompt: Some(DEFAULT_SYSTEM_PROMPT.to_string()),
            options: ModelOptions::default(),
            connect_timeout: Duration::from_secs(5),
            bind_addr: IpAddr::from([0, 0, 0, 0]),
            port: 5000,
            max_body_bytes: 1024 * 1024,
        }
    }
}

impl RelayConfig {
    /// Build the configuration from process environment variables
    ///
    /// Call `dotenvy::dotenv()` first to pick up a `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup
    ///
    /// # Example
    ///
    /// ```
    /// use ollama_relay::config::RelayConfig;
    ///
    /// let config = RelayConfig::from_lookup(|key| match key {
    ///     "OLLAMA_MODEL" => Some("mistral:7b".to_string()),
    ///     _ => None,
    /// })
    /// .unwrap();
    /// assert_eq!(config.model, "mistral:7b");
    /// ```
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup("OLLAMA_HOST").filter(|h| !h.trim().is_empty()) {
            config.ollama_host = normalize_host(&host)?;
        }
        if let Some(model) = lookup("OLLAMA_MODEL").filter(|m| !m.trim().is_empty()) {
            config.model = model.trim().to_string();
        }
        if let Some(prompt) = lookup("RELAY_SYSTEM_PROMPT") {
            config.system_prompt = if prompt.trim().is_empty() {
                None
            } else {
                Some(prompt)
            };
        }
        if let Some(secs) = parse_var::<u64, _>(&lookup, "OLLAMA_CONNECT_TIMEOUT_SECS")? {
            config.connect_timeout = Duration::from_secs(secs);
        }

        config.options.temperature = parse_var(&lookup, "OLLAMA_TEMPERATURE")?;
        config.options.top_p = parse_var(&lookup, "OLLAMA_TOP_P")?;
        config.options.top_k = parse_var(&lookup, "OLLAMA_TOP_K")?;
        config.options.num_predict = parse_var(&lookup, "OLLAMA_NUM_PREDICT")?;
        config.options.num_ctx = parse_var(&lookup, "OLLAMA_NUM_CTX")?;

        if let Some(addr) = parse_var(&lookup, "RELAY_BIND_ADDR")? {
            config.bind_addr = addr;
        }
        if let Some(port) = parse_var(&lookup, "RELAY_PORT")? {
            config.port = port;
        }
        if let Some(limit) = parse_var(&lookup, "RELAY_MAX_BODY_BYTES")? {
            config.max_body_bytes = limit;
        }

        Ok(config)
    }

    /// Set the Ollama host, normalizing it
    pub fn with_ollama_host(mut self, host: &str) -> Result<Self, ConfigError> {
        self.ollama_host = normalize_host(host)?;
        Ok(self)
    }

    /// Set the model identifier
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set or clear the system instruction
    pub fn with_system_prompt(mut self, prompt: Option<String>) -> Self {
        self.system_prompt = prompt;
        self
    }

    /// Set the sampling parameters
    pub fn with_options(mut self, options: ModelOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the listen port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }
}

/// Parse an optional variable; blank counts as unset
fn parse_var<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
    }
}

/// Normalize an Ollama host the way the official clients accept it
///
/// `localhost`, `localhost:11434` and `http://localhost:11434/` all become
/// `http://localhost:11434`. The default port is added only when the
/// authority carries none.
pub fn normalize_host(host: &str) -> Result<String, ConfigError> {
    let trimmed = host.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ConfigError::InvalidHost(host.to_string()));
    }

    let (scheme, rest) = match trimmed.split_once("://") {
        Some((scheme, rest)) => (scheme.to_ascii_lowercase(), rest),
        None => ("http".to_string(), trimmed),
    };
    if scheme != "http" && scheme != "https" {
        return Err(ConfigError::InvalidHost(host.to_string()));
    }

    let (authority, path) = match rest.find('/') {
        Some(idx) => rest.split_at(idx),
        None => (rest, ""),
    };
    if authority.is_empty() {
        return Err(ConfigError::InvalidHost(host.to_string()));
    }

    // A bracketed IPv6 literal carries a port only after the closing bracket
    let has_port = match authority.rfind(']') {
        Some(bracket) => authority[bracket..].contains(':'),
        None => authority.contains(':'),
    };

    let normalized = if has_port {
        format!("{}://{}{}", scheme, authority, path)
    } else {
        format!("{}://{}:{}{}", scheme, authority, DEFAULT_OLLAMA_PORT, path)
    };

    reqwest::Url::parse(&normalized).map_err(|_| ConfigError::InvalidHost(host.to_string()))?;

    Ok(normalized)
}
