use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use url::Url;

pub const DEFAULT_DEEPL_ENDPOINT: &str = "https://api-free.deepl.com/v2/translate";
pub const DEFAULT_GOOGLE_ENDPOINT: &str = "https://translation.googleapis.com/language/translate/v2";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const ENV_PROVIDER: &str = "BILINGUAL_PAD_PROVIDER";
pub const ENV_ENDPOINT: &str = "BILINGUAL_PAD_ENDPOINT";
pub const ENV_API_KEY: &str = "BILINGUAL_PAD_API_KEY";

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Deepl,
    Google,
    Custom,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Deepl => "deepl",
            ProviderKind::Google => "google",
            ProviderKind::Custom => "custom",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderKind::Deepl => "DeepL",
            ProviderKind::Google => "Google",
            ProviderKind::Custom => "custom provider",
        }
    }

    /// Lenient parse used for persisted values; anything unknown means
    /// "no provider selected".
    pub fn parse_lossy(value: &str) -> Option<Self> {
        value.parse().ok()
    }
}

impl FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "deepl" => Ok(ProviderKind::Deepl),
            "google" => Ok(ProviderKind::Google),
            "custom" => Ok(ProviderKind::Custom),
            _ => Err(ConfigError::NoProviderSelected),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new<S: Into<String>>(value: S) -> Result<Self, ConfigError> {
        let v = value.into();
        if v.trim().is_empty() {
            return Err(ConfigError::EmptyApiKey);
        }
        Ok(Self(v))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(**redacted**)")
    }
}

/// Which backend to call and how to reach it. Owned by the caller and passed
/// into every translate call; nothing in this crate keeps a copy between calls.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProviderConfig {
    pub kind: Option<ProviderKind>,
    pub endpoint: Option<String>,
    pub api_key: Option<ApiKey>,
}

impl ProviderConfig {
    pub fn new(kind: ProviderKind) -> Self {
        Self {
            kind: Some(kind),
            ..Default::default()
        }
    }

    pub fn with_endpoint<S: Into<String>>(mut self, endpoint: S) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_api_key(mut self, key: ApiKey) -> Self {
        self.api_key = Some(key);
        self
    }

    pub fn kind(&self) -> Result<ProviderKind, ConfigError> {
        self.kind.ok_or(ConfigError::NoProviderSelected)
    }

    pub fn require_api_key(&self, kind: ProviderKind) -> Result<&ApiKey, ConfigError> {
        self.api_key.as_ref().ok_or(ConfigError::MissingApiKey {
            provider: kind.display_name(),
        })
    }

    /// The configured endpoint, or `default` when none is set. Custom
    /// providers pass `None` and must have an explicit endpoint.
    pub fn resolve_endpoint(&self, default: Option<&str>) -> Result<Url, ConfigError> {
        let raw = match (self.endpoint.as_deref().map(str::trim), default) {
            (Some(e), _) if !e.is_empty() => e,
            (_, Some(d)) => d,
            _ => return Err(ConfigError::MissingEndpoint),
        };
        Url::parse(raw).map_err(|e| ConfigError::InvalidEndpoint(format!("{raw}: {e}")))
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no provider selected")]
    NoProviderSelected,
    #[error("{provider} requires an api key")]
    MissingApiKey { provider: &'static str },
    #[error("custom provider requires an endpoint")]
    MissingEndpoint,
    #[error("invalid endpoint {0}")]
    InvalidEndpoint(String),
    #[error("api key must not be empty")]
    EmptyApiKey,
}

pub trait Env {
    fn var(&self, key: &str) -> Option<String>;
}

#[derive(Clone, Debug, Default)]
pub struct StdEnv;

impl Env for StdEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

#[derive(Clone, Debug, Default)]
pub struct MapEnv {
    vars: std::collections::BTreeMap<String, String>,
}

impl MapEnv {
    pub fn with_var(mut self, key: &str, value: &str) -> Self {
        self.vars.insert(key.to_owned(), value.to_owned());
        self
    }
}

impl Env for MapEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

pub fn resolve_api_key(
    cli_value: Option<String>,
    env_key: &str,
    env: &impl Env,
) -> Result<Option<ApiKey>, ConfigError> {
    match cli_value {
        Some(v) => Ok(Some(ApiKey::new(v)?)),
        None => match env.var(env_key) {
            Some(v) => Ok(Some(ApiKey::new(v)?)),
            None => Ok(None),
        },
    }
}

pub fn resolve_optional_string(
    cli_value: Option<String>,
    env_key: &str,
    env: &impl Env,
) -> Option<String> {
    match cli_value {
        Some(v) => Some(v),
        None => env.var(env_key),
    }
}

/// Overlays CLI flags and environment variables on top of a persisted config.
/// Precedence: flag, then environment, then `persisted`.
pub fn resolve_provider_config(
    provider: Option<String>,
    endpoint: Option<String>,
    api_key: Option<String>,
    env: &impl Env,
    persisted: ProviderConfig,
) -> Result<ProviderConfig, ConfigError> {
    let kind = match resolve_optional_string(provider, ENV_PROVIDER, env) {
        Some(v) => Some(v.parse::<ProviderKind>()?),
        None => persisted.kind,
    };
    let endpoint = resolve_optional_string(endpoint, ENV_ENDPOINT, env).or(persisted.endpoint);
    let api_key = resolve_api_key(api_key, ENV_API_KEY, env)?.or(persisted.api_key);

    Ok(ProviderConfig {
        kind,
        endpoint,
        api_key,
    })
}
