mod custom;
mod deepl;
mod google;
#[cfg(test)]
pub(crate) mod test_server;

use crate::config::{ConfigError, ProviderConfig, ProviderKind, DEFAULT_HTTP_TIMEOUT_SECS};
use crate::lang::Direction;
use futures::future::BoxFuture;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub use custom::CustomTranslator;
pub use deepl::DeepLTranslator;
pub use google::GoogleTranslator;

const MAX_ERROR_BODY_CHARS: usize = 200;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TranslateRequest {
    pub text: String,
    pub source_lang: String,
    pub target_lang: String,
}

impl TranslateRequest {
    pub fn new<S: Into<String>>(text: S, direction: Direction) -> Self {
        Self {
            text: text.into(),
            source_lang: direction.source_lang().to_owned(),
            target_lang: direction.target_lang().to_owned(),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum TranslateError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{provider} returned HTTP {status}: {body}")]
    Status {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("{provider} request failed: {message}")]
    Transport {
        provider: &'static str,
        message: String,
    },

    #[error("{provider} sent an unreadable response: {message}")]
    InvalidResponse {
        provider: &'static str,
        message: String,
    },
}

impl TranslateError {
    pub(crate) fn transport(provider: &'static str, err: reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            "request timed out".to_owned()
        } else if err.is_connect() {
            format!("could not connect: {err}")
        } else {
            err.to_string()
        };
        TranslateError::Transport { provider, message }
    }
}

pub trait Translator: Send + Sync {
    fn name(&self) -> &'static str;

    fn translate(&self, request: TranslateRequest) -> BoxFuture<'_, Result<String, TranslateError>>;
}

/// The three supported backends, selected from a [`ProviderConfig`].
#[derive(Clone, Debug)]
pub enum Provider {
    DeepL(DeepLTranslator),
    Google(GoogleTranslator),
    Custom(CustomTranslator),
}

impl Provider {
    pub fn from_config(client: &Client, config: &ProviderConfig) -> Result<Self, ConfigError> {
        Ok(match config.kind()? {
            ProviderKind::Deepl => Provider::DeepL(DeepLTranslator::from_config(client, config)?),
            ProviderKind::Google => {
                Provider::Google(GoogleTranslator::from_config(client, config)?)
            }
            ProviderKind::Custom => {
                Provider::Custom(CustomTranslator::from_config(client, config)?)
            }
        })
    }
}

impl Translator for Provider {
    fn name(&self) -> &'static str {
        match self {
            Provider::DeepL(t) => t.name(),
            Provider::Google(t) => t.name(),
            Provider::Custom(t) => t.name(),
        }
    }

    fn translate(&self, request: TranslateRequest) -> BoxFuture<'_, Result<String, TranslateError>> {
        match self {
            Provider::DeepL(t) => t.translate(request),
            Provider::Google(t) => t.translate(request),
            Provider::Custom(t) => t.translate(request),
        }
    }
}

/// Builds a translator for the config in effect at call time.
pub trait ProviderFactory: Send + Sync {
    fn build(&self, config: &ProviderConfig) -> Result<Box<dyn Translator>, ConfigError>;
}

#[derive(Clone, Debug)]
pub struct HttpProviders {
    client: Client,
}

impl HttpProviders {
    pub fn new() -> Result<Self, TranslateError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS))
            .build()
            .map_err(|e| TranslateError::transport("http client", e))?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl ProviderFactory for HttpProviders {
    fn build(&self, config: &ProviderConfig) -> Result<Box<dyn Translator>, ConfigError> {
        Ok(Box::new(Provider::from_config(&self.client, config)?))
    }
}

/// Sends `request` and returns the body of a successful response.
pub(crate) async fn send_for_body(
    provider: &'static str,
    request: RequestBuilder,
) -> Result<String, TranslateError> {
    let response = request
        .send()
        .await
        .map_err(|e| TranslateError::transport(provider, e))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let body: String = body.trim().chars().take(MAX_ERROR_BODY_CHARS).collect();
        tracing::warn!(provider, status = status.as_u16(), "provider rejected request");
        return Err(TranslateError::Status {
            provider,
            status: status.as_u16(),
            body,
        });
    }

    response
        .text()
        .await
        .map_err(|e| TranslateError::transport(provider, e))
}

/// Returns the first non-empty string found at `pointers`. A missing or
/// non-string value is an empty translation, not an error.
pub(crate) fn extract_text(
    provider: &'static str,
    body: &str,
    pointers: &[&str],
) -> Result<String, TranslateError> {
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| TranslateError::InvalidResponse {
            provider,
            message: e.to_string(),
        })?;

    let text = pointers
        .iter()
        .filter_map(|p| value.pointer(p).and_then(serde_json::Value::as_str))
        .find(|s| !s.is_empty())
        .unwrap_or_default();
    Ok(text.to_owned())
}
