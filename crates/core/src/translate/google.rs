use crate::config::{ApiKey, ConfigError, ProviderConfig, ProviderKind, DEFAULT_GOOGLE_ENDPOINT};
use crate::translate::{extract_text, send_for_body, TranslateError, TranslateRequest, Translator};
use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::Client;
use serde::Serialize;
use url::Url;

const NAME: &str = "Google";

/// Google Translation v2 JSON API, key passed as a query parameter.
#[derive(Clone, Debug)]
pub struct GoogleTranslator {
    client: Client,
    api_key: ApiKey,
    endpoint: Url,
}

#[derive(Serialize)]
struct GoogleRequest<'a> {
    q: &'a str,
    source: String,
    target: String,
    format: &'static str,
}

impl GoogleTranslator {
    pub fn new(client: Client, api_key: ApiKey, endpoint: Url) -> Self {
        Self {
            client,
            api_key,
            endpoint,
        }
    }

    pub fn from_config(client: &Client, config: &ProviderConfig) -> Result<Self, ConfigError> {
        let api_key = config.require_api_key(ProviderKind::Google)?.clone();
        let endpoint = config.resolve_endpoint(Some(DEFAULT_GOOGLE_ENDPOINT))?;
        Ok(Self::new(client.clone(), api_key, endpoint))
    }
}

impl Translator for GoogleTranslator {
    fn name(&self) -> &'static str {
        NAME
    }

    fn translate(&self, request: TranslateRequest) -> BoxFuture<'_, Result<String, TranslateError>> {
        async move {
            let payload = GoogleRequest {
                q: &request.text,
                source: request.source_lang.to_lowercase(),
                target: request.target_lang.to_lowercase(),
                format: "text",
            };

            let http = self
                .client
                .post(self.endpoint.clone())
                .query(&[("key", self.api_key.expose())])
                .json(&payload);
            let body = send_for_body(NAME, http).await?;
            extract_text(NAME, &body, &["/data/translations/0/translatedText"])
        }
        .boxed()
    }
}
