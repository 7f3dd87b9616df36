use crate::config::{ConfigError, ProviderConfig};
use crate::translate::{extract_text, send_for_body, TranslateError, TranslateRequest, Translator};
use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::Client;
use serde::Serialize;
use url::Url;

const NAME: &str = "custom provider";

/// User-run proxy. The endpoint is trusted and takes no credentials.
#[derive(Clone, Debug)]
pub struct CustomTranslator {
    client: Client,
    endpoint: Url,
}

#[derive(Serialize)]
struct CustomRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
}

impl CustomTranslator {
    pub fn new(client: Client, endpoint: Url) -> Self {
        Self { client, endpoint }
    }

    pub fn from_config(client: &Client, config: &ProviderConfig) -> Result<Self, ConfigError> {
        let endpoint = config.resolve_endpoint(None)?;
        Ok(Self::new(client.clone(), endpoint))
    }
}

impl Translator for CustomTranslator {
    fn name(&self) -> &'static str {
        NAME
    }

    fn translate(&self, request: TranslateRequest) -> BoxFuture<'_, Result<String, TranslateError>> {
        async move {
            let payload = CustomRequest {
                q: &request.text,
                source: &request.source_lang,
                target: &request.target_lang,
            };
            let http = self.client.post(self.endpoint.clone()).json(&payload);
            let body = send_for_body(NAME, http).await?;
            extract_text(NAME, &body, &["/text", "/translation"])
        }
        .boxed()
    }
}
