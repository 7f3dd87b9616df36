use crate::config::{ApiKey, ConfigError, ProviderConfig, ProviderKind, DEFAULT_DEEPL_ENDPOINT};
use crate::translate::{extract_text, send_for_body, TranslateError, TranslateRequest, Translator};
use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::Client;
use url::Url;

const NAME: &str = "DeepL";

/// Form-encoded DeepL v2 API, authenticated with the `auth_key` field.
#[derive(Clone, Debug)]
pub struct DeepLTranslator {
    client: Client,
    api_key: ApiKey,
    endpoint: Url,
}

impl DeepLTranslator {
    pub fn new(client: Client, api_key: ApiKey, endpoint: Url) -> Self {
        Self {
            client,
            api_key,
            endpoint,
        }
    }

    pub fn from_config(client: &Client, config: &ProviderConfig) -> Result<Self, ConfigError> {
        let api_key = config.require_api_key(ProviderKind::Deepl)?.clone();
        let endpoint = config.resolve_endpoint(Some(DEFAULT_DEEPL_ENDPOINT))?;
        Ok(Self::new(client.clone(), api_key, endpoint))
    }
}

impl Translator for DeepLTranslator {
    fn name(&self) -> &'static str {
        NAME
    }

    fn translate(&self, request: TranslateRequest) -> BoxFuture<'_, Result<String, TranslateError>> {
        async move {
            let source_lang = request.source_lang.to_uppercase();
            let target_lang = request.target_lang.to_uppercase();
            let form = [
                ("auth_key", self.api_key.expose()),
                ("text", request.text.as_str()),
                ("source_lang", source_lang.as_str()),
                ("target_lang", target_lang.as_str()),
            ];

            let http = self.client.post(self.endpoint.clone()).form(&form);
            let body = send_for_body(NAME, http).await?;
            extract_text(NAME, &body, &["/translations/0/text"])
        }
        .boxed()
    }
}
