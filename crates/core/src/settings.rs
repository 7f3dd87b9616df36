use crate::config::{ApiKey, ProviderConfig, ProviderKind};
use crate::glossary::{Glossaries, GlossaryMap};
use crate::orchestrator::PaneState;
use std::collections::BTreeMap;

pub mod keys {
    pub const JA_TEXT: &str = "ja_text";
    pub const EN_TEXT: &str = "en_text";
    pub const LIVE: &str = "live";
    pub const PROVIDER: &str = "provider";
    pub const ENDPOINT: &str = "endpoint";
    pub const API_KEY: &str = "api_key";
    pub const GLOSSARY_JA_EN: &str = "glossary_ja_en";
    pub const GLOSSARY_EN_JA: &str = "glossary_en_ja";
}

pub trait SettingsStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
}

#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn with_value(mut self, key: &str, value: &str) -> Self {
        self.values.insert(key.to_owned(), value.to_owned());
        self
    }

    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.values
    }
}

impl From<BTreeMap<String, String>> for MemoryStore {
    fn from(values: BTreeMap<String, String>) -> Self {
        Self { values }
    }
}

impl SettingsStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_owned(), value.to_owned());
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Settings {
    pub panes: PaneState,
    pub live: bool,
    pub provider: ProviderConfig,
    pub glossaries: Glossaries,
}

impl Settings {
    /// Missing or malformed values fall back to defaults. An unknown provider
    /// name loads as "no provider selected".
    pub fn load(store: &impl SettingsStore) -> Self {
        let non_empty = |key: &str| store.get(key).filter(|v| !v.trim().is_empty());

        let provider = ProviderConfig {
            kind: non_empty(keys::PROVIDER).and_then(|v| ProviderKind::parse_lossy(&v)),
            endpoint: non_empty(keys::ENDPOINT),
            api_key: non_empty(keys::API_KEY).and_then(|v| ApiKey::new(v).ok()),
        };

        Self {
            panes: PaneState::new(
                store.get(keys::JA_TEXT).unwrap_or_default(),
                store.get(keys::EN_TEXT).unwrap_or_default(),
            ),
            live: store
                .get(keys::LIVE)
                .is_some_and(|v| matches!(v.trim(), "true" | "1" | "on")),
            provider,
            glossaries: Glossaries {
                ja_to_en: GlossaryMap::parse(&store.get(keys::GLOSSARY_JA_EN).unwrap_or_default()),
                en_to_ja: GlossaryMap::parse(&store.get(keys::GLOSSARY_EN_JA).unwrap_or_default()),
            },
        }
    }

    pub fn save(&self, store: &mut impl SettingsStore) {
        store.set(keys::JA_TEXT, &self.panes.ja);
        store.set(keys::EN_TEXT, &self.panes.en);
        store.set(keys::LIVE, if self.live { "true" } else { "false" });
        store.set(
            keys::PROVIDER,
            self.provider.kind.map(|k| k.as_str()).unwrap_or_default(),
        );
        store.set(keys::ENDPOINT, self.provider.endpoint.as_deref().unwrap_or_default());
        store.set(
            keys::API_KEY,
            self.provider.api_key.as_ref().map(ApiKey::expose).unwrap_or_default(),
        );
        store.set(keys::GLOSSARY_JA_EN, &self.glossaries.ja_to_en.to_text());
        store.set(keys::GLOSSARY_EN_JA, &self.glossaries.en_to_ja.to_text());
    }
}
