use anyhow::Context;
use bilingual_pad_core::settings::MemoryStore;
use std::collections::BTreeMap;
use std::path::Path;

pub fn load(path: &Path) -> anyhow::Result<MemoryStore> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "settings file missing, starting empty");
        return Ok(MemoryStore::default());
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading settings from {}", path.display()))?;
    let values: BTreeMap<String, String> = serde_json::from_str(&raw)
        .with_context(|| format!("parsing settings in {}", path.display()))?;
    Ok(MemoryStore::from(values))
}

pub fn save(path: &Path, store: MemoryStore) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&store.into_inner())?;
    std::fs::write(path, json).with_context(|| format!("writing settings to {}", path.display()))
}
