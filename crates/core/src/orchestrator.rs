//! Ties providers, glossary rewriting and undo history together.
//!
//! Pane texts live in a caller-owned [`SharedPanes`] handle and the glossaries
//! and provider config are passed into every call, so each invocation sees the
//! values current at call time.
//!
//! Concurrent invocations are not serialized. The provider request is the only
//! await point; if two requests are in flight the one that resolves last
//! writes its pane last, even if its source text has since been edited.

use crate::clipboard::Clipboard;
use crate::config::ProviderConfig;
use crate::glossary::{self, Glossaries};
use crate::history::{HistorySnapshot, HistoryStack};
use crate::lang::{Direction, Pane};
use crate::translate::{HttpProviders, ProviderFactory, TranslateError, TranslateRequest};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

const LOG_TARGET: &str = "orchestrator";

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaneState {
    pub ja: String,
    pub en: String,
}

impl PaneState {
    pub fn new<J: Into<String>, E: Into<String>>(ja: J, en: E) -> Self {
        Self {
            ja: ja.into(),
            en: en.into(),
        }
    }

    pub fn get(&self, pane: Pane) -> &str {
        match pane {
            Pane::Ja => &self.ja,
            Pane::En => &self.en,
        }
    }

    pub fn set(&mut self, pane: Pane, text: String) {
        match pane {
            Pane::Ja => self.ja = text,
            Pane::En => self.en = text,
        }
    }

    pub fn snapshot(&self) -> HistorySnapshot {
        HistorySnapshot::new(self.ja.clone(), self.en.clone())
    }

    pub fn restore(&mut self, snapshot: HistorySnapshot) {
        self.ja = snapshot.ja;
        self.en = snapshot.en;
    }

    pub fn into_shared(self) -> SharedPanes {
        Arc::new(Mutex::new(self))
    }
}

pub type SharedPanes = Arc<Mutex<PaneState>>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TranslateOutcome {
    /// Source pane was blank; nothing was pushed or sent.
    Skipped,
    Translated { direction: Direction, text: String },
}

pub struct Orchestrator<F = HttpProviders> {
    providers: F,
    history: Mutex<HistoryStack>,
    busy: AtomicBool,
    last_error: Mutex<Option<String>>,
}

impl<F: ProviderFactory> Orchestrator<F> {
    pub fn new(providers: F) -> Self {
        Self::with_history(providers, HistoryStack::new())
    }

    pub fn with_history(providers: F, history: HistoryStack) -> Self {
        Self {
            providers,
            history: Mutex::new(history),
            busy: AtomicBool::new(false),
            last_error: Mutex::new(None),
        }
    }

    /// Single flag shared by both directions. Callers reject manual requests
    /// while it is set; nothing here enforces that.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Relaxed)
    }

    /// Message of the most recent failed translation, cleared when the next
    /// attempt starts.
    pub async fn last_error(&self) -> Option<String> {
        self.last_error.lock().await.clone()
    }

    pub async fn history_len(&self) -> usize {
        self.history.lock().await.len()
    }

    /// Translates the source pane of `direction` into the opposite pane.
    ///
    /// History is pushed before the provider is called and stays pushed on
    /// failure; panes are only written on success.
    pub async fn translate(
        &self,
        direction: Direction,
        panes: &SharedPanes,
        glossaries: &Glossaries,
        config: &ProviderConfig,
    ) -> Result<TranslateOutcome, TranslateError> {
        let source = {
            let state = panes.lock().await;
            let source = state.get(direction.source_pane());
            if source.trim().is_empty() {
                tracing::debug!(target: LOG_TARGET, %direction, "source pane empty, skipping");
                return Ok(TranslateOutcome::Skipped);
            }
            self.history.lock().await.push(state.snapshot());
            source.to_owned()
        };

        *self.last_error.lock().await = None;
        self.busy.store(true, Ordering::Relaxed);

        match self.request(direction, source, config).await {
            Ok(raw) => {
                let text = glossary::apply(&raw, glossaries.for_direction(direction), direction);
                panes
                    .lock()
                    .await
                    .set(direction.target_pane(), text.clone());
                self.busy.store(false, Ordering::Relaxed);
                tracing::info!(target: LOG_TARGET, %direction, chars = text.chars().count(), "translation applied");
                Ok(TranslateOutcome::Translated { direction, text })
            }
            Err(e) => {
                self.busy.store(false, Ordering::Relaxed);
                tracing::warn!(target: LOG_TARGET, %direction, error = %e, "translation failed");
                *self.last_error.lock().await = Some(e.to_string());
                Err(e)
            }
        }
    }

    async fn request(
        &self,
        direction: Direction,
        text: String,
        config: &ProviderConfig,
    ) -> Result<String, TranslateError> {
        let translator = self.providers.build(config)?;
        tracing::debug!(target: LOG_TARGET, provider = translator.name(), %direction, "sending request");
        translator
            .translate(TranslateRequest::new(text, direction))
            .await
    }

    pub async fn swap(&self, panes: &SharedPanes) {
        let mut state = panes.lock().await;
        self.history.lock().await.push(state.snapshot());
        let PaneState { ja, en } = &mut *state;
        std::mem::swap(ja, en);
    }

    pub async fn clear(&self, panes: &SharedPanes) {
        let mut state = panes.lock().await;
        self.history.lock().await.push(state.snapshot());
        *state = PaneState::default();
    }

    /// Restores the most recent snapshot. Returns false when there is nothing
    /// to undo.
    pub async fn undo(&self, panes: &SharedPanes) -> bool {
        let mut state = panes.lock().await;
        match self.history.lock().await.pop() {
            Some(snapshot) => {
                state.restore(snapshot);
                true
            }
            None => false,
        }
    }

    /// Copies a pane to the clipboard. Failures are logged and dropped since
    /// the text is still on screen.
    pub async fn copy_pane(&self, panes: &SharedPanes, pane: Pane, clipboard: &impl Clipboard) {
        let text = panes.lock().await.get(pane).to_owned();
        if let Err(e) = clipboard.write_text(&text) {
            tracing::debug!(target: LOG_TARGET, ?pane, error = %e, "copy failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::ClipboardError;
    use crate::config::{ConfigError, ProviderKind};
    use crate::glossary::GlossaryMap;
    use crate::scheduler::AutoTranslateScheduler;
    use crate::translate::Translator;
    use futures::future::BoxFuture;
    use futures::FutureExt;
    use std::collections::HashMap;
    use std::time::Duration;

    #[derive(Clone)]
    enum Reply {
        Text(&'static str, Duration),
        Status(u16),
    }

    /// Answers by source text and records every request it sees.
    #[derive(Clone, Default)]
    struct ScriptedTranslator {
        replies: Arc<HashMap<&'static str, Reply>>,
        seen: Arc<std::sync::Mutex<Vec<TranslateRequest>>>,
    }

    impl ScriptedTranslator {
        fn with(replies: &[(&'static str, Reply)]) -> Self {
            Self {
                replies: Arc::new(replies.iter().cloned().collect()),
                seen: Arc::default(),
            }
        }

        fn seen(&self) -> Vec<TranslateRequest> {
            self.seen.lock().unwrap().clone()
        }
    }

    impl Translator for ScriptedTranslator {
        fn name(&self) -> &'static str {
            "scripted"
        }

        fn translate(
            &self,
            request: TranslateRequest,
        ) -> BoxFuture<'_, Result<String, TranslateError>> {
            async move {
                self.seen.lock().unwrap().push(request.clone());
                match self.replies.get(request.text.as_str()).cloned() {
                    Some(Reply::Text(text, delay)) => {
                        tokio::time::sleep(delay).await;
                        Ok(text.to_owned())
                    }
                    Some(Reply::Status(status)) => Err(TranslateError::Status {
                        provider: "scripted",
                        status,
                        body: String::new(),
                    }),
                    None => Ok(String::new()),
                }
            }
            .boxed()
        }
    }

    impl ProviderFactory for ScriptedTranslator {
        fn build(&self, config: &ProviderConfig) -> Result<Box<dyn Translator>, ConfigError> {
            config.kind()?;
            Ok(Box::new(self.clone()))
        }
    }

    fn config() -> ProviderConfig {
        ProviderConfig::new(ProviderKind::Custom).with_endpoint("http://127.0.0.1:1/")
    }

    #[tokio::test]
    async fn writes_result_into_target_pane() {
        let provider =
            ScriptedTranslator::with(&[("Hello cat", Reply::Text("こんにちは 猫", Duration::ZERO))]);
        let orch = Orchestrator::new(provider.clone());
        let panes = PaneState::new("", "Hello cat").into_shared();

        let out = orch
            .translate(Direction::EnToJa, &panes, &Glossaries::default(), &config())
            .await
            .expect("translated");

        assert_eq!(
            out,
            TranslateOutcome::Translated {
                direction: Direction::EnToJa,
                text: "こんにちは 猫".into()
            }
        );
        assert_eq!(*panes.lock().await, PaneState::new("こんにちは 猫", "Hello cat"));
        assert_eq!(orch.history_len().await, 1);
        assert!(!orch.is_busy());

        let seen = provider.seen();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].source_lang, "en");
        assert_eq!(seen[0].target_lang, "ja");
    }

    #[tokio::test]
    async fn glossary_rewrites_provider_output() {
        let provider =
            ScriptedTranslator::with(&[("Hello cat", Reply::Text("こんにちは 猫", Duration::ZERO))]);
        let orch = Orchestrator::new(provider);
        let panes = PaneState::new("", "Hello cat").into_shared();
        let glossaries = Glossaries {
            en_to_ja: GlossaryMap::from_iter([("猫", "ねこ")]),
            ..Default::default()
        };

        orch.translate(Direction::EnToJa, &panes, &glossaries, &config())
            .await
            .expect("translated");
        assert_eq!(panes.lock().await.ja, "こんにちは ねこ");
    }

    #[tokio::test]
    async fn only_the_direction_map_is_applied() {
        let provider = ScriptedTranslator::with(&[("猫", Reply::Text("a cat", Duration::ZERO))]);
        let orch = Orchestrator::new(provider);
        let panes = PaneState::new("猫", "").into_shared();
        let glossaries = Glossaries {
            ja_to_en: GlossaryMap::from_iter([("cat", "kitty")]),
            en_to_ja: GlossaryMap::from_iter([("a", "the")]),
        };

        orch.translate(Direction::JaToEn, &panes, &glossaries, &config())
            .await
            .expect("translated");
        assert_eq!(panes.lock().await.en, "a kitty");
    }

    #[tokio::test]
    async fn blank_source_is_silent_noop() {
        let provider = ScriptedTranslator::default();
        let orch = Orchestrator::new(provider.clone());
        let panes = PaneState::new(" \n\t ", "keep").into_shared();

        let out = orch
            .translate(Direction::JaToEn, &panes, &Glossaries::default(), &config())
            .await
            .expect("no error");

        assert_eq!(out, TranslateOutcome::Skipped);
        assert_eq!(orch.history_len().await, 0);
        assert!(provider.seen().is_empty());
        assert_eq!(panes.lock().await.en, "keep");
    }

    #[tokio::test]
    async fn provider_failure_leaves_panes_and_keeps_snapshot() {
        let provider = ScriptedTranslator::with(&[("猫", Reply::Status(503))]);
        let orch = Orchestrator::new(provider);
        let panes = PaneState::new("猫", "before").into_shared();

        let err = orch
            .translate(Direction::JaToEn, &panes, &Glossaries::default(), &config())
            .await
            .unwrap_err();

        assert!(matches!(err, TranslateError::Status { status: 503, .. }));
        assert_eq!(*panes.lock().await, PaneState::new("猫", "before"));
        assert_eq!(orch.history_len().await, 1);
        assert!(!orch.is_busy());
        assert_eq!(
            orch.last_error().await.as_deref(),
            Some("scripted returned HTTP 503: ")
        );

        assert!(orch.undo(&panes).await);
        assert_eq!(*panes.lock().await, PaneState::new("猫", "before"));
    }

    #[tokio::test]
    async fn missing_provider_is_config_error() {
        let orch = Orchestrator::new(ScriptedTranslator::default());
        let panes = PaneState::new("猫", "").into_shared();

        let err = orch
            .translate(
                Direction::JaToEn,
                &panes,
                &Glossaries::default(),
                &ProviderConfig::default(),
            )
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "no provider selected");
        assert_eq!(orch.last_error().await.as_deref(), Some("no provider selected"));
    }

    #[tokio::test]
    async fn next_attempt_clears_last_error() {
        let provider = ScriptedTranslator::with(&[
            ("bad", Reply::Status(500)),
            ("good", Reply::Text("よい", Duration::ZERO)),
        ]);
        let orch = Orchestrator::new(provider);
        let panes = PaneState::new("", "bad").into_shared();
        let g = Glossaries::default();

        assert!(orch.translate(Direction::EnToJa, &panes, &g, &config()).await.is_err());
        assert!(orch.last_error().await.is_some());

        panes.lock().await.en = "good".into();
        orch.translate(Direction::EnToJa, &panes, &g, &config())
            .await
            .expect("translated");
        assert_eq!(orch.last_error().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn busy_while_request_in_flight() {
        let provider =
            ScriptedTranslator::with(&[("猫", Reply::Text("cat", Duration::from_millis(100)))]);
        let orch = Orchestrator::new(provider);
        let panes = PaneState::new("猫", "").into_shared();
        let g = Glossaries::default();
        let cfg = config();

        let (result, busy_mid_flight) = tokio::join!(
            orch.translate(Direction::JaToEn, &panes, &g, &cfg),
            async {
                tokio::time::sleep(Duration::from_millis(10)).await;
                orch.is_busy()
            }
        );

        assert!(result.is_ok());
        assert!(busy_mid_flight);
        assert!(!orch.is_busy());
    }

    #[tokio::test(start_paused = true)]
    async fn slower_stale_response_wins_the_pane() {
        let provider = ScriptedTranslator::with(&[
            ("古い", Reply::Text("old", Duration::from_millis(200))),
            ("新しい", Reply::Text("new", Duration::from_millis(50))),
        ]);
        let orch = Orchestrator::new(provider);
        let panes = PaneState::new("古い", "").into_shared();
        let g = Glossaries::default();
        let cfg = config();

        let (first, second) = tokio::join!(
            orch.translate(Direction::JaToEn, &panes, &g, &cfg),
            async {
                panes.lock().await.ja = "新しい".into();
                orch.translate(Direction::JaToEn, &panes, &g, &cfg).await
            }
        );

        assert!(first.is_ok() && second.is_ok());
        // The edit to "新しい" was translated first, then the stale reply landed.
        assert_eq!(*panes.lock().await, PaneState::new("新しい", "old"));
        assert_eq!(orch.history_len().await, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn debounced_edits_translate_latest_text_once() {
        let provider =
            ScriptedTranslator::with(&[("Hello cat", Reply::Text("こんにちは 猫", Duration::ZERO))]);
        let orch = Orchestrator::new(provider.clone());
        let panes = PaneState::default().into_shared();
        let glossaries = Glossaries {
            en_to_ja: GlossaryMap::from_iter([("猫", "ねこ")]),
            ..Default::default()
        };
        let (mut scheduler, mut triggers) = AutoTranslateScheduler::new(true);

        for text in ["Hel", "Hello", "Hello cat"] {
            panes.lock().await.en = text.into();
            assert!(scheduler.on_change(Pane::En, text));
            tokio::time::sleep(Duration::from_millis(200)).await;
        }

        let trigger = triggers.recv().await.expect("trigger");
        assert_eq!(trigger.direction, Direction::EnToJa);
        orch.translate(trigger.direction, &panes, &glossaries, &config())
            .await
            .expect("translated");

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(triggers.try_recv().is_err());

        let seen = provider.seen();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].text, "Hello cat");
        assert_eq!(*panes.lock().await, PaneState::new("こんにちは ねこ", "Hello cat"));
    }

    #[tokio::test]
    async fn swap_then_undo_restores() {
        let orch = Orchestrator::new(ScriptedTranslator::default());
        let panes = PaneState::new("A", "B").into_shared();

        orch.swap(&panes).await;
        assert_eq!(*panes.lock().await, PaneState::new("B", "A"));
        assert_eq!(orch.history_len().await, 1);

        assert!(orch.undo(&panes).await);
        assert_eq!(*panes.lock().await, PaneState::new("A", "B"));
        assert_eq!(orch.history_len().await, 0);
        assert!(!orch.undo(&panes).await);
    }

    #[tokio::test]
    async fn clear_is_undoable() {
        let orch = Orchestrator::new(ScriptedTranslator::default());
        let panes = PaneState::new("猫", "cat").into_shared();

        orch.clear(&panes).await;
        assert_eq!(*panes.lock().await, PaneState::default());
        orch.undo(&panes).await;
        assert_eq!(*panes.lock().await, PaneState::new("猫", "cat"));
    }

    struct BrokenClipboard;

    impl Clipboard for BrokenClipboard {
        fn write_text(&self, _text: &str) -> Result<(), ClipboardError> {
            Err(ClipboardError::Unavailable("no display".into()))
        }
    }

    #[derive(Default)]
    struct RecordingClipboard(std::sync::Mutex<Vec<String>>);

    impl Clipboard for RecordingClipboard {
        fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
            self.0.lock().unwrap().push(text.to_owned());
            Ok(())
        }
    }

    #[tokio::test]
    async fn copy_writes_pane_and_swallows_failures() {
        let orch = Orchestrator::new(ScriptedTranslator::default());
        let panes = PaneState::new("猫", "cat").into_shared();

        let clip = RecordingClipboard::default();
        orch.copy_pane(&panes, Pane::En, &clip).await;
        assert_eq!(*clip.0.lock().unwrap(), vec!["cat".to_owned()]);

        orch.copy_pane(&panes, Pane::Ja, &BrokenClipboard).await;
        assert_eq!(orch.history_len().await, 0);
    }
}
