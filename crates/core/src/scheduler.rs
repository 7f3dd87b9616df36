//! Debounced automatic translation while "live" mode is on.
//!
//! Each direction owns an independent trailing-edge timer. Only the last
//! qualifying change inside a quiet window produces a [`Trigger`]. Triggers
//! are delivered on a channel; whoever drains it calls the orchestrator.

use crate::lang::{is_japanese, Direction, Pane};
use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(600);
const LOG_TARGET: &str = "scheduler";

/// A cancellable delayed task. Resetting drops the previous pending task.
#[derive(Debug)]
pub struct DebounceTimer {
    window: Duration,
    pending: Option<JoinHandle<()>>,
}

impl DebounceTimer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    /// Cancels any pending task and schedules `fire` to run once the window
    /// has elapsed. Must be called from within a tokio runtime.
    pub fn reset<F>(&mut self, fire: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        let window = self.window;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(window).await;
            fire.await;
        }));
    }

    /// Returns true if a task was still waiting.
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(handle) => {
                let was_pending = !handle.is_finished();
                handle.abort();
                was_pending
            }
            None => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for DebounceTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// A debounced request to translate in `direction`. The orchestrator reads the
/// source text from the panes when it runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Trigger {
    pub direction: Direction,
}

pub struct AutoTranslateScheduler {
    live: bool,
    ja_to_en: DebounceTimer,
    en_to_ja: DebounceTimer,
    tx: mpsc::UnboundedSender<Trigger>,
}

impl AutoTranslateScheduler {
    pub fn new(live: bool) -> (Self, mpsc::UnboundedReceiver<Trigger>) {
        Self::with_window(live, DEBOUNCE_WINDOW)
    }

    pub fn with_window(live: bool, window: Duration) -> (Self, mpsc::UnboundedReceiver<Trigger>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let scheduler = Self {
            live,
            ja_to_en: DebounceTimer::new(window),
            en_to_ja: DebounceTimer::new(window),
            tx,
        };
        (scheduler, rx)
    }

    pub fn is_live(&self) -> bool {
        self.live
    }

    /// Turning live mode off also drops both pending timers.
    pub fn set_live(&mut self, live: bool) {
        self.live = live;
        if !live {
            self.cancel_all();
        }
    }

    pub fn cancel_all(&mut self) {
        self.ja_to_en.cancel();
        self.en_to_ja.cancel();
    }

    pub fn is_pending(&self, direction: Direction) -> bool {
        self.timer(direction).is_pending()
    }

    /// Reports an edit of `pane`. Returns true if a translation was scheduled.
    ///
    /// The JA pane only schedules when its text looks Japanese and the EN pane
    /// only when it does not, so a pane just overwritten with a result in the
    /// other language does not bounce back. A change that fails the gate also
    /// drops that pane's pending timer.
    pub fn on_change(&mut self, pane: Pane, text: &str) -> bool {
        if !self.live {
            return false;
        }

        let direction = Direction::for_source_pane(pane);
        let qualifies = match pane {
            Pane::Ja => is_japanese(text),
            Pane::En => !is_japanese(text),
        };
        if !qualifies {
            if self.timer_mut(direction).cancel() {
                tracing::debug!(
                    target: LOG_TARGET,
                    %direction,
                    "pending translation dropped by language gate"
                );
            }
            return false;
        }

        let trigger = Trigger { direction };
        let tx = self.tx.clone();
        self.timer_mut(direction).reset(async move {
            tracing::debug!(target: LOG_TARGET, %direction, "debounce window elapsed");
            // Receiver gone means the app is shutting down.
            let _ = tx.send(trigger);
        });
        true
    }

    fn timer(&self, direction: Direction) -> &DebounceTimer {
        match direction {
            Direction::JaToEn => &self.ja_to_en,
            Direction::EnToJa => &self.en_to_ja,
        }
    }

    fn timer_mut(&mut self, direction: Direction) -> &mut DebounceTimer {
        match direction {
            Direction::JaToEn => &mut self.ja_to_en,
            Direction::EnToJa => &mut self.en_to_ja,
        }
    }
}
