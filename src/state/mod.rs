use crate::collection::ResumeManager;
use crate::config::EnvConfig;
use crate::error::ResumeError;
use crate::migration::RichTextMigration;
use crate::platforms::AiPlatformRegistry;
use crate::prompts::PromptLibrary;
use crate::storage::BrowserStorage;
use leptos::logging::warn;
use leptos::prelude::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum MessageKind {
    Success,
    Warning,
    Error,
}

/// Transient notice shown at the top of the page until it times out.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct FloatingMessage {
    /// Distinguishes repeated identical messages so each one gets its own timer.
    pub seq: u64,
    pub kind: MessageKind,
    pub text: String,
}

#[derive(Clone, Copy)]
pub(crate) struct AppState {
    pub config: StoredValue<EnvConfig>,

    pub resumes: RwSignal<ResumeManager<BrowserStorage>>,
    pub prompts: RwSignal<PromptLibrary<BrowserStorage>>,
    pub platforms: RwSignal<AiPlatformRegistry<BrowserStorage>>,
    pub migration: RwSignal<RichTextMigration<BrowserStorage>>,

    pub message: RwSignal<Option<FloatingMessage>>,
    message_seq: StoredValue<u64>,
}

impl AppState {
    pub fn new() -> Self {
        let config = EnvConfig::from_window();
        let store = || BrowserStorage::new(config.storage_prefix.clone());

        // Reads the stored collection before anything rewrites it.
        let mut migration = RichTextMigration::new(store());
        migration.check();

        Self {
            resumes: RwSignal::new(ResumeManager::load(store())),
            prompts: RwSignal::new(PromptLibrary::load(store())),
            platforms: RwSignal::new(AiPlatformRegistry::load(store())),
            migration: RwSignal::new(migration),
            message: RwSignal::new(None),
            message_seq: StoredValue::new(0),
            config: StoredValue::new(config),
        }
    }

    pub fn notify(&self, kind: MessageKind, text: impl Into<String>) {
        let seq = self.message_seq.get_value().wrapping_add(1);
        self.message_seq.set_value(seq);
        self.message.set(Some(FloatingMessage {
            seq,
            kind,
            text: text.into(),
        }));
    }

    pub fn success(&self, text: impl Into<String>) {
        self.notify(MessageKind::Success, text);
    }

    /// Rule violations are shown as warnings, everything else as errors.
    pub fn report(&self, err: &ResumeError) {
        let kind = if err.is_warning() {
            MessageKind::Warning
        } else {
            MessageKind::Error
        };
        self.notify(kind, err.to_string());
    }

    /// Runs a fallible operation against one of the stores, reporting a
    /// rejection to the user. `None` means it failed and nothing changed.
    pub fn apply<M, T>(&self, signal: RwSignal<M>, op: impl FnOnce(&mut M) -> Result<T, ResumeError>) -> Option<T>
    where
        M: Send + Sync + 'static,
    {
        match signal.try_update(op)? {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("operation rejected: {}", e);
                self.report(&e);
                None
            }
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy)]
pub(crate) struct AppContext(pub AppState);
