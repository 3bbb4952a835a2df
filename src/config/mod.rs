use serde::{Deserialize, Serialize};

const DEFAULT_MESSAGE_TIMEOUT_MS: u32 = 3000;

/// Runtime settings injected by the hosting page as `window.ENV`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct EnvConfig {
    /// Prepended to every local storage key. Empty by default.
    pub storage_prefix: String,
    /// How long a floating message stays on screen.
    pub message_timeout_ms: u32,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            storage_prefix: String::new(),
            message_timeout_ms: DEFAULT_MESSAGE_TIMEOUT_MS,
        }
    }
}

impl EnvConfig {
    /// Reads `window.ENV`, accepting both `STORAGE_PREFIX` and `storage_prefix`
    /// spellings. Anything missing keeps its default.
    pub fn from_window() -> Self {
        let env = web_sys::window()
            .and_then(|w| w.get("ENV"))
            .filter(|env| !env.is_undefined() && env.is_object());

        match env {
            Some(env) => Self::from_lookup(|key| {
                js_sys::Reflect::get(&env, &key.into())
                    .ok()
                    .filter(|v| !v.is_undefined() && !v.is_null())
                    .and_then(|v| v.as_string().or_else(|| v.as_f64().map(|n| n.to_string())))
            }),
            None => Self::default(),
        }
    }

    /// Builds a config from a key lookup, trying the upper-case key first.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |upper: &str, lower: &str| lookup(upper).or_else(|| lookup(lower));
        let defaults = Self::default();

        let storage_prefix = get("STORAGE_PREFIX", "storage_prefix").unwrap_or(defaults.storage_prefix);
        let message_timeout_ms = get("MESSAGE_TIMEOUT_MS", "message_timeout_ms")
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|n| n.is_finite() && *n > 0.0)
            .map(|n| n as u32)
            .unwrap_or(defaults.message_timeout_ms);

        Self {
            storage_prefix,
            message_timeout_ms,
        }
    }
}
