mod app;
mod components;
mod pages;
mod state;

pub mod collection;
pub mod config;
pub mod error;
pub mod migration;
pub mod models;
pub mod platforms;
pub mod prompts;
pub mod search;
pub mod storage;
pub mod util;

pub use app::App;
pub use collection::{MetadataOverride, ResumeManager, SectionProps};
pub use config::EnvConfig;
pub use error::{ResumeError, StorageError};
pub use migration::{MigrationState, RichTextMigration};
pub use platforms::AiPlatformRegistry;
pub use prompts::{PromptDraft, PromptLibrary};
pub use storage::{BrowserStorage, KvStore, MemoryStore};

use leptos::prelude::*;

// Needed for `#[wasm_bindgen(start)]` on the wasm entrypoint.
#[cfg(all(target_arch = "wasm32", not(test)))]
use wasm_bindgen::prelude::wasm_bindgen;

// Only register the WASM start function for normal builds (not for tests),
// otherwise wasm-bindgen-test will end up with multiple entry symbols.
#[cfg_attr(all(target_arch = "wasm32", not(test)), wasm_bindgen(start))]
pub fn main() {
    console_error_panic_hook::set_once();
    mount_to_body(App);
}

// WASM-only tests (run with `cargo test --target wasm32-unknown-unknown` + wasm-bindgen-test-runner)
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_collection_survives_reload_from_local_storage() {
        let store = BrowserStorage::new("wasm-test-collection:");
        store.remove_item("resume-collection");

        let mut manager = ResumeManager::load(store.clone());
        let id = manager.create("Browser", None);

        let reloaded = ResumeManager::load(store.clone());
        assert_eq!(reloaded.current_id(), id);
        assert_eq!(reloaded.len(), 2);
        store.remove_item("resume-collection");
    }

    #[wasm_bindgen_test]
    fn test_env_config_defaults_without_window_env() {
        let config = EnvConfig::from_window();
        assert_eq!(config.message_timeout_ms, 3000);
    }
}
