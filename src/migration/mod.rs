//! One-time upgrade of legacy plain-text section content to HTML.

mod text_to_html;

pub use text_to_html::{convert_plain_text_to_html, is_plain_text};

use crate::collection::{read_stored_collection, ResumeManager};
use crate::error::{ResumeError, Result};
use crate::models::{ResumeCollection, ResumeDocument};
use crate::storage::{KvStore, MIGRATION_HANDLED_KEY};
use leptos::logging::log;

/// ```text
/// NotChecked -> Skipped                      (no stored data, or already handled)
/// NotChecked -> NeedsMigration -> Migrated
///                              -> Declined
/// ```
/// Every state but `NotChecked` and `NeedsMigration` is terminal; only
/// clearing the persisted flag brings the prompt back.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MigrationState {
    NotChecked,
    Skipped,
    NeedsMigration,
    Migrated,
    Declined,
}

impl MigrationState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Skipped | Self::Migrated | Self::Declined)
    }
}

/// Whether any non-basic payload of the document is still plain text.
pub fn document_needs_migration(doc: &ResumeDocument) -> bool {
    doc.sections
        .iter()
        .filter(|s| !s.is_basic())
        .any(|s| s.content.rich_text().into_iter().any(is_plain_text))
}

pub fn collection_needs_migration(collection: &ResumeCollection) -> bool {
    collection.resumes.values().any(document_needs_migration)
}

/// Converts every plain-text payload of every non-basic section; empty and
/// HTML payloads are left alone.
/// Returns how many sections changed.
pub fn migrate_document(doc: &mut ResumeDocument) -> usize {
    let mut changed = 0;
    for section in doc.sections.iter_mut().filter(|s| !s.is_basic()) {
        let before = section.content.clone();
        section.content.map_rich_text(|text| {
            if is_plain_text(text) {
                convert_plain_text_to_html(text)
            } else {
                text.to_string()
            }
        });
        if section.content != before {
            changed += 1;
        }
    }
    changed
}

pub struct RichTextMigration<S> {
    store: S,
    state: MigrationState,
}

impl<S: KvStore> RichTextMigration<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            state: MigrationState::NotChecked,
        }
    }

    pub fn state(&self) -> MigrationState {
        self.state
    }

    pub fn needs_migration(&self) -> bool {
        self.state == MigrationState::NeedsMigration
    }

    fn handled(&self) -> bool {
        self.store.get_item(MIGRATION_HANDLED_KEY).as_deref() == Some("true")
    }

    fn mark_handled(&self) {
        if let Err(e) = self.store.set_item(MIGRATION_HANDLED_KEY, "true") {
            leptos::logging::error!("failed to persist migration flag: {}", e);
        }
    }

    /// Inspects the raw stored collection once; later calls return the cached state.
    pub fn check(&mut self) -> MigrationState {
        if self.state != MigrationState::NotChecked {
            return self.state;
        }

        self.state = if self.handled() {
            MigrationState::Skipped
        } else {
            match read_stored_collection(&self.store).usable() {
                Some(stored) if collection_needs_migration(&stored) => {
                    MigrationState::NeedsMigration
                }
                _ => MigrationState::Skipped,
            }
        };

        log!("rich text migration check: {:?}", self.state);
        self.state
    }

    /// Converts all documents held by `manager` and records the decision.
    pub fn migrate<T: KvStore>(&mut self, manager: &mut ResumeManager<T>) -> Result<usize> {
        if self.state != MigrationState::NeedsMigration {
            return Err(ResumeError::invariant("no rich text migration is pending"));
        }

        let changed = manager.update_all_documents(migrate_document);
        self.mark_handled();
        self.state = MigrationState::Migrated;
        log!("rich text migration converted {} sections", changed);
        Ok(changed)
    }

    /// Declining is final, the prompt is not shown again.
    pub fn cancel(&mut self) {
        if self.state.is_terminal() {
            return;
        }
        self.mark_handled();
        self.state = MigrationState::Declined;
        log!("rich text migration declined");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{template_resume, SectionContent, TextContent};
    use crate::storage::{MemoryStore, COLLECTION_KEY};
    use serde_json::{json, Value};
    use crate::util::testing::ticking_clock;

    fn legacy_store() -> MemoryStore {
        let store = MemoryStore::new();
        let mut manager = ResumeManager::load_with_clock(store.clone(), ticking_clock());
        let mut doc = manager.current().cloned().unwrap();
        for s in doc.sections.iter_mut() {
            if s.id == "advantages" {
                s.content = SectionContent::Text(TextContent {
                    content: "1. fast\n2. careful".to_string(),
                    ..Default::default()
                });
            }
        }
        manager.update_current(doc).unwrap();
        store
    }

    #[test]
    fn test_fresh_user_is_skipped() {
        let store = MemoryStore::new();
        let mut m = RichTextMigration::new(store);
        assert_eq!(m.check(), MigrationState::Skipped);
        assert!(!m.needs_migration());
    }

    #[test]
    fn test_html_only_collection_is_skipped() {
        let store = MemoryStore::new();
        let _ = ResumeManager::load_with_clock(store.clone(), ticking_clock());
        let mut m = RichTextMigration::new(store);
        assert_eq!(m.check(), MigrationState::Skipped);
    }

    #[test]
    fn test_plain_text_is_detected_and_migrated() {
        let store = legacy_store();
        let mut m = RichTextMigration::new(store.clone());
        assert_eq!(m.check(), MigrationState::NeedsMigration);

        let mut manager = ResumeManager::load_with_clock(store.clone(), ticking_clock());
        assert_eq!(m.migrate(&mut manager).unwrap(), 1);
        assert_eq!(m.state(), MigrationState::Migrated);

        let doc = manager.current().unwrap();
        let s = doc.section("advantages").unwrap();
        assert_eq!(s.content.rich_text(), vec!["<ul><li>fast</li><li>careful</li></ul>"]);
        assert!(!collection_needs_migration(manager.collection()));
        assert_eq!(store.get_item(MIGRATION_HANDLED_KEY).as_deref(), Some("true"));

        // Persisted, and never offered again.
        let mut again = RichTextMigration::new(store);
        assert_eq!(again.check(), MigrationState::Skipped);
    }

    #[test]
    fn test_decline_is_terminal() {
        let store = legacy_store();
        let mut m = RichTextMigration::new(store.clone());
        assert_eq!(m.check(), MigrationState::NeedsMigration);
        m.cancel();
        assert_eq!(m.state(), MigrationState::Declined);

        let mut manager = ResumeManager::load_with_clock(store.clone(), ticking_clock());
        assert!(m.migrate(&mut manager).is_err());
        assert!(collection_needs_migration(manager.collection()));

        let mut again = RichTextMigration::new(store.clone());
        assert_eq!(again.check(), MigrationState::Skipped);

        // Only clearing the flag re-enables the prompt.
        store.remove_item(MIGRATION_HANDLED_KEY);
        let mut cleared = RichTextMigration::new(store);
        assert_eq!(cleared.check(), MigrationState::NeedsMigration);
    }

    #[test]
    fn test_off_schema_sections_do_not_hide_plain_text() {
        let store = legacy_store();
        let mut raw: Value = serde_json::from_str(&store.get_item(COLLECTION_KEY).unwrap()).unwrap();
        raw["resumes"]["1"]["sections"][2]["data"] = json!({"unexpected": true});
        raw["resumes"]["1"]["sections"][3]["type"] = json!("chart");
        raw["resumes"]["1"]["sections"][3]["data"][0]["description"] = Value::Null;
        store.set_item(COLLECTION_KEY, &raw.to_string()).unwrap();

        let mut m = RichTextMigration::new(store.clone());
        assert_eq!(m.check(), MigrationState::NeedsMigration);

        let mut manager = ResumeManager::load_with_clock(store, ticking_clock());
        assert_eq!(m.migrate(&mut manager).unwrap(), 1);
        let doc = manager.current().unwrap();
        assert_eq!(doc.sections[2].content, SectionContent::Raw(json!({"unexpected": true})));
    }

    #[test]
    fn test_damaged_documents_do_not_hide_plain_text_in_the_rest() {
        let store = legacy_store();
        let mut raw: Value = serde_json::from_str(&store.get_item(COLLECTION_KEY).unwrap()).unwrap();
        raw["resumes"]["broken"] = json!("not a resume");
        store.set_item(COLLECTION_KEY, &raw.to_string()).unwrap();

        let mut m = RichTextMigration::new(store);
        assert_eq!(m.check(), MigrationState::NeedsMigration);
    }

    #[test]
    fn test_migrate_document_leaves_basic_and_html_untouched() {
        let mut doc = template_resume("1", "t");
        let before = doc.clone();
        assert_eq!(migrate_document(&mut doc), 0);
        assert_eq!(doc, before);
    }
}
