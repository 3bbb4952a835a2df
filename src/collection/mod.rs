//! The resume collection: every document, its index record, and which one is open.

mod sections;
pub(crate) mod transfer;

pub use sections::{SectionPreset, SectionProps};
pub use transfer::{export_file_name, parse_import_payload, EXPORT_ALL_FILE_NAME};

use crate::error::{ResumeError, Result, StorageError};
use crate::models::{
    default_collection, template_resume, ResumeCollection, ResumeDocument, ResumeMetadata,
};
use crate::search::SearchIndex;
use crate::storage::{KvStore, COLLECTION_BACKUP_KEY, COLLECTION_KEY};
use crate::util::{
    iso_timestamp, mint_time_id, next_free_suffixed, non_blank, parse_timestamp, system_clock,
    Clock,
};
use indexmap::IndexMap;
use leptos::logging::{error, log, warn};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashSet;

const IMPORTED_DESCRIPTION: &str = "导入的简历";
const COPY_SUFFIX: &str = " - 副本";

/// Partial metadata applied on top of the defaults when importing.
#[derive(Clone, Debug, Default)]
pub struct MetadataOverride {
    pub title: Option<String>,
    pub description: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// Owns the in-memory collection and writes it back whole after every change.
///
/// A method that returns an error has left the collection untouched.
pub struct ResumeManager<S> {
    store: S,
    clock: Clock,
    collection: ResumeCollection,
}

impl<S: KvStore> ResumeManager<S> {
    pub fn load(store: S) -> Self {
        Self::load_with_clock(store, system_clock())
    }

    pub fn load_with_clock(store: S, clock: Clock) -> Self {
        let now = iso_timestamp(clock());
        let collection = match read_stored_collection(&store) {
            StoredCollection::Intact(stored) if !stored.is_empty() => {
                log!("loaded {} resumes", stored.len());
                reconcile(stored, &now)
            }
            StoredCollection::Damaged { raw, salvaged } => {
                let backed_up = match store.set_item(COLLECTION_BACKUP_KEY, &raw) {
                    Ok(()) => {
                        error!("stored resumes are damaged, a copy was kept under `{}`", COLLECTION_BACKUP_KEY);
                        true
                    }
                    Err(e) => {
                        error!("stored resumes are damaged and could not be backed up: {}", e);
                        false
                    }
                };
                let collection = match salvaged {
                    Some(c) => {
                        warn!("recovered {} resumes from damaged storage", c.len());
                        reconcile(c, &now)
                    }
                    None => default_collection(&now),
                };
                // Without a backup the damaged value is the only copy left.
                if backed_up {
                    store.persist_json(COLLECTION_KEY, &collection);
                }
                collection
            }
            _ => {
                log!("no stored resumes, starting from the template");
                let seed = default_collection(&now);
                store.persist_json(COLLECTION_KEY, &seed);
                seed
            }
        };

        Self {
            store,
            clock,
            collection,
        }
    }

    fn now(&self) -> String {
        iso_timestamp((self.clock)())
    }

    fn fresh_id(&self) -> String {
        mint_time_id((self.clock)(), |id| self.collection.contains(id))
    }

    fn persist(&self) {
        self.store.persist_json(COLLECTION_KEY, &self.collection);
    }

    pub fn collection(&self) -> &ResumeCollection {
        &self.collection
    }

    pub fn current_id(&self) -> &str {
        &self.collection.current_resume_id
    }

    /// The open document; a stale pointer falls back to the first one.
    pub fn current(&self) -> Option<&ResumeDocument> {
        self.collection
            .resumes
            .get(&self.collection.current_resume_id)
            .or_else(|| self.collection.resumes.values().next())
    }

    pub fn get(&self, id: &str) -> Option<&ResumeDocument> {
        self.collection.resumes.get(id)
    }

    pub fn metadata(&self, id: &str) -> Option<&ResumeMetadata> {
        self.collection.metadata.get(id)
    }

    pub fn len(&self) -> usize {
        self.collection.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collection.is_empty()
    }

    /// All index records, most recently updated first.
    pub fn list(&self) -> Vec<ResumeMetadata> {
        let mut out: Vec<ResumeMetadata> = self.collection.metadata.values().cloned().collect();
        out.sort_by(|a, b| compare_timestamps(&b.updated_at, &a.updated_at));
        out
    }

    /// `list()` narrowed to records matching `query`, best match first.
    pub fn search(&self, query: &str) -> Vec<ResumeMetadata> {
        let list = self.list();
        let mut index = SearchIndex::new();
        for m in &list {
            index.add(
                m.id.clone(),
                &[(3.0, m.title.as_str()), (1.0, m.description.as_deref().unwrap_or(""))],
            );
        }
        index
            .ranked_ids(query)
            .into_iter()
            .filter_map(|id| list.iter().find(|m| m.id == id).cloned())
            .collect()
    }

    /// Creates a document from the template and opens it.
    pub fn create(&mut self, title: &str, description: Option<&str>) -> String {
        let id = self.fresh_id();
        let now = self.now();
        let title = title.trim().to_string();

        self.collection
            .resumes
            .insert(id.clone(), template_resume(&id, &title));
        self.collection.metadata.insert(
            id.clone(),
            ResumeMetadata {
                id: id.clone(),
                title,
                description: description.and_then(non_blank),
                created_at: now.clone(),
                updated_at: now,
            },
        );
        self.collection.current_resume_id = id.clone();
        self.persist();
        log!("created resume {}", id);
        id
    }

    /// Opens `id`; unknown ids are ignored. Returns whether the pointer moved.
    pub fn switch_current(&mut self, id: &str) -> bool {
        if !self.collection.contains(id) {
            warn!("cannot switch to unknown resume {}", id);
            return false;
        }
        if self.collection.current_resume_id == id {
            return true;
        }
        self.collection.current_resume_id = id.to_string();
        self.persist();
        true
    }

    pub fn rename(&mut self, id: &str, title: &str, description: Option<&str>) -> Result<()> {
        let title = non_blank(title).ok_or_else(|| ResumeError::validation("请输入简历标题"))?;
        if !self.collection.contains(id) {
            return Err(ResumeError::not_found(format!("resume {}", id)));
        }

        let now = self.now();
        if let Some(doc) = self.collection.resumes.get_mut(id) {
            doc.title = title.clone();
        }
        if let Some(meta) = self.collection.metadata.get_mut(id) {
            meta.title = title;
            meta.description = description.and_then(non_blank);
            meta.updated_at = now;
        }
        self.persist();
        Ok(())
    }

    /// Deep copy of `id` under a fresh id, opened afterwards.
    pub fn duplicate(&mut self, id: &str, new_title: Option<&str>) -> Result<String> {
        let source = self
            .collection
            .resumes
            .get(id)
            .ok_or_else(|| ResumeError::not_found(format!("resume {}", id)))?;

        let new_id = self.fresh_id();
        let now = self.now();
        let title = new_title
            .and_then(non_blank)
            .unwrap_or_else(|| format!("{}{}", source.title, COPY_SUFFIX));
        let description = self
            .collection
            .metadata
            .get(id)
            .and_then(|m| m.description.as_deref())
            .unwrap_or("");

        let mut copy = source.clone();
        copy.id = new_id.clone();
        copy.title = title.clone();
        let meta = ResumeMetadata {
            id: new_id.clone(),
            title,
            description: Some(format!("{} (副本)", description).trim_start().to_string()),
            created_at: now.clone(),
            updated_at: now,
        };

        self.collection.resumes.insert(new_id.clone(), copy);
        self.collection.metadata.insert(new_id.clone(), meta);
        self.collection.current_resume_id = new_id.clone();
        self.persist();
        log!("duplicated resume {} as {}", id, new_id);
        Ok(new_id)
    }

    pub fn delete(&mut self, id: &str) -> Result<()> {
        if !self.collection.contains(id) {
            return Err(ResumeError::not_found(format!("resume {}", id)));
        }
        if self.collection.len() <= 1 {
            return Err(ResumeError::invariant("不能删除唯一的简历"));
        }

        self.collection.resumes.shift_remove(id);
        self.collection.metadata.shift_remove(id);
        self.repoint_current();
        self.persist();
        log!("deleted resume {}", id);
        Ok(())
    }

    /// Removes every known id in `ids` at once. Returns how many were removed.
    ///
    /// Duplicates are ignored and unknown ids skipped; the request is refused
    /// when it would leave the collection empty.
    pub fn batch_delete(&mut self, ids: &[String]) -> Result<usize> {
        let mut seen = HashSet::new();
        let targets: Vec<&String> = ids
            .iter()
            .filter(|id| seen.insert(id.as_str()))
            .filter(|id| self.collection.contains(id))
            .collect();

        if targets.is_empty() {
            return Err(ResumeError::validation("请选择要删除的简历"));
        }
        if targets.len() >= self.collection.len() {
            return Err(ResumeError::invariant("不能删除所有简历，至少要保留一份"));
        }

        for id in &targets {
            self.collection.resumes.shift_remove(id.as_str());
            self.collection.metadata.shift_remove(id.as_str());
        }
        self.repoint_current();
        self.persist();
        log!("deleted {} resumes", targets.len());
        Ok(targets.len())
    }

    fn repoint_current(&mut self) {
        if !self.collection.contains(&self.collection.current_resume_id) {
            if let Some(first) = self.collection.resumes.keys().next() {
                self.collection.current_resume_id = first.clone();
            }
        }
    }

    /// Adds `doc` as a new document and opens it. An existing id is never overwritten.
    pub fn import_one(
        &mut self,
        doc: ResumeDocument,
        metadata: Option<MetadataOverride>,
    ) -> Result<String> {
        let mut doc = transfer::validate_document(doc)?;
        let new_id = if self.collection.contains(&doc.id) {
            self.fresh_id()
        } else {
            doc.id.clone()
        };

        let now = self.now();
        let ov = metadata.unwrap_or_default();
        let meta = ResumeMetadata {
            id: new_id.clone(),
            title: ov.title.unwrap_or_else(|| doc.title.clone()),
            description: Some(ov.description.unwrap_or_else(|| IMPORTED_DESCRIPTION.to_string())),
            created_at: ov.created_at.unwrap_or_else(|| now.clone()),
            updated_at: ov.updated_at.unwrap_or(now),
        };
        doc.id = new_id.clone();

        self.collection.resumes.insert(new_id.clone(), doc);
        self.collection.metadata.insert(new_id.clone(), meta);
        self.collection.current_resume_id = new_id.clone();
        self.persist();
        log!("imported resume {}", new_id);
        Ok(new_id)
    }

    /// Imports `docs` in order; colliding ids get `_1`, `_2`, ... suffixes.
    ///
    /// Invalid entries are skipped. The first imported document is opened.
    pub fn import_batch(&mut self, docs: Vec<ResumeDocument>) -> Vec<String> {
        let now = self.now();
        let mut imported = Vec::new();

        for doc in docs {
            let mut doc = match transfer::validate_document(doc) {
                Ok(doc) => doc,
                Err(e) => {
                    warn!("skipping invalid resume in batch import: {}", e);
                    continue;
                }
            };

            let new_id = next_free_suffixed(&doc.id, |id| self.collection.contains(id));
            doc.id = new_id.clone();
            let meta = ResumeMetadata {
                id: new_id.clone(),
                title: doc.title.clone(),
                description: Some(IMPORTED_DESCRIPTION.to_string()),
                created_at: now.clone(),
                updated_at: now.clone(),
            };
            self.collection.resumes.insert(new_id.clone(), doc);
            self.collection.metadata.insert(new_id.clone(), meta);
            imported.push(new_id);
        }

        if let Some(first) = imported.first() {
            self.collection.current_resume_id = first.clone();
            self.persist();
            log!("imported {} resumes", imported.len());
        }
        imported
    }

    pub fn export_one(&self, id: &str) -> Result<String> {
        let doc = self
            .collection
            .resumes
            .get(id)
            .ok_or_else(|| ResumeError::not_found(format!("resume {}", id)))?;
        Ok(serde_json::to_string_pretty(doc).map_err(StorageError::from)?)
    }

    pub fn export_all(&self) -> Result<String> {
        let docs: Vec<&ResumeDocument> = self.collection.resumes.values().collect();
        Ok(serde_json::to_string_pretty(&docs).map_err(StorageError::from)?)
    }

    /// Applies `f` to every document, bumping `updatedAt` of those it changed.
    /// Returns the sum of `f`'s results.
    pub fn update_all_documents(&mut self, f: impl Fn(&mut ResumeDocument) -> usize) -> usize {
        let now = self.now();
        let mut total = 0;
        for (id, doc) in self.collection.resumes.iter_mut() {
            let n = f(doc);
            if n > 0 {
                if let Some(meta) = self.collection.metadata.get_mut(id) {
                    meta.updated_at = now.clone();
                }
            }
            total += n;
        }
        if total > 0 {
            self.persist();
        }
        total
    }
}

/// What is under the collection key, read without side effects.
pub(crate) enum StoredCollection {
    Missing,
    Intact(ResumeCollection),
    /// Did not parse as a whole. `salvaged` holds the documents that still do.
    Damaged {
        raw: String,
        salvaged: Option<ResumeCollection>,
    },
}

impl StoredCollection {
    /// The documents that can be used, whole or recovered.
    pub(crate) fn usable(self) -> Option<ResumeCollection> {
        match self {
            Self::Intact(c) => Some(c),
            Self::Damaged { salvaged, .. } => salvaged,
            Self::Missing => None,
        }
    }
}

pub(crate) fn read_stored_collection<S: KvStore>(store: &S) -> StoredCollection {
    let Some(raw) = store.get_item(COLLECTION_KEY) else {
        return StoredCollection::Missing;
    };
    match serde_json::from_str::<ResumeCollection>(&raw) {
        Ok(c) => StoredCollection::Intact(c),
        Err(e) => {
            error!("stored `{}` is not valid: {}", COLLECTION_KEY, e);
            let salvaged = serde_json::from_str::<Value>(&raw)
                .ok()
                .and_then(|v| salvage(&v));
            StoredCollection::Damaged { raw, salvaged }
        }
    }
}

/// Picks out every document and index record that parses on its own.
fn salvage(value: &Value) -> Option<ResumeCollection> {
    let mut resumes = IndexMap::new();
    for (id, v) in value.get("resumes")?.as_object()? {
        match serde_json::from_value::<ResumeDocument>(v.clone()) {
            Ok(doc) => {
                resumes.insert(id.clone(), doc);
            }
            Err(e) => warn!("resume {} could not be recovered: {}", id, e),
        }
    }
    if resumes.is_empty() {
        return None;
    }

    let metadata = value
        .get("metadata")
        .and_then(Value::as_object)
        .map(|m| {
            m.iter()
                .filter_map(|(id, v)| {
                    serde_json::from_value::<ResumeMetadata>(v.clone())
                        .ok()
                        .map(|meta| (id.clone(), meta))
                })
                .collect()
        })
        .unwrap_or_default();
    let current_resume_id = value
        .get("currentResumeId")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    Some(ResumeCollection {
        current_resume_id,
        resumes,
        metadata,
    })
}

/// Newest-first ordering helper: compares parsed instants, falling back to
/// the raw strings when either side is not a valid timestamp.
fn compare_timestamps(a: &str, b: &str) -> Ordering {
    match (parse_timestamp(a), parse_timestamp(b)) {
        (Some(a), Some(b)) => a.cmp(&b),
        _ => a.cmp(b),
    }
}

/// Restores the collection invariants on a stored value written by an older
/// or interrupted version: matching key sets and a valid current pointer.
fn reconcile(mut c: ResumeCollection, now: &str) -> ResumeCollection {
    let ResumeCollection {
        resumes, metadata, ..
    } = &mut c;

    for (id, doc) in resumes.iter_mut() {
        if doc.id != *id {
            warn!("resume stored under {} claims id {:?}", id, doc.id);
            doc.id = id.clone();
        }
        transfer::ensure_unique_section_ids(doc);
    }

    metadata.retain(|id, _| {
        let keep = resumes.contains_key(id);
        if !keep {
            warn!("dropping metadata without a resume: {}", id);
        }
        keep
    });
    for (id, meta) in metadata.iter_mut() {
        if meta.id != *id {
            meta.id = id.clone();
        }
    }
    for (id, doc) in resumes.iter() {
        if !metadata.contains_key(id) {
            warn!("rebuilding missing metadata for {}", id);
            metadata.insert(
                id.clone(),
                ResumeMetadata {
                    id: id.clone(),
                    title: doc.title.clone(),
                    description: None,
                    created_at: now.to_string(),
                    updated_at: now.to_string(),
                },
            );
        }
    }

    if !c.resumes.contains_key(&c.current_resume_id) {
        if let Some(first) = c.resumes.keys().next() {
            warn!("current resume {} is gone, opening {}", c.current_resume_id, first);
            c.current_resume_id = first.clone();
        }
    }
    c
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{template_resume, SectionContent};
    use crate::storage::MemoryStore;
    use serde_json::json;
    use crate::util::testing::{frozen_clock, ticking_clock};

    fn manager() -> (MemoryStore, ResumeManager<MemoryStore>) {
        let store = MemoryStore::new();
        let m = ResumeManager::load_with_clock(store.clone(), ticking_clock());
        (store, m)
    }

    fn assert_consistent(m: &ResumeManager<MemoryStore>) {
        let c = m.collection();
        assert!(c.is_consistent(), "resumes and metadata keys diverged");
        assert!(c.contains(&c.current_resume_id), "current id dangles");
        for (id, doc) in &c.resumes {
            assert_eq!(&doc.id, id);
            assert_eq!(c.metadata[id].id, *id);
        }
    }

    fn stored(store: &MemoryStore) -> ResumeCollection {
        store.load_json(COLLECTION_KEY).expect("collection should be persisted")
    }

    #[test]
    fn test_first_load_seeds_and_persists_template() {
        let (store, m) = manager();
        assert_eq!(m.len(), 1);
        assert_eq!(m.current_id(), "1");
        assert_eq!(m.current().unwrap().title, "我的简历");
        assert_eq!(&stored(&store), m.collection());
        assert_consistent(&m);
    }

    #[test]
    fn test_reload_reads_persisted_state() {
        let (store, mut m) = manager();
        let id = m.create("B", None);
        let reloaded = ResumeManager::load_with_clock(store, ticking_clock());
        assert_eq!(reloaded.current_id(), id);
        assert_eq!(reloaded.len(), 2);
    }

    #[test]
    fn test_create_then_delete_scenario() {
        let (store, mut m) = manager();
        let a = m.current_id().to_string();

        let b = m.create("B", Some("  "));
        assert_eq!(m.len(), 2);
        assert_eq!(m.current_id(), b);
        assert_eq!(m.get(&b).unwrap().title, "B");
        assert_eq!(m.metadata(&b).unwrap().description, None);
        assert_consistent(&m);

        m.delete(&a).unwrap();
        assert_eq!(m.len(), 1);
        assert!(m.get(&b).is_some());

        let before = m.collection().clone();
        let err = m.delete(&b).unwrap_err();
        assert!(matches!(err, ResumeError::InvariantViolation(_)));
        assert_eq!(m.collection(), &before);
        assert_eq!(stored(&store), before);
    }

    #[test]
    fn test_create_mints_distinct_ids_under_frozen_clock() {
        let store = MemoryStore::new();
        let mut m = ResumeManager::load_with_clock(store, frozen_clock());
        let a = m.create("A", None);
        let b = m.create("B", None);
        assert_ne!(a, b);
        assert_eq!(m.len(), 3);
        assert_consistent(&m);
    }

    #[test]
    fn test_delete_current_repoints_to_first_remaining() {
        let (_, mut m) = manager();
        let b = m.create("B", None);
        m.delete(&b).unwrap();
        assert_eq!(m.current_id(), "1");
    }

    #[test]
    fn test_delete_unknown_fails() {
        let (_, mut m) = manager();
        m.create("B", None);
        assert!(matches!(m.delete("nope"), Err(ResumeError::NotFound(_))));
        assert_eq!(m.len(), 2);
    }

    #[test]
    fn test_switch_current_ignores_unknown() {
        let (_, mut m) = manager();
        let b = m.create("B", None);
        assert!(!m.switch_current("missing"));
        assert_eq!(m.current_id(), b);
        assert!(m.switch_current("1"));
        assert_eq!(m.current_id(), "1");
    }

    #[test]
    fn test_rename() {
        let (_, mut m) = manager();
        m.rename("1", "  New title ", Some("desc")).unwrap();
        assert_eq!(m.get("1").unwrap().title, "New title");
        let meta = m.metadata("1").unwrap();
        assert_eq!(meta.title, "New title");
        assert_eq!(meta.description.as_deref(), Some("desc"));
        assert_ne!(meta.updated_at, meta.created_at);

        assert!(matches!(m.rename("1", "   ", None), Err(ResumeError::Validation(_))));
        assert!(matches!(m.rename("x", "t", None), Err(ResumeError::NotFound(_))));
        assert_eq!(m.get("1").unwrap().title, "New title");
    }

    #[test]
    fn test_duplicate_deep_copies_and_opens() {
        let (_, mut m) = manager();
        let copy = m.duplicate("1", None).unwrap();
        assert_eq!(m.current_id(), copy);
        let original = m.get("1").unwrap().clone();
        let dup = m.get(&copy).unwrap();
        assert_eq!(dup.title, "我的简历 - 副本");
        assert_eq!(dup.sections, original.sections);
        assert_eq!(m.metadata(&copy).unwrap().description.as_deref(), Some("默认简历 (副本)"));

        let named = m.duplicate("1", Some("Named")).unwrap();
        assert_eq!(m.get(&named).unwrap().title, "Named");
        assert!(m.duplicate("missing", None).is_err());
        assert_consistent(&m);
    }

    #[test]
    fn test_batch_delete_rejects_emptying_collection() {
        let (_, mut m) = manager();
        let b = m.create("B", None);
        let before = m.collection().clone();
        let err = m.batch_delete(&["1".to_string(), b.clone()]).unwrap_err();
        assert!(matches!(err, ResumeError::InvariantViolation(_)));
        assert_eq!(m.collection(), &before);
    }

    #[test]
    fn test_batch_delete_three_documents() {
        let (_, mut m) = manager();
        let b = m.create("B", None);
        let c = m.create("C", None);
        m.switch_current("1");

        assert_eq!(m.batch_delete(&["1".to_string(), b]).unwrap(), 2);
        assert_eq!(m.len(), 1);
        assert_eq!(m.current_id(), c);
        assert_consistent(&m);
    }

    #[test]
    fn test_batch_delete_deduplicates_and_skips_unknown() {
        let (_, mut m) = manager();
        let b = m.create("B", None);
        let c = m.create("C", None);
        let ids = vec![b.clone(), b.clone(), "ghost".to_string()];
        assert_eq!(m.batch_delete(&ids).unwrap(), 1);
        assert_eq!(m.len(), 2);
        assert!(m.get(&c).is_some());

        assert!(matches!(m.batch_delete(&[]), Err(ResumeError::Validation(_))));
        assert!(matches!(
            m.batch_delete(&["ghost".to_string()]),
            Err(ResumeError::Validation(_))
        ));
    }

    #[test]
    fn test_import_one_never_overwrites() {
        let (_, mut m) = manager();
        let original = m.get("1").unwrap().clone();
        let mut incoming = template_resume("1", "Imported");
        incoming.sections.truncate(2);

        let id = m.import_one(incoming, None).unwrap();
        assert_ne!(id, "1");
        assert_eq!(m.current_id(), id);
        assert_eq!(m.get("1").unwrap(), &original);
        assert_eq!(m.get(&id).unwrap().id, id);
        assert_eq!(m.metadata(&id).unwrap().description.as_deref(), Some("导入的简历"));
        assert_consistent(&m);
    }

    #[test]
    fn test_import_one_keeps_free_id_and_applies_override() {
        let (_, mut m) = manager();
        let ov = MetadataOverride {
            description: Some("from backup".to_string()),
            created_at: Some("2020-01-01T00:00:00.000Z".to_string()),
            ..Default::default()
        };
        let id = m.import_one(template_resume("abc", "X"), Some(ov)).unwrap();
        assert_eq!(id, "abc");
        let meta = m.metadata("abc").unwrap();
        assert_eq!(meta.description.as_deref(), Some("from backup"));
        assert_eq!(meta.created_at, "2020-01-01T00:00:00.000Z");
        assert_eq!(meta.title, "X");
    }

    #[test]
    fn test_import_one_validates() {
        let (_, mut m) = manager();
        let before = m.collection().clone();
        let err = m.import_one(template_resume(" ", "X"), None).unwrap_err();
        assert!(matches!(err, ResumeError::Validation(_)));
        assert!(m.import_one(template_resume("z", ""), None).is_err());
        assert_eq!(m.collection(), &before);
    }

    #[test]
    fn test_import_batch_suffixes_collisions_in_order() {
        let (_, mut m) = manager();
        let docs = vec![
            template_resume("1", "a"),
            template_resume("1", "b"),
            template_resume("", "invalid"),
            template_resume("x", "c"),
        ];
        let ids = m.import_batch(docs);
        assert_eq!(ids, vec!["1_1", "1_2", "x"]);
        assert_eq!(m.current_id(), "1_1");
        assert_eq!(m.get("1_2").unwrap().title, "b");
        assert_eq!(m.len(), 4);
        assert_consistent(&m);
    }

    #[test]
    fn test_import_batch_of_nothing_keeps_current() {
        let (_, mut m) = manager();
        assert!(m.import_batch(vec![]).is_empty());
        assert_eq!(m.current_id(), "1");
    }

    #[test]
    fn test_export_then_import_roundtrip() {
        let (_, mut m) = manager();
        let json = m.export_one("1").unwrap();
        let parsed = parse_import_payload(&json).unwrap();
        assert_eq!(parsed.len(), 1);
        let id = m.import_one(parsed.into_iter().next().unwrap(), None).unwrap();
        assert_ne!(id, "1");
        assert_eq!(m.get(&id).unwrap().sections, m.get("1").unwrap().sections);
    }

    #[test]
    fn test_export_all_is_an_array_of_documents() {
        let (_, mut m) = manager();
        m.create("B", None);
        let v: serde_json::Value = serde_json::from_str(&m.export_all().unwrap()).unwrap();
        assert_eq!(v.as_array().map(|a| a.len()), Some(2));
        assert!(m.export_one("missing").is_err());
    }

    #[test]
    fn test_list_sorted_by_updated_desc() {
        let (_, mut m) = manager();
        let b = m.create("B", None);
        let c = m.create("C", None);
        m.rename(&b, "B2", None).unwrap();
        let ids: Vec<String> = m.list().into_iter().map(|x| x.id).collect();
        assert_eq!(ids, vec![b, c, "1".to_string()]);
    }

    #[test]
    fn test_search_filters_list() {
        let (_, mut m) = manager();
        let b = m.create("Backend engineer", Some("rust"));
        m.create("Designer", None);
        let hits: Vec<String> = m.search("backend").into_iter().map(|x| x.id).collect();
        assert_eq!(hits, vec![b]);
        assert_eq!(m.search("").len(), 3);
    }

    #[test]
    fn test_stale_pointer_and_orphans_are_reconciled_on_load() {
        let store = MemoryStore::new();
        let mut c = default_collection("2024-01-01T00:00:00.000Z");
        c.current_resume_id = "gone".to_string();
        c.metadata.insert(
            "orphan".to_string(),
            ResumeMetadata {
                id: "orphan".to_string(),
                title: "o".to_string(),
                description: None,
                created_at: String::new(),
                updated_at: String::new(),
            },
        );
        c.resumes.insert("2".to_string(), template_resume("2", "two"));
        store.save_json(COLLECTION_KEY, &c).unwrap();

        let m = ResumeManager::load_with_clock(store, ticking_clock());
        assert_eq!(m.current_id(), "1");
        assert!(m.metadata("orphan").is_none());
        assert_eq!(m.metadata("2").unwrap().title, "two");
        assert_consistent(&m);
    }

    #[test]
    fn test_off_schema_section_does_not_cost_the_collection() {
        let (store, mut m) = manager();
        let id = m.create("Work CV", None);

        let mut raw: Value = serde_json::from_str(&store.get_item(COLLECTION_KEY).unwrap()).unwrap();
        raw["resumes"][&id]["sections"][2]["data"][0]["description"] = Value::Null;
        raw["resumes"][&id]["sections"][3]["data"] = json!({"unexpected": true});
        raw["resumes"][&id]["sections"][1]["type"] = json!("chart");
        store.set_item(COLLECTION_KEY, &raw.to_string()).unwrap();

        let reloaded = ResumeManager::load_with_clock(store.clone(), ticking_clock());
        assert_eq!(reloaded.len(), 2);
        let doc = reloaded.get(&id).unwrap();
        assert_eq!(doc.title, "Work CV");
        assert_eq!(doc.sections[2].content.rich_text()[0], "");
        assert!(matches!(doc.sections[3].content, SectionContent::Raw(_)));
        assert_eq!(doc.sections[1].kind.as_str(), "chart");
        assert!(store.get_item(COLLECTION_BACKUP_KEY).is_none());

        // Written back as it was read.
        let again: Value = serde_json::from_str(&serde_json::to_string(reloaded.collection()).unwrap()).unwrap();
        assert_eq!(again["resumes"][&id]["sections"][3]["data"], json!({"unexpected": true}));
        assert_eq!(again["resumes"][&id]["sections"][1]["type"], json!("chart"));
    }

    #[test]
    fn test_damaged_store_is_backed_up_and_salvaged() {
        let (store, mut m) = manager();
        let id = m.create("Keep me", None);

        let mut raw: Value = serde_json::from_str(&store.get_item(COLLECTION_KEY).unwrap()).unwrap();
        raw["resumes"]["1"] = json!(42);
        let damaged = raw.to_string();
        store.set_item(COLLECTION_KEY, &damaged).unwrap();

        let reloaded = ResumeManager::load_with_clock(store.clone(), ticking_clock());
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded.current_id(), id);
        assert_eq!(reloaded.metadata(&id).unwrap().title, "Keep me");
        assert_consistent(&reloaded);
        assert_eq!(store.get_item(COLLECTION_BACKUP_KEY).as_deref(), Some(damaged.as_str()));
    }

    #[test]
    fn test_unreadable_store_is_backed_up_before_seeding() {
        let store = MemoryStore::new();
        store.set_item(COLLECTION_KEY, "[]").unwrap();
        let m = ResumeManager::load_with_clock(store.clone(), ticking_clock());
        assert_eq!(m.len(), 1);
        assert_eq!(store.get_item(COLLECTION_BACKUP_KEY).as_deref(), Some("[]"));
        assert_eq!(stored(&store), *m.collection());
    }

    #[test]
    fn test_reconcile_repairs_ids_that_disagree_with_their_key() {
        let store = MemoryStore::new();
        let mut c = default_collection("2024-01-01T00:00:00.000Z");
        c.resumes.insert("2".to_string(), template_resume("other", "two"));
        c.metadata.insert(
            "2".to_string(),
            ResumeMetadata {
                id: "wrong".to_string(),
                title: "two".to_string(),
                description: None,
                created_at: String::new(),
                updated_at: String::new(),
            },
        );
        c.current_resume_id = "2".to_string();
        store.save_json(COLLECTION_KEY, &c).unwrap();

        let mut m = ResumeManager::load_with_clock(store, ticking_clock());
        assert_consistent(&m);
        m.update_section_props(
            "projects",
            SectionProps {
                visible: Some(false),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(m.len(), 2);
        assert!(!m.get("2").unwrap().section("projects").unwrap().visible);
        assert_consistent(&m);
    }

    #[test]
    fn test_update_all_documents_skips_write_when_nothing_changed() {
        let (store, mut m) = manager();
        store.set_item(COLLECTION_KEY, "untouched").unwrap();
        assert_eq!(m.update_all_documents(|_| 0), 0);
        assert_eq!(store.get_item(COLLECTION_KEY).as_deref(), Some("untouched"));

        m.update_all_documents(|doc| {
            doc.title = "changed".to_string();
            1
        });
        assert_eq!(stored(&store).resumes["1"].title, "changed");
    }

    #[test]
    fn test_odd_sections_survive_import_and_export() {
        let (_, mut m) = manager();
        let payload = json!({
            "id": "odd",
            "title": "Odd",
            "sections": [
                {"id": "basic", "title": "基本信息", "type": "basic", "data": {"name": "Ann"}},
                {"id": "work", "title": "工作", "type": "timeline", "editorType": "timeline", "data": {"content": "hi"}},
                {"id": "chart", "title": "图表", "type": "chart", "order": "3", "data": [1, 2, 3]}
            ]
        });
        let docs = parse_import_payload(&payload.to_string()).unwrap();
        let id = m.import_one(docs.into_iter().next().unwrap(), None).unwrap();

        let exported: Value = serde_json::from_str(&m.export_one(&id).unwrap()).unwrap();
        assert_eq!(exported["sections"][1]["data"], json!({"content": "hi"}));
        assert_eq!(exported["sections"][1]["editorType"], json!("timeline"));
        assert_eq!(exported["sections"][2]["type"], json!("chart"));
        assert_eq!(exported["sections"][2]["order"], json!(3));
        assert_eq!(exported["sections"][2]["data"], json!([1, 2, 3]));
    }
}
