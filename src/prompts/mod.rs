//! Library of reusable AI prompt snippets, kept apart from the resumes.

use crate::error::{ResumeError, Result};
use crate::models::{default_prompts, ResumePrompt};
use crate::search::SearchIndex;
use crate::storage::{KvStore, PROMPTS_KEY};
use crate::util::{iso_timestamp, mint_time_id, non_blank, system_clock, Clock};
use leptos::logging::log;
use std::collections::HashSet;

const TITLE_BOOST: f64 = 3.0;
const TAGS_BOOST: f64 = 2.0;
const CONTENT_BOOST: f64 = 1.0;

/// Editable fields of a prompt.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PromptDraft {
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
}

impl PromptDraft {
    pub fn new(title: impl Into<String>, content: impl Into<String>, tags: Vec<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            tags,
        }
    }

    /// Trimmed copy; blank title or content is rejected.
    fn normalized(self) -> Result<Self> {
        let title = non_blank(&self.title).ok_or_else(|| ResumeError::validation("请输入提示词标题"))?;
        let content =
            non_blank(&self.content).ok_or_else(|| ResumeError::validation("请输入提示词内容"))?;
        Ok(Self {
            title,
            content,
            tags: normalize_tags(&self.tags),
        })
    }
}

/// Trims tags, dropping blanks and repeats while keeping first-seen order.
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    tags.iter()
        .filter_map(|t| non_blank(t))
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

/// Splits user input like `"a, b，c"` into tags.
pub fn parse_tag_input(input: &str) -> Vec<String> {
    let raw: Vec<String> = input
        .split([',', '，'])
        .map(str::to_string)
        .collect();
    normalize_tags(&raw)
}

pub struct PromptLibrary<S> {
    store: S,
    clock: Clock,
    prompts: Vec<ResumePrompt>,
}

impl<S: KvStore> PromptLibrary<S> {
    pub fn load(store: S) -> Self {
        Self::load_with_clock(store, system_clock())
    }

    pub fn load_with_clock(store: S, clock: Clock) -> Self {
        let prompts = match store.load_json::<Vec<ResumePrompt>>(PROMPTS_KEY) {
            Some(stored) => stored,
            None => {
                let seed = default_prompts(&iso_timestamp(clock()));
                store.persist_json(PROMPTS_KEY, &seed);
                seed
            }
        };
        Self {
            store,
            clock,
            prompts,
        }
    }

    fn persist(&self) {
        self.store.persist_json(PROMPTS_KEY, &self.prompts);
    }

    pub fn list(&self) -> &[ResumePrompt] {
        &self.prompts
    }

    pub fn get(&self, id: &str) -> Option<&ResumePrompt> {
        self.prompts.iter().find(|p| p.id == id)
    }

    pub fn add(&mut self, draft: PromptDraft) -> Result<String> {
        let draft = draft.normalized()?;
        let now = (self.clock)();
        let id = mint_time_id(now, |id| self.get(id).is_some());
        let now = iso_timestamp(now);

        self.prompts.push(ResumePrompt {
            id: id.clone(),
            title: draft.title,
            content: draft.content,
            tags: draft.tags,
            created_at: now.clone(),
            updated_at: now,
        });
        self.persist();
        log!("added prompt {}", id);
        Ok(id)
    }

    /// Replaces the editable fields, keeping `createdAt`.
    pub fn update(&mut self, id: &str, draft: PromptDraft) -> Result<()> {
        let draft = draft.normalized()?;
        let now = iso_timestamp((self.clock)());
        let prompt = self
            .prompts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| ResumeError::not_found(format!("prompt {}", id)))?;

        prompt.title = draft.title;
        prompt.content = draft.content;
        prompt.tags = draft.tags;
        prompt.updated_at = now;
        self.persist();
        Ok(())
    }

    pub fn delete(&mut self, id: &str) -> Result<()> {
        let before = self.prompts.len();
        self.prompts.retain(|p| p.id != id);
        if self.prompts.len() == before {
            return Err(ResumeError::not_found(format!("prompt {}", id)));
        }
        self.persist();
        log!("deleted prompt {}", id);
        Ok(())
    }

    /// Drops user edits and restores the built-in prompts.
    pub fn reset(&mut self) {
        self.prompts = default_prompts(&iso_timestamp((self.clock)()));
        self.persist();
        log!("prompts reset to defaults");
    }

    /// Prompts matching `query`, best first. A blank query returns the whole list.
    pub fn search(&self, query: &str) -> Vec<&ResumePrompt> {
        let mut index = SearchIndex::new();
        for p in &self.prompts {
            let tags = p.tags.join(" ");
            index.add(
                p.id.clone(),
                &[
                    (TITLE_BOOST, p.title.as_str()),
                    (TAGS_BOOST, tags.as_str()),
                    (CONTENT_BOOST, p.content.as_str()),
                ],
            );
        }
        index
            .ranked_ids(query)
            .iter()
            .filter_map(|id| self.get(id))
            .collect()
    }

    /// Every tag in use, in first-seen order.
    pub fn all_tags(&self) -> Vec<String> {
        let all: Vec<String> = self.prompts.iter().flat_map(|p| p.tags.clone()).collect();
        normalize_tags(&all)
    }
}
