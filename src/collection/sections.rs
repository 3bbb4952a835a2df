//! Editing the open document section by section.

use super::ResumeManager;
use crate::error::{ResumeError, Result};
use crate::models::{
    template_resume, EditorKind, ListItem, ResumeDocument, Section, SectionContent, TextContent,
};
use crate::storage::KvStore;
use crate::util::{mint_time_id, non_blank};
use std::collections::HashMap;
use strum::{AsRefStr, Display, EnumIter};

/// Section attributes that can change without touching the payload.
#[derive(Clone, Debug, Default)]
pub struct SectionProps {
    pub title: Option<String>,
    pub visible: Option<bool>,
    pub icon_name: Option<String>,
}

/// Kinds of section a user can add to a resume.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Display, AsRefStr, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum SectionPreset {
    #[default]
    Timeline,
    List,
    Text,
}

impl SectionPreset {
    pub fn label(self) -> &'static str {
        match self {
            Self::Timeline => "经历",
            Self::List => "列表",
            Self::Text => "文本",
        }
    }

    /// An empty section of this kind.
    pub fn blank(self, id: impl Into<String>, title: impl Into<String>) -> Section {
        let (content, editor) = match self {
            Self::Timeline => (SectionContent::Timeline(vec![]), EditorKind::Timeline),
            Self::List => (
                SectionContent::List(vec![ListItem {
                    id: "1".to_string(),
                    ..Default::default()
                }]),
                EditorKind::List,
            ),
            Self::Text => (SectionContent::Text(TextContent::default()), EditorKind::Text),
        };
        Section {
            editor: Some(editor),
            ..Section::new(id, title, content)
        }
    }
}

fn find_section<'a>(doc: &'a mut ResumeDocument, section_id: &str) -> Result<&'a mut Section> {
    doc.section_mut(section_id)
        .ok_or_else(|| ResumeError::not_found(format!("section {}", section_id)))
}

fn set_content(section: &mut Section, content: SectionContent) -> Result<()> {
    if section.is_basic() != matches!(content, SectionContent::Basic(_)) {
        return Err(ResumeError::validation("section payload does not match its type"));
    }
    section.content = content;
    Ok(())
}

fn apply_props(section: &mut Section, props: SectionProps) -> Result<()> {
    if let Some(title) = props.title {
        section.title = non_blank(&title).ok_or_else(|| ResumeError::validation("请输入模块标题"))?;
    }
    if let Some(visible) = props.visible {
        section.visible = visible;
    }
    if let Some(icon) = props.icon_name {
        section.icon_name = non_blank(&icon);
    }
    Ok(())
}

impl<S: KvStore> ResumeManager<S> {
    /// Runs `f` on a copy of the open document and keeps the copy only on success.
    fn edit_current(&mut self, f: impl FnOnce(&mut ResumeDocument) -> Result<()>) -> Result<()> {
        let mut doc = self
            .current()
            .cloned()
            .ok_or_else(|| ResumeError::not_found("current resume"))?;
        f(&mut doc)?;
        self.store_document(doc);
        Ok(())
    }

    fn store_document(&mut self, doc: ResumeDocument) {
        let now = self.now();
        if let Some(meta) = self.collection.metadata.get_mut(&doc.id) {
            meta.title = doc.title.clone();
            meta.updated_at = now;
        }
        self.collection.resumes.insert(doc.id.clone(), doc);
        self.persist();
    }

    /// Replaces the body of an existing document and bumps its `updatedAt`.
    pub fn update_current(&mut self, doc: ResumeDocument) -> Result<()> {
        if !self.collection.contains(&doc.id) {
            return Err(ResumeError::not_found(format!("resume {}", doc.id)));
        }
        if doc.title.trim().is_empty() {
            return Err(ResumeError::validation("请输入简历标题"));
        }
        self.store_document(doc);
        Ok(())
    }

    pub fn update_section_content(&mut self, section_id: &str, content: SectionContent) -> Result<()> {
        self.edit_current(|doc| set_content(find_section(doc, section_id)?, content))
    }

    pub fn update_section_props(&mut self, section_id: &str, props: SectionProps) -> Result<()> {
        self.edit_current(|doc| apply_props(find_section(doc, section_id)?, props))
    }

    /// Props and payload together; either both apply or neither does.
    pub fn update_section(
        &mut self,
        section_id: &str,
        props: SectionProps,
        content: SectionContent,
    ) -> Result<()> {
        self.edit_current(|doc| {
            let section = find_section(doc, section_id)?;
            apply_props(section, props)?;
            set_content(section, content)
        })
    }

    /// Renumbers `order` as 1..n: the basic section first, then `ids` in the
    /// given order, then any section not listed in its previous order.
    pub fn reorder_sections(&mut self, ids: &[String]) -> Result<()> {
        self.edit_current(|doc| {
            let rank: HashMap<&str, usize> = ids
                .iter()
                .enumerate()
                .map(|(i, id)| (id.as_str(), i))
                .collect();

            let mut ordered: Vec<&mut Section> = doc.sections.iter_mut().collect();
            ordered.sort_by_key(|s| {
                let group = if s.is_basic() {
                    0
                } else if rank.contains_key(s.id.as_str()) {
                    1
                } else {
                    2
                };
                let pos = rank.get(s.id.as_str()).copied().unwrap_or(usize::MAX);
                (group, pos, s.order)
            });
            for (i, section) in ordered.into_iter().enumerate() {
                section.order = i as i64 + 1;
            }
            Ok(())
        })
    }

    /// Appends a section after the current last one.
    pub fn add_section(&mut self, mut section: Section) -> Result<()> {
        self.edit_current(|doc| {
            if doc.section(&section.id).is_some() {
                return Err(ResumeError::validation(format!("模块 {} 已存在", section.id)));
            }
            if section.is_basic() && doc.basic_section().is_some() {
                return Err(ResumeError::invariant("简历只能有一个基本信息模块"));
            }
            section.order = doc.sections.iter().map(|s| s.order).max().unwrap_or(0) + 1;
            doc.sections.push(section);
            Ok(())
        })
    }

    /// Appends an empty section of `preset` and returns its id.
    pub fn add_blank_section(&mut self, preset: SectionPreset, title: &str) -> Result<String> {
        let title = non_blank(title).ok_or_else(|| ResumeError::validation("请输入模块标题"))?;
        let doc = self
            .current()
            .ok_or_else(|| ResumeError::not_found("current resume"))?;
        let id = mint_time_id((self.clock)(), |c| {
            doc.section(&format!("{}-{}", preset, c)).is_some()
        });
        let id = format!("{}-{}", preset, id);
        self.add_section(preset.blank(id.clone(), title))?;
        Ok(id)
    }

    pub fn delete_section(&mut self, section_id: &str) -> Result<()> {
        self.edit_current(|doc| {
            let section = doc
                .section(section_id)
                .ok_or_else(|| ResumeError::not_found(format!("section {}", section_id)))?;
            if section.is_basic() {
                return Err(ResumeError::invariant("基本信息模块不能删除"));
            }
            doc.sections.retain(|s| s.id != section_id);
            Ok(())
        })
    }

    /// Puts the template back into the open document, keeping its id and title.
    pub fn reset_current(&mut self) -> Result<()> {
        self.edit_current(|doc| {
            *doc = template_resume(&doc.id, &doc.title);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ListItem, TextContent};
    use crate::storage::MemoryStore;
    use crate::util::testing::ticking_clock;

    fn manager() -> ResumeManager<MemoryStore> {
        ResumeManager::load_with_clock(MemoryStore::new(), ticking_clock())
    }

    fn order_of(m: &ResumeManager<MemoryStore>) -> Vec<(String, i64)> {
        let doc = m.current().unwrap();
        let mut v: Vec<(String, i64)> = doc.sections.iter().map(|s| (s.id.clone(), s.order)).collect();
        v.sort_by_key(|(_, o)| *o);
        v
    }

    #[test]
    fn test_update_section_content_bumps_updated_at() {
        let mut m = manager();
        let before = m.metadata("1").unwrap().updated_at.clone();
        let content = SectionContent::Text(TextContent {
            content: "<p>new</p>".to_string(),
            ..Default::default()
        });
        m.update_section_content("advantages", content).unwrap();
        let doc = m.current().unwrap();
        assert_eq!(doc.section("advantages").unwrap().content.rich_text(), vec!["<p>new</p>"]);
        assert_ne!(m.metadata("1").unwrap().updated_at, before);
    }

    #[test]
    fn test_update_section_content_rejects_basic_mismatch() {
        let mut m = manager();
        let before = m.current().unwrap().clone();
        let err = m
            .update_section_content("basic-info", SectionContent::List(vec![ListItem::default()]))
            .unwrap_err();
        assert!(matches!(err, ResumeError::Validation(_)));
        assert!(m.update_section_content("nope", SectionContent::List(vec![])).is_err());
        assert_eq!(m.current().unwrap(), &before);
    }

    #[test]
    fn test_update_section_props() {
        let mut m = manager();
        let props = SectionProps {
            title: Some(" Projects ".to_string()),
            visible: Some(false),
            icon_name: None,
        };
        m.update_section_props("projects", props).unwrap();
        let s = m.current().unwrap().section("projects").unwrap().clone();
        assert_eq!(s.title, "Projects");
        assert!(!s.visible);
        assert_eq!(s.icon_name.as_deref(), Some("settings"));

        let blank = SectionProps {
            title: Some(" ".to_string()),
            ..Default::default()
        };
        assert!(m.update_section_props("projects", blank).is_err());
    }

    #[test]
    fn test_reorder_keeps_basic_first_and_unlisted_last() {
        let mut m = manager();
        m.reorder_sections(&["experience".to_string(), "advantages".to_string()])
            .unwrap();
        let ids: Vec<String> = order_of(&m).into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["basic-info", "experience", "advantages", "projects"]);
        let orders: Vec<i64> = order_of(&m).into_iter().map(|(_, o)| o).collect();
        assert_eq!(orders, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_add_and_delete_section() {
        let mut m = manager();
        let s = Section::new("skills", "技能", SectionContent::List(vec![]));
        m.add_section(s.clone()).unwrap();
        assert_eq!(m.current().unwrap().section("skills").unwrap().order, 5);
        assert!(m.add_section(s).is_err());

        m.delete_section("skills").unwrap();
        assert!(m.current().unwrap().section("skills").is_none());
        assert!(matches!(
            m.delete_section("basic-info"),
            Err(ResumeError::InvariantViolation(_))
        ));
    }

    #[test]
    fn test_update_section_is_all_or_nothing() {
        let mut m = manager();
        let before = m.current().unwrap().clone();
        let props = SectionProps {
            title: Some("Skills".to_string()),
            ..Default::default()
        };
        let err = m
            .update_section("basic-info", props, SectionContent::List(vec![]))
            .unwrap_err();
        assert!(matches!(err, ResumeError::Validation(_)));
        assert_eq!(m.current().unwrap(), &before);

        let props = SectionProps {
            title: Some("Highlights".to_string()),
            ..Default::default()
        };
        let content = SectionContent::Text(TextContent {
            content: "<p>x</p>".to_string(),
            ..Default::default()
        });
        m.update_section("advantages", props, content).unwrap();
        let s = m.current().unwrap().section("advantages").unwrap();
        assert_eq!(s.title, "Highlights");
        assert_eq!(s.content.rich_text(), vec!["<p>x</p>"]);
    }

    #[test]
    fn test_add_blank_section_from_preset() {
        use strum::IntoEnumIterator;

        let mut m = manager();
        assert!(m.add_blank_section(SectionPreset::List, "  ").is_err());

        let ids: Vec<String> = SectionPreset::iter()
            .map(|p| m.add_blank_section(p, p.label()).unwrap())
            .collect();
        assert!(ids[0].starts_with("timeline-"));
        assert!(ids[2].starts_with("text-"));

        let doc = m.current().unwrap();
        let list = doc.section(&ids[1]).unwrap();
        assert_eq!(list.title, "列表");
        assert_eq!(list.order, 6);
        assert_eq!(list.content.item_ids().len(), 1);

        // Survives a reload with the same shape.
        let json = serde_json::to_value(doc).unwrap();
        let back: ResumeDocument = serde_json::from_value(json).unwrap();
        assert_eq!(&back, doc);
    }

    #[test]
    fn test_second_basic_section_is_rejected() {
        let mut m = manager();
        let s = Section::new("basic-2", "x", SectionContent::Basic(Default::default()));
        assert!(matches!(m.add_section(s), Err(ResumeError::InvariantViolation(_))));
    }

    #[test]
    fn test_reset_current_keeps_identity() {
        let mut m = manager();
        m.rename("1", "Mine", None).unwrap();
        m.delete_section("projects").unwrap();
        m.reset_current().unwrap();
        let doc = m.current().unwrap();
        assert_eq!(doc.title, "Mine");
        assert_eq!(doc.id, "1");
        assert!(doc.section("projects").is_some());
    }

    #[test]
    fn test_update_current_unknown_id() {
        let mut m = manager();
        let doc = crate::models::template_resume("zzz", "x");
        assert!(matches!(m.update_current(doc), Err(ResumeError::NotFound(_))));
    }
}
