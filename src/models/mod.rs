pub(crate) mod seed;

use indexmap::IndexMap;
use leptos::logging::warn;
use serde::{Deserialize, Deserializer, Serialize};
use crate::util::{mint_time_id, next_free_suffixed};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fmt;

pub use seed::{default_collection, default_platforms, default_prompts, template_resume};

/// Stored documents are user data from older versions and hand-edited
/// imports, so scalar fields accept `null` and wrong scalar types.
fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    })
}

fn lenient_opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_order<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or_default(),
        Value::String(s) => s.trim().parse().unwrap_or_default(),
        _ => 0,
    })
}

fn lenient_visible<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    Ok(Value::deserialize(d)?.as_bool().unwrap_or(true))
}

fn null_as_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

/// Role of a section inside a resume. Exactly one `Basic` per document.
///
/// Types this version does not know are carried as `Other` and written back as they were.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SectionKind {
    Basic,
    Timeline,
    List,
    Text,
    Other(String),
}

impl SectionKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Basic => "basic",
            Self::Timeline => "timeline",
            Self::List => "list",
            Self::Text => "text",
            Self::Other(tag) => tag,
        }
    }
}

impl From<String> for SectionKind {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "basic" => Self::Basic,
            "timeline" => Self::Timeline,
            "list" => Self::List,
            "text" => Self::Text,
            _ => Self::Other(tag),
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which editor a section's payload was written with.
///
/// Legacy documents store e.g. a `list` section edited as free text,
/// so the payload shape follows the editor when one is recorded.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum EditorKind {
    Timeline,
    List,
    Text,
    Other(String),
}

impl EditorKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Timeline => "timeline",
            Self::List => "list",
            Self::Text => "text",
            Self::Other(tag) => tag,
        }
    }
}

impl From<String> for EditorKind {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "timeline" => Self::Timeline,
            "list" => Self::List,
            "text" => Self::Text,
            _ => Self::Other(tag),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CustomField {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub label: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub value: String,
    #[serde(
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub icon_name: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BasicInfo {
    #[serde(default, deserialize_with = "lenient_string")]
    pub avatar: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub phone: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub gender: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub age: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub location: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub website: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub custom_fields: Vec<CustomField>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimelineItem {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub subtitle: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub secondary_subtitle: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub start_date: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub end_date: String,
    /// Rich text (HTML), or plain text in documents that predate the editor.
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ListItem {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub content: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct TextContent {
    #[serde(default, deserialize_with = "lenient_string")]
    pub content: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Section payload, one variant per editor shape.
///
/// `Raw` holds a payload whose shape is unknown or does not match its tags;
/// it is shown read-only and stored back untouched.
#[derive(Clone, Debug, PartialEq)]
pub enum SectionContent {
    Basic(BasicInfo),
    Timeline(Vec<TimelineItem>),
    List(Vec<ListItem>),
    Text(TextContent),
    Raw(Value),
}

impl SectionContent {
    /// Payload in the expected shape, or `Raw` when it does not fit.
    fn from_value(shape: ContentShape, data: Value) -> Self {
        let parsed = match (shape, &data) {
            (ContentShape::Raw, _) => return Self::Raw(data),
            (ContentShape::Basic, Value::Null) => Ok(Self::Basic(BasicInfo::default())),
            (ContentShape::Timeline, Value::Null) => Ok(Self::Timeline(Vec::new())),
            (ContentShape::List, Value::Null) => Ok(Self::List(Vec::new())),
            (ContentShape::Text, Value::Null) => Ok(Self::Text(TextContent::default())),
            (ContentShape::Basic, _) => serde_json::from_value(data.clone()).map(Self::Basic),
            (ContentShape::Timeline, _) => serde_json::from_value(data.clone()).map(Self::Timeline),
            (ContentShape::List, _) => serde_json::from_value(data.clone()).map(Self::List),
            (ContentShape::Text, _) => serde_json::from_value(data.clone()).map(Self::Text),
        };
        parsed.unwrap_or_else(|e| {
            warn!("keeping {:?} section data as is: {}", shape, e);
            Self::Raw(data)
        })
    }

    fn to_value(&self) -> Value {
        let v = match self {
            Self::Basic(b) => serde_json::to_value(b),
            Self::Timeline(items) => serde_json::to_value(items),
            Self::List(items) => serde_json::to_value(items),
            Self::Text(t) => serde_json::to_value(t),
            Self::Raw(v) => return v.clone(),
        };
        // Plain structs with string keys always serialize.
        v.unwrap_or(Value::Null)
    }

    fn shape(&self) -> ContentShape {
        match self {
            Self::Basic(_) => ContentShape::Basic,
            Self::Timeline(_) => ContentShape::Timeline,
            Self::List(_) => ContentShape::List,
            Self::Text(_) => ContentShape::Text,
            Self::Raw(_) => ContentShape::Raw,
        }
    }

    /// Every rich-text payload of this section, in document order.
    pub fn rich_text(&self) -> Vec<&str> {
        match self {
            Self::Basic(_) | Self::Raw(_) => vec![],
            Self::Timeline(items) => items.iter().map(|i| i.description.as_str()).collect(),
            Self::List(items) => items.iter().map(|i| i.content.as_str()).collect(),
            Self::Text(t) => vec![t.content.as_str()],
        }
    }

    /// Rewrites every rich-text payload in place.
    pub fn map_rich_text(&mut self, f: impl Fn(&str) -> String) {
        match self {
            Self::Basic(_) | Self::Raw(_) => {}
            Self::Timeline(items) => {
                for item in items.iter_mut() {
                    item.description = f(&item.description);
                }
            }
            Self::List(items) => {
                for item in items.iter_mut() {
                    item.content = f(&item.content);
                }
            }
            Self::Text(t) => t.content = f(&t.content),
        }
    }
}

/// Item-level edits used by the section editor. Items are addressed by id;
/// call [`SectionContent::ensure_item_ids`] before editing stored data.
impl SectionContent {
    fn item_ids_mut(&mut self) -> Vec<&mut String> {
        match self {
            Self::Basic(b) => b.custom_fields.iter_mut().map(|f| &mut f.id).collect(),
            Self::Timeline(items) => items.iter_mut().map(|i| &mut i.id).collect(),
            Self::List(items) => items.iter_mut().map(|i| &mut i.id).collect(),
            Self::Text(_) | Self::Raw(_) => vec![],
        }
    }

    /// Ids of the repeatable items: timeline entries, list entries or the
    /// custom fields of basic info.
    pub fn item_ids(&self) -> Vec<String> {
        match self {
            Self::Basic(b) => b.custom_fields.iter().map(|f| f.id.clone()).collect(),
            Self::Timeline(items) => items.iter().map(|i| i.id.clone()).collect(),
            Self::List(items) => items.iter().map(|i| i.id.clone()).collect(),
            Self::Text(_) | Self::Raw(_) => vec![],
        }
    }

    /// Gives blank and repeated item ids a unique `<id>_<n>` / `item_<n>` form.
    /// Returns how many ids changed.
    pub fn ensure_item_ids(&mut self) -> usize {
        let mut seen: HashSet<String> = HashSet::new();
        let mut changed = 0;
        for id in self.item_ids_mut() {
            if id.trim().is_empty() || seen.contains(id.as_str()) {
                let base = if id.trim().is_empty() { "item" } else { id.as_str() };
                *id = next_free_suffixed(base, |c| seen.contains(c));
                changed += 1;
            }
            seen.insert(id.clone());
        }
        changed
    }

    /// Appends an empty item and returns its id; `None` for payloads without items.
    pub fn push_item(&mut self, now: DateTime<Utc>) -> Option<String> {
        let taken = self.item_ids();
        let id = mint_time_id(now, |c| taken.iter().any(|t| t == c));
        match self {
            Self::Basic(b) => b.custom_fields.push(CustomField {
                id: id.clone(),
                ..Default::default()
            }),
            Self::Timeline(items) => items.push(TimelineItem {
                id: id.clone(),
                ..Default::default()
            }),
            Self::List(items) => items.push(ListItem {
                id: id.clone(),
                ..Default::default()
            }),
            Self::Text(_) | Self::Raw(_) => return None,
        }
        Some(id)
    }

    pub fn remove_item(&mut self, id: &str) -> bool {
        let before = self.item_ids().len();
        match self {
            Self::Basic(b) => b.custom_fields.retain(|f| f.id != id),
            Self::Timeline(items) => items.retain(|i| i.id != id),
            Self::List(items) => items.retain(|i| i.id != id),
            Self::Text(_) | Self::Raw(_) => {}
        }
        self.item_ids().len() != before
    }

    /// Swaps the item with its neighbour `delta` places away; false at the ends.
    pub fn move_item(&mut self, id: &str, delta: isize) -> bool {
        let ids = self.item_ids();
        let Some(from) = ids.iter().position(|i| i == id) else {
            return false;
        };
        let Some(to) = from.checked_add_signed(delta).filter(|t| *t < ids.len()) else {
            return false;
        };
        match self {
            Self::Basic(b) => b.custom_fields.swap(from, to),
            Self::Timeline(items) => items.swap(from, to),
            Self::List(items) => items.swap(from, to),
            Self::Text(_) | Self::Raw(_) => return false,
        }
        true
    }

    pub fn custom_field_mut(&mut self, id: &str) -> Option<&mut CustomField> {
        match self {
            Self::Basic(b) => b.custom_fields.iter_mut().find(|f| f.id == id),
            _ => None,
        }
    }

    pub fn timeline_item_mut(&mut self, id: &str) -> Option<&mut TimelineItem> {
        match self {
            Self::Timeline(items) => items.iter_mut().find(|i| i.id == id),
            _ => None,
        }
    }

    pub fn list_item_mut(&mut self, id: &str) -> Option<&mut ListItem> {
        match self {
            Self::List(items) => items.iter_mut().find(|i| i.id == id),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ContentShape {
    Basic,
    Timeline,
    List,
    Text,
    Raw,
}

impl ContentShape {
    fn resolve(kind: &SectionKind, editor: Option<&EditorKind>) -> Self {
        match (kind, editor) {
            (SectionKind::Basic, _) => Self::Basic,
            (_, Some(EditorKind::Timeline)) => Self::Timeline,
            (_, Some(EditorKind::List)) => Self::List,
            (_, Some(EditorKind::Text)) => Self::Text,
            (SectionKind::Timeline, _) => Self::Timeline,
            (SectionKind::List, _) => Self::List,
            (SectionKind::Text, _) => Self::Text,
            (SectionKind::Other(_), _) => Self::Raw,
        }
    }
}

/// A titled, typed, orderable block of resume content.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(from = "StoredSection", into = "StoredSection")]
pub struct Section {
    pub id: String,
    pub title: String,
    pub kind: SectionKind,
    pub editor: Option<EditorKind>,
    pub icon_name: Option<String>,
    pub visible: bool,
    pub order: i64,
    pub content: SectionContent,
    pub extra: Map<String, Value>,
}

impl Section {
    pub fn new(id: impl Into<String>, title: impl Into<String>, content: SectionContent) -> Self {
        let kind = match &content {
            SectionContent::Basic(_) => SectionKind::Basic,
            SectionContent::Timeline(_) => SectionKind::Timeline,
            SectionContent::List(_) => SectionKind::List,
            SectionContent::Text(_) | SectionContent::Raw(_) => SectionKind::Text,
        };
        Self {
            id: id.into(),
            title: title.into(),
            kind,
            editor: None,
            icon_name: None,
            visible: true,
            order: 0,
            content,
            extra: Map::new(),
        }
    }

    pub fn is_basic(&self) -> bool {
        self.kind == SectionKind::Basic
    }
}

/// On-disk shape of a section: the payload is a bare JSON value whose
/// layout depends on `type`/`editorType`.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredSection {
    #[serde(default, deserialize_with = "lenient_string")]
    id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    title: String,
    #[serde(rename = "type", default, deserialize_with = "lenient_string")]
    kind: String,
    #[serde(
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    editor_type: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    icon_name: Option<String>,
    #[serde(default = "default_visible", deserialize_with = "lenient_visible")]
    visible: bool,
    #[serde(default, deserialize_with = "lenient_order")]
    order: i64,
    #[serde(default)]
    data: Value,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

fn default_visible() -> bool {
    true
}

impl From<StoredSection> for Section {
    fn from(s: StoredSection) -> Self {
        let kind = SectionKind::from(s.kind);
        let editor = s.editor_type.map(EditorKind::from);
        let shape = ContentShape::resolve(&kind, editor.as_ref());
        Self {
            content: SectionContent::from_value(shape, s.data),
            id: s.id,
            title: s.title,
            kind,
            editor,
            icon_name: s.icon_name,
            visible: s.visible,
            order: s.order,
            extra: s.extra,
        }
    }
}

impl From<Section> for StoredSection {
    fn from(s: Section) -> Self {
        let data = s.content.to_value();
        // Keep the tag pair consistent with the payload actually held.
        let shape = s.content.shape();
        let editor = match shape {
            ContentShape::Basic | ContentShape::Raw => s.editor,
            _ if ContentShape::resolve(&s.kind, s.editor.as_ref()) == shape => s.editor,
            ContentShape::Timeline => Some(EditorKind::Timeline),
            ContentShape::List => Some(EditorKind::List),
            ContentShape::Text => Some(EditorKind::Text),
        };
        Self {
            id: s.id,
            title: s.title,
            kind: s.kind.as_str().to_string(),
            editor_type: editor.map(|e| e.as_str().to_string()),
            icon_name: s.icon_name,
            visible: s.visible,
            order: s.order,
            data,
            extra: s.extra,
        }
    }
}

/// One user-authored resume.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResumeDocument {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub template: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub layout: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sections: Vec<Section>,

    /// Fields this version does not know about (e.g. page settings) survive a round trip.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ResumeDocument {
    pub fn basic_section(&self) -> Option<&Section> {
        self.sections.iter().find(|s| s.is_basic())
    }

    pub fn section(&self, id: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }

    pub fn section_mut(&mut self, id: &str) -> Option<&mut Section> {
        self.sections.iter_mut().find(|s| s.id == id)
    }

    /// Visible sections by `order`; equal orders keep their position.
    pub fn visible_sections(&self) -> Vec<&Section> {
        let mut out: Vec<&Section> = self.sections.iter().filter(|s| s.visible).collect();
        out.sort_by_key(|s| s.order);
        out
    }

    /// Non-basic sections by `order`, hidden ones included.
    pub fn body_sections(&self) -> Vec<&Section> {
        let mut out: Vec<&Section> = self.sections.iter().filter(|s| !s.is_basic()).collect();
        out.sort_by_key(|s| s.order);
        out
    }
}

/// Index record kept beside each document so listing never loads bodies.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResumeMetadata {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub created_at: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub updated_at: String,
}

/// The persisted root aggregate.
///
/// `resumes` and `metadata` always share the same key set and are never empty.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResumeCollection {
    #[serde(default, deserialize_with = "lenient_string")]
    pub current_resume_id: String,
    pub resumes: IndexMap<String, ResumeDocument>,
    pub metadata: IndexMap<String, ResumeMetadata>,
}

impl ResumeCollection {
    pub fn len(&self) -> usize {
        self.resumes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resumes.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.resumes.contains_key(id)
    }

    /// Structural check used when adopting a stored collection.
    pub fn is_consistent(&self) -> bool {
        !self.resumes.is_empty()
            && self.resumes.len() == self.metadata.len()
            && self.resumes.keys().all(|k| self.metadata.contains_key(k))
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResumePrompt {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct AiPlatform {
    pub id: String,
    pub name: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}
