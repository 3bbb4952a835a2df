//! JSON interchange files: one document, or an array of them.

use crate::error::{ResumeError, Result};
use crate::models::ResumeDocument;
use crate::util::next_free_suffixed;
use leptos::logging::warn;
use serde_json::Value;
use std::collections::HashSet;

pub const EXPORT_ALL_FILE_NAME: &str = "简历合集.json";
const FALLBACK_FILE_STEM: &str = "简历";

/// Download name for a single exported document.
pub fn export_file_name(title: &str) -> String {
    let stem = title.trim();
    let stem = if stem.is_empty() { FALLBACK_FILE_STEM } else { stem };
    let stem: String = stem
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect();
    format!("{}.json", stem)
}

fn non_empty_str(v: &Value, field: &str) -> bool {
    v.get(field)
        .and_then(Value::as_str)
        .is_some_and(|s| !s.trim().is_empty())
}

/// The only shape check done on import: `id`, `title` and a `sections` array.
fn has_required_fields(v: &Value) -> bool {
    v.is_object()
        && non_empty_str(v, "id")
        && non_empty_str(v, "title")
        && v.get("sections").is_some_and(Value::is_array)
}

fn document_from_value(v: Value) -> Result<ResumeDocument> {
    serde_json::from_value(v)
        .map_err(|e| ResumeError::validation(format!("无效的简历文件格式: {}", e)))
}

/// Parses an import file into documents.
///
/// A single object must be a valid document. In an array, entries that are
/// not are dropped; the file is rejected only if none remain.
pub fn parse_import_payload(text: &str) -> Result<Vec<ResumeDocument>> {
    let value: Value = serde_json::from_str(text)
        .map_err(|_| ResumeError::validation("导入失败：文件格式不正确或文件已损坏"))?;

    match value {
        Value::Array(items) => {
            let total = items.len();
            let docs: Vec<ResumeDocument> = items
                .into_iter()
                .filter(has_required_fields)
                .filter_map(|v| match document_from_value(v) {
                    Ok(doc) => Some(doc),
                    Err(e) => {
                        warn!("discarding import entry: {}", e);
                        None
                    }
                })
                .collect();
            if docs.is_empty() {
                return Err(ResumeError::validation("没有找到有效的简历数据"));
            }
            if docs.len() < total {
                warn!("discarded {} of {} import entries", total - docs.len(), total);
            }
            Ok(docs)
        }
        v if has_required_fields(&v) => Ok(vec![document_from_value(v)?]),
        _ => Err(ResumeError::validation("无效的文件格式")),
    }
}

/// Checks the required fields of a document about to enter the collection and
/// makes its section ids unique within the document.
pub(crate) fn validate_document(mut doc: ResumeDocument) -> Result<ResumeDocument> {
    if doc.id.trim().is_empty() {
        return Err(ResumeError::validation("简历缺少 id"));
    }
    if doc.title.trim().is_empty() {
        return Err(ResumeError::validation("简历缺少标题"));
    }
    ensure_unique_section_ids(&mut doc);
    Ok(doc)
}

/// Renames blank and repeated section ids to `<id>_<n>` (or `<type>_<n>`).
pub(crate) fn ensure_unique_section_ids(doc: &mut ResumeDocument) {
    let mut seen: HashSet<String> = HashSet::new();
    for section in doc.sections.iter_mut() {
        if seen.contains(&section.id) || section.id.trim().is_empty() {
            let base = if !section.id.trim().is_empty() {
                section.id.clone()
            } else if section.kind.as_str().trim().is_empty() {
                "section".to_string()
            } else {
                section.kind.to_string()
            };
            section.id = next_free_suffixed(&base, |id| seen.contains(id));
        }
        seen.insert(section.id.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{template_resume, SectionContent};
    use serde_json::json;

    #[test]
    fn test_single_object() {
        let text = serde_json::to_string(&template_resume("7", "Seven")).unwrap();
        let docs = parse_import_payload(&text).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, "7");
    }

    #[test]
    fn test_array_discards_nonconforming_entries() {
        let good = serde_json::to_value(template_resume("7", "Seven")).unwrap();
        let text = json!([good, {"id": "8", "title": "no sections"}, 42, {"id": "", "title": "x", "sections": []}])
            .to_string();
        let docs = parse_import_payload(&text).unwrap();
        assert_eq!(docs.len(), 1);
    }

    #[test]
    fn test_array_without_valid_entries_is_rejected() {
        let err = parse_import_payload(r#"[{"title": "x"}]"#).unwrap_err();
        assert!(matches!(err, ResumeError::Validation(_)));
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(parse_import_payload("not json").is_err());
        assert!(parse_import_payload(r#"{"id": "1"}"#).is_err());
        assert!(parse_import_payload(r#""string""#).is_err());
    }

    #[test]
    fn test_minimal_document_with_empty_sections_is_accepted() {
        let docs = parse_import_payload(r#"{"id": "m", "title": "Min", "sections": []}"#).unwrap();
        assert!(docs[0].sections.is_empty());
    }

    #[test]
    fn test_section_shapes_are_not_validated() {
        let text = r#"{"id":"x","title":"t","sections":[
            {"id":"s","title":"S","type":"timeline","data":{"content":"hi"}},
            {"id":"c","title":"C","type":"chart","data":[1,2,3]}
        ]}"#;
        let docs = parse_import_payload(text).unwrap();
        assert_eq!(docs[0].sections.len(), 2);
        assert_eq!(docs[0].sections[0].content, SectionContent::Raw(json!({"content": "hi"})));

        let batch = format!("[{}]", text);
        assert_eq!(parse_import_payload(&batch).unwrap().len(), 1);
    }

    #[test]
    fn test_duplicate_section_ids_are_made_unique() {
        let mut doc = template_resume("1", "t");
        let extra = doc.sections[1].clone();
        doc.sections.push(extra);
        let doc = validate_document(doc).unwrap();
        let ids: Vec<&str> = doc.sections.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["basic-info", "advantages", "projects", "experience", "advantages_1"]);
    }

    #[test]
    fn test_export_file_name() {
        assert_eq!(export_file_name("我的简历"), "我的简历.json");
        assert_eq!(export_file_name("  "), "简历.json");
        assert_eq!(export_file_name("a/b"), "a_b.json");
    }
}
