use regex::Regex;
use std::sync::LazyLock;

static HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("static regex"));
static BULLET_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-•]\s+(.+)$").expect("static regex"));
static NUMBERED_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+\.\s+(.+)$").expect("static regex"));

const EMPTY_PARAGRAPH: &str = "<p></p>";

/// True for non-blank text that carries no HTML tag.
pub fn is_plain_text(text: &str) -> bool {
    !text.trim().is_empty() && !HTML_TAG.is_match(text)
}

pub(crate) fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

fn list_item(line: &str) -> Option<&str> {
    BULLET_ITEM
        .captures(line)
        .or_else(|| NUMBERED_ITEM.captures(line))
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Converts legacy plain text into the editor's HTML.
///
/// Runs of `- `, `• ` or `1. ` lines become one `<ul>`, other non-blank
/// lines become `<p>`. Text that already contains a tag is returned as is,
/// so applying this twice is the same as applying it once.
pub fn convert_plain_text_to_html(text: &str) -> String {
    if text.trim().is_empty() {
        return EMPTY_PARAGRAPH.to_string();
    }
    if !is_plain_text(text) {
        return text.to_string();
    }

    let mut out = String::new();
    let mut items: Vec<String> = Vec::new();

    let flush = |out: &mut String, items: &mut Vec<String>| {
        if !items.is_empty() {
            out.push_str("<ul>");
            for item in items.drain(..) {
                out.push_str("<li>");
                out.push_str(&item);
                out.push_str("</li>");
            }
            out.push_str("</ul>");
        }
    };

    for line in text.split('\n') {
        let line = line.trim();
        if let Some(item) = list_item(line) {
            items.push(escape_html(item));
            continue;
        }

        flush(&mut out, &mut items);
        if !line.is_empty() {
            out.push_str("<p>");
            out.push_str(&escape_html(line));
            out.push_str("</p>");
        }
    }
    flush(&mut out, &mut items);

    if out.is_empty() {
        EMPTY_PARAGRAPH.to_string()
    } else {
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_plain_text() {
        assert!(!is_plain_text(""));
        assert!(!is_plain_text("   "));
        assert!(!is_plain_text("<p>x</p>"));
        assert!(is_plain_text("hello"));
        assert!(is_plain_text("a < b"));
    }

    #[test]
    fn test_bullets_become_one_list() {
        assert_eq!(convert_plain_text_to_html("- a\n- b"), "<ul><li>a</li><li>b</li></ul>");
        assert_eq!(convert_plain_text_to_html("• a\n• b"), "<ul><li>a</li><li>b</li></ul>");
    }

    #[test]
    fn test_numbered_lines_are_list_items() {
        assert_eq!(
            convert_plain_text_to_html("1. one\n2. two"),
            "<ul><li>one</li><li>two</li></ul>"
        );
    }

    #[test]
    fn test_lines_become_paragraphs() {
        assert_eq!(convert_plain_text_to_html("hello\nworld"), "<p>hello</p><p>world</p>");
    }

    #[test]
    fn test_mixed_blocks_and_blank_lines() {
        let input = "intro\n- a\n- b\n\nafter\n\n3. c";
        assert_eq!(
            convert_plain_text_to_html(input),
            "<p>intro</p><ul><li>a</li><li>b</li></ul><p>after</p><ul><li>c</li></ul>"
        );
    }

    #[test]
    fn test_blank_line_closes_list() {
        assert_eq!(
            convert_plain_text_to_html("- a\n\n- b"),
            "<ul><li>a</li></ul><ul><li>b</li></ul>"
        );
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(convert_plain_text_to_html(""), "<p></p>");
        assert_eq!(convert_plain_text_to_html(" \n "), "<p></p>");
    }

    #[test]
    fn test_escapes_special_characters() {
        assert_eq!(
            convert_plain_text_to_html("Tom & \"Jerry\" 'x'"),
            "<p>Tom &amp; &quot;Jerry&quot; &#039;x&#039;</p>"
        );
    }

    #[test]
    fn test_idempotent() {
        for input in ["- a\n- b", "hello\nworld", "", "x & y", "a\r\nb"] {
            let once = convert_plain_text_to_html(input);
            assert_eq!(convert_plain_text_to_html(&once), once);
        }
    }

    #[test]
    fn test_dash_without_space_is_a_paragraph() {
        assert_eq!(convert_plain_text_to_html("-a"), "<p>-a</p>");
    }
}
