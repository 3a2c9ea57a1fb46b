//! Free-text cleanup shared by the extractors

use scraper::Html;

/// Collapses runs of whitespace to single spaces and trims
///
/// Returns `None` when nothing but whitespace remains.
pub fn collapse_whitespace(s: &str) -> Option<String> {
    let collapsed = s.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed)
    }
}

/// Decodes HTML entities without interpreting tags
///
/// The text is parsed as the content of a `<textarea>`, whose raw-text
/// parsing rules decode character references but keep `<b>` and friends as
/// literal text.
pub fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    let escaped = s.replace("</", "&lt;/");
    let fragment = Html::parse_fragment(&format!("<textarea>{}</textarea>", escaped));
    fragment.root_element().text().collect()
}

/// Decodes entities and collapses whitespace
pub fn normalize_space(s: &str) -> Option<String> {
    collapse_whitespace(&decode_entities(s))
}

/// Converts an HTML snippet to plain text
///
/// Tags are dropped and entities decoded in a single parse, so text the
/// page deliberately entity-encoded (`&lt;things&gt;`) survives as literal
/// text.
pub fn html_to_text(s: &str) -> Option<String> {
    collapse_whitespace(&strip_tags(s))
}

fn strip_tags(s: &str) -> String {
    let fragment = Html::parse_fragment(s);
    fragment.root_element().text().collect::<Vec<_>>().join(" ")
}
