//! Parsing of YouTube's timedtext caption XML into plain text.

use once_cell::sync::Lazy;
use regex::Regex;

static TEXT_ELEMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<text\b[^>]*>(.*?)</text>").expect("valid text element pattern"));
static INLINE_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid inline tag pattern"));

/// Extract caption snippets from a timedtext document, in document order
pub fn parse_snippets(xml: &str) -> Vec<String> {
    TEXT_ELEMENT
        .captures_iter(xml)
        .filter_map(|caps| caps.get(1))
        .map(|body| {
            // Bodies arrive escaped twice: once by the XML and once inside it
            let unescaped = decode_entities(&decode_entities(body.as_str()));
            INLINE_TAG.replace_all(&unescaped, "").trim().to_string()
        })
        .filter(|snippet| !snippet.is_empty())
        .collect()
}

/// Caption snippets joined one per line
pub fn to_plain_text(xml: &str) -> String {
    parse_snippets(xml).join("\n")
}

/// Decode the HTML entities YouTube emits in caption text
pub fn decode_entities(text: &str) -> String {
    html_escape::decode_html_entities(text).into_owned()
}
