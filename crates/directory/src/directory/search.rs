//! Plain-text extraction of rich text for search indexing.

use std::collections::HashSet;

/// Tags whose boundaries separate words.
const BLOCK_TAGS: &[&str] = &[
    "p", "br", "div", "li", "ul", "ol", "h1", "h2", "h3", "h4", "h5", "h6", "blockquote", "tr",
    "td", "th", "hr",
];

/// Reduce rich text (HTML) to whitespace-normalized plain text.
pub fn rich_text_to_plain(html: &str) -> String {
    let spaced = space_block_tags(html);

    // Stripping every tag leaves only text nodes, re-escaped by the serializer.
    let stripped = ammonia::Builder::empty()
        .clean_content_tags(HashSet::from(["script", "style"]))
        .clean(&spaced)
        .to_string();

    let text = decode_entities(&stripped);
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Insert a space before each block-level tag so adjacent blocks do not run
/// together once tags are removed.
///
/// Stored rich text escapes a literal `<` in text as `&lt;`, so every `<`
/// seen here opens a tag or comment.
fn space_block_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len() + 16);
    let mut rest = html;
    while let Some(pos) = rest.find('<') {
        out.push_str(&rest[..pos]);
        let tag = &rest[pos + 1..];
        let name: String = tag
            .trim_start_matches('/')
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        if BLOCK_TAGS.contains(&name.as_str()) {
            out.push(' ');
        }
        out.push('<');
        rest = tag;
    }
    out.push_str(rest);
    out
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
