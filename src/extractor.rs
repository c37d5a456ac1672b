use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use scraper::{ElementRef, Html, Selector};
use unicode_general_category::{GeneralCategory, get_general_category};

use crate::error::ExtractError;

/// Page chrome that never carries article text.
const EXCLUDED_SELECTORS: &str = "script, style, iframe, nav, header, footer, form, noscript, \
     #header, #footer, #nav, #menu, .nav, .menu, .header, .footer, \
     .sidebar, .comments, .advertisement";

/// Containers that usually hold the main text of a page.
const PRIMARY_SELECTORS: &str = "main, article, .content, .main, #content, #main";

/// How far into the document a `<meta charset>` declaration is looked for.
const META_SNIFF_LEN: usize = 1024;

/// Turns raw page bytes into cleaned plain text of at most `max_length` characters.
///
/// Stateless and safe to call from any number of tasks at once.
pub fn extract(
    html: &[u8],
    content_type: Option<&str>,
    max_length: usize,
) -> Result<String, ExtractError> {
    let decoded = decode(html, content_type)?;
    let text = extract_text(&decoded)?;
    let text = normalize_text(&text);
    Ok(truncate_at_word(&text, max_length))
}

/// Decodes `bytes` using, in order: a byte order mark, the `charset` of the
/// `Content-Type` header, a `<meta>` declaration near the top of the
/// document, and finally UTF-8 (or windows-1252 when the bytes are not
/// valid UTF-8).
pub fn decode(bytes: &[u8], content_type: Option<&str>) -> Result<String, ExtractError> {
    let encoding = match content_type.and_then(charset_from_content_type) {
        Some(label) => Encoding::for_label(label.as_bytes())
            .ok_or_else(|| ExtractError::Decode(label.to_string()))?,
        None => sniff_meta_charset(bytes)
            .and_then(|label| Encoding::for_label(label.as_bytes()))
            .unwrap_or_else(|| {
                if std::str::from_utf8(bytes).is_ok() {
                    UTF_8
                } else {
                    WINDOWS_1252
                }
            }),
    };

    // `decode` lets a BOM override the chosen encoding
    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        log::debug!("malformed {} sequences replaced", used.name());
    }
    Ok(text.into_owned())
}

fn charset_from_content_type(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        if !name.trim().eq_ignore_ascii_case("charset") {
            return None;
        }
        let value = value.trim().trim_matches(|c: char| c == '"' || c == '\'');
        (!value.is_empty()).then_some(value)
    })
}

fn sniff_meta_charset(bytes: &[u8]) -> Option<String> {
    let head = &bytes[..bytes.len().min(META_SNIFF_LEN)];
    let head = String::from_utf8_lossy(head).to_ascii_lowercase();

    let mut rest = head.as_str();
    while let Some(start) = rest.find("<meta") {
        let tag = &rest[start..];
        let tag = &tag[..tag.find('>').unwrap_or(tag.len())];
        if let Some(pos) = tag.find("charset=") {
            let label: String = tag[pos + "charset=".len()..]
                .trim_start_matches(|c: char| c == '"' || c == '\'')
                .chars()
                .take_while(|&c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.'))
                .collect();
            if !label.is_empty() {
                return Some(label);
            }
        }
        rest = &rest[start + "<meta".len()..];
    }
    None
}

fn selector(selectors: &str) -> Result<Selector, ExtractError> {
    Selector::parse(selectors).map_err(|e| ExtractError::Parse(e.to_string()))
}

/// Strips page chrome and returns the raw (unnormalized) text of the main
/// content container, or of the whole body when the page has none.
pub fn extract_text(html: &str) -> Result<String, ExtractError> {
    let excluded = selector(EXCLUDED_SELECTORS)?;
    let primary = selector(PRIMARY_SELECTORS)?;
    let body = selector("body")?;

    let mut document = Html::parse_document(html);

    let chrome: Vec<_> = document.select(&excluded).map(|el| el.id()).collect();
    for id in chrome {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }

    // `Html::select` scans every node in the arena, detached ones included,
    // so lookups walk the live tree instead
    let live: Vec<ElementRef> = document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .collect();
    let root = live
        .iter()
        .find(|el| primary.matches(el))
        .or_else(|| live.iter().find(|el| body.matches(el)));

    Ok(root
        .map(|el| el.text().collect::<String>())
        .unwrap_or_default())
}

/// Drops non-printable characters, then collapses every whitespace run to a
/// single space and trims both ends.
pub fn normalize_text(text: &str) -> String {
    let printable: String = text
        .chars()
        .filter(|&c| c.is_whitespace() || is_printable(c))
        .collect();
    printable.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Letters, marks, numbers, punctuation, symbols and the ASCII space.
fn is_printable(c: char) -> bool {
    use GeneralCategory::*;
    c == ' '
        || !matches!(
            get_general_category(c),
            Control
                | Format
                | Surrogate
                | PrivateUse
                | Unassigned
                | SpaceSeparator
                | LineSeparator
                | ParagraphSeparator
        )
}

/// Cuts `text` to at most `max_length` characters, preferring the last space
/// at or before the limit. Without such a space the cut is hard.
pub fn truncate_at_word(text: &str, max_length: usize) -> String {
    let Some((cut, at_limit)) = text.char_indices().nth(max_length) else {
        return text.to_string();
    };

    // a space sitting right at the limit is still a valid cut point
    let window = &text[..cut + at_limit.len_utf8()];
    match window.rfind(' ') {
        Some(pos) if pos > 0 => text[..pos].to_string(),
        _ => text[..cut].to_string(),
    }
}
