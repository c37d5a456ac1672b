use reqwest::Url;

/// Marker of DuckDuckGo's click-tracking redirect links,
/// e.g. `//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com%2F&rut=...`.
const REDIRECT_MARKER: &str = "duckduckgo.com/l/?uddg=";
const TARGET_PARAM: &str = "uddg=";

/// Unwraps a redirect-wrapped link to its embedded target. Anything that is
/// not a redirect link, or whose target fails to decode, comes back as is.
pub fn resolve_url(raw: &str) -> String {
    if !raw.contains(REDIRECT_MARKER) {
        return raw.to_string();
    }
    let Some(pos) = raw.find(TARGET_PARAM) else {
        return raw.to_string();
    };
    let start = pos + TARGET_PARAM.len();
    let end = raw[start..]
        .find('&')
        .map(|i| start + i)
        .unwrap_or(raw.len());
    let encoded = &raw[start..end];
    if encoded.is_empty() {
        return raw.to_string();
    }

    match urlencoding::decode(&encoded.replace('+', " ")) {
        Ok(decoded) => decoded.into_owned(),
        Err(e) => {
            log::warn!("failed to decode redirect target in {raw}: {e}");
            raw.to_string()
        }
    }
}

/// Short, human readable name for where a result came from: the first label
/// of the host without `www.`, or the first words of the title when the URL
/// has no usable host.
pub fn derive_source_name(title: &str, url: &str) -> String {
    let host = Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_string()));

    match host {
        Some(host) => {
            let domain = host.strip_prefix("www.").unwrap_or(&host);
            domain.split('.').next().unwrap_or(domain).to_string()
        }
        None => {
            let words: Vec<&str> = title.split_whitespace().collect();
            if words.len() > 2 {
                words[..2].join(" ")
            } else {
                title.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_url() {
        {
            let raw = "//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com%2Fpath%3Fa%3D1&rut=abc123";
            assert_eq!(resolve_url(raw), "https://example.com/path?a=1");
        }

        {
            let raw = "https://duckduckgo.com/l/?uddg=https%3A%2F%2Fdocs.rs%2Ftokio";
            assert_eq!(resolve_url(raw), "https://docs.rs/tokio");
        }

        {
            let raw = "https://example.com/plain";
            assert_eq!(resolve_url(raw), raw);
        }

        {
            // empty target
            let raw = "//duckduckgo.com/l/?uddg=&rut=abc";
            assert_eq!(resolve_url(raw), raw);
        }

        {
            // decodes to invalid utf-8
            let raw = "//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com%2F%FF";
            assert_eq!(resolve_url(raw), raw);
        }
    }

    #[test]
    fn test_derive_source_name() {
        assert_eq!(
            derive_source_name("Ignored", "https://www.wikipedia.org/wiki/Rust"),
            "wikipedia"
        );
        assert_eq!(
            derive_source_name("Ignored", "https://en.wikipedia.org/wiki/Rust"),
            "en"
        );
        assert_eq!(
            derive_source_name("Ignored", "http://localhost:8080/x"),
            "localhost"
        );
        assert_eq!(
            derive_source_name("The Rust Programming Language", "not a url"),
            "The Rust"
        );
        assert_eq!(derive_source_name("Rust Book", "::::"), "Rust Book");
        assert_eq!(derive_source_name("", ""), "");
    }
}
