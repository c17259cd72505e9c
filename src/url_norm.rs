//! URL normalization: the canonical string form used as the key in the
//! visited set and in the discovery tree. Two URLs are the same crawl
//! target iff their normalizations match.

use url::Url;

/// Normalizes a URL the way the engine needs it normalized: lowercase
/// scheme/host, dot-segments resolved, default ports stripped, fragment
/// dropped. Does not force `http://` and does not force `www.` — both
/// would change the identity of a page that doesn't use them.
pub fn normalize(raw: &str) -> Result<String, url::ParseError> {
    let mut url = Url::parse(raw)?;
    url.set_fragment(None);

    if let Some(port) = url.port() {
        let default_port = match url.scheme() {
            "http" => Some(80),
            "https" => Some(443),
            _ => None,
        };
        if Some(port) == default_port {
            let _ = url.set_port(None);
        }
    }

    Ok(url.as_str().to_string())
}

/// Extracts the registered host from an already-normalized URL.
pub fn host_of(normalized: &str) -> Option<String> {
    Url::parse(normalized)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
}
