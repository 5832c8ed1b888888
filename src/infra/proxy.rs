//! Header filtering for responses relayed from the upstream API.

use axum::http::{HeaderMap, HeaderName, header};

/// Headers the relaying layer handles itself and must never forward verbatim.
const STRIPPED_HEADERS: [HeaderName; 2] = [header::SET_COOKIE, header::WWW_AUTHENTICATE];

/// Copies `headers` without `set-cookie` and `www-authenticate`.
///
/// Header names are case-insensitive by construction. Every value of a
/// repeated header is kept; nothing is merged or split.
pub fn sanitize_proxy_headers(headers: &HeaderMap) -> HeaderMap {
    let mut sanitized = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        if STRIPPED_HEADERS.contains(name) {
            continue;
        }
        sanitized.append(name.clone(), value.clone());
    }
    sanitized
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn keeps_every_value_of_repeated_headers() {
        let mut headers = HeaderMap::new();
        headers.append(header::VARY, HeaderValue::from_static("accept"));
        headers.append(header::VARY, HeaderValue::from_static("origin"));
        headers.append(header::SET_COOKIE, HeaderValue::from_static("a=1"));
        headers.append(header::SET_COOKIE, HeaderValue::from_static("b=2"));

        let sanitized = sanitize_proxy_headers(&headers);

        let vary: Vec<_> = sanitized.get_all(header::VARY).iter().collect();
        assert_eq!(vary, vec!["accept", "origin"]);
        assert!(!sanitized.contains_key(header::SET_COOKIE));
    }
}
