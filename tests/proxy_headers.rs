use axum::http::{HeaderMap, HeaderName, HeaderValue, header};
use mdx_guard::infra::proxy::sanitize_proxy_headers;

fn upstream_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    headers.append(header::SET_COOKIE, HeaderValue::from_static("session=abc"));
    headers.append(header::SET_COOKIE, HeaderValue::from_static("csrf=def"));
    headers.insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static("Bearer realm=\"api\""),
    );
    headers
}

#[test]
fn strips_credential_headers_and_keeps_the_rest() {
    let sanitized = sanitize_proxy_headers(&upstream_headers());

    assert_eq!(
        sanitized.get(header::CONTENT_TYPE),
        Some(&HeaderValue::from_static("application/json"))
    );
    assert_eq!(
        sanitized.get(header::CACHE_CONTROL),
        Some(&HeaderValue::from_static("no-store"))
    );
    assert!(!sanitized.contains_key(header::SET_COOKIE));
    assert!(!sanitized.contains_key(header::WWW_AUTHENTICATE));
    assert_eq!(sanitized.len(), 2);
}

#[test]
fn matching_ignores_header_name_case() {
    let mut headers = HeaderMap::new();
    let name = HeaderName::from_bytes(b"Set-Cookie").expect("valid header name");
    headers.insert(name, HeaderValue::from_static("a=1"));
    headers.insert(
        HeaderName::from_bytes(b"X-Request-Id").expect("valid header name"),
        HeaderValue::from_static("42"),
    );

    let sanitized = sanitize_proxy_headers(&headers);

    assert!(sanitized.get("set-cookie").is_none());
    assert_eq!(
        sanitized.get("x-request-id"),
        Some(&HeaderValue::from_static("42"))
    );
}

#[test]
fn input_headers_are_left_untouched() {
    let headers = upstream_headers();
    let _ = sanitize_proxy_headers(&headers);

    assert_eq!(headers.get_all(header::SET_COOKIE).iter().count(), 2);
}
