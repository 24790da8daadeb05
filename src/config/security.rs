use axum::extract::Request;
use axum::http::header::{HeaderName, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;
use std::env;
use std::sync::OnceLock;

const X_CONTENT_TYPE_OPTIONS: &str = "x-content-type-options";
const X_FRAME_OPTIONS: &str = "x-frame-options";
const STRICT_TRANSPORT_SECURITY: &str = "strict-transport-security";
const CONTENT_SECURITY_POLICY: &str = "content-security-policy";
const REFERRER_POLICY: &str = "referrer-policy";

const NOSNIFF: &str = "nosniff";
const DENY: &str = "DENY";
const HSTS_VALUE: &str = "max-age=31536000; includeSubDomains";
const CSP_API_VALUE: &str = "default-src 'none'; frame-ancestors 'none'";
const REFERRER_POLICY_VALUE: &str = "strict-origin-when-cross-origin";

/// HSTS only makes sense behind HTTPS, so it is gated on production.
fn include_hsts() -> bool {
    static INCLUDE: OnceLock<bool> = OnceLock::new();
    *INCLUDE.get_or_init(|| {
        env::var("RUST_ENV")
            .map(|v| v.to_lowercase() == "production")
            .unwrap_or(false)
    })
}

/// Middleware adding the standard security headers for a JSON API.
pub async fn apply_security_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    set_static(headers, X_CONTENT_TYPE_OPTIONS, NOSNIFF);
    set_static(headers, X_FRAME_OPTIONS, DENY);
    set_static(headers, CONTENT_SECURITY_POLICY, CSP_API_VALUE);
    set_static(headers, REFERRER_POLICY, REFERRER_POLICY_VALUE);
    if include_hsts() {
        set_static(headers, STRICT_TRANSPORT_SECURITY, HSTS_VALUE);
    }

    response
}

fn set_static(headers: &mut axum::http::HeaderMap, name: &'static str, value: &'static str) {
    headers.insert(
        HeaderName::from_static(name),
        HeaderValue::from_static(value),
    );
}
