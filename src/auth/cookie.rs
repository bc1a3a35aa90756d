use std::time::Duration;

use axum::http::{header, HeaderMap, HeaderValue};

pub const REFRESH_COOKIE: &str = "refreshToken";

/// `Set-Cookie` value carrying the refresh token: HTTP-only, secure, same-site.
pub fn refresh_cookie(token: &str, max_age: Duration) -> anyhow::Result<HeaderValue> {
    let value = format!(
        "{REFRESH_COOKIE}={token}; Path=/; Max-Age={}; HttpOnly; Secure; SameSite=Strict",
        max_age.as_secs()
    );
    Ok(HeaderValue::from_str(&value)?)
}

/// First value of cookie `name` across all `Cookie` headers.
pub fn read_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v)
        .filter(|v| !v.is_empty())
}
