use axum::http::{header, HeaderMap};

/// Where a bearer token was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    Cookie,
    AuthorizationHeader,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractedToken<'a> {
    pub value: &'a str,
    pub source: TokenSource,
}

/// Locate the caller's bearer token. The named cookie wins over an
/// `Authorization: Bearer` header. Empty values count as absent.
pub fn extract_token<'a>(headers: &'a HeaderMap, cookie_name: &str) -> Option<ExtractedToken<'a>> {
    if let Some(value) = token_from_cookies(headers, cookie_name) {
        return Some(ExtractedToken { value, source: TokenSource::Cookie });
    }

    token_from_authorization(headers).map(|value| ExtractedToken {
        value,
        source: TokenSource::AuthorizationHeader,
    })
}

fn token_from_cookies<'a>(headers: &'a HeaderMap, cookie_name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| name.trim() == cookie_name)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}

fn token_from_authorization(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}
