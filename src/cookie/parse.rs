//! Cookie header parsing.
//!
//! # Responsibilities
//! - Parse a single `Set-Cookie` response header value into a [`Cookie`]
//! - Parse a `Cookie` request header into a name → cookie map
//!
//! # Design Decisions
//! - Attribute names are matched case-insensitively; unknown ones are ignored
//! - Duplicate names inside one `Cookie` header keep the last occurrence
//! - Malformed pairs are dropped with a debug log; parsing continues

use std::collections::HashMap;

use crate::cookie::model::{validate_name, Cookie};
use crate::error::Error;

/// Parse a `Set-Cookie` header value.
///
/// Fails with [`Error::MalformedCookie`] when the leading `name=value` pair
/// is missing its `=`, or the name is empty or not token-valid.
pub fn parse_set_cookie(header_value: &str) -> Result<Cookie, Error> {
    let mut segments = header_value.split(';');
    let pair = segments.next().unwrap_or("");
    let (name, value) = split_pair(pair)?;
    let mut cookie = Cookie::new(name, value)?;

    for segment in segments {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        let (key, value) = match segment.split_once('=') {
            Some((k, v)) => (k.trim(), v.trim()),
            None => (segment, ""),
        };
        match key.to_ascii_lowercase().as_str() {
            "domain" => cookie = cookie.with_domain(value),
            "path" => cookie = cookie.with_path(value),
            "max-age" => match value.parse::<i64>() {
                Ok(seconds) => cookie = cookie.with_max_age(seconds),
                Err(_) => {
                    tracing::debug!(attribute = %segment, "Ignoring unparsable Max-Age");
                }
            },
            "secure" => cookie = cookie.with_secure(true),
            "httponly" => cookie = cookie.with_http_only(true),
            _ => {
                tracing::debug!(attribute = %key, "Ignoring unknown cookie attribute");
            }
        }
    }

    Ok(cookie)
}

/// Parse a `Cookie` request header value into a name → cookie map.
///
/// A single header may carry multiple `name=value` pairs separated by `;`.
/// Duplicate names retain only the last occurrence. Malformed pairs are
/// dropped and the remainder is still parsed.
pub fn parse_cookie_header(header_value: &str) -> HashMap<String, Cookie> {
    let mut cookies = HashMap::new();
    for pair in header_value.split(';') {
        let pair = pair.trim();
        if pair.is_empty() {
            continue;
        }
        match split_pair(pair).and_then(|(name, value)| Cookie::new(name, value)) {
            Ok(cookie) => {
                cookies.insert(cookie.name().to_string(), cookie);
            }
            Err(err) => {
                tracing::debug!(pair = %pair, error = %err, "Dropping malformed cookie pair");
            }
        }
    }
    cookies
}

/// Split a `name=value` pair, trimming whitespace and optional value quotes.
fn split_pair(pair: &str) -> Result<(&str, &str), Error> {
    let (name, value) = pair
        .split_once('=')
        .ok_or_else(|| Error::MalformedCookie(format!("missing '=' in {pair:?}")))?;
    let name = name.trim();
    validate_name(name)?;
    let value = value.trim();
    let value = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value);
    Ok((name, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_minimal_pairs() {
        for raw in ["cookie1=test_value", "a=1", "flag="] {
            let cookie = parse_set_cookie(raw).unwrap();
            assert_eq!(cookie.to_header_value(), raw);
        }
    }

    #[test]
    fn parses_attributes() {
        let cookie =
            parse_set_cookie("id=42; Domain=example.com; Path=/app; Max-Age=60; Secure; HttpOnly")
                .unwrap();
        assert_eq!(cookie.name(), "id");
        assert_eq!(cookie.value(), "42");
        assert_eq!(cookie.domain(), Some("example.com"));
        assert_eq!(cookie.path(), Some("/app"));
        assert_eq!(cookie.max_age(), Some(60));
        assert!(cookie.secure());
        assert!(cookie.http_only());
    }

    #[test]
    fn attribute_names_are_case_insensitive() {
        let cookie = parse_set_cookie("id=1; PATH=/; httponly").unwrap();
        assert_eq!(cookie.path(), Some("/"));
        assert!(cookie.http_only());
    }

    #[test]
    fn unknown_attributes_are_ignored() {
        let cookie = parse_set_cookie("id=1; SameSite=Lax; Expires=whenever").unwrap();
        assert_eq!(cookie.to_header_value(), "id=1");
    }

    #[test]
    fn missing_equals_is_malformed() {
        assert!(matches!(
            parse_set_cookie("nonsense"),
            Err(Error::MalformedCookie(_))
        ));
    }

    #[test]
    fn invalid_name_is_malformed() {
        assert!(matches!(
            parse_set_cookie("=value"),
            Err(Error::MalformedCookie(_))
        ));
        assert!(matches!(
            parse_set_cookie("bad name=value"),
            Err(Error::MalformedCookie(_))
        ));
    }

    #[test]
    fn quoted_values_are_unquoted() {
        let cookie = parse_set_cookie("id=\"quoted\"").unwrap();
        assert_eq!(cookie.value(), "quoted");
    }

    #[test]
    fn cookie_header_parses_multiple_pairs() {
        let cookies = parse_cookie_header("a=1; b=2; c=3");
        assert_eq!(cookies.len(), 3);
        assert_eq!(cookies["b"].value(), "2");
    }

    #[test]
    fn duplicate_names_keep_last_occurrence() {
        let cookies = parse_cookie_header("a=first; a=second");
        assert_eq!(cookies.len(), 1);
        assert_eq!(cookies["a"].value(), "second");
    }

    #[test]
    fn malformed_pairs_are_dropped_and_parsing_continues() {
        let cookies = parse_cookie_header("good=1; nonsense; also_good=2");
        assert_eq!(cookies.len(), 2);
        assert_eq!(cookies["good"].value(), "1");
        assert_eq!(cookies["also_good"].value(), "2");
    }
}
