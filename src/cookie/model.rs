//! Cookie data type and serialization.

use crate::error::Error;

/// An immutable HTTP cookie: a name/value pair plus optional attributes.
///
/// The name must be non-empty and consist of RFC 6265 token characters.
/// Construction is the only mutation point; everything after is read-only.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cookie {
    name: String,
    value: String,
    domain: Option<String>,
    path: Option<String>,
    max_age: Option<i64>,
    secure: bool,
    http_only: bool,
}

impl Cookie {
    /// Create a cookie, validating the name.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Result<Self, Error> {
        let name = name.into();
        validate_name(&name)?;
        Ok(Self {
            name,
            value: value.into(),
            domain: None,
            path: None,
            max_age: None,
            secure: false,
            http_only: false,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Max-Age in seconds. Negative values expire the cookie immediately.
    pub fn max_age(&self) -> Option<i64> {
        self.max_age
    }

    pub fn secure(&self) -> bool {
        self.secure
    }

    pub fn http_only(&self) -> bool {
        self.http_only
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_max_age(mut self, seconds: i64) -> Self {
        self.max_age = Some(seconds);
        self
    }

    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn with_http_only(mut self, http_only: bool) -> Self {
        self.http_only = http_only;
        self
    }

    /// Serialize as a `Set-Cookie` header value.
    ///
    /// The inverse of [`crate::cookie::parse_set_cookie`] for the minimal
    /// `{name, value}` field set; attributes are appended when present.
    pub fn to_header_value(&self) -> String {
        let mut out = format!("{}={}", self.name, self.value);
        if let Some(domain) = &self.domain {
            out.push_str("; Domain=");
            out.push_str(domain);
        }
        if let Some(path) = &self.path {
            out.push_str("; Path=");
            out.push_str(path);
        }
        if let Some(max_age) = self.max_age {
            out.push_str("; Max-Age=");
            out.push_str(&max_age.to_string());
        }
        if self.secure {
            out.push_str("; Secure");
        }
        if self.http_only {
            out.push_str("; HttpOnly");
        }
        out
    }
}

impl std::fmt::Display for Cookie {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

/// Check a cookie name against RFC 6265 token rules.
pub(crate) fn validate_name(name: &str) -> Result<(), Error> {
    if name.is_empty() {
        return Err(Error::MalformedCookie("empty cookie name".into()));
    }
    if let Some(bad) = name.chars().find(|c| !is_token_char(*c)) {
        return Err(Error::MalformedCookie(format!(
            "invalid character {bad:?} in cookie name {name:?}"
        )));
    }
    Ok(())
}

/// RFC 2616 token characters: printable US-ASCII minus separators.
fn is_token_char(c: char) -> bool {
    c.is_ascii()
        && !c.is_ascii_control()
        && !matches!(
            c,
            ' ' | '\t'
                | '(' | ')' | '<' | '>' | '@'
                | ',' | ';' | ':' | '\\' | '"'
                | '/' | '[' | ']' | '?' | '='
                | '{' | '}'
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_cookie_serializes_as_pair() {
        let cookie = Cookie::new("cookie1", "test_value").unwrap();
        assert_eq!(cookie.to_header_value(), "cookie1=test_value");
    }

    #[test]
    fn attributes_are_appended_in_order() {
        let cookie = Cookie::new("session", "abc")
            .unwrap()
            .with_domain("example.com")
            .with_path("/")
            .with_max_age(3600)
            .with_secure(true)
            .with_http_only(true);
        assert_eq!(
            cookie.to_header_value(),
            "session=abc; Domain=example.com; Path=/; Max-Age=3600; Secure; HttpOnly"
        );
    }

    #[test]
    fn empty_name_is_rejected() {
        assert!(matches!(
            Cookie::new("", "v"),
            Err(Error::MalformedCookie(_))
        ));
    }

    #[test]
    fn separator_characters_are_rejected_in_names() {
        for name in ["a b", "a;b", "a=b", "a,b", "a\"b", "a\\b"] {
            assert!(
                matches!(Cookie::new(name, "v"), Err(Error::MalformedCookie(_))),
                "{name:?} should be rejected"
            );
        }
    }

    #[test]
    fn empty_value_is_allowed() {
        let cookie = Cookie::new("flag", "").unwrap();
        assert_eq!(cookie.to_header_value(), "flag=");
    }
}
