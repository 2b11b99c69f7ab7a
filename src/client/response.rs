//! Aggregated response metadata.

use http::header::SET_COOKIE;
use http::{HeaderMap, StatusCode};

use crate::cookie::CookieJar;

/// Status and headers of a completed response.
///
/// Handed to the caller's aggregator together with the body bytes; the
/// cookie jar is derived on demand from the `Set-Cookie` headers.
#[derive(Debug, Clone)]
pub struct ResponseMetadata {
    status: StatusCode,
    headers: HeaderMap,
}

impl ResponseMetadata {
    pub(crate) fn new(status: StatusCode, headers: HeaderMap) -> Self {
        Self { status, headers }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// First value of the given header, when it is valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Cookies issued by this response, from every `Set-Cookie` header.
    ///
    /// Duplicate names all appear in that name's set; nothing is coalesced.
    /// Malformed headers are dropped.
    pub fn cookies(&self) -> CookieJar {
        CookieJar::from_set_cookie_values(
            self.headers
                .get_all(SET_COOKIE)
                .iter()
                .filter_map(|v| v.to_str().ok()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    fn metadata(set_cookie_values: &[&str]) -> ResponseMetadata {
        let mut headers = HeaderMap::new();
        for value in set_cookie_values {
            headers.append(SET_COOKIE, HeaderValue::from_str(value).unwrap());
        }
        ResponseMetadata::new(StatusCode::OK, headers)
    }

    #[test]
    fn cookies_are_parsed_from_every_set_cookie_header() {
        let jar = metadata(&["cookie1=test_value", "cookie2=other"]).cookies();
        assert_eq!(jar.name_count(), 2);
        assert!(jar.contains_value("cookie1", "test_value"));
        assert!(jar.contains_value("cookie2", "other"));
    }

    #[test]
    fn duplicate_names_are_not_coalesced() {
        let jar = metadata(&["name=a", "name=b; Path=/x"]).cookies();
        assert_eq!(jar.get("name").unwrap().len(), 2);
    }

    #[test]
    fn malformed_headers_are_dropped() {
        let jar = metadata(&["good=1", "nonsense"]).cookies();
        assert_eq!(jar.len(), 1);
    }

    #[test]
    fn no_set_cookie_headers_means_an_empty_jar() {
        assert!(metadata(&[]).cookies().is_empty());
    }
}
