use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

use crate::body::Body;
use crate::Error;

/// HTTP request methods accepted by every backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// `GET`
    Get,
    /// `HEAD`
    Head,
    /// `OPTIONS`
    Options,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `PATCH`
    Patch,
    /// `DELETE`
    Delete,
}

impl Method {
    /// The uppercase method token.
    pub const fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        const METHODS: [Method; 7] = [
            Method::Get,
            Method::Head,
            Method::Options,
            Method::Post,
            Method::Put,
            Method::Patch,
            Method::Delete,
        ];
        let s = s.trim();
        METHODS
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::InvalidRequest(format!("{s:?} is not a recognized HTTP method")))
    }
}

/// A request handed to a backend.
#[derive(Debug, Clone)]
pub struct Request {
    /// Request method.
    pub method: Method,
    /// Absolute `http` or `https` URL, possibly with a query string already.
    pub url: Cow<'static, str>,
    /// Query parameters appended to `url`.
    pub parameters: Vec<(Cow<'static, str>, Cow<'static, str>)>,
    /// Request headers, in order. Names are sent as given.
    pub headers: Vec<(Cow<'static, str>, Cow<'static, str>)>,
    /// Optional request body.
    pub body: Option<Body>,
    /// Overrides the client-wide request timeout for this request only.
    pub timeout: Option<Duration>,
}

impl Request {
    /// Parse `url`, check its scheme and append `parameters` to its query string.
    pub fn url_with_query(&self) -> crate::Result<Url> {
        let mut url =
            Url::parse(&self.url).map_err(|e| Error::InvalidUrl(format!("{}: {e}", self.url)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::InvalidUrl(format!(
                "{}: unsupported scheme {}",
                self.url,
                url.scheme()
            )));
        }
        if !self.parameters.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(self.parameters.iter().map(|(k, v)| (&**k, &**v)));
        }
        Ok(url)
    }

    /// Whether a header with the given name (case-insensitive) is set on this request.
    pub fn has_header(&self, name: &str) -> bool {
        self.headers.iter().any(|(n, _)| n.eq_ignore_ascii_case(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(url: &'static str) -> Request {
        Request {
            method: Method::Get,
            url: url.into(),
            parameters: vec![],
            headers: vec![],
            body: None,
            timeout: None,
        }
    }

    #[test]
    fn test_parse_method() {
        assert_eq!("get".parse::<Method>().unwrap(), Method::Get);
        assert_eq!("Patch".parse::<Method>().unwrap(), Method::Patch);
        assert_eq!(" OPTIONS ".parse::<Method>().unwrap(), Method::Options);
        assert!(matches!(
            "TRACE".parse::<Method>(),
            Err(Error::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_url_with_query_appends_parameters() {
        let mut req = request("http://example.test/search?lang=en");
        req.parameters = vec![("q".into(), "x y".into()), ("page".into(), "2".into())];
        let url = req.url_with_query().unwrap();
        assert_eq!(url.as_str(), "http://example.test/search?lang=en&q=x+y&page=2");
    }

    #[test]
    fn test_url_with_query_without_parameters() {
        let url = request("https://example.test/").url_with_query().unwrap();
        assert_eq!(url.as_str(), "https://example.test/");
        assert_eq!(url.query(), None);
    }

    #[test]
    fn test_url_with_query_rejects_bad_urls() {
        assert!(matches!(
            request("example.test").url_with_query(),
            Err(Error::InvalidUrl(_))
        ));
        assert!(matches!(
            request("ftp://example.test/file").url_with_query(),
            Err(Error::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_has_header_is_case_insensitive() {
        let mut req = request("http://example.test");
        req.headers.push(("X-API-KEY".into(), "k".into()));
        assert!(req.has_header("x-api-key"));
        assert!(!req.has_header("authorization"));
    }
}
