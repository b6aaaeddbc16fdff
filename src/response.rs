//! Normalized responses.

use std::fmt;

use encoding_rs::{Encoding, UTF_8};
use mime::Mime;
use serde::de::DeserializeOwned;
use unihttp_interface::blocking::AnyBlockingResponse;

use crate::StatusCode;

/// A fully received HTTP response, independent of the backend that produced it.
///
/// Header names are stored lowercased, in the order the backend reported them.
#[derive(Clone, PartialEq, Eq)]
pub struct HttpResponse {
    status: StatusCode,
    headers: Vec<(String, String)>,
    content: Vec<u8>,
}

impl HttpResponse {
    /// Create a response from its parts.
    pub fn new<K, V>(
        status: impl Into<StatusCode>,
        headers: impl IntoIterator<Item = (K, V)>,
        content: impl Into<Vec<u8>>,
    ) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        Self {
            status: status.into(),
            headers: headers
                .into_iter()
                .map(|(name, value)| (name.as_ref().to_ascii_lowercase(), value.into()))
                .collect(),
            content: content.into(),
        }
    }

    /// Drain a backend response.
    pub(crate) fn from_backend(
        mut inner: Box<dyn AnyBlockingResponse>,
    ) -> unihttp_interface::Result<Self> {
        let content = inner.bytes()?;
        Ok(Self::new(inner.status(), inner.headers(), content))
    }

    /// The response status.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// All headers, names lowercased.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// The first value of a header, looked up case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.header_all(name).next()
    }

    /// Every value of a header, looked up case-insensitively.
    pub fn header_all<'a, 'n>(&'a self, name: &'n str) -> impl Iterator<Item = &'a str> + 'n
    where
        'a: 'n,
    {
        self.headers
            .iter()
            .filter(move |(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// The `content-type` header.
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// The declared `content-length`, or the length of the received body.
    pub fn content_length(&self) -> u64 {
        self.header("content-length")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(self.content.len() as u64)
    }

    /// The raw body.
    pub fn bytes(&self) -> &[u8] {
        &self.content
    }

    /// Take the raw body.
    pub fn into_bytes(self) -> Vec<u8> {
        self.content
    }

    fn mime(&self) -> Option<Mime> {
        self.content_type()?.parse().ok()
    }

    fn encoding(&self) -> &'static Encoding {
        self.mime()
            .and_then(|mime| {
                mime.get_param(mime::CHARSET)
                    .and_then(|charset| Encoding::for_label(charset.as_str().as_bytes()))
            })
            .unwrap_or(UTF_8)
    }

    /// The body decoded as text.
    ///
    /// A byte order mark takes precedence over the declared `charset`, which takes
    /// precedence over UTF-8. Malformed sequences are replaced with U+FFFD.
    pub fn text(&self) -> String {
        let (text, _, _) = self.encoding().decode(&self.content);
        text.into_owned()
    }

    /// Whether the content type declares JSON (`application/json` or a `+json` suffix).
    pub fn is_json(&self) -> bool {
        self.mime().is_some_and(|mime| {
            mime.subtype() == mime::JSON || mime.suffix().is_some_and(|s| s == mime::JSON)
        })
    }

    /// Deserialize the body as JSON into `T`, regardless of the declared content type.
    pub fn json<T: DeserializeOwned>(&self) -> crate::Result<T> {
        Ok(serde_json::from_slice(strip_utf8_bom(&self.content))?)
    }

    /// Parse the body as a generic JSON value.
    pub fn json_value(&self) -> crate::Result<serde_json::Value> {
        self.json()
    }

    /// At most `max_chars` characters of the text body, with `...` appended when cut.
    pub fn excerpt(&self, max_chars: usize) -> String {
        let text = self.text();
        match text.char_indices().nth(max_chars) {
            Some((end, _)) => format!("{}...", &text[..end]),
            None => text,
        }
    }
}

fn strip_utf8_bom(content: &[u8]) -> &[u8] {
    content.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(content)
}

impl fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("content_length", &self.content.len())
            .finish()
    }
}
