use std::collections::BTreeMap;

use hyper::{body, Request};

pub trait RequestExt {
    /// Decoded query string pairs. Later duplicates win.
    fn query_map(&self) -> BTreeMap<String, String>;

    /// All values of a header, joined with `"; "`.
    fn header_joined(&self, name: &str) -> String;
}

impl RequestExt for Request<body::Incoming> {
    fn query_map(&self) -> BTreeMap<String, String> {
        form_urlencoded::parse(self.uri().query().unwrap_or_default().as_bytes())
            .into_owned()
            .collect()
    }

    fn header_joined(&self, name: &str) -> String {
        self.headers()
            .get_all(name)
            .iter()
            .map(|v| v.to_str().unwrap_or_default())
            .collect::<Vec<_>>()
            .join("; ")
    }
}
