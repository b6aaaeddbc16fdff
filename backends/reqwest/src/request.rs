use http::header::CONTENT_TYPE;
use http::{HeaderName, HeaderValue};
use reqwest::{Client, RequestBuilder};
use unihttp_interface::{Method, Request};

use crate::error::{ReqwestBackendError, Result};

pub fn convert_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Head => reqwest::Method::HEAD,
        Method::Options => reqwest::Method::OPTIONS,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}

fn convert_header(name: &str, value: &str) -> Result<(HeaderName, HeaderValue)> {
    let header_name = HeaderName::from_bytes(name.as_bytes())
        .map_err(|_| ReqwestBackendError::InvalidHeaderName(name.into()))?;
    let header_value = HeaderValue::from_str(value)
        .map_err(|_| ReqwestBackendError::InvalidHeaderValue(name.into()))?;
    Ok((header_name, header_value))
}

pub fn build_request(client: &Client, req: &Request) -> unihttp_interface::Result<RequestBuilder> {
    let url = req.url_with_query()?;
    let mut request_builder = client.request(convert_method(req.method), url);

    for (name, value) in &req.headers {
        let (name, value) = convert_header(name, value)?;
        request_builder = request_builder.header(name, value);
    }

    if let Some(body) = &req.body {
        if !req.has_header(CONTENT_TYPE.as_str()) {
            let content_type = HeaderValue::from_str(body.content_type()).map_err(|_| {
                ReqwestBackendError::InvalidHeaderValue(CONTENT_TYPE.as_str().into())
            })?;
            request_builder = request_builder.header(CONTENT_TYPE, content_type);
        }
        request_builder = request_builder.body(body.to_bytes().into_owned());
    }

    if let Some(timeout) = req.timeout {
        request_builder = request_builder.timeout(timeout);
    }

    Ok(request_builder)
}
