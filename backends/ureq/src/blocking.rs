use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use http::header::{
    AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE, COOKIE, LOCATION, PROXY_AUTHORIZATION,
    USER_AGENT,
};
use http::{HeaderMap, StatusCode};
use unihttp_interface::blocking::{BlockingClient, BlockingResponse};
use unihttp_interface::client::{BuildClientResult, ClientOptions};
use unihttp_interface::{Error as UnihttpError, Request, Result as UnihttpResult};
use ureq::{Agent, AsSendBody};
use url::Url;

use crate::client::{build_agents, Agents};
use crate::error::map_ureq_error;

/// A blocking client performing requests on ureq agents.
#[derive(Clone)]
pub struct UreqClient {
    agents: Agents,
    options: Arc<ClientOptions>,
}

/// A fully received ureq response.
pub struct UreqResponse {
    status: u16,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

/// One request of a redirect chain.
struct Hop {
    method: http::Method,
    url: Url,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl Hop {
    fn to_request<S>(&self, body: S) -> UnihttpResult<http::Request<S>> {
        let mut request = http::Request::builder()
            .method(self.method.clone())
            .uri(self.url.as_str())
            .body(body)
            .map_err(|e| UnihttpError::InvalidRequest(e.to_string()))?;
        *request.headers_mut() = self.headers.clone();
        Ok(request)
    }

    /// The request to send after a redirect response pointing at `location`.
    fn redirect(self, status: StatusCode, location: &str) -> UnihttpResult<Self> {
        let url = self
            .url
            .join(location)
            .map_err(|e| UnihttpError::InvalidUrl(format!("{location}: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(UnihttpError::InvalidUrl(format!(
                "redirect to unsupported scheme: {url}"
            )));
        }

        let Hop {
            mut method,
            url: previous,
            mut headers,
            mut body,
        } = self;
        let becomes_get = match status.as_u16() {
            301 | 302 => method == http::Method::POST,
            303 => method != http::Method::HEAD,
            _ => false,
        };
        if becomes_get {
            method = http::Method::GET;
            body.clear();
            headers.remove(CONTENT_TYPE);
            headers.remove(CONTENT_LENGTH);
        }
        if url.origin() != previous.origin() {
            headers.remove(AUTHORIZATION);
            headers.remove(PROXY_AUTHORIZATION);
            headers.remove(COOKIE);
        }
        Ok(Self {
            method,
            url,
            headers,
            body,
        })
    }
}

fn redirect_location(response: &http::Response<ureq::Body>) -> Option<String> {
    if !matches!(response.status().as_u16(), 301 | 302 | 303 | 307 | 308) {
        return None;
    }
    response
        .headers()
        .get(LOCATION)
        .and_then(|location| location.to_str().ok())
        .map(str::to_owned)
}

impl UreqClient {
    /// Create a client with the given options.
    pub fn new(options: ClientOptions) -> BuildClientResult<Self> {
        let agents = build_agents(&options)?;
        Ok(Self {
            agents,
            options: Arc::new(options),
        })
    }

    fn build_request(&self, req: &Request) -> UnihttpResult<http::Request<Vec<u8>>> {
        let url = req.url_with_query()?;
        let mut builder = http::Request::builder()
            .method(req.method.as_str())
            .uri(url.as_str());

        for (name, value) in self.options.default_headers_except(&req.headers) {
            builder = builder.header(name, value);
        }
        if let Some(user_agent) = &self.options.user_agent {
            if !req.has_header(USER_AGENT.as_str()) {
                builder = builder.header(USER_AGENT, user_agent.as_str());
            }
        }
        for (name, value) in &req.headers {
            builder = builder.header(&**name, &**value);
        }

        let body = match &req.body {
            Some(body) => {
                if !req.has_header(CONTENT_TYPE.as_str()) {
                    builder = builder.header(CONTENT_TYPE, body.content_type());
                }
                body.to_bytes().into_owned()
            }
            None => vec![],
        };
        builder
            .body(body)
            .map_err(|e| UnihttpError::InvalidRequest(e.to_string()))
    }

    fn send_hop(
        &self,
        hop: &Hop,
        timeout: Option<Duration>,
    ) -> UnihttpResult<http::Response<ureq::Body>> {
        let agent = self.agents.for_scheme(hop.url.scheme());
        if hop.body.is_empty() {
            send(agent, hop.to_request(())?, timeout)
        } else {
            send(agent, hop.to_request(hop.body.as_slice())?, timeout)
        }
    }
}

fn send<S: AsSendBody>(
    agent: &Agent,
    request: http::Request<S>,
    timeout: Option<Duration>,
) -> UnihttpResult<http::Response<ureq::Body>> {
    let request = match timeout {
        Some(timeout) => agent
            .configure_request(request)
            .timeout_global(Some(timeout))
            .build(),
        None => request,
    };
    agent.run(request).map_err(map_ureq_error)
}

impl BlockingClient for UreqClient {
    type Response = UreqResponse;

    fn describe(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UreqClient")
    }

    fn request(&self, req: Request) -> UnihttpResult<UreqResponse> {
        let (parts, body) = self.build_request(&req)?.into_parts();
        let mut hop = Hop {
            method: parts.method,
            url: req.url_with_query()?,
            headers: parts.headers,
            body,
        };

        let mut redirects = 0;
        let mut response = loop {
            let response = self.send_hop(&hop, req.timeout)?;
            let (Some(limit), Some(location)) =
                (self.options.redirect_limit(), redirect_location(&response))
            else {
                break response;
            };
            if redirects >= limit {
                return Err(UnihttpError::TooManyRedirects);
            }
            redirects += 1;
            tracing::trace!(%location, redirects, "following redirect");
            hop = hop.redirect(response.status(), &location)?;
        };

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_owned(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let limit = self.options.max_response_buffer_size;
        if let (Some(limit), Some(len)) = (limit, response.body().content_length()) {
            if len > limit {
                return Err(UnihttpError::ResponseTooLarge);
            }
        }
        // ureq rejects a body once it reaches the configured limit.
        let body = response
            .body_mut()
            .with_config()
            .limit(limit.map_or(u64::MAX, |limit| limit.saturating_add(1)))
            .read_to_vec()
            .map_err(map_ureq_error)?;
        if limit.is_some_and(|limit| body.len() as u64 > limit) {
            return Err(UnihttpError::ResponseTooLarge);
        }

        Ok(UreqResponse {
            status,
            headers,
            body,
        })
    }
}

impl BlockingResponse for UreqResponse {
    fn describe(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UreqResponse({})", self.status)
    }

    fn status(&self) -> u16 {
        self.status
    }

    fn content_length(&self) -> Option<u64> {
        Some(self.body.len() as u64)
    }

    fn headers(&self) -> Vec<(String, String)> {
        self.headers.clone()
    }

    fn bytes(&mut self) -> UnihttpResult<Vec<u8>> {
        Ok(std::mem::take(&mut self.body))
    }
}
