use curl::easy::{Easy2, List};
use unihttp_interface::client::ClientOptions;
use unihttp_interface::{Method, Request, Result as UnihttpResult};

use crate::error::IntoUnihttpResult;
use crate::handler::Collector;

/// Apply a request and the client options to a freshly reset easy handle.
pub(crate) fn populate_request(
    easy: &mut Easy2<Collector>,
    req: &Request,
    options: &ClientOptions,
) -> UnihttpResult<()> {
    let url = req.url_with_query()?;
    easy.url(url.as_str()).into_unihttp_result("set url")?;

    match options.proxy.for_scheme(url.scheme()) {
        Some(proxy) => {
            easy.proxy(proxy.url().as_str())
                .into_unihttp_result("set proxy")?;
            if let Some(credentials) = proxy.credentials() {
                easy.proxy_username(&credentials.username)
                    .into_unihttp_result("set proxy username")?;
                easy.proxy_password(&credentials.password)
                    .into_unihttp_result("set proxy password")?;
            }
        }
        None if !options.uses_environment_proxy() => {
            easy.noproxy("*").into_unihttp_result("set noproxy")?;
        }
        None => {}
    }

    if !options.ssl_verify.is_enabled() {
        easy.ssl_verify_peer(false)
            .into_unihttp_result("disable peer verification")?;
        easy.ssl_verify_host(false)
            .into_unihttp_result("disable host verification")?;
    } else if let Some(ca_bundle) = options.ssl_verify.ca_bundle() {
        easy.cainfo(ca_bundle).into_unihttp_result("set cainfo")?;
    }

    if let Some(timeout) = req.timeout.or(options.request_timeout) {
        easy.timeout(timeout).into_unihttp_result("set timeout")?;
    }
    if let Some(timeout) = options.connect_timeout {
        easy.connect_timeout(timeout)
            .into_unihttp_result("set connect timeout")?;
    }
    if let Some(max) = options.redirect_limit() {
        easy.follow_location(true)
            .into_unihttp_result("set follow location")?;
        easy.max_redirections(max)
            .into_unihttp_result("set max redirections")?;
    }
    if let Some(user_agent) = options.user_agent.as_deref() {
        easy.useragent(user_agent)
            .into_unihttp_result("set user agent")?;
    }
    easy.accept_encoding("")
        .into_unihttp_result("set accept encoding")?;

    let need_body = matches!(req.method, Method::Post | Method::Put | Method::Patch);
    match req.method {
        Method::Get if req.body.is_none() => easy.get(true),
        Method::Head => easy.nobody(true),
        Method::Post => easy.post(true),
        method => easy.custom_request(method.as_str()),
    }
    .into_unihttp_result("set method")?;

    let mut headers = List::new();
    for (name, value) in options.default_headers_except(&req.headers) {
        headers
            .append(&format!("{name}: {value}"))
            .into_unihttp_result("append header")?;
    }
    for (name, value) in &req.headers {
        headers
            .append(&format!("{name}: {value}"))
            .into_unihttp_result("append header")?;
    }
    // Disable `Expect: 100-continue` on large bodies.
    headers.append("Expect:").into_unihttp_result("append header")?;
    match &req.body {
        Some(body) => {
            if !req.has_header("content-type") {
                headers
                    .append(&format!("Content-Type: {}", body.content_type()))
                    .into_unihttp_result("append header")?;
            }
            easy.post_fields_copy(&body.to_bytes())
                .into_unihttp_result("set body")?;
        }
        // Workaround for https://github.com/curl/curl/issues/1625
        None if need_body => easy.post_fields_copy(b"").into_unihttp_result("set body")?,
        None => {}
    }
    easy.http_headers(headers)
        .into_unihttp_result("set headers")?;
    Ok(())
}
