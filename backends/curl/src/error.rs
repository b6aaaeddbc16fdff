use unihttp_interface::{Error as UnihttpError, Result as UnihttpResult};

pub(crate) trait IntoUnihttpResult<T> {
    fn into_unihttp_result(self, ctx: &str) -> UnihttpResult<T>;
}

impl<T> IntoUnihttpResult<T> for Result<T, curl::Error> {
    fn into_unihttp_result(self, ctx: &str) -> UnihttpResult<T> {
        self.map_err(|e| map_curl_error(ctx, &e))
    }
}

fn map_curl_error(ctx: &str, e: &curl::Error) -> UnihttpError {
    let message = match e.extra_description() {
        Some(extra) => format!("{ctx}: {}: {extra}", e.description()),
        None => format!("{ctx}: {}", e.description()),
    };
    if e.is_operation_timedout() {
        UnihttpError::Timeout
    } else if e.is_url_malformed() || e.is_unsupported_protocol() {
        UnihttpError::InvalidUrl(message)
    } else if e.is_couldnt_resolve_host()
        || e.is_couldnt_resolve_proxy()
        || e.is_couldnt_connect()
        || e.is_send_error()
        || e.is_recv_error()
        || e.is_got_nothing()
        || e.is_partial_file()
    {
        UnihttpError::Connection(message)
    } else if e.is_ssl_connect_error()
        || e.is_peer_failed_verification()
        || e.is_ssl_certproblem()
        || e.is_ssl_cipher()
        || e.is_ssl_cacert()
        || e.is_ssl_cacert_badfile()
    {
        UnihttpError::Ssl(message)
    } else if e.is_too_many_redirects() {
        UnihttpError::TooManyRedirects
    } else {
        UnihttpError::Library(message)
    }
}
