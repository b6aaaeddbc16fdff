mod client_options {
    mod headers;
    mod proxy;
    mod redirects;
    mod request_timeout;
    mod response_size;
    mod user_agent;
}
mod errors {
    mod invalid_json;
    mod transport;
    mod unsuccessful_status;
}
mod scenarios {
    mod chunked_encoding;
    mod request_header_override;
    mod retries;
}
