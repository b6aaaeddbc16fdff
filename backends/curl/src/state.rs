#[derive(Debug, Default)]
pub(crate) struct RequestState {
    pub(crate) response_headers: Vec<(String, String)>,
    pub(crate) response_buffer: Vec<u8>,
    pub(crate) max_response_buffer_size: Option<u64>,
    pub(crate) exceeded_max_size: bool,
}

impl RequestState {
    pub(crate) fn new(max_response_buffer_size: Option<u64>) -> Self {
        Self {
            max_response_buffer_size,
            ..Default::default()
        }
    }

    /// Record one raw header line. A status line starts a new header block, so only the
    /// headers of the final response (after redirects and proxy `CONNECT`s) are kept.
    pub(crate) fn push_header_data(&mut self, data: &[u8]) {
        let line = data.strip_suffix(b"\r\n").unwrap_or(data);
        if line.starts_with(b"HTTP/") {
            self.response_headers.clear();
            return;
        }
        let Ok(line) = std::str::from_utf8(line) else {
            return;
        };
        if let Some((name, value)) = line.split_once(':') {
            self.response_headers
                .push((name.trim().into(), value.trim().into()));
        }
    }

    /// Append body data. Returns `false` once the body would exceed the size limit.
    pub(crate) fn write_data(&mut self, data: &[u8]) -> bool {
        let len = (self.response_buffer.len() + data.len()) as u64;
        if self.max_response_buffer_size.is_some_and(|max| len > max) {
            self.exceeded_max_size = true;
            return false;
        }
        self.response_buffer.extend_from_slice(data);
        true
    }
}
