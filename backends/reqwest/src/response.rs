use std::future::poll_fn;
use std::pin::Pin;
use std::task::{ready, Context, Poll};

use bytes::Bytes;
use http::response::Parts;
use http_body::Body as _;
use unihttp_interface::Result as UnihttpResult;

use crate::error::ReqwestBackendError;

#[derive(Debug)]
pub(crate) struct ReqwestResponse {
    parts: Parts,
    body: Pin<Box<reqwest::Body>>,
    max_response_buffer_size: Option<u64>,
}

impl ReqwestResponse {
    pub fn new(response: reqwest::Response, max_response_buffer_size: Option<u64>) -> Self {
        let http_response: http::Response<reqwest::Body> = response.into();
        let (parts, body) = http_response.into_parts();

        Self {
            parts,
            body: Box::pin(body),
            max_response_buffer_size,
        }
    }

    pub fn status(&self) -> u16 {
        self.parts.status.as_u16()
    }

    pub fn content_length(&self) -> Option<u64> {
        self.body.size_hint().exact()
    }

    pub fn headers(&self) -> Vec<(String, String)> {
        self.parts
            .headers
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_owned(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect()
    }

    fn exceeds_limit(&self, size: u64) -> bool {
        self.max_response_buffer_size.is_some_and(|max| size > max)
    }

    pub async fn collect_all_bytes(&mut self) -> UnihttpResult<Vec<u8>> {
        if self.content_length().is_some_and(|len| self.exceeds_limit(len)) {
            return Err(ReqwestBackendError::ResponseTooLarge.into());
        }
        let mut bufs = vec![];
        let mut collected_size = 0u64;
        while let Some(frame) = self.receive_data_frame().await? {
            collected_size += frame.len() as u64;
            if self.exceeds_limit(collected_size) {
                return Err(ReqwestBackendError::ResponseTooLarge.into());
            }
            bufs.push(frame);
        }
        Ok(bufs.concat())
    }

    fn poll_receive_data_frame(
        &mut self,
        cx: &mut Context<'_>,
    ) -> Poll<Result<Option<Bytes>, ReqwestBackendError>> {
        loop {
            let frame = ready!(self.body.as_mut().poll_frame(cx));
            match frame {
                None => return Poll::Ready(Ok(None)),
                Some(Err(e)) => return Poll::Ready(Err(ReqwestBackendError::Reqwest(e))),
                Some(Ok(f)) => match f.into_data() {
                    Ok(data) if !data.is_empty() => return Poll::Ready(Ok(Some(data))),
                    // Trailers and empty data frames carry no payload.
                    _ => continue,
                },
            }
        }
    }

    async fn receive_data_frame(&mut self) -> Result<Option<Bytes>, ReqwestBackendError> {
        poll_fn(|cx| self.poll_receive_data_frame(cx)).await
    }
}
