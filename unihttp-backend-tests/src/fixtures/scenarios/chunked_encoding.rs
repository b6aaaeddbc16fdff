#[cfg(test)]
mod tests {
    use futures::stream;
    use hyper::Method;
    use unihttp::Request as UnihttpRequest;

    use crate::*;

    #[test]
    fn test_chunked_encoding() {
        const PATH: &str = "scenarios/chunked_encoding";
        const CHUNKS: [&str; 4] = ["Hello", ", ", "chunked ", "world!"];

        let _handle = crate::add_hyper_fixture(PATH, |req| async move {
            let stream = stream::iter(CHUNKS.iter().map(|chunk| {
                let chunk = Bytes::copy_from_slice(chunk.as_bytes());
                Ok::<_, hyper::Error>(hyper::body::Frame::data(chunk))
            }));
            let res = Response::new(http_body_util::StreamBody::new(stream).boxed());
            (res, (req.method() == Method::GET).then_some(()).ok_or(req))
        });

        let client = crate::init_builder_blocking()
            .unwrap()
            .build_blocking()
            .unwrap();
        let (res, status) = client.request(UnihttpRequest::get(url(PATH))).unwrap();
        assert_eq!(status, 200);
        assert_eq!(res.text(), CHUNKS.concat());
        assert_eq!(res.content_length(), CHUNKS.concat().len() as u64);
    }

    #[test]
    fn test_chunked_exceeds_limit() {
        const PATH: &str = "scenarios/chunked_exceeds_limit";

        let _handle = crate::add_hyper_fixture(PATH, |_| async {
            let stream = stream::iter((0..8).map(|_| {
                Ok::<_, hyper::Error>(hyper::body::Frame::data(Bytes::from_static(b"0123456789")))
            }));
            let res = Response::new(http_body_util::StreamBody::new(stream).boxed());
            (res, Ok(()))
        });

        let client = crate::init_builder_blocking()
            .unwrap()
            .max_response_size(25)
            .build_blocking()
            .unwrap();
        let err = client.request(UnihttpRequest::get(url(PATH))).unwrap_err();
        assert!(
            matches!(
                err.transport(),
                Some(unihttp_interface::Error::ResponseTooLarge)
            ),
            "{err:?}"
        );
    }
}
