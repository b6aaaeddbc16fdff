#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use hyper::StatusCode;
    use unihttp::{Backoff, Request as UnihttpRequest, RetryPolicy};

    use crate::*;

    /// Answer `503` to the first `failures` requests, then `200`.
    fn flaky_fixture(path: &'static str, failures: u32) -> (HyperFixtureHandle, Arc<AtomicU32>) {
        let hits = Arc::new(AtomicU32::new(0));
        let handle = crate::add_hyper_fixture(path, {
            let hits = Arc::clone(&hits);
            move |_| {
                let hit = hits.fetch_add(1, Ordering::SeqCst);
                async move {
                    let res = if hit < failures {
                        Response::builder()
                            .status(StatusCode::SERVICE_UNAVAILABLE)
                            .body(Full::new(Bytes::from("busy")))
                            .unwrap()
                    } else {
                        Response::new(Full::new(Bytes::from("done")))
                    };
                    (res, Ok(()))
                }
            }
        });
        (handle, hits)
    }

    fn policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            strategy: Backoff::Fixed,
            base_delay: Duration::from_millis(10),
            ..Default::default()
        }
    }

    #[test]
    fn test_retry_until_success() {
        const PATH: &str = "scenarios/retry_until_success";
        let (_handle, hits) = flaky_fixture(PATH, 2);

        let client = crate::init_builder_blocking()
            .unwrap()
            .retry(policy(3))
            .build_blocking()
            .unwrap();
        let (res, status) = client.request(UnihttpRequest::get(url(PATH))).unwrap();
        assert_eq!(status, 200);
        assert_eq!(res.text(), "done");
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_retries_exhausted() {
        const PATH: &str = "scenarios/retries_exhausted";
        let (_handle, hits) = flaky_fixture(PATH, 10);

        let client = crate::init_builder_blocking()
            .unwrap()
            .retry(policy(2))
            .build_blocking()
            .unwrap();
        let (res, status) = client.request(UnihttpRequest::get(url(PATH))).unwrap();
        assert_eq!(status, 503);
        assert_eq!(res.text(), "busy");
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_disable_retries_per_request() {
        const PATH: &str = "scenarios/disable_retries";
        let (_handle, hits) = flaky_fixture(PATH, 1);

        let client = crate::init_builder_blocking()
            .unwrap()
            .retry(policy(3))
            .build_blocking()
            .unwrap();
        let (_, status) = client
            .request(UnihttpRequest::get(url(PATH)).disable_retries(true))
            .unwrap();
        assert_eq!(status, 503);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
