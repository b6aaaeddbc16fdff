#[cfg(test)]
mod tests {
    use hyper::header::USER_AGENT;
    use unihttp::Request as UnihttpRequest;

    use crate::*;

    #[test]
    fn test_user_agent() {
        const PATH: &str = "client_options/user_agent";
        const USER_AGENT_VALUE: &str = "unihttp/1.0 (Test User Agent)";
        let _handle = crate::add_hyper_fixture(PATH, |req| async move {
            let user_agent = req.header_joined(USER_AGENT.as_str());
            (Response::new(Full::new(Bytes::from(user_agent))), Ok(()))
        });

        let client = crate::init_builder_blocking()
            .unwrap()
            .user_agent(USER_AGENT_VALUE)
            .build_blocking()
            .unwrap();
        let (res, _) = client.request(UnihttpRequest::get(url(PATH))).unwrap();
        assert_eq!(res.text(), USER_AGENT_VALUE);

        let (res, _) = client
            .request(UnihttpRequest::get(url(PATH)).with_header("User-Agent", "override/2"))
            .unwrap();
        assert_eq!(res.text(), "override/2");
    }
}
