use std::fs;
use std::sync::Arc;

use unihttp_interface::client::{BuildClientResult, ClientOptions, SslVerify};
use ureq::tls::{parse_pem, PemItem, RootCerts, TlsConfig};
use ureq::{Agent, Proxy};

use crate::error::invalid_option;

/// One agent per target scheme, since ureq routes every request of an agent through the
/// same proxy.
#[derive(Clone)]
pub(crate) struct Agents {
    pub http: Agent,
    pub https: Agent,
}

impl Agents {
    pub fn for_scheme(&self, scheme: &str) -> &Agent {
        if scheme.eq_ignore_ascii_case("https") {
            &self.https
        } else {
            &self.http
        }
    }
}

fn tls_config(ssl_verify: &SslVerify) -> BuildClientResult<TlsConfig> {
    let builder = TlsConfig::builder();
    Ok(match ssl_verify {
        SslVerify::Enabled => builder.build(),
        SslVerify::Disabled => builder.disable_verification(true).build(),
        SslVerify::CaBundle(path) => {
            let pem = fs::read(path).map_err(|e| invalid_option("ssl_verify", e))?;
            let certificates = parse_pem(&pem)
                .filter_map(|item| match item {
                    Ok(PemItem::Certificate(cert)) => Some(Ok(cert.to_owned())),
                    Ok(_) => None,
                    Err(e) => Some(Err(e)),
                })
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| invalid_option("ssl_verify", e))?;
            if certificates.is_empty() {
                return Err(invalid_option(
                    "ssl_verify",
                    format!("no certificate found in {}", path.display()),
                ));
            }
            builder
                .root_certs(RootCerts::Specific(Arc::new(certificates)))
                .build()
        }
    })
}

fn proxy_for(options: &ClientOptions, scheme: &str) -> BuildClientResult<Option<Proxy>> {
    match options.proxy.for_scheme(scheme) {
        Some(proxy) => Proxy::new(proxy.url_with_credentials().as_str())
            .map(Some)
            .map_err(|e| invalid_option("proxy", e)),
        None if options.uses_environment_proxy() => Ok(Proxy::try_from_env()),
        None => Ok(None),
    }
}

fn build_agent(
    options: &ClientOptions,
    scheme: &str,
    tls: &TlsConfig,
) -> BuildClientResult<Agent> {
    let config = Agent::config_builder()
        .http_status_as_error(false)
        // Redirects are followed in `UreqClient::request`.
        .max_redirects(0)
        .max_redirects_will_error(false)
        .timeout_global(options.request_timeout)
        .timeout_connect(options.connect_timeout)
        .proxy(proxy_for(options, scheme)?)
        .tls_config(tls.clone())
        .build();
    Ok(Agent::new_with_config(config))
}

pub(crate) fn build_agents(options: &ClientOptions) -> BuildClientResult<Agents> {
    let tls = tls_config(&options.ssl_verify)?;
    Ok(Agents {
        http: build_agent(options, "http", &tls)?,
        https: build_agent(options, "https", &tls)?,
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use unihttp_interface::client::{BuildClientError, ProxySettings};

    use super::*;

    #[test]
    fn test_default_agents() {
        assert!(build_agents(&ClientOptions::default()).is_ok());
    }

    #[test]
    fn test_proxy_per_scheme() {
        let proxy = unihttp_interface::client::Proxy::parse("http://u:p@127.0.0.1:3128").unwrap();
        let options = ClientOptions {
            proxy: ProxySettings {
                http: Some(proxy),
                https: None,
            },
            use_default_proxy: false,
            ..Default::default()
        };
        assert!(proxy_for(&options, "http").unwrap().is_some());
        assert!(proxy_for(&options, "https").unwrap().is_none());
        assert!(build_agents(&options).is_ok());
    }

    #[test]
    fn test_ca_bundle_without_certificates() {
        let path = std::env::temp_dir().join(format!("unihttp-ureq-{}.pem", std::process::id()));
        fs::File::create(&path)
            .and_then(|mut f| f.write_all(b"nothing here\n"))
            .unwrap();
        let result = tls_config(&SslVerify::CaBundle(path.clone()));
        fs::remove_file(&path).ok();
        assert!(matches!(
            result,
            Err(BuildClientError::InvalidOption {
                option: "ssl_verify",
                ..
            })
        ));
    }

    #[test]
    fn test_missing_ca_bundle() {
        let result = tls_config(&SslVerify::CaBundle("/nonexistent/unihttp/ca.pem".into()));
        assert!(matches!(
            result,
            Err(BuildClientError::InvalidOption { .. })
        ));
    }
}
