use std::fs;
use std::sync::Arc;

use http::{HeaderMap, HeaderName, HeaderValue};
use reqwest::redirect::Policy;
use reqwest::{Certificate, Client, ClientBuilder, Proxy};
use unihttp_interface::client::{ClientOptions, SslVerify};

use crate::blocking::ManagedRuntime;
use crate::error::{ReqwestBackendError, Result};

#[derive(Clone)]
pub struct ReqwestClient {
    pub(crate) client: Client,
    pub(crate) max_response_buffer_size: Option<u64>,
    pub(crate) managed_runtime: Arc<ManagedRuntime>,
}

impl ReqwestClient {
    pub fn new(options: &ClientOptions) -> Result<Self> {
        let client = build_reqwest_client(options)?;
        Ok(Self {
            client,
            max_response_buffer_size: options.max_response_buffer_size,
            managed_runtime: Arc::default(),
        })
    }
}

fn default_headers(options: &ClientOptions) -> Result<HeaderMap> {
    options
        .default_headers
        .iter()
        .map(|(k, v)| {
            Ok::<_, ReqwestBackendError>((
                HeaderName::from_bytes(k.as_bytes())
                    .map_err(|_| ReqwestBackendError::InvalidHeaderName(k.into()))?,
                HeaderValue::from_str(v)
                    .map_err(|_| ReqwestBackendError::InvalidHeaderValue(k.into()))?,
            ))
        })
        .collect()
}

fn apply_proxy(mut builder: ClientBuilder, options: &ClientOptions) -> Result<ClientBuilder> {
    // `no_proxy` drops every proxy added before it, so it has to come first.
    if !options.uses_environment_proxy() {
        builder = builder.no_proxy();
    }
    let settings = &options.proxy;
    if let Some(proxy) = settings.shared() {
        builder = builder.proxy(Proxy::all(proxy.url_with_credentials().as_str())?);
    } else {
        if let Some(proxy) = &settings.http {
            builder = builder.proxy(Proxy::http(proxy.url_with_credentials().as_str())?);
        }
        if let Some(proxy) = &settings.https {
            builder = builder.proxy(Proxy::https(proxy.url_with_credentials().as_str())?);
        }
    }
    Ok(builder)
}

fn apply_tls(builder: ClientBuilder, ssl_verify: &SslVerify) -> Result<ClientBuilder> {
    Ok(match ssl_verify {
        SslVerify::Enabled => builder,
        SslVerify::Disabled => builder.danger_accept_invalid_certs(true),
        SslVerify::CaBundle(path) => {
            let pem = fs::read(path)?;
            let certificates = Certificate::from_pem_bundle(&pem)
                .map_err(|e| ReqwestBackendError::InvalidCaBundle(e.to_string()))?;
            if certificates.is_empty() {
                return Err(ReqwestBackendError::InvalidCaBundle(format!(
                    "no certificate found in {}",
                    path.display()
                )));
            }
            certificates
                .into_iter()
                .fold(builder.tls_built_in_root_certs(false), |b, cert| {
                    b.add_root_certificate(cert)
                })
        }
    })
}

pub fn build_reqwest_client(options: &ClientOptions) -> Result<Client> {
    let mut builder = Client::builder();

    if let Some(user_agent) = &options.user_agent {
        builder = builder.user_agent(user_agent);
    }
    builder = apply_proxy(builder, options)?;
    builder = apply_tls(builder, &options.ssl_verify)?;
    builder = builder.redirect(match options.redirect_limit() {
        Some(max) => Policy::limited(max as usize),
        None => Policy::none(),
    });
    if let Some(timeout) = options.request_timeout {
        builder = builder.timeout(timeout);
    }
    if let Some(timeout) = options.connect_timeout {
        builder = builder.connect_timeout(timeout);
    }

    builder
        .default_headers(default_headers(options)?)
        .build()
        .map_err(ReqwestBackendError::Reqwest)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use unihttp_interface::client::ProxySettings;

    use super::*;

    #[test]
    fn test_default_options_build() {
        assert!(build_reqwest_client(&ClientOptions::default()).is_ok());
    }

    #[test]
    fn test_invalid_default_header_rejected() {
        let options = ClientOptions {
            default_headers: vec![("bad header".into(), "x".into())],
            ..Default::default()
        };
        assert!(matches!(
            build_reqwest_client(&options),
            Err(ReqwestBackendError::InvalidHeaderName(name)) if name == "bad header"
        ));

        let options = ClientOptions {
            default_headers: vec![("X-Ok".into(), "line\nbreak".into())],
            ..Default::default()
        };
        assert!(matches!(
            build_reqwest_client(&options),
            Err(ReqwestBackendError::InvalidHeaderValue(_))
        ));
    }

    #[test]
    fn test_proxy_and_redirect_options_build() {
        let proxy = unihttp_interface::client::Proxy::parse("http://u:p@127.0.0.1:3128").unwrap();
        let options = ClientOptions {
            proxy: ProxySettings {
                http: Some(proxy),
                https: None,
            },
            use_default_proxy: false,
            follow_redirects: true,
            max_redirects: Some(3),
            ..Default::default()
        };
        assert!(build_reqwest_client(&options).is_ok());
    }

    #[test]
    fn test_missing_ca_bundle_is_io_error() {
        let options = ClientOptions {
            ssl_verify: SslVerify::CaBundle("/nonexistent/unihttp/ca.pem".into()),
            ..Default::default()
        };
        assert!(matches!(
            build_reqwest_client(&options),
            Err(ReqwestBackendError::Io(_))
        ));
    }

    #[test]
    fn test_empty_ca_bundle_rejected() {
        let path = std::env::temp_dir().join(format!("unihttp-empty-{}.pem", std::process::id()));
        fs::File::create(&path)
            .and_then(|mut f| f.write_all(b"not a certificate\n"))
            .unwrap();
        let options = ClientOptions {
            ssl_verify: SslVerify::CaBundle(path.clone()),
            ..Default::default()
        };
        let result = build_reqwest_client(&options);
        fs::remove_file(&path).ok();
        assert!(matches!(
            result,
            Err(ReqwestBackendError::InvalidCaBundle(_))
        ));
    }
}
