use std::io;

use unihttp_interface::client::BuildClientError;
use unihttp_interface::Error as UnihttpError;

fn mentions_tls(message: &str) -> bool {
    let message = message.to_ascii_lowercase();
    ["certificate", "tls", "ssl", "handshake"]
        .iter()
        .any(|needle| message.contains(needle))
}

/// Categorize a ureq failure.
pub(crate) fn map_ureq_error(err: ureq::Error) -> UnihttpError {
    match err {
        ureq::Error::Timeout(_) => UnihttpError::Timeout,
        ureq::Error::Io(e) if e.kind() == io::ErrorKind::TimedOut => UnihttpError::Timeout,
        ureq::Error::Io(e) => UnihttpError::Io(e),
        ureq::Error::HostNotFound => UnihttpError::Connection("host not found".into()),
        ureq::Error::ConnectionFailed => UnihttpError::Connection("connection failed".into()),
        ureq::Error::ConnectProxyFailed(reason) => UnihttpError::Connection(reason),
        ureq::Error::TooManyRedirects => UnihttpError::TooManyRedirects,
        ureq::Error::BodyExceedsLimit(_) => UnihttpError::ResponseTooLarge,
        ureq::Error::BadUri(uri) => UnihttpError::InvalidUrl(uri),
        ureq::Error::Http(e) => UnihttpError::InvalidRequest(e.to_string()),
        ureq::Error::Tls(reason) => UnihttpError::Ssl(reason.to_owned()),
        other => {
            let message = other.to_string();
            if mentions_tls(&message) {
                UnihttpError::Ssl(message)
            } else {
                UnihttpError::Library(message)
            }
        }
    }
}

pub(crate) fn invalid_option(option: &'static str, err: impl ToString) -> BuildClientError {
    BuildClientError::InvalidOption {
        option,
        reason: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        assert!(matches!(
            map_ureq_error(ureq::Error::TooManyRedirects),
            UnihttpError::TooManyRedirects
        ));
        assert!(matches!(
            map_ureq_error(ureq::Error::BodyExceedsLimit(16)),
            UnihttpError::ResponseTooLarge
        ));
        assert!(map_ureq_error(ureq::Error::HostNotFound).is_connection());
        assert!(map_ureq_error(ureq::Error::ConnectionFailed).is_connection());
        assert!(map_ureq_error(io::Error::from(io::ErrorKind::TimedOut).into()).is_timeout());
        assert!(
            map_ureq_error(io::Error::from(io::ErrorKind::ConnectionRefused).into())
                .is_connection()
        );
        assert!(matches!(
            map_ureq_error(ureq::Error::Tls("no root certificates")),
            UnihttpError::Ssl(_)
        ));
    }

    #[test]
    fn test_tls_messages_detected() {
        assert!(mentions_tls("invalid peer certificate: UnknownIssuer"));
        assert!(mentions_tls("TLS handshake eof"));
        assert!(!mentions_tls("connection reset"));
    }
}
