//! Server certificate verification.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// How a backend verifies server certificates.
///
/// Deserializes from a boolean (`true` verifies against the system roots, `false` disables
/// verification) or from the path of a PEM encoded CA bundle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SslVerifyRepr", into = "SslVerifyRepr")]
pub enum SslVerify {
    /// Verify against the roots trusted by the backend library.
    #[default]
    Enabled,
    /// Do not verify certificates or host names.
    Disabled,
    /// Verify against the certificates of a PEM encoded CA bundle.
    CaBundle(PathBuf),
}

impl SslVerify {
    /// Whether any verification is performed.
    pub fn is_enabled(&self) -> bool {
        !matches!(self, SslVerify::Disabled)
    }

    /// The CA bundle to verify against, if one is configured.
    pub fn ca_bundle(&self) -> Option<&Path> {
        match self {
            SslVerify::CaBundle(path) => Some(path),
            _ => None,
        }
    }
}

impl From<bool> for SslVerify {
    fn from(verify: bool) -> Self {
        if verify {
            SslVerify::Enabled
        } else {
            SslVerify::Disabled
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum SslVerifyRepr {
    Flag(bool),
    CaBundle(PathBuf),
}

impl From<SslVerifyRepr> for SslVerify {
    fn from(repr: SslVerifyRepr) -> Self {
        match repr {
            SslVerifyRepr::Flag(verify) => verify.into(),
            SslVerifyRepr::CaBundle(path) => SslVerify::CaBundle(path),
        }
    }
}

impl From<SslVerify> for SslVerifyRepr {
    fn from(verify: SslVerify) -> Self {
        match verify {
            SslVerify::Enabled => SslVerifyRepr::Flag(true),
            SslVerify::Disabled => SslVerifyRepr::Flag(false),
            SslVerify::CaBundle(path) => SslVerifyRepr::CaBundle(path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ssl_verify_deserialize() {
        let enabled: SslVerify = serde_json::from_str("true").unwrap();
        assert_eq!(enabled, SslVerify::Enabled);
        let disabled: SslVerify = serde_json::from_str("false").unwrap();
        assert!(!disabled.is_enabled());
        let bundle: SslVerify = serde_json::from_str(r#""/etc/ssl/ca.pem""#).unwrap();
        assert_eq!(bundle.ca_bundle(), Some(Path::new("/etc/ssl/ca.pem")));
        assert!(bundle.is_enabled());
    }
}
