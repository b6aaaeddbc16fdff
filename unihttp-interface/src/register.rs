//! Backend identifiers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Names one of the supported underlying HTTP libraries.
///
/// Used as the lookup key of the facade's backend registry and as the element type of a
/// dependency chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BackendId {
    /// libcurl through the `curl` crate.
    Curl,
    /// The `reqwest` crate.
    Reqwest,
    /// The `ureq` crate.
    Ureq,
}

impl BackendId {
    /// All known identifiers, in the built-in priority order.
    pub const ALL: [BackendId; 3] = [BackendId::Reqwest, BackendId::Curl, BackendId::Ureq];

    /// The canonical lowercase name of the backend.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Curl => "curl",
            Self::Reqwest => "reqwest",
            Self::Ureq => "ureq",
        }
    }
}

impl fmt::Display for BackendId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The string did not name a known backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown backend `{0}`")]
pub struct UnknownBackend(pub String);

impl FromStr for BackendId {
    type Err = UnknownBackend;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        BackendId::ALL
            .into_iter()
            .find(|id| id.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownBackend(s.to_owned()))
    }
}

impl Serialize for BackendId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for BackendId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_backend_id() {
        assert_eq!("curl".parse::<BackendId>().unwrap(), BackendId::Curl);
        assert_eq!(" Reqwest ".parse::<BackendId>().unwrap(), BackendId::Reqwest);
        assert_eq!("UREQ".parse::<BackendId>().unwrap(), BackendId::Ureq);
        assert_eq!(
            "urllib".parse::<BackendId>().unwrap_err(),
            UnknownBackend("urllib".into())
        );
    }

    #[test]
    fn test_backend_id_serde() {
        let json = serde_json::to_string(&BackendId::Curl).unwrap();
        assert_eq!(json, r#""curl""#);
        let id: BackendId = serde_json::from_str(r#""ureq""#).unwrap();
        assert_eq!(id, BackendId::Ureq);
        assert!(serde_json::from_str::<BackendId>(r#""pycurl""#).is_err());
    }
}
