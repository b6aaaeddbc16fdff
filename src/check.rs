//! Status classification and error checking.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::response::HttpResponse;
use crate::{Error, StatusCode};

/// Number of body characters quoted in error messages.
pub const EXCERPT_CHARS: usize = 256;

/// The category a response status falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// 1xx
    Informational,
    /// 2xx
    Success,
    /// 3xx
    Redirect,
    /// 4xx
    ClientError,
    /// 5xx
    ServerError,
    /// Anything outside 100..=599.
    Invalid,
}

impl ErrorCategory {
    const fn as_str(self) -> &'static str {
        match self {
            ErrorCategory::Informational => "informational",
            ErrorCategory::Success => "success",
            ErrorCategory::Redirect => "redirect",
            ErrorCategory::ClientError => "client error",
            ErrorCategory::ServerError => "server error",
            ErrorCategory::Invalid => "invalid",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which response statuses count as errors.
///
/// A status is first looked up in `status_mapping`. Unmapped statuses are classified by
/// range, see [`StatusCode::category`]. The status is an error when its category is one of
/// `enabled_categories`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ErrorChecking {
    /// Categories reported as errors.
    pub enabled_categories: BTreeSet<ErrorCategory>,
    /// Per-status overrides of the range based classification.
    #[validate(custom(function = "validate_status_mapping"))]
    pub status_mapping: BTreeMap<u16, ErrorCategory>,
}

impl Default for ErrorChecking {
    fn default() -> Self {
        Self {
            enabled_categories: [ErrorCategory::ClientError, ErrorCategory::ServerError].into(),
            status_mapping: BTreeMap::new(),
        }
    }
}

fn validate_status_mapping(
    mapping: &BTreeMap<u16, ErrorCategory>,
) -> Result<(), ValidationError> {
    if mapping.keys().all(|code| (100..=599).contains(code)) {
        Ok(())
    } else {
        Err(ValidationError::new("status_out_of_range")
            .with_message("mapped statuses must be within 100..=599".into()))
    }
}

impl ErrorChecking {
    /// Classify `status`, honouring the status mapping.
    pub fn classify(&self, status: StatusCode) -> ErrorCategory {
        self.status_mapping
            .get(&status.code())
            .copied()
            .unwrap_or_else(|| status.category())
    }

    /// Whether `status` is an error under this configuration.
    pub fn is_error(&self, status: StatusCode) -> bool {
        self.enabled_categories.contains(&self.classify(status))
    }

    /// Inspect a response status.
    ///
    /// Returns `(status, None)` for non-error statuses. For error statuses, returns
    /// `(status, Some(message))` when `raise` is false, and the matching [`Error`] otherwise.
    pub fn check(
        &self,
        response: &HttpResponse,
        status: StatusCode,
        raise: bool,
    ) -> crate::Result<(StatusCode, Option<String>)> {
        let category = self.classify(status);
        if !self.enabled_categories.contains(&category) {
            return Ok((status, None));
        }
        let message = error_message(response, status);
        if !raise {
            return Ok((status, Some(message)));
        }
        Err(match category {
            ErrorCategory::ClientError => Error::ClientError { status, message },
            ErrorCategory::ServerError => Error::ServerError { status, message },
            category => Error::UnexpectedStatus {
                status,
                category,
                message,
            },
        })
    }
}

fn error_message(response: &HttpResponse, status: StatusCode) -> String {
    let reason = status.canonical_reason().unwrap_or("Unknown Status");
    let excerpt = response.excerpt(EXCERPT_CHARS);
    if excerpt.trim().is_empty() {
        reason.to_owned()
    } else {
        format!("{reason}: {excerpt}")
    }
}

/// Inspect a response status with the default categories (4xx and 5xx are errors).
///
/// See [`ErrorChecking::check`].
pub fn check_for_errors(
    response: &HttpResponse,
    status: StatusCode,
    raise: bool,
) -> crate::Result<(StatusCode, Option<String>)> {
    ErrorChecking::default().check(response, status, raise)
}
