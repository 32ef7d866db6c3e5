use serde::{Deserialize, Serialize};

/// Unified error type for all reconciliation and registrar operations.
///
/// Variants carry the structured context the driver needs to report the
/// failure; all of them are serializable so errors can cross a process or
/// RPC boundary intact.
///
/// # Retryable Errors
///
/// The following variants represent transient failures that may succeed on
/// retry:
/// - [`Transport`](Self::Transport) — network/communication failure
/// - [`Timeout`](Self::Timeout) — the registrar call timed out
/// - [`RateLimited`](Self::RateLimited) — registrar API rate limit exceeded
///
/// [`RetryPolicy`](crate::RetryPolicy) automatically retries these with
/// exponential backoff; every other variant is returned to the caller
/// immediately.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "code")]
pub enum RegistrarError {
    /// A communication-level failure talking to the registrar (connection
    /// refused, DNS resolution failure, malformed transport response).
    ///
    /// This is a transient error and is automatically retried.
    Transport {
        /// Error details.
        detail: String,
    },

    /// The registrar call timed out.
    ///
    /// This is a transient error and is automatically retried.
    Timeout {
        /// Error details.
        detail: String,
    },

    /// The registrar API rate limit has been exceeded.
    ///
    /// This is a transient error. The retry policy honors `retry_after`
    /// when the registrar supplies one.
    RateLimited {
        /// Suggested wait time in seconds before retrying, if provided.
        retry_after: Option<u64>,
        /// Original error message from the registrar, if available.
        raw_message: Option<String>,
    },

    /// The retry budget was exhausted without a successful call.
    ///
    /// Wraps the last underlying transient error.
    TransientFailure {
        /// Number of attempts made before giving up.
        attempts: u32,
        /// The last error observed.
        source: Box<RegistrarError>,
    },

    /// The domain is not present in the registrar account.
    ///
    /// Not a caller-facing failure during reconciliation: it selects the
    /// creation path.
    NotFound {
        /// Domain name that was not found.
        domain: String,
    },

    /// The domain is already registered in this account.
    AlreadyExists {
        /// Domain name that already exists.
        domain: String,
    },

    /// The domain is not available for registration.
    NotAvailable {
        /// Domain name that is taken.
        domain: String,
        /// Original error message from the registrar, if available.
        raw_message: Option<String>,
    },

    /// The resolved purchase price exceeds the configured ceiling.
    OverBudget {
        /// Domain name being purchased.
        domain: String,
        /// Price resolved from the availability check or pricing lookup.
        price: f64,
        /// The caller's configured maximum.
        max_price: f64,
    },

    /// The registrar responded to a renewal without a positive confirmation.
    RenewalRejected {
        /// Domain name whose renewal was rejected.
        domain: String,
        /// Original error message from the registrar, if available.
        raw_message: Option<String>,
    },

    /// The registrar responded to a reactivation without a positive
    /// confirmation.
    ReactivationRejected {
        /// Domain name whose reactivation was rejected.
        domain: String,
        /// Original error message from the registrar, if available.
        raw_message: Option<String>,
    },

    /// A record value (or a similarly registrar-bound string) could not be
    /// parsed or normalized (e.g. a malformed CAA `iodef` address).
    InvalidRecordValue {
        /// Description of what's wrong with the value.
        detail: String,
    },

    /// Delegated nameservers and hosted records were requested at the same
    /// time; the registrar supports at most one active mode.
    ModeConflict {
        /// Description of the conflicting desired state.
        detail: String,
    },

    /// A request parameter is invalid (bad TTL, out-of-range years, empty
    /// domain name).
    InvalidParameter {
        /// Name of the invalid parameter.
        param: String,
        /// Description of what's wrong.
        detail: String,
    },

    /// A registrar-reported business error, surfaced verbatim.
    Api {
        /// Raw error code from the registrar, if available.
        #[serde(rename = "registrar_code")]
        code: Option<String>,
        /// Raw error message from the registrar.
        message: String,
    },
}

impl RegistrarError {
    /// Whether this error may succeed if the call is simply repeated.
    ///
    /// Only communication-level failures qualify; registrar-reported
    /// business errors never do.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. } | Self::Timeout { .. } | Self::RateLimited { .. }
        )
    }

    /// Whether this error is an expected business outcome (bad input,
    /// resource state) rather than an infrastructure fault. Drivers can use
    /// this for log leveling: `warn` when `true`, `error` when `false`.
    ///
    /// **Update this method when adding variants.**
    #[must_use]
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. }
                | Self::AlreadyExists { .. }
                | Self::NotAvailable { .. }
                | Self::OverBudget { .. }
                | Self::RenewalRejected { .. }
                | Self::ReactivationRejected { .. }
                | Self::InvalidRecordValue { .. }
                | Self::ModeConflict { .. }
                | Self::InvalidParameter { .. }
        )
    }
}

impl std::fmt::Display for RegistrarError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport { detail } => {
                write!(f, "Transport error: {detail}")
            }
            Self::Timeout { detail } => {
                write!(f, "Request timeout: {detail}")
            }
            Self::RateLimited { retry_after, .. } => {
                if let Some(secs) = retry_after {
                    write!(f, "Rate limited (retry after {secs}s)")
                } else {
                    write!(f, "Rate limited")
                }
            }
            Self::TransientFailure { attempts, source } => {
                write!(f, "Giving up after {attempts} attempts: {source}")
            }
            Self::NotFound { domain } => {
                write!(f, "Domain '{domain}' not found in this account")
            }
            Self::AlreadyExists { domain } => {
                write!(f, "Domain '{domain}' is already registered in this account")
            }
            Self::NotAvailable {
                domain,
                raw_message,
            } => {
                if let Some(msg) = raw_message {
                    write!(f, "Domain '{domain}' is not available: {msg}")
                } else {
                    write!(f, "Domain '{domain}' is not available for registration")
                }
            }
            Self::OverBudget {
                domain,
                price,
                max_price,
            } => {
                write!(
                    f,
                    "Domain '{domain}' costs {price} which exceeds the ceiling of {max_price}"
                )
            }
            Self::RenewalRejected {
                domain,
                raw_message,
            } => {
                if let Some(msg) = raw_message {
                    write!(f, "Renewal of '{domain}' rejected: {msg}")
                } else {
                    write!(f, "Renewal of '{domain}' rejected")
                }
            }
            Self::ReactivationRejected {
                domain,
                raw_message,
            } => {
                if let Some(msg) = raw_message {
                    write!(f, "Reactivation of '{domain}' rejected: {msg}")
                } else {
                    write!(f, "Reactivation of '{domain}' rejected")
                }
            }
            Self::InvalidRecordValue { detail } => {
                write!(f, "Invalid record value: {detail}")
            }
            Self::ModeConflict { detail } => {
                write!(f, "DNS mode conflict: {detail}")
            }
            Self::InvalidParameter { param, detail } => {
                write!(f, "Invalid parameter '{param}': {detail}")
            }
            Self::Api { code, message } => {
                if let Some(code) = code {
                    write!(f, "Registrar error {code}: {message}")
                } else {
                    write!(f, "Registrar error: {message}")
                }
            }
        }
    }
}

impl std::error::Error for RegistrarError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TransientFailure { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

/// Convenience type alias for `Result<T, RegistrarError>`.
pub type Result<T> = std::result::Result<T, RegistrarError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_transport() {
        let e = RegistrarError::Transport {
            detail: "connection refused".to_string(),
        };
        assert_eq!(e.to_string(), "Transport error: connection refused");
    }

    #[test]
    fn display_rate_limited_with_retry() {
        let e = RegistrarError::RateLimited {
            retry_after: Some(30),
            raw_message: None,
        };
        assert_eq!(e.to_string(), "Rate limited (retry after 30s)");
    }

    #[test]
    fn display_rate_limited_without_retry() {
        let e = RegistrarError::RateLimited {
            retry_after: None,
            raw_message: None,
        };
        assert_eq!(e.to_string(), "Rate limited");
    }

    #[test]
    fn display_transient_failure_includes_source() {
        let e = RegistrarError::TransientFailure {
            attempts: 5,
            source: Box::new(RegistrarError::Timeout {
                detail: "30s elapsed".to_string(),
            }),
        };
        assert_eq!(
            e.to_string(),
            "Giving up after 5 attempts: Request timeout: 30s elapsed"
        );
    }

    #[test]
    fn display_not_available_with_message() {
        let e = RegistrarError::NotAvailable {
            domain: "example.com".to_string(),
            raw_message: Some("premium tier".to_string()),
        };
        assert_eq!(
            e.to_string(),
            "Domain 'example.com' is not available: premium tier"
        );
    }

    #[test]
    fn display_over_budget() {
        let e = RegistrarError::OverBudget {
            domain: "example.com".to_string(),
            price: 88.0,
            max_price: 10.0,
        };
        assert_eq!(
            e.to_string(),
            "Domain 'example.com' costs 88 which exceeds the ceiling of 10"
        );
    }

    #[test]
    fn display_api_with_code() {
        let e = RegistrarError::Api {
            code: Some("2030280".to_string()),
            message: "TLD is not supported".to_string(),
        };
        assert_eq!(e.to_string(), "Registrar error 2030280: TLD is not supported");
    }

    #[test]
    fn source_of_transient_failure() {
        let e = RegistrarError::TransientFailure {
            attempts: 3,
            source: Box::new(RegistrarError::Transport {
                detail: "reset".to_string(),
            }),
        };
        let src = std::error::Error::source(&e);
        assert!(src.is_some(), "expected a source error");
    }

    #[test]
    fn serialize_json_round_trip() {
        let e = RegistrarError::RateLimited {
            retry_after: Some(60),
            raw_message: Some("too many requests".to_string()),
        };
        let json = serde_json::to_string(&e).unwrap();
        assert!(json.contains("\"code\":\"RateLimited\""));
        assert!(json.contains("\"retry_after\":60"));
    }

    #[test]
    fn deserialize_all_variants() {
        let variants: Vec<RegistrarError> = vec![
            RegistrarError::Transport { detail: "d".into() },
            RegistrarError::Timeout { detail: "d".into() },
            RegistrarError::RateLimited {
                retry_after: Some(30),
                raw_message: None,
            },
            RegistrarError::TransientFailure {
                attempts: 2,
                source: Box::new(RegistrarError::Transport { detail: "d".into() }),
            },
            RegistrarError::NotFound {
                domain: "x.com".into(),
            },
            RegistrarError::AlreadyExists {
                domain: "x.com".into(),
            },
            RegistrarError::NotAvailable {
                domain: "x.com".into(),
                raw_message: None,
            },
            RegistrarError::OverBudget {
                domain: "x.com".into(),
                price: 1.0,
                max_price: 0.5,
            },
            RegistrarError::RenewalRejected {
                domain: "x.com".into(),
                raw_message: None,
            },
            RegistrarError::ReactivationRejected {
                domain: "x.com".into(),
                raw_message: None,
            },
            RegistrarError::InvalidRecordValue { detail: "d".into() },
            RegistrarError::ModeConflict { detail: "d".into() },
            RegistrarError::InvalidParameter {
                param: "ttl".into(),
                detail: "d".into(),
            },
            RegistrarError::Api {
                code: Some("1".into()),
                message: "m".into(),
            },
        ];

        for v in &variants {
            let json = serde_json::to_string(v).unwrap();
            let back: RegistrarError = serde_json::from_str(&json).unwrap();
            assert_eq!(back.to_string(), v.to_string());
        }
    }

    #[test]
    fn is_retryable_variants() {
        assert!(RegistrarError::Transport { detail: "x".into() }.is_retryable());
        assert!(RegistrarError::Timeout { detail: "x".into() }.is_retryable());
        assert!(
            RegistrarError::RateLimited {
                retry_after: None,
                raw_message: None,
            }
            .is_retryable()
        );
        assert!(
            !RegistrarError::NotAvailable {
                domain: "x.com".into(),
                raw_message: None,
            }
            .is_retryable()
        );
        assert!(
            !RegistrarError::AlreadyExists {
                domain: "x.com".into(),
            }
            .is_retryable()
        );
        // The wrapper itself must not be retried again.
        assert!(
            !RegistrarError::TransientFailure {
                attempts: 1,
                source: Box::new(RegistrarError::Transport { detail: "x".into() }),
            }
            .is_retryable()
        );
    }

    #[test]
    fn is_expected_business_failures() {
        assert!(
            RegistrarError::OverBudget {
                domain: "x.com".into(),
                price: 2.0,
                max_price: 1.0,
            }
            .is_expected()
        );
        assert!(RegistrarError::ModeConflict { detail: "d".into() }.is_expected());
        assert!(!RegistrarError::Transport { detail: "d".into() }.is_expected());
        assert!(
            !RegistrarError::Api {
                code: None,
                message: "m".into(),
            }
            .is_expected()
        );
    }
}
