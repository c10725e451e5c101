//! Error classification
//!
//! Maps any pipeline failure to an HTTP status, a log severity, and a
//! structured body. Dispatch order matters because the categories are not
//! mutually exclusive in representation; the first match wins. Only
//! validation, wire-format, and `Domain`-kind failures ever surface message
//! text; everything else is logged with its full chain server-side and
//! answered generically.

use std::collections::BTreeMap;
use std::error::Error as StdError;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::bind::BindError;
use crate::context::RequestContext;
use crate::error::{find_in_chain, BoxError, ErrorChain, Fault, FaultKind};
use crate::validate::ValidationFailure;

/// Log severity of a classified failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Client-caused failure, logged informationally
    Info,
    /// Internal failure, logged as an error with its full chain
    Error,
}

/// Wire-level error body: `{"error": ..., "details"?: {field: rule}}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Caller-safe error message
    pub error: String,
    /// Field name → violated rule, present for field-level failures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<BTreeMap<String, String>>,
}

impl ErrorBody {
    fn generic(error: &str) -> Self {
        Self {
            error: error.to_string(),
            details: None,
        }
    }
}

/// Classification outcome: status, severity, and response body
#[derive(Debug)]
pub struct Classified {
    /// HTTP status for the response
    pub status: StatusCode,
    /// How the failure is logged server-side
    pub severity: Severity,
    /// Structured response body
    pub body: ErrorBody,
}

/// Classify a pipeline failure, first match wins
pub fn classify(err: &(dyn StdError + 'static)) -> Classified {
    // 1. Structural validation: list every offending field and its rule
    if let Some(failure) = find_in_chain::<ValidationFailure>(err) {
        let details = failure
            .errors
            .iter()
            .map(|e| (e.field.clone(), e.rule.clone()))
            .collect();
        return Classified {
            status: StatusCode::BAD_REQUEST,
            severity: Severity::Info,
            body: ErrorBody {
                error: "Validation failed".to_string(),
                details: Some(details),
            },
        };
    }

    // 2. Malformed wire-format body: no internals leaked
    if find_in_chain::<serde_json::Error>(err).is_some() {
        return Classified {
            status: StatusCode::BAD_REQUEST,
            severity: Severity::Info,
            body: ErrorBody::generic("Invalid JSON format"),
        };
    }

    // 3. Binding/coercion failure: the field is named, the token is not
    if let Some(bind_err) = find_in_chain::<BindError>(err) {
        let mut details = BTreeMap::new();
        details.insert(bind_err.field.to_string(), "invalid_format".to_string());
        return Classified {
            status: StatusCode::BAD_REQUEST,
            severity: Severity::Info,
            body: ErrorBody {
                error: "Invalid parameter format".to_string(),
                details: Some(details),
            },
        };
    }

    // 4. Classified faults by kind
    if let Some(fault) = find_in_chain::<Fault>(err) {
        return match fault.kind() {
            FaultKind::Domain => Classified {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                severity: Severity::Info,
                body: ErrorBody::generic(fault.message()),
            },
            FaultKind::Auth => Classified {
                status: StatusCode::FORBIDDEN,
                severity: Severity::Error,
                body: ErrorBody::generic("Access Denied"),
            },
            FaultKind::Infra | FaultKind::Bootstrap | FaultKind::Unknown => Classified {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                severity: Severity::Error,
                body: ErrorBody::generic("Internal Server Error"),
            },
        };
    }

    // 5. Anything else is unclassified and answered generically
    Classified {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        severity: Severity::Error,
        body: ErrorBody::generic("Internal Server Error"),
    }
}

/// Log the failure at its classified severity and emit the one response
pub(crate) fn respond(ctx: &RequestContext, err: BoxError) -> Response {
    let classified = classify(err.as_ref());

    match classified.severity {
        Severity::Error => tracing::error!(
            parent: ctx.span(),
            status = classified.status.as_u16(),
            error = %ErrorChain(err.as_ref()),
            "request failed with internal error"
        ),
        Severity::Info => tracing::info!(
            parent: ctx.span(),
            status = classified.status.as_u16(),
            error = %ErrorChain(err.as_ref()),
            "request failed with client error"
        ),
    }

    (classified.status, Json(classified.body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::FieldError;

    fn boxed(err: impl StdError + Send + Sync + 'static) -> BoxError {
        Box::new(err)
    }

    #[test]
    fn test_validation_failure_lists_fields() {
        let err = boxed(ValidationFailure::from(vec![
            FieldError::new("email", "required"),
            FieldError::new("age", "range"),
        ]));
        let classified = classify(err.as_ref());

        assert_eq!(classified.status, StatusCode::BAD_REQUEST);
        assert_eq!(classified.severity, Severity::Info);
        let details = classified.body.details.unwrap();
        assert_eq!(details.get("email").unwrap(), "required");
        assert_eq!(details.get("age").unwrap(), "range");
    }

    #[test]
    fn test_malformed_json_is_generic() {
        let json_err = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let classified = classify(&json_err);

        assert_eq!(classified.status, StatusCode::BAD_REQUEST);
        assert_eq!(classified.severity, Severity::Info);
        assert_eq!(classified.body.error, "Invalid JSON format");
        assert!(classified.body.details.is_none());
    }

    #[test]
    fn test_binding_failure_names_field_only() {
        let err = boxed(BindError {
            field: "age",
            source: crate::bind::CoerceError {
                token: "not_a_number".to_string(),
                target: "i32",
                index: None,
            },
        });
        let classified = classify(err.as_ref());

        assert_eq!(classified.status, StatusCode::BAD_REQUEST);
        assert_eq!(classified.body.error, "Invalid parameter format");
        let details = classified.body.details.unwrap();
        assert_eq!(details.get("age").unwrap(), "invalid_format");
        // The offending token never reaches the body
        assert!(!format!("{:?}", details).contains("not_a_number"));
    }

    #[test]
    fn test_domain_fault_exposes_message() {
        let err = boxed(Fault::domain("insufficient balance"));
        let classified = classify(err.as_ref());

        assert_eq!(classified.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(classified.severity, Severity::Info);
        assert_eq!(classified.body.error, "insufficient balance");
    }

    #[test]
    fn test_auth_fault_suppresses_message() {
        let err = boxed(Fault::auth("token signature mismatch"));
        let classified = classify(err.as_ref());

        assert_eq!(classified.status, StatusCode::FORBIDDEN);
        assert_eq!(classified.severity, Severity::Error);
        assert_eq!(classified.body.error, "Access Denied");
    }

    #[test]
    fn test_infra_and_bootstrap_faults_are_generic() {
        for fault in [
            Fault::infra("database connection refused"),
            Fault::bootstrap("missing logger"),
        ] {
            let classified = classify(&fault);
            assert_eq!(classified.status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(classified.severity, Severity::Error);
            assert_eq!(classified.body.error, "Internal Server Error");
        }
    }

    #[test]
    fn test_unknown_kind_is_generic() {
        let classified = classify(&Fault::new("mystery"));
        assert_eq!(classified.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(classified.body.error, "Internal Server Error");
    }

    #[test]
    fn test_foreign_error_is_generic() {
        let err = boxed(std::io::Error::other("disk on fire"));
        let classified = classify(err.as_ref());

        assert_eq!(classified.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(classified.severity, Severity::Error);
        assert_eq!(classified.body.error, "Internal Server Error");
    }

    #[test]
    fn test_validation_wins_over_wrapping_fault() {
        let failure = ValidationFailure::from(vec![FieldError::new("name", "required")]);
        let wrapped = Fault::wrap(failure, "binding rejected");
        let classified = classify(&wrapped);

        assert_eq!(classified.status, StatusCode::BAD_REQUEST);
        assert_eq!(classified.body.error, "Validation failed");
    }

    #[test]
    fn test_domain_fault_found_through_chain() {
        let inner = Fault::domain("quota exceeded");
        let wrapped = Fault::wrap(inner, "handler failed");
        let classified = classify(&wrapped);

        // The outer link is Unknown; the chain is searched for the first
        // fault, which is the outer one, so this answers 500.
        assert_eq!(classified.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_error_body_serialization() {
        let body = ErrorBody {
            error: "Validation failed".to_string(),
            details: Some(BTreeMap::from([(
                "age".to_string(),
                "range".to_string(),
            )])),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"error": "Validation failed", "details": {"age": "range"}})
        );

        let bare = ErrorBody::generic("Internal Server Error");
        let json = serde_json::to_value(&bare).unwrap();
        assert_eq!(json, serde_json::json!({"error": "Internal Server Error"}));
    }
}
