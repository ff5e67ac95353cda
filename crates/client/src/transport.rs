//! Transport seam and wire-level shapes
//!
//! The client never implements HTTP itself. Everything goes through the
//! [`Transport`] trait: one request in, one response out, no retries. A
//! production implementation wraps an HTTP client and the server's
//! authentication; tests script responses directly.
//!
//! The response envelope carries a [`StatusMeta`] alongside the body so the
//! client can distinguish the three outcomes it cares about:
//! - plain success,
//! - the distinguished revision-mismatch status (surfaced as
//!   `Error::RevisionConflict`),
//! - any other server error, with error number 1202 mapped to
//!   `Error::NotFound`.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use vellum_core::{DocumentMeta, Error, Result, Revision};

/// Server error number for a revision mismatch.
pub const ERROR_NUM_CONFLICT: i64 = 1200;

/// HTTP method of a command request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// PATCH
    Patch,
    /// DELETE
    Delete,
    /// HEAD
    Head,
}

impl Method {
    /// Method name as it appears on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Head => "HEAD",
        }
    }
}

/// One outbound command: method, api path, query parameters, optional body.
#[derive(Debug, Clone)]
pub struct CommandRequest {
    /// HTTP method
    pub method: Method,
    /// Path below the database root, e.g. `_api/document/people/42`
    pub path: String,
    /// Query-string parameters in insertion order
    pub query: Vec<(String, String)>,
    /// JSON body, if the command carries one
    pub body: Option<Value>,
}

impl CommandRequest {
    /// Start a request with no parameters and no body.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        CommandRequest {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    /// Append a query parameter.
    pub fn with_param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((name.into(), value.to_string()));
        self
    }

    /// Attach a JSON body.
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Look up a query parameter by name (test and logging helper).
    pub fn param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Status portion of a command response.
#[derive(Debug, Clone, Default)]
pub struct StatusMeta {
    /// Whether the server reported an error
    pub error: bool,
    /// Server error number, when reported
    pub code: Option<i64>,
    /// Server error message, when reported
    pub message: Option<String>,
    /// Distinguished revision-mismatch status
    pub conflict: bool,
}

impl StatusMeta {
    /// A plain success status.
    pub fn ok() -> Self {
        StatusMeta::default()
    }

    /// Derive the status from a response body carrying the standard
    /// `error` / `errorNum` / `errorMessage` fields.
    pub fn from_body(body: &Value) -> Self {
        let error = body
            .get("error")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let code = body.get("errorNum").and_then(Value::as_i64);
        let message = body
            .get("errorMessage")
            .and_then(Value::as_str)
            .map(str::to_string);
        StatusMeta {
            error,
            code,
            message,
            conflict: error && code == Some(ERROR_NUM_CONFLICT),
        }
    }
}

/// One inbound command response: status plus JSON body.
#[derive(Debug, Clone)]
pub struct CommandResponse {
    /// Outcome flags and error details
    pub status: StatusMeta,
    /// Response body
    pub body: Value,
}

impl CommandResponse {
    /// A successful response with the given body.
    pub fn ok(body: Value) -> Self {
        CommandResponse {
            status: StatusMeta::ok(),
            body,
        }
    }

    /// Convert the response into the body or the corresponding error.
    ///
    /// `subject` names the document the command addressed, for error
    /// context; `precondition` is the revision sent with the request, used
    /// to report a conflict.
    pub fn into_result(
        self,
        subject: &str,
        precondition: Option<&Revision>,
    ) -> Result<Value> {
        if self.status.conflict {
            return Err(Error::RevisionConflict {
                expected: precondition
                    .map(|r| r.as_str().to_string())
                    .unwrap_or_default(),
            });
        }
        if self.status.error {
            let code = self.status.code.unwrap_or(-1);
            let message = self.status.message.unwrap_or_default();
            return Err(Error::from_server(code, message, subject));
        }
        Ok(self.body)
    }
}

/// The command/transport collaborator.
///
/// Implementations own connection management, authentication, and any retry
/// policy; the client issues exactly one `send` per logical request and
/// surfaces failures immediately.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Dispatch one command and await its response.
    async fn send(&self, request: CommandRequest) -> Result<CommandResponse>;
}

/// Identifier triple parsed from a mutation response body.
pub(crate) fn parse_meta(body: &Value) -> Result<DocumentMeta> {
    let meta = DocumentMeta::deserialize(body)?;
    Ok(meta)
}

/// One page of query results, as delivered by the cursor protocol.
///
/// The first page and every continuation share this shape. Absence of
/// `hasMore` implies exhaustion; the cursor handle is present iff another
/// batch exists.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CursorPage {
    /// Items of this batch, in arrival order
    #[serde(default)]
    pub result: Vec<Value>,
    /// Whether a continuation is possible
    #[serde(default)]
    pub has_more: bool,
    /// Server-assigned continuation handle
    #[serde(default)]
    pub id: Option<String>,
    /// Total result count, present only when requested
    #[serde(default)]
    pub count: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_builder() {
        let req = CommandRequest::new(Method::Post, "_api/document")
            .with_param("collection", "people")
            .with_param("waitForSync", true)
            .with_body(json!({"name": "ada"}));
        assert_eq!(req.method.as_str(), "POST");
        assert_eq!(req.param("collection"), Some("people"));
        assert_eq!(req.param("waitForSync"), Some("true"));
        assert_eq!(req.body, Some(json!({"name": "ada"})));
    }

    #[test]
    fn test_status_from_body_success() {
        let status = StatusMeta::from_body(&json!({"error": false, "_id": "people/1"}));
        assert!(!status.error);
        assert!(!status.conflict);
    }

    #[test]
    fn test_status_from_body_conflict() {
        let status = StatusMeta::from_body(&json!({
            "error": true,
            "errorNum": 1200,
            "errorMessage": "conflict",
        }));
        assert!(status.error);
        assert!(status.conflict);
    }

    #[test]
    fn test_status_from_body_other_error() {
        let status = StatusMeta::from_body(&json!({"error": true, "errorNum": 1202}));
        assert!(status.error);
        assert!(!status.conflict);
        assert_eq!(status.code, Some(1202));
    }

    #[test]
    fn test_into_result_maps_conflict() {
        let response = CommandResponse {
            status: StatusMeta {
                error: true,
                code: Some(ERROR_NUM_CONFLICT),
                message: Some("conflict".into()),
                conflict: true,
            },
            body: Value::Null,
        };
        let rev = Revision::new("R1");
        let err = response.into_result("people/1", Some(&rev)).unwrap_err();
        match err {
            Error::RevisionConflict { expected } => assert_eq!(expected, "R1"),
            other => panic!("expected RevisionConflict, got {other:?}"),
        }
    }

    #[test]
    fn test_into_result_maps_not_found() {
        let response = CommandResponse {
            status: StatusMeta {
                error: true,
                code: Some(1202),
                message: Some("document not found".into()),
                conflict: false,
            },
            body: Value::Null,
        };
        let err = response.into_result("people/9", None).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_into_result_passes_body_through() {
        let body = json!({"result": [1, 2, 3]});
        let response = CommandResponse::ok(body.clone());
        assert_eq!(response.into_result("q", None).unwrap(), body);
    }

    #[test]
    fn test_cursor_page_defaults_to_exhausted() {
        // Absence of hasMore implies exhaustion.
        let page: CursorPage = serde_json::from_value(json!({"result": [1]})).unwrap();
        assert!(!page.has_more);
        assert!(page.id.is_none());
        assert!(page.count.is_none());
    }

    #[test]
    fn test_cursor_page_first_page_shape() {
        let page: CursorPage = serde_json::from_value(json!({
            "result": [{"a": 1}, {"a": 2}],
            "hasMore": true,
            "id": "c17",
            "count": 5,
        }))
        .unwrap();
        assert_eq!(page.result.len(), 2);
        assert!(page.has_more);
        assert_eq!(page.id.as_deref(), Some("c17"));
        assert_eq!(page.count, Some(5));
    }
}
