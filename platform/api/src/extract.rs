use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::{ApiError, FieldError};

/// JSON body extractor that runs `validator` rules after decoding.
///
/// Every rejection, from a missing content type to a mistyped field, is
/// reported as [`ApiError::Validation`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(Self(value))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let fallback = match &rejection {
            JsonRejection::MissingJsonContentType(_) => "content-type",
            _ => "body",
        };
        let text = rejection.body_text();
        let message = strip_prefix(&text);
        let field = field_from_message(message).unwrap_or_else(|| fallback.to_string());
        ApiError::Validation(vec![FieldError::new(field, message)])
    }
}

const DATA_PREFIX: &str = "Failed to deserialize the JSON body into the target type: ";
const SYNTAX_PREFIX: &str = "Failed to parse the request body as JSON: ";

fn strip_prefix(text: &str) -> &str {
    text.strip_prefix(DATA_PREFIX)
        .or_else(|| text.strip_prefix(SYNTAX_PREFIX))
        .unwrap_or(text)
}

/// Best-effort field name from a serde error message, either
/// "missing field `x`", "unknown field `x`" or a "path: message" prefix.
fn field_from_message(message: &str) -> Option<String> {
    for marker in ["missing field `", "unknown field `"] {
        if let Some(start) = message.find(marker) {
            let rest = &message[start + marker.len()..];
            if let Some(end) = rest.find('`') {
                return Some(rest[..end].to_string());
            }
        }
    }
    let (path, _) = message.split_once(": ")?;
    let is_path = !path.is_empty()
        && path
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '[' | ']'));
    is_path.then(|| path.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{self, header::CONTENT_TYPE},
    };
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Validate)]
    struct Payload {
        #[validate(length(min = 1))]
        name: String,
        salary: f64,
    }

    fn json_request(body: &str) -> Request {
        http::Request::builder()
            .method("POST")
            .uri("/")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn details(err: ApiError) -> Vec<FieldError> {
        match err {
            ApiError::Validation(details) => details,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn names_missing_fields() {
        assert_eq!(
            field_from_message("missing field `email` at line 1 column 17").as_deref(),
            Some("email")
        );
    }

    #[test]
    fn names_path_prefixed_errors() {
        assert_eq!(
            field_from_message(
                "salary: invalid type: string \"not_a_number\", expected f64 at line 1 column 30"
            )
            .as_deref(),
            Some("salary")
        );
    }

    #[test]
    fn leaves_unattributable_messages_alone() {
        assert_eq!(field_from_message("EOF while parsing an object at line 1"), None);
        assert_eq!(field_from_message("expected value: at line 1"), None);
    }

    #[tokio::test]
    async fn accepts_valid_payload() {
        let ValidatedJson(payload) =
            ValidatedJson::<Payload>::from_request(json_request(r#"{"name":"A","salary":1.5}"#), &())
                .await
                .unwrap();
        assert_eq!(payload.name, "A");
        assert_eq!(payload.salary, 1.5);
    }

    #[tokio::test]
    async fn mistyped_field_is_a_validation_error() {
        let err = ValidatedJson::<Payload>::from_request(
            json_request(r#"{"name":"A","salary":"lots"}"#),
            &(),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(details(err).len(), 1);
    }

    #[tokio::test]
    async fn rule_violations_are_reported_per_field() {
        let err = ValidatedJson::<Payload>::from_request(
            json_request(r#"{"name":"","salary":1}"#),
            &(),
        )
        .await
        .unwrap_err();
        let details = details(err);
        assert_eq!(details.len(), 1);
        assert_eq!(details[0].field, "name");
    }

    #[tokio::test]
    async fn malformed_json_is_a_validation_error() {
        let err = ValidatedJson::<Payload>::from_request(json_request("{\"name\":"), &())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "VALIDATION_FAILED");
    }
}
