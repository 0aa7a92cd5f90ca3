// Error handling for page-compiler

use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

use crate::domain::blocks::{FormError, PageError};
use crate::domain::template::InterpolationError;

#[derive(Template)]
#[template(path = "error.html")]
struct ErrorPageTemplate<'a> {
    status: &'a str,
    message: &'a str,
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    TemplateRender(String),
    NotFound(String),
    BadRequest(String),
    /// A template that could not be interpolated, reported to API clients as JSON
    Unresolved(InterpolationError),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::TemplateRender(msg) => write!(f, "Template rendering error: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::Unresolved(err) => write!(f, "Unresolved variable: {}", err),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

// Implement IntoResponse so Axum can convert errors to HTTP responses
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Unresolved(err) => {
                let body = json!({
                    "token": err.token,
                    "code": err.code(),
                    "message": err.to_string(),
                });
                return (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response();
            }
            AppError::TemplateRender(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Template error: {}", msg),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, format!("Not found: {}", msg)),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, format!("Bad request: {}", msg)),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, format!("Internal error: {}", msg)),
        };

        if status.is_server_error() {
            tracing::error!(%status, "{}", message);
        }

        let page = ErrorPageTemplate {
            status: status.as_str(),
            message: &message,
        };
        match page.render() {
            Ok(html) => (status, Html(html)).into_response(),
            Err(_) => (status, message).into_response(),
        }
    }
}

// Helper to convert template errors
impl From<askama::Error> for AppError {
    fn from(err: askama::Error) -> Self {
        AppError::TemplateRender(err.to_string())
    }
}

impl From<InterpolationError> for AppError {
    fn from(err: InterpolationError) -> Self {
        AppError::Unresolved(err)
    }
}

impl From<FormError> for AppError {
    fn from(err: FormError) -> Self {
        match err {
            FormError::UnknownForm(_) => AppError::NotFound(err.to_string()),
            FormError::MissingField(_) | FormError::Interpolation(_) => AppError::BadRequest(err.to_string()),
        }
    }
}

// Pages are validated when they are loaded, so a render-time failure is ours
impl From<PageError> for AppError {
    fn from(err: PageError) -> Self {
        AppError::Internal(format!("Invalid page: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::template::{RefineError, ResolveVariableError};

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::NotFound("x".to_string()).into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::BadRequest("x".to_string()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
        let unresolved = InterpolationError {
            token: "query.x.y".to_string(),
            source: RefineError::Resolve(ResolveVariableError::QueryNotFound),
        };
        assert_eq!(
            AppError::from(unresolved).into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[tokio::test]
    async fn test_unresolved_body() {
        use http_body_util::BodyExt;

        let response = AppError::Unresolved(InterpolationError {
            token: "this.q".to_string(),
            source: RefineError::Resolve(ResolveVariableError::NoStateForId),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["token"], "this.q");
        assert_eq!(body["code"], "NoStateForId");
    }

    #[test]
    fn test_form_errors() {
        assert!(matches!(
            AppError::from(FormError::UnknownForm("f".to_string())),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            AppError::from(FormError::MissingField("q".to_string())),
            AppError::BadRequest(msg) if msg.contains("'q'")
        ));
    }

    #[test]
    fn test_error_page_escapes_message() {
        let page = ErrorPageTemplate {
            status: "400",
            message: "<b>{{query.x}}</b>",
        };
        let html = page.render().unwrap();
        assert!(html.contains("&lt;b&gt;"));
        assert!(!html.contains("<b>"));
    }
}
