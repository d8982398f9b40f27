//! Error conversions - From implementations for common error types

use super::app_error::AppError;

// ============================================================================
// SQLx conversions (feature-gated)
// ============================================================================

/// Classifies a storage failure by SQLSTATE
///
/// Takes a reference because domain errors keep ownership of the `sqlx::Error`
/// for logging. Messages are fixed strings; driver detail never reaches the
/// client.
#[cfg(feature = "sqlx")]
impl From<&sqlx::Error> for AppError {
    fn from(err: &sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::not_found("Record not found"),
            sqlx::Error::PoolTimedOut => {
                AppError::service_unavailable("Database connection pool exhausted")
            }
            sqlx::Error::Database(db_err) => {
                // https://www.postgresql.org/docs/current/errcodes-appendix.html
                match db_err.code().as_deref() {
                    Some("23505") => AppError::conflict("Duplicate key value"),
                    Some("23503") => AppError::conflict("Referenced record does not exist"),
                    Some("23502") => AppError::bad_request("Required field is null"),
                    Some("23514") => AppError::bad_request("Check constraint violation"),
                    // Serialization failure / deadlock: a concurrent write won
                    Some("40001") | Some("40P01") => {
                        AppError::conflict("Concurrent update, please retry")
                            .with_action("Retry the request")
                    }
                    Some("53000") | Some("53100") | Some("53200") | Some("53300") => {
                        AppError::service_unavailable("Database resource exhausted")
                    }
                    Some("57P01") | Some("57P02") | Some("57P03") => {
                        AppError::service_unavailable("Database unavailable")
                    }
                    _ => AppError::internal("Internal server error"),
                }
            }
            sqlx::Error::Io(_) => AppError::service_unavailable("Database connection error"),
            _ => AppError::internal("Internal server error"),
        }
    }
}

// ============================================================================
// Axum conversions (feature-gated)
// ============================================================================

/// Extractor rejections become 400 problem responses.
///
/// Handlers opt in with `axum_extra::extract::WithRejection<_, AppError>`.
#[cfg(feature = "axum")]
mod rejections {
    use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};

    use super::AppError;

    impl From<JsonRejection> for AppError {
        fn from(rejection: JsonRejection) -> Self {
            let action = match &rejection {
                JsonRejection::MissingJsonContentType(_) => {
                    "Send the body with `Content-Type: application/json`"
                }
                _ => "Check field names and value types in the request body",
            };
            AppError::bad_request(rejection.body_text())
                .with_action(action)
                .with_source(rejection)
        }
    }

    impl From<QueryRejection> for AppError {
        fn from(rejection: QueryRejection) -> Self {
            AppError::bad_request(rejection.body_text()).with_source(rejection)
        }
    }

    impl From<PathRejection> for AppError {
        fn from(rejection: PathRejection) -> Self {
            AppError::bad_request(rejection.body_text()).with_source(rejection)
        }
    }
}

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;
        use axum::http::StatusCode;

        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        // RFC 7807 Problem Details; `source` is intentionally absent
        let body = serde_json::json!({
            "type": format!("https://httpstatuses.io/{}", self.status_code()),
            "title": self.kind().as_str(),
            "status": self.status_code(),
            "detail": self.message(),
            "action": self.action(),
        });

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    #[cfg(feature = "sqlx")]
    use super::*;
    #[cfg(feature = "sqlx")]
    use crate::error::kind::ErrorKind;

    #[cfg(feature = "sqlx")]
    #[test]
    fn test_sqlx_row_not_found() {
        let app_err = AppError::from(&sqlx::Error::RowNotFound);
        assert_eq!(app_err.kind(), ErrorKind::NotFound);
    }

    #[cfg(feature = "sqlx")]
    #[test]
    fn test_sqlx_pool_timeout() {
        let app_err = AppError::from(&sqlx::Error::PoolTimedOut);
        assert_eq!(app_err.kind(), ErrorKind::ServiceUnavailable);
    }

    #[cfg(feature = "sqlx")]
    #[test]
    fn test_sqlx_detail_is_not_rendered() {
        let err = sqlx::Error::Protocol("relation \"bounties\" does not exist".into());
        let app_err = AppError::from(&err);
        assert_eq!(app_err.kind(), ErrorKind::InternalServerError);
        assert_eq!(app_err.message(), "Internal server error");
    }

    #[cfg(feature = "axum")]
    #[test]
    fn test_problem_body_shape() {
        use axum::response::IntoResponse;

        let response = crate::error::app_error::AppError::bad_request("Title is required")
            .into_response();
        assert_eq!(response.status(), axum::http::StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers()[axum::http::header::CONTENT_TYPE],
            "application/json"
        );
    }
}
