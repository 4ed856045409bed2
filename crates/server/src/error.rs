use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use comparcar_core::errors::{ApplicationError, InterfaceError};
use comparcar_core::validation::FieldViolation;
use serde::Serialize;
use tracing::{error, warn};
use uuid::Uuid;

/// HTTP rendering of an [`InterfaceError`].
#[derive(Debug)]
pub struct ApiError(pub InterfaceError);

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<FieldViolation>,
    pub correlation_id: String,
}

impl ApiError {
    /// Rejections raised by extractors before a request reaches the catalog.
    pub fn malformed_request(detail: impl Into<String>) -> Self {
        let correlation_id = Uuid::new_v4().to_string();
        let message = detail.into();
        warn!(
            event_name = "http.request.rejected",
            correlation_id = %correlation_id,
            detail = %message,
            "malformed request rejected"
        );
        Self(InterfaceError::BadRequest { message, violations: Vec::new(), correlation_id })
    }

    pub fn status(&self) -> StatusCode {
        match self.0 {
            InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            InterfaceError::NotFound { .. } => StatusCode::NOT_FOUND,
            InterfaceError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            InterfaceError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(self) -> ErrorBody {
        let user_message = self.0.user_message();
        match self.0 {
            InterfaceError::BadRequest { message, violations, correlation_id } => {
                ErrorBody { error: "bad_request", message, violations, correlation_id }
            }
            InterfaceError::NotFound { message, correlation_id } => {
                ErrorBody { error: "not_found", message, violations: Vec::new(), correlation_id }
            }
            InterfaceError::ServiceUnavailable { correlation_id, .. } => ErrorBody {
                error: "service_unavailable",
                message: user_message.to_owned(),
                violations: Vec::new(),
                correlation_id,
            },
            InterfaceError::Internal { correlation_id, .. } => ErrorBody {
                error: "internal_error",
                message: user_message.to_owned(),
                violations: Vec::new(),
                correlation_id,
            },
        }
    }
}

impl From<ApplicationError> for ApiError {
    fn from(value: ApplicationError) -> Self {
        let correlation_id = Uuid::new_v4().to_string();
        match &value {
            ApplicationError::Domain(_) | ApplicationError::NotFound { .. } => warn!(
                event_name = "http.request.failed",
                correlation_id = %correlation_id,
                error = %value,
                "request could not be served"
            ),
            ApplicationError::Persistence(_) | ApplicationError::Configuration(_) => error!(
                event_name = "http.request.failed",
                correlation_id = %correlation_id,
                error = %value,
                "request failed on an internal dependency"
            ),
        }
        Self(value.into_interface(correlation_id))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(self.body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use comparcar_core::domain::car::CarId;
    use comparcar_core::errors::{ApplicationError, DomainError};

    use super::ApiError;

    #[test]
    fn taxonomy_maps_to_status_codes() {
        let cases = [
            (ApplicationError::Domain(DomainError::InvalidCar), StatusCode::BAD_REQUEST),
            (ApplicationError::NotFound { id: CarId(1) }, StatusCode::NOT_FOUND),
            (ApplicationError::Persistence("locked".to_owned()), StatusCode::SERVICE_UNAVAILABLE),
            (
                ApplicationError::Configuration("missing pool".to_owned()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(ApiError::from(error).status(), expected);
        }
    }

    #[test]
    fn internal_details_are_not_exposed() {
        let body =
            ApiError::from(ApplicationError::Persistence("disk I/O error".to_owned())).body();

        assert_eq!(body.error, "service_unavailable");
        assert!(!body.message.contains("disk"));
        assert!(!body.correlation_id.is_empty());
    }
}
