use crate::app::pages;
use crate::utils::error::PestError;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

impl IntoResponse for PestError {
    fn into_response(self) -> Response {
        let status = if self.is_client_error() {
            tracing::debug!("Rejected submission: {}", self);
            StatusCode::BAD_REQUEST
        } else {
            tracing::error!(
                "Request failed: {} (Category: {:?}, Severity: {:?})",
                self,
                self.category(),
                self.severity()
            );
            StatusCode::INTERNAL_SERVER_ERROR
        };

        // 伺服器錯誤不把內部細節送回瀏覽器
        let (message, suggestion) = if self.is_client_error() {
            (self.user_friendly_message(), self.recovery_suggestion())
        } else {
            (
                "The prediction could not be completed.".to_string(),
                "Please try again later.".to_string(),
            )
        };

        (status, Html(pages::render_error(&message, &suggestion))).into_response()
    }
}
