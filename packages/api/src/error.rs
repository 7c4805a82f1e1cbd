use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use shared::models::responses::ErrorResponse;
use shared::services::errors::ticket_service_errors::TicketServiceError;

#[derive(Debug)]
pub enum ApiError {
    TicketService(TicketServiceError),
    NotAuthenticated,
}

impl From<TicketServiceError> for ApiError {
    fn from(error: TicketServiceError) -> Self {
        ApiError::TicketService(error)
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotAuthenticated => StatusCode::UNAUTHORIZED,
            ApiError::TicketService(e) => match e {
                TicketServiceError::NotFound => StatusCode::NOT_FOUND,
                TicketServiceError::NotOwner => StatusCode::FORBIDDEN,
                TicketServiceError::NotActive | TicketServiceError::AlreadyActiveTicket => {
                    StatusCode::CONFLICT
                }
                TicketServiceError::InvalidCriteria(_) => StatusCode::BAD_REQUEST,
                TicketServiceError::ProfileLookup(_) | TicketServiceError::RepositoryError(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            ApiError::NotAuthenticated => "Not authenticated".to_string(),
            ApiError::TicketService(e) => e.to_string(),
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticket_errors_map_to_expected_status_codes() {
        let cases = [
            (
                ApiError::TicketService(TicketServiceError::NotFound),
                StatusCode::NOT_FOUND,
            ),
            (
                ApiError::TicketService(TicketServiceError::NotOwner),
                StatusCode::FORBIDDEN,
            ),
            (
                ApiError::TicketService(TicketServiceError::NotActive),
                StatusCode::CONFLICT,
            ),
            (
                ApiError::TicketService(TicketServiceError::AlreadyActiveTicket),
                StatusCode::CONFLICT,
            ),
            (
                ApiError::TicketService(TicketServiceError::InvalidCriteria(
                    "bad".to_string(),
                )),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::TicketService(TicketServiceError::RepositoryError(
                    "boom".to_string(),
                )),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (ApiError::NotAuthenticated, StatusCode::UNAUTHORIZED),
        ];

        for (error, expected) in cases {
            assert_eq!(error.status_code(), expected);
        }
    }
}
