use diesel::result::{DatabaseErrorKind, Error as DieselError};
use rocket::http::Status;
use rocket::request::Request;
use rocket::response::{self, Responder};
use rocket::serde::json::Json;
use tracing::{error, warn};

use crate::utils::error_response;

pub const INVALID_REQUEST: &str = "Invalid request";
pub const INTERNAL_ERROR: &str = "Internal server error";
pub const ROUTE_NOT_FOUND: &str = "Route not found";

// SQLSTATE 22P02 has no kind of its own in Diesel, Postgres reports it under
// this message prefix.
const INVALID_TEXT_REPRESENTATION: &str = "invalid input syntax";

/// Checks a request body and turns it into what the handler needs, before
/// anything is sent to the database.
pub trait Validate
where
    Self: Sized,
{
    type Output;
    fn validate(self) -> Result<Self::Output, ApiError>;
}

#[derive(Debug)]
pub enum ApiError {
    InvalidInput(&'static str),
    NotFound(&'static str),
    Diesel(DieselError),
    Pool(r2d2::Error),
    Internal,
}

impl ApiError {
    pub fn invalid_request() -> ApiError {
        ApiError::InvalidInput(INVALID_REQUEST)
    }

    /// The status and message a client sees for this error.
    pub fn status_and_message(&self) -> (Status, &'static str) {
        match self {
            ApiError::InvalidInput(msg) => (Status::BadRequest, *msg),
            ApiError::NotFound(msg) => (Status::NotFound, *msg),
            ApiError::Diesel(error) if is_bad_input(error) => (Status::BadRequest, INVALID_REQUEST),
            _ => (Status::InternalServerError, INTERNAL_ERROR),
        }
    }
}

fn is_bad_input(error: &DieselError) -> bool {
    match error {
        DieselError::DatabaseError(DatabaseErrorKind::NotNullViolation, _) => true,
        DieselError::DatabaseError(_, info) => {
            info.message().starts_with(INVALID_TEXT_REPRESENTATION)
        }
        _ => false,
    }
}

impl From<DieselError> for ApiError {
    fn from(err: DieselError) -> ApiError {
        ApiError::Diesel(err)
    }
}

impl From<r2d2::Error> for ApiError {
    fn from(err: r2d2::Error) -> ApiError {
        ApiError::Pool(err)
    }
}

pub type ApiResult<T> = Result<Json<T>, ApiError>;

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        let (status, msg) = self.status_and_message();
        if status == Status::InternalServerError {
            error!(error = ?self, method = %req.method(), uri = %req.uri(), "request failed");
        } else if let ApiError::Diesel(ref e) = self {
            warn!(error = %e, uri = %req.uri(), "database rejected request input");
        }
        error_response(status, msg).respond_to(req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::result::DatabaseErrorInformation;

    struct FakeInfo(&'static str);

    impl DatabaseErrorInformation for FakeInfo {
        fn message(&self) -> &str {
            self.0
        }
        fn details(&self) -> Option<&str> {
            None
        }
        fn hint(&self) -> Option<&str> {
            None
        }
        fn table_name(&self) -> Option<&str> {
            None
        }
        fn column_name(&self) -> Option<&str> {
            None
        }
        fn constraint_name(&self) -> Option<&str> {
            None
        }
        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    fn database_error(kind: DatabaseErrorKind, message: &'static str) -> ApiError {
        DieselError::DatabaseError(kind, Box::new(FakeInfo(message))).into()
    }

    #[test]
    fn typed_rejections_keep_their_message() {
        assert_eq!(
            ApiError::NotFound("Topic not found").status_and_message(),
            (Status::NotFound, "Topic not found")
        );
        assert_eq!(
            ApiError::InvalidInput("Invalid request: username required").status_and_message(),
            (Status::BadRequest, "Invalid request: username required")
        );
    }

    #[test]
    fn malformed_input_from_postgres_is_bad_request() {
        let err = database_error(
            DatabaseErrorKind::Unknown,
            "invalid input syntax for type integer: \"words\"",
        );
        assert_eq!(err.status_and_message(), (Status::BadRequest, INVALID_REQUEST));
    }

    #[test]
    fn not_null_violation_is_bad_request() {
        let err = database_error(
            DatabaseErrorKind::NotNullViolation,
            "null value in column \"body\" violates not-null constraint",
        );
        assert_eq!(err.status_and_message(), (Status::BadRequest, INVALID_REQUEST));
    }

    #[test]
    fn anything_else_is_internal() {
        let unique = database_error(DatabaseErrorKind::UniqueViolation, "duplicate key");
        assert_eq!(
            unique.status_and_message(),
            (Status::InternalServerError, INTERNAL_ERROR)
        );
        assert_eq!(
            ApiError::from(DieselError::NotFound).status_and_message(),
            (Status::InternalServerError, INTERNAL_ERROR)
        );
        assert_eq!(
            ApiError::Internal.status_and_message(),
            (Status::InternalServerError, INTERNAL_ERROR)
        );
    }
}
