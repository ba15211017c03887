use crate::api::v1::handler::ApiResponse;
use crate::application_port::*;
use crate::domain_model::ChainError;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use thiserror::Error;
use tracing::{error, warn};
use warp::http::StatusCode;
use warp::{Rejection, reject};

pub async fn recover_error(err: Rejection) -> Result<impl warp::Reply, Infallible> {
    let code = if let Some(code) = err.find::<ApiErrorCode>() {
        *code
    } else if err.is_not_found() {
        ApiErrorCode::NotFound
    } else if err.find::<reject::MethodNotAllowed>().is_some() {
        ApiErrorCode::MethodNotAllowed
    } else if let Some(missing) = err.find::<reject::MissingHeader>() {
        if missing.name().eq_ignore_ascii_case("authorization") {
            ApiErrorCode::InvalidToken
        } else {
            ApiErrorCode::InvalidInput
        }
    } else if err.find::<reject::PayloadTooLarge>().is_some() {
        ApiErrorCode::PayloadTooLarge
    } else if err.find::<warp::filters::body::BodyDeserializeError>().is_some()
        || err.find::<reject::UnsupportedMediaType>().is_some()
        || err.find::<reject::InvalidHeader>().is_some()
        || err.find::<reject::LengthRequired>().is_some()
    {
        ApiErrorCode::InvalidInput
    } else {
        error!("Unhandled rejection: {:?}", err);
        ApiErrorCode::InternalError
    };

    let json = warp::reply::json(&ApiResponse::<()>::err(code, code.to_string()));
    Ok(warp::reply::with_status(json, code.status()))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ApiErrorCode {
    #[error("All input is required")]
    MissingInput,
    #[error("Invalid input")]
    InvalidInput,
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("Email already registered")]
    EmailTaken,
    #[error("Username already taken")]
    UsernameTaken,
    #[error("Token is not valid")]
    InvalidToken,
    #[error("Not allowed to modify this user")]
    Forbidden,
    #[error("Not found")]
    NotFound,
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("Payload too large")]
    PayloadTooLarge,
    #[error("No consumer matched the identifier")]
    NoConsumerMatch,
    #[error("Credit bureau unavailable")]
    BureauUnavailable,
    #[error("Internal error")]
    InternalError,
}

impl ApiErrorCode {
    pub fn internal<E: std::fmt::Display>(error: E) -> ApiErrorCode {
        warn!("Internal error: {}", error);
        ApiErrorCode::InternalError
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiErrorCode::MissingInput
            | ApiErrorCode::InvalidInput
            | ApiErrorCode::InvalidCredentials => StatusCode::BAD_REQUEST,
            ApiErrorCode::EmailTaken | ApiErrorCode::UsernameTaken => StatusCode::CONFLICT,
            ApiErrorCode::InvalidToken => StatusCode::UNAUTHORIZED,
            ApiErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ApiErrorCode::NotFound | ApiErrorCode::NoConsumerMatch => StatusCode::NOT_FOUND,
            ApiErrorCode::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiErrorCode::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiErrorCode::BureauUnavailable => StatusCode::BAD_GATEWAY,
            ApiErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl reject::Reject for ApiErrorCode {}

impl From<AuthError> for ApiErrorCode {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::MissingInput(_) => ApiErrorCode::MissingInput,
            AuthError::InvalidCredentials => ApiErrorCode::InvalidCredentials,
            AuthError::EmailTaken => ApiErrorCode::EmailTaken,
            AuthError::UsernameTaken => ApiErrorCode::UsernameTaken,
            AuthError::UserNotFound | AuthError::TokenInvalid | AuthError::TokenExpired => {
                ApiErrorCode::InvalidToken
            }
            AuthError::Photo(_) => ApiErrorCode::InvalidInput,
            AuthError::Store(e) => ApiErrorCode::internal(e),
            AuthError::InternalError(e) => ApiErrorCode::internal(e),
        }
    }
}

impl From<AdminUserError> for ApiErrorCode {
    fn from(error: AdminUserError) -> Self {
        match error {
            AdminUserError::MissingInput(_) => ApiErrorCode::MissingInput,
            AdminUserError::EmailTaken => ApiErrorCode::EmailTaken,
            AdminUserError::UsernameTaken => ApiErrorCode::UsernameTaken,
            AdminUserError::NotFound => ApiErrorCode::NotFound,
            AdminUserError::Unauthenticated => ApiErrorCode::InvalidToken,
            AdminUserError::Forbidden(_) => ApiErrorCode::Forbidden,
            AdminUserError::Store(e) => ApiErrorCode::internal(e),
            AdminUserError::InternalError(e) => ApiErrorCode::internal(e),
        }
    }
}

impl From<CreditBureauError> for ApiErrorCode {
    fn from(error: CreditBureauError) -> Self {
        match error {
            CreditBureauError::MissingIdentifier => ApiErrorCode::MissingInput,
            CreditBureauError::Chain(ChainError::NoConsumerMatch) => ApiErrorCode::NoConsumerMatch,
            CreditBureauError::Configuration(e) => ApiErrorCode::internal(e),
            other => {
                warn!("Credit bureau failure: {}", other);
                ApiErrorCode::BureauUnavailable
            }
        }
    }
}
