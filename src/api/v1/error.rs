use crate::api::v1::handler::ApiResponse;
use crate::application_port::*;
use serde::Serialize;
use std::convert::Infallible;
use thiserror::Error;
use tracing::{debug, error, warn};
use warp::http::header::WWW_AUTHENTICATE;
use warp::http::{HeaderValue, StatusCode};
use warp::{Rejection, Reply, reject};

pub async fn recover_error(err: Rejection) -> Result<impl warp::Reply, Infallible> {
    if let Some(rejection) = err.find::<ApiRejection>() {
        let code = rejection.code.clone();
        let status = code.status();
        let json = warp::reply::json(&ApiResponse::<()>::err(code.clone(), code.to_string()));
        let mut response = warp::reply::with_status(json, status).into_response();
        if let Some(challenge) = &rejection.challenge {
            if let Ok(value) = HeaderValue::from_str(challenge) {
                response.headers_mut().insert(WWW_AUTHENTICATE, value);
            }
        }
        Ok(response)
    } else if err.is_not_found() {
        Ok(plain(ApiErrorCode::NotFound))
    } else if err.find::<reject::InvalidHeader>().is_some()
        || err.find::<reject::MissingHeader>().is_some()
        || err.find::<reject::InvalidQuery>().is_some()
        || err.find::<warp::body::BodyDeserializeError>().is_some()
        || err.find::<reject::PayloadTooLarge>().is_some()
        || err.find::<reject::LengthRequired>().is_some()
        || err.find::<reject::UnsupportedMediaType>().is_some()
    {
        debug!("bad request: {:?}", err);
        Ok(plain(ApiErrorCode::BadRequest))
    } else if err.find::<reject::MethodNotAllowed>().is_some() {
        Ok(plain(ApiErrorCode::MethodNotAllowed))
    } else {
        error!("unhandled rejection: {:?}", err);
        Ok(plain(ApiErrorCode::InternalError))
    }
}

fn plain(code: ApiErrorCode) -> warp::reply::Response {
    let status = code.status();
    let json = warp::reply::json(&ApiResponse::<()>::err(code.clone(), code.to_string()));
    warp::reply::with_status(json, status).into_response()
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Error, Serialize, PartialEq, Eq)]
pub enum ApiErrorCode {
    #[error("Could not validate credentials")]
    Unauthenticated,
    #[error("Not enough permissions")]
    Forbidden,
    #[error("Session store unavailable")]
    StoreUnavailable,
    #[error("Bad request")]
    BadRequest,
    #[error("Not found")]
    NotFound,
    #[error("Method not allowed")]
    MethodNotAllowed,
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
            ApiErrorCode::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ApiErrorCode::StoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiErrorCode::BadRequest => StatusCode::BAD_REQUEST,
            ApiErrorCode::NotFound => StatusCode::NOT_FOUND,
            ApiErrorCode::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<AccessError> for ApiErrorCode {
    fn from(error: AccessError) -> Self {
        match error {
            AccessError::Unauthenticated(_) => ApiErrorCode::Unauthenticated,
            AccessError::Forbidden { .. } => ApiErrorCode::Forbidden,
            AccessError::Store(e) => {
                warn!("session store unavailable: {}", e);
                ApiErrorCode::StoreUnavailable
            }
        }
    }
}

impl From<SessionError> for ApiErrorCode {
    fn from(error: SessionError) -> Self {
        match error {
            SessionError::Store(e) => {
                warn!("session store unavailable: {}", e);
                ApiErrorCode::StoreUnavailable
            }
            SessionError::Codec(e) => ApiErrorCode::internal(e),
        }
    }
}

/// Rejection carrying the error code and, for 401/403, the
/// `WWW-Authenticate` challenge to send back.
#[derive(Debug)]
pub struct ApiRejection {
    pub code: ApiErrorCode,
    pub challenge: Option<String>,
}

impl ApiRejection {
    pub fn new(code: ApiErrorCode) -> Self {
        ApiRejection {
            code,
            challenge: None,
        }
    }

    pub fn with_challenge(code: ApiErrorCode, challenge: &str) -> Self {
        let challenge = matches!(
            code,
            ApiErrorCode::Unauthenticated | ApiErrorCode::Forbidden
        )
        .then(|| challenge.to_owned());
        ApiRejection { code, challenge }
    }
}

impl reject::Reject for ApiRejection {}

impl From<ApiErrorCode> for Rejection {
    fn from(code: ApiErrorCode) -> Self {
        reject::custom(ApiRejection::new(code))
    }
}
