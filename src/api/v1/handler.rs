use super::cookie::*;
use super::error::*;
use super::filter::AuthenticatedSession;
use crate::application_impl::{IssuanceHandler, RevocationHandler};
use crate::domain_model::*;
use crate::logger::*;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(code: ApiErrorCode, message: impl Into<String>) -> Self {
        ApiResponse {
            success: false,
            data: None,
            error: Some(ApiError {
                code,
                message: message.into(),
            }),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct IssueResponse {
    pub user_id: UserId,
    pub token: ShortId,
}

/// Completes a login once the embedding application has checked the
/// credentials: issues the session and sets the protected cookies.
/// A user id that cannot travel in a cookie is refused before anything is
/// stored.
pub async fn issue_session(
    principal: Principal,
    issuer: Arc<IssuanceHandler>,
) -> Result<impl warp::Reply, warp::Rejection> {
    if !is_cookie_value(principal.user_id.as_str()) {
        debug!(user_id = ?principal.user_id, "user id is not cookie-safe");
        return Err(ApiErrorCode::BadRequest.into());
    }

    let short_id = issuer
        .issue(&principal)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(warp::Rejection::from)?;

    let user_id = principal.user_id;
    let reply = warp::reply::json(&ApiResponse::ok(IssueResponse {
        user_id: user_id.clone(),
        token: short_id.clone(),
    }));
    Ok(set_session_cookies(reply, &user_id, &short_id))
}

pub async fn current_session(
    session: AuthenticatedSession,
) -> Result<impl warp::Reply, warp::Rejection> {
    Ok(warp::reply::json(&ApiResponse::ok(session.claims)))
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub user_id: UserId,
    pub revoked: ShortId,
}

pub async fn logout(
    session: AuthenticatedSession,
    revoker: Arc<RevocationHandler>,
) -> Result<impl warp::Reply, warp::Rejection> {
    revoker
        .revoke(&session.user_id, &session.short_id)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(warp::Rejection::from)?;

    Ok(clear_session_cookies(warp::reply::json(&ApiResponse::ok(
        LogoutResponse {
            user_id: session.user_id,
            revoked: session.short_id,
        },
    ))))
}
