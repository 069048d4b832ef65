use super::cookie::*;
use super::error::*;
use crate::application_port::*;
use crate::domain_model::*;
use std::sync::Arc;
use warp::{Filter, reject};

#[derive(Debug, Clone)]
pub struct AuthenticatedSession {
    pub user_id: UserId,
    pub short_id: ShortId,
    pub claims: Claims,
}

/// `WWW-Authenticate` value advertised for a protected operation.
pub fn challenge(required: &Scopes) -> String {
    if required.is_empty() {
        "Bearer".to_string()
    } else {
        format!(
            "Bearer scope=\"{}\"",
            required.iter().collect::<Vec<_>>().join(" ")
        )
    }
}

/// Validates the session cookies against `scopes`. The client may opt out
/// of background rotation with a `refresh: false` header; any value other
/// than `true`/`false` counts as absent.
pub fn with_session(
    validator: Arc<dyn SessionValidator>,
    scopes: &[&str],
) -> impl Filter<Extract = (AuthenticatedSession,), Error = warp::Rejection> + Clone {
    session_filter(validator, Scopes::new(scopes.iter().copied()), true)
}

/// Like [`with_session`] but never schedules a rotation, for operations
/// such as logout that must not race a refresh.
pub fn with_session_no_refresh(
    validator: Arc<dyn SessionValidator>,
    scopes: &[&str],
) -> impl Filter<Extract = (AuthenticatedSession,), Error = warp::Rejection> + Clone {
    session_filter(validator, Scopes::new(scopes.iter().copied()), false)
}

fn refresh_preference(header: Option<&str>) -> bool {
    header
        .and_then(|value| value.trim().to_ascii_lowercase().parse::<bool>().ok())
        .unwrap_or(true)
}

fn session_filter(
    validator: Arc<dyn SessionValidator>,
    required: Scopes,
    allow_refresh: bool,
) -> impl Filter<Extract = (AuthenticatedSession,), Error = warp::Rejection> + Clone {
    let challenge = challenge(&required);
    warp::cookie::optional::<String>(USER_ID_COOKIE)
        .and(warp::cookie::optional::<String>(SESSION_COOKIE))
        .and(warp::header::optional::<String>(REFRESH_HEADER))
        .and_then(
            move |user_id: Option<String>, short_id: Option<String>, refresh: Option<String>| {
                let validator = validator.clone();
                let required = required.clone();
                let challenge = challenge.clone();
                async move {
                    let (Some(user_id), Some(short_id)) = (user_id, short_id) else {
                        return Err(reject::custom(ApiRejection::with_challenge(
                            ApiErrorCode::Unauthenticated,
                            &challenge,
                        )));
                    };
                    let request = AccessRequest {
                        user_id: UserId(user_id),
                        short_id: ShortId(short_id),
                        required_scopes: required,
                        refresh: allow_refresh && refresh_preference(refresh.as_deref()),
                    };
                    let claims = validator.validate(&request).await.map_err(|e| {
                        reject::custom(ApiRejection::with_challenge(
                            ApiErrorCode::from(e),
                            &challenge,
                        ))
                    })?;
                    Ok(AuthenticatedSession {
                        user_id: request.user_id,
                        short_id: request.short_id,
                        claims,
                    })
                }
            },
        )
}
