use super::filter::*;
use super::handler;
use crate::api::with;
use crate::server::*;
use std::sync::Arc;
use warp::Filter;

pub fn routes(
    server: Arc<Server>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let current = warp::get()
        .and(warp::path("session"))
        .and(warp::path::end())
        .and(with_session(server.session_validator.clone(), &[]))
        .and_then(handler::current_session);

    let logout = warp::delete()
        .and(warp::path("session"))
        .and(warp::path::end())
        .and(with_session_no_refresh(server.session_validator.clone(), &[]))
        .and(with(server.revocation_handler.clone()))
        .and_then(handler::logout);

    current.or(logout)
}
