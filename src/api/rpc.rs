//! Served side of the refresh procedure.

use crate::api::with;
use crate::application_port::*;
use std::sync::Arc;
use warp::Filter;

const MAX_BODY_BYTES: u64 = 4 * 1024;

pub fn routes(
    refresh_service: Arc<dyn RefreshService>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    warp::post()
        .and(warp::path!("rpc" / "v1" / "refresh"))
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::json())
        .and(with(refresh_service))
        .and_then(refresh_token)
}

async fn refresh_token(
    body: RefreshRequest,
    refresh_service: Arc<dyn RefreshService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    refresh_service
        .refresh_token(&body.user_id, &body.short_identifier)
        .await;
    Ok(warp::reply::json(&RefreshAck::default()))
}
