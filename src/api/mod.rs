pub mod rpc;
pub mod v1;

use std::convert::Infallible;
use std::sync::Arc;
use warp::Filter;

pub(crate) fn with<ServiceType>(
    service: Arc<ServiceType>,
) -> impl Filter<Extract = (Arc<ServiceType>,), Error = Infallible> + Clone
where
    ServiceType: Send + Sync + ?Sized,
{
    warp::any().map(move || service.clone())
}
