mod issuance_handler;
mod refresh_client_local;
mod refresh_service_impl;
mod revocation_handler;
mod session_validator_impl;
mod token_codec_jwt;

pub use issuance_handler::*;
pub use refresh_client_local::*;
pub use refresh_service_impl::*;
pub use revocation_handler::*;
pub use session_validator_impl::*;
pub use token_codec_jwt::*;
