mod refresh_service;
mod session_handler;
mod session_validator;
mod token_codec;

pub use refresh_service::*;
pub use session_handler::*;
pub use session_validator::*;
pub use token_codec::*;
