mod refresh_client_http;

pub use refresh_client_http::*;
