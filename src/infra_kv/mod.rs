mod restriction_store_kv;
mod session_store_kv;

pub use restriction_store_kv::*;
pub use session_store_kv::*;
