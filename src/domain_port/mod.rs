// store

mod kv_store;
mod restriction_store;
mod session_store;

pub use kv_store::*;
pub use restriction_store::*;
pub use session_store::*;

// time

mod clock;

pub use clock::*;
