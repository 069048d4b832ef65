mod claims;
mod session;
mod user;

pub use claims::*;
pub use session::*;
pub use user::*;
