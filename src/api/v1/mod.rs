mod cookie;
mod error;
mod filter;
mod handler;
mod router;

pub use cookie::*;
pub use error::*;
pub use filter::*;
pub use handler::{ApiResponse, IssueResponse, issue_session};
pub use router::routes;
