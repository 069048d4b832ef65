use crate::application_port::CodecError;
use crate::domain_port::StoreError;

/// Failure of login/logout bookkeeping.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("token codec error: {0}")]
    Codec(#[from] CodecError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
