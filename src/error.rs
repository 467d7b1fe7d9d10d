use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PeelError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("duplicate key {0:#018x} in key set")]
    DuplicateKey(u64),
}

pub(crate) fn invalid(msg: impl Into<String>) -> PeelError {
    PeelError::InvalidParameter(msg.into())
}
