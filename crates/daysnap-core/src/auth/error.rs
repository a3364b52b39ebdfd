use thiserror::Error;

use super::Base64Address;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Authorization failed: {0}")]
    AuthorizationFailed(String),

    #[error("{0} is no longer authorized")]
    AccountNotAuthorized(Base64Address),

    #[error("Invalid account address: {0}")]
    InvalidAddress(String),
}
