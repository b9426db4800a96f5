use core::num::NonZeroU32;

use thiserror::Error;
use windows_sys::Win32::Foundation::{
    ERROR_ACCESS_DENIED, ERROR_BAD_NETPATH, ERROR_INSUFFICIENT_BUFFER, ERROR_INVALID_PARAMETER,
    ERROR_INVALID_SID, ERROR_NO_SUCH_DOMAIN, ERROR_NONE_MAPPED, ERROR_TRUSTED_DOMAIN_FAILURE,
};

/// Errors returned by `LookupAccountSidW` and `LookupAccountNameW`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum LookupError {
    #[error("the SID is not valid")]
    InvalidSid,
    #[error("a parameter is not valid")]
    InvalidParameter,
    /// The name or SID is not mapped to any account.
    #[error("no account is mapped to the principal")]
    NoneMapped,
    #[error("access denied")]
    AccessDenied,
    /// The target system could not be reached.
    #[error("the network path was not found")]
    NetworkPathNotFound,
    #[error("the domain does not exist or could not be contacted")]
    NoSuchDomain,
    #[error("the trust relationship with the domain failed")]
    TrustedRelationshipFailure,
    /// The reported buffer sizes kept growing between calls.
    #[error("the lookup buffer size kept changing")]
    InsufficientBuffer,
    #[error("Win32 error {0}")]
    Other(u32),
}

impl From<NonZeroU32> for LookupError {
    #[inline]
    fn from(code: NonZeroU32) -> Self {
        match code.get() {
            ERROR_INVALID_SID => Self::InvalidSid,
            ERROR_INVALID_PARAMETER => Self::InvalidParameter,
            ERROR_NONE_MAPPED => Self::NoneMapped,
            ERROR_ACCESS_DENIED => Self::AccessDenied,
            ERROR_BAD_NETPATH => Self::NetworkPathNotFound,
            ERROR_NO_SUCH_DOMAIN => Self::NoSuchDomain,
            ERROR_TRUSTED_DOMAIN_FAILURE => Self::TrustedRelationshipFailure,
            ERROR_INSUFFICIENT_BUFFER => Self::InsufficientBuffer,
            other => Self::Other(other),
        }
    }
}

impl From<LookupError> for u32 {
    #[inline]
    fn from(error: LookupError) -> Self {
        match error {
            LookupError::InvalidSid => ERROR_INVALID_SID,
            LookupError::InvalidParameter => ERROR_INVALID_PARAMETER,
            LookupError::NoneMapped => ERROR_NONE_MAPPED,
            LookupError::AccessDenied => ERROR_ACCESS_DENIED,
            LookupError::NetworkPathNotFound => ERROR_BAD_NETPATH,
            LookupError::NoSuchDomain => ERROR_NO_SUCH_DOMAIN,
            LookupError::TrustedRelationshipFailure => ERROR_TRUSTED_DOMAIN_FAILURE,
            LookupError::InsufficientBuffer => ERROR_INSUFFICIENT_BUFFER,
            LookupError::Other(other) => other,
        }
    }
}
