use alloc::string::String;

use thiserror::Error;

use crate::{InvalidSidFormat, SecurityIdentifier, ServiceStatus};

/// Every way a descriptor decode or an access query can fail.
///
/// Decode failures (`Malformed*`, [`Error::UnsupportedDescriptorFormat`]) are
/// kept apart from lookup outcomes such as [`Error::PrincipalNotInAcl`], so a
/// caller can tell "no entry for this principal" from "the data is corrupt".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum Error {
    /// A collaborator returned a failure status.
    #[error("queue service returned 0x{code:08X}: {message}")]
    ServiceError {
        /// Raw status code.
        code: u32,
        /// Description from the known status table.
        message: &'static str,
    },

    /// The descriptor is not in self-relative form.
    #[error("security descriptor is not self-relative (control 0x{control:04X})")]
    UnsupportedDescriptorFormat {
        /// The control word that was read.
        control: u16,
    },

    /// The descriptor header or one of its offsets is invalid.
    #[error("malformed security descriptor: {reason}")]
    MalformedDescriptor {
        /// What was wrong.
        reason: &'static str,
    },

    /// The ACL header or its entry count is invalid.
    #[error("malformed ACL: {reason}")]
    MalformedAcl {
        /// What was wrong.
        reason: &'static str,
    },

    /// An entry could not be decoded. `offset` is relative to the ACL start.
    #[error("malformed ACE at offset {offset}: {reason}")]
    MalformedAce {
        /// Byte offset of the entry.
        offset: usize,
        /// What was wrong.
        reason: &'static str,
    },

    /// A SID header or length is invalid.
    #[error("malformed SID: {reason}")]
    MalformedSid {
        /// What was wrong.
        reason: &'static str,
    },

    /// The DACL holds no allow entry for the requested principal.
    #[error("no access-allowed entry for {sid}")]
    PrincipalNotInAcl {
        /// The principal that was searched for.
        sid: SecurityIdentifier,
    },

    /// The owner offset of the descriptor is zero.
    #[error("security descriptor records no owner")]
    NoOwnerRecorded,

    /// The identity resolver could not translate a name or SID.
    #[error("unknown principal: {principal}")]
    UnknownPrincipal {
        /// The name or SID text that failed to resolve.
        principal: String,
    },

    /// The two-phase fetch saw sizes that do not agree.
    #[error("inconsistent size report: probed {probed} bytes, service now reports {reported}")]
    InconsistentSizeReport {
        /// Size obtained from the probe, zero if the probe itself was off.
        probed: u32,
        /// Size reported by the call that failed.
        reported: u32,
    },

    /// Text is not a valid SID string.
    #[error(transparent)]
    InvalidSidFormat(#[from] InvalidSidFormat),
}

impl Error {
    /// `true` for failures caused by corrupt or unsupported descriptor bytes.
    #[inline]
    #[must_use]
    pub const fn is_malformed(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedDescriptorFormat { .. }
                | Self::MalformedDescriptor { .. }
                | Self::MalformedAcl { .. }
                | Self::MalformedAce { .. }
                | Self::MalformedSid { .. }
        )
    }
}

impl From<ServiceStatus> for Error {
    #[inline]
    fn from(status: ServiceStatus) -> Self {
        Self::ServiceError {
            code: status.code(),
            message: status.message(),
        }
    }
}

/// Result alias used across the crate.
pub type Result<T, E = Error> = core::result::Result<T, E>;
