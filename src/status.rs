//! Status codes returned by the queue service.
//!
//! Codes with the high bit set are failures; everything else, including the
//! informational `0x400E_xxxx` range, counts as success.

use core::fmt::{self, Display};

use crate::Error;

/// A raw queue service status code.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct ServiceStatus(pub u32);

impl ServiceStatus {
    pub const OK: Self = Self(0);
    pub const GENERIC_ERROR: Self = Self(0xC00E_0001);
    pub const PROPERTY: Self = Self(0xC00E_0002);
    pub const QUEUE_NOT_FOUND: Self = Self(0xC00E_0003);
    pub const QUEUE_EXISTS: Self = Self(0xC00E_0005);
    pub const INVALID_PARAMETER: Self = Self(0xC00E_0006);
    pub const INVALID_HANDLE: Self = Self(0xC00E_0007);
    pub const SERVICE_NOT_AVAILABLE: Self = Self(0xC00E_000B);
    pub const NO_DS: Self = Self(0xC00E_0013);
    pub const ILLEGAL_QUEUE_PATHNAME: Self = Self(0xC00E_0014);
    pub const ILLEGAL_FORMATNAME: Self = Self(0xC00E_001E);
    pub const FORMATNAME_BUFFER_TOO_SMALL: Self = Self(0xC00E_001F);
    pub const UNSUPPORTED_FORMATNAME_OPERATION: Self = Self(0xC00E_0020);
    pub const ILLEGAL_SECURITY_DESCRIPTOR: Self = Self(0xC00E_0021);
    /// The supplied buffer cannot hold the descriptor; `bytes_needed` says how much can.
    pub const SECURITY_DESCRIPTOR_TOO_SMALL: Self = Self(0xC00E_0023);
    pub const ACCESS_DENIED: Self = Self(0xC00E_0025);
    pub const PRIVILEGE_NOT_HELD: Self = Self(0xC00E_0026);
    pub const INSUFFICIENT_RESOURCES: Self = Self(0xC00E_0027);

    #[inline]
    #[must_use]
    pub const fn code(self) -> u32 {
        self.0
    }

    /// `true` unless the severity bit is set.
    #[inline]
    #[must_use]
    pub const fn is_success(self) -> bool {
        self.0 & 0x8000_0000 == 0
    }

    /// Description from [`KNOWN_STATUSES`], or `"unknown status"`.
    #[must_use]
    pub fn message(self) -> &'static str {
        KNOWN_STATUSES
            .iter()
            .find(|(status, _)| *status == self)
            .map_or("unknown status", |(_, message)| message)
    }

    /// `Ok(())` for success codes, [`Error::ServiceError`] otherwise.
    ///
    /// # Errors
    /// When [`Self::is_success`] is `false`.
    #[inline]
    pub fn into_result(self) -> Result<(), Error> {
        if self.is_success() {
            Ok(())
        } else {
            Err(Error::from(self))
        }
    }
}

impl From<u32> for ServiceStatus {
    #[inline]
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<ServiceStatus> for u32 {
    #[inline]
    fn from(value: ServiceStatus) -> Self {
        value.0
    }
}

impl Display for ServiceStatus {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08X} ({})", self.0, self.message())
    }
}

/// Every status code this crate knows a description for.
pub static KNOWN_STATUSES: &[(ServiceStatus, &str)] = &[
    (ServiceStatus::OK, "success"),
    (ServiceStatus::GENERIC_ERROR, "generic queue service error"),
    (ServiceStatus::PROPERTY, "one or more properties caused an error"),
    (ServiceStatus::QUEUE_NOT_FOUND, "the queue does not exist"),
    (ServiceStatus::QUEUE_EXISTS, "a queue with the same path name already exists"),
    (ServiceStatus::INVALID_PARAMETER, "an invalid parameter was passed"),
    (ServiceStatus::INVALID_HANDLE, "an invalid handle was passed"),
    (ServiceStatus::SERVICE_NOT_AVAILABLE, "the queue service is not available"),
    (ServiceStatus::NO_DS, "the directory service is not reachable"),
    (ServiceStatus::ILLEGAL_QUEUE_PATHNAME, "the queue path name is invalid"),
    (ServiceStatus::ILLEGAL_FORMATNAME, "the format name is invalid"),
    (ServiceStatus::FORMATNAME_BUFFER_TOO_SMALL, "the format name buffer is too small"),
    (
        ServiceStatus::UNSUPPORTED_FORMATNAME_OPERATION,
        "the operation is not supported for this format name",
    ),
    (ServiceStatus::ILLEGAL_SECURITY_DESCRIPTOR, "the security descriptor is invalid"),
    (
        ServiceStatus::SECURITY_DESCRIPTOR_TOO_SMALL,
        "the security descriptor buffer is too small",
    ),
    (ServiceStatus::ACCESS_DENIED, "access to the queue is denied"),
    (ServiceStatus::PRIVILEGE_NOT_HELD, "the caller does not hold the required privilege"),
    (ServiceStatus::INSUFFICIENT_RESOURCES, "insufficient resources to complete the operation"),
];
