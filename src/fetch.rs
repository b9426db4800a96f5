//! Collaborators that locate a queue and hand back its security descriptor.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use log::debug;

use crate::{Error, Result, SecurityInformation, ServiceStatus};

/// Turns a queue path name into the format name the service addresses it by.
pub trait FormatNameResolver {
    /// # Errors
    /// The service status when the path cannot be resolved.
    fn resolve_path(&self, path: &str) -> Result<String, ServiceStatus>;
}

/// Outcome of one [`SecurityInfoSource::fetch_security_info`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FetchResult {
    /// Status the service answered with.
    pub status: ServiceStatus,
    /// Size the descriptor needs, as reported by the service.
    pub bytes_needed: u32,
}

impl FetchResult {
    /// Pairs a status with the size the service reported.
    #[inline]
    #[must_use]
    pub const fn new(status: ServiceStatus, bytes_needed: u32) -> Self {
        Self {
            status,
            bytes_needed,
        }
    }
}

/// Copies a queue's security descriptor into a caller-supplied buffer.
///
/// When `buffer` is too small the source must answer
/// [`ServiceStatus::SECURITY_DESCRIPTOR_TOO_SMALL`] with the size it needs.
pub trait SecurityInfoSource {
    /// Fills `buffer` with the `info` parts of the descriptor of the queue
    /// named `format_name`.
    fn fetch_security_info(
        &self,
        format_name: &str,
        info: SecurityInformation,
        buffer: &mut [u8],
    ) -> FetchResult;
}

impl<T: FormatNameResolver + ?Sized> FormatNameResolver for &T {
    #[inline]
    fn resolve_path(&self, path: &str) -> Result<String, ServiceStatus> {
        (**self).resolve_path(path)
    }
}

impl<T: FormatNameResolver + ?Sized> FormatNameResolver for Box<T> {
    #[inline]
    fn resolve_path(&self, path: &str) -> Result<String, ServiceStatus> {
        (**self).resolve_path(path)
    }
}

impl<T: SecurityInfoSource + ?Sized> SecurityInfoSource for &T {
    #[inline]
    fn fetch_security_info(
        &self,
        format_name: &str,
        info: SecurityInformation,
        buffer: &mut [u8],
    ) -> FetchResult {
        (**self).fetch_security_info(format_name, info, buffer)
    }
}

impl<T: SecurityInfoSource + ?Sized> SecurityInfoSource for Box<T> {
    #[inline]
    fn fetch_security_info(
        &self,
        format_name: &str,
        info: SecurityInformation,
        buffer: &mut [u8],
    ) -> FetchResult {
        (**self).fetch_security_info(format_name, info, buffer)
    }
}

/// Size of a descriptor as reported by the probe call.
///
/// # Errors
/// - [`Error::ServiceError`] for any failure other than "too small".
/// - [`Error::InconsistentSizeReport`] if the probe succeeds with an empty
///   buffer or reports a zero size.
#[inline]
pub fn probe_descriptor_size<S: SecurityInfoSource + ?Sized>(
    source: &S,
    format_name: &str,
    info: SecurityInformation,
) -> Result<u32> {
    let probe = source.fetch_security_info(format_name, info, &mut []);
    debug!(
        "probed {format_name}: status {}, {} bytes needed",
        probe.status, probe.bytes_needed
    );
    match probe.status {
        ServiceStatus::SECURITY_DESCRIPTOR_TOO_SMALL if probe.bytes_needed > 0 => {
            Ok(probe.bytes_needed)
        }
        status if status.is_success() || status == ServiceStatus::SECURITY_DESCRIPTOR_TOO_SMALL => {
            Err(Error::InconsistentSizeReport {
                probed: 0,
                reported: probe.bytes_needed,
            })
        }
        status => Err(status.into()),
    }
}

/// Fetches a descriptor into a buffer of exactly `bytes_needed` bytes.
///
/// # Errors
/// - [`Error::InconsistentSizeReport`] if the service still answers
///   "too small".
/// - [`Error::ServiceError`] for any other failure.
#[inline]
pub fn fetch_sized_descriptor<S: SecurityInfoSource + ?Sized>(
    source: &S,
    format_name: &str,
    info: SecurityInformation,
    bytes_needed: u32,
) -> Result<Vec<u8>> {
    let inconsistent = |reported| Error::InconsistentSizeReport {
        probed: bytes_needed,
        reported,
    };
    let len = usize::try_from(bytes_needed).map_err(|_| inconsistent(bytes_needed))?;
    let mut buffer = vec![0u8; len];
    let fetched = source.fetch_security_info(format_name, info, &mut buffer);
    debug!(
        "fetched {format_name} into {len} bytes: status {}, {} bytes needed",
        fetched.status, fetched.bytes_needed
    );
    if fetched.status == ServiceStatus::SECURITY_DESCRIPTOR_TOO_SMALL {
        return Err(inconsistent(fetched.bytes_needed));
    }
    fetched.status.into_result()?;
    Ok(buffer)
}

/// Fetches the descriptor parts named by `info` with the two-phase protocol:
/// probe with an empty buffer for the size, then fetch into a buffer of
/// exactly that size.
///
/// # Errors
/// See [`probe_descriptor_size`] and [`fetch_sized_descriptor`].
///
/// # Examples
/// ```rust
/// # use queue_security::{fetch_descriptor, FetchResult, SecurityInfoSource, SecurityInformation, ServiceStatus};
/// struct Fixed(Vec<u8>);
///
/// impl SecurityInfoSource for Fixed {
///     fn fetch_security_info(&self, _: &str, _: SecurityInformation, buffer: &mut [u8]) -> FetchResult {
///         let needed = u32::try_from(self.0.len()).unwrap();
///         if buffer.len() < self.0.len() {
///             return FetchResult::new(ServiceStatus::SECURITY_DESCRIPTOR_TOO_SMALL, needed);
///         }
///         buffer[..self.0.len()].copy_from_slice(&self.0);
///         FetchResult::new(ServiceStatus::OK, needed)
///     }
/// }
///
/// let source = Fixed(vec![7; 48]);
/// let bytes = fetch_descriptor(&source, "PUBLIC=1234", SecurityInformation::DACL).unwrap();
/// assert_eq!(bytes.len(), 48);
/// ```
#[inline]
pub fn fetch_descriptor<S: SecurityInfoSource + ?Sized>(
    source: &S,
    format_name: &str,
    info: SecurityInformation,
) -> Result<Vec<u8>> {
    let bytes_needed = probe_descriptor_size(source, format_name, info)?;
    fetch_sized_descriptor(source, format_name, info, bytes_needed)
}
