use core::ffi::c_void;
use core::num::NonZeroU32;
use core::ptr::null;

use log::debug;
use num_enum::{TryFromPrimitive, TryFromPrimitiveError};
use smallvec::SmallVec;
use widestring::U16CString;
use windows_sys::Win32::Foundation::GetLastError;
use windows_sys::Win32::Security::{LookupAccountNameW, LookupAccountSidW};

use super::{IdentityResolver, LookupError};
use crate::{DomainAndName, SecurityIdentifier, Sid, SidType};

/// `SECURITY_MAX_SID_SIZE` in 32-bit words.
const MAX_SID_WORDS: usize = 17;
const MAX_ATTEMPTS: usize = 4;

type WideBuffer = SmallVec<[u16; 256]>;

/// Result of resolving a SID to an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidLookup {
    /// Account name and the domain it belongs to.
    pub domain_name: DomainAndName,
    /// Raw `SID_NAME_USE` value.
    pub sid_type_raw: i32,
}

impl SidLookup {
    /// # Errors
    /// If the raw value is not a known [`SidType`].
    #[inline]
    pub fn sid_type(&self) -> Result<SidType, TryFromPrimitiveError<SidType>> {
        SidType::try_from_primitive(self.sid_type_raw)
    }
}

/// Result of resolving an account name to a SID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameLookup {
    /// SID of the account.
    pub sid: SecurityIdentifier,
    /// Domain the account was found in.
    pub domain: String,
    /// Raw `SID_NAME_USE` value.
    pub sid_type_raw: i32,
}

impl NameLookup {
    /// # Errors
    /// If the raw value is not a known [`SidType`].
    #[inline]
    pub fn sid_type(&self) -> Result<SidType, TryFromPrimitiveError<SidType>> {
        SidType::try_from_primitive(self.sid_type_raw)
    }
}

/// Resolves principals through the Windows account database
/// (`LookupAccountNameW` / `LookupAccountSidW`).
#[derive(Debug, Clone, Default)]
pub struct LocalAccountResolver {
    system_name: Option<U16CString>,
}

impl LocalAccountResolver {
    /// Looks accounts up on the local machine.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self { system_name: None }
    }

    /// Looks accounts up on `system_name`.
    ///
    /// # Errors
    /// [`LookupError::InvalidParameter`] if the name contains a NUL.
    #[inline]
    pub fn with_system_name(system_name: &str) -> Result<Self, LookupError> {
        let system_name =
            U16CString::from_str(system_name).map_err(|_| LookupError::InvalidParameter)?;
        Ok(Self {
            system_name: Some(system_name),
        })
    }

    fn system_name_ptr(&self) -> *const u16 {
        self.system_name.as_ref().map_or(null(), |s| s.as_ptr())
    }

    /// Resolves `sid` to `DOMAIN\Name`.
    ///
    /// # Errors
    /// The Win32 failure of `LookupAccountSidW`.
    #[inline]
    pub fn lookup_sid(&self, sid: &Sid<'_>) -> Result<SidLookup, LookupError> {
        let mut raw_sid = aligned_sid(sid);
        let mut name = WideBuffer::new();
        let mut domain = WideBuffer::new();
        let mut name_len = 0u32;
        let mut domain_len = 0u32;
        let mut sid_type_raw = 0i32;

        for _ in 0..MAX_ATTEMPTS {
            name.resize(name_len as usize, 0);
            domain.resize(domain_len as usize, 0);
            // SAFETY: `raw_sid` holds a valid, 4-byte aligned SID; each output
            // buffer holds exactly the number of u16 its length argument says.
            let ok = unsafe {
                LookupAccountSidW(
                    self.system_name_ptr(),
                    raw_sid.as_mut_ptr().cast::<c_void>(),
                    name.as_mut_ptr(),
                    &raw mut name_len,
                    domain.as_mut_ptr(),
                    &raw mut domain_len,
                    &raw mut sid_type_raw,
                )
            };
            if ok != 0 {
                name.truncate(name_len as usize);
                domain.truncate(domain_len as usize);
                return Ok(SidLookup {
                    domain_name: DomainAndName::new(
                        String::from_utf16_lossy(&domain),
                        String::from_utf16_lossy(&name),
                    ),
                    sid_type_raw,
                });
            }
            match last_error() {
                LookupError::InsufficientBuffer => {}
                err => return Err(err),
            }
        }
        Err(LookupError::InsufficientBuffer)
    }

    /// Resolves an account name to its SID.
    ///
    /// # Errors
    /// The Win32 failure of `LookupAccountNameW`.
    #[inline]
    pub fn lookup_name(&self, account: &str) -> Result<NameLookup, LookupError> {
        let account = U16CString::from_str(account).map_err(|_| LookupError::InvalidParameter)?;
        let mut sid_words = [0u32; MAX_SID_WORDS];
        let mut domain = WideBuffer::new();
        let mut domain_len = 0u32;
        let mut sid_type_raw = 0i32;

        for _ in 0..MAX_ATTEMPTS {
            let mut sid_len = u32::try_from(size_of_val(&sid_words)).unwrap_or(0);
            domain.resize(domain_len as usize, 0);
            // SAFETY: `account` is NUL-terminated; `sid_words` is writable for
            // `sid_len` bytes and `domain` for `domain_len` u16.
            let ok = unsafe {
                LookupAccountNameW(
                    self.system_name_ptr(),
                    account.as_ptr(),
                    sid_words.as_mut_ptr().cast::<c_void>(),
                    &raw mut sid_len,
                    domain.as_mut_ptr(),
                    &raw mut domain_len,
                    &raw mut sid_type_raw,
                )
            };
            if ok != 0 {
                domain.truncate(domain_len as usize);
                let bytes: SmallVec<[u8; 68]> =
                    sid_words.iter().flat_map(|word| word.to_ne_bytes()).collect();
                let sid = bytes
                    .get(..sid_len as usize)
                    .and_then(|bytes| SecurityIdentifier::from_bytes(bytes).ok())
                    .ok_or(LookupError::InvalidSid)?;
                return Ok(NameLookup {
                    sid,
                    domain: String::from_utf16_lossy(&domain),
                    sid_type_raw,
                });
            }
            match last_error() {
                LookupError::InsufficientBuffer => {}
                err => return Err(err),
            }
        }
        Err(LookupError::InsufficientBuffer)
    }
}

impl IdentityResolver for LocalAccountResolver {
    #[inline]
    fn name_to_sid(&self, name: &str) -> Option<String> {
        self.lookup_name(name)
            .inspect_err(|err| debug!("LookupAccountNameW({name}) failed: {err}"))
            .ok()
            .map(|found| found.sid.to_string())
    }

    #[inline]
    fn sid_to_name(&self, sid: &Sid<'_>) -> Option<String> {
        self.lookup_sid(sid)
            .inspect_err(|err| debug!("LookupAccountSidW({sid}) failed: {err}"))
            .ok()
            .map(|found| found.domain_name.to_string())
    }
}

/// Copies a SID into 4-byte aligned storage for the Win32 API.
fn aligned_sid(sid: &Sid<'_>) -> [u32; MAX_SID_WORDS] {
    let mut words = [0u32; MAX_SID_WORDS];
    for (word, chunk) in words
        .iter_mut()
        .zip(sid.as_binary().chunks_exact(size_of::<u32>()))
    {
        if let Ok(chunk) = chunk.try_into() {
            *word = u32::from_ne_bytes(chunk);
        }
    }
    words
}

fn last_error() -> LookupError {
    // SAFETY: `GetLastError` only reads thread-local state.
    let code = unsafe { GetLastError() };
    NonZeroU32::new(code).map_or(LookupError::Other(0), LookupError::from)
}
