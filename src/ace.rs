//! Access control entries.
//!
//! Every entry starts with a 4-byte header:
//!
//! ```text
//! 0        1         2            4
//! +--------+---------+------------+---- ... ----+
//! |ace_type|ace_flags|ace_size (LE)|  body      |
//! +--------+---------+------------+---- ... ----+
//! ```
//!
//! `ace_size` covers the header. An access-allowed entry's body is a
//! little-endian `u32` mask followed by a SID that fills the rest of the entry.

use bitflags::bitflags;

use crate::utils::{read_u8, read_u16_le, read_u32_le};
use crate::{AccessRights, Error, Result, Sid};

/// Size of the type/flags/size header shared by every entry.
pub const ACE_HEADER_SIZE: usize = 4;
const MASK_OFFSET: usize = ACE_HEADER_SIZE;
const ALLOWED_SID_OFFSET: usize = MASK_OFFSET + size_of::<u32>();
/// Smallest valid access-allowed entry: header, mask and an 8-byte SID head.
pub const MIN_ACCESS_ALLOWED_ACE_SIZE: usize = ALLOWED_SID_OFFSET + crate::sid::SID_HEAD_SIZE;

bitflags! {
    /// Inheritance and audit flags from the entry header.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AceFlags: u8 {
        const OBJECT_INHERIT = 0x01;
        const CONTAINER_INHERIT = 0x02;
        const NO_PROPAGATE_INHERIT = 0x04;
        const INHERIT_ONLY = 0x08;
        const INHERITED = 0x10;
        const SUCCESSFUL_ACCESS = 0x40;
        const FAILED_ACCESS = 0x80;
    }
}

/// The header fields every entry carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AceHeader {
    pub ace_type: u8,
    pub flags: AceFlags,
    /// Total entry size in bytes, header included.
    pub size: u16,
}

impl AceHeader {
    pub const ACCESS_ALLOWED: u8 = 0;
    pub const ACCESS_DENIED: u8 = 1;
    pub const SYSTEM_AUDIT: u8 = 2;
}

/// An entry granting `mask` to `sid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccessAllowedAce<'a> {
    pub header: AceHeader,
    pub mask: AccessRights,
    pub sid: Sid<'a>,
}

/// A decoded entry. Only access-allowed entries are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ace<'a> {
    AccessAllowed(AccessAllowedAce<'a>),
    /// Any other entry type, kept as its header only.
    Other(AceHeader),
}

impl<'a> Ace<'a> {
    /// Decodes the entry that starts at `offset` in `bytes`.
    ///
    /// `bytes` is the region the entry must fit in (the ACL); the returned
    /// count is always the declared `ace_size`.
    ///
    /// # Errors
    /// [`Error::MalformedAce`] if the header does not fit, the size is smaller
    /// than the header or overruns `bytes`, or an access-allowed body is not a
    /// mask followed by a SID that exactly fills the entry.
    ///
    /// # Examples
    /// ```rust
    /// # use queue_security::{Ace, AccessRights};
    /// let entry = [
    ///     0, 0, 20, 0,          // type, flags, size
    ///     4, 0, 0, 0,           // mask: WRITE_MESSAGE
    ///     1, 1, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0, // S-1-1-0
    /// ];
    /// let (ace, consumed) = Ace::decode(&entry, 0).unwrap();
    /// assert_eq!(consumed, 20);
    /// let Ace::AccessAllowed(allowed) = ace else { panic!() };
    /// assert_eq!(allowed.mask, AccessRights::WRITE_MESSAGE);
    /// assert_eq!(allowed.sid.to_string(), "S-1-1-0");
    /// ```
    #[inline]
    pub fn decode(bytes: &'a [u8], offset: usize) -> Result<(Self, usize)> {
        let malformed = |reason: &'static str| Error::MalformedAce { offset, reason };

        let remaining = bytes
            .get(offset..)
            .filter(|rest| rest.len() >= ACE_HEADER_SIZE)
            .ok_or_else(|| malformed("entry header runs past the end of the ACL"))?;
        let header = read_header(remaining).ok_or_else(|| malformed("unreadable entry header"))?;
        let size = usize::from(header.size);
        if size < ACE_HEADER_SIZE {
            return Err(malformed("entry size is smaller than its header"));
        }
        let entry = remaining
            .get(..size)
            .ok_or_else(|| malformed("entry size runs past the end of the ACL"))?;

        if header.ace_type != AceHeader::ACCESS_ALLOWED {
            return Ok((Self::Other(header), size));
        }
        if size < MIN_ACCESS_ALLOWED_ACE_SIZE {
            return Err(malformed("access-allowed entry is too small"));
        }
        let mask = read_u32_le(entry, MASK_OFFSET)
            .map(AccessRights::from_bits_retain)
            .ok_or_else(|| malformed("missing access mask"))?;
        let sid = entry
            .get(ALLOWED_SID_OFFSET..)
            .ok_or_else(|| malformed("missing SID"))
            .and_then(|sid_bytes| {
                Sid::from_bytes(sid_bytes)
                    .map_err(|_| malformed("SID does not exactly fill the entry"))
            })?;

        Ok((Self::AccessAllowed(AccessAllowedAce { header, mask, sid }), size))
    }

    #[inline]
    #[must_use]
    pub const fn header(&self) -> AceHeader {
        match self {
            Self::AccessAllowed(allowed) => allowed.header,
            Self::Other(header) => *header,
        }
    }

    #[inline]
    #[must_use]
    pub const fn as_access_allowed(&self) -> Option<&AccessAllowedAce<'a>> {
        match self {
            Self::AccessAllowed(allowed) => Some(allowed),
            Self::Other(_) => None,
        }
    }
}

fn read_header(bytes: &[u8]) -> Option<AceHeader> {
    Some(AceHeader {
        ace_type: read_u8(bytes, 0)?,
        flags: AceFlags::from_bits_retain(read_u8(bytes, 1)?),
        size: read_u16_le(bytes, 2)?,
    })
}
