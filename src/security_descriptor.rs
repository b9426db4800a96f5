//! Self-relative security descriptors.
//!
//! A self-relative descriptor is a single buffer: a 20-byte header whose
//! offsets locate the owner SID, group SID, SACL and DACL inside that same
//! buffer.
//!
//! ```text
//! 0        1    2             4             8             12            16            20
//! +--------+----+-------------+-------------+-------------+-------------+-------------+
//! |revision|sbz1|control (LE) |owner offset |group offset |sacl offset  |dacl offset  |
//! +--------+----+-------------+-------------+-------------+-------------+-------------+
//! ```
//!
//! An offset of zero means the component is absent.

use bitflags::bitflags;
use log::debug;

use crate::utils::{read_u8, read_u16_le, read_u32_le};
use crate::{Acl, Error, Result, Sid};

/// Size of the descriptor header.
pub const SECURITY_DESCRIPTOR_HEADER_SIZE: usize = 20;
/// The only descriptor revision accepted.
pub const SECURITY_DESCRIPTOR_REVISION: u8 = 1;

const CONTROL_OFFSET: usize = 2;
const OWNER_OFFSET: usize = 4;
const GROUP_OFFSET: usize = 8;
const SACL_OFFSET: usize = 12;
const DACL_OFFSET: usize = 16;

bitflags! {
    /// The descriptor control word.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SecurityDescriptorControl: u16 {
        const OWNER_DEFAULTED = 0x0001;
        const GROUP_DEFAULTED = 0x0002;
        const DACL_PRESENT = 0x0004;
        const DACL_DEFAULTED = 0x0008;
        const SACL_PRESENT = 0x0010;
        const SACL_DEFAULTED = 0x0020;
        const DACL_TRUSTED = 0x0040;
        const SERVER_SECURITY = 0x0080;
        const DACL_AUTO_INHERIT_REQ = 0x0100;
        const SACL_AUTO_INHERIT_REQ = 0x0200;
        const DACL_AUTO_INHERITED = 0x0400;
        const SACL_AUTO_INHERITED = 0x0800;
        const DACL_PROTECTED = 0x1000;
        const SACL_PROTECTED = 0x2000;
        const RM_CONTROL_VALID = 0x4000;
        const SELF_RELATIVE = 0x8000;
    }
}

/// A parsed view over a self-relative descriptor buffer.
///
/// Parsing checks the header and every present component up front, so the
/// accessors never fail. The view borrows the buffer it was parsed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecurityDescriptor<'a> {
    bytes: &'a [u8],
    revision: u8,
    control: SecurityDescriptorControl,
    owner: Option<Sid<'a>>,
    group: Option<Sid<'a>>,
    sacl: Option<Acl<'a>>,
    dacl: Option<Acl<'a>>,
}

impl<'a> SecurityDescriptor<'a> {
    /// Parses a self-relative descriptor.
    ///
    /// # Errors
    /// - [`Error::MalformedDescriptor`] if the buffer is shorter than the
    ///   header, the revision is not 1, or an offset points into the header
    ///   or past the end of the buffer.
    /// - [`Error::UnsupportedDescriptorFormat`] if the self-relative control
    ///   bit is clear.
    /// - [`Error::MalformedSid`] or [`Error::MalformedAcl`] if a component
    ///   does not decode.
    ///
    /// # Examples
    /// ```rust
    /// # use queue_security::SecurityDescriptor;
    /// let mut buffer = vec![1, 0, 0x00, 0x80];  // revision, sbz1, control: self-relative
    /// buffer.extend_from_slice(&20u32.to_le_bytes()); // owner at 20
    /// buffer.extend_from_slice(&[0; 12]);             // no group, SACL or DACL
    /// buffer.extend_from_slice(&[1, 1, 0, 0, 0, 0, 0, 5, 18, 0, 0, 0]); // S-1-5-18
    ///
    /// let descriptor = SecurityDescriptor::parse(&buffer).unwrap();
    /// assert_eq!(descriptor.owner().unwrap().to_string(), "S-1-5-18");
    /// assert!(descriptor.dacl().is_none());
    /// ```
    #[inline]
    pub fn parse(bytes: &'a [u8]) -> Result<Self> {
        let malformed = |reason: &'static str| Error::MalformedDescriptor { reason };

        if bytes.len() < SECURITY_DESCRIPTOR_HEADER_SIZE {
            return Err(malformed("fewer than 20 bytes available for the header"));
        }
        let revision = read_u8(bytes, 0).ok_or_else(|| malformed("missing revision"))?;
        if revision != SECURITY_DESCRIPTOR_REVISION {
            return Err(malformed("unsupported descriptor revision"));
        }
        let control = read_u16_le(bytes, CONTROL_OFFSET)
            .ok_or_else(|| malformed("missing control word"))?;
        let control = SecurityDescriptorControl::from_bits_retain(control);
        if !control.contains(SecurityDescriptorControl::SELF_RELATIVE) {
            return Err(Error::UnsupportedDescriptorFormat {
                control: control.bits(),
            });
        }

        let owner = component(bytes, OWNER_OFFSET)?
            .map(|region| Sid::from_prefix(region).map(|(sid, _)| sid))
            .transpose()?;
        let group = component(bytes, GROUP_OFFSET)?
            .map(|region| Sid::from_prefix(region).map(|(sid, _)| sid))
            .transpose()?;
        let sacl = component(bytes, SACL_OFFSET)?
            .map(Acl::from_bytes)
            .transpose()?;
        let dacl = component(bytes, DACL_OFFSET)?
            .map(Acl::from_bytes)
            .transpose()?;

        debug!(
            "parsed {} byte descriptor: control 0x{:04X}, owner {}, group {}, sacl {}, dacl {}",
            bytes.len(),
            control.bits(),
            owner.is_some(),
            group.is_some(),
            sacl.map_or(0, |acl| acl.ace_count()),
            dacl.map_or(0, |acl| acl.ace_count()),
        );

        Ok(Self {
            bytes,
            revision,
            control,
            owner,
            group,
            sacl,
            dacl,
        })
    }

    #[inline]
    #[must_use]
    pub const fn revision(&self) -> u8 {
        self.revision
    }

    #[inline]
    #[must_use]
    pub const fn control(&self) -> SecurityDescriptorControl {
        self.control
    }

    /// The owner SID, if the descriptor records one.
    #[inline]
    #[must_use]
    pub const fn owner(&self) -> Option<Sid<'a>> {
        self.owner
    }

    #[inline]
    #[must_use]
    pub const fn group(&self) -> Option<Sid<'a>> {
        self.group
    }

    /// The discretionary ACL, if present.
    #[inline]
    #[must_use]
    pub const fn dacl(&self) -> Option<Acl<'a>> {
        self.dacl
    }

    /// The system ACL, if present.
    #[inline]
    #[must_use]
    pub const fn sacl(&self) -> Option<Acl<'a>> {
        self.sacl
    }

    /// The buffer this descriptor was parsed from.
    #[inline]
    #[must_use]
    pub const fn as_binary(&self) -> &'a [u8] {
        self.bytes
    }
}

impl<'a> TryFrom<&'a [u8]> for SecurityDescriptor<'a> {
    type Error = Error;

    #[inline]
    fn try_from(value: &'a [u8]) -> Result<Self> {
        Self::parse(value)
    }
}

/// The bytes from the offset stored at `field` to the end of the buffer.
fn component(bytes: &[u8], field: usize) -> Result<Option<&[u8]>> {
    let offset = read_u32_le(bytes, field).ok_or(Error::MalformedDescriptor {
        reason: "missing component offset",
    })?;
    if offset == 0 {
        return Ok(None);
    }
    usize::try_from(offset)
        .ok()
        .filter(|offset| *offset >= SECURITY_DESCRIPTOR_HEADER_SIZE)
        .and_then(|offset| bytes.get(offset..))
        .filter(|region| !region.is_empty())
        .map(Some)
        .ok_or(Error::MalformedDescriptor {
            reason: "component offset points outside the descriptor body",
        })
}
