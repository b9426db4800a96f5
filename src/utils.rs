use core::fmt::{self, Display};

use crate::sid::{SID_HEAD_SIZE, SUB_AUTHORITY_COUNT_OFFSET};
use crate::{Error, Result, Sid, SidIdentifierAuthority, SidSizeInfo};

pub const fn sub_authority_size_guard(size: usize) -> bool {
    parsing::MIN_SUBAUTHORITY_COUNT as usize <= size
        && size <= parsing::MAX_SUBAUTHORITY_COUNT as usize
}

/// Reads `N` bytes at `offset`, or `None` if the buffer ends first.
#[inline]
pub fn read_array<const N: usize>(buf: &[u8], offset: usize) -> Option<[u8; N]> {
    buf.get(offset..offset.checked_add(N)?)?.try_into().ok()
}

#[inline]
pub fn read_u8(buf: &[u8], offset: usize) -> Option<u8> {
    buf.get(offset).copied()
}

#[inline]
pub fn read_u16_le(buf: &[u8], offset: usize) -> Option<u16> {
    read_array(buf, offset).map(u16::from_le_bytes)
}

#[inline]
pub fn read_u32_le(buf: &[u8], offset: usize) -> Option<u32> {
    read_array(buf, offset).map(u32::from_le_bytes)
}

/// Validates the SID that starts `buf` and returns its declared byte length.
///
/// - `revision` must be 1
/// - `sub_authority_count` in [0..=15]
/// - 8 + 4 * `sub_authority_count` bytes must be available
///
/// Bytes after the declared length are not inspected; callers that need an
/// exact fit compare the returned length themselves.
pub fn validate_sid_prefix(buf: &[u8]) -> Result<SidSizeInfo> {
    if buf.len() < SID_HEAD_SIZE {
        return Err(Error::MalformedSid {
            reason: "fewer than 8 bytes available for the SID header",
        });
    }
    if read_u8(buf, 0) != Some(Sid::REVISION) {
        return Err(Error::MalformedSid {
            reason: "unsupported SID revision",
        });
    }
    let size_info = read_u8(buf, SUB_AUTHORITY_COUNT_OFFSET)
        .and_then(SidSizeInfo::from_count)
        .ok_or(Error::MalformedSid {
            reason: "more than 15 sub-authorities",
        })?;
    if buf.len() < size_info.byte_len() {
        return Err(Error::MalformedSid {
            reason: "declared SID length exceeds the available bytes",
        });
    }
    Ok(size_info)
}

/// Writes the canonical `S-R-A-S1-S2-...` form shared by every SID type.
pub fn write_sid_string(
    f: &mut fmt::Formatter<'_>,
    revision: u8,
    identifier_authority: SidIdentifierAuthority,
    sub_authorities: impl IntoIterator<Item = u32>,
) -> fmt::Result {
    write!(f, "S-{revision}")?;

    // Identifier Authority: print as decimal if fits in u32, else as hex
    let id_auth_value = identifier_authority.as_u64();
    if id_auth_value <= 0xFFFF_FFFF {
        write!(f, "-{id_auth_value}")?;
    } else {
        write!(f, "-0x{id_auth_value:X}")?;
    }

    for sub_auth in sub_authorities {
        write!(f, "-{sub_auth}")?;
    }
    Ok(())
}

pub fn debug_print<T: Display + ?Sized>(
    name: &str,
    value: &T,
    f: &mut fmt::Formatter<'_>,
) -> fmt::Result {
    write!(f, "{name}({value})")
}
