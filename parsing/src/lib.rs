//! Textual SID grammar shared by `queue-security` and its `sid!` macro.
#![cfg_attr(not(feature = "std"), no_std)]

use core::fmt::{self, Display};
use core::str::FromStr;

use arrayvec::ArrayVec;
use thiserror::Error;

/// The only SID revision in use.
pub const SID_REVISION: u8 = 1;
/// Smallest number of sub-authorities a SID may carry.
pub const MIN_SUBAUTHORITY_COUNT: u8 = 0;
/// Largest number of sub-authorities a SID may carry.
pub const MAX_SUBAUTHORITY_COUNT: u8 = 15;
/// Largest identifier authority representable in 6 bytes.
pub const MAX_IDENTIFIER_AUTHORITY: u64 = 0xFFFF_FFFF_FFFF;

pub struct SidComponents {
    /// The SID revision value, always 1.
    pub revision: u8,
    /// The SID identifier authority value, big-endian.
    pub identifier_authority: [u8; 6],
    /// The SID sub-authority values.
    pub sub_authority: ArrayVec<u32, { MAX_SUBAUTHORITY_COUNT as usize }>,
}

/// Error type returned when parsing a SID string fails due to an invalid format.
///
/// This is used by `FromStr<SecurityIdentifier>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub struct InvalidSidFormat;

impl Display for InvalidSidFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Invalid format for Sid")
    }
}

fn parse_decimal<T: FromStr>(s: &str) -> Result<T, InvalidSidFormat> {
    // `u32::from_str` accepts a leading '+', the SID grammar does not.
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(InvalidSidFormat);
    }
    s.parse::<T>().map_err(|_| InvalidSidFormat)
}

fn parse_authority(s: &str) -> Result<[u8; 6], InvalidSidFormat> {
    let value = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) if !hex.is_empty() && hex.bytes().all(|b| b.is_ascii_hexdigit()) => {
            u64::from_str_radix(hex, 16).map_err(|_| InvalidSidFormat)?
        }
        Some(_) => return Err(InvalidSidFormat),
        None => parse_decimal::<u64>(s)?,
    };
    if value > MAX_IDENTIFIER_AUTHORITY {
        return Err(InvalidSidFormat);
    }
    let [_, _, a, b, c, d, e, f] = value.to_be_bytes();
    Ok([a, b, c, d, e, f])
}

impl FromStr for SidComponents {
    type Err = InvalidSidFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut s_cmp = s.split('-');
        if !s_cmp
            .next()
            .is_some_and(|head| head.eq_ignore_ascii_case("s"))
        {
            return Err(InvalidSidFormat);
        }
        let revision = parse_decimal::<u8>(s_cmp.next().ok_or(InvalidSidFormat)?)?;
        if revision != SID_REVISION {
            return Err(InvalidSidFormat);
        }

        let identifier_authority = parse_authority(s_cmp.next().ok_or(InvalidSidFormat)?)?;
        let mut sub_authority = ArrayVec::new();
        for item in s_cmp {
            let item = parse_decimal::<u32>(item)?;
            sub_authority.try_push(item).map_err(|_| InvalidSidFormat)?;
        }

        Ok(Self {
            revision,
            identifier_authority,
            sub_authority,
        })
    }
}
