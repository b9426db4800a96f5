//! Zero-copy view of a binary Security Identifier (SID).
//!
//! A SID is encoded as an 8-byte header followed by `sub_authority_count`
//! little-endian 32-bit sub-authorities:
//!
//! ```text
//! 0        1                   2               8              8 + 4n
//! +--------+-------------------+---------------+----- ... -----+
//! |revision|sub_authority_count|authority (BE) |sub-authorities|
//! +--------+-------------------+---------------+----- ... -----+
//! ```
//!
//! [`Sid`] borrows those bytes from whatever buffer they were decoded from
//! (typically a fetched security descriptor) and reads fields on demand, so
//! no alignment is assumed and nothing is copied.

use core::fmt::{self, Debug, Display};
use core::hash::{Hash, Hasher};
use core::iter::FusedIterator;
use core::slice::ChunksExact;

use crate::utils::{self, read_array, validate_sid_prefix};
use crate::{Error, Result, SecurityIdentifier, SidIdentifierAuthority};

pub use parsing::{MAX_SUBAUTHORITY_COUNT, MIN_SUBAUTHORITY_COUNT};

/// Size of the fixed part of a SID (revision, count, authority).
pub const SID_HEAD_SIZE: usize = 8;
pub(crate) const SUB_AUTHORITY_COUNT_OFFSET: usize = 1;
const IDENTIFIER_AUTHORITY_OFFSET: usize = 2;

/// A validated SID borrowed from a byte buffer.
///
/// # Invariants
/// - `bytes.len() == 8 + 4 * sub_authority_count`.
/// - `revision == 1` and `sub_authority_count <= 15`.
///
/// Two `Sid`s are equal iff their encodings are byte-for-byte identical.
#[derive(Clone, Copy)]
pub struct Sid<'a> {
    bytes: &'a [u8],
}

impl<'a> Sid<'a> {
    /// The only SID revision accepted.
    pub const REVISION: u8 = parsing::SID_REVISION;

    /// Decodes a SID that must exactly fill `bytes`.
    ///
    /// # Errors
    /// [`Error::MalformedSid`] if the header is invalid or the length of
    /// `bytes` differs from the length the header declares.
    ///
    /// # Examples
    /// ```rust
    /// # use queue_security::Sid;
    /// let bytes = [1, 2, 0, 0, 0, 0, 0, 5, 32, 0, 0, 0, 32, 2, 0, 0];
    /// let sid = Sid::from_bytes(&bytes).unwrap();
    /// assert_eq!(sid.to_string(), "S-1-5-32-544");
    /// ```
    #[inline]
    pub fn from_bytes(bytes: &'a [u8]) -> Result<Self> {
        let size_info = validate_sid_prefix(bytes)?;
        if size_info.byte_len() != bytes.len() {
            return Err(Error::MalformedSid {
                reason: "trailing bytes after the SID",
            });
        }
        Ok(Self { bytes })
    }

    /// Decodes the SID at the start of `bytes`, ignoring whatever follows it.
    ///
    /// Returns the SID and the number of bytes it occupies.
    ///
    /// # Errors
    /// [`Error::MalformedSid`] if the header is invalid or declares more
    /// sub-authorities than `bytes` holds.
    #[inline]
    pub fn from_prefix(bytes: &'a [u8]) -> Result<(Self, usize)> {
        let len = validate_sid_prefix(bytes)?.byte_len();
        let bytes = bytes.get(..len).ok_or(Error::MalformedSid {
            reason: "declared SID length exceeds the available bytes",
        })?;
        Ok((Self { bytes }, len))
    }

    /// Wraps bytes already known to hold exactly one valid SID.
    pub(crate) const fn from_validated(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    /// The encoded SID, exactly `8 + 4 * sub_authority_count` bytes long.
    #[inline]
    #[must_use]
    pub const fn as_binary(self) -> &'a [u8] {
        self.bytes
    }

    #[inline]
    #[must_use]
    pub const fn revision(self) -> u8 {
        Self::REVISION
    }

    #[inline]
    #[must_use]
    pub fn sub_authority_count(self) -> u8 {
        utils::read_u8(self.bytes, SUB_AUTHORITY_COUNT_OFFSET).unwrap_or_default()
    }

    #[inline]
    #[must_use]
    pub fn identifier_authority(self) -> SidIdentifierAuthority {
        read_array(self.bytes, IDENTIFIER_AUTHORITY_OFFSET)
            .map(SidIdentifierAuthority::new)
            .unwrap_or_default()
    }

    /// Iterates the sub-authorities in order.
    ///
    /// # Examples
    /// ```rust
    /// # use queue_security::SecurityIdentifier;
    /// let sid: SecurityIdentifier = "S-1-5-21-1-2-3-1001".parse().unwrap();
    /// let subs: Vec<u32> = sid.as_sid().sub_authorities().collect();
    /// assert_eq!(subs, [21, 1, 2, 3, 1001]);
    /// ```
    #[inline]
    #[must_use]
    pub fn sub_authorities(self) -> SubAuthorities<'a> {
        SubAuthorities {
            inner: self
                .bytes
                .get(SID_HEAD_SIZE..)
                .unwrap_or_default()
                .chunks_exact(size_of::<u32>()),
        }
    }

    /// The relative identifier, i.e. the last sub-authority, if any.
    #[inline]
    #[must_use]
    pub fn rid(self) -> Option<u32> {
        self.sub_authorities().last()
    }

    /// Copies this SID into an owned [`SecurityIdentifier`].
    #[inline]
    #[must_use]
    pub fn to_security_identifier(self) -> SecurityIdentifier {
        SecurityIdentifier::from(self)
    }
}

/// Iterator over the sub-authorities of a [`Sid`].
#[derive(Clone)]
pub struct SubAuthorities<'a> {
    inner: ChunksExact<'a, u8>,
}

impl Iterator for SubAuthorities<'_> {
    type Item = u32;

    #[inline]
    fn next(&mut self) -> Option<u32> {
        self.inner
            .next()
            .and_then(|chunk| chunk.try_into().ok())
            .map(u32::from_le_bytes)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl DoubleEndedIterator for SubAuthorities<'_> {
    #[inline]
    fn next_back(&mut self) -> Option<u32> {
        self.inner
            .next_back()
            .and_then(|chunk| chunk.try_into().ok())
            .map(u32::from_le_bytes)
    }
}

impl ExactSizeIterator for SubAuthorities<'_> {}
impl FusedIterator for SubAuthorities<'_> {}

impl Display for Sid<'_> {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        utils::write_sid_string(
            f,
            self.revision(),
            self.identifier_authority(),
            self.sub_authorities(),
        )
    }
}

impl Debug for Sid<'_> {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        utils::debug_print(stringify!(Sid), self, f)
    }
}

impl PartialEq for Sid<'_> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes
    }
}

impl Eq for Sid<'_> {}

impl Hash for Sid<'_> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bytes.hash(state);
    }
}

impl<'a> TryFrom<&'a [u8]> for Sid<'a> {
    type Error = Error;

    #[inline]
    fn try_from(value: &'a [u8]) -> Result<Self> {
        Self::from_bytes(value)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Unwrap is not an issue in test")]
mod tests {
    use super::*;
    use crate::arb_security_identifier;
    use alloc::string::ToString;
    use alloc::vec::Vec;
    use proptest::prelude::*;

    const ADMINISTRATORS: [u8; 16] = [1, 2, 0, 0, 0, 0, 0, 5, 32, 0, 0, 0, 32, 2, 0, 0];

    proptest! {
        #[test]
        fn sid_display_round_trip(sid in arb_security_identifier()) {
            let display = sid.as_sid().to_string();
            prop_assert!(display.starts_with("S-1-"), "Display does not start with S-1-: {}", display);

            let dash_count = display.matches('-').count();
            let expected = (sid.sub_authority_count() as usize) + 2;
            prop_assert_eq!(dash_count, expected, "Dash count {} vs sub_authority_count {}", dash_count, expected);
            prop_assert_eq!(display.parse::<SecurityIdentifier>().unwrap(), sid);
        }

        #[test]
        fn sid_binary_round_trip(sid in arb_security_identifier()) {
            let decoded = Sid::from_bytes(sid.as_binary()).unwrap();
            prop_assert_eq!(decoded, sid.as_sid());
            prop_assert_eq!(decoded.to_security_identifier(), sid);
        }

        #[test]
        fn sid_prefix_ignores_trailing_bytes(sid in arb_security_identifier(), tail in proptest::collection::vec(any::<u8>(), 0..32)) {
            let mut bytes = sid.as_binary().to_vec();
            let len = bytes.len();
            bytes.extend_from_slice(&tail);
            let (decoded, consumed) = Sid::from_prefix(&bytes).unwrap();
            prop_assert_eq!(consumed, len);
            prop_assert_eq!(decoded, sid.as_sid());
        }

        #[test]
        fn sid_sub_authorities_len(sid in arb_security_identifier()) {
            prop_assert_eq!(sid.as_sid().sub_authorities().len(), sid.sub_authority_count() as usize);
        }
    }

    #[test]
    fn decodes_fields() {
        let sid = Sid::from_bytes(&ADMINISTRATORS).unwrap();
        assert_eq!(sid.revision(), 1);
        assert_eq!(sid.sub_authority_count(), 2);
        assert_eq!(sid.identifier_authority(), SidIdentifierAuthority::NT_AUTHORITY);
        assert_eq!(sid.sub_authorities().collect::<Vec<_>>(), [32, 544]);
        assert_eq!(sid.rid(), Some(544));
        assert_eq!(sid.to_string(), "S-1-5-32-544");
    }

    #[test]
    fn rejects_length_mismatch() {
        assert!(matches!(
            Sid::from_bytes(&ADMINISTRATORS[..12]),
            Err(Error::MalformedSid { .. })
        ));
        let mut padded = ADMINISTRATORS.to_vec();
        padded.push(0);
        assert!(matches!(
            Sid::from_bytes(&padded),
            Err(Error::MalformedSid { .. })
        ));
        assert!(Sid::from_bytes(&[]).is_err());
    }

    #[test]
    fn equality_is_structural() {
        let a = Sid::from_bytes(&ADMINISTRATORS).unwrap();
        let mut other = ADMINISTRATORS;
        other[12] = 0x21; // 545: BUILTIN\Users
        let b = Sid::from_bytes(&other).unwrap();
        assert_eq!(a, a);
        assert_ne!(a, b);
    }

    #[test]
    fn large_authority_prints_as_hex() {
        let bytes = [1u8, 0, 0, 0x10, 0, 0, 0, 0];
        assert_eq!(Sid::from_bytes(&bytes).unwrap().to_string(), "S-1-0x1000000000");
    }

    #[test]
    fn test_debug() {
        let sid = Sid::from_bytes(&ADMINISTRATORS).unwrap();
        assert_eq!(format!("{sid:?}"), "Sid(S-1-5-32-544)");
    }
}
