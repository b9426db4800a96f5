use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt::{self, Debug, Display};
use core::hash::{Hash, Hasher};
use core::str::FromStr;

use delegate::delegate;
use parsing::SidComponents;

pub use crate::InvalidSidFormat;
use crate::sid::{SID_HEAD_SIZE, SubAuthorities};
use crate::utils::{self, sub_authority_size_guard};
use crate::{Result, Sid, SidIdentifierAuthority};

/// Owned Security Identifier (SID).
///
/// This type owns the binary SID encoding and guarantees it is valid:
/// revision 1, at most 15 sub-authorities, length consistent with the count.
/// It can be constructed from parts, parsed from text, decoded from bytes,
/// or copied out of a borrowed [`Sid`].
///
/// # Examples
/// ```rust
/// # use queue_security::{SecurityIdentifier, SidIdentifierAuthority};
/// // Build a SID S-1-5-32-544 (Builtin\Administrators) from parts:
/// let sid = SecurityIdentifier::try_new(SidIdentifierAuthority::NT_AUTHORITY, [32u32, 544u32])
///     .expect("valid SID parts");
/// assert_eq!(sid.to_string(), "S-1-5-32-544");
/// ```
#[derive(Clone)]
pub struct SecurityIdentifier {
    inner: Box<[u8]>,
}

impl Debug for SecurityIdentifier {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        utils::debug_print(stringify!(SecurityIdentifier), self, f)
    }
}

impl SecurityIdentifier {
    /// Creates a new `SecurityIdentifier` from parts, validating input.
    ///
    /// Returns `None` if `sub_authority` has more than 15 elements.
    ///
    /// # Examples
    /// ```rust
    /// # use queue_security::{SecurityIdentifier, SidIdentifierAuthority};
    /// let sid = SecurityIdentifier::try_new(
    ///     SidIdentifierAuthority::NT_AUTHORITY,
    ///     [32u32, 544u32]
    /// ).unwrap();
    /// assert_eq!(sid.revision(), 1);
    /// assert_eq!(sid.identifier_authority(), SidIdentifierAuthority::NT_AUTHORITY);
    /// assert_eq!(sid.sub_authorities().collect::<Vec<_>>(), [32u32, 544u32]);
    /// ```
    #[must_use]
    #[inline]
    pub fn try_new<I: Into<SidIdentifierAuthority>, S: AsRef<[u32]>>(
        identifier_authority: I,
        sub_authority: S,
    ) -> Option<Self> {
        let sub_authority = sub_authority.as_ref();
        sub_authority_size_guard(sub_authority.len())
            .then(|| Self::from_valid_parts(identifier_authority.into(), sub_authority))
    }

    /// Encodes parts whose sub-authority count is already known to be in range.
    pub(crate) fn from_valid_parts(
        identifier_authority: SidIdentifierAuthority,
        sub_authority: &[u32],
    ) -> Self {
        debug_assert!(
            sub_authority_size_guard(sub_authority.len()),
            "sub-authority count must be validated by the caller"
        );
        #[expect(
            clippy::cast_possible_truncation,
            reason = "Precondition: the count was validated against the 0..=15 range."
        )]
        let count = sub_authority.len() as u8;

        let mut bytes =
            Vec::with_capacity(SID_HEAD_SIZE + size_of::<u32>() * sub_authority.len());
        bytes.push(Sid::REVISION);
        bytes.push(count);
        bytes.extend_from_slice(&identifier_authority.value);
        for sub in sub_authority {
            bytes.extend_from_slice(&sub.to_le_bytes());
        }
        Self {
            inner: bytes.into_boxed_slice(),
        }
    }

    /// Creates a `SecurityIdentifier` from its binary encoding.
    ///
    /// # Errors
    /// [`crate::Error::MalformedSid`] if `bytes` is not exactly one valid SID.
    ///
    /// # Examples
    /// ```rust
    /// # use queue_security::SecurityIdentifier;
    /// // SID: S-1-5-32-544 (Administrators)
    /// let bytes: [u8; 16] = [
    ///     1,    // Revision
    ///     2,    // SubAuthorityCount
    ///     0, 0, 0, 0, 0, 5, // IdentifierAuthority = NT AUTHORITY
    ///     32, 0, 0, 0,      // SubAuthority[0] = 32
    ///     32, 2, 0, 0       // SubAuthority[1] = 544 (0x220 little endian)
    /// ];
    /// let sid = SecurityIdentifier::from_bytes(&bytes).unwrap();
    /// assert_eq!(sid.to_string(), "S-1-5-32-544");
    /// ```
    #[inline]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Sid::from_bytes(bytes).map(Self::from)
    }

    /// Borrows this SID as a [`Sid`] view.
    #[inline]
    #[must_use]
    pub fn as_sid(&self) -> Sid<'_> {
        Sid::from_validated(&self.inner)
    }

    delegate! {
        to self.as_sid() {
            /// The binary encoding of this SID.
            #[must_use]
            pub fn as_binary(&self) -> &[u8];
            #[must_use]
            pub fn revision(&self) -> u8;
            #[must_use]
            pub fn sub_authority_count(&self) -> u8;
            #[must_use]
            pub fn identifier_authority(&self) -> SidIdentifierAuthority;
            #[must_use]
            pub fn sub_authorities(&self) -> SubAuthorities<'_>;
            #[must_use]
            pub fn rid(&self) -> Option<u32>;
        }
    }
}

impl TryFrom<&[u8]> for SecurityIdentifier {
    type Error = crate::Error;

    #[inline]
    fn try_from(value: &[u8]) -> Result<Self> {
        Self::from_bytes(value)
    }
}

impl From<Sid<'_>> for SecurityIdentifier {
    #[inline]
    fn from(value: Sid<'_>) -> Self {
        Self {
            inner: value.as_binary().into(),
        }
    }
}

impl FromStr for SecurityIdentifier {
    type Err = InvalidSidFormat;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let components = SidComponents::from_str(s)?;
        Self::try_new(
            components.identifier_authority,
            components.sub_authority.as_slice(),
        )
        .ok_or(InvalidSidFormat)
    }
}

impl AsRef<[u8]> for SecurityIdentifier {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        &self.inner
    }
}

impl Display for SecurityIdentifier {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.as_sid(), f)
    }
}

impl PartialEq for SecurityIdentifier {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.as_sid() == other.as_sid()
    }
}

impl Eq for SecurityIdentifier {}

impl Hash for SecurityIdentifier {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_sid().hash(state);
    }
}

impl PartialEq<Sid<'_>> for SecurityIdentifier {
    #[inline]
    fn eq(&self, other: &Sid<'_>) -> bool {
        self.as_sid() == *other
    }
}

impl PartialEq<SecurityIdentifier> for Sid<'_> {
    #[inline]
    fn eq(&self, other: &SecurityIdentifier) -> bool {
        *self == other.as_sid()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Unwrap is not an issue in test")]
#[allow(clippy::expect_used, reason = "Expect is not an issue in test")]
pub mod test {
    use super::SecurityIdentifier;
    use crate::arb_identifier_authority;
    use crate::well_known;
    use core::hash::{Hash, Hasher};
    use proptest::prelude::*;
    use std::collections::hash_map::DefaultHasher;

    pub fn arb_security_identifier() -> impl Strategy<Value = SecurityIdentifier> {
        (
            arb_identifier_authority(),
            proptest::collection::vec(any::<u32>(), 0..=15),
        )
            .prop_map(|(identifier_authority, sub_authorities)| {
                SecurityIdentifier::try_new(identifier_authority, &sub_authorities)
                    .expect("Failed to generate SecurityIdentifier")
            })
    }

    fn hash_of<T: Hash + ?Sized>(value: &T) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    proptest! {
        #[test]
        fn test_sid_properties(security_identifier in arb_security_identifier()) {
            let sid = security_identifier.as_sid();
            prop_assert_eq!(sid.as_binary().len(), 8 + 4 * sid.sub_authority_count() as usize);

            let owned = sid.to_security_identifier();
            prop_assert_eq!(&owned, &security_identifier, "to_security_identifier should yield an equal SID");
            prop_assert_eq!(hash_of(&owned), hash_of(&sid), "Hashes should match for equal SIDs");
        }

        #[test]
        fn test_sid_to_string_from_string(sid1 in arb_security_identifier()) {
            let sid2: SecurityIdentifier = sid1.to_string().parse().unwrap();
            prop_assert_eq!(sid1, sid2);
        }

        #[test]
        fn test_sid_from_bytes_round_trip(sid in arb_security_identifier()) {
            prop_assert_eq!(SecurityIdentifier::from_bytes(sid.as_binary()).unwrap(), sid);
        }

        #[test]
        fn test_security_identifier_eq_and_hash(a in arb_security_identifier(), b in arb_security_identifier()) {
            prop_assert_eq!(&a, &a.clone());
            if a == b {
                prop_assert_eq!(hash_of(&a), hash_of(&b), "Hashes must be equal for identical SIDs");
            }
        }
    }

    #[test]
    fn try_new_rejects_too_many_sub_authorities() {
        assert!(
            SecurityIdentifier::try_new(crate::SidIdentifierAuthority::NT_AUTHORITY, [0u32; 16])
                .is_none()
        );
    }

    #[test]
    fn test_debug() {
        let sample_sid = SecurityIdentifier::from(well_known::NULL);
        assert_eq!(
            format!("{sample_sid:?}"),
            format!("{:}(S-1-0-0)", stringify!(SecurityIdentifier)),
        );
    }
}
