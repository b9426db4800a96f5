use core::fmt::{self, Display};
use core::hash::{Hash, Hasher};

use crate::utils;
use crate::{SecurityIdentifier, Sid, SidIdentifierAuthority};

/// Fixed-size, compile-time Security Identifier (SID).
///
/// `ConstSid<N>` stores the authority plus exactly `N` sub-authorities,
/// making it usable in `const` contexts and suitable for static tables of
/// well-known principals. It compares equal to a decoded [`Sid`] with the same
/// value and converts into an owned [`SecurityIdentifier`].
///
/// # Invariants
/// - `N <= 15`, checked at compile time by [`ConstSid::new`] and by the
///   conversion to [`SecurityIdentifier`], so a struct literal with more
///   sub-authorities cannot become an owned SID:
///
/// ```compile_fail
/// # use queue_security::{ConstSid, SecurityIdentifier, SidIdentifierAuthority};
/// let oversized = ConstSid {
///     identifier_authority: SidIdentifierAuthority::NT_AUTHORITY,
///     sub_authority: [7u32; 16],
/// };
/// let _ = SecurityIdentifier::from(oversized);
/// ```
/// - The revision is always 1.
///
/// # Examples
/// ```rust
/// # use queue_security::{ConstSid, SecurityIdentifier, SidIdentifierAuthority};
/// const ADMIN_ALIAS: ConstSid<2> = ConstSid::new(SidIdentifierAuthority::NT_AUTHORITY, [32, 544]);
/// assert_eq!(ADMIN_ALIAS.to_string(), "S-1-5-32-544");
/// let owned: SecurityIdentifier = ADMIN_ALIAS.into();
/// assert!(ADMIN_ALIAS == owned.as_sid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstSid<const N: usize> {
    /// 6-byte identifier authority.
    pub identifier_authority: SidIdentifierAuthority,
    /// Fixed-size list of sub-authorities.
    pub sub_authority: [u32; N],
}

impl<const N: usize> ConstSid<N> {
    /// Creates a new `ConstSid<N>`.
    ///
    /// Instantiating this with `N > 15` fails to compile.
    #[must_use]
    #[inline]
    pub const fn new(identifier_authority: SidIdentifierAuthority, sub_authority: [u32; N]) -> Self {
        const {
            assert!(
                N <= parsing::MAX_SUBAUTHORITY_COUNT as usize,
                "a SID carries at most 15 sub-authorities"
            );
        }
        Self {
            identifier_authority,
            sub_authority,
        }
    }

    /// SID revision, always 1.
    #[must_use]
    #[inline]
    pub const fn revision(&self) -> u8 {
        Sid::REVISION
    }

    /// Copies this SID into an owned [`SecurityIdentifier`].
    #[must_use]
    #[inline]
    pub fn to_security_identifier(self) -> SecurityIdentifier {
        self.into()
    }
}

impl<const N: usize> From<ConstSid<N>> for SecurityIdentifier {
    #[inline]
    fn from(value: ConstSid<N>) -> Self {
        const {
            assert!(
                N <= parsing::MAX_SUBAUTHORITY_COUNT as usize,
                "a SID carries at most 15 sub-authorities"
            );
        }
        Self::from_valid_parts(value.identifier_authority, &value.sub_authority)
    }
}

impl<const N: usize> PartialEq<Sid<'_>> for ConstSid<N> {
    #[inline]
    fn eq(&self, other: &Sid<'_>) -> bool {
        self.identifier_authority == other.identifier_authority()
            && other.sub_authorities().eq(self.sub_authority.iter().copied())
    }
}

impl<const N: usize> PartialEq<ConstSid<N>> for Sid<'_> {
    #[inline]
    fn eq(&self, other: &ConstSid<N>) -> bool {
        other == self
    }
}

impl<const N: usize> PartialEq<SecurityIdentifier> for ConstSid<N> {
    #[inline]
    fn eq(&self, other: &SecurityIdentifier) -> bool {
        *self == other.as_sid()
    }
}

impl<const N: usize> PartialEq<ConstSid<N>> for SecurityIdentifier {
    #[inline]
    fn eq(&self, other: &ConstSid<N>) -> bool {
        *other == self.as_sid()
    }
}

impl<const N: usize> Display for ConstSid<N> {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        utils::write_sid_string(
            f,
            self.revision(),
            self.identifier_authority,
            self.sub_authority.iter().copied(),
        )
    }
}

impl<const N: usize> Hash for ConstSid<N> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_security_identifier().hash(state);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Unwrap is not an issue in test")]
mod test {
    use super::*;
    use std::hash::DefaultHasher;

    #[test]
    pub fn test_hash_matches_owned() {
        let sid = ConstSid::new([0, 0, 0, 0, 0, 1].into(), [0; 1]);
        let mut hasher1 = DefaultHasher::default();
        let mut hasher2 = DefaultHasher::default();
        sid.hash(&mut hasher1);
        sid.to_security_identifier().hash(&mut hasher2);
        assert_eq!(hasher1.finish(), hasher2.finish());
    }

    #[test]
    fn compares_with_decoded_sid() {
        let users = ConstSid::new(SidIdentifierAuthority::NT_AUTHORITY, [32, 545]);
        let owned = users.to_security_identifier();
        assert_eq!(owned.as_binary(), [1, 2, 0, 0, 0, 0, 0, 5, 32, 0, 0, 0, 33, 2, 0, 0]);
        assert!(users == owned.as_sid());
        assert!(owned == users);
        let admins = ConstSid::new(SidIdentifierAuthority::NT_AUTHORITY, [32, 544]);
        assert!(admins != owned.as_sid());
        let prefix = ConstSid::new(SidIdentifierAuthority::NT_AUTHORITY, [32]);
        assert!(prefix != owned.as_sid());
    }

    #[test]
    fn literal_at_the_limit_stays_decodable() {
        let widest = ConstSid {
            identifier_authority: SidIdentifierAuthority::NT_AUTHORITY,
            sub_authority: [7u32; 15],
        };
        let owned = SecurityIdentifier::from(widest);
        assert_eq!(owned.sub_authority_count(), 15);
        assert_eq!(owned.as_binary().len(), 68);
        let decoded = Sid::from_bytes(owned.as_binary()).unwrap();
        assert!(widest == decoded);
    }
}
