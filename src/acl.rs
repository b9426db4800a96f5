//! Access control lists.
//!
//! An ACL is an 8-byte header followed by `ace_count` variable-size entries
//! packed back to back:
//!
//! ```text
//! 0        1    2              4               6    8
//! +--------+----+--------------+---------------+----+---- ... ----+
//! |revision|sbz1|acl_size (LE) |ace_count (LE) |sbz2|  entries     |
//! +--------+----+--------------+---------------+----+---- ... ----+
//! ```
//!
//! `acl_size` covers the header and bounds the entries. Space left after the
//! last entry is ignored.

use alloc::vec::Vec;
use core::iter::FusedIterator;

use log::{debug, trace, warn};

use crate::ace::{AccessAllowedAce, Ace, AceHeader};
use crate::utils::{read_u8, read_u16_le};
use crate::{Error, Result, Sid};

/// Size of the ACL header.
pub const ACL_HEADER_SIZE: usize = 8;
/// Lowest ACL revision accepted.
pub const MIN_ACL_REVISION: u8 = 2;
/// Highest ACL revision accepted.
pub const MAX_ACL_REVISION: u8 = 4;

/// A validated ACL header borrowed from a descriptor buffer.
///
/// Only the header is checked on construction; entries are decoded lazily
/// by [`Acl::iter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Acl<'a> {
    /// Exactly `acl_size` bytes, header included.
    bytes: &'a [u8],
    revision: u8,
    ace_count: u16,
}

impl<'a> Acl<'a> {
    /// Reads the ACL header at the start of `bytes`.
    ///
    /// Bytes past `acl_size` are not part of the ACL.
    ///
    /// # Errors
    /// [`Error::MalformedAcl`] if fewer than 8 bytes are available, the
    /// revision is not 2 to 4, or `acl_size` is smaller than the header or
    /// larger than `bytes`.
    #[inline]
    pub fn from_bytes(bytes: &'a [u8]) -> Result<Self> {
        let malformed = |reason: &'static str| Error::MalformedAcl { reason };

        if bytes.len() < ACL_HEADER_SIZE {
            return Err(malformed("fewer than 8 bytes available for the ACL header"));
        }
        let revision = read_u8(bytes, 0).ok_or_else(|| malformed("missing revision"))?;
        if !(MIN_ACL_REVISION..=MAX_ACL_REVISION).contains(&revision) {
            return Err(malformed("unsupported ACL revision"));
        }
        let acl_size = read_u16_le(bytes, 2)
            .map(usize::from)
            .ok_or_else(|| malformed("missing size"))?;
        let ace_count = read_u16_le(bytes, 4).ok_or_else(|| malformed("missing entry count"))?;
        if acl_size < ACL_HEADER_SIZE {
            return Err(malformed("ACL size is smaller than its header"));
        }
        let bytes = bytes
            .get(..acl_size)
            .ok_or_else(|| malformed("ACL size exceeds the available bytes"))?;

        Ok(Self {
            bytes,
            revision,
            ace_count,
        })
    }

    #[inline]
    #[must_use]
    pub const fn revision(&self) -> u8 {
        self.revision
    }

    /// Declared size in bytes, header included.
    #[inline]
    #[must_use]
    pub const fn acl_size(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    #[must_use]
    pub const fn ace_count(&self) -> u16 {
        self.ace_count
    }

    #[inline]
    #[must_use]
    pub const fn as_binary(&self) -> &'a [u8] {
        self.bytes
    }

    /// Walks the entries in on-disk order.
    ///
    /// The walk can be restarted by calling `iter` again. It stops after the
    /// first error.
    #[inline]
    #[must_use]
    pub const fn iter(&self) -> AclIter<'a> {
        AclIter {
            bytes: self.bytes,
            cursor: ACL_HEADER_SIZE,
            remaining: self.ace_count,
            done: false,
        }
    }

    /// Decodes every entry.
    ///
    /// # Errors
    /// The first decode error of the walk.
    #[inline]
    pub fn entries(&self) -> Result<Vec<Ace<'a>>> {
        self.iter().collect()
    }

    /// Finds the first access-allowed entry whose SID equals `sid`.
    ///
    /// The whole list is decoded before a match is returned, so a list with a
    /// corrupt entry never yields one. Entries of any other type, access-denied
    /// included, are skipped.
    ///
    /// # Errors
    /// - The first decode error of the walk.
    /// - [`Error::PrincipalNotInAcl`] if no allowed entry names `sid`.
    ///
    /// # Examples
    /// ```rust
    /// # use queue_security::{Acl, AccessRights, Error, SecurityIdentifier};
    /// let acl_bytes = [
    ///     2, 0, 28, 0, 1, 0, 0, 0,                  // header: 1 entry, 28 bytes
    ///     0, 0, 20, 0, 0x2B, 0, 2, 0,               // allow GENERIC_READ
    ///     1, 1, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0,       // S-1-1-0
    /// ];
    /// let acl = Acl::from_bytes(&acl_bytes).unwrap();
    /// let everyone: SecurityIdentifier = "S-1-1-0".parse().unwrap();
    /// let entry = acl.find_by_sid(&everyone.as_sid()).unwrap();
    /// assert_eq!(entry.mask, AccessRights::GENERIC_READ);
    ///
    /// let system: SecurityIdentifier = "S-1-5-18".parse().unwrap();
    /// assert!(matches!(
    ///     acl.find_by_sid(&system.as_sid()),
    ///     Err(Error::PrincipalNotInAcl { .. })
    /// ));
    /// ```
    #[inline]
    pub fn find_by_sid(&self, sid: &Sid<'_>) -> Result<AccessAllowedAce<'a>> {
        let mut found = None;
        let mut denied = 0usize;
        for ace in self.iter() {
            match ace? {
                Ace::AccessAllowed(allowed) => {
                    if found.is_none() && allowed.sid == *sid {
                        found = Some(allowed);
                    }
                }
                Ace::Other(header) => {
                    if header.ace_type == AceHeader::ACCESS_DENIED {
                        denied += 1;
                    }
                }
            }
        }
        if denied > 0 {
            warn!("ignored {denied} access-denied entries while looking up {sid}");
        }
        found.ok_or_else(|| Error::PrincipalNotInAcl {
            sid: sid.to_security_identifier(),
        })
    }
}

impl<'a> IntoIterator for &Acl<'a> {
    type Item = Result<Ace<'a>>;
    type IntoIter = AclIter<'a>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Lazy walk over the entries of an [`Acl`].
#[derive(Debug, Clone)]
pub struct AclIter<'a> {
    bytes: &'a [u8],
    cursor: usize,
    remaining: u16,
    done: bool,
}

impl AclIter<'_> {
    /// Offset of the next entry from the start of the ACL.
    ///
    /// After a complete walk this is the header size plus the sum of all
    /// entry sizes.
    #[inline]
    #[must_use]
    pub const fn position(&self) -> usize {
        self.cursor
    }

    /// Bytes between [`Self::position`] and the end of the ACL.
    ///
    /// Once the declared entries are walked these bytes are never decoded,
    /// even if they hold a well-formed entry.
    #[inline]
    #[must_use]
    pub const fn trailing_bytes(&self) -> usize {
        self.bytes.len().saturating_sub(self.cursor)
    }
}

impl<'a> Iterator for AclIter<'a> {
    type Item = Result<Ace<'a>>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if self.remaining == 0 {
            self.done = true;
            let trailing = self.trailing_bytes();
            if trailing > 0 {
                debug!(
                    "{trailing} bytes after the last ACE at offset {} left undecoded",
                    self.cursor
                );
            }
            return None;
        }
        if self.cursor >= self.bytes.len() {
            self.done = true;
            return Some(Err(Error::MalformedAcl {
                reason: "entry count exceeds the entries that fit in the ACL size",
            }));
        }
        match Ace::decode(self.bytes, self.cursor) {
            Ok((ace, consumed)) => {
                trace!(
                    "ACE at offset {}: type {} size {consumed}",
                    self.cursor,
                    ace.header().ace_type
                );
                self.cursor += consumed;
                self.remaining -= 1;
                Some(Ok(ace))
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done {
            (0, Some(0))
        } else {
            (0, Some(usize::from(self.remaining)))
        }
    }
}

impl FusedIterator for AclIter<'_> {}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Unwrap is not an issue in test")]
pub(crate) mod tests {
    use super::*;
    use crate::{AccessRights, SecurityIdentifier, arb_security_identifier};
    use alloc::vec;
    use proptest::prelude::*;

    /// Assembles an ACL from `(ace_type, mask, sid)` entries.
    pub(crate) fn build_acl(entries: &[(u8, u32, &SecurityIdentifier)]) -> Vec<u8> {
        let mut body = Vec::new();
        for (ace_type, mask, sid) in entries {
            let size = u16::try_from(8 + sid.as_binary().len()).unwrap();
            body.push(*ace_type);
            body.push(0);
            body.extend_from_slice(&size.to_le_bytes());
            body.extend_from_slice(&mask.to_le_bytes());
            body.extend_from_slice(sid.as_binary());
        }
        let acl_size = u16::try_from(ACL_HEADER_SIZE + body.len()).unwrap();
        let count = u16::try_from(entries.len()).unwrap();
        let mut bytes = vec![2, 0];
        bytes.extend_from_slice(&acl_size.to_le_bytes());
        bytes.extend_from_slice(&count.to_le_bytes());
        bytes.extend_from_slice(&[0, 0]);
        bytes.extend(body);
        bytes
    }

    fn sid(s: &str) -> SecurityIdentifier {
        s.parse().unwrap()
    }

    #[test]
    fn empty_acl() {
        let bytes = build_acl(&[]);
        let acl = Acl::from_bytes(&bytes).unwrap();
        assert_eq!(acl.ace_count(), 0);
        assert_eq!(acl.iter().count(), 0);
        let target = sid("S-1-5-21-1-2-3-1001");
        assert_eq!(
            acl.find_by_sid(&target.as_sid()),
            Err(Error::PrincipalNotInAcl { sid: target })
        );
    }

    #[test]
    fn first_match_wins() {
        let user = sid("S-1-5-21-1-2-3-1001");
        let other = sid("S-1-5-32-545");
        let bytes = build_acl(&[(0, 0x20, &other), (0, 0x4, &user), (0, 0x2, &user)]);
        let acl = Acl::from_bytes(&bytes).unwrap();
        let entry = acl.find_by_sid(&user.as_sid()).unwrap();
        assert_eq!(entry.mask, AccessRights::WRITE_MESSAGE);
    }

    #[test]
    fn denied_entries_are_skipped() {
        let user = sid("S-1-5-21-1-2-3-1001");
        let bytes = build_acl(&[(1, 0x4, &user), (0, 0x2, &user)]);
        let acl = Acl::from_bytes(&bytes).unwrap();
        assert_eq!(
            acl.find_by_sid(&user.as_sid()).unwrap().mask,
            AccessRights::PEEK_MESSAGE
        );
    }

    #[test]
    fn corrupt_entry_after_match_is_reported() {
        let user = sid("S-1-5-21-1-2-3-1001");
        let mut bytes = build_acl(&[(0, 0x4, &user), (0, 0x2, &user)]);
        // Second entry's SID claims one extra sub-authority.
        let second_entry = ACL_HEADER_SIZE + 36;
        bytes[second_entry + 9] += 1;
        let acl = Acl::from_bytes(&bytes).unwrap();
        assert!(matches!(
            acl.find_by_sid(&user.as_sid()),
            Err(Error::MalformedAce { offset: 44, .. })
        ));
    }

    #[test]
    fn count_beyond_size_is_malformed() {
        let user = sid("S-1-1-0");
        let mut bytes = build_acl(&[(0, 0x4, &user)]);
        bytes[4] = 2;
        let acl = Acl::from_bytes(&bytes).unwrap();
        let results: Vec<_> = acl.iter().collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(Error::MalformedAcl { .. })));
        assert!(acl.entries().is_err());
    }

    #[test]
    fn truncated_entry_is_malformed_ace() {
        let user = sid("S-1-5-21-1-2-3-1001");
        let mut bytes = build_acl(&[(0, 0x4, &user)]);
        // Shrink the ACL so the entry overruns it.
        let short = u16::try_from(bytes.len() - 4).unwrap();
        bytes[2..4].copy_from_slice(&short.to_le_bytes());
        let acl = Acl::from_bytes(&bytes).unwrap();
        let mut iter = acl.iter();
        assert!(matches!(
            iter.next(),
            Some(Err(Error::MalformedAce { offset: 8, .. }))
        ));
        assert!(iter.next().is_none());
    }

    #[test]
    fn trailing_space_is_ignored() {
        let user = sid("S-1-1-0");
        let mut bytes = build_acl(&[(0, 0x4, &user)]);
        let padded = u16::try_from(bytes.len() + 8).unwrap();
        bytes[2..4].copy_from_slice(&padded.to_le_bytes());
        bytes.extend_from_slice(&[0; 8]);
        let acl = Acl::from_bytes(&bytes).unwrap();
        assert_eq!(acl.entries().unwrap().len(), 1);
        let mut iter = acl.iter();
        assert!(iter.by_ref().all(|ace| ace.is_ok()));
        assert_eq!(iter.trailing_bytes(), 8);
    }

    #[test]
    fn entry_beyond_count_stays_hidden() {
        let world = sid("S-1-1-0");
        let alice = sid("S-1-5-21-1-2-3-1001");
        let mut bytes = build_acl(&[(0, 0x4, &world), (0, 0x000F_003F, &alice)]);
        // Declare one entry; the second stays inside `acl_size` as slack.
        bytes[4..6].copy_from_slice(&1u16.to_le_bytes());
        let acl = Acl::from_bytes(&bytes).unwrap();

        let mut iter = acl.iter();
        assert_eq!(iter.by_ref().count(), 1);
        assert_eq!(iter.position(), 8 + 20);
        assert_eq!(iter.trailing_bytes(), 8 + 28);
        assert_eq!(iter.trailing_bytes() + iter.position(), acl.acl_size());
        assert!(matches!(
            acl.find_by_sid(&alice.as_sid()),
            Err(Error::PrincipalNotInAcl { .. })
        ));
    }

    #[test]
    fn header_validation() {
        assert!(matches!(
            Acl::from_bytes(&[2, 0, 8, 0]),
            Err(Error::MalformedAcl { .. })
        ));
        assert!(Acl::from_bytes(&[1, 0, 8, 0, 0, 0, 0, 0]).is_err());
        assert!(Acl::from_bytes(&[5, 0, 8, 0, 0, 0, 0, 0]).is_err());
        assert!(Acl::from_bytes(&[2, 0, 4, 0, 0, 0, 0, 0]).is_err());
        assert!(Acl::from_bytes(&[2, 0, 16, 0, 0, 0, 0, 0]).is_err());
        let acl = Acl::from_bytes(&[4, 0, 8, 0, 0, 0, 0, 0, 0xFF]).unwrap();
        assert_eq!(acl.acl_size(), 8);
        assert_eq!(acl.revision(), 4);
    }

    proptest! {
        #[test]
        fn walk_consumes_every_entry(
            sids in proptest::collection::vec(arb_security_identifier(), 0..12),
            masks in proptest::collection::vec(any::<u32>(), 12),
        ) {
            let entries: Vec<_> = sids
                .iter()
                .zip(&masks)
                .map(|(sid, mask)| (0u8, *mask, sid))
                .collect();
            let bytes = build_acl(&entries);
            let acl = Acl::from_bytes(&bytes).unwrap();

            let mut iter = acl.iter();
            let mut consumed = 0;
            let mut decoded = 0;
            for ace in iter.by_ref() {
                let ace = ace.unwrap();
                consumed += usize::from(ace.header().size);
                decoded += 1;
            }
            prop_assert_eq!(decoded, sids.len());
            prop_assert_eq!(iter.position(), bytes.len());
            prop_assert_eq!(consumed, bytes.len() - ACL_HEADER_SIZE);

            for sid in &sids {
                let first = sids.iter().position(|s| s == sid).unwrap();
                let entry = acl.find_by_sid(&sid.as_sid()).unwrap();
                prop_assert_eq!(entry.mask.bits(), masks[first]);
            }
        }
    }
}
