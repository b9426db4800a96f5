//! Translation between account names and SIDs.

use alloc::boxed::Box;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::{DomainAndName, SecurityIdentifier, Sid, well_known};

#[cfg(all(windows, feature = "std"))]
mod local_account;
#[cfg(all(windows, feature = "std"))]
mod lookup_error;

#[cfg(all(windows, feature = "std"))]
pub use local_account::{LocalAccountResolver, NameLookup, SidLookup};
#[cfg(all(windows, feature = "std"))]
pub use lookup_error::LookupError;

/// Maps principal names to SIDs and back.
///
/// SIDs cross this boundary in their canonical text form. `None` means the
/// principal is unknown.
pub trait IdentityResolver {
    /// The SID text (`S-1-...`) for an account name.
    fn name_to_sid(&self, name: &str) -> Option<String>;
    /// The display name for a SID.
    fn sid_to_name(&self, sid: &Sid<'_>) -> Option<String>;
}

impl<T: IdentityResolver + ?Sized> IdentityResolver for &T {
    #[inline]
    fn name_to_sid(&self, name: &str) -> Option<String> {
        (**self).name_to_sid(name)
    }

    #[inline]
    fn sid_to_name(&self, sid: &Sid<'_>) -> Option<String> {
        (**self).sid_to_name(sid)
    }
}

impl<T: IdentityResolver + ?Sized> IdentityResolver for Box<T> {
    #[inline]
    fn name_to_sid(&self, name: &str) -> Option<String> {
        (**self).name_to_sid(name)
    }

    #[inline]
    fn sid_to_name(&self, sid: &Sid<'_>) -> Option<String> {
        (**self).sid_to_name(sid)
    }
}

/// An in-memory table of principals.
///
/// Names match case-insensitively, either as `DOMAIN\Name` or as the bare
/// `Name`; the first matching entry wins. A name that is itself SID text is
/// accepted as-is.
///
/// # Examples
/// ```rust
/// # use queue_security::{IdentityResolver, SecurityIdentifier, StaticIdentityResolver};
/// let alice: SecurityIdentifier = "S-1-5-21-1-2-3-1001".parse().unwrap();
/// let resolver = StaticIdentityResolver::with_well_known().with("CONTOSO\\alice", alice.clone());
///
/// assert_eq!(resolver.name_to_sid("alice").as_deref(), Some("S-1-5-21-1-2-3-1001"));
/// assert_eq!(resolver.name_to_sid("everyone").as_deref(), Some("S-1-1-0"));
/// assert_eq!(resolver.sid_to_name(&alice.as_sid()).as_deref(), Some("CONTOSO\\alice"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticIdentityResolver {
    entries: Vec<(DomainAndName, SecurityIdentifier)>,
}

impl StaticIdentityResolver {
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// A table seeded with [`well_known::principals`].
    #[inline]
    #[must_use]
    pub fn with_well_known() -> Self {
        let mut resolver = Self::new();
        for (name, sid) in well_known::principals() {
            resolver.insert(name, sid);
        }
        resolver
    }

    /// Adds an entry, parsing `name` as `DOMAIN\Name` when it has a backslash.
    #[inline]
    pub fn insert(&mut self, name: &str, sid: SecurityIdentifier) {
        let name = name
            .parse()
            .unwrap_or_else(|_| DomainAndName::new("", name));
        self.entries.push((name, sid));
    }

    #[inline]
    #[must_use]
    pub fn with(mut self, name: &str, sid: SecurityIdentifier) -> Self {
        self.insert(name, sid);
        self
    }

    #[inline]
    #[must_use]
    pub fn lookup_name(&self, name: &str) -> Option<&SecurityIdentifier> {
        self.entries
            .iter()
            .find(|(entry, _)| entry.matches(name))
            .map(|(_, sid)| sid)
    }

    #[inline]
    #[must_use]
    pub fn lookup_sid(&self, sid: &Sid<'_>) -> Option<&DomainAndName> {
        self.entries
            .iter()
            .find(|(_, entry)| entry == sid)
            .map(|(name, _)| name)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IdentityResolver for StaticIdentityResolver {
    #[inline]
    fn name_to_sid(&self, name: &str) -> Option<String> {
        self.lookup_name(name).map(ToString::to_string).or_else(|| {
            name.parse::<SecurityIdentifier>()
                .ok()
                .map(|sid| sid.to_string())
        })
    }

    #[inline]
    fn sid_to_name(&self, sid: &Sid<'_>) -> Option<String> {
        self.lookup_sid(sid).map(ToString::to_string)
    }
}

impl<N: AsRef<str>> FromIterator<(N, SecurityIdentifier)> for StaticIdentityResolver {
    #[inline]
    fn from_iter<I: IntoIterator<Item = (N, SecurityIdentifier)>>(iter: I) -> Self {
        let mut resolver = Self::new();
        for (name, sid) in iter {
            resolver.insert(name.as_ref(), sid);
        }
        resolver
    }
}
