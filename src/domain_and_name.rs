use alloc::string::String;
use core::fmt::{self, Display};
use core::str::FromStr;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Error)]
#[error("Failed to parse domain and name")]
pub struct DomainParsingError;

/// An account name qualified by its domain, written `DOMAIN\Name`.
///
/// The domain may be empty for principals that have none (`Everyone`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct DomainAndName {
    pub domain: String,
    pub name: String,
}

impl DomainAndName {
    #[inline]
    pub fn new<D: Into<String>, N: Into<String>>(domain: D, name: N) -> Self {
        Self {
            domain: domain.into(),
            name: name.into(),
        }
    }

    /// Case-insensitive match against `DOMAIN\Name` or the bare `Name`.
    #[inline]
    #[must_use]
    pub fn matches(&self, text: &str) -> bool {
        match text.split_once('\\') {
            Some((domain, name)) => {
                domain.eq_ignore_ascii_case(&self.domain) && name.eq_ignore_ascii_case(&self.name)
            }
            None => text.eq_ignore_ascii_case(&self.name),
        }
    }
}

impl Display for DomainAndName {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.domain.is_empty() {
            f.write_str(&self.name)
        } else {
            write!(f, "{}\\{}", self.domain, self.name)
        }
    }
}

impl FromStr for DomainAndName {
    type Err = DomainParsingError;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (domain, name) = s.split_once('\\').unwrap_or(("", s));
        if name.is_empty() || name.contains('\\') {
            return Err(DomainParsingError);
        }
        Ok(Self::new(domain, name))
    }
}
