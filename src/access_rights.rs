use core::fmt::{self, Display};
use core::str::FromStr;

use bitflags::bitflags;

bitflags! {
    /// Rights an access mask can grant on a queue.
    ///
    /// The ten primitive rights come first, so iterating a mask by name
    /// yields its primitive decomposition; the composites below them are
    /// unions of primitives and never show up in that walk.
    ///
    /// Bits without a name are kept when a mask is decoded.
    ///
    /// # Examples
    /// ```rust
    /// # use queue_security::AccessRights;
    /// let rights = AccessRights::from_bits_retain(0x0002_002B);
    /// assert_eq!(rights, AccessRights::GENERIC_READ);
    /// assert!(rights.contains(AccessRights::RECEIVE_MESSAGE));
    /// assert_eq!(
    ///     rights.to_string(),
    ///     "DELETE_MESSAGE | PEEK_MESSAGE | DELETE_JOURNAL_MESSAGE | GET_QUEUE_PROPERTIES | GET_QUEUE_PERMISSIONS"
    /// );
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct AccessRights: u32 {
        const DELETE_MESSAGE = 0x0000_0001;
        const PEEK_MESSAGE = 0x0000_0002;
        const WRITE_MESSAGE = 0x0000_0004;
        const DELETE_JOURNAL_MESSAGE = 0x0000_0008;
        const SET_QUEUE_PROPERTIES = 0x0000_0010;
        const GET_QUEUE_PROPERTIES = 0x0000_0020;
        const DELETE_QUEUE = 0x0001_0000;
        const GET_QUEUE_PERMISSIONS = 0x0002_0000;
        const CHANGE_QUEUE_PERMISSIONS = 0x0004_0000;
        const TAKE_QUEUE_OWNERSHIP = 0x0008_0000;

        const RECEIVE_MESSAGE = Self::DELETE_MESSAGE.bits() | Self::PEEK_MESSAGE.bits();
        const RECEIVE_JOURNAL_MESSAGE =
            Self::DELETE_JOURNAL_MESSAGE.bits() | Self::PEEK_MESSAGE.bits();
        const GENERIC_READ = Self::GET_QUEUE_PROPERTIES.bits()
            | Self::GET_QUEUE_PERMISSIONS.bits()
            | Self::RECEIVE_MESSAGE.bits()
            | Self::RECEIVE_JOURNAL_MESSAGE.bits();
        const GENERIC_WRITE = Self::GET_QUEUE_PROPERTIES.bits()
            | Self::GET_QUEUE_PERMISSIONS.bits()
            | Self::WRITE_MESSAGE.bits();
        const FULL_CONTROL = Self::DELETE_MESSAGE.bits()
            | Self::PEEK_MESSAGE.bits()
            | Self::WRITE_MESSAGE.bits()
            | Self::DELETE_JOURNAL_MESSAGE.bits()
            | Self::SET_QUEUE_PROPERTIES.bits()
            | Self::GET_QUEUE_PROPERTIES.bits()
            | Self::DELETE_QUEUE.bits()
            | Self::GET_QUEUE_PERMISSIONS.bits()
            | Self::CHANGE_QUEUE_PERMISSIONS.bits()
            | Self::TAKE_QUEUE_OWNERSHIP.bits();
    }
}

impl AccessRights {
    /// The named primitive rights contained in this mask, lowest bit first.
    #[inline]
    pub fn primitives(self) -> impl Iterator<Item = (&'static str, Self)> {
        self.iter_names()
            .filter(|(_, flag)| flag.bits().is_power_of_two())
    }

    /// Bits set in the mask that no right is named for.
    #[inline]
    #[must_use]
    pub const fn unknown_bits(&self) -> u32 {
        self.bits() & !Self::all().bits()
    }
}

impl Display for AccessRights {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("0x0");
        }
        bitflags::parser::to_writer(self, f)
    }
}

impl FromStr for AccessRights {
    type Err = bitflags::parser::ParseError;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        bitflags::parser::from_str(s)
    }
}

impl From<AccessRights> for u32 {
    #[inline]
    fn from(value: AccessRights) -> Self {
        value.bits()
    }
}

bitflags! {
    /// Which parts of a security descriptor to request from the service.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SecurityInformation: u32 {
        const OWNER = 0x1;
        const GROUP = 0x2;
        const DACL = 0x4;
        const SACL = 0x8;
    }
}
