/// The 6-byte, big-endian identifier authority of a SID.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SidIdentifierAuthority {
    pub value: [u8; 6],
}

impl SidIdentifierAuthority {
    /// `S-1-0`
    pub const NULL_AUTHORITY: Self = Self::new([0, 0, 0, 0, 0, 0]);
    /// `S-1-1`
    pub const SECURITY_WORLD_AUTHORITY: Self = Self::new([0, 0, 0, 0, 0, 1]);
    /// `S-1-2`
    pub const SECURITY_LOCAL_AUTHORITY: Self = Self::new([0, 0, 0, 0, 0, 2]);
    /// `S-1-3`
    pub const SECURITY_CREATOR_AUTHORITY: Self = Self::new([0, 0, 0, 0, 0, 3]);
    /// `S-1-5`
    pub const NT_AUTHORITY: Self = Self::new([0, 0, 0, 0, 0, 5]);

    #[inline]
    #[must_use]
    pub const fn new(value: [u8; 6]) -> Self {
        Self { value }
    }

    /// The authority as a 48-bit integer.
    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        let [a, b, c, d, e, f] = self.value;
        u64::from_be_bytes([0, 0, a, b, c, d, e, f])
    }
}

impl From<[u8; 6]> for SidIdentifierAuthority {
    #[inline]
    fn from(value: [u8; 6]) -> Self {
        Self { value }
    }
}

impl From<SidIdentifierAuthority> for [u8; 6] {
    #[inline]
    fn from(value: SidIdentifierAuthority) -> Self {
        value.value
    }
}
