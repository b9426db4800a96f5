use crate::sid::SID_HEAD_SIZE;
use crate::utils::sub_authority_size_guard;

/// Byte-size bookkeeping for a SID with a given number of sub-authorities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SidSizeInfo {
    sub_authority_count: u8,
}

impl SidSizeInfo {
    #[cfg(test)]
    pub const MIN: Self = Self {
        sub_authority_count: parsing::MIN_SUBAUTHORITY_COUNT,
    };
    #[cfg(test)]
    pub const MAX: Self = Self {
        sub_authority_count: parsing::MAX_SUBAUTHORITY_COUNT,
    };

    pub const fn from_count(sub_authority_count: u8) -> Option<Self> {
        if sub_authority_size_guard(sub_authority_count as usize) {
            Some(Self {
                sub_authority_count,
            })
        } else {
            None
        }
    }

    /// Encoded length: 8 header bytes plus 4 per sub-authority.
    pub const fn byte_len(self) -> usize {
        SID_HEAD_SIZE + (self.sub_authority_count as usize) * size_of::<u32>()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Unwrap is not an issue in test")]
mod test {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_byte_len(sub_authority_count in 0u8..16) {
            let info = SidSizeInfo::from_count(sub_authority_count).unwrap();
            prop_assert_eq!(info.byte_len(), 8 + 4 * sub_authority_count as usize);
            prop_assert!((info.byte_len() - SID_HEAD_SIZE) % size_of::<u32>() == 0);
        }

        #[test]
        fn prop_count_out_of_range(sub_authority_count in 16u8..=u8::MAX) {
            prop_assert!(SidSizeInfo::from_count(sub_authority_count).is_none());
        }
    }

    #[test]
    fn bounds() {
        assert_eq!(SidSizeInfo::MIN.byte_len(), 8);
        assert_eq!(SidSizeInfo::MAX.byte_len(), 68);
    }
}
