//! Well-known SIDs.
//!
//! Source: https://learn.microsoft.com/windows/win32/secauthz/well-known-sids

use crate::{ConstSid, SecurityIdentifier, sid};

// ---- Basic Authorities ----

/// Null SID (S-1-0-0)
pub const NULL: ConstSid<1> = sid!("S-1-0-0");

/// World SID, `Everyone` (S-1-1-0)
pub const WORLD: ConstSid<1> = sid!("S-1-1-0");

/// Local SID (S-1-2-0)
pub const LOCAL: ConstSid<1> = sid!("S-1-2-0");

/// Creator Owner SID (S-1-3-0)
pub const CREATOR_OWNER: ConstSid<1> = sid!("S-1-3-0");

/// Creator Group SID (S-1-3-1)
pub const CREATOR_GROUP: ConstSid<1> = sid!("S-1-3-1");

// ---- NT Authority (S-1-5) ----

/// Local System (S-1-5-18)
pub const LOCAL_SYSTEM: ConstSid<1> = sid!("S-1-5-18");

/// Local Service (S-1-5-19)
pub const LOCAL_SERVICE: ConstSid<1> = sid!("S-1-5-19");

/// Network Service (S-1-5-20)
pub const NETWORK_SERVICE: ConstSid<1> = sid!("S-1-5-20");

// ---- BUILTIN Domain (S-1-5-32) ----

/// BUILTIN\Administrators (S-1-5-32-544)
pub const BUILTIN_ADMINISTRATORS: ConstSid<2> = sid!("S-1-5-32-544");

/// BUILTIN\Users (S-1-5-32-545)
pub const BUILTIN_USERS: ConstSid<2> = sid!("S-1-5-32-545");

/// BUILTIN\Guests (S-1-5-32-546)
pub const BUILTIN_GUESTS: ConstSid<2> = sid!("S-1-5-32-546");

/// BUILTIN\Power Users (S-1-5-32-547)
pub const BUILTIN_POWER_USERS: ConstSid<2> = sid!("S-1-5-32-547");

/// Display names of the SIDs above, paired with the SIDs.
#[inline]
pub fn principals() -> impl Iterator<Item = (&'static str, SecurityIdentifier)> {
    let one = [
        ("NULL SID", NULL),
        ("Everyone", WORLD),
        ("LOCAL", LOCAL),
        ("CREATOR OWNER", CREATOR_OWNER),
        ("CREATOR GROUP", CREATOR_GROUP),
        ("NT AUTHORITY\\SYSTEM", LOCAL_SYSTEM),
        ("NT AUTHORITY\\LOCAL SERVICE", LOCAL_SERVICE),
        ("NT AUTHORITY\\NETWORK SERVICE", NETWORK_SERVICE),
    ];
    let two = [
        ("BUILTIN\\Administrators", BUILTIN_ADMINISTRATORS),
        ("BUILTIN\\Users", BUILTIN_USERS),
        ("BUILTIN\\Guests", BUILTIN_GUESTS),
        ("BUILTIN\\Power Users", BUILTIN_POWER_USERS),
    ];
    one.into_iter()
        .map(|(name, sid)| (name, SecurityIdentifier::from(sid)))
        .chain(
            two.into_iter()
                .map(|(name, sid)| (name, SecurityIdentifier::from(sid))),
        )
}
