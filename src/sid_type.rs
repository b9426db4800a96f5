use num_enum::{IntoPrimitive, TryFromPrimitive};

/// The kind of account a SID names, as reported by `LookupAccountSidW`
/// and `LookupAccountNameW`.
///
/// See Microsoft docs for [SID_NAME_USE](https://learn.microsoft.com/en-us/windows/win32/api/winnt/ne-winnt-sid_name_use).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(i32)]
pub enum SidType {
    User = 1,
    Group = 2,
    Domain = 3,
    /// A local group such as `BUILTIN\Administrators`.
    Alias = 4,
    /// A well-known group such as `Everyone`.
    WellKnownGroup = 5,
    DeletedAccount = 6,
    Invalid = 7,
    Unknown = 8,
    Computer = 9,
    /// A mandatory integrity label.
    Label = 10,
    LogonSession = 11,
}
