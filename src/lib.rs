//! # Queue security descriptors for Rust
//!
//! Decode the self-relative security descriptor of a message queue and
//! answer two questions about it: what rights a principal holds, and who
//! owns the queue.
//!
//! The crate provides:
//! - [`Sid`]: a zero-copy, validated view of a binary SID inside a larger
//!   buffer, and [`SecurityIdentifier`], its owned counterpart with text
//!   parsing and formatting.
//! - [`ConstSid`] and the [`sid!`] macro for SIDs known at compile time, and
//!   [`well_known`] constants built with it.
//! - [`SecurityDescriptor`], [`Acl`] and [`Ace`]: a bounds-checked decoder
//!   for self-relative descriptors, their ACLs and entries.
//! - [`AccessRights`]: the queue access mask with its composite rights.
//! - [`AccessQueryEngine`]: the end-to-end query pipeline over injected
//!   collaborators ([`FormatNameResolver`], [`SecurityInfoSource`],
//!   [`IdentityResolver`]).
//!
//! ## Overview
//! - **No raw pointers in the decoder**: every read goes through checked
//!   offsets into one buffer, so corrupt input surfaces as an [`Error`],
//!   never as undefined behavior.
//! - **Typed failures**: "this principal has no entry" ([`Error::PrincipalNotInAcl`])
//!   is distinct from "the descriptor is corrupt" ([`Error::is_malformed`]).
//! - **Two-phase fetch**: [`fetch_descriptor`] probes for the descriptor size
//!   before fetching it into a buffer of exactly that size.
//!
//! ## Examples
//! ### Decode a descriptor and look a principal up
//! ```rust
//! use queue_security::{AccessRights, SecurityDescriptor, SecurityIdentifier};
//!
//! let descriptor: Vec<u8> = vec![
//!     1, 0, 0x04, 0x80,           // revision 1, control: DACL present, self-relative
//!     0, 0, 0, 0,                 // no owner
//!     0, 0, 0, 0,                 // no group
//!     0, 0, 0, 0,                 // no SACL
//!     20, 0, 0, 0,                // DACL at offset 20
//!     2, 0, 36, 0, 1, 0, 0, 0,    // ACL: revision 2, 36 bytes, 1 entry
//!     0, 0, 28, 0, 4, 0, 0, 0,    // allow, 28 bytes, WRITE_MESSAGE
//!     1, 3, 0, 0, 0, 0, 0, 5, 21, 0, 0, 0, 1, 0, 0, 0, 233, 3, 0, 0, // S-1-5-21-1-1001
//! ];
//! let descriptor = SecurityDescriptor::parse(&descriptor).unwrap();
//! let user: SecurityIdentifier = "S-1-5-21-1-1001".parse().unwrap();
//! let entry = descriptor.dacl().unwrap().find_by_sid(&user.as_sid()).unwrap();
//! assert_eq!(entry.mask, AccessRights::WRITE_MESSAGE);
//! ```
//!
//! ### Use a const SID
//! ```rust
//! use queue_security::{SecurityIdentifier, well_known};
//!
//! let owned = SecurityIdentifier::from(well_known::BUILTIN_ADMINISTRATORS);
//! assert_eq!(owned.to_string(), "S-1-5-32-544");
//! ```
//!
//! ## Features
//! - `std` (default): standard library support and, on Windows, the
//!   `LocalAccountResolver` backed by the system account database.
//! - `serde`: `Serialize`/`Deserialize` for SIDs and [`AccessRights`].
//!
//! Without `std` the crate is `no_std` and needs only `alloc`.

#![warn(missing_docs)]
#![cfg_attr(not(feature = "std"), no_std)]
#![cfg_attr(docsrs, feature(doc_auto_cfg, doc_cfg))]

extern crate alloc;

mod ace;
mod acl;
mod access_rights;
mod const_sid;
mod domain_and_name;
mod engine;
mod error;
mod fetch;
mod identity;
mod security_descriptor;
mod security_identifier;
#[cfg(feature = "serde")]
mod serde_impl;
mod sid;
mod sid_identifier_authority;
mod sid_size_info;
#[cfg(all(windows, feature = "std"))]
mod sid_type;
mod status;
/// Internal utilities for validation and checked reads.
pub(crate) mod utils;
pub mod well_known;

pub use ace::{
    ACE_HEADER_SIZE, AccessAllowedAce, Ace, AceFlags, AceHeader, MIN_ACCESS_ALLOWED_ACE_SIZE,
};
pub use acl::{ACL_HEADER_SIZE, Acl, AclIter, MAX_ACL_REVISION, MIN_ACL_REVISION};
pub use access_rights::{AccessRights, SecurityInformation};
/// Const-friendly fixed-size SID (`N` sub-authorities).
///
/// See [`ConstSid`] for invariants and examples.
pub use const_sid::ConstSid;
pub use domain_and_name::{DomainAndName, DomainParsingError};
pub use engine::{AccessQueryEngine, QueryState};
pub use error::{Error, Result};
pub use fetch::{
    FetchResult, FormatNameResolver, SecurityInfoSource, fetch_descriptor, fetch_sized_descriptor,
    probe_descriptor_size,
};
pub use identity::{IdentityResolver, StaticIdentityResolver};
#[cfg_attr(docsrs, doc(cfg(all(windows, feature = "std"))))]
#[cfg(all(windows, feature = "std"))]
pub use identity::{LocalAccountResolver, LookupError, NameLookup, SidLookup};
pub use parsing::InvalidSidFormat;
pub use security_descriptor::{
    SECURITY_DESCRIPTOR_HEADER_SIZE, SECURITY_DESCRIPTOR_REVISION, SecurityDescriptor,
    SecurityDescriptorControl,
};
pub use security_identifier::SecurityIdentifier;
pub use sid::{MAX_SUBAUTHORITY_COUNT, MIN_SUBAUTHORITY_COUNT, SID_HEAD_SIZE, Sid, SubAuthorities};
/// Identifier authority component of a SID (6-byte value).
///
/// See also: [`Sid::identifier_authority`], [`ConstSid::identifier_authority`].
pub use sid_identifier_authority::SidIdentifierAuthority;
pub(crate) use sid_size_info::SidSizeInfo;
/// Rust representation of `SID_NAME_USE` (Windows).
#[cfg(all(windows, feature = "std"))]
pub use sid_type::SidType;
pub use status::{KNOWN_STATUSES, ServiceStatus};

/// Builds a [`ConstSid`] from a SID string literal at compile time.
///
/// ```rust
/// use queue_security::{ConstSid, sid};
///
/// const USERS: ConstSid<2> = sid!("S-1-5-32-545");
/// assert_eq!(USERS.to_string(), "S-1-5-32-545");
/// ```
pub use sid_macro::sid;

#[cfg(test)]
pub(crate) use security_identifier::test::arb_security_identifier;
#[cfg(test)]
pub(crate) use sid_identifier_authority::test::arb_identifier_authority;
