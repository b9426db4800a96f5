// End-to-end queries over in-memory collaborators
#![allow(clippy::unwrap_used, reason = "Unwrap is not an issue in tests")]
#![allow(clippy::expect_used, reason = "Expect is not an issue in tests")]

use std::cell::RefCell;

use proptest::prelude::*;
use queue_security::{
    AccessQueryEngine, AccessRights, Ace, Acl, Error, FetchResult, FormatNameResolver,
    SecurityDescriptor, SecurityIdentifier, SecurityInfoSource, SecurityInformation,
    ServiceStatus, Sid, StaticIdentityResolver, fetch_descriptor,
};

const ALICE: &str = "S-1-5-21-1-2-3-1001";
const ALLOW: u8 = 0;
const DENY: u8 = 1;

fn sid(text: &str) -> SecurityIdentifier {
    text.parse().unwrap()
}

fn ace(ace_type: u8, mask: u32, sid: &SecurityIdentifier) -> Vec<u8> {
    let size = u16::try_from(8 + sid.as_binary().len()).unwrap();
    let mut out = vec![ace_type, 0];
    out.extend_from_slice(&size.to_le_bytes());
    out.extend_from_slice(&mask.to_le_bytes());
    out.extend_from_slice(sid.as_binary());
    out
}

fn acl(entries: &[Vec<u8>]) -> Vec<u8> {
    let body: Vec<u8> = entries.concat();
    let size = u16::try_from(8 + body.len()).unwrap();
    let count = u16::try_from(entries.len()).unwrap();
    let mut out = vec![2, 0];
    out.extend_from_slice(&size.to_le_bytes());
    out.extend_from_slice(&count.to_le_bytes());
    out.extend_from_slice(&[0, 0]);
    out.extend_from_slice(&body);
    out
}

fn descriptor(owner: Option<&SecurityIdentifier>, dacl: Option<&[u8]>) -> Vec<u8> {
    let mut control: u16 = 0x8000;
    if dacl.is_some() {
        control |= 0x0004;
    }
    let mut out = vec![1, 0];
    out.extend_from_slice(&control.to_le_bytes());
    out.extend_from_slice(&[0; 16]);
    let place = |out: &mut Vec<u8>, field: usize, bytes: &[u8]| {
        let offset = u32::try_from(out.len()).unwrap();
        out[field..field + 4].copy_from_slice(&offset.to_le_bytes());
        out.extend_from_slice(bytes);
    };
    if let Some(owner) = owner {
        place(&mut out, 4, owner.as_binary());
    }
    if let Some(dacl) = dacl {
        place(&mut out, 16, dacl);
    }
    out
}

struct Direct;

impl FormatNameResolver for Direct {
    fn resolve_path(&self, path: &str) -> Result<String, ServiceStatus> {
        Ok(format!("DIRECT=OS:{path}"))
    }
}

/// Serves a fixed descriptor and records the buffer size of every call.
struct Stored {
    bytes: Vec<u8>,
    calls: RefCell<Vec<usize>>,
}

impl Stored {
    fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            calls: RefCell::new(Vec::new()),
        }
    }
}

impl SecurityInfoSource for Stored {
    fn fetch_security_info(
        &self,
        _format_name: &str,
        _info: SecurityInformation,
        buffer: &mut [u8],
    ) -> FetchResult {
        self.calls.borrow_mut().push(buffer.len());
        let needed = u32::try_from(self.bytes.len()).unwrap();
        match buffer.get_mut(..self.bytes.len()) {
            Some(target) => {
                target.copy_from_slice(&self.bytes);
                FetchResult::new(ServiceStatus::OK, needed)
            }
            None => FetchResult::new(ServiceStatus::SECURITY_DESCRIPTOR_TOO_SMALL, needed),
        }
    }
}

/// Reports a size on the probe, then claims it was not enough.
struct Growing;

impl SecurityInfoSource for Growing {
    fn fetch_security_info(
        &self,
        _format_name: &str,
        _info: SecurityInformation,
        buffer: &mut [u8],
    ) -> FetchResult {
        let needed = if buffer.is_empty() { 48 } else { 96 };
        FetchResult::new(ServiceStatus::SECURITY_DESCRIPTOR_TOO_SMALL, needed)
    }
}

fn engine(bytes: Vec<u8>) -> AccessQueryEngine<Direct, Stored, StaticIdentityResolver> {
    let identities = StaticIdentityResolver::with_well_known().with("CONTOSO\\alice", sid(ALICE));
    AccessQueryEngine::new(Direct, Stored::new(bytes), identities)
}

#[test]
fn write_only_principal() {
    let dacl = acl(&[ace(ALLOW, 0x4, &sid(ALICE))]);
    let engine = engine(descriptor(None, Some(&dacl)));

    let rights = engine.access_mask(".\\private$\\orders", "CONTOSO\\alice").unwrap();
    assert_eq!(rights, AccessRights::WRITE_MESSAGE);
    assert_eq!(
        rights.primitives().map(|(name, _)| name).collect::<Vec<_>>(),
        ["WRITE_MESSAGE"]
    );
    assert!(!rights.contains(AccessRights::RECEIVE_MESSAGE));

    let by_sid = engine.access_mask(".\\private$\\orders", ALICE).unwrap();
    assert_eq!(by_sid, rights);
}

#[test]
fn probe_then_fetch() {
    let world = sid("S-1-1-0");
    let bytes = descriptor(None, Some(&acl(&[ace(ALLOW, 0x0002_0020, &world)])));
    assert_eq!(bytes.len(), 48);

    let engine = engine(bytes.clone());
    assert_eq!(
        engine.access_mask("host\\orders", "Everyone").unwrap(),
        AccessRights::GET_QUEUE_PROPERTIES | AccessRights::GET_QUEUE_PERMISSIONS
    );
    assert_eq!(*engine.source().calls.borrow(), [0, 48]);

    let source = Stored::new(bytes.clone());
    let fetched = fetch_descriptor(&source, "PUBLIC=1234", SecurityInformation::DACL).unwrap();
    assert_eq!(fetched, bytes);
}

#[test]
fn size_changes_between_phases() {
    let engine = AccessQueryEngine::new(Direct, Growing, StaticIdentityResolver::with_well_known());
    assert_eq!(
        engine.owner("host\\orders"),
        Err(Error::InconsistentSizeReport {
            probed: 48,
            reported: 96
        })
    );
}

#[test]
fn owner_offset_zero() {
    let dacl = acl(&[]);
    let engine = engine(descriptor(None, Some(&dacl)));
    assert_eq!(engine.owner("host\\orders"), Err(Error::NoOwnerRecorded));
    assert_eq!(engine.owner_sid("host\\orders"), Err(Error::NoOwnerRecorded));
}

#[test]
fn owner_is_named() {
    let admins = sid("S-1-5-32-544");
    let engine = engine(descriptor(Some(&admins), None));
    assert_eq!(engine.owner_sid("host\\orders").unwrap(), admins);
    assert_eq!(engine.owner("host\\orders").unwrap(), "BUILTIN\\Administrators");
}

#[test]
fn empty_acl_has_no_entry() {
    let dacl = acl(&[]);
    let engine = engine(descriptor(None, Some(&dacl)));
    let err = engine.access_mask("host\\orders", ALICE).unwrap_err();
    assert_eq!(err, Error::PrincipalNotInAcl { sid: sid(ALICE) });
    assert!(!err.is_malformed());
}

#[test]
fn first_allow_entry_wins() {
    let alice = sid(ALICE);
    let dacl = acl(&[
        ace(DENY, 0x4, &alice),
        ace(ALLOW, 0x20, &sid("S-1-1-0")),
        ace(ALLOW, 0x4, &alice),
        ace(ALLOW, 0x000F_003F, &alice),
    ]);
    let engine = engine(descriptor(None, Some(&dacl)));
    assert_eq!(
        engine.access_mask("host\\orders", ALICE).unwrap(),
        AccessRights::WRITE_MESSAGE
    );
}

#[test]
fn truncated_entry_is_malformed() {
    let mut dacl = acl(&[ace(ALLOW, 0x4, &sid(ALICE))]);
    // Entry claims four bytes more than the list holds.
    dacl[10] += 4;
    let engine = engine(descriptor(None, Some(&dacl)));
    let err = engine.access_mask("host\\orders", ALICE).unwrap_err();
    assert!(matches!(err, Error::MalformedAce { offset: 8, .. }));
    assert!(err.is_malformed());
}

#[test]
fn parsing_is_repeatable() {
    let alice = sid(ALICE);
    let bytes = descriptor(Some(&alice), Some(&acl(&[ace(ALLOW, 0x4, &alice)])));
    let first = SecurityDescriptor::parse(&bytes).unwrap();
    let second = SecurityDescriptor::parse(&bytes).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.owner(), second.owner());
    assert_eq!(
        first.dacl().unwrap().entries().unwrap(),
        second.dacl().unwrap().entries().unwrap()
    );
}

#[test]
fn sid_text_and_binary_agree() {
    let alice = sid(ALICE);
    let view = Sid::from_bytes(alice.as_binary()).unwrap();
    assert_eq!(view.to_string(), ALICE);
    assert_eq!(view.to_security_identifier(), alice);
    assert_eq!(view.rid(), Some(1001));
}

fn arb_principal() -> impl Strategy<Value = SecurityIdentifier> {
    (any::<u8>(), proptest::collection::vec(any::<u32>(), 0..=15)).prop_map(
        |(authority, subs)| {
            SecurityIdentifier::try_new([0, 0, 0, 0, 0, authority], &subs)
                .expect("sub-authority count is in range")
        },
    )
}

proptest! {
    #[test]
    fn every_entry_is_visited(
        principals in proptest::collection::vec((arb_principal(), any::<u32>(), any::<bool>()), 0..12)
    ) {
        let entries: Vec<Vec<u8>> = principals
            .iter()
            .map(|(sid, mask, deny)| ace(if *deny { DENY } else { ALLOW }, *mask, sid))
            .collect();
        let bytes = acl(&entries);
        let list = Acl::from_bytes(&bytes).unwrap();

        let decoded = list.entries().unwrap();
        prop_assert_eq!(decoded.len(), principals.len());
        for (entry, (sid, mask, deny)) in decoded.iter().zip(&principals) {
            match entry {
                Ace::AccessAllowed(allowed) => {
                    prop_assert!(!deny);
                    prop_assert_eq!(allowed.mask.bits(), *mask);
                    prop_assert_eq!(allowed.sid.to_security_identifier(), sid.clone());
                }
                Ace::Other(header) => {
                    prop_assert!(deny);
                    prop_assert_eq!(header.ace_type, DENY);
                }
            }
        }

        for (sid, _, _) in &principals {
            let expected = principals
                .iter()
                .find(|(candidate, _, deny)| candidate == sid && !deny)
                .map(|(_, mask, _)| *mask);
            match list.find_by_sid(&sid.as_sid()) {
                Ok(found) => prop_assert_eq!(Some(found.mask.bits()), expected),
                Err(Error::PrincipalNotInAcl { sid: missing }) => {
                    prop_assert_eq!(expected, None);
                    prop_assert_eq!(&missing, sid);
                }
                Err(other) => prop_assert!(false, "unexpected error {}", other),
            }
        }
    }
}
