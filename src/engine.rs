//! Answers "what may this principal do on this queue" and "who owns it".
//!
//! Each query runs the same pipeline: resolve the queue path to a format
//! name, fetch the requested descriptor parts with the two-phase protocol,
//! parse them and read the answer out of the parsed view. The buffer lives
//! for the duration of one query and nothing is cached between queries.

use alloc::string::{String, ToString};
use core::fmt::{self, Display};
use core::str::FromStr;

use log::{debug, trace};

use crate::fetch::{fetch_sized_descriptor, probe_descriptor_size};
use crate::{
    AccessRights, Error, FormatNameResolver, IdentityResolver, Result, SecurityDescriptor,
    SecurityIdentifier, SecurityInfoSource, SecurityInformation,
};

/// Where a query is in its pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryState {
    /// Nothing has run yet.
    Idle,
    /// The queue path resolved to a format name.
    FormatResolved,
    /// The service reported the descriptor size.
    SizeProbed,
    /// The descriptor bytes were fetched.
    BufferFetched,
    /// The descriptor decoded.
    Parsed,
    /// The requested entry or owner was found.
    Matched,
    /// The descriptor parsed but holds no answer.
    NotFound,
}

impl Display for QueryState {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::FormatResolved => "format-resolved",
            Self::SizeProbed => "size-probed",
            Self::BufferFetched => "buffer-fetched",
            Self::Parsed => "parsed",
            Self::Matched => "matched",
            Self::NotFound => "not-found",
        })
    }
}

/// Tracks one query for logging.
struct Query<'q> {
    operation: &'static str,
    path: &'q str,
    state: QueryState,
}

impl<'q> Query<'q> {
    const fn new(operation: &'static str, path: &'q str) -> Self {
        Self {
            operation,
            path,
            state: QueryState::Idle,
        }
    }

    fn advance(&mut self, next: QueryState) {
        trace!(
            "{} {}: {} -> {next}",
            self.operation, self.path, self.state
        );
        self.state = next;
    }

    fn fail(&self, err: Error) -> Error {
        debug!(
            "{} {} failed while {}: {err}",
            self.operation, self.path, self.state
        );
        err
    }
}

/// Runs access and owner queries against injected collaborators.
///
/// # Examples
/// ```rust
/// # use queue_security::*;
/// struct OnePath;
/// impl FormatNameResolver for OnePath {
///     fn resolve_path(&self, path: &str) -> Result<String, ServiceStatus> {
///         Ok(format!("DIRECT=OS:{path}"))
///     }
/// }
///
/// struct NoDescriptor;
/// impl SecurityInfoSource for NoDescriptor {
///     fn fetch_security_info(&self, _: &str, _: SecurityInformation, _: &mut [u8]) -> FetchResult {
///         FetchResult::new(ServiceStatus::QUEUE_NOT_FOUND, 0)
///     }
/// }
///
/// let engine = AccessQueryEngine::new(OnePath, NoDescriptor, StaticIdentityResolver::with_well_known());
/// let err = engine.access_mask(".\\private$\\orders", "Everyone").unwrap_err();
/// assert!(matches!(err, Error::ServiceError { code: 0xC00E_0003, .. }));
/// ```
#[derive(Debug, Clone, Default)]
pub struct AccessQueryEngine<P, S, I> {
    paths: P,
    source: S,
    identities: I,
}

impl<P, S, I> AccessQueryEngine<P, S, I> {
    /// Wraps the three collaborators a query needs.
    #[inline]
    pub const fn new(paths: P, source: S, identities: I) -> Self {
        Self {
            paths,
            source,
            identities,
        }
    }

    /// The queue path resolver.
    #[inline]
    pub const fn paths(&self) -> &P {
        &self.paths
    }

    /// The descriptor source.
    #[inline]
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// The principal resolver.
    #[inline]
    pub const fn identities(&self) -> &I {
        &self.identities
    }

    /// Gives the collaborators back.
    #[inline]
    pub fn into_parts(self) -> (P, S, I) {
        (self.paths, self.source, self.identities)
    }
}

impl<P, S, I> AccessQueryEngine<P, S, I>
where
    P: FormatNameResolver,
    S: SecurityInfoSource,
    I: IdentityResolver,
{
    /// The rights the first DACL allow entry for `principal` grants on the
    /// queue at `path`.
    ///
    /// Access-denied entries are not taken into account.
    ///
    /// # Errors
    /// - [`Error::ServiceError`] from path resolution or the fetch.
    /// - [`Error::UnknownPrincipal`] or [`Error::InvalidSidFormat`] if the
    ///   principal does not resolve to a SID.
    /// - [`Error::InconsistentSizeReport`] from the two-phase fetch.
    /// - Any decode error, or [`Error::MalformedDescriptor`] if the
    ///   descriptor carries no DACL. A NULL DACL lands here too: the bytes
    ///   are intact, but there is no entry list to read a mask from, and the
    ///   service itself grants everyone full access to such a queue.
    /// - [`Error::PrincipalNotInAcl`] if no allow entry names the principal.
    #[inline]
    pub fn access_mask(&self, path: &str, principal: &str) -> Result<AccessRights> {
        let mut query = Query::new("access_mask", path);
        let format_name = self.resolve_format_name(&mut query)?;

        let sid_text = self
            .identities
            .name_to_sid(principal)
            .ok_or_else(|| Error::UnknownPrincipal {
                principal: principal.to_string(),
            })
            .map_err(|err| query.fail(err))?;
        let sid = SecurityIdentifier::from_str(&sid_text)
            .map_err(|err| query.fail(err.into()))?;
        debug!("{principal} resolved to {sid}");

        let buffer = self.fetch(&mut query, &format_name, SecurityInformation::DACL)?;
        let descriptor = SecurityDescriptor::parse(&buffer).map_err(|err| query.fail(err))?;
        query.advance(QueryState::Parsed);

        let dacl = descriptor
            .dacl()
            .ok_or(Error::MalformedDescriptor {
                reason: "no DACL present (absent or NULL), so no mask can be read",
            })
            .map_err(|err| query.fail(err))?;
        match dacl.find_by_sid(&sid.as_sid()) {
            Ok(entry) => {
                query.advance(QueryState::Matched);
                Ok(entry.mask)
            }
            Err(err @ Error::PrincipalNotInAcl { .. }) => {
                query.advance(QueryState::NotFound);
                Err(err)
            }
            Err(err) => Err(query.fail(err)),
        }
    }

    /// The owner of the queue at `path`, as a display name.
    ///
    /// # Errors
    /// As [`Self::owner_sid`], plus [`Error::UnknownPrincipal`] if the
    /// owner SID has no name.
    #[inline]
    pub fn owner(&self, path: &str) -> Result<String> {
        let mut query = Query::new("owner", path);
        let sid = self.fetch_owner(&mut query)?;
        self.identities
            .sid_to_name(&sid.as_sid())
            .ok_or_else(|| Error::UnknownPrincipal {
                principal: sid.to_string(),
            })
            .map_err(|err| query.fail(err))
    }

    /// The owner SID of the queue at `path`.
    ///
    /// # Errors
    /// - [`Error::ServiceError`] from path resolution or the fetch.
    /// - [`Error::InconsistentSizeReport`] from the two-phase fetch.
    /// - Any decode error.
    /// - [`Error::NoOwnerRecorded`] if the descriptor has no owner.
    #[inline]
    pub fn owner_sid(&self, path: &str) -> Result<SecurityIdentifier> {
        self.fetch_owner(&mut Query::new("owner_sid", path))
    }

    fn fetch_owner(&self, query: &mut Query<'_>) -> Result<SecurityIdentifier> {
        let format_name = self.resolve_format_name(query)?;
        let buffer = self.fetch(query, &format_name, SecurityInformation::OWNER)?;
        let descriptor = SecurityDescriptor::parse(&buffer).map_err(|err| query.fail(err))?;
        query.advance(QueryState::Parsed);

        if let Some(owner) = descriptor.owner() {
            query.advance(QueryState::Matched);
            Ok(owner.to_security_identifier())
        } else {
            query.advance(QueryState::NotFound);
            Err(Error::NoOwnerRecorded)
        }
    }

    fn resolve_format_name(&self, query: &mut Query<'_>) -> Result<String> {
        let format_name = self
            .paths
            .resolve_path(query.path)
            .map_err(|status| query.fail(status.into()))?;
        query.advance(QueryState::FormatResolved);
        Ok(format_name)
    }

    fn fetch(
        &self,
        query: &mut Query<'_>,
        format_name: &str,
        info: SecurityInformation,
    ) -> Result<alloc::vec::Vec<u8>> {
        let bytes_needed = probe_descriptor_size(&self.source, format_name, info)
            .map_err(|err| query.fail(err))?;
        query.advance(QueryState::SizeProbed);
        let buffer = fetch_sized_descriptor(&self.source, format_name, info, bytes_needed)
            .map_err(|err| query.fail(err))?;
        query.advance(QueryState::BufferFetched);
        Ok(buffer)
    }
}
