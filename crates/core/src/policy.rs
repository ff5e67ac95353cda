//! Revision-conflict policy resolution
//!
//! Every mutation decides, before dispatch, whether to attach a
//! precondition revision:
//!
//! - [`RevisionPolicy::Last`]: always overwrite, no precondition.
//! - [`RevisionPolicy::Error`]: attach the last-known revision; the server
//!   rejects the mutation if its stored revision differs, which the client
//!   surfaces as `Error::RevisionConflict`.
//!
//! Resolution is pure and synchronous. The transport collaborator encodes
//! the precondition on the wire and maps a server-reported mismatch back to
//! the conflict error.

use crate::types::Revision;
use serde::{Deserialize, Serialize};

/// Conflict policy for mutations on documents with a known revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RevisionPolicy {
    /// Overwrite regardless of the stored revision.
    Last,
    /// Fail if the stored revision differs from the last-known one.
    Error,
}

impl RevisionPolicy {
    /// Wire value for the `policy` query parameter.
    pub fn as_str(self) -> &'static str {
        match self {
            RevisionPolicy::Last => "last",
            RevisionPolicy::Error => "error",
        }
    }
}

/// Decide the effective policy and precondition for one mutation.
///
/// The operation-level policy overrides the configured default. Under
/// `Error` the precondition is the last-known revision; under `Last` there
/// is none. With no known revision (first write, or a by-id call without
/// tracking state) no precondition is attached regardless of policy.
pub fn resolve(
    operation: Option<RevisionPolicy>,
    configured: RevisionPolicy,
    last_known: Option<&Revision>,
) -> (RevisionPolicy, Option<Revision>) {
    let effective = operation.unwrap_or(configured);
    let precondition = match effective {
        RevisionPolicy::Error => last_known.cloned(),
        RevisionPolicy::Last => None,
    };
    (effective, precondition)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_policy_attaches_revision() {
        let rev = Revision::new("R1");
        let (policy, pre) = resolve(None, RevisionPolicy::Error, Some(&rev));
        assert_eq!(policy, RevisionPolicy::Error);
        assert_eq!(pre, Some(Revision::new("R1")));
    }

    #[test]
    fn test_last_policy_attaches_nothing() {
        let rev = Revision::new("R1");
        let (policy, pre) = resolve(None, RevisionPolicy::Last, Some(&rev));
        assert_eq!(policy, RevisionPolicy::Last);
        assert_eq!(pre, None);
    }

    #[test]
    fn test_operation_policy_overrides_default() {
        let rev = Revision::new("R1");
        let (policy, pre) = resolve(Some(RevisionPolicy::Last), RevisionPolicy::Error, Some(&rev));
        assert_eq!(policy, RevisionPolicy::Last);
        assert_eq!(pre, None);

        let (policy, pre) = resolve(Some(RevisionPolicy::Error), RevisionPolicy::Last, Some(&rev));
        assert_eq!(policy, RevisionPolicy::Error);
        assert_eq!(pre, Some(rev));
    }

    #[test]
    fn test_no_known_revision_means_no_precondition() {
        let (policy, pre) = resolve(None, RevisionPolicy::Error, None);
        assert_eq!(policy, RevisionPolicy::Error);
        assert_eq!(pre, None);
    }

    #[test]
    fn test_wire_values() {
        assert_eq!(RevisionPolicy::Last.as_str(), "last");
        assert_eq!(RevisionPolicy::Error.as_str(), "error");
    }
}
