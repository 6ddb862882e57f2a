//! Access checks run before an action is invoked.
//!
//! Controllers declare an [`AccessRequirement`] per action; an
//! [`AccessPolicy`] decides whether the current request satisfies it.
//! A missing identity is reported as unauthenticated, a present identity
//! lacking the required role as forbidden.

use crate::dispatch::context::RequestContext;

/// What an action demands of the caller.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AccessRequirement {
    #[default]
    Public,
    Authenticated,
    Role(String),
}

/// Outcome of an access check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Granted,
    Unauthenticated,
    Forbidden,
}

/// Security collaborator consulted by the dispatcher.
pub trait AccessPolicy: Send + Sync {
    fn check(&self, requirement: &AccessRequirement, ctx: &RequestContext) -> AccessDecision;
}

/// Grants access based on the identity attached to the request.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityPolicy;

impl AccessPolicy for IdentityPolicy {
    fn check(&self, requirement: &AccessRequirement, ctx: &RequestContext) -> AccessDecision {
        match (requirement, ctx.identity()) {
            (AccessRequirement::Public, _) => AccessDecision::Granted,
            (_, None) => AccessDecision::Unauthenticated,
            (AccessRequirement::Authenticated, Some(_)) => AccessDecision::Granted,
            (AccessRequirement::Role(role), Some(identity)) => {
                if identity.has_role(role) {
                    AccessDecision::Granted
                } else {
                    AccessDecision::Forbidden
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::context::{Identity, RequestInfo};
    use crate::routing::RouteData;

    fn ctx(identity: Option<Identity>) -> RequestContext {
        let mut info = RequestInfo::new();
        info.identity = identity;
        RequestContext::new(&RouteData::new(), &info)
    }

    #[test]
    fn test_identity_policy() {
        let policy = IdentityPolicy;
        let admin = Some(Identity::new("ada").with_role("admin"));
        let user = Some(Identity::new("bob"));
        let role = AccessRequirement::Role("admin".into());

        assert_eq!(policy.check(&AccessRequirement::Public, &ctx(None)), AccessDecision::Granted);
        let authenticated = AccessRequirement::Authenticated;
        assert_eq!(policy.check(&authenticated, &ctx(None)), AccessDecision::Unauthenticated);
        assert_eq!(policy.check(&authenticated, &ctx(user.clone())), AccessDecision::Granted);
        assert_eq!(policy.check(&role, &ctx(None)), AccessDecision::Unauthenticated);
        assert_eq!(policy.check(&role, &ctx(user)), AccessDecision::Forbidden);
        assert_eq!(policy.check(&role, &ctx(admin)), AccessDecision::Granted);
    }
}
