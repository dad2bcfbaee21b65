use std::fmt;

use crate::access::errors::Denial;

/// The two kinds of access rule. They differ only in how a failure is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    /// Gates discoverability; failing it makes the object appear nonexistent.
    Public,
    /// Gates action on an object the viewer can already see.
    Owner,
}

impl RuleKind {
    pub fn deny(self, resource: &'static str) -> Denial {
        match self {
            RuleKind::Public => Denial::NotVisible { resource },
            RuleKind::Owner => Denial::NotAuthorized { resource },
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleKind::Public => write!(f, "public"),
            RuleKind::Owner => write!(f, "owner"),
        }
    }
}

/// A single access rule: a kind tag, the guarded resource name and a predicate.
pub struct AccessRule<'a> {
    kind: RuleKind,
    resource: &'static str,
    predicate: Box<dyn Fn() -> bool + 'a>,
}

impl<'a> AccessRule<'a> {
    pub fn new(
        kind: RuleKind,
        resource: &'static str,
        predicate: impl Fn() -> bool + 'a,
    ) -> Self {
        Self {
            kind,
            resource,
            predicate: Box::new(predicate),
        }
    }

    pub fn public(resource: &'static str, predicate: impl Fn() -> bool + 'a) -> Self {
        Self::new(RuleKind::Public, resource, predicate)
    }

    pub fn owner(resource: &'static str, predicate: impl Fn() -> bool + 'a) -> Self {
        Self::new(RuleKind::Owner, resource, predicate)
    }

    pub fn kind(&self) -> RuleKind {
        self.kind
    }

    pub fn resource(&self) -> &'static str {
        self.resource
    }

    pub fn check(&self) -> bool {
        (self.predicate)()
    }

    pub fn deny(&self) -> Denial {
        self.kind.deny(self.resource)
    }
}

impl fmt::Debug for AccessRule<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessRule")
            .field("kind", &self.kind)
            .field("resource", &self.resource)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_denial_follows_rule_kind() {
        let public = AccessRule::public("brew", || false);
        let owner = AccessRule::owner("brew", || false);
        assert_eq!(public.deny(), Denial::NotVisible { resource: "brew" });
        assert_eq!(owner.deny(), Denial::NotAuthorized { resource: "brew" });
    }

    #[test]
    fn test_rule_predicate_borrows_state() {
        let owner_id = 7;
        let viewer_id = 7;
        let rule = AccessRule::owner("brewery", || owner_id == viewer_id);
        assert!(rule.check());
        assert_eq!(rule.kind(), RuleKind::Owner);
        assert_eq!(rule.resource(), "brewery");
    }
}
