use tracing::debug;

use crate::access::errors::Denial;
use crate::access::rule::AccessRule;

/// Ordered composition of at most two access rules.
///
/// The primary rule is always present. The secondary rule joins the list only
/// when the caller marks the request as elevated (typically a mutation).
#[derive(Debug)]
pub struct AccessManager<'a> {
    rules: Vec<AccessRule<'a>>,
}

impl<'a> AccessManager<'a> {
    pub fn new(primary: AccessRule<'a>, secondary: Option<AccessRule<'a>>, elevated: bool) -> Self {
        let mut rules = Vec::with_capacity(2);
        rules.push(primary);
        if elevated {
            if let Some(rule) = secondary {
                rules.push(rule);
            }
        }
        Self { rules }
    }

    pub fn rules(&self) -> &[AccessRule<'a>] {
        &self.rules
    }

    /// The first satisfied rule grants access. When none is satisfied the
    /// denial of the first rule in the list is reported, never a later one.
    pub fn check(&self) -> Result<(), Denial> {
        if self.rules.iter().any(|rule| rule.check()) {
            return Ok(());
        }
        let denial = self.rules[0].deny();
        debug!(
            kind = %self.rules[0].kind(),
            resource = self.rules[0].resource(),
            "access denied"
        );
        Err(denial)
    }

    /// Every rule must hold; the first failing rule reports its own denial.
    pub fn check_all(&self) -> Result<(), Denial> {
        for rule in &self.rules {
            if !rule.check() {
                debug!(kind = %rule.kind(), resource = rule.resource(), "access denied");
                return Err(rule.deny());
            }
        }
        Ok(())
    }
}
