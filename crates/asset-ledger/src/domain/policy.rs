//! # Identity Gate
//!
//! Attribute-based access policies evaluated before any mutation.
//!
//! ## Evaluation Order
//!
//! 1. An unresolved principal is denied outright.
//! 2. Policies are walked in order. The first applicable `Deny` whose
//!    condition holds wins.
//! 3. Otherwise the call is allowed if any applicable `Allow` holds.
//! 4. Otherwise the call is denied (fail-closed). The reason names the first
//!    missing attribute when an `Allow` could not be evaluated for lack of one.
//!
//! Evaluation is a pure function of (identity, operation, target record).

use super::entities::Asset;
use super::errors::ConfigError;
use super::identity::{IdentityContext, Operation};
use serde::{Deserialize, Serialize};

/// Effect of a matching policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Effect {
    Allow,
    Deny,
}

/// Predicate over the caller's identity and the target record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    /// Always holds.
    Always,
    /// The attribute is present with any value.
    HasAttribute { name: String },
    /// The attribute is present and equal to `value`.
    AttributeEquals { name: String, value: String },
    /// The caller's organization is one of the listed ones.
    OrganizationIn { organizations: Vec<String> },
    /// The caller owns the target record.
    IsRecordOwner,
    /// At least one nested condition holds.
    AnyOf(Vec<Condition>),
    /// Every nested condition holds.
    AllOf(Vec<Condition>),
}

/// Outcome of evaluating a single condition.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Evaluation {
    Satisfied,
    Unsatisfied,
    MissingAttribute(String),
}

impl Condition {
    pub fn attribute_equals(name: impl Into<String>, value: impl Into<String>) -> Self {
        Condition::AttributeEquals {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn has_attribute(name: impl Into<String>) -> Self {
        Condition::HasAttribute { name: name.into() }
    }

    pub fn organization_in<I, S>(organizations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Condition::OrganizationIn {
            organizations: organizations.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether evaluating this condition needs the target record.
    pub fn references_record(&self) -> bool {
        match self {
            Condition::IsRecordOwner => true,
            Condition::AnyOf(nested) | Condition::AllOf(nested) => {
                nested.iter().any(Condition::references_record)
            }
            _ => false,
        }
    }

    fn evaluate(&self, identity: &IdentityContext, record: Option<&Asset>) -> Evaluation {
        match self {
            Condition::Always => Evaluation::Satisfied,
            Condition::HasAttribute { name } => match identity.attribute(name) {
                Some(_) => Evaluation::Satisfied,
                None => Evaluation::MissingAttribute(name.clone()),
            },
            Condition::AttributeEquals { name, value } => match identity.attribute(name) {
                Some(actual) if actual == value => Evaluation::Satisfied,
                Some(_) => Evaluation::Unsatisfied,
                None => Evaluation::MissingAttribute(name.clone()),
            },
            Condition::OrganizationIn { organizations } => {
                if organizations.iter().any(|o| *o == identity.organization_id) {
                    Evaluation::Satisfied
                } else {
                    Evaluation::Unsatisfied
                }
            }
            Condition::IsRecordOwner => match record {
                Some(asset) if asset.owner == identity.principal_id => Evaluation::Satisfied,
                _ => Evaluation::Unsatisfied,
            },
            Condition::AnyOf(nested) => {
                let mut missing = None;
                for condition in nested {
                    match condition.evaluate(identity, record) {
                        Evaluation::Satisfied => return Evaluation::Satisfied,
                        Evaluation::MissingAttribute(name) => {
                            missing.get_or_insert(name);
                        }
                        Evaluation::Unsatisfied => {}
                    }
                }
                missing.map_or(Evaluation::Unsatisfied, Evaluation::MissingAttribute)
            }
            Condition::AllOf(nested) => {
                let mut missing = None;
                for condition in nested {
                    match condition.evaluate(identity, record) {
                        Evaluation::Unsatisfied => return Evaluation::Unsatisfied,
                        Evaluation::MissingAttribute(name) => {
                            missing.get_or_insert(name);
                        }
                        Evaluation::Satisfied => {}
                    }
                }
                missing.map_or(Evaluation::Satisfied, Evaluation::MissingAttribute)
            }
        }
    }
}

/// A named access rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessPolicy {
    pub name: String,
    pub effect: Effect,
    /// Operations this policy applies to. Empty means every mutating operation.
    #[serde(default)]
    pub operations: Vec<Operation>,
    pub condition: Condition,
}

impl AccessPolicy {
    pub fn allow(name: impl Into<String>, condition: Condition) -> Self {
        Self {
            name: name.into(),
            effect: Effect::Allow,
            operations: Vec::new(),
            condition,
        }
    }

    pub fn deny(name: impl Into<String>, condition: Condition) -> Self {
        Self {
            name: name.into(),
            effect: Effect::Deny,
            operations: Vec::new(),
            condition,
        }
    }

    /// Restrict the policy to the given operations.
    pub fn for_operations(mut self, operations: impl IntoIterator<Item = Operation>) -> Self {
        self.operations = operations.into_iter().collect();
        self
    }

    pub fn applies_to(&self, operation: Operation) -> bool {
        if self.operations.is_empty() {
            operation.is_mutating()
        } else {
            self.operations.contains(&operation)
        }
    }
}

/// Result of an authorization check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Granted by the named policy.
    Allowed { policy: String },
    /// Refused, with a human-readable reason.
    Denied { reason: String },
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allowed { .. })
    }
}

/// Ordered list of access policies. Process-wide and stateless.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicySet {
    policies: Vec<AccessPolicy>,
}

impl Default for PolicySet {
    /// Administrators, or the record's owner, may mutate.
    fn default() -> Self {
        Self::new(vec![AccessPolicy::allow(
            "admin-or-owner",
            Condition::AnyOf(vec![
                Condition::attribute_equals("role", "admin"),
                Condition::IsRecordOwner,
            ]),
        )])
    }
}

impl PolicySet {
    pub fn new(policies: Vec<AccessPolicy>) -> Self {
        Self { policies }
    }

    /// Grants every mutation to any resolved principal.
    pub fn allow_all() -> Self {
        Self::new(vec![AccessPolicy::allow("allow-all", Condition::Always)])
    }

    pub fn policies(&self) -> &[AccessPolicy] {
        &self.policies
    }

    /// Whether any policy for `operation` inspects the target record.
    pub fn requires_record(&self, operation: Operation) -> bool {
        self.policies
            .iter()
            .filter(|p| p.applies_to(operation))
            .any(|p| p.condition.references_record())
    }

    /// Check structural constraints on the policy list.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for policy in &self.policies {
            if policy.name.trim().is_empty() {
                return Err(ConfigError::Invalid("policy name must not be empty".into()));
            }
            if let Some(op) = policy.operations.iter().find(|op| !op.is_mutating()) {
                return Err(ConfigError::Invalid(format!(
                    "policy '{}' targets non-mutating operation {}",
                    policy.name, op
                )));
            }
        }
        Ok(())
    }

    /// Evaluate the policies for one call.
    pub fn authorize(
        &self,
        identity: &IdentityContext,
        operation: Operation,
        record: Option<&Asset>,
    ) -> Decision {
        if !identity.is_resolved() {
            return Decision::Denied {
                reason: "unresolved principal".to_string(),
            };
        }

        let mut granted_by: Option<&str> = None;
        let mut missing: Option<String> = None;

        for policy in self.policies.iter().filter(|p| p.applies_to(operation)) {
            let evaluation = policy.condition.evaluate(identity, record);
            match (policy.effect, evaluation) {
                (Effect::Deny, Evaluation::Satisfied) => {
                    return Decision::Denied {
                        reason: format!("denied by policy '{}'", policy.name),
                    };
                }
                (Effect::Allow, Evaluation::Satisfied) => {
                    granted_by.get_or_insert(&policy.name);
                }
                (Effect::Allow, Evaluation::MissingAttribute(name)) => {
                    missing.get_or_insert(name);
                }
                _ => {}
            }
        }

        match (granted_by, missing) {
            (Some(policy), _) => Decision::Allowed {
                policy: policy.to_string(),
            },
            (None, Some(name)) => Decision::Denied {
                reason: format!("missing attribute '{}'", name),
            },
            (None, None) => Decision::Denied {
                reason: format!("no policy grants {}", operation),
            },
        }
    }
}
