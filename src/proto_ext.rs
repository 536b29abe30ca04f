//! Extension traits for the policy message types.
//!
//! Accessors for the fields callers reach for most, without walking
//! `Option` and `oneof` chains by hand.

use chrono::{DateTime, Utc};

use crate::convert::timestamp_to_datetime;
use crate::proto::{policy_rule, DenyRule, Policy, PolicyRule, DENY_POLICY_KIND};
use crate::resource::{parse_policy_path, PolicyName};

/// Extension trait for [`Policy`].
pub trait PolicyExt {
    fn policy(&self) -> &Policy;

    /// Parsed resource name, if the name is well formed.
    fn policy_name(&self) -> Option<PolicyName> {
        parse_policy_path(&self.policy().name).ok()
    }

    /// The trailing `{policy_id}` segment of the name.
    fn policy_id(&self) -> Option<String> {
        self.policy_name().map(|n| n.policy_id)
    }

    /// The URL-encoded attachment point segment of the name.
    fn attachment_point(&self) -> Option<String> {
        self.policy_name().map(|n| n.attachment_point)
    }

    /// True once the service has set `delete_time`.
    fn is_deleted(&self) -> bool {
        self.policy().delete_time.is_some()
    }

    fn is_deny_policy(&self) -> bool {
        let kind = &self.policy().kind;
        kind.is_empty() || kind == DENY_POLICY_KIND
    }

    /// All deny rules, skipping rules of other kinds.
    fn deny_rules(&self) -> Vec<&DenyRule> {
        self.policy()
            .rules
            .iter()
            .filter_map(|rule| rule.deny_rule())
            .collect()
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.policy()
            .create_time
            .as_ref()
            .and_then(|ts| timestamp_to_datetime(ts).ok())
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.policy()
            .update_time
            .as_ref()
            .and_then(|ts| timestamp_to_datetime(ts).ok())
    }
}

impl PolicyExt for Policy {
    fn policy(&self) -> &Policy {
        self
    }
}

/// Extension trait for [`PolicyRule`].
pub trait PolicyRuleExt {
    fn deny_rule(&self) -> Option<&DenyRule>;

    /// Wrap a deny rule with a description.
    fn deny(description: impl Into<String>, rule: DenyRule) -> Self;
}

impl PolicyRuleExt for PolicyRule {
    fn deny_rule(&self) -> Option<&DenyRule> {
        match &self.kind {
            Some(policy_rule::Kind::DenyRule(rule)) => Some(rule),
            None => None,
        }
    }

    fn deny(description: impl Into<String>, rule: DenyRule) -> Self {
        PolicyRule {
            description: description.into(),
            kind: Some(policy_rule::Kind::DenyRule(rule)),
        }
    }
}
