//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use gcloud_iam::mock::{InMemoryCredentials, InMemoryPolicies};
use gcloud_iam::proto::{DenyRule, Policy, PolicyRule};
use gcloud_iam::{resource, IamCredentialsClient, PoliciesClient, PolicyRuleExt, PollingPolicy};

pub const ATTACHMENT_POINT: &str = "example.com%2Fprojects%2Fp1";
pub const SERVICE_ACCOUNT: &str = "sa@p1.iam.gserviceaccount.com";

pub fn parent() -> String {
    resource::policy_parent(ATTACHMENT_POINT)
}

pub fn policy_name(policy_id: &str) -> String {
    resource::policy_path(ATTACHMENT_POINT, policy_id)
}

pub fn fast_polling() -> PollingPolicy {
    PollingPolicy::default()
        .with_initial_delay(Duration::from_millis(5))
        .with_max_delay(Duration::from_millis(20))
        .with_timeout(Duration::from_secs(5))
}

pub fn policies() -> (InMemoryPolicies, PoliciesClient) {
    policies_with(InMemoryPolicies::new())
}

pub fn policies_with(fake: InMemoryPolicies) -> (InMemoryPolicies, PoliciesClient) {
    let client = PoliciesClient::from_transport(Arc::new(fake.clone())).with_polling(fast_polling());
    (fake, client)
}

pub fn credentials() -> (InMemoryCredentials, IamCredentialsClient) {
    let fake = InMemoryCredentials::new();
    let client = IamCredentialsClient::from_transport(Arc::new(fake.clone()));
    (fake, client)
}

pub fn deny_policy(display_name: &str) -> Policy {
    Policy {
        display_name: display_name.to_string(),
        rules: vec![PolicyRule::deny(
            "block project deletion",
            DenyRule {
                denied_principals: vec!["principalSet://goog/public:all".to_string()],
                denied_permissions: vec![
                    "cloudresourcemanager.googleapis.com/projects.delete".to_string(),
                ],
                ..Default::default()
            },
        )],
        ..Default::default()
    }
}

/// Create `policy_id` under [`parent`] and wait for it.
pub async fn create(client: &PoliciesClient, policy_id: &str) -> Policy {
    client
        .create_policy()
        .parent(parent())
        .policy_id(policy_id)
        .policy(deny_policy(policy_id))
        .send()
        .await
        .expect("create_policy")
        .wait_default()
        .await
        .expect("create operation")
}
