//! Step definitions shared by the policy feature files.

pub mod lifecycle;
pub mod operations;
pub mod pagination;

use std::sync::Arc;
use std::time::Duration;

use cucumber::World;
use gcloud_iam::mock::InMemoryPolicies;
use gcloud_iam::proto::Policy;
use gcloud_iam::{ClientError, PoliciesClient, PolicyOperation, PollingPolicy};

pub const PROJECT_PARENT: &str = "policies/example.com%2Fprojects%2Fp1/denypolicies";

/// Test context for policy scenarios.
#[derive(Debug, World)]
#[world(init = Self::new)]
pub struct IamWorld {
    fake: InMemoryPolicies,
    client: PoliciesClient,
    parent: String,
    created: Vec<String>,
    original_etag: Option<String>,
    fetched: Option<Policy>,
    operation: Option<PolicyOperation>,
    outcome: Option<Result<Policy, ClientError>>,
    listed: Vec<Policy>,
    last_error: Option<ClientError>,
}

impl IamWorld {
    fn new() -> Self {
        let fake = InMemoryPolicies::new();
        Self {
            client: Self::client_for(&fake),
            fake,
            parent: PROJECT_PARENT.to_string(),
            created: Vec::new(),
            original_etag: None,
            fetched: None,
            operation: None,
            outcome: None,
            listed: Vec::new(),
            last_error: None,
        }
    }

    fn client_for(fake: &InMemoryPolicies) -> PoliciesClient {
        PoliciesClient::from_transport(Arc::new(fake.clone())).with_polling(
            PollingPolicy::default()
                .with_initial_delay(Duration::from_millis(5))
                .with_max_delay(Duration::from_millis(20))
                .with_timeout(Duration::from_secs(5)),
        )
    }

    fn use_service(&mut self, fake: InMemoryPolicies) {
        self.client = Self::client_for(&fake);
        self.fake = fake;
    }

    fn name_of(&self, policy_id: &str) -> String {
        format!("{}/{}", self.parent, policy_id)
    }

    fn record<T>(&mut self, result: Result<T, ClientError>) -> Option<T> {
        match result {
            Ok(value) => {
                self.last_error = None;
                Some(value)
            }
            Err(e) => {
                self.last_error = Some(e);
                None
            }
        }
    }

    fn expect_error(&self) -> &ClientError {
        self.last_error
            .as_ref()
            .expect("expected the last call to fail")
    }
}
