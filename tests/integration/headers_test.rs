//! Per-call metadata: routing header, client identification, credentials.

use std::sync::Arc;
use std::time::Duration;

use gcloud_iam::client::API_CLIENT_HEADER;
use gcloud_iam::mock::InMemoryPolicies;
use gcloud_iam::proto::Policy;
use gcloud_iam::routing::ROUTING_HEADER;
use gcloud_iam::{resource, ClientConfig, ClientError, PoliciesClient, StaticToken};

use crate::common::{create, credentials, parent, policies, policy_name, SERVICE_ACCOUNT};

#[tokio::test]
async fn test_get_policy_routing_header() {
    let (fake, client) = policies();
    let _ = client.get_policy().name(policy_name("deny-1")).send().await;

    let call = fake.last_call("GetPolicy").await.unwrap();
    assert_eq!(
        call.header(ROUTING_HEADER),
        Some("name=policies/example.com%252Fprojects%252Fp1/denypolicies/deny-1")
    );
    assert_eq!(call.header("x-goog-api-client"), Some(API_CLIENT_HEADER));
    assert!(call.header("authorization").is_none());
}

#[tokio::test]
async fn test_routing_keys_per_method() {
    let (fake, client) = policies();
    let created = create(&client, "deny-1").await;

    let create_call = fake.last_call("CreatePolicy").await.unwrap();
    assert_eq!(
        create_call.header(ROUTING_HEADER),
        Some("parent=policies/example.com%252Fprojects%252Fp1/denypolicies")
    );

    client
        .update_policy()
        .policy(Policy {
            display_name: "v2".to_string(),
            ..created
        })
        .send()
        .await
        .unwrap();
    let update_call = fake.last_call("UpdatePolicy").await.unwrap();
    assert!(update_call
        .header(ROUTING_HEADER)
        .unwrap()
        .starts_with("policy.name=policies/"));

    client
        .list_applicable_policies()
        .attachment_point("example.com%2Fprojects%2Fp1")
        .send()
        .await
        .unwrap();
    let applicable_call = fake.last_call("ListApplicablePolicies").await.unwrap();
    assert_eq!(
        applicable_call.header(ROUTING_HEADER),
        Some("attachment_point=example.com%252Fprojects%252Fp1")
    );

    let list_call = {
        client.list_policies().parent(parent()).send().await.unwrap();
        fake.last_call("ListPolicies").await.unwrap()
    };
    assert!(list_call.header(ROUTING_HEADER).unwrap().starts_with("parent="));
}

#[tokio::test]
async fn test_config_supplies_token_and_quota_project() {
    let fake = InMemoryPolicies::new();
    let config = ClientConfig {
        access_token: Some("ya29.test".to_string()),
        quota_project_id: Some("billing-project".to_string()),
        ..Default::default()
    };
    let client = PoliciesClient::from_transport(Arc::new(fake.clone()))
        .with_config(&config)
        .unwrap();

    let _ = client.get_policy().name(policy_name("deny-1")).send().await;
    let call = fake.last_call("GetPolicy").await.unwrap();
    assert_eq!(call.header("authorization"), Some("Bearer ya29.test"));
    assert_eq!(call.header("x-goog-user-project"), Some("billing-project"));
    assert!(call.header("x-goog-api-key").is_none());
}

#[tokio::test]
async fn test_api_key_header() {
    let fake = InMemoryPolicies::new();
    let config = ClientConfig {
        api_key: Some("AIza-test".to_string()),
        ..Default::default()
    };
    let client = PoliciesClient::from_transport(Arc::new(fake.clone()))
        .with_config(&config)
        .unwrap();

    let _ = client.get_policy().name(policy_name("deny-1")).send().await;
    let call = fake.last_call("GetPolicy").await.unwrap();
    assert_eq!(call.header("x-goog-api-key"), Some("AIza-test"));
    assert!(call.header("authorization").is_none());
}

#[tokio::test]
async fn test_credentials_provider_and_call_metadata() {
    let fake = InMemoryPolicies::new();
    let client = PoliciesClient::from_transport(Arc::new(fake.clone()))
        .with_credentials(Arc::new(StaticToken::new("ya29.provider")));

    let _ = client
        .get_policy()
        .name(policy_name("deny-1"))
        .metadata("x-request-reason", "audit")
        .timeout(Duration::from_secs(5))
        .send()
        .await;
    let call = fake.last_call("GetPolicy").await.unwrap();
    assert_eq!(call.header("authorization"), Some("Bearer ya29.provider"));
    assert_eq!(call.header("x-request-reason"), Some("audit"));
    assert!(call.header("grpc-timeout").is_some());
}

#[tokio::test]
async fn test_invalid_metadata_key_rejected_before_call() {
    let (fake, client) = policies();
    let err = client
        .get_policy()
        .name(policy_name("deny-1"))
        .metadata("not a header", "x")
        .send()
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::InvalidArgument(_)));
    assert_eq!(fake.call_count("GetPolicy").await, 0);
}

#[tokio::test]
async fn test_credentials_routing_header() {
    let (fake, client) = credentials();
    client
        .sign_blob()
        .name(resource::service_account_path(SERVICE_ACCOUNT))
        .payload(b"blob".to_vec())
        .send()
        .await
        .unwrap();
    let call = fake.last_call("SignBlob").await.unwrap();
    assert_eq!(
        call.header(ROUTING_HEADER),
        Some("name=projects/-/serviceAccounts/sa%40p1.iam.gserviceaccount.com")
    );
}
