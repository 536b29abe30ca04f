//! Retry and timeout behaviour of unary calls.

use std::time::Duration;

use gcloud_iam::mock::InMemoryPolicies;
use gcloud_iam::proto::Policy;
use gcloud_iam::RetryPolicy;
use tonic::{Code, Status};

use crate::common::{create, parent, policies, policies_with, policy_name};

fn quick_retry() -> RetryPolicy {
    RetryPolicy::idempotent()
        .with_initial_delay(Duration::from_millis(1))
        .with_max_delay(Duration::from_millis(5))
        .with_max_retries(3)
        .without_jitter()
}

#[tokio::test]
async fn test_reads_retry_unavailable_by_default() {
    let (fake, client) = policies();
    let created = create(&client, "deny-1").await;
    fake.fail_next("GetPolicy", Status::unavailable("backend restarting"))
        .await;

    let fetched = client.get_policy().name(&created.name).send().await.unwrap();
    assert_eq!(fetched, created);
    assert_eq!(fake.call_count("GetPolicy").await, 2);
}

#[tokio::test]
async fn test_retry_gives_up_after_max_retries() {
    let (fake, client) = policies();
    for _ in 0..5 {
        fake.fail_next("GetPolicy", Status::unavailable("down")).await;
    }

    let err = client
        .get_policy()
        .name(policy_name("deny-1"))
        .retry(quick_retry())
        .send()
        .await
        .unwrap_err();
    assert_eq!(err.code(), Some(Code::Unavailable));
    assert_eq!(fake.call_count("GetPolicy").await, 4);
}

#[tokio::test]
async fn test_mutations_are_not_retried_by_default() {
    let (fake, client) = policies();
    fake.fail_next("CreatePolicy", Status::unavailable("down"))
        .await;

    let err = client
        .create_policy()
        .parent(parent())
        .policy_id("deny-1")
        .send()
        .await
        .unwrap_err();
    assert_eq!(err.code(), Some(Code::Unavailable));
    assert_eq!(fake.call_count("CreatePolicy").await, 1);
}

#[tokio::test]
async fn test_conflict_never_retried_even_when_listed() {
    let (fake, client) = policies();
    let created = create(&client, "deny-1").await;
    client
        .update_policy()
        .policy(created.clone())
        .send()
        .await
        .unwrap();

    let err = client
        .update_policy()
        .policy(Policy {
            display_name: "stale".to_string(),
            ..created
        })
        .retry(quick_retry().with_retryable_codes([Code::Aborted, Code::Unavailable]))
        .send()
        .await
        .unwrap_err();
    assert!(err.is_conflict());
    assert_eq!(fake.call_count("UpdatePolicy").await, 2);
}

#[tokio::test]
async fn test_non_retryable_code_fails_fast() {
    let (fake, client) = policies();
    fake.fail_next("GetPolicy", Status::permission_denied("denied"))
        .await;

    let err = client
        .get_policy()
        .name(policy_name("deny-1"))
        .retry(quick_retry())
        .send()
        .await
        .unwrap_err();
    assert_eq!(err.code(), Some(Code::PermissionDenied));
    assert_eq!(fake.call_count("GetPolicy").await, 1);
}

#[tokio::test]
async fn test_per_attempt_timeout_is_deadline_exceeded() {
    let (fake, client) =
        policies_with(InMemoryPolicies::new().with_latency(Duration::from_millis(500)));

    let err = client
        .get_policy()
        .name(policy_name("deny-1"))
        .timeout(Duration::from_millis(20))
        .no_retry()
        .send()
        .await
        .unwrap_err();
    assert_eq!(err.code(), Some(Code::DeadlineExceeded));
    assert_eq!(fake.call_count("GetPolicy").await, 1);
}

#[tokio::test]
async fn test_timed_out_attempts_are_retried() {
    let (fake, client) =
        policies_with(InMemoryPolicies::new().with_latency(Duration::from_millis(200)));

    let err = client
        .get_policy()
        .name(policy_name("deny-1"))
        .timeout(Duration::from_millis(10))
        .retry(quick_retry().with_max_retries(2))
        .send()
        .await
        .unwrap_err();
    assert_eq!(err.code(), Some(Code::DeadlineExceeded));
    assert_eq!(fake.call_count("GetPolicy").await, 3);
}
