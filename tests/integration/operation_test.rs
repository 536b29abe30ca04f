//! Long-running operations returned by the policy mutations.

use std::time::Duration;

use gcloud_iam::mock::InMemoryPolicies;
use gcloud_iam::{ClientError, ErrorCategory, OperationState, PolicyExt};
use tonic::{Code, Status};

use crate::common::{deny_policy, parent, policies_with, policy_name};

#[tokio::test]
async fn test_pending_operation_polls_until_done() {
    let (fake, client) = policies_with(InMemoryPolicies::new().with_pending_operations(3));

    let operation = client
        .create_policy()
        .parent(parent())
        .policy_id("deny-1")
        .policy(deny_policy("deny-1"))
        .send()
        .await
        .unwrap();
    assert_eq!(operation.state(), OperationState::Pending);
    assert!(operation.result().is_none());
    let metadata = operation.metadata().unwrap().unwrap();
    assert!(metadata.create_time.is_some());

    let policy = operation.wait_default().await.unwrap();
    assert_eq!(policy.name, policy_name("deny-1"));
    assert_eq!(operation.state(), OperationState::DoneResult);
    assert_eq!(fake.call_count("GetOperation").await, 3);
}

#[tokio::test]
async fn test_second_wait_reuses_cached_result() {
    let (fake, client) = policies_with(InMemoryPolicies::new().with_pending_operations(2));
    let operation = client
        .create_policy()
        .parent(parent())
        .policy_id("deny-1")
        .send()
        .await
        .unwrap();

    let first = operation.wait_default().await.unwrap();
    let polls = fake.call_count("GetOperation").await;
    let second = operation.wait_default().await.unwrap();

    assert_eq!(first, second);
    assert_eq!(fake.call_count("GetOperation").await, polls);
}

#[tokio::test]
async fn test_operation_error_is_distinct_from_rpc_error() {
    let (fake, client) = policies_with(InMemoryPolicies::new());
    fake.fail_next_operation(Status::permission_denied("caller lacks iam.denypolicies.create"))
        .await;

    let operation = client
        .create_policy()
        .parent(parent())
        .policy_id("deny-1")
        .send()
        .await
        .unwrap();
    assert_eq!(operation.state(), OperationState::DoneError);

    let err = operation.wait_default().await.unwrap_err();
    match &err {
        ClientError::Operation(op) => {
            assert_eq!(op.code, Code::PermissionDenied);
            assert!(op.message.contains("iam.denypolicies.create"));
        }
        other => panic!("expected operation error, got {:?}", other),
    }
    assert_eq!(err.category(), ErrorCategory::Operation);
}

#[tokio::test]
async fn test_wait_timeout_leaves_operation_running() {
    let (fake, client) = policies_with(InMemoryPolicies::new().with_pending_operations(1000));
    let operation = client
        .create_policy()
        .parent(parent())
        .policy_id("deny-1")
        .send()
        .await
        .unwrap();

    let err = operation.wait(Duration::from_millis(50)).await.unwrap_err();
    assert!(err.is_wait_timeout());
    assert_eq!(operation.state(), OperationState::Pending);
    assert!(fake.call_count("GetOperation").await >= 1);

    // The policy itself was created; only the operation is still pending.
    assert!(fake.stored_policy(&policy_name("deny-1")).await.is_some());
}

#[tokio::test]
async fn test_polling_error_is_rpc_error() {
    let (fake, client) = policies_with(InMemoryPolicies::new().with_pending_operations(2));
    let operation = client
        .create_policy()
        .parent(parent())
        .policy_id("deny-1")
        .send()
        .await
        .unwrap();

    fake.fail_next("GetOperation", Status::permission_denied("no operations.get"))
        .await;
    let err = operation.poll().await.unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Rpc);
    assert_eq!(operation.state(), OperationState::Pending);

    assert!(!operation.poll().await.unwrap());
    assert!(operation.poll().await.unwrap());
}

#[tokio::test]
async fn test_concurrent_waiters_share_polls() {
    let (fake, client) = policies_with(InMemoryPolicies::new().with_pending_operations(2));
    let operation = client
        .create_policy()
        .parent(parent())
        .policy_id("deny-1")
        .send()
        .await
        .unwrap();

    let waiters: Vec<_> = (0..4)
        .map(|_| {
            let operation = operation.clone();
            tokio::spawn(async move { operation.wait_default().await })
        })
        .collect();
    for waiter in waiters {
        let policy = waiter.await.unwrap().unwrap();
        assert_eq!(policy.policy_id().as_deref(), Some("deny-1"));
    }
    assert!(fake.call_count("GetOperation").await <= 2 * 4);
    assert!(operation.is_done());
}

#[tokio::test]
async fn test_resume_operation_by_name() {
    let (_fake, client) = policies_with(InMemoryPolicies::new().with_pending_operations(2));
    let started = client
        .delete_policy()
        .name(policy_name("deny-1"))
        .send()
        .await;
    assert!(started.unwrap_err().is_not_found());

    let operation = client
        .create_policy()
        .parent(parent())
        .policy_id("deny-1")
        .send()
        .await
        .unwrap();

    let resumed = client.resume_operation(operation.name());
    assert!(!resumed.is_done());
    let policy = resumed.wait_default().await.unwrap();
    assert_eq!(policy.name, policy_name("deny-1"));

    let raw = client.get_operation(operation.name()).await.unwrap();
    assert!(raw.done);
}
