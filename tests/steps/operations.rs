//! Long-running operation steps.

use cucumber::{given, then, when};
use gcloud_iam::mock::InMemoryPolicies;
use gcloud_iam::{ClientError, ErrorCategory, OperationState};
use tonic::{Code, Status};

use super::IamWorld;

fn parse_code(code: &str) -> Code {
    match code {
        "PERMISSION_DENIED" => Code::PermissionDenied,
        "FAILED_PRECONDITION" => Code::FailedPrecondition,
        "INVALID_ARGUMENT" => Code::InvalidArgument,
        "RESOURCE_EXHAUSTED" => Code::ResourceExhausted,
        "UNAVAILABLE" => Code::Unavailable,
        other => panic!("unsupported status code in scenario: {}", other),
    }
}

#[given(expr = "an in-memory Policies service whose operations complete after {int} polls")]
async fn given_pending_service(world: &mut IamWorld, polls: u32) {
    world.use_service(InMemoryPolicies::new().with_pending_operations(polls));
}

#[given(expr = "the next operation fails with {word}")]
async fn given_operation_fails(world: &mut IamWorld, code: String) {
    world
        .fake
        .fail_next_operation(Status::new(parse_code(&code), "rejected by scenario"))
        .await;
}

#[when(expr = "I start creating policy {string}")]
async fn when_start_create(world: &mut IamWorld, policy_id: String) {
    let started = world
        .client
        .create_policy()
        .parent(world.parent.clone())
        .policy_id(policy_id)
        .send()
        .await;
    world.operation = world.record(started);
}

#[when("I wait for the operation")]
async fn when_wait(world: &mut IamWorld) {
    let operation = world.operation.clone().expect("no operation started");
    world.outcome = Some(operation.wait_default().await);
}

#[when("I wait for the operation again")]
async fn when_wait_again(world: &mut IamWorld) {
    let operation = world.operation.clone().expect("no operation started");
    let again = operation.wait_default().await;
    let first = world.outcome.take().expect("no earlier wait");
    match (&first, &again) {
        (Ok(a), Ok(b)) => assert_eq!(a, b),
        (Err(a), Err(b)) => assert_eq!(a.to_string(), b.to_string()),
        _ => panic!("outcome changed between waits: {:?} then {:?}", first, again),
    }
    world.outcome = Some(again);
}

#[then("the operation is pending")]
async fn then_pending(world: &mut IamWorld) {
    let operation = world.operation.as_ref().expect("no operation started");
    assert_eq!(operation.state(), OperationState::Pending);
    assert!(operation.result().is_none());
}

#[then(expr = "the wait fails with an operation error {word}")]
async fn then_operation_error(world: &mut IamWorld, code: String) {
    match world.outcome.as_ref().expect("no outcome") {
        Err(ClientError::Operation(e)) => assert_eq!(e.code, parse_code(&code)),
        other => panic!("expected operation error, got {:?}", other),
    }
    let operation = world.operation.as_ref().expect("no operation started");
    assert_eq!(operation.state(), OperationState::DoneError);
    if let Some(Err(err)) = &world.outcome {
        assert_eq!(err.category(), ErrorCategory::Operation);
    }
}

#[then(expr = "the service saw {int} {word} calls")]
async fn then_call_count(world: &mut IamWorld, count: usize, method: String) {
    assert_eq!(world.fake.call_count(&method).await, count);
}

#[then("the service saw no calls")]
async fn then_no_calls(world: &mut IamWorld) {
    assert!(world.fake.calls().await.is_empty());
}
