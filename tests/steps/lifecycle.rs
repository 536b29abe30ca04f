//! Create, read, list, update and delete steps.

use cucumber::{given, then, when};
use gcloud_iam::proto::{DenyRule, Policy, PolicyRule};
use gcloud_iam::{ErrorCategory, PolicyExt, PolicyRuleExt};

use super::IamWorld;

fn deny_policy(display_name: &str) -> Policy {
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

// --- Given steps ---

#[given("an in-memory Policies service")]
async fn given_service(world: &mut IamWorld) {
    world.use_service(gcloud_iam::mock::InMemoryPolicies::new());
}

#[given(expr = "a deny policy {string} exists")]
async fn given_policy_exists(world: &mut IamWorld, policy_id: String) {
    let policy = world
        .client
        .create_policy()
        .parent(world.parent.clone())
        .policy_id(&policy_id)
        .policy(deny_policy(&policy_id))
        .send()
        .await
        .expect("create_policy")
        .wait_default()
        .await
        .expect("create operation");
    world.original_etag = Some(policy.etag.clone());
    world.created.push(policy_id);
}

// --- When steps ---

#[when(expr = "I create policy {string} under {string}")]
async fn when_create(world: &mut IamWorld, policy_id: String, parent: String) {
    world.parent = parent;
    let started = world
        .client
        .create_policy()
        .parent(world.parent.clone())
        .policy_id(&policy_id)
        .policy(deny_policy(&policy_id))
        .send()
        .await;
    if let Some(operation) = world.record(started) {
        let outcome = operation.wait_default().await;
        if let Ok(policy) = &outcome {
            world.original_etag = Some(policy.etag.clone());
            world.created.push(policy_id);
        }
        world.operation = Some(operation);
        world.outcome = Some(outcome);
    }
}

#[when(expr = "I get policy {string}")]
async fn when_get(world: &mut IamWorld, policy_id: String) {
    let name = world.name_of(&policy_id);
    let fetched = world.client.get_policy().name(name).send().await;
    world.fetched = world.record(fetched);
}

#[when(expr = "I update policy {string} with the fetched etag")]
async fn when_update_fetched(world: &mut IamWorld, policy_id: String) {
    let fetched = world.fetched.clone().expect("no policy fetched yet");
    assert_eq!(fetched.policy_id().as_deref(), Some(policy_id.as_str()));
    update(world, fetched, "updated").await;
}

#[when(expr = "I update policy {string} with the original etag")]
async fn when_update_original(world: &mut IamWorld, policy_id: String) {
    let policy = Policy {
        name: world.name_of(&policy_id),
        etag: world.original_etag.clone().expect("no original etag"),
        ..deny_policy("stale")
    };
    update(world, policy, "stale").await;
}

async fn update(world: &mut IamWorld, policy: Policy, display_name: &str) {
    let started = world
        .client
        .update_policy()
        .policy(Policy {
            display_name: display_name.to_string(),
            ..policy
        })
        .send()
        .await;
    if let Some(operation) = world.record(started) {
        world.outcome = Some(operation.wait_default().await);
    }
}

#[when(expr = "I delete policy {string} without an etag")]
async fn when_delete(world: &mut IamWorld, policy_id: String) {
    let name = world.name_of(&policy_id);
    let started = world.client.delete_policy().name(name).send().await;
    if let Some(operation) = world.record(started) {
        world.outcome = Some(operation.wait_default().await);
    }
}

#[when("I call GetPolicy with both a request and a name")]
async fn when_get_mixed(world: &mut IamWorld) {
    let name = world.name_of("deny-1");
    let result = world
        .client
        .get_policy()
        .with_request(gcloud_iam::proto::GetPolicyRequest { name: name.clone() })
        .name(name)
        .send()
        .await;
    world.record(result);
}

// --- Then steps ---

#[then(expr = "the operation completes with policy {string}")]
async fn then_operation_completes(world: &mut IamWorld, name: String) {
    match world.outcome.as_ref().expect("no operation outcome") {
        Ok(policy) => assert_eq!(policy.name, name),
        Err(e) => panic!("operation failed: {}", e),
    }
}

#[then("the policy has a non-empty etag")]
async fn then_non_empty_etag(world: &mut IamWorld) {
    let policy = world.fetched.as_ref().expect("no policy fetched");
    assert!(!policy.etag.is_empty());
}

#[then(expr = "listing the parent includes {string}")]
async fn then_listing_includes(world: &mut IamWorld, policy_id: String) {
    let items = world
        .client
        .list_policies()
        .parent(world.parent.clone())
        .send()
        .await
        .expect("list_policies")
        .collect_all()
        .await
        .expect("collect_all");
    assert!(items
        .iter()
        .any(|p| p.policy_id().as_deref() == Some(policy_id.as_str())));
}

#[then("the update succeeds")]
async fn then_update_succeeds(world: &mut IamWorld) {
    assert!(world.last_error.is_none(), "{:?}", world.last_error);
    let policy = world
        .outcome
        .as_ref()
        .expect("no outcome")
        .as_ref()
        .expect("operation failed");
    assert_eq!(policy.display_name, "updated");
    assert_ne!(Some(&policy.etag), world.original_etag.as_ref());
}

#[then("the call fails with a conflict")]
async fn then_conflict(world: &mut IamWorld) {
    let err = world.expect_error();
    assert!(err.is_conflict(), "expected conflict, got {:?}", err);
    assert_eq!(err.category(), ErrorCategory::Conflict);
}

#[then("the call fails with an invalid argument")]
async fn then_invalid_argument(world: &mut IamWorld) {
    let err = world.expect_error();
    assert!(err.is_invalid_argument(), "got {:?}", err);
    assert_eq!(err.category(), ErrorCategory::Usage);
}

#[then(expr = "the stored policy {string} is still named {string}")]
async fn then_stored_display_name(world: &mut IamWorld, policy_id: String, display_name: String) {
    let stored = world
        .fake
        .stored_policy(&world.name_of(&policy_id))
        .await
        .expect("policy not stored");
    assert_eq!(stored.display_name, display_name);
}

#[then("the policy is deleted")]
async fn then_deleted(world: &mut IamWorld) {
    let policy = world
        .outcome
        .as_ref()
        .expect("no outcome")
        .as_ref()
        .expect("delete operation failed");
    assert!(policy.is_deleted());
}
