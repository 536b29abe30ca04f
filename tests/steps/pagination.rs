//! Paged listing steps.

use cucumber::{given, then, when};
use gcloud_iam::mock::InMemoryPolicies;
use gcloud_iam::PolicyExt;
use tonic::Status;

use super::IamWorld;

#[given(expr = "an in-memory Policies service returning pages of {int}")]
async fn given_paged_service(world: &mut IamWorld, page_size: usize) {
    world.use_service(InMemoryPolicies::new().with_page_size(page_size));
}

#[given(expr = "{int} deny policies under the project")]
async fn given_policies(world: &mut IamWorld, count: usize) {
    for i in 0..count {
        let policy_id = format!("deny-{:03}", i);
        world
            .client
            .create_policy()
            .parent(world.parent.clone())
            .policy_id(&policy_id)
            .send()
            .await
            .expect("create_policy")
            .wait_default()
            .await
            .expect("create operation");
        world.created.push(policy_id);
    }
}

#[when("I list all policies under the project")]
async fn when_list_all(world: &mut IamWorld) {
    let listed = match world
        .client
        .list_policies()
        .parent(world.parent.clone())
        .send()
        .await
    {
        Ok(pager) => pager.collect_all().await,
        Err(e) => Err(e),
    };
    world.listed = world.record(listed).unwrap_or_default();
}

#[when("I iterate the policies under the project item by item")]
async fn when_iterate(world: &mut IamWorld) {
    let mut pager = world
        .client
        .list_policies()
        .parent(world.parent.clone())
        .no_retry()
        .send()
        .await
        .expect("first page");
    world.listed.clear();
    world.last_error = None;
    loop {
        match pager.next().await {
            Ok(Some(policy)) => {
                world.listed.push(policy);
                if world.listed.len() == 1 {
                    world
                        .fake
                        .fail_next("ListPolicies", Status::permission_denied("listing revoked"))
                        .await;
                }
            }
            Ok(None) => break,
            Err(e) => {
                world.last_error = Some(e);
                assert!(pager.next().await.expect("exhausted pager").is_none());
                break;
            }
        }
    }
}

#[then(expr = "I receive {int} policies in creation order")]
async fn then_receive_in_order(world: &mut IamWorld, count: usize) {
    assert!(world.last_error.is_none(), "{:?}", world.last_error);
    let ids: Vec<String> = world.listed.iter().filter_map(|p| p.policy_id()).collect();
    assert_eq!(ids.len(), count);
    assert_eq!(ids, world.created);
}

#[then(expr = "only {int} policies were received before the error")]
async fn then_partial(world: &mut IamWorld, count: usize) {
    assert_eq!(world.listed.len(), count);
    assert!(world.last_error.is_some());
}
