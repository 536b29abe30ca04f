//! Paged listing through the client.

use futures::StreamExt;
use gcloud_iam::mock::InMemoryPolicies;
use gcloud_iam::proto::iam;
use gcloud_iam::{resource, PolicyExt};

use crate::common::{create, parent, policies, policies_with, ATTACHMENT_POINT};

async fn seed(client: &gcloud_iam::PoliciesClient, count: usize) -> Vec<String> {
    let mut ids = Vec::new();
    for i in 0..count {
        let id = format!("deny-{:02}", i);
        create(client, &id).await;
        ids.push(id);
    }
    ids
}

#[tokio::test]
async fn test_items_across_pages_keep_server_order() {
    let (fake, client) = policies_with(InMemoryPolicies::new().with_page_size(3));
    let expected = seed(&client, 8).await;

    let items = client
        .list_policies()
        .parent(parent())
        .send()
        .await
        .unwrap()
        .collect_all()
        .await
        .unwrap();
    let ids: Vec<String> = items.iter().filter_map(|p| p.policy_id()).collect();
    assert_eq!(ids, expected);
    assert_eq!(fake.call_count("ListPolicies").await, 3);
}

#[tokio::test]
async fn test_single_page_terminates() {
    let (fake, client) = policies();
    seed(&client, 2).await;

    let mut pager = client.list_policies().parent(parent()).send().await.unwrap();
    assert!(pager.current_page().next_page_token.is_empty());
    assert!(pager.next().await.unwrap().is_some());
    assert!(pager.next().await.unwrap().is_some());
    assert!(pager.next().await.unwrap().is_none());
    assert!(pager.next().await.unwrap().is_none());
    assert_eq!(fake.call_count("ListPolicies").await, 1);
}

#[tokio::test]
async fn test_pages_and_request_page_size() {
    let (_fake, client) = policies();
    seed(&client, 5).await;

    let mut pager = client
        .list_policies()
        .with_request(iam::ListPoliciesRequest {
            parent: parent(),
            page_size: 2,
            ..Default::default()
        })
        .send()
        .await
        .unwrap();
    let mut sizes = Vec::new();
    while let Some(page) = pager.next_page().await.unwrap() {
        sizes.push(page.policies.len());
    }
    assert_eq!(sizes, vec![2, 2, 1]);
    assert!(pager.is_exhausted());
}

#[tokio::test]
async fn test_stream_and_restart() {
    let (fake, client) = policies_with(InMemoryPolicies::new().with_page_size(2));
    let expected = seed(&client, 3).await;

    let mut pager = client.list_policies().parent(parent()).send().await.unwrap();
    let first = pager.next().await.unwrap().unwrap();
    assert_eq!(first.policy_id().as_deref(), Some("deny-00"));

    pager.restart().await.unwrap();
    let ids: Vec<String> = pager
        .into_stream()
        .map(|item| item.unwrap().policy_id().unwrap_or_default())
        .collect()
        .await;
    assert_eq!(ids, expected);
    assert_eq!(fake.call_count("ListPolicies").await, 3);
}

#[tokio::test]
async fn test_fetch_error_surfaces_and_exhausts() {
    let (fake, client) = policies_with(InMemoryPolicies::new().with_page_size(1));
    seed(&client, 2).await;

    let mut pager = client
        .list_policies()
        .parent(parent())
        .no_retry()
        .send()
        .await
        .unwrap();
    assert!(pager.next().await.unwrap().is_some());

    fake.fail_next("ListPolicies", tonic::Status::permission_denied("nope"))
        .await;
    let err = pager.next().await.unwrap_err();
    assert_eq!(err.code(), Some(tonic::Code::PermissionDenied));
    assert!(pager.next().await.unwrap().is_none());
}

#[tokio::test]
async fn test_applicable_policies_include_ancestors_and_inaccessible() {
    let (fake, client) = policies();
    create(&client, "project-deny").await;

    let folder = resource::folder_attachment_point("42");
    let org = resource::organization_attachment_point("7");
    client
        .create_policy()
        .parent(resource::policy_parent(&folder))
        .policy_id("folder-deny")
        .send()
        .await
        .unwrap()
        .wait_default()
        .await
        .unwrap();
    fake.set_ancestor(ATTACHMENT_POINT, folder.clone()).await;
    fake.set_ancestor(folder.clone(), org.clone()).await;
    fake.set_inaccessible(org.clone()).await;

    let mut pager = client
        .list_applicable_policies()
        .attachment_point(ATTACHMENT_POINT)
        .send()
        .await
        .unwrap();
    assert_eq!(pager.current_page().inaccessible, vec![org]);

    let mut ids = Vec::new();
    while let Some(policy) = pager.next().await.unwrap() {
        ids.push(policy.policy_id().unwrap_or_default());
    }
    assert_eq!(ids, vec!["project-deny", "folder-deny"]);
}
