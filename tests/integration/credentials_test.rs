//! IAM Credentials client against the in-memory service.

use std::time::Duration;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use gcloud_iam::convert::timestamp_to_datetime;
use gcloud_iam::mock::InMemoryCredentials;
use gcloud_iam::{resource, ClientError};
use tonic::{Code, Status};

use crate::common::{credentials, SERVICE_ACCOUNT};

fn account() -> String {
    resource::service_account_path(SERVICE_ACCOUNT)
}

#[tokio::test]
async fn test_generate_access_token_with_lifetime() {
    let (_fake, client) = credentials();
    let before = chrono::Utc::now();

    let response = client
        .generate_access_token()
        .name(account())
        .scope(["https://www.googleapis.com/auth/cloud-platform"])
        .lifetime(Duration::from_secs(600))
        .send()
        .await
        .unwrap();
    assert!(response.access_token.starts_with("ya29."));

    let expires = timestamp_to_datetime(&response.expire_time.unwrap()).unwrap();
    let lifetime = expires - before;
    assert!(lifetime >= chrono::Duration::seconds(599));
    assert!(lifetime <= chrono::Duration::seconds(660));
}

#[tokio::test]
async fn test_generate_id_token_includes_email_claim() {
    let (_fake, client) = credentials();
    let response = client
        .generate_id_token()
        .name(account())
        .audience("https://service.example.com")
        .include_email(true)
        .send()
        .await
        .unwrap();

    let parts: Vec<&str> = response.token.split('.').collect();
    assert_eq!(parts.len(), 3);
    let claims = String::from_utf8(URL_SAFE_NO_PAD.decode(parts[1]).unwrap()).unwrap();
    assert!(claims.contains(r#""aud":"https://service.example.com""#));
    assert!(claims.contains(SERVICE_ACCOUNT));
}

#[tokio::test]
async fn test_sign_blob_and_jwt_share_key() {
    let (_fake, client) = credentials();

    let blob = client
        .sign_blob()
        .name(account())
        .payload(b"payload".to_vec())
        .send()
        .await
        .unwrap();
    assert_eq!(
        blob.signed_blob,
        InMemoryCredentials::signature(SERVICE_ACCOUNT, b"payload")
    );

    let jwt = client
        .sign_jwt()
        .name(account())
        .payload(r#"{"sub":"user"}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(jwt.key_id, blob.key_id);
    assert_eq!(jwt.signed_jwt.split('.').count(), 3);
}

#[tokio::test]
async fn test_project_other_than_wildcard_rejected_locally() {
    let (fake, client) = credentials();
    let err = client
        .sign_blob()
        .name(format!("projects/p1/serviceAccounts/{}", SERVICE_ACCOUNT))
        .payload(b"x".to_vec())
        .send()
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::InvalidResourceName(_)));
    assert!(fake.calls().await.is_empty());
}

#[tokio::test]
async fn test_server_errors_surface_verbatim() {
    let (fake, client) = credentials();
    fake.fail_next(
        "GenerateAccessToken",
        Status::permission_denied("iam.serviceAccounts.getAccessToken denied"),
    )
    .await;

    let err = client
        .generate_access_token()
        .name(account())
        .scope(["https://www.googleapis.com/auth/cloud-platform"])
        .send()
        .await
        .unwrap_err();
    assert_eq!(err.code(), Some(Code::PermissionDenied));
    assert_eq!(err.message(), "iam.serviceAccounts.getAccessToken denied");
}

#[tokio::test]
async fn test_credentials_calls_retry_unavailable() {
    let (fake, client) = credentials();
    fake.fail_next("SignJwt", Status::unavailable("down")).await;

    client
        .sign_jwt()
        .name(account())
        .payload("{}")
        .send()
        .await
        .unwrap();
    assert_eq!(fake.call_count("SignJwt").await, 2);
}
