//! gcloud-iam-deny-policies: deny policy lifecycle sample
//!
//! Creates a deny policy on a project, lists the project's deny policies,
//! reads the new policy back, updates it with the fetched etag and finally
//! deletes it.
//!
//! ## Configuration
//! - IAM_PROJECT_ID: Project the policy is attached to (required)
//! - IAM_POLICY_ID: Id of the policy to create (default: "deny-project-delete")
//! - GCLOUD_IAM_CONFIG / GCLOUD_IAM__*: Client configuration (endpoint,
//!   access_token, quota_project_id, ...)
//! - GCLOUD_IAM_LOG: Log filter (default: info)

use gcloud_iam::proto::{DenyRule, Expr, Policy, PolicyRule};
use gcloud_iam::{resource, ClientConfig, PoliciesClient, PolicyExt, PolicyRuleExt};
use tracing::{error, info};

const DEFAULT_POLICY_ID: &str = "deny-project-delete";

fn deny_rule(tag_value: &str) -> PolicyRule {
    PolicyRule::deny(
        "Block project deletion unless the project is tagged for tests",
        DenyRule {
            denied_principals: vec!["principalSet://goog/public:all".to_string()],
            exception_principals: vec![
                "principalSet://goog/group/project-admins@example.com".to_string(),
            ],
            denied_permissions: vec![
                "cloudresourcemanager.googleapis.com/projects.delete".to_string(),
            ],
            denial_condition: Some(Expr {
                expression: format!("!resource.matchTag('12345678/env', '{}')", tag_value),
                ..Default::default()
            }),
            ..Default::default()
        },
    )
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    gcloud_iam::bootstrap::init_tracing();

    let project_id = std::env::var("IAM_PROJECT_ID").map_err(|_| {
        error!("IAM_PROJECT_ID is not set");
        "IAM_PROJECT_ID is required"
    })?;
    let policy_id =
        std::env::var("IAM_POLICY_ID").unwrap_or_else(|_| DEFAULT_POLICY_ID.to_string());

    let config = ClientConfig::load(None).map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;
    let client = PoliciesClient::connect(&config).await?;

    let attachment_point = resource::project_attachment_point(&project_id);
    let parent = resource::policy_parent(&attachment_point);
    let name = resource::policy_path(&attachment_point, &policy_id);

    let created = client
        .create_policy()
        .parent(&parent)
        .policy_id(&policy_id)
        .policy(Policy {
            display_name: "Restrict project deletion access".to_string(),
            rules: vec![deny_rule("test")],
            ..Default::default()
        })
        .send()
        .await?
        .wait_default()
        .await?;
    info!(policy = %created.name, etag = %created.etag, "Created deny policy");

    let mut policies = client.list_policies().parent(&parent).send().await?;
    while let Some(policy) = policies.next().await? {
        info!(
            policy = %policy.policy_id().unwrap_or_default(),
            rules = policy.deny_rules().len(),
            "Listed deny policy"
        );
    }

    let current = client.get_policy().name(&name).send().await?;
    info!(policy = %current.name, etag = %current.etag, "Fetched deny policy");

    let updated = client
        .update_policy()
        .policy(Policy {
            rules: vec![deny_rule("prod")],
            ..current
        })
        .send()
        .await?
        .wait_default()
        .await?;
    info!(policy = %updated.name, etag = %updated.etag, "Updated deny policy");

    let deleted = client
        .delete_policy()
        .name(&name)
        .etag(&updated.etag)
        .send()
        .await?
        .wait_default()
        .await?;
    info!(policy = %deleted.name, deleted = deleted.is_deleted(), "Deleted deny policy");

    Ok(())
}
