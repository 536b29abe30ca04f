//! Resource name helpers for service accounts, deny policies and the common
//! Cloud resource hierarchy.
//!
//! Policy names embed the attachment point as a URL-encoded full resource
//! name, so `cloudresourcemanager.googleapis.com/projects/p1` appears in a
//! name as `cloudresourcemanager.googleapis.com%2Fprojects%2Fp1`.

use crate::error::{ClientError, Result};

const POLICIES: &str = "policies";
const DENY_POLICIES: &str = "denypolicies";
const CLOUD_RESOURCE_MANAGER: &str = "cloudresourcemanager.googleapis.com";

/// `projects/-/serviceAccounts/{account}`.
pub fn service_account_path(account: &str) -> String {
    format!("projects/-/serviceAccounts/{}", account)
}

/// Returns the account email or unique id from a service account name.
///
/// The project segment must be the `-` wildcard.
pub fn parse_service_account_path(name: &str) -> Result<&str> {
    match name.split('/').collect::<Vec<_>>().as_slice() {
        ["projects", "-", "serviceAccounts", account] if !account.is_empty() => Ok(*account),
        ["projects", project, "serviceAccounts", _] => Err(ClientError::InvalidResourceName(
            format!("{}: project must be '-', got '{}'", name, project),
        )),
        _ => Err(ClientError::InvalidResourceName(format!(
            "{}: expected projects/-/serviceAccounts/{{account}}",
            name
        ))),
    }
}

/// Percent-encode a full resource name for use inside a policy name.
pub fn encode_attachment_point(full_resource_name: &str) -> String {
    urlencoding::encode(full_resource_name).into_owned()
}

/// Reverse [`encode_attachment_point`].
pub fn decode_attachment_point(encoded: &str) -> Result<String> {
    urlencoding::decode(encoded)
        .map(|s| s.into_owned())
        .map_err(|e| ClientError::InvalidResourceName(format!("{}: {}", encoded, e)))
}

/// The encoded attachment point for a project, e.g.
/// `cloudresourcemanager.googleapis.com%2Fprojects%2Fmy-project`.
pub fn project_attachment_point(project_id: &str) -> String {
    encode_attachment_point(&format!("{}/projects/{}", CLOUD_RESOURCE_MANAGER, project_id))
}

/// The encoded attachment point for a folder.
pub fn folder_attachment_point(folder_id: &str) -> String {
    encode_attachment_point(&format!("{}/folders/{}", CLOUD_RESOURCE_MANAGER, folder_id))
}

/// The encoded attachment point for an organization.
pub fn organization_attachment_point(organization_id: &str) -> String {
    encode_attachment_point(&format!(
        "{}/organizations/{}",
        CLOUD_RESOURCE_MANAGER, organization_id
    ))
}

/// `policies/{attachment_point}/denypolicies`. The attachment point must already be encoded.
pub fn policy_parent(attachment_point: &str) -> String {
    format!("{}/{}/{}", POLICIES, attachment_point, DENY_POLICIES)
}

/// `policies/{attachment_point}/denypolicies/{policy_id}`.
pub fn policy_path(attachment_point: &str, policy_id: &str) -> String {
    format!("{}/{}", policy_parent(attachment_point), policy_id)
}

/// Components of a deny policy resource name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyName {
    /// Attachment point as it appears in the name (still encoded).
    pub attachment_point: String,
    pub policy_id: String,
}

impl PolicyName {
    /// The attachment point as a plain full resource name.
    pub fn decoded_attachment_point(&self) -> Result<String> {
        decode_attachment_point(&self.attachment_point)
    }

    pub fn parent(&self) -> String {
        policy_parent(&self.attachment_point)
    }
}

impl std::fmt::Display for PolicyName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&policy_path(&self.attachment_point, &self.policy_id))
    }
}

impl std::str::FromStr for PolicyName {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self> {
        parse_policy_path(s)
    }
}

/// Split a policy name into its attachment point and id.
///
/// A raw `/` inside the attachment point is rejected; it must be `%2F`.
pub fn parse_policy_path(name: &str) -> Result<PolicyName> {
    match name.split('/').collect::<Vec<_>>().as_slice() {
        [POLICIES, ap, DENY_POLICIES, id] if !ap.is_empty() && !id.is_empty() => Ok(PolicyName {
            attachment_point: ap.to_string(),
            policy_id: id.to_string(),
        }),
        _ => Err(ClientError::InvalidResourceName(format!(
            "{}: expected policies/{{attachment_point}}/denypolicies/{{policy_id}} \
             with '/' in the attachment point encoded as %2F",
            name
        ))),
    }
}

/// Returns the encoded attachment point of a `policies/{ap}/denypolicies` parent.
pub fn parse_policy_parent(parent: &str) -> Result<&str> {
    match parent.split('/').collect::<Vec<_>>().as_slice() {
        [POLICIES, ap, DENY_POLICIES] if !ap.is_empty() => Ok(*ap),
        _ => Err(ClientError::InvalidResourceName(format!(
            "{}: expected policies/{{attachment_point}}/denypolicies",
            parent
        ))),
    }
}

/// Check that an attachment point is present and fully encoded.
pub fn validate_attachment_point(attachment_point: &str) -> Result<()> {
    if attachment_point.is_empty() || attachment_point.contains('/') {
        return Err(ClientError::InvalidResourceName(format!(
            "attachment point '{}' must be a URL-encoded full resource name",
            attachment_point
        )));
    }
    Ok(())
}

/// Check a caller-chosen policy id.
///
/// Ids are 3 to 63 characters of lowercase letters, digits, `-` and `.`, and
/// start with a lowercase letter.
pub fn validate_policy_id(policy_id: &str) -> Result<()> {
    let len_ok = (3..=63).contains(&policy_id.len());
    let starts_ok = policy_id
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_lowercase());
    let chars_ok = policy_id
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.');
    if len_ok && starts_ok && chars_ok {
        Ok(())
    } else {
        Err(ClientError::InvalidResourceName(format!(
            "invalid policy id '{}'",
            policy_id
        )))
    }
}

pub fn billing_account_path(billing_account: &str) -> String {
    format!("billingAccounts/{}", billing_account)
}

pub fn parse_billing_account_path(path: &str) -> Option<&str> {
    single_segment(path, "billingAccounts")
}

pub fn folder_path(folder: &str) -> String {
    format!("folders/{}", folder)
}

pub fn parse_folder_path(path: &str) -> Option<&str> {
    single_segment(path, "folders")
}

pub fn organization_path(organization: &str) -> String {
    format!("organizations/{}", organization)
}

pub fn parse_organization_path(path: &str) -> Option<&str> {
    single_segment(path, "organizations")
}

pub fn project_path(project: &str) -> String {
    format!("projects/{}", project)
}

pub fn parse_project_path(path: &str) -> Option<&str> {
    single_segment(path, "projects")
}

pub fn location_path(project: &str, location: &str) -> String {
    format!("projects/{}/locations/{}", project, location)
}

/// Returns `(project, location)`.
pub fn parse_location_path(path: &str) -> Option<(&str, &str)> {
    match path.split('/').collect::<Vec<_>>().as_slice() {
        ["projects", project, "locations", location]
            if !project.is_empty() && !location.is_empty() =>
        {
            Some((*project, *location))
        }
        _ => None,
    }
}

fn single_segment<'a>(path: &'a str, collection: &str) -> Option<&'a str> {
    let (head, id) = path.split_once('/')?;
    (head == collection && !id.is_empty() && !id.contains('/')).then_some(id)
}
