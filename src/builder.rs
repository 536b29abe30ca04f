//! Fluent per-RPC call builders.
//!
//! Every call accepts either a complete request message (`with_request`) or
//! individual "flattened" fields (`name`, `parent`, ...), never both. Mixing
//! the two is a caller error reported before any network I/O.

use std::time::Duration;

use crate::client::{IamCredentialsClient, PoliciesClient};
use crate::convert::to_proto_duration;
use crate::error::{ClientError, Result};
use crate::operation::Operation;
use crate::options::CallOptions;
use crate::pager::{ListApplicablePoliciesPager, ListPoliciesPager};
use crate::proto::{credentials, iam, Policy, PolicyOperationMetadata};
use crate::retry::RetryPolicy;

/// Long-running operation returned by the policy mutations.
pub type PolicyOperation = Operation<Policy, PolicyOperationMetadata>;

/// Where a call's request message comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestSource<R, F> {
    Request(R),
    Flattened(F),
}

impl<F: Flattened> RequestSource<F::Request, F> {
    /// The canonical request message.
    pub fn into_request(self) -> F::Request {
        match self {
            RequestSource::Request(request) => request,
            RequestSource::Flattened(fields) => {
                let mut request = F::Request::default();
                fields.apply(&mut request);
                request
            }
        }
    }
}

/// Individually supplied request fields for one RPC.
pub trait Flattened: Default {
    type Request: Default;

    /// True when no field has been set.
    fn is_empty(&self) -> bool;

    /// Copy every set field into `request`; unset fields keep their defaults.
    fn apply(self, request: &mut Self::Request);
}

/// Pick the request source, rejecting a full request combined with flattened fields.
pub fn resolve<F: Flattened>(
    method: &str,
    request: Option<F::Request>,
    fields: F,
) -> Result<RequestSource<F::Request, F>> {
    match request {
        Some(_) if !fields.is_empty() => Err(ClientError::InvalidArgument(format!(
            "{}: if the `request` argument is set, then none of the individual field arguments should be set",
            method
        ))),
        Some(request) => Ok(RequestSource::Request(request)),
        None => Ok(RequestSource::Flattened(fields)),
    }
}

/// A pending call: the request (or its fields) plus call options.
pub struct Call<'a, C, F: Flattened> {
    client: &'a C,
    method: &'static str,
    request: Option<F::Request>,
    fields: F,
    options: CallOptions,
}

impl<'a, C, F: Flattened> Call<'a, C, F> {
    pub(crate) fn new(client: &'a C, method: &'static str) -> Self {
        Self {
            client,
            method,
            request: None,
            fields: F::default(),
            options: CallOptions::default(),
        }
    }

    /// Send this complete request message.
    pub fn with_request(mut self, request: F::Request) -> Self {
        self.request = Some(request);
        self
    }

    /// Per-attempt timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = Some(timeout);
        self
    }

    pub fn retry(mut self, policy: RetryPolicy) -> Self {
        self.options.retry = Some(policy);
        self
    }

    pub fn no_retry(self) -> Self {
        self.retry(RetryPolicy::none())
    }

    /// Extra gRPC metadata sent with the call.
    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.metadata.push((key.into(), value.into()));
        self
    }

    /// Build the request without sending it.
    pub fn build(self) -> Result<F::Request> {
        Ok(resolve(self.method, self.request, self.fields)?.into_request())
    }

    fn into_parts(self) -> Result<(&'a C, F::Request, CallOptions)> {
        let client = self.client;
        let options = self.options;
        let request = resolve(self.method, self.request, self.fields)?.into_request();
        Ok((client, request, options))
    }
}

// --- google.iam.v2.Policies ---

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListPoliciesFields {
    pub parent: Option<String>,
}

impl Flattened for ListPoliciesFields {
    type Request = iam::ListPoliciesRequest;

    fn is_empty(&self) -> bool {
        self.parent.is_none()
    }

    fn apply(self, request: &mut Self::Request) {
        if let Some(parent) = self.parent {
            request.parent = parent;
        }
    }
}

pub type ListPoliciesCall<'a> = Call<'a, PoliciesClient, ListPoliciesFields>;

impl ListPoliciesCall<'_> {
    /// `policies/{attachment_point}/denypolicies`.
    pub fn parent(mut self, parent: impl Into<String>) -> Self {
        self.fields.parent = Some(parent.into());
        self
    }

    /// Fetch the first page and return a pager over all policies.
    pub async fn send(self) -> Result<ListPoliciesPager> {
        let (client, request, options) = self.into_parts()?;
        client.list_policies_with(request, options).await
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GetPolicyFields {
    pub name: Option<String>,
}

impl Flattened for GetPolicyFields {
    type Request = iam::GetPolicyRequest;

    fn is_empty(&self) -> bool {
        self.name.is_none()
    }

    fn apply(self, request: &mut Self::Request) {
        if let Some(name) = self.name {
            request.name = name;
        }
    }
}

pub type GetPolicyCall<'a> = Call<'a, PoliciesClient, GetPolicyFields>;

impl GetPolicyCall<'_> {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.fields.name = Some(name.into());
        self
    }

    pub async fn send(self) -> Result<Policy> {
        let (client, request, options) = self.into_parts()?;
        client.get_policy_with(request, options).await
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreatePolicyFields {
    pub parent: Option<String>,
    pub policy: Option<Policy>,
    pub policy_id: Option<String>,
}

impl Flattened for CreatePolicyFields {
    type Request = iam::CreatePolicyRequest;

    fn is_empty(&self) -> bool {
        self.parent.is_none() && self.policy.is_none() && self.policy_id.is_none()
    }

    fn apply(self, request: &mut Self::Request) {
        if let Some(parent) = self.parent {
            request.parent = parent;
        }
        if let Some(policy) = self.policy {
            request.policy = Some(policy);
        }
        if let Some(policy_id) = self.policy_id {
            request.policy_id = policy_id;
        }
    }
}

pub type CreatePolicyCall<'a> = Call<'a, PoliciesClient, CreatePolicyFields>;

impl CreatePolicyCall<'_> {
    pub fn parent(mut self, parent: impl Into<String>) -> Self {
        self.fields.parent = Some(parent.into());
        self
    }

    pub fn policy(mut self, policy: Policy) -> Self {
        self.fields.policy = Some(policy);
        self
    }

    pub fn policy_id(mut self, policy_id: impl Into<String>) -> Self {
        self.fields.policy_id = Some(policy_id.into());
        self
    }

    pub async fn send(self) -> Result<PolicyOperation> {
        let (client, request, options) = self.into_parts()?;
        client.create_policy_with(request, options).await
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdatePolicyFields {
    pub policy: Option<Policy>,
}

impl Flattened for UpdatePolicyFields {
    type Request = iam::UpdatePolicyRequest;

    fn is_empty(&self) -> bool {
        self.policy.is_none()
    }

    fn apply(self, request: &mut Self::Request) {
        if let Some(policy) = self.policy {
            request.policy = Some(policy);
        }
    }
}

pub type UpdatePolicyCall<'a> = Call<'a, PoliciesClient, UpdatePolicyFields>;

impl UpdatePolicyCall<'_> {
    /// The replacement policy. Its `etag` must match the stored one.
    pub fn policy(mut self, policy: Policy) -> Self {
        self.fields.policy = Some(policy);
        self
    }

    pub async fn send(self) -> Result<PolicyOperation> {
        let (client, request, options) = self.into_parts()?;
        client.update_policy_with(request, options).await
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeletePolicyFields {
    pub name: Option<String>,
    pub etag: Option<String>,
}

impl Flattened for DeletePolicyFields {
    type Request = iam::DeletePolicyRequest;

    fn is_empty(&self) -> bool {
        self.name.is_none() && self.etag.is_none()
    }

    fn apply(self, request: &mut Self::Request) {
        if let Some(name) = self.name {
            request.name = name;
        }
        if let Some(etag) = self.etag {
            request.etag = etag;
        }
    }
}

pub type DeletePolicyCall<'a> = Call<'a, PoliciesClient, DeletePolicyFields>;

impl DeletePolicyCall<'_> {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.fields.name = Some(name.into());
        self
    }

    /// Delete only if the stored policy still has this etag.
    pub fn etag(mut self, etag: impl Into<String>) -> Self {
        self.fields.etag = Some(etag.into());
        self
    }

    pub async fn send(self) -> Result<PolicyOperation> {
        let (client, request, options) = self.into_parts()?;
        client.delete_policy_with(request, options).await
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListApplicablePoliciesFields {
    pub attachment_point: Option<String>,
}

impl Flattened for ListApplicablePoliciesFields {
    type Request = iam::ListApplicablePoliciesRequest;

    fn is_empty(&self) -> bool {
        self.attachment_point.is_none()
    }

    fn apply(self, request: &mut Self::Request) {
        if let Some(attachment_point) = self.attachment_point {
            request.attachment_point = attachment_point;
        }
    }
}

pub type ListApplicablePoliciesCall<'a> = Call<'a, PoliciesClient, ListApplicablePoliciesFields>;

impl ListApplicablePoliciesCall<'_> {
    /// URL-encoded full resource name, e.g.
    /// `cloudresourcemanager.googleapis.com%2Fprojects%2Fmy-project`.
    pub fn attachment_point(mut self, attachment_point: impl Into<String>) -> Self {
        self.fields.attachment_point = Some(attachment_point.into());
        self
    }

    pub async fn send(self) -> Result<ListApplicablePoliciesPager> {
        let (client, request, options) = self.into_parts()?;
        client.list_applicable_policies_with(request, options).await
    }
}

// --- google.iam.credentials.v1.IAMCredentials ---

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerateAccessTokenFields {
    pub name: Option<String>,
    pub delegates: Option<Vec<String>>,
    pub scope: Option<Vec<String>>,
    pub lifetime: Option<Duration>,
}

impl Flattened for GenerateAccessTokenFields {
    type Request = credentials::GenerateAccessTokenRequest;

    fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.delegates.is_none()
            && self.scope.is_none()
            && self.lifetime.is_none()
    }

    fn apply(self, request: &mut Self::Request) {
        if let Some(name) = self.name {
            request.name = name;
        }
        if let Some(delegates) = self.delegates {
            request.delegates = delegates;
        }
        if let Some(scope) = self.scope {
            request.scope = scope;
        }
        if let Some(lifetime) = self.lifetime {
            request.lifetime = Some(to_proto_duration(lifetime));
        }
    }
}

pub type GenerateAccessTokenCall<'a> = Call<'a, IamCredentialsClient, GenerateAccessTokenFields>;

impl GenerateAccessTokenCall<'_> {
    /// `projects/-/serviceAccounts/{ACCOUNT_EMAIL_OR_UNIQUEID}`.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.fields.name = Some(name.into());
        self
    }

    pub fn delegates<I, S>(mut self, delegates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields.delegates = Some(delegates.into_iter().map(Into::into).collect());
        self
    }

    /// OAuth scopes; at least one is required by the service.
    pub fn scope<I, S>(mut self, scope: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields.scope = Some(scope.into_iter().map(Into::into).collect());
        self
    }

    pub fn lifetime(mut self, lifetime: Duration) -> Self {
        self.fields.lifetime = Some(lifetime);
        self
    }

    pub async fn send(self) -> Result<credentials::GenerateAccessTokenResponse> {
        let (client, request, options) = self.into_parts()?;
        client.generate_access_token_with(request, options).await
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerateIdTokenFields {
    pub name: Option<String>,
    pub delegates: Option<Vec<String>>,
    pub audience: Option<String>,
    pub include_email: Option<bool>,
}

impl Flattened for GenerateIdTokenFields {
    type Request = credentials::GenerateIdTokenRequest;

    fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.delegates.is_none()
            && self.audience.is_none()
            && self.include_email.is_none()
    }

    fn apply(self, request: &mut Self::Request) {
        if let Some(name) = self.name {
            request.name = name;
        }
        if let Some(delegates) = self.delegates {
            request.delegates = delegates;
        }
        if let Some(audience) = self.audience {
            request.audience = audience;
        }
        if let Some(include_email) = self.include_email {
            request.include_email = include_email;
        }
    }
}

pub type GenerateIdTokenCall<'a> = Call<'a, IamCredentialsClient, GenerateIdTokenFields>;

impl GenerateIdTokenCall<'_> {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.fields.name = Some(name.into());
        self
    }

    pub fn delegates<I, S>(mut self, delegates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields.delegates = Some(delegates.into_iter().map(Into::into).collect());
        self
    }

    pub fn audience(mut self, audience: impl Into<String>) -> Self {
        self.fields.audience = Some(audience.into());
        self
    }

    pub fn include_email(mut self, include_email: bool) -> Self {
        self.fields.include_email = Some(include_email);
        self
    }

    pub async fn send(self) -> Result<credentials::GenerateIdTokenResponse> {
        let (client, request, options) = self.into_parts()?;
        client.generate_id_token_with(request, options).await
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignBlobFields {
    pub name: Option<String>,
    pub delegates: Option<Vec<String>>,
    pub payload: Option<Vec<u8>>,
}

impl Flattened for SignBlobFields {
    type Request = credentials::SignBlobRequest;

    fn is_empty(&self) -> bool {
        self.name.is_none() && self.delegates.is_none() && self.payload.is_none()
    }

    fn apply(self, request: &mut Self::Request) {
        if let Some(name) = self.name {
            request.name = name;
        }
        if let Some(delegates) = self.delegates {
            request.delegates = delegates;
        }
        if let Some(payload) = self.payload {
            request.payload = payload;
        }
    }
}

pub type SignBlobCall<'a> = Call<'a, IamCredentialsClient, SignBlobFields>;

impl SignBlobCall<'_> {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.fields.name = Some(name.into());
        self
    }

    pub fn delegates<I, S>(mut self, delegates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields.delegates = Some(delegates.into_iter().map(Into::into).collect());
        self
    }

    pub fn payload(mut self, payload: impl Into<Vec<u8>>) -> Self {
        self.fields.payload = Some(payload.into());
        self
    }

    pub async fn send(self) -> Result<credentials::SignBlobResponse> {
        let (client, request, options) = self.into_parts()?;
        client.sign_blob_with(request, options).await
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignJwtFields {
    pub name: Option<String>,
    pub delegates: Option<Vec<String>>,
    pub payload: Option<String>,
}

impl Flattened for SignJwtFields {
    type Request = credentials::SignJwtRequest;

    fn is_empty(&self) -> bool {
        self.name.is_none() && self.delegates.is_none() && self.payload.is_none()
    }

    fn apply(self, request: &mut Self::Request) {
        if let Some(name) = self.name {
            request.name = name;
        }
        if let Some(delegates) = self.delegates {
            request.delegates = delegates;
        }
        if let Some(payload) = self.payload {
            request.payload = payload;
        }
    }
}

pub type SignJwtCall<'a> = Call<'a, IamCredentialsClient, SignJwtFields>;

impl SignJwtCall<'_> {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.fields.name = Some(name.into());
        self
    }

    pub fn delegates<I, S>(mut self, delegates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields.delegates = Some(delegates.into_iter().map(Into::into).collect());
        self
    }

    /// JSON object holding the JWT claim set.
    pub fn payload(mut self, payload: impl Into<String>) -> Self {
        self.fields.payload = Some(payload.into());
        self
    }

    pub async fn send(self) -> Result<credentials::SignJwtResponse> {
        let (client, request, options) = self.into_parts()?;
        client.sign_jwt_with(request, options).await
    }
}
