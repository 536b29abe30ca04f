//! In-memory fakes of the Policies, Operations and IAM Credentials services.
//!
//! These stand in for the gRPC transport in tests and local development. The
//! policy fake behaves like the service where it matters to a client: etags
//! guard updates and deletes, deletion is logical, lists are paged and every
//! mutation returns a long-running operation. Every call is recorded with
//! its metadata, and failures can be injected per method.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicU32, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use sha2::{Digest, Sha256};
use tokio::sync::{Mutex, RwLock};
use tonic::metadata::{KeyAndValueRef, MetadataMap};
use tonic::{Code, Request, Status};
use uuid::Uuid;

use crate::convert::{datetime_to_timestamp, now, pack_any};
use crate::proto::longrunning::{self, operation};
use crate::proto::{
    credentials, iam, Policy, PolicyOperationMetadata, RpcStatus, DENY_POLICY_KIND,
};
use crate::resource;
use crate::transport::{IamCredentialsTransport, OperationsTransport, PoliciesTransport};

/// Largest page the fake returns when the request asks for none.
pub const DEFAULT_PAGE_SIZE: usize = 1000;

/// One call received by a fake, with its ASCII metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: &'static str,
    pub metadata: Vec<(String, String)>,
}

impl RecordedCall {
    /// First value of a metadata key.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.metadata
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

fn ascii_metadata(metadata: &MetadataMap) -> Vec<(String, String)> {
    metadata
        .iter()
        .filter_map(|entry| match entry {
            KeyAndValueRef::Ascii(key, value) => value
                .to_str()
                .ok()
                .map(|v| (key.as_str().to_string(), v.to_string())),
            KeyAndValueRef::Binary(..) => None,
        })
        .collect()
}

/// Call log, injected failures and artificial latency shared by the fakes.
#[derive(Default)]
struct Recorder {
    calls: Mutex<Vec<RecordedCall>>,
    failures: Mutex<HashMap<&'static str, VecDeque<Status>>>,
    latency_ms: AtomicU64,
}

impl Recorder {
    async fn begin(
        &self,
        method: &'static str,
        metadata: Vec<(String, String)>,
    ) -> Result<(), Status> {
        self.calls.lock().await.push(RecordedCall { method, metadata });

        let latency = self.latency_ms.load(Ordering::SeqCst);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }

        let injected = self
            .failures
            .lock()
            .await
            .get_mut(method)
            .and_then(|queue| queue.pop_front());
        match injected {
            Some(status) => Err(status),
            None => Ok(()),
        }
    }

    async fn fail_next(&self, method: &'static str, status: Status) {
        self.failures
            .lock()
            .await
            .entry(method)
            .or_default()
            .push_back(status);
    }

    async fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().await.clone()
    }

    async fn call_count(&self, method: &str) -> usize {
        self.calls
            .lock()
            .await
            .iter()
            .filter(|c| c.method == method)
            .count()
    }

    async fn last_call(&self, method: &str) -> Option<RecordedCall> {
        self.calls
            .lock()
            .await
            .iter()
            .rev()
            .find(|c| c.method == method)
            .cloned()
    }

    fn set_latency(&self, latency: Duration) {
        let millis = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
        self.latency_ms.store(millis, Ordering::SeqCst);
    }
}

fn invalid(err: crate::error::ClientError) -> Status {
    Status::invalid_argument(err.to_string())
}

fn encode_page_token(offset: usize) -> String {
    STANDARD.encode(format!("offset:{}", offset))
}

fn decode_page_token(token: &str) -> Result<usize, Status> {
    STANDARD
        .decode(token)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .and_then(|s| s.strip_prefix("offset:").and_then(|n| n.parse().ok()))
        .ok_or_else(|| Status::invalid_argument(format!("invalid page token: {}", token)))
}

/// Slice one page out of `items`, returning it with the next token.
fn paginate<T: Clone>(
    items: &[T],
    page_token: &str,
    requested: i32,
    server_max: usize,
) -> Result<(Vec<T>, String), Status> {
    let start = if page_token.is_empty() {
        0
    } else {
        decode_page_token(page_token)?
    };
    let limit = match usize::try_from(requested) {
        Ok(n) if n > 0 => n.min(server_max),
        _ => server_max,
    };
    let end = start.saturating_add(limit).min(items.len());
    let page = items.get(start..end).map(<[T]>::to_vec).unwrap_or_default();
    let next = if end < items.len() {
        encode_page_token(end)
    } else {
        String::new()
    };
    Ok((page, next))
}

struct TrackedOperation {
    /// GetOperation calls left before the operation reports done.
    remaining_polls: u32,
    pending: longrunning::Operation,
    done: longrunning::Operation,
}

#[derive(Default)]
struct PolicyStore {
    /// Keyed by full policy name; deleted policies stay with `delete_time` set.
    policies: BTreeMap<String, Policy>,
    operations: HashMap<String, TrackedOperation>,
    etag_counter: u64,
}

impl PolicyStore {
    fn next_etag(&mut self) -> String {
        self.etag_counter += 1;
        STANDARD.encode(self.etag_counter.to_be_bytes())
    }

    fn live(&self, name: &str) -> Option<&Policy> {
        self.policies.get(name).filter(|p| p.delete_time.is_none())
    }

    fn attached_to(&self, attachment_point: &str) -> Vec<Policy> {
        let prefix = format!("{}/", resource::policy_parent(attachment_point));
        self.policies
            .values()
            .filter(|p| p.delete_time.is_none() && p.name.starts_with(&prefix))
            .cloned()
            .collect()
    }
}

#[derive(Default)]
struct PoliciesInner {
    store: RwLock<PolicyStore>,
    recorder: Recorder,
    page_size: AtomicUsize,
    operation_polls: AtomicU32,
    operation_failures: Mutex<VecDeque<Status>>,
    ancestors: RwLock<HashMap<String, String>>,
    inaccessible: RwLock<HashSet<String>>,
}

/// In-memory `Policies` and `Operations` service.
#[derive(Clone)]
pub struct InMemoryPolicies {
    inner: Arc<PoliciesInner>,
}

impl std::fmt::Debug for InMemoryPolicies {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryPolicies")
            .field("page_size", &self.page_size())
            .field(
                "operation_polls",
                &self.inner.operation_polls.load(Ordering::SeqCst),
            )
            .finish_non_exhaustive()
    }
}

impl Default for InMemoryPolicies {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryPolicies {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(PoliciesInner {
                page_size: AtomicUsize::new(DEFAULT_PAGE_SIZE),
                ..Default::default()
            }),
        }
    }

    /// Largest page returned by the list methods.
    pub fn with_page_size(self, page_size: usize) -> Self {
        self.inner.page_size.store(page_size.max(1), Ordering::SeqCst);
        self
    }

    /// Operations started from now on complete on the `polls`-th GetOperation.
    /// Zero completes them immediately.
    pub fn with_pending_operations(self, polls: u32) -> Self {
        self.inner.operation_polls.store(polls, Ordering::SeqCst);
        self
    }

    /// Delay every call by `latency` before answering.
    pub fn with_latency(self, latency: Duration) -> Self {
        self.inner.recorder.set_latency(latency);
        self
    }

    /// Fail the next call of `method` (e.g. `"GetPolicy"`) with `status`.
    pub async fn fail_next(&self, method: &'static str, status: Status) {
        self.inner.recorder.fail_next(method, status).await;
    }

    /// The next mutation is accepted but its operation ends in `status`,
    /// leaving the stored policies untouched.
    pub async fn fail_next_operation(&self, status: Status) {
        self.inner.operation_failures.lock().await.push_back(status);
    }

    /// Declare `parent` as the next attachment point up the hierarchy from
    /// `child`. Both are URL-encoded full resource names.
    pub async fn set_ancestor(&self, child: impl Into<String>, parent: impl Into<String>) {
        self.inner
            .ancestors
            .write()
            .await
            .insert(child.into(), parent.into());
    }

    /// Report `attachment_point` as inaccessible in ListApplicablePolicies.
    pub async fn set_inaccessible(&self, attachment_point: impl Into<String>) {
        self.inner
            .inaccessible
            .write()
            .await
            .insert(attachment_point.into());
    }

    /// The stored policy, including a logically deleted one.
    pub async fn stored_policy(&self, name: &str) -> Option<Policy> {
        self.inner.store.read().await.policies.get(name).cloned()
    }

    pub async fn calls(&self) -> Vec<RecordedCall> {
        self.inner.recorder.calls().await
    }

    pub async fn call_count(&self, method: &str) -> usize {
        self.inner.recorder.call_count(method).await
    }

    pub async fn last_call(&self, method: &str) -> Option<RecordedCall> {
        self.inner.recorder.last_call(method).await
    }

    fn page_size(&self) -> usize {
        self.inner.page_size.load(Ordering::SeqCst).max(1)
    }

    fn start_operation(
        &self,
        store: &mut PolicyStore,
        result: operation::Result,
    ) -> longrunning::Operation {
        let name = format!("operations/{}", Uuid::new_v4());
        let metadata = pack_any(&PolicyOperationMetadata {
            create_time: Some(now()),
        });
        let pending = longrunning::Operation {
            name: name.clone(),
            metadata: Some(metadata),
            done: false,
            result: None,
        };
        let done = longrunning::Operation {
            done: true,
            result: Some(result),
            ..pending.clone()
        };
        let polls = self.inner.operation_polls.load(Ordering::SeqCst);
        let initial = if polls == 0 {
            done.clone()
        } else {
            pending.clone()
        };
        store.operations.insert(
            name,
            TrackedOperation {
                remaining_polls: polls,
                pending,
                done,
            },
        );
        initial
    }

    async fn take_operation_failure(&self) -> Option<operation::Result> {
        self.inner
            .operation_failures
            .lock()
            .await
            .pop_front()
            .map(|status| {
                operation::Result::Error(RpcStatus {
                    code: status.code() as i32,
                    message: status.message().to_string(),
                    details: Vec::new(),
                })
            })
    }
}

#[async_trait]
impl PoliciesTransport for InMemoryPolicies {
    async fn list_policies(
        &self,
        request: Request<iam::ListPoliciesRequest>,
    ) -> Result<iam::ListPoliciesResponse, Status> {
        let metadata = ascii_metadata(request.metadata());
        self.inner.recorder.begin("ListPolicies", metadata).await?;
        let request = request.into_inner();

        let attachment_point = resource::parse_policy_parent(&request.parent).map_err(invalid)?;
        let store = self.inner.store.read().await;
        let all = store.attached_to(attachment_point);
        let (policies, next_page_token) =
            paginate(&all, &request.page_token, request.page_size, self.page_size())?;
        Ok(iam::ListPoliciesResponse {
            policies,
            next_page_token,
        })
    }

    async fn get_policy(
        &self,
        request: Request<iam::GetPolicyRequest>,
    ) -> Result<Policy, Status> {
        let metadata = ascii_metadata(request.metadata());
        self.inner.recorder.begin("GetPolicy", metadata).await?;
        let request = request.into_inner();

        resource::parse_policy_path(&request.name).map_err(invalid)?;
        self.inner
            .store
            .read()
            .await
            .live(&request.name)
            .cloned()
            .ok_or_else(|| Status::not_found(format!("policy {} not found", request.name)))
    }

    async fn create_policy(
        &self,
        request: Request<iam::CreatePolicyRequest>,
    ) -> Result<longrunning::Operation, Status> {
        let metadata = ascii_metadata(request.metadata());
        self.inner.recorder.begin("CreatePolicy", metadata).await?;
        let request = request.into_inner();

        resource::parse_policy_parent(&request.parent).map_err(invalid)?;
        let policy_id = if request.policy_id.is_empty() {
            format!("p-{}", Uuid::new_v4().simple())
        } else {
            resource::validate_policy_id(&request.policy_id).map_err(invalid)?;
            request.policy_id
        };
        let name = format!("{}/{}", request.parent, policy_id);

        let mut store = self.inner.store.write().await;
        if store.live(&name).is_some() {
            return Err(Status::already_exists(format!("policy {} already exists", name)));
        }
        if let Some(failure) = self.take_operation_failure().await {
            return Ok(self.start_operation(&mut store, failure));
        }

        let created = now();
        let policy = Policy {
            name: name.clone(),
            uid: Uuid::new_v4().to_string(),
            kind: DENY_POLICY_KIND.to_string(),
            etag: store.next_etag(),
            create_time: Some(created.clone()),
            update_time: Some(created),
            delete_time: None,
            ..request.policy.unwrap_or_default()
        };
        store.policies.insert(name, policy.clone());
        Ok(self.start_operation(&mut store, operation::Result::Response(pack_any(&policy))))
    }

    async fn update_policy(
        &self,
        request: Request<iam::UpdatePolicyRequest>,
    ) -> Result<longrunning::Operation, Status> {
        let metadata = ascii_metadata(request.metadata());
        self.inner.recorder.begin("UpdatePolicy", metadata).await?;
        let update = request
            .into_inner()
            .policy
            .ok_or_else(|| Status::invalid_argument("policy is required"))?;

        resource::parse_policy_path(&update.name).map_err(invalid)?;
        let mut store = self.inner.store.write().await;
        let existing = store
            .live(&update.name)
            .cloned()
            .ok_or_else(|| Status::not_found(format!("policy {} not found", update.name)))?;
        if !update.etag.is_empty() && update.etag != existing.etag {
            return Err(Status::aborted(format!(
                "etag mismatch for {}: the policy was modified concurrently",
                update.name
            )));
        }
        if let Some(failure) = self.take_operation_failure().await {
            return Ok(self.start_operation(&mut store, failure));
        }

        let policy = Policy {
            display_name: update.display_name,
            annotations: update.annotations,
            rules: update.rules,
            etag: store.next_etag(),
            update_time: Some(now()),
            ..existing
        };
        store.policies.insert(policy.name.clone(), policy.clone());
        Ok(self.start_operation(&mut store, operation::Result::Response(pack_any(&policy))))
    }

    async fn delete_policy(
        &self,
        request: Request<iam::DeletePolicyRequest>,
    ) -> Result<longrunning::Operation, Status> {
        let metadata = ascii_metadata(request.metadata());
        self.inner.recorder.begin("DeletePolicy", metadata).await?;
        let request = request.into_inner();

        resource::parse_policy_path(&request.name).map_err(invalid)?;
        let mut store = self.inner.store.write().await;
        let existing = store
            .live(&request.name)
            .cloned()
            .ok_or_else(|| Status::not_found(format!("policy {} not found", request.name)))?;
        if !request.etag.is_empty() && request.etag != existing.etag {
            return Err(Status::aborted(format!(
                "etag mismatch for {}: the policy was modified concurrently",
                request.name
            )));
        }
        if let Some(failure) = self.take_operation_failure().await {
            return Ok(self.start_operation(&mut store, failure));
        }

        let deleted_at = now();
        let policy = Policy {
            etag: store.next_etag(),
            update_time: Some(deleted_at.clone()),
            delete_time: Some(deleted_at),
            ..existing
        };
        store.policies.insert(policy.name.clone(), policy.clone());
        Ok(self.start_operation(&mut store, operation::Result::Response(pack_any(&policy))))
    }

    async fn list_applicable_policies(
        &self,
        request: Request<iam::ListApplicablePoliciesRequest>,
    ) -> Result<iam::ListApplicablePoliciesResponse, Status> {
        let metadata = ascii_metadata(request.metadata());
        self.inner
            .recorder
            .begin("ListApplicablePolicies", metadata)
            .await?;
        let request = request.into_inner();

        resource::validate_attachment_point(&request.attachment_point).map_err(invalid)?;
        let ancestors = self.inner.ancestors.read().await;
        let hidden = self.inner.inaccessible.read().await;
        let store = self.inner.store.read().await;

        let mut all = Vec::new();
        let mut inaccessible = Vec::new();
        let mut visited = HashSet::new();
        let mut current = Some(request.attachment_point.as_str());
        while let Some(point) = current {
            if !visited.insert(point) {
                break;
            }
            if hidden.contains(point) {
                inaccessible.push(point.to_string());
            } else {
                all.extend(store.attached_to(point));
            }
            current = ancestors.get(point).map(String::as_str);
        }

        let (policies, next_page_token) =
            paginate(&all, &request.page_token, request.page_size, self.page_size())?;
        Ok(iam::ListApplicablePoliciesResponse {
            policies,
            inaccessible,
            next_page_token,
        })
    }

    fn operations(&self) -> Arc<dyn OperationsTransport> {
        Arc::new(self.clone())
    }
}

#[async_trait]
impl OperationsTransport for InMemoryPolicies {
    async fn get_operation(
        &self,
        request: Request<longrunning::GetOperationRequest>,
    ) -> Result<longrunning::Operation, Status> {
        let metadata = ascii_metadata(request.metadata());
        self.inner.recorder.begin("GetOperation", metadata).await?;
        let request = request.into_inner();

        let mut store = self.inner.store.write().await;
        let tracked = store
            .operations
            .get_mut(&request.name)
            .ok_or_else(|| Status::not_found(format!("operation {} not found", request.name)))?;
        tracked.remaining_polls = tracked.remaining_polls.saturating_sub(1);
        if tracked.remaining_polls > 0 {
            Ok(tracked.pending.clone())
        } else {
            Ok(tracked.done.clone())
        }
    }
}

/// Longest access token lifetime the service grants.
pub const MAX_TOKEN_LIFETIME: Duration = Duration::from_secs(12 * 3600);
const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(3600);

/// In-memory `IAMCredentials` service.
///
/// Tokens and signatures are derived with SHA-256 from the account and input,
/// so equal inputs give equal outputs. They are not valid Google credentials.
#[derive(Clone, Default)]
pub struct InMemoryCredentials {
    recorder: Arc<Recorder>,
    accounts: Arc<RwLock<HashSet<String>>>,
}

impl std::fmt::Debug for InMemoryCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryCredentials").finish_non_exhaustive()
    }
}

impl InMemoryCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict the fake to known accounts; others get `NOT_FOUND`.
    /// With no accounts registered every account is accepted.
    pub async fn add_service_account(&self, email: impl Into<String>) {
        self.accounts.write().await.insert(email.into());
    }

    pub fn with_latency(self, latency: Duration) -> Self {
        self.recorder.set_latency(latency);
        self
    }

    pub async fn fail_next(&self, method: &'static str, status: Status) {
        self.recorder.fail_next(method, status).await;
    }

    pub async fn calls(&self) -> Vec<RecordedCall> {
        self.recorder.calls().await
    }

    pub async fn call_count(&self, method: &str) -> usize {
        self.recorder.call_count(method).await
    }

    pub async fn last_call(&self, method: &str) -> Option<RecordedCall> {
        self.recorder.last_call(method).await
    }

    /// Key id the fake signs with for `account`.
    pub fn key_id(account: &str) -> String {
        let digest = hex::encode(Sha256::digest(account.as_bytes()));
        digest[..40].to_string()
    }

    /// Signature the fake produces for `payload` signed by `account`.
    pub fn signature(account: &str, payload: &[u8]) -> Vec<u8> {
        let mut hasher = Sha256::new();
        hasher.update(Self::key_id(account).as_bytes());
        hasher.update(payload);
        hasher.finalize().to_vec()
    }

    async fn account<'a>(&self, name: &'a str) -> Result<&'a str, Status> {
        let account = resource::parse_service_account_path(name).map_err(invalid)?;
        let accounts = self.accounts.read().await;
        if !accounts.is_empty() && !accounts.contains(account) {
            return Err(Status::not_found(format!("service account {} not found", account)));
        }
        Ok(account)
    }
}

fn jwt(account: &str, claims: &str) -> String {
    let header = format!(
        r#"{{"alg":"RS256","kid":"{}","typ":"JWT"}}"#,
        InMemoryCredentials::key_id(account)
    );
    let signing_input = format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(header),
        URL_SAFE_NO_PAD.encode(claims)
    );
    let signature = InMemoryCredentials::signature(account, signing_input.as_bytes());
    format!("{}.{}", signing_input, URL_SAFE_NO_PAD.encode(signature))
}

#[async_trait]
impl IamCredentialsTransport for InMemoryCredentials {
    async fn generate_access_token(
        &self,
        request: Request<credentials::GenerateAccessTokenRequest>,
    ) -> Result<credentials::GenerateAccessTokenResponse, Status> {
        let metadata = ascii_metadata(request.metadata());
        self.recorder.begin("GenerateAccessToken", metadata).await?;
        let request = request.into_inner();

        let account = self.account(&request.name).await?;
        if request.scope.is_empty() {
            return Err(Status::invalid_argument("scope must not be empty"));
        }
        let lifetime = match &request.lifetime {
            Some(d) if d.seconds < 0 || d.nanos < 0 => {
                return Err(Status::invalid_argument("lifetime must be positive"))
            }
            Some(d) => Duration::new(d.seconds.unsigned_abs(), d.nanos.unsigned_abs()),
            None => DEFAULT_TOKEN_LIFETIME,
        };
        if lifetime > MAX_TOKEN_LIFETIME {
            return Err(Status::new(
                Code::InvalidArgument,
                format!("lifetime {:?} exceeds {:?}", lifetime, MAX_TOKEN_LIFETIME),
            ));
        }
        let lifetime = chrono::Duration::from_std(lifetime)
            .map_err(|e| Status::invalid_argument(e.to_string()))?;

        let mut hasher = Sha256::new();
        hasher.update(account.as_bytes());
        for scope in &request.scope {
            hasher.update(b"\n");
            hasher.update(scope.as_bytes());
        }
        Ok(credentials::GenerateAccessTokenResponse {
            access_token: format!("ya29.fake-{}", hex::encode(hasher.finalize())),
            expire_time: Some(datetime_to_timestamp(chrono::Utc::now() + lifetime)),
        })
    }

    async fn generate_id_token(
        &self,
        request: Request<credentials::GenerateIdTokenRequest>,
    ) -> Result<credentials::GenerateIdTokenResponse, Status> {
        let metadata = ascii_metadata(request.metadata());
        self.recorder.begin("GenerateIdToken", metadata).await?;
        let request = request.into_inner();

        let account = self.account(&request.name).await?;
        if request.audience.is_empty() {
            return Err(Status::invalid_argument("audience must not be empty"));
        }
        let email = if request.include_email {
            format!(r#","email":"{}","email_verified":true"#, account)
        } else {
            String::new()
        };
        let claims = format!(
            r#"{{"aud":"{}","sub":"{}"{}}}"#,
            request.audience,
            Self::key_id(account),
            email
        );
        Ok(credentials::GenerateIdTokenResponse {
            token: jwt(account, &claims),
        })
    }

    async fn sign_blob(
        &self,
        request: Request<credentials::SignBlobRequest>,
    ) -> Result<credentials::SignBlobResponse, Status> {
        let metadata = ascii_metadata(request.metadata());
        self.recorder.begin("SignBlob", metadata).await?;
        let request = request.into_inner();

        let account = self.account(&request.name).await?;
        Ok(credentials::SignBlobResponse {
            key_id: Self::key_id(account),
            signed_blob: Self::signature(account, &request.payload),
        })
    }

    async fn sign_jwt(
        &self,
        request: Request<credentials::SignJwtRequest>,
    ) -> Result<credentials::SignJwtResponse, Status> {
        let metadata = ascii_metadata(request.metadata());
        self.recorder.begin("SignJwt", metadata).await?;
        let request = request.into_inner();

        let account = self.account(&request.name).await?;
        if request.payload.is_empty() {
            return Err(Status::invalid_argument("payload must not be empty"));
        }
        Ok(credentials::SignJwtResponse {
            key_id: Self::key_id(account),
            signed_jwt: jwt(account, &request.payload),
        })
    }
}
