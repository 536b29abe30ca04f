//! Service clients for IAM v2 Policies and IAM Credentials.
//!
//! Both clients are cheap to clone and share their underlying transport, so
//! one client can serve many concurrent calls.

use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use tonic::metadata::{MetadataKey, MetadataValue};
use tonic::Status;
use tracing::{debug, info};

use crate::auth::{self, CredentialsProvider, NoCredentials};
use crate::builder::{
    Call, CreatePolicyCall, DeletePolicyCall, GenerateAccessTokenCall, GenerateIdTokenCall,
    GetPolicyCall, ListApplicablePoliciesCall, ListPoliciesCall, PolicyOperation, SignBlobCall,
    SignJwtCall, UpdatePolicyCall,
};
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::operation::{Operation, OperationFetcher, PollingPolicy};
use crate::options::{CallOptions, CallSettings, MethodDefaults};
use crate::pager::{ListApplicablePoliciesPager, ListPoliciesPager, PageFetcher, Pager};
use crate::proto::{credentials, iam, longrunning, Policy};
use crate::resource;
use crate::retry;
use crate::routing::{self, RoutingKey};
use crate::transport::{
    transport_factory, IamCredentialsTransport, OperationsTransport, PoliciesTransport,
};

/// Value of the `x-goog-api-client` header.
pub const API_CLIENT_HEADER: &str = concat!("gl-rust gccl/", env!("CARGO_PKG_VERSION"));

/// Headers attached to every call, independent of the method.
#[derive(Clone)]
struct CallContext {
    credentials: Arc<dyn CredentialsProvider>,
    quota_project_id: Option<String>,
    api_key: Option<String>,
}

impl Default for CallContext {
    fn default() -> Self {
        Self {
            credentials: Arc::new(NoCredentials),
            quota_project_id: None,
            api_key: None,
        }
    }
}

impl CallContext {
    fn from_config(config: &ClientConfig) -> Result<Self> {
        Ok(Self {
            credentials: auth::from_config(config)?,
            quota_project_id: config.quota_project_id.clone(),
            api_key: config.api_key.clone(),
        })
    }

    async fn prepare<M: RoutingKey>(
        &self,
        message: M,
        settings: &CallSettings,
    ) -> Result<tonic::Request<M>> {
        let mut request = tonic::Request::new(message);
        routing::attach(&mut request);
        request.set_timeout(settings.timeout);

        let metadata = request.metadata_mut();
        metadata.insert("x-goog-api-client", MetadataValue::from_static(API_CLIENT_HEADER));
        if let Some(project) = &self.quota_project_id {
            metadata.insert("x-goog-user-project", ascii_value(project)?);
        }
        if let Some(key) = &self.api_key {
            metadata.insert("x-goog-api-key", ascii_value(key)?);
        }
        if let Some(token) = self.credentials.token().await? {
            metadata.insert("authorization", ascii_value(&format!("Bearer {}", token))?);
        }
        for (key, value) in &settings.metadata {
            let key = MetadataKey::from_bytes(key.as_bytes())
                .map_err(|e| ClientError::InvalidArgument(format!("metadata key '{}': {}", key, e)))?;
            metadata.insert(key, ascii_value(value)?);
        }
        Ok(request)
    }
}

fn ascii_value(value: &str) -> Result<MetadataValue<tonic::metadata::Ascii>> {
    MetadataValue::try_from(value)
        .map_err(|e| ClientError::InvalidArgument(format!("metadata value: {}", e)))
}

/// Send one unary call with headers, per-attempt timeout and retry.
async fn invoke<Req, Resp, F, Fut>(
    context: &CallContext,
    method: &'static str,
    message: Req,
    settings: &CallSettings,
    call: F,
) -> Result<Resp>
where
    Req: RoutingKey + Clone,
    F: Fn(tonic::Request<Req>) -> Fut,
    Fut: Future<Output = std::result::Result<Resp, Status>>,
{
    debug!(
        method,
        routing = %routing::routing_params(&message.routing_fields()),
        "Calling"
    );
    let (message, call) = (&message, &call);
    retry::execute(&settings.retry, method, || async move {
        let request = context.prepare(message.clone(), settings).await?;
        match tokio::time::timeout(settings.timeout, call(request)).await {
            Ok(result) => result.map_err(ClientError::from),
            Err(_) => Err(Status::deadline_exceeded(format!(
                "{} did not complete within {:?}",
                method, settings.timeout
            ))
            .into()),
        }
    })
    .await
}

/// Client for `google.iam.v2.Policies`.
#[derive(Clone)]
pub struct PoliciesClient {
    transport: Arc<dyn PoliciesTransport>,
    operations: Arc<dyn OperationsTransport>,
    context: Arc<CallContext>,
    read_defaults: MethodDefaults,
    mutation_defaults: MethodDefaults,
    polling: PollingPolicy,
}

impl std::fmt::Debug for PoliciesClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoliciesClient")
            .field("read_defaults", &self.read_defaults)
            .field("mutation_defaults", &self.mutation_defaults)
            .field("polling", &self.polling)
            .finish_non_exhaustive()
    }
}

impl PoliciesClient {
    /// Connect using the transport named in `config`.
    pub async fn connect(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        let factory = transport_factory(&config.transport)?;
        let uri = config.policies_endpoint()?;
        info!(endpoint = %uri, transport = %config.transport, "Connecting to IAM Policies");
        let transports = factory(config.channel_settings(uri).await?).await?;
        Self::from_transport(transports.policies).with_config(config)
    }

    /// Connect with configuration loaded from file and environment.
    pub async fn connect_default() -> Result<Self> {
        let config = ClientConfig::load(None)?;
        Self::connect(&config).await
    }

    /// Create a client over an existing transport, with default settings.
    pub fn from_transport(transport: Arc<dyn PoliciesTransport>) -> Self {
        Self {
            operations: transport.operations(),
            transport,
            context: Arc::new(CallContext::default()),
            read_defaults: MethodDefaults::idempotent(),
            mutation_defaults: MethodDefaults::mutation(),
            polling: PollingPolicy::default(),
        }
    }

    /// Apply credentials, quota project and timeouts from `config`.
    pub fn with_config(mut self, config: &ClientConfig) -> Result<Self> {
        self.context = Arc::new(CallContext::from_config(config)?);
        if let Some(timeout) = config.request_timeout() {
            self.read_defaults = self.read_defaults.with_timeout(timeout);
            self.mutation_defaults = self.mutation_defaults.with_timeout(timeout);
        }
        Ok(self)
    }

    pub fn with_credentials(mut self, credentials: Arc<dyn CredentialsProvider>) -> Self {
        let mut context = (*self.context).clone();
        context.credentials = credentials;
        self.context = Arc::new(context);
        self
    }

    /// Polling policy for operations returned by this client.
    pub fn with_polling(mut self, polling: PollingPolicy) -> Self {
        self.polling = polling;
        self
    }

    /// Defaults for read-only methods and for mutations.
    pub fn with_defaults(mut self, read: MethodDefaults, mutation: MethodDefaults) -> Self {
        self.read_defaults = read;
        self.mutation_defaults = mutation;
        self
    }

    /// Lists the deny policies attached to a resource.
    pub fn list_policies(&self) -> ListPoliciesCall<'_> {
        Call::new(self, "ListPolicies")
    }

    /// Gets a deny policy.
    pub fn get_policy(&self) -> GetPolicyCall<'_> {
        Call::new(self, "GetPolicy")
    }

    /// Creates a deny policy.
    pub fn create_policy(&self) -> CreatePolicyCall<'_> {
        Call::new(self, "CreatePolicy")
    }

    /// Replaces a deny policy, guarded by its etag.
    pub fn update_policy(&self) -> UpdatePolicyCall<'_> {
        Call::new(self, "UpdatePolicy")
    }

    /// Deletes a deny policy.
    pub fn delete_policy(&self) -> DeletePolicyCall<'_> {
        Call::new(self, "DeletePolicy")
    }

    /// Lists the policies that apply to a resource, walking up the hierarchy.
    pub fn list_applicable_policies(&self) -> ListApplicablePoliciesCall<'_> {
        Call::new(self, "ListApplicablePolicies")
    }

    /// Fetch the raw state of a long-running operation.
    pub async fn get_operation(&self, name: impl Into<String>) -> Result<longrunning::Operation> {
        let request = longrunning::GetOperationRequest { name: name.into() };
        self.get_operation_with(request, CallOptions::default()).await
    }

    /// Handle on an operation started earlier, e.g. by another process.
    pub fn resume_operation(&self, name: impl Into<String>) -> PolicyOperation {
        let pending = longrunning::Operation {
            name: name.into(),
            ..Default::default()
        };
        self.wrap_operation(pending)
    }

    pub(crate) async fn list_policies_with(
        &self,
        request: iam::ListPoliciesRequest,
        options: CallOptions,
    ) -> Result<ListPoliciesPager> {
        resource::parse_policy_parent(&request.parent)?;
        let settings = options.resolve(&self.read_defaults);
        let client = self.clone();
        let fetch: PageFetcher<iam::ListPoliciesRequest, iam::ListPoliciesResponse> =
            Arc::new(move |request| {
                let client = client.clone();
                let settings = settings.clone();
                async move {
                    invoke(&client.context, "ListPolicies", request, &settings, |req| {
                        client.transport.list_policies(req)
                    })
                    .await
                }
                .boxed()
            });
        Pager::start("ListPolicies", request, fetch).await
    }

    pub(crate) async fn get_policy_with(
        &self,
        request: iam::GetPolicyRequest,
        options: CallOptions,
    ) -> Result<Policy> {
        resource::parse_policy_path(&request.name)?;
        let settings = options.resolve(&self.read_defaults);
        invoke(&self.context, "GetPolicy", request, &settings, |req| {
            self.transport.get_policy(req)
        })
        .await
    }

    pub(crate) async fn create_policy_with(
        &self,
        request: iam::CreatePolicyRequest,
        options: CallOptions,
    ) -> Result<PolicyOperation> {
        resource::parse_policy_parent(&request.parent)?;
        if !request.policy_id.is_empty() {
            resource::validate_policy_id(&request.policy_id)?;
        }
        let settings = options.resolve(&self.mutation_defaults);
        let operation = invoke(&self.context, "CreatePolicy", request, &settings, |req| {
            self.transport.create_policy(req)
        })
        .await?;
        Ok(self.wrap_operation(operation))
    }

    pub(crate) async fn update_policy_with(
        &self,
        request: iam::UpdatePolicyRequest,
        options: CallOptions,
    ) -> Result<PolicyOperation> {
        let policy = request
            .policy
            .as_ref()
            .ok_or_else(|| ClientError::InvalidArgument("UpdatePolicy: policy is required".to_string()))?;
        resource::parse_policy_path(&policy.name)?;
        let settings = options.resolve(&self.mutation_defaults);
        let operation = invoke(&self.context, "UpdatePolicy", request, &settings, |req| {
            self.transport.update_policy(req)
        })
        .await?;
        Ok(self.wrap_operation(operation))
    }

    pub(crate) async fn delete_policy_with(
        &self,
        request: iam::DeletePolicyRequest,
        options: CallOptions,
    ) -> Result<PolicyOperation> {
        resource::parse_policy_path(&request.name)?;
        let settings = options.resolve(&self.mutation_defaults);
        let operation = invoke(&self.context, "DeletePolicy", request, &settings, |req| {
            self.transport.delete_policy(req)
        })
        .await?;
        Ok(self.wrap_operation(operation))
    }

    pub(crate) async fn list_applicable_policies_with(
        &self,
        request: iam::ListApplicablePoliciesRequest,
        options: CallOptions,
    ) -> Result<ListApplicablePoliciesPager> {
        resource::validate_attachment_point(&request.attachment_point)?;
        let settings = options.resolve(&self.read_defaults);
        let client = self.clone();
        let fetch: PageFetcher<
            iam::ListApplicablePoliciesRequest,
            iam::ListApplicablePoliciesResponse,
        > = Arc::new(move |request| {
            let client = client.clone();
            let settings = settings.clone();
            async move {
                invoke(
                    &client.context,
                    "ListApplicablePolicies",
                    request,
                    &settings,
                    |req| client.transport.list_applicable_policies(req),
                )
                .await
            }
            .boxed()
        });
        Pager::start("ListApplicablePolicies", request, fetch).await
    }

    async fn get_operation_with(
        &self,
        request: longrunning::GetOperationRequest,
        options: CallOptions,
    ) -> Result<longrunning::Operation> {
        let settings = options.resolve(&self.read_defaults);
        invoke(&self.context, "GetOperation", request, &settings, |req| {
            self.operations.get_operation(req)
        })
        .await
    }

    fn wrap_operation(&self, operation: longrunning::Operation) -> PolicyOperation {
        debug!(operation = %operation.name, done = operation.done, "Started operation");
        let client = self.clone();
        let fetch: OperationFetcher = Arc::new(move |request| {
            let client = client.clone();
            async move { client.get_operation_with(request, CallOptions::default()).await }.boxed()
        });
        Operation::with_polling(operation, fetch, self.polling.clone())
    }
}

/// Client for `google.iam.credentials.v1.IAMCredentials`.
#[derive(Clone)]
pub struct IamCredentialsClient {
    transport: Arc<dyn IamCredentialsTransport>,
    context: Arc<CallContext>,
    defaults: MethodDefaults,
}

impl std::fmt::Debug for IamCredentialsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IamCredentialsClient")
            .field("defaults", &self.defaults)
            .finish_non_exhaustive()
    }
}

impl IamCredentialsClient {
    /// Connect using the transport named in `config`.
    pub async fn connect(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        let factory = transport_factory(&config.transport)?;
        let uri = config.credentials_endpoint()?;
        info!(endpoint = %uri, transport = %config.transport, "Connecting to IAM Credentials");
        let transports = factory(config.channel_settings(uri).await?).await?;
        Self::from_transport(transports.credentials).with_config(config)
    }

    /// Connect with configuration loaded from file and environment.
    pub async fn connect_default() -> Result<Self> {
        let config = ClientConfig::load(None)?;
        Self::connect(&config).await
    }

    /// Create a client over an existing transport, with default settings.
    pub fn from_transport(transport: Arc<dyn IamCredentialsTransport>) -> Self {
        Self {
            transport,
            context: Arc::new(CallContext::default()),
            defaults: MethodDefaults::idempotent(),
        }
    }

    /// Apply credentials, quota project and timeouts from `config`.
    pub fn with_config(mut self, config: &ClientConfig) -> Result<Self> {
        self.context = Arc::new(CallContext::from_config(config)?);
        if let Some(timeout) = config.request_timeout() {
            self.defaults = self.defaults.with_timeout(timeout);
        }
        Ok(self)
    }

    pub fn with_credentials(mut self, credentials: Arc<dyn CredentialsProvider>) -> Self {
        let mut context = (*self.context).clone();
        context.credentials = credentials;
        self.context = Arc::new(context);
        self
    }

    pub fn with_defaults(mut self, defaults: MethodDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Generates an OAuth 2.0 access token for a service account.
    pub fn generate_access_token(&self) -> GenerateAccessTokenCall<'_> {
        Call::new(self, "GenerateAccessToken")
    }

    /// Generates an OpenID Connect ID token for a service account.
    pub fn generate_id_token(&self) -> GenerateIdTokenCall<'_> {
        Call::new(self, "GenerateIdToken")
    }

    /// Signs a blob using a service account's system-managed private key.
    pub fn sign_blob(&self) -> SignBlobCall<'_> {
        Call::new(self, "SignBlob")
    }

    /// Signs a JWT using a service account's system-managed private key.
    pub fn sign_jwt(&self) -> SignJwtCall<'_> {
        Call::new(self, "SignJwt")
    }

    pub(crate) async fn generate_access_token_with(
        &self,
        request: credentials::GenerateAccessTokenRequest,
        options: CallOptions,
    ) -> Result<credentials::GenerateAccessTokenResponse> {
        resource::parse_service_account_path(&request.name)?;
        let settings = options.resolve(&self.defaults);
        invoke(&self.context, "GenerateAccessToken", request, &settings, |req| {
            self.transport.generate_access_token(req)
        })
        .await
    }

    pub(crate) async fn generate_id_token_with(
        &self,
        request: credentials::GenerateIdTokenRequest,
        options: CallOptions,
    ) -> Result<credentials::GenerateIdTokenResponse> {
        resource::parse_service_account_path(&request.name)?;
        let settings = options.resolve(&self.defaults);
        invoke(&self.context, "GenerateIdToken", request, &settings, |req| {
            self.transport.generate_id_token(req)
        })
        .await
    }

    pub(crate) async fn sign_blob_with(
        &self,
        request: credentials::SignBlobRequest,
        options: CallOptions,
    ) -> Result<credentials::SignBlobResponse> {
        resource::parse_service_account_path(&request.name)?;
        let settings = options.resolve(&self.defaults);
        invoke(&self.context, "SignBlob", request, &settings, |req| {
            self.transport.sign_blob(req)
        })
        .await
    }

    pub(crate) async fn sign_jwt_with(
        &self,
        request: credentials::SignJwtRequest,
        options: CallOptions,
    ) -> Result<credentials::SignJwtResponse> {
        resource::parse_service_account_path(&request.name)?;
        let settings = options.resolve(&self.defaults);
        invoke(&self.context, "SignJwt", request, &settings, |req| {
            self.transport.sign_jwt(req)
        })
        .await
    }
}
