//! gRPC transport over a shared tonic [`Channel`].

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::FutureExt;
use http::uri::PathAndQuery;
use tonic::codec::ProstCodec;
use tonic::transport::{Channel, ClientTlsConfig, Endpoint, Identity, Uri};
use tonic::{Request, Status};
use tracing::debug;

use super::{
    ChannelSettings, IamCredentialsTransport, OperationsTransport, PoliciesTransport, Transports,
};
use crate::error::{ClientError, Result};
use crate::proto::{credentials, iam, longrunning};

const LIST_POLICIES: &str = "/google.iam.v2.Policies/ListPolicies";
const GET_POLICY: &str = "/google.iam.v2.Policies/GetPolicy";
const CREATE_POLICY: &str = "/google.iam.v2.Policies/CreatePolicy";
const UPDATE_POLICY: &str = "/google.iam.v2.Policies/UpdatePolicy";
const DELETE_POLICY: &str = "/google.iam.v2.Policies/DeletePolicy";
const LIST_APPLICABLE_POLICIES: &str = "/google.iam.v2.Policies/ListApplicablePolicies";
const GET_OPERATION: &str = "/google.longrunning.Operations/GetOperation";
const GENERATE_ACCESS_TOKEN: &str = "/google.iam.credentials.v1.IAMCredentials/GenerateAccessToken";
const GENERATE_ID_TOKEN: &str = "/google.iam.credentials.v1.IAMCredentials/GenerateIdToken";
const SIGN_BLOB: &str = "/google.iam.credentials.v1.IAMCredentials/SignBlob";
const SIGN_JWT: &str = "/google.iam.credentials.v1.IAMCredentials/SignJwt";

/// Create a gRPC channel from the given settings.
///
/// Supports TLS (`https://`), plaintext (`http://`) and Unix Domain Sockets
/// (`unix:///path`). With `lazy` the connection is opened on first use.
pub async fn create_channel(settings: &ChannelSettings, lazy: bool) -> Result<Channel> {
    if let Some(path) = settings.uri.strip_prefix("unix://") {
        // The URI doesn't matter for UDS, but tonic requires a valid one
        let path = path.to_string();
        let endpoint = Endpoint::try_from("http://[::]:50051")
            .map_err(|e| ClientError::Connection(e.to_string()))?;
        let connector = tower::service_fn(move |_: Uri| {
            let path = path.clone();
            async move {
                tokio::net::UnixStream::connect(path)
                    .await
                    .map(hyper_util::rt::TokioIo::new)
            }
        });
        return if lazy {
            Ok(endpoint.connect_with_connector_lazy(connector))
        } else {
            Ok(endpoint.connect_with_connector(connector).await?)
        };
    }

    let endpoint = configure_endpoint(settings)?;
    debug!(uri = %settings.uri, lazy, mtls = settings.identity.is_some(), "Opening channel");
    if lazy {
        Ok(endpoint.connect_lazy())
    } else {
        Ok(endpoint.connect().await?)
    }
}

fn configure_endpoint(settings: &ChannelSettings) -> Result<Endpoint> {
    let mut endpoint = Channel::from_shared(settings.uri.clone())
        .map_err(|e| ClientError::Connection(format!("{}: {}", settings.uri, e)))?;

    if let Some(timeout) = settings.connect_timeout {
        endpoint = endpoint.connect_timeout(timeout);
    }
    if let Some(user_agent) = &settings.user_agent {
        endpoint = endpoint.user_agent(user_agent.as_str())?;
    }

    if settings.uri.starts_with("https://") {
        let mut tls = ClientTlsConfig::new().with_native_roots();
        if let Some(identity) = &settings.identity {
            tls = tls.identity(Identity::from_pem(&identity.cert_pem, &identity.key_pem));
        }
        endpoint = endpoint.tls_config(tls)?;
    } else if settings.identity.is_some() {
        return Err(ClientError::Config(format!(
            "client certificate configured for non-TLS endpoint {}",
            settings.uri
        )));
    }
    Ok(endpoint)
}

/// Registry entry `"grpc"`: connect before returning.
pub fn connect_eager(settings: ChannelSettings) -> BoxFuture<'static, Result<Transports>> {
    async move {
        let channel = create_channel(&settings, false).await?;
        Ok(GrpcTransport::new(channel).into_transports())
    }
    .boxed()
}

/// Registry entry `"grpc-lazy"`: connect on first call.
pub fn connect_lazy(settings: ChannelSettings) -> BoxFuture<'static, Result<Transports>> {
    async move {
        let channel = create_channel(&settings, true).await?;
        Ok(GrpcTransport::new(channel).into_transports())
    }
    .boxed()
}

/// Speaks all three services over one channel.
#[derive(Clone)]
pub struct GrpcTransport {
    channel: Channel,
}

impl GrpcTransport {
    pub fn new(channel: Channel) -> Self {
        Self { channel }
    }

    pub fn into_transports(self) -> Transports {
        let shared = Arc::new(self);
        Transports {
            policies: shared.clone(),
            credentials: shared,
        }
    }

    async fn unary<Req, Resp>(
        &self,
        request: Request<Req>,
        path: &'static str,
    ) -> std::result::Result<Resp, Status>
    where
        Req: prost::Message + Send + Sync + 'static,
        Resp: prost::Message + Default + Send + Sync + 'static,
    {
        let mut grpc = tonic::client::Grpc::new(self.channel.clone());
        grpc.ready()
            .await
            .map_err(|e| Status::unavailable(format!("service was not ready: {}", e)))?;
        let codec = ProstCodec::<Req, Resp>::default();
        let response = grpc
            .unary(request, PathAndQuery::from_static(path), codec)
            .await?;
        Ok(response.into_inner())
    }
}

#[async_trait]
impl PoliciesTransport for GrpcTransport {
    async fn list_policies(
        &self,
        request: Request<iam::ListPoliciesRequest>,
    ) -> std::result::Result<iam::ListPoliciesResponse, Status> {
        self.unary(request, LIST_POLICIES).await
    }

    async fn get_policy(
        &self,
        request: Request<iam::GetPolicyRequest>,
    ) -> std::result::Result<iam::Policy, Status> {
        self.unary(request, GET_POLICY).await
    }

    async fn create_policy(
        &self,
        request: Request<iam::CreatePolicyRequest>,
    ) -> std::result::Result<longrunning::Operation, Status> {
        self.unary(request, CREATE_POLICY).await
    }

    async fn update_policy(
        &self,
        request: Request<iam::UpdatePolicyRequest>,
    ) -> std::result::Result<longrunning::Operation, Status> {
        self.unary(request, UPDATE_POLICY).await
    }

    async fn delete_policy(
        &self,
        request: Request<iam::DeletePolicyRequest>,
    ) -> std::result::Result<longrunning::Operation, Status> {
        self.unary(request, DELETE_POLICY).await
    }

    async fn list_applicable_policies(
        &self,
        request: Request<iam::ListApplicablePoliciesRequest>,
    ) -> std::result::Result<iam::ListApplicablePoliciesResponse, Status> {
        self.unary(request, LIST_APPLICABLE_POLICIES).await
    }

    fn operations(&self) -> Arc<dyn OperationsTransport> {
        Arc::new(self.clone())
    }
}

#[async_trait]
impl OperationsTransport for GrpcTransport {
    async fn get_operation(
        &self,
        request: Request<longrunning::GetOperationRequest>,
    ) -> std::result::Result<longrunning::Operation, Status> {
        self.unary(request, GET_OPERATION).await
    }
}

#[async_trait]
impl IamCredentialsTransport for GrpcTransport {
    async fn generate_access_token(
        &self,
        request: Request<credentials::GenerateAccessTokenRequest>,
    ) -> std::result::Result<credentials::GenerateAccessTokenResponse, Status> {
        self.unary(request, GENERATE_ACCESS_TOKEN).await
    }

    async fn generate_id_token(
        &self,
        request: Request<credentials::GenerateIdTokenRequest>,
    ) -> std::result::Result<credentials::GenerateIdTokenResponse, Status> {
        self.unary(request, GENERATE_ID_TOKEN).await
    }

    async fn sign_blob(
        &self,
        request: Request<credentials::SignBlobRequest>,
    ) -> std::result::Result<credentials::SignBlobResponse, Status> {
        self.unary(request, SIGN_BLOB).await
    }

    async fn sign_jwt(
        &self,
        request: Request<credentials::SignJwtRequest>,
    ) -> std::result::Result<credentials::SignJwtResponse, Status> {
        self.unary(request, SIGN_JWT).await
    }
}
