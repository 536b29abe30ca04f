//! Transport seam between the clients and the wire.
//!
//! The clients only see these traits, so tests and emulators can swap the
//! gRPC implementation for an in-memory one (see [`crate::mock`]).
//! Implementations are chosen by name from a static registry.

pub mod grpc;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::BoxFuture;
use tonic::{Request, Status};

use crate::error::{ClientError, Result};
use crate::proto::{credentials, iam, longrunning};

/// The `google.iam.v2.Policies` service.
#[async_trait]
pub trait PoliciesTransport: Send + Sync {
    async fn list_policies(
        &self,
        request: Request<iam::ListPoliciesRequest>,
    ) -> std::result::Result<iam::ListPoliciesResponse, Status>;

    async fn get_policy(
        &self,
        request: Request<iam::GetPolicyRequest>,
    ) -> std::result::Result<iam::Policy, Status>;

    async fn create_policy(
        &self,
        request: Request<iam::CreatePolicyRequest>,
    ) -> std::result::Result<longrunning::Operation, Status>;

    async fn update_policy(
        &self,
        request: Request<iam::UpdatePolicyRequest>,
    ) -> std::result::Result<longrunning::Operation, Status>;

    async fn delete_policy(
        &self,
        request: Request<iam::DeletePolicyRequest>,
    ) -> std::result::Result<longrunning::Operation, Status>;

    async fn list_applicable_policies(
        &self,
        request: Request<iam::ListApplicablePoliciesRequest>,
    ) -> std::result::Result<iam::ListApplicablePoliciesResponse, Status>;

    /// The operations service reachable over the same connection.
    fn operations(&self) -> Arc<dyn OperationsTransport>;
}

/// The `google.longrunning.Operations` service (only `GetOperation` is used).
#[async_trait]
pub trait OperationsTransport: Send + Sync {
    async fn get_operation(
        &self,
        request: Request<longrunning::GetOperationRequest>,
    ) -> std::result::Result<longrunning::Operation, Status>;
}

/// The `google.iam.credentials.v1.IAMCredentials` service.
#[async_trait]
pub trait IamCredentialsTransport: Send + Sync {
    async fn generate_access_token(
        &self,
        request: Request<credentials::GenerateAccessTokenRequest>,
    ) -> std::result::Result<credentials::GenerateAccessTokenResponse, Status>;

    async fn generate_id_token(
        &self,
        request: Request<credentials::GenerateIdTokenRequest>,
    ) -> std::result::Result<credentials::GenerateIdTokenResponse, Status>;

    async fn sign_blob(
        &self,
        request: Request<credentials::SignBlobRequest>,
    ) -> std::result::Result<credentials::SignBlobResponse, Status>;

    async fn sign_jwt(
        &self,
        request: Request<credentials::SignJwtRequest>,
    ) -> std::result::Result<credentials::SignJwtResponse, Status>;
}

/// Client certificate and key, PEM encoded, for mutual TLS.
#[derive(Clone)]
pub struct ClientIdentity {
    pub cert_pem: Vec<u8>,
    pub key_pem: Vec<u8>,
}

impl std::fmt::Debug for ClientIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientIdentity").finish_non_exhaustive()
    }
}

/// Everything a factory needs to open a connection.
#[derive(Debug, Clone)]
pub struct ChannelSettings {
    /// `https://host:port`, `http://host:port` or `unix:///path`.
    pub uri: String,
    pub identity: Option<ClientIdentity>,
    pub connect_timeout: Option<Duration>,
    pub user_agent: Option<String>,
}

impl ChannelSettings {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            identity: None,
            connect_timeout: None,
            user_agent: None,
        }
    }
}

/// Transports built by a factory over one connection.
#[derive(Clone)]
pub struct Transports {
    pub policies: Arc<dyn PoliciesTransport>,
    pub credentials: Arc<dyn IamCredentialsTransport>,
}

/// Opens a connection described by [`ChannelSettings`].
pub type TransportFactory = fn(ChannelSettings) -> BoxFuture<'static, Result<Transports>>;

/// Transport used when the configuration names none.
pub const DEFAULT_TRANSPORT: &str = "grpc";

const REGISTRY: &[(&str, TransportFactory)] = &[
    ("grpc", grpc::connect_eager),
    ("grpc-lazy", grpc::connect_lazy),
];

/// Look up a transport factory by name.
pub fn transport_factory(name: &str) -> Result<TransportFactory> {
    REGISTRY
        .iter()
        .find(|(registered, _)| *registered == name)
        .map(|(_, factory)| *factory)
        .ok_or_else(|| {
            ClientError::Config(format!(
                "unknown transport '{}', expected one of: {}",
                name,
                transport_names().collect::<Vec<_>>().join(", ")
            ))
        })
}

/// Names accepted by [`transport_factory`].
pub fn transport_names() -> impl Iterator<Item = &'static str> {
    REGISTRY.iter().map(|(name, _)| *name)
}
