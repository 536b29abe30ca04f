//! Implicit routing header (`x-goog-request-params`).
//!
//! The header carries the request fields that identify the target resource so
//! the frontend can route the call without decoding the message body.

use crate::proto::{credentials, iam, longrunning};
use tonic::metadata::MetadataValue;
use tracing::debug;

/// gRPC metadata key for the routing header.
pub const ROUTING_HEADER: &str = "x-goog-request-params";

/// Request fields that make up a message's routing header.
pub trait RoutingKey {
    /// `(field path, value)` pairs in header order.
    fn routing_fields(&self) -> Vec<(&'static str, &str)>;
}

/// Encode pairs as `k1=v1&k2=v2`, form-encoding values except for `/`:
/// spaces become `+` and other reserved bytes are percent-encoded.
///
/// Pairs with an empty value are omitted.
pub fn routing_params(pairs: &[(&str, &str)]) -> String {
    pairs
        .iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(key, value)| format!("{}={}", key, encode_value(value)))
        .collect::<Vec<_>>()
        .join("&")
}

fn encode_value(value: &str) -> String {
    value
        .split('/')
        .map(|segment| urlencoding::encode(segment).replace("%20", "+"))
        .collect::<Vec<_>>()
        .join("/")
}

/// Attach the routing header derived from the request message. Never fails.
pub fn attach<M: RoutingKey>(request: &mut tonic::Request<M>) {
    let params = routing_params(&request.get_ref().routing_fields());
    if params.is_empty() {
        return;
    }
    match MetadataValue::try_from(params.as_str()) {
        Ok(value) => {
            request.metadata_mut().insert(ROUTING_HEADER, value);
        }
        Err(e) => debug!(params = %params, error = %e, "Skipping unrepresentable routing header"),
    }
}

impl RoutingKey for iam::ListPoliciesRequest {
    fn routing_fields(&self) -> Vec<(&'static str, &str)> {
        vec![("parent", self.parent.as_str())]
    }
}

impl RoutingKey for iam::GetPolicyRequest {
    fn routing_fields(&self) -> Vec<(&'static str, &str)> {
        vec![("name", self.name.as_str())]
    }
}

impl RoutingKey for iam::CreatePolicyRequest {
    fn routing_fields(&self) -> Vec<(&'static str, &str)> {
        vec![("parent", self.parent.as_str())]
    }
}

impl RoutingKey for iam::UpdatePolicyRequest {
    fn routing_fields(&self) -> Vec<(&'static str, &str)> {
        let name = self.policy.as_ref().map(|p| p.name.as_str()).unwrap_or("");
        vec![("policy.name", name)]
    }
}

impl RoutingKey for iam::DeletePolicyRequest {
    fn routing_fields(&self) -> Vec<(&'static str, &str)> {
        vec![("name", self.name.as_str())]
    }
}

impl RoutingKey for iam::ListApplicablePoliciesRequest {
    fn routing_fields(&self) -> Vec<(&'static str, &str)> {
        vec![("attachment_point", self.attachment_point.as_str())]
    }
}

impl RoutingKey for longrunning::GetOperationRequest {
    fn routing_fields(&self) -> Vec<(&'static str, &str)> {
        vec![("name", self.name.as_str())]
    }
}

macro_rules! routed_by_name {
    ($($ty:ty),* $(,)?) => {
        $(
            impl RoutingKey for $ty {
                fn routing_fields(&self) -> Vec<(&'static str, &str)> {
                    vec![("name", self.name.as_str())]
                }
            }
        )*
    };
}

routed_by_name!(
    credentials::GenerateAccessTokenRequest,
    credentials::GenerateIdTokenRequest,
    credentials::SignBlobRequest,
    credentials::SignJwtRequest,
);
