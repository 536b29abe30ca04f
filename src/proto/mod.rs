//! Protobuf message model for the IAM v2 Policies, IAM Credentials and
//! long-running operations services.
//!
//! The message modules are checked in rather than generated at build time so
//! the crate builds without `protoc`. Field numbers follow the published
//! `google/iam/v2/policy.proto`, `google/iam/credentials/v1/common.proto` and
//! `google/longrunning/operations.proto` definitions.

pub mod google {
    pub mod iam {
        pub mod v2 {
            include!("google.iam.v2.rs");
        }
        pub mod credentials {
            pub mod v1 {
                include!("google.iam.credentials.v1.rs");
            }
        }
    }
    pub mod longrunning {
        include!("google.longrunning.rs");
    }
    pub mod rpc {
        include!("google.rpc.rs");
    }
    pub mod r#type {
        include!("google.type.rs");
    }
}

pub use google::iam::credentials::v1 as credentials;
pub use google::iam::v2 as iam;
pub use google::longrunning;
pub use google::r#type::Expr;
pub use google::rpc::Status as RpcStatus;

pub use iam::{
    policy_rule, CreatePolicyRequest, DeletePolicyRequest, DenyRule, GetPolicyRequest,
    ListApplicablePoliciesRequest, ListApplicablePoliciesResponse, ListPoliciesRequest,
    ListPoliciesResponse, Policy, PolicyOperationMetadata, PolicyRule, UpdatePolicyRequest,
};

/// The `kind` value the service reports for deny policies.
pub const DENY_POLICY_KIND: &str = "DenyPolicy";
