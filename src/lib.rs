//! Async gRPC client for the IAM v2 Policies (deny policies) and IAM
//! Credentials APIs.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use gcloud_iam::{resource, ClientConfig, PoliciesClient};
//!
//! async fn example() -> gcloud_iam::Result<()> {
//!     let client = PoliciesClient::connect(&ClientConfig::load(None)?).await?;
//!
//!     let attachment_point = resource::project_attachment_point("my-project");
//!     let mut policies = client
//!         .list_policies()
//!         .parent(resource::policy_parent(&attachment_point))
//!         .send()
//!         .await?;
//!     while let Some(policy) = policies.next().await? {
//!         println!("{}", policy.name);
//!     }
//!
//!     let deleted = client
//!         .delete_policy()
//!         .name(resource::policy_path(&attachment_point, "deny-1"))
//!         .send()
//!         .await?
//!         .wait_default()
//!         .await?;
//!     println!("deleted at {:?}", deleted.delete_time);
//!     Ok(())
//! }
//! ```
//!
//! # Testing
//!
//! [`mock::InMemoryPolicies`] and [`mock::InMemoryCredentials`] implement the
//! transport traits, so a client built with `from_transport` runs entirely in
//! memory:
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use gcloud_iam::{mock::InMemoryPolicies, PoliciesClient};
//!
//! let client = PoliciesClient::from_transport(Arc::new(InMemoryPolicies::new()));
//! ```

pub mod auth;
pub mod bootstrap;
pub mod builder;
pub mod client;
pub mod config;
pub mod convert;
pub mod error;
pub mod mock;
pub mod operation;
pub mod options;
pub mod pager;
pub mod proto;
pub mod proto_ext;
pub mod resource;
pub mod retry;
pub mod routing;
pub mod transport;

// Re-export main types at crate root
pub use client::{IamCredentialsClient, PoliciesClient};
pub use config::ClientConfig;
pub use error::{ClientError, ErrorCategory, OperationError, Result};

pub use auth::{CredentialsProvider, NoCredentials, StaticToken};
pub use builder::{Call, PolicyOperation, RequestSource};
pub use operation::{Operation, OperationState, PollingPolicy};
pub use options::{CallOptions, MethodDefaults};
pub use pager::{ListApplicablePoliciesPager, ListPoliciesPager, Pager};
pub use retry::RetryPolicy;

// Re-export extension traits
pub use proto_ext::{PolicyExt, PolicyRuleExt};
