//! In-memory subresource client for testing controllers and operators.
//!
//! Based on the fake subresource client used with controller-runtime in the Go ecosystem.
//! Owner objects are stored whole, keyed by namespace and name, so status or scale views
//! can be read back, replaced, and merge patched without an API server.
//!
//! # Examples
//!
//! ```rust
//! use kube_fake_subresource::FakeSubresourceClient;
//! use k8s_openapi::api::apps::v1::{Deployment, DeploymentStatus};
//! use kube::api::{PatchParams, PostParams};
//! use serde_json::json;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = FakeSubresourceClient::new();
//!
//! let mut deployment = Deployment::default();
//! deployment.metadata.name = Some("web".to_string());
//! deployment.metadata.namespace = Some("default".to_string());
//!
//! client.create(&deployment, &DeploymentStatus::default(), &PostParams::default())?;
//! client.patch(
//!     &mut deployment,
//!     &json!({ "status": { "readyReplicas": 2 } }),
//!     &PatchParams::default(),
//! )?;
//!
//! let mut current = Deployment::default();
//! client.get(&deployment, &mut current)?;
//! assert_eq!(current.status.unwrap().ready_replicas, Some(2));
//! # Ok(())
//! # }
//! ```

mod builder;
mod client;
mod error;
pub mod interceptor;
mod key;
pub mod patch;


pub use builder::ClientBuilder;
pub use client::FakeSubresourceClient;
pub use error::{Error, Result};
pub use key::ObjectKey;
pub use patch::{MergeFrom, PatchData};
