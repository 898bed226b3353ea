//! Mesh inventory
//!
//! Builds composite views of the workloads in a namespace and annotates service dependency graphs
//! with the mesh traffic policies that apply to them.
//!
//! - [`Inventory`] fans out independent lookups against a [`ClusterClient`] and joins their
//!   results in a fixed order, so that when several lookups fail the error reported is
//!   deterministic. A service's detail view narrows the namespace's deployments to those owning
//!   the service's pods.
//! - [`graph::PolicyAnnotator`] fetches a namespace's [`PolicyBundle`] once and walks each
//!   service tree, flagging nodes subject to circuit breakers and route rules.
//!
//! ```text
//! [ Service ] -> [ Pod ] -> [ ReplicaSet ] -> [ Deployment ] <- [ HorizontalPodAutoscaler ]
//! ```

#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

mod client;
pub mod deployments;
mod error;
pub mod graph;
mod inventory;
pub mod istio;
mod labels;
pub mod lookup;
mod views;


pub use self::{
    client::{ClusterClient, PolicyBundle, PolicySource},
    error::{Error, Result},
    inventory::Inventory,
    labels::{LabelConfig, DEFAULT_SERVICE_LABEL, DEFAULT_VERSION_LABEL},
    views::{NamespaceServiceView, ServiceDetailView},
};
