use crate::Result;
use mesh_inventory_k8s_api::{
    self as k8s,
    istio::{DestinationPolicy, DestinationRule, RouteRule, VirtualService},
};

/// Typed lookups against the cluster API.
///
/// Implementations are shared by concurrently running lookups, so they must be cheap to clone and
/// safe to use from several tasks at once. Timeouts, retries and connection management are the
/// implementation's concern.
#[async_trait::async_trait]
pub trait ClusterClient: Clone + Send + Sync + 'static {
    async fn namespaces(&self) -> Result<Vec<k8s::Namespace>>;

    async fn services(&self, namespace: &str) -> Result<Vec<k8s::Service>>;

    /// Fails with [`crate::Error::NotFound`] when the service does not exist.
    async fn service(&self, namespace: &str, name: &str) -> Result<k8s::Service>;

    async fn pods(&self, namespace: &str, selector: &k8s::Selector) -> Result<Vec<k8s::Pod>>;

    async fn deployments(&self, namespace: &str) -> Result<Vec<k8s::Deployment>>;

    async fn endpoints(&self, namespace: &str, name: &str) -> Result<k8s::Endpoints>;

    async fn autoscalers(&self, namespace: &str) -> Result<Vec<k8s::HorizontalPodAutoscaler>>;
}

/// Fetches the mesh policies that apply within a namespace.
#[async_trait::async_trait]
pub trait PolicySource {
    async fn policy_bundle(&self, namespace: &str) -> Result<PolicyBundle>;
}

/// All mesh traffic policies declared in a namespace.
#[derive(Clone, Debug, Default)]
pub struct PolicyBundle {
    pub destination_policies: Vec<DestinationPolicy>,
    pub destination_rules: Vec<DestinationRule>,
    pub route_rules: Vec<RouteRule>,
    pub virtual_services: Vec<VirtualService>,
}
