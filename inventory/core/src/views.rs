use crate::deployments;
use mesh_inventory_k8s_api as k8s;
use serde::Serialize;

/// The services, pods and deployments of a namespace, each fetched independently.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceServiceView {
    pub services: Vec<k8s::Service>,
    pub pods: Vec<k8s::Pod>,
    pub deployments: Vec<k8s::Deployment>,
}

/// Everything known about a single service.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDetailView {
    pub service: k8s::Service,
    pub endpoints: k8s::Endpoints,

    /// All autoscalers in the service's namespace.
    pub autoscalers: Vec<k8s::HorizontalPodAutoscaler>,

    /// Pods selected by the service.
    pub pods: Vec<k8s::Pod>,

    /// Deployments that own at least one of `pods`.
    pub deployments: Vec<k8s::Deployment>,
}

// === impl ServiceDetailView ===

impl ServiceDetailView {
    /// Returns the autoscalers that target one of the service's deployments.
    pub fn deployment_autoscalers(&self) -> Vec<&k8s::HorizontalPodAutoscaler> {
        let names = deployments::deployment_names(&self.deployments);
        deployments::filter_autoscalers_by_deployments(&names, &self.autoscalers).collect()
    }
}
