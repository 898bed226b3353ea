use super::IstioService;
use kube::CustomResource;
use serde::{Deserialize, Serialize};

/// Configures load balancing and circuit breaking for traffic sent to a destination.
#[derive(Clone, Debug, Default, PartialEq, CustomResource, Deserialize, Serialize)]
#[kube(
    group = "config.istio.io",
    version = "v1alpha2",
    kind = "DestinationPolicy",
    namespaced,
    schema = "disabled"
)]
#[serde(rename_all = "camelCase")]
pub struct DestinationPolicySpec {
    pub destination: Option<IstioService>,
    pub source: Option<IstioService>,
    pub load_balancing: Option<serde_json::Value>,
    pub circuit_breaker: Option<serde_json::Value>,
}
