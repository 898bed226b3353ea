use crate::labels::Map;
use kube::CustomResource;
use serde::{Deserialize, Serialize};

/// Declares the named subsets of a host and the traffic policies applied to them.
#[derive(Clone, Debug, Default, PartialEq, CustomResource, Deserialize, Serialize)]
#[kube(
    group = "networking.istio.io",
    version = "v1alpha3",
    kind = "DestinationRule",
    namespaced,
    schema = "disabled"
)]
#[serde(rename_all = "camelCase")]
pub struct DestinationRuleSpec {
    pub host: String,
    pub traffic_policy: Option<TrafficPolicy>,
    #[serde(default)]
    pub subsets: Vec<Subset>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Subset {
    pub name: String,
    #[serde(default)]
    pub labels: Map,
    pub traffic_policy: Option<TrafficPolicy>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrafficPolicy {
    pub load_balancer: Option<serde_json::Value>,
    pub connection_pool: Option<serde_json::Value>,
    pub outlier_detection: Option<serde_json::Value>,
    pub tls: Option<serde_json::Value>,
}

// === impl TrafficPolicy ===

impl TrafficPolicy {
    /// A traffic policy breaks circuits when it bounds connections or ejects outliers.
    pub fn has_circuit_breaker(&self) -> bool {
        self.connection_pool.is_some() || self.outlier_detection.is_some()
    }
}
