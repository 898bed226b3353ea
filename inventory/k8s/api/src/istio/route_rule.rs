use super::IstioService;
use crate::labels::Map;
use kube::CustomResource;
use serde::{Deserialize, Serialize};

/// Routes traffic for a destination across weighted, label-selected backends.
#[derive(Clone, Debug, Default, PartialEq, CustomResource, Deserialize, Serialize)]
#[kube(
    group = "config.istio.io",
    version = "v1alpha2",
    kind = "RouteRule",
    namespaced,
    schema = "disabled"
)]
#[serde(rename_all = "camelCase")]
pub struct RouteRuleSpec {
    pub destination: Option<IstioService>,
    pub precedence: Option<i32>,
    #[serde(default)]
    pub route: Vec<DestinationWeight>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DestinationWeight {
    #[serde(default)]
    pub labels: Map,
    pub weight: Option<u32>,
}
