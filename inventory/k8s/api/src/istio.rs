//! Istio traffic-management resources.
//!
//! Only the fields that determine whether a policy applies to a service are modeled; everything
//! else in these resources is ignored on deserialization.

pub mod destination_policy;
pub mod destination_rule;
pub mod route_rule;
pub mod virtual_service;

pub use self::{
    destination_policy::{DestinationPolicy, DestinationPolicySpec},
    destination_rule::{DestinationRule, DestinationRuleSpec, Subset, TrafficPolicy},
    route_rule::{DestinationWeight, RouteRule, RouteRuleSpec},
    virtual_service::{
        Destination, HttpRoute, RouteDestination, TcpRoute, VirtualService, VirtualServiceSpec,
    },
};
use crate::labels::Map;
use serde::{Deserialize, Serialize};

/// Identifies a service (and optionally a subset of its instances, by label) in the
/// `config.istio.io` resources.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IstioService {
    pub name: Option<String>,
    pub namespace: Option<String>,
    pub domain: Option<String>,
    #[serde(default)]
    pub labels: Option<Map>,
}
