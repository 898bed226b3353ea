use kube::CustomResource;
use serde::{Deserialize, Serialize};

/// Routes traffic addressed to a set of hosts onto destinations (and their subsets).
#[derive(Clone, Debug, Default, PartialEq, CustomResource, Deserialize, Serialize)]
#[kube(
    group = "networking.istio.io",
    version = "v1alpha3",
    kind = "VirtualService",
    namespaced,
    schema = "disabled"
)]
#[serde(rename_all = "camelCase")]
pub struct VirtualServiceSpec {
    #[serde(default)]
    pub hosts: Vec<String>,
    #[serde(default)]
    pub gateways: Vec<String>,
    #[serde(default)]
    pub http: Vec<HttpRoute>,
    #[serde(default)]
    pub tcp: Vec<TcpRoute>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct HttpRoute {
    #[serde(default)]
    pub route: Vec<RouteDestination>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct TcpRoute {
    #[serde(default)]
    pub route: Vec<RouteDestination>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct RouteDestination {
    pub destination: Option<Destination>,
    pub weight: Option<u32>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Destination {
    pub host: String,
    pub subset: Option<String>,
}

// === impl VirtualServiceSpec ===

impl VirtualServiceSpec {
    /// Iterates over the destinations of every HTTP and TCP route.
    pub fn destinations(&self) -> impl Iterator<Item = &Destination> + '_ {
        let http = self.http.iter().flat_map(|r| r.route.iter());
        let tcp = self.tcp.iter().flat_map(|r| r.route.iter());
        http.chain(tcp).filter_map(|rd| rd.destination.as_ref())
    }
}
