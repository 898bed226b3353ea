//! Annotates a service dependency graph with the mesh policies that apply to each node.

use crate::{istio::IstioMatcher, LabelConfig, PolicyBundle, PolicySource, Result};
use mesh_inventory_k8s_api::istio::{DestinationPolicy, DestinationRule, RouteRule, VirtualService};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, instrument, trace};

/// Set to `"true"` on nodes whose traffic passes through a circuit breaker.
pub const HAS_CIRCUIT_BREAKER: &str = "hasCircuitBreaker";

/// Set to `"true"` on nodes whose traffic is shaped by a routing rule.
pub const HAS_ROUTE_RULE: &str = "hasRouteRule";

/// A service (at a specific version) in a dependency tree.
///
/// A node owns its children outright; trees have no back references.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceNode {
    /// The node's qualified name, e.g. `reviews.bookinfo.svc.cluster.local`.
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    #[serde(default)]
    pub children: Vec<ServiceNode>,
}

/// Decides whether individual mesh policy records apply to a service.
pub trait PolicyMatcher {
    fn destination_policy_circuit_breaker(
        &self,
        policy: &DestinationPolicy,
        namespace: &str,
        service: &str,
        version: &str,
    ) -> bool;

    fn destination_rule_circuit_breaker(
        &self,
        rule: &DestinationRule,
        namespace: &str,
        service: &str,
        version: &str,
    ) -> bool;

    fn route_rule(&self, rule: &RouteRule, namespace: &str, service: &str, version: &str) -> bool;

    /// Names the subsets that `rules` addressing the service declare for the given version.
    fn destination_rule_subsets(
        &self,
        rules: &[DestinationRule],
        namespace: &str,
        service: &str,
        version: &str,
    ) -> Vec<String>;

    fn virtual_service(
        &self,
        vs: &VirtualService,
        namespace: &str,
        service: &str,
        subsets: &[String],
    ) -> bool;
}

/// Flags the nodes of service trees that are subject to circuit breakers or route rules.
#[derive(Clone, Debug)]
pub struct PolicyAnnotator<P, M = IstioMatcher> {
    source: P,
    matcher: M,
}

// === impl ServiceNode ===

impl ServiceNode {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            ..Default::default()
        }
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = ServiceNode>) -> Self {
        self.children.extend(children);
        self
    }

    /// The unqualified service name: everything before the first `.` in the node's name.
    pub fn service_name(&self) -> &str {
        self.name.split('.').next().unwrap_or_default()
    }

    fn flag(&mut self, key: &str) {
        self.metadata.insert(key.to_string(), "true".to_string());
    }
}

// === impl PolicyAnnotator ===

impl<P: PolicySource> PolicyAnnotator<P> {
    pub fn new(source: P, labels: LabelConfig) -> Self {
        Self::with_matcher(source, IstioMatcher::new(labels))
    }
}

impl<P: PolicySource, M: PolicyMatcher> PolicyAnnotator<P, M> {
    pub fn with_matcher(source: P, matcher: M) -> Self {
        Self { source, matcher }
    }

    /// Annotates every node of `trees` with the policies declared in `namespace`.
    ///
    /// The namespace's policies are fetched once, before any node is visited. If that fails, no
    /// node is modified.
    #[instrument(skip(self, trees), fields(trees = trees.len()))]
    pub async fn annotate(&self, trees: &mut [ServiceNode], namespace: &str) -> Result<()> {
        let bundle = self.source.policy_bundle(namespace).await?;
        debug!(
            destination_policies = bundle.destination_policies.len(),
            destination_rules = bundle.destination_rules.len(),
            route_rules = bundle.route_rules.len(),
            virtual_services = bundle.virtual_services.len(),
            "Fetched policies"
        );
        annotate_trees(&self.matcher, trees, namespace, &bundle);
        Ok(())
    }
}

/// Visits every node of `trees` depth-first, parents before children, flagging each node that a
/// policy in `bundle` applies to.
pub fn annotate_trees<M: PolicyMatcher>(
    matcher: &M,
    trees: &mut [ServiceNode],
    namespace: &str,
    bundle: &PolicyBundle,
) {
    let mut stack = trees.iter_mut().rev().collect::<Vec<_>>();
    while let Some(node) = stack.pop() {
        apply_circuit_breakers(matcher, node, namespace, bundle);
        apply_route_rules(matcher, node, namespace, bundle);
        stack.extend(node.children.iter_mut().rev());
    }
}

/// Destination policies take precedence over destination rules: rules are only consulted when no
/// policy matched.
fn apply_circuit_breakers<M: PolicyMatcher>(
    matcher: &M,
    node: &mut ServiceNode,
    namespace: &str,
    bundle: &PolicyBundle,
) {
    let service = node.service_name();
    let version = node.version.as_str();

    let found = bundle
        .destination_policies
        .iter()
        .any(|dp| matcher.destination_policy_circuit_breaker(dp, namespace, service, version))
        || bundle
            .destination_rules
            .iter()
            .any(|dr| matcher.destination_rule_circuit_breaker(dr, namespace, service, version));

    if found {
        trace!(node = %node.name, version = %node.version, "Circuit breaker");
        node.flag(HAS_CIRCUIT_BREAKER);
    }
}

/// Route rules take precedence over virtual services routing to one of the node's subsets.
fn apply_route_rules<M: PolicyMatcher>(
    matcher: &M,
    node: &mut ServiceNode,
    namespace: &str,
    bundle: &PolicyBundle,
) {
    let service = node.service_name();
    let version = node.version.as_str();

    let found = bundle
        .route_rules
        .iter()
        .any(|rr| matcher.route_rule(rr, namespace, service, version))
        || {
            let subsets = matcher.destination_rule_subsets(
                &bundle.destination_rules,
                namespace,
                service,
                version,
            );
            bundle
                .virtual_services
                .iter()
                .any(|vs| matcher.virtual_service(vs, namespace, service, &subsets))
        };

    if found {
        trace!(node = %node.name, version = %node.version, "Route rule");
        node.flag(HAS_ROUTE_RULE);
    }
}
