use crate::{graph::PolicyMatcher, LabelConfig};
use mesh_inventory_k8s_api::{
    istio::{DestinationPolicy, DestinationRule, IstioService, RouteRule, VirtualService},
    labels::Map,
    ResourceExt,
};

/// Matches Istio traffic-management resources against services.
///
/// Versions are read from the configured version label of each resource's label selectors.
#[derive(Clone, Debug, Default)]
pub struct IstioMatcher {
    labels: LabelConfig,
}

// === impl IstioMatcher ===

impl IstioMatcher {
    pub fn new(labels: LabelConfig) -> Self {
        Self { labels }
    }

    fn has_version(&self, labels: &Map, version: &str) -> bool {
        labels.get(&self.labels.version_label).map(String::as_str) == Some(version)
    }

    /// Checks whether a `config.istio.io` destination refers to the service.
    ///
    /// A destination without labels applies to every version, as does an empty `version`.
    fn destination_matches(
        &self,
        dst: &IstioService,
        namespace: &str,
        service: &str,
        version: &str,
    ) -> bool {
        if dst.name.as_deref() != Some(service) {
            return false;
        }
        if dst.namespace.as_deref().is_some_and(|ns| ns != namespace) {
            return false;
        }
        if version.is_empty() {
            return true;
        }
        match dst.labels.as_ref() {
            Some(labels) => self.has_version(labels, version),
            None => true,
        }
    }
}

impl PolicyMatcher for IstioMatcher {
    fn destination_policy_circuit_breaker(
        &self,
        policy: &DestinationPolicy,
        namespace: &str,
        service: &str,
        version: &str,
    ) -> bool {
        let Some(dst) = policy.spec.destination.as_ref() else {
            return false;
        };
        self.destination_matches(dst, namespace, service, version)
            && policy.spec.circuit_breaker.is_some()
    }

    fn destination_rule_circuit_breaker(
        &self,
        rule: &DestinationRule,
        namespace: &str,
        service: &str,
        version: &str,
    ) -> bool {
        if !host_matches(&rule.spec.host, namespace, service) {
            return false;
        }
        if rule
            .spec
            .traffic_policy
            .as_ref()
            .is_some_and(|tp| tp.has_circuit_breaker())
        {
            return true;
        }
        rule.spec.subsets.iter().any(|subset| {
            subset
                .traffic_policy
                .as_ref()
                .is_some_and(|tp| tp.has_circuit_breaker())
                && self.has_version(&subset.labels, version)
        })
    }

    fn route_rule(&self, rule: &RouteRule, namespace: &str, service: &str, version: &str) -> bool {
        let Some(dst) = rule.spec.destination.as_ref() else {
            return false;
        };
        if !self.destination_matches(dst, namespace, service, "") {
            return false;
        }
        rule.spec
            .route
            .iter()
            .any(|weight| self.has_version(&weight.labels, version))
    }

    fn destination_rule_subsets(
        &self,
        rules: &[DestinationRule],
        namespace: &str,
        service: &str,
        version: &str,
    ) -> Vec<String> {
        rules
            .iter()
            .filter(|dr| host_matches(&dr.spec.host, namespace, service))
            .flat_map(|dr| dr.spec.subsets.iter())
            .filter(|subset| self.has_version(&subset.labels, version))
            .map(|subset| subset.name.clone())
            .collect()
    }

    fn virtual_service(
        &self,
        vs: &VirtualService,
        namespace: &str,
        service: &str,
        subsets: &[String],
    ) -> bool {
        if vs.namespace().is_some_and(|ns| ns != namespace) {
            return false;
        }
        vs.spec.destinations().any(|dst| {
            host_matches(&dst.host, namespace, service)
                && dst
                    .subset
                    .as_ref()
                    .is_some_and(|subset| subsets.contains(subset))
        })
    }
}

/// Checks whether `host` addresses the service: by short name, as `<service>.<namespace>`, or by
/// its `<service>.<namespace>.svc[.<domain>]` FQDN.
fn host_matches(host: &str, namespace: &str, service: &str) -> bool {
    if host == service {
        return true;
    }
    let Some(rest) = host
        .strip_prefix(service)
        .and_then(|h| h.strip_prefix('.'))
        .and_then(|h| h.strip_prefix(namespace))
    else {
        return false;
    };
    rest.is_empty() || rest == ".svc" || rest.starts_with(".svc.")
}
