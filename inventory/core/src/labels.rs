use mesh_inventory_k8s_api::Selector;

pub const DEFAULT_SERVICE_LABEL: &str = "app";
pub const DEFAULT_VERSION_LABEL: &str = "version";

/// Names the pod labels that identify a workload's service and version.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabelConfig {
    pub service_label: String,
    pub version_label: String,
}

// === impl LabelConfig ===

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            service_label: DEFAULT_SERVICE_LABEL.to_string(),
            version_label: DEFAULT_VERSION_LABEL.to_string(),
        }
    }
}

impl LabelConfig {
    /// Builds a selector for the instances of `service`.
    ///
    /// An empty `version` leaves the version unconstrained: the version label is omitted entirely
    /// rather than matched against an empty value.
    pub fn service_selector(&self, service: &str, version: &str) -> Selector {
        let mut selector = Selector::default();
        selector.insert(&self.service_label, service);
        if !version.is_empty() {
            selector.insert(&self.version_label, version);
        }
        selector
    }
}
