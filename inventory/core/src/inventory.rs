use crate::{
    deployments::filter_deployments_for_pods,
    lookup,
    views::{NamespaceServiceView, ServiceDetailView},
    ClusterClient, Error, LabelConfig, Result,
};
use mesh_inventory_k8s_api::{self as k8s, Selector};
use tracing::{debug, instrument};

/// Builds composite views of a namespace's workloads from concurrent cluster lookups.
#[derive(Clone, Debug)]
pub struct Inventory<C> {
    client: C,
    labels: LabelConfig,
}

// === impl Inventory ===

impl<C: ClusterClient> Inventory<C> {
    pub fn new(client: C, labels: LabelConfig) -> Self {
        Self { client, labels }
    }

    pub async fn namespaces(&self) -> Result<Vec<k8s::Namespace>> {
        self.client.namespaces().await
    }

    /// Fetches a namespace's services, pods and deployments concurrently.
    ///
    /// Every list that was fetched successfully is returned in the view, even when another lookup
    /// failed. The accompanying error is set iff a lookup failed, and names the first failure in
    /// the order services, pods, deployments.
    #[instrument(skip(self))]
    pub async fn namespace_services(
        &self,
        namespace: &str,
    ) -> (NamespaceServiceView, Option<Error>) {
        let services = {
            let client = self.client.clone();
            let ns = namespace.to_string();
            lookup::spawn("services", async move { client.services(&ns).await })
        };
        let pods = {
            let client = self.client.clone();
            let ns = namespace.to_string();
            let selector = Selector::default();
            lookup::spawn("pods", async move { client.pods(&ns, &selector).await })
        };
        let deployments = {
            let client = self.client.clone();
            let ns = namespace.to_string();
            lookup::spawn("deployments", async move { client.deployments(&ns).await })
        };

        let mut view = NamespaceServiceView::default();
        let mut error = None;
        match services.join().await {
            Ok(services) => view.services = services,
            Err(e) => error = error.or(Some(e)),
        }
        match pods.join().await {
            Ok(pods) => view.pods = pods,
            Err(e) => error = error.or(Some(e)),
        }
        match deployments.join().await {
            Ok(deployments) => view.deployments = deployments,
            Err(e) => error = error.or(Some(e)),
        }

        debug!(
            services = view.services.len(),
            pods = view.pods.len(),
            deployments = view.deployments.len(),
            failed = error.is_some(),
        );
        (view, error)
    }

    /// Fetches everything known about a single service.
    ///
    /// The service itself is fetched first; if it can't be fetched, no other lookups are made.
    /// Otherwise its endpoints, the namespace's autoscalers and the pods it selects are fetched
    /// concurrently while the namespace's deployments are listed. Any failure fails the whole
    /// view. The deployments are finally narrowed to those owning one of the service's pods, so a
    /// service without a selector has neither pods nor deployments.
    #[instrument(skip(self))]
    pub async fn service_details(&self, namespace: &str, name: &str) -> Result<ServiceDetailView> {
        let service = self.client.service(namespace, name).await?;
        let selector = Selector::from(service.spec.as_ref().and_then(|s| s.selector.clone()));
        debug!(%selector, "Found service");

        let endpoints = {
            let client = self.client.clone();
            let (ns, name) = (namespace.to_string(), name.to_string());
            lookup::spawn("endpoints", async move { client.endpoints(&ns, &name).await })
        };
        let autoscalers = {
            let client = self.client.clone();
            let ns = namespace.to_string();
            lookup::spawn("autoscalers", async move { client.autoscalers(&ns).await })
        };
        // A service without a selector selects no pods; its endpoints are managed elsewhere.
        let pods = (!selector.is_empty()).then(|| {
            let client = self.client.clone();
            let ns = namespace.to_string();
            lookup::spawn("pods", async move { client.pods(&ns, &selector).await })
        });

        // Narrowed below, once the service's pods are known.
        let deployments = self.client.deployments(namespace).await?;

        let endpoints = endpoints.join().await?;
        let autoscalers = autoscalers.join().await?;
        let pods = match pods {
            Some(pods) => pods.join().await?,
            None => Vec::new(),
        };

        let deployments = filter_deployments_for_pods(&pods, deployments);
        debug!(
            pods = pods.len(),
            deployments = deployments.len(),
            autoscalers = autoscalers.len(),
        );

        Ok(ServiceDetailView {
            service,
            endpoints,
            autoscalers,
            pods,
            deployments,
        })
    }

    pub async fn pods(&self, namespace: &str, selector: &Selector) -> Result<Vec<k8s::Pod>> {
        self.client.pods(namespace, selector).await
    }

    /// Lists the pods labeled as instances of `service`, optionally narrowed to a `version`.
    ///
    /// An empty `version` matches every version.
    pub async fn service_pods(
        &self,
        namespace: &str,
        service: &str,
        version: &str,
    ) -> Result<Vec<k8s::Pod>> {
        let selector = self.labels.service_selector(service, version);
        self.pods(namespace, &selector).await
    }
}
