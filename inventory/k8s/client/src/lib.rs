//! Cluster lookups backed by the Kubernetes API.

#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

use k8s_openapi::NamespaceResourceScope;
use kube::{
    api::{Api, ListParams},
    Resource,
};
use mesh_inventory_core::{lookup, ClusterClient, Error, PolicyBundle, PolicySource, Result};
use mesh_inventory_k8s_api::{
    self as k8s,
    istio::{DestinationPolicy, DestinationRule, RouteRule, VirtualService},
    Selector,
};
use serde::de::DeserializeOwned;
use std::fmt;
use tracing::{debug, instrument};

/// Looks up cluster resources through a [`kube::Client`].
#[derive(Clone)]
pub struct KubeClient {
    client: kube::Client,
}

// === impl KubeClient ===

impl From<kube::Client> for KubeClient {
    fn from(client: kube::Client) -> Self {
        Self { client }
    }
}

impl fmt::Debug for KubeClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KubeClient")
            .field("namespace", &self.client.default_namespace())
            .finish()
    }
}

impl KubeClient {
    async fn list<K>(&self, namespace: &str, params: &ListParams) -> Result<Vec<K>>
    where
        K: Resource<Scope = NamespaceResourceScope> + Clone + DeserializeOwned + fmt::Debug,
        K: Send + 'static,
        K::DynamicType: Default,
    {
        let api = Api::<K>::namespaced(self.client.clone(), namespace);
        let list = api.list(params).await.map_err(Error::remote)?;
        debug!(kind = %K::kind(&Default::default()), items = list.items.len(), "Listed");
        Ok(list.items)
    }

    async fn get<K>(&self, namespace: &str, name: &str) -> Result<K>
    where
        K: Resource<Scope = NamespaceResourceScope> + Clone + DeserializeOwned + fmt::Debug,
        K: Send + 'static,
        K::DynamicType: Default,
    {
        let api = Api::<K>::namespaced(self.client.clone(), namespace);
        api.get(name).await.map_err(|error| {
            let dt = Default::default();
            let kind = K::kind(&dt);
            from_kube_error(error, &kind, namespace, name)
        })
    }
}

#[async_trait::async_trait]
impl ClusterClient for KubeClient {
    async fn namespaces(&self) -> Result<Vec<k8s::Namespace>> {
        let api = Api::<k8s::Namespace>::all(self.client.clone());
        let list = api
            .list(&ListParams::default())
            .await
            .map_err(Error::remote)?;
        Ok(list.items)
    }

    async fn services(&self, namespace: &str) -> Result<Vec<k8s::Service>> {
        self.list(namespace, &ListParams::default()).await
    }

    async fn service(&self, namespace: &str, name: &str) -> Result<k8s::Service> {
        self.get(namespace, name).await
    }

    #[instrument(skip(self, selector), fields(%selector))]
    async fn pods(&self, namespace: &str, selector: &Selector) -> Result<Vec<k8s::Pod>> {
        let mut params = ListParams::default();
        if !selector.is_empty() {
            params = params.labels(&selector.to_string());
        }
        self.list(namespace, &params).await
    }

    async fn deployments(&self, namespace: &str) -> Result<Vec<k8s::Deployment>> {
        self.list(namespace, &ListParams::default()).await
    }

    async fn endpoints(&self, namespace: &str, name: &str) -> Result<k8s::Endpoints> {
        self.get(namespace, name).await
    }

    async fn autoscalers(&self, namespace: &str) -> Result<Vec<k8s::HorizontalPodAutoscaler>> {
        self.list(namespace, &ListParams::default()).await
    }
}

#[async_trait::async_trait]
impl PolicySource for KubeClient {
    /// Lists the namespace's Istio policies concurrently. If several lists fail, the error reported
    /// is the first in the order route rules, destination policies, virtual services, destination
    /// rules.
    #[instrument(skip(self))]
    async fn policy_bundle(&self, namespace: &str) -> Result<PolicyBundle> {
        let route_rules = {
            let client = self.clone();
            let ns = namespace.to_string();
            lookup::spawn("routerules", async move {
                client
                    .list::<RouteRule>(&ns, &ListParams::default())
                    .await
            })
        };
        let destination_policies = {
            let client = self.clone();
            let ns = namespace.to_string();
            lookup::spawn("destinationpolicies", async move {
                client
                    .list::<DestinationPolicy>(&ns, &ListParams::default())
                    .await
            })
        };
        let virtual_services = {
            let client = self.clone();
            let ns = namespace.to_string();
            lookup::spawn("virtualservices", async move {
                client
                    .list::<VirtualService>(&ns, &ListParams::default())
                    .await
            })
        };
        let destination_rules = {
            let client = self.clone();
            let ns = namespace.to_string();
            lookup::spawn("destinationrules", async move {
                client
                    .list::<DestinationRule>(&ns, &ListParams::default())
                    .await
            })
        };

        Ok(PolicyBundle {
            route_rules: route_rules.join().await?,
            destination_policies: destination_policies.join().await?,
            virtual_services: virtual_services.join().await?,
            destination_rules: destination_rules.join().await?,
        })
    }
}

/// A 404 from the API server means the requested resource doesn't exist; anything else is a
/// failed request.
fn from_kube_error(error: kube::Error, kind: &str, namespace: &str, name: &str) -> Error {
    match error {
        kube::Error::Api(ref rsp) if rsp.code == 404 => {
            Error::not_found(not_found_kind(kind), namespace, name)
        }
        error => Error::remote(error),
    }
}

fn not_found_kind(kind: &str) -> &'static str {
    match kind {
        "Service" => "service",
        "Endpoints" => "endpoints",
        "Pod" => "pod",
        "Deployment" => "deployment",
        "HorizontalPodAutoscaler" => "autoscaler",
        _ => "resource",
    }
}
