#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod istio;
pub mod labels;

pub use self::labels::Selector;
pub use k8s_openapi::api::{
    self,
    apps::v1::{Deployment, DeploymentSpec},
    autoscaling::v1::{
        CrossVersionObjectReference, HorizontalPodAutoscaler, HorizontalPodAutoscalerSpec,
    },
    core::v1::{Endpoints, Namespace, Pod, PodSpec, Service, ServiceSpec},
};
pub use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
pub use kube::api::{ObjectMeta, ResourceExt};
