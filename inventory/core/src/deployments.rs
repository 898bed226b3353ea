use mesh_inventory_k8s_api::{self as k8s, ResourceExt};
use std::collections::HashSet;

/// Appended by the deployment controller to the names of the replica sets (and pods) it creates.
pub const POD_TEMPLATE_HASH_LABEL: &str = "pod-template-hash";

/// Returns the name of the deployment that owns `pod`, if any.
///
/// Pods are usually owned by a replica set named `<deployment>-<pod-template-hash>`, so the
/// deployment name is recovered by stripping the hash. Pods owned directly by a deployment name
/// it as-is; pods with any other controller (or none) have no owning deployment.
pub fn owning_deployment(pod: &k8s::Pod) -> Option<String> {
    let owners = pod.metadata.owner_references.as_ref()?;
    let owner = owners
        .iter()
        .find(|o| o.controller == Some(true))
        .or_else(|| owners.first())?;

    match owner.kind.as_str() {
        "Deployment" => Some(owner.name.clone()),
        "ReplicaSet" => {
            let by_hash = pod
                .labels()
                .get(POD_TEMPLATE_HASH_LABEL)
                .and_then(|hash| owner.name.strip_suffix(hash.as_str()))
                .and_then(|name| name.strip_suffix('-'));
            let name = by_hash
                .or_else(|| owner.name.rsplit_once('-').map(|(name, _)| name))
                .unwrap_or(&owner.name);
            Some(name.to_string())
        }
        _ => None,
    }
}

/// Retains the deployments that own at least one of `pods`, preserving their order.
pub fn filter_deployments_for_pods(
    pods: &[k8s::Pod],
    deployments: Vec<k8s::Deployment>,
) -> Vec<k8s::Deployment> {
    let owners = pods
        .iter()
        .filter_map(owning_deployment)
        .collect::<HashSet<_>>();
    deployments
        .into_iter()
        .filter(|d| owners.contains(&d.name_any()))
        .collect()
}

pub fn deployment_names(deployments: &[k8s::Deployment]) -> Vec<String> {
    deployments.iter().map(|d| d.name_any()).collect()
}

/// Iterates over the autoscalers that scale one of the named deployments.
pub fn filter_autoscalers_by_deployments<'n, 'a: 'n>(
    deployment_names: &'n [String],
    autoscalers: &'a [k8s::HorizontalPodAutoscaler],
) -> impl Iterator<Item = &'a k8s::HorizontalPodAutoscaler> + 'n {
    autoscalers.iter().filter(move |hpa| {
        hpa.spec.as_ref().is_some_and(|spec| {
            let target = &spec.scale_target_ref;
            target.kind == "Deployment" && deployment_names.contains(&target.name)
        })
    })
}
