use super::*;
use crate::{Inventory, LabelConfig};
use std::time::Duration;

fn bookinfo() -> FakeCluster {
    let cluster = FakeCluster::default();
    cluster.update(|s| {
        s.services = vec![
            mk_service("bookinfo", "reviews", &[("app", "reviews")]),
            mk_service("bookinfo", "ratings", &[("app", "ratings")]),
            mk_service("other", "reviews", &[("app", "reviews")]),
        ];
        s.pods = vec![
            mk_pod(
                "bookinfo",
                "reviews-v1-a",
                &[("app", "reviews"), ("version", "v1")],
                Some("reviews-v1"),
            ),
            mk_pod(
                "bookinfo",
                "reviews-v2-a",
                &[("app", "reviews"), ("version", "v2")],
                Some("reviews-v2"),
            ),
            mk_pod(
                "bookinfo",
                "ratings-v1-a",
                &[("app", "ratings"), ("version", "v1")],
                Some("ratings-v1"),
            ),
            mk_pod("other", "reviews-v1-a", &[("app", "reviews")], Some("reviews-v1")),
        ];
        s.deployments = vec![
            mk_deployment("bookinfo", "ratings-v1"),
            mk_deployment("bookinfo", "reviews-v2"),
            mk_deployment("bookinfo", "productpage-v1"),
            mk_deployment("bookinfo", "reviews-v1"),
            mk_deployment("other", "reviews-v1"),
        ];
        s.endpoints = vec![mk_endpoints("bookinfo", "reviews")];
        s.autoscalers = vec![
            mk_autoscaler("bookinfo", "reviews-v1", "reviews-v1"),
            mk_autoscaler("bookinfo", "ratings-v1", "ratings-v1"),
        ];
    });
    cluster
}

fn inventory(cluster: &FakeCluster) -> Inventory<FakeCluster> {
    Inventory::new(cluster.clone(), LabelConfig::default())
}

#[tokio::test]
async fn namespace_services_lists_namespace() {
    let cluster = bookinfo();
    let (view, error) = inventory(&cluster).namespace_services("bookinfo").await;

    assert!(error.is_none());
    assert_eq!(names(&view.services), ["reviews", "ratings"]);
    assert_eq!(
        names(&view.pods),
        ["reviews-v1-a", "reviews-v2-a", "ratings-v1-a"]
    );
    assert_eq!(
        names(&view.deployments),
        ["ratings-v1", "reviews-v2", "productpage-v1", "reviews-v1"]
    );

    let mut calls = cluster.calls();
    calls.sort_unstable();
    assert_eq!(calls, ["deployments", "pods", "services"]);
}

#[tokio::test]
async fn namespace_services_keeps_successful_parts() {
    let cluster = bookinfo();
    cluster.fail("pods", "pods unavailable");

    let (view, error) = inventory(&cluster).namespace_services("bookinfo").await;

    assert_eq!(remote_msg(&error.expect("must fail")), "pods unavailable");
    assert_eq!(view.services.len(), 2);
    assert!(view.pods.is_empty());
    assert_eq!(view.deployments.len(), 4);
}

/// When several lookups fail, the error reported is the first in lookup order, regardless of which
/// failure completes first.
#[tokio::test]
async fn namespace_services_reports_first_failure_in_order() {
    let cluster = bookinfo();
    cluster
        .fail("services", "services unavailable")
        .fail("deployments", "deployments unavailable")
        .delay("services", Duration::from_millis(50));

    let (view, error) = inventory(&cluster).namespace_services("bookinfo").await;
    assert_eq!(
        remote_msg(&error.expect("must fail")),
        "services unavailable"
    );
    assert!(view.services.is_empty());
    assert_eq!(view.pods.len(), 3);
    assert!(view.deployments.is_empty());

    let cluster = bookinfo();
    cluster
        .fail("pods", "pods unavailable")
        .fail("deployments", "deployments unavailable")
        .delay("pods", Duration::from_millis(50));

    let (_, error) = inventory(&cluster).namespace_services("bookinfo").await;
    assert_eq!(remote_msg(&error.expect("must fail")), "pods unavailable");
}

#[tokio::test]
async fn service_details() {
    let cluster = bookinfo();
    let details = inventory(&cluster)
        .service_details("bookinfo", "reviews")
        .await
        .expect("service must be found");

    assert_eq!(details.service.name_any(), "reviews");
    assert_eq!(details.endpoints.name_any(), "reviews");
    assert_eq!(names(&details.pods), ["reviews-v1-a", "reviews-v2-a"]);
    // Only the deployments owning the service's pods remain, in their listed order.
    assert_eq!(names(&details.deployments), ["reviews-v2", "reviews-v1"]);
    assert_eq!(names(&details.autoscalers), ["reviews-v1", "ratings-v1"]);
    assert_eq!(
        details
            .deployment_autoscalers()
            .into_iter()
            .map(|hpa| hpa.name_any())
            .collect::<Vec<_>>(),
        ["reviews-v1"]
    );
}

#[tokio::test]
async fn service_details_for_missing_service_fetches_nothing_else() {
    let cluster = bookinfo();
    let error = inventory(&cluster)
        .service_details("bookinfo", "details")
        .await
        .expect_err("service must not be found");

    assert!(error.is_not_found(), "{error}");
    assert_eq!(cluster.calls(), ["service"]);
}

#[tokio::test]
async fn service_details_fails_on_first_failure_in_order() {
    let cluster = bookinfo();
    cluster
        .fail("autoscalers", "autoscalers unavailable")
        .fail("pods", "pods unavailable")
        .delay("autoscalers", Duration::from_millis(50));

    let error = inventory(&cluster)
        .service_details("bookinfo", "reviews")
        .await
        .expect_err("details must fail");
    assert_eq!(remote_msg(&error), "autoscalers unavailable");
}

#[tokio::test]
async fn service_details_fails_when_deployments_fail() {
    let cluster = bookinfo();
    cluster.fail("deployments", "deployments unavailable");

    let error = inventory(&cluster)
        .service_details("bookinfo", "reviews")
        .await
        .expect_err("details must fail");
    assert_eq!(remote_msg(&error), "deployments unavailable");
}

#[tokio::test]
async fn service_details_fails_when_endpoints_missing() {
    let cluster = bookinfo();
    let error = inventory(&cluster)
        .service_details("bookinfo", "ratings")
        .await
        .expect_err("details must fail");
    assert!(
        matches!(error, Error::NotFound { kind: "endpoints", .. }),
        "{error}"
    );
}

/// A service without a selector (e.g. one whose endpoints are managed by hand) selects no pods, so
/// no deployment is attributed to it.
#[tokio::test]
async fn service_details_without_selector() {
    let cluster = bookinfo();
    cluster.update(|s| {
        let mut external = mk_service("bookinfo", "external", &[]);
        external.spec.as_mut().unwrap().selector = None;
        s.services.push(external);
        s.services.push(mk_service("bookinfo", "legacy", &[]));
        s.endpoints.push(mk_endpoints("bookinfo", "external"));
        s.endpoints.push(mk_endpoints("bookinfo", "legacy"));
    });

    for name in ["external", "legacy"] {
        let details = inventory(&cluster)
            .service_details("bookinfo", name)
            .await
            .expect("service must be found");
        assert_eq!(details.service.name_any(), name);
        assert!(details.pods.is_empty(), "{name}");
        assert!(details.deployments.is_empty(), "{name}");
        assert!(details.deployment_autoscalers().is_empty(), "{name}");
        assert_eq!(details.autoscalers.len(), 2);
    }
    assert_eq!(cluster.call_count("pods"), 0);
}

#[tokio::test]
async fn service_pods_by_version() {
    let cluster = bookinfo();
    let inventory = inventory(&cluster);

    let all = inventory
        .service_pods("bookinfo", "reviews", "")
        .await
        .unwrap();
    assert_eq!(names(&all), ["reviews-v1-a", "reviews-v2-a"]);

    let v2 = inventory
        .service_pods("bookinfo", "reviews", "v2")
        .await
        .unwrap();
    assert_eq!(names(&v2), ["reviews-v2-a"]);

    let v3 = inventory
        .service_pods("bookinfo", "reviews", "v3")
        .await
        .unwrap();
    assert!(v3.is_empty());
    assert_eq!(cluster.call_count("pods"), 3);
}
