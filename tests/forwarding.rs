//! End-to-end forwarding tests against mock upstreams.

use axum::http::StatusCode;
use lattice_forwarder::config::env::{BACKEND_URL, LAMBDA_URL, LATTICE_URL};
use lattice_forwarder::forward::{INSTRUCTIONS, PAYLOAD_FAILURE, TRANSPORT_FAILURE};
use lattice_forwarder::{Shutdown, Variant};
use serde_json::Value;

mod common;

#[tokio::test]
async fn passthrough_wraps_upstream_text() {
    let (upstream, seen) = common::start_mock_upstream("hello").await;
    let config = common::upstreams(
        Variant::Backend,
        &[(LATTICE_URL, format!("http://{}/svc", upstream))],
    );

    let shutdown = Shutdown::new();
    let base = common::start_forwarder(config, &shutdown).await;
    let client = common::client();

    let res = client.get(&base).send().await.expect("Forwarder unreachable");
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["content-type"], "application/json");

    let json: Value = res.json().await.unwrap();
    let object = json.as_object().unwrap();
    assert_eq!(object.len(), 2);
    assert_eq!(json["message"], "hello");
    assert_eq!(json["code"], "SUCCESS");
    assert_eq!(seen.paths(), vec!["/svc".to_string()]);

    shutdown.trigger();
}

#[tokio::test]
async fn passthrough_ignores_path_and_upstream_status() {
    let (upstream, seen) =
        common::start_programmable_upstream(|_path| async { (500, "boom".to_string()) }).await;
    let config = common::upstreams(Variant::Backend, &[(LATTICE_URL, format!("http://{}", upstream))]);

    let shutdown = Shutdown::new();
    let base = common::start_forwarder(config, &shutdown).await;
    let client = common::client();

    for path in ["/backend", "/some/deep/path"] {
        let res = client.get(format!("{base}{path}")).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let json: Value = res.json().await.unwrap();
        assert_eq!(json["message"], "boom");
        assert_eq!(json["code"], "SUCCESS");
    }
    assert!(seen.paths().iter().all(|p| p == "/"));

    shutdown.trigger();
}

#[tokio::test]
async fn split_frontend_renders_backend_region() {
    let (backend, backend_seen) =
        common::start_mock_upstream(r#"{"message": "us-east-1"}"#).await;
    let (lambda, lambda_seen) = common::start_mock_upstream("eu-west-1").await;
    let config = common::upstreams(
        Variant::Frontend,
        &[
            (BACKEND_URL, format!("http://{}", backend)),
            (LAMBDA_URL, format!("http://{}", lambda)),
        ],
    );

    let shutdown = Shutdown::new();
    let base = common::start_forwarder(config, &shutdown).await;
    let client = common::client();

    let res = client.get(format!("{base}/backend")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers()["content-type"].to_str().unwrap().starts_with("text/html"));
    let html = res.text().await.unwrap();
    assert!(html.contains("us-east-1"));
    assert!(html.contains("eks.png"));

    let html = client
        .get(format!("{base}/lambda"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(html.contains("eu-west-1"));
    assert!(html.contains("lambda.png"));

    assert_eq!(backend_seen.paths(), vec!["/backend".to_string()]);
    assert_eq!(lambda_seen.paths(), vec!["/lambda".to_string()]);

    shutdown.trigger();
}

#[tokio::test]
async fn lattice_frontend_uses_one_base_for_both_paths() {
    let (upstream, seen) = common::start_programmable_upstream(|path| async move {
        match path.as_str() {
            "/svc/backend" => (200, r#"{"message": "eks-region"}"#.to_string()),
            _ => (200, "lambda-region".to_string()),
        }
    })
    .await;
    let config = common::upstreams(
        Variant::FrontendLattice,
        &[(LATTICE_URL, format!("http://{}/svc", upstream))],
    );

    let shutdown = Shutdown::new();
    let base = common::start_forwarder(config, &shutdown).await;
    let client = common::client();

    let html = client.get(format!("{base}/backend")).send().await.unwrap().text().await.unwrap();
    assert!(html.contains("eks-region"));
    let html = client.get(format!("{base}/lambda")).send().await.unwrap().text().await.unwrap();
    assert!(html.contains("lambda-region"));

    assert_eq!(
        seen.paths(),
        vec!["/svc/backend".to_string(), "/svc/lambda".to_string()]
    );

    shutdown.trigger();
}

#[tokio::test]
async fn other_paths_get_instructions_without_upstream_call() {
    let (upstream, seen) = common::start_mock_upstream("unused").await;
    let config = common::upstreams(
        Variant::Frontend,
        &[
            (BACKEND_URL, format!("http://{}", upstream)),
            (LAMBDA_URL, format!("http://{}", upstream)),
        ],
    );

    let shutdown = Shutdown::new();
    let base = common::start_forwarder(config, &shutdown).await;
    let client = common::client();

    for path in ["", "/", "/other", "/backend/extra"] {
        let res = client.get(format!("{base}{path}")).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::OK, "path {path:?}");
        assert_eq!(res.text().await.unwrap(), INSTRUCTIONS);
    }
    assert!(seen.paths().is_empty());

    shutdown.trigger();
}

#[tokio::test]
async fn non_get_methods_are_rejected_without_upstream_call() {
    let (upstream, seen) = common::start_mock_upstream(r#"{"message": "us-east-1"}"#).await;
    let config = common::upstreams(
        Variant::FrontendLattice,
        &[(LATTICE_URL, format!("http://{}", upstream))],
    );

    let shutdown = Shutdown::new();
    let base = common::start_forwarder(config, &shutdown).await;
    let client = common::client();

    for path in ["/backend", "/lambda", "/"] {
        let res = client.post(format!("{base}{path}")).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED, "POST {path}");
        let res = client.delete(format!("{base}{path}")).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED, "DELETE {path}");
    }
    assert!(seen.paths().is_empty());

    shutdown.trigger();
}

#[tokio::test]
async fn transport_failure_returns_fixed_message() {
    let dead = common::closed_addr().await;

    let shutdown = Shutdown::new();
    let passthrough = common::start_forwarder(
        common::upstreams(Variant::Backend, &[(LATTICE_URL, format!("http://{}", dead))]),
        &shutdown,
    )
    .await;
    let dispatch = common::start_forwarder(
        common::upstreams(
            Variant::FrontendLattice,
            &[(LATTICE_URL, format!("http://{}", dead))],
        ),
        &shutdown,
    )
    .await;
    let client = common::client();

    for url in [
        passthrough.clone(),
        format!("{dispatch}/backend"),
        format!("{dispatch}/lambda"),
    ] {
        let res = client.get(&url).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::OK, "url {url}");
        assert_eq!(res.text().await.unwrap(), TRANSPORT_FAILURE);
    }

    shutdown.trigger();
}

#[tokio::test]
async fn malformed_backend_json_is_bad_gateway() {
    let (upstream, _) = common::start_mock_upstream("not json at all").await;
    let config = common::upstreams(
        Variant::FrontendLattice,
        &[(LATTICE_URL, format!("http://{}", upstream))],
    );

    let shutdown = Shutdown::new();
    let base = common::start_forwarder(config, &shutdown).await;
    let client = common::client();

    let res = client.get(format!("{base}/backend")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(res.text().await.unwrap(), PAYLOAD_FAILURE);

    // The lambda path relays raw text and is unaffected.
    let res = client.get(format!("{base}/lambda")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.text().await.unwrap().contains("not json at all"));

    shutdown.trigger();
}

#[tokio::test]
async fn concurrent_requests_are_independent() {
    let (upstream, seen) = common::start_programmable_upstream(|path| async move {
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        (200, format!("{{\"message\": \"{}\"}}", path))
    })
    .await;
    let config = common::upstreams(
        Variant::FrontendLattice,
        &[(LATTICE_URL, format!("http://{}", upstream))],
    );

    let shutdown = Shutdown::new();
    let base = common::start_forwarder(config, &shutdown).await;
    let client = common::client();

    let concurrency = 20;
    let mut tasks = Vec::new();
    for _ in 0..concurrency {
        let client = client.clone();
        let url = format!("{base}/backend");
        tasks.push(tokio::spawn(async move {
            client.get(&url).send().await.unwrap().text().await.unwrap()
        }));
    }

    for task in tasks {
        let html = task.await.unwrap();
        assert!(html.contains("/backend"));
    }
    assert_eq!(seen.paths().len(), concurrency);

    shutdown.trigger();
}
