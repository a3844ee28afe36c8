mod common;

use axum::http::StatusCode;
use common::{TestApp, body_text, test_config};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::path::PathBuf;
use std::sync::OnceLock;

/// The recorder is process-global, so every test in this file shares it.
fn prometheus_handle() -> PrometheusHandle {
    static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();
    HANDLE
        .get_or_init(|| {
            PrometheusBuilder::new()
                .install_recorder()
                .expect("install recorder")
        })
        .clone()
}

fn spawn_app_with_metrics() -> TestApp {
    let mut config = test_config("http://127.0.0.1:9");
    config.observability.metrics_enabled = true;
    let users_path = PathBuf::from(&config.general.users_path);
    let public_dir = PathBuf::from(&config.server.public_dir);

    let state = chemsolve::api::create_app_state_from_config(config, Some(prometheus_handle()))
        .expect("failed to create app state");

    TestApp {
        router: chemsolve::api::router(state),
        users_path,
        public_dir,
    }
}

#[tokio::test]
async fn test_request_metrics_use_route_templates() {
    let app = spawn_app_with_metrics();
    let admin = app.login_as_admin().await;

    for i in 0..5 {
        let response = app.get(&format!("/random-{i}"), None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
    app.delete("/api/users/someone", Some(&admin)).await;
    app.delete("/api/users/someone-else", Some(&admin)).await;

    let response = app.get("/api/metrics", Some(&admin)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let rendered = body_text(response).await;

    assert!(rendered.contains("http_requests_total"), "{rendered}");
    assert!(rendered.contains(r#"path="unmatched""#), "{rendered}");
    assert!(
        rendered.contains(r#"path="/api/users/{username}""#),
        "{rendered}"
    );
    assert!(!rendered.contains("random-"), "{rendered}");
    assert!(!rendered.contains("someone"), "{rendered}");
}
