use std::sync::Arc;

use actix_web::{http::StatusCode, test, web};
use connection_control::{
    ConnectionControl, ConnectionControlConfig, ControlMetrics, InProcessHost, MetricsConfig,
    create_base_app,
};
use serde_json::json;

fn control(threshold: i64) -> web::Data<ConnectionControl> {
    web::Data::new(
        ConnectionControl::init(
            Arc::new(InProcessHost::new()),
            ConnectionControlConfig {
                failed_connections_threshold: threshold,
                ..Default::default()
            },
        )
        .expect("component should load"),
    )
}

fn metrics() -> web::Data<ControlMetrics> {
    web::Data::new(ControlMetrics::new().expect("metrics registry"))
}

macro_rules! app {
    ($control:expr) => {
        test::init_service(create_base_app(
            $control.clone(),
            metrics(),
            MetricsConfig { enabled: true },
        ))
        .await
    };
}

#[actix_web::test]
async fn test_health_endpoint() {
    let app = app!(control(3));
    let req = test::TestRequest::get().uri("/api/health").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "status": "healthy" }));
}

#[actix_web::test]
async fn test_variables_use_qualified_names() {
    let app = app!(control(3));
    let req = test::TestRequest::get().uri("/api/variables").to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(
        body,
        json!({
            "component_connection_control.failed_connections_threshold": 3,
            "component_connection_control.min_connection_delay": 1000,
            "component_connection_control.max_connection_delay": 2147483647i64
        })
    );
}

#[actix_web::test]
async fn test_set_variable_commits_valid_value() {
    let control = control(3);
    let app = app!(control);

    let req = test::TestRequest::put()
        .uri("/api/variables/max_connection_delay")
        .set_json(json!({ "value": 8000 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(
        body,
        json!({ "name": "component_connection_control.max_connection_delay", "value": 8000 })
    );
    assert_eq!(control.variables().max_connection_delay, 8000);
}

#[actix_web::test]
async fn test_set_variable_rejects_bad_values() {
    let control = control(3);
    let app = app!(control);

    for (name, value) in [
        ("component_connection_control.min_connection_delay", 999),
        ("component_connection_control.failed_connections_threshold", -1),
        ("no_such_variable", 5),
    ] {
        let req = test::TestRequest::put()
            .uri(&format!("/api/variables/{}", name))
            .set_json(json!({ "value": value }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{} = {}", name, value);
    }

    assert_eq!(control.variables(), ConnectionControlConfig::default());
}

#[actix_web::test]
async fn test_connection_events_feed_table_and_status() {
    let control = control(5);
    let app = app!(control);

    for _ in 0..2 {
        let req = test::TestRequest::post()
            .uri("/api/connection-events")
            .set_json(json!({ "success": false, "user": "app", "host": "web01" }))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["account"], "'app'@'web01'");
    }

    let req = test::TestRequest::get()
        .uri("/api/failed-login-attempts")
        .to_request();
    let rows: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(rows, json!([{ "USERHOST": "'app'@'web01'", "FAILED_ATTEMPTS": 2 }]));

    let req = test::TestRequest::get().uri("/api/status").to_request();
    let status: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(
        status,
        json!({ "Component_connection_control_delay_generated": 0 })
    );
}

#[actix_web::test]
async fn test_connection_event_success_clears_account() {
    let control = control(5);
    let app = app!(control);

    let failure = test::TestRequest::post()
        .uri("/api/connection-events")
        .set_json(json!({ "subclass": "change_user", "success": false, "user": "app", "host": "web01" }))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, failure).await;
    assert_eq!(body["failed_attempts"], 1);

    let success = test::TestRequest::post()
        .uri("/api/connection-events")
        .set_json(json!({ "success": true, "user": "app", "host": "web01" }))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, success).await;
    assert_eq!(body["failed_attempts"], 0);
    assert_eq!(control.table_row_count(), 0);
}

#[actix_web::test]
async fn test_connection_event_falls_back_to_client_address() {
    let app = app!(control(5));
    let req = test::TestRequest::post()
        .uri("/api/connection-events")
        .insert_header(("X-Forwarded-For", "198.51.100.23"))
        .set_json(json!({ "success": false, "user": "app" }))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["account"], "'app'@'198.51.100.23'");
}

#[actix_web::test]
async fn test_unknown_event_subclass_is_rejected() {
    let control = control(5);
    let app = app!(control);
    let req = test::TestRequest::post()
        .uri("/api/connection-events")
        .set_json(json!({ "subclass": "shutdown", "success": false, "user": "app", "host": "h" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(control.table_row_count(), 0);
}

#[actix_web::test]
async fn test_threshold_update_over_http_resets_counters() {
    let control = control(5);
    let app = app!(control);
    for user in ["a", "b"] {
        let req = test::TestRequest::post()
            .uri("/api/connection-events")
            .set_json(json!({ "success": false, "user": user, "host": "h" }))
            .to_request();
        test::call_service(&app, req).await;
    }
    assert_eq!(control.table_row_count(), 2);

    let req = test::TestRequest::put()
        .uri("/api/variables/component_connection_control.failed_connections_threshold")
        .set_json(json!({ "value": 4 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(control.table_row_count(), 0);
}

#[actix_web::test]
async fn test_metrics_endpoint_reports_component_gauges() {
    let control = control(5);
    let app = app!(control);
    let req = test::TestRequest::post()
        .uri("/api/connection-events")
        .set_json(json!({ "success": false, "user": "app", "host": "h" }))
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::get().uri("/api/metrics").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = test::read_body(resp).await;
    let text = std::str::from_utf8(&body).unwrap();
    assert!(text.contains("component_connection_control_failed_accounts 1"));
    assert!(text.contains("component_connection_control_delay_generated 0"));
    assert!(text.contains("route=\"/api/connection-events\""));
}

#[actix_web::test]
async fn test_metrics_endpoint_disabled() {
    let app = test::init_service(create_base_app(
        control(3),
        metrics(),
        MetricsConfig { enabled: false },
    ))
    .await;
    let req = test::TestRequest::get().uri("/api/metrics").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[actix_web::test]
async fn test_openapi_spec_lists_admin_routes() {
    let app = app!(control(3));
    let req = test::TestRequest::get().uri("/api/spec/v2").to_request();
    let spec: serde_json::Value = test::call_and_read_body_json(&app, req).await;

    let paths = spec["paths"].as_object().expect("spec should list paths");
    for path in [
        "/api/health",
        "/api/status",
        "/api/variables",
        "/api/failed-login-attempts",
        "/api/connection-events",
    ] {
        assert!(paths.contains_key(path), "missing {}", path);
    }
}
