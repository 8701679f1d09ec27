//! End-to-end tests against a spawned server on a random port.

mod common;

use common::{test_config, valid_payload, TestApp};
use prediction_service::startup::Application;
use service_core::error::AppError;

#[tokio::test]
async fn home_returns_static_message() {
    let app = TestApp::spawn().await;

    let response = app
        .client()
        .get(format!("{}/", app.address))
        .body("ignored request body")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body, serde_json::json!({ "message": "Flask Prediction API" }));
}

#[tokio::test]
async fn health_reports_loaded_model() {
    let app = TestApp::spawn().await;

    let response = app
        .client()
        .get(format!("{}/health", app.address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "prediction-service-test");
    assert_eq!(body["model"]["kind"], "decision_tree");
    assert_eq!(body["model"]["n_classes"], 7);
}

#[tokio::test]
async fn predict_over_the_wire() {
    let app = TestApp::spawn().await;

    let response = app
        .client()
        .post(format!("{}/predict", app.address))
        .json(&valid_payload())
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["prediction"], "Health");
}

#[tokio::test]
async fn unknown_route_returns_json_404() {
    let app = TestApp::spawn().await;

    let response = app
        .client()
        .get(format!("{}/nope", app.address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 404);
    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "No route for /nope");
}

#[tokio::test]
async fn missing_artifact_aborts_startup() {
    let mut config = test_config();
    config.artifacts.model_path = "/nonexistent/best_category_model.json".into();

    let result = Application::build(config).await;
    match result {
        Err(AppError::ConfigError(e)) => {
            assert!(e.to_string().contains("model artifact"));
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("startup should fail without a model"),
    }
}
