//! Shared setup for prediction-service integration tests.

#![allow(dead_code)]

use axum::Router;
use prediction_service::config::{
    ArtifactConfig, Environment, PredictionConfig, SecurityConfig,
};
use prediction_service::services::{ArtifactBundle, Predictor};
use prediction_service::startup::Application;
use prediction_service::{build_router, AppState};
use serde_json::{json, Value};
use service_core::config::Config as CoreConfig;
use std::path::PathBuf;
use std::sync::Arc;

pub const ALLOWED_ORIGIN: &str = "http://localhost:5173";

pub const CATEGORIES: [&str; 7] = [
    "Business",
    "Education",
    "Food",
    "Health",
    "Music",
    "Sports",
    "Technology",
];

pub fn artifacts_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("artifacts")
}

pub fn test_config() -> PredictionConfig {
    let dir = artifacts_dir();
    PredictionConfig {
        common: CoreConfig { port: 0 },
        environment: Environment::Test,
        service_name: "prediction-service-test".to_string(),
        service_version: "0.0.0-test".to_string(),
        log_level: "error".to_string(),
        otlp_endpoint: None,
        artifacts: ArtifactConfig {
            model_path: dir.join("best_category_model.json"),
            scaler_path: dir.join("scaler.json"),
            gender_encoder_path: dir.join("le_gender.json"),
            category_encoder_path: dir.join("le_category.json"),
        },
        security: SecurityConfig {
            allowed_origins: vec![ALLOWED_ORIGIN.to_string()],
        },
    }
}

/// Router over the bundled demo artifacts, for `oneshot` tests.
pub fn router() -> Router {
    let config = test_config();
    let artifacts = ArtifactBundle::load(&config.artifacts).expect("Failed to load artifacts");
    build_router(AppState {
        config,
        predictor: Predictor::new(Arc::new(artifacts)),
    })
}

/// All interests low: the demo tree falls through to "Health".
pub fn valid_payload() -> Value {
    json!({
        "age": 29,
        "gender": "Female",
        "tech_spend": 1,
        "music_freq": 1,
        "sports_hours": 1,
        "business_interest": 1,
        "edu_freq": 1,
        "food_interest": 1,
        "health_priority": 5
    })
}

pub struct TestApp {
    pub address: String,
    pub port: u16,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let app = Application::build(test_config())
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server by polling the health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp { address, port }
    }

    pub fn client(&self) -> reqwest::Client {
        reqwest::Client::new()
    }
}
