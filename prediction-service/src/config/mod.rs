use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
pub struct PredictionConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub environment: Environment,
    pub service_name: String,
    pub service_version: String,
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
    pub artifacts: ArtifactConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Dev,
    Test,
    Prod,
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dev" | "development" => Ok(Environment::Dev),
            "test" => Ok(Environment::Test),
            "prod" | "production" => Ok(Environment::Prod),
            other => Err(format!("Unknown ENVIRONMENT '{}'", other)),
        }
    }
}

/// Locations of the four fitted artifacts exported by the offline pipeline.
#[derive(Debug, Clone, Deserialize)]
pub struct ArtifactConfig {
    pub model_path: PathBuf,
    pub scaler_path: PathBuf,
    pub gender_encoder_path: PathBuf,
    pub category_encoder_path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    pub allowed_origins: Vec<String>,
}

impl PredictionConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;

        let env_str = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string());
        let environment: Environment = env_str
            .parse()
            .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?;

        let is_prod = environment == Environment::Prod;

        let config = PredictionConfig {
            common: common_config,
            environment,
            service_name: get_env("SERVICE_NAME", Some("prediction-service"), is_prod)?,
            service_version: get_env("SERVICE_VERSION", Some(env!("CARGO_PKG_VERSION")), is_prod)?,
            log_level: get_env("LOG_LEVEL", Some("info"), is_prod)?,
            otlp_endpoint: env::var("OTLP_ENDPOINT").ok().filter(|s| !s.trim().is_empty()),
            artifacts: ArtifactConfig {
                model_path: artifact_path("MODEL_PATH", "best_category_model.json", is_prod)?,
                scaler_path: artifact_path("SCALER_PATH", "scaler.json", is_prod)?,
                gender_encoder_path: artifact_path(
                    "GENDER_ENCODER_PATH",
                    "le_gender.json",
                    is_prod,
                )?,
                category_encoder_path: artifact_path(
                    "CATEGORY_ENCODER_PATH",
                    "le_category.json",
                    is_prod,
                )?,
            },
            security: SecurityConfig {
                allowed_origins: parse_origins(&get_env(
                    "ALLOWED_ORIGINS",
                    Some("http://localhost:5173"),
                    is_prod,
                )?),
            },
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.security.allowed_origins.is_empty() {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "ALLOWED_ORIGINS must name at least one origin"
            )));
        }

        // Credentials are allowed on /predict, which forbids a wildcard origin.
        if self.security.allowed_origins.iter().any(|o| o == "*") {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "Wildcard CORS origin is not allowed"
            )));
        }

        for origin in &self.security.allowed_origins {
            if axum::http::HeaderValue::from_str(origin).is_err() {
                return Err(AppError::ConfigError(anyhow::anyhow!(
                    "Invalid CORS origin '{}'",
                    origin
                )));
            }
        }

        Ok(())
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Bundled artifacts ship in the crate's `artifacts/` directory, so the
/// default does not depend on the working directory.
fn default_artifact_path(file_name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("artifacts")
        .join(file_name)
}

fn artifact_path(key: &str, file_name: &str, is_prod: bool) -> Result<PathBuf, AppError> {
    let default = default_artifact_path(file_name);
    get_env(key, default.to_str(), is_prod).map(PathBuf::from)
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}
