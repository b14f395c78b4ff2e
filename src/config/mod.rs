// ABOUTME: Per-environment deployment configuration loaded from deployment-config.json.
// ABOUTME: User values are merged over built-in defaults; loading never fails.

mod merge;

pub use merge::merge_values;

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::diagnostics::{Diagnostics, Warning};
use crate::error::{Error, Result};
use crate::types::Environment;

pub const CONFIG_FILENAME: &str = "deployment-config.json";

pub const DEFAULT_PYTHON_VERSION: &str = "3.11";
pub const DEFAULT_NAMESPACE: &str = "anthony-store";
pub const DEFAULT_HELM_CHART: &str = "./charts/store-chart";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseKind {
    Sqlite,
    Postgresql,
}

/// Settings for one deployment environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    pub python_version: String,
    pub database: DatabaseKind,
    pub redis_required: bool,
    pub static_files: bool,
    pub migrations: bool,
    pub fixtures: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub helm_chart: Option<String>,
}

impl EnvironmentConfig {
    fn base(database: DatabaseKind, redis_required: bool, fixtures: bool) -> Self {
        Self {
            python_version: DEFAULT_PYTHON_VERSION.to_string(),
            database,
            redis_required,
            static_files: true,
            migrations: true,
            fixtures,
            namespace: None,
            helm_chart: None,
        }
    }

    /// Kubernetes namespace, falling back to the store's default.
    pub fn namespace(&self) -> &str {
        self.namespace.as_deref().unwrap_or(DEFAULT_NAMESPACE)
    }

    /// Helm chart path, falling back to the bundled chart.
    pub fn helm_chart(&self) -> &str {
        self.helm_chart.as_deref().unwrap_or(DEFAULT_HELM_CHART)
    }
}

/// Configuration for every environment. All four are always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentConfig {
    pub local: EnvironmentConfig,
    pub docker: EnvironmentConfig,
    pub kubernetes: EnvironmentConfig,
    pub github: EnvironmentConfig,
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self {
            local: EnvironmentConfig::base(DatabaseKind::Sqlite, false, true),
            docker: EnvironmentConfig::base(DatabaseKind::Postgresql, true, true),
            kubernetes: EnvironmentConfig {
                namespace: Some(DEFAULT_NAMESPACE.to_string()),
                helm_chart: Some(DEFAULT_HELM_CHART.to_string()),
                ..EnvironmentConfig::base(DatabaseKind::Postgresql, true, false)
            },
            github: EnvironmentConfig::base(DatabaseKind::Postgresql, true, false),
        }
    }
}

impl DeploymentConfig {
    pub fn for_environment(&self, environment: Environment) -> &EnvironmentConfig {
        match environment {
            Environment::Local => &self.local,
            Environment::Docker => &self.docker,
            Environment::Kubernetes => &self.kubernetes,
            Environment::Github => &self.github,
        }
    }

    /// Parse user JSON and merge each environment's keys over the defaults.
    ///
    /// Keys for unknown environments are ignored.
    pub fn from_json(content: &str) -> Result<Self> {
        let user: Value = serde_json::from_str(content)?;
        let Value::Object(user) = user else {
            return Err(Error::InvalidConfig(
                "top-level value must be an object".to_string(),
            ));
        };

        let mut merged = serde_json::to_value(Self::default())?;
        for environment in Environment::ALL {
            let Some(overrides) = user.get(environment.as_str()) else {
                continue;
            };
            if !overrides.is_object() {
                return Err(Error::InvalidConfig(format!(
                    "`{environment}` must be an object"
                )));
            }
            if let Some(base) = merged.get_mut(environment.as_str()) {
                merge_values(base, overrides);
            }
        }

        Ok(serde_json::from_value(merged)?)
    }

    /// Load the config at `path`.
    ///
    /// A missing file is created with the defaults. An unreadable or malformed
    /// file is left untouched and the defaults are used. Both cases are
    /// recorded as warnings, never errors.
    pub fn load(path: &Path, diag: &mut Diagnostics) -> Self {
        if path.exists() {
            let loaded = std::fs::read_to_string(path)
                .map_err(Error::from)
                .and_then(|content| Self::from_json(&content));

            return match loaded {
                Ok(config) => {
                    tracing::info!("Loaded deployment config from {}", path.display());
                    config
                }
                Err(e) => {
                    diag.warn(Warning::config_parse(format!(
                        "Failed to load config file: {e}. Using defaults."
                    )));
                    Self::default()
                }
            };
        }

        let config = Self::default();
        match config.save(path) {
            Ok(()) => tracing::info!("Created default deployment config at {}", path.display()),
            Err(e) => diag.warn(Warning::config_write(format!(
                "Failed to save default config: {e}"
            ))),
        }
        config
    }

    /// Write the config as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_table() {
        let config = DeploymentConfig::default();

        assert_eq!(config.local.database, DatabaseKind::Sqlite);
        assert!(!config.local.redis_required);
        assert!(config.local.fixtures);

        assert_eq!(config.docker.database, DatabaseKind::Postgresql);
        assert!(config.docker.fixtures);

        assert!(!config.kubernetes.fixtures);
        assert_eq!(config.kubernetes.namespace(), "anthony-store");
        assert_eq!(config.kubernetes.helm_chart(), "./charts/store-chart");

        assert!(config.github.namespace.is_none());
        for env in Environment::ALL {
            let record = config.for_environment(env);
            assert_eq!(record.python_version, "3.11");
            assert!(record.static_files);
            assert!(record.migrations);
        }
    }

    #[test]
    fn serialized_defaults_omit_unset_optionals() {
        let json = serde_json::to_value(DeploymentConfig::default()).unwrap();
        assert!(json["local"].get("namespace").is_none());
        assert_eq!(json["kubernetes"]["namespace"], "anthony-store");
        assert_eq!(json["local"]["database"], "sqlite");
    }

    #[test]
    fn unknown_environment_keys_are_ignored() {
        let config = DeploymentConfig::from_json(r#"{"staging": {"fixtures": true}}"#).unwrap();
        assert_eq!(config, DeploymentConfig::default());
    }

    #[test]
    fn non_object_environment_is_rejected() {
        let err = DeploymentConfig::from_json(r#"{"docker": 5}"#).unwrap_err();
        assert!(err.to_string().contains("docker"));
    }

    #[test]
    fn wrong_field_type_is_rejected() {
        assert!(DeploymentConfig::from_json(r#"{"local": {"migrations": "yes"}}"#).is_err());
    }

    #[test]
    fn namespace_fallbacks_apply_when_unset() {
        let config = DeploymentConfig::from_json(r#"{"kubernetes": {"namespace": null}}"#).unwrap();
        assert!(config.kubernetes.namespace.is_none());
        assert_eq!(config.kubernetes.namespace(), DEFAULT_NAMESPACE);
    }
}
