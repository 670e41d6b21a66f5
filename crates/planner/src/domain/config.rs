//! Configuration domain facade.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tokio::fs;
use tracing::debug;

use crate::entities::PlannerConfig;
use crate::errors::{PlannerError, PlannerResult};
use crate::storage::DATA_DIR;

/// Configuration domain facade
pub struct ConfigDomain {
    config_path: PathBuf,
}

impl ConfigDomain {
    /// Create a new config domain
    pub fn new(project_path: impl AsRef<Path>) -> Self {
        Self {
            config_path: project_path.as_ref().join(DATA_DIR).join("config.json"),
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Load configuration, falling back to defaults when the file is absent
    pub async fn load(&self) -> PlannerResult<PlannerConfig> {
        match fs::read_to_string(&self.config_path).await {
            Ok(content) => {
                let config: PlannerConfig =
                    serde_json::from_str(&content).map_err(|e| PlannerError::ConfigError {
                        reason: format!("{}: {e}", self.config_path.display()),
                    })?;
                validate(&config)?;
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(PlannerConfig::default()),
            Err(e) => Err(PlannerError::FileReadError {
                path: self.config_path.display().to_string(),
                reason: e.to_string(),
            }),
        }
    }

    /// Save configuration
    pub async fn save(&self, config: &PlannerConfig) -> PlannerResult<()> {
        validate(config)?;

        // Ensure directory exists
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(config)?;
        fs::write(&self.config_path, content).await.map_err(|e| {
            PlannerError::FileWriteError {
                path: self.config_path.display().to_string(),
                reason: e.to_string(),
            }
        })
    }

    /// Set project name
    pub async fn set_project_name(&self, name: impl Into<String>) -> PlannerResult<()> {
        let mut config = self.load().await?;
        config.global.project_name = Some(name.into());
        self.save(&config).await
    }

    /// Read one value by dotted key, e.g. `scoring.dependencyWeight`
    pub async fn get(&self, key: &str) -> PlannerResult<Value> {
        let config = self.load().await?;
        let tree = serde_json::to_value(&config)?;
        let mut node = &tree;
        for part in key.split('.') {
            node = node.get(part).ok_or_else(|| unknown_key(key))?;
        }
        Ok(node.clone())
    }

    /// Set one value by dotted key.
    ///
    /// `raw` is parsed as JSON when possible (`8`, `true`, `[1, 2]`) and
    /// taken as a plain string otherwise. The edited tree must still
    /// deserialize into a valid [`PlannerConfig`] before it is saved.
    pub async fn set(&self, key: &str, raw: &str) -> PlannerResult<PlannerConfig> {
        let config = self.load().await?;
        let mut tree = serde_json::to_value(&config)?;

        let value = serde_json::from_str::<Value>(raw)
            .unwrap_or_else(|_| Value::String(raw.to_string()));
        set_path(&mut tree, key, value)?;

        let updated: PlannerConfig =
            serde_json::from_value(tree).map_err(|e| PlannerError::InvalidConfigValue {
                key: key.to_string(),
                reason: e.to_string(),
            })?;
        validate(&updated)?;

        self.save(&updated).await?;
        debug!(key, "Updated configuration");
        Ok(updated)
    }
}

fn unknown_key(key: &str) -> PlannerError {
    PlannerError::InvalidConfigValue {
        key: key.to_string(),
        reason: "unknown configuration key".to_string(),
    }
}

/// Replace the value at a dotted path. Only the last segment may be new, and
/// only when its parent is a free-form map such as `scoring.criteriaWeights`.
fn set_path(tree: &mut Value, key: &str, value: Value) -> PlannerResult<()> {
    let parts: Vec<&str> = key.split('.').collect();
    let Some((last, parents)) = parts.split_last() else {
        return Err(unknown_key(key));
    };
    if last.is_empty() {
        return Err(unknown_key(key));
    }

    let mut node = tree;
    for part in parents {
        node = node.get_mut(*part).ok_or_else(|| unknown_key(key))?;
    }

    let free_form = key.starts_with("scoring.criteriaWeights.");
    let Some(map) = node.as_object_mut() else {
        return Err(unknown_key(key));
    };
    if !free_form && !map.contains_key(*last) && !is_optional_key(key) {
        return Err(unknown_key(key));
    }
    map.insert((*last).to_string(), value);
    Ok(())
}

/// Optional fields are omitted from the serialized tree while unset
fn is_optional_key(key: &str) -> bool {
    matches!(key, "global.projectName" | "manifests.registry")
}

fn validate(config: &PlannerConfig) -> PlannerResult<()> {
    let invalid = |key: &str, reason: String| PlannerError::InvalidConfigValue {
        key: key.to_string(),
        reason,
    };

    let hours = config.global.hours_per_day;
    if !(hours.is_finite() && hours > 0.0 && hours <= 24.0) {
        return Err(invalid(
            "global.hoursPerDay",
            format!("must be between 0 and 24, got {hours}"),
        ));
    }
    if config.global.log_level.trim().is_empty() {
        return Err(invalid("global.logLevel", "cannot be empty".to_string()));
    }
    if config.manifests.replicas == 0 {
        return Err(invalid("manifests.replicas", "must be at least 1".to_string()));
    }
    if config.manifests.port == 0 {
        return Err(invalid("manifests.port", "must be between 1 and 65535".to_string()));
    }
    config
        .manifests
        .ci_platform
        .parse::<manifests::CiPlatform>()
        .map_err(|e| invalid("manifests.ciPlatform", e.to_string()))?;
    config
        .manifests
        .runtime
        .parse::<manifests::Runtime>()
        .map_err(|e| invalid("manifests.runtime", e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_load_default_config() {
        let temp_dir = TempDir::new().unwrap();
        let domain = ConfigDomain::new(temp_dir.path());

        let config = domain.load().await.unwrap();
        assert!((config.global.hours_per_day - 8.0).abs() < f64::EPSILON);
        assert_eq!(config.manifests.ci_platform, "github");
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let domain = ConfigDomain::new(temp_dir.path());

        domain.set_project_name("Test Project").await.unwrap();

        let loaded = domain.load().await.unwrap();
        assert_eq!(loaded.global.project_name, Some("Test Project".to_string()));
        assert!(temp_dir.path().join(".upm/config.json").exists());
    }

    #[tokio::test]
    async fn test_set_dotted_keys() {
        let temp_dir = TempDir::new().unwrap();
        let domain = ConfigDomain::new(temp_dir.path());

        domain.set("scoring.dependencyWeight", "35").await.unwrap();
        domain.set("manifests.registry", "ghcr.io/acme").await.unwrap();
        domain.set("scoring.criteriaWeights.revenue", "2.5").await.unwrap();
        domain
            .set("scoring.priorityWeights.critical", "6")
            .await
            .unwrap();

        let config = domain.load().await.unwrap();
        assert!((config.scoring.dependency_weight - 35.0).abs() < f64::EPSILON);
        assert_eq!(config.manifests.registry.as_deref(), Some("ghcr.io/acme"));
        assert_eq!(config.scoring.criteria_weights.get("revenue"), Some(&2.5));
        assert!((config.scoring.priority_weights.critical - 6.0).abs() < f64::EPSILON);

        let value = domain.get("scoring.dependencyWeight").await.unwrap();
        assert_eq!(value, serde_json::json!(35.0));
    }

    #[tokio::test]
    async fn test_set_rejects_bad_values() {
        let temp_dir = TempDir::new().unwrap();
        let domain = ConfigDomain::new(temp_dir.path());

        let result = domain.set("scoring.nope", "1").await;
        assert!(matches!(result, Err(PlannerError::InvalidConfigValue { .. })));

        let result = domain.set("manifests.port", "\"eighty\"").await;
        assert!(matches!(result, Err(PlannerError::InvalidConfigValue { .. })));

        let result = domain.set("manifests.ciPlatform", "bamboo").await;
        assert!(matches!(result, Err(PlannerError::InvalidConfigValue { .. })));

        let result = domain.set("global.hoursPerDay", "0").await;
        assert!(matches!(result, Err(PlannerError::InvalidConfigValue { .. })));

        // Nothing was written
        assert!(!domain.config_path().exists());
    }
}
