//! Configuration entities.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::plan::ProjectType;
use super::task::{TaskComplexity, TaskPriority};

/// Main configuration structure (`.upm/config.json`)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PlannerConfig {
    #[serde(default)]
    pub global: GlobalConfig,

    #[serde(default)]
    pub scoring: ScoringConfig,

    #[serde(default)]
    pub manifests: ManifestDefaults,
}

/// Global configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "projectName")]
    pub project_name: Option<String>,

    /// Default tracing filter when `RUST_LOG` is unset
    #[serde(default = "default_log_level", rename = "logLevel")]
    pub log_level: String,

    #[serde(default, rename = "defaultProjectType")]
    pub default_project_type: ProjectType,

    #[serde(default, rename = "defaultPriority")]
    pub default_priority: TaskPriority,

    /// Working hours per plan day, used to estimate materialized tasks
    #[serde(default = "default_hours_per_day", rename = "hoursPerDay")]
    pub hours_per_day: f64,
}

fn default_log_level() -> String {
    "warn".to_string()
}

const fn default_hours_per_day() -> f64 {
    8.0
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            project_name: None,
            log_level: default_log_level(),
            default_project_type: ProjectType::default(),
            default_priority: TaskPriority::default(),
            hours_per_day: default_hours_per_day(),
        }
    }
}

/// Per-priority base weights
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PriorityWeights {
    pub critical: f64,
    pub high: f64,
    pub medium: f64,
    pub low: f64,
    pub optional: f64,
}

impl PriorityWeights {
    pub fn weight(&self, priority: TaskPriority) -> f64 {
        match priority {
            TaskPriority::Critical => self.critical,
            TaskPriority::High => self.high,
            TaskPriority::Medium => self.medium,
            TaskPriority::Low => self.low,
            TaskPriority::Optional => self.optional,
        }
    }
}

impl Default for PriorityWeights {
    fn default() -> Self {
        Self {
            critical: 5.0,
            high: 4.0,
            medium: 3.0,
            low: 2.0,
            optional: 1.0,
        }
    }
}

/// One urgency step: tasks due within `within_days` get `bonus`
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct UrgencyTier {
    #[serde(rename = "withinDays")]
    pub within_days: f64,
    pub bonus: f64,
}

/// Bonuses for approaching and missed due dates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrgencyConfig {
    pub overdue: f64,
    /// Checked in ascending `within_days` order; the first match wins
    pub tiers: Vec<UrgencyTier>,
}

impl Default for UrgencyConfig {
    fn default() -> Self {
        let tiers = [(1.0, 25.0), (3.0, 20.0), (7.0, 15.0), (14.0, 10.0), (30.0, 5.0)]
            .into_iter()
            .map(|(within_days, bonus)| UrgencyTier { within_days, bonus })
            .collect();
        Self {
            overdue: 30.0,
            tiers,
        }
    }
}

/// Per-complexity weights
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ComplexityWeights {
    pub simple: f64,
    pub moderate: f64,
    pub complex: f64,
    #[serde(rename = "veryComplex")]
    pub very_complex: f64,
}

impl ComplexityWeights {
    pub fn weight(&self, complexity: TaskComplexity) -> f64 {
        match complexity {
            TaskComplexity::Simple => self.simple,
            TaskComplexity::Moderate => self.moderate,
            TaskComplexity::Complex => self.complex,
            TaskComplexity::VeryComplex => self.very_complex,
        }
    }
}

impl Default for ComplexityWeights {
    fn default() -> Self {
        Self {
            simple: 2.0,
            moderate: 5.0,
            complex: 8.0,
            very_complex: 10.0,
        }
    }
}

/// Weights for the task-priority scorer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default, rename = "priorityWeights")]
    pub priority_weights: PriorityWeights,

    #[serde(default = "default_priority_multiplier", rename = "priorityMultiplier")]
    pub priority_multiplier: f64,

    #[serde(default)]
    pub urgency: UrgencyConfig,

    #[serde(default, rename = "complexityWeights")]
    pub complexity_weights: ComplexityWeights,

    #[serde(default = "default_dependency_weight", rename = "dependencyWeight")]
    pub dependency_weight: f64,

    #[serde(default = "default_progress_weight", rename = "progressWeight")]
    pub progress_weight: f64,

    /// Weights for custom criteria; unlisted criteria weigh 1.0
    #[serde(default, rename = "criteriaWeights")]
    pub criteria_weights: BTreeMap<String, f64>,
}

const fn default_priority_multiplier() -> f64 {
    10.0
}

const fn default_dependency_weight() -> f64 {
    20.0
}

const fn default_progress_weight() -> f64 {
    5.0
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            priority_weights: PriorityWeights::default(),
            priority_multiplier: default_priority_multiplier(),
            urgency: UrgencyConfig::default(),
            complexity_weights: ComplexityWeights::default(),
            dependency_weight: default_dependency_weight(),
            progress_weight: default_progress_weight(),
            criteria_weights: BTreeMap::new(),
        }
    }
}

/// Defaults for `upm generate`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestDefaults {
    /// Image registry prefix, e.g. `ghcr.io/acme`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry: Option<String>,

    #[serde(default = "default_namespace")]
    pub namespace: String,

    #[serde(default = "default_replicas")]
    pub replicas: u32,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_runtime")]
    pub runtime: String,

    #[serde(default = "default_ci_platform", rename = "ciPlatform")]
    pub ci_platform: String,

    #[serde(default = "default_output_dir", rename = "outputDir")]
    pub output_dir: String,
}

fn default_namespace() -> String {
    "default".to_string()
}

const fn default_replicas() -> u32 {
    2
}

const fn default_port() -> u16 {
    8080
}

fn default_runtime() -> String {
    "node".to_string()
}

fn default_ci_platform() -> String {
    "github".to_string()
}

fn default_output_dir() -> String {
    ".".to_string()
}

impl Default for ManifestDefaults {
    fn default() -> Self {
        Self {
            registry: None,
            namespace: default_namespace(),
            replicas: default_replicas(),
            port: default_port(),
            runtime: default_runtime(),
            ci_platform: default_ci_platform(),
            output_dir: default_output_dir(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: PlannerConfig =
            serde_json::from_str(r#"{ "scoring": { "dependencyWeight": 30 } }"#).unwrap();
        assert!((config.scoring.dependency_weight - 30.0).abs() < f64::EPSILON);
        assert!((config.scoring.priority_multiplier - 10.0).abs() < f64::EPSILON);
        assert_eq!(config.scoring.urgency.tiers.len(), 5);
        assert_eq!(config.manifests.port, 8080);
        assert_eq!(config.global.log_level, "warn");
    }
}
