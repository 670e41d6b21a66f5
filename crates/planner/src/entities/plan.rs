//! Plan entity: phased project schedule generated from a project-type template.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::task::TaskPriority;
use crate::errors::PlannerError;

/// Kind of project a plan is generated for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProjectType {
    Web,
    Mobile,
    Api,
    Desktop,
    Data,
    Infrastructure,
    Library,
    #[default]
    Generic,
}

impl ProjectType {
    pub const ALL: [ProjectType; 8] = [
        Self::Web,
        Self::Mobile,
        Self::Api,
        Self::Desktop,
        Self::Data,
        Self::Infrastructure,
        Self::Library,
        Self::Generic,
    ];
}

impl std::fmt::Display for ProjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Web => write!(f, "web"),
            Self::Mobile => write!(f, "mobile"),
            Self::Api => write!(f, "api"),
            Self::Desktop => write!(f, "desktop"),
            Self::Data => write!(f, "data"),
            Self::Infrastructure => write!(f, "infrastructure"),
            Self::Library => write!(f, "library"),
            Self::Generic => write!(f, "generic"),
        }
    }
}

impl std::str::FromStr for ProjectType {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "web" | "webapp" | "web-app" | "frontend" => Ok(Self::Web),
            "mobile" | "ios" | "android" => Ok(Self::Mobile),
            "api" | "backend" | "service" | "microservice" => Ok(Self::Api),
            "desktop" => Ok(Self::Desktop),
            "data" | "ml" | "ai" | "data-science" | "analytics" => Ok(Self::Data),
            "infrastructure" | "infra" | "devops" | "platform" => Ok(Self::Infrastructure),
            "library" | "lib" | "sdk" | "package" => Ok(Self::Library),
            "generic" | "general" | "other" => Ok(Self::Generic),
            _ => Err(PlannerError::InvalidProjectType {
                project_type: s.to_string(),
            }),
        }
    }
}

/// One stage of a plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Phase {
    pub name: String,
    pub description: String,
    pub tasks: Vec<String>,
    /// Duration in days
    pub duration: u32,
    pub priority: TaskPriority,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Overall plan schedule
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Timeline {
    pub start: NaiveDate,
    pub end: NaiveDate,
    #[serde(rename = "durationDays")]
    pub duration_days: u32,
}

/// Qualitative level used for risk impact and probability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Risk {
    pub description: String,
    pub impact: RiskLevel,
    pub probability: RiskLevel,
    pub mitigation: String,
}

/// Generated project plan, stored as one JSON file per plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub id: String,

    #[serde(rename = "projectName")]
    pub project_name: String,

    #[serde(rename = "projectType")]
    pub project_type: ProjectType,

    pub phases: Vec<Phase>,

    pub timeline: Timeline,

    #[serde(default)]
    pub risks: Vec<Risk>,

    #[serde(default)]
    pub assumptions: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none", rename = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none", rename = "updatedAt")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Plan {
    /// Total number of phase tasks across all phases
    pub fn task_count(&self) -> usize {
        self.phases.iter().map(|p| p.tasks.len()).sum()
    }

    pub fn phase(&self, name: &str) -> Option<&Phase> {
        self.phases.iter().find(|p| p.name.eq_ignore_ascii_case(name))
    }
}
