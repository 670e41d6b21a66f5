//! Task entity and related types.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::PlannerError;

/// Task status values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Review,
    Blocked,
    Done,
    Cancelled,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 6] = [
        Self::Pending,
        Self::InProgress,
        Self::Review,
        Self::Blocked,
        Self::Done,
        Self::Cancelled,
    ];

    /// Done or cancelled
    pub fn is_closed(self) -> bool {
        matches!(self, Self::Done | Self::Cancelled)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::InProgress => write!(f, "in-progress"),
            Self::Review => write!(f, "review"),
            Self::Blocked => write!(f, "blocked"),
            Self::Done => write!(f, "done"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" | "todo" => Ok(Self::Pending),
            "in-progress" | "inprogress" | "in_progress" | "active" => Ok(Self::InProgress),
            "review" => Ok(Self::Review),
            "blocked" => Ok(Self::Blocked),
            "done" | "completed" | "complete" => Ok(Self::Done),
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            _ => Err(PlannerError::InvalidStatus {
                status: s.to_string(),
            }),
        }
    }
}

/// Task priority levels, highest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Critical,
    High,
    #[default]
    Medium,
    Low,
    Optional,
}

impl TaskPriority {
    pub const ALL: [TaskPriority; 5] = [
        Self::Critical,
        Self::High,
        Self::Medium,
        Self::Low,
        Self::Optional,
    ];

    /// Sort rank, 0 for critical
    pub fn rank(self) -> u8 {
        match self {
            Self::Critical => 0,
            Self::High => 1,
            Self::Medium => 2,
            Self::Low => 3,
            Self::Optional => 4,
        }
    }
}

impl std::fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Critical => write!(f, "critical"),
            Self::High => write!(f, "high"),
            Self::Medium => write!(f, "medium"),
            Self::Low => write!(f, "low"),
            Self::Optional => write!(f, "optional"),
        }
    }
}

impl std::str::FromStr for TaskPriority {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "critical" | "crit" | "urgent" => Ok(Self::Critical),
            "high" => Ok(Self::High),
            "medium" | "med" | "normal" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            "optional" | "opt" | "nice-to-have" => Ok(Self::Optional),
            _ => Err(PlannerError::InvalidPriority {
                priority: s.to_string(),
            }),
        }
    }
}

/// Task complexity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskComplexity {
    Simple,
    Moderate,
    Complex,
    VeryComplex,
}

impl std::fmt::Display for TaskComplexity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Simple => write!(f, "simple"),
            Self::Moderate => write!(f, "moderate"),
            Self::Complex => write!(f, "complex"),
            Self::VeryComplex => write!(f, "very-complex"),
        }
    }
}

impl std::str::FromStr for TaskComplexity {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "simple" | "low" | "easy" => Ok(Self::Simple),
            "moderate" | "medium" => Ok(Self::Moderate),
            "complex" | "high" | "hard" => Ok(Self::Complex),
            "very-complex" | "very_complex" | "verycomplex" | "very-high" => Ok(Self::VeryComplex),
            _ => Err(PlannerError::InvalidComplexity {
                complexity: s.to_string(),
            }),
        }
    }
}

fn default_category() -> String {
    "general".to_string()
}

/// Core task structure, stored as one JSON file per task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Sequential identifier ("1", "2", ...)
    pub id: String,

    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub priority: TaskPriority,

    #[serde(default = "default_category")]
    pub category: String,

    #[serde(default, rename = "estimatedHours")]
    pub estimated_hours: f64,

    /// IDs of prerequisite tasks
    #[serde(default)]
    pub dependencies: Vec<String>,

    #[serde(default)]
    pub status: TaskStatus,

    /// Completion percentage (0-100)
    #[serde(default)]
    pub progress: u8,

    #[serde(default, skip_serializing_if = "Option::is_none", rename = "dueDate")]
    pub due_date: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complexity: Option<TaskComplexity>,

    /// Custom scoring criteria (name -> value)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub criteria: BTreeMap<String, f64>,

    /// Plan this task was generated from
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "planId")]
    pub plan_id: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none", rename = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none", rename = "updatedAt")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Create a new task with minimal required fields
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            priority: TaskPriority::default(),
            category: default_category(),
            estimated_hours: 0.0,
            dependencies: Vec::new(),
            status: TaskStatus::default(),
            progress: 0,
            due_date: None,
            complexity: None,
            criteria: BTreeMap::new(),
            plan_id: None,
            tags: Vec::new(),
            assignee: None,
            created_at: Some(now),
            updated_at: Some(now),
        }
    }

    /// Check if task has unmet dependencies
    pub fn has_blocking_deps(&self, done_tasks: &[&str]) -> bool {
        self.dependencies
            .iter()
            .any(|dep| !done_tasks.contains(&dep.as_str()))
    }

    /// Past its due date and still open
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.status.is_closed() && self.due_date.is_some_and(|due| due < now)
    }

    /// Update task status with validation
    pub fn set_status(&mut self, new_status: TaskStatus) -> Result<(), PlannerError> {
        // Cannot move from done back to pending
        if self.status == TaskStatus::Done && new_status == TaskStatus::Pending {
            return Err(PlannerError::InvalidTransition {
                task_id: self.id.clone(),
                from: self.status.to_string(),
                to: new_status.to_string(),
            });
        }

        if new_status == TaskStatus::Done {
            self.progress = 100;
        }
        self.status = new_status;
        self.touch();
        Ok(())
    }

    /// Record completion percentage.
    ///
    /// Reaching 100% on an open task moves it to review; completion itself
    /// is always an explicit status change. Done and cancelled tasks keep
    /// their progress.
    pub fn set_progress(&mut self, percent: u32) -> Result<(), PlannerError> {
        if self.status.is_closed() {
            return Err(PlannerError::TaskClosed {
                task_id: self.id.clone(),
                status: self.status.to_string(),
            });
        }
        let progress =
            u8::try_from(percent)
                .ok()
                .filter(|p| *p <= 100)
                .ok_or(PlannerError::InvalidProgress { value: percent })?;

        self.progress = progress;
        if progress == 100 {
            self.status = TaskStatus::Review;
        } else if progress > 0 && self.status == TaskStatus::Pending {
            self.status = TaskStatus::InProgress;
        }
        self.touch();
        Ok(())
    }

    pub fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }

    /// Numeric form of the ID for ordering; non-numeric IDs sort last
    pub fn numeric_id(&self) -> u64 {
        self.id.parse().unwrap_or(u64::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_task_new() {
        let task = Task::new("1", "Test Task", "A test task description");
        assert_eq!(task.id, "1");
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.priority, TaskPriority::Medium);
        assert_eq!(task.category, "general");
        assert!(task.created_at.is_some());
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("in_progress".parse::<TaskStatus>().unwrap(), TaskStatus::InProgress);
        assert_eq!("completed".parse::<TaskStatus>().unwrap(), TaskStatus::Done);
        assert!("invalid".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn test_priority_parsing() {
        assert_eq!("opt".parse::<TaskPriority>().unwrap(), TaskPriority::Optional);
        assert_eq!("CRITICAL".parse::<TaskPriority>().unwrap(), TaskPriority::Critical);
        assert!("whenever".parse::<TaskPriority>().is_err());
    }

    #[test]
    fn test_done_to_pending_rejected() {
        let mut task = Task::new("1", "Test", "Test");
        task.set_status(TaskStatus::Done).unwrap();
        assert_eq!(task.progress, 100);
        assert!(task.set_status(TaskStatus::Pending).is_err());
    }

    #[test]
    fn test_progress_transitions() {
        let mut task = Task::new("1", "Test", "Test");
        task.set_progress(30).unwrap();
        assert_eq!(task.status, TaskStatus::InProgress);

        task.set_progress(100).unwrap();
        assert_eq!(task.status, TaskStatus::Review);

        assert!(task.set_progress(101).is_err());
        assert_eq!(task.progress, 100);
    }

    #[test]
    fn test_progress_rejected_on_closed_tasks() {
        let mut task = Task::new("1", "Test", "Test");
        task.set_status(TaskStatus::Done).unwrap();

        let err = task.set_progress(40).unwrap_err();
        assert!(matches!(err, PlannerError::TaskClosed { .. }));
        assert_eq!(task.status, TaskStatus::Done);
        assert_eq!(task.progress, 100);

        task.set_status(TaskStatus::Cancelled).unwrap();
        assert!(task.set_progress(10).is_err());
        assert_eq!(task.progress, 100);

        // Reopening allows progress again
        task.set_status(TaskStatus::InProgress).unwrap();
        task.set_progress(60).unwrap();
        assert_eq!(task.progress, 60);
    }

    #[test]
    fn test_overdue() {
        let now = Utc::now();
        let mut task = Task::new("1", "Test", "Test");
        assert!(!task.is_overdue(now));

        task.due_date = Some(now - Duration::days(1));
        assert!(task.is_overdue(now));

        task.status = TaskStatus::Done;
        assert!(!task.is_overdue(now));
    }

    #[test]
    fn test_json_field_names() {
        let mut task = Task::new("7", "Write docs", "");
        task.estimated_hours = 4.5;
        task.plan_id = Some("plan-1".to_string());
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["estimatedHours"], 4.5);
        assert_eq!(json["planId"], "plan-1");
        assert!(json.get("criteria").is_none());
    }
}
