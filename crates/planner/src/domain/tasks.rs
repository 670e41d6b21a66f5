//! Tasks domain facade.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use super::scoring::{rank_tasks, RankedTask};
use crate::entities::{ScoringConfig, Task, TaskComplexity, TaskPriority, TaskStatus};
use crate::errors::{PlannerError, PlannerResult};
use crate::storage::Storage;

/// Fields for a task about to be created
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub priority: TaskPriority,
    pub category: Option<String>,
    pub estimated_hours: f64,
    pub dependencies: Vec<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub complexity: Option<TaskComplexity>,
    pub criteria: BTreeMap<String, f64>,
    pub tags: Vec<String>,
    pub assignee: Option<String>,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Partial update applied by [`TasksDomain::update_task`]
#[derive(Debug, Clone, Default)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<TaskPriority>,
    pub category: Option<String>,
    pub estimated_hours: Option<f64>,
    pub due_date: Option<DateTime<Utc>>,
    pub complexity: Option<TaskComplexity>,
    /// Merged into the existing criteria
    pub criteria: BTreeMap<String, f64>,
    pub assignee: Option<String>,
}

/// Filter for [`TasksDomain::list_tasks`]; unset fields match everything
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub category: Option<String>,
    pub plan_id: Option<String>,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        self.status.map_or(true, |s| task.status == s)
            && self.priority.map_or(true, |p| task.priority == p)
            && self
                .category
                .as_deref()
                .map_or(true, |c| task.category.eq_ignore_ascii_case(c))
            && self
                .plan_id
                .as_deref()
                .map_or(true, |id| task.plan_id.as_deref() == Some(id))
    }
}

fn validate_title(title: &str) -> PlannerResult<()> {
    if title.trim().is_empty() {
        return Err(PlannerError::InvalidArgument {
            reason: "Task title cannot be empty".to_string(),
        });
    }
    Ok(())
}

fn validate_hours(hours: f64) -> PlannerResult<()> {
    if !hours.is_finite() || hours < 0.0 {
        return Err(PlannerError::InvalidArgument {
            reason: format!("Estimated hours must be a non-negative number, got {hours}"),
        });
    }
    Ok(())
}

/// Tasks domain facade providing high-level task operations
pub struct TasksDomain {
    storage: Arc<dyn Storage>,
}

impl TasksDomain {
    /// Create a new tasks domain
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Initialize the project
    pub async fn init(&self) -> PlannerResult<()> {
        self.storage.initialize().await
    }

    /// Check if project is initialized
    pub async fn is_initialized(&self) -> PlannerResult<bool> {
        self.storage.is_initialized().await
    }

    /// Create a task with the next sequential ID
    pub async fn add_task(&self, new: NewTask) -> PlannerResult<Task> {
        validate_title(&new.title)?;
        validate_hours(new.estimated_hours)?;

        let existing = self.storage.load_tasks().await?;
        let known: HashSet<&str> = existing.iter().map(|t| t.id.as_str()).collect();
        let id = self.storage.next_task_id().await?;

        let mut dependencies: Vec<String> = Vec::with_capacity(new.dependencies.len());
        for dep in new.dependencies {
            if !known.contains(dep.as_str()) {
                return Err(PlannerError::InvalidDependency { task_id: id, dep_id: dep });
            }
            if !dependencies.contains(&dep) {
                dependencies.push(dep);
            }
        }

        let mut task = Task::new(id, new.title.trim(), new.description);
        task.priority = new.priority;
        if let Some(category) = new.category {
            task.category = category;
        }
        task.estimated_hours = new.estimated_hours;
        task.dependencies = dependencies;
        task.due_date = new.due_date;
        task.complexity = new.complexity;
        task.criteria = new.criteria;
        task.tags = new.tags;
        task.assignee = new.assignee;

        self.storage.save_task(&task).await?;
        info!(task_id = %task.id, title = %task.title, "Created task");
        Ok(task)
    }

    /// List tasks matching a filter
    pub async fn list_tasks(&self, filter: &TaskFilter) -> PlannerResult<Vec<Task>> {
        let tasks = self.storage.load_tasks().await?;
        Ok(tasks.into_iter().filter(|t| filter.matches(t)).collect())
    }

    /// Get a specific task by ID
    pub async fn get_task(&self, task_id: &str) -> PlannerResult<Task> {
        self.storage
            .load_task(task_id)
            .await?
            .ok_or_else(|| PlannerError::TaskNotFound {
                task_id: task_id.to_string(),
            })
    }

    /// Apply a partial update
    pub async fn update_task(&self, task_id: &str, update: TaskUpdate) -> PlannerResult<Task> {
        let mut task = self.get_task(task_id).await?;

        if let Some(title) = update.title {
            validate_title(&title)?;
            task.title = title.trim().to_string();
        }
        if let Some(description) = update.description {
            task.description = description;
        }
        if let Some(priority) = update.priority {
            task.priority = priority;
        }
        if let Some(category) = update.category {
            task.category = category;
        }
        if let Some(hours) = update.estimated_hours {
            validate_hours(hours)?;
            task.estimated_hours = hours;
        }
        if update.due_date.is_some() {
            task.due_date = update.due_date;
        }
        if update.complexity.is_some() {
            task.complexity = update.complexity;
        }
        task.criteria.extend(update.criteria);
        if update.assignee.is_some() {
            task.assignee = update.assignee;
        }

        task.touch();
        self.storage.save_task(&task).await?;
        debug!(task_id, "Updated task");
        Ok(task)
    }

    /// Update task status
    pub async fn set_status(&self, task_id: &str, status: TaskStatus) -> PlannerResult<Task> {
        let mut task = self.get_task(task_id).await?;
        let old_status = task.status;
        task.set_status(status)?;
        self.storage.save_task(&task).await?;
        info!(task_id, from = %old_status, to = %status, "Status changed");
        Ok(task)
    }

    /// Record task progress percentage
    pub async fn set_progress(&self, task_id: &str, percent: u32) -> PlannerResult<Task> {
        let mut task = self.get_task(task_id).await?;
        task.set_progress(percent)?;
        self.storage.save_task(&task).await?;
        info!(task_id, progress = task.progress, status = %task.status, "Progress updated");
        Ok(task)
    }

    /// Remove a task and strip it from other tasks' dependency lists
    pub async fn remove_task(&self, task_id: &str) -> PlannerResult<Vec<String>> {
        self.storage.delete_task(task_id).await?;

        let mut detached = Vec::new();
        for mut task in self.storage.load_tasks().await? {
            let before = task.dependencies.len();
            task.dependencies.retain(|d| d != task_id);
            if task.dependencies.len() != before {
                task.touch();
                self.storage.save_task(&task).await?;
                detached.push(task.id);
            }
        }

        info!(task_id, detached = detached.len(), "Removed task");
        Ok(detached)
    }

    /// Highest-scoring pending task whose dependencies are all done
    pub async fn next_task(&self, config: &ScoringConfig) -> PlannerResult<Option<RankedTask>> {
        let tasks = self.storage.load_tasks().await?;

        let done_ids: Vec<&str> = tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Done)
            .map(|t| t.id.as_str())
            .collect();

        let ready: HashSet<String> = tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Pending)
            .filter(|t| !t.has_blocking_deps(&done_ids))
            .map(|t| t.id.clone())
            .collect();

        Ok(rank_tasks(&tasks, Utc::now(), config)
            .into_iter()
            .find(|r| ready.contains(&r.task.id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::FileStorage;
    use tempfile::TempDir;

    async fn setup() -> (TempDir, TasksDomain) {
        let temp_dir = TempDir::new().unwrap();
        let storage = Arc::new(FileStorage::new(temp_dir.path()));
        storage.initialize().await.unwrap();
        let domain = TasksDomain::new(storage);
        (temp_dir, domain)
    }

    #[tokio::test]
    async fn test_add_and_list_tasks() {
        let (_temp, domain) = setup().await;

        domain.add_task(NewTask::new("Task 1")).await.unwrap();
        let mut second = NewTask::new("Task 2");
        second.category = Some("backend".to_string());
        domain.add_task(second).await.unwrap();

        let tasks = domain.list_tasks(&TaskFilter::default()).await.unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[1].id, "2");

        let filter = TaskFilter {
            category: Some("Backend".to_string()),
            ..TaskFilter::default()
        };
        let backend = domain.list_tasks(&filter).await.unwrap();
        assert_eq!(backend.len(), 1);
        assert_eq!(backend[0].title, "Task 2");
    }

    #[tokio::test]
    async fn test_add_validates_input() {
        let (_temp, domain) = setup().await;

        let result = domain.add_task(NewTask::new("   ")).await;
        assert!(matches!(result, Err(PlannerError::InvalidArgument { .. })));

        let mut negative = NewTask::new("Hours");
        negative.estimated_hours = -1.0;
        let result = domain.add_task(negative).await;
        assert!(matches!(result, Err(PlannerError::InvalidArgument { .. })));

        let mut dangling = NewTask::new("Deps");
        dangling.dependencies = vec!["7".to_string()];
        let result = domain.add_task(dangling).await;
        assert!(matches!(result, Err(PlannerError::InvalidDependency { .. })));
    }

    #[tokio::test]
    async fn test_next_task_prefers_score_and_skips_blocked() {
        let (_temp, domain) = setup().await;
        let config = ScoringConfig::default();

        let base = domain.add_task(NewTask::new("Base")).await.unwrap();
        let mut blocked = NewTask::new("Blocked critical");
        blocked.priority = TaskPriority::Critical;
        blocked.dependencies = vec![base.id.clone()];
        domain.add_task(blocked).await.unwrap();
        let mut low = NewTask::new("Low");
        low.priority = TaskPriority::Low;
        domain.add_task(low).await.unwrap();

        let next = domain.next_task(&config).await.unwrap().unwrap();
        assert_eq!(next.task.title, "Base");

        domain.set_status(&base.id, TaskStatus::Done).await.unwrap();
        let next = domain.next_task(&config).await.unwrap().unwrap();
        assert_eq!(next.task.title, "Blocked critical");
    }

    #[tokio::test]
    async fn test_set_status_and_progress() {
        let (_temp, domain) = setup().await;
        let task = domain.add_task(NewTask::new("Task 1")).await.unwrap();

        let updated = domain.set_progress(&task.id, 40).await.unwrap();
        assert_eq!(updated.status, TaskStatus::InProgress);

        let updated = domain.set_status(&task.id, TaskStatus::Done).await.unwrap();
        assert_eq!(updated.progress, 100);

        let result = domain.set_status(&task.id, TaskStatus::Pending).await;
        assert!(matches!(result, Err(PlannerError::InvalidTransition { .. })));

        let result = domain.set_progress(&task.id, 40).await;
        assert!(matches!(result, Err(PlannerError::TaskClosed { .. })));
        assert_eq!(domain.get_task(&task.id).await.unwrap().progress, 100);
    }

    #[tokio::test]
    async fn test_remove_strips_dependencies() {
        let (_temp, domain) = setup().await;
        let first = domain.add_task(NewTask::new("First")).await.unwrap();
        let mut second = NewTask::new("Second");
        second.dependencies = vec![first.id.clone()];
        let second = domain.add_task(second).await.unwrap();

        let detached = domain.remove_task(&first.id).await.unwrap();
        assert_eq!(detached, vec![second.id.clone()]);

        let reloaded = domain.get_task(&second.id).await.unwrap();
        assert!(reloaded.dependencies.is_empty());
        assert!(matches!(
            domain.get_task(&first.id).await,
            Err(PlannerError::TaskNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_update_task() {
        let (_temp, domain) = setup().await;
        let task = domain.add_task(NewTask::new("Draft")).await.unwrap();

        let mut update = TaskUpdate {
            title: Some("Final".to_string()),
            estimated_hours: Some(3.5),
            ..TaskUpdate::default()
        };
        update.criteria.insert("value".to_string(), 2.0);
        let updated = domain.update_task(&task.id, update).await.unwrap();

        assert_eq!(updated.title, "Final");
        assert!((updated.estimated_hours - 3.5).abs() < f64::EPSILON);
        assert_eq!(updated.criteria.get("value"), Some(&2.0));
    }
}
