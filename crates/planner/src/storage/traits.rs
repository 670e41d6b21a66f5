//! Storage trait definitions.

use async_trait::async_trait;

use crate::entities::{Plan, Task};
use crate::errors::PlannerResult;

/// Storage interface for task and plan persistence
#[async_trait]
pub trait Storage: Send + Sync {
    /// Initialize storage (create directories, etc.)
    async fn initialize(&self) -> PlannerResult<()>;

    /// Get storage type identifier
    fn storage_type(&self) -> &'static str;

    /// Check if storage is initialized
    async fn is_initialized(&self) -> PlannerResult<bool>;

    // === Task Operations ===

    /// Load all tasks, ordered by numeric ID
    async fn load_tasks(&self) -> PlannerResult<Vec<Task>>;

    /// Load a single task by ID
    async fn load_task(&self, task_id: &str) -> PlannerResult<Option<Task>>;

    /// Create or replace a task
    async fn save_task(&self, task: &Task) -> PlannerResult<()>;

    /// Create or replace several tasks
    async fn save_tasks(&self, tasks: &[Task]) -> PlannerResult<()> {
        for task in tasks {
            self.save_task(task).await?;
        }
        Ok(())
    }

    /// Delete a task
    async fn delete_task(&self, task_id: &str) -> PlannerResult<()>;

    /// Get next available task ID
    async fn next_task_id(&self) -> PlannerResult<String>;

    // === Plan Operations ===

    /// Load all plans, newest first
    async fn load_plans(&self) -> PlannerResult<Vec<Plan>>;

    async fn load_plan(&self, plan_id: &str) -> PlannerResult<Option<Plan>>;

    async fn save_plan(&self, plan: &Plan) -> PlannerResult<()>;

    async fn delete_plan(&self, plan_id: &str) -> PlannerResult<()>;
}
