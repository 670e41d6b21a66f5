//! Prioritization domain facade.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use super::scoring::{rank_tasks, RankedTask};
use crate::entities::ScoringConfig;
use crate::errors::PlannerResult;
use crate::storage::Storage;

/// Outcome of a prioritization pass
#[derive(Debug, Clone)]
pub struct PrioritizeResult {
    /// Every task, highest score first
    pub ranking: Vec<RankedTask>,
    /// IDs of tasks whose stored priority was rewritten
    pub updated: Vec<String>,
}

/// Scores stored tasks and optionally writes the resulting priorities back
pub struct PrioritizeDomain {
    storage: Arc<dyn Storage>,
    config: ScoringConfig,
}

impl PrioritizeDomain {
    pub fn new(storage: Arc<dyn Storage>, config: ScoringConfig) -> Self {
        Self { storage, config }
    }

    /// Rank all tasks.
    ///
    /// With `apply`, each open task whose bucket differs from its priority is
    /// saved with the bucket as its new priority. Done and cancelled tasks
    /// keep their priority.
    pub async fn prioritize(&self, apply: bool) -> PlannerResult<PrioritizeResult> {
        let tasks = self.storage.load_tasks().await?;
        let ranking = rank_tasks(&tasks, Utc::now(), &self.config);

        let mut updated = Vec::new();
        if apply {
            for ranked in &ranking {
                let task = &ranked.task;
                if task.status.is_closed() || task.priority == ranked.score.bucket {
                    continue;
                }
                let mut task = task.clone();
                debug!(
                    task_id = %task.id,
                    from = %task.priority,
                    to = %ranked.score.bucket,
                    "Rewriting priority"
                );
                task.priority = ranked.score.bucket;
                task.touch();
                self.storage.save_task(&task).await?;
                updated.push(task.id);
            }
            info!(count = updated.len(), "Applied score-based priorities");
        }

        Ok(PrioritizeResult { ranking, updated })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Task, TaskPriority, TaskStatus};
    use crate::storage::FileStorage;
    use tempfile::TempDir;

    async fn setup() -> (TempDir, Arc<dyn Storage>) {
        let temp_dir = TempDir::new().unwrap();
        let storage: Arc<dyn Storage> = Arc::new(FileStorage::new(temp_dir.path()));
        storage.initialize().await.unwrap();
        (temp_dir, storage)
    }

    #[tokio::test]
    async fn test_dry_run_leaves_tasks_untouched() {
        let (_temp, storage) = setup().await;
        let mut task = Task::new("1", "Low but unblocked", "");
        task.priority = TaskPriority::Low;
        storage.save_task(&task).await.unwrap();

        let domain = PrioritizeDomain::new(Arc::clone(&storage), ScoringConfig::default());
        let result = domain.prioritize(false).await.unwrap();

        assert_eq!(result.ranking.len(), 1);
        assert!(result.updated.is_empty());
        let stored = storage.load_task("1").await.unwrap().unwrap();
        assert_eq!(stored.priority, TaskPriority::Low);
    }

    #[tokio::test]
    async fn test_apply_skips_closed_tasks() {
        let (_temp, storage) = setup().await;

        // Low: 2 × 10 + 20 = 40 -> medium
        let mut open = Task::new("1", "Open", "");
        open.priority = TaskPriority::Low;
        let mut done = Task::new("2", "Done", "");
        done.priority = TaskPriority::Low;
        done.status = TaskStatus::Done;
        let mut cancelled = Task::new("3", "Cancelled", "");
        cancelled.priority = TaskPriority::Low;
        cancelled.status = TaskStatus::Cancelled;
        storage.save_tasks(&[open, done, cancelled]).await.unwrap();

        let domain = PrioritizeDomain::new(Arc::clone(&storage), ScoringConfig::default());
        let result = domain.prioritize(true).await.unwrap();

        assert_eq!(result.updated, vec!["1".to_string()]);
        let tasks = storage.load_tasks().await.unwrap();
        assert_eq!(tasks[0].priority, TaskPriority::Medium);
        assert_eq!(tasks[1].priority, TaskPriority::Low);
        assert_eq!(tasks[2].priority, TaskPriority::Low);
    }
}
