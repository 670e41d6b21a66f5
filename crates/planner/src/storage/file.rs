//! File-based storage implementation.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::fs;
use tracing::{debug, warn};

use super::traits::Storage;
use crate::entities::{Plan, Task};
use crate::errors::{PlannerError, PlannerResult};

/// Name of the per-project data directory
pub(crate) const DATA_DIR: &str = ".upm";

/// File-based storage implementation
///
/// Every task and plan lives in its own JSON file:
///
/// ```text
/// .upm/
///   config.json
///   tasks/<id>.json
///   plans/<id>.json
/// ```
pub struct FileStorage {
    /// Project root path
    project_path: PathBuf,

    /// Path to the data directory (.upm/)
    data_dir: PathBuf,

    tasks_dir: PathBuf,

    plans_dir: PathBuf,
}

impl FileStorage {
    /// Create a new file storage instance rooted at `project_path`
    pub fn new(project_path: impl AsRef<Path>) -> Self {
        let project_path = project_path.as_ref().to_path_buf();
        let data_dir = project_path.join(DATA_DIR);
        let tasks_dir = data_dir.join("tasks");
        let plans_dir = data_dir.join("plans");

        Self {
            project_path,
            data_dir,
            tasks_dir,
            plans_dir,
        }
    }

    /// Get the project path
    pub fn project_path(&self) -> &Path {
        &self.project_path
    }

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// IDs become file names, so only a conservative character set is allowed
    fn record_path(dir: &Path, id: &str) -> PlannerResult<PathBuf> {
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(PlannerError::InvalidId { id: id.to_string() });
        }
        Ok(dir.join(format!("{id}.json")))
    }

    async fn read_record<T: DeserializeOwned>(path: &Path) -> PlannerResult<Option<T>> {
        match fs::read_to_string(path).await {
            Ok(content) => serde_json::from_str(&content).map(Some).map_err(|e| {
                PlannerError::JsonParseError {
                    reason: format!("{}: {e}", path.display()),
                }
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PlannerError::FileReadError {
                path: path.display().to_string(),
                reason: e.to_string(),
            }),
        }
    }

    /// Read every `*.json` record in a directory
    async fn read_all<T: DeserializeOwned>(dir: &Path) -> PlannerResult<Vec<T>> {
        let mut entries = match fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(PlannerError::FileReadError {
                    path: dir.display().to_string(),
                    reason: e.to_string(),
                })
            }
        };

        let mut records = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(record) = Self::read_record(&path).await? {
                records.push(record);
            }
        }
        Ok(records)
    }

    /// Write pretty JSON to a sibling temp file, then rename it into place
    async fn write_record<T: Serialize + Sync>(path: &Path, value: &T) -> PlannerResult<()> {
        let write_err = |e: std::io::Error| PlannerError::FileWriteError {
            path: path.display().to_string(),
            reason: e.to_string(),
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(write_err)?;
        }

        let content = serde_json::to_string_pretty(value)?;
        let tmp = path.with_extension(format!("json.{}.tmp", uuid::Uuid::new_v4().simple()));
        fs::write(&tmp, content).await.map_err(write_err)?;
        if let Err(e) = fs::rename(&tmp, path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(write_err(e));
        }
        debug!(path = %path.display(), "Wrote record");
        Ok(())
    }

    async fn remove_record(path: &Path) -> PlannerResult<bool> {
        match fs::remove_file(path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(PlannerError::FileWriteError {
                path: path.display().to_string(),
                reason: e.to_string(),
            }),
        }
    }

    async fn ensure_initialized(&self) -> PlannerResult<()> {
        if self.is_initialized().await? {
            Ok(())
        } else {
            Err(PlannerError::NotInitialized)
        }
    }
}

#[async_trait]
impl Storage for FileStorage {
    async fn initialize(&self) -> PlannerResult<()> {
        fs::create_dir_all(&self.tasks_dir).await?;
        fs::create_dir_all(&self.plans_dir).await?;
        debug!(path = %self.data_dir.display(), "Initialized storage");
        Ok(())
    }

    fn storage_type(&self) -> &'static str {
        "file"
    }

    async fn is_initialized(&self) -> PlannerResult<bool> {
        Ok(fs::try_exists(&self.tasks_dir).await? && fs::try_exists(&self.plans_dir).await?)
    }

    async fn load_tasks(&self) -> PlannerResult<Vec<Task>> {
        self.ensure_initialized().await?;
        let mut tasks: Vec<Task> = Self::read_all(&self.tasks_dir).await?;
        tasks.sort_by(|a, b| {
            a.numeric_id()
                .cmp(&b.numeric_id())
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(tasks)
    }

    async fn load_task(&self, task_id: &str) -> PlannerResult<Option<Task>> {
        self.ensure_initialized().await?;
        let path = Self::record_path(&self.tasks_dir, task_id)?;
        Self::read_record(&path).await
    }

    async fn save_task(&self, task: &Task) -> PlannerResult<()> {
        self.ensure_initialized().await?;
        let path = Self::record_path(&self.tasks_dir, &task.id)?;
        Self::write_record(&path, task).await
    }

    async fn delete_task(&self, task_id: &str) -> PlannerResult<()> {
        self.ensure_initialized().await?;
        let path = Self::record_path(&self.tasks_dir, task_id)?;
        if Self::remove_record(&path).await? {
            Ok(())
        } else {
            Err(PlannerError::TaskNotFound {
                task_id: task_id.to_string(),
            })
        }
    }

    async fn next_task_id(&self) -> PlannerResult<String> {
        let tasks = self.load_tasks().await?;
        let max_id = tasks
            .iter()
            .filter_map(|t| t.id.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        Ok((max_id + 1).to_string())
    }

    async fn load_plans(&self) -> PlannerResult<Vec<Plan>> {
        self.ensure_initialized().await?;
        let mut plans: Vec<Plan> = Self::read_all(&self.plans_dir).await?;
        plans.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(plans)
    }

    async fn load_plan(&self, plan_id: &str) -> PlannerResult<Option<Plan>> {
        self.ensure_initialized().await?;
        let path = Self::record_path(&self.plans_dir, plan_id)?;
        Self::read_record(&path).await
    }

    async fn save_plan(&self, plan: &Plan) -> PlannerResult<()> {
        self.ensure_initialized().await?;
        let path = Self::record_path(&self.plans_dir, &plan.id)?;
        Self::write_record(&path, plan).await
    }

    async fn delete_plan(&self, plan_id: &str) -> PlannerResult<()> {
        self.ensure_initialized().await?;
        let path = Self::record_path(&self.plans_dir, plan_id)?;
        if Self::remove_record(&path).await? {
            Ok(())
        } else {
            warn!(plan_id, "Plan file already absent");
            Err(PlannerError::PlanNotFound {
                plan_id: plan_id.to_string(),
            })
        }
    }
}
