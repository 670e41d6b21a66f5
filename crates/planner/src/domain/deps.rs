//! Dependency domain facade.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::info;

use crate::entities::Task;
use crate::errors::{PlannerError, PlannerResult};
use crate::storage::Storage;

/// Dependency domain facade providing dependency management operations
pub struct DependencyDomain {
    storage: Arc<dyn Storage>,
}

/// Result of dependency validation
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub invalid_deps: Vec<InvalidDep>,
    pub cycles: Vec<Vec<String>>,
}

/// Invalid dependency information
#[derive(Debug, Clone)]
pub struct InvalidDep {
    pub task_id: String,
    pub dep_id: String,
    pub reason: String,
}

impl DependencyDomain {
    /// Create a new dependency domain
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Add a dependency to a task
    pub async fn add_dependency(&self, task_id: &str, depends_on: &str) -> PlannerResult<()> {
        if task_id == depends_on {
            return Err(PlannerError::SelfDependency {
                task_id: task_id.to_string(),
            });
        }

        let tasks = self.storage.load_tasks().await?;

        let Some(task) = tasks.iter().find(|t| t.id == task_id) else {
            return Err(PlannerError::TaskNotFound {
                task_id: task_id.to_string(),
            });
        };

        if !tasks.iter().any(|t| t.id == depends_on) {
            return Err(PlannerError::InvalidDependency {
                task_id: task_id.to_string(),
                dep_id: depends_on.to_string(),
            });
        }

        if let Some(cycle) = would_create_cycle(&tasks, task_id, depends_on) {
            return Err(PlannerError::CircularDependency { cycle });
        }

        if task.dependencies.iter().any(|d| d == depends_on) {
            return Ok(());
        }

        let mut task = task.clone();
        task.dependencies.push(depends_on.to_string());
        task.touch();
        self.storage.save_task(&task).await?;
        info!(task_id, depends_on, "Added dependency");
        Ok(())
    }

    /// Remove a dependency from a task
    pub async fn remove_dependency(&self, task_id: &str, depends_on: &str) -> PlannerResult<()> {
        let mut task =
            self.storage
                .load_task(task_id)
                .await?
                .ok_or_else(|| PlannerError::TaskNotFound {
                    task_id: task_id.to_string(),
                })?;

        let before = task.dependencies.len();
        task.dependencies.retain(|d| d != depends_on);
        if task.dependencies.len() != before {
            task.touch();
            self.storage.save_task(&task).await?;
            info!(task_id, depends_on, "Removed dependency");
        }
        Ok(())
    }

    /// Validate all dependencies
    pub async fn validate(&self) -> PlannerResult<ValidationResult> {
        let tasks = self.storage.load_tasks().await?;
        Ok(validate_tasks(&tasks))
    }

    /// Fix invalid dependencies by removing them
    ///
    /// Drops references to missing tasks and self-references. Cycles are
    /// reported by [`validate`](Self::validate) but left for the user to break.
    pub async fn fix(&self) -> PlannerResult<usize> {
        let tasks = self.storage.load_tasks().await?;
        let task_ids: HashSet<_> = tasks.iter().map(|t| t.id.clone()).collect();

        let mut fixed_count = 0;
        for mut task in tasks {
            let before_len = task.dependencies.len();
            let own_id = task.id.clone();
            task.dependencies
                .retain(|d| task_ids.contains(d) && *d != own_id);
            let removed = before_len - task.dependencies.len();
            if removed > 0 {
                fixed_count += removed;
                task.touch();
                self.storage.save_task(&task).await?;
            }
        }

        Ok(fixed_count)
    }

    /// Get tasks that depend on a given task
    pub async fn get_dependents(&self, task_id: &str) -> PlannerResult<Vec<Task>> {
        let tasks = self.storage.load_tasks().await?;
        Ok(tasks
            .into_iter()
            .filter(|t| t.dependencies.iter().any(|d| d == task_id))
            .collect())
    }

    /// Get tasks that a given task depends on
    pub async fn get_dependencies(&self, task_id: &str) -> PlannerResult<Vec<Task>> {
        let tasks = self.storage.load_tasks().await?;
        let task = tasks
            .iter()
            .find(|t| t.id == task_id)
            .ok_or_else(|| PlannerError::TaskNotFound {
                task_id: task_id.to_string(),
            })?;

        let dep_ids: Vec<String> = task.dependencies.clone();
        Ok(tasks
            .into_iter()
            .filter(|t| dep_ids.contains(&t.id))
            .collect())
    }
}

/// Check dangling references and cycles across a task list
pub fn validate_tasks(tasks: &[Task]) -> ValidationResult {
    let task_ids: HashSet<_> = tasks.iter().map(|t| t.id.as_str()).collect();

    let mut invalid_deps = Vec::new();
    for task in tasks {
        for dep in &task.dependencies {
            if *dep == task.id {
                invalid_deps.push(InvalidDep {
                    task_id: task.id.clone(),
                    dep_id: dep.clone(),
                    reason: "Task depends on itself".to_string(),
                });
            } else if !task_ids.contains(dep.as_str()) {
                invalid_deps.push(InvalidDep {
                    task_id: task.id.clone(),
                    dep_id: dep.clone(),
                    reason: "Task does not exist".to_string(),
                });
            }
        }
    }

    let cycles = find_cycles(tasks)
        .into_iter()
        .filter(|c| c.len() > 1)
        .collect::<Vec<_>>();

    ValidationResult {
        is_valid: invalid_deps.is_empty() && cycles.is_empty(),
        invalid_deps,
        cycles,
    }
}

fn dependency_graph(tasks: &[Task]) -> HashMap<&str, Vec<&str>> {
    tasks
        .iter()
        .map(|t| {
            (
                t.id.as_str(),
                t.dependencies.iter().map(String::as_str).collect(),
            )
        })
        .collect()
}

/// Path `task_id -> depends_on -> ... -> task_id` if the new edge closes a loop
fn would_create_cycle(tasks: &[Task], task_id: &str, depends_on: &str) -> Option<Vec<String>> {
    let graph = dependency_graph(tasks);

    // Check if depends_on can reach task_id
    let mut parents: HashMap<&str, &str> = HashMap::new();
    let mut visited = HashSet::new();
    let mut stack = vec![depends_on];

    while let Some(current) = stack.pop() {
        if current == task_id {
            return Some(cycle_path(task_id, depends_on, &parents));
        }

        if visited.insert(current) {
            if let Some(deps) = graph.get(current) {
                for dep in deps {
                    if !visited.contains(dep) {
                        parents.entry(*dep).or_insert(current);
                        stack.push(*dep);
                    }
                }
            }
        }
    }

    None
}

/// Rebuild `task_id -> depends_on -> ... -> task_id` from DFS parent links
fn cycle_path(task_id: &str, depends_on: &str, parents: &HashMap<&str, &str>) -> Vec<String> {
    let mut back = vec![task_id];
    let mut node = task_id;
    while node != depends_on {
        match parents.get(node) {
            Some(parent) => node = parent,
            None => break,
        }
        back.push(node);
    }
    back.reverse();

    let mut cycle = Vec::with_capacity(back.len() + 1);
    cycle.push(task_id.to_string());
    cycle.extend(back.into_iter().map(str::to_string));
    cycle
}

/// Find all cycles in the dependency graph
fn find_cycles(tasks: &[Task]) -> Vec<Vec<String>> {
    let graph = dependency_graph(tasks);

    let mut cycles = Vec::new();
    let mut visited = HashSet::new();
    let mut rec_stack = HashSet::new();

    for task in tasks {
        if !visited.contains(task.id.as_str()) {
            let mut path = Vec::new();
            dfs_cycle(
                &graph,
                task.id.as_str(),
                &mut visited,
                &mut rec_stack,
                &mut path,
                &mut cycles,
            );
        }
    }

    cycles
}

fn dfs_cycle<'a>(
    graph: &HashMap<&'a str, Vec<&'a str>>,
    node: &'a str,
    visited: &mut HashSet<&'a str>,
    rec_stack: &mut HashSet<&'a str>,
    path: &mut Vec<&'a str>,
    cycles: &mut Vec<Vec<String>>,
) {
    visited.insert(node);
    rec_stack.insert(node);
    path.push(node);

    if let Some(deps) = graph.get(node) {
        for dep in deps {
            if !visited.contains(dep) {
                dfs_cycle(graph, dep, visited, rec_stack, path, cycles);
            } else if rec_stack.contains(dep) {
                if let Some(cycle_start) = path.iter().position(|n| n == dep) {
                    let cycle: Vec<String> = path[cycle_start..]
                        .iter()
                        .map(|s| (*s).to_string())
                        .collect();
                    if !cycles.contains(&cycle) {
                        cycles.push(cycle);
                    }
                }
            }
        }
    }

    path.pop();
    rec_stack.remove(node);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::FileStorage;
    use tempfile::TempDir;

    async fn setup() -> (TempDir, DependencyDomain, Arc<dyn Storage>) {
        let temp_dir = TempDir::new().unwrap();
        let storage: Arc<dyn Storage> = Arc::new(FileStorage::new(temp_dir.path()));
        storage.initialize().await.unwrap();
        for id in ["1", "2", "3"] {
            storage
                .save_task(&Task::new(id, format!("Task {id}"), "Desc"))
                .await
                .unwrap();
        }
        let domain = DependencyDomain::new(Arc::clone(&storage));
        (temp_dir, domain, storage)
    }

    #[tokio::test]
    async fn test_add_dependency() {
        let (_temp, domain, storage) = setup().await;

        domain.add_dependency("2", "1").await.unwrap();
        domain.add_dependency("2", "1").await.unwrap();

        let task2 = storage.load_task("2").await.unwrap().unwrap();
        assert_eq!(task2.dependencies, vec!["1".to_string()]);
    }

    #[tokio::test]
    async fn test_self_dependency_rejected() {
        let (_temp, domain, _storage) = setup().await;
        let result = domain.add_dependency("1", "1").await;
        assert!(matches!(result, Err(PlannerError::SelfDependency { .. })));
    }

    #[tokio::test]
    async fn test_unknown_dependency_rejected() {
        let (_temp, domain, _storage) = setup().await;
        let result = domain.add_dependency("1", "99").await;
        assert!(matches!(result, Err(PlannerError::InvalidDependency { .. })));

        let result = domain.add_dependency("99", "1").await;
        assert!(matches!(result, Err(PlannerError::TaskNotFound { .. })));
    }

    #[tokio::test]
    async fn test_cycle_detection() {
        let (_temp, domain, _storage) = setup().await;

        domain.add_dependency("2", "1").await.unwrap();
        domain.add_dependency("3", "2").await.unwrap();

        let result = domain.add_dependency("1", "3").await;
        match result {
            Err(PlannerError::CircularDependency { cycle }) => {
                assert_eq!(cycle, vec!["1", "3", "2", "1"]);
            }
            other => panic!("expected cycle, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_validate_and_fix() {
        let (_temp, domain, storage) = setup().await;

        let mut task = Task::new("4", "Task 4", "Desc");
        task.dependencies = vec!["nonexistent".to_string(), "4".to_string(), "1".to_string()];
        storage.save_task(&task).await.unwrap();

        let result = domain.validate().await.unwrap();
        assert!(!result.is_valid);
        assert_eq!(result.invalid_deps.len(), 2);

        let fixed = domain.fix().await.unwrap();
        assert_eq!(fixed, 2);

        let result = domain.validate().await.unwrap();
        assert!(result.is_valid);
        let task4 = storage.load_task("4").await.unwrap().unwrap();
        assert_eq!(task4.dependencies, vec!["1".to_string()]);
    }

    #[tokio::test]
    async fn test_validate_reports_stored_cycles() {
        let (_temp, domain, storage) = setup().await;

        let mut a = Task::new("1", "A", "");
        a.dependencies = vec!["2".to_string()];
        let mut b = Task::new("2", "B", "");
        b.dependencies = vec!["1".to_string()];
        storage.save_tasks(&[a, b]).await.unwrap();

        let result = domain.validate().await.unwrap();
        assert!(!result.is_valid);
        assert_eq!(result.cycles.len(), 1);
    }

    #[tokio::test]
    async fn test_dependents_and_dependencies() {
        let (_temp, domain, _storage) = setup().await;
        domain.add_dependency("2", "1").await.unwrap();
        domain.add_dependency("3", "1").await.unwrap();

        let dependents = domain.get_dependents("1").await.unwrap();
        assert_eq!(dependents.len(), 2);

        let deps = domain.get_dependencies("2").await.unwrap();
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].id, "1");
    }
}
