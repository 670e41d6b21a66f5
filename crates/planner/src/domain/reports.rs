//! Project status reports.

use std::collections::{BTreeMap, HashSet};
use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::entities::{Task, TaskPriority, TaskStatus};

/// Short reference to a task inside a report
#[derive(Debug, Clone, Serialize)]
pub struct TaskRef {
    pub id: String,
    pub title: String,
}

impl From<&Task> for TaskRef {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.clone(),
            title: task.title.clone(),
        }
    }
}

/// Snapshot of project progress at a point in time
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectReport {
    pub generated_at: DateTime<Utc>,
    pub total_tasks: usize,
    pub by_status: BTreeMap<String, usize>,
    pub by_priority: BTreeMap<String, usize>,
    pub estimated_hours: f64,
    pub completed_hours: f64,
    /// Done tasks as a share of non-cancelled tasks, 0-100
    pub completion_percent: f64,
    pub overdue: Vec<TaskRef>,
    /// Open tasks waiting on unfinished dependencies
    pub blocked: Vec<TaskRef>,
}

impl ProjectReport {
    #[allow(clippy::cast_precision_loss)]
    pub fn build(tasks: &[Task], now: DateTime<Utc>) -> Self {
        let by_status = TaskStatus::ALL
            .iter()
            .map(|s| (s.to_string(), tasks.iter().filter(|t| t.status == *s).count()))
            .collect();
        let by_priority = TaskPriority::ALL
            .iter()
            .map(|p| (p.to_string(), tasks.iter().filter(|t| t.priority == *p).count()))
            .collect();

        let done: HashSet<&str> = tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Done)
            .map(|t| t.id.as_str())
            .collect();
        let active = tasks
            .iter()
            .filter(|t| t.status != TaskStatus::Cancelled)
            .count();

        let completion_percent = if active == 0 {
            0.0
        } else {
            done.len() as f64 / active as f64 * 100.0
        };

        let done_ids: Vec<&str> = done.iter().copied().collect();
        let overdue = tasks
            .iter()
            .filter(|t| t.is_overdue(now))
            .map(TaskRef::from)
            .collect();
        let blocked = tasks
            .iter()
            .filter(|t| !t.status.is_closed() && t.has_blocking_deps(&done_ids))
            .map(TaskRef::from)
            .collect();

        Self {
            generated_at: now,
            total_tasks: tasks.len(),
            by_status,
            by_priority,
            estimated_hours: tasks.iter().map(|t| t.estimated_hours).sum(),
            completed_hours: tasks
                .iter()
                .filter(|t| t.status == TaskStatus::Done)
                .map(|t| t.estimated_hours)
                .sum(),
            completion_percent,
            overdue,
            blocked,
        }
    }

    pub fn to_markdown(&self, project_name: &str) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "# {project_name} status report");
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "Generated {}",
            self.generated_at.format("%Y-%m-%d %H:%M UTC")
        );
        let _ = writeln!(out);
        let _ = writeln!(out, "## Summary");
        let _ = writeln!(out);
        let _ = writeln!(out, "- **Tasks:** {}", self.total_tasks);
        let _ = writeln!(out, "- **Completion:** {:.1}%", self.completion_percent);
        let _ = writeln!(
            out,
            "- **Hours:** {:.1} of {:.1} estimated hours done",
            self.completed_hours, self.estimated_hours
        );

        let _ = writeln!(out);
        let _ = writeln!(out, "## By status");
        let _ = writeln!(out);
        for (status, count) in &self.by_status {
            let _ = writeln!(out, "- {status}: {count}");
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "## By priority");
        let _ = writeln!(out);
        for (priority, count) in &self.by_priority {
            let _ = writeln!(out, "- {priority}: {count}");
        }

        for (heading, refs) in [("Overdue", &self.overdue), ("Blocked", &self.blocked)] {
            if refs.is_empty() {
                continue;
            }
            let _ = writeln!(out);
            let _ = writeln!(out, "## {heading}");
            let _ = writeln!(out);
            for task in refs {
                let _ = writeln!(out, "- {} {}", task.id, task.title);
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn tasks(now: DateTime<Utc>) -> Vec<Task> {
        let mut done = Task::new("1", "Done", "");
        done.status = TaskStatus::Done;
        done.estimated_hours = 4.0;

        let mut waiting = Task::new("2", "Waiting", "");
        waiting.dependencies = vec!["3".to_string()];
        waiting.estimated_hours = 2.0;

        let mut late = Task::new("3", "Late", "");
        late.due_date = Some(now - Duration::days(2));
        late.priority = TaskPriority::High;

        let mut dropped = Task::new("4", "Dropped", "");
        dropped.status = TaskStatus::Cancelled;

        vec![done, waiting, late, dropped]
    }

    #[test]
    fn test_report_counts() {
        let now = Utc::now();
        let report = ProjectReport::build(&tasks(now), now);

        assert_eq!(report.total_tasks, 4);
        assert_eq!(report.by_status["done"], 1);
        assert_eq!(report.by_status["pending"], 2);
        assert_eq!(report.by_status["cancelled"], 1);
        assert_eq!(report.by_priority["high"], 1);
        assert!((report.estimated_hours - 6.0).abs() < f64::EPSILON);
        assert!((report.completed_hours - 4.0).abs() < f64::EPSILON);
        // 1 done of 3 non-cancelled
        assert!((report.completion_percent - 100.0 / 3.0).abs() < 1e-9);
        assert_eq!(report.overdue.len(), 1);
        assert_eq!(report.overdue[0].id, "3");
        assert_eq!(report.blocked.len(), 1);
        assert_eq!(report.blocked[0].id, "2");
    }

    #[test]
    fn test_empty_project() {
        let report = ProjectReport::build(&[], Utc::now());
        assert_eq!(report.total_tasks, 0);
        assert!(report.completion_percent.abs() < f64::EPSILON);
    }

    #[test]
    fn test_markdown_and_json() {
        let now = Utc::now();
        let report = ProjectReport::build(&tasks(now), now);

        let md = report.to_markdown("Demo");
        assert!(md.starts_with("# Demo status report"));
        assert!(md.contains("## Overdue"));
        assert!(md.contains("- 3 Late"));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["totalTasks"], 4);
        assert!(json["completionPercent"].is_number());
    }
}
