//! Markdown and JSON export of plans and tasks.

use std::fmt::Write as _;

use crate::entities::{Plan, Task};
use crate::errors::{PlannerError, PlannerResult};

/// Output format for `upm export` and `upm plan export`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Json,
    Markdown,
}

impl ExportFormat {
    /// File extension without the dot
    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Markdown => "md",
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Markdown => write!(f, "markdown"),
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "md" | "markdown" => Ok(Self::Markdown),
            _ => Err(PlannerError::InvalidArgument {
                reason: format!("Unknown export format '{s}' (expected json or md)"),
            }),
        }
    }
}

/// Escape pipes so cell text cannot break a Markdown table
fn cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

/// Render a plan as a Markdown document
pub fn plan_markdown(plan: &Plan) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {}", plan.project_name);
    let _ = writeln!(out);
    let _ = writeln!(out, "- **Plan ID:** {}", plan.id);
    let _ = writeln!(out, "- **Project type:** {}", plan.project_type);
    let _ = writeln!(
        out,
        "- **Timeline:** {} to {} ({} days)",
        plan.timeline.start, plan.timeline.end, plan.timeline.duration_days
    );
    let _ = writeln!(out);

    let _ = writeln!(out, "## Phases");
    let _ = writeln!(out);
    let _ = writeln!(out, "| # | Phase | Start | End | Days | Priority |");
    let _ = writeln!(out, "|---|-------|-------|-----|------|----------|");
    for (i, phase) in plan.phases.iter().enumerate() {
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} | {} | {} |",
            i + 1,
            cell(&phase.name),
            phase.start,
            phase.end,
            phase.duration,
            phase.priority
        );
    }

    for phase in &plan.phases {
        let _ = writeln!(out);
        let _ = writeln!(out, "### {}", phase.name);
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", phase.description);
        let _ = writeln!(out);
        for task in &phase.tasks {
            let _ = writeln!(out, "- [ ] {task}");
        }
    }

    if !plan.risks.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "## Risks");
        let _ = writeln!(out);
        let _ = writeln!(out, "| Risk | Impact | Probability | Mitigation |");
        let _ = writeln!(out, "|------|--------|-------------|------------|");
        for risk in &plan.risks {
            let _ = writeln!(
                out,
                "| {} | {} | {} | {} |",
                cell(&risk.description),
                risk.impact,
                risk.probability,
                cell(&risk.mitigation)
            );
        }
    }

    if !plan.assumptions.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "## Assumptions");
        let _ = writeln!(out);
        for assumption in &plan.assumptions {
            let _ = writeln!(out, "- {assumption}");
        }
    }

    out
}

/// Render a task list as a Markdown table
pub fn tasks_markdown(title: &str, tasks: &[Task]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {title}");
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "| ID | Title | Status | Priority | Category | Hours | Progress | Dependencies |"
    );
    let _ = writeln!(
        out,
        "|----|-------|--------|----------|----------|-------|----------|--------------|"
    );
    for task in tasks {
        let deps = if task.dependencies.is_empty() {
            "-".to_string()
        } else {
            task.dependencies.join(", ")
        };
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} | {} | {} | {}% | {} |",
            task.id,
            cell(&task.title),
            task.status,
            task.priority,
            cell(&task.category),
            task.estimated_hours,
            task.progress,
            deps
        );
    }
    out
}

/// Export tasks in the requested format
pub fn export_tasks(title: &str, tasks: &[Task], format: ExportFormat) -> PlannerResult<String> {
    match format {
        ExportFormat::Json => Ok(serde_json::to_string_pretty(tasks)?),
        ExportFormat::Markdown => Ok(tasks_markdown(title, tasks)),
    }
}

/// Export a plan in the requested format
pub fn export_plan(plan: &Plan, format: ExportFormat) -> PlannerResult<String> {
    match format {
        ExportFormat::Json => Ok(serde_json::to_string_pretty(plan)?),
        ExportFormat::Markdown => Ok(plan_markdown(plan)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::ProjectType;
    use chrono::{NaiveDate, Utc};

    fn sample_plan() -> Plan {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        Plan::generate("Web Shop", ProjectType::Web, start, Utc::now()).unwrap()
    }

    #[test]
    fn test_plan_markdown_sections() {
        let plan = sample_plan();
        let md = plan_markdown(&plan);

        assert!(md.starts_with("# Web Shop\n"));
        assert!(md.contains("## Phases"));
        assert!(md.contains("| 1 | Planning | 2025-01-01 | 2025-01-06 | 5 | critical |"));
        assert!(md.contains("### Frontend Development"));
        assert!(md.contains("- [ ] Gather requirements"));
        assert!(md.contains("## Risks"));
        assert!(md.contains("## Assumptions"));
    }

    #[test]
    fn test_tasks_markdown_escapes_pipes() {
        let task = Task::new("1", "Either | or", "");
        let md = tasks_markdown("Tasks", &[task]);
        assert!(md.contains("Either \\| or"));
        assert!(md.contains("| 1 |"));
    }

    #[test]
    fn test_export_json_parses_back() {
        let tasks = vec![Task::new("1", "One", ""), Task::new("2", "Two", "")];
        let json = export_tasks("Tasks", &tasks, ExportFormat::Json).unwrap();
        let parsed: Vec<Task> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.len(), 2);
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("md".parse::<ExportFormat>().unwrap(), ExportFormat::Markdown);
        assert_eq!("JSON".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert!("xml".parse::<ExportFormat>().is_err());
    }
}
