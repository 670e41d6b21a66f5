//! Terminal UI helpers for task and plan display.
//!
//! This module uses println! for CLI output, which is appropriate
//! for terminal user interfaces.

#![allow(clippy::disallowed_macros)]

use colored::Colorize;
use comfy_table::{Cell, Color, ContentArrangement, Table};

use crate::domain::{ProjectReport, RankedTask};
use crate::entities::{Plan, RiskLevel, Task, TaskPriority, TaskStatus};

/// Get colored status string
pub fn status_colored(status: TaskStatus) -> String {
    match status {
        TaskStatus::Pending => "pending".yellow().to_string(),
        TaskStatus::InProgress => "in-progress".cyan().to_string(),
        TaskStatus::Review => "review".magenta().to_string(),
        TaskStatus::Blocked => "blocked".red().bold().to_string(),
        TaskStatus::Done => "done".green().to_string(),
        TaskStatus::Cancelled => "cancelled".red().to_string(),
    }
}

/// Get colored priority string
pub fn priority_colored(priority: TaskPriority) -> String {
    match priority {
        TaskPriority::Critical => "critical".red().bold().to_string(),
        TaskPriority::High => "high".yellow().to_string(),
        TaskPriority::Medium => "medium".normal().to_string(),
        TaskPriority::Low => "low".dimmed().to_string(),
        TaskPriority::Optional => "optional".dimmed().italic().to_string(),
    }
}

fn status_color(status: TaskStatus) -> Color {
    match status {
        TaskStatus::Pending => Color::Yellow,
        TaskStatus::InProgress => Color::Cyan,
        TaskStatus::Review => Color::Magenta,
        TaskStatus::Done => Color::Green,
        TaskStatus::Cancelled | TaskStatus::Blocked => Color::Red,
    }
}

fn priority_color(priority: TaskPriority) -> Color {
    match priority {
        TaskPriority::Critical => Color::Red,
        TaskPriority::High => Color::Yellow,
        TaskPriority::Medium => Color::White,
        TaskPriority::Low | TaskPriority::Optional => Color::DarkGrey,
    }
}

fn header(names: &[&str]) -> Vec<Cell> {
    names.iter().map(|n| Cell::new(n).fg(Color::Cyan)).collect()
}

fn deps_cell(task: &Task) -> String {
    if task.dependencies.is_empty() {
        "-".to_string()
    } else {
        task.dependencies.join(", ")
    }
}

/// Create a table for displaying tasks
pub fn task_table(tasks: &[Task]) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(header(&[
        "ID", "Title", "Status", "Priority", "Category", "Hours", "Progress", "Deps",
    ]));

    for task in tasks {
        table.add_row(vec![
            Cell::new(&task.id),
            Cell::new(&task.title),
            Cell::new(task.status.to_string()).fg(status_color(task.status)),
            Cell::new(task.priority.to_string()).fg(priority_color(task.priority)),
            Cell::new(&task.category),
            Cell::new(format!("{:.1}", task.estimated_hours)),
            Cell::new(format!("{}%", task.progress)),
            Cell::new(deps_cell(task)),
        ]);
    }

    table
}

/// Create a table showing each task's score components
pub fn score_table(ranking: &[RankedTask]) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(header(&[
        "Rank", "ID", "Title", "Priority", "Urgency", "Complexity", "Deps", "Progress",
        "Criteria", "Score", "Bucket",
    ]));

    for (rank, ranked) in ranking.iter().enumerate() {
        let s = &ranked.score;
        table.add_row(vec![
            Cell::new(rank + 1),
            Cell::new(&ranked.task.id),
            Cell::new(&ranked.task.title),
            Cell::new(format!("{:.1}", s.priority)),
            Cell::new(format!("{:.1}", s.urgency)),
            Cell::new(format!("{:.1}", s.complexity)),
            Cell::new(format!("{:.1}", s.dependencies)),
            Cell::new(format!("{:.1}", s.progress)),
            Cell::new(format!("{:.1}", s.criteria)),
            Cell::new(format!("{:.1}", s.total)),
            Cell::new(s.bucket.to_string()).fg(priority_color(s.bucket)),
        ]);
    }

    table
}

/// Create a table listing plans
pub fn plan_table(plans: &[Plan]) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(header(&[
        "ID", "Project", "Type", "Phases", "Tasks", "Start", "End", "Days",
    ]));

    for plan in plans {
        table.add_row(vec![
            Cell::new(&plan.id),
            Cell::new(&plan.project_name),
            Cell::new(plan.project_type.to_string()),
            Cell::new(plan.phases.len()),
            Cell::new(plan.task_count()),
            Cell::new(plan.timeline.start.to_string()),
            Cell::new(plan.timeline.end.to_string()),
            Cell::new(plan.timeline.duration_days),
        ]);
    }

    table
}

/// Display task details in a formatted way
pub fn display_task_details(task: &Task) {
    println!("{}", "═".repeat(60).dimmed());
    println!(
        "{} {} {}",
        "Task".cyan().bold(),
        task.id.cyan().bold(),
        format!("[{}]", task.status).yellow()
    );
    println!("{}", "═".repeat(60).dimmed());
    println!();

    println!("{}: {}", "Title".bold(), task.title);
    println!("{}: {}", "Status".bold(), status_colored(task.status));
    println!("{}: {}", "Priority".bold(), priority_colored(task.priority));
    println!("{}: {}", "Category".bold(), task.category);
    println!("{}: {}%", "Progress".bold(), task.progress);

    if task.estimated_hours > 0.0 {
        println!("{}: {:.1}", "Estimated hours".bold(), task.estimated_hours);
    }
    if let Some(complexity) = task.complexity {
        println!("{}: {complexity}", "Complexity".bold());
    }
    if let Some(due) = task.due_date {
        println!("{}: {}", "Due".bold(), due.format("%Y-%m-%d %H:%M UTC"));
    }
    if let Some(ref assignee) = task.assignee {
        println!("{}: {assignee}", "Assignee".bold());
    }
    if let Some(ref plan_id) = task.plan_id {
        println!("{}: {plan_id}", "Plan".bold());
    }
    if !task.dependencies.is_empty() {
        println!("{}: {}", "Dependencies".bold(), task.dependencies.join(", "));
    }
    if !task.tags.is_empty() {
        println!("{}: {}", "Tags".bold(), task.tags.join(", "));
    }
    if !task.criteria.is_empty() {
        let criteria: Vec<String> = task
            .criteria
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect();
        println!("{}: {}", "Criteria".bold(), criteria.join(", "));
    }

    if !task.description.is_empty() {
        println!();
        println!("{}", "Description".bold().underline());
        println!("{}", task.description);
    }

    println!();
}

fn risk_colored(level: RiskLevel) -> String {
    match level {
        RiskLevel::High => "high".red().to_string(),
        RiskLevel::Medium => "medium".yellow().to_string(),
        RiskLevel::Low => "low".green().to_string(),
    }
}

/// Display a plan with phases, risks and assumptions
pub fn display_plan(plan: &Plan) {
    println!("{}", "═".repeat(60).dimmed());
    println!(
        "{} {} {}",
        "Plan".cyan().bold(),
        plan.project_name.cyan().bold(),
        format!("[{}]", plan.project_type).yellow()
    );
    println!("{}", "═".repeat(60).dimmed());
    println!();
    println!("{}: {}", "ID".bold(), plan.id);
    println!(
        "{}: {} → {} ({} days)",
        "Timeline".bold(),
        plan.timeline.start,
        plan.timeline.end,
        plan.timeline.duration_days
    );

    let mut phases = Table::new();
    phases.set_content_arrangement(ContentArrangement::Dynamic);
    phases.set_header(header(&["#", "Phase", "Start", "End", "Days", "Priority", "Tasks"]));
    for (i, phase) in plan.phases.iter().enumerate() {
        phases.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&phase.name),
            Cell::new(phase.start.to_string()),
            Cell::new(phase.end.to_string()),
            Cell::new(phase.duration),
            Cell::new(phase.priority.to_string()).fg(priority_color(phase.priority)),
            Cell::new(phase.tasks.join("\n")),
        ]);
    }
    println!();
    println!("{phases}");

    if !plan.risks.is_empty() {
        println!();
        println!("{}", "Risks".bold().underline());
        for risk in &plan.risks {
            println!(
                "  {} {} (impact {}, probability {})",
                "•".dimmed(),
                risk.description,
                risk_colored(risk.impact),
                risk_colored(risk.probability)
            );
            println!("    {} {}", "↳".dimmed(), risk.mitigation);
        }
    }

    if !plan.assumptions.is_empty() {
        println!();
        println!("{}", "Assumptions".bold().underline());
        for assumption in &plan.assumptions {
            println!("  {} {assumption}", "•".dimmed());
        }
    }

    println!();
}

/// Display a project report in the terminal
pub fn display_report(report: &ProjectReport, project_name: &str) {
    println!("{}", format!("{project_name} status report").cyan().bold());
    println!();
    println!("{}: {}", "Tasks".bold(), report.total_tasks);
    println!(
        "{}: {}",
        "Completion".bold(),
        format!("{:.1}%", report.completion_percent).green()
    );
    println!(
        "{}: {:.1} / {:.1}",
        "Hours done".bold(),
        report.completed_hours,
        report.estimated_hours
    );
    println!();

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(header(&["Status", "Count"]));
    for status in TaskStatus::ALL {
        let count = report.by_status.get(&status.to_string()).copied().unwrap_or(0);
        table.add_row(vec![
            Cell::new(status.to_string()).fg(status_color(status)),
            Cell::new(count),
        ]);
    }
    println!("{table}");

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(header(&["Priority", "Count"]));
    for priority in TaskPriority::ALL {
        let count = report
            .by_priority
            .get(&priority.to_string())
            .copied()
            .unwrap_or(0);
        table.add_row(vec![
            Cell::new(priority.to_string()).fg(priority_color(priority)),
            Cell::new(count),
        ]);
    }
    println!("{table}");

    for (heading, refs) in [("Overdue", &report.overdue), ("Blocked", &report.blocked)] {
        if refs.is_empty() {
            continue;
        }
        println!();
        println!("{}", heading.red().bold());
        for task in refs {
            println!("  {} {} {}", "•".red(), task.id, task.title);
        }
    }
    println!();
}

/// Print success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Print info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Print warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}
