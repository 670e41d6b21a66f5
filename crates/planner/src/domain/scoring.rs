//! Task priority scoring.
//!
//! A task's score is the sum of independent components, each driven by a
//! weight in [`ScoringConfig`]:
//!
//! | component    | contribution                                      |
//! |--------------|---------------------------------------------------|
//! | priority     | `priorityWeights[priority] × priorityMultiplier`  |
//! | urgency      | overdue bonus, or the first matching due-date tier |
//! | complexity   | `complexityWeights[complexity]`, 0 when unset      |
//! | dependencies | `done deps ÷ all deps × dependencyWeight`          |
//! | progress     | `progress ÷ 100 × progressWeight`                  |
//! | criteria     | `Σ value × criteriaWeights[name]` (default 1.0)    |
//!
//! Scoring is pure: the same task, context and config always produce the
//! same breakdown.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::entities::{ScoringConfig, Task, TaskPriority, TaskStatus};

const CRITICAL_THRESHOLD: f64 = 80.0;
const HIGH_THRESHOLD: f64 = 60.0;
const MEDIUM_THRESHOLD: f64 = 40.0;
const LOW_THRESHOLD: f64 = 20.0;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Inputs shared by every task scored in one pass
#[derive(Debug, Clone)]
pub struct ScoringContext {
    pub now: DateTime<Utc>,
    pub done_ids: HashSet<String>,
}

impl ScoringContext {
    /// Build a context from the full task list
    pub fn from_tasks(tasks: &[Task], now: DateTime<Utc>) -> Self {
        let done_ids = tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Done)
            .map(|t| t.id.clone())
            .collect();
        Self { now, done_ids }
    }
}

/// Per-component score of one task
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    #[serde(rename = "taskId")]
    pub task_id: String,
    pub priority: f64,
    pub urgency: f64,
    pub complexity: f64,
    pub dependencies: f64,
    pub progress: f64,
    pub criteria: f64,
    pub total: f64,
    pub bucket: TaskPriority,
}

/// A task paired with its score
#[derive(Debug, Clone)]
pub struct RankedTask {
    pub task: Task,
    pub score: ScoreBreakdown,
}

/// Map a total score onto a priority level
pub fn bucket_for_score(score: f64) -> TaskPriority {
    if score >= CRITICAL_THRESHOLD {
        TaskPriority::Critical
    } else if score >= HIGH_THRESHOLD {
        TaskPriority::High
    } else if score >= MEDIUM_THRESHOLD {
        TaskPriority::Medium
    } else if score >= LOW_THRESHOLD {
        TaskPriority::Low
    } else {
        TaskPriority::Optional
    }
}

fn urgency_bonus(task: &Task, now: DateTime<Utc>, config: &ScoringConfig) -> f64 {
    let Some(due) = task.due_date else {
        return 0.0;
    };
    if due < now {
        return config.urgency.overdue;
    }

    #[allow(clippy::cast_precision_loss)]
    let days_left = (due - now).num_seconds() as f64 / SECONDS_PER_DAY;

    let mut tiers = config.urgency.tiers.clone();
    tiers.sort_by(|a, b| a.within_days.total_cmp(&b.within_days));
    tiers
        .iter()
        .find(|tier| days_left <= tier.within_days)
        .map_or(0.0, |tier| tier.bonus)
}

#[allow(clippy::cast_precision_loss)]
fn dependency_ratio(task: &Task, ctx: &ScoringContext) -> f64 {
    if task.dependencies.is_empty() {
        return 1.0;
    }
    let done = task
        .dependencies
        .iter()
        .filter(|d| ctx.done_ids.contains(d.as_str()))
        .count();
    done as f64 / task.dependencies.len() as f64
}

/// Score a single task
pub fn score_task(task: &Task, ctx: &ScoringContext, config: &ScoringConfig) -> ScoreBreakdown {
    let priority = config.priority_weights.weight(task.priority) * config.priority_multiplier;
    let urgency = urgency_bonus(task, ctx.now, config);
    let complexity = task
        .complexity
        .map_or(0.0, |c| config.complexity_weights.weight(c));
    let dependencies = dependency_ratio(task, ctx) * config.dependency_weight;
    let progress = f64::from(task.progress) / 100.0 * config.progress_weight;
    let criteria = task
        .criteria
        .iter()
        .map(|(name, value)| value * config.criteria_weights.get(name).copied().unwrap_or(1.0))
        .sum::<f64>();

    let total = priority + urgency + complexity + dependencies + progress + criteria;

    ScoreBreakdown {
        task_id: task.id.clone(),
        priority,
        urgency,
        complexity,
        dependencies,
        progress,
        criteria,
        total,
        bucket: bucket_for_score(total),
    }
}

/// Score every task and sort by descending total, ties by ascending ID
pub fn rank_tasks(
    tasks: &[Task],
    now: DateTime<Utc>,
    config: &ScoringConfig,
) -> Vec<RankedTask> {
    let ctx = ScoringContext::from_tasks(tasks, now);
    let mut ranked: Vec<RankedTask> = tasks
        .iter()
        .map(|task| RankedTask {
            score: score_task(task, &ctx, config),
            task: task.clone(),
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.score
            .total
            .total_cmp(&a.score.total)
            .then_with(|| a.task.numeric_id().cmp(&b.task.numeric_id()))
            .then_with(|| a.task.id.cmp(&b.task.id))
    });
    ranked
}
