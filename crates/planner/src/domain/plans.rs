//! Plans domain facade.

use std::sync::Arc;

use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use tracing::{debug, info};

use super::templates::{assumptions_for, phases_for, risks_for};
use crate::entities::{Phase, Plan, ProjectType, Task, Timeline};
use crate::errors::{PlannerError, PlannerResult};
use crate::storage::Storage;

const MAX_SLUG_LEN: usize = 40;

/// Lowercase, dash-separated form of a project name for plan IDs
fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    let slug: String = slug.trim_end_matches('-').chars().take(MAX_SLUG_LEN).collect();
    let slug = slug.trim_end_matches('-');
    if slug.is_empty() {
        "plan".to_string()
    } else {
        slug.to_string()
    }
}

fn end_of(start: NaiveDate, days: u32) -> PlannerResult<NaiveDate> {
    start
        .checked_add_days(Days::new(u64::from(days)))
        .ok_or_else(|| PlannerError::InvalidArgument {
            reason: format!("Start date {start} is too late for a {days}-day timeline"),
        })
}

impl Plan {
    /// Lay the project type's phase template out back to back from `start`
    pub fn generate(
        project_name: &str,
        project_type: ProjectType,
        start: NaiveDate,
        now: DateTime<Utc>,
    ) -> PlannerResult<Self> {
        let project_name = project_name.trim();
        if project_name.is_empty() {
            return Err(PlannerError::InvalidArgument {
                reason: "Project name cannot be empty".to_string(),
            });
        }

        let templates = phases_for(project_type);
        let mut phases: Vec<Phase> = Vec::with_capacity(templates.len());
        let mut cursor = start;
        for template in templates {
            let phase_start = cursor;
            cursor = end_of(phase_start, template.duration)?;
            phases.push(Phase {
                name: template.name.to_string(),
                description: template.description.to_string(),
                tasks: template.tasks.iter().map(|t| (*t).to_string()).collect(),
                duration: template.duration,
                priority: template.priority,
                start: phase_start,
                end: cursor,
            });
        }

        let duration_days = phases.iter().map(|p| p.duration).sum();
        let id = format!(
            "{}-{}",
            slugify(project_name),
            &uuid::Uuid::new_v4().simple().to_string()[..8]
        );

        Ok(Self {
            id,
            project_name: project_name.to_string(),
            project_type,
            phases,
            timeline: Timeline {
                start,
                end: end_of(start, duration_days)?,
                duration_days,
            },
            risks: risks_for(project_type),
            assumptions: assumptions_for(project_type),
            created_at: Some(now),
            updated_at: Some(now),
        })
    }
}

/// Plans domain facade providing plan generation and persistence
pub struct PlansDomain {
    storage: Arc<dyn Storage>,
}

impl PlansDomain {
    /// Create a new plans domain
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Generate and persist a plan; the timeline starts today unless given
    pub async fn create_plan(
        &self,
        project_name: &str,
        project_type: ProjectType,
        start: Option<NaiveDate>,
    ) -> PlannerResult<Plan> {
        let now = Utc::now();
        let start = start.unwrap_or_else(|| now.date_naive());
        let plan = Plan::generate(project_name, project_type, start, now)?;
        self.storage.save_plan(&plan).await?;
        info!(
            plan_id = %plan.id,
            project_type = %plan.project_type,
            phases = plan.phases.len(),
            "Created plan"
        );
        Ok(plan)
    }

    pub async fn list_plans(&self) -> PlannerResult<Vec<Plan>> {
        self.storage.load_plans().await
    }

    pub async fn get_plan(&self, plan_id: &str) -> PlannerResult<Plan> {
        self.storage
            .load_plan(plan_id)
            .await?
            .ok_or_else(|| PlannerError::PlanNotFound {
                plan_id: plan_id.to_string(),
            })
    }

    /// Delete a plan; tasks materialized from it are kept
    pub async fn remove_plan(&self, plan_id: &str) -> PlannerResult<()> {
        self.storage.delete_plan(plan_id).await?;
        info!(plan_id, "Removed plan");
        Ok(())
    }

    /// Turn every phase task of a plan into a stored [`Task`].
    ///
    /// Each task is estimated at an equal share of its phase's working hours,
    /// is due at the end of its phase and depends on every task of the
    /// previous phase.
    pub async fn materialize_tasks(
        &self,
        plan_id: &str,
        hours_per_day: f64,
    ) -> PlannerResult<Vec<Task>> {
        if !(hours_per_day.is_finite() && hours_per_day > 0.0) {
            return Err(PlannerError::InvalidArgument {
                reason: format!("hoursPerDay must be positive, got {hours_per_day}"),
            });
        }

        let plan = self.get_plan(plan_id).await?;
        let existing = self.storage.load_tasks().await?;

        let count = existing
            .iter()
            .filter(|t| t.plan_id.as_deref() == Some(plan_id))
            .count();
        if count > 0 {
            return Err(PlannerError::PlanAlreadyMaterialized {
                plan_id: plan_id.to_string(),
                count,
            });
        }

        let mut next_id = existing
            .iter()
            .filter_map(|t| t.id.parse::<u64>().ok())
            .max()
            .unwrap_or(0)
            + 1;

        let mut created = Vec::with_capacity(plan.task_count());
        let mut previous_phase: Vec<String> = Vec::new();

        for phase in &plan.phases {
            #[allow(clippy::cast_precision_loss)]
            let share = f64::from(phase.duration) * hours_per_day / phase.tasks.len().max(1) as f64;
            let due = phase.end.and_time(NaiveTime::default()).and_utc();

            let mut this_phase = Vec::with_capacity(phase.tasks.len());
            for title in &phase.tasks {
                let mut task = Task::new(next_id.to_string(), title.clone(), phase.description.clone());
                next_id += 1;
                task.category.clone_from(&phase.name);
                task.priority = phase.priority;
                task.estimated_hours = (share * 100.0).round() / 100.0;
                task.due_date = Some(due);
                task.dependencies.clone_from(&previous_phase);
                task.plan_id = Some(plan.id.clone());

                debug!(task_id = %task.id, phase = %phase.name, "Materialized task");
                this_phase.push(task.id.clone());
                created.push(task);
            }
            previous_phase = this_phase;
        }

        self.storage.save_tasks(&created).await?;
        info!(plan_id, count = created.len(), "Materialized plan tasks");
        Ok(created)
    }
}
