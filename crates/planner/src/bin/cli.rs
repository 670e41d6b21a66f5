//! upm - Universal Project Manager CLI.

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::disallowed_macros)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::struct_excessive_bools)]

use std::collections::BTreeMap;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use manifests::{AppSpec, Autoscaling, CiPlatform, Generator, Runtime, Target};
use planner::domain::export::{export_plan, export_tasks};
use planner::domain::{
    rank_tasks, ConfigDomain, DependencyDomain, ExportFormat, NewTask, PlansDomain,
    PrioritizeDomain, ProjectReport, TaskFilter, TaskUpdate, TasksDomain,
};
use planner::entities::{PlannerConfig, ProjectType, TaskComplexity, TaskPriority, TaskStatus};
use planner::errors::PlannerError;
use planner::storage::{FileStorage, Storage};
use planner::ui;

#[derive(Parser)]
#[command(name = "upm")]
#[command(about = "Universal Project Manager: plans, prioritized tasks and deployment manifests", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Project root directory
    #[arg(long, global = true, env = "UPM_PROJECT")]
    project: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new project with the .upm structure
    Init {
        /// Project name
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Add a new task
    Add {
        /// Task title
        #[arg(short, long)]
        title: String,

        /// Task description
        #[arg(short, long)]
        description: Option<String>,

        /// Priority (critical, high, medium, low, optional)
        #[arg(short, long)]
        priority: Option<String>,

        /// Category
        #[arg(short, long)]
        category: Option<String>,

        /// Estimated hours
        #[arg(long)]
        hours: Option<f64>,

        /// Dependencies (comma-separated task IDs)
        #[arg(long)]
        deps: Option<String>,

        /// Due date (YYYY-MM-DD or RFC 3339)
        #[arg(long)]
        due: Option<String>,

        /// Complexity (simple, moderate, complex, very-complex)
        #[arg(long)]
        complexity: Option<String>,

        /// Custom scoring criteria (name=value, comma-separated)
        #[arg(long)]
        criteria: Option<String>,

        /// Tags (comma-separated)
        #[arg(long)]
        tags: Option<String>,

        /// Assignee
        #[arg(long)]
        assignee: Option<String>,
    },

    /// List tasks
    List {
        /// Filter by status
        #[arg(short, long)]
        status: Option<String>,

        /// Filter by priority
        #[arg(short, long)]
        priority: Option<String>,

        /// Filter by category
        #[arg(short, long)]
        category: Option<String>,

        /// Only tasks materialized from this plan
        #[arg(long)]
        plan: Option<String>,

        /// Order by score and show the breakdown
        #[arg(long)]
        by_score: bool,
    },

    /// Show details of specific tasks
    Show {
        /// Task ID(s), comma-separated
        id: String,
    },

    /// Update task fields
    Update {
        /// Task ID
        #[arg(short, long)]
        id: String,

        #[arg(short, long)]
        title: Option<String>,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(short, long)]
        priority: Option<String>,

        #[arg(short, long)]
        category: Option<String>,

        #[arg(long)]
        hours: Option<f64>,

        #[arg(long)]
        due: Option<String>,

        #[arg(long)]
        complexity: Option<String>,

        /// Criteria to add or overwrite (name=value, comma-separated)
        #[arg(long)]
        criteria: Option<String>,

        #[arg(long)]
        assignee: Option<String>,
    },

    /// Set task status
    SetStatus {
        /// Task ID(s), comma-separated
        #[arg(short, long)]
        id: String,

        /// New status
        #[arg(short, long)]
        status: String,
    },

    /// Record task progress
    Progress {
        /// Task ID
        #[arg(short, long)]
        id: String,

        /// Completion percentage (0-100)
        #[arg(long)]
        percent: u32,
    },

    /// Remove a task
    Remove {
        /// Task ID
        #[arg(short, long)]
        id: String,

        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Show the next task to work on
    Next,

    /// Score all tasks and optionally rewrite their priorities
    Prioritize {
        /// Save each open task's score bucket as its priority
        #[arg(long)]
        apply: bool,
    },

    /// Manage dependencies
    #[command(subcommand)]
    Deps(DepsCommands),

    /// Generate and manage project plans
    #[command(subcommand)]
    Plan(PlanCommands),

    /// Generate deployment manifests
    #[command(subcommand)]
    Generate(GenerateCommands),

    /// Project status report
    Report {
        /// Output format (text, md, json)
        #[arg(short, long, default_value = "text")]
        format: String,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Export all tasks
    Export {
        /// Output format (json, md)
        #[arg(short, long, default_value = "json")]
        format: String,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// View or change configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum DepsCommands {
    /// Add a dependency
    Add {
        /// Task ID
        #[arg(short, long)]
        id: String,

        /// Task it depends on
        #[arg(short, long)]
        depends_on: String,
    },

    /// Remove a dependency
    Remove {
        /// Task ID
        #[arg(short, long)]
        id: String,

        /// Task to remove from the dependencies
        #[arg(short, long)]
        depends_on: String,
    },

    /// Show what a task depends on and what depends on it
    Show {
        /// Task ID
        id: String,
    },

    /// Validate all dependencies
    Validate,

    /// Fix invalid dependencies
    Fix,
}

#[derive(Subcommand)]
enum PlanCommands {
    /// Create a plan from a project-type template
    Create {
        /// Project name
        #[arg(short, long)]
        name: String,

        /// Project type (web, mobile, api, desktop, data, infrastructure, library, generic)
        #[arg(short = 't', long = "type")]
        project_type: Option<String>,

        /// Start date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        start: Option<String>,

        /// Also create a task for every phase task
        #[arg(long)]
        tasks: bool,
    },

    /// List plans
    List,

    /// Show a plan
    Show {
        /// Plan ID
        id: String,
    },

    /// Export a plan
    Export {
        /// Plan ID
        id: String,

        /// Output format (md, json)
        #[arg(short, long, default_value = "md")]
        format: String,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Create tasks for every phase task of a plan
    Tasks {
        /// Plan ID
        id: String,
    },

    /// Remove a plan
    Remove {
        /// Plan ID
        id: String,

        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Args, Clone)]
struct AppArgs {
    /// Application name (DNS-1123 label); defaults to the project name
    #[arg(short, long)]
    name: Option<String>,

    /// Image repository; defaults to the application name
    #[arg(long)]
    image: Option<String>,

    /// Image registry prefix
    #[arg(long)]
    registry: Option<String>,

    /// Image tag
    #[arg(long)]
    tag: Option<String>,

    /// Container port
    #[arg(short, long)]
    port: Option<u16>,

    /// Replica count
    #[arg(long)]
    replicas: Option<u32>,

    /// Kubernetes namespace
    #[arg(long)]
    namespace: Option<String>,

    /// Runtime (node, python, rust, go, java, dotnet)
    #[arg(short, long)]
    runtime: Option<String>,

    /// Environment variable (KEY=VALUE), repeatable
    #[arg(short, long = "env")]
    env: Vec<String>,

    /// Ingress host
    #[arg(long)]
    host: Option<String>,

    /// Health check path
    #[arg(long)]
    health_path: Option<String>,

    /// Minimum replicas for autoscaling
    #[arg(long)]
    min_replicas: Option<u32>,

    /// Maximum replicas for autoscaling
    #[arg(long)]
    max_replicas: Option<u32>,

    /// Target CPU utilization percentage for autoscaling
    #[arg(long)]
    cpu_target: Option<u8>,

    /// Add a PostgreSQL service to docker-compose
    #[arg(long)]
    postgres: bool,

    /// Add a Redis service to docker-compose
    #[arg(long)]
    redis: bool,

    /// Add a kubectl deploy stage to CI pipelines
    #[arg(long)]
    deploy: bool,

    /// Output directory; defaults to manifests.outputDir
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Overwrite existing files
    #[arg(short, long)]
    force: bool,
}

#[derive(Subcommand)]
enum GenerateCommands {
    /// Kubernetes manifests under k8s/
    Kubernetes(AppArgs),

    /// Dockerfile, .dockerignore and docker-compose.yml
    Docker(AppArgs),

    /// CI pipeline
    Ci {
        #[command(flatten)]
        app: AppArgs,

        /// Platform (github, azure, jenkins, gitlab, circleci, travis)
        #[arg(long)]
        platform: Option<String>,
    },

    /// CloudFormation stack for ECS Fargate
    Cloudformation(AppArgs),

    /// Everything above
    All {
        #[command(flatten)]
        app: AppArgs,

        /// CI platform
        #[arg(long)]
        platform: Option<String>,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the effective configuration
    Show,

    /// Print one value by dotted key
    Get {
        /// Dotted key, e.g. scoring.dependencyWeight
        key: String,
    },

    /// Set one value by dotted key
    Set {
        /// Dotted key, e.g. manifests.registry
        key: String,

        /// New value (parsed as JSON when possible)
        value: String,
    },
}

fn get_project_path(cli_path: Option<PathBuf>) -> PathBuf {
    cli_path.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

/// `RUST_LOG` wins; otherwise the configured level, or debug with `--verbose`
fn init_tracing(format: LogFormat, verbose: bool, config_level: &str) {
    let fallback = if verbose { "debug" } else { config_level };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let project_path = get_project_path(cli.project.clone());

    // A broken config file is reported by the command that loads it
    let log_level = ConfigDomain::new(&project_path)
        .load()
        .await
        .map(|c| c.global.log_level)
        .unwrap_or_else(|_| "warn".to_string());
    init_tracing(cli.log_format, cli.verbose, &log_level);

    if let Err(e) = run(cli.command, project_path).await {
        ui::print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run(command: Commands, project_path: PathBuf) -> Result<()> {
    let storage: Arc<dyn Storage> = Arc::new(FileStorage::new(&project_path));
    let tasks_domain = TasksDomain::new(Arc::clone(&storage));
    let deps_domain = DependencyDomain::new(Arc::clone(&storage));
    let plans_domain = PlansDomain::new(Arc::clone(&storage));
    let config_domain = ConfigDomain::new(&project_path);

    match command {
        Commands::Init { name } => {
            if tasks_domain.is_initialized().await? {
                ui::print_warning("Project already initialized");
                return Ok(());
            }

            tasks_domain.init().await?;

            if let Some(project_name) = name {
                config_domain.set_project_name(&project_name).await?;
            } else if !config_domain.config_path().exists() {
                config_domain.save(&PlannerConfig::default()).await?;
            }

            ui::print_success("Project initialized successfully!");
            ui::print_info(&format!(
                "Data directory created at: {}",
                project_path.join(".upm").display()
            ));
        }

        Commands::Add {
            title,
            description,
            priority,
            category,
            hours,
            deps,
            due,
            complexity,
            criteria,
            tags,
            assignee,
        } => {
            check_initialized(&tasks_domain).await?;
            let config = config_domain.load().await?;

            let new = NewTask {
                title,
                description: description.unwrap_or_default(),
                priority: match priority {
                    Some(p) => p.parse()?,
                    None => config.global.default_priority,
                },
                category,
                estimated_hours: hours.unwrap_or(0.0),
                dependencies: deps.as_deref().map(parse_csv).unwrap_or_default(),
                due_date: due.as_deref().map(parse_due).transpose()?,
                complexity: complexity
                    .map(|c| c.parse::<TaskComplexity>())
                    .transpose()?,
                criteria: criteria.as_deref().map(parse_criteria).transpose()?.unwrap_or_default(),
                tags: tags.as_deref().map(parse_csv).unwrap_or_default(),
                assignee,
            };

            let task = tasks_domain.add_task(new).await?;
            ui::print_success(&format!("Created task {} - {}", task.id, task.title));
        }

        Commands::List {
            status,
            priority,
            category,
            plan,
            by_score,
        } => {
            check_initialized(&tasks_domain).await?;

            let filter = TaskFilter {
                status: status.map(|s| s.parse::<TaskStatus>()).transpose()?,
                priority: priority.map(|p| p.parse::<TaskPriority>()).transpose()?,
                category,
                plan_id: plan,
            };

            if by_score {
                let config = config_domain.load().await?;
                let all = tasks_domain.list_tasks(&TaskFilter::default()).await?;
                let ranking: Vec<_> = rank_tasks(&all, Utc::now(), &config.scoring)
                    .into_iter()
                    .filter(|r| filter.matches(&r.task))
                    .collect();
                if ranking.is_empty() {
                    ui::print_info("No tasks found");
                } else {
                    println!("{}", ui::score_table(&ranking));
                    println!();
                    ui::print_info(&format!("{} task(s) total", ranking.len()));
                }
                return Ok(());
            }

            let tasks = tasks_domain.list_tasks(&filter).await?;
            if tasks.is_empty() {
                ui::print_info("No tasks found");
            } else {
                println!("{}", ui::task_table(&tasks));
                println!();
                ui::print_info(&format!("{} task(s) total", tasks.len()));
            }
        }

        Commands::Show { id } => {
            check_initialized(&tasks_domain).await?;

            for task_id in parse_csv(&id) {
                let task = tasks_domain.get_task(&task_id).await?;
                ui::display_task_details(&task);
            }
        }

        Commands::Update {
            id,
            title,
            description,
            priority,
            category,
            hours,
            due,
            complexity,
            criteria,
            assignee,
        } => {
            check_initialized(&tasks_domain).await?;

            let update = TaskUpdate {
                title,
                description,
                priority: priority.map(|p| p.parse::<TaskPriority>()).transpose()?,
                category,
                estimated_hours: hours,
                due_date: due.as_deref().map(parse_due).transpose()?,
                complexity: complexity
                    .map(|c| c.parse::<TaskComplexity>())
                    .transpose()?,
                criteria: criteria.as_deref().map(parse_criteria).transpose()?.unwrap_or_default(),
                assignee,
            };

            let task = tasks_domain.update_task(&id, update).await?;
            ui::print_success(&format!("Updated task {} - {}", task.id, task.title));
        }

        Commands::SetStatus { id, status } => {
            check_initialized(&tasks_domain).await?;

            let new_status: TaskStatus = status.parse()?;
            let ids = parse_csv(&id);

            for task_id in &ids {
                tasks_domain.set_status(task_id, new_status).await?;
            }

            ui::print_success(&format!(
                "Updated {} task(s) to status: {}",
                ids.len(),
                new_status
            ));
        }

        Commands::Progress { id, percent } => {
            check_initialized(&tasks_domain).await?;

            let task = tasks_domain.set_progress(&id, percent).await?;
            ui::print_success(&format!(
                "Task {} is {}% complete [{}]",
                task.id,
                task.progress,
                ui::status_colored(task.status)
            ));
        }

        Commands::Remove { id, yes } => {
            check_initialized(&tasks_domain).await?;

            if !confirm(yes, &format!("Delete task {id}?"))? {
                ui::print_warning(&format!("About to delete task {id}. Use --yes to confirm."));
                return Ok(());
            }

            let detached = tasks_domain.remove_task(&id).await?;
            ui::print_success(&format!("Removed task {id}"));
            if !detached.is_empty() {
                ui::print_info(&format!(
                    "Removed it from the dependencies of: {}",
                    detached.join(", ")
                ));
            }
        }

        Commands::Next => {
            check_initialized(&tasks_domain).await?;
            let config = config_domain.load().await?;

            if let Some(ranked) = tasks_domain.next_task(&config.scoring).await? {
                ui::print_success(&format!(
                    "Next task: {} - {} (score {:.1})",
                    ranked.task.id, ranked.task.title, ranked.score.total
                ));
                println!();
                ui::display_task_details(&ranked.task);
            } else {
                ui::print_info("No pending tasks available");
            }
        }

        Commands::Prioritize { apply } => {
            check_initialized(&tasks_domain).await?;
            let config = config_domain.load().await?;

            let domain = PrioritizeDomain::new(Arc::clone(&storage), config.scoring);
            let result = domain.prioritize(apply).await?;

            if result.ranking.is_empty() {
                ui::print_info("No tasks to prioritize");
                return Ok(());
            }

            println!("{}", ui::score_table(&result.ranking));
            println!();
            if apply {
                ui::print_success(&format!(
                    "Updated priority of {} task(s)",
                    result.updated.len()
                ));
            } else {
                ui::print_info("Run with --apply to save the buckets as priorities");
            }
        }

        Commands::Deps(deps_cmd) => {
            check_initialized(&tasks_domain).await?;

            match deps_cmd {
                DepsCommands::Add { id, depends_on } => {
                    deps_domain.add_dependency(&id, &depends_on).await?;
                    ui::print_success(&format!("Added dependency: {} -> {}", id, depends_on));
                }

                DepsCommands::Remove { id, depends_on } => {
                    deps_domain.remove_dependency(&id, &depends_on).await?;
                    ui::print_success(&format!("Removed dependency: {} -> {}", id, depends_on));
                }

                DepsCommands::Show { id } => {
                    let dependencies = deps_domain.get_dependencies(&id).await?;
                    let dependents = deps_domain.get_dependents(&id).await?;

                    println!("{}", format!("Task {id} depends on:").bold());
                    if dependencies.is_empty() {
                        println!("  {}", "nothing".dimmed());
                    }
                    for task in &dependencies {
                        println!(
                            "  {} {} - {} [{}]",
                            "•".dimmed(),
                            task.id,
                            task.title,
                            ui::status_colored(task.status)
                        );
                    }

                    println!("{}", format!("Tasks depending on {id}:").bold());
                    if dependents.is_empty() {
                        println!("  {}", "none".dimmed());
                    }
                    for task in &dependents {
                        println!(
                            "  {} {} - {} [{}]",
                            "•".dimmed(),
                            task.id,
                            task.title,
                            ui::status_colored(task.status)
                        );
                    }
                }

                DepsCommands::Validate => {
                    let result = deps_domain.validate().await?;

                    if result.is_valid {
                        ui::print_success("All dependencies are valid");
                    } else {
                        ui::print_error("Dependency issues found:");

                        for invalid in &result.invalid_deps {
                            println!(
                                "  {} Task {} -> {}: {}",
                                "•".red(),
                                invalid.task_id,
                                invalid.dep_id,
                                invalid.reason
                            );
                        }

                        for cycle in &result.cycles {
                            println!("  {} Cycle detected: {}", "•".red(), cycle.join(" -> "));
                        }

                        println!();
                        ui::print_info("Run 'upm deps fix' to drop missing references");
                    }
                }

                DepsCommands::Fix => {
                    let fixed = deps_domain.fix().await?;
                    ui::print_success(&format!("Fixed {} invalid dependency(ies)", fixed));
                }
            }
        }

        Commands::Plan(plan_cmd) => {
            check_initialized(&tasks_domain).await?;

            match plan_cmd {
                PlanCommands::Create {
                    name,
                    project_type,
                    start,
                    tasks,
                } => {
                    let config = config_domain.load().await?;
                    let project_type = match project_type {
                        Some(t) => t.parse::<ProjectType>()?,
                        None => config.global.default_project_type,
                    };
                    let start = start.as_deref().map(parse_date).transpose()?;

                    let plan = plans_domain.create_plan(&name, project_type, start).await?;
                    ui::print_success(&format!(
                        "Created {} plan {} ({} phases, {} days)",
                        plan.project_type,
                        plan.id,
                        plan.phases.len(),
                        plan.timeline.duration_days
                    ));

                    if tasks {
                        let created = plans_domain
                            .materialize_tasks(&plan.id, config.global.hours_per_day)
                            .await?;
                        ui::print_success(&format!("Created {} task(s)", created.len()));
                    }
                }

                PlanCommands::List => {
                    let plans = plans_domain.list_plans().await?;
                    if plans.is_empty() {
                        ui::print_info("No plans found");
                    } else {
                        println!("{}", ui::plan_table(&plans));
                    }
                }

                PlanCommands::Show { id } => {
                    let plan = plans_domain.get_plan(&id).await?;
                    ui::display_plan(&plan);
                }

                PlanCommands::Export { id, format, output } => {
                    let format: ExportFormat = format.parse()?;
                    let plan = plans_domain.get_plan(&id).await?;
                    let content = export_plan(&plan, format)?;
                    emit(&content, output.as_deref()).await?;
                }

                PlanCommands::Tasks { id } => {
                    let config = config_domain.load().await?;
                    let created = plans_domain
                        .materialize_tasks(&id, config.global.hours_per_day)
                        .await?;
                    println!("{}", ui::task_table(&created));
                    println!();
                    ui::print_success(&format!("Created {} task(s) from plan {id}", created.len()));
                }

                PlanCommands::Remove { id, yes } => {
                    if !confirm(yes, &format!("Delete plan {id}?"))? {
                        ui::print_warning(&format!(
                            "About to delete plan {id}. Use --yes to confirm."
                        ));
                        return Ok(());
                    }
                    plans_domain.remove_plan(&id).await?;
                    ui::print_success(&format!("Removed plan {id}"));
                }
            }
        }

        Commands::Generate(generate_cmd) => {
            let config = config_domain.load().await?;
            let generator = Generator::new()?;

            let (args, set) = match generate_cmd {
                GenerateCommands::Kubernetes(args) => {
                    let app = build_app_spec(&args, &config)?;
                    let set = generator.generate(&app, Target::Kubernetes)?;
                    (args, set)
                }
                GenerateCommands::Docker(args) => {
                    let app = build_app_spec(&args, &config)?;
                    let set = generator.generate(&app, Target::Docker)?;
                    (args, set)
                }
                GenerateCommands::Ci { app: args, platform } => {
                    let app = build_app_spec(&args, &config)?;
                    let platform = ci_platform(platform.as_deref(), &config)?;
                    let set = generator.generate(&app, Target::Ci(platform))?;
                    (args, set)
                }
                GenerateCommands::Cloudformation(args) => {
                    let app = build_app_spec(&args, &config)?;
                    let set = generator.generate(&app, Target::CloudFormation)?;
                    (args, set)
                }
                GenerateCommands::All { app: args, platform } => {
                    let app = build_app_spec(&args, &config)?;
                    let platform = ci_platform(platform.as_deref(), &config)?;
                    let set = generator.generate_all(&app, platform)?;
                    (args, set)
                }
            };

            let output = args
                .output
                .clone()
                .unwrap_or_else(|| PathBuf::from(&config.manifests.output_dir));
            let dir = if output.is_absolute() {
                output
            } else {
                project_path.join(output)
            };

            let report = set.write_to(&dir, args.force).await?;
            for path in &report.written {
                ui::print_success(&format!("Wrote {}", path.display()));
            }
            for path in &report.skipped {
                ui::print_warning(&format!("Skipped existing {}", path.display()));
            }
            if !report.skipped.is_empty() {
                ui::print_info("Use --force to overwrite existing files");
            }
        }

        Commands::Report { format, output } => {
            check_initialized(&tasks_domain).await?;
            let config = config_domain.load().await?;

            let tasks = tasks_domain.list_tasks(&TaskFilter::default()).await?;
            let report = ProjectReport::build(&tasks, Utc::now());
            let project_name = project_name(&config, &project_path);

            match format.to_lowercase().as_str() {
                "text" if output.is_none() => ui::display_report(&report, &project_name),
                "md" | "markdown" => {
                    emit(&report.to_markdown(&project_name), output.as_deref()).await?;
                }
                "json" => {
                    let content = serde_json::to_string_pretty(&report)?;
                    emit(&content, output.as_deref()).await?;
                }
                "text" => {
                    return Err(PlannerError::InvalidArgument {
                        reason: "Text reports go to the terminal; use --format md or json with --output"
                            .to_string(),
                    }
                    .into());
                }
                other => {
                    return Err(PlannerError::InvalidArgument {
                        reason: format!("Unknown report format '{other}' (expected text, md or json)"),
                    }
                    .into());
                }
            }
        }

        Commands::Export { format, output } => {
            check_initialized(&tasks_domain).await?;
            let config = config_domain.load().await?;

            let format: ExportFormat = format.parse()?;
            let tasks = tasks_domain.list_tasks(&TaskFilter::default()).await?;
            let title = format!("{} tasks", project_name(&config, &project_path));
            let content = export_tasks(&title, &tasks, format)?;
            emit(&content, output.as_deref()).await?;
        }

        Commands::Config(config_cmd) => match config_cmd {
            ConfigCommands::Show => {
                let config = config_domain.load().await?;
                println!("{}", serde_json::to_string_pretty(&config)?);
            }

            ConfigCommands::Get { key } => {
                let value = config_domain.get(&key).await?;
                println!("{}", serde_json::to_string_pretty(&value)?);
            }

            ConfigCommands::Set { key, value } => {
                config_domain.set(&key, &value).await?;
                ui::print_success(&format!("Set {key} = {value}"));
            }
        },
    }

    Ok(())
}

async fn check_initialized(domain: &TasksDomain) -> Result<(), PlannerError> {
    if !domain.is_initialized().await? {
        return Err(PlannerError::NotInitialized);
    }
    Ok(())
}

/// Ask before a destructive action; without a terminal, require `--yes`
fn confirm(yes: bool, prompt: &str) -> Result<bool> {
    if yes {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Ok(false);
    }
    let answer = dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()?;
    Ok(answer)
}

/// Print to stdout, or write to `output` when given
async fn emit(content: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            tokio::fs::write(path, content)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            ui::print_success(&format!("Wrote {}", path.display()));
        }
        None => print!("{content}"),
    }
    Ok(())
}

fn project_name(config: &PlannerConfig, project_path: &Path) -> String {
    config
        .global
        .project_name
        .clone()
        .or_else(|| {
            project_path
                .canonicalize()
                .ok()
                .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        })
        .unwrap_or_else(|| "Project".to_string())
}

fn parse_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_criteria(s: &str) -> Result<BTreeMap<String, f64>, PlannerError> {
    parse_csv(s)
        .into_iter()
        .map(|pair| {
            let (name, value) = pair.split_once('=').ok_or_else(|| PlannerError::InvalidArgument {
                reason: format!("Criterion '{pair}' must be name=value"),
            })?;
            let value: f64 = value.trim().parse().map_err(|_| PlannerError::InvalidArgument {
                reason: format!("Criterion '{name}' needs a numeric value, got '{value}'"),
            })?;
            Ok((name.trim().to_string(), value))
        })
        .collect()
}

fn parse_date(s: &str) -> Result<NaiveDate, PlannerError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| PlannerError::InvalidArgument {
        reason: format!("Invalid date '{s}' (expected YYYY-MM-DD)"),
    })
}

fn parse_due(s: &str) -> Result<DateTime<Utc>, PlannerError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    parse_date(s)
        .map(|d| d.and_time(NaiveTime::default()).and_utc())
        .map_err(|_| PlannerError::InvalidArgument {
            reason: format!("Invalid due date '{s}' (expected YYYY-MM-DD or RFC 3339)"),
        })
}

fn ci_platform(flag: Option<&str>, config: &PlannerConfig) -> Result<CiPlatform> {
    let name = flag.unwrap_or(&config.manifests.ci_platform);
    Ok(name.parse::<CiPlatform>().map_err(PlannerError::from)?)
}

/// Combine command-line flags with the `manifests` config section
fn build_app_spec(args: &AppArgs, config: &PlannerConfig) -> Result<AppSpec> {
    let defaults = &config.manifests;

    let name = args
        .name
        .clone()
        .or_else(|| {
            config
                .global
                .project_name
                .as_ref()
                .map(|n| n.trim().to_lowercase().split_whitespace().collect::<Vec<_>>().join("-"))
        })
        .ok_or_else(|| PlannerError::InvalidArgument {
            reason: "Application name required: pass --name or set global.projectName".to_string(),
        })?;

    let runtime: Runtime = args
        .runtime
        .as_deref()
        .unwrap_or(&defaults.runtime)
        .parse()
        .map_err(PlannerError::from)?;

    let mut app = AppSpec::new(name)
        .with_port(args.port.unwrap_or(defaults.port))
        .with_replicas(args.replicas.unwrap_or(defaults.replicas))
        .with_namespace(args.namespace.clone().unwrap_or_else(|| defaults.namespace.clone()))
        .with_runtime(runtime)
        .with_postgres(args.postgres)
        .with_redis(args.redis)
        .with_deploy(args.deploy);

    if let Some(ref image) = args.image {
        app = app.with_image(image.clone());
    }
    if let Some(registry) = args.registry.as_deref().or(defaults.registry.as_deref()) {
        app = app.with_registry(registry);
    }
    if let Some(ref tag) = args.tag {
        app = app.with_tag(tag.clone());
    }
    if let Some(ref host) = args.host {
        app = app.with_host(host.clone());
    }
    if let Some(ref path) = args.health_path {
        app = app.with_health_path(path.clone());
    }
    for pair in &args.env {
        let (key, value) = pair.split_once('=').ok_or_else(|| PlannerError::InvalidArgument {
            reason: format!("Environment variable '{pair}' must be KEY=VALUE"),
        })?;
        app = app.with_env(key, value);
    }

    if args.min_replicas.is_some() || args.max_replicas.is_some() || args.cpu_target.is_some() {
        let current = app.autoscaling.clone();
        app = app.with_autoscaling(Autoscaling {
            min_replicas: args.min_replicas.unwrap_or(current.min_replicas),
            max_replicas: args.max_replicas.unwrap_or(current.max_replicas),
            target_cpu: args.cpu_target.unwrap_or(current.target_cpu),
        });
    }

    app.validate().map_err(PlannerError::from)?;
    Ok(app)
}
