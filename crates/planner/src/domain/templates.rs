//! Fixed phase, risk and assumption templates per project type.

use crate::entities::{ProjectType, Risk, RiskLevel, TaskPriority};

/// Static description of one plan phase
#[derive(Debug, Clone, Copy)]
pub struct PhaseTemplate {
    pub name: &'static str,
    pub description: &'static str,
    pub tasks: &'static [&'static str],
    /// Duration in days
    pub duration: u32,
    pub priority: TaskPriority,
}

const fn phase(
    name: &'static str,
    description: &'static str,
    tasks: &'static [&'static str],
    duration: u32,
    priority: TaskPriority,
) -> PhaseTemplate {
    PhaseTemplate {
        name,
        description,
        tasks,
        duration,
        priority,
    }
}

use TaskPriority::{Critical, High, Medium};

const PLANNING: PhaseTemplate = phase(
    "Planning",
    "Requirements gathering, scoping and architecture",
    &[
        "Gather requirements",
        "Define project scope",
        "Design architecture",
        "Set up repository and tooling",
    ],
    5,
    Critical,
);

const TESTING: PhaseTemplate = phase(
    "Testing",
    "Verification of functionality, performance and security",
    &[
        "Write unit tests",
        "Write integration tests",
        "Run performance tests",
        "Perform security review",
    ],
    7,
    High,
);

const DEPLOYMENT: PhaseTemplate = phase(
    "Deployment",
    "Release to production and hand-over",
    &[
        "Prepare production environment",
        "Configure CI/CD pipeline",
        "Deploy to production",
        "Set up monitoring",
    ],
    3,
    High,
);

const WEB: &[PhaseTemplate] = &[
    PLANNING,
    phase(
        "Design",
        "UI/UX design and prototyping",
        &["Create wireframes", "Design UI mockups", "Build interactive prototype"],
        7,
        High,
    ),
    phase(
        "Frontend Development",
        "Client-side implementation",
        &[
            "Set up frontend framework",
            "Implement page layouts",
            "Build reusable components",
            "Integrate with backend API",
        ],
        14,
        High,
    ),
    phase(
        "Backend Development",
        "Server-side implementation",
        &[
            "Design database schema",
            "Implement REST API",
            "Implement authentication",
            "Add input validation",
        ],
        14,
        High,
    ),
    TESTING,
    DEPLOYMENT,
];

const MOBILE: &[PhaseTemplate] = &[
    PLANNING,
    phase(
        "Design",
        "Mobile UX and visual design",
        &["Define user flows", "Design screens", "Create app icon and assets"],
        7,
        High,
    ),
    phase(
        "App Development",
        "Native or cross-platform app implementation",
        &[
            "Set up mobile project",
            "Implement navigation",
            "Build core screens",
            "Add offline storage",
            "Integrate push notifications",
        ],
        21,
        High,
    ),
    phase(
        "Backend Integration",
        "API and service integration",
        &["Integrate backend API", "Implement authentication", "Add analytics"],
        7,
        Medium,
    ),
    TESTING,
    phase(
        "Release",
        "App store submission and rollout",
        &[
            "Prepare store listings",
            "Submit to App Store",
            "Submit to Google Play",
            "Monitor crash reports",
        ],
        5,
        High,
    ),
];

const API: &[PhaseTemplate] = &[
    PLANNING,
    phase(
        "API Design",
        "Contract-first API specification",
        &[
            "Define resources and endpoints",
            "Write OpenAPI specification",
            "Design error model",
        ],
        5,
        High,
    ),
    phase(
        "Implementation",
        "Service implementation",
        &[
            "Implement data access layer",
            "Implement endpoints",
            "Implement authentication and authorization",
            "Add rate limiting",
        ],
        14,
        High,
    ),
    phase(
        "Documentation",
        "Reference and usage documentation",
        &["Publish API reference", "Write usage guides"],
        3,
        Medium,
    ),
    TESTING,
    DEPLOYMENT,
];

const DESKTOP: &[PhaseTemplate] = &[
    PLANNING,
    phase(
        "Design",
        "Desktop UX design",
        &["Design main window", "Define keyboard shortcuts", "Design settings dialog"],
        5,
        Medium,
    ),
    phase(
        "Development",
        "Application implementation",
        &[
            "Set up application framework",
            "Implement core features",
            "Implement file handling",
            "Add auto-update support",
        ],
        21,
        High,
    ),
    TESTING,
    phase(
        "Packaging",
        "Installers and distribution",
        &[
            "Build Windows installer",
            "Build macOS package",
            "Build Linux packages",
            "Sign release artifacts",
        ],
        5,
        High,
    ),
];

const DATA: &[PhaseTemplate] = &[
    PLANNING,
    phase(
        "Data Collection",
        "Sourcing and ingestion of data",
        &["Identify data sources", "Build ingestion pipeline", "Validate data quality"],
        7,
        Critical,
    ),
    phase(
        "Data Preparation",
        "Cleaning and feature engineering",
        &["Clean data", "Engineer features", "Split datasets"],
        7,
        High,
    ),
    phase(
        "Modeling",
        "Model training and selection",
        &["Train baseline model", "Tune hyperparameters", "Evaluate models"],
        14,
        High,
    ),
    phase(
        "Validation",
        "Model validation and review",
        &["Validate against holdout data", "Review bias and fairness", "Document results"],
        5,
        High,
    ),
    phase(
        "Deployment",
        "Model serving and monitoring",
        &["Package model", "Deploy model service", "Set up drift monitoring"],
        5,
        High,
    ),
];

const INFRASTRUCTURE: &[PhaseTemplate] = &[
    PLANNING,
    phase(
        "Provisioning",
        "Infrastructure as code",
        &[
            "Write infrastructure templates",
            "Provision networking",
            "Provision compute and storage",
        ],
        7,
        Critical,
    ),
    phase(
        "Configuration",
        "Platform configuration and hardening",
        &["Configure access control", "Configure secrets management", "Harden hosts"],
        5,
        High,
    ),
    phase(
        "Observability",
        "Monitoring, logging and alerting",
        &["Set up metrics", "Centralize logs", "Define alerts"],
        5,
        Medium,
    ),
    TESTING,
    phase(
        "Rollout",
        "Cut-over and operational hand-over",
        &["Migrate workloads", "Run disaster recovery drill", "Write runbooks"],
        5,
        High,
    ),
];

const LIBRARY: &[PhaseTemplate] = &[
    PLANNING,
    phase(
        "API Design",
        "Public interface design",
        &["Design public API", "Define versioning policy"],
        3,
        High,
    ),
    phase(
        "Implementation",
        "Core library implementation",
        &["Implement core functionality", "Add error handling", "Write examples"],
        10,
        High,
    ),
    phase(
        "Documentation",
        "Reference documentation and guides",
        &["Write API documentation", "Write getting-started guide"],
        3,
        Medium,
    ),
    TESTING,
    phase(
        "Release",
        "Packaging and publishing",
        &["Write changelog", "Tag release", "Publish package"],
        2,
        High,
    ),
];

const GENERIC: &[PhaseTemplate] = &[
    PLANNING,
    phase(
        "Development",
        "Core implementation",
        &["Implement core features", "Integrate components", "Review code"],
        14,
        High,
    ),
    TESTING,
    DEPLOYMENT,
];

/// Ordered phase template for a project type
pub fn phases_for(project_type: ProjectType) -> &'static [PhaseTemplate] {
    match project_type {
        ProjectType::Web => WEB,
        ProjectType::Mobile => MOBILE,
        ProjectType::Api => API,
        ProjectType::Desktop => DESKTOP,
        ProjectType::Data => DATA,
        ProjectType::Infrastructure => INFRASTRUCTURE,
        ProjectType::Library => LIBRARY,
        ProjectType::Generic => GENERIC,
    }
}

fn risk(description: &str, impact: RiskLevel, probability: RiskLevel, mitigation: &str) -> Risk {
    Risk {
        description: description.to_string(),
        impact,
        probability,
        mitigation: mitigation.to_string(),
    }
}

/// Common risks plus the ones specific to a project type
pub fn risks_for(project_type: ProjectType) -> Vec<Risk> {
    use RiskLevel::{High as H, Low as L, Medium as M};

    let mut risks = vec![
        risk(
            "Scope creep",
            H,
            M,
            "Freeze scope per phase and route changes through review",
        ),
        risk(
            "Underestimated effort",
            M,
            H,
            "Track progress weekly and re-plan when a phase slips",
        ),
        risk(
            "Key team member unavailable",
            M,
            L,
            "Document decisions and pair on critical components",
        ),
    ];

    let specific = match project_type {
        ProjectType::Web => vec![
            risk(
                "Browser compatibility issues",
                M,
                M,
                "Test against a supported-browser matrix in CI",
            ),
            risk(
                "Performance under load",
                H,
                M,
                "Load test before launch and add caching",
            ),
        ],
        ProjectType::Mobile => vec![
            risk(
                "App store rejection",
                H,
                M,
                "Review store guidelines before submission",
            ),
            risk(
                "Device fragmentation",
                M,
                H,
                "Test on a representative device farm",
            ),
        ],
        ProjectType::Api => vec![
            risk(
                "Breaking changes for consumers",
                H,
                M,
                "Version the API and publish deprecation notices",
            ),
            risk(
                "Security vulnerabilities",
                H,
                M,
                "Run dependency scanning and penetration tests",
            ),
        ],
        ProjectType::Desktop => vec![risk(
            "Platform-specific defects",
            M,
            H,
            "Build and test on every target OS in CI",
        )],
        ProjectType::Data => vec![
            risk(
                "Insufficient data quality",
                H,
                H,
                "Validate sources early and budget for cleaning",
            ),
            risk(
                "Model underperforms",
                H,
                M,
                "Agree on baseline metrics before modeling",
            ),
        ],
        ProjectType::Infrastructure => vec![
            risk(
                "Outage during migration",
                H,
                M,
                "Migrate incrementally with rollback plans",
            ),
            risk(
                "Cost overrun",
                M,
                M,
                "Set budget alerts and review usage weekly",
            ),
        ],
        ProjectType::Library => vec![risk(
            "API churn after release",
            M,
            M,
            "Gather feedback on a pre-release before 1.0",
        )],
        ProjectType::Generic => Vec::new(),
    };

    risks.extend(specific);
    risks
}

/// Common assumptions plus the ones specific to a project type
pub fn assumptions_for(project_type: ProjectType) -> Vec<String> {
    let mut assumptions = vec![
        "Requirements are stable once planning completes",
        "The team is available for the full timeline",
        "Stakeholders review deliverables at the end of each phase",
    ];

    let specific: &[&str] = match project_type {
        ProjectType::Web => &["Modern evergreen browsers are the target"],
        ProjectType::Mobile => &["iOS and Android are both in scope"],
        ProjectType::Api => &["Consumers authenticate with tokens"],
        ProjectType::Desktop => &["Windows, macOS and Linux are supported"],
        ProjectType::Data => &["Historical data is accessible from day one"],
        ProjectType::Infrastructure => &["Cloud accounts and quotas are provisioned"],
        ProjectType::Library => &["Semantic versioning is followed"],
        ProjectType::Generic => &[],
    };

    assumptions.extend_from_slice(specific);
    assumptions.into_iter().map(str::to_string).collect()
}
