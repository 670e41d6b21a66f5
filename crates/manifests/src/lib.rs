#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::doc_markdown)]

//! # Manifests
//!
//! Deployment file generation from a single [`AppSpec`]:
//! - Kubernetes manifests (`k8s/`)
//! - Dockerfile, `.dockerignore` and docker-compose
//! - CI pipelines for GitHub Actions, Azure Pipelines, Jenkins, GitLab CI,
//!   CircleCI and Travis CI
//! - A CloudFormation stack for ECS Fargate
//!
//! ## Example
//!
//! ```rust,ignore
//! use manifests::{AppSpec, Generator, Target};
//!
//! let app = AppSpec::new("web-api").with_port(3000);
//! let set = Generator::new()?.generate(&app, Target::Kubernetes)?;
//! set.write_to(Path::new("."), false).await?;
//! ```

pub mod ci;
pub mod cloudformation;
pub mod docker;
pub mod error;
pub mod kubernetes;
pub mod render;
pub mod set;
pub mod spec;

pub use ci::CiPlatform;
pub use error::{ManifestError, ManifestResult};
pub use render::TemplateEngine;
pub use set::{GeneratedFile, ManifestSet, WriteReport};
pub use spec::{AppSpec, Autoscaling, Resources, Runtime};

/// Kind of manifest to generate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Kubernetes,
    Docker,
    Ci(CiPlatform),
    CloudFormation,
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Kubernetes => write!(f, "kubernetes"),
            Self::Docker => write!(f, "docker"),
            Self::Ci(platform) => write!(f, "ci ({platform})"),
            Self::CloudFormation => write!(f, "cloudformation"),
        }
    }
}

/// Front door over the individual generators, sharing one template registry
pub struct Generator {
    engine: TemplateEngine,
}

impl Generator {
    pub fn new() -> ManifestResult<Self> {
        Ok(Self {
            engine: TemplateEngine::new()?,
        })
    }

    /// Generate the files for a single target
    pub fn generate(&self, app: &AppSpec, target: Target) -> ManifestResult<ManifestSet> {
        tracing::info!(app = %app.name, %target, "Generating manifests");
        match target {
            Target::Kubernetes => kubernetes::generate(&self.engine, app),
            Target::Docker => docker::generate(&self.engine, app),
            Target::Ci(platform) => ci::generate(&self.engine, app, platform),
            Target::CloudFormation => cloudformation::generate(app),
        }
    }

    /// Generate Kubernetes, Docker, the given CI pipeline and CloudFormation together
    pub fn generate_all(&self, app: &AppSpec, platform: CiPlatform) -> ManifestResult<ManifestSet> {
        let mut set = ManifestSet::new();
        for target in [
            Target::Kubernetes,
            Target::Docker,
            Target::Ci(platform),
            Target::CloudFormation,
        ] {
            set.extend(self.generate(app, target)?);
        }
        Ok(set)
    }
}
