//! CI pipeline generation for the supported CI systems.

use serde::Serialize;

use crate::error::{ManifestError, ManifestResult};
use crate::render::{TemplateContext, TemplateEngine};
use crate::set::{GeneratedFile, ManifestSet};
use crate::spec::AppSpec;

/// Supported CI systems
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CiPlatform {
    #[default]
    Github,
    Azure,
    Jenkins,
    Gitlab,
    Circleci,
    Travis,
}

impl CiPlatform {
    pub const ALL: [CiPlatform; 6] = [
        Self::Github,
        Self::Azure,
        Self::Jenkins,
        Self::Gitlab,
        Self::Circleci,
        Self::Travis,
    ];

    /// Conventional pipeline file location for the platform
    pub fn file_path(self) -> &'static str {
        match self {
            Self::Github => ".github/workflows/ci.yml",
            Self::Azure => "azure-pipelines.yml",
            Self::Jenkins => "Jenkinsfile",
            Self::Gitlab => ".gitlab-ci.yml",
            Self::Circleci => ".circleci/config.yml",
            Self::Travis => ".travis.yml",
        }
    }

    fn template(self) -> &'static str {
        match self {
            Self::Github => "ci/github",
            Self::Azure => "ci/azure",
            Self::Jenkins => "ci/jenkins",
            Self::Gitlab => "ci/gitlab",
            Self::Circleci => "ci/circleci",
            Self::Travis => "ci/travis",
        }
    }

    /// Whether the pipeline file is YAML
    pub fn is_yaml(self) -> bool {
        !matches!(self, Self::Jenkins)
    }
}

impl std::fmt::Display for CiPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Github => write!(f, "github"),
            Self::Azure => write!(f, "azure"),
            Self::Jenkins => write!(f, "jenkins"),
            Self::Gitlab => write!(f, "gitlab"),
            Self::Circleci => write!(f, "circleci"),
            Self::Travis => write!(f, "travis"),
        }
    }
}

impl std::str::FromStr for CiPlatform {
    type Err = ManifestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "github" | "github-actions" | "gha" => Ok(Self::Github),
            "azure" | "azure-pipelines" | "azure-devops" => Ok(Self::Azure),
            "jenkins" => Ok(Self::Jenkins),
            "gitlab" | "gitlab-ci" => Ok(Self::Gitlab),
            "circleci" | "circle" => Ok(Self::Circleci),
            "travis" | "travis-ci" => Ok(Self::Travis),
            _ => Err(ManifestError::UnknownPlatform {
                platform: s.to_string(),
            }),
        }
    }
}

/// Generate the pipeline definition for one CI platform
pub fn generate(
    engine: &TemplateEngine,
    app: &AppSpec,
    platform: CiPlatform,
) -> ManifestResult<ManifestSet> {
    app.validate()?;
    let ctx = TemplateContext::new(app);
    let content = engine.render(platform.template(), &ctx)?;

    let mut set = ManifestSet::new();
    set.push(GeneratedFile::new(platform.file_path(), content));
    tracing::debug!(app = %app.name, %platform, deploy = app.deploy, "Generated CI pipeline");
    Ok(set)
}
