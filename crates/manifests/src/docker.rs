//! Dockerfile, `.dockerignore` and docker-compose generation.

use crate::error::ManifestResult;
use crate::render::{TemplateContext, TemplateEngine};
use crate::set::{GeneratedFile, ManifestSet};
use crate::spec::AppSpec;

/// Generate container build files for an application
pub fn generate(engine: &TemplateEngine, app: &AppSpec) -> ManifestResult<ManifestSet> {
    app.validate()?;
    let ctx = TemplateContext::new(app);
    let mut set = ManifestSet::new();

    set.push(GeneratedFile::new(
        "Dockerfile",
        engine.render("docker/dockerfile", &ctx)?,
    ));
    set.push(GeneratedFile::new(
        ".dockerignore",
        engine.render("docker/dockerignore", &ctx)?,
    ));
    set.push(GeneratedFile::new(
        "docker-compose.yml",
        engine.render("docker/compose", &ctx)?,
    ));

    tracing::debug!(
        app = %app.name,
        runtime = %app.runtime,
        postgres = app.with_postgres,
        redis = app.with_redis,
        "Generated Docker files"
    );
    Ok(set)
}
