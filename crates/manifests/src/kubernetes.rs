//! Kubernetes manifests: namespace, deployment, service, config, autoscaling and ingress.

use crate::error::ManifestResult;
use crate::render::{TemplateContext, TemplateEngine};
use crate::set::{GeneratedFile, ManifestSet};
use crate::spec::AppSpec;

/// Directory the manifests are written under
pub const MANIFEST_DIR: &str = "k8s";

/// Generate the Kubernetes manifest set for an application
pub fn generate(engine: &TemplateEngine, app: &AppSpec) -> ManifestResult<ManifestSet> {
    app.validate()?;
    let ctx = TemplateContext::new(app);
    let mut set = ManifestSet::new();

    let mut emit = |file: &str, template: &str| -> ManifestResult<()> {
        let content = engine.render(template, &ctx)?;
        set.push(GeneratedFile::new(format!("{MANIFEST_DIR}/{file}"), content));
        Ok(())
    };

    emit("namespace.yaml", "k8s/namespace")?;
    emit("deployment.yaml", "k8s/deployment")?;
    emit("service.yaml", "k8s/service")?;
    if ctx.has_env {
        emit("configmap.yaml", "k8s/configmap")?;
    }
    emit("hpa.yaml", "k8s/hpa")?;
    if app.host.is_some() {
        emit("ingress.yaml", "k8s/ingress")?;
    }

    tracing::debug!(app = %app.name, files = set.len(), "Generated Kubernetes manifests");
    Ok(set)
}
