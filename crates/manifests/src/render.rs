//! Handlebars template registry shared by the text-based generators.

use std::collections::BTreeMap;

use handlebars::{
    Context as HbsContext, Handlebars, Helper, HelperResult, Output, RenderContext,
};
use serde::Serialize;

use crate::error::{ManifestError, ManifestResult};
use crate::spec::{AppSpec, RuntimeProfile};

const TEMPLATES: &[(&str, &str)] = &[
    ("k8s/namespace", include_str!("../templates/k8s/namespace.yaml.hbs")),
    ("k8s/deployment", include_str!("../templates/k8s/deployment.yaml.hbs")),
    ("k8s/service", include_str!("../templates/k8s/service.yaml.hbs")),
    ("k8s/configmap", include_str!("../templates/k8s/configmap.yaml.hbs")),
    ("k8s/hpa", include_str!("../templates/k8s/hpa.yaml.hbs")),
    ("k8s/ingress", include_str!("../templates/k8s/ingress.yaml.hbs")),
    ("docker/dockerfile", include_str!("../templates/docker/Dockerfile.hbs")),
    ("docker/dockerignore", include_str!("../templates/docker/dockerignore.hbs")),
    ("docker/compose", include_str!("../templates/docker/docker-compose.yml.hbs")),
    ("ci/github", include_str!("../templates/ci/github.yml.hbs")),
    ("ci/azure", include_str!("../templates/ci/azure-pipelines.yml.hbs")),
    ("ci/jenkins", include_str!("../templates/ci/Jenkinsfile.hbs")),
    ("ci/gitlab", include_str!("../templates/ci/gitlab-ci.yml.hbs")),
    ("ci/circleci", include_str!("../templates/ci/circleci.yml.hbs")),
    ("ci/travis", include_str!("../templates/ci/travis.yml.hbs")),
];

/// Render a value as a double-quoted scalar.
/// JSON string encoding is valid YAML, so this is safe for arbitrary input.
/// Usage: `{{quote app.name}}`
fn quote_helper(
    h: &Helper,
    _: &Handlebars,
    _: &HbsContext,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let value = h.param(0).map(|p| p.value().clone()).unwrap_or_default();
    let text = match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    };
    let quoted = serde_json::to_string(&text).unwrap_or_else(|_| "\"\"".to_string());
    out.write(&quoted)?;
    Ok(())
}

/// Render a value as compact JSON (used for exec-form `CMD` arrays).
/// Usage: `{{json profile.start}}`
fn json_helper(
    h: &Helper,
    _: &Handlebars,
    _: &HbsContext,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    if let Some(param) = h.param(0) {
        let json = serde_json::to_string(param.value()).unwrap_or_else(|_| "null".to_string());
        out.write(&json)?;
    }
    Ok(())
}

/// Render a GitHub Actions expression without handlebars parsing it.
/// Usage: `{{gh "secrets.TOKEN"}}` renders `${{ secrets.TOKEN }}`
fn github_expr_helper(
    h: &Helper,
    _: &Handlebars,
    _: &HbsContext,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let expr = h.param(0).and_then(|p| p.value().as_str()).unwrap_or_default();
    out.write("${{ ")?;
    out.write(expr)?;
    out.write(" }}")?;
    Ok(())
}

/// Data made available to every template
#[derive(Debug, Serialize)]
pub struct TemplateContext<'a> {
    pub app: &'a AppSpec,
    pub profile: RuntimeProfile,
    pub image_ref: String,
    /// Name of the ConfigMap carrying `app.env`
    pub config_name: String,
    pub has_env: bool,
    pub has_setup_with: bool,
    pub has_companions: bool,
    /// `PORT` is set through `app.env`, so the literal default is left out
    pub port_in_env: bool,
    pub container_env: BTreeMap<String, String>,
    pub compose_env: BTreeMap<String, String>,
}

impl<'a> TemplateContext<'a> {
    pub fn new(app: &'a AppSpec) -> Self {
        let profile = app.runtime.profile(&app.name);
        Self {
            has_setup_with: !profile.setup_with.is_empty(),
            profile,
            image_ref: app.image_ref(),
            config_name: format!("{}-config", app.name),
            has_env: !app.env.is_empty(),
            has_companions: app.with_postgres || app.with_redis,
            port_in_env: app.env.contains_key("PORT"),
            container_env: app.container_env(),
            compose_env: app.compose_env(),
            app,
        }
    }
}

/// Template engine with every built-in manifest template registered
pub struct TemplateEngine {
    handlebars: Handlebars<'static>,
}

impl TemplateEngine {
    pub fn new() -> ManifestResult<Self> {
        let mut handlebars = Handlebars::new();
        // Manifests are not HTML
        handlebars.register_escape_fn(handlebars::no_escape);
        handlebars.set_strict_mode(true);
        handlebars.register_helper("quote", Box::new(quote_helper));
        handlebars.register_helper("json", Box::new(json_helper));
        handlebars.register_helper("gh", Box::new(github_expr_helper));

        for (name, source) in TEMPLATES {
            handlebars
                .register_template_string(name, source)
                .map_err(|e| ManifestError::Template {
                    name: (*name).to_string(),
                    reason: e.to_string(),
                })?;
        }

        Ok(Self { handlebars })
    }

    /// Render a registered template
    pub fn render<T: Serialize>(&self, name: &str, context: &T) -> ManifestResult<String> {
        self.handlebars
            .render(name, context)
            .map_err(|e| ManifestError::Render {
                name: name.to_string(),
                reason: e.to_string(),
            })
    }

    /// Names of all registered templates
    pub fn template_names(&self) -> Vec<&'static str> {
        TEMPLATES.iter().map(|(name, _)| *name).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_templates_compile() {
        let engine = TemplateEngine::new().unwrap();
        assert_eq!(engine.template_names().len(), TEMPLATES.len());
    }

    #[test]
    fn test_quote_escapes_yaml_specials() {
        let mut hb = Handlebars::new();
        hb.register_escape_fn(handlebars::no_escape);
        hb.register_helper("quote", Box::new(quote_helper));
        hb.register_template_string("t", "v: {{quote value}}").unwrap();
        let out = hb
            .render("t", &serde_json::json!({ "value": "a: \"b\" # c" }))
            .unwrap();
        assert_eq!(out, r#"v: "a: \"b\" # c""#);
    }

    #[test]
    fn test_github_expression_helper() {
        let mut hb = Handlebars::new();
        hb.register_helper("gh", Box::new(github_expr_helper));
        hb.register_template_string("t", r#"token: {{gh "secrets.TOKEN"}}"#)
            .unwrap();
        let out = hb.render("t", &serde_json::json!({})).unwrap();
        assert_eq!(out, "token: ${{ secrets.TOKEN }}");
    }

    #[test]
    fn test_quote_stringifies_numbers() {
        let mut hb = Handlebars::new();
        hb.register_escape_fn(handlebars::no_escape);
        hb.register_helper("quote", Box::new(quote_helper));
        hb.register_template_string("t", "{{quote value}}").unwrap();
        let out = hb.render("t", &serde_json::json!({ "value": 8080 })).unwrap();
        assert_eq!(out, "\"8080\"");
    }
}
