//! Integration tests for manifest generation.
//!
//! Generated YAML is parsed back with serde_yaml so the assertions check
//! structure rather than exact text.

use manifests::{AppSpec, CiPlatform, Generator, Runtime, Target};
use serde_yaml::Value;
use tempfile::TempDir;

fn sample_app() -> AppSpec {
    AppSpec::new("web-api")
        .with_registry("ghcr.io/acme")
        .with_tag("1.2.3")
        .with_port(3000)
        .with_replicas(3)
        .with_namespace("shop")
        .with_env("LOG_LEVEL", "info")
        .with_env("GREETING", "hello: world # not a comment")
}

fn parse(content: &str) -> Value {
    serde_yaml::from_str(content).unwrap_or_else(|e| panic!("invalid YAML: {e}\n{content}"))
}

mod kubernetes_tests {
    use super::*;

    #[test]
    fn test_full_manifest_set() {
        let app = sample_app().with_host("shop.example.com");
        let set = Generator::new()
            .unwrap()
            .generate(&app, Target::Kubernetes)
            .unwrap();

        let paths: Vec<_> = set
            .files()
            .iter()
            .map(|f| f.path.display().to_string())
            .collect();
        assert_eq!(
            paths,
            vec![
                "k8s/namespace.yaml",
                "k8s/deployment.yaml",
                "k8s/service.yaml",
                "k8s/configmap.yaml",
                "k8s/hpa.yaml",
                "k8s/ingress.yaml",
            ]
        );

        for file in set.files() {
            let doc = parse(&file.content);
            assert!(doc["apiVersion"].is_string(), "{}", file.path.display());
        }
    }

    #[test]
    fn test_deployment_fields() {
        let set = Generator::new()
            .unwrap()
            .generate(&sample_app(), Target::Kubernetes)
            .unwrap();
        let doc = parse(&set.get("k8s/deployment.yaml").unwrap().content);

        assert_eq!(doc["kind"], "Deployment");
        assert_eq!(doc["metadata"]["namespace"], "shop");
        assert_eq!(doc["spec"]["replicas"], 3);

        let container = &doc["spec"]["template"]["spec"]["containers"][0];
        assert_eq!(container["image"], "ghcr.io/acme/web-api:1.2.3");
        assert_eq!(container["ports"][0]["containerPort"], 3000);
        assert_eq!(
            container["envFrom"][0]["configMapRef"]["name"],
            "web-api-config"
        );
        assert_eq!(container["readinessProbe"]["httpGet"]["path"], "/health");
    }

    #[test]
    fn test_configmap_quotes_values() {
        let set = Generator::new()
            .unwrap()
            .generate(&sample_app(), Target::Kubernetes)
            .unwrap();
        let doc = parse(&set.get("k8s/configmap.yaml").unwrap().content);
        assert_eq!(doc["data"]["GREETING"], "hello: world # not a comment");
        assert_eq!(doc["data"]["LOG_LEVEL"], "info");
    }

    #[test]
    fn test_optional_manifests_omitted() {
        let app = AppSpec::new("worker");
        let set = Generator::new()
            .unwrap()
            .generate(&app, Target::Kubernetes)
            .unwrap();

        assert!(set.get("k8s/configmap.yaml").is_none());
        assert!(set.get("k8s/ingress.yaml").is_none());

        let doc = parse(&set.get("k8s/deployment.yaml").unwrap().content);
        let container = &doc["spec"]["template"]["spec"]["containers"][0];
        assert!(container.get("envFrom").is_none());
    }

    #[test]
    fn test_hpa_bounds() {
        let set = Generator::new()
            .unwrap()
            .generate(&sample_app(), Target::Kubernetes)
            .unwrap();
        let doc = parse(&set.get("k8s/hpa.yaml").unwrap().content);
        assert_eq!(doc["spec"]["minReplicas"], 3);
        assert_eq!(doc["spec"]["maxReplicas"], 5);
        assert_eq!(
            doc["spec"]["metrics"][0]["resource"]["target"]["averageUtilization"],
            70
        );
    }

    #[test]
    fn test_deployment_skips_default_port_when_env_sets_it() {
        let app = AppSpec::new("svc").with_env("PORT", "9000");
        let set = Generator::new()
            .unwrap()
            .generate(&app, Target::Kubernetes)
            .unwrap();
        let doc = parse(&set.get("k8s/deployment.yaml").unwrap().content);

        let container = &doc["spec"]["template"]["spec"]["containers"][0];
        assert!(container.get("env").is_none());
        assert_eq!(container["envFrom"][0]["configMapRef"]["name"], "svc-config");

        let configmap = parse(&set.get("k8s/configmap.yaml").unwrap().content);
        assert_eq!(configmap["data"]["PORT"], "9000");
    }

    #[test]
    fn test_invalid_spec_rejected() {
        let app = AppSpec::new("Bad Name");
        let result = Generator::new().unwrap().generate(&app, Target::Kubernetes);
        assert!(result.is_err());
    }
}

mod docker_tests {
    use super::*;

    #[test]
    fn test_dockerfile_for_each_runtime() {
        let generator = Generator::new().unwrap();
        for runtime in [
            Runtime::Node,
            Runtime::Python,
            Runtime::Rust,
            Runtime::Go,
            Runtime::Java,
            Runtime::Dotnet,
        ] {
            let app = AppSpec::new("svc").with_runtime(runtime);
            let set = generator.generate(&app, Target::Docker).unwrap();
            let dockerfile = &set.get("Dockerfile").unwrap().content;
            let profile = runtime.profile("svc");

            assert!(dockerfile.contains(&format!("FROM {} AS builder", profile.build_image)));
            assert!(dockerfile.contains(&format!("FROM {}", profile.runtime_image)));
            assert!(dockerfile.contains("EXPOSE 8080"));
            let cmd = serde_json::to_string(&profile.start).unwrap();
            assert!(dockerfile.contains(&format!("CMD {cmd}")), "{runtime}");
        }
    }

    #[test]
    fn test_compose_with_companions() {
        let app = AppSpec::new("api").with_postgres(true).with_redis(true);
        let set = Generator::new()
            .unwrap()
            .generate(&app, Target::Docker)
            .unwrap();
        let doc = parse(&set.get("docker-compose.yml").unwrap().content);

        let services = doc["services"].as_mapping().unwrap();
        assert_eq!(services.len(), 3);
        assert_eq!(doc["services"]["api"]["ports"][0], "8080:8080");
        assert_eq!(
            doc["services"]["api"]["environment"]["REDIS_URL"],
            "redis://redis:6379"
        );
        let depends = doc["services"]["api"]["depends_on"].as_sequence().unwrap();
        assert_eq!(depends.len(), 2);
        assert!(doc["volumes"].get("postgres-data").is_some());
    }

    #[test]
    fn test_compose_single_service() {
        let app = AppSpec::new("api");
        let set = Generator::new()
            .unwrap()
            .generate(&app, Target::Docker)
            .unwrap();
        let doc = parse(&set.get("docker-compose.yml").unwrap().content);

        assert_eq!(doc["services"].as_mapping().unwrap().len(), 1);
        assert!(doc["services"]["api"].get("depends_on").is_none());
        assert!(doc.get("volumes").is_none());
    }

    #[test]
    fn test_compose_env_overrides_builtin_keys() {
        let app = AppSpec::new("svc")
            .with_postgres(true)
            .with_env("PORT", "9000")
            .with_env("DATABASE_URL", "postgres://external/db");
        let set = Generator::new()
            .unwrap()
            .generate(&app, Target::Docker)
            .unwrap();
        let doc = parse(&set.get("docker-compose.yml").unwrap().content);

        let env = &doc["services"]["svc"]["environment"];
        assert_eq!(env.as_mapping().unwrap().len(), 2);
        assert_eq!(env["PORT"], "9000");
        assert_eq!(env["DATABASE_URL"], "postgres://external/db");

        let dockerfile = &set.get("Dockerfile").unwrap().content;
        assert_eq!(dockerfile.matches("ENV PORT=").count(), 1);
        assert!(dockerfile.contains("ENV PORT=\"9000\""));
    }

    #[test]
    fn test_dockerignore_lists_runtime_artifacts() {
        let app = AppSpec::new("api").with_runtime(Runtime::Rust);
        let set = Generator::new()
            .unwrap()
            .generate(&app, Target::Docker)
            .unwrap();
        let ignore = &set.get(".dockerignore").unwrap().content;
        assert!(ignore.lines().any(|l| l == "target"));
        assert!(ignore.lines().any(|l| l == ".git"));
    }
}

mod ci_tests {
    use super::*;

    #[test]
    fn test_every_platform_renders() {
        let generator = Generator::new().unwrap();
        let app = sample_app().with_deploy(true);

        for platform in CiPlatform::ALL {
            let set = generator.generate(&app, Target::Ci(platform)).unwrap();
            assert_eq!(set.len(), 1);

            let file = set.get(platform.file_path()).unwrap();
            assert!(file.content.contains("ghcr.io/acme/web-api"), "{platform}");
            assert!(file.content.contains("npm test"), "{platform}");
            assert!(file.content.contains("kubectl apply -f k8s/"), "{platform}");
            if platform.is_yaml() {
                parse(&file.content);
            }
        }
    }

    #[test]
    fn test_github_workflow_structure() {
        let app = sample_app().with_runtime(Runtime::Python);
        let set = Generator::new()
            .unwrap()
            .generate(&app, Target::Ci(CiPlatform::Github))
            .unwrap();
        let content = &set.get(".github/workflows/ci.yml").unwrap().content;
        let doc = parse(content);

        let steps = doc["jobs"]["build"]["steps"].as_sequence().unwrap();
        assert_eq!(steps[1]["uses"], "actions/setup-python@v5");
        assert_eq!(steps[1]["with"]["python-version"], "3.12");
        assert_eq!(doc["jobs"]["docker"]["needs"], "build");
        assert!(doc["jobs"].get("deploy").is_none());
        assert!(content.contains("${{ secrets.REGISTRY_PASSWORD }}"));
    }

    #[test]
    fn test_github_rust_setup_has_no_inputs() {
        let app = AppSpec::new("svc").with_runtime(Runtime::Rust);
        let set = Generator::new()
            .unwrap()
            .generate(&app, Target::Ci(CiPlatform::Github))
            .unwrap();
        let doc = parse(&set.get(".github/workflows/ci.yml").unwrap().content);
        let steps = doc["jobs"]["build"]["steps"].as_sequence().unwrap();
        assert_eq!(steps[1]["uses"], "dtolnay/rust-toolchain@stable");
        assert!(steps[1].get("with").is_none());
    }

    #[test]
    fn test_gitlab_stages_follow_deploy_flag() {
        let generator = Generator::new().unwrap();

        let without = generator
            .generate(&sample_app(), Target::Ci(CiPlatform::Gitlab))
            .unwrap();
        let doc = parse(&without.get(".gitlab-ci.yml").unwrap().content);
        assert_eq!(doc["stages"].as_sequence().unwrap().len(), 3);
        assert!(doc.get("deploy").is_none());

        let with = generator
            .generate(&sample_app().with_deploy(true), Target::Ci(CiPlatform::Gitlab))
            .unwrap();
        let doc = parse(&with.get(".gitlab-ci.yml").unwrap().content);
        assert_eq!(doc["stages"].as_sequence().unwrap().len(), 4);
        assert_eq!(doc["deploy"]["stage"], "deploy");
    }

    #[test]
    fn test_jenkinsfile_stages() {
        let set = Generator::new()
            .unwrap()
            .generate(&sample_app(), Target::Ci(CiPlatform::Jenkins))
            .unwrap();
        let content = &set.get("Jenkinsfile").unwrap().content;
        for stage in ["Install", "Build", "Test", "Docker"] {
            assert!(content.contains(&format!("stage('{stage}')")), "{stage}");
        }
        assert!(!content.contains("stage('Deploy')"));
    }
}

mod write_tests {
    use super::*;

    #[tokio::test]
    async fn test_generate_all_and_write() {
        let temp = TempDir::new().unwrap();
        let set = Generator::new()
            .unwrap()
            .generate_all(&sample_app(), CiPlatform::Circleci)
            .unwrap();

        let report = set.write_to(temp.path(), false).await.unwrap();
        assert_eq!(report.written.len(), set.len());
        assert!(temp.path().join("k8s/deployment.yaml").exists());
        assert!(temp.path().join("Dockerfile").exists());
        assert!(temp.path().join(".circleci/config.yml").exists());
        assert!(temp.path().join("cloudformation/stack.json").exists());

        let again = set.write_to(temp.path(), false).await.unwrap();
        assert!(again.written.is_empty());
        assert_eq!(again.skipped.len(), set.len());
    }
}
