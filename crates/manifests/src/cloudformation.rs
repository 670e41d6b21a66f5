//! CloudFormation stack for running the application on ECS Fargate.
//!
//! Built as JSON values rather than text templates so the output is always
//! well-formed.

use serde_json::{json, Map, Value};

use crate::error::{ManifestError, ManifestResult};
use crate::set::{GeneratedFile, ManifestSet};
use crate::spec::AppSpec;

/// Location of the generated stack template
pub const STACK_PATH: &str = "cloudformation/stack.json";

/// Logical resource id derived from the app name (`web-api` -> `WebApi`)
fn logical_id(name: &str, suffix: &str) -> String {
    let mut id: String = name
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_ascii_uppercase().to_string() + chars.as_str()
            })
        })
        .collect();
    id.push_str(suffix);
    id
}

/// Convert a Kubernetes CPU quantity (`500m`, `1`) to Fargate CPU units.
/// Fargate only accepts fixed sizes, so round up to the next one.
fn fargate_cpu(quantity: &str) -> u32 {
    let millicores = quantity
        .strip_suffix('m')
        .and_then(|m| m.parse::<f64>().ok())
        .or_else(|| quantity.parse::<f64>().ok().map(|cores| cores * 1000.0))
        .unwrap_or(256.0);
    let units = (millicores * 1024.0 / 1000.0).ceil();
    [256_u32, 512, 1024, 2048, 4096]
        .into_iter()
        .find(|size| f64::from(*size) >= units)
        .unwrap_or(4096)
}

/// Fargate CPU sizes with the memory range (MiB) each one accepts
const FARGATE_SIZES: [(u32, u32, u32); 5] = [
    (256, 512, 2048),
    (512, 1024, 4096),
    (1024, 2048, 8192),
    (2048, 4096, 16384),
    (4096, 8192, 30720),
];

/// Convert a Kubernetes memory quantity (`512Mi`, `1Gi`) to MiB.
/// Unparseable quantities fall back to 512.
fn memory_mib(quantity: &str) -> ManifestResult<u32> {
    let mib = if let Some(gi) = quantity.strip_suffix("Gi") {
        match gi.parse::<u32>() {
            Ok(g) => Some(g.checked_mul(1024).ok_or_else(|| {
                ManifestError::invalid(
                    "resources.memory_limit",
                    format!("'{quantity}' is too large"),
                )
            })?),
            Err(_) => None,
        }
    } else if let Some(mi) = quantity.strip_suffix("Mi") {
        mi.parse::<u32>().ok()
    } else {
        None
    };
    Ok(mib.unwrap_or(512))
}

/// Pick a valid Fargate `(cpu, memory)` pair. The CPU size is raised until
/// its memory range holds the requested memory; memory is rounded up to a
/// size Fargate accepts.
fn fargate_size(cpu: u32, memory: u32) -> ManifestResult<(u32, u32)> {
    let (cpu, min, max) = FARGATE_SIZES
        .into_iter()
        .find(|(size, _, max)| *size >= cpu && *max >= memory)
        .ok_or_else(|| {
            ManifestError::invalid(
                "resources.memory_limit",
                format!("{memory}Mi exceeds the Fargate maximum of 30720Mi"),
            )
        })?;

    let memory = if memory <= 512 && cpu == 256 {
        512
    } else {
        memory.div_ceil(1024) * 1024
    };
    Ok((cpu, memory.clamp(min, max)))
}

/// Build the stack template as a JSON value
pub fn template(app: &AppSpec) -> ManifestResult<Value> {
    app.validate()?;

    let cluster = logical_id(&app.name, "Cluster");
    let task_def = logical_id(&app.name, "TaskDefinition");
    let service = logical_id(&app.name, "Service");
    let log_group = logical_id(&app.name, "LogGroup");
    let security_group = logical_id(&app.name, "SecurityGroup");
    let execution_role = logical_id(&app.name, "ExecutionRole");

    let (cpu, memory) = fargate_size(
        fargate_cpu(&app.resources.cpu_limit),
        memory_mib(&app.resources.memory_limit)?,
    )?;

    let environment: Vec<Value> = app
        .container_env()
        .iter()
        .map(|(name, value)| json!({ "Name": name, "Value": value }))
        .collect();

    let mut resources = Map::new();
    resources.insert(
        cluster.clone(),
        json!({
            "Type": "AWS::ECS::Cluster",
            "Properties": { "ClusterName": app.name }
        }),
    );
    resources.insert(
        log_group.clone(),
        json!({
            "Type": "AWS::Logs::LogGroup",
            "Properties": {
                "LogGroupName": format!("/ecs/{}", app.name),
                "RetentionInDays": 14
            }
        }),
    );
    resources.insert(
        execution_role.clone(),
        json!({
            "Type": "AWS::IAM::Role",
            "Properties": {
                "AssumeRolePolicyDocument": {
                    "Version": "2012-10-17",
                    "Statement": [{
                        "Effect": "Allow",
                        "Principal": { "Service": "ecs-tasks.amazonaws.com" },
                        "Action": "sts:AssumeRole"
                    }]
                },
                "ManagedPolicyArns": [
                    "arn:aws:iam::aws:policy/service-role/AmazonECSTaskExecutionRolePolicy"
                ]
            }
        }),
    );
    resources.insert(
        security_group.clone(),
        json!({
            "Type": "AWS::EC2::SecurityGroup",
            "Properties": {
                "GroupDescription": format!("Ingress for {}", app.name),
                "VpcId": { "Ref": "VpcId" },
                "SecurityGroupIngress": [{
                    "IpProtocol": "tcp",
                    "FromPort": app.port,
                    "ToPort": app.port,
                    "CidrIp": "0.0.0.0/0"
                }]
            }
        }),
    );
    resources.insert(
        task_def.clone(),
        json!({
            "Type": "AWS::ECS::TaskDefinition",
            "Properties": {
                "Family": app.name,
                "Cpu": cpu.to_string(),
                "Memory": memory.to_string(),
                "NetworkMode": "awsvpc",
                "RequiresCompatibilities": ["FARGATE"],
                "ExecutionRoleArn": { "Fn::GetAtt": [execution_role, "Arn"] },
                "ContainerDefinitions": [{
                    "Name": app.name,
                    "Image": { "Fn::Sub": format!("{}:${{ImageTag}}", app.image) },
                    "Essential": true,
                    "PortMappings": [{ "ContainerPort": app.port, "Protocol": "tcp" }],
                    "Environment": environment,
                    "LogConfiguration": {
                        "LogDriver": "awslogs",
                        "Options": {
                            "awslogs-group": { "Ref": log_group },
                            "awslogs-region": { "Ref": "AWS::Region" },
                            "awslogs-stream-prefix": app.name
                        }
                    }
                }]
            }
        }),
    );
    resources.insert(
        service.clone(),
        json!({
            "Type": "AWS::ECS::Service",
            "Properties": {
                "ServiceName": app.name,
                "Cluster": { "Ref": cluster },
                "TaskDefinition": { "Ref": task_def },
                "DesiredCount": app.replicas,
                "LaunchType": "FARGATE",
                "NetworkConfiguration": {
                    "AwsvpcConfiguration": {
                        "AssignPublicIp": "ENABLED",
                        "Subnets": { "Ref": "SubnetIds" },
                        "SecurityGroups": [{ "Ref": security_group }]
                    }
                }
            }
        }),
    );

    Ok(json!({
        "AWSTemplateFormatVersion": "2010-09-09",
        "Description": format!("ECS Fargate stack for {}", app.name),
        "Parameters": {
            "VpcId": {
                "Type": "AWS::EC2::VPC::Id",
                "Description": "VPC to run the service in"
            },
            "SubnetIds": {
                "Type": "List<AWS::EC2::Subnet::Id>",
                "Description": "Subnets for the service tasks"
            },
            "ImageTag": {
                "Type": "String",
                "Default": app.tag,
                "Description": "Container image tag to deploy"
            }
        },
        "Resources": resources,
        "Outputs": {
            "ClusterName": { "Value": { "Ref": cluster } },
            "ServiceName": { "Value": { "Fn::GetAtt": [service, "Name"] } }
        }
    }))
}

/// Generate the CloudFormation stack file for an application
pub fn generate(app: &AppSpec) -> ManifestResult<ManifestSet> {
    let stack = template(app)?;
    let mut content = serde_json::to_string_pretty(&stack)?;
    content.push('\n');

    let mut set = ManifestSet::new();
    set.push(GeneratedFile::new(STACK_PATH, content));
    tracing::debug!(app = %app.name, "Generated CloudFormation stack");
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logical_id() {
        assert_eq!(logical_id("web-api", "Service"), "WebApiService");
        assert_eq!(logical_id("api2", "Cluster"), "Api2Cluster");
    }

    #[test]
    fn test_fargate_sizes() {
        assert_eq!(fargate_cpu("100m"), 256);
        assert_eq!(fargate_cpu("500m"), 512);
        assert_eq!(fargate_cpu("1"), 1024);
        assert_eq!(fargate_size(256, memory_mib("128Mi").unwrap()).unwrap(), (256, 512));
        assert_eq!(fargate_size(512, memory_mib("3Gi").unwrap()).unwrap(), (512, 3072));
        assert_eq!(fargate_size(256, 1500).unwrap(), (256, 2048));
    }

    #[test]
    fn test_fargate_cpu_raised_to_fit_memory() {
        // 256 units top out at 2Gi
        assert_eq!(fargate_size(256, memory_mib("4Gi").unwrap()).unwrap(), (512, 4096));
        assert_eq!(fargate_size(1024, memory_mib("12Gi").unwrap()).unwrap(), (2048, 12288));
        // Raising CPU also raises the memory floor
        assert_eq!(fargate_size(4096, 512).unwrap(), (4096, 8192));
    }

    #[test]
    fn test_oversized_memory_rejected() {
        assert!(memory_mib("5000000Gi").is_err());
        assert!(fargate_size(256, memory_mib("64Gi").unwrap()).is_err());

        let app = AppSpec::new("big").with_resources(crate::spec::Resources {
            cpu_request: "250m".to_string(),
            memory_request: "256Mi".to_string(),
            cpu_limit: "500m".to_string(),
            memory_limit: "5000000Gi".to_string(),
        });
        assert!(template(&app).is_err());
    }

    #[test]
    fn test_env_overrides_port() {
        let app = AppSpec::new("svc").with_env("PORT", "9000");
        let stack = template(&app).unwrap();
        let env = stack["Resources"]["SvcTaskDefinition"]["Properties"]["ContainerDefinitions"][0]
            ["Environment"]
            .as_array()
            .unwrap();
        assert_eq!(env.len(), 1);
        assert_eq!(env[0]["Name"], "PORT");
        assert_eq!(env[0]["Value"], "9000");
    }

    #[test]
    fn test_template_shape() {
        let app = AppSpec::new("web-api").with_env("LOG_LEVEL", "info");
        let stack = template(&app).unwrap();

        let resources = stack["Resources"].as_object().unwrap();
        assert_eq!(resources.len(), 6);
        assert_eq!(resources["WebApiService"]["Type"], "AWS::ECS::Service");
        assert_eq!(resources["WebApiService"]["Properties"]["DesiredCount"], 2);

        let env = &resources["WebApiTaskDefinition"]["Properties"]["ContainerDefinitions"][0]
            ["Environment"];
        assert_eq!(env.as_array().unwrap().len(), 2);
        assert_eq!(stack["Parameters"]["ImageTag"]["Default"], "latest");
    }
}
