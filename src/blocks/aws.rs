//! AWS building blocks — one template per resource type.

use crate::core::registry::{BuildingBlock, VariableDefinition};
use crate::core::types::{Provider, ResourceType};
use serde_json::json;

fn block(
    name: &str,
    resource_type: ResourceType,
    template: &str,
    variables: Vec<VariableDefinition>,
    outputs: &[&str],
) -> BuildingBlock {
    BuildingBlock {
        name: name.to_string(),
        provider: Provider::Aws,
        resource_type,
        source: format!("./modules/{name}"),
        template: template.to_string(),
        variables,
        outputs: outputs.iter().map(|o| o.to_string()).collect(),
    }
}

pub fn catalogue() -> Vec<BuildingBlock> {
    vec![
        block(
            "aws-vpc",
            ResourceType::Network,
            r#"resource "aws_vpc" "main" {
  cidr_block           = var.cidr_block
  enable_dns_hostnames = true
  enable_dns_support   = true
  tags = { Name = var.network_name }
}

resource "aws_subnet" "public" {
  count                   = var.public_subnets
  vpc_id                  = aws_vpc.main.id
  cidr_block              = cidrsubnet(var.cidr_block, 8, count.index)
  availability_zone       = data.aws_availability_zones.available.names[count.index]
  map_public_ip_on_launch = true
  tags = { Name = "${var.network_name}-public-${count.index}" }
}

resource "aws_subnet" "private" {
  count             = var.private_subnets
  vpc_id            = aws_vpc.main.id
  cidr_block        = cidrsubnet(var.cidr_block, 8, count.index + var.public_subnets)
  availability_zone = data.aws_availability_zones.available.names[count.index]
  tags = { Name = "${var.network_name}-private-${count.index}" }
}"#,
            vec![
                VariableDefinition::required("network_name", "string", "VPC name"),
                VariableDefinition::optional(
                    "cidr_block",
                    "string",
                    json!("10.0.0.0/16"),
                    "VPC CIDR block",
                ),
                VariableDefinition::optional(
                    "public_subnets",
                    "number",
                    json!(2),
                    "Public subnet count",
                ),
                VariableDefinition::optional(
                    "private_subnets",
                    "number",
                    json!(2),
                    "Private subnet count",
                ),
            ],
            &["vpc_id", "public_subnet_ids", "private_subnet_ids"],
        ),
        block(
            "aws-ec2",
            ResourceType::Compute,
            r#"resource "aws_instance" "main" {
  count         = var.count
  ami           = var.ami
  instance_type = var.instance_type
  subnet_id     = var.subnet_id
  tags = { Name = "app-server-${count.index}" }
}"#,
            vec![
                VariableDefinition::optional(
                    "instance_type",
                    "string",
                    json!("t3.medium"),
                    "Instance type",
                ),
                VariableDefinition::required("ami", "string", "AMI ID"),
                VariableDefinition::optional("count", "number", json!(1), "Instance count"),
            ],
            &["instance_ids", "public_ips"],
        ),
        block(
            "aws-rds",
            ResourceType::Database,
            r#"resource "aws_db_instance" "main" {
  identifier             = var.db_identifier
  engine                 = var.engine
  instance_class         = var.instance_class
  allocated_storage      = var.allocated_storage
  multi_az               = var.multi_az
  storage_encrypted      = true
  skip_final_snapshot    = false
  vpc_security_group_ids = [aws_security_group.db.id]
  db_subnet_group_name   = aws_db_subnet_group.main.name
}"#,
            vec![
                VariableDefinition::optional(
                    "engine",
                    "string",
                    json!("postgresql"),
                    "DB engine",
                ),
                VariableDefinition::optional(
                    "instance_class",
                    "string",
                    json!("db.t3.medium"),
                    "Instance class",
                ),
                VariableDefinition::optional(
                    "multi_az",
                    "bool",
                    json!(false),
                    "Multi-AZ deployment",
                ),
                VariableDefinition::optional(
                    "allocated_storage",
                    "number",
                    json!(20),
                    "Storage in GB",
                ),
            ],
            &["db_endpoint", "db_port"],
        ),
        block(
            "aws-s3",
            ResourceType::Storage,
            r#"resource "aws_s3_bucket" "main" {
  bucket = var.bucket_name
}

resource "aws_s3_bucket_versioning" "main" {
  bucket = aws_s3_bucket.main.id
  versioning_configuration {
    status = var.versioning ? "Enabled" : "Suspended"
  }
}

resource "aws_s3_bucket_server_side_encryption_configuration" "main" {
  bucket = aws_s3_bucket.main.id
  rule {
    apply_server_side_encryption_by_default { sse_algorithm = "AES256" }
  }
}"#,
            vec![
                VariableDefinition::required("bucket_name", "string", "Bucket name"),
                VariableDefinition::optional(
                    "versioning",
                    "bool",
                    json!(true),
                    "Enable versioning",
                ),
            ],
            &["bucket_arn", "bucket_domain_name"],
        ),
        block(
            "aws-lambda",
            ResourceType::Serverless,
            r#"resource "aws_lambda_function" "main" {
  function_name = var.function_name
  runtime       = var.runtime
  handler       = "index.handler"
  memory_size   = var.memory_size
  timeout       = var.timeout
  role          = aws_iam_role.lambda.arn
}"#,
            vec![
                VariableDefinition::required("function_name", "string", "Function name"),
                VariableDefinition::optional(
                    "runtime",
                    "string",
                    json!("nodejs20.x"),
                    "Runtime",
                ),
                VariableDefinition::optional(
                    "memory_size",
                    "number",
                    json!(512),
                    "Memory in MB",
                ),
            ],
            &["function_arn", "invoke_arn"],
        ),
        block(
            "aws-ecs",
            ResourceType::Container,
            r#"resource "aws_ecs_cluster" "main" {
  name = var.cluster_name
}

resource "aws_ecs_service" "main" {
  name          = "${var.cluster_name}-service"
  cluster       = aws_ecs_cluster.main.id
  desired_count = var.desired_count
  launch_type   = var.launch_type
}"#,
            vec![
                VariableDefinition::required("cluster_name", "string", "Cluster name"),
                VariableDefinition::optional(
                    "desired_count",
                    "number",
                    json!(2),
                    "Task count",
                ),
                VariableDefinition::optional(
                    "launch_type",
                    "string",
                    json!("FARGATE"),
                    "Launch type",
                ),
            ],
            &["cluster_arn", "service_name"],
        ),
        block(
            "aws-sqs",
            ResourceType::Application,
            r#"resource "aws_sqs_queue" "main" {
  name                    = var.queue_name
  fifo_queue              = var.fifo
  sqs_managed_sse_enabled = true
}"#,
            vec![
                VariableDefinition::required("queue_name", "string", "Queue name"),
                VariableDefinition::optional("fifo", "bool", json!(false), "FIFO queue"),
            ],
            &["queue_url", "queue_arn"],
        ),
    ]
}
