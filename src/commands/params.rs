//! Shared command and flag names.
//!
//! Flags that several commands take are defined once here, together with the
//! global flags every command inherits.

use super::node::FlagSpec;

// Groups
pub const COMMAND_DNS: &str = "dns";
pub const COMMAND_ZONE: &str = "zone";
pub const COMMAND_REDIS: &str = "redis";
pub const COMMAND_INSTANCE: &str = "instance";
pub const COMMAND_PLANS: &str = "plans";
pub const COMMAND_PUBLIC_IP: &str = "public-ip";
pub const COMMAND_SERVICE_ACCOUNT: &str = "service-account";
pub const COMMAND_KEY: &str = "key";
pub const COMMAND_CONFIG: &str = "config";

// Operations
pub const COMMAND_CREATE: &str = "create";
pub const COMMAND_LIST: &str = "list";
pub const COMMAND_DESCRIBE: &str = "describe";
pub const COMMAND_UPDATE: &str = "update";
pub const COMMAND_DELETE: &str = "delete";
pub const COMMAND_ASSOCIATE: &str = "associate";
pub const COMMAND_DISASSOCIATE: &str = "disassociate";
pub const COMMAND_SET: &str = "set";
pub const COMMAND_UNSET: &str = "unset";

// Global flags
pub const PARAMETER_PROJECT_ID: &str = "project-id";
pub const PARAMETER_REGION: &str = "region";
pub const PARAMETER_OUTPUT_FORMAT: &str = "output-format";
pub const PARAMETER_VERBOSITY: &str = "verbosity";
pub const PARAMETER_ASSUME_YES: &str = "assume-yes";
pub const PARAMETER_ASYNC: &str = "async";

// Common flags
pub const PARAMETER_LIMIT: &str = "limit";
pub const PARAMETER_LABEL_SELECTOR: &str = "label-selector";
pub const PARAMETER_LABELS: &str = "labels";
pub const PARAMETER_ACL: &str = "acl";
pub const PARAMETER_NAME: &str = "name";
pub const PARAMETER_DESCRIPTION: &str = "description";

// DNS zone flags
pub const PARAMETER_PAGE_SIZE: &str = "page-size";
pub const PARAMETER_INCLUDE_DELETED: &str = "include-deleted";
pub const PARAMETER_DNS_NAME: &str = "dns-name";
pub const PARAMETER_DEFAULT_TTL: &str = "default-ttl";
pub const PARAMETER_PRIMARY: &str = "primary";
pub const PARAMETER_TYPE: &str = "type";
pub const PARAMETER_RETRY_TIME: &str = "retry-time";
pub const PARAMETER_REFRESH_TIME: &str = "refresh-time";
pub const PARAMETER_NEGATIVE_CACHE: &str = "negative-cache";
pub const PARAMETER_EXPIRE_TIME: &str = "expire-time";
pub const PARAMETER_IS_REVERSE_ZONE: &str = "is-reverse-zone";
pub const PARAMETER_CONTACT_EMAIL: &str = "contact-email";

// Redis flags
pub const PARAMETER_PLAN_ID: &str = "plan-id";
pub const PARAMETER_PLAN_NAME: &str = "plan-name";
pub const PARAMETER_VERSION: &str = "version";
pub const PARAMETER_ENABLE_MONITORING: &str = "enable-monitoring";
pub const PARAMETER_GRAPHITE: &str = "graphite";
pub const PARAMETER_METRICS_FREQUENCY: &str = "metrics-frequency";
pub const PARAMETER_METRICS_PREFIX: &str = "metrics-prefix";
pub const PARAMETER_MONITORING_INSTANCE_ID: &str = "monitoring-instance-id";
pub const PARAMETER_SYSLOG: &str = "syslog";

// Public IP flags
pub const PARAMETER_ASSOCIATED_RESOURCE_ID: &str = "associated-resource-id";

// Service account key flags
pub const PARAMETER_EMAIL: &str = "email";
pub const PARAMETER_EXPIRES_IN_DAYS: &str = "expires-in-days";
pub const PARAMETER_PUBLIC_KEY: &str = "public-key";

// Positional arguments
pub const ARG_ZONE_ID: &str = "ZONE_ID";
pub const ARG_INSTANCE_ID: &str = "INSTANCE_ID";
pub const ARG_PUBLIC_IP_ID: &str = "PUBLIC_IP_ID";
pub const ARG_KEY_ID: &str = "KEY_ID";
pub const ARG_CONFIG_KEY: &str = "KEY";

pub const ENV_PROJECT_ID: &str = "NIMBUS_PROJECT_ID";
pub const ENV_REGION: &str = "NIMBUS_REGION";
pub const ENV_OUTPUT_FORMAT: &str = "NIMBUS_OUTPUT_FORMAT";
pub const ENV_VERBOSITY: &str = "NIMBUS_VERBOSITY";

pub const OUTPUT_FORMAT_CHOICES: &[&str] = &["none", "json", "yaml", "pretty"];
pub const VERBOSITY_CHOICES: &[&str] = &["debug", "info", "warn", "error"];

/// Flags inherited by every command.
pub fn global_flags() -> Vec<FlagSpec> {
    vec![
        FlagSpec::value(PARAMETER_PROJECT_ID, "Project ID")
            .value_name("PROJECT_ID")
            .env(ENV_PROJECT_ID)
            .global(),
        FlagSpec::value(PARAMETER_REGION, "Target region for region-specific requests")
            .value_name("REGION")
            .env(ENV_REGION)
            .global(),
        FlagSpec::value(PARAMETER_OUTPUT_FORMAT, "Output format")
            .value_name("FORMAT")
            .env(ENV_OUTPUT_FORMAT)
            .choices(OUTPUT_FORMAT_CHOICES)
            .global(),
        FlagSpec::value(PARAMETER_VERBOSITY, "Verbosity of the CLI")
            .value_name("LEVEL")
            .env(ENV_VERBOSITY)
            .choices(VERBOSITY_CHOICES)
            .global(),
        FlagSpec::bool(
            PARAMETER_ASSUME_YES,
            "If set, skips all confirmation prompts",
        )
        .short('y')
        .global(),
        FlagSpec::bool(
            PARAMETER_ASYNC,
            "If set, runs the command asynchronously",
        )
        .global(),
    ]
}

pub fn limit_flag() -> FlagSpec {
    FlagSpec::value(PARAMETER_LIMIT, "Maximum number of entries to list").value_name("LIMIT")
}

pub fn label_selector_flag() -> FlagSpec {
    FlagSpec::value(
        PARAMETER_LABEL_SELECTOR,
        "Filter by label, e.g. \"env=prod\"",
    )
    .value_name("SELECTOR")
}

pub fn labels_flag(help: &'static str) -> FlagSpec {
    FlagSpec::map(PARAMETER_LABELS, help)
}

pub fn acl_flag(help: &'static str) -> FlagSpec {
    FlagSpec::list(PARAMETER_ACL, help).value_name("CIDR")
}
