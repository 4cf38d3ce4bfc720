//! Redis command definitions.

use super::node::{ArgsSpec, CommandNode, FlagSpec};
use super::params::{
    acl_flag, limit_flag, ARG_INSTANCE_ID, COMMAND_CREATE, COMMAND_DELETE, COMMAND_INSTANCE,
    COMMAND_LIST, COMMAND_PLANS, COMMAND_REDIS, COMMAND_UPDATE, PARAMETER_ENABLE_MONITORING,
    PARAMETER_GRAPHITE, PARAMETER_METRICS_FREQUENCY, PARAMETER_METRICS_PREFIX,
    PARAMETER_MONITORING_INSTANCE_ID, PARAMETER_NAME, PARAMETER_PLAN_ID, PARAMETER_PLAN_NAME,
    PARAMETER_SYSLOG, PARAMETER_VERSION,
};
use crate::{actions::redis_instance, flags::uuid_arg};

pub fn redis_command() -> CommandNode {
    CommandNode::group(COMMAND_REDIS, "Provides functionality for Redis")
        .child(plans_command())
        .child(instance_command())
}

fn instance_command() -> CommandNode {
    CommandNode::group(COMMAND_INSTANCE, "Provides functionality for Redis instances")
        .child(list_command())
        .child(create_command())
        .child(update_command())
        .child(delete_command())
}

/// Plan selection and instance parameters, shared by create and update.
fn instance_flags() -> Vec<FlagSpec> {
    vec![
        FlagSpec::value(PARAMETER_PLAN_ID, "Plan ID").value_name("PLAN_ID"),
        FlagSpec::value(PARAMETER_PLAN_NAME, "Plan name").value_name("PLAN_NAME"),
        FlagSpec::value(PARAMETER_VERSION, "Instance Redis version").value_name("VERSION"),
        FlagSpec::bool(PARAMETER_ENABLE_MONITORING, "Enable monitoring"),
        FlagSpec::value(PARAMETER_GRAPHITE, "Graphite host").value_name("HOST:PORT"),
        FlagSpec::value(PARAMETER_METRICS_FREQUENCY, "Metrics frequency").value_name("SECONDS"),
        FlagSpec::value(PARAMETER_METRICS_PREFIX, "Metrics prefix").value_name("PREFIX"),
        FlagSpec::value(PARAMETER_MONITORING_INSTANCE_ID, "Monitoring instance ID")
            .value_name("UUID"),
        acl_flag("List of IP networks in CIDR notation which are allowed to access this instance"),
        FlagSpec::list(PARAMETER_SYSLOG, "Syslog endpoint, repeatable").value_name("HOST:PORT"),
    ]
}

fn plans_command() -> CommandNode {
    CommandNode::leaf(
        COMMAND_PLANS,
        "Lists all Redis service plans",
        executor!(redis_instance::plans),
    )
    .example("List all Redis service plans", "nimbus redis plans")
    .example(
        "List up to 10 Redis service plans",
        "nimbus redis plans --limit 10",
    )
    .flag(limit_flag())
}

fn list_command() -> CommandNode {
    CommandNode::leaf(
        COMMAND_LIST,
        "Lists all Redis instances",
        executor!(redis_instance::list),
    )
    .example("List all Redis instances", "nimbus redis instance list")
    .example(
        "List all Redis instances in JSON format",
        "nimbus redis instance list --output-format json",
    )
    .flag(limit_flag())
}

fn create_command() -> CommandNode {
    CommandNode::leaf(
        COMMAND_CREATE,
        "Creates a Redis instance",
        executor!(redis_instance::create),
    )
    .example(
        "Create a Redis instance with name \"my-instance\" and specify plan by name and version",
        "nimbus redis instance create --name my-instance --plan-name premium-replica --version 7",
    )
    .example(
        "Create a Redis instance with name \"my-instance\" and specify plan by ID",
        "nimbus redis instance create --name my-instance --plan-id xxx",
    )
    .example(
        "Create a Redis instance with name \"my-instance\" and specify IP range which is allowed to access it",
        "nimbus redis instance create --name my-instance --plan-id xxx --acl 1.2.3.0/24",
    )
    .flag(FlagSpec::value(PARAMETER_NAME, "Instance name"))
    .flags(instance_flags())
    .required(&[PARAMETER_NAME])
    .mutually_exclusive(&[PARAMETER_PLAN_ID, PARAMETER_PLAN_NAME])
    .mutually_exclusive(&[PARAMETER_PLAN_ID, PARAMETER_VERSION])
    .required_together(&[PARAMETER_PLAN_NAME, PARAMETER_VERSION])
}

fn update_command() -> CommandNode {
    CommandNode::leaf(
        COMMAND_UPDATE,
        "Updates a Redis instance",
        executor!(redis_instance::update),
    )
    .example(
        "Update the plan of a Redis instance with ID \"xxx\"",
        "nimbus redis instance update xxx --plan-id yyy",
    )
    .example(
        "Update the range of IPs allowed to access a Redis instance with ID \"xxx\"",
        "nimbus redis instance update xxx --acl 1.2.3.0/24",
    )
    .args(ArgsSpec::single_validated(ARG_INSTANCE_ID, uuid_arg))
    .flags(instance_flags())
    .mutually_exclusive(&[PARAMETER_PLAN_ID, PARAMETER_PLAN_NAME])
    .mutually_exclusive(&[PARAMETER_PLAN_ID, PARAMETER_VERSION])
    .required_together(&[PARAMETER_PLAN_NAME, PARAMETER_VERSION])
}

fn delete_command() -> CommandNode {
    CommandNode::leaf(
        COMMAND_DELETE,
        "Deletes a Redis instance",
        executor!(redis_instance::delete),
    )
    .example(
        "Delete a Redis instance with ID \"xxx\"",
        "nimbus redis instance delete xxx",
    )
    .args(ArgsSpec::single_validated(ARG_INSTANCE_ID, uuid_arg))
}
