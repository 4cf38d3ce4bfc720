//! Public IP command definitions.

use super::node::{ArgsSpec, CommandNode, FlagSpec};
use super::params::{
    label_selector_flag, labels_flag, limit_flag, ARG_PUBLIC_IP_ID, COMMAND_ASSOCIATE,
    COMMAND_CREATE, COMMAND_DELETE, COMMAND_DESCRIBE, COMMAND_DISASSOCIATE, COMMAND_LIST,
    COMMAND_PUBLIC_IP, COMMAND_UPDATE, PARAMETER_ASSOCIATED_RESOURCE_ID,
};
use crate::{actions::public_ip, flags::uuid_arg};

fn associated_resource_flag() -> FlagSpec {
    FlagSpec::value(
        PARAMETER_ASSOCIATED_RESOURCE_ID,
        "ID of the network interface the public IP is associated with",
    )
    .value_name("UUID")
}

pub fn public_ip_command() -> CommandNode {
    CommandNode::group(COMMAND_PUBLIC_IP, "Provides functionality for public IPs")
        .child(
            CommandNode::leaf(COMMAND_CREATE, "Creates a public IP", executor!(public_ip::create))
                .example("Create a public IP", "nimbus public-ip create")
                .example(
                    "Create a public IP with associated resource ID \"xxx\"",
                    "nimbus public-ip create --associated-resource-id xxx",
                )
                .example(
                    "Create a public IP with associated resource ID \"xxx\" and labels",
                    "nimbus public-ip create --associated-resource-id xxx --labels key=value,foo=bar",
                )
                .flag(associated_resource_flag())
                .flag(labels_flag("Labels are key-value string pairs which can be attached to a public IP")),
        )
        .child(
            CommandNode::leaf(COMMAND_LIST, "Lists all public IPs of a project", executor!(public_ip::list))
                .example("Lists all public IPs", "nimbus public-ip list")
                .example(
                    "Lists all public IPs which contain the label xxx",
                    "nimbus public-ip list --label-selector xxx",
                )
                .example(
                    "Lists up to 10 public IPs",
                    "nimbus public-ip list --limit 10",
                )
                .flag(label_selector_flag())
                .flag(limit_flag()),
        )
        .child(
            CommandNode::leaf(
                COMMAND_DESCRIBE,
                "Shows details of a public IP",
                executor!(public_ip::describe),
            )
            .example(
                "Show details of a public IP with ID \"xxx\"",
                "nimbus public-ip describe xxx",
            )
            .args(ArgsSpec::single_validated(ARG_PUBLIC_IP_ID, uuid_arg)),
        )
        .child(
            CommandNode::leaf(COMMAND_UPDATE, "Updates a public IP", executor!(public_ip::update))
                .example(
                    "Update public IP with ID \"xxx\" with new labels",
                    "nimbus public-ip update xxx --labels key=value,foo=bar",
                )
                .args(ArgsSpec::single_validated(ARG_PUBLIC_IP_ID, uuid_arg))
                .flag(labels_flag("Labels are key-value string pairs which can be attached to a public IP")),
        )
        .child(
            CommandNode::leaf(
                COMMAND_ASSOCIATE,
                "Associates a public IP with a network interface or a virtual IP",
                executor!(public_ip::associate),
            )
            .example(
                "Associate public IP with ID \"xxx\" to a resource with ID \"yyy\"",
                "nimbus public-ip associate xxx --associated-resource-id yyy",
            )
            .args(ArgsSpec::single_validated(ARG_PUBLIC_IP_ID, uuid_arg))
            .flag(associated_resource_flag())
            .required(&[PARAMETER_ASSOCIATED_RESOURCE_ID]),
        )
        .child(
            CommandNode::leaf(
                COMMAND_DISASSOCIATE,
                "Disassociates a public IP from a network interface or a virtual IP",
                executor!(public_ip::disassociate),
            )
            .example(
                "Disassociate public IP with ID \"xxx\" from a resource",
                "nimbus public-ip disassociate xxx",
            )
            .args(ArgsSpec::single_validated(ARG_PUBLIC_IP_ID, uuid_arg)),
        )
        .child(
            CommandNode::leaf(COMMAND_DELETE, "Deletes a public IP", executor!(public_ip::delete))
                .long_about(
                    "Deletes a public IP.\n\
                     If the public IP is still in use, the deletion will fail.",
                )
                .example(
                    "Delete public IP with ID \"xxx\"",
                    "nimbus public-ip delete xxx",
                )
                .args(ArgsSpec::single_validated(ARG_PUBLIC_IP_ID, uuid_arg)),
        )
}
