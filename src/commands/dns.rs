//! DNS command definitions.

use super::node::{ArgsSpec, CommandNode, FlagSpec};
use super::params::{
    acl_flag, label_selector_flag, limit_flag, ARG_ZONE_ID, COMMAND_CREATE, COMMAND_DELETE,
    COMMAND_DESCRIBE, COMMAND_DNS, COMMAND_LIST, COMMAND_UPDATE, COMMAND_ZONE,
    PARAMETER_CONTACT_EMAIL, PARAMETER_DEFAULT_TTL, PARAMETER_DESCRIPTION, PARAMETER_DNS_NAME,
    PARAMETER_EXPIRE_TIME, PARAMETER_INCLUDE_DELETED, PARAMETER_IS_REVERSE_ZONE,
    PARAMETER_NAME, PARAMETER_NEGATIVE_CACHE, PARAMETER_PAGE_SIZE, PARAMETER_PRIMARY,
    PARAMETER_REFRESH_TIME, PARAMETER_RETRY_TIME, PARAMETER_TYPE,
};
use crate::{actions::dns_zone, flags::uuid_arg};

pub const ZONE_TYPE_CHOICES: &[&str] = &["primary", "secondary"];
pub const DEFAULT_PAGE_SIZE: &str = "100";

pub fn dns_command() -> CommandNode {
    CommandNode::group(COMMAND_DNS, "Provides functionality for DNS")
        .long_about("Provides functionality for DNS zones and their settings.")
        .child(zone_command())
}

fn zone_command() -> CommandNode {
    CommandNode::group(COMMAND_ZONE, "Provides functionality for DNS zones")
        .child(list_command())
        .child(create_command())
        .child(describe_command())
        .child(update_command())
        .child(delete_command())
}

/// Flags shared by create and update.
fn zone_settings_flags() -> Vec<FlagSpec> {
    vec![
        FlagSpec::value(PARAMETER_DEFAULT_TTL, "Default time to live").value_name("SECONDS"),
        FlagSpec::list(
            PARAMETER_PRIMARY,
            "Primary name server for secondary zone, repeatable",
        )
        .value_name("SERVER"),
        acl_flag("Access control list"),
        FlagSpec::value(PARAMETER_RETRY_TIME, "Retry time").value_name("SECONDS"),
        FlagSpec::value(PARAMETER_REFRESH_TIME, "Refresh time").value_name("SECONDS"),
        FlagSpec::value(PARAMETER_NEGATIVE_CACHE, "Negative cache").value_name("SECONDS"),
        FlagSpec::value(PARAMETER_EXPIRE_TIME, "Expire time").value_name("SECONDS"),
        FlagSpec::value(PARAMETER_DESCRIPTION, "Description of the zone"),
        FlagSpec::value(PARAMETER_CONTACT_EMAIL, "Contact email for the zone").value_name("EMAIL"),
    ]
}

fn list_command() -> CommandNode {
    CommandNode::leaf(COMMAND_LIST, "Lists DNS zones", executor!(dns_zone::list))
        .long_about("Lists DNS zones. Successfully deleted zones are not listed by default.")
        .example("List DNS zones", "nimbus dns zone list")
        .example(
            "List DNS zones in JSON format",
            "nimbus dns zone list --output-format json",
        )
        .example("List up to 10 DNS zones", "nimbus dns zone list --limit 10")
        .example(
            "List DNS zones, including deleted",
            "nimbus dns zone list --include-deleted",
        )
        .flag(limit_flag())
        .flag(
            FlagSpec::value(
                PARAMETER_PAGE_SIZE,
                "Number of items fetched in each API call. Does not affect the number of items in the command output",
            )
            .value_name("SIZE")
            .default_value(DEFAULT_PAGE_SIZE),
        )
        .flag(FlagSpec::bool(
            PARAMETER_INCLUDE_DELETED,
            "Includes successfully deleted zones",
        ))
        .flag(label_selector_flag())
}

fn create_command() -> CommandNode {
    CommandNode::leaf(COMMAND_CREATE, "Creates a DNS zone", executor!(dns_zone::create))
        .example(
            "Create a DNS zone with name \"my-zone\" and DNS name \"www.my-zone.com\"",
            "nimbus dns zone create --name my-zone --dns-name www.my-zone.com",
        )
        .example(
            "Create a DNS zone restricted to one network",
            "nimbus dns zone create --name my-zone --dns-name www.my-zone.com --acl 10.0.0.0/24",
        )
        .flag(FlagSpec::value(PARAMETER_NAME, "User given name of the zone"))
        .flag(
            FlagSpec::value(PARAMETER_DNS_NAME, "Fully qualified domain name of the DNS zone")
                .value_name("FQDN"),
        )
        .flag(
            FlagSpec::value(PARAMETER_TYPE, "Zone type")
                .value_name("TYPE")
                .choices(ZONE_TYPE_CHOICES),
        )
        .flag(FlagSpec::bool(PARAMETER_IS_REVERSE_ZONE, "Is reverse zone"))
        .flags(zone_settings_flags())
        .required(&[PARAMETER_NAME, PARAMETER_DNS_NAME])
}

fn describe_command() -> CommandNode {
    CommandNode::leaf(
        COMMAND_DESCRIBE,
        "Shows details of a DNS zone",
        executor!(dns_zone::describe),
    )
    .example(
        "Get details of a DNS zone with ID \"xxx\"",
        "nimbus dns zone describe xxx",
    )
    .example(
        "Get details of a DNS zone in JSON format",
        "nimbus dns zone describe xxx --output-format json",
    )
    .args(ArgsSpec::single_validated(ARG_ZONE_ID, uuid_arg))
}

fn update_command() -> CommandNode {
    CommandNode::leaf(COMMAND_UPDATE, "Updates a DNS zone", executor!(dns_zone::update))
        .example(
            "Update the contact email of the DNS zone with ID \"xxx\"",
            "nimbus dns zone update xxx --contact-email someone@domain.com",
        )
        .args(ArgsSpec::single_validated(ARG_ZONE_ID, uuid_arg))
        .flag(FlagSpec::value(PARAMETER_NAME, "User given name of the zone"))
        .flags(zone_settings_flags())
}

fn delete_command() -> CommandNode {
    CommandNode::leaf(COMMAND_DELETE, "Deletes a DNS zone", executor!(dns_zone::delete))
        .example(
            "Delete a DNS zone with ID \"xxx\"",
            "nimbus dns zone delete xxx",
        )
        .args(ArgsSpec::single_validated(ARG_ZONE_ID, uuid_arg))
}
