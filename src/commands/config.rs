//! Configuration command definitions.

use super::node::{ArgsSpec, CommandNode, FlagSpec};
use super::params::{ARG_CONFIG_KEY, COMMAND_CONFIG, COMMAND_LIST, COMMAND_SET, COMMAND_UNSET};
use crate::{actions::config, configuration, sdk::Service};

/// Validator for the key argument of `config unset`.
pub fn config_key_arg(value: &str) -> Result<(), String> {
    let keys = configuration::keys();
    if keys.contains(&value) {
        Ok(())
    } else {
        Err(format!("must be one of {}", keys.join(", ")))
    }
}

fn endpoint_flags() -> Vec<FlagSpec> {
    Service::ALL
        .iter()
        .map(|service| {
            FlagSpec::value(service.endpoint_key(), "Custom endpoint of the service API")
                .value_name("URL")
        })
        .collect()
}

pub fn config_command() -> CommandNode {
    CommandNode::group(COMMAND_CONFIG, "Provides functionality for CLI configuration options")
        .long_about(
            "Provides functionality for CLI configuration options.\n\
             The configuration is stored in config.yml under the user configuration directory, \
             or under NIMBUS_CONFIG_DIR when it is set.",
        )
        .child(
            CommandNode::leaf(
                COMMAND_LIST,
                "Lists the current CLI configuration values",
                executor!(config::list),
            )
            .alias("ls")
            .example("List your active configuration", "nimbus config list")
            .example(
                "List your active configuration in YAML format",
                "nimbus config list --output-format yaml",
            ),
        )
        .child(
            CommandNode::leaf(
                COMMAND_SET,
                "Sets CLI configuration options",
                executor!(config::set),
            )
            .long_about(
                "Sets CLI configuration options.\n\
                 All of the global flags can be set, as well as the service endpoints. \
                 Values given on the command line are persisted and used as defaults by later commands.",
            )
            .example(
                "Set a project ID in your active configuration",
                "nimbus config set --project-id xxx",
            )
            .example(
                "Set the output format to JSON for all commands",
                "nimbus config set --output-format json",
            )
            .example(
                "Use a custom DNS endpoint",
                "nimbus config set --dns-endpoint https://dns.example.com",
            )
            .flags(endpoint_flags()),
        )
        .child(
            CommandNode::leaf(
                COMMAND_UNSET,
                "Unsets a CLI configuration option",
                executor!(config::unset),
            )
            .long_about(
                "Unsets a CLI configuration option, undoing past usages of the \"nimbus config set\" command.",
            )
            .example(
                "Unset the project ID stored in your configuration",
                "nimbus config unset project-id",
            )
            .example(
                "Unset the DNS custom endpoint stored in your configuration",
                "nimbus config unset dns-endpoint",
            )
            .args(ArgsSpec::single_validated(ARG_CONFIG_KEY, config_key_arg)),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_keys_are_accepted() {
        assert!(config_key_arg("project-id").is_ok());
        assert!(config_key_arg("redis-endpoint").is_ok());
        let err = config_key_arg("colour").unwrap_err();
        assert!(err.starts_with("must be one of project-id, region"));
    }
}
