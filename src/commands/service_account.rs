//! Service account command definitions.

use super::node::{ArgsSpec, CommandNode, FlagSpec};
use super::params::{
    limit_flag, ARG_KEY_ID, COMMAND_CREATE, COMMAND_DELETE, COMMAND_DESCRIBE, COMMAND_KEY,
    COMMAND_LIST, COMMAND_SERVICE_ACCOUNT, PARAMETER_EMAIL, PARAMETER_EXPIRES_IN_DAYS,
    PARAMETER_PUBLIC_KEY,
};
use crate::{actions::service_account_key, flags::uuid_arg};

fn email_flag() -> FlagSpec {
    FlagSpec::value(PARAMETER_EMAIL, "Service account email").value_name("EMAIL")
}

pub fn service_account_command() -> CommandNode {
    CommandNode::group(
        COMMAND_SERVICE_ACCOUNT,
        "Provides functionality for service accounts",
    )
    .child(key_command())
}

fn key_command() -> CommandNode {
    CommandNode::group(COMMAND_KEY, "Provides functionality regarding service account keys")
        .child(
            CommandNode::leaf(
                COMMAND_CREATE,
                "Creates a service account key",
                executor!(service_account_key::create),
            )
            .long_about(
                "Creates a service account key.\n\
                 You can generate an RSA keypair and provide the public key.\n\
                 If you do not provide a public key, the service will generate a new key-pair \
                 and the private key is included in the response. You won't be able to retrieve it later.",
            )
            .example(
                "Create a key for the service account with email \"my-service-account-1234567@sa.nimbus.cloud\" with no expiration date",
                "nimbus service-account key create --email my-service-account-1234567@sa.nimbus.cloud",
            )
            .example(
                "Create a key valid for 30 days",
                "nimbus service-account key create --email my-service-account-1234567@sa.nimbus.cloud --expires-in-days 30",
            )
            .example(
                "Provide the public key of a keypair you generated",
                "nimbus service-account key create --email my-service-account-1234567@sa.nimbus.cloud --public-key @./public.pem",
            )
            .flag(email_flag())
            .flag(
                FlagSpec::value(
                    PARAMETER_EXPIRES_IN_DAYS,
                    "Number of days until expiration. When omitted, the key is valid until deleted",
                )
                .value_name("DAYS"),
            )
            .flag(
                FlagSpec::value(
                    PARAMETER_PUBLIC_KEY,
                    "Public key of the user generated RSA 2048 key-pair. Can be a string or path to the .pem file, if prefixed with \"@\"",
                )
                .value_name("KEY"),
            )
            .required(&[PARAMETER_EMAIL]),
        )
        .child(
            CommandNode::leaf(
                COMMAND_LIST,
                "Lists all service account keys",
                executor!(service_account_key::list),
            )
            .example(
                "List all keys belonging to the service account with email \"my-service-account-1234567@sa.nimbus.cloud\"",
                "nimbus service-account key list --email my-service-account-1234567@sa.nimbus.cloud",
            )
            .example(
                "List up to 10 keys in JSON format",
                "nimbus service-account key list --email my-service-account-1234567@sa.nimbus.cloud --limit 10 --output-format json",
            )
            .flag(email_flag())
            .flag(limit_flag())
            .required(&[PARAMETER_EMAIL]),
        )
        .child(
            CommandNode::leaf(
                COMMAND_DESCRIBE,
                "Shows details of a service account key",
                executor!(service_account_key::describe),
            )
            .example(
                "Get details of a service account key with ID \"xxx\"",
                "nimbus service-account key describe xxx --email my-service-account-1234567@sa.nimbus.cloud",
            )
            .args(ArgsSpec::single_validated(ARG_KEY_ID, uuid_arg))
            .flag(email_flag())
            .required(&[PARAMETER_EMAIL]),
        )
        .child(
            CommandNode::leaf(
                COMMAND_DELETE,
                "Deletes a service account key",
                executor!(service_account_key::delete),
            )
            .example(
                "Delete a key with ID \"xxx\" belonging to the service account with email \"my-service-account-1234567@sa.nimbus.cloud\"",
                "nimbus service-account key delete xxx --email my-service-account-1234567@sa.nimbus.cloud",
            )
            .args(ArgsSpec::single_validated(ARG_KEY_ID, uuid_arg))
            .flag(email_flag())
            .required(&[PARAMETER_EMAIL]),
        )
}
