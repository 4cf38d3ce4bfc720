//! The nimbus command tree.
//!
//! Each service contributes one group built in its own module. Groups only
//! carry help; leaves point at an executor in [`crate::actions`].

/// Wrap an `async fn(&mut ExecutionContext, Flags) -> Result<(), CliError>`
/// into an [`node::Executor`].
macro_rules! executor {
    ($action:path) => {{
        fn run<'a>(
            ctx: &'a mut $crate::context::ExecutionContext,
            flags: $crate::flags::Flags<'a>,
        ) -> ::futures::future::LocalBoxFuture<'a, Result<(), $crate::error::CliError>> {
            Box::pin($action(ctx, flags))
        }
        run as $crate::commands::node::Executor
    }};
}

pub mod config;
pub mod dns;
pub mod node;
pub mod params;
pub mod public_ip;
pub mod redis;
pub mod service_account;

use node::CommandNode;

use crate::error::BINARY_NAME;

/// The root of the command tree.
pub fn root_command() -> CommandNode {
    CommandNode::group(BINARY_NAME, "Manage Nimbus cloud resources")
        .long_about(
            "Manage Nimbus cloud resources from the command line.\n\n\
             Global options can be set per command, through NIMBUS_* environment \
             variables or persistently with \"nimbus config set\".",
        )
        .flags(params::global_flags())
        .child(dns::dns_command())
        .child(redis::redis_command())
        .child(public_ip::public_ip_command())
        .child(service_account::service_account_command())
        .child(config::config_command())
}
