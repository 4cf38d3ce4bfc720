//! Executors of the leaf commands.
//!
//! Every module follows the same shape: an input model per leaf assembled by a
//! `parse_*_input` function, a `build_*_request` function turning the model
//! into an SDK request, and the async executor wiring the pipeline steps from
//! [`crate::executor`].

pub mod config;
pub mod dns_zone;
pub mod public_ip;
pub mod redis_instance;
pub mod service_account_key;

use crate::flags::Flags;

/// The positional argument of a single-argument leaf. Arity is checked by the
/// command node before the executor runs.
pub(crate) fn single_arg(flags: &Flags<'_>) -> String {
    flags.args().into_iter().next().unwrap_or_default()
}

/// Cell text for an optional value.
pub(crate) fn cell<T: std::fmt::Display>(value: &Option<T>) -> String {
    value.as_ref().map(ToString::to_string).unwrap_or_default()
}
