//! Command dispatch.
//!
//! Parses the command line against the command tree, resolves the selected
//! node, applies the global options to the printer and runs the node: a
//! group prints its help, a leaf is validated and executed.

use std::ffi::OsString;

use clap::{error::ErrorKind, Command};
use tracing::{debug, trace};

use crate::{
    commands::{node::CommandNode, root_command},
    context::ExecutionContext,
    error::{CliError, BINARY_NAME},
    flags::Flags,
    globalflags::GlobalOptions,
    print::Printer,
};

/// Build the clap command for the whole tree.
pub fn build_cli(root: &CommandNode) -> Command {
    root.to_clap()
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name(BINARY_NAME)
}

/// Parse `argv` and run the selected command.
pub async fn run<I, T>(argv: I, ctx: &mut ExecutionContext) -> Result<(), CliError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let argv: Vec<OsString> = argv.into_iter().map(Into::into).collect();
    let root = root_command();
    let matches = match build_cli(&root).try_get_matches_from(argv.iter().cloned()) {
        Ok(matches) => matches,
        Err(e) => {
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                    ctx.printer.outputf(e.render())
                }
                _ => Err(CliError::Usage {
                    message: clap_message(&e),
                    command: command_path_from_args(&root, &argv),
                }),
            };
        }
    };

    let mut node = &root;
    let mut selected = &matches;
    let mut path = vec![root.name];
    while let Some((name, sub_matches)) = selected.subcommand() {
        node = node.find(name).ok_or_else(|| CliError::Usage {
            message: format!("unknown command \"{name}\""),
            command: path.join(" "),
        })?;
        path.push(node.name);
        selected = sub_matches;
    }

    run_node(ctx, node, Flags::new(selected), &path).await
}

async fn run_node(
    ctx: &mut ExecutionContext,
    node: &CommandNode,
    flags: Flags<'_>,
    path: &[&str],
) -> Result<(), CliError> {
    let command_path = path.join(" ");
    trace!("Running \"{}\"...", command_path);

    let globals = GlobalOptions::parse(&flags, &ctx.configuration)?;
    ctx.printer.set_verbosity(globals.verbosity);
    ctx.printer.set_output_format(globals.output_format);
    ctx.globals = globals;

    match node.executor {
        None => {
            debug!("\"{}\" is a group, printing its help", command_path);
            ctx.printer.outputf(group_help(path))
        }
        Some(executor) => {
            node.validate(&flags, &command_path)?;
            executor(ctx, flags).await
        }
    }
}

/// Rendered help of the group at `path`.
fn group_help(path: &[&str]) -> String {
    let mut cli = build_cli(&root_command());
    cli.build();
    let mut current = &cli;
    for name in path.iter().skip(1) {
        match current.find_subcommand(name) {
            Some(next) => current = next,
            None => break,
        }
    }
    current.clone().render_help().to_string()
}

/// First line of a clap error, without its `error: ` prefix.
fn clap_message(e: &clap::Error) -> String {
    let rendered = e.render().to_string();
    let first = rendered.lines().next().unwrap_or_default();
    first.strip_prefix("error: ").unwrap_or(first).trim().to_string()
}

/// The longest command path named by the leading words of `argv`.
fn command_path_from_args(root: &CommandNode, argv: &[OsString]) -> String {
    let mut node = root;
    let mut path = vec![root.name];
    for word in argv.iter().skip(1).filter_map(|word| word.to_str()) {
        if word.starts_with('-') {
            continue;
        }
        match node
            .children
            .iter()
            .find(|child| child.name == word || child.aliases.contains(&word))
        {
            Some(child) => {
                node = child;
                path.push(child.name);
            }
            None => break,
        }
    }
    path.join(" ")
}

/// Print an error the way every command reports failures.
///
/// At debug verbosity the hint and the source chain come first.
pub fn report_error(printer: &mut Printer, err: &CliError) {
    if printer.is_debug() {
        if let Some(hint) = err.hint() {
            printer.debug(hint);
        }
        let mut source = std::error::Error::source(err);
        while let Some(cause) = source {
            printer.debug(format!("caused by: {cause}"));
            source = cause.source();
        }
    }
    printer.error(err);
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::configuration::Configuration;
    use crate::context::testing::context;
    use crate::print::testing::SharedBuffer;
    use crate::sdk::fake::FakeClients;
    use serde::Serialize;
    use serde_json::Value;

    /// Outcome of one in-process invocation.
    pub struct Invocation {
        pub result: Result<(), CliError>,
        pub stdout: SharedBuffer,
        pub stderr: SharedBuffer,
    }

    impl Invocation {
        pub fn stdout(&self) -> String {
            self.stdout.contents()
        }

        pub fn stderr(&self) -> String {
            self.stderr.contents()
        }
    }

    /// Parse `nimbus <args>` down to the selected leaf and hand its flags to
    /// an input-model parser.
    pub fn parse_leaf<T>(
        args: &[String],
        parse: impl FnOnce(&mut ExecutionContext, &Flags<'_>) -> Result<T, CliError>,
    ) -> T {
        let argv = std::iter::once(BINARY_NAME.to_string()).chain(args.iter().cloned());
        let matches = build_cli(&root_command())
            .try_get_matches_from(argv)
            .unwrap();
        let mut selected = &matches;
        while let Some((_, sub_matches)) = selected.subcommand() {
            selected = sub_matches;
        }
        let flags = Flags::new(selected);
        let globals = GlobalOptions::parse(&flags, &Configuration::default()).unwrap();
        let (mut ctx, _, _) = context("", Box::new(FakeClients::default()), globals);
        parse(&mut ctx, &flags).unwrap()
    }

    fn plain(value: &Value) -> String {
        match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    /// The command line that sets every field of a serialized input model.
    /// Fields are named after their flag unless listed in `renamed`.
    pub fn argv_from_model(
        command: &[&str],
        model: &impl Serialize,
        renamed: &[(&str, &str)],
    ) -> Vec<String> {
        let mut argv: Vec<String> = command.iter().map(|word| word.to_string()).collect();
        let Value::Object(fields) = serde_json::to_value(model).unwrap() else {
            panic!("input models serialize to objects");
        };
        for (field, value) in fields {
            let flag = renamed
                .iter()
                .find(|(name, _)| *name == field)
                .map(|(_, flag)| flag.to_string())
                .unwrap_or_else(|| field.replace('_', "-"));
            let rendered = match value {
                Value::Null => continue,
                Value::Bool(b) => {
                    argv.push(format!("--{flag}={b}"));
                    continue;
                }
                Value::Array(items) => items.iter().map(plain).collect::<Vec<_>>().join(","),
                Value::Object(pairs) => pairs
                    .iter()
                    .map(|(key, value)| format!("{key}={}", plain(value)))
                    .collect::<Vec<_>>()
                    .join(","),
                scalar => plain(&scalar),
            };
            argv.push(format!("--{flag}"));
            argv.push(rendered);
        }
        argv
    }

    /// Run `nimbus <args>` against the fakes, with `input` on stdin.
    pub async fn invoke(clients: &FakeClients, input: &str, args: &[&str]) -> Invocation {
        let (mut ctx, stdout, stderr) =
            context(input, Box::new(clients.clone()), GlobalOptions::default());
        let argv = std::iter::once(BINARY_NAME).chain(args.iter().copied());
        let result = run(argv, &mut ctx).await;
        if let Err(e) = &result {
            report_error(&mut ctx.printer, e);
        }
        Invocation {
            result,
            stdout,
            stderr,
        }
    }
}
