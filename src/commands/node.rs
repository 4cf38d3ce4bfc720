//! The command tree.
//!
//! A [`CommandNode`] describes one command: its help, flags, flag constraints,
//! positional arguments and, for leaves, the executor. The tree compiles to a
//! clap [`Command`] for syntax and help, while flag constraints and positional
//! arguments are checked here so that violations surface as typed errors.

use clap::{Arg, ArgAction, Command};
use futures::future::LocalBoxFuture;

use crate::{
    context::ExecutionContext,
    error::CliError,
    flags::{Flags, ARGS},
};

/// Entry point of a leaf command.
pub type Executor =
    for<'a> fn(&'a mut ExecutionContext, Flags<'a>) -> LocalBoxFuture<'a, Result<(), CliError>>;

/// Validator for a single positional argument.
pub type ArgValidator = fn(&str) -> Result<(), String>;

/// How a flag takes its values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagKind {
    /// A single value.
    Value,
    /// `--flag` or `--flag=true|false`.
    Bool,
    /// Repeatable, comma-separated values.
    List,
    /// Repeatable, comma-separated `key=value` pairs.
    Map,
}

/// Definition of one flag.
#[derive(Debug, Clone)]
pub struct FlagSpec {
    pub name: &'static str,
    pub short: Option<char>,
    pub help: &'static str,
    pub kind: FlagKind,
    pub value_name: Option<&'static str>,
    pub default: Option<&'static str>,
    pub env: Option<&'static str>,
    pub choices: &'static [&'static str],
    pub global: bool,
}

impl FlagSpec {
    fn new(name: &'static str, help: &'static str, kind: FlagKind) -> Self {
        Self {
            name,
            short: None,
            help,
            kind,
            value_name: None,
            default: None,
            env: None,
            choices: &[],
            global: false,
        }
    }

    pub fn value(name: &'static str, help: &'static str) -> Self {
        Self::new(name, help, FlagKind::Value)
    }

    pub fn bool(name: &'static str, help: &'static str) -> Self {
        Self::new(name, help, FlagKind::Bool)
    }

    pub fn list(name: &'static str, help: &'static str) -> Self {
        Self::new(name, help, FlagKind::List)
    }

    pub fn map(name: &'static str, help: &'static str) -> Self {
        Self::new(name, help, FlagKind::Map)
    }

    pub fn short(mut self, short: char) -> Self {
        self.short = Some(short);
        self
    }

    pub fn value_name(mut self, value_name: &'static str) -> Self {
        self.value_name = Some(value_name);
        self
    }

    pub fn default_value(mut self, default: &'static str) -> Self {
        self.default = Some(default);
        self
    }

    pub fn env(mut self, env: &'static str) -> Self {
        self.env = Some(env);
        self
    }

    /// Document the accepted values. They are validated by the command.
    pub fn choices(mut self, choices: &'static [&'static str]) -> Self {
        self.choices = choices;
        self
    }

    pub fn global(mut self) -> Self {
        self.global = true;
        self
    }

    /// Build the clap argument.
    pub fn to_arg(&self, required: bool) -> Arg {
        let mut help = self.help.to_string();
        if !self.choices.is_empty() {
            help.push_str(&format!(", one of \"{}\"", self.choices.join("\", \"")));
        }
        if required {
            help.push_str(" (required)");
        }

        let mut arg = Arg::new(self.name)
            .long(self.name)
            .help(help)
            .global(self.global);
        arg = match self.kind {
            FlagKind::Value => arg.num_args(1).action(ArgAction::Set),
            FlagKind::Bool => arg
                .num_args(0..=1)
                .require_equals(true)
                .default_missing_value("true")
                .value_name("BOOL")
                .action(ArgAction::Set),
            FlagKind::List => arg
                .num_args(1)
                .value_delimiter(',')
                .action(ArgAction::Append),
            FlagKind::Map => arg
                .num_args(1)
                .value_delimiter(',')
                .value_name("KEY=VALUE")
                .action(ArgAction::Append),
        };
        if let Some(short) = self.short {
            arg = arg.short(short);
        }
        if let Some(value_name) = self.value_name {
            arg = arg.value_name(value_name);
        }
        if let Some(default) = self.default {
            arg = arg.default_value(default);
        }
        if let Some(env) = self.env {
            arg = arg.env(env);
        }
        arg
    }
}

/// Positional argument shape of a command.
#[derive(Debug, Clone, Copy)]
pub enum ArgsSpec {
    NoArgs,
    SingleArg {
        name: &'static str,
        validator: Option<ArgValidator>,
    },
}

impl ArgsSpec {
    pub fn single(name: &'static str) -> Self {
        ArgsSpec::SingleArg {
            name,
            validator: None,
        }
    }

    pub fn single_validated(name: &'static str, validator: ArgValidator) -> Self {
        ArgsSpec::SingleArg {
            name,
            validator: Some(validator),
        }
    }

    pub fn validate(&self, args: &[String], command: &str) -> Result<(), CliError> {
        let usage = |message: String| CliError::Usage {
            message,
            command: command.to_string(),
        };
        match self {
            ArgsSpec::NoArgs => match args.first() {
                Some(arg) => Err(usage(format!("unknown argument \"{arg}\""))),
                None => Ok(()),
            },
            ArgsSpec::SingleArg { name, validator } => match args {
                [] => Err(usage(format!("missing argument \"{name}\""))),
                [value] => match validator {
                    Some(validate) => validate(value.as_str()).map_err(|reason| CliError::InvalidArgument {
                        arg: value.clone(),
                        reason,
                    }),
                    None => Ok(()),
                },
                _ => Err(usage(format!(
                    "expected 1 argument \"{name}\", {} were provided",
                    args.len()
                ))),
            },
        }
    }
}

/// A usage example shown at the end of the help.
#[derive(Debug, Clone)]
pub struct Example {
    pub description: &'static str,
    pub command: &'static str,
}

/// One node of the command tree.
#[derive(Clone)]
pub struct CommandNode {
    pub name: &'static str,
    pub about: &'static str,
    pub long_about: Option<&'static str>,
    pub aliases: Vec<&'static str>,
    pub examples: Vec<Example>,
    pub args: ArgsSpec,
    pub flags: Vec<FlagSpec>,
    pub required: Vec<&'static str>,
    pub exclusive: Vec<Vec<&'static str>>,
    pub together: Vec<Vec<&'static str>>,
    pub executor: Option<Executor>,
    pub children: Vec<CommandNode>,
}

impl CommandNode {
    /// A group node. Running it prints its help.
    pub fn group(name: &'static str, about: &'static str) -> Self {
        Self {
            name,
            about,
            long_about: None,
            aliases: Vec::new(),
            examples: Vec::new(),
            args: ArgsSpec::NoArgs,
            flags: Vec::new(),
            required: Vec::new(),
            exclusive: Vec::new(),
            together: Vec::new(),
            executor: None,
            children: Vec::new(),
        }
    }

    /// A leaf node running `executor`.
    pub fn leaf(name: &'static str, about: &'static str, executor: Executor) -> Self {
        Self {
            executor: Some(executor),
            ..Self::group(name, about)
        }
    }

    pub fn long_about(mut self, long_about: &'static str) -> Self {
        self.long_about = Some(long_about);
        self
    }

    pub fn alias(mut self, alias: &'static str) -> Self {
        self.aliases.push(alias);
        self
    }

    pub fn example(mut self, description: &'static str, command: &'static str) -> Self {
        self.examples.push(Example {
            description,
            command,
        });
        self
    }

    pub fn args(mut self, args: ArgsSpec) -> Self {
        self.args = args;
        self
    }

    pub fn flag(mut self, flag: FlagSpec) -> Self {
        self.flags.push(flag);
        self
    }

    pub fn flags(mut self, flags: impl IntoIterator<Item = FlagSpec>) -> Self {
        self.flags.extend(flags);
        self
    }

    pub fn required(mut self, names: &[&'static str]) -> Self {
        self.required.extend_from_slice(names);
        self
    }

    pub fn mutually_exclusive(mut self, names: &[&'static str]) -> Self {
        self.exclusive.push(names.to_vec());
        self
    }

    pub fn required_together(mut self, names: &[&'static str]) -> Self {
        self.together.push(names.to_vec());
        self
    }

    pub fn child(mut self, child: CommandNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn find(&self, name: &str) -> Option<&CommandNode> {
        self.children.iter().find(|child| child.name == name)
    }

    pub fn is_leaf(&self) -> bool {
        self.executor.is_some()
    }

    /// Compile this node and its subtree into a clap command.
    pub fn to_clap(&self) -> Command {
        let mut cmd = Command::new(self.name).about(self.about);
        if let Some(long_about) = self.long_about {
            cmd = cmd.long_about(long_about);
        }
        for alias in &self.aliases {
            cmd = cmd.visible_alias(*alias);
        }
        if !self.examples.is_empty() {
            cmd = cmd.after_help(render_examples(&self.examples));
        }
        for flag in &self.flags {
            cmd = cmd.arg(flag.to_arg(self.required.contains(&flag.name)));
        }
        if self.is_leaf() {
            let positional = Arg::new(ARGS).num_args(1..).required(false);
            cmd = cmd.arg(match self.args {
                ArgsSpec::NoArgs => positional.hide(true),
                ArgsSpec::SingleArg { name, .. } => positional.value_name(name),
            });
        }
        for child in &self.children {
            cmd = cmd.subcommand(child.to_clap());
        }
        cmd
    }

    /// Check flag constraints, then positional arguments.
    pub fn validate(&self, flags: &Flags<'_>, command_path: &str) -> Result<(), CliError> {
        let missing: Vec<String> = self
            .required
            .iter()
            .filter(|name| !flags.is_set(name))
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(CliError::MissingRequiredFlags { flags: missing });
        }

        for group in &self.exclusive {
            let set: Vec<&&str> = group.iter().filter(|name| flags.is_set(name)).collect();
            if let [first, second, ..] = set.as_slice() {
                return Err(CliError::MutuallyExclusiveFlags {
                    first: first.to_string(),
                    second: second.to_string(),
                });
            }
        }

        for group in &self.together {
            let set = group.iter().filter(|name| flags.is_set(name)).count();
            if set > 0 && set < group.len() {
                return Err(CliError::RequiredTogether {
                    flags: group.iter().map(|name| name.to_string()).collect(),
                });
            }
        }

        self.args.validate(&flags.args(), command_path)
    }
}

fn render_examples(examples: &[Example]) -> String {
    let body = examples
        .iter()
        .map(|example| format!("  {}\n  $ {}", example.description, example.command))
        .collect::<Vec<_>>()
        .join("\n\n");
    color_print::cformat!("<bold><underline>Examples:</underline></bold>\n{}", body)
}
