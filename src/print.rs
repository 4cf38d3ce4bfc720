//! The printer owns the standard streams for one invocation.
//!
//! Primary command output goes to stdout through [`Printer::outputln`],
//! [`Printer::outputf`] and [`Printer::output_result`]. Diagnostics go to stderr
//! and are gated by the selected [`Verbosity`]. Confirmation prompts read from
//! stdin, which makes every interactive path testable with scripted input.

use std::fmt::Display;
use std::io::{self, BufRead, BufReader, Write};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{EnumIter, IntoEnumIterator};

use crate::{
    error::CliError,
    format::{self, OutputFormat},
    spinner::Spinner,
};

/// Number of answers accepted before the confirmation prompt gives up.
pub const CONFIRMATION_ATTEMPTS: usize = 3;

/// Verbosity levels, from the most to the least talkative.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, EnumIter, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl Verbosity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verbosity::Debug => "debug",
            Verbosity::Info => "info",
            Verbosity::Warn => "warn",
            Verbosity::Error => "error",
        }
    }

    pub fn names() -> Vec<&'static str> {
        Verbosity::iter().map(|level| level.as_str()).collect()
    }
}

impl Display for Verbosity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verbosity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        Verbosity::iter()
            .find(|level| level.as_str() == normalized)
            .ok_or_else(|| format!("must be one of {}", Verbosity::names().join(", ")))
    }
}

/// Unified sink for all user-facing output.
pub struct Printer {
    stdout: Box<dyn Write>,
    stderr: Box<dyn Write>,
    stdin: Box<dyn BufRead>,
    verbosity: Verbosity,
    output_format: OutputFormat,
    draw_spinners: bool,
}

impl Printer {
    /// Printer over arbitrary streams. Spinners are never drawn.
    pub fn new(stdout: Box<dyn Write>, stderr: Box<dyn Write>, stdin: Box<dyn BufRead>) -> Self {
        Self {
            stdout,
            stderr,
            stdin,
            verbosity: Verbosity::default(),
            output_format: OutputFormat::default(),
            draw_spinners: false,
        }
    }

    /// Printer over the process streams.
    pub fn stdio() -> Self {
        let mut printer = Self::new(
            Box::new(io::stdout()),
            Box::new(io::stderr()),
            Box::new(BufReader::new(io::stdin())),
        );
        printer.draw_spinners = true;
        printer
    }

    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    pub fn set_verbosity(&mut self, verbosity: Verbosity) {
        self.verbosity = verbosity;
    }

    pub fn output_format(&self) -> OutputFormat {
        self.output_format
    }

    pub fn set_output_format(&mut self, output_format: OutputFormat) {
        self.output_format = output_format;
    }

    pub fn is_debug(&self) -> bool {
        self.verbosity == Verbosity::Debug
    }

    fn enabled(&self, level: Verbosity) -> bool {
        level >= self.verbosity
    }

    /// Write primary output without a trailing newline.
    pub fn outputf(&mut self, text: impl Display) -> Result<(), CliError> {
        write!(self.stdout, "{text}")?;
        Ok(())
    }

    /// Write one line of primary output.
    pub fn outputln(&mut self, text: impl Display) -> Result<(), CliError> {
        writeln!(self.stdout, "{text}")?;
        Ok(())
    }

    pub fn debug(&mut self, message: impl Display) {
        self.log(Verbosity::Debug, "debug: ", message);
    }

    pub fn info(&mut self, message: impl Display) {
        self.log(Verbosity::Info, "", message);
    }

    pub fn warn(&mut self, message: impl Display) {
        self.log(Verbosity::Warn, "warning: ", message);
    }

    pub fn error(&mut self, message: impl Display) {
        self.log(Verbosity::Error, "error: ", message);
    }

    // Diagnostics are best effort: a closed stderr must not fail the command.
    fn log(&mut self, level: Verbosity, prefix: &str, message: impl Display) {
        if self.enabled(level) {
            let _ = writeln!(self.stderr, "{prefix}{message}");
        }
    }

    /// Ask the user to confirm an operation.
    ///
    /// Accepts `y` or `yes` (trimmed, any case). `n`, `no`, an empty line or
    /// the end of input abort. Any other answer is asked again, up to
    /// [`CONFIRMATION_ATTEMPTS`] times in total.
    pub fn prompt_for_confirmation(&mut self, prompt: &str) -> Result<(), CliError> {
        for _ in 0..CONFIRMATION_ATTEMPTS {
            write!(self.stdout, "{prompt} [y/N] ")?;
            self.stdout.flush()?;

            let mut answer = String::new();
            if self.stdin.read_line(&mut answer)? == 0 {
                return Err(CliError::Aborted);
            }
            match answer.trim().to_lowercase().as_str() {
                "y" | "yes" => return Ok(()),
                "" | "n" | "no" => return Err(CliError::Aborted),
                other => self.debug(format!("unrecognized confirmation answer {other:?}")),
            }
        }
        Err(CliError::ConfirmationFailed {
            attempts: CONFIRMATION_ATTEMPTS,
        })
    }

    /// Render `value` in the structured format, or hand over to `human`.
    pub fn output_result<T, F>(
        &mut self,
        output_format: OutputFormat,
        value: &T,
        human: F,
    ) -> Result<(), CliError>
    where
        T: Serialize + ?Sized,
        F: FnOnce(&mut Printer) -> Result<(), CliError>,
    {
        match output_format {
            OutputFormat::Json => {
                let rendered = format::to_json(value)?;
                self.outputf(rendered)
            }
            OutputFormat::Yaml => {
                let rendered = format::to_yaml(value)?;
                self.outputf(rendered)
            }
            OutputFormat::None | OutputFormat::Pretty => human(self),
        }
    }

    /// Log a parsed input model at debug verbosity.
    pub fn debug_input_model<T: Serialize>(&mut self, model: &T) {
        if !self.is_debug() {
            return;
        }
        match serde_json::to_value(model) {
            Ok(value) => {
                let rendered = debug_string(&value);
                self.debug(format!("parsed input values: {rendered}"));
            }
            Err(e) => self.debug(format!("convert model to string for debugging: {e}")),
        }
    }

    /// Start a spinner on stderr. It is only drawn when stderr is a terminal.
    pub fn spinner(&self, message: &str) -> Spinner {
        Spinner::start(message, self.draw_spinners)
    }

    pub fn flush(&mut self) -> Result<(), CliError> {
        self.stdout.flush()?;
        self.stderr.flush()?;
        Ok(())
    }
}

/// Render a JSON value as `[key: value, ...]` with sorted keys and empty
/// values removed.
pub fn debug_string(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let entries: Vec<String> = keys
                .into_iter()
                .filter_map(|key| {
                    let value = &map[key.as_str()];
                    (!is_empty(value)).then(|| format!("{key}: {}", debug_string(value)))
                })
                .collect();
            format!("[{}]", entries.join(", "))
        }
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(debug_string).collect();
            format!("[{}]", items.join(", "))
        }
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}


#[cfg(test)]
mod tests {
    use super::testing::printer;
    use super::*;
    use serde_json::json;

    fn confirm(input: &str) -> Result<(), CliError> {
        let (mut p, _, _) = printer(input);
        p.prompt_for_confirmation("Are you sure?")
    }

    #[test]
    fn confirmation_accepts_yes_in_any_case_and_spacing() {
        for input in ["y\n", "  Y  \r\n", "\tyes\n", "YES\n"] {
            assert!(confirm(input).is_ok(), "input {input:?}");
        }
    }

    #[test]
    fn confirmation_retries_until_a_valid_answer() {
        for input in ["yrs\nyes\n", "foo\nbar  \n\ty\n", "foo\r\nbar  \nY\t\n"] {
            assert!(confirm(input).is_ok(), "input {input:?}");
        }
        for input in ["ni\n no\t\n", "foo\nbar\nn\n", "m\n  \n", "m\r\n\t\r\n"] {
            assert!(matches!(confirm(input), Err(CliError::Aborted)), "input {input:?}");
        }
    }

    #[test]
    fn confirmation_declines_on_no_empty_or_end_of_input() {
        for input in ["n\n", "  N\t\r\n", "no\n", "  \n", "  \r\n", ""] {
            assert!(matches!(confirm(input), Err(CliError::Aborted)), "input {input:?}");
        }
    }

    #[test]
    fn confirmation_gives_up_after_three_invalid_answers() {
        for input in ["foo\nbar\nbaz\n", "foo\nbar\nbaz\ny\n"] {
            assert!(matches!(
                confirm(input),
                Err(CliError::ConfirmationFailed { attempts: 3 })
            ));
        }
    }

    #[test]
    fn prompt_is_written_to_stdout() {
        let (mut p, stdout, stderr) = printer("y\n");
        p.prompt_for_confirmation("Delete zone \"z\"?").unwrap();
        assert_eq!(stdout.contents(), "Delete zone \"z\"? [y/N] ");
        assert_eq!(stderr.contents(), "");
    }

    #[test]
    fn diagnostics_are_gated_by_verbosity() {
        let (mut p, stdout, stderr) = printer("");
        p.set_verbosity(Verbosity::Warn);
        p.debug("d");
        p.info("i");
        p.warn("w");
        p.error("e");
        assert_eq!(stderr.contents(), "warning: w\nerror: e\n");
        assert_eq!(stdout.contents(), "");

        let (mut p, _, stderr) = printer("");
        p.set_verbosity(Verbosity::Debug);
        p.debug("d");
        p.info("i");
        assert_eq!(stderr.contents(), "debug: d\ni\n");

        let (mut p, _, stderr) = printer("");
        p.set_verbosity(Verbosity::Error);
        p.warn("w");
        p.error("e");
        assert_eq!(stderr.contents(), "error: e\n");
    }

    #[test]
    fn output_result_dispatches_on_format() {
        let value = json!([{"id": "a"}]);

        let (mut p, stdout, _) = printer("");
        p.output_result(OutputFormat::Json, &value, |_| panic!("human output"))
            .unwrap();
        assert_eq!(stdout.contents(), "[\n  {\n    \"id\": \"a\"\n  }\n]\n");

        let (mut p, stdout, _) = printer("");
        p.output_result(OutputFormat::Yaml, &value, |_| panic!("human output"))
            .unwrap();
        assert_eq!(stdout.contents(), "- id: a\n");

        for human_format in [OutputFormat::None, OutputFormat::Pretty] {
            let (mut p, stdout, _) = printer("");
            p.output_result(human_format, &value, |p| p.outputln("one line"))
                .unwrap();
            assert_eq!(stdout.contents(), "one line\n");
        }
    }

    #[test]
    fn debug_string_sorts_keys_and_drops_empties() {
        let value = json!({
            "zone": "z1",
            "acl": ["1.2.3.0/24", "5.6.7.0/24"],
            "description": "",
            "labels": {"b": "2", "a": "1"},
            "ttl": 60,
            "primary": null,
            "items": [{"id": "x"}],
            "empty": [],
        });
        assert_eq!(
            debug_string(&value),
            "[acl: [1.2.3.0/24, 5.6.7.0/24], items: [[id: x]], labels: [a: 1, b: 2], ttl: 60, zone: z1]"
        );
    }

    #[test]
    fn input_model_is_only_logged_at_debug() {
        let model = json!({"project_id": "p", "name": "w1"});

        let (mut p, _, stderr) = printer("");
        p.debug_input_model(&model);
        assert_eq!(stderr.contents(), "");

        let (mut p, _, stderr) = printer("");
        p.set_verbosity(Verbosity::Debug);
        p.debug_input_model(&model);
        assert_eq!(
            stderr.contents(),
            "debug: parsed input values: [name: w1, project_id: p]\n"
        );
    }

    #[test]
    fn verbosity_parses_known_levels() {
        assert_eq!("DEBUG".parse::<Verbosity>().unwrap(), Verbosity::Debug);
        assert!("loud".parse::<Verbosity>().is_err());
        assert!(Verbosity::Debug < Verbosity::Error);
    }
}
