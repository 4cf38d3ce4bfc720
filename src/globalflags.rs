//! Options shared by every command.

use serde::Serialize;

use crate::{
    commands::params::{
        PARAMETER_ASSUME_YES, PARAMETER_ASYNC, PARAMETER_OUTPUT_FORMAT, PARAMETER_PROJECT_ID,
        PARAMETER_REGION, PARAMETER_VERBOSITY,
    },
    configuration::Configuration,
    error::CliError,
    flags::Flags,
    format::OutputFormat,
    print::Verbosity,
};

/// Global options after applying flag, environment and configuration
/// precedence.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GlobalOptions {
    pub project_id: String,
    pub region: Option<String>,
    pub output_format: OutputFormat,
    pub verbosity: Verbosity,
    pub assume_yes: bool,
    #[serde(rename = "async")]
    pub is_async: bool,
}

impl GlobalOptions {
    pub fn parse(flags: &Flags<'_>, configuration: &Configuration) -> Result<Self, CliError> {
        let project_id = flags
            .optional_string(PARAMETER_PROJECT_ID)
            .or_else(|| configuration.project_id.clone())
            .map(|id| id.trim().to_string())
            .unwrap_or_default();

        let region = flags
            .optional_string(PARAMETER_REGION)
            .or_else(|| configuration.region.clone())
            .filter(|region| !region.trim().is_empty());

        let output_format = match flags.optional_string(PARAMETER_OUTPUT_FORMAT) {
            Some(raw) => raw.parse::<OutputFormat>().map_err(|_| {
                CliError::invalid_flag(
                    PARAMETER_OUTPUT_FORMAT,
                    raw.as_str(),
                    format!("must be one of {}", OutputFormat::names().join(", ")),
                )
            })?,
            None => configuration.output_format.unwrap_or_default(),
        };

        let verbosity = match flags.optional_string(PARAMETER_VERBOSITY) {
            Some(raw) => raw
                .parse::<Verbosity>()
                .map_err(|reason| CliError::invalid_flag(PARAMETER_VERBOSITY, raw.as_str(), reason))?,
            None => configuration.verbosity.unwrap_or_default(),
        };

        Ok(Self {
            project_id,
            region,
            output_format,
            verbosity,
            assume_yes: flags.bool(PARAMETER_ASSUME_YES)?,
            is_async: flags.bool(PARAMETER_ASYNC)?,
        })
    }

    /// Fails with `MissingProjectId` when no project is selected.
    pub fn require_project_id(&self) -> Result<(), CliError> {
        if self.project_id.is_empty() {
            Err(CliError::MissingProjectId)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{node::CommandNode, params::global_flags};
    use crate::flags::Flags;
    use futures::FutureExt;

    fn noop<'a>(
        _ctx: &'a mut crate::context::ExecutionContext,
        _flags: Flags<'a>,
    ) -> futures::future::LocalBoxFuture<'a, Result<(), CliError>> {
        async { Ok(()) }.boxed_local()
    }

    fn parse(args: &[&str], configuration: &Configuration) -> Result<GlobalOptions, CliError> {
        let cmd = CommandNode::leaf("leaf", "Leaf", noop)
            .flags(global_flags())
            .to_clap();
        let argv = std::iter::once("leaf").chain(args.iter().copied());
        let matches = cmd.try_get_matches_from(argv).unwrap();
        GlobalOptions::parse(&Flags::new(&matches), configuration)
    }

    #[test]
    fn flags_take_precedence_over_configuration() {
        let configuration = Configuration {
            project_id: Some("from-config".into()),
            output_format: Some(OutputFormat::Yaml),
            ..Default::default()
        };
        let options = parse(
            &["--project-id", "from-flag", "--output-format", "json", "-y", "--async"],
            &configuration,
        )
        .unwrap();
        assert_eq!(options.project_id, "from-flag");
        assert_eq!(options.output_format, OutputFormat::Json);
        assert!(options.assume_yes);
        assert!(options.is_async);
    }

    #[test]
    fn invalid_output_format_names_the_flag() {
        let err = parse(&["--output-format", "xml"], &Configuration::default()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "the provided flag --output-format with value \"xml\" is invalid: must be one of none, json, yaml, pretty"
        );
    }

    #[test]
    fn invalid_verbosity_names_the_flag() {
        let err = parse(&["--verbosity", "loud"], &Configuration::default()).unwrap_err();
        assert!(matches!(err, CliError::InvalidFlag { flag, .. } if flag == "verbosity"));
    }

    #[test]
    fn missing_project_id_is_reported() {
        let options = GlobalOptions::default();
        assert!(matches!(
            options.require_project_id(),
            Err(CliError::MissingProjectId)
        ));
    }

    #[test]
    fn serializes_async_under_its_flag_name() {
        let options = GlobalOptions {
            project_id: "p".into(),
            is_async: true,
            ..Default::default()
        };
        let value = serde_json::to_value(&options).unwrap();
        assert_eq!(value["async"], true);
        assert_eq!(value["project_id"], "p");
    }
}
