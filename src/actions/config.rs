//! `nimbus config` executors.

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use super::single_arg;
use crate::{
    commands::params::{
        PARAMETER_OUTPUT_FORMAT, PARAMETER_PROJECT_ID, PARAMETER_REGION, PARAMETER_VERBOSITY,
    },
    configuration::Configuration,
    context::ExecutionContext,
    error::CliError,
    flags::Flags,
    format::OutputFormat,
    print::Verbosity,
    sdk::Service,
    tables::Table,
};

pub async fn list(ctx: &mut ExecutionContext, _flags: Flags<'_>) -> Result<(), CliError> {
    let entries = ctx.configuration.entries();
    let format = ctx.printer.output_format();
    if entries.is_empty() && !format.is_structured() {
        return ctx.printer.outputln("No configuration values are set");
    }

    let values: Map<String, Value> = entries
        .iter()
        .map(|(key, value)| (key.to_string(), Value::String(value.clone())))
        .collect();
    ctx.printer.output_result(format, &values, |p| {
        let mut table = Table::new();
        table.set_header(["KEY", "VALUE"]);
        for (key, value) in &entries {
            table.add_row([key.to_string(), value.clone()]);
        }
        table.display(p)
    })
}

/// Settings given to `config set`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SetInput {
    pub project_id: Option<String>,
    pub region: Option<String>,
    pub output_format: Option<OutputFormat>,
    pub verbosity: Option<Verbosity>,
    pub endpoints: Vec<(String, String)>,
}

impl SetInput {
    fn is_empty(&self) -> bool {
        self == &SetInput::default()
    }

    fn apply(&self, configuration: &mut Configuration) {
        if let Some(project_id) = &self.project_id {
            configuration.project_id = Some(project_id.clone());
        }
        if let Some(region) = &self.region {
            configuration.region = Some(region.clone());
        }
        if let Some(output_format) = self.output_format {
            configuration.output_format = Some(output_format);
        }
        if let Some(verbosity) = self.verbosity {
            configuration.verbosity = Some(verbosity);
        }
        for service in Service::ALL {
            if let Some((_, endpoint)) = self
                .endpoints
                .iter()
                .find(|(key, _)| key == service.endpoint_key())
            {
                configuration.set_endpoint(service, Some(endpoint.clone()));
            }
        }
    }
}

/// Only values typed on the command line are persisted. Environment
/// variables and stored defaults are left alone.
pub fn parse_set_input(ctx: &mut ExecutionContext, flags: &Flags<'_>) -> Result<SetInput, CliError> {
    let given = |name: &str| flags.is_set_on_command_line(name);
    let model = SetInput {
        project_id: given(PARAMETER_PROJECT_ID).then(|| ctx.globals.project_id.clone()),
        region: given(PARAMETER_REGION)
            .then(|| ctx.globals.region.clone())
            .flatten(),
        output_format: given(PARAMETER_OUTPUT_FORMAT).then_some(ctx.globals.output_format),
        verbosity: given(PARAMETER_VERBOSITY).then_some(ctx.globals.verbosity),
        endpoints: Service::ALL
            .iter()
            .filter(|service| given(service.endpoint_key()))
            .map(|service| {
                (
                    service.endpoint_key().to_string(),
                    flags.string(service.endpoint_key()),
                )
            })
            .collect(),
    };
    if model.is_empty() {
        return Err(CliError::EmptyUpdate);
    }
    ctx.printer.debug_input_model(&model);
    Ok(model)
}

pub async fn set(ctx: &mut ExecutionContext, flags: Flags<'_>) -> Result<(), CliError> {
    let model = parse_set_input(ctx, &flags)?;
    let path = ctx.configuration_path()?;

    let mut configuration = Configuration::load_from_file(&path)?;
    model.apply(&mut configuration);
    configuration.save(&path)?;
    debug!("Saved configuration to {}", path.display());

    ctx.configuration = configuration;
    Ok(())
}

pub async fn unset(ctx: &mut ExecutionContext, flags: Flags<'_>) -> Result<(), CliError> {
    let key = single_arg(&flags);
    let path = ctx.configuration_path()?;

    let mut configuration = Configuration::load_from_file(&path)?;
    configuration.unset(&key)?;
    configuration.save(&path)?;
    debug!("Removed {} from {}", key, path.display());

    ctx.configuration = configuration;
    Ok(())
}
