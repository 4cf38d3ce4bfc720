//! `nimbus redis` executors.

use serde::Serialize;

use super::single_arg;
use crate::{
    commands::params::{
        PARAMETER_ACL, PARAMETER_ENABLE_MONITORING, PARAMETER_GRAPHITE, PARAMETER_LIMIT,
        PARAMETER_METRICS_FREQUENCY, PARAMETER_METRICS_PREFIX, PARAMETER_MONITORING_INSTANCE_ID,
        PARAMETER_NAME, PARAMETER_PLAN_ID, PARAMETER_PLAN_NAME, PARAMETER_SYSLOG,
        PARAMETER_VERSION,
    },
    context::ExecutionContext,
    error::CliError,
    executor::{confirm, label_or_id, operation_state, truncate, wait_unless_async},
    flags::{Cidr, Flags},
    globalflags::GlobalOptions,
    sdk::{
        redis::{
            deleted_state, instance_state, CreateInstancePayload, CreateInstanceRequest,
            InstanceParameters, Offering, PartialUpdateInstancePayload,
            PartialUpdateInstanceRequest, RedisApi, OPERATION_CREATE, OPERATION_UPDATE,
        },
        ApiError,
    },
    tables::Table,
};

const SERVICE: &str = "redis";

/// Plan selection and instance parameters shared by create and update.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InstanceSettings {
    pub plan_id: Option<String>,
    pub plan_name: Option<String>,
    pub version: Option<String>,
    pub enable_monitoring: Option<bool>,
    pub graphite: Option<String>,
    pub metrics_frequency: Option<i64>,
    pub metrics_prefix: Option<String>,
    pub monitoring_instance_id: Option<String>,
    pub acl: Option<Vec<Cidr>>,
    pub syslog: Option<Vec<String>>,
}

impl InstanceSettings {
    fn parse(flags: &Flags<'_>) -> Result<Self, CliError> {
        Ok(Self {
            plan_id: flags.uuid(PARAMETER_PLAN_ID)?.map(|id| id.to_string()),
            plan_name: flags.optional_string(PARAMETER_PLAN_NAME),
            version: flags.optional_string(PARAMETER_VERSION),
            enable_monitoring: flags.optional_bool(PARAMETER_ENABLE_MONITORING)?,
            graphite: flags.optional_string(PARAMETER_GRAPHITE),
            metrics_frequency: flags.optional(PARAMETER_METRICS_FREQUENCY)?,
            metrics_prefix: flags.optional_string(PARAMETER_METRICS_PREFIX),
            monitoring_instance_id: flags
                .uuid(PARAMETER_MONITORING_INSTANCE_ID)?
                .map(|id| id.to_string()),
            acl: flags.cidr_slice(PARAMETER_ACL)?,
            syslog: flags.optional_slice(PARAMETER_SYSLOG)?,
        })
    }

    fn parameters(&self) -> InstanceParameters {
        InstanceParameters {
            enable_monitoring: self.enable_monitoring,
            graphite: self.graphite.clone(),
            metrics_frequency: self.metrics_frequency,
            metrics_prefix: self.metrics_prefix.clone(),
            monitoring_instance_id: self.monitoring_instance_id.clone(),
            sgw_acl: self.acl.as_ref().map(|blocks| {
                blocks
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(",")
            }),
            syslog: self.syslog.clone(),
        }
    }

    fn is_empty(&self) -> bool {
        self == &InstanceSettings::default()
    }

    /// Plan name and version, when both were given.
    fn plan_by_name(&self) -> Option<(&str, &str)> {
        match (&self.plan_name, &self.version) {
            (Some(name), Some(version)) => Some((name.as_str(), version.as_str())),
            _ => None,
        }
    }
}

fn bullet_list<'a>(items: impl IntoIterator<Item = &'a str>) -> String {
    let mut seen: Vec<&str> = Vec::new();
    for item in items {
        if !seen.contains(&item) {
            seen.push(item);
        }
    }
    seen.iter().map(|item| format!("\n- {item}")).collect()
}

/// Resolve a plan name and version to a plan ID.
pub fn load_plan_id(name: &str, version: &str, offerings: &[Offering]) -> Result<String, CliError> {
    let matching: Vec<&Offering> = offerings
        .iter()
        .filter(|offering| offering.version == version)
        .collect();
    if matching.is_empty() {
        return Err(CliError::InvalidPlanSelection {
            service: SERVICE.to_string(),
            details: format!(
                "You provided version \"{version}\", which is invalid. Available versions are:{}",
                bullet_list(offerings.iter().map(|offering| offering.version.as_str()))
            ),
        });
    }

    let plans = matching.iter().flat_map(|offering| offering.plans.iter());
    if let Some(plan) = plans
        .clone()
        .find(|plan| plan.name.eq_ignore_ascii_case(name))
    {
        return Ok(plan.id.clone());
    }
    Err(CliError::InvalidPlanSelection {
        service: SERVICE.to_string(),
        details: format!(
            "You provided plan name \"{name}\" for version {version}, which is invalid. \
             Available plan names for that version are:{}",
            bullet_list(plans.map(|plan| plan.name.as_str()))
        ),
    })
}

/// Check that a plan ID exists in one of the offerings.
pub fn validate_plan_id(plan_id: &str, offerings: &[Offering]) -> Result<(), CliError> {
    let plans = offerings.iter().flat_map(|offering| offering.plans.iter());
    if plans.clone().any(|plan| plan.id.eq_ignore_ascii_case(plan_id)) {
        return Ok(());
    }
    Err(CliError::InvalidPlanSelection {
        service: SERVICE.to_string(),
        details: format!(
            "You provided plan ID \"{plan_id}\", which is invalid. Available plan IDs are:{}",
            bullet_list(plans.map(|plan| plan.id.as_str()))
        ),
    })
}

async fn list_offerings(
    ctx: &ExecutionContext,
    api: &dyn RedisApi,
    project_id: &str,
) -> Result<Vec<Offering>, CliError> {
    let response = ctx
        .call("get Redis offerings", api.list_offerings(project_id))
        .await?;
    Ok(response.offerings)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListInput {
    #[serde(flatten)]
    pub globals: GlobalOptions,
    pub limit: Option<i64>,
}

pub fn parse_list_input(ctx: &mut ExecutionContext, flags: &Flags<'_>) -> Result<ListInput, CliError> {
    let globals = ctx.globals.clone();
    globals.require_project_id()?;
    let model = ListInput {
        globals,
        limit: flags.positive(PARAMETER_LIMIT)?,
    };
    ctx.printer.debug_input_model(&model);
    Ok(model)
}

pub async fn plans(ctx: &mut ExecutionContext, flags: Flags<'_>) -> Result<(), CliError> {
    let model = parse_list_input(ctx, &flags)?;
    let client = ctx.clients.redis()?;
    let mut offerings = list_offerings(ctx, client.as_ref(), &model.globals.project_id).await?;
    truncate(&mut offerings, model.limit);

    let format = ctx.printer.output_format();
    if offerings.is_empty() && !format.is_structured() {
        return ctx.printer.outputln(format!(
            "No plans found for project \"{}\"",
            model.globals.project_id
        ));
    }
    ctx.printer.output_result(format, &offerings, |p| {
        let mut table = Table::new();
        table.set_header(["OFFERING", "VERSION", "ID", "NAME", "DESCRIPTION"]);
        for (i, offering) in offerings.iter().enumerate() {
            for plan in &offering.plans {
                table.add_row([
                    offering.name.clone(),
                    offering.version.clone(),
                    plan.id.clone(),
                    plan.name.clone(),
                    plan.description.clone(),
                ]);
            }
            if i + 1 < offerings.len() {
                table.add_separator();
            }
        }
        table.enable_auto_merge_on_columns(&[0, 1]);
        table.display(p)
    })
}

pub async fn list(ctx: &mut ExecutionContext, flags: Flags<'_>) -> Result<(), CliError> {
    let model = parse_list_input(ctx, &flags)?;
    let client = ctx.clients.redis()?;
    let response = ctx
        .call(
            "get Redis instances",
            client.list_instances(&model.globals.project_id),
        )
        .await?;
    let mut instances = response.instances;
    truncate(&mut instances, model.limit);

    let format = ctx.printer.output_format();
    if instances.is_empty() && !format.is_structured() {
        return ctx.printer.outputln(format!(
            "No instances found for project \"{}\"",
            model.globals.project_id
        ));
    }
    ctx.printer.output_result(format, &instances, |p| {
        let mut table = Table::new();
        table.set_header(["ID", "NAME", "LAST OPERATION TYPE", "LAST OPERATION STATE"]);
        for instance in &instances {
            let (operation_type, state) = instance
                .last_operation
                .as_ref()
                .map(|last| (last.operation_type.clone(), last.state.clone()))
                .unwrap_or_default();
            table.add_row([instance.id.clone(), instance.name.clone(), operation_type, state]);
        }
        table.display(p)
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateInput {
    #[serde(flatten)]
    pub globals: GlobalOptions,
    pub instance_name: String,
    #[serde(flatten)]
    pub settings: InstanceSettings,
}

pub fn parse_create_input(
    ctx: &mut ExecutionContext,
    flags: &Flags<'_>,
) -> Result<CreateInput, CliError> {
    let globals = ctx.globals.clone();
    globals.require_project_id()?;

    let settings = InstanceSettings::parse(flags)?;
    if settings.plan_id.is_none() && settings.plan_by_name().is_none() {
        return Err(CliError::InvalidPlanInput {
            service: SERVICE.to_string(),
        });
    }

    let model = CreateInput {
        globals,
        instance_name: flags.string(PARAMETER_NAME),
        settings,
    };
    ctx.printer.debug_input_model(&model);
    Ok(model)
}

/// Build the create request. A plan given by name and version is resolved
/// against the offerings.
pub async fn build_create_request(
    ctx: &ExecutionContext,
    api: &dyn RedisApi,
    model: &CreateInput,
) -> Result<CreateInstanceRequest, CliError> {
    let plan_id = match (&model.settings.plan_id, model.settings.plan_by_name()) {
        (Some(plan_id), _) => plan_id.clone(),
        (None, Some((name, version))) => {
            let offerings = list_offerings(ctx, api, &model.globals.project_id).await?;
            load_plan_id(name, version, &offerings)?
        }
        (None, None) => {
            return Err(CliError::InvalidPlanInput {
                service: SERVICE.to_string(),
            })
        }
    };

    Ok(CreateInstanceRequest {
        project_id: model.globals.project_id.clone(),
        payload: CreateInstancePayload {
            instance_name: model.instance_name.clone(),
            plan_id,
            parameters: model.settings.parameters(),
        },
    })
}

pub async fn create(ctx: &mut ExecutionContext, flags: Flags<'_>) -> Result<(), CliError> {
    let model = parse_create_input(ctx, &flags)?;
    let client = ctx.clients.redis()?;
    let api = client.as_ref();
    let project_label = model.globals.project_id.clone();

    let request = build_create_request(ctx, api, &model).await?;
    confirm(
        ctx,
        &format!(
            "Are you sure you want to create a Redis instance for project \"{project_label}\"?"
        ),
    )?;

    let response = ctx
        .call("create Redis instance", api.create_instance(&request))
        .await?;

    let view: &ExecutionContext = ctx;
    let project_id = model.globals.project_id.as_str();
    let instance_id = response.instance_id.as_str();
    wait_unless_async(
        view,
        "wait for Redis instance creation",
        "Creating instance",
        move || view.call("get Redis instance", api.get_instance(project_id, instance_id)),
        instance_state(OPERATION_CREATE),
    )
    .await?;

    let state = operation_state(ctx, "Created", "Triggered creation of");
    let format = ctx.printer.output_format();
    ctx.printer.output_result(format, &response, |p| {
        p.outputln(format!(
            "{state} instance for project \"{project_label}\". Instance ID: {}",
            response.instance_id
        ))
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateInput {
    #[serde(flatten)]
    pub globals: GlobalOptions,
    pub instance_id: String,
    #[serde(flatten)]
    pub settings: InstanceSettings,
}

pub fn parse_update_input(
    ctx: &mut ExecutionContext,
    flags: &Flags<'_>,
) -> Result<UpdateInput, CliError> {
    let globals = ctx.globals.clone();
    globals.require_project_id()?;

    let settings = InstanceSettings::parse(flags)?;
    if settings.is_empty() {
        return Err(CliError::EmptyUpdate);
    }

    let model = UpdateInput {
        globals,
        instance_id: single_arg(flags),
        settings,
    };
    ctx.printer.debug_input_model(&model);
    Ok(model)
}

/// Build the update request. The plan is optional; a given one is checked
/// against the offerings.
pub async fn build_update_request(
    ctx: &ExecutionContext,
    api: &dyn RedisApi,
    model: &UpdateInput,
) -> Result<PartialUpdateInstanceRequest, CliError> {
    let plan_id = match (&model.settings.plan_id, model.settings.plan_by_name()) {
        (Some(plan_id), _) => {
            let offerings = list_offerings(ctx, api, &model.globals.project_id).await?;
            validate_plan_id(plan_id, &offerings)?;
            Some(plan_id.clone())
        }
        (None, Some((name, version))) => {
            let offerings = list_offerings(ctx, api, &model.globals.project_id).await?;
            Some(load_plan_id(name, version, &offerings)?)
        }
        (None, None) => None,
    };

    Ok(PartialUpdateInstanceRequest {
        project_id: model.globals.project_id.clone(),
        instance_id: model.instance_id.clone(),
        payload: PartialUpdateInstancePayload {
            plan_id,
            parameters: model.settings.parameters(),
        },
    })
}

async fn lookup_instance_name(
    ctx: &mut ExecutionContext,
    api: &dyn RedisApi,
    project_id: &str,
    instance_id: &str,
) -> String {
    label_or_id(ctx, "get instance name", instance_id, async {
        api.get_instance(project_id, instance_id)
            .await
            .map(|instance| instance.name)
    })
    .await
}

pub async fn update(ctx: &mut ExecutionContext, flags: Flags<'_>) -> Result<(), CliError> {
    let model = parse_update_input(ctx, &flags)?;
    let client = ctx.clients.redis()?;
    let api = client.as_ref();
    let project_id = model.globals.project_id.as_str();
    let instance_id = model.instance_id.as_str();

    let instance_label = lookup_instance_name(ctx, api, project_id, instance_id).await;
    let request = build_update_request(ctx, api, &model).await?;
    confirm(
        ctx,
        &format!("Are you sure you want to update instance \"{instance_label}\"?"),
    )?;

    ctx.call("update Redis instance", api.partial_update_instance(&request))
        .await?;

    let view: &ExecutionContext = ctx;
    wait_unless_async(
        view,
        "wait for Redis instance update",
        "Updating instance",
        move || view.call("get Redis instance", api.get_instance(project_id, instance_id)),
        instance_state(OPERATION_UPDATE),
    )
    .await?;

    let state = operation_state(ctx, "Updated", "Triggered update of");
    ctx.printer
        .info(format!("{state} instance \"{instance_label}\""));
    Ok(())
}

pub async fn delete(ctx: &mut ExecutionContext, flags: Flags<'_>) -> Result<(), CliError> {
    let globals = ctx.globals.clone();
    globals.require_project_id()?;
    let instance_id = single_arg(&flags);
    ctx.printer.debug_input_model(&globals);

    let client = ctx.clients.redis()?;
    let api = client.as_ref();
    let project_id = globals.project_id.as_str();
    let instance_id = instance_id.as_str();

    let instance_label = lookup_instance_name(ctx, api, project_id, instance_id).await;
    confirm(
        ctx,
        &format!(
            "Are you sure you want to delete instance \"{instance_label}\"? (This cannot be undone)"
        ),
    )?;

    ctx.call("delete Redis instance", api.delete_instance(project_id, instance_id))
        .await?;

    let view: &ExecutionContext = ctx;
    wait_unless_async(
        view,
        "wait for Redis instance deletion",
        "Deleting instance",
        move || async move {
            match api.get_instance(project_id, instance_id).await {
                Ok(instance) => Ok(Some(instance)),
                Err(ApiError::NotFound) => Ok(None),
                Err(e) => Err(CliError::upstream("get Redis instance")(e)),
            }
        },
        deleted_state,
    )
    .await?;

    let state = operation_state(ctx, "Deleted", "Triggered deletion of");
    ctx.printer
        .info(format!("{state} instance \"{instance_label}\""));
    Ok(())
}
