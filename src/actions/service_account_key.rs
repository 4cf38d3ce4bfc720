//! `nimbus service-account key` executors.

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

use super::single_arg;
use crate::{
    commands::params::{PARAMETER_EMAIL, PARAMETER_EXPIRES_IN_DAYS, PARAMETER_LIMIT, PARAMETER_PUBLIC_KEY},
    context::ExecutionContext,
    error::CliError,
    executor::{confirm, truncate},
    flags::Flags,
    format,
    globalflags::GlobalOptions,
    sdk::service_account::{CreateKeyPayload, CreateKeyRequest, ServiceAccountKey},
    tables::Table,
};

const PUBLIC_KEY_PREVIEW: usize = 50;

fn email(flags: &Flags<'_>) -> Result<String, CliError> {
    let email = flags.string(PARAMETER_EMAIL);
    if email.trim().is_empty() {
        return Err(CliError::invalid_flag(PARAMETER_EMAIL, email, "can't be empty"));
    }
    Ok(email)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateInput {
    #[serde(flatten)]
    pub globals: GlobalOptions,
    pub service_account_email: String,
    pub expires_in_days: Option<i64>,
    pub public_key: Option<String>,
}

pub fn parse_create_input(
    ctx: &mut ExecutionContext,
    flags: &Flags<'_>,
) -> Result<CreateInput, CliError> {
    let globals = ctx.globals.clone();
    globals.require_project_id()?;
    let model = CreateInput {
        globals,
        service_account_email: email(flags)?,
        expires_in_days: flags.positive(PARAMETER_EXPIRES_IN_DAYS)?,
        public_key: flags.file_string(PARAMETER_PUBLIC_KEY)?,
    };
    ctx.printer.debug_input_model(&model);
    Ok(model)
}

/// Expiry `days` from now, or an error when the date is out of range.
fn expiry(ctx: &ExecutionContext, days: i64) -> Result<DateTime<Utc>, CliError> {
    TimeDelta::try_days(days)
        .and_then(|validity| ctx.now().checked_add_signed(validity))
        .ok_or_else(|| {
            CliError::invalid_flag(PARAMETER_EXPIRES_IN_DAYS, days.to_string(), "is too large")
        })
}

pub fn build_create_request(
    ctx: &ExecutionContext,
    model: &CreateInput,
) -> Result<CreateKeyRequest, CliError> {
    Ok(CreateKeyRequest {
        project_id: model.globals.project_id.clone(),
        email: model.service_account_email.clone(),
        payload: CreateKeyPayload {
            valid_until: model
                .expires_in_days
                .map(|days| expiry(ctx, days))
                .transpose()?,
            public_key: model.public_key.clone(),
        },
    })
}

pub async fn create(ctx: &mut ExecutionContext, flags: Flags<'_>) -> Result<(), CliError> {
    let model = parse_create_input(ctx, &flags)?;
    let client = ctx.clients.service_account()?;

    let validity = match model.expires_in_days {
        Some(days) => format!("The key will be valid for {days} days"),
        None => "The key will be valid until deleted".to_string(),
    };
    let request = build_create_request(ctx, &model)?;
    confirm(
        ctx,
        &format!(
            "Are you sure you want to create a key for service account \"{}\"? {validity}",
            model.service_account_email
        ),
    )?;

    let key = ctx
        .call("create service account key", client.create_key(&request))
        .await?;

    let key_id = key.get("id").and_then(|id| id.as_str()).unwrap_or_default();
    ctx.printer.info(format!(
        "Created key for service account \"{}\" with ID \"{key_id}\"",
        model.service_account_email
    ));

    let output_format = ctx.printer.output_format();
    ctx.printer.output_result(output_format, &key, |p| {
        let rendered = format::to_json(&key)?;
        p.outputf(rendered)
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListInput {
    #[serde(flatten)]
    pub globals: GlobalOptions,
    pub service_account_email: String,
    pub limit: Option<i64>,
}

pub fn parse_list_input(ctx: &mut ExecutionContext, flags: &Flags<'_>) -> Result<ListInput, CliError> {
    let globals = ctx.globals.clone();
    globals.require_project_id()?;
    let model = ListInput {
        globals,
        service_account_email: email(flags)?,
        limit: flags.positive(PARAMETER_LIMIT)?,
    };
    ctx.printer.debug_input_model(&model);
    Ok(model)
}

fn valid_until(key: &ServiceAccountKey) -> String {
    key.valid_until
        .map(|until| until.to_rfc3339())
        .unwrap_or_else(|| "does not expire".to_string())
}

pub async fn list(ctx: &mut ExecutionContext, flags: Flags<'_>) -> Result<(), CliError> {
    let model = parse_list_input(ctx, &flags)?;
    let client = ctx.clients.service_account()?;
    let response = ctx
        .call(
            "list service account keys",
            client.list_keys(&model.globals.project_id, &model.service_account_email),
        )
        .await?;
    let mut keys = response.items;
    truncate(&mut keys, model.limit);

    let output_format = ctx.printer.output_format();
    if keys.is_empty() && !output_format.is_structured() {
        return ctx.printer.outputln(format!(
            "No keys found for service account \"{}\"",
            model.service_account_email
        ));
    }
    ctx.printer.output_result(output_format, &keys, |p| {
        let mut table = Table::new();
        table.set_header(["ID", "ACTIVE", "CREATED AT", "VALID UNTIL"]);
        for key in &keys {
            table.add_row([
                key.id.clone(),
                key.active.to_string(),
                key.created_at
                    .map(|created| created.to_rfc3339())
                    .unwrap_or_default(),
                valid_until(key),
            ]);
        }
        table.display(p)
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyInput {
    #[serde(flatten)]
    pub globals: GlobalOptions,
    pub service_account_email: String,
    pub key_id: String,
}

pub fn parse_key_input(ctx: &mut ExecutionContext, flags: &Flags<'_>) -> Result<KeyInput, CliError> {
    let globals = ctx.globals.clone();
    globals.require_project_id()?;
    let model = KeyInput {
        globals,
        service_account_email: email(flags)?,
        key_id: single_arg(flags),
    };
    ctx.printer.debug_input_model(&model);
    Ok(model)
}

/// First characters of a public key, for tables.
fn preview(public_key: &str) -> String {
    match public_key.char_indices().nth(PUBLIC_KEY_PREVIEW) {
        Some((end, _)) => format!("{}...", &public_key[..end]),
        None => public_key.to_string(),
    }
}

pub async fn describe(ctx: &mut ExecutionContext, flags: Flags<'_>) -> Result<(), CliError> {
    let model = parse_key_input(ctx, &flags)?;
    let client = ctx.clients.service_account()?;
    let key = ctx
        .call(
            "get service account key",
            client.get_key(
                &model.globals.project_id,
                &model.service_account_email,
                &model.key_id,
            ),
        )
        .await?;

    let output_format = ctx.printer.output_format();
    ctx.printer.output_result(output_format, &key, |p| {
        let mut table = Table::new();
        table.add_row(["ID".to_string(), key.id.clone()]);
        table.add_separator();
        table.add_row(["ACTIVE".to_string(), key.active.to_string()]);
        table.add_separator();
        table.add_row([
            "CREATED AT".to_string(),
            key.created_at
                .map(|created| created.to_rfc3339())
                .unwrap_or_default(),
        ]);
        table.add_separator();
        table.add_row(["VALID UNTIL".to_string(), valid_until(&key)]);
        table.add_separator();
        table.add_row([
            "KEY TYPE".to_string(),
            key.key_type.clone().unwrap_or_default(),
        ]);
        table.add_separator();
        table.add_row([
            "KEY ORIGIN".to_string(),
            key.key_origin.clone().unwrap_or_default(),
        ]);
        table.add_separator();
        table.add_row([
            "KEY ALGORITHM".to_string(),
            key.key_algorithm.clone().unwrap_or_default(),
        ]);
        table.add_separator();
        table.add_row([
            "PUBLIC KEY".to_string(),
            key.public_key.as_deref().map(preview).unwrap_or_default(),
        ]);
        table.display(p)
    })
}

pub async fn delete(ctx: &mut ExecutionContext, flags: Flags<'_>) -> Result<(), CliError> {
    let model = parse_key_input(ctx, &flags)?;
    let client = ctx.clients.service_account()?;

    confirm(
        ctx,
        &format!(
            "Are you sure you want to delete key \"{}\" of service account \"{}\"? (This cannot be undone)",
            model.key_id, model.service_account_email
        ),
    )?;

    ctx.call(
        "delete service account key",
        client.delete_key(
            &model.globals.project_id,
            &model.service_account_email,
            &model.key_id,
        ),
    )
    .await?;

    ctx.printer.info(format!(
        "Deleted key \"{}\" of service account \"{}\"",
        model.key_id, model.service_account_email
    ));
    Ok(())
}
