//! `nimbus dns zone` executors.

use serde::Serialize;

use super::{cell, single_arg};
use crate::{
    commands::{
        dns::ZONE_TYPE_CHOICES,
        params::{
            PARAMETER_ACL, PARAMETER_CONTACT_EMAIL, PARAMETER_DEFAULT_TTL, PARAMETER_DESCRIPTION,
            PARAMETER_DNS_NAME, PARAMETER_EXPIRE_TIME, PARAMETER_INCLUDE_DELETED,
            PARAMETER_IS_REVERSE_ZONE, PARAMETER_LABEL_SELECTOR, PARAMETER_LIMIT, PARAMETER_NAME,
            PARAMETER_NEGATIVE_CACHE, PARAMETER_PAGE_SIZE, PARAMETER_PRIMARY,
            PARAMETER_REFRESH_TIME, PARAMETER_RETRY_TIME, PARAMETER_TYPE,
        },
    },
    context::ExecutionContext,
    error::CliError,
    executor::{confirm, label_or_id, operation_state, truncate, wait_unless_async},
    flags::{Cidr, Flags},
    globalflags::GlobalOptions,
    sdk::dns::{
        zone_state, CreateZonePayload, CreateZoneRequest, DnsApi, ListZonesRequest,
        PartialUpdateZonePayload, PartialUpdateZoneRequest, Zone, STATE_CREATE_FAILED,
        STATE_CREATE_SUCCEEDED, STATE_DELETE_FAILED, STATE_DELETE_SUCCEEDED, STATE_UPDATE_FAILED,
        STATE_UPDATE_SUCCEEDED,
    },
    tables::Table,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListZonesInput {
    #[serde(flatten)]
    pub globals: GlobalOptions,
    pub limit: Option<i64>,
    pub page_size: i64,
    pub include_deleted: bool,
    pub label_selector: Option<String>,
}

pub fn parse_list_input(
    ctx: &mut ExecutionContext,
    flags: &Flags<'_>,
) -> Result<ListZonesInput, CliError> {
    let globals = ctx.globals.clone();
    globals.require_project_id()?;

    let page_size: i64 = flags.value(PARAMETER_PAGE_SIZE)?;
    if page_size < 1 {
        return Err(CliError::invalid_flag(
            PARAMETER_PAGE_SIZE,
            page_size.to_string(),
            "must be greater than 0",
        ));
    }

    let model = ListZonesInput {
        globals,
        limit: flags.positive(PARAMETER_LIMIT)?,
        page_size,
        include_deleted: flags.bool(PARAMETER_INCLUDE_DELETED)?,
        label_selector: flags.optional_string(PARAMETER_LABEL_SELECTOR),
    };
    ctx.printer.debug_input_model(&model);
    Ok(model)
}

pub fn build_list_request(model: &ListZonesInput, page: i64, page_size: i64) -> ListZonesRequest {
    ListZonesRequest {
        project_id: model.globals.project_id.clone(),
        page,
        page_size,
        include_deleted: model.include_deleted,
        label_selector: model.label_selector.clone(),
    }
}

/// Fetch pages until the API runs out of zones or the limit is reached.
async fn fetch_zones(
    ctx: &ExecutionContext,
    api: &dyn DnsApi,
    model: &ListZonesInput,
) -> Result<Vec<Zone>, CliError> {
    let page_size = match model.limit {
        Some(limit) if limit < model.page_size => limit,
        _ => model.page_size,
    };

    let mut zones = Vec::new();
    let mut page = 1;
    loop {
        let request = build_list_request(model, page, page_size);
        let response = ctx.call("get DNS zones", api.list_zones(&request)).await?;
        let received = response.zones.len();
        zones.extend(response.zones);

        if received == 0 || (received as i64) < page_size {
            break;
        }
        if matches!(model.limit, Some(limit) if zones.len() as i64 >= limit) {
            break;
        }
        page += 1;
    }
    truncate(&mut zones, model.limit);
    Ok(zones)
}

pub async fn list(ctx: &mut ExecutionContext, flags: Flags<'_>) -> Result<(), CliError> {
    let model = parse_list_input(ctx, &flags)?;
    let client = ctx.clients.dns()?;
    let zones = fetch_zones(ctx, client.as_ref(), &model).await?;

    let format = ctx.printer.output_format();
    if zones.is_empty() && !format.is_structured() {
        return ctx.printer.outputln(format!(
            "No zones found for project \"{}\"",
            model.globals.project_id
        ));
    }
    ctx.printer.output_result(format, &zones, |p| {
        let mut table = Table::new();
        table.set_header(["ID", "NAME", "STATE", "TYPE", "DNS NAME", "RECORD COUNT"]);
        for zone in &zones {
            table.add_row([
                zone.id.clone(),
                zone.name.clone(),
                zone.state.clone(),
                zone.zone_type.clone(),
                zone.dns_name.clone(),
                zone.record_count.to_string(),
            ]);
        }
        table.display(p)
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateZoneInput {
    #[serde(flatten)]
    pub globals: GlobalOptions,
    pub name: String,
    pub dns_name: String,
    pub default_ttl: Option<i64>,
    pub primaries: Option<Vec<String>>,
    pub acl: Option<Vec<Cidr>>,
    pub zone_type: Option<String>,
    pub retry_time: Option<i64>,
    pub refresh_time: Option<i64>,
    pub negative_cache: Option<i64>,
    pub is_reverse_zone: Option<bool>,
    pub expire_time: Option<i64>,
    pub description: Option<String>,
    pub contact_email: Option<String>,
}

fn zone_type(flags: &Flags<'_>) -> Result<Option<String>, CliError> {
    match flags.optional_string(PARAMETER_TYPE) {
        Some(value) if !ZONE_TYPE_CHOICES.contains(&value.as_str()) => Err(CliError::invalid_flag(
            PARAMETER_TYPE,
            value,
            format!("must be one of {}", ZONE_TYPE_CHOICES.join(", ")),
        )),
        value => Ok(value),
    }
}

fn join_acl(acl: &Option<Vec<Cidr>>) -> Option<String> {
    acl.as_ref().map(|blocks| {
        blocks
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",")
    })
}

pub fn parse_create_input(
    ctx: &mut ExecutionContext,
    flags: &Flags<'_>,
) -> Result<CreateZoneInput, CliError> {
    let globals = ctx.globals.clone();
    globals.require_project_id()?;

    let model = CreateZoneInput {
        globals,
        name: flags.string(PARAMETER_NAME),
        dns_name: flags.string(PARAMETER_DNS_NAME),
        default_ttl: flags.optional(PARAMETER_DEFAULT_TTL)?,
        primaries: flags.optional_slice(PARAMETER_PRIMARY)?,
        acl: flags.cidr_slice(PARAMETER_ACL)?,
        zone_type: zone_type(flags)?,
        retry_time: flags.optional(PARAMETER_RETRY_TIME)?,
        refresh_time: flags.optional(PARAMETER_REFRESH_TIME)?,
        negative_cache: flags.optional(PARAMETER_NEGATIVE_CACHE)?,
        is_reverse_zone: flags.optional_bool(PARAMETER_IS_REVERSE_ZONE)?,
        expire_time: flags.optional(PARAMETER_EXPIRE_TIME)?,
        description: flags.optional_string(PARAMETER_DESCRIPTION),
        contact_email: flags.optional_string(PARAMETER_CONTACT_EMAIL),
    };
    ctx.printer.debug_input_model(&model);
    Ok(model)
}

pub fn build_create_request(model: &CreateZoneInput) -> CreateZoneRequest {
    CreateZoneRequest {
        project_id: model.globals.project_id.clone(),
        payload: CreateZonePayload {
            name: model.name.clone(),
            dns_name: model.dns_name.clone(),
            default_ttl: model.default_ttl,
            primaries: model.primaries.clone(),
            acl: join_acl(&model.acl),
            zone_type: model.zone_type.clone(),
            retry_time: model.retry_time,
            refresh_time: model.refresh_time,
            negative_cache: model.negative_cache,
            is_reverse_zone: model.is_reverse_zone,
            expire_time: model.expire_time,
            description: model.description.clone(),
            contact_email: model.contact_email.clone(),
        },
    }
}

pub async fn create(ctx: &mut ExecutionContext, flags: Flags<'_>) -> Result<(), CliError> {
    let model = parse_create_input(ctx, &flags)?;
    let client = ctx.clients.dns()?;
    let api = client.as_ref();
    let project_label = model.globals.project_id.clone();

    let request = build_create_request(&model);
    confirm(
        ctx,
        &format!("Are you sure you want to create a zone for project \"{project_label}\"?"),
    )?;

    let zone = ctx.call("create DNS zone", api.create_zone(&request)).await?;

    let view: &ExecutionContext = ctx;
    let project_id = model.globals.project_id.as_str();
    let zone_id = zone.id.as_str();
    let waited = wait_unless_async(
        view,
        "wait for DNS zone creation",
        "Creating zone",
        move || view.call("get DNS zone", api.get_zone(project_id, zone_id)),
        zone_state(STATE_CREATE_SUCCEEDED, STATE_CREATE_FAILED),
    )
    .await?;
    let zone = waited.unwrap_or(zone);

    let state = operation_state(ctx, "Created", "Triggered creation of");
    let format = ctx.printer.output_format();
    ctx.printer.output_result(format, &zone, |p| {
        p.outputln(format!(
            "{state} zone for project \"{project_label}\". Zone ID: {}",
            zone.id
        ))
    })
}

pub async fn describe(ctx: &mut ExecutionContext, flags: Flags<'_>) -> Result<(), CliError> {
    let globals = ctx.globals.clone();
    globals.require_project_id()?;
    let zone_id = single_arg(&flags);

    let client = ctx.clients.dns()?;
    let zone = ctx
        .call("read DNS zone", client.get_zone(&globals.project_id, &zone_id))
        .await?;

    let format = ctx.printer.output_format();
    ctx.printer
        .output_result(format, &zone, |p| zone_details(&zone).display(p))
}

fn zone_details(zone: &Zone) -> Table {
    let mut table = Table::new();
    table.add_row(["ID".to_string(), zone.id.clone()]);
    table.add_separator();
    table.add_row(["NAME".to_string(), zone.name.clone()]);
    table.add_separator();
    table.add_row(["STATE".to_string(), zone.state.clone()]);
    table.add_separator();
    table.add_row(["TYPE".to_string(), zone.zone_type.clone()]);
    table.add_separator();
    table.add_row(["DNS NAME".to_string(), zone.dns_name.clone()]);
    table.add_separator();
    table.add_row(["REVERSE ZONE".to_string(), cell(&zone.is_reverse_zone)]);
    table.add_separator();
    table.add_row(["RECORD COUNT".to_string(), zone.record_count.to_string()]);
    table.add_separator();
    table.add_row(["CONTACT EMAIL".to_string(), cell(&zone.contact_email)]);
    table.add_separator();
    table.add_row(["DEFAULT TTL".to_string(), cell(&zone.default_ttl)]);
    table.add_separator();
    table.add_row(["SERIAL NUMBER".to_string(), cell(&zone.serial_number)]);
    table.add_separator();
    table.add_row(["REFRESH TIME".to_string(), cell(&zone.refresh_time)]);
    table.add_separator();
    table.add_row(["RETRY TIME".to_string(), cell(&zone.retry_time)]);
    table.add_separator();
    table.add_row(["EXPIRE TIME".to_string(), cell(&zone.expire_time)]);
    table.add_separator();
    table.add_row(["NEGATIVE CACHE".to_string(), cell(&zone.negative_cache)]);
    table
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateZoneInput {
    #[serde(flatten)]
    pub globals: GlobalOptions,
    pub zone_id: String,
    pub name: Option<String>,
    pub default_ttl: Option<i64>,
    pub primaries: Option<Vec<String>>,
    pub acl: Option<Vec<Cidr>>,
    pub retry_time: Option<i64>,
    pub refresh_time: Option<i64>,
    pub negative_cache: Option<i64>,
    pub expire_time: Option<i64>,
    pub description: Option<String>,
    pub contact_email: Option<String>,
}

impl UpdateZoneInput {
    fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.default_ttl.is_none()
            && self.primaries.is_none()
            && self.acl.is_none()
            && self.retry_time.is_none()
            && self.refresh_time.is_none()
            && self.negative_cache.is_none()
            && self.expire_time.is_none()
            && self.description.is_none()
            && self.contact_email.is_none()
    }
}

pub fn parse_update_input(
    ctx: &mut ExecutionContext,
    flags: &Flags<'_>,
) -> Result<UpdateZoneInput, CliError> {
    let globals = ctx.globals.clone();
    globals.require_project_id()?;

    let model = UpdateZoneInput {
        globals,
        zone_id: single_arg(flags),
        name: flags.optional_string(PARAMETER_NAME),
        default_ttl: flags.optional(PARAMETER_DEFAULT_TTL)?,
        primaries: flags.optional_slice(PARAMETER_PRIMARY)?,
        acl: flags.cidr_slice(PARAMETER_ACL)?,
        retry_time: flags.optional(PARAMETER_RETRY_TIME)?,
        refresh_time: flags.optional(PARAMETER_REFRESH_TIME)?,
        negative_cache: flags.optional(PARAMETER_NEGATIVE_CACHE)?,
        expire_time: flags.optional(PARAMETER_EXPIRE_TIME)?,
        description: flags.optional_string(PARAMETER_DESCRIPTION),
        contact_email: flags.optional_string(PARAMETER_CONTACT_EMAIL),
    };
    if model.is_empty() {
        return Err(CliError::EmptyUpdate);
    }
    ctx.printer.debug_input_model(&model);
    Ok(model)
}

pub fn build_update_request(model: &UpdateZoneInput) -> PartialUpdateZoneRequest {
    PartialUpdateZoneRequest {
        project_id: model.globals.project_id.clone(),
        zone_id: model.zone_id.clone(),
        payload: PartialUpdateZonePayload {
            name: model.name.clone(),
            default_ttl: model.default_ttl,
            primaries: model.primaries.clone(),
            acl: join_acl(&model.acl),
            retry_time: model.retry_time,
            refresh_time: model.refresh_time,
            negative_cache: model.negative_cache,
            expire_time: model.expire_time,
            description: model.description.clone(),
            contact_email: model.contact_email.clone(),
        },
    }
}

async fn lookup_zone_name(
    ctx: &mut ExecutionContext,
    api: &dyn DnsApi,
    project_id: &str,
    zone_id: &str,
) -> String {
    label_or_id(ctx, "get zone name", zone_id, async {
        api.get_zone(project_id, zone_id).await.map(|zone| zone.name)
    })
    .await
}

pub async fn update(ctx: &mut ExecutionContext, flags: Flags<'_>) -> Result<(), CliError> {
    let model = parse_update_input(ctx, &flags)?;
    let client = ctx.clients.dns()?;
    let api = client.as_ref();
    let project_id = model.globals.project_id.as_str();
    let zone_id = model.zone_id.as_str();

    let zone_label = lookup_zone_name(ctx, api, project_id, zone_id).await;
    let request = build_update_request(&model);
    confirm(
        ctx,
        &format!("Are you sure you want to update zone \"{zone_label}\"?"),
    )?;

    ctx.call("update DNS zone", api.partial_update_zone(&request))
        .await?;

    let view: &ExecutionContext = ctx;
    wait_unless_async(
        view,
        "wait for DNS zone update",
        "Updating zone",
        move || view.call("get DNS zone", api.get_zone(project_id, zone_id)),
        zone_state(STATE_UPDATE_SUCCEEDED, STATE_UPDATE_FAILED),
    )
    .await?;

    let state = operation_state(ctx, "Updated", "Triggered update of");
    ctx.printer.info(format!("{state} zone \"{zone_label}\""));
    Ok(())
}

pub async fn delete(ctx: &mut ExecutionContext, flags: Flags<'_>) -> Result<(), CliError> {
    let globals = ctx.globals.clone();
    globals.require_project_id()?;
    let zone_id = single_arg(&flags);
    ctx.printer.debug_input_model(&globals);

    let client = ctx.clients.dns()?;
    let api = client.as_ref();
    let project_id = globals.project_id.as_str();

    let zone_label = lookup_zone_name(ctx, api, project_id, &zone_id).await;
    confirm(
        ctx,
        &format!("Are you sure you want to delete zone \"{zone_label}\"? (This cannot be undone)"),
    )?;

    ctx.call("delete DNS zone", api.delete_zone(project_id, &zone_id))
        .await?;

    let view: &ExecutionContext = ctx;
    let zone_id = zone_id.as_str();
    wait_unless_async(
        view,
        "wait for DNS zone deletion",
        "Deleting zone",
        move || view.call("get DNS zone", api.get_zone(project_id, zone_id)),
        zone_state(STATE_DELETE_SUCCEEDED, STATE_DELETE_FAILED),
    )
    .await?;

    let state = operation_state(ctx, "Deleted", "Triggered deletion of");
    ctx.printer.info(format!("{state} zone \"{zone_label}\""));
    Ok(())
}
